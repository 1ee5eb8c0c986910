//! Notification channel owned by the engine.
//!
//! `emit` runs every subscriber synchronously, in subscription order, before
//! returning. The event is then queued twice: once for the engine's own
//! routing (`pop_pending`), once for the next snapshot (`take_emitted`).
//! Subscribers only observe; they cannot reach back into the engine.

use std::collections::VecDeque;

use aimtrainer_core::events::GameEvent;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&GameEvent)>;

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
    pending: VecDeque<GameEvent>,
    emitted: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn emit(&mut self, event: GameEvent) {
        tracing::trace!(?event, "emit");
        for (_, handler) in self.subscribers.iter_mut() {
            handler(&event);
        }
        self.emitted.push(event.clone());
        self.pending.push_back(event);
    }

    /// Next event awaiting engine routing.
    pub fn pop_pending(&mut self) -> Option<GameEvent> {
        self.pending.pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain everything emitted since the last call.
    pub fn take_emitted(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.emitted)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending.len())
            .field("emitted", &self.emitted.len())
            .finish()
    }
}
