//! Reusable object pool.
//!
//! The pool owns every instance for its whole lifetime. Callers hold
//! `TargetId` leases: `acquire` hands one out, `release` takes it back and
//! bumps the slot generation so the old handle stops resolving.
//!
//! When the free list is empty, `acquire` reclaims the oldest active lease
//! (FIFO by acquisition order) instead of growing.

use std::collections::VecDeque;

use aimtrainer_core::types::TargetId;

/// Lifecycle hooks fired by the pool. `C` is whatever context the owner
/// threads through (event bus, clock, ...).
pub trait Poolable<C> {
    fn on_spawn(&mut self, _id: TargetId, _ctx: &mut C) {}
    fn on_despawn(&mut self, _id: TargetId, _ctx: &mut C) {}
}

struct Slot<T> {
    item: T,
    generation: u32,
    active: bool,
}

pub struct ObjectPool<T> {
    template: T,
    slots: Vec<Slot<T>>,
    /// Inactive slot indices, oldest release first.
    free: VecDeque<u32>,
    /// Active slot indices in acquisition order.
    active: VecDeque<u32>,
}

impl<T: Clone> ObjectPool<T> {
    /// Empty pool that clones `template` for every new instance.
    pub fn new(template: T) -> Self {
        Self {
            template,
            slots: Vec::new(),
            free: VecDeque::new(),
            active: VecDeque::new(),
        }
    }

    /// Pool with `size` inactive instances already created.
    pub fn with_capacity(template: T, size: usize) -> Self {
        let mut pool = Self::new(template);
        pool.prewarm(size);
        pool
    }

    /// Eagerly create `count` more inactive instances.
    pub fn prewarm(&mut self, count: usize) {
        for _ in 0..count {
            let index = self.create_slot();
            self.free.push_back(index);
        }
    }

    /// Create instances until at least `total` exist.
    pub fn ensure_capacity(&mut self, total: usize) {
        let missing = total.saturating_sub(self.slots.len());
        self.prewarm(missing);
    }

    fn create_slot(&mut self) -> u32 {
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            item: self.template.clone(),
            generation: 0,
            active: false,
        });
        index
    }

    /// Lease an instance and fire its `on_spawn`.
    ///
    /// Pops the free list if possible, otherwise evicts the oldest active
    /// lease (its `on_despawn` fires first). A pool with no instances at all
    /// creates one.
    pub fn acquire<C>(&mut self, ctx: &mut C) -> TargetId
    where
        T: Poolable<C>,
    {
        let index = if let Some(index) = self.free.pop_front() {
            index
        } else if let Some(index) = self.active.pop_front() {
            let slot = &mut self.slots[index as usize];
            let evicted = TargetId::new(index, slot.generation);
            tracing::debug!(id = %evicted, "pool exhausted, evicting oldest lease");
            slot.item.on_despawn(evicted, ctx);
            slot.active = false;
            slot.generation = slot.generation.wrapping_add(1);
            index
        } else {
            self.create_slot()
        };

        let slot = &mut self.slots[index as usize];
        slot.active = true;
        let id = TargetId::new(index, slot.generation);
        self.active.push_back(index);
        slot.item.on_spawn(id, ctx);
        id
    }

    /// Take a lease back. No-op (returns `false`) for stale or unknown handles.
    pub fn release<C>(&mut self, id: TargetId, ctx: &mut C) -> bool
    where
        T: Poolable<C>,
    {
        if !self.is_active(id) {
            return false;
        }
        if let Some(pos) = self.active.iter().position(|&i| i == id.index) {
            self.active.remove(pos);
        }
        let slot = &mut self.slots[id.index as usize];
        slot.item.on_despawn(id, ctx);
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push_back(id.index);
        true
    }

    /// Release every active lease, newest first.
    pub fn release_all<C>(&mut self, ctx: &mut C)
    where
        T: Poolable<C>,
    {
        for id in self.active_ids().into_iter().rev() {
            self.release(id, ctx);
        }
    }

    /// Release everything, then destroy every instance.
    pub fn clear<C>(&mut self, ctx: &mut C)
    where
        T: Poolable<C>,
    {
        self.release_all(ctx);
        self.slots.clear();
        self.free.clear();
        self.active.clear();
    }
}

impl<T> ObjectPool<T> {
    /// Whether `id` is a current, active lease.
    pub fn is_active(&self, id: TargetId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|s| s.active && s.generation == id.generation)
    }

    pub fn get(&self, id: TargetId) -> Option<&T> {
        if self.is_active(id) {
            Some(&self.slots[id.index as usize].item)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut T> {
        if self.is_active(id) {
            Some(&mut self.slots[id.index as usize].item)
        } else {
            None
        }
    }

    /// Active leases in acquisition order.
    pub fn active_ids(&self) -> Vec<TargetId> {
        self.active
            .iter()
            .map(|&i| TargetId::new(i, self.slots[i as usize].generation))
            .collect()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (TargetId, &T)> + '_ {
        self.active.iter().map(move |&i| {
            let slot = &self.slots[i as usize];
            (TargetId::new(i, slot.generation), &slot.item)
        })
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Instances ever created and not yet destroyed by `clear`.
    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    pub fn template(&self) -> &T {
        &self.template
    }
}
