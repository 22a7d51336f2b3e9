use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::events::WorldEvent;
use crate::spatial::Aabb3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    /// A world object the interact action moves into the inventory.
    Collectible,
    /// A character the interact action addresses (dialogue and the like).
    Npc,
}

/// An interactable region of the world. The core reads the box and flips
/// `collected`; everything presentational happens in collaborators that
/// consume the resulting events.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TriggerVolume {
    pub id: TriggerId,
    pub kind: TriggerKind,
    pub aabb: Aabb3,
    pub collected: bool,
}

impl TriggerVolume {
    pub fn collectible(id: TriggerId, aabb: Aabb3) -> Self {
        Self {
            id,
            kind: TriggerKind::Collectible,
            aabb,
            collected: false,
        }
    }

    pub fn npc(id: TriggerId, aabb: Aabb3) -> Self {
        Self {
            id,
            kind: TriggerKind::Npc,
            aabb,
            collected: false,
        }
    }
}

#[derive(Default)]
pub struct TriggerRegistry {
    volumes: Vec<TriggerVolume>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, volume: TriggerVolume) {
        if !volume.aabb.is_valid() {
            warn!("rejecting trigger {} with inverted bounds", volume.id);
            return;
        }
        if self.get(volume.id).is_some() {
            debug!("trigger {} registered twice, keeping the new volume", volume.id);
            self.volumes.retain(|v| v.id != volume.id);
        }
        self.volumes.push(volume);
    }

    pub fn get(&self, id: TriggerId) -> Option<&TriggerVolume> {
        self.volumes.iter().find(|v| v.id == id)
    }

    pub fn get_mut(&mut self, id: TriggerId) -> Option<&mut TriggerVolume> {
        self.volumes.iter_mut().find(|v| v.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TriggerVolume> {
        self.volumes.iter()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

/// Edge-triggered overlap tracker. At most one collectible trigger and,
/// independently, one NPC trigger is "entered" at a time; each continuous
/// overlap interval yields exactly one entered and one exited event.
#[derive(Default)]
pub struct TriggerDetector {
    active_collectible: Option<TriggerId>,
    active_npc: Option<TriggerId>,
}

impl TriggerDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_collectible(&self) -> Option<TriggerId> {
        self.active_collectible
    }

    pub fn active_npc(&self) -> Option<TriggerId> {
        self.active_npc
    }

    /// Recompute overlap against the registry. Skipped entirely while the
    /// agent has no movement intent; a stationary agent keeps whatever
    /// trigger it last entered.
    pub fn scan(
        &mut self,
        agent_bounds: &Aabb3,
        registry: &TriggerRegistry,
        moving: bool,
        events: &mut Vec<WorldEvent>,
    ) {
        if !moving {
            return;
        }
        let mut collectible = None;
        let mut npc = None;
        for volume in registry.iter() {
            if !volume.aabb.intersects(agent_bounds) {
                continue;
            }
            // Registry order; the last overlapping volume wins the slot.
            match volume.kind {
                TriggerKind::Collectible => collectible = Some(volume.id),
                TriggerKind::Npc => npc = Some(volume.id),
            }
        }
        update_channel(&mut self.active_collectible, collectible, events);
        update_channel(&mut self.active_npc, npc, events);
    }
}

fn update_channel(
    active: &mut Option<TriggerId>,
    candidate: Option<TriggerId>,
    events: &mut Vec<WorldEvent>,
) {
    if *active == candidate {
        return;
    }
    if let Some(old) = *active {
        debug!("trigger {old} exited");
        events.push(WorldEvent::TriggerExited(old));
    }
    if let Some(new) = candidate {
        debug!("trigger {new} entered");
        events.push(WorldEvent::TriggerEntered(new));
    }
    *active = candidate;
}

/// Bounded collection of gathered item ids. Over-capacity insertion is a
/// silent no-op so gameplay flow is never interrupted by a full bag.
pub struct Inventory {
    items: Vec<TriggerId>,
    capacity: usize,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn contains(&self, id: TriggerId) -> bool {
        self.items.contains(&id)
    }

    pub fn items(&self) -> &[TriggerId] {
        &self.items
    }

    /// False when the bag is full or the item is already held.
    pub fn try_insert(&mut self, id: TriggerId) -> bool {
        if self.is_full() || self.contains(id) {
            return false;
        }
        info!("item {id} collected ({}/{})", self.items.len() + 1, self.capacity);
        self.items.push(id);
        true
    }

    pub fn remove(&mut self, id: TriggerId) -> bool {
        let before = self.items.len();
        self.items.retain(|held| *held != id);
        before != self.items.len()
    }
}
