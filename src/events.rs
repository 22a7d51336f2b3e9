use crate::triggers::TriggerId;

/// One-shot notifications surfaced to collaborators (rendering outline,
/// inventory UI, dialogue, audio). Queued during `tick` and drained once
/// per frame; ordering within a tick is deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    /// The agent's bounds started overlapping a trigger volume.
    TriggerEntered(TriggerId),
    /// The agent's bounds stopped overlapping the previously active volume.
    TriggerExited(TriggerId),
    ItemCollected(TriggerId),
    ItemDropped(TriggerId),
    /// The interact action fired while inside an NPC trigger.
    NpcActivated(TriggerId),
    /// A collection succeeded; the avatar should play its victory clip.
    VictoryAnimationRequested,
}
