pub mod animation;
pub mod collision;
pub mod config;
pub mod events;
pub mod input;
pub mod player;
pub mod spatial;
pub mod triggers;
pub mod world;

pub use animation::{ActionState, AnimationMachine};
pub use collision::StaticCollisionVolume;
pub use config::{ClipSet, WorldConfig};
pub use events::WorldEvent;
pub use input::{InputState, IntentFlags};
pub use player::Player;
pub use spatial::{Aabb3, Capsule, SurfaceContact};
pub use triggers::{Inventory, TriggerId, TriggerKind, TriggerRegistry, TriggerVolume};
pub use world::World;
