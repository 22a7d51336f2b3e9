use cgmath::Vector3;
use clap::{Parser, ValueEnum};
use log::info;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use island_playground::{
    Aabb3, ActionState, ClipSet, IntentFlags, StaticCollisionVolume, TriggerId, TriggerVolume,
    World, WorldConfig, WorldEvent,
};

#[derive(Parser, Debug)]
#[command(
    name = "island-playground",
    about = "Headless third-person character simulation demo"
)]
struct Args {
    #[arg(long, default_value_t = 8.0)]
    duration_secs: f32,
    #[arg(long, default_value_t = 60.0)]
    tick_hz: f32,
    /// Optional JSON file overriding the locomotion tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Scenario::Tour)]
    scenario: Scenario,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// Walk forward for the whole run.
    Walk,
    /// Walk, break into a run, jump mid-run, then stop.
    Tour,
    /// Walk onto a collectible and pick it up.
    Collect,
}

fn load_config(path: Option<&PathBuf>) -> Result<WorldConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(WorldConfig::default()),
    }
}

fn build_world(config: WorldConfig) -> World {
    let mut world = World::new(config, ClipSet::default(), Vector3::new(0.0, 0.5, 0.0));
    world.set_collision_volume(StaticCollisionVolume::flat_floor(0.0, 500.0));
    world.register_trigger(TriggerVolume::collectible(
        TriggerId(1),
        Aabb3::from_center_half_extents(
            Vector3::new(0.0, 0.5, -4.0),
            Vector3::new(0.6, 0.6, 0.6),
        ),
    ));
    world.register_trigger(TriggerVolume::npc(
        TriggerId(2),
        Aabb3::from_center_half_extents(
            Vector3::new(0.0, 0.5, -12.0),
            Vector3::new(1.0, 1.0, 1.0),
        ),
    ));
    world
}

/// Scripted intent schedule standing in for a live keyboard.
fn scripted_intent(scenario: Scenario, t: f32) -> IntentFlags {
    let forward = IntentFlags {
        move_forward: true,
        ..IntentFlags::default()
    };
    let sprint = IntentFlags {
        move_forward: true,
        run: true,
        ..IntentFlags::default()
    };
    match scenario {
        Scenario::Walk | Scenario::Collect => forward,
        Scenario::Tour => {
            if t < 2.0 {
                forward
            } else if t < 5.0 {
                sprint
            } else if t < 6.0 {
                forward
            } else {
                IntentFlags::default()
            }
        }
    }
}

fn weights_line(world: &World) -> String {
    ActionState::ALL
        .iter()
        .map(|s| format!("{}={:.2}", s.label(), world.animation().weight(*s)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    let mut world = build_world(config);

    let dt = 1.0 / args.tick_hz.max(1.0);
    let ticks = (args.duration_secs / dt).round() as usize;
    let ticks_per_report = args.tick_hz.max(1.0).round() as usize;

    info!(
        "running scenario {:?} for {:.1}s at {:.0} Hz",
        args.scenario, args.duration_secs, args.tick_hz
    );

    let mut jumped = false;
    for tick in 0..ticks {
        let t = tick as f32 * dt;
        world.set_intent(scripted_intent(args.scenario, t));
        // The tour takes exactly one jump, right as the sprint starts.
        if matches!(args.scenario, Scenario::Tour) && !jumped && t >= 2.0 {
            world.request_jump();
            jumped = true;
        }
        world.tick(dt);

        for event in world.drain_events() {
            info!("t={t:.2} event {event:?}");
            if matches!(args.scenario, Scenario::Collect)
                && matches!(event, WorldEvent::TriggerEntered(_))
            {
                world.request_interact();
            }
        }

        if tick % ticks_per_report == 0 {
            let p = world.position();
            info!(
                "t={t:.2} pos=({:.2}, {:.2}, {:.2}) grounded={} state={} [{}]",
                p.x,
                p.y,
                p.z,
                world.is_grounded(),
                world
                    .current_animation_state()
                    .map_or("NONE", ActionState::label),
                weights_line(&world),
            );
        }
    }

    info!(
        "done; final inventory holds {} item(s)",
        world.inventory().len()
    );
    Ok(())
}
