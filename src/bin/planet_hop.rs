//! Planet Hop Demo
//!
//! Run with: `cargo run --bin planet_hop [level.json]`
//!
//! Headless run of the locomotion core. Builds a small world (or loads one
//! from a JSON level file), spawns one actor and drives it with a scripted
//! input sequence: run, triple jump, long jump, back flip. Snapshots are
//! logged as JSON every half second.
//!
//! Logging follows `RUST_LOG`, e.g. `RUST_LOG=gravity_hop_engine=debug`.

use std::error::Error;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gravity_hop_engine::world::PrefabPreset;
use gravity_hop_engine::{
    ActorConfig, ActorHandle, AttractorDesc, CameraRig, Checkpoint, FieldDesc, Level, LevelDesc,
    LocomotionEvent, Shape, Simulation, StepInput, TransformDesc,
};

/// Frames per second of the scripted run.
const FRAME_RATE: f32 = 60.0;

/// Default world: a home planet, a launch pad, a ring and a cup.
fn demo_level() -> LevelDesc {
    let home = AttractorDesc::new(Shape::sphere(20.0), TransformDesc::at(Vec3::new(0.0, 0.0, -21.0)))
        .named("home")
        .with_margin_field(12.0, 100.0);

    let pad = AttractorDesc::new(
        Shape::plane(6.0, 6.0, 0.0),
        TransformDesc {
            position: Vec3::new(40.0, 0.0, 10.0),
            pitch_deg: -20.0,
            ..Default::default()
        },
    )
    .named("pad")
    .with_field(FieldDesc::Shape {
        shape: Shape::plane(6.0, 6.0, 4.0),
        force: 100.0,
        offset: Vec3::ZERO,
        pull: None,
    });

    let ring = AttractorDesc::new(Shape::torus(2.0, 8.0), TransformDesc::at(Vec3::new(0.0, 45.0, 0.0)))
        .named("ring")
        .with_margin_field(6.0, 80.0);

    let cup = AttractorDesc::new(Shape::bowl(10.0, 1.5), TransformDesc::at(Vec3::new(-45.0, 0.0, 0.0)))
        .named("cup")
        .with_margin_field(5.0, 90.0);

    let fortress = AttractorDesc::new(Shape::plane(49.0, 49.0, 0.0), TransformDesc::at(Vec3::new(0.0, 0.0, -120.0)))
        .named("fortress")
        .with_field(FieldDesc::Preset {
            preset: PrefabPreset::Fortress,
            extent: 30.0,
            force: 100.0,
        });

    LevelDesc {
        attractors: vec![home, pad, ring, cup, fortress],
        checkpoints: vec![Checkpoint {
            min: Vec3::new(-3.0, -3.0, -2.0),
            max: Vec3::new(3.0, 3.0, 3.0),
            section: 0,
        }],
    }
}

fn load_level() -> Result<Level, Box<dyn Error>> {
    let desc = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading level");
            LevelDesc::from_json_str(&std::fs::read_to_string(path)?)?
        }
        None => demo_level(),
    };
    Ok(desc.build()?)
}

/// Input for frame `frame` of the scripted run.
fn scripted_input(frame: u32, camera_forward: Vec3) -> StepInput {
    let seconds = frame as f32 / FRAME_RATE;
    let run = StepInput::steer(Vec2::Y, camera_forward);
    match seconds {
        s if s < 1.0 => StepInput::idle(),
        s if s < 3.0 => run,
        // Three quick presses while running.
        s if (3.0..3.02).contains(&s) || (3.6..3.62).contains(&s) || (4.3..4.32).contains(&s) => run.with_jump(),
        s if s < 5.5 => run,
        s if (5.5..5.52).contains(&s) => run.with_crouch().with_jump(),
        s if s < 7.0 => run,
        s if s < 7.5 => StepInput::idle().with_crouch(),
        s if (7.5..7.52).contains(&s) => StepInput::idle().with_crouch().with_jump(),
        s if s < 9.0 => StepInput::idle(),
        _ => run.with_speed_up(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let level = Arc::new(load_level()?);
    let mut sim = Simulation::new(level);
    let config = ActorConfig {
        spawn_position: Vec3::new(0.0, 0.0, 2.0),
        ..ActorConfig::default()
    };
    let player = sim.spawn_actor(config);
    sim.add_observer(|_: ActorHandle, event: &LocomotionEvent| {
        if let LocomotionEvent::Jumped { kind, jump_number } = event {
            info!(?kind, jump_number, "jump");
        }
    });

    let rig = CameraRig::default();
    let dt = 1.0 / FRAME_RATE;
    let frames = (12.0 * FRAME_RATE) as u32;

    for frame in 0..frames {
        let camera_forward = sim
            .actor(player)
            .map(|actor| rig.transform(actor).forward())
            .unwrap_or(Vec3::X);
        let input = scripted_input(frame, camera_forward);
        let Some(snapshot) = sim.step(player, &input, dt) else {
            break;
        };

        if frame % (FRAME_RATE as u32 / 2) == 0 {
            let json = serde_json::to_string(&snapshot)?;
            info!(frame, snapshot = %json, "snapshot");
        }
        if snapshot.position.length() > 1000.0 {
            info!(frame, "fell out of the world, respawning");
            sim.respawn(player, true);
        }
    }

    info!("done");
    Ok(())
}
