//! BitCup Runtime
//!
//! Headless demo loop: boots the engine against the toy backend, feeds it
//! synthetic donations from a producer thread, and runs the fixed-cadence
//! simulation for a while. The production overlay replaces the producer with
//! the chat/event client and the backend with the host engine's physics.

mod sim;

use anyhow::Result;
use bitcup_core::{should_trigger, BitEngine, BitOrder};
use bitcup_services::save;
use bitcup_services::settings::Settings;
use bitcup_services::textures::TextureCache;
use glam::Vec2;
use sim::DemoBackend;
use std::path::Path;
use std::thread;
use std::time::Duration;

const POOL_CAPACITY: usize = 512;
const TICK: f32 = 1.0 / 60.0;
const RUN_TICKS: u32 = 60 * 30;

const SETTINGS_PATH: &str = "settings.json";
const SAVE_PATH: &str = "gamestate.save";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("BitCup Engine v{}", bitcup_core::VERSION);

    let settings = Settings::load(Path::new(SETTINGS_PATH));
    let spawn_position = Vec2::new(0.0, -500.0);
    let mut engine = BitEngine::new(POOL_CAPACITY, spawn_position, settings.tuning(), 0xB17C);

    let mut textures = TextureCache::new();
    textures.register("cheer_party");
    engine.set_texture_resolver(Box::new(textures));

    let mut backend = DemoBackend::new(POOL_CAPACITY);
    engine.init_backend(&mut backend);

    if settings.save_bits {
        match save::load_bits(Path::new(SAVE_PATH)) {
            Ok(records) => {
                engine.restore(&records, &mut backend);
                tracing::info!(active = engine.active_count(), "cup state restored");
            }
            Err(err) => tracing::info!(%err, "no saved cup state"),
        }
    }

    // Stand-in for the chat client: submits donations from its own thread
    // through the bounded order channel.
    let sender = engine.order_sender();
    let producer = thread::spawn(move || {
        let donations = [123u32, 5_000, 350, 11_111, 42];
        for amount in donations {
            let order = if amount % 2 == 0 {
                BitOrder::with_texture(amount, "cheer_party")
            } else {
                BitOrder::from_amount(amount)
            };
            if let Err(err) = sender.enqueue(order) {
                tracing::warn!(%err, amount, "donation dropped");
            }
            thread::sleep(Duration::from_millis(400));
        }
        if let Err(err) = sender.enqueue(BitOrder::rain(3)) {
            tracing::warn!(%err, "rain order dropped");
        }
    });

    for tick in 0..RUN_TICKS {
        let events = backend.step(TICK);

        // Reclaim before this tick's spawn decision so freed slots are
        // immediately reusable.
        for body in events.exited {
            engine.on_boundary_exit(body, &mut backend);
        }
        for body in events.trigger_entries {
            if should_trigger(backend.cup_speeds(), false) {
                engine.on_explosion_trigger(body, &mut backend);
            }
        }

        engine.tick(TICK, &mut backend);

        if tick % 300 == 0 {
            tracing::info!(
                active = engine.active_count(),
                queued = engine.queued_orders(),
                "telemetry"
            );
        }

        thread::sleep(Duration::from_secs_f32(TICK));
    }

    producer
        .join()
        .map_err(|_| anyhow::anyhow!("producer thread panicked"))?;

    if settings.save_bits {
        save::save_bits(Path::new(SAVE_PATH), &engine.snapshot(&backend))?;
    }

    tracing::info!("done");
    Ok(())
}
