//! Westcat headless runner
//!
//! Plays a scripted session on the built-in level at a simulated 60 Hz
//! display and logs how it went. Usage: `westcat [settings.json]`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::PathBuf;

    use westcat::persistence::{Autosave, FileSaveStore};
    use westcat::platform::InputTracker;
    use westcat::sim::SceneId;
    use westcat::{Engine, Settings};

    /// Simulated display refresh
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after two simulated minutes
    const MAX_FRAMES: u32 = 60 * 120;
    /// Jump roughly every three quarters of a second
    const JUMP_EVERY: u32 = 45;

    env_logger::init();
    log::info!("Westcat (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(&PathBuf::from(path)),
        None => Settings::default(),
    };
    log::info!("Quality preset: {}", settings.quality.as_str());
    let mut input = InputTracker::new(settings.keys.clone());
    let mut engine = Engine::new(0x5eed, settings);

    let save_dir = std::env::temp_dir().join("westcat");
    engine.set_autosave(Autosave::new(Box::new(FileSaveStore::new(&save_dir)), 0));

    let mut now = 0.0;
    let mut dropped = 0;
    engine.frame(now, &mut input);

    // Title: confirm starts the game
    input.key_down("Enter");
    let mut frame = 0;
    while frame < MAX_FRAMES {
        frame += 1;
        now += FRAME_MS;
        let report = engine.frame(now, &mut input);
        dropped += report.dropped;
        // No synth here: report what would start
        for (id, effect, volume) in engine.audio.started() {
            log::debug!("Voice {id}: {effect:?} at {volume:.2}");
        }

        match engine.scene() {
            Some(SceneId::Game) if !engine.is_transitioning() => {
                input.key_up("Enter");
                input.key_down("ArrowRight");
                if frame % JUMP_EVERY == 0 {
                    input.key_down("Space");
                } else if frame % JUMP_EVERY == 10 {
                    input.key_up("Space");
                }
            }
            Some(SceneId::GameOver | SceneId::Victory) => break,
            _ => {}
        }
    }

    let view = engine.render_view();
    log::info!(
        "Session ended after {:.1}s in {:?}: score {}, coins {}, health {}, totems {}/3, {} dropped ticks",
        f64::from(frame) * FRAME_MS / 1000.0,
        view.scene,
        view.score,
        view.coins,
        view.health,
        engine.world.totems.collected_count(),
        dropped
    );
    if let Some(save) = engine.autosave().and_then(|a| a.load()) {
        log::info!(
            "Autosave in {}: score {}, coins {}",
            save_dir.display(),
            save.score,
            save.coins
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build starts from `wasm_start` in the library
}
