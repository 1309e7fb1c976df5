//! Ascension entry point
//!
//! Headless demo driver: starts a fresh run through the orchestrator, pilots
//! the opening level with a scripted dodge policy, then prints the godmode
//! mutation schedule.

use ascension::audio::AudioDirector;
use ascension::gauntlet::{GauntletAction, GauntletOrchestrator, ScenePayload, outcome_payload};
use ascension::level::{
    LevelLifecycle, LevelOutcome, LevelPhase, MUTATION_INTERVAL_MS, MUTATION_WINDOW_MS, TickInput,
    build_mutation_timeline,
};
use ascension::levels;
use ascension::settings::load_audio_settings;
use ascension::storage::MemoryStore;

const TICK_MS: u64 = 16;
const DEMO_TICK_CAP: u64 = 40_000 / TICK_MS;
const DEMO_SEED: u64 = 0x5EED_CAFE;

fn main() {
    env_logger::init();
    log::info!("Ascension (headless) starting...");

    let mut store = MemoryStore::new();
    let audio = AudioDirector::new(load_audio_settings(&store));
    let mut gauntlet = GauntletOrchestrator::new(audio);

    let action = gauntlet.handle(ScenePayload::NewRun { accessibility: None }, &store);
    let GauntletAction::StartLevel(snapshot) = action else {
        log::error!("new run did not produce a level start");
        return;
    };

    let rules = levels::rules_for(snapshot.run_state.current_level);
    let mut lifecycle = LevelLifecycle::new(rules, snapshot, DEMO_SEED);

    // Scripted pilot: hug the upper half and keep strafing so the bug rain
    // never settles on one spot. A failed attempt is abandoned to results.
    let mut outcome = None;
    for tick in 0..DEMO_TICK_CAP {
        let elapsed_ms = tick * TICK_MS;
        let mut input = TickInput::default();
        match lifecycle.phase() {
            LevelPhase::Active => {
                input.up = lifecycle.player_pos().y > 220.0;
                input.left = (elapsed_ms / 900) % 2 == 0;
                input.right = !input.left;
            }
            LevelPhase::Restarting => input.cancel = true,
            _ => {}
        }

        for fx in lifecycle.take_fx() {
            log::debug!("fx: {fx:?}");
        }

        if let Some(done) = lifecycle.tick(&input, TICK_MS, &mut store) {
            outcome = Some(done);
            break;
        }
    }

    match outcome {
        None => log::warn!("demo hit the tick cap without an outcome"),
        Some(LevelOutcome::Abandoned {
            run_state, results, ..
        }) => {
            log::info!(
                "demo run abandoned: score {:.0}, {} level(s) cleared",
                run_state.score,
                results.len(),
            );
        }
        Some(done) => {
            if let Some(payload) = outcome_payload(done) {
                match gauntlet.handle(payload, &store) {
                    GauntletAction::StartLevel(next) => log::info!(
                        "demo stops at the door of {}",
                        next.run_state.current_level.label(),
                    ),
                    GauntletAction::RunComplete { run_state, .. } => {
                        log::info!("gauntlet finished with score {:.0}", run_state.score);
                    }
                }
            }
        }
    }

    let catalog = levels::godmode::mutation_catalog();
    let ids: Vec<&str> = catalog.iter().map(|mutation| mutation.id).collect();

    println!("\nGodmode mutation schedule (first 60s):");
    for window in build_mutation_timeline(&ids, 60_000, MUTATION_INTERVAL_MS, MUTATION_WINDOW_MS) {
        println!(
            "  {:>6}ms - {:>6}ms  {}",
            window.start_ms, window.end_ms, window.mutation_id,
        );
    }
}
