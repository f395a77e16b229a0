//! Dessert Drop entry point
//!
//! Headless driver: runs one session over the reference physics world with a
//! scripted player, logging what happens and printing the final snapshot.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::{SystemTime, UNIX_EPOCH};

    use dessert_drop::GameConfig;
    use dessert_drop::consts::{AIM_UP, MAX_SUBSTEPS};
    use dessert_drop::physics::ArenaWorld;
    use dessert_drop::polar_to_cartesian;
    use dessert_drop::sim::{GameEvent, PointerInput, Session};

    /// Stop after five minutes of simulated play
    const MAX_TICKS: u64 = 60 * 60 * 5;

    /// Sweeps its aim back and forth across the cone, firing whenever ready
    struct AutoPlayer {
        phase: f32,
    }

    impl AutoPlayer {
        fn act(&mut self, session: &mut Session<ArenaWorld>, now_ms: f64) {
            if !session.can_fire() {
                return;
            }
            self.phase += 0.7;
            let origin = session.config().launch_origin();
            let angle = AIM_UP + self.phase.sin() * 1.2;
            let reach = 180.0 + 120.0 * (self.phase * 0.37).cos().abs();
            let pointer = origin + polar_to_cartesian(reach, angle);

            session.handle_pointer(PointerInput::Down(pointer), now_ms);
            session.handle_pointer(PointerInput::Move(pointer), now_ms);
            session.handle_pointer(PointerInput::Up, now_ms);
        }
    }

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let config = match std::env::args().nth(1) {
            Some(path) => match GameConfig::load(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("{e}");
                    std::process::exit(1);
                }
            },
            None => GameConfig::default(),
        };

        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        let mut session: Session<ArenaWorld> = match Session::new(config, seed) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Refusing to start: {e}");
                std::process::exit(1);
            }
        };

        let step_ms = session.config().physics.step_ms;
        let mut player = AutoPlayer { phase: 0.0 };
        let mut accumulator = 0.0f32;
        let mut now_ms = 0.0f64;
        let mut frame = 0u64;

        while !session.state().game_over && session.tick_count() < MAX_TICKS {
            // Uneven frame pacing, like a real display loop
            let frame_ms = if frame % 3 == 0 { 20.0 } else { 15.0 };
            frame += 1;
            now_ms += frame_ms as f64;
            accumulator += frame_ms;

            player.act(&mut session, now_ms);

            let mut substeps = 0;
            while accumulator >= step_ms && substeps < MAX_SUBSTEPS {
                session.tick(now_ms);
                accumulator -= step_ms;
                substeps += 1;
            }

            for event in session.drain_events() {
                match event {
                    GameEvent::Merged { tier, score, .. } => {
                        let name = session
                            .tiers()
                            .tier_at(tier)
                            .map(|t| t.name.as_str())
                            .unwrap_or("?");
                        log::info!("Merged into {name} (+{score})");
                    }
                    GameEvent::DangerStarted => log::info!("Pile crossed the fill line"),
                    GameEvent::GameOver { score } => log::info!("Game over, final score {score}"),
                    _ => {}
                }
            }
        }

        match serde_json::to_string_pretty(&session.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize snapshot: {e}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {}
