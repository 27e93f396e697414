//! Shared helpers for terminal player integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use powerskills_cli::app::{App, Reply};
use powerskills_cli::config::Config;
use powerskills_content::default_journey;
use powerskills_core::clock::Clock;
use powerskills_test_support::ManualClock;

/// A player on the bundled journey with a clock the test moves.
pub struct TestPlayer {
    pub app: App,
    pub clock: Arc<ManualClock>,
}

impl TestPlayer {
    /// Starts the bundled journey. Returns the player and the opening screen.
    pub async fn start(config: Config) -> (Self, String) {
        let clock = Arc::new(ManualClock::at_epoch());
        let mut app = App::with_clock(
            default_journey().unwrap(),
            &config,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        let opening = app.start().await.unwrap();
        (Self { app, clock }, opening)
    }

    /// Starts with autoplay allowed.
    pub async fn autoplay() -> (Self, String) {
        Self::start(Config::default()).await
    }

    /// Types one line and returns the output.
    pub async fn send(&mut self, line: &str) -> String {
        match self.app.handle_line(line).await.unwrap() {
            Reply::Output(text) => text,
            Reply::Quit => panic!("`{line}` quit the player"),
        }
    }

    /// Lets `millis` pass and fires due timers.
    pub async fn wait_ms(&mut self, millis: i64) -> String {
        self.clock.advance_ms(millis);
        self.app.tick().await.unwrap().unwrap_or_default()
    }

    /// Skips the intro video and dismisses the instructions.
    pub async fn open_game(&mut self) {
        self.send("skip").await;
        self.send("ok").await;
    }

    /// Plays `moves`, waits out the success delay and continues to the next
    /// scene. Returns the screen of the next scene.
    pub async fn win(&mut self, moves: &[&str], delay_ms: i64) -> String {
        for line in moves {
            self.send(line).await;
        }
        self.wait_ms(delay_ms).await;
        self.send("ok").await
    }
}
