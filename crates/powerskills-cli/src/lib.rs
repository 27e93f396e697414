//! Power Skills — terminal player.
//!
//! Plays a journey in a terminal: narration and video are printed, pointer
//! gestures are typed as commands.

pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod terminal;
