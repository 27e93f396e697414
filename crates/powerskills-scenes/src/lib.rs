//! Power Skills — Scenes context.
//!
//! Drives the fixed linear journey: each scene's briefings and intro video,
//! the hand-off to its mini-game, advancing on a win, and the restart offered
//! by the credits. Session state is owned by the sequencer and injected at
//! construction.

pub mod application;
pub mod domain;
