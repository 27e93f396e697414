//! Domain layer for the Scenes context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod session;
