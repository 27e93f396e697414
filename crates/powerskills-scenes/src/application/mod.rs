//! Application layer for the Scenes context.

pub mod command_handlers;
pub mod query_handlers;
pub mod sequencer;
