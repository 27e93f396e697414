//! Application layer for the Mini-Game context.

pub mod command_handlers;
pub mod mounted;
pub mod query_handlers;
pub mod timers;
