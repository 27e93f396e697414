//! Domain model for the Mini-Game context.

pub mod aggregates;
pub mod commands;
pub mod definition;
pub mod events;
pub mod input;
pub mod pointer;
pub mod win_condition;
