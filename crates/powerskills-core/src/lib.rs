//! Power Skills Core — shared domain abstractions.
//!
//! This crate defines the traits and types every context of the journey
//! engine depends on: aggregates, commands, events, the clock, the domain
//! error and the ephemeral event journal. It contains no presentation code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod journal;
