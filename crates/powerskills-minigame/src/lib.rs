//! Power Skills — Mini-Game context.
//!
//! One generalized state machine (help → playing → error/success) drives
//! every mini-game. What differs between games is the win-condition
//! strategy the machine is parameterized with.

pub mod application;
pub mod domain;
