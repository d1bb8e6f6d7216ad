//! Backend worker: owns the station board and executes UI commands one at a time.

pub mod commands;
pub mod runtime;
