//! SnipVault Application Orchestration Layer
//!
//! This crate contains the engine's use cases (sync, capture, credentials)
//! and the runtime that drives them from timers and commands.

pub mod deps;
pub mod engine;
pub mod timer;
pub mod usecases;

pub use deps::EngineDeps;
pub use engine::{Ack, Engine, EngineCommand, EngineHandle};
pub use timer::RepeatingTimer;
