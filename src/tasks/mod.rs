//! Background Tasks Module
//!
//! Contains the background work that runs alongside request handling.
//!
//! # Tasks
//! - Memory Guardian: sweeps, shrinks or clears registered stores depending on
//!   process memory pressure

mod guardian;
mod probe;

pub use guardian::{
    GuardianConfig, GuardianState, GuardianStatus, MemoryGuardian, PressureLevel, ReclaimHook,
    TickReport, HARD_LIMIT_RATIO, MIN_TICK_INTERVAL, SOFT_LIMIT_RATIO, SOFT_RETAIN_RATIO,
};
pub use probe::{MemoryProbe, ProcessMemoryProbe, StaticProbe};
