//! Memory Probes
//!
//! Sources of the process memory figure the guardian compares against its budget.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use sysinfo::{Pid, ProcessesToUpdate, System};

/// Reports how many bytes the process currently uses.
pub trait MemoryProbe: Send + Sync {
    /// `None` when the figure cannot be read.
    fn used_bytes(&self) -> Option<u64>;
}

// == Process Memory Probe ==
/// Resident memory of the current process, sampled through sysinfo.
pub struct ProcessMemoryProbe {
    system: Mutex<System>,
    pid: Pid,
}

impl ProcessMemoryProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: Pid::from_u32(std::process::id()),
        }
    }
}

impl Default for ProcessMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for ProcessMemoryProbe {
    fn used_bytes(&self) -> Option<u64> {
        let mut system = self.system.lock().ok()?;
        system.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        system.process(self.pid).map(|process| process.memory())
    }
}

// == Static Probe ==
/// Probe reporting a value set by hand, for simulations and tests.
#[derive(Debug, Default)]
pub struct StaticProbe {
    bytes: AtomicU64,
}

impl StaticProbe {
    pub fn new(bytes: u64) -> Self {
        Self {
            bytes: AtomicU64::new(bytes),
        }
    }

    pub fn set(&self, bytes: u64) {
        self.bytes.store(bytes, Ordering::Relaxed);
    }
}

impl MemoryProbe for StaticProbe {
    fn used_bytes(&self) -> Option<u64> {
        Some(self.bytes.load(Ordering::Relaxed))
    }
}
