//! Convenient imports for consumers of famicore
//!
//! Pull in everything commonly needed in one line:
//! ```rust
//! use famicore::prelude::*;
//! ```

// Main emulator API
pub use crate::bus::cpu_bus::CpuBus;
pub use crate::cartridge::rom::{Mirroring, Rom, RomError};
pub use crate::cpu::{CpuError, Flags, CPU};
pub use crate::snapshot::Snapshot;

// Traits that users might need
pub use crate::bus::{ApuDevice, BusDevice, InputDevice, PpuDevice, PpuTick};
pub use crate::cartridge::{Mapper, SharedMapper};
pub use crate::tracer::TraceSource;

// Macros
pub use crate::trace_dump;
