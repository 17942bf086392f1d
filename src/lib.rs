// NES core modules
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod prelude;
pub mod snapshot;
pub mod tracer;

// Re-exports
pub use bus::cpu_bus::CpuBus;
pub use bus::BusDevice;
pub use cartridge::rom::{Rom, RomError};
pub use cartridge::{Mapper, SharedMapper};
pub use cpu::{CpuError, CPU};
