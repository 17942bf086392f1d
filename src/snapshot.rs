//! Save-state types. The layout is whatever the chosen serde codec
//! makes of these structs; it is not a stable external contract.

use serde::{Deserialize, Serialize};

use crate::bus::cpu_bus::CpuBus;
use crate::cartridge::mapper001_sxrom::{ChrMode, PrgSize};
use crate::cartridge::rom::Mirroring;
use crate::cpu::{Flags, CPU};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CpuState {
    pub register_a: u8,
    pub register_x: u8,
    pub register_y: u8,
    pub stack_pointer: u8,
    pub status: u8,
    pub program_counter: u16,
}

/// Per-variant mapper registers plus the RAM a cartridge carries.
/// ROM contents are reloaded from the image, never serialized.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MapperState {
    Nrom {
        prg_ram: Vec<u8>,
        chr_ram: Vec<u8>,
    },
    Sxrom {
        mirroring: Mirroring,
        prg_size: PrgSize,
        chr_mode: ChrMode,
        slot_select: bool,
        chr_bank_0: u8,
        chr_bank_1: u8,
        prg_bank: u8,
        accumulator: u8,
        write_count: u8,
        prg_ram: Vec<u8>,
        chr_ram: Vec<u8>,
    },
    Unrom {
        prg_bank: u8,
        prg_ram: Vec<u8>,
        chr_ram: Vec<u8>,
    },
    Cnrom {
        chr_bank: u8,
        prg_ram: Vec<u8>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub cpu: CpuState,
    pub ram: Vec<u8>,
    pub mapper: MapperState,
}

impl CPU<CpuBus> {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cpu: CpuState {
                register_a: self.register_a,
                register_x: self.register_x,
                register_y: self.register_y,
                stack_pointer: self.stack_pointer,
                status: self.status.bits(),
                program_counter: self.program_counter,
            },
            ram: self.bus.ram.bytes().to_vec(),
            mapper: self.bus.mapper.borrow().snapshot(),
        }
    }

    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.register_a = snapshot.cpu.register_a;
        self.register_x = snapshot.cpu.register_x;
        self.register_y = snapshot.cpu.register_y;
        self.stack_pointer = snapshot.cpu.stack_pointer;
        self.status = Flags::from_bits_truncate(snapshot.cpu.status);
        self.program_counter = snapshot.cpu.program_counter;
        self.bus.ram.copy_from(&snapshot.ram);
        self.bus.mapper.borrow_mut().restore(&snapshot.mapper);
    }
}
