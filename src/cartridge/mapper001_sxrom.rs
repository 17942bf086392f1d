use serde::{Deserialize, Serialize};

use super::rom::{Mirroring, Rom, PRG_ROM_BANK_SIZE};
use super::{prg_ram_load, prg_ram_store, Mapper};
use crate::snapshot::MapperState;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrgSize {
    Size16k,
    Size32k,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChrMode {
    Mode8k,
    Mode4k,
}

/// Mapper 1 (MMC1 class). Configuration arrives one bit at a time
/// through writes to $8000-$FFFF: five LSB-first writes fill the shift
/// accumulator, and the fifth write's address selects which internal
/// register receives it.
pub struct SxromCart {
    rom: Rom,
    chr_ram: Vec<u8>,
    mirroring: Mirroring,

    prg_size: PrgSize,
    chr_mode: ChrMode,
    /// In 16 KiB mode: true fixes the last bank at $C000 and switches
    /// $8000; false fixes bank 0 at $8000 and switches $C000.
    slot_select: bool,
    chr_bank_0: u8,
    chr_bank_1: u8,
    prg_bank: u8,

    accumulator: u8,
    write_count: u8,
}

impl SxromCart {
    pub fn new(rom: Rom) -> SxromCart {
        let chr_ram = super::chr_ram_for(&rom);
        let mirroring = rom.header.mirroring;
        SxromCart {
            rom,
            chr_ram,
            mirroring,
            prg_size: PrgSize::Size16k,
            chr_mode: ChrMode::Mode8k,
            slot_select: true,
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
            accumulator: 0,
            write_count: 0,
        }
    }

    fn register_write(&mut self, addr: u16, val: u8) {
        // Bit 7 resets the shift protocol and re-fixes the last bank.
        if val & 0x80 != 0 {
            self.accumulator = 0;
            self.write_count = 0;
            self.prg_size = PrgSize::Size16k;
            self.slot_select = true;
            return;
        }

        self.accumulator |= (val & 1) << self.write_count;
        self.write_count += 1;

        if self.write_count == 5 {
            self.commit(addr);
            self.accumulator = 0;
            self.write_count = 0;
        }
    }

    fn commit(&mut self, addr: u16) {
        match addr {
            0x8000..=0x9FFF => {
                self.mirroring = match self.accumulator & 0x03 {
                    0 => Mirroring::SingleScreenLower,
                    1 => Mirroring::SingleScreenUpper,
                    2 => Mirroring::Vertical,
                    _ => Mirroring::Horizontal,
                };
                self.slot_select = self.accumulator & (1 << 2) != 0;
                self.prg_size = if self.accumulator & (1 << 3) != 0 {
                    PrgSize::Size16k
                } else {
                    PrgSize::Size32k
                };
                self.chr_mode = if self.accumulator & (1 << 4) != 0 {
                    ChrMode::Mode4k
                } else {
                    ChrMode::Mode8k
                };
            }
            0xA000..=0xBFFF => self.chr_bank_0 = self.accumulator & 0x1F,
            0xC000..=0xDFFF => self.chr_bank_1 = self.accumulator & 0x1F,
            _ => self.prg_bank = self.accumulator & 0x0F,
        }
    }

    fn last_bank_offset(&self) -> usize {
        self.rom.prg_rom.len() - PRG_ROM_BANK_SIZE
    }

    fn chr_offset(&self, addr: u16) -> usize {
        match self.chr_mode {
            ChrMode::Mode4k => {
                if addr < 0x1000 {
                    self.chr_bank_0 as usize * 0x1000 + addr as usize
                } else {
                    self.chr_bank_1 as usize * 0x1000 + (addr & 0x0FFF) as usize
                }
            }
            // The low bank bit is ignored: one 8 KiB view.
            ChrMode::Mode8k => (self.chr_bank_0 >> 1) as usize * 0x2000 + addr as usize,
        }
    }
}

impl Mapper for SxromCart {
    fn prg_load(&mut self, addr: u16) -> u8 {
        if addr < 0x8000 {
            return prg_ram_load(&self.rom, addr);
        }

        let prg_len = self.rom.prg_rom.len();
        let offset = match self.prg_size {
            PrgSize::Size32k => {
                (self.prg_bank >> 1) as usize * 0x8000 + (addr & 0x7FFF) as usize
            }
            PrgSize::Size16k => {
                let bank = if addr < 0xC000 {
                    if self.slot_select {
                        self.prg_bank as usize
                    } else {
                        0
                    }
                } else if self.slot_select {
                    self.last_bank_offset() / PRG_ROM_BANK_SIZE
                } else {
                    self.prg_bank as usize
                };
                bank * PRG_ROM_BANK_SIZE + (addr & 0x3FFF) as usize
            }
        };
        self.rom.prg_rom[offset % prg_len]
    }

    fn prg_store(&mut self, addr: u16, val: u8) {
        if addr < 0x8000 {
            prg_ram_store(&mut self.rom, addr, val);
        } else {
            self.register_write(addr, val);
        }
    }

    fn chr_load(&mut self, addr: u16) -> u8 {
        let offset = self.chr_offset(addr);
        if self.chr_ram.is_empty() {
            self.rom.chr_rom[offset % self.rom.chr_rom.len()]
        } else {
            self.chr_ram[offset % self.chr_ram.len()]
        }
    }

    fn chr_store(&mut self, addr: u16, val: u8) {
        let offset = self.chr_offset(addr);
        if self.chr_ram.is_empty() {
            let len = self.rom.chr_rom.len();
            self.rom.chr_rom[offset % len] = val;
        } else {
            let len = self.chr_ram.len();
            self.chr_ram[offset % len] = val;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn snapshot(&self) -> MapperState {
        MapperState::Sxrom {
            mirroring: self.mirroring,
            prg_size: self.prg_size,
            chr_mode: self.chr_mode,
            slot_select: self.slot_select,
            chr_bank_0: self.chr_bank_0,
            chr_bank_1: self.chr_bank_1,
            prg_bank: self.prg_bank,
            accumulator: self.accumulator,
            write_count: self.write_count,
            prg_ram: self.rom.prg_ram.clone(),
            chr_ram: self.chr_ram.clone(),
        }
    }

    fn restore(&mut self, state: &MapperState) {
        if let MapperState::Sxrom {
            mirroring,
            prg_size,
            chr_mode,
            slot_select,
            chr_bank_0,
            chr_bank_1,
            prg_bank,
            accumulator,
            write_count,
            prg_ram,
            chr_ram,
        } = state
        {
            self.mirroring = *mirroring;
            self.prg_size = *prg_size;
            self.chr_mode = *chr_mode;
            self.slot_select = *slot_select;
            self.chr_bank_0 = *chr_bank_0;
            self.chr_bank_1 = *chr_bank_1;
            self.prg_bank = *prg_bank;
            self.accumulator = *accumulator;
            self.write_count = *write_count;
            self.rom.prg_ram.clone_from(prg_ram);
            self.chr_ram.clone_from(chr_ram);
        }
    }
}
