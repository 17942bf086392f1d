use super::rom::{Mirroring, Rom, CHR_ROM_BANK_SIZE, PRG_ROM_BANK_SIZE};
use super::{chr_ram_for, prg_ram_load, prg_ram_store, Mapper};
use crate::snapshot::MapperState;

/// Mapper 3. PRG is fixed as on NROM; a 2-bit latch selects one of
/// four 8 KiB CHR banks.
pub struct CnromCart {
    rom: Rom,
    chr_ram: Vec<u8>,
    mirroring: Mirroring,
    chr_bank: u8,
}

impl CnromCart {
    pub fn new(rom: Rom) -> CnromCart {
        let chr_ram = chr_ram_for(&rom);
        let mirroring = rom.header.mirroring;
        CnromCart {
            rom,
            chr_ram,
            mirroring,
            chr_bank: 0,
        }
    }

    fn chr_offset(&self, addr: u16) -> usize {
        self.chr_bank as usize * CHR_ROM_BANK_SIZE + addr as usize
    }
}

impl Mapper for CnromCart {
    fn prg_load(&mut self, addr: u16) -> u8 {
        if addr < 0x8000 {
            prg_ram_load(&self.rom, addr)
        } else if self.rom.prg_rom.len() == PRG_ROM_BANK_SIZE {
            self.rom.prg_rom[(addr & 0x3FFF) as usize]
        } else {
            self.rom.prg_rom[(addr & 0x7FFF) as usize]
        }
    }

    fn prg_store(&mut self, addr: u16, val: u8) {
        if addr < 0x8000 {
            prg_ram_store(&mut self.rom, addr, val);
        } else {
            // Games write values like $FF to select bank 3; only the
            // low two bits exist.
            self.chr_bank = val & 0x03;
        }
    }

    fn chr_load(&mut self, addr: u16) -> u8 {
        if self.chr_ram.is_empty() {
            self.rom.chr_rom[self.chr_offset(addr) % self.rom.chr_rom.len()]
        } else {
            self.chr_ram[addr as usize]
        }
    }

    fn chr_store(&mut self, addr: u16, val: u8) {
        if let Some(slot) = self.chr_ram.get_mut(addr as usize) {
            *slot = val;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn snapshot(&self) -> MapperState {
        MapperState::Cnrom {
            chr_bank: self.chr_bank,
            prg_ram: self.rom.prg_ram.clone(),
        }
    }

    fn restore(&mut self, state: &MapperState) {
        if let MapperState::Cnrom { chr_bank, prg_ram } = state {
            self.chr_bank = *chr_bank;
            self.rom.prg_ram.clone_from(prg_ram);
        }
    }
}
