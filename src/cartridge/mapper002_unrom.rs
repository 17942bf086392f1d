use super::rom::{Mirroring, Rom, PRG_ROM_BANK_SIZE};
use super::{chr_load_fixed, chr_ram_for, chr_store_fixed, prg_ram_load, prg_ram_store, Mapper};
use crate::snapshot::MapperState;

/// Mapper 2. A 3-bit latch switches the 16 KiB bank at $8000-$BFFF;
/// $C000 and up is fixed at the last bank. PRG-RAM and CHR behave as
/// on NROM.
pub struct UnromCart {
    rom: Rom,
    chr_ram: Vec<u8>,
    mirroring: Mirroring,
    prg_bank: u8,
    last_bank_offset: usize,
}

impl UnromCart {
    pub fn new(rom: Rom) -> UnromCart {
        let chr_ram = chr_ram_for(&rom);
        let mirroring = rom.header.mirroring;
        let last_bank_offset = rom.prg_rom.len() - PRG_ROM_BANK_SIZE;
        UnromCart {
            rom,
            chr_ram,
            mirroring,
            prg_bank: 0,
            last_bank_offset,
        }
    }

    fn prg_bank_count(&self) -> usize {
        self.rom.prg_rom.len() / PRG_ROM_BANK_SIZE
    }
}

impl Mapper for UnromCart {
    fn prg_load(&mut self, addr: u16) -> u8 {
        if addr < 0x8000 {
            prg_ram_load(&self.rom, addr)
        } else if addr >= 0xC000 {
            self.rom.prg_rom[self.last_bank_offset + (addr & 0x3FFF) as usize]
        } else {
            let bank = self.prg_bank as usize % self.prg_bank_count();
            self.rom.prg_rom[bank * PRG_ROM_BANK_SIZE + (addr & 0x3FFF) as usize]
        }
    }

    fn prg_store(&mut self, addr: u16, val: u8) {
        if addr < 0x8000 {
            prg_ram_store(&mut self.rom, addr, val);
        } else {
            // Eight switchable banks at most.
            self.prg_bank = val & 0x07;
        }
    }

    fn chr_load(&mut self, addr: u16) -> u8 {
        chr_load_fixed(&self.rom, &self.chr_ram, addr)
    }

    fn chr_store(&mut self, addr: u16, val: u8) {
        chr_store_fixed(&mut self.chr_ram, addr, val);
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn snapshot(&self) -> MapperState {
        MapperState::Unrom {
            prg_bank: self.prg_bank,
            prg_ram: self.rom.prg_ram.clone(),
            chr_ram: self.chr_ram.clone(),
        }
    }

    fn restore(&mut self, state: &MapperState) {
        if let MapperState::Unrom {
            prg_bank,
            prg_ram,
            chr_ram,
        } = state
        {
            self.prg_bank = *prg_bank;
            self.rom.prg_ram.clone_from(prg_ram);
            self.chr_ram.clone_from(chr_ram);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn unrom(prg_banks: usize) -> UnromCart {
        let prg: Vec<u8> = (0..prg_banks * PRG_ROM_BANK_SIZE)
            .map(|i| (i / PRG_ROM_BANK_SIZE) as u8)
            .collect();
        UnromCart::new(Rom::new_custom(prg, Vec::new(), 2, Mirroring::Vertical))
    }

    #[test]
    fn writes_switch_the_low_window() {
        let mut cart = unrom(8);
        cart.prg_store(0x8000, 0x05);
        assert_eq!(cart.prg_load(0x8000), 5);
        assert_eq!(cart.prg_load(0xBFFF), 5);
    }

    #[test]
    fn bank_latch_masks_to_three_bits() {
        let mut cart = unrom(8);
        cart.prg_store(0x8000, 0xFF);
        assert_eq!(cart.prg_load(0x8000), 7);
    }

    #[test]
    fn high_window_is_fixed_at_last_bank_from_0xc000_inclusive() {
        let mut cart = unrom(8);
        cart.prg_store(0x8000, 0x02);
        // $C000 itself belongs to the fixed bank, not the switched one.
        assert_eq!(cart.prg_load(0xC000), 7);
        assert_eq!(cart.prg_load(0xFFFF), 7);
    }

    #[test]
    fn prg_ram_window_behaves_like_nrom() {
        let mut cart = unrom(2);
        cart.prg_store(0x6123, 0x99);
        assert_eq!(cart.prg_load(0x6123), 0x99);
    }
}
