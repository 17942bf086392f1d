use super::rom::{Mirroring, Rom, PRG_ROM_BANK_SIZE};
use super::{chr_load_fixed, chr_ram_for, chr_store_fixed, prg_ram_load, prg_ram_store, Mapper};
use crate::snapshot::MapperState;

/// Mapper 0. No bank switching: a single 16 KiB PRG bank mirrored
/// across the 32 KiB window, or two banks mapped flat.
pub struct NromCart {
    pub(crate) rom: Rom,
    pub(crate) chr_ram: Vec<u8>,
    mirroring: Mirroring,
}

impl NromCart {
    pub fn new(rom: Rom) -> NromCart {
        let chr_ram = chr_ram_for(&rom);
        let mirroring = rom.header.mirroring;
        NromCart {
            rom,
            chr_ram,
            mirroring,
        }
    }
}

impl Mapper for NromCart {
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
        MapperState::Nrom {
            prg_ram: self.rom.prg_ram.clone(),
            chr_ram: self.chr_ram.clone(),
        }
    }

    fn restore(&mut self, state: &MapperState) {
        if let MapperState::Nrom { prg_ram, chr_ram } = state {
            self.rom.prg_ram.clone_from(prg_ram);
            self.chr_ram.clone_from(chr_ram);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn nrom(prg_banks: usize, chr_banks: usize) -> NromCart {
        let prg: Vec<u8> = (0..prg_banks * PRG_ROM_BANK_SIZE)
            .map(|i| (i >> 8) as u8)
            .collect();
        let chr = vec![0u8; chr_banks * 0x2000];
        NromCart::new(Rom::new_custom(prg, chr, 0, Mirroring::Vertical))
    }

    #[test]
    fn single_bank_mirrors_upper_half() {
        let mut cart = nrom(1, 1);
        assert_eq!(cart.prg_load(0x8123), cart.prg_load(0xC123));
    }

    #[test]
    fn two_banks_map_flat() {
        let mut cart = nrom(2, 1);
        assert_eq!(cart.prg_load(0x8000), cart.rom.prg_rom[0x0000]);
        assert_eq!(cart.prg_load(0xC000), cart.rom.prg_rom[0x4000]);
    }

    #[test]
    fn prg_ram_window_reads_back() {
        let mut cart = nrom(1, 1);
        cart.prg_store(0x6000, 0xAA);
        cart.prg_store(0x7FFF, 0xBB);
        assert_eq!(cart.prg_load(0x6000), 0xAA);
        assert_eq!(cart.prg_load(0x7FFF), 0xBB);
    }

    #[test]
    fn chr_rom_discards_writes() {
        let mut cart = nrom(1, 1);
        cart.chr_store(0x0000, 0x42);
        assert_eq!(cart.chr_load(0x0000), 0x00);
    }

    #[test]
    fn chr_ram_accepts_writes_when_no_chr_rom() {
        let mut cart = nrom(1, 0);
        cart.chr_store(0x1FFF, 0x42);
        assert_eq!(cart.chr_load(0x1FFF), 0x42);
    }
}
