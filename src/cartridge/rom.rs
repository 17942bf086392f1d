use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cartridge::mapper000_nrom::NromCart;
use crate::cartridge::mapper001_sxrom::SxromCart;
use crate::cartridge::mapper002_unrom::UnromCart;
use crate::cartridge::mapper003_cnrom::CnromCart;
use crate::cartridge::SharedMapper;

const NES_MAGIC_BYTES: &[u8; 4] = b"NES\x1A";
const HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;

pub const PRG_ROM_BANK_SIZE: usize = 0x4000;
pub const CHR_ROM_BANK_SIZE: usize = 0x2000;
pub const PRG_RAM_UNIT_SIZE: usize = 0x2000;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("truncated iNES image: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("unsupported iNES version: v{0}")]
    UnsupportedVersion(u8),

    #[error("unsupported mapper: {0}")]
    UnsupportedMapper(u8),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    SingleScreenLower,
    SingleScreenUpper,
}

/// The 16-byte iNES header, after corruption cleanup.
#[derive(Copy, Clone, Debug)]
pub struct InesHeader {
    /// PRG-ROM size in 16 KiB banks.
    pub prg_rom_banks: u8,
    /// CHR-ROM size in 8 KiB banks. Zero means the cartridge carries
    /// CHR-RAM instead.
    pub chr_rom_banks: u8,
    /// PRG-RAM size in 8 KiB units; zero is read as one unit.
    pub prg_ram_units: u8,
    pub mapper: u8,
    pub mirroring: Mirroring,
    pub has_trainer: bool,
    pub has_battery: bool,
}

/// Parsed cartridge image: header plus the program ROM, character ROM
/// and battery-backed program RAM byte vectors. ROM vectors are
/// read-only after load; PRG-RAM is mutated through the mapper.
pub struct Rom {
    pub header: InesHeader,
    pub prg_rom: Vec<u8>,
    pub chr_rom: Vec<u8>,
    pub prg_ram: Vec<u8>,
}

impl Rom {
    pub fn parse(raw: &[u8]) -> Result<Rom, RomError> {
        if raw.len() < HEADER_SIZE {
            return Err(RomError::Truncated {
                expected: HEADER_SIZE,
                found: raw.len(),
            });
        }
        if &raw[0..4] != NES_MAGIC_BYTES {
            return Err(RomError::InvalidFormat("not an iNES file".into()));
        }

        let mut header = [0u8; HEADER_SIZE];
        header.copy_from_slice(&raw[..HEADER_SIZE]);

        // Some historical ROM dumps carry "DiskDude!" advertising in
        // bytes 7..15. Zero the tail before interpreting any of it.
        if &header[7..16] == b"DiskDude!" {
            header[7..16].fill(0);
        }

        let flags6 = header[6];
        let flags7 = header[7];

        let ines_ver = (flags7 >> 2) & 0b11;
        if ines_ver != 0 {
            return Err(RomError::UnsupportedVersion(2));
        }

        let mapper = (flags7 & 0xF0) | (flags6 >> 4);
        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let has_trainer = flags6 & 0b100 != 0;
        let has_battery = flags6 & 0b010 != 0;

        let prg_rom_banks = header[4];
        let chr_rom_banks = header[5];
        let prg_ram_units = header[8];

        if prg_rom_banks == 0 {
            return Err(RomError::InvalidFormat("image declares no PRG-ROM".into()));
        }

        let prg_rom_size = prg_rom_banks as usize * PRG_ROM_BANK_SIZE;
        let chr_rom_size = chr_rom_banks as usize * CHR_ROM_BANK_SIZE;

        let prg_rom_start = HEADER_SIZE + if has_trainer { TRAINER_SIZE } else { 0 };
        let chr_rom_start = prg_rom_start + prg_rom_size;

        let expected = chr_rom_start + chr_rom_size;
        if raw.len() < expected {
            return Err(RomError::Truncated {
                expected,
                found: raw.len(),
            });
        }

        Ok(Rom {
            header: InesHeader {
                prg_rom_banks,
                chr_rom_banks,
                prg_ram_units,
                mapper,
                mirroring,
                has_trainer,
                has_battery,
            },
            prg_rom: raw[prg_rom_start..chr_rom_start].to_vec(),
            chr_rom: raw[chr_rom_start..expected].to_vec(),
            prg_ram: vec![0; prg_ram_units.max(1) as usize * PRG_RAM_UNIT_SIZE],
        })
    }

    #[cfg(test)]
    pub fn new_custom(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mapper: u8, mirroring: Mirroring) -> Rom {
        Rom {
            header: InesHeader {
                prg_rom_banks: (prg_rom.len() / PRG_ROM_BANK_SIZE) as u8,
                chr_rom_banks: (chr_rom.len() / CHR_ROM_BANK_SIZE) as u8,
                prg_ram_units: 1,
                mapper,
                mirroring,
                has_trainer: false,
                has_battery: false,
            },
            prg_rom,
            chr_rom,
            prg_ram: vec![0; PRG_RAM_UNIT_SIZE],
        }
    }

    pub fn into_mapper(self) -> Result<SharedMapper, RomError> {
        match self.header.mapper {
            0 => Ok(Rc::new(RefCell::new(NromCart::new(self)))),
            1 => Ok(Rc::new(RefCell::new(SxromCart::new(self)))),
            2 => Ok(Rc::new(RefCell::new(UnromCart::new(self)))),
            3 => Ok(Rc::new(RefCell::new(CnromCart::new(self)))),
            id => Err(RomError::UnsupportedMapper(id)),
        }
    }
}
