use crate::bus::consts::*;
use crate::bus::ram::Ram;
use crate::bus::{ApuDevice, BusDevice, InputDevice, PpuDevice};
use crate::cartridge::SharedMapper;
use crate::trace;

/// The memory map seen by the CPU. Stateless routing by address range:
/// everything below $2000 is RAM, $2000-$3FFF the PPU register window,
/// $4000-$401F the APU and controller registers, $4020-$5FFF is open,
/// and $6000 and up belongs to the cartridge.
pub struct CpuBus {
    pub ram: Ram,
    pub mapper: SharedMapper,
    pub ppu: Box<dyn PpuDevice>,
    pub apu: Box<dyn ApuDevice>,
    pub input: Box<dyn InputDevice>,
}

impl CpuBus {
    pub fn new(
        mapper: SharedMapper,
        ppu: Box<dyn PpuDevice>,
        apu: Box<dyn ApuDevice>,
        input: Box<dyn InputDevice>,
    ) -> CpuBus {
        CpuBus {
            ram: Ram::new(),
            mapper,
            ppu,
            apu,
            input,
        }
    }

    /// Copies the 256-byte page `page << 8` out of CPU memory and hands
    /// it to the PPU in one shot. Reading through `load` means the page
    /// may come from RAM, PRG-RAM or PRG-ROM alike.
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        let mut buffer = [0u8; 256];
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = self.load(base.wrapping_add(i as u16));
        }
        trace!("[BUS] OAM DMA from page ${:02X}00", page);
        self.ppu.oam_dma(&buffer);
    }
}

impl BusDevice for CpuBus {
    fn load(&mut self, addr: u16) -> u8 {
        match addr {
            RAM_START..=RAM_END => self.ram.load(addr),
            PPU_REGISTERS_START..=PPU_REGISTERS_END => self.ppu.load(addr),
            APU_REGISTERS_START..=APU_REGISTERS_END => self.apu.load(addr),
            INPUT_REGISTERS_START..=INPUT_REGISTERS_END => self.input.load(addr),
            EXPANSION_START..=EXPANSION_END => 0,
            CART_START..=CART_END => self.mapper.borrow_mut().prg_load(addr),
        }
    }

    fn store(&mut self, addr: u16, val: u8) {
        match addr {
            RAM_START..=RAM_END => self.ram.store(addr, val),
            PPU_REGISTERS_START..=PPU_REGISTERS_END => self.ppu.store(addr, val),
            OAM_DMA_REGISTER => self.oam_dma(val),
            APU_REGISTERS_START..=APU_REGISTERS_END => self.apu.store(addr, val),
            INPUT_REGISTERS_START..=INPUT_REGISTERS_END => self.input.store(addr, val),
            EXPANSION_START..=EXPANSION_END => {}
            CART_START..=CART_END => self.mapper.borrow_mut().prg_store(addr, val),
        }
    }
}
