use bitflags::bitflags;
use std::collections::HashMap;
use thiserror::Error;

use crate::bus::BusDevice;
use crate::trace;
use crate::tracer::TraceSource;
use opcodes::{AddressingMode, Opcode, OPCODES_MAP};

pub mod interrupts;
pub mod opcodes;


pub const CPU_STACK_RESET: u8 = 0xFD;
const CPU_STACK_BASE: u16 = 0x0100;

bitflags! {
    /* https://www.nesdev.org/wiki/Status_flags
           7  bit  0
           ---- ----
           NV1B DIZC
           |||| ||||
           |||| |||+- Carry
           |||| ||+-- Zero
           |||| |+--- Interrupt Disable
           |||| +---- Decimal (stored but never consulted on the NES)
           |||+------ Break (only ever materializes on the stack)
           ||+------- (always reads as 1)
           |+-------- Overflow
           +--------- Negative
    */
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Flags: u8 {
        const CARRY             = 1 << 0;
        const ZERO              = 1 << 1;
        const INTERRUPT_DISABLE = 1 << 2;
        const DECIMAL_MODE      = 1 << 3;
        const BREAK             = 1 << 4;
        const UNUSED            = 1 << 5;
        const OVERFLOW          = 1 << 6;
        const NEGATIVE          = 1 << 7;
    }
}

#[derive(Debug, Error)]
pub enum CpuError {
    /// Almost always an emulator bug rather than a cartridge bug, so
    /// the step aborts instead of treating the byte as a NOP.
    #[error("unknown opcode ${opcode:02X} at PC ${program_counter:04X}")]
    UnknownOpcode { opcode: u8, program_counter: u16 },
}

pub struct CPU<B: BusDevice> {
    pub bus: B,

    pub register_a: u8,
    pub register_x: u8,
    pub register_y: u8,
    pub stack_pointer: u8,
    pub status: Flags,
    pub program_counter: u16,

    /// Total cycles retired, for clocking the PPU and APU.
    pub cycles: u64,

    nmi_pending: bool,
    irq_pending: bool,
    extra_cycles: u8,
    skip_pc_advance: bool,
}

impl<B: BusDevice> CPU<B> {
    pub fn new(bus: B) -> CPU<B> {
        CPU {
            bus,
            register_a: 0,
            register_x: 0,
            register_y: 0,
            stack_pointer: CPU_STACK_RESET,
            status: Flags::UNUSED | Flags::DECIMAL_MODE,
            program_counter: 0,
            cycles: 0,
            nmi_pending: false,
            irq_pending: false,
            extra_cycles: 0,
            skip_pc_advance: false,
        }
    }

    /// Power-on / reset sequence: the stack pointer and interrupt mask
    /// are forced, PC comes from the reset vector. RAM is left alone,
    /// as on the real machine.
    pub fn reset(&mut self) {
        self.stack_pointer = CPU_STACK_RESET;
        self.status.insert(Flags::INTERRUPT_DISABLE);
        self.program_counter = self.bus.load_word(interrupts::RESET_VECTOR);
        self.nmi_pending = false;
        self.irq_pending = false;
    }

    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    pub fn trigger_irq(&mut self) {
        self.irq_pending = true;
    }

    /// Retires one instruction and returns the cycles it consumed.
    /// Pending interrupts are taken first, between instructions, never
    /// mid-instruction.
    pub fn step(&mut self) -> Result<u8, CpuError> {
        if self.nmi_pending {
            self.nmi_pending = false;
            return Ok(self.enter_interrupt(interrupts::NMI));
        }
        if self.irq_pending && !self.status.contains(Flags::INTERRUPT_DISABLE) {
            self.irq_pending = false;
            return Ok(self.enter_interrupt(interrupts::IRQ));
        }

        let opcodes: &HashMap<u8, &'static Opcode> = &OPCODES_MAP;

        self.extra_cycles = 0;
        self.skip_pc_advance = false;
        let code = self.bus.load(self.program_counter);
        let opcode = *opcodes.get(&code).ok_or(CpuError::UnknownOpcode {
            opcode: code,
            program_counter: self.program_counter,
        })?;

        trace!(
            "[CPU] ${:04X} {} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
            self.program_counter,
            opcode.name,
            self.register_a,
            self.register_x,
            self.register_y,
            self.status.bits(),
            self.stack_pointer
        );

        self.program_counter = self.program_counter.wrapping_add(1);

        match code {
            0x00 => self.brk(),
            0xEA => {} // NOP

            0x4C | 0x6C => self.jmp(opcode),
            0x20 => self.jsr(opcode),
            0x60 => self.rts(),
            0x40 => self.rti(),

            0xAA => self.tax(),
            0xA8 => self.tay(),
            0xBA => self.tsx(),
            0x8A => self.txa(),
            0x9A => self.txs(),
            0x98 => self.tya(),

            0x18 => self.clc(),
            0x38 => self.sec(),
            0x58 => self.cli(),
            0x78 => self.sei(),
            0xB8 => self.clv(),
            0xD8 => self.cld(),
            0xF8 => self.sed(),

            0x10 => self.bpl(),
            0x30 => self.bmi(),
            0x50 => self.bvc(),
            0x70 => self.bvs(),
            0x90 => self.bcc(),
            0xB0 => self.bcs(),
            0xD0 => self.bne(),
            0xF0 => self.beq(),

            0xE8 => self.inx(),
            0xC8 => self.iny(),
            0xCA => self.dex(),
            0x88 => self.dey(),

            0x48 => self.pha(),
            0x68 => self.pla(),
            0x08 => self.php(),
            0x28 => self.plp(),

            0x24 | 0x2C => self.bit(opcode),

            0xA9 | 0xA5 | 0xB5 | 0xAD | 0xBD | 0xB9 | 0xA1 | 0xB1 => self.lda(opcode),
            0xA2 | 0xA6 | 0xB6 | 0xAE | 0xBE => self.ldx(opcode),
            0xA0 | 0xA4 | 0xB4 | 0xAC | 0xBC => self.ldy(opcode),
            0x85 | 0x95 | 0x8D | 0x9D | 0x99 | 0x81 | 0x91 => self.sta(opcode),
            0x86 | 0x96 | 0x8E => self.stx(opcode),
            0x84 | 0x94 | 0x8C => self.sty(opcode),

            0x0A | 0x06 | 0x16 | 0x0E | 0x1E => self.asl(opcode),
            0x4A | 0x46 | 0x56 | 0x4E | 0x5E => self.lsr(opcode),
            0x2A | 0x26 | 0x36 | 0x2E | 0x3E => self.rol(opcode),
            0x6A | 0x66 | 0x76 | 0x6E | 0x7E => self.ror(opcode),

            0xE6 | 0xF6 | 0xEE | 0xFE => self.inc(opcode),
            0xC6 | 0xD6 | 0xCE | 0xDE => self.dec(opcode),

            0xC9 | 0xC5 | 0xD5 | 0xCD | 0xDD | 0xD9 | 0xC1 | 0xD1 => self.cmp(opcode),
            0xE0 | 0xE4 | 0xEC => self.cpx(opcode),
            0xC0 | 0xC4 | 0xCC => self.cpy(opcode),

            0x69 | 0x65 | 0x75 | 0x6D | 0x7D | 0x79 | 0x61 | 0x71 => self.adc(opcode),
            0xE9 | 0xE5 | 0xF5 | 0xED | 0xFD | 0xF9 | 0xE1 | 0xF1 => self.sbc(opcode),
            0x29 | 0x25 | 0x35 | 0x2D | 0x3D | 0x39 | 0x21 | 0x31 => self.and(opcode),
            0x49 | 0x45 | 0x55 | 0x4D | 0x5D | 0x59 | 0x41 | 0x51 => self.eor(opcode),
            0x09 | 0x05 | 0x15 | 0x0D | 0x1D | 0x19 | 0x01 | 0x11 => self.ora(opcode),

            // The table and this dispatch cover the same opcode set.
            _ => unreachable!("opcode ${:02X} in table but not dispatched", code),
        }

        // Advance PC by the operand bytes unless a jump/branch already
        // moved it; the opcode byte itself was consumed above.
        if !self.skip_pc_advance {
            self.program_counter = self.program_counter.wrapping_add((opcode.size - 1) as u16);
        }

        let cycle_count = opcode.cycles + self.extra_cycles;
        self.cycles += cycle_count as u64;
        Ok(cycle_count)
    }

    fn enter_interrupt(&mut self, interrupt: interrupts::Interrupt) -> u8 {
        self.stack_push_word(self.program_counter);
        let mut pushed = self.status;
        pushed.remove(Flags::BREAK);
        pushed.insert(Flags::UNUSED);
        self.stack_push(pushed.bits());
        self.status.insert(Flags::INTERRUPT_DISABLE);
        self.program_counter = self.bus.load_word(interrupt.vector);
        self.cycles += interrupt.cycles as u64;
        interrupt.cycles
    }

    // Addressing
    /////////////

    /// Resolves an addressing mode to an effective address, reading
    /// operand bytes at PC without consuming them (the table-driven PC
    /// advance in `step` accounts for them). The second element reports
    /// a page crossing for the modes that can incur the penalty cycle.
    fn operand_address(&mut self, mode: &AddressingMode) -> (u16, bool) {
        match mode {
            AddressingMode::Immediate => (self.program_counter, false),
            AddressingMode::ZeroPage => (self.bus.load(self.program_counter) as u16, false),
            AddressingMode::ZeroPageX => {
                let base = self.bus.load(self.program_counter);
                (base.wrapping_add(self.register_x) as u16, false)
            }
            AddressingMode::ZeroPageY => {
                let base = self.bus.load(self.program_counter);
                (base.wrapping_add(self.register_y) as u16, false)
            }
            AddressingMode::Absolute => (self.bus.load_word(self.program_counter), false),
            AddressingMode::AbsoluteX => {
                let base = self.bus.load_word(self.program_counter);
                let addr = base.wrapping_add(self.register_x as u16);
                (addr, page_crossed(base, addr))
            }
            AddressingMode::AbsoluteY => {
                let base = self.bus.load_word(self.program_counter);
                let addr = base.wrapping_add(self.register_y as u16);
                (addr, page_crossed(base, addr))
            }
            AddressingMode::IndirectX => {
                let base = self.bus.load(self.program_counter);
                let ptr = base.wrapping_add(self.register_x);
                (self.load_word_zero_page(ptr), false)
            }
            AddressingMode::IndirectY => {
                let ptr = self.bus.load(self.program_counter);
                let base = self.load_word_zero_page(ptr);
                let addr = base.wrapping_add(self.register_y as u16);
                (addr, page_crossed(base, addr))
            }
            AddressingMode::Indirect => {
                /* An original 6502 does not correctly fetch the target
                   address if the indirect vector falls on a page
                   boundary: it takes the LSB from $xxFF as expected but
                   the MSB from $xx00 instead of the next page. */
                let ptr = self.bus.load_word(self.program_counter);
                let target = if ptr & 0x00FF == 0x00FF {
                    let lo = self.bus.load(ptr) as u16;
                    let hi = self.bus.load(ptr & 0xFF00) as u16;
                    hi << 8 | lo
                } else {
                    self.bus.load_word(ptr)
                };
                (target, false)
            }
            AddressingMode::Implied | AddressingMode::Accumulator | AddressingMode::Relative => {
                unreachable!("mode carries no memory operand")
            }
        }
    }

    /// Word read where the high-byte address wraps within page zero.
    fn load_word_zero_page(&mut self, base: u8) -> u16 {
        let lo = self.bus.load(base as u16) as u16;
        let hi = self.bus.load(base.wrapping_add(1) as u16) as u16;
        hi << 8 | lo
    }

    // Register and stack helpers
    /////////////////////////////

    fn set_register_a(&mut self, value: u8) {
        self.register_a = value;
        self.update_zero_and_negative_flags(value);
    }

    fn set_register_x(&mut self, value: u8) {
        self.register_x = value;
        self.update_zero_and_negative_flags(value);
    }

    fn set_register_y(&mut self, value: u8) {
        self.register_y = value;
        self.update_zero_and_negative_flags(value);
    }

    fn set_program_counter(&mut self, address: u16) {
        self.program_counter = address;
        self.skip_pc_advance = true;
    }

    fn stack_push(&mut self, value: u8) {
        let address = CPU_STACK_BASE.wrapping_add(self.stack_pointer as u16);
        self.bus.store(address, value);
        self.stack_pointer = self.stack_pointer.wrapping_sub(1);
    }

    fn stack_push_word(&mut self, value: u16) {
        self.stack_push((value >> 8) as u8);
        self.stack_push(value as u8);
    }

    fn stack_pop(&mut self) -> u8 {
        self.stack_pointer = self.stack_pointer.wrapping_add(1);
        self.bus
            .load(CPU_STACK_BASE.wrapping_add(self.stack_pointer as u16))
    }

    fn stack_pop_word(&mut self) -> u16 {
        let lo = self.stack_pop() as u16;
        let hi = self.stack_pop() as u16;
        hi << 8 | lo
    }

    fn update_zero_and_negative_flags(&mut self, result: u8) {
        self.status.set(Flags::ZERO, result == 0);
        self.status.set(Flags::NEGATIVE, result & 0x80 != 0);
    }

    fn add_to_register_a(&mut self, value: u8) {
        let carry_in = self.status.contains(Flags::CARRY) as u16;
        let sum = self.register_a as u16 + value as u16 + carry_in;
        let result = sum as u8;

        // Signed overflow: both inputs share a sign the result lacks.
        let overflow = (self.register_a ^ result) & (value ^ result) & 0x80 != 0;

        self.status.set(Flags::CARRY, sum > 0xFF);
        self.status.set(Flags::OVERFLOW, overflow);
        self.register_a = result;
        self.update_zero_and_negative_flags(result);
    }

    fn compare(&mut self, opcode: &Opcode, register: u8) {
        let (address, crossed) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address);
        self.status.set(Flags::CARRY, register >= value);
        self.update_zero_and_negative_flags(register.wrapping_sub(value));
        self.extra_cycles += crossed as u8;
    }

    fn branch(&mut self, condition: bool) {
        let operand_pc = self.program_counter;
        let offset = self.bus.load(operand_pc) as i8;
        let target = operand_pc
            .wrapping_add(1)
            .wrapping_add(offset as i16 as u16);
        if condition {
            self.extra_cycles += if page_crossed(operand_pc, target) { 2 } else { 1 };
            self.set_program_counter(target);
        }
    }

    // Loads and stores
    ///////////////////

    fn lda(&mut self, opcode: &Opcode) {
        let (address, crossed) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address);
        self.set_register_a(value);
        self.extra_cycles += crossed as u8;
    }

    fn ldx(&mut self, opcode: &Opcode) {
        let (address, crossed) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address);
        self.set_register_x(value);
        self.extra_cycles += crossed as u8;
    }

    fn ldy(&mut self, opcode: &Opcode) {
        let (address, crossed) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address);
        self.set_register_y(value);
        self.extra_cycles += crossed as u8;
    }

    fn sta(&mut self, opcode: &Opcode) {
        let (address, _) = self.operand_address(&opcode.mode);
        self.bus.store(address, self.register_a);
    }

    fn stx(&mut self, opcode: &Opcode) {
        let (address, _) = self.operand_address(&opcode.mode);
        self.bus.store(address, self.register_x);
    }

    fn sty(&mut self, opcode: &Opcode) {
        let (address, _) = self.operand_address(&opcode.mode);
        self.bus.store(address, self.register_y);
    }

    // Register transfers
    /////////////////////

    fn tax(&mut self) {
        self.set_register_x(self.register_a);
    }

    fn tay(&mut self) {
        self.set_register_y(self.register_a);
    }

    fn tsx(&mut self) {
        self.set_register_x(self.stack_pointer);
    }

    fn txa(&mut self) {
        self.set_register_a(self.register_x);
    }

    fn txs(&mut self) {
        // The one transfer that leaves the flags alone.
        self.stack_pointer = self.register_x;
    }

    fn tya(&mut self) {
        self.set_register_a(self.register_y);
    }

    // Stack operations
    ///////////////////

    fn pha(&mut self) {
        self.stack_push(self.register_a);
    }

    fn pla(&mut self) {
        let value = self.stack_pop();
        self.set_register_a(value);
    }

    fn php(&mut self) {
        // Break and bit 5 are always set in the pushed copy.
        let mut pushed = self.status;
        pushed.insert(Flags::BREAK | Flags::UNUSED);
        self.stack_push(pushed.bits());
    }

    fn plp(&mut self) {
        self.status = Flags::from_bits_truncate(self.stack_pop());
        self.status.remove(Flags::BREAK);
        self.status.insert(Flags::UNUSED);
    }

    // Arithmetic
    /////////////

    fn adc(&mut self, opcode: &Opcode) {
        let (address, crossed) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address);
        self.add_to_register_a(value);
        self.extra_cycles += crossed as u8;
    }

    fn sbc(&mut self, opcode: &Opcode) {
        let (address, crossed) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address);
        // A - M - (1-C) == A + !M + C, carry acting as inverted borrow.
        self.add_to_register_a(value ^ 0xFF);
        self.extra_cycles += crossed as u8;
    }

    // Logical
    //////////

    fn and(&mut self, opcode: &Opcode) {
        let (address, crossed) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address);
        self.set_register_a(self.register_a & value);
        self.extra_cycles += crossed as u8;
    }

    fn eor(&mut self, opcode: &Opcode) {
        let (address, crossed) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address);
        self.set_register_a(self.register_a ^ value);
        self.extra_cycles += crossed as u8;
    }

    fn ora(&mut self, opcode: &Opcode) {
        let (address, crossed) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address);
        self.set_register_a(self.register_a | value);
        self.extra_cycles += crossed as u8;
    }

    // Compares and bit test
    ////////////////////////

    fn cmp(&mut self, opcode: &Opcode) {
        self.compare(opcode, self.register_a);
    }

    fn cpx(&mut self, opcode: &Opcode) {
        self.compare(opcode, self.register_x);
    }

    fn cpy(&mut self, opcode: &Opcode) {
        self.compare(opcode, self.register_y);
    }

    fn bit(&mut self, opcode: &Opcode) {
        let (address, _) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address);
        self.status.set(Flags::ZERO, self.register_a & value == 0);
        self.status.set(Flags::NEGATIVE, value & 1 << 7 != 0);
        self.status.set(Flags::OVERFLOW, value & 1 << 6 != 0);
    }

    // Shifts and rotates
    /////////////////////

    fn asl(&mut self, opcode: &Opcode) {
        if opcode.mode == AddressingMode::Accumulator {
            let carry = self.register_a & 0x80 != 0;
            let value = self.register_a << 1;
            self.set_register_a(value);
            self.status.set(Flags::CARRY, carry);
        } else {
            let (address, _) = self.operand_address(&opcode.mode);
            let mut value = self.bus.load(address);
            let carry = value & 0x80 != 0;
            value <<= 1;
            self.bus.store(address, value);
            self.update_zero_and_negative_flags(value);
            self.status.set(Flags::CARRY, carry);
        }
    }

    fn lsr(&mut self, opcode: &Opcode) {
        if opcode.mode == AddressingMode::Accumulator {
            let carry = self.register_a & 1 != 0;
            let value = self.register_a >> 1;
            self.set_register_a(value);
            self.status.set(Flags::CARRY, carry);
        } else {
            let (address, _) = self.operand_address(&opcode.mode);
            let mut value = self.bus.load(address);
            let carry = value & 1 != 0;
            value >>= 1;
            self.bus.store(address, value);
            self.update_zero_and_negative_flags(value);
            self.status.set(Flags::CARRY, carry);
        }
    }

    fn rol(&mut self, opcode: &Opcode) {
        let carry_in = self.status.contains(Flags::CARRY);
        if opcode.mode == AddressingMode::Accumulator {
            let (value, carry_out) = rotate_value_left(self.register_a, carry_in);
            self.set_register_a(value);
            self.status.set(Flags::CARRY, carry_out);
        } else {
            let (address, _) = self.operand_address(&opcode.mode);
            let value = self.bus.load(address);
            let (result, carry_out) = rotate_value_left(value, carry_in);
            self.bus.store(address, result);
            self.update_zero_and_negative_flags(result);
            self.status.set(Flags::CARRY, carry_out);
        }
    }

    fn ror(&mut self, opcode: &Opcode) {
        let carry_in = self.status.contains(Flags::CARRY);
        if opcode.mode == AddressingMode::Accumulator {
            let (value, carry_out) = rotate_value_right(self.register_a, carry_in);
            self.set_register_a(value);
            self.status.set(Flags::CARRY, carry_out);
        } else {
            let (address, _) = self.operand_address(&opcode.mode);
            let value = self.bus.load(address);
            let (result, carry_out) = rotate_value_right(value, carry_in);
            self.bus.store(address, result);
            self.update_zero_and_negative_flags(result);
            self.status.set(Flags::CARRY, carry_out);
        }
    }

    // Increments and decrements
    ////////////////////////////

    fn inc(&mut self, opcode: &Opcode) {
        let (address, _) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address).wrapping_add(1);
        self.bus.store(address, value);
        self.update_zero_and_negative_flags(value);
    }

    fn dec(&mut self, opcode: &Opcode) {
        let (address, _) = self.operand_address(&opcode.mode);
        let value = self.bus.load(address).wrapping_sub(1);
        self.bus.store(address, value);
        self.update_zero_and_negative_flags(value);
    }

    fn inx(&mut self) {
        self.set_register_x(self.register_x.wrapping_add(1));
    }

    fn iny(&mut self) {
        self.set_register_y(self.register_y.wrapping_add(1));
    }

    fn dex(&mut self) {
        self.set_register_x(self.register_x.wrapping_sub(1));
    }

    fn dey(&mut self) {
        self.set_register_y(self.register_y.wrapping_sub(1));
    }

    // Branches
    ///////////

    fn bpl(&mut self) {
        self.branch(!self.status.contains(Flags::NEGATIVE));
    }

    fn bmi(&mut self) {
        self.branch(self.status.contains(Flags::NEGATIVE));
    }

    fn bvc(&mut self) {
        self.branch(!self.status.contains(Flags::OVERFLOW));
    }

    fn bvs(&mut self) {
        self.branch(self.status.contains(Flags::OVERFLOW));
    }

    fn bcc(&mut self) {
        self.branch(!self.status.contains(Flags::CARRY));
    }

    fn bcs(&mut self) {
        self.branch(self.status.contains(Flags::CARRY));
    }

    fn bne(&mut self) {
        self.branch(!self.status.contains(Flags::ZERO));
    }

    fn beq(&mut self) {
        self.branch(self.status.contains(Flags::ZERO));
    }

    // Jumps, subroutines and interrupt control
    ///////////////////////////////////////////

    fn jmp(&mut self, opcode: &Opcode) {
        let (address, _) = self.operand_address(&opcode.mode);
        self.set_program_counter(address);
    }

    fn jsr(&mut self, opcode: &Opcode) {
        let (jump_address, _) = self.operand_address(&opcode.mode);
        // The address of the last byte of this instruction; RTS adds 1.
        let return_address = self.program_counter.wrapping_add(1);
        self.stack_push_word(return_address);
        self.set_program_counter(jump_address);
    }

    fn rts(&mut self) {
        let address = self.stack_pop_word().wrapping_add(1);
        self.set_program_counter(address);
    }

    fn rti(&mut self) {
        // Unlike RTS, the stacked address is the actual return address.
        self.plp();
        let return_address = self.stack_pop_word();
        self.set_program_counter(return_address);
    }

    fn brk(&mut self) {
        let return_address = self.program_counter.wrapping_add(1);
        self.stack_push_word(return_address);
        let mut pushed = self.status;
        pushed.insert(Flags::BREAK | Flags::UNUSED);
        self.stack_push(pushed.bits());
        self.status.insert(Flags::INTERRUPT_DISABLE);
        let target = self.bus.load_word(interrupts::IRQ_VECTOR);
        self.set_program_counter(target);
    }

    // Flag operations
    //////////////////

    fn clc(&mut self) {
        self.status.remove(Flags::CARRY);
    }

    fn sec(&mut self) {
        self.status.insert(Flags::CARRY);
    }

    fn cli(&mut self) {
        self.status.remove(Flags::INTERRUPT_DISABLE);
    }

    fn sei(&mut self) {
        self.status.insert(Flags::INTERRUPT_DISABLE);
    }

    fn clv(&mut self) {
        self.status.remove(Flags::OVERFLOW);
    }

    fn cld(&mut self) {
        self.status.remove(Flags::DECIMAL_MODE);
    }

    fn sed(&mut self) {
        self.status.insert(Flags::DECIMAL_MODE);
    }
}

impl<B: BusDevice> TraceSource for CPU<B> {
    fn trace_line(&self) -> String {
        format!(
            "CPU PC={:04X} A={:02X} X={:02X} Y={:02X} P={:02X} SP={:02X} cyc={}",
            self.program_counter,
            self.register_a,
            self.register_x,
            self.register_y,
            self.status.bits(),
            self.stack_pointer,
            self.cycles
        )
    }
}

fn page_crossed(addr1: u16, addr2: u16) -> bool {
    addr1 & 0xFF00 != addr2 & 0xFF00
}

fn rotate_value_left(value: u8, carry_in: bool) -> (u8, bool) {
    let carry_out = value & 0x80 != 0;
    (value << 1 | carry_in as u8, carry_out)
}

fn rotate_value_right(value: u8, carry_in: bool) -> (u8, bool) {
    let carry_out = value & 0x01 != 0;
    (value >> 1 | (carry_in as u8) << 7, carry_out)
}
