// See: https://www.nesdev.org/wiki/CPU_interrupts

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

pub struct Interrupt {
    pub vector: u16,
    pub cycles: u8,
}

pub const NMI: Interrupt = Interrupt {
    vector: NMI_VECTOR,
    cycles: 7,
};

pub const IRQ: Interrupt = Interrupt {
    vector: IRQ_VECTOR,
    cycles: 7,
};
