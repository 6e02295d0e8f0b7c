//! Field layouts of the memory-mapped blocks the monitor programs.
use tock_registers::register_bitfields;

register_bitfields! {u32,
    /// CNTControlBase counter control register.
    pub CNTCR [
        HDBG OFFSET(1) NUMBITS(1) [],
        EN OFFSET(0) NUMBITS(1) []
    ],

    /// CNTControlBase counter identification register.
    pub CNTID [
        CNTSC OFFSET(0) NUMBITS(4) [
            NotImplemented = 0b0000,
            Implemented = 0b0001
        ]
    ],

    /// SMMU root page control register and its acknowledge.
    pub SMMU_ROOT_CR0 [
        GPCEN OFFSET(1) NUMBITS(1) [],
        ACCESSEN OFFSET(0) NUMBITS(1) []
    ],

    /// Generic watchdog control and status.
    pub WCS [
        WS1 OFFSET(2) NUMBITS(1) [],
        WS0 OFFSET(1) NUMBITS(1) [],
        EN OFFSET(0) NUMBITS(1) []
    ]
}

pub mod cnt_ctl {
    pub const CNTCR: u64 = 0x0;
    pub const CNTCV_LO: u64 = 0x8;
    pub const CNTCV_HI: u64 = 0xc;
    pub const CNTID: u64 = 0x1c;
}

pub mod smmu {
    /// Offset of the secure register bank from the SMMU base.
    pub const SECURE_BANK: u64 = 0x8000;
    pub const IDR0: u64 = 0x0;
    pub const AIDR: u64 = 0x1c;
    pub const ROOT_CR0: u64 = 0x20;
    pub const ROOT_CR0ACK: u64 = 0x24;
}

pub mod wdog {
    pub const WCS: u64 = 0x0;
    pub const WOR: u64 = 0x8;
    pub const WOR_HI: u64 = 0xc;
    pub const WIIDR: u64 = 0xfcc;
}
