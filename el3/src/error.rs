use core::fmt;

pub const STATUS_SUCCESS: u32 = 0;
pub const STATUS_FAILURE: u32 = 1;
pub const STATUS_UNKNOWN_SERVICE: u32 = 0xFFFF_FFFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    UnknownService,
    GptEntry,
    MmuEntry,
    SharedChannel,
    PgtCreate,
    CacheRange,
    MemoryRange,
    MemoryUnmapped,
    ScrVerify,
    SecurityState,
    PasFilterMode,
    CounterUnstable,
    CounterIdReserved,
    TimerProgram,
    TimerDisable,
    TimerSubOp,
    SmmuBank,
    SmmuNotPresent,
    SmmuAck,
    SmmuConfigMismatch,
    Watchdog,
    Mec,
    /// Index of the first register that differs from the snapshot.
    RegisterMismatch(usize),
    NoRegisterSnapshot,
    MutableAccess,
}

impl Error {
    pub fn message(&self) -> &'static str {
        match self {
            Error::UnknownService => "unknown service",
            Error::GptEntry => "GPT entry addition failed",
            Error::MmuEntry => "MMU entry addition failed",
            Error::SharedChannel => "shared channel mapping failed",
            Error::PgtCreate => "PGT creation failed",
            Error::CacheRange => "cache maintenance range overflow",
            Error::MemoryRange => "memory range overflow",
            Error::MemoryUnmapped => "memory-set target not mapped",
            Error::ScrVerify => "SCR update verify failed",
            Error::SecurityState => "security state change failed",
            Error::PasFilterMode => "invalid PAS filter mode",
            Error::CounterUnstable => "counter read did not stabilise",
            Error::CounterIdReserved => "CNTID returned reserved value",
            Error::TimerProgram => "secure timer program failed",
            Error::TimerDisable => "secure timer disable failed",
            Error::TimerSubOp => "invalid CNTPS sub-op",
            Error::SmmuBank => "invalid SMMU register bank request",
            Error::SmmuNotPresent => "SMMU not present",
            Error::SmmuAck => "SMMU root access update not acknowledged",
            Error::SmmuConfigMismatch => "SMMU root config mismatch",
            Error::Watchdog => "watchdog arming failed",
            Error::Mec => "MEC service failed",
            Error::RegisterMismatch(_) => "register compare failed",
            Error::NoRegisterSnapshot => "no register snapshot",
            Error::MutableAccess => "invalid mutable access request",
        }
    }

    /// Value for the channel's `error_code`.
    pub fn detail(&self) -> u32 {
        match self {
            Error::RegisterMismatch(index) => *index as u32 + 1,
            _ => 0,
        }
    }
}

impl From<Error> for u32 {
    fn from(err: Error) -> Self {
        match err {
            Error::UnknownService => STATUS_UNKNOWN_SERVICE,
            _ => STATUS_FAILURE,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<crate::gpt::Error> for Error {
    fn from(_e: crate::gpt::Error) -> Self {
        Error::GptEntry
    }
}

impl From<crate::counter::Error> for Error {
    fn from(_e: crate::counter::Error) -> Self {
        Error::CounterUnstable
    }
}

impl From<crate::mm::Error> for Error {
    fn from(_e: crate::mm::Error) -> Self {
        Error::MmuEntry
    }
}
