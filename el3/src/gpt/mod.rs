//! Granule Protection Table editing.
//!
//! The table is located and sized through GPCCR_EL3 and GPTBR_EL3; entries
//! are reached with identity-mapped physical accesses.

pub mod entry;

use crate::platform::{Platform, SysReg};
use entry::{l0_type, L0Desc, GPIS_PER_L1_ENTRY};

use armv9a::define_bits;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    InvalidGpi,
    InvalidConfig,
    OutOfRange,
    InvalidDescriptor,
    /// An L0 block with a different GPI covers the granule.
    BlockConflict,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gpi {
    NoAccess = 0x0,
    Secure = 0x8,
    NonSecure = 0x9,
    Root = 0xA,
    Realm = 0xB,
    Any = 0xF,
}

impl TryFrom<u64> for Gpi {
    type Error = Error;

    fn try_from(raw: u64) -> Result<Self, Error> {
        match raw {
            0x0 => Ok(Gpi::NoAccess),
            0x8 => Ok(Gpi::Secure),
            0x9 => Ok(Gpi::NonSecure),
            0xA => Ok(Gpi::Root),
            0xB => Ok(Gpi::Realm),
            0xF => Ok(Gpi::Any),
            _ => Err(Error::InvalidGpi),
        }
    }
}

define_bits!(
    Gpccr,
    L0GPTSZ[23 - 20],
    GPC[16 - 16],
    PGS[15 - 14],
    PPS[2 - 0]
);

/// Geometry of the active GPT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GptConfig {
    pub base: u64,
    /// Protected physical address size in bits.
    pub pps: u32,
    /// Physical granule size in bits.
    pub pgs: u32,
    /// Bytes covered by one L0 entry, in bits.
    pub l0gptsz: u32,
}

impl GptConfig {
    pub fn new(gpccr: u64, gptbr: u64) -> Result<Self, Error> {
        let gpccr = Gpccr::new(gpccr);
        let pps = match gpccr.get_masked_value(Gpccr::PPS) {
            0 => 32,
            1 => 36,
            2 => 40,
            3 => 42,
            4 => 44,
            5 => 48,
            6 => 52,
            _ => return Err(Error::InvalidConfig),
        };
        let pgs = match gpccr.get_masked_value(Gpccr::PGS) {
            0 => 12,
            1 => 16,
            2 => 14,
            _ => return Err(Error::InvalidConfig),
        };
        let l0gptsz = match gpccr.get_masked_value(Gpccr::L0GPTSZ) {
            0 => 30,
            4 => 34,
            6 => 36,
            9 => 39,
            _ => return Err(Error::InvalidConfig),
        };
        if l0gptsz > pps {
            return Err(Error::InvalidConfig);
        }
        let base = (gptbr & ((1 << 40) - 1)) << 12;
        if base == 0 {
            return Err(Error::InvalidConfig);
        }
        Ok(Self {
            base,
            pps,
            pgs,
            l0gptsz,
        })
    }

    pub fn from_platform<P: Platform>(platform: &P) -> Result<Self, Error> {
        Self::new(
            platform.read_sysreg(SysReg::Gpccr),
            platform.read_sysreg(SysReg::Gptbr),
        )
    }

    fn l0_entry_addr(&self, pa: u64) -> Result<u64, Error> {
        if pa >> self.pps != 0 {
            return Err(Error::OutOfRange);
        }
        Ok(self.base + (pa >> self.l0gptsz) * 8)
    }

    /// Address of the L1 entry and the GPI slot inside it.
    fn l1_slot(&self, l1_base: u64, pa: u64) -> (u64, u64) {
        let offset = pa & ((1 << self.l0gptsz) - 1);
        let granule = offset >> self.pgs;
        let index = granule / GPIS_PER_L1_ENTRY;
        (l1_base + index * 8, granule % GPIS_PER_L1_ENTRY)
    }
}

enum Lookup {
    Block(u64),
    Table { entry_addr: u64, slot: u64 },
}

fn lookup<P: Platform>(platform: &P, config: &GptConfig, pa: u64) -> Result<Lookup, Error> {
    let l0 = L0Desc::new(platform.mem_read64(config.l0_entry_addr(pa)?));
    match l0.get_masked_value(L0Desc::TYPE) {
        l0_type::BLOCK => Ok(Lookup::Block(l0.get_masked_value(L0Desc::BLOCK_GPI))),
        l0_type::TABLE => {
            let (entry_addr, slot) = config.l1_slot(l0.get_masked(L0Desc::TABLE_ADDR), pa);
            Ok(Lookup::Table { entry_addr, slot })
        }
        _ => Err(Error::InvalidDescriptor),
    }
}

/// Sets the GPI of the granule holding `pa`. Callers own the TLB maintenance
/// that makes the edit visible.
pub fn set_gpi<P: Platform>(platform: &P, config: &GptConfig, pa: u64, gpi: Gpi) -> Result<(), Error> {
    match lookup(platform, config, pa)? {
        Lookup::Block(current) if current == gpi as u64 => Ok(()),
        Lookup::Block(current) => {
            warn!("pa {:#x} sits in an L0 block with GPI {:#x}", pa, current);
            Err(Error::BlockConflict)
        }
        Lookup::Table { entry_addr, slot } => {
            let old = platform.mem_read64(entry_addr);
            platform.mem_write64(entry_addr, entry::with_gpi(old, slot, gpi as u64));
            platform.dc_civac(entry_addr);
            Ok(())
        }
    }
}

pub fn get_gpi<P: Platform>(platform: &P, config: &GptConfig, pa: u64) -> Result<Gpi, Error> {
    let raw = match lookup(platform, config, pa)? {
        Lookup::Block(gpi) => gpi,
        Lookup::Table { entry_addr, slot } => entry::gpi_at(platform.mem_read64(entry_addr), slot),
    };
    Gpi::try_from(raw)
}
