pub mod attr;
pub mod page_table;

use crate::config::PAGE_SIZE;
use crate::platform::{Platform, SysReg};
use attr::MemAttributes;
use page_table::TranslationTable;

use armv9a::Ttbr;
use spin::mutex::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    Misaligned,
    OutOfRange,
    InvalidAttributes,
    InvalidDescriptor,
    InvalidConfig,
    AllocFail,
    Overlap,
}

const TCR_T0SZ_MASK: u64 = 0x3f;

pub fn page_floor(addr: u64) -> u64 {
    addr & !(PAGE_SIZE - 1)
}

/// Edits the live EL3 stage 1 regime rooted at TTBR0_EL3.
pub struct El3Mmu<'a, P: Platform> {
    platform: &'a P,
    lock: &'a Mutex<()>,
}

impl<'a, P: Platform> El3Mmu<'a, P> {
    pub fn new(platform: &'a P, lock: &'a Mutex<()>) -> Self {
        Self { platform, lock }
    }

    /// Maps one page. The descriptor write is followed by DSB, a TLB
    /// invalidation of `va` (all of EL3 if a block was split), DSB and ISB.
    pub fn map_page(&self, va: u64, pa: u64, attrs: &MemAttributes) -> Result<(), Error> {
        let _guard = self.lock.lock();

        let va_bits = 64 - (self.platform.read_sysreg(SysReg::Tcr) & TCR_T0SZ_MASK) as u32;
        let base = Ttbr::new(self.platform.read_sysreg(SysReg::Ttbr0)).get_masked(Ttbr::BADDR);
        // SAFETY: TTBR0_EL3 holds the identity-mapped EL3 table and the lock
        // above serializes every edit made through this type.
        let mut table = unsafe { TranslationTable::from_base(base, va_bits)? };

        let outcome = table.map_page(va, pa, attrs.descriptor_bits(), || self.platform.dsb())?;

        self.platform.dsb();
        match outcome.split {
            true => self.platform.tlbi_alle3(),
            false => self.platform.tlbi_vae3(va),
        }
        self.platform.dsb();
        self.platform.isb();

        trace!("EL3 map {:#x} -> {:#x} split={}", va, pa, outcome.split);
        Ok(())
    }

    /// Output address for `va` in the live regime, if mapped.
    pub fn translate(&self, va: u64) -> Option<u64> {
        let _guard = self.lock.lock();
        let va_bits = 64 - (self.platform.read_sysreg(SysReg::Tcr) & TCR_T0SZ_MASK) as u32;
        let base = Ttbr::new(self.platform.read_sysreg(SysReg::Ttbr0)).get_masked(Ttbr::BADDR);
        // SAFETY: read-only walk of the live table under the edit lock.
        let table = unsafe { TranslationTable::from_base(base, va_bits).ok()? };
        table.translate(va).map(|t| t.pa)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mm::attr::Pas;
    use crate::test_utils::*;

    #[test]
    fn maintenance_follows_the_write() {
        let platform = MockPlatform::new();
        let lock = Mutex::new(());
        let mmu = El3Mmu::new(&platform, &lock);

        mmu.map_page(0x8800_0000, 0x8800_0000, &MemAttributes::normal(Pas::Secure))
            .unwrap();
        assert_eq!(mmu.translate(0x8800_0010), Some(0x8800_0010));

        let events = platform.take_events();
        let tail = &events[events.len() - 4..];
        assert_eq!(
            tail,
            &[Event::Dsb, Event::TlbiVae3(0x8800_0000), Event::Dsb, Event::Isb]
        );
    }

    #[test]
    fn failure_skips_maintenance() {
        let platform = MockPlatform::new();
        let lock = Mutex::new(());
        let mmu = El3Mmu::new(&platform, &lock);
        platform.take_events();

        let err = mmu.map_page(0x8800_0008, 0x8800_0000, &MemAttributes::normal(Pas::Secure));
        assert_eq!(err, Err(Error::Misaligned));
        assert!(platform.take_events().is_empty());
        assert_eq!(mmu.translate(0x8800_0000), None);
    }
}
