//! Owned translation tables built on behalf of realm tests.

pub mod params;

use crate::config::{PAGE_SIZE, PA_BITS, VA_BITS};
use crate::mm::attr::MemAttributes;
use crate::mm::page_table::TranslationTable;
use crate::mm::Error;
use params::{PgtDescriptor, RegionDescriptor};

use alloc::collections::btree_map::BTreeMap;
use armv9a::{bits_in_reg, MAIR_EL3_DEFAULT};
use spin::mutex::Mutex;

pub const STAGE_1: u32 = 1;

pub mod tcr {
    pub const T0SZ: u64 = 0x3f;
    pub const IRGN0: u64 = 0x3 << 8;
    pub const ORGN0: u64 = 0x3 << 10;
    pub const SH0: u64 = 0x3 << 12;
    pub const PS: u64 = 0x7 << 16;

    pub const WBWA: u64 = 0b01;
    pub const INNER: u64 = 0b11;
    pub const PS_256T: u64 = 0b101;
}

/// Builds a table for `regions`, mapping each with 4KiB pages.
pub fn build(regions: &[RegionDescriptor]) -> Result<TranslationTable, Error> {
    let mut table = TranslationTable::new(VA_BITS)?;

    for region in regions {
        let attrs = MemAttributes::try_from(region.attributes)?;
        if region.length % PAGE_SIZE != 0 {
            return Err(Error::Misaligned);
        }
        let va_end = region.va.checked_add(region.length).ok_or(Error::OutOfRange)?;
        let pa_end = region.pa.checked_add(region.length).ok_or(Error::OutOfRange)?;
        if va_end > 1 << VA_BITS || pa_end > 1 << PA_BITS {
            return Err(Error::OutOfRange);
        }

        let bits = attrs.descriptor_bits();
        for offset in (0..region.length).step_by(PAGE_SIZE as usize) {
            let va = region.va + offset;
            if table.translate(va).is_some() {
                return Err(Error::Overlap);
            }
            table.map_page(va, region.pa + offset, bits, || {})?;
        }
    }

    Ok(table)
}

pub fn describe(table: &TranslationTable) -> PgtDescriptor {
    PgtDescriptor {
        pgt_base: table.base(),
        ias: table.va_bits(),
        oas: PA_BITS,
        stage: STAGE_1,
        levels: table.levels(),
        mair: MAIR_EL3_DEFAULT,
        tcr: bits_in_reg(tcr::T0SZ, 64 - table.va_bits() as u64)
            | bits_in_reg(tcr::IRGN0, tcr::WBWA)
            | bits_in_reg(tcr::ORGN0, tcr::WBWA)
            | bits_in_reg(tcr::SH0, tcr::INNER)
            | bits_in_reg(tcr::PS, tcr::PS_256T),
    }
}

/// Live realm tables keyed by their root address.
pub struct RealmTables {
    tables: Mutex<BTreeMap<u64, TranslationTable>>,
}

impl RealmTables {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn insert(&self, table: TranslationTable) -> u64 {
        let base = table.base();
        self.tables.lock().insert(base, table);
        base
    }

    /// Frees the table rooted at `base`. Returns false if there was none.
    pub fn remove(&self, base: u64) -> bool {
        self.tables.lock().remove(&base).is_some()
    }

    pub fn contains(&self, base: u64) -> bool {
        self.tables.lock().contains_key(&base)
    }

    pub fn len(&self) -> usize {
        self.tables.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn with<R, F: FnOnce(&TranslationTable) -> R>(&self, base: u64, f: F) -> Option<R> {
        self.tables.lock().get(&base).map(f)
    }
}

impl Default for RealmTables {
    fn default() -> Self {
        Self::new()
    }
}
