//! 4KiB-granule stage 1 translation tables.
//!
//! A [`TranslationTable`] either owns its memory (tables built for realms)
//! or edits a live table it was handed (the EL3 regime behind TTBR0_EL3).

use super::Error;
use crate::config::{PAGE_SIZE, PA_BITS};

use alloc::alloc::{alloc_zeroed, dealloc, Layout};
use armv9a::define_bits;
use core::ptr::NonNull;

pub const ENTRIES: usize = 512;
pub const LAST_LEVEL: usize = 3;

define_bits!(
    Desc,
    XN[54 - 54],
    ADDR[47 - 12],
    // only meaningful at EL3 with FEAT_RME
    NSE[11 - 11],
    AF[10 - 10],
    SH[9 - 8],
    AP[7 - 6],
    NS[5 - 5],
    ATTR_INDX[4 - 2],
    TYPE[1 - 1],
    VALID[0 - 0],
    UPPER_ATTRS[63 - 50],
    LOWER_ATTRS[11 - 2]
);

pub mod desc_type {
    pub const BLOCK: u64 = 0;
    pub const TABLE_OR_PAGE: u64 = 1;
}

#[repr(C, align(4096))]
pub struct Table {
    pub entries: [u64; ENTRIES],
}

const fn shift(level: usize) -> u32 {
    (PAGE_SIZE.trailing_zeros()) + 9 * (LAST_LEVEL - level) as u32
}

const fn block_size(level: usize) -> u64 {
    1 << shift(level)
}

/// First lookup level for an input range of `va_bits`.
pub fn start_level(va_bits: u32) -> Result<usize, Error> {
    match va_bits {
        40..=48 => Ok(0),
        31..=39 => Ok(1),
        22..=30 => Ok(2),
        _ => Err(Error::InvalidConfig),
    }
}

fn alloc_table() -> Result<NonNull<Table>, Error> {
    // SAFETY: `Table` has a non-zero size.
    let ptr = unsafe { alloc_zeroed(Layout::new::<Table>()) };
    NonNull::new(ptr as *mut Table).ok_or(Error::AllocFail)
}

/// # Safety
///
/// `table` must come from `alloc_table` and must not be reachable afterwards.
unsafe fn free_table(table: NonNull<Table>, level: usize) {
    if level < LAST_LEVEL {
        for raw in table.as_ref().entries.iter() {
            let desc = Desc::new(*raw);
            if is_table(desc) {
                if let Some(child) = NonNull::new(desc.get_masked(Desc::ADDR) as *mut Table) {
                    free_table(child, level + 1);
                }
            }
        }
    }
    dealloc(table.as_ptr() as *mut u8, Layout::new::<Table>());
}

fn is_valid(desc: Desc) -> bool {
    desc.get_masked_value(Desc::VALID) != 0
}

fn is_table(desc: Desc) -> bool {
    is_valid(desc) && desc.get_masked_value(Desc::TYPE) == desc_type::TABLE_OR_PAGE
}

fn is_block(desc: Desc) -> bool {
    is_valid(desc) && desc.get_masked_value(Desc::TYPE) == desc_type::BLOCK
}

fn table_desc(table: NonNull<Table>) -> u64 {
    (table.as_ptr() as u64 & Desc::ADDR) | Desc::TYPE | Desc::VALID
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Translation {
    pub pa: u64,
    pub desc: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapOutcome {
    /// A block on the path was replaced by a next-level table.
    pub split: bool,
}

pub struct TranslationTable {
    root: NonNull<Table>,
    start_level: usize,
    va_bits: u32,
    owned: bool,
}

// SAFETY: the table memory is only reached through this handle and every
// shared handle lives behind a lock.
unsafe impl Send for TranslationTable {}

impl TranslationTable {
    pub fn new(va_bits: u32) -> Result<Self, Error> {
        let start_level = start_level(va_bits)?;
        Ok(Self {
            root: alloc_table()?,
            start_level,
            va_bits,
            owned: true,
        })
    }

    /// Wraps a table this handle does not own. Dropping it frees nothing.
    ///
    /// # Safety
    ///
    /// `base` must be the identity-mapped root of a live table whose lookup
    /// starts at the level implied by `va_bits`, and nobody else may edit it
    /// while the handle exists.
    pub unsafe fn from_base(base: u64, va_bits: u32) -> Result<Self, Error> {
        let start_level = start_level(va_bits)?;
        let root = NonNull::new((base & Desc::ADDR) as *mut Table).ok_or(Error::InvalidConfig)?;
        Ok(Self {
            root,
            start_level,
            va_bits,
            owned: false,
        })
    }

    pub fn base(&self) -> u64 {
        self.root.as_ptr() as u64
    }

    pub fn va_bits(&self) -> u32 {
        self.va_bits
    }

    pub fn levels(&self) -> u32 {
        (LAST_LEVEL + 1 - self.start_level) as u32
    }

    fn index(&self, va: u64, level: usize) -> usize {
        let s = shift(level);
        let width = match level == self.start_level {
            true => self.va_bits - s,
            false => 9,
        };
        ((va >> s) & ((1 << width) - 1)) as usize
    }

    fn entry(&self, table: NonNull<Table>, va: u64, level: usize) -> *mut u64 {
        let index = self.index(va, level);
        // SAFETY: `index` is bounded by the table size.
        unsafe { (table.as_ptr() as *mut u64).add(index) }
    }

    pub fn translate(&self, va: u64) -> Option<Translation> {
        if va >> self.va_bits != 0 {
            return None;
        }

        let mut table = self.root;
        for level in self.start_level..=LAST_LEVEL {
            // SAFETY: every table reached from the root is a live `Table`.
            let desc = Desc::new(unsafe { self.entry(table, va, level).read_volatile() });
            if !is_valid(desc) {
                return None;
            }
            if level == LAST_LEVEL {
                if desc.get_masked_value(Desc::TYPE) != desc_type::TABLE_OR_PAGE {
                    return None;
                }
                return Some(Translation {
                    pa: desc.get_masked(Desc::ADDR) | (va & (PAGE_SIZE - 1)),
                    desc: desc.get(),
                });
            }
            if is_block(desc) {
                if level == 0 {
                    return None;
                }
                let size = block_size(level);
                return Some(Translation {
                    pa: (desc.get_masked(Desc::ADDR) & !(size - 1)) | (va & (size - 1)),
                    desc: desc.get(),
                });
            }
            table = NonNull::new(desc.get_masked(Desc::ADDR) as *mut Table)?;
        }
        None
    }

    /// Counts the tables that mapping `va` needs before any write happens.
    fn tables_needed(&self, va: u64) -> Result<usize, Error> {
        let mut table = self.root;
        for level in self.start_level..LAST_LEVEL {
            // SAFETY: see `translate`.
            let desc = Desc::new(unsafe { self.entry(table, va, level).read_volatile() });
            if is_table(desc) {
                table = NonNull::new(desc.get_masked(Desc::ADDR) as *mut Table)
                    .ok_or(Error::InvalidDescriptor)?;
                continue;
            }
            if is_block(desc) && level == 0 {
                return Err(Error::InvalidDescriptor);
            }
            return Ok(LAST_LEVEL - level);
        }
        Ok(0)
    }

    /// Installs or replaces the page descriptor for `va`.
    ///
    /// `attrs` holds lower/upper attribute bits only. `publish` runs before a
    /// new table becomes reachable from the tree. Validation and all
    /// allocations happen before the first write, so a failure leaves the
    /// tree untouched.
    pub fn map_page<F: FnMut()>(
        &mut self,
        va: u64,
        pa: u64,
        attrs: u64,
        mut publish: F,
    ) -> Result<MapOutcome, Error> {
        if va % PAGE_SIZE != 0 || pa % PAGE_SIZE != 0 {
            return Err(Error::Misaligned);
        }
        if va >> self.va_bits != 0 || pa >> PA_BITS != 0 {
            return Err(Error::OutOfRange);
        }
        if attrs & !(Desc::UPPER_ATTRS | Desc::LOWER_ATTRS) != 0 {
            return Err(Error::InvalidAttributes);
        }

        let needed = self.tables_needed(va)?;
        let mut spare: [Option<NonNull<Table>>; LAST_LEVEL] = [None; LAST_LEVEL];
        for slot in spare.iter_mut().take(needed) {
            match alloc_table() {
                Ok(table) => *slot = Some(table),
                Err(e) => {
                    for table in spare.iter_mut().filter_map(|t| t.take()) {
                        // SAFETY: freshly allocated and never published.
                        unsafe { free_table(table, LAST_LEVEL) };
                    }
                    return Err(e);
                }
            }
        }
        let mut spare = spare.into_iter().flatten();

        let mut outcome = MapOutcome::default();
        let mut table = self.root;
        for level in self.start_level..LAST_LEVEL {
            let entry = self.entry(table, va, level);
            // SAFETY: see `translate`.
            let desc = Desc::new(unsafe { entry.read_volatile() });
            if is_table(desc) {
                table = NonNull::new(desc.get_masked(Desc::ADDR) as *mut Table)
                    .ok_or(Error::InvalidDescriptor)?;
                continue;
            }

            let mut child = spare.next().ok_or(Error::AllocFail)?;
            if is_block(desc) {
                // SAFETY: `child` is a fresh table nobody else can see.
                unsafe { split_block(child.as_mut(), desc, level) };
                outcome.split = true;
            }
            publish();
            // SAFETY: `entry` points into a live table of this tree.
            unsafe { entry.write_volatile(table_desc(child)) };
            table = child;
        }

        let page = pa | attrs | Desc::TYPE | Desc::VALID;
        // SAFETY: the last level table was reached or created above.
        unsafe { self.entry(table, va, LAST_LEVEL).write_volatile(page) };
        Ok(outcome)
    }
}

/// Fills `child` with next-level entries that reproduce `block`.
fn split_block(child: &mut Table, block: Desc, level: usize) {
    let next = level + 1;
    let size = block_size(next);
    let base = block.get_masked(Desc::ADDR) & !(block_size(level) - 1);
    let attrs = block.get_masked(Desc::UPPER_ATTRS | Desc::LOWER_ATTRS);
    let kind = match next == LAST_LEVEL {
        true => Desc::TYPE | Desc::VALID,
        false => Desc::VALID,
    };
    for (i, entry) in child.entries.iter_mut().enumerate() {
        *entry = (base + i as u64 * size) | attrs | kind;
    }
}

impl Drop for TranslationTable {
    fn drop(&mut self) {
        if self.owned {
            // SAFETY: an owned root and everything below it came from `alloc_table`.
            unsafe { free_table(self.root, self.start_level) };
        }
    }
}
