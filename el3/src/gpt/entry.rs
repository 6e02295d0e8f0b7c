use armv9a::define_bits;

define_bits!(
    L0Desc,
    // next level table, 4KB aligned
    TABLE_ADDR[51 - 12],
    BLOCK_GPI[7 - 4],
    TYPE[3 - 0]
);

pub mod l0_type {
    pub const BLOCK: u64 = 0x1;
    pub const TABLE: u64 = 0x3;
}

/// L1 entries pack sixteen 4-bit GPIs, one per granule.
pub const GPIS_PER_L1_ENTRY: u64 = 16;
pub const GPI_BITS: u64 = 4;
const GPI_MASK: u64 = (1 << GPI_BITS) - 1;

pub fn gpi_at(entry: u64, slot: u64) -> u64 {
    (entry >> (slot * GPI_BITS)) & GPI_MASK
}

pub fn with_gpi(entry: u64, slot: u64, gpi: u64) -> u64 {
    let shift = slot * GPI_BITS;
    (entry & !(GPI_MASK << shift)) | ((gpi & GPI_MASK) << shift)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn replace_one_slot() {
        let entry = 0x9999_9999_9999_9999;
        let edited = with_gpi(entry, 5, 0xB);
        assert_eq!(edited, 0x9999_9999_99B9_9999);
        assert_eq!(gpi_at(edited, 5), 0xB);
        assert_eq!(gpi_at(edited, 4), 0x9);
        assert_eq!(gpi_at(with_gpi(0, 15, 0xF), 15), 0xF);
    }
}
