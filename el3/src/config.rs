pub const NUM_OF_CPU: usize = 8;
pub const NUM_OF_CLUSTER: usize = 2;
pub const NUM_OF_CPU_PER_CLUSTER: usize = NUM_OF_CPU / NUM_OF_CLUSTER;

pub const PAGE_BITS: usize = 12;
pub const PAGE_SIZE: u64 = 1 << PAGE_BITS; // 4KiB

/// Width of EL3 virtual and realm input addresses.
pub const VA_BITS: u32 = 48;
pub const PA_BITS: u32 = 48;

pub const SHARED_DATA_VERSION: u32 = 1;
pub const ERROR_MSG_LEN: usize = 128;
pub const SHARED_DATA_SLOTS: usize = 16;

pub const COUNTER_READ_RETRIES: usize = 1024;
pub const SMMU_ACK_POLL_LIMIT: usize = 100_000;
pub const MAX_REALM_REGIONS: usize = 32;
