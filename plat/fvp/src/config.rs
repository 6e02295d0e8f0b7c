pub const NUM_OF_CPU_PER_CLUSTER: usize = acs_el3::config::NUM_OF_CPU_PER_CLUSTER;

pub const HEAP_SIZE: usize = 64 * 1024;

pub const UART_BASE: usize = 0x1c0c_0000;
pub const UART_CLK_IN_HZ: usize = 24_000_000;
pub const UART_BAUDRATE: usize = 115_200;

/// Page 0 and root register page of each SMMU on the board.
pub const SMMU: [(u64, u64); 1] = [(0x2b40_0000, 0x2b4a_0000)];
