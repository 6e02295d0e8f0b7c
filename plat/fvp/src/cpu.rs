use crate::config::NUM_OF_CPU_PER_CLUSTER;

use aarch64_cpu::registers::*;

/// Linear core index of the caller. Cores outside the table map past
/// `NUM_OF_CPU` and end up with no channel.
#[no_mangle]
pub extern "C" fn get_cpu_id() -> usize {
    let (cluster, core) = affinity();
    cluster * NUM_OF_CPU_PER_CLUSTER + core
}

#[inline(always)]
fn affinity() -> (usize, usize) {
    let mpidr = MPIDR_EL1.extract();
    (
        mpidr.read(MPIDR_EL1::Aff2) as usize,
        mpidr.read(MPIDR_EL1::Aff1) as usize,
    )
}
