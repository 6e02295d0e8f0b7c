use core::mem::MaybeUninit;
use core::ptr::addr_of_mut;
use linked_list_allocator::LockedHeap;

use crate::config::HEAP_SIZE;

static mut HEAP: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// # Safety
///
/// Must run once, before the first allocation.
pub unsafe fn init() {
    ALLOCATOR.lock().init_from_slice(&mut *addr_of_mut!(HEAP));
}

pub fn get_used_size() -> usize {
    ALLOCATOR.lock().used()
}
