//! Access to memory handed over by a lower exception level.
//!
//! A caller-supplied address is only dereferenced after the EL3 stage 1
//! regime has resolved every page it spans.

pub mod pointer;

use crate::config::PAGE_SIZE;
use crate::platform::Platform;

use armv9a::PAR_EL1_F;

/// Returns true if `[addr, addr + len)` translates without a fault.
pub fn is_resolvable<P: Platform>(platform: &P, addr: u64, len: usize, write: bool) -> bool {
    if addr == 0 || len == 0 {
        return false;
    }
    let last = match addr.checked_add(len as u64 - 1) {
        Some(last) => last,
        None => return false,
    };

    let mut page = addr & !(PAGE_SIZE - 1);
    loop {
        let par = match write {
            true => platform.at_s1e3w(page),
            false => platform.at_s1e3r(page),
        };
        if par & PAR_EL1_F != 0 {
            return false;
        }
        match page.checked_add(PAGE_SIZE) {
            Some(next) if next <= last => page = next,
            _ => return true,
        }
    }
}

/// Memory layouts a caller may hand to the monitor.
pub trait Accessor: Sized {
    /// Checks that the object at `ptr` can be touched at all.
    /// returns true only if every byte resolves and `ptr` is aligned.
    fn acquire<P: Platform>(ptr: u64, write: bool, platform: &P) -> bool {
        ptr % core::mem::align_of::<Self>() as u64 == 0
            && is_resolvable(platform, ptr, core::mem::size_of::<Self>(), write)
    }

    /// Validate each field in a struct that implements this trait.
    fn validate(&self) -> bool {
        true
    }
}

pub fn copy_from<T: Accessor + Copy, P: Platform>(platform: &P, addr: u64) -> Option<T> {
    let ptr = pointer::Pointer::<T>::new(addr);
    let guard = ptr.acquire(platform)?;
    Some(*guard)
}

pub fn copy_to<T: Accessor + Copy, P: Platform>(platform: &P, src: &T, dst: u64) -> Option<()> {
    if !T::acquire(dst, true, platform) {
        return None;
    }
    // SAFETY: the destination resolved for write and is aligned for `T`.
    unsafe { core::ptr::write_volatile(dst as *mut T, *src) };
    Some(())
}
