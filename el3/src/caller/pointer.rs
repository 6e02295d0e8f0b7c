use super::Accessor;
use crate::platform::Platform;

use core::ops::{Deref, DerefMut};

/// Type for holding an immutable pointer to memory owned by the caller
pub struct Pointer<T: Accessor> {
    ptr: *const T,
}

impl<T: Accessor> Pointer<T> {
    pub fn new(ptr: u64) -> Self {
        Self {
            ptr: ptr as *const T,
        }
    }

    /// Checks if this pointer is valid. It goes through two validations.
    ///   (1) T::acquire(): every byte of the object translates at EL3
    ///   (2) T::validate(): each field of T holds a legal value
    /// It returns a guard object only if it passes the two steps.
    #[inline]
    pub fn acquire<P: Platform>(&self, platform: &P) -> Option<PointerGuard<'_, T>> {
        if !T::acquire(self.ptr as u64, false, platform) {
            return None;
        }
        let guard = PointerGuard { inner: self };
        match guard.validate() {
            true => Some(guard),
            false => None,
        }
    }
}

/// Guard for `Pointer`
pub struct PointerGuard<'a, T: Accessor> {
    inner: &'a Pointer<T>,
}

impl<T: Accessor> PointerGuard<'_, T> {
    fn validate(&self) -> bool {
        // SAFETY: `acquire` resolved and aligned the object before the guard exists.
        let obj = unsafe { &*self.inner.ptr };
        obj.validate()
    }
}

impl<T: Accessor> Deref for PointerGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: the only way to get a guard is `Pointer::acquire`.
        unsafe { &*self.inner.ptr }
    }
}

/// Type for holding a mutable pointer to memory owned by the caller
pub struct PointerMut<T: Accessor> {
    ptr: *mut T,
}

impl<T: Accessor> PointerMut<T> {
    pub fn new(ptr: u64) -> Self {
        Self { ptr: ptr as *mut T }
    }

    /// Writable counterpart of [`Pointer::acquire`]; translation uses `AT S1E3W`.
    #[inline]
    pub fn acquire<P: Platform>(&mut self, platform: &P) -> Option<PointerMutGuard<'_, T>> {
        if !T::acquire(self.ptr as u64, true, platform) {
            return None;
        }
        let guard = PointerMutGuard { inner: self };
        match guard.validate() {
            true => Some(guard),
            false => None,
        }
    }
}

/// Guard for `PointerMut`
pub struct PointerMutGuard<'a, T: Accessor> {
    inner: &'a mut PointerMut<T>,
}

impl<T: Accessor> PointerMutGuard<'_, T> {
    fn validate(&self) -> bool {
        // SAFETY: see `PointerGuard::validate`.
        let obj = unsafe { &*self.inner.ptr };
        obj.validate()
    }
}

impl<T: Accessor> Deref for PointerMutGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: the only way to get a guard is `PointerMut::acquire`.
        unsafe { &*self.inner.ptr }
    }
}

impl<T: Accessor> DerefMut for PointerMutGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: the object resolved for write and the guard borrows the pointer uniquely.
        unsafe { &mut *self.inner.ptr }
    }
}
