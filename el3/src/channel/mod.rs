//! The shared result channel.
//!
//! Services report through a caller-owned [`SharedData`] block instead of
//! return registers. Every write goes through [`Reply`], which only holds
//! the channel when the mapping guard accepted it for this call.

pub mod msg;
pub mod table;

use crate::caller::pointer::PointerMutGuard;
use crate::caller::Accessor;
use crate::config::{ERROR_MSG_LEN, SHARED_DATA_SLOTS, SHARED_DATA_VERSION};
use crate::error::{Error, STATUS_SUCCESS};

pub use table::ChannelTable;

pub const SET: u32 = 1;
pub const CLEAR: u32 = 0;

pub mod access_type {
    pub const READ: u32 = 0;
    pub const WRITE: u32 = 1;
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SharedDataAccess {
    pub addr: u64,
    pub data: u64,
    pub access_type: u32,
    pub reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct SharedData {
    pub version: u32,
    pub status_code: u32,
    pub error_code: u32,
    pub generic_flag: u32,
    pub exception_expected: u32,
    pub access_mut: u32,
    pub num_access: u32,
    pub reserved: u32,
    pub error_msg: [u8; ERROR_MSG_LEN],
    pub shared_data_access: [SharedDataAccess; SHARED_DATA_SLOTS],
}

const_assert_size!(SharedDataAccess, 24);
const_assert_size!(SharedData, 32 + ERROR_MSG_LEN + 24 * SHARED_DATA_SLOTS);

impl SharedData {
    pub const fn new() -> Self {
        Self {
            version: SHARED_DATA_VERSION,
            status_code: STATUS_SUCCESS,
            error_code: 0,
            generic_flag: 0,
            exception_expected: 0,
            access_mut: 0,
            num_access: 0,
            reserved: 0,
            error_msg: [0; ERROR_MSG_LEN],
            shared_data_access: [SharedDataAccess {
                addr: 0,
                data: 0,
                access_type: 0,
                reserved: 0,
            }; SHARED_DATA_SLOTS],
        }
    }

    pub fn reset_status(&mut self) {
        self.status_code = STATUS_SUCCESS;
        self.error_code = 0;
        self.error_msg[0] = 0;
    }

    pub fn fail(&mut self, err: Error) {
        self.status_code = err.into();
        self.error_code = err.detail();
        msg::write_bounded(&mut self.error_msg, err.message());
    }

    pub fn message(&self) -> &str {
        msg::read_bounded(&self.error_msg)
    }
}

impl Default for SharedData {
    fn default() -> Self {
        Self::new()
    }
}

impl Accessor for SharedData {
    fn validate(&self) -> bool {
        self.version == SHARED_DATA_VERSION
    }
}

/// Per-call view of the caller's channel.
pub struct Reply<'a> {
    channel: Option<PointerMutGuard<'a, SharedData>>,
}

impl<'a> Reply<'a> {
    /// Starts a call. A present channel gets its status fields cleared.
    pub fn new(mut channel: Option<PointerMutGuard<'a, SharedData>>) -> Self {
        if let Some(shared) = channel.as_mut() {
            shared.reset_status();
        }
        Self { channel }
    }

    pub fn unavailable() -> Self {
        Self { channel: None }
    }

    pub fn is_available(&self) -> bool {
        self.channel.is_some()
    }

    pub fn channel(&mut self) -> Option<&mut SharedData> {
        self.channel.as_deref_mut()
    }

    /// Stores a scalar result in `shared_data_access[slot].data`.
    pub fn set_data(&mut self, slot: usize, value: u64) {
        if let Some(entry) = self
            .channel
            .as_mut()
            .and_then(|shared| shared.shared_data_access.get_mut(slot))
        {
            entry.data = value;
        }
    }

    pub fn fail(&mut self, err: Error) {
        match self.channel.as_mut() {
            Some(shared) => shared.fail(err),
            None => debug!("channel unavailable, dropping failure: {}", err),
        }
    }
}
