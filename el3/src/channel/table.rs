use crate::config::NUM_OF_CPU;
use crate::error::Error;

use spinning_top::Spinlock;

const NO_CHANNEL: u64 = 0;

/// Channel address registered by each core.
pub struct ChannelTable {
    slots: Spinlock<[u64; NUM_OF_CPU]>,
}

impl ChannelTable {
    pub const fn new() -> Self {
        Self {
            slots: Spinlock::new([NO_CHANNEL; NUM_OF_CPU]),
        }
    }

    /// Fails if `caller` may not take `addr` as its channel.
    pub fn check(&self, caller: usize, addr: u64) -> Result<(), Error> {
        Self::claimable(&self.slots.lock(), caller, addr)
    }

    /// Records `addr` as the channel of `caller`. An address already owned by
    /// another core is refused.
    pub fn register(&self, caller: usize, addr: u64) -> Result<(), Error> {
        let mut slots = self.slots.lock();
        Self::claimable(&slots, caller, addr)?;
        slots[caller] = addr;
        Ok(())
    }

    fn claimable(slots: &[u64; NUM_OF_CPU], caller: usize, addr: u64) -> Result<(), Error> {
        if caller >= NUM_OF_CPU || addr == NO_CHANNEL {
            return Err(Error::SharedChannel);
        }
        let aliased = slots
            .iter()
            .enumerate()
            .any(|(core, slot)| core != caller && *slot == addr);
        if aliased {
            warn!("channel {:#x} already belongs to another core", addr);
            return Err(Error::SharedChannel);
        }
        Ok(())
    }

    pub fn lookup(&self, caller: usize) -> Option<u64> {
        let addr = *self.slots.lock().get(caller)?;
        match addr {
            NO_CHANNEL => None,
            addr => Some(addr),
        }
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::new()
    }
}
