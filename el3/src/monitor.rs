use crate::channel::ChannelTable;
use crate::config::NUM_OF_CPU;
use crate::mm::El3Mmu;
use crate::platform::Platform;
use crate::realm::RealmTables;
use crate::service::regs::RegisterSnapshot;
use crate::service::timer::TimerState;

use spin::mutex::Mutex;
use spinning_top::Spinlock;

/// State the dispatcher keeps between calls.
pub struct Monitor<P: Platform> {
    pub platform: P,
    pub channels: ChannelTable,
    pub realm_tables: RealmTables,
    el3_table: Mutex<()>,
    timers: [Spinlock<TimerState>; NUM_OF_CPU],
    snapshots: [Spinlock<Option<RegisterSnapshot>>; NUM_OF_CPU],
}

impl<P: Platform> Monitor<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            channels: ChannelTable::new(),
            realm_tables: RealmTables::new(),
            el3_table: Mutex::new(()),
            timers: core::array::from_fn(|_| Spinlock::new(TimerState::Disabled)),
            snapshots: core::array::from_fn(|_| Spinlock::new(None)),
        }
    }

    pub fn el3_mmu(&self) -> El3Mmu<'_, P> {
        El3Mmu::new(&self.platform, &self.el3_table)
    }

    pub fn timer(&self, caller: usize) -> Option<&Spinlock<TimerState>> {
        self.timers.get(caller)
    }

    pub fn snapshot(&self, caller: usize) -> Option<&Spinlock<Option<RegisterSnapshot>>> {
        self.snapshots.get(caller)
    }
}
