use crate::service::{self, ServiceId};
use spin::mutex::Mutex;

use alloc::collections::btree_map::BTreeMap;

lazy_static! {
    pub static ref STATS: Mutex<Stats> = Mutex::new(Stats::new());
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stat {
    pub calls: u64,
    pub failures: u64,
}

pub struct Stats {
    list: BTreeMap<ServiceId, Stat>,
}

impl Stats {
    fn new() -> Self {
        Stats {
            list: ServiceId::ALL
                .iter()
                .map(|id| (*id, Stat::default()))
                .collect(),
        }
    }

    pub fn record(&mut self, id: ServiceId, ok: bool) {
        let stat = self.list.entry(id).or_default();
        stat.calls += 1;
        if !ok {
            stat.failures += 1;
        }
    }

    pub fn get(&self, id: ServiceId) -> Stat {
        self.list.get(&id).copied().unwrap_or_default()
    }

    pub fn print(&self) {
        info!("{0: <20} {1: >8} {2: >8}", "service", "calls", "failed");
        for (id, stat) in self.list.iter().filter(|(_, stat)| stat.calls != 0) {
            info!(
                "{0: <20} {1: >8} {2: >8}",
                service::to_str(id.raw()),
                stat.calls,
                stat.failures
            );
        }
    }
}
