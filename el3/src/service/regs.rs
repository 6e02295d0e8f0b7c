//! EL3 register snapshot and compare.

use crate::channel::SET;
use crate::error::Error;
use crate::event::Mainloop;
use crate::platform::{Platform, SysReg};
use crate::service::ServiceId;

pub const SNAPSHOT_REGS: [SysReg; 8] = [
    SysReg::Sctlr,
    SysReg::Tcr,
    SysReg::Mair,
    SysReg::Ttbr0,
    SysReg::Vbar,
    SysReg::Scr,
    SysReg::Gpccr,
    SysReg::Gptbr,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterSnapshot {
    values: [u64; SNAPSHOT_REGS.len()],
}

impl RegisterSnapshot {
    pub fn capture<P: Platform>(platform: &P) -> Self {
        Self {
            values: SNAPSHOT_REGS.map(|reg| platform.read_sysreg(reg)),
        }
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn first_mismatch(&self, other: &RegisterSnapshot) -> Option<usize> {
        self.values
            .iter()
            .zip(other.values.iter())
            .position(|(a, b)| a != b)
    }
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::REG_COMPARE, |ctx, reply, monitor| {
        let slot = monitor.snapshot(ctx.caller);
        let current = RegisterSnapshot::capture(&monitor.platform);

        if ctx.arg[0] == SET as u64 {
            let saved = slot.ok_or(Error::NoRegisterSnapshot)?.lock();
            let saved = saved.as_ref().ok_or(Error::NoRegisterSnapshot)?;
            if let Some(index) = saved.first_mismatch(&current) {
                warn!("{:?} changed since the snapshot", SNAPSHOT_REGS[index]);
                return Err(Error::RegisterMismatch(index));
            }
            return Ok(());
        }

        for (index, value) in current.values().iter().enumerate() {
            reply.set_data(index, *value);
        }
        // Capture still reports for a core that has nowhere to keep it.
        if let Some(saved) = slot {
            *saved.lock() = Some(current);
        }
        Ok(())
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::NUM_OF_CPU;
    use crate::test_utils::*;

    #[test]
    fn snapshot_then_compare() {
        let h = Harness::new();
        h.platform().set_sysreg(SysReg::Vbar, 0x0400_0800);

        let shared = h.call(ServiceId::REG_COMPARE, [0, 0, 0]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(shared.shared_data_access[4].data, 0x0400_0800);
        assert_eq!(
            shared.shared_data_access[3].data,
            h.platform().sysreg(SysReg::Ttbr0)
        );

        let shared = h.call(ServiceId::REG_COMPARE, [1, 0, 0]);
        assert_eq!(shared.status_code, 0);

        h.platform().set_sysreg(SysReg::Scr, 0x1);
        let shared = h.call(ServiceId::REG_COMPARE, [1, 0, 0]);
        assert_eq!(shared.status_code, 1);
        assert_eq!(shared.error_code, 6);
        assert_eq!(shared.message(), "register compare failed");
    }

    #[test]
    fn compare_needs_snapshot() {
        let h = Harness::new();
        let shared = h.call(ServiceId::REG_COMPARE, [1, 0, 0]);
        assert_eq!(shared.status_code, 1);
        assert_eq!(shared.message(), "no register snapshot");
    }

    #[test]
    fn snapshots_are_per_core() {
        let h = Harness::new();
        h.call(ServiceId::REG_COMPARE, [0, 0, 0]);
        assert!(h.monitor.snapshot(0).unwrap().lock().is_some());
        assert!(h.monitor.snapshot(1).unwrap().lock().is_none());
    }

    #[test]
    fn core_without_slot_keeps_no_snapshot() {
        let h = Harness::new();
        h.call_on(NUM_OF_CPU, ServiceId::REG_COMPARE, [0, 0, 0]);
        h.call_on(NUM_OF_CPU, ServiceId::REG_COMPARE, [1, 0, 0]);
        assert!((0..NUM_OF_CPU).all(|core| h.monitor.snapshot(core).unwrap().lock().is_none()));
    }
}
