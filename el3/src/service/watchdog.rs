use crate::channel::{CLEAR, SET};
use crate::error::Error;
use crate::event::{Context, Mainloop};
use crate::platform::{Platform, SysReg};
use crate::service::ServiceId;

use armv9a::mmio::{wdog, WCS};
use armv9a::LocalRegisterCopy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchdogArm {
    pub base: u64,
    pub timeout_ms: u64,
    /// Zero selects CNTFRQ_EL0.
    pub freq_hz: u64,
}

impl From<&Context> for WatchdogArm {
    fn from(ctx: &Context) -> Self {
        Self {
            base: ctx.arg[0],
            timeout_ms: ctx.arg[1],
            freq_hz: ctx.arg[2],
        }
    }
}

impl WatchdogArm {
    fn ticks(&self, freq_hz: u64) -> Option<u32> {
        let ticks = self.timeout_ms as u128 * freq_hz as u128 / 1000;
        match u32::try_from(ticks) {
            Ok(0) | Err(_) => None,
            Ok(ticks) => Some(ticks),
        }
    }

    pub fn arm<P: Platform>(&self, platform: &P) -> Result<(), Error> {
        if self.base == 0 {
            return Err(Error::Watchdog);
        }
        let wcs = self.base + wdog::WCS;

        if self.timeout_ms == 0 {
            platform.mmio_write32(wcs, 0);
            return Ok(());
        }

        let freq = match self.freq_hz {
            0 => platform.read_sysreg(SysReg::Cntfrq) & 0xffff_ffff,
            hz => hz,
        };
        let ticks = self.ticks(freq).ok_or(Error::Watchdog)?;

        platform.mmio_write32(wcs, 0);
        platform.mmio_write32(self.base + wdog::WOR, ticks);
        let mut ctrl = LocalRegisterCopy::<u32, WCS::Register>::new(0);
        ctrl.write(WCS::EN::SET);
        platform.mmio_write32(wcs, ctrl.get());
        platform.dsb();

        let readback = LocalRegisterCopy::<u32, WCS::Register>::new(platform.mmio_read32(wcs));
        match readback.is_set(WCS::EN) && platform.mmio_read32(self.base + wdog::WOR) == ticks {
            true => Ok(()),
            false => Err(Error::Watchdog),
        }
    }
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::ROOT_WATCHDOG, |ctx, reply, monitor| {
        if let Some(shared) = reply.channel() {
            if shared.generic_flag == SET {
                // The payload expects the watchdog to fire: take it as a fault.
                monitor.platform.mask_interrupts();
                shared.exception_expected = SET;
                shared.access_mut = CLEAR;
            }
        }

        let req = WatchdogArm::from(ctx);
        let result = req.arm(&monitor.platform);

        if let Some(shared) = reply.channel() {
            shared.generic_flag = CLEAR;
        }
        result
    });
}
