//! System counter and CNTPS secure timer services.

use crate::config::COUNTER_READ_RETRIES;
use crate::counter::{self, Half};
use crate::error::Error;
use crate::event::{Context, Mainloop};
use crate::platform::{Platform, SysReg};
use crate::service::ServiceId;

use armv9a::mmio::{cnt_ctl, CNTCR, CNTID};
use armv9a::{LocalRegisterCopy, CNTPS_CTL_EL1};

/// Per-core state of the CNTPS timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Disabled,
    Armed,
}

pub mod sub_op {
    pub const PROGRAM: u64 = 0;
    pub const DISABLE: u64 = 1;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerRequest {
    Program { ticks: u32 },
    Disable,
}

impl TryFrom<&Context> for TimerRequest {
    type Error = Error;

    fn try_from(ctx: &Context) -> Result<Self, Error> {
        match ctx.arg[0] {
            sub_op::PROGRAM => {
                let ticks = ctx.arg[1];
                if ticks == 0 || ticks > i32::MAX as u64 {
                    return Err(Error::TimerProgram);
                }
                Ok(TimerRequest::Program { ticks: ticks as u32 })
            }
            sub_op::DISABLE => Ok(TimerRequest::Disable),
            _ => Err(Error::TimerSubOp),
        }
    }
}

type CntpsCtl = LocalRegisterCopy<u64, CNTPS_CTL_EL1::Register>;

fn cntps_ctl<P: Platform>(platform: &P) -> CntpsCtl {
    CntpsCtl::new(platform.read_sysreg(SysReg::CntpsCtl))
}

fn program<P: Platform>(platform: &P, ticks: u32) -> Result<(), Error> {
    platform.write_sysreg(SysReg::CntpsTval, ticks as u64);
    let mut ctl = CntpsCtl::new(0);
    ctl.write(CNTPS_CTL_EL1::ENABLE::SET + CNTPS_CTL_EL1::IMASK::CLEAR);
    platform.write_sysreg(SysReg::CntpsCtl, ctl.get());
    platform.isb();

    let ctl = cntps_ctl(platform);
    match ctl.is_set(CNTPS_CTL_EL1::ENABLE) && !ctl.is_set(CNTPS_CTL_EL1::IMASK) {
        true => Ok(()),
        false => Err(Error::TimerProgram),
    }
}

fn disable<P: Platform>(platform: &P) -> Result<(), Error> {
    platform.write_sysreg(SysReg::CntpsCtl, 0);
    platform.isb();
    match cntps_ctl(platform).is_set(CNTPS_CTL_EL1::ENABLE) {
        true => Err(Error::TimerDisable),
        false => Ok(()),
    }
}

fn read_counter<P: Platform>(platform: &P, base: u64) -> Result<u64, Error> {
    let mut cr = LocalRegisterCopy::<u32, CNTCR::Register>::new(
        platform.mmio_read32(base + cnt_ctl::CNTCR),
    );
    cr.modify(CNTCR::EN::SET + CNTCR::HDBG::SET);
    platform.mmio_write32(base + cnt_ctl::CNTCR, cr.get());

    let value = counter::read_consistent(
        |half| match half {
            Half::Low => platform.mmio_read32(base + cnt_ctl::CNTCV_LO),
            Half::High => platform.mmio_read32(base + cnt_ctl::CNTCV_HI),
        },
        COUNTER_READ_RETRIES,
    )?;
    Ok(value)
}

fn read_counter_id<P: Platform>(platform: &P, base: u64) -> Result<u64, Error> {
    let raw = platform.mmio_read32(base + cnt_ctl::CNTID);
    let id = LocalRegisterCopy::<u32, CNTID::Register>::new(raw);
    match id.read_as_enum(CNTID::CNTSC) {
        Some(CNTID::CNTSC::Value::NotImplemented) => Ok(0),
        Some(CNTID::CNTSC::Value::Implemented) => Ok(raw as u64),
        None => Err(Error::CounterIdReserved),
    }
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::READ_COUNTER, |ctx, reply, monitor| {
        let value = read_counter(&monitor.platform, ctx.arg[0])?;
        reply.set_data(0, value);
        Ok(())
    });

    listen!(mainloop, ServiceId::READ_COUNTER_ID, |ctx, reply, monitor| {
        let id = read_counter_id(&monitor.platform, ctx.arg[0])?;
        reply.set_data(0, id);
        Ok(())
    });

    listen!(mainloop, ServiceId::SECURE_TIMER, |ctx, _, monitor| {
        // Cores without a state slot still drive the timer.
        let mut state = monitor.timer(ctx.caller).map(|slot| slot.lock());

        // A fired timer is finished whether or not anyone disabled it.
        if let Some(state) = state.as_deref_mut() {
            if *state == TimerState::Armed
                && cntps_ctl(&monitor.platform).is_set(CNTPS_CTL_EL1::ISTATUS)
            {
                *state = TimerState::Disabled;
            }
        }

        let next = match TimerRequest::try_from(ctx)? {
            TimerRequest::Program { ticks } => {
                program(&monitor.platform, ticks)?;
                TimerState::Armed
            }
            TimerRequest::Disable => {
                disable(&monitor.platform)?;
                TimerState::Disabled
            }
        };
        if let Some(state) = state.as_deref_mut() {
            *state = next;
        }
        Ok(())
    });
}
