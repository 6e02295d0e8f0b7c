use crate::error::Error;
use crate::event::{Context, Mainloop};
use crate::platform::{Platform, SysReg};
use crate::service::ServiceId;

pub struct ScrUpdate {
    pub set: u64,
    pub clear: u64,
}

impl From<&Context> for ScrUpdate {
    fn from(ctx: &Context) -> Self {
        Self {
            set: ctx.arg[0],
            clear: ctx.arg[1],
        }
    }
}

/// Writes `(old | set) & !clear` and reads it back. `Err` carries the value
/// the register actually holds when it did not take the write.
pub fn update_verified<P: Platform>(platform: &P, set: u64, clear: u64) -> Result<u64, u64> {
    let old = platform.read_sysreg(SysReg::Scr);
    let new = (old | set) & !clear;

    platform.write_sysreg(SysReg::Scr, new);
    platform.dsb();
    platform.isb();

    let readback = platform.read_sysreg(SysReg::Scr);
    if readback != new {
        warn!("SCR_EL3 {:#x} -> {:#x} but reads {:#x}", old, new, readback);
        return Err(readback);
    }
    Ok(readback)
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::READ_SCR, |_, reply, monitor| {
        reply.set_data(0, monitor.platform.read_sysreg(SysReg::Scr));
        Ok(())
    });

    listen!(mainloop, ServiceId::UPDATE_SCR, |ctx, reply, monitor| {
        let req = ScrUpdate::from(ctx);
        let result = update_verified(&monitor.platform, req.set, req.clear);
        let (Ok(readback) | Err(readback)) = result;
        reply.set_data(0, readback);
        result.map(|_| ()).map_err(|_| Error::ScrVerify)
    });
}
