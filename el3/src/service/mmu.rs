use crate::channel::SharedData;
use crate::config::PAGE_SIZE;
use crate::error::Error;
use crate::event::Mainloop;
use crate::mm::attr::{MemAttributes, Pas};
use crate::mm::page_floor;
use crate::monitor::Monitor;
use crate::platform::Platform;
use crate::service::ServiceId;

/// Identity maps every page `[addr, addr + len)` touches.
fn map_identity<P: Platform>(monitor: &Monitor<P>, addr: u64, len: u64) -> Result<(), Error> {
    let last = addr.checked_add(len - 1).ok_or(Error::SharedChannel)?;
    let attrs = MemAttributes::normal(Pas::NonSecure);
    let mmu = monitor.el3_mmu();

    let mut page = page_floor(addr);
    while page <= page_floor(last) {
        mmu.map_page(page, page, &attrs)
            .map_err(|_| Error::SharedChannel)?;
        page += PAGE_SIZE;
    }
    Ok(())
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::ADD_MMU_ENTRY, |ctx, _, monitor| {
        let (va, pa) = (ctx.arg[0], ctx.arg[2]);
        let attrs = MemAttributes::try_from(ctx.arg[1])?;
        monitor.el3_mmu().map_page(va, pa, &attrs)?;
        Ok(())
    });

    listen!(mainloop, ServiceId::MAP_SHARED_CHANNEL, |ctx, _, monitor| {
        let addr = ctx.arg[0];
        if addr == 0 || addr % core::mem::align_of::<SharedData>() as u64 != 0 {
            return Err(Error::SharedChannel);
        }
        monitor.channels.check(ctx.caller, addr)?;
        map_identity(monitor, addr, core::mem::size_of::<SharedData>() as u64)?;
        monitor.channels.register(ctx.caller, addr)?;
        debug!("core {} channel at {:#x}", ctx.caller, addr);
        Ok(())
    });
}
