use crate::caller::{copy_from, copy_to};
use crate::config::MAX_REALM_REGIONS;
use crate::error::Error;
use crate::event::Mainloop;
use crate::platform::Platform;
use crate::realm::{self, params::PgtDescriptor, params::RegionDescriptor};
use crate::service::ServiceId;

use alloc::vec::Vec;
use core::mem::size_of;

/// Reads the region list up to its zero-length terminator.
fn read_regions<P: Platform>(platform: &P, addr: u64) -> Option<Vec<RegionDescriptor>> {
    let mut regions = Vec::new();
    for i in 0..=MAX_REALM_REGIONS {
        let entry = addr.checked_add((i * size_of::<RegionDescriptor>()) as u64)?;
        let region: RegionDescriptor = copy_from(platform, entry)?;
        if region.length == 0 {
            return (!regions.is_empty()).then_some(regions);
        }
        regions.push(region);
    }
    warn!("region list at {:#x} is not terminated", addr);
    None
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::REALM_PGT_CREATE, |ctx, _, monitor| {
        let (regions_ptr, out_ptr) = (ctx.arg[0], ctx.arg[1]);
        let regions = read_regions(&monitor.platform, regions_ptr).ok_or(Error::PgtCreate)?;

        let table = realm::build(&regions).map_err(|e| {
            debug!("realm table build: {:?}", e);
            Error::PgtCreate
        })?;
        let desc = realm::describe(&table);
        copy_to(&monitor.platform, &desc, out_ptr).ok_or(Error::PgtCreate)?;

        monitor.realm_tables.insert(table);
        info!("realm table {:#x} with {} regions", desc.pgt_base, regions.len());
        Ok(())
    });

    listen!(mainloop, ServiceId::REALM_PGT_DESTROY, |ctx, _, monitor| {
        let desc: Option<PgtDescriptor> = copy_from(&monitor.platform, ctx.arg[0]);
        match desc {
            Some(desc) if monitor.realm_tables.remove(desc.pgt_base) => {
                info!("realm table {:#x} destroyed", desc.pgt_base)
            }
            Some(desc) => debug!("no realm table at {:#x}", desc.pgt_base),
            None => debug!("unreadable pgt descriptor {:#x}", ctx.arg[0]),
        }
        Ok(())
    });
}
