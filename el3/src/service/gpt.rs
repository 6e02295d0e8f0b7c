use crate::error::Error;
use crate::event::Mainloop;
use crate::gpt::{self, Gpi, GptConfig};
use crate::platform::Platform;
use crate::service::ServiceId;

fn add_entry<P: Platform>(platform: &P, pa: u64, gpi: u64) -> Result<(), gpt::Error> {
    let gpi = Gpi::try_from(gpi)?;
    let config = GptConfig::from_platform(platform)?;
    gpt::set_gpi(platform, &config, pa, gpi)
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::ADD_GPT_ENTRY, |ctx, _, monitor| {
        let (pa, gpi) = (ctx.arg[0], ctx.arg[1]);
        let result = add_entry(&monitor.platform, pa, gpi);

        // Stale GPT entries may be cached in any PE's TLB.
        monitor.platform.dsb();
        monitor.platform.tlbi_paallos();
        monitor.platform.dsb();

        result.map_err(|e| {
            debug!("GPT pa {:#x} gpi {:#x}: {:?}", pa, gpi, e);
            Error::from(e)
        })
    });
}
