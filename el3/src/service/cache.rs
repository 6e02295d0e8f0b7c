use crate::error::Error;
use crate::event::Mainloop;
use crate::mm::attr::Pas;
use crate::platform::{Platform, SysReg};
use crate::service::ServiceId;

use armv9a::{define_bits, LocalRegisterCopy, CTR_EL0};

// Operand of DC CIPAPA / DC CIPAE.
define_bits!(CmoOperand, NS[63 - 63], NSE[62 - 62], PA[51 - 0]);

/// Replaces the caller's NS/NSE selection with `ns`/`nse`.
pub fn sanitize(operand: u64, ns: u64, nse: u64) -> u64 {
    let mut op = CmoOperand::new(operand);
    op.clear_bits(CmoOperand::NS | CmoOperand::NSE)
        .set_masked_value(CmoOperand::NS, ns & 1)
        .set_masked_value(CmoOperand::NSE, nse & 1);
    op.get()
}

pub fn dcache_line_size<P: Platform>(platform: &P) -> u64 {
    let ctr = LocalRegisterCopy::<u64, CTR_EL0::Register>::new(platform.read_sysreg(SysReg::Ctr));
    4 << ctr.read(CTR_EL0::DMINLINE)
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::CMO_POPA, |ctx, _, monitor| {
        let select = ctx.arg[1];
        let operand = sanitize(ctx.arg[0], select & 1, (select >> 1) & 1);
        monitor.platform.dc_cipapa(operand);
        monitor.platform.dsb();
        Ok(())
    });

    listen!(mainloop, ServiceId::CMO_POE, |ctx, _, monitor| {
        let (ns, nse) = Pas::Realm.ns_nse();
        monitor.platform.dc_cipae(sanitize(ctx.arg[0], ns, nse));
        monitor.platform.dsb();
        Ok(())
    });

    listen!(mainloop, ServiceId::DATA_CACHE_OP, |ctx, _, monitor| {
        let (va, length) = (ctx.arg[0], ctx.arg[1]);
        if length == 0 {
            return Ok(());
        }
        let end = va.checked_add(length).ok_or(Error::CacheRange)?;

        let line = dcache_line_size(&monitor.platform);
        let mut addr = va & !(line - 1);
        while addr < end {
            monitor.platform.dc_civac(addr);
            match addr.checked_add(line) {
                Some(next) => addr = next,
                None => break,
            }
        }
        monitor.platform.dsb();
        Ok(())
    });
}
