//! Security state, encryption and filter controls.

use super::scr;
use crate::channel::SET;
use crate::error::Error;
use crate::event::Mainloop;
use crate::mm::attr::Pas;
use crate::platform::Platform;
use crate::service::ServiceId;

use armv9a::ScrEl3;

pub mod pas_filter {
    pub const INACTIVE: u64 = 0;
    pub const ACTIVE: u64 = 1;
}

/// SCR_EL3 (set, clear) masks that select `target` for the lower levels.
pub fn scr_masks(target: Pas) -> Option<(u64, u64)> {
    let (ns, nse) = match target {
        Pas::Root => return None,
        pas => pas.ns_nse(),
    };
    let mut scr = ScrEl3::new(0);
    scr.set_masked_value(ScrEl3::NS, ns)
        .set_masked_value(ScrEl3::NSE, nse);
    let set = scr.get();
    Some((set, (ScrEl3::NS | ScrEl3::NSE) & !set))
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::INSTALL_HANDLER, |_, _, monitor| {
        monitor.platform.install_exception_handler();
        Ok(())
    });

    listen!(mainloop, ServiceId::NS_ENCRYPTION, |ctx, _, monitor| {
        let enable = ctx.arg[0] == SET as u64;
        monitor.platform.set_ns_encryption(enable);
        monitor.platform.dsb();
        monitor.platform.isb();
        Ok(())
    });

    listen!(mainloop, ServiceId::LEGACY_TZ_ENABLE, |ctx, _, monitor| {
        monitor.platform.program_legacy_tz(ctx.arg[0] != 0);
        Ok(())
    });

    listen!(mainloop, ServiceId::PAS_FILTER, |ctx, _, monitor| {
        let active = match ctx.arg[0] {
            pas_filter::ACTIVE => true,
            pas_filter::INACTIVE => false,
            _ => return Err(Error::PasFilterMode),
        };
        monitor.platform.set_pas_filter_mode(active);
        Ok(())
    });

    listen!(mainloop, ServiceId::SECURITY_STATE, |ctx, _, monitor| {
        let target = Pas::from_bits(ctx.arg[0]).ok_or(Error::SecurityState)?;
        let (set, clear) = scr_masks(target).ok_or(Error::SecurityState)?;
        scr::update_verified(&monitor.platform, set, clear).map_err(|_| Error::SecurityState)?;
        info!("lower levels now run in {:?}", target);
        Ok(())
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::*;
    use crate::SysReg;

    const NS: u64 = 1;
    const NSE: u64 = 1 << 62;

    #[test]
    fn masks_per_target() {
        assert_eq!(scr_masks(Pas::Secure), Some((0, NS | NSE)));
        assert_eq!(scr_masks(Pas::NonSecure), Some((NS, NSE)));
        assert_eq!(scr_masks(Pas::Realm), Some((NS | NSE, 0)));
        assert_eq!(scr_masks(Pas::Root), None);
    }

    #[test]
    fn switch_to_realm_and_back() {
        let h = Harness::new();
        h.platform().set_sysreg(SysReg::Scr, 0x730);

        let shared = h.call(ServiceId::SECURITY_STATE, [3, 0, 0]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(h.platform().sysreg(SysReg::Scr), 0x730 | NS | NSE);

        let shared = h.call(ServiceId::SECURITY_STATE, [1, 0, 0]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(h.platform().sysreg(SysReg::Scr), 0x730 | NS);

        let shared = h.call(ServiceId::SECURITY_STATE, [0, 0, 0]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(h.platform().sysreg(SysReg::Scr), 0x730);
    }

    #[test]
    fn invalid_targets_fail() {
        let h = Harness::new();
        for target in [2, 4, u64::MAX] {
            let shared = h.call(ServiceId::SECURITY_STATE, [target, 0, 0]);
            assert_eq!(shared.status_code, 1);
            assert_eq!(shared.message(), "security state change failed");
        }

        h.platform().ignore_writes(SysReg::Scr, NSE);
        let shared = h.call(ServiceId::SECURITY_STATE, [3, 0, 0]);
        assert_eq!(shared.status_code, 1);
    }

    #[test]
    fn platform_controls_are_forwarded() {
        let h = Harness::new();
        h.call(ServiceId::INSTALL_HANDLER, [0; 3]);
        h.call(ServiceId::NS_ENCRYPTION, [1, 0, 0]);
        h.call(ServiceId::LEGACY_TZ_ENABLE, [5, 0, 0]);
        h.call(ServiceId::PAS_FILTER, [1, 0, 0]);

        let controls = h.platform().controls();
        assert!(controls.handler_installed);
        assert_eq!(controls.ns_encryption, Some(true));
        assert_eq!(controls.legacy_tz, Some(true));
        assert_eq!(controls.pas_filter_active, Some(true));

        h.call(ServiceId::NS_ENCRYPTION, [7, 0, 0]);
        assert_eq!(h.platform().controls().ns_encryption, Some(false));
    }

    #[test]
    fn pas_filter_rejects_unknown_modes() {
        let h = Harness::new();
        let shared = h.call(ServiceId::PAS_FILTER, [2, 0, 0]);
        assert_eq!(shared.status_code, 1);
        assert_eq!(shared.message(), "invalid PAS filter mode");
        assert_eq!(h.platform().controls().pas_filter_active, None);
    }
}
