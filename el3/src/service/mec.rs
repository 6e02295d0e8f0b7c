//! Memory Encryption Contexts.

use super::scr;
use crate::error::Error;
use crate::event::Mainloop;
use crate::platform::{Platform, SysReg};
use crate::service::ServiceId;

use armv9a::{LocalRegisterCopy, ScrEl3, MECIDR_EL2, SCTLR2_EL3};

pub mod op {
    pub const ENABLE: u64 = 0;
    pub const DISABLE: u64 = 1;
    pub const SET_MECID: u64 = 2;
    pub const READ_MECID: u64 = 3;
}

const SCTLR2_EMEC: u64 = 1 << 1;

fn set_enabled<P: Platform>(platform: &P, enable: bool) -> Result<(), Error> {
    let (set, clear) = match enable {
        true => (ScrEl3::MECEN, 0),
        false => (0, ScrEl3::MECEN),
    };
    scr::update_verified(platform, set, clear).map_err(|_| Error::Mec)?;

    let sctlr2 = platform.read_sysreg(SysReg::Sctlr2);
    let sctlr2 = match enable {
        true => sctlr2 | SCTLR2_EMEC,
        false => sctlr2 & !SCTLR2_EMEC,
    };
    platform.write_sysreg(SysReg::Sctlr2, sctlr2);
    platform.isb();

    let emec = LocalRegisterCopy::<u64, SCTLR2_EL3::Register>::new(platform.read_sysreg(SysReg::Sctlr2))
        .is_set(SCTLR2_EL3::EMEC);
    match emec == enable {
        true => Ok(()),
        false => Err(Error::Mec),
    }
}

fn mecid_width<P: Platform>(platform: &P) -> u32 {
    let mecidr = LocalRegisterCopy::<u64, MECIDR_EL2::Register>::new(platform.read_sysreg(SysReg::Mecidr));
    mecidr.read(MECIDR_EL2::MECIDWIDTHM1) as u32 + 1
}

fn set_mecid<P: Platform>(platform: &P, mecid: u64) -> Result<(), Error> {
    let width = mecid_width(platform);
    if mecid >> width != 0 {
        warn!("MECID {:#x} wider than {} bits", mecid, width);
        return Err(Error::Mec);
    }
    platform.write_sysreg(SysReg::MecidRlA, mecid);
    platform.isb();
    match platform.read_sysreg(SysReg::MecidRlA) == mecid {
        true => Ok(()),
        false => Err(Error::Mec),
    }
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::MEC, |ctx, reply, monitor| {
        let platform = &monitor.platform;
        match ctx.arg[0] {
            op::ENABLE => set_enabled(platform, true),
            op::DISABLE => set_enabled(platform, false),
            op::SET_MECID => set_mecid(platform, ctx.arg[1]),
            op::READ_MECID => {
                reply.set_data(0, platform.read_sysreg(SysReg::MecidRlA));
                Ok(())
            }
            _ => Err(Error::Mec),
        }
    });
}
