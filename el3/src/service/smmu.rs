//! SMMU register bank bridge and root page control.

use crate::config::SMMU_ACK_POLL_LIMIT;
use crate::error::Error;
use crate::event::{Context, Mainloop};
use crate::platform::Platform;
use crate::service::ServiceId;

use armv9a::mmio::{smmu, SMMU_ROOT_CR0};
use armv9a::LocalRegisterCopy;

pub mod bank {
    pub const NON_SECURE: u64 = 0;
    pub const SECURE: u64 = 1;
}

/// A Page 0 register offset must stay inside one bank.
const BANK_SIZE: u64 = smmu::SECURE_BANK;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BankedRead {
    pub index: u32,
    pub offset: u64,
    pub secure: bool,
}

impl TryFrom<&Context> for BankedRead {
    type Error = Error;

    fn try_from(ctx: &Context) -> Result<Self, Error> {
        let (packed, bank) = (ctx.arg[0], ctx.arg[1]);
        let offset = packed & 0xffff_ffff;
        let secure = match bank {
            bank::NON_SECURE => false,
            bank::SECURE => true,
            _ => return Err(Error::SmmuBank),
        };
        if offset % 4 != 0 || offset >= BANK_SIZE {
            return Err(Error::SmmuBank);
        }
        Ok(Self {
            index: (packed >> 32) as u32,
            offset,
            secure,
        })
    }
}

impl BankedRead {
    fn address(&self, base: u64) -> u64 {
        match self.secure {
            true => base + smmu::SECURE_BANK + self.offset,
            false => base + self.offset,
        }
    }
}

type RootCr0 = LocalRegisterCopy<u32, SMMU_ROOT_CR0::Register>;

fn set_root_access<P: Platform>(platform: &P, root: u64, enable: bool) -> Result<(), Error> {
    let mut cr0 = RootCr0::new(platform.mmio_read32(root + smmu::ROOT_CR0));
    let value = match enable {
        true => SMMU_ROOT_CR0::ACCESSEN::SET + SMMU_ROOT_CR0::GPCEN::SET,
        false => SMMU_ROOT_CR0::ACCESSEN::CLEAR + SMMU_ROOT_CR0::GPCEN::CLEAR,
    };
    cr0.modify(value);
    platform.mmio_write32(root + smmu::ROOT_CR0, cr0.get());
    platform.dsb();

    for _ in 0..SMMU_ACK_POLL_LIMIT {
        let ack = RootCr0::new(platform.mmio_read32(root + smmu::ROOT_CR0ACK));
        if ack.read(SMMU_ROOT_CR0::ACCESSEN) == cr0.read(SMMU_ROOT_CR0::ACCESSEN)
            && ack.read(SMMU_ROOT_CR0::GPCEN) == cr0.read(SMMU_ROOT_CR0::GPCEN)
        {
            return Ok(());
        }
    }
    warn!("SMMU root {:#x} did not acknowledge CR0 {:#x}", root, cr0.get());
    Err(Error::SmmuAck)
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::READ_BANKED_REG, |ctx, reply, monitor| {
        let req = BankedRead::try_from(ctx)?;
        let value = match monitor.platform.smmu_base(req.index) {
            Some(base) => monitor.platform.mmio_read32(req.address(base)),
            None => {
                debug!("no SMMU {}", req.index);
                0
            }
        };
        reply.set_data(0, value as u64);
        Ok(())
    });

    listen!(mainloop, ServiceId::SMMU_ROOT_ACCESS, |ctx, _, monitor| {
        let root = monitor
            .platform
            .smmu_root_base(ctx.arg[0] as u32)
            .ok_or(Error::SmmuNotPresent)?;
        set_root_access(&monitor.platform, root, ctx.arg[1] != 0)
    });

    listen!(mainloop, ServiceId::SMMU_CONFIG, |ctx, reply, monitor| {
        let (index, offset, expected) = (ctx.arg[0] as u32, ctx.arg[1], ctx.arg[2]);
        if offset % 4 != 0 {
            return Err(Error::SmmuBank);
        }
        let root = monitor
            .platform
            .smmu_root_base(index)
            .ok_or(Error::SmmuNotPresent)?;
        let value = monitor.platform.mmio_read32(root + offset) as u64;
        reply.set_data(0, value);
        match value == expected {
            true => Ok(()),
            false => Err(Error::SmmuConfigMismatch),
        }
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn banked_reads() {
        let h = Harness::new();
        h.platform().mmio_set(SMMU0_BASE + 0x1c, 0x2);
        h.platform().mmio_set(SMMU0_BASE + 0x8000 + 0x1c, 0x8);

        let shared = h.call(ServiceId::READ_BANKED_REG, [0x1c, 0, 0]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(shared.shared_data_access[0].data, 0x2);

        let shared = h.call(ServiceId::READ_BANKED_REG, [0x1c, 1, 0]);
        assert_eq!(shared.shared_data_access[0].data, 0x8);

        // unimplemented secure bank
        let shared = h.call(ServiceId::READ_BANKED_REG, [0x40, 1, 0]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(shared.shared_data_access[0].data, 0);
    }

    #[test]
    fn missing_smmu_reads_zero() {
        let h = Harness::new();
        h.channel_mut().shared_data_access[0].data = 0x55;
        let shared = h.call(ServiceId::READ_BANKED_REG, [7 << 32 | 0x1c, 0, 0]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(shared.shared_data_access[0].data, 0);
    }

    #[test]
    fn malformed_bank_requests() {
        let h = Harness::new();
        for (packed, bank) in [(0x1c, 2), (0x1e, 0), (0x8000, 0), (0xffff_fffc, 1)] {
            let shared = h.call(ServiceId::READ_BANKED_REG, [packed, bank, 0]);
            assert_eq!(shared.status_code, 1);
            assert_eq!(shared.message(), "invalid SMMU register bank request");
        }
    }

    #[test]
    fn root_access_toggles_and_waits_for_ack() {
        let h = Harness::new();
        let shared = h.call(ServiceId::SMMU_ROOT_ACCESS, [0, 1, 0]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(h.platform().mmio_get(SMMU0_ROOT + smmu::ROOT_CR0) & 0x3, 0x3);

        let shared = h.call(ServiceId::SMMU_ROOT_ACCESS, [0, 0, 0]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(h.platform().mmio_get(SMMU0_ROOT + smmu::ROOT_CR0) & 0x3, 0);
    }

    #[test]
    fn root_access_failures() {
        let h = Harness::new();
        let shared = h.call(ServiceId::SMMU_ROOT_ACCESS, [3, 1, 0]);
        assert_eq!(shared.message(), "SMMU not present");

        h.platform().freeze_smmu_ack();
        let shared = h.call(ServiceId::SMMU_ROOT_ACCESS, [0, 1, 0]);
        assert_eq!(shared.status_code, 1);
        assert_eq!(shared.message(), "SMMU root access update not acknowledged");
    }

    #[test]
    fn root_config_compare() {
        let h = Harness::new();
        h.platform().mmio_set(SMMU0_ROOT + 0x8, 0x1234);

        let shared = h.call(ServiceId::SMMU_CONFIG, [0, 0x8, 0x1234]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(shared.shared_data_access[0].data, 0x1234);

        let shared = h.call(ServiceId::SMMU_CONFIG, [0, 0x8, 0x1235]);
        assert_eq!(shared.status_code, 1);
        assert_eq!(shared.message(), "SMMU root config mismatch");
        assert_eq!(shared.shared_data_access[0].data, 0x1234);
    }
}
