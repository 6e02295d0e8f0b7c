//! `Platform` over the real EL3 instructions and device frames.

use crate::config::SMMU;
use acs_el3::{Platform, SysReg};

use armv9a::asm;
use armv9a::regs::*;
use tock_registers::interfaces::{Readable, Writeable};

#[cfg(target_os = "none")]
extern "C" {
    fn val_el3_rme_install_handler();
    fn val_el3_enable_ns_encryption();
    fn val_el3_disable_ns_encryption();
    fn val_el3_prog_legacy_tz(enable: u64);
    fn val_el3_pas_filter_active_mode(active: u64);
}

pub struct Fvp;

impl Fvp {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for Fvp {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for Fvp {
    fn read_sysreg(&self, reg: SysReg) -> u64 {
        match reg {
            SysReg::Scr => SCR_EL3.get(),
            SysReg::Sctlr => SCTLR_EL3.get(),
            SysReg::Sctlr2 => SCTLR2_EL3.get(),
            SysReg::Tcr => TCR_EL3.get(),
            SysReg::Mair => MAIR_EL3.get(),
            SysReg::Ttbr0 => TTBR0_EL3.get(),
            SysReg::Vbar => VBAR_EL3.get(),
            SysReg::Gpccr => GPCCR_EL3.get(),
            SysReg::Gptbr => GPTBR_EL3.get(),
            SysReg::CntpsCtl => CNTPS_CTL_EL1.get(),
            SysReg::CntpsTval => CNTPS_TVAL_EL1.get(),
            SysReg::Cntfrq => CNTFRQ_EL0.get(),
            SysReg::Ctr => CTR_EL0.get(),
            SysReg::MecidRlA => MECID_RL_A_EL3.get(),
            SysReg::Mecidr => MECIDR_EL2.get(),
        }
    }

    fn write_sysreg(&self, reg: SysReg, value: u64) {
        match reg {
            SysReg::Scr => SCR_EL3.set(value),
            SysReg::Sctlr => SCTLR_EL3.set(value),
            SysReg::Sctlr2 => SCTLR2_EL3.set(value),
            SysReg::Tcr => TCR_EL3.set(value),
            SysReg::Mair => MAIR_EL3.set(value),
            SysReg::Ttbr0 => TTBR0_EL3.set(value),
            SysReg::Vbar => VBAR_EL3.set(value),
            SysReg::Gpccr => GPCCR_EL3.set(value),
            SysReg::Gptbr => GPTBR_EL3.set(value),
            SysReg::CntpsCtl => CNTPS_CTL_EL1.set(value),
            SysReg::CntpsTval => CNTPS_TVAL_EL1.set(value),
            SysReg::MecidRlA => MECID_RL_A_EL3.set(value),
            // read-only identification registers
            SysReg::Cntfrq | SysReg::Ctr | SysReg::Mecidr => {
                warn!("ignoring write of {:#x} to {:?}", value, reg)
            }
        }
    }

    fn at_s1e3r(&self, va: u64) -> u64 {
        asm::at_s1e3r_raw(va);
        asm::isb();
        PAR_EL1.get()
    }

    fn at_s1e3w(&self, va: u64) -> u64 {
        asm::at_s1e3w_raw(va);
        asm::isb();
        PAR_EL1.get()
    }

    fn mmio_read32(&self, addr: u64) -> u32 {
        // SAFETY: callers pass device addresses of the EL3 flat map.
        unsafe { (addr as *const u32).read_volatile() }
    }

    fn mmio_write32(&self, addr: u64, value: u32) {
        // SAFETY: see `mmio_read32`.
        unsafe { (addr as *mut u32).write_volatile(value) }
    }

    fn mem_read64(&self, addr: u64) -> u64 {
        // SAFETY: EL3 reaches physical memory through an identity map.
        unsafe { (addr as *const u64).read_volatile() }
    }

    fn mem_write64(&self, addr: u64, value: u64) {
        // SAFETY: see `mem_read64`.
        unsafe { (addr as *mut u64).write_volatile(value) }
    }

    fn mem_write8(&self, addr: u64, value: u8) {
        // SAFETY: see `mem_read64`.
        unsafe { (addr as *mut u8).write_volatile(value) }
    }

    fn dsb(&self) {
        asm::dsb_sy();
    }

    fn isb(&self) {
        asm::isb();
    }

    fn tlbi_vae3(&self, va: u64) {
        asm::tlbi_vae3(va >> 12);
    }

    fn tlbi_alle3(&self) {
        asm::tlbi_alle3();
    }

    fn tlbi_paallos(&self) {
        asm::tlbi_paallos();
    }

    fn dc_civac(&self, va: u64) {
        asm::dc_civac(va);
    }

    fn dc_cipapa(&self, operand: u64) {
        asm::dc_cipapa(operand);
    }

    fn dc_cipae(&self, operand: u64) {
        asm::dc_cipae(operand);
    }

    fn mask_interrupts(&self) {
        asm::mask_daif();
    }

    fn install_exception_handler(&self) {
        #[cfg(target_os = "none")]
        // SAFETY: board helper with no arguments.
        unsafe {
            val_el3_rme_install_handler()
        };
    }

    fn set_ns_encryption(&self, enable: bool) {
        #[cfg(target_os = "none")]
        // SAFETY: board helper with no arguments.
        unsafe {
            match enable {
                true => val_el3_enable_ns_encryption(),
                false => val_el3_disable_ns_encryption(),
            }
        };
        #[cfg(not(target_os = "none"))]
        let _ = enable;
    }

    fn program_legacy_tz(&self, enable: bool) {
        #[cfg(target_os = "none")]
        // SAFETY: board helper taking a flag.
        unsafe {
            val_el3_prog_legacy_tz(enable as u64)
        };
        #[cfg(not(target_os = "none"))]
        let _ = enable;
    }

    fn set_pas_filter_mode(&self, active: bool) {
        #[cfg(target_os = "none")]
        // SAFETY: board helper taking a flag.
        unsafe {
            val_el3_pas_filter_active_mode(active as u64)
        };
        #[cfg(not(target_os = "none"))]
        let _ = active;
    }

    fn smmu_base(&self, index: u32) -> Option<u64> {
        SMMU.get(index as usize).map(|(base, _)| *base)
    }

    fn smmu_root_base(&self, index: u32) -> Option<u64> {
        SMMU.get(index as usize).map(|(_, root)| *root)
    }
}
