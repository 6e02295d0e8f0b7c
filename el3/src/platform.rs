//! The seam between the dispatcher and the machine it runs on.
//!
//! Everything that touches a system register, a device or physical memory
//! goes through [`Platform`], so the services can run against a simulated
//! machine on the host.

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SysReg {
    Scr,
    Sctlr,
    Sctlr2,
    Tcr,
    Mair,
    Ttbr0,
    Vbar,
    Gpccr,
    Gptbr,
    CntpsCtl,
    CntpsTval,
    Cntfrq,
    Ctr,
    MecidRlA,
    Mecidr,
}

pub trait Platform: Sync + 'static {
    fn read_sysreg(&self, reg: SysReg) -> u64;
    fn write_sysreg(&self, reg: SysReg, value: u64);

    /// Stage 1 EL3 address translation. Returns the resulting PAR value.
    fn at_s1e3r(&self, va: u64) -> u64;
    fn at_s1e3w(&self, va: u64) -> u64;

    fn mmio_read32(&self, addr: u64) -> u32;
    fn mmio_write32(&self, addr: u64, value: u32);

    /// Accesses to identity-mapped memory.
    fn mem_read64(&self, addr: u64) -> u64;
    fn mem_write64(&self, addr: u64, value: u64);
    fn mem_write8(&self, addr: u64, value: u8);

    fn dsb(&self);
    fn isb(&self);
    fn tlbi_vae3(&self, va: u64);
    fn tlbi_alle3(&self);
    fn tlbi_paallos(&self);
    fn dc_civac(&self, va: u64);
    fn dc_cipapa(&self, operand: u64);
    fn dc_cipae(&self, operand: u64);

    fn mask_interrupts(&self);

    fn install_exception_handler(&self);
    fn set_ns_encryption(&self, enable: bool);
    fn program_legacy_tz(&self, enable: bool);
    fn set_pas_filter_mode(&self, active: bool);

    /// Page 0 base of SMMU `index`, if that SMMU exists.
    fn smmu_base(&self, index: u32) -> Option<u64>;
    /// Root register page of SMMU `index`.
    fn smmu_root_base(&self, index: u32) -> Option<u64>;
}
