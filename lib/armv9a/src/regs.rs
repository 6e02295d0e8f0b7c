#![allow(unused_attributes)]

#[macro_use]
mod macros;

use crate::bits_in_reg;

define_sys_register!(SCR_EL3, "SCR_EL3", [
    NSE OFFSET(62) NUMBITS(1) [],
    MECEN OFFSET(49) NUMBITS(1) [],
    GPF OFFSET(48) NUMBITS(1) [],
    EEL2 OFFSET(18) NUMBITS(1) [],
    RW OFFSET(10) NUMBITS(1) [],
    HCE OFFSET(8) NUMBITS(1) [],
    SMD OFFSET(7) NUMBITS(1) [],
    EA OFFSET(3) NUMBITS(1) [],
    FIQ OFFSET(2) NUMBITS(1) [],
    IRQ OFFSET(1) NUMBITS(1) [],
    NS OFFSET(0) NUMBITS(1) []
]);
pub const SCR_EL3: SCR_EL3::Reg = SCR_EL3::Reg {};

define_sys_register!(SCTLR_EL3, "SCTLR_EL3", [
    EE OFFSET(25) NUMBITS(1) [],
    WXN OFFSET(19) NUMBITS(1) [],
    I OFFSET(12) NUMBITS(1) [],
    SA OFFSET(3) NUMBITS(1) [],
    C OFFSET(2) NUMBITS(1) [],
    A OFFSET(1) NUMBITS(1) [],
    M OFFSET(0) NUMBITS(1) []
]);
pub const SCTLR_EL3: SCTLR_EL3::Reg = SCTLR_EL3::Reg {};

// FEAT_SCTLR2
define_sys_register!(SCTLR2_EL3, "S3_6_C1_C0_3", [
    EMEC OFFSET(1) NUMBITS(1) []
]);
pub const SCTLR2_EL3: SCTLR2_EL3::Reg = SCTLR2_EL3::Reg {};

define_sys_register!(TCR_EL3, "TCR_EL3", [
    PS OFFSET(16) NUMBITS(3) [],
    TG0 OFFSET(14) NUMBITS(2) [],
    SH0 OFFSET(12) NUMBITS(2) [],
    ORGN0 OFFSET(10) NUMBITS(2) [],
    IRGN0 OFFSET(8) NUMBITS(2) [],
    T0SZ OFFSET(0) NUMBITS(6) []
]);
pub const TCR_EL3: TCR_EL3::Reg = TCR_EL3::Reg {};

define_sys_register!(MAIR_EL3, "MAIR_EL3", [
    ATTR2 OFFSET(16) NUMBITS(8) [],
    ATTR1 OFFSET(8) NUMBITS(8) [],
    ATTR0 OFFSET(0) NUMBITS(8) []
]);
pub const MAIR_EL3: MAIR_EL3::Reg = MAIR_EL3::Reg {};

define_sys_register!(TTBR0_EL3, "TTBR0_EL3", [
    BADDR OFFSET(1) NUMBITS(47) [],
    CNP OFFSET(0) NUMBITS(1) []
]);
pub const TTBR0_EL3: TTBR0_EL3::Reg = TTBR0_EL3::Reg {};

define_sys_register!(VBAR_EL3, "VBAR_EL3", [
    ADDR OFFSET(11) NUMBITS(53) []
]);
pub const VBAR_EL3: VBAR_EL3::Reg = VBAR_EL3::Reg {};

// FEAT_RME
define_sys_register!(GPCCR_EL3, "S3_6_C2_C1_6", [
    L0GPTSZ OFFSET(20) NUMBITS(4) [],
    GPCP OFFSET(17) NUMBITS(1) [],
    GPC OFFSET(16) NUMBITS(1) [],
    PGS OFFSET(14) NUMBITS(2) [],
    SH OFFSET(12) NUMBITS(2) [],
    ORGN OFFSET(10) NUMBITS(2) [],
    IRGN OFFSET(8) NUMBITS(2) [],
    PPS OFFSET(0) NUMBITS(3) []
]);
pub const GPCCR_EL3: GPCCR_EL3::Reg = GPCCR_EL3::Reg {};

define_sys_register!(GPTBR_EL3, "S3_6_C2_C1_4", [
    BADDR OFFSET(0) NUMBITS(40) []
]);
pub const GPTBR_EL3: GPTBR_EL3::Reg = GPTBR_EL3::Reg {};

define_sys_register!(CNTPS_CTL_EL1, "CNTPS_CTL_EL1", [
    ISTATUS OFFSET(2) NUMBITS(1) [],
    IMASK OFFSET(1) NUMBITS(1) [],
    ENABLE OFFSET(0) NUMBITS(1) []
]);
pub const CNTPS_CTL_EL1: CNTPS_CTL_EL1::Reg = CNTPS_CTL_EL1::Reg {};

define_sys_register!(CNTPS_TVAL_EL1, "CNTPS_TVAL_EL1", [
    TIMERVALUE OFFSET(0) NUMBITS(32) []
]);
pub const CNTPS_TVAL_EL1: CNTPS_TVAL_EL1::Reg = CNTPS_TVAL_EL1::Reg {};

define_sys_register!(CNTFRQ_EL0, "CNTFRQ_EL0", [
    FREQ OFFSET(0) NUMBITS(32) []
]);
pub const CNTFRQ_EL0: CNTFRQ_EL0::Reg = CNTFRQ_EL0::Reg {};

define_sys_register!(CTR_EL0, "CTR_EL0", [
    DMINLINE OFFSET(16) NUMBITS(4) [],
    IMINLINE OFFSET(0) NUMBITS(4) []
]);
pub const CTR_EL0: CTR_EL0::Reg = CTR_EL0::Reg {};

// FEAT_MEC
define_sys_register!(MECID_RL_A_EL3, "S3_6_C10_C10_1", [
    MECID OFFSET(0) NUMBITS(16) []
]);
pub const MECID_RL_A_EL3: MECID_RL_A_EL3::Reg = MECID_RL_A_EL3::Reg {};

define_sys_register!(MECIDR_EL2, "S3_4_C10_C8_7", [
    MECIDWIDTHM1 OFFSET(0) NUMBITS(4) []
]);
pub const MECIDR_EL2: MECIDR_EL2::Reg = MECIDR_EL2::Reg {};

define_sys_register!(PAR_EL1, "PAR_EL1", [
    PA OFFSET(12) NUMBITS(40) [],
    F OFFSET(0) NUMBITS(1) []
]);
pub const PAR_EL1: PAR_EL1::Reg = PAR_EL1::Reg {};

pub const PAR_EL1_F: u64 = 1;

define_bits!(
    ScrEl3,
    NSE[62 - 62],
    MECEN[49 - 49],
    NS[0 - 0]
);

define_bits!(
    Ttbr,
    // Translation table base, 4KB aligned.
    BADDR[47 - 12],
    CNP[0 - 0]
);

/// MAIR_EL3 attribute encodings, indexed by AttrIndx.
pub mod mair_attr {
    pub const DEVICE_NGNRNE: u64 = 0x00;
    pub const NORMAL_NC: u64 = 0x44;
    pub const NORMAL_WBWA: u64 = 0xff;
}

pub const MAIR_EL3_DEFAULT: u64 = bits_in_reg(0xff, mair_attr::DEVICE_NGNRNE)
    | bits_in_reg(0xff00, mair_attr::NORMAL_NC)
    | bits_in_reg(0xff_0000, mair_attr::NORMAL_WBWA);
