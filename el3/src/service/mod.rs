//! The service catalog and the handlers behind each identifier.

pub mod cache;
pub mod gpt;
pub mod mec;
pub mod memory;
pub mod mmu;
pub mod realm;
pub mod regs;
pub mod scr;
pub mod security;
pub mod smmu;
pub mod timer;
pub mod watchdog;

define_interface! {
    service {
        INSTALL_HANDLER = 0x0,
        ADD_GPT_ENTRY = 0x1,
        ADD_MMU_ENTRY = 0x2,
        MAP_SHARED_CHANNEL = 0x3,
        CMO_POPA = 0x4,
        ACCESS_MUT = 0x5,
        DATA_CACHE_OP = 0x6,
        MEM_SET = 0x7,
        NS_ENCRYPTION = 0x8,
        REG_COMPARE = 0x9,
        LEGACY_TZ_ENABLE = 0xA,
        ROOT_WATCHDOG = 0xB,
        PAS_FILTER = 0xC,
        SMMU_ROOT_ACCESS = 0xD,
        SECURITY_STATE = 0xE,
        SMMU_CONFIG = 0xF,
        REALM_PGT_CREATE = 0x10,
        REALM_PGT_DESTROY = 0x11,
        MEC = 0x12,
        CMO_POE = 0x13,
        READ_COUNTER = 0x14,
        READ_COUNTER_ID = 0x15,
        SECURE_TIMER = 0x16,
        READ_SCR = 0x17,
        UPDATE_SCR = 0x18,
        READ_BANKED_REG = 0x19,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_is_total() {
        assert_eq!(ServiceId::decode(0x0), Some(ServiceId::INSTALL_HANDLER));
        assert_eq!(ServiceId::decode(0x19), Some(ServiceId::READ_BANKED_REG));
        assert_eq!(ServiceId::decode(0x1a), None);
        assert_eq!(ServiceId::decode(u64::MAX), None);
        assert_eq!(ServiceId::ALL.len(), 0x1a);
    }

    #[test]
    fn names() {
        assert_eq!(to_str(0x18), "UPDATE_SCR");
        assert_eq!(to_str(0x99), "UNDEFINED");
    }
}
