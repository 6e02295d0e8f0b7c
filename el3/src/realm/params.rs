use crate::caller::Accessor;

/// One region of a realm table request. A zero `length` ends the list.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionDescriptor {
    pub va: u64,
    pub pa: u64,
    pub length: u64,
    pub attributes: u64,
}

const_assert_size!(RegionDescriptor, 32);

impl Accessor for RegionDescriptor {}

/// Handle for a created realm table, written back to the caller.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PgtDescriptor {
    pub pgt_base: u64,
    pub ias: u32,
    pub oas: u32,
    pub stage: u32,
    pub levels: u32,
    pub mair: u64,
    pub tcr: u64,
}

const_assert_size!(PgtDescriptor, 40);

impl Accessor for PgtDescriptor {
    fn validate(&self) -> bool {
        self.pgt_base != 0
    }
}
