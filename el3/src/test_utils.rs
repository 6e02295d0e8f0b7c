//! A simulated machine for host tests.

use crate::channel::SharedData;
use crate::event::Mainloop;
use crate::gpt::entry::l0_type;
use crate::gpt::Gpi;
use crate::mm::attr::{MemAttributes, Pas};
use crate::mm::page_table::{Desc, TranslationTable};
use crate::monitor::Monitor;
use crate::platform::{Platform, SysReg};
use crate::service::ServiceId;

use alloc::boxed::Box;
use alloc::collections::btree_map::BTreeMap;
use alloc::vec::Vec;
use armv9a::{mmio::smmu, PAR_EL1_F};
use spin::mutex::Mutex;

pub const SMMU0_BASE: u64 = 0x2b40_0000;
pub const SMMU0_ROOT: u64 = 0x2b42_0000;

const VA_BITS: u32 = 48;
const AP_RO: u64 = 0b10;

#[repr(C, align(4096))]
pub struct PageAligned<const N: usize>(pub [u8; N]);

/// Maintenance and control operations, in issue order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Dsb,
    Isb,
    TlbiVae3(u64),
    TlbiAlle3,
    TlbiPaallos,
    DcCivac(u64),
    DcCipapa(u64),
    DcCipae(u64),
    MaskInterrupts,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub handler_installed: bool,
    pub ns_encryption: Option<bool>,
    pub legacy_tz: Option<bool>,
    pub pas_filter_active: Option<bool>,
}

struct Counter {
    value: u64,
    step: u64,
}

#[derive(Default)]
struct State {
    sysregs: BTreeMap<SysReg, u64>,
    ignored: BTreeMap<SysReg, u64>,
    mmio: BTreeMap<u64, u32>,
    counters: BTreeMap<u64, Counter>,
    events: Vec<Event>,
    controls: Controls,
    smmu_ack_frozen: bool,
}

pub struct MockPlatform {
    // keeps the EL3 regime behind TTBR0_EL3 alive
    root: Mutex<TranslationTable>,
    state: Mutex<State>,
}

impl MockPlatform {
    pub fn new() -> Self {
        let root = TranslationTable::new(VA_BITS).unwrap();
        let mut state = State::default();
        state.sysregs.insert(SysReg::Ttbr0, root.base());
        state.sysregs.insert(SysReg::Tcr, 64 - VA_BITS as u64);
        state.sysregs.insert(SysReg::Ctr, 4 << 16);
        Self {
            root: Mutex::new(root),
            state: Mutex::new(state),
        }
    }

    pub fn set_sysreg(&self, reg: SysReg, value: u64) {
        self.state.lock().sysregs.insert(reg, value);
    }

    pub fn sysreg(&self, reg: SysReg) -> u64 {
        self.read_sysreg(reg)
    }

    /// `mask` bits keep their value on every later write of `reg`.
    pub fn ignore_writes(&self, reg: SysReg, mask: u64) {
        *self.state.lock().ignored.entry(reg).or_default() |= mask;
    }

    pub fn take_events(&self) -> Vec<Event> {
        core::mem::take(&mut self.state.lock().events)
    }

    pub fn controls(&self) -> Controls {
        self.state.lock().controls
    }

    pub fn mmio_set(&self, addr: u64, value: u32) {
        self.state.lock().mmio.insert(addr, value);
    }

    pub fn mmio_get(&self, addr: u64) -> u32 {
        self.state.lock().mmio.get(&addr).copied().unwrap_or(0)
    }

    /// A free running counter at `base` that moves by `step` on every
    /// read of either half.
    pub fn install_counter(&self, base: u64, start: u64, step: u64) {
        self.state
            .lock()
            .counters
            .insert(base, Counter { value: start, step });
    }

    pub fn freeze_smmu_ack(&self) {
        self.state.lock().smmu_ack_frozen = true;
    }

    fn map(&self, base: u64, pages: usize, attrs: MemAttributes) {
        let root = self.root.lock();
        // SAFETY: the root is owned by this mock and its lock is held.
        let mut table = unsafe { TranslationTable::from_base(root.base(), VA_BITS).unwrap() };
        for i in 0..pages as u64 {
            let page = (base & !0xfff) + i * 0x1000;
            table
                .map_page(page, page, attrs.descriptor_bits(), || {})
                .unwrap();
        }
    }

    pub fn identity_map(&self, base: u64, pages: usize) {
        self.map(base, pages, MemAttributes::normal(Pas::NonSecure));
    }

    pub fn identity_map_ro(&self, base: u64, pages: usize) {
        let attrs = MemAttributes {
            read_only: true,
            ..MemAttributes::normal(Pas::NonSecure)
        };
        self.map(base, pages, attrs);
    }

    fn at(&self, va: u64, write: bool) -> u64 {
        let ttbr = self.read_sysreg(SysReg::Ttbr0);
        let va_bits = 64 - (self.read_sysreg(SysReg::Tcr) & 0x3f) as u32;
        // SAFETY: the walk only reads tables this mock or El3Mmu installed.
        let table = match unsafe { TranslationTable::from_base(ttbr, va_bits) } {
            Ok(table) => table,
            Err(_) => return PAR_EL1_F,
        };
        match table.translate(va) {
            Some(t) if write && Desc::new(t.desc).get_masked_value(Desc::AP) == AP_RO => PAR_EL1_F,
            Some(t) => t.pa & !0xfff,
            None => PAR_EL1_F,
        }
    }

    fn push(&self, event: Event) {
        self.state.lock().events.push(event);
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MockPlatform {
    fn read_sysreg(&self, reg: SysReg) -> u64 {
        self.state.lock().sysregs.get(&reg).copied().unwrap_or(0)
    }

    fn write_sysreg(&self, reg: SysReg, value: u64) {
        let mut state = self.state.lock();
        let mask = state.ignored.get(&reg).copied().unwrap_or(0);
        let old = state.sysregs.get(&reg).copied().unwrap_or(0);
        state.sysregs.insert(reg, (old & mask) | (value & !mask));
    }

    fn at_s1e3r(&self, va: u64) -> u64 {
        self.at(va, false)
    }

    fn at_s1e3w(&self, va: u64) -> u64 {
        self.at(va, true)
    }

    fn mmio_read32(&self, addr: u64) -> u32 {
        let mut state = self.state.lock();
        for (base, counter) in state.counters.iter_mut() {
            let half = match addr.wrapping_sub(*base) {
                0x8 => counter.value as u32,
                0xc => (counter.value >> 32) as u32,
                _ => continue,
            };
            counter.value = counter.value.wrapping_add(counter.step);
            return half;
        }
        state.mmio.get(&addr).copied().unwrap_or(0)
    }

    fn mmio_write32(&self, addr: u64, value: u32) {
        let mut state = self.state.lock();
        state.mmio.insert(addr, value);
        if addr == SMMU0_ROOT + smmu::ROOT_CR0 && !state.smmu_ack_frozen {
            state.mmio.insert(SMMU0_ROOT + smmu::ROOT_CR0ACK, value);
        }
    }

    fn mem_read64(&self, addr: u64) -> u64 {
        // SAFETY: tests only hand out addresses of live host buffers.
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
        self.push(Event::Dsb);
    }

    fn isb(&self) {
        self.push(Event::Isb);
    }

    fn tlbi_vae3(&self, va: u64) {
        self.push(Event::TlbiVae3(va));
    }

    fn tlbi_alle3(&self) {
        self.push(Event::TlbiAlle3);
    }

    fn tlbi_paallos(&self) {
        self.push(Event::TlbiPaallos);
    }

    fn dc_civac(&self, va: u64) {
        self.push(Event::DcCivac(va));
    }

    fn dc_cipapa(&self, operand: u64) {
        self.push(Event::DcCipapa(operand));
    }

    fn dc_cipae(&self, operand: u64) {
        self.push(Event::DcCipae(operand));
    }

    fn mask_interrupts(&self) {
        self.push(Event::MaskInterrupts);
    }

    fn install_exception_handler(&self) {
        self.state.lock().controls.handler_installed = true;
    }

    fn set_ns_encryption(&self, enable: bool) {
        self.state.lock().controls.ns_encryption = Some(enable);
    }

    fn program_legacy_tz(&self, enable: bool) {
        self.state.lock().controls.legacy_tz = Some(enable);
    }

    fn set_pas_filter_mode(&self, active: bool) {
        self.state.lock().controls.pas_filter_active = Some(active);
    }

    fn smmu_base(&self, index: u32) -> Option<u64> {
        (index == 0).then_some(SMMU0_BASE)
    }

    fn smmu_root_base(&self, index: u32) -> Option<u64> {
        (index == 0).then_some(SMMU0_ROOT)
    }
}

#[repr(C, align(4096))]
struct GptPage([u64; 512]);

/// A 4GB protected space: 1GB L0 entries, 4KB granules. L0[0] points at a
/// fully populated L1 table, the other L0 entries are blocks.
pub struct MockGpt {
    l0_base: u64,
    _tables: [Vec<GptPage>; 2],
}

impl MockGpt {
    const L0_ENTRIES: usize = 4;
    // (1GB / 4KB) granules, 16 per entry, 512 entries per page
    const L1_PAGES: usize = (1 << 18) / 16 / 512;

    pub fn install(platform: &MockPlatform, gpi: Gpi) -> Self {
        let fill = (gpi as u64) * 0x1111_1111_1111_1111;
        let mut l1: Vec<GptPage> = (0..Self::L1_PAGES).map(|_| GptPage([fill; 512])).collect();
        let mut l0 = Vec::new();
        l0.push(GptPage([0; 512]));

        l0[0].0[0] = l1[0].0.as_mut_ptr() as u64 | l0_type::TABLE;
        for i in 1..Self::L0_ENTRIES {
            l0[0].0[i] = (gpi as u64) << 4 | l0_type::BLOCK;
        }

        // PPS 4GB, PGS 4KB, L0GPTSZ 1GB
        platform.set_sysreg(SysReg::Gpccr, 0);
        let l0_base = l0[0].0.as_mut_ptr() as u64;
        platform.set_sysreg(SysReg::Gptbr, l0_base >> 12);
        Self {
            l0_base,
            _tables: [l0, l1],
        }
    }

    pub fn set_l0(&self, index: usize, value: u64) {
        assert!(index < Self::L0_ENTRIES);
        // SAFETY: the table is owned by this mock and only touched through
        // volatile accesses.
        unsafe { (self.l0_base as *mut u64).add(index).write_volatile(value) };
    }
}

/// A monitor with every service registered and a channel for core 0.
pub struct Harness {
    pub mainloop: Mainloop<MockPlatform>,
    pub monitor: Monitor<MockPlatform>,
    channel: Option<*mut SharedData>,
}

impl Harness {
    pub fn new() -> Self {
        let mut h = Self::without_channel();
        let channel = Box::into_raw(Box::new(SharedData::new()));
        h.channel = Some(channel);
        h.call_on(0, ServiceId::MAP_SHARED_CHANNEL, [channel as u64, 0, 0]);
        assert_eq!(h.monitor.channels.lookup(0), Some(channel as u64));
        h
    }

    pub fn without_channel() -> Self {
        let mut mainloop = Mainloop::new();
        mainloop.add_event_handlers();
        Self {
            mainloop,
            monitor: Monitor::new(MockPlatform::new()),
            channel: None,
        }
    }

    pub fn platform(&self) -> &MockPlatform {
        &self.monitor.platform
    }

    #[allow(clippy::mut_from_ref)]
    pub fn channel_mut(&self) -> &mut SharedData {
        // SAFETY: owned by the harness until drop.
        unsafe { &mut *self.channel.unwrap() }
    }

    pub fn call_on(&self, caller: usize, id: ServiceId, arg: [u64; 3]) {
        self.mainloop.dispatch(&self.monitor, caller, id.raw(), arg);
    }

    /// Runs `id` on core 0 and returns a copy of the channel afterwards.
    pub fn call(&self, id: ServiceId, arg: [u64; 3]) -> SharedData {
        self.call_raw(id.raw(), arg)
    }

    pub fn call_raw(&self, raw: u64, arg: [u64; 3]) -> SharedData {
        self.mainloop.dispatch(&self.monitor, 0, raw, arg);
        *self.channel_mut()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.take() {
            // SAFETY: allocated by `Box::into_raw` in `new`.
            drop(unsafe { Box::from_raw(channel) });
        }
    }
}
