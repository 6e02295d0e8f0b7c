//! PL011 console for log output.

use crate::config::{UART_BASE, UART_BAUDRATE, UART_CLK_IN_HZ};
use acs_el3::logger::Console;

use spinning_top::Spinlock;

const REG_LEN: usize = core::mem::size_of::<u32>();

const UARTDR: usize = 0x000 / REG_LEN;
const UARTECR: usize = 0x004 / REG_LEN;
const UARTFR: usize = 0x018 / REG_LEN;
const UARTIBRD: usize = 0x024 / REG_LEN;
const UARTFBRD: usize = 0x028 / REG_LEN;
const UARTLCR_H: usize = 0x02C / REG_LEN;
const UARTCR: usize = 0x030 / REG_LEN;

const UARTFR_TXFF: u32 = 1 << 5;

mod uartcr {
    pub const RXE: u32 = 1 << 9;
    pub const TXE: u32 = 1 << 8;
    pub const EN: u32 = 1 << 0;
}

mod uartlcr_h {
    pub const WLEN_8: u32 = 3 << 5;
    pub const FEN: u32 = 1 << 4;
}

struct DeviceInner {
    register: *mut u32,
    ready: bool,
}

// SAFETY: the UART frame is only reached through the lock below.
unsafe impl Send for DeviceInner {}

impl DeviceInner {
    const fn new() -> Self {
        Self {
            register: UART_BASE as *mut u32,
            ready: false,
        }
    }

    fn reg(&self, index: usize) -> *mut u32 {
        // SAFETY: every index is an offset inside the PL011 frame.
        unsafe { self.register.add(index) }
    }

    fn initialize(&mut self) {
        if self.ready {
            return;
        }
        // SAFETY: the frame is device memory mapped by the boot code.
        unsafe {
            // disable before programming
            let cr = self.reg(UARTCR).read_volatile();
            self.reg(UARTCR).write_volatile(cr & !uartcr::EN);

            let divisor = (UART_CLK_IN_HZ << 2) / UART_BAUDRATE;
            self.reg(UARTIBRD).write_volatile((divisor >> 6) as u32);
            self.reg(UARTFBRD).write_volatile((divisor & 0x3f) as u32);
            self.reg(UARTLCR_H).write_volatile(uartlcr_h::FEN | uartlcr_h::WLEN_8);
            self.reg(UARTECR).write_volatile(0);
            self.reg(UARTCR)
                .write_volatile(uartcr::RXE | uartcr::TXE | uartcr::EN);
        }
        self.ready = true;
    }

    fn putc(&mut self, byte: u8) {
        if !self.ready {
            return;
        }
        // SAFETY: see `initialize`.
        unsafe {
            while self.reg(UARTFR).read_volatile() & UARTFR_TXFF != 0 {}
            self.reg(UARTDR).write_volatile(byte as u32);
        }
    }
}

static DEVICE_INNER: Spinlock<DeviceInner> = Spinlock::new(DeviceInner::new());

pub struct Pl011;

impl Pl011 {
    pub fn initialize(&self) {
        DEVICE_INNER.lock().initialize();
    }
}

impl Console for Pl011 {
    fn write_str(&self, s: &str) {
        let mut device = DEVICE_INNER.lock();
        for byte in s.bytes() {
            if byte == b'\n' {
                device.putc(b'\r');
            }
            device.putc(byte);
        }
    }
}

pub static CONSOLE: Pl011 = Pl011;
