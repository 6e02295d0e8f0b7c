#![cfg_attr(target_os = "none", no_std)]
#![warn(rust_2018_idioms)]

#[cfg(target_os = "none")]
pub mod allocator;
pub mod config;
pub mod cpu;
#[cfg(target_os = "none")]
pub mod panic;
pub mod platform;
pub mod uart;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate log;

use acs_el3::{logger, Mainloop, Monitor};
use log::LevelFilter;
use platform::Fvp;

lazy_static! {
    static ref MONITOR: Monitor<Fvp> = Monitor::new(Fvp::new());
    static ref MAINLOOP: Mainloop<Fvp> = {
        let mut mainloop = Mainloop::new();
        mainloop.add_event_handlers();
        mainloop
    };
}

/// Cold boot set up. Runs once on the primary core before any SMC.
///
/// # Safety
///
/// Must be called exactly once, with EL3 translation enabled.
#[no_mangle]
pub unsafe extern "C" fn plat_arm_acs_el3_init() {
    #[cfg(target_os = "none")]
    allocator::init();

    uart::CONSOLE.initialize();
    if logger::register_global_logger(LevelFilter::Info, &uart::CONSOLE).is_err() {
        return;
    }
    lazy_static::initialize(&MONITOR);
    lazy_static::initialize(&MAINLOOP);

    #[cfg(target_os = "none")]
    info!("EL3 services ready, heap used {} bytes", allocator::get_used_size());
}

#[no_mangle]
pub extern "C" fn plat_arm_acs_smc_handler(services: u64, arg0: u64, arg1: u64, arg2: u64) {
    MAINLOOP.dispatch(&MONITOR, cpu::get_cpu_id(), services, [arg0, arg1, arg2]);
}

#[cfg(feature = "stat")]
#[no_mangle]
pub extern "C" fn plat_arm_acs_print_stats() {
    acs_el3::stat::STATS.lock().print();
}
