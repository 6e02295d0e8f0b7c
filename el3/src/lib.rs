#![no_std]
#![warn(rust_2018_idioms)]

#[macro_use]
pub mod r#macro;

pub mod caller;
pub mod channel;
pub mod config;
pub mod counter;
pub mod error;
#[macro_use]
pub mod event;
pub mod gpt;
pub mod logger;
pub mod mm;
pub mod monitor;
pub mod platform;
pub mod realm;
pub mod service;
#[cfg(feature = "stat")]
pub mod stat;
#[cfg(test)]
pub mod test_utils;

extern crate alloc;

#[cfg(feature = "stat")]
#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate log;

pub use event::Mainloop;
pub use monitor::Monitor;
pub use platform::{Platform, SysReg};
pub use service::ServiceId;
