extern crate alloc;

use super::Context;
use crate::caller::pointer::PointerMut;
use crate::channel::{Reply, SharedData};
use crate::error::Error;
use crate::monitor::Monitor;
use crate::platform::Platform;
use crate::service::{self, ServiceId};

use alloc::boxed::Box;
use alloc::collections::btree_map::BTreeMap;

pub type Handler<P> =
    Box<dyn Fn(&Context, &mut Reply<'_>, &Monitor<P>) -> Result<(), Error> + Send + Sync>;

pub struct Mainloop<P: Platform> {
    pub on_event: BTreeMap<ServiceId, Handler<P>>,
}

impl<P: Platform> Mainloop<P> {
    pub fn new() -> Self {
        Self {
            on_event: BTreeMap::new(),
        }
    }

    pub fn add_event_handlers(&mut self) {
        service::cache::set_event_handler(self);
        service::gpt::set_event_handler(self);
        service::mec::set_event_handler(self);
        service::memory::set_event_handler(self);
        service::mmu::set_event_handler(self);
        service::realm::set_event_handler(self);
        service::regs::set_event_handler(self);
        service::scr::set_event_handler(self);
        service::security::set_event_handler(self);
        service::smmu::set_event_handler(self);
        service::timer::set_event_handler(self);
        service::watchdog::set_event_handler(self);
    }

    /// Runs one request to completion. Results only ever reach the caller
    /// through its shared channel.
    pub fn dispatch(&self, monitor: &Monitor<P>, caller: usize, service: u64, arg: [u64; 3]) {
        info!(
            "{} [{:#x}, {:#x}, {:#x}] core {}",
            service::to_str(service),
            arg[0],
            arg[1],
            arg[2],
            caller
        );

        let mut shared = monitor.channels.lookup(caller).map(PointerMut::<SharedData>::new);
        let channel = shared.as_mut().and_then(|ptr| ptr.acquire(&monitor.platform));
        if channel.is_none() {
            debug!("no usable channel for core {}", caller);
        }
        let mut reply = Reply::new(channel);

        let handler = ServiceId::decode(service)
            .and_then(|id| self.on_event.get(&id).map(|handler| (id, handler)));
        match handler {
            Some((id, handler)) => {
                Context::new(id, caller, arg)
                    .do_service(&mut reply, |ctx, reply| handler(ctx, reply, monitor));
            }
            None => {
                warn!("Not registered service: {:#x}", service);
                reply.fail(Error::UnknownService);
            }
        }
    }

    pub fn add_event_handler(&mut self, code: ServiceId, handler: Handler<P>) {
        self.on_event.insert(code, handler);
    }
}

impl<P: Platform> Default for Mainloop<P> {
    fn default() -> Self {
        Self::new()
    }
}
