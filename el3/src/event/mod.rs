pub mod mainloop;

pub use crate::error::Error;
pub use mainloop::Mainloop;

use crate::channel::Reply;
use crate::service::{self, ServiceId};

#[macro_export]
macro_rules! listen {
    ($eventloop:expr, $code:expr, $handler:expr) => {{
        $eventloop.add_event_handler($code, alloc::boxed::Box::new($handler))
    }};
}

/// One decoded service request.
#[derive(Clone, Debug)]
pub struct Context {
    pub cmd: ServiceId,
    /// Index of the calling core.
    pub caller: usize,
    pub arg: [u64; 3],
}

impl Context {
    pub fn new(cmd: ServiceId, caller: usize, arg: [u64; 3]) -> Context {
        Context { cmd, caller, arg }
    }

    pub fn do_service<F>(&self, reply: &mut Reply<'_>, handler: F)
    where
        F: FnOnce(&Context, &mut Reply<'_>) -> Result<(), Error>,
    {
        let result = handler(self, reply);

        #[cfg(feature = "stat")]
        crate::stat::STATS.lock().record(self.cmd, result.is_ok());

        if let Err(e) = result {
            warn!("{} failed: {}", service::to_str(self.cmd.raw()), e);
            reply.fail(e);
        }

        trace!(
            "SMC: {0: <28} {1:X?} > {2}",
            service::to_str(self.cmd.raw()),
            &self.arg,
            match result {
                Ok(()) => "ok",
                Err(e) => e.message(),
            }
        );
    }
}
