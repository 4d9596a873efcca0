//! Service gate
//!
//! A [`Gate`] carries one [`ServiceCall`] into the kernel and brings the
//! reply back. On target this is the supervisor-call trap; the trap handler
//! lands in [`KernelHandle::on_service`]. In-process callers (host tests,
//! code already running in kernel context) go straight to
//! [`Kernel::service`].

use pulse_kernel::{Kernel, KernelHandle, Port, Result, ServiceCall, ServiceReply};

pub trait Gate<'a> {
    fn call(&self, call: ServiceCall<'a>) -> Result<ServiceReply<'a>>;
}

impl<'a, P: Port> Gate<'a> for Kernel<'a, P> {
    fn call(&self, call: ServiceCall<'a>) -> Result<ServiceReply<'a>> {
        self.service(call)
    }
}

impl<P: Port + 'static> Gate<'static> for KernelHandle<P> {
    fn call(&self, call: ServiceCall<'static>) -> Result<ServiceReply<'static>> {
        self.on_service(call)
    }
}
