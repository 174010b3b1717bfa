pub mod addresses;
pub mod dispatcher;
pub mod event_loop;
pub mod resolver;
pub mod subnet;

pub use addresses::{AddressList, LookupOutcome};
pub use dispatcher::{Dispatcher, DEFAULT_WINDOW};
pub use event_loop::LoopExit;
pub use resolver::{
    Completion, DnsLookupResolver, Interest, LookupHandle, LookupRequest, ReverseResolver,
};
pub use subnet::{CidrError, Subnet};

#[cfg(test)]
pub(crate) use resolver::mock;
