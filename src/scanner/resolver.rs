use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use dns_lookup::lookup_addr;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, Id, JoinError, JoinSet};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::scanner::LookupOutcome;

/// Blocking PTR query for one address
pub type LookupFn = fn(Ipv4Addr) -> io::Result<String>;

/// A PTR lookup for the record at `index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupRequest {
    pub index: usize,
    pub addr: Ipv4Addr,
}

/// A finished lookup, routed back to the record it was submitted for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub index: usize,
    pub outcome: LookupOutcome,
}

/// What the resolver is still waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    /// Nothing pending or in flight
    Idle,
    Pending {
        in_flight: usize,
        next_timeout: Duration,
    },
}

/// Handle to an outstanding lookup
#[derive(Debug)]
pub struct LookupHandle {
    index: usize,
    abort: Option<AbortHandle>,
}

impl LookupHandle {
    pub fn new(index: usize, abort: Option<AbortHandle>) -> Self {
        Self { index, abort }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Abandon the lookup. Its completion will never be reported.
    ///
    /// A query already running on the blocking pool cannot be interrupted; it
    /// keeps its thread until the system resolver gives up on its own.
    pub fn cancel(&self) {
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }
}

/// Asynchronous reverse resolver driven by the event loop.
///
/// Initialization happens in the implementor's constructor and teardown in
/// its `Drop`. Everything else is polled: the loop asks for [`interest`],
/// waits with [`wait_ready`], and turns the readiness it got back into
/// completions with [`process_ready`].
///
/// [`interest`]: ReverseResolver::interest
/// [`wait_ready`]: ReverseResolver::wait_ready
/// [`process_ready`]: ReverseResolver::process_ready
#[async_trait]
pub trait ReverseResolver: Send {
    /// Readiness collected by one wait
    type Ready: Send;

    fn submit_reverse_lookup(&mut self, request: LookupRequest) -> LookupHandle;

    fn interest(&self) -> Interest;

    /// Block until at least one lookup finished or `limit` elapsed
    async fn wait_ready(&mut self, limit: Duration) -> Self::Ready;

    fn process_ready(&mut self, ready: Self::Ready) -> Vec<Completion>;
}

/// [`ReverseResolver`] backed by the system resolver (`getnameinfo`).
///
/// Each lookup runs on the blocking pool and holds its slot until the query
/// returns. Timeouts are whatever the system resolver is configured with
/// (`resolv.conf`). The futures awaiting the queries live in a `JoinSet` owned
/// by this value, so dropping the resolver abandons whatever is outstanding.
pub struct DnsLookupResolver {
    runtime: Handle,
    tasks: JoinSet<LookupOutcome>,
    tokens: HashMap<Id, usize>,
    poll_interval: Duration,
    lookup: LookupFn,
}

impl DnsLookupResolver {
    pub fn new(poll_interval: Duration) -> Result<Self> {
        Self::with_lookup(poll_interval, system_lookup)
    }

    /// Resolver that runs `lookup` on the blocking pool for every request
    pub fn with_lookup(poll_interval: Duration, lookup: LookupFn) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::ResolverInit(e.to_string()))?;

        if poll_interval.is_zero() {
            return Err(Error::ResolverInit("poll interval must be non-zero".to_string()));
        }

        Ok(Self {
            runtime,
            tasks: JoinSet::new(),
            tokens: HashMap::new(),
            poll_interval,
            lookup,
        })
    }
}

#[async_trait]
impl ReverseResolver for DnsLookupResolver {
    type Ready = Vec<std::result::Result<(Id, LookupOutcome), JoinError>>;

    fn submit_reverse_lookup(&mut self, request: LookupRequest) -> LookupHandle {
        let LookupRequest { index, addr } = request;
        let lookup = self.lookup;

        let abort = self.tasks.spawn_on(
            async move {
                let joined = tokio::task::spawn_blocking(move || lookup(addr)).await;
                interpret(addr, joined)
            },
            &self.runtime,
        );

        self.tokens.insert(abort.id(), index);
        LookupHandle::new(index, Some(abort))
    }

    fn interest(&self) -> Interest {
        if self.tasks.is_empty() {
            Interest::Idle
        } else {
            Interest::Pending {
                in_flight: self.tasks.len(),
                next_timeout: self.poll_interval,
            }
        }
    }

    async fn wait_ready(&mut self, limit: Duration) -> Self::Ready {
        let mut ready = Vec::new();

        if let Ok(Some(first)) = timeout(limit, self.tasks.join_next_with_id()).await {
            ready.push(first);
            // Collect everything else that finished alongside it
            while let Some(next) = self.tasks.try_join_next_with_id() {
                ready.push(next);
            }
        }

        ready
    }

    fn process_ready(&mut self, ready: Self::Ready) -> Vec<Completion> {
        let mut completions = Vec::with_capacity(ready.len());

        for joined in ready {
            match joined {
                Ok((id, outcome)) => {
                    let Some(index) = self.tokens.remove(&id) else {
                        warn!(%id, "completion for an unknown lookup");
                        continue;
                    };
                    completions.push(Completion { index, outcome });
                }
                Err(e) => {
                    let Some(index) = self.tokens.remove(&e.id()) else {
                        continue;
                    };
                    if e.is_cancelled() {
                        trace!(index, "lookup cancelled");
                        continue;
                    }
                    warn!(index, "lookup task failed: {e}");
                    completions.push(Completion {
                        index,
                        outcome: LookupOutcome::Failed,
                    });
                }
            }
        }

        completions
    }
}

fn system_lookup(addr: Ipv4Addr) -> io::Result<String> {
    lookup_addr(&IpAddr::V4(addr))
}

/// A numeric answer (no PTR record behind it) counts as a failed lookup.
fn interpret(
    addr: Ipv4Addr,
    joined: std::result::Result<io::Result<String>, JoinError>,
) -> LookupOutcome {
    match joined {
        Ok(Ok(name)) if name != addr.to_string() => LookupOutcome::Resolved(name),
        Ok(Ok(_)) => {
            debug!(%addr, "no PTR record");
            LookupOutcome::Failed
        }
        Ok(Err(e)) => {
            debug!(%addr, "lookup failed: {e}");
            LookupOutcome::Failed
        }
        Err(e) => {
            warn!(%addr, "lookup worker failed: {e}");
            LookupOutcome::Failed
        }
    }
}
