use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::scanner::{AddressList, Completion, LookupHandle, LookupRequest, ReverseResolver};

/// Lookups allowed in flight at once unless configured otherwise
pub const DEFAULT_WINDOW: usize = 60;

/// Submission bookkeeping for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineState {
    cursor: usize,
    submitted: usize,
    completed: usize,
    window: usize,
}

impl PipelineState {
    fn new(window: usize) -> Self {
        Self {
            cursor: 0,
            submitted: 0,
            completed: 0,
            window,
        }
    }

    /// Index of the next record not yet submitted
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn in_flight(&self) -> usize {
        self.submitted - self.completed
    }
}

/// Keeps at most `window` lookups outstanding and submits every address
/// exactly once, in ascending order.
pub struct Dispatcher {
    list: AddressList,
    state: PipelineState,
    in_flight: HashMap<usize, LookupHandle>,
}

impl Dispatcher {
    pub fn new(list: AddressList, window: usize) -> Self {
        assert!(window > 0, "lookup window must be at least 1");

        Self {
            list,
            state: PipelineState::new(window),
            in_flight: HashMap::with_capacity(window),
        }
    }

    /// Fill the window from the head of the list. Returns how many lookups
    /// were submitted, `min(window, total)` on a fresh dispatcher.
    pub fn submit_initial_window<R: ReverseResolver>(&mut self, resolver: &mut R) -> usize {
        let mut count = 0;
        while self.state.in_flight() < self.state.window && self.submit_next(resolver) {
            count += 1;
        }
        debug!(count, window = self.state.window, "initial window submitted");
        count
    }

    /// Record a finished lookup and refill the freed slot from the cursor.
    ///
    /// Failures are terminal and count exactly like successes. Returns `false`
    /// for completions that match no outstanding lookup; those change nothing.
    pub fn on_complete<R: ReverseResolver>(
        &mut self,
        resolver: &mut R,
        completion: Completion,
    ) -> bool {
        let Completion { index, outcome } = completion;

        // Check the lookup is one we are still waiting on
        if self.in_flight.remove(&index).is_none() {
            warn!(index, "completion for a lookup that is not in flight");
            return false;
        }

        let Some(record) = self.list.get_mut(index) else {
            warn!(index, "completion for an unknown record");
            return false;
        };

        // Store the result, once only
        if !record.settle(outcome) {
            warn!(addr = %record.addr(), "record already settled");
            return false;
        }

        debug!(
            addr = %record.addr(),
            hostname = record.hostname().display(),
            "lookup complete"
        );
        self.state.completed += 1;

        // Refill the freed slot
        if self.state.in_flight() < self.state.window {
            self.submit_next(resolver);
        }

        true
    }

    /// Abandon every outstanding lookup. Their records stay unset.
    pub fn cancel_in_flight(&mut self) -> usize {
        let count = self.in_flight.len();
        for (_, handle) in self.in_flight.drain() {
            trace!(index = handle.index(), "cancelling lookup");
            handle.cancel();
        }
        count
    }

    fn submit_next<R: ReverseResolver>(&mut self, resolver: &mut R) -> bool {
        let index = self.state.cursor;
        let Some(record) = self.list.get(index) else {
            return false;
        };

        let request = LookupRequest {
            index,
            addr: record.addr(),
        };
        let handle = resolver.submit_reverse_lookup(request);
        self.in_flight.insert(index, handle);

        self.state.cursor += 1;
        self.state.submitted += 1;

        debug_assert!(self.state.in_flight() <= self.state.window);
        true
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn list(&self) -> &AddressList {
        &self.list
    }

    pub fn total(&self) -> usize {
        self.list.len()
    }

    /// Every record has been submitted and completed
    pub fn is_drained(&self) -> bool {
        self.state.completed == self.list.len()
    }
}
