use std::future::Future;

use indicatif::ProgressBar;
use tracing::{debug, warn};

use crate::scanner::{Dispatcher, Interest, ReverseResolver};

/// How the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The resolver ran out of work
    Drained,
    /// `interrupt` fired first; `cancelled` lookups were aborted
    Interrupted { cancelled: usize },
}

/// Drive `resolver` until it reports no interest, feeding every completion to
/// `dispatcher` on this task.
///
/// The wait on the resolver is the only place this suspends. `interrupt` is
/// raced against it; when it resolves the remaining lookups are cancelled.
pub async fn run<R, F>(
    dispatcher: &mut Dispatcher,
    resolver: &mut R,
    progress: &ProgressBar,
    interrupt: F,
) -> LoopExit
where
    R: ReverseResolver,
    F: Future<Output = ()>,
{
    tokio::pin!(interrupt);

    loop {
        let Interest::Pending {
            in_flight,
            next_timeout,
        } = resolver.interest()
        else {
            break;
        };

        let ready = tokio::select! {
            biased;

            _ = &mut interrupt => {
                let cancelled = dispatcher.cancel_in_flight();
                warn!(cancelled, "interrupted, abandoning outstanding lookups");
                return LoopExit::Interrupted { cancelled };
            }
            ready = resolver.wait_ready(next_timeout) => ready,
        };

        // Settle results here; each one frees a slot for the next address
        for completion in resolver.process_ready(ready) {
            dispatcher.on_complete(resolver, completion);
        }

        let state = dispatcher.state();
        debug!(
            in_flight,
            cursor = state.cursor(),
            window = state.window(),
            completed = state.completed(),
            submitted = state.submitted(),
            "poll"
        );
        progress.set_position(state.completed() as u64);
    }

    if !dispatcher.is_drained() {
        warn!(
            completed = dispatcher.state().completed(),
            total = dispatcher.total(),
            "resolver went idle before every address completed"
        );
    }

    LoopExit::Drained
}
