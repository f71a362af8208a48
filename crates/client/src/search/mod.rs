//! Debounced search coordination.
//!
//! Screens with live search feed raw keystrokes into a [`SearchCoordinator`];
//! it dispatches at most one backend query per quiescence window and applies
//! results latest-query-wins: every dispatch is tagged with a generation and
//! a response is dropped unless its generation is still the newest one.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::time::Sleep;
use tracing::{debug, warn};

use crate::error::Result;

/// The backend lookup a coordinator drives.
#[async_trait]
pub trait SearchQuery<T>: Send + Sync {
    async fn run(&self, term: &str) -> Result<Vec<T>>;
}

/// Observable state of one search box.
#[derive(Debug, Clone)]
pub struct SearchState<T> {
    /// Latest raw input, updated on every keystroke.
    pub raw: String,
    /// The value the most recent query was dispatched with.
    pub debounced: String,
    /// Results of the newest settled query.
    pub results: Vec<T>,
    /// True between dispatch and settlement of the newest query.
    pub loading: bool,
    /// Generation of the query whose results are displayed.
    pub generation: u64,
    /// Error from the newest settled query, if it failed.
    pub last_error: Option<String>,
}

impl<T> Default for SearchState<T> {
    fn default() -> Self {
        Self {
            raw: String::new(),
            debounced: String::new(),
            results: Vec::new(),
            loading: false,
            generation: 0,
            last_error: None,
        }
    }
}

/// Handle for one screen's search box.
///
/// Dropping the handle closes the input channel and stops the driver task;
/// a query already in flight at that point is fire-and-forget and its late
/// result is discarded.
pub struct SearchCoordinator<T> {
    input: mpsc::UnboundedSender<String>,
    state: watch::Receiver<SearchState<T>>,
}

impl<T: Clone + Send + Sync + 'static> SearchCoordinator<T> {
    /// Spawn the driver with the given quiescence window.
    pub fn new(query: Arc<dyn SearchQuery<T>>, window: Duration) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState::default());

        tokio::spawn(drive(query, window, input_rx, state_tx));

        Self {
            input: input_tx,
            state: state_rx,
        }
    }

    /// Feed one keystroke's worth of raw input.
    pub fn push(&self, raw: impl Into<String>) {
        // Driver gone means the handle outlived a runtime shutdown; nothing
        // sensible to do with the keystroke.
        let _ = self.input.send(raw.into());
    }

    /// Watch the observable state.
    pub fn state(&self) -> watch::Receiver<SearchState<T>> {
        self.state.clone()
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> SearchState<T> {
        self.state.borrow().clone()
    }
}

async fn drive<T: Clone + Send + Sync + 'static>(
    query: Arc<dyn SearchQuery<T>>,
    window: Duration,
    mut input: mpsc::UnboundedReceiver<String>,
    state: watch::Sender<SearchState<T>>,
) {
    let (settle_tx, mut settle_rx) = mpsc::unbounded_channel::<(u64, Result<Vec<T>>)>();

    // Restarted on every keystroke; armed only while input is pending.
    let mut deadline: Option<Pin<Box<Sleep>>> = None;
    let mut generation: u64 = 0;
    let mut pending_term = String::new();

    loop {
        tokio::select! {
            keystroke = input.recv() => {
                match keystroke {
                    Some(raw) => {
                        pending_term = raw.clone();
                        state.send_modify(|s| s.raw = raw);
                        deadline = Some(Box::pin(tokio::time::sleep(window)));
                    }
                    // Handle dropped: stop driving. In-flight queries are
                    // abandoned and their results never applied.
                    None => break,
                }
            }

            () = async { deadline.as_mut().expect("armed").await }, if deadline.is_some() => {
                deadline = None;
                generation += 1;
                let term = pending_term.clone();
                debug!(generation, term = %term, "Quiescence reached; dispatching query");
                state.send_modify(|s| {
                    s.debounced = term.clone();
                    s.loading = true;
                });

                let query = Arc::clone(&query);
                let settle = settle_tx.clone();
                let dispatched = generation;
                tokio::spawn(async move {
                    let outcome = query.run(&term).await;
                    let _ = settle.send((dispatched, outcome));
                });
            }

            Some((settled, outcome)) = settle_rx.recv() => {
                if settled != generation {
                    debug!(settled, latest = generation, "Discarding stale search response");
                    continue;
                }
                match outcome {
                    Ok(results) => state.send_modify(|s| {
                        s.results = results;
                        s.loading = false;
                        s.generation = settled;
                        s.last_error = None;
                    }),
                    Err(e) => {
                        warn!(error = %e, "Search query failed");
                        state.send_modify(|s| {
                            s.loading = false;
                            s.generation = settled;
                            s.last_error = Some(e.to_string());
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;

    const WINDOW: Duration = Duration::from_millis(400);

    /// Query spy with a configurable per-term latency.
    struct SpyQuery {
        terms: Mutex<Vec<String>>,
        delays: HashMap<String, Duration>,
    }

    impl SpyQuery {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                terms: Mutex::new(Vec::new()),
                delays: HashMap::new(),
            })
        }

        fn with_delays(delays: &[(&str, u64)]) -> Arc<Self> {
            Arc::new(Self {
                terms: Mutex::new(Vec::new()),
                delays: delays
                    .iter()
                    .map(|(t, ms)| (t.to_string(), Duration::from_millis(*ms)))
                    .collect(),
            })
        }

        fn recorded(&self) -> Vec<String> {
            self.terms.lock().clone()
        }
    }

    #[async_trait]
    impl SearchQuery<String> for SpyQuery {
        async fn run(&self, term: &str) -> Result<Vec<String>> {
            self.terms.lock().push(term.to_string());
            if let Some(delay) = self.delays.get(term) {
                tokio::time::sleep(*delay).await;
            }
            Ok(vec![format!("result:{}", term)])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_collapse_to_one_query() {
        let query = SpyQuery::new();
        let search = SearchCoordinator::new(query.clone() as Arc<dyn SearchQuery<String>>, WINDOW);

        // Keystrokes at t = 0, 50, 100, 150 ms, then silence.
        for (i, term) in ["p", "pl", "pla", "plan"].iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            search.push(*term);
        }

        // Let the quiescence window elapse and the query settle.
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(query.recorded(), vec!["plan".to_string()]);
        let state = search.snapshot();
        assert_eq!(state.debounced, "plan");
        assert_eq!(state.results, vec!["result:plan".to_string()]);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_does_not_clobber_newer_results() {
        // "alpha" answers slowly enough to land after "beta" has settled.
        let query = SpyQuery::with_delays(&[("alpha", 1000), ("beta", 10)]);
        let search = SearchCoordinator::new(query.clone() as Arc<dyn SearchQuery<String>>, WINDOW);

        search.push("alpha");
        // alpha dispatches at t=400 and will settle at t=1400.
        tokio::time::sleep(Duration::from_millis(450)).await;

        search.push("beta");
        // beta dispatches at t=850 and settles around t=860.
        tokio::time::sleep(Duration::from_millis(2000)).await;

        assert_eq!(query.recorded(), vec!["alpha".to_string(), "beta".to_string()]);
        let state = search.snapshot();
        assert_eq!(state.results, vec!["result:beta".to_string()]);
        assert_eq!(state.generation, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn input_before_quiescence_restarts_the_timer() {
        let query = SpyQuery::new();
        let search = SearchCoordinator::new(query.clone() as Arc<dyn SearchQuery<String>>, WINDOW);

        search.push("a");
        tokio::time::sleep(Duration::from_millis(350)).await;
        // Still inside the window: no dispatch yet.
        assert!(query.recorded().is_empty());

        search.push("ab");
        tokio::time::sleep(Duration::from_millis(350)).await;
        // The timer restarted, so "a" never dispatched and "ab" has not yet.
        assert!(query.recorded().is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(query.recorded(), vec!["ab".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn query_errors_surface_without_wiping_results() {
        struct FlakyQuery {
            calls: Mutex<u32>,
        }

        #[async_trait]
        impl SearchQuery<String> for FlakyQuery {
            async fn run(&self, term: &str) -> Result<Vec<String>> {
                let mut calls = self.calls.lock();
                *calls += 1;
                if *calls == 1 {
                    Ok(vec![format!("ok:{}", term)])
                } else {
                    Err(crate::error::Error::Server {
                        status: 500,
                        message: "backend down".into(),
                    })
                }
            }
        }

        let query = Arc::new(FlakyQuery {
            calls: Mutex::new(0),
        });
        let search = SearchCoordinator::new(query as Arc<dyn SearchQuery<String>>, WINDOW);

        search.push("first");
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(search.snapshot().results, vec!["ok:first".to_string()]);

        search.push("second");
        tokio::time::sleep(Duration::from_millis(500)).await;

        let state = search.snapshot();
        assert!(state.last_error.is_some());
        assert!(!state.loading);
        // Previous results stay on screen.
        assert_eq!(state.results, vec!["ok:first".to_string()]);
    }
}
