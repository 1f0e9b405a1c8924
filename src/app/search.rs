// CaseSleuth - app/search.rs
//
// Discovery search collaborator. The coordination layer only ever starts,
// cancels, and polls a search; what the search computes is opaque.
//
// Architecture:
//   - `BackgroundSearch` lives on the UI thread; the job runs on a background
//     thread spawned per search.
//   - An `Arc<AtomicBool>` cancel flag lets the UI stop the job cooperatively.
//   - All cross-thread communication is via `SearchProgress` channel messages,
//     drained by the owning view each frame and re-published on the UI
//     thread's event channel.

use crate::core::model::{GroupSummary, SearchCriteria, SearchProgress};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

/// Start/cancel surface of a long-running domain search.
pub trait SearchOperation {
    fn start(&mut self, criteria: SearchCriteria);

    /// Request cancellation. Safe to call when nothing is running.
    fn cancel(&mut self);

    fn is_active(&self) -> bool;

    /// Drain progress messages without blocking.
    fn poll(&mut self) -> Vec<SearchProgress> {
        Vec::new()
    }
}

/// The work a background search performs. Must check the flag periodically
/// and return early once it is set.
pub type SearchJob =
    Arc<dyn Fn(&SearchCriteria, &AtomicBool) -> Result<Vec<GroupSummary>, String> + Send + Sync>;

/// Runs a [`SearchJob`] on a background thread.
pub struct BackgroundSearch {
    job: SearchJob,
    /// Channel receiver for the UI to poll progress messages.
    progress_rx: Option<mpsc::Receiver<SearchProgress>>,
    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl BackgroundSearch {
    pub fn new(job: SearchJob) -> Self {
        Self {
            job,
            progress_rx: None,
            cancel_flag: None,
        }
    }
}

impl SearchOperation for BackgroundSearch {
    /// Spawns a background thread immediately. A running search is cancelled
    /// first.
    fn start(&mut self, criteria: SearchCriteria) {
        self.cancel();

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        self.progress_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        let job = Arc::clone(&self.job);
        tracing::info!(group_by = %criteria.group_by, filters = criteria.filters.len(), "Search started");

        std::thread::spawn(move || {
            run_search(job, criteria, tx, cancel);
        });
    }

    /// The background thread sends `SearchProgress::Cancelled` and exits.
    fn cancel(&mut self) {
        if let Some(flag) = self.cancel_flag.take() {
            flag.store(true, Ordering::SeqCst);
            tracing::info!("Search cancellation requested");
        }
    }

    fn is_active(&self) -> bool {
        self.cancel_flag.is_some()
    }

    fn poll(&mut self) -> Vec<SearchProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while let Ok(msg) = rx.try_recv() {
                messages.push(msg);
            }
        }
        let finished = messages.iter().any(|m| {
            matches!(
                m,
                SearchProgress::Completed { .. }
                    | SearchProgress::Cancelled
                    | SearchProgress::Failed { .. }
            )
        });
        if finished {
            self.cancel_flag = None;
        }
        messages
    }
}

/// Background half of a search: announce, run the job, report the outcome.
fn run_search(
    job: SearchJob,
    criteria: SearchCriteria,
    tx: mpsc::Sender<SearchProgress>,
    cancel: Arc<AtomicBool>,
) {
    // Receiver dropped means the view is gone; nothing left to report to.
    if tx
        .send(SearchProgress::Started {
            criteria: criteria.clone(),
        })
        .is_err()
    {
        return;
    }

    let result = job(&criteria, &cancel);

    let msg = if cancel.load(Ordering::SeqCst) {
        SearchProgress::Cancelled
    } else {
        match result {
            Ok(groups) => {
                tracing::info!(groups = groups.len(), "Search complete");
                SearchProgress::Completed { groups }
            }
            Err(error) => {
                tracing::warn!(error = %error, "Search failed");
                SearchProgress::Failed { error }
            }
        }
    };
    let _ = tx.send(msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ItemRef;
    use std::time::{Duration, Instant};

    type JobResult = Result<Vec<GroupSummary>, String>;

    fn wait_for_end(search: &mut BackgroundSearch) -> Vec<SearchProgress> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut all = Vec::new();
        while Instant::now() < deadline {
            all.extend(search.poll());
            if !search.is_active() {
                return all;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("search did not finish: {all:?}");
    }

    #[test]
    fn test_completed_search_reports_groups() {
        let job: SearchJob = Arc::new(|criteria: &SearchCriteria, _cancel: &AtomicBool| -> JobResult {
            Ok(vec![GroupSummary {
                key: criteria.group_by.clone(),
                items: vec![ItemRef::new("f1")],
            }])
        });
        let mut search = BackgroundSearch::new(job);
        let criteria = SearchCriteria {
            group_by: "size".to_string(),
            filters: Vec::new(),
        };

        search.start(criteria.clone());
        assert!(search.is_active());
        let messages = wait_for_end(&mut search);

        assert_eq!(messages[0], SearchProgress::Started { criteria });
        assert!(matches!(
            messages.last(),
            Some(SearchProgress::Completed { groups }) if groups.len() == 1
        ));
    }

    #[test]
    fn test_cancel_stops_job() {
        let job: SearchJob = Arc::new(|_: &SearchCriteria, cancel: &AtomicBool| -> JobResult {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !cancel.load(Ordering::SeqCst) && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(2));
            }
            Ok(Vec::new())
        });
        let mut search = BackgroundSearch::new(job);
        search.start(SearchCriteria::default());
        search.cancel();
        assert!(!search.is_active());

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut messages = Vec::new();
        while Instant::now() < deadline && !messages.contains(&SearchProgress::Cancelled) {
            messages.extend(search.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(messages.contains(&SearchProgress::Cancelled));
    }

    #[test]
    fn test_cancel_without_search_is_noop() {
        let job: SearchJob = Arc::new(|_: &SearchCriteria, _: &AtomicBool| -> JobResult {
            Ok(Vec::new())
        });
        let mut search = BackgroundSearch::new(job);
        search.cancel();
        assert!(!search.is_active());
        assert!(search.poll().is_empty());
    }
}
