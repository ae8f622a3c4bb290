//! HEXSTRAT Jobs - Background search scheduling
//!
//! Path and move-range searches run on the tokio blocking pool against a
//! frozen grid snapshot, so the interactive loop never waits on them:
//! - One live search per (unit, kind); a new request cancels the old one,
//!   even if the old one already finished and its result is still unread
//! - Jobs can be polled from a frame loop or awaited
//! - A cancelled or superseded job always resolves to `None`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use hexstrat_core::{
    find_path_cancellable, find_reachable_cancellable, CancelToken, Hex, Mover, Path, ReachableSet,
    TileGrid, UnitId,
};
use rustc_hash::FxHashMap;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, error, trace};

/// Which search a job runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Path,
    Reach,
}

type JobKey = (UnitId, SearchKind);

/// Cancel token of the latest job per key, tagged with the job's generation.
/// Entries outlive the search itself so an unread result can still be superseded.
type Live = FxHashMap<JobKey, (u64, CancelToken)>;

// ============================================================================
// JOBS
// ============================================================================

/// Result of polling a job
#[derive(Clone, Debug, PartialEq)]
pub enum JobPoll<T> {
    Pending,
    /// `None` if the search found nothing or was cancelled
    Done(Option<T>),
}

/// Handle to one background search
pub struct SearchJob<T> {
    rx: oneshot::Receiver<Option<T>>,
    token: CancelToken,
    finished: bool,
}

impl<T> SearchJob<T> {
    /// Asks the search to stop; the job then resolves to `None`
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Non-blocking check, for callers driven by a frame loop.
    /// Reports `Done` once; later polls report `Done(None)`.
    pub fn poll(&mut self) -> JobPoll<T> {
        if self.finished {
            return JobPoll::Done(None);
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.finished = true;
                JobPoll::Done(self.unless_cancelled(result))
            }
            Err(oneshot::error::TryRecvError::Empty) if !self.is_cancelled() => JobPoll::Pending,
            Err(oneshot::error::TryRecvError::Empty) => {
                self.finished = true;
                JobPoll::Done(None)
            }
            Err(oneshot::error::TryRecvError::Closed) => {
                error!("search task ended without reporting");
                self.finished = true;
                JobPoll::Done(None)
            }
        }
    }

    /// Waits for the search to finish
    pub async fn wait(self) -> Option<T> {
        if self.finished {
            return None;
        }
        let token = self.token;
        match self.rx.await {
            Ok(result) if !token.is_cancelled() => result,
            Ok(_) => None,
            Err(_) => {
                error!("search task ended without reporting");
                None
            }
        }
    }

    fn unless_cancelled(&self, result: Option<T>) -> Option<T> {
        if self.is_cancelled() {
            None
        } else {
            result
        }
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Runs searches in the background, last request per unit and kind wins
pub struct SearchScheduler {
    handle: Handle,
    live: Mutex<Live>,
    next_generation: AtomicU64,
}

impl SearchScheduler {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            live: Mutex::new(FxHashMap::default()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Cheapest path for `unit` from `start` to `goal` on `grid`
    pub fn request_path(
        &self,
        unit: UnitId,
        grid: Arc<TileGrid>,
        start: Hex,
        goal: Hex,
        mover: Mover,
    ) -> SearchJob<Path> {
        self.submit((unit, SearchKind::Path), move |cancel| {
            find_path_cancellable(&grid, start, goal, &mover, cancel)
        })
    }

    /// Move range for `unit` from `start` on `grid`
    pub fn request_reach(
        &self,
        unit: UnitId,
        grid: Arc<TileGrid>,
        start: Hex,
        mover: Mover,
    ) -> SearchJob<ReachableSet> {
        self.submit((unit, SearchKind::Reach), move |cancel| {
            find_reachable_cancellable(&grid, start, &mover, cancel)
        })
    }

    /// Cancels every search for `unit`, finished or not, whose result is unread
    pub fn cancel_unit(&self, unit: UnitId) {
        let mut live = lock(&self.live);
        live.retain(|(owner, _), (_, token)| {
            if *owner == unit {
                token.cancel();
                false
            } else {
                true
            }
        });
    }

    pub fn cancel_all(&self) {
        let mut live = lock(&self.live);
        for (_, token) in live.values() {
            token.cancel();
        }
        live.clear();
    }

    /// Number of (unit, kind) keys whose latest job has not been cancelled
    pub fn live_jobs(&self) -> usize {
        lock(&self.live).len()
    }

    fn submit<T, F>(&self, key: JobKey, work: F) -> SearchJob<T>
    where
        T: Send + 'static,
        F: FnOnce(&CancelToken) -> Option<T> + Send + 'static,
    {
        let token = CancelToken::new();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        if let Some((previous_gen, previous)) = lock(&self.live).insert(key, (generation, token.clone())) {
            previous.cancel();
            debug!(unit = ?key.0, kind = ?key.1, previous_gen, generation, "superseded search");
        }

        let (tx, rx) = oneshot::channel();
        let task_token = token.clone();
        self.handle.spawn_blocking(move || {
            let result = work(&task_token);
            let result = if task_token.is_cancelled() { None } else { result };
            trace!(unit = ?key.0, kind = ?key.1, generation, found = result.is_some(), "search finished");
            // Receiver may already be gone
            let _ = tx.send(result);
        });

        SearchJob {
            rx,
            token,
            finished: false,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hexstrat_core::{MovementScheme, TerrainType, UnitDefinition};

    fn grid() -> Arc<TileGrid> {
        Arc::new(TileGrid::new(6, TerrainType::OpenGround))
    }

    fn mover() -> Mover {
        let def = Arc::new(UnitDefinition::new("jeep", MovementScheme::wheeled()).with_move_power(1.0));
        Mover::new(def.clone(), def.layer, def.move_power)
    }

    fn scheduler() -> SearchScheduler {
        SearchScheduler::new(Handle::current())
    }

    #[tokio::test]
    async fn test_path_job_completes() {
        let scheduler = scheduler();
        let job = scheduler.request_path(UnitId(0), grid(), Hex::ORIGIN, Hex::new(2, 0), mover());
        let path = job.wait().await.unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(scheduler.live_jobs(), 1);
    }

    #[tokio::test]
    async fn test_reach_job_completes() {
        let scheduler = scheduler();
        let job = scheduler.request_reach(UnitId(0), grid(), Hex::ORIGIN, mover());
        let reach = job.wait().await.unwrap();
        // Five steps of 0.2 fit in a move power of 1
        assert_eq!(reach.landable.len(), hexstrat_core::vancouver_area(5) - 1);
    }

    #[tokio::test]
    async fn test_new_request_supersedes_old() {
        let scheduler = scheduler();
        let unit = UnitId(4);
        let first = scheduler.request_path(unit, grid(), Hex::ORIGIN, Hex::new(3, 0), mover());
        let second = scheduler.request_path(unit, grid(), Hex::ORIGIN, Hex::new(0, 3), mover());
        assert!(first.is_cancelled());
        assert!(first.wait().await.is_none());
        assert_eq!(second.wait().await.unwrap().goal(), Hex::new(0, 3));
    }

    #[tokio::test]
    async fn test_kinds_and_units_are_independent() {
        let scheduler = scheduler();
        let path = scheduler.request_path(UnitId(1), grid(), Hex::ORIGIN, Hex::new(1, 0), mover());
        let reach = scheduler.request_reach(UnitId(1), grid(), Hex::ORIGIN, mover());
        let other = scheduler.request_path(UnitId(2), grid(), Hex::new(2, 0), Hex::ORIGIN, mover());
        assert!(path.wait().await.is_some());
        assert!(reach.wait().await.is_some());
        assert!(other.wait().await.is_some());
    }

    #[tokio::test]
    async fn test_cancel_unit() {
        let scheduler = scheduler();
        let path = scheduler.request_path(UnitId(1), grid(), Hex::ORIGIN, Hex::new(1, 0), mover());
        let reach = scheduler.request_reach(UnitId(1), grid(), Hex::ORIGIN, mover());
        scheduler.cancel_unit(UnitId(1));
        assert!(path.wait().await.is_none());
        assert!(reach.wait().await.is_none());
        assert_eq!(scheduler.live_jobs(), 0);
    }

    /// Waits until the worker has sent its result, leaving it unread
    async fn until_reported<T>(job: &SearchJob<T>) {
        while job.rx.is_empty() {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn test_finished_unread_job_is_superseded() {
        let scheduler = scheduler();
        let unit = UnitId(5);
        let first = scheduler.request_path(unit, grid(), Hex::ORIGIN, Hex::new(3, 0), mover());
        until_reported(&first).await;

        let second = scheduler.request_path(unit, grid(), Hex::ORIGIN, Hex::new(0, 3), mover());
        assert!(first.is_cancelled());
        assert!(first.wait().await.is_none());
        assert_eq!(second.wait().await.unwrap().goal(), Hex::new(0, 3));
    }

    #[tokio::test]
    async fn test_cancel_unit_after_finish() {
        let scheduler = scheduler();
        let mut reach = scheduler.request_reach(UnitId(3), grid(), Hex::ORIGIN, mover());
        until_reported(&reach).await;

        scheduler.cancel_unit(UnitId(3));
        assert_eq!(reach.poll(), JobPoll::Done(None));
        assert_eq!(scheduler.live_jobs(), 0);
    }

    #[tokio::test]
    async fn test_generations_increase() {
        let scheduler = scheduler();
        let a = scheduler.next_generation.load(Ordering::Relaxed);
        let _job = scheduler.request_reach(UnitId(0), grid(), Hex::ORIGIN, mover());
        assert_eq!(scheduler.next_generation.load(Ordering::Relaxed), a + 1);
    }

    #[tokio::test]
    async fn test_poll_until_done() {
        let scheduler = scheduler();
        let mut job = scheduler.request_path(UnitId(0), grid(), Hex::ORIGIN, Hex::new(0, 2), mover());
        let result = loop {
            match job.poll() {
                JobPoll::Pending => tokio::task::yield_now().await,
                JobPoll::Done(result) => break result,
            }
        };
        assert_eq!(result.unwrap().steps(), 2);
        assert_eq!(job.poll(), JobPoll::Done(None));
    }

    #[tokio::test]
    async fn test_cancelled_job_polls_done() {
        let scheduler = scheduler();
        let mut job = scheduler.request_reach(UnitId(0), grid(), Hex::ORIGIN, mover());
        job.cancel();
        assert_eq!(job.poll(), JobPoll::Done(None));
    }
}
