//! Timer store abstraction and its in-memory implementation.

use async_trait::async_trait;
use recast_common::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::timer::Timer;

/// Advisory token for an exclusive editing session over the store.
///
/// Acquired before request validation, held until the mutation commits;
/// the session ends when the guard drops.
pub struct EditGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for EditGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Owner of the persistent timer entities.
///
/// Implementations must serialize structural mutations; callers see
/// snapshots and commit whole entities back.
#[async_trait]
pub trait TimerStore: Send + Sync {
    async fn count(&self) -> usize;

    /// Snapshot of the timer at `index` in store order.
    async fn get(&self, index: usize) -> Option<Timer>;

    async fn add(&self, timer: Timer) -> Result<()>;

    async fn remove(&self, index: usize) -> Result<Timer>;

    async fn replace(&self, index: usize, timer: Timer) -> Result<()>;

    /// Index of a structurally identical timer, if the store has one.
    async fn find_equivalent(&self, timer: &Timer) -> Option<usize>;

    async fn mark_modified(&self);

    fn is_being_edited(&self) -> bool;

    /// Start an advisory edit session; `None` while another is active.
    fn try_begin_edit(&self) -> Option<EditGuard>;
}

/// In-memory implementation of [`TimerStore`].
pub struct InMemoryTimerStore {
    timers: RwLock<Vec<Timer>>,
    being_edited: Arc<AtomicBool>,
    modifications: AtomicU64,
}

impl InMemoryTimerStore {
    pub fn new() -> Self {
        Self {
            timers: RwLock::new(Vec::new()),
            being_edited: Arc::new(AtomicBool::new(false)),
            modifications: AtomicU64::new(0),
        }
    }

    /// Number of times the store was marked modified.
    pub fn modifications(&self) -> u64 {
        self.modifications.load(Ordering::Relaxed)
    }

    /// Flip the live recording flag on a stored timer.
    pub async fn set_recording(&self, index: usize, recording: bool) -> Result<()> {
        let mut timers = self.timers.write().await;
        let timer = timers
            .get_mut(index)
            .ok_or_else(|| Error::NotFound(format!("no timer at index {index}")))?;
        timer.recording = recording;
        Ok(())
    }
}

impl Default for InMemoryTimerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimerStore for InMemoryTimerStore {
    async fn count(&self) -> usize {
        self.timers.read().await.len()
    }

    async fn get(&self, index: usize) -> Option<Timer> {
        self.timers.read().await.get(index).cloned()
    }

    async fn add(&self, timer: Timer) -> Result<()> {
        self.timers.write().await.push(timer);
        Ok(())
    }

    async fn remove(&self, index: usize) -> Result<Timer> {
        let mut timers = self.timers.write().await;
        if index >= timers.len() {
            return Err(Error::NotFound(format!("no timer at index {index}")));
        }
        Ok(timers.remove(index))
    }

    async fn replace(&self, index: usize, timer: Timer) -> Result<()> {
        let mut timers = self.timers.write().await;
        let slot = timers
            .get_mut(index)
            .ok_or_else(|| Error::NotFound(format!("no timer at index {index}")))?;
        *slot = timer;
        Ok(())
    }

    async fn find_equivalent(&self, timer: &Timer) -> Option<usize> {
        self.timers
            .read()
            .await
            .iter()
            .position(|t| t.is_equivalent(timer))
    }

    async fn mark_modified(&self) {
        self.modifications.fetch_add(1, Ordering::Relaxed);
    }

    fn is_being_edited(&self) -> bool {
        self.being_edited.load(Ordering::Acquire)
    }

    fn try_begin_edit(&self) -> Option<EditGuard> {
        self.being_edited
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| EditGuard {
                flag: self.being_edited.clone(),
            })
    }
}
