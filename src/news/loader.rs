use super::model::Story;
use async_trait::async_trait;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

// None: nothing to parse at all. Some(vec![]): the request worked but found no stories.
pub type LoadResult = Option<Vec<Story>>;

#[async_trait]
pub trait StorySource: Send + Sync + 'static {
    async fn load(&self) -> LoadResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading,
    Delivered,
}

struct Slot {
    state: LoaderState,
    generation: u64,
}

struct Delivery {
    generation: u64,
    stories: LoadResult,
}

/// Runs a [`StorySource`] on a tokio task and hands the result back to
/// whichever task awaits [`StoryLoader::delivered`].
///
/// At most one load is in flight. Each accepted [`start`](Self::start)
/// produces exactly one delivery unless [`reset`](Self::reset) (or drop)
/// intervenes, in which case the result is dropped without a trace.
pub struct StoryLoader<S> {
    source: Arc<S>,
    slot: Arc<Mutex<Slot>>,
    tx: mpsc::UnboundedSender<Delivery>,
    rx: mpsc::UnboundedReceiver<Delivery>,
    task: Option<JoinHandle<()>>,
    taken: u64,
}

impl<S: StorySource> StoryLoader<S> {
    pub fn new(source: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source: Arc::new(source),
            slot: Arc::new(Mutex::new(Slot {
                state: LoaderState::Idle,
                generation: 0,
            })),
            tx,
            rx,
            task: None,
            taken: 0,
        }
    }

    pub fn state(&self) -> LoaderState {
        lock(&self.slot).state
    }

    pub fn start(&mut self) -> bool {
        let generation = {
            let mut slot = lock(&self.slot);
            if slot.state == LoaderState::Loading {
                debug!(generation = slot.generation, "load already in flight, ignoring start");
                return false;
            }
            slot.state = LoaderState::Loading;
            slot.generation += 1;
            slot.generation
        };
        debug!(generation, "starting story load");

        let source = Arc::clone(&self.source);
        let slot = Arc::clone(&self.slot);
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            // A panicking source still ends the cycle, with nothing loaded.
            let stories = match AssertUnwindSafe(source.load()).catch_unwind().await {
                Ok(stories) => stories,
                Err(_) => {
                    error!(generation, "story load panicked");
                    None
                }
            };
            let mut slot = lock(&slot);
            // A reset since this cycle began means nobody wants the result.
            if slot.state == LoaderState::Loading && slot.generation == generation {
                slot.state = LoaderState::Delivered;
                let _ = tx.send(Delivery {
                    generation,
                    stories,
                });
            }
        }));
        true
    }

    // None when idle or when this cycle's result was already taken.
    pub async fn delivered(&mut self) -> Option<LoadResult> {
        loop {
            let current = {
                let slot = lock(&self.slot);
                if slot.state == LoaderState::Idle || self.taken == slot.generation {
                    return None;
                }
                slot.generation
            };
            let delivery = self.rx.recv().await?;
            if delivery.generation == current {
                self.taken = current;
                return Some(delivery.stories);
            }
            debug!(generation = delivery.generation, current, "dropping stale delivery");
        }
    }

    pub fn reset(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let mut slot = lock(&self.slot);
        slot.state = LoaderState::Idle;
        slot.generation += 1;
        debug!(generation = slot.generation, "loader reset");
    }
}

impl<S> Drop for StoryLoader<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Clone, Default)]
    struct GatedSource {
        calls: Arc<AtomicUsize>,
        gate: Arc<Notify>,
        finished: Arc<AtomicBool>,
    }

    // Flags when the load future is dropped, whether it completed or was cancelled.
    struct SetOnDrop(Arc<AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl StorySource for GatedSource {
        async fn load(&self) -> LoadResult {
            let _finished = SetOnDrop(Arc::clone(&self.finished));
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.gate.notified().await;
            Some(vec![Story::new("", format!("load {n}"), "", "", "N/A")])
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl StorySource for PanickingSource {
        async fn load(&self) -> LoadResult {
            panic!("source blew up");
        }
    }

    async fn wait_for(loader: &StoryLoader<GatedSource>, state: LoaderState) {
        for _ in 0..200 {
            if loader.state() == state {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("loader never reached {state:?}");
    }

    #[tokio::test]
    async fn test_double_start_runs_once_and_delivers_once() {
        let source = GatedSource::default();
        let mut loader = StoryLoader::new(source.clone());

        assert!(loader.start());
        assert!(!loader.start());
        assert_eq!(loader.state(), LoaderState::Loading);
        source.gate.notify_one();

        let stories = loader.delivered().await.unwrap().unwrap();
        assert_eq!(stories[0].title(), "load 1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.state(), LoaderState::Delivered);

        let again = tokio::time::timeout(Duration::from_millis(100), loader.delivered())
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_delivered_when_idle_returns_none() {
        let mut loader = StoryLoader::new(GatedSource::default());
        assert_eq!(loader.state(), LoaderState::Idle);
        assert!(loader.delivered().await.is_none());
    }

    #[tokio::test]
    async fn test_reset_while_loading_discards_result() {
        let source = GatedSource::default();
        let mut loader = StoryLoader::new(source.clone());

        loader.start();
        loader.reset();
        source.gate.notify_one();

        assert_eq!(loader.state(), LoaderState::Idle);
        assert!(loader.delivered().await.is_none());
    }

    #[tokio::test]
    async fn test_reset_after_completion_drops_queued_result() {
        let source = GatedSource::default();
        let mut loader = StoryLoader::new(source.clone());

        loader.start();
        source.gate.notify_one();
        wait_for(&loader, LoaderState::Delivered).await;
        loader.reset();
        assert!(loader.delivered().await.is_none());

        assert!(loader.start());
        source.gate.notify_one();
        let stories = loader.delivered().await.unwrap().unwrap();
        assert_eq!(stories[0].title(), "load 2");
    }

    #[tokio::test]
    async fn test_start_after_delivery_begins_new_cycle() {
        let source = GatedSource::default();
        let mut loader = StoryLoader::new(source.clone());

        loader.start();
        source.gate.notify_one();
        loader.delivered().await.unwrap();

        assert!(loader.start());
        source.gate.notify_one();
        let stories = loader.delivered().await.unwrap().unwrap();
        assert_eq!(stories[0].title(), "load 2");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panicking_source_delivers_nothing_once() {
        let mut loader = StoryLoader::new(PanickingSource);

        assert!(loader.start());
        let delivered = tokio::time::timeout(Duration::from_secs(2), loader.delivered())
            .await
            .unwrap();

        assert_eq!(delivered, Some(None));
        assert_eq!(loader.state(), LoaderState::Delivered);
        assert!(loader.start());
    }

    #[tokio::test]
    async fn test_drop_cancels_pending_load() {
        let source = GatedSource::default();
        let mut loader = StoryLoader::new(source.clone());

        loader.start();
        for _ in 0..200 {
            if source.calls.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(!source.finished.load(Ordering::SeqCst));

        drop(loader);
        for _ in 0..200 {
            if source.finished.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // The gate was never opened, so only cancellation could end the load.
        assert!(source.finished.load(Ordering::SeqCst));
    }
}
