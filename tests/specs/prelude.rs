//! Shared harness for engine specs.

use std::sync::Arc;
use std::time::Duration;

pub use lemc_adapters::{FakeBroadcaster, FakeRuntime, Script};
pub use lemc_core::{job_key, FakeClock, JobRecipe, QueueName, Recipe, Step};
pub use lemc_engine::{CacheFiles, CacheKind, Engine, EngineConfig, KeyStatus, Locker, SchedulerConfig, SubmitError};
use lemc_core::RunningState;
use lemc_engine::{EngineDeps, Queues};
use lemc_storage::{FileQueue, QueueStore};
use tempfile::TempDir;

pub type SpecEngine = Engine<FakeRuntime, FakeBroadcaster, FakeClock>;

pub struct Harness {
    pub dir: TempDir,
    pub runtime: FakeRuntime,
    pub broadcaster: FakeBroadcaster,
    pub clock: FakeClock,
    pub locker: Arc<Locker>,
    pub engine: SpecEngine,
}

impl Harness {
    /// Engine over file queues in a fresh temp dir, schedulers running.
    pub fn start() -> Self {
        Self::start_with(FakeRuntime::new())
    }

    pub fn start_with(runtime: FakeRuntime) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let running = Arc::new(RunningState::new());
        let queue = |name| -> Arc<dyn QueueStore> {
            Arc::new(FileQueue::open(&dir.path().join("queues"), name, Arc::clone(&running)).unwrap())
        };
        let queues = Queues::new(queue(QueueName::Now), queue(QueueName::In), queue(QueueName::Every));
        let broadcaster = FakeBroadcaster::new();
        let clock = FakeClock::new();
        let locker = Arc::new(Locker::new(dir.path().join("locker"), None));
        let deps = EngineDeps {
            runtime: runtime.clone(),
            broadcaster: broadcaster.clone(),
            clock: clock.clone(),
            locker: Arc::clone(&locker),
            queues,
            running,
        };
        let config = EngineConfig {
            scheduler: SchedulerConfig { poll: Duration::from_millis(10), ..Default::default() },
            drain_timeout: Duration::from_secs(1),
        };
        let engine = Engine::new(deps, config);
        engine.start();
        Self { dir, runtime, broadcaster, clock, locker, engine }
    }

    /// Move the manual clock forward, then let the schedulers catch up.
    pub async fn tick(&self, by: Duration) {
        self.clock.advance(by);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    pub fn queue_size(&self, name: QueueName) -> usize {
        self.engine.queues().get(name).store().size().unwrap()
    }

    pub fn cache(&self, job: &JobRecipe, kind: CacheKind) -> String {
        let layout = self.locker.layout(job).unwrap();
        CacheFiles::open(layout.cache_dir()).unwrap().read(kind).unwrap()
    }
}

/// A recipe job for user 42 with the given steps.
pub fn recipe(steps: Vec<Step>) -> JobRecipe {
    JobRecipe::builder().recipe(Recipe { name: "hello".into(), steps, ..Default::default() }).build()
}
