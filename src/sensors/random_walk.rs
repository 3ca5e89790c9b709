//! Simulated 1D sensor producing a bounded random walk.
//!
//! Readings flicker but do not jump: each tick moves the value by at most
//! `step_bound` and the result is clamped to `[min, max]`.
//!
//! The tick logic runs on a tokio timer task. Readings are never handed to
//! the receiver from that task; they are dispatched to the sensor's
//! [`DeliveryContext`] and delivered from there.

use super::steps::{RandomSteps, StepSource};
use super::SensorReceiver;
use crate::delivery::DeliveryContext;
use crate::error::{CoreError, Result};
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

/// Validated random walk parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkConfig {
    min: i32,
    max: i32,
    start: i32,
    step_bound: i32,
    interval: Duration,
}

impl WalkConfig {
    pub const DEFAULT_STEP_BOUND: i32 = 1;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    /// Validate and build a walk configuration.
    ///
    /// Out-of-range values are rejected here rather than clamped.
    pub fn new(
        min: i32,
        max: i32,
        start: i32,
        step_bound: i32,
        interval: Duration,
    ) -> Result<Self> {
        if min > max {
            return Err(CoreError::InvalidRange { min, max });
        }
        if !(min..=max).contains(&start) {
            return Err(CoreError::StartOutOfRange { start, min, max });
        }
        if step_bound < 0 {
            return Err(CoreError::InvalidStepBound(step_bound));
        }
        if interval.is_zero() {
            return Err(CoreError::InvalidInterval(interval));
        }
        Ok(Self {
            min,
            max,
            start,
            step_bound,
            interval,
        })
    }

    /// Configuration with the default step bound and interval.
    pub fn with_defaults(min: i32, max: i32, start: i32) -> Result<Self> {
        Self::new(
            min,
            max,
            start,
            Self::DEFAULT_STEP_BOUND,
            Self::DEFAULT_INTERVAL,
        )
    }

    /// Resting heart rate preset: 40..=200 BPM, starting at 60, +-2 per second.
    pub const fn heartbeat() -> Self {
        Self {
            min: 40,
            max: 200,
            start: 60,
            step_bound: 2,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn step_bound(&self) -> i32 {
        self.step_bound
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// State shared between the sensor handle, its timer task and queued
/// deliveries.
struct Shared {
    config: WalkConfig,
    current: AtomicI32,
    steps: Mutex<Box<dyn StepSource>>,
    receiver: RwLock<Option<Weak<dyn SensorReceiver>>>,
    context: Arc<dyn DeliveryContext>,
    /// Bumped on every start and stop. A queued delivery only reaches the
    /// receiver if the epoch it was produced in is still current.
    epoch: AtomicU64,
}

impl Shared {
    /// Compute the next reading and dispatch it.
    ///
    /// The step lock is held until the reading is queued, so concurrent
    /// ticks neither lose updates nor enqueue out of order. `epoch` is the
    /// run the reading belongs to; `None` means whatever run is current.
    fn advance(self: &Arc<Self>, epoch: Option<u64>) -> i32 {
        let mut steps = self.steps.lock();
        let bound = self.config.step_bound;
        let step = steps.next_step(bound).clamp(-bound, bound);
        let next = self
            .current
            .load(Ordering::SeqCst)
            .saturating_add(step)
            .clamp(self.config.min, self.config.max);
        self.current.store(next, Ordering::SeqCst);

        let epoch = epoch.unwrap_or_else(|| self.epoch.load(Ordering::SeqCst));
        self.dispatch(next, epoch);
        next
    }

    fn deliver(&self, value: i32) {
        let receiver = self.receiver.read().as_ref().and_then(Weak::upgrade);
        if let Some(receiver) = receiver {
            receiver.on_reading(value);
        }
    }

    fn dispatch(self: &Arc<Self>, value: i32, epoch: u64) {
        let shared = Arc::clone(self);
        self.context.dispatch(Box::new(move || {
            if shared.epoch.load(Ordering::SeqCst) == epoch {
                shared.deliver(value);
            } else {
                debug!("[Sensor] dropping stale reading {}", value);
            }
        }));
    }
}

/// A bounded random walk sensor with a single receiver.
///
/// `start()` and `stop()` are expected to be called from the delivery
/// context. They are not synchronized against each other; callers must not
/// invoke them concurrently from different threads.
pub struct BoundedRandomWalkSensor {
    shared: Arc<Shared>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl BoundedRandomWalkSensor {
    /// Create a sensor driven by uniformly random steps.
    pub fn new(config: WalkConfig, context: Arc<dyn DeliveryContext>) -> Self {
        Self::with_steps(config, context, RandomSteps::new())
    }

    /// Create a sensor with a custom step source.
    pub fn with_steps(
        config: WalkConfig,
        context: Arc<dyn DeliveryContext>,
        steps: impl StepSource + 'static,
    ) -> Self {
        let steps: Box<dyn StepSource> = Box::new(steps);
        Self {
            shared: Arc::new(Shared {
                config,
                current: AtomicI32::new(config.start),
                steps: Mutex::new(steps),
                receiver: RwLock::new(None),
                context,
                epoch: AtomicU64::new(0),
            }),
            timer: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &WalkConfig {
        &self.shared.config
    }

    /// Last generated reading.
    pub fn current(&self) -> i32 {
        self.shared.current.load(Ordering::SeqCst)
    }

    /// Attach the receiver, replacing any previous one.
    ///
    /// The sensor does not keep the receiver alive.
    pub fn set_receiver(&self, receiver: Weak<dyn SensorReceiver>) {
        if self.shared.receiver.write().replace(receiver).is_some() {
            debug!("[Sensor] replaced existing receiver");
        }
    }

    pub fn clear_receiver(&self) {
        *self.shared.receiver.write() = None;
    }

    pub fn is_running(&self) -> bool {
        self.timer
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start periodic delivery.
    ///
    /// Delivers the current value immediately, then a new reading every
    /// interval. Does nothing if the sensor is already running.
    pub fn start(&self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let runtime = Handle::try_current().map_err(|_| CoreError::TimerUnavailable)?;

        let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.deliver(self.current());

        let shared = Arc::clone(&self.shared);
        let period = shared.config.interval;
        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let value = shared.advance(Some(epoch));
                debug!("[Sensor] tick -> {}", value);
            }
        });
        *self.timer.lock() = Some(task);

        info!(
            "[Sensor] monitoring started ({}..={}, every {:?})",
            self.shared.config.min, self.shared.config.max, period
        );
        Ok(())
    }

    /// Stop periodic delivery. Readings already queued on the delivery
    /// context are discarded.
    pub fn stop(&self) {
        let Some(task) = self.timer.lock().take() else {
            return;
        };
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        task.abort();
        info!("[Sensor] monitoring stopped at {}", self.current());
    }

    /// Advance the walk by one step and dispatch the reading, exactly as a
    /// timer tick does. Returns the new value.
    pub fn tick(&self) -> i32 {
        self.shared.advance(None)
    }
}

impl Drop for BoundedRandomWalkSensor {
    fn drop(&mut self) {
        if let Some(task) = self.timer.get_mut().take() {
            task.abort();
        }
    }
}
