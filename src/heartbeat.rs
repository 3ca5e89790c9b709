//! Heartbeat coordinator.
//!
//! Receives readings from the shared heartbeat sensor and republishes them:
//! as an observable current value for views, and through a single-listener
//! hook for non-view observers such as the score tracker.

use crate::observable::{EventHook, Observable};
use crate::sensors::{BoundedRandomWalkSensor, SensorReceiver};
use log::{debug, error, info};
use std::sync::{Arc, Weak};

/// Bridges a sensor to observable heartbeat state.
///
/// All methods are expected to run on the sensor's delivery context.
pub struct HeartbeatCoordinator {
    sensor: Arc<BoundedRandomWalkSensor>,
    current: Observable<i32>,
    active: Observable<bool>,
    on_reading: EventHook<i32>,
}

impl HeartbeatCoordinator {
    /// Sentinel current value meaning "no reading yet".
    pub const NO_READING: i32 = -1;

    /// Create a coordinator and register it as the sensor's receiver.
    pub fn new(sensor: Arc<BoundedRandomWalkSensor>) -> Arc<Self> {
        let coordinator = Arc::new(Self {
            sensor,
            current: Observable::new(Self::NO_READING),
            active: Observable::new(false),
            on_reading: EventHook::new(),
        });
        let weak = Arc::downgrade(&coordinator);
        let receiver: Weak<dyn SensorReceiver> = weak;
        coordinator.sensor.set_receiver(receiver);
        coordinator
    }

    /// Latest reading, or [`Self::NO_READING`].
    pub fn current_value(&self) -> i32 {
        self.current.get()
    }

    /// Observable current value for views.
    pub fn current(&self) -> &Observable<i32> {
        &self.current
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Observable monitoring toggle.
    pub fn active(&self) -> &Observable<bool> {
        &self.active
    }

    /// Hook invoked with every raw reading, after the current value is set.
    pub fn reading_hook(&self) -> &EventHook<i32> {
        &self.on_reading
    }

    /// Switch monitoring on or off.
    ///
    /// Switching off resets the current value to [`Self::NO_READING`].
    pub fn set_active(&self, active: bool) {
        if active {
            match self.sensor.start() {
                Ok(()) => {
                    self.active.set(true);
                }
                Err(e) => error!("[Heartbeat] failed to start monitoring: {}", e),
            }
        } else {
            self.sensor.stop();
            self.active.set(false);
            self.current.set(Self::NO_READING);
            info!("[Heartbeat] monitoring off");
        }
    }
}

impl SensorReceiver for HeartbeatCoordinator {
    fn on_reading(&self, value: i32) {
        debug!("[Heartbeat] {} BPM", value);
        self.current.set(value);
        self.on_reading.notify(&value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::{ImmediateContext, serial_context};
    use crate::sensors::{ScriptedSteps, WalkConfig};
    use parking_lot::Mutex;
    use std::time::Duration;

    fn sensor_with(
        context: Arc<dyn crate::delivery::DeliveryContext>,
        steps: impl IntoIterator<Item = i32>,
    ) -> Arc<BoundedRandomWalkSensor> {
        Arc::new(BoundedRandomWalkSensor::with_steps(
            WalkConfig::heartbeat(),
            context,
            ScriptedSteps::new(steps),
        ))
    }

    #[test]
    fn test_starts_without_reading() {
        let coordinator = HeartbeatCoordinator::new(sensor_with(Arc::new(ImmediateContext), []));
        assert_eq!(coordinator.current_value(), HeartbeatCoordinator::NO_READING);
        assert!(!coordinator.is_active());
    }

    #[test]
    fn test_reading_updates_value_then_hook() {
        let sensor = sensor_with(Arc::new(ImmediateContext), [2, -1]);
        let coordinator = HeartbeatCoordinator::new(sensor.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let hook_seen = seen.clone();
        let observed = Arc::downgrade(&coordinator);
        coordinator.reading_hook().register_listener(move |bpm: &i32| {
            // The observable is already updated when the hook fires.
            let current = observed.upgrade().map(|c| c.current_value());
            hook_seen.lock().push((*bpm, current));
        });

        sensor.tick();
        sensor.tick();

        assert_eq!(*seen.lock(), vec![(62, Some(62)), (61, Some(61))]);
        assert_eq!(coordinator.current_value(), 61);
    }

    #[test]
    fn test_views_observe_current_value() {
        let sensor = sensor_with(Arc::new(ImmediateContext), [1]);
        let coordinator = HeartbeatCoordinator::new(sensor.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let view = seen.clone();
        coordinator.current().subscribe(move |bpm| view.lock().push(*bpm));

        sensor.tick();
        assert_eq!(*seen.lock(), vec![61]);
    }

    #[test]
    fn test_start_failure_leaves_inactive() {
        let coordinator = HeartbeatCoordinator::new(sensor_with(Arc::new(ImmediateContext), []));
        let flips = Arc::new(Mutex::new(Vec::new()));
        let seen = flips.clone();
        coordinator.active().subscribe(move |on| seen.lock().push(*on));

        coordinator.set_active(true);
        assert!(!coordinator.is_active());
        // Listeners never see a transient "on".
        assert!(flips.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_resets_to_sentinel() {
        let sensor = sensor_with(Arc::new(ImmediateContext), [2, 2, 2]);
        let coordinator = HeartbeatCoordinator::new(sensor.clone());

        coordinator.set_active(true);
        assert!(coordinator.is_active());
        assert!(sensor.is_running());
        assert_eq!(coordinator.current_value(), 60);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(coordinator.current_value(), 64);

        coordinator.set_active(false);
        assert!(!sensor.is_running());
        assert_eq!(coordinator.current_value(), HeartbeatCoordinator::NO_READING);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(coordinator.current_value(), HeartbeatCoordinator::NO_READING);
    }

    #[tokio::test]
    async fn test_queued_readings_do_not_resurrect_value_after_stop() {
        let (ctx, mut runner) = serial_context();
        let sensor = sensor_with(Arc::new(ctx), [1, 1]);
        let coordinator = HeartbeatCoordinator::new(sensor.clone());

        coordinator.set_active(true);
        sensor.tick();
        sensor.tick();
        coordinator.set_active(false);
        runner.run_pending();

        assert_eq!(coordinator.current_value(), HeartbeatCoordinator::NO_READING);
    }
}
