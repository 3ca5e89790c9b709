//! Simulated sensors and their receiver capability.
//!
//! A sensor produces readings over time and hands each one to a single
//! [`SensorReceiver`]. Delivery always goes through the sensor's
//! [`DeliveryContext`](crate::delivery::DeliveryContext), never directly from
//! the timer task.

pub mod random_walk;
pub mod steps;

pub use random_walk::{BoundedRandomWalkSensor, WalkConfig};
pub use steps::{RandomSteps, ScriptedSteps, StepSource};

/// Capability for receiving sensor readings.
///
/// At most one receiver is attached to a sensor; attaching another replaces
/// it.
pub trait SensorReceiver: Send + Sync {
    /// Called on the delivery context for every reading, in production order.
    fn on_reading(&self, value: i32);
}
