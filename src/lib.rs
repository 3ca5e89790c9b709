//! Heartbeat board library.
//!
//! Reactive state core for a small board-game app: a simulated heart rate
//! sensor, a coordinator that republishes its readings, a high score that
//! only goes up, and a tic-tac-toe board.

pub mod board;
pub mod config;
pub mod delivery;
pub mod error;
pub mod heartbeat;
pub mod observable;
pub mod registry;
pub mod score;
pub mod sensors;
pub mod store;

pub use board::{Cell, GameBoard, Player, TapOutcome};
pub use delivery::{DeliveryContext, ImmediateContext, SerialContext, SerialRunner, serial_context};
pub use error::{CoreError, Result};
pub use heartbeat::HeartbeatCoordinator;
pub use observable::{EventHook, Observable, SubscriptionToken};
pub use registry::ServiceRegistry;
pub use score::ScoreTracker;
pub use sensors::{BoundedRandomWalkSensor, SensorReceiver, WalkConfig};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
