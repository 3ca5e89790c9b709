//! Service registry.
//!
//! Built once at startup and passed by reference to whatever needs sensor
//! access. The heartbeat sensor itself is created lazily, on first request.

use crate::config::SensorConfig;
use crate::delivery::DeliveryContext;
use crate::error::Result;
use crate::sensors::{BoundedRandomWalkSensor, WalkConfig};
use log::info;
use std::sync::{Arc, OnceLock};

pub struct ServiceRegistry {
    sensor_config: WalkConfig,
    context: Arc<dyn DeliveryContext>,
    /// Shared heartbeat sensor (lazily initialized)
    sensor: OnceLock<Arc<BoundedRandomWalkSensor>>,
}

impl ServiceRegistry {
    /// Validate the sensor configuration and build the registry.
    pub fn new(config: &SensorConfig, context: Arc<dyn DeliveryContext>) -> Result<Self> {
        Ok(Self::with_walk_config(config.to_walk_config()?, context))
    }

    pub fn with_walk_config(sensor_config: WalkConfig, context: Arc<dyn DeliveryContext>) -> Self {
        Self {
            sensor_config,
            context,
            sensor: OnceLock::new(),
        }
    }

    /// The shared heartbeat sensor. Every call returns the same instance,
    /// including concurrent first calls.
    pub fn sensor(&self) -> Arc<BoundedRandomWalkSensor> {
        self.sensor
            .get_or_init(|| {
                info!("[Registry] creating heartbeat sensor");
                Arc::new(BoundedRandomWalkSensor::new(
                    self.sensor_config,
                    self.context.clone(),
                ))
            })
            .clone()
    }

    /// The shared delivery context.
    pub fn context(&self) -> Arc<dyn DeliveryContext> {
        self.context.clone()
    }
}
