//! Sensor/Event network function commands.

mod sensor_reading;
pub use sensor_reading::{GetSensorReading, RawSensorReading, SensorReading, ThresholdStatus};
