mod get;
pub use get::GetSensorReading;

use crate::storage::sdr::{classify, event_offset, SensorClass, SensorDescriptor};

/// The undecoded response to a [`GetSensorReading`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSensorReading {
    pub reading: u8,
    pub all_event_messages_disabled: bool,
    pub scanning_disabled: bool,
    pub reading_or_state_unavailable: bool,
    pub offset_data_1: Option<u8>,
    pub offset_data_2: Option<u8>,
}

bitflags::bitflags! {
    /// Threshold comparison status of a threshold based sensor.
    pub struct ThresholdStatus: u8 {
        const AT_OR_ABOVE_UPPER_NON_RECOVERABLE = 0x20;
        const AT_OR_ABOVE_UPPER_CRITICAL = 0x10;
        const AT_OR_ABOVE_UPPER_NON_CRITICAL = 0x08;
        const AT_OR_BELOW_LOWER_NON_RECOVERABLE = 0x04;
        const AT_OR_BELOW_LOWER_CRITICAL = 0x02;
        const AT_OR_BELOW_LOWER_NON_CRITICAL = 0x01;
    }
}

const THRESHOLD_STATUS_MESSAGES: [(ThresholdStatus, &str); 6] = [
    (
        ThresholdStatus::AT_OR_BELOW_LOWER_NON_CRITICAL,
        "At or Below (<=) Lower Non-Critical Threshold",
    ),
    (
        ThresholdStatus::AT_OR_BELOW_LOWER_CRITICAL,
        "At or Below (<=) Lower Critical Threshold",
    ),
    (
        ThresholdStatus::AT_OR_BELOW_LOWER_NON_RECOVERABLE,
        "At or Below (<=) Lower Non-Recoverable Threshold",
    ),
    (
        ThresholdStatus::AT_OR_ABOVE_UPPER_NON_CRITICAL,
        "At or Above (>=) Upper Non-Critical Threshold",
    ),
    (
        ThresholdStatus::AT_OR_ABOVE_UPPER_CRITICAL,
        "At or Above (>=) Upper Critical Threshold",
    ),
    (
        ThresholdStatus::AT_OR_ABOVE_UPPER_NON_RECOVERABLE,
        "At or Above (>=) Upper Non-Recoverable Threshold",
    ),
];

/// A sensor reading interpreted with the sensor's SDR information.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// The physical value, if the sensor is analog and its conversion is supported.
    pub value: Option<f64>,
    pub threshold_status: Option<ThresholdStatus>,
    /// The messages of all asserted states, or of the crossed thresholds.
    pub messages: Vec<&'static str>,
}

impl SensorReading {
    /// Interpret `raw` using `sensor`.
    ///
    /// Returns `None` if the BMC reports that the reading is unavailable, or
    /// that the sensor is not being scanned.
    pub fn new(sensor: &SensorDescriptor, raw: &RawSensorReading) -> Option<Self> {
        if raw.reading_or_state_unavailable || raw.scanning_disabled {
            return None;
        }

        let sensor_type = u8::from(sensor.sensor_type);

        let reading = match classify(sensor.event_reading_type_code) {
            SensorClass::Threshold => {
                let status = raw.offset_data_1.map(ThresholdStatus::from_bits_truncate);
                let messages = status
                    .map(|status| {
                        THRESHOLD_STATUS_MESSAGES
                            .iter()
                            .filter(|(flag, _)| status.contains(*flag))
                            .map(|(_, msg)| *msg)
                            .collect()
                    })
                    .unwrap_or_default();

                Self {
                    value: sensor.value(raw.reading),
                    threshold_status: status,
                    messages,
                }
            }
            SensorClass::GenericDiscrete | SensorClass::SensorSpecificDiscrete => {
                let mask = u16::from_le_bytes([
                    raw.offset_data_1.unwrap_or(0),
                    raw.offset_data_2.unwrap_or(0) & 0x7F,
                ]);

                Self {
                    value: None,
                    threshold_status: None,
                    messages: event_offset::state_messages(
                        sensor.event_reading_type_code,
                        sensor_type,
                        mask,
                    ),
                }
            }
            SensorClass::Oem => Self {
                value: None,
                threshold_status: None,
                messages: Vec::new(),
            },
        };

        Some(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connection::IpmiCommand,
        storage::sdr::{SensorCalibration, SensorType, Unit},
    };

    #[test]
    fn threshold_reading() {
        let sensor = SensorDescriptor::new("Inlet Temp", SensorType::Temperature, 0x01)
            .with_calibration(SensorCalibration::linear(1, 0, 0, 0), Unit::DegreesCelsius);

        let raw = GetSensorReading::parse_success_response(&[0x48, 0xC0, 0x18]).unwrap();
        let reading = SensorReading::new(&sensor, &raw).unwrap();

        assert_eq!(reading.value, Some(72.0));
        assert_eq!(
            reading.threshold_status,
            Some(
                ThresholdStatus::AT_OR_ABOVE_UPPER_NON_CRITICAL
                    | ThresholdStatus::AT_OR_ABOVE_UPPER_CRITICAL
            )
        );
        assert_eq!(
            reading.messages,
            vec![
                "At or Above (>=) Upper Non-Critical Threshold",
                "At or Above (>=) Upper Critical Threshold"
            ]
        );
    }

    #[test]
    fn discrete_reading() {
        let sensor = SensorDescriptor::new("PS1 Status", SensorType::PowerSupply, 0x6F);

        let raw = GetSensorReading::parse_success_response(&[0x00, 0xC0, 0x03, 0x80]).unwrap();
        let reading = SensorReading::new(&sensor, &raw).unwrap();

        assert_eq!(reading.value, None);
        assert_eq!(
            reading.messages,
            vec!["Presence detected", "Power Supply Failure detected"]
        );
    }

    #[test]
    fn unavailable_reading() {
        let sensor = SensorDescriptor::new("Fan 1", SensorType::Fan, 0x01);

        let raw = GetSensorReading::parse_success_response(&[0x00, 0xE0]).unwrap();
        assert!(raw.reading_or_state_unavailable);
        assert_eq!(SensorReading::new(&sensor, &raw), None);

        let raw = GetSensorReading::parse_success_response(&[0x10, 0x80]).unwrap();
        assert!(raw.scanning_disabled);
        assert_eq!(SensorReading::new(&sensor, &raw), None);
    }
}
