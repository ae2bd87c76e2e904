use crate::connection::{IpmiCommand, Message, NetFn, NotEnoughData};

use super::RawSensorReading;

impl RawSensorReading {
    pub(super) fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 2 {
            return None;
        }

        // Both bits are "enabled" bits on the wire
        let all_event_messages_disabled = (data[1] & 0x80) != 0x80;
        let scanning_disabled = (data[1] & 0x40) != 0x40;
        let reading_or_state_unavailable = (data[1] & 0x20) == 0x20;

        Some(Self {
            reading: data[0],
            all_event_messages_disabled,
            scanning_disabled,
            reading_or_state_unavailable,
            offset_data_1: data.get(2).copied(),
            offset_data_2: data.get(3).copied(),
        })
    }
}

/// Get Sensor Reading command.
///
/// Reference: IPMI 2.0 Specification, Section 35.14 "Get Sensor Reading Command"
pub struct GetSensorReading {
    sensor_number: u8,
}

impl GetSensorReading {
    pub fn for_sensor(sensor_number: u8) -> Self {
        Self { sensor_number }
    }
}

impl From<GetSensorReading> for Message {
    fn from(value: GetSensorReading) -> Self {
        Message::new_request(NetFn::SensorEvent, 0x2D, vec![value.sensor_number])
    }
}

impl IpmiCommand for GetSensorReading {
    type Output = RawSensorReading;
    type Error = NotEnoughData;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        RawSensorReading::parse(data).ok_or(NotEnoughData)
    }
}
