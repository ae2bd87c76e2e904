//! Event Data Field Decoding
//!
//! Reference: IPMI 2.0 Specification, Table 29-6 "Event Request Message Event Data Field Contents"

use core::fmt;

use super::{classify, SensorClass};

/// The role of event data byte 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDataFlag {
    Unspecified,
    PreviousStateOrSeverity,
    SensorSpecificExtensionCode,
    OemCode,
    TriggerReadingValue,
    TriggerThresholdValue,
    /// The flag bits hold a combination that is reserved for this sensor class.
    UnavailableByte,
}

/// The value that marks a previous state, severity or extension code
/// as unspecified.
pub const UNSPECIFIED_EVENT_DATA: u8 = 0xFF;

/// One of event data bytes 2 and 3, together with its role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventDataByte {
    pub flag: EventDataFlag,
    pub value: u8,
}

impl EventDataByte {
    /// Whether the byte carries anything worth rendering.
    pub fn is_meaningful(&self) -> bool {
        !matches!(
            self.flag,
            EventDataFlag::Unspecified | EventDataFlag::UnavailableByte
        )
    }

    fn new(flag: EventDataFlag, value: u8) -> Self {
        let flag = match flag {
            EventDataFlag::SensorSpecificExtensionCode | EventDataFlag::PreviousStateOrSeverity
                if value == UNSPECIFIED_EVENT_DATA =>
            {
                EventDataFlag::Unspecified
            }
            flag => flag,
        };

        Self { flag, value }
    }
}

/// Event data with the roles of bytes 2 and 3 resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventData {
    /// Event offset (bits [3:0] of event data 1)
    pub offset: u8,
    pub data2: EventDataByte,
    pub data3: EventDataByte,
}

impl EventData {
    pub fn flags(&self) -> (EventDataFlag, EventDataFlag) {
        (self.data2.flag, self.data3.flag)
    }
}

/// Resolve the roles of event data 2 and 3.
///
/// Bits [7:6] of event data 1 describe byte 2 and bits [5:4] describe byte 3.
/// What each bit pattern means depends on the sensor class.
pub fn resolve_event_data_flags(
    event_reading_type_code: u8,
    sensor_type: u8,
    event_data: [u8; 3],
) -> EventData {
    use EventDataFlag::*;

    let class = classify(event_reading_type_code);
    let data2_bits = (event_data[0] >> 6) & 0b11;
    let data3_bits = (event_data[0] >> 4) & 0b11;

    let data2 = match (class, data2_bits) {
        (_, 0b00) => Unspecified,
        (SensorClass::Threshold, 0b01) => TriggerReadingValue,
        (_, 0b01) => PreviousStateOrSeverity,
        (_, 0b10) => OemCode,
        (SensorClass::Oem, _) => UnavailableByte,
        (_, _) => SensorSpecificExtensionCode,
    };

    let data3 = match (class, data3_bits) {
        (_, 0b00) => Unspecified,
        (SensorClass::Threshold, 0b01) => TriggerThresholdValue,
        (_, 0b01) => UnavailableByte,
        (_, 0b10) => OemCode,
        (SensorClass::Oem, _) => UnavailableByte,
        (_, _) => SensorSpecificExtensionCode,
    };

    log::trace!(
        "Event data flags for type 0x{event_reading_type_code:02X}, sensor type 0x{sensor_type:02X}: {data2:?}, {data3:?}"
    );

    EventData {
        offset: event_data[0] & 0x0F,
        data2: EventDataByte::new(data2, event_data[1]),
        data3: EventDataByte::new(data3, event_data[2]),
    }
}

impl fmt::Display for EventDataByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.flag {
            EventDataFlag::TriggerReadingValue => write!(f, "reading=0x{:02X}", self.value),
            EventDataFlag::TriggerThresholdValue => write!(f, "threshold=0x{:02X}", self.value),
            EventDataFlag::PreviousStateOrSeverity => write!(f, "state=0x{:02X}", self.value),
            EventDataFlag::OemCode => write!(f, "oem=0x{:02X}", self.value),
            EventDataFlag::SensorSpecificExtensionCode => write!(f, "ext=0x{:02X}", self.value),
            EventDataFlag::Unspecified | EventDataFlag::UnavailableByte => Ok(()),
        }
    }
}

impl fmt::Display for EventData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [self.data2, self.data3]
            .iter()
            .filter(|b| b.is_meaningful())
            .map(|b| b.to_string())
            .collect();

        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EventDataFlag::*;

    #[test]
    fn threshold_flags() {
        let data = resolve_event_data_flags(0x01, 0x01, [0x59, 0x42, 0x50]);

        assert_eq!(data.offset, 0x09);
        assert_eq!(data.flags(), (TriggerReadingValue, TriggerThresholdValue));
        assert_eq!(data.to_string(), "reading=0x42, threshold=0x50");
    }

    #[test]
    fn discrete_flags() {
        // Sensor specific, byte 2 previous state, byte 3 extension
        let data = resolve_event_data_flags(0x6F, 0x0C, [0x70, 0x12, 0x03]);
        assert_eq!(data.flags(), (PreviousStateOrSeverity, SensorSpecificExtensionCode));

        // Generic discrete, OEM codes in both
        let data = resolve_event_data_flags(0x07, 0x01, [0xA1, 0x12, 0x34]);
        assert_eq!(data.flags(), (OemCode, OemCode));

        // 01b is reserved for byte 3 of discrete sensors
        let data = resolve_event_data_flags(0x03, 0x01, [0x10, 0x00, 0x00]);
        assert_eq!(data.flags(), (Unspecified, UnavailableByte));
    }

    #[test]
    fn oem_class_flags() {
        let data = resolve_event_data_flags(0x70, 0xC1, [0xE0, 0x01, 0x02]);
        assert_eq!(data.flags(), (UnavailableByte, OemCode));

        let data = resolve_event_data_flags(0x7E, 0xC1, [0x50, 0x01, 0x02]);
        assert_eq!(data.flags(), (PreviousStateOrSeverity, UnavailableByte));
    }

    #[test]
    fn unspecified_sentinel_overrides_flag_bits() {
        let data = resolve_event_data_flags(0x6F, 0x10, [0xF0, 0xFF, 0xFF]);
        assert_eq!(data.flags(), (Unspecified, Unspecified));
        assert!(!data.data2.is_meaningful());
        assert_eq!(data.to_string(), "");

        let data = resolve_event_data_flags(0x6F, 0x10, [0x70, 0xFF, 0x05]);
        assert_eq!(data.flags(), (Unspecified, SensorSpecificExtensionCode));

        // A trigger reading of 0xFF is a legitimate raw value
        let data = resolve_event_data_flags(0x01, 0x04, [0x50, 0xFF, 0x00]);
        assert_eq!(data.flags(), (TriggerReadingValue, TriggerThresholdValue));
    }
}
