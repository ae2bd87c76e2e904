//! Event/Reading Type Codes
//!
//! Reference: IPMI 2.0 Specification, Table 42-1 "Event/Reading Type Code Ranges"

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventReadingTypeCodes {
    Unspecified,
    Threshold,
    DiscreteGeneric(u8),
    SensorSpecific,
    Oem(u8),
    Reserved(u8),
}

impl From<u8> for EventReadingTypeCodes {
    fn from(value: u8) -> Self {
        match value & 0x7F {
            0x00 => Self::Unspecified,
            0x01 => Self::Threshold,
            v @ 0x02..=0x0C => Self::DiscreteGeneric(v),
            0x6F => Self::SensorSpecific,
            v @ 0x70..=0x7F => Self::Oem(v),
            v => Self::Reserved(v),
        }
    }
}

/// The class of a sensor, which decides how event data and event
/// offsets are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorClass {
    Threshold,
    GenericDiscrete,
    SensorSpecificDiscrete,
    Oem,
}

impl SensorClass {
    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::GenericDiscrete | Self::SensorSpecificDiscrete)
    }
}

impl From<EventReadingTypeCodes> for SensorClass {
    fn from(value: EventReadingTypeCodes) -> Self {
        match value {
            EventReadingTypeCodes::Threshold => Self::Threshold,
            EventReadingTypeCodes::DiscreteGeneric(_) => Self::GenericDiscrete,
            EventReadingTypeCodes::SensorSpecific => Self::SensorSpecificDiscrete,
            EventReadingTypeCodes::Oem(_)
            | EventReadingTypeCodes::Unspecified
            | EventReadingTypeCodes::Reserved(_) => Self::Oem,
        }
    }
}

/// Classify an event/reading type code.
pub fn classify(event_reading_type_code: u8) -> SensorClass {
    EventReadingTypeCodes::from(event_reading_type_code).into()
}

#[test]
fn classify_ranges() {
    assert_eq!(classify(0x01), SensorClass::Threshold);
    assert_eq!(classify(0x02), SensorClass::GenericDiscrete);
    assert_eq!(classify(0x0C), SensorClass::GenericDiscrete);
    assert_eq!(classify(0x6F), SensorClass::SensorSpecificDiscrete);
    assert_eq!(classify(0x70), SensorClass::Oem);
    assert_eq!(classify(0x7F), SensorClass::Oem);
    assert_eq!(classify(0x00), SensorClass::Oem);
    assert_eq!(classify(0x0D), SensorClass::Oem);
    assert_eq!(classify(0x6E), SensorClass::Oem);
}
