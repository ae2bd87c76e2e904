//! Sensor metadata consumed while interpreting SEL records.
//!
//! The SDR repository itself (fetching, caching) lives outside of this crate.
//! Callers hand in whatever they know about sensors through [`SdrLookup`].

use std::collections::HashMap;

mod conversion;
pub use conversion::{decode_value, AnalogDataFormat, Linearization, SensorCalibration};

mod event_data;
pub use event_data::{
    resolve_event_data_flags, EventData, EventDataByte, EventDataFlag, UNSPECIFIED_EVENT_DATA,
};

pub mod event_extension;

pub mod event_offset;

mod event_reading_type_code;
pub use event_reading_type_code::{classify, EventReadingTypeCodes, SensorClass};

mod sensor_type;
pub use sensor_type::SensorType;

mod units;
pub use units::Unit;

/// What is known about one sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDescriptor {
    pub name: String,
    pub sensor_type: SensorType,
    pub event_reading_type_code: u8,
    /// `None` for sensors that are not analog, such as those described by
    /// compact or event-only records.
    pub calibration: Option<SensorCalibration>,
    pub unit: Unit,
    pub unit_is_percentage: bool,
    pub entity_id: u8,
    pub entity_instance: u8,
}

impl SensorDescriptor {
    pub fn new(name: impl Into<String>, sensor_type: SensorType, event_reading_type_code: u8) -> Self {
        Self {
            name: name.into(),
            sensor_type,
            event_reading_type_code,
            calibration: None,
            unit: Unit::Unspecified,
            unit_is_percentage: false,
            entity_id: 0,
            entity_instance: 0,
        }
    }

    pub fn with_calibration(mut self, calibration: SensorCalibration, unit: Unit) -> Self {
        self.calibration = Some(calibration);
        self.unit = unit;
        self
    }

    pub fn with_entity(mut self, entity_id: u8, entity_instance: u8) -> Self {
        self.entity_id = entity_id;
        self.entity_instance = entity_instance;
        self
    }

    /// Convert a raw reading with this sensor's calibration.
    pub fn value(&self, raw: u8) -> Option<f64> {
        self.calibration.as_ref().and_then(|cal| decode_value(cal, raw))
    }

    /// The sensor name prefixed with its entity, e.g. `Processor 1 Temp`.
    ///
    /// The prefix is left out if the name already mentions the entity.
    pub fn entity_sensor_name(&self) -> String {
        match entity_name(self.entity_id) {
            Some(entity)
                if !self
                    .name
                    .to_ascii_lowercase()
                    .contains(&entity.to_ascii_lowercase()) =>
            {
                format!("{entity} {} {}", self.entity_instance & 0x7F, self.name)
            }
            _ => self.name.clone(),
        }
    }
}

/// Finds the sensor that generated an event.
pub trait SdrLookup {
    fn find_sensor(&self, sensor_number: u8, generator_id: u16) -> Option<&SensorDescriptor>;
}

/// No SDR information at all.
impl SdrLookup for () {
    fn find_sensor(&self, _: u8, _: u16) -> Option<&SensorDescriptor> {
        None
    }
}

impl<T> SdrLookup for &T
where
    T: SdrLookup + ?Sized,
{
    fn find_sensor(&self, sensor_number: u8, generator_id: u16) -> Option<&SensorDescriptor> {
        (**self).find_sensor(sensor_number, generator_id)
    }
}

/// An in-memory [`SdrLookup`], keyed by the sensor owner (the slave address
/// or software ID byte of the generator ID) and the sensor number.
#[derive(Debug, Clone, Default)]
pub struct SensorTable {
    sensors: HashMap<(u8, u8), SensorDescriptor>,
}

impl SensorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, owner_id: u8, sensor_number: u8, sensor: SensorDescriptor) {
        self.sensors.insert((owner_id, sensor_number), sensor);
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

impl SdrLookup for SensorTable {
    fn find_sensor(&self, sensor_number: u8, generator_id: u16) -> Option<&SensorDescriptor> {
        let owner_id = generator_id.to_le_bytes()[0];
        self.sensors.get(&(owner_id, sensor_number))
    }
}

/// Entity ID names.
///
/// Reference: IPMI 2.0 Specification, Table 43-13 "Entity ID Codes"
pub fn entity_name(entity_id: u8) -> Option<&'static str> {
    let name = match entity_id {
        0x01 => "Other",
        0x02 => "Unknown",
        0x03 => "Processor",
        0x04 => "Disk or Disk Bay",
        0x05 => "Peripheral Bay",
        0x06 => "System Management Module",
        0x07 => "System Board",
        0x08 => "Memory Module",
        0x09 => "Processor Module",
        0x0A => "Power Supply",
        0x0B => "Add-in Card",
        0x0C => "Front Panel Board",
        0x0D => "Back Panel Board",
        0x0E => "Power System Board",
        0x0F => "Drive Backplane",
        0x10 => "System Internal Expansion Board",
        0x11 => "Other System Board",
        0x12 => "Processor Board",
        0x13 => "Power Unit",
        0x14 => "Power Module",
        0x15 => "Power Management",
        0x16 => "Chassis Back Panel Board",
        0x17 => "System Chassis",
        0x18 => "Sub-Chassis",
        0x19 => "Other Chassis Board",
        0x1A => "Disk Drive Bay",
        0x1B => "Peripheral Bay",
        0x1C => "Device Bay",
        0x1D => "Fan Device",
        0x1E => "Cooling Unit",
        0x1F => "Cable/Interconnect",
        0x20 => "Memory Device",
        0x21 => "System Management Software",
        0x22 => "System Firmware",
        0x23 => "Operating System",
        0x24 => "System Bus",
        0x25 => "Group",
        0x26 => "Remote Management Communication Device",
        0x27 => "External Environment",
        0x28 => "Battery",
        0x29 => "Processing Blade",
        0x2A => "Connectivity Switch",
        0x2B => "Processor/Memory Module",
        0x2C => "I/O Module",
        0x2D => "Processor/IO Module",
        0x2E => "Management Controller Firmware",
        0x2F => "IPMI Channel",
        0x30 => "PCI Bus",
        0x31 => "PCI Express Bus",
        0x32 => "SCSI Bus",
        0x33 => "SATA/SAS Bus",
        0x34 => "Processor/Front-Side Bus",
        0x35 => "Real Time Clock",
        0x37 => "Air Inlet",
        0x40 => "Air Inlet",
        0x41 => "Processor",
        0x42 => "Baseboard",
        _ => return None,
    };

    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup_uses_owner_byte() {
        let mut table = SensorTable::new();
        table.insert(
            0x20,
            0x30,
            SensorDescriptor::new("CPU Temp", SensorType::Temperature, 0x01),
        );

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.find_sensor(0x30, 0x0020).map(|s| s.name.as_str()),
            Some("CPU Temp")
        );
        // Channel and LUN live in the upper byte
        assert!(table.find_sensor(0x30, 0x1020).is_some());
        assert!(table.find_sensor(0x30, 0x0040).is_none());
        assert!(().find_sensor(0x30, 0x0020).is_none());
    }

    #[test]
    fn entity_sensor_names() {
        let sensor = SensorDescriptor::new("Temp", SensorType::Temperature, 0x01).with_entity(0x03, 1);
        assert_eq!(sensor.entity_sensor_name(), "Processor 1 Temp");

        let sensor =
            SensorDescriptor::new("Processor Temp", SensorType::Temperature, 0x01).with_entity(0x03, 1);
        assert_eq!(sensor.entity_sensor_name(), "Processor Temp");

        let sensor = SensorDescriptor::new("Temp", SensorType::Temperature, 0x01);
        assert_eq!(sensor.entity_sensor_name(), "Temp");
    }

    #[test]
    fn descriptor_value() {
        let sensor = SensorDescriptor::new("Fan 1", SensorType::Fan, 0x01).with_calibration(
            SensorCalibration::linear(60, 0, 0, 0),
            Unit::RevolutionsPerMinute,
        );
        assert_eq!(sensor.value(0x32), Some(3000.0));

        let sensor = SensorDescriptor::new("PSU", SensorType::PowerSupply, 0x6F);
        assert_eq!(sensor.value(0x32), None);
    }
}
