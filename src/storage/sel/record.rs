//! Decoding of the fixed-size, 16 byte SEL record.
//!
//! Reference: IPMI 2.0 Specification, Section 32.1 "SEL Event Records" and
//! Section 32.2/32.3 "OEM SEL Record - Type C0h-DFh/E0h-FFh"

use crate::{
    connection::{Channel, LogicalUnit},
    error::DecodeError,
    log_vec,
    storage::{
        sdr::{classify, resolve_event_data_flags, EventData, SensorClass},
        Timestamp,
    },
    Loggable,
};

use super::RecordId;

/// The length of every SEL record, regardless of its type.
pub const SEL_RECORD_LEN: usize = 16;

/// The record type class, derived from the record type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTypeClass {
    SystemEvent,
    TimestampedOem,
    NonTimestampedOem,
    Invalid,
}

impl RecordTypeClass {
    pub fn of(record_type: u8) -> Self {
        match record_type {
            0x02 => Self::SystemEvent,
            0xC0..=0xDF => Self::TimestampedOem,
            0xE0..=0xFF => Self::NonTimestampedOem,
            _ => Self::Invalid,
        }
    }
}

/// Options that change how raw records are interpreted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOptions {
    assume_system_event: Vec<u8>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode records of the (otherwise invalid) type `record_type` as System Event
    /// records.
    ///
    /// Some BMCs write system events with a bogus record type, for instance
    /// `0x00` on HP DL380 G5 and `0x03` on Intel S2600JF.
    pub fn assume_system_event(mut self, record_type: u8) -> Self {
        if !self.assume_system_event.contains(&record_type) {
            self.assume_system_event.push(record_type);
        }
        self
    }

    fn class_of(&self, record_type: u8) -> RecordTypeClass {
        match RecordTypeClass::of(record_type) {
            RecordTypeClass::Invalid if self.assume_system_event.contains(&record_type) => {
                RecordTypeClass::SystemEvent
            }
            class => class,
        }
    }
}

/// The generator ID of a system event, unpacked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventGenerator {
    RqSAAndLun {
        i2c_addr: u8,
        channel_number: Channel,
        lun: LogicalUnit,
    },
    SoftwareId {
        software_id: u8,
        channel_number: Channel,
    },
}

impl From<u16> for EventGenerator {
    fn from(value: u16) -> Self {
        let [id, channel_lun] = value.to_le_bytes();

        let is_software_id = (id & 0x1) == 0x1;
        let i2c_or_sid = (id >> 1) & 0x7F;
        let channel_number = Channel::new((channel_lun >> 4) & 0xF).unwrap_or(Channel::Primary);

        if is_software_id {
            Self::SoftwareId {
                software_id: i2c_or_sid,
                channel_number,
            }
        } else {
            Self::RqSAAndLun {
                i2c_addr: i2c_or_sid,
                channel_number,
                lun: LogicalUnit::from_low_bits(channel_lun),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventMessageRevision {
    V2_0,
    V1_0,
    Unknown(u8),
}

impl From<u8> for EventMessageRevision {
    fn from(value: u8) -> Self {
        match value {
            0x04 => Self::V2_0,
            0x03 => Self::V1_0,
            v => Self::Unknown(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDirection {
    Assertion,
    Deassertion,
}

impl core::fmt::Display for EventDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EventDirection::Assertion => write!(f, "Assertion Event"),
            EventDirection::Deassertion => write!(f, "Deassertion Event"),
        }
    }
}

/// The body of a System Event record (type `0x02`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemEventRecord {
    pub timestamp: Timestamp,
    /// The raw generator ID, bytes 7 (LS) and 8 (MS) of the record.
    pub generator_id: u16,
    pub event_message_format: EventMessageRevision,
    pub sensor_type: u8,
    pub sensor_number: u8,
    pub event_direction: EventDirection,
    pub event_reading_type_code: u8,
    pub event_data: [u8; 3],
}

impl SystemEventRecord {
    pub fn generator(&self) -> EventGenerator {
        EventGenerator::from(self.generator_id)
    }

    /// The slave address or software ID byte of the generator ID.
    pub fn generator_address(&self) -> u8 {
        self.generator_id.to_le_bytes()[0]
    }

    pub fn sensor_class(&self) -> SensorClass {
        classify(self.event_reading_type_code)
    }

    /// The event offset, bits [3:0] of event data 1.
    pub fn event_data1_offset(&self) -> u8 {
        self.event_data[0] & 0x0F
    }

    /// Event data 2 and 3, with the roles resolved from event data 1 and
    /// the sensor class.
    pub fn event_data(&self) -> EventData {
        resolve_event_data_flags(
            self.event_reading_type_code,
            self.sensor_type,
            self.event_data,
        )
    }
}

/// The body of a timestamped OEM record (types `0xC0` to `0xDF`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampedOemRecord {
    pub timestamp: Timestamp,
    /// 24 bit IANA enterprise number.
    pub manufacturer_id: u32,
    pub oem_defined: [u8; 6],
}

/// The body of a non-timestamped OEM record (types `0xE0` to `0xFF`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonTimestampedOemRecord {
    pub oem_defined: [u8; 13],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordBody {
    SystemEvent(SystemEventRecord),
    TimestampedOem(TimestampedOemRecord),
    NonTimestampedOem(NonTimestampedOemRecord),
    Invalid,
}

/// One decoded SEL record.
///
/// The raw bytes are kept alongside the decoded body, so that vendor
/// defined trailing bytes and hex dumps stay available.
#[derive(Debug, Clone, PartialEq)]
pub struct SelRecord {
    record_id: RecordId,
    record_type: u8,
    body: RecordBody,
    raw: [u8; SEL_RECORD_LEN],
}

impl SelRecord {
    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    pub fn record_type(&self) -> u8 {
        self.record_type
    }

    pub fn record_type_class(&self) -> RecordTypeClass {
        match self.body {
            RecordBody::SystemEvent(_) => RecordTypeClass::SystemEvent,
            RecordBody::TimestampedOem(_) => RecordTypeClass::TimestampedOem,
            RecordBody::NonTimestampedOem(_) => RecordTypeClass::NonTimestampedOem,
            RecordBody::Invalid => RecordTypeClass::Invalid,
        }
    }

    pub fn body(&self) -> &RecordBody {
        &self.body
    }

    pub fn raw(&self) -> &[u8; SEL_RECORD_LEN] {
        &self.raw
    }

    pub fn system_event(&self) -> Option<&SystemEventRecord> {
        match &self.body {
            RecordBody::SystemEvent(event) => Some(event),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        match &self.body {
            RecordBody::SystemEvent(event) => Some(event.timestamp),
            RecordBody::TimestampedOem(oem) => Some(oem.timestamp),
            _ => None,
        }
    }

    /// The manufacturer ID carried in a timestamped OEM record.
    pub fn manufacturer_id(&self) -> Option<u32> {
        match &self.body {
            RecordBody::TimestampedOem(oem) => Some(oem.manufacturer_id),
            _ => None,
        }
    }

    /// The OEM defined bytes of either OEM record class.
    pub fn oem_defined(&self) -> Option<&[u8]> {
        match &self.body {
            RecordBody::TimestampedOem(oem) => Some(&oem.oem_defined),
            RecordBody::NonTimestampedOem(oem) => Some(&oem.oem_defined),
            _ => None,
        }
    }
}

/// Decode a raw SEL record.
pub fn decode(raw: &[u8]) -> Result<SelRecord, DecodeError> {
    decode_with(raw, &DecodeOptions::default())
}

/// Decode a raw SEL record, applying `options`.
///
/// Unknown record types are not an error: they produce a record of class
/// [`RecordTypeClass::Invalid`] that still exposes its ID and type.
pub fn decode_with(raw: &[u8], options: &DecodeOptions) -> Result<SelRecord, DecodeError> {
    let raw: [u8; SEL_RECORD_LEN] = raw.try_into().map_err(|_| DecodeError::BadLength {
        expected: SEL_RECORD_LEN,
        actual: raw.len(),
    })?;

    let record_id = RecordId::new_raw(u16::from_le_bytes([raw[0], raw[1]]));
    let record_type = raw[2];
    let timestamp = Timestamp::from(u32::from_le_bytes([raw[3], raw[4], raw[5], raw[6]]));

    let body = match options.class_of(record_type) {
        RecordTypeClass::SystemEvent => {
            let event_direction = if (raw[12] & 0x80) == 0x80 {
                EventDirection::Deassertion
            } else {
                EventDirection::Assertion
            };

            RecordBody::SystemEvent(SystemEventRecord {
                timestamp,
                generator_id: u16::from_le_bytes([raw[7], raw[8]]),
                event_message_format: EventMessageRevision::from(raw[9]),
                sensor_type: raw[10],
                sensor_number: raw[11],
                event_direction,
                event_reading_type_code: raw[12] & 0x7F,
                event_data: [raw[13], raw[14], raw[15]],
            })
        }
        RecordTypeClass::TimestampedOem => {
            let mut oem_defined = [0u8; 6];
            oem_defined.copy_from_slice(&raw[10..16]);

            RecordBody::TimestampedOem(TimestampedOemRecord {
                timestamp,
                manufacturer_id: u32::from_le_bytes([raw[7], raw[8], raw[9], 0]),
                oem_defined,
            })
        }
        RecordTypeClass::NonTimestampedOem => {
            let mut oem_defined = [0u8; 13];
            oem_defined.copy_from_slice(&raw[3..16]);

            RecordBody::NonTimestampedOem(NonTimestampedOemRecord { oem_defined })
        }
        RecordTypeClass::Invalid => RecordBody::Invalid,
    };

    Ok(SelRecord {
        record_id,
        record_type,
        body,
        raw,
    })
}

impl Loggable for SelRecord {
    fn as_log(&self) -> Vec<crate::LogItem> {
        let mut log = log_vec![
            (0, "SEL record"),
            (1, "Record ID", format!("0x{:04X}", self.record_id.value())),
            (1, "Record type", format!("0x{:02X}", self.record_type)),
        ];

        match &self.body {
            RecordBody::SystemEvent(event) => log.extend(log_vec![
                (1, "Timestamp", event.timestamp),
                (1, "Generator ID", format!("0x{:04X}", event.generator_id)),
                (1, "Sensor type", format!("0x{:02X}", event.sensor_type)),
                (1, "Sensor number", format!("0x{:02X}", event.sensor_number)),
                (1, "Event type", format!("0x{:02X}", event.event_reading_type_code)),
                (1, "Direction", event.event_direction),
                (1, "Event data", format!("{:02X?}", event.event_data)),
            ]),
            RecordBody::TimestampedOem(oem) => log.extend(log_vec![
                (1, "Timestamp", oem.timestamp),
                (1, "Manufacturer ID", format!("0x{:06X}", oem.manufacturer_id)),
                (1, "OEM data", format!("{:02X?}", oem.oem_defined)),
            ]),
            RecordBody::NonTimestampedOem(oem) => {
                log.push((1, "OEM data", format!("{:02X?}", oem.oem_defined)).into())
            }
            RecordBody::Invalid => log.push((1, "Body", "invalid record type").into()),
        }

        log
    }
}
