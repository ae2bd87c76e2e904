//! Fujitsu iRMC system events and OEM records.
//!
//! Fujitsu BMCs spread free form ASCII messages over consecutive OEM records,
//! two characters per record.

use super::{OemContext, OemRender, OemRule, Vendor};
use crate::{
    app::IanaManufacturer,
    storage::{
        sdr::{EventData, EventDataFlag, SensorType},
        sel::SystemEventRecord,
    },
};

/// iRMC S1 through S4.
pub const PRODUCT_ID_IRMC_MIN: u16 = 0x0200;
pub const PRODUCT_ID_IRMC_MAX: u16 = 0x0220;

const SENSOR_SPECIFIC: u8 = 0x6F;

pub(super) fn is_fujitsu(manufacturer_id: u32) -> bool {
    manufacturer_id == IanaManufacturer::Fujitsu.id()
        || manufacturer_id == IanaManufacturer::FujitsuSiemens.id()
}

fn is_irmc(ctx: &OemContext) -> bool {
    is_fujitsu(ctx.manufacturer_id)
        && (PRODUCT_ID_IRMC_MIN..=PRODUCT_ID_IRMC_MAX).contains(&ctx.product_id)
}

fn sensor_specific(event: &SystemEventRecord, sensor_type: SensorType) -> bool {
    event.event_reading_type_code == SENSOR_SPECIFIC && SensorType::from(event.sensor_type) == sensor_type
}

fn memory_location(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    // Correctable and uncorrectable ECC, ECC logging limit reached
    is_irmc(ctx)
        && sensor_specific(event, SensorType::Memory)
        && matches!(data.offset, 0x00 | 0x01 | 0x05)
        && data.flags() == (EventDataFlag::OemCode, EventDataFlag::OemCode)
}

pub(super) const MEMORY_LOCATION: OemRule = OemRule {
    vendor: Vendor::Fujitsu,
    description: "memory board and DIMM socket",
    guard: memory_location,
    render: OemRender::Separate {
        data2: |value| format!("Memory Board = {value}"),
        data3: |value| format!("DIMM Socket = {value}"),
    },
};

fn processor_location(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    // IERR, thermal trip, configuration error
    is_irmc(ctx)
        && sensor_specific(event, SensorType::Processor)
        && matches!(data.offset, 0x00 | 0x01 | 0x05)
        && data.data3.flag == EventDataFlag::OemCode
}

/// Event data 3 holds the CPU socket, event data 2 is unused.
fn cpu_socket(event: &SystemEventRecord) -> Option<String> {
    Some(format!("CPU {}", event.event_data[2]))
}

pub(super) const PROCESSOR_LOCATION: OemRule = OemRule {
    vendor: Vendor::Fujitsu,
    description: "CPU socket",
    guard: processor_location,
    render: OemRender::Combined(cpu_socket),
};

/// The text fragment held by one OEM record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OemText {
    /// The first record of a message.
    Header,
    Text(String),
    /// The last fragment of a message.
    EndOfMessage(String),
    Unknown,
}

fn is_printable(c: u8) -> bool {
    c.is_ascii_graphic() || c == b' '
}

fn is_line_end(c: u8) -> bool {
    c == b'\r' || c == b'\n'
}

/// Decode the text fragment in the OEM defined bytes of a record.
pub fn decode_oem_text(data: &[u8]) -> OemText {
    if data.len() < 4 {
        return OemText::Unknown;
    }

    if data[..3] == [0x00, 0x00, 0x00] {
        return OemText::Header;
    }

    let (first, second) = (data[1], data[3]);

    if is_line_end(first) || is_line_end(second) {
        let text = [first, second]
            .into_iter()
            .filter(|c| is_printable(*c))
            .map(char::from)
            .collect();
        return OemText::EndOfMessage(text);
    }

    if is_printable(first) && (is_printable(second) || second == 0) {
        let mut text = String::from(char::from(first));
        if second != 0 {
            text.push(char::from(second));
        }
        return OemText::Text(text);
    }

    OemText::Unknown
}
