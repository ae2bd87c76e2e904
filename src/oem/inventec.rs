//! Inventec 5441 (Dell Xanadu II).

use super::{OemContext, OemRender, OemRule, Vendor};
use crate::storage::{
    sdr::{EventData, EventDataFlag, SensorType},
    sel::SystemEventRecord,
};

pub const MANUFACTURER_ID: u32 = 20569;
pub const PRODUCT_ID_5441: u16 = 51;

const GENERATOR_BIOS: u16 = 0x0001;
const GENERATOR_POST_ERROR_CODE: u16 = 0x0033;

const EVENT_TYPE_BIOS: u8 = 0x70;
const SENSOR_TYPE_BIOS: u8 = 0xC1;
const SENSOR_NUMBER_POST_START: u8 = 0x81;
const SENSOR_NUMBER_POST_ERROR_CODE: u8 = 0x06;

fn is_5441(ctx: &OemContext) -> bool {
    ctx.manufacturer_id == MANUFACTURER_ID && ctx.product_id == PRODUCT_ID_5441
}

fn is_bios_version(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    is_5441(ctx)
        && event.generator_id == GENERATOR_BIOS
        && event.event_reading_type_code == EVENT_TYPE_BIOS
        && event.sensor_type == SENSOR_TYPE_BIOS
        && event.sensor_number == SENSOR_NUMBER_POST_START
        && data.offset == 0
        && data.flags() == (EventDataFlag::OemCode, EventDataFlag::OemCode)
}

fn bios_version(event: &SystemEventRecord) -> Option<String> {
    Some(format!(
        "BIOS Version {:X}.{:02X}",
        event.event_data[1], event.event_data[2]
    ))
}

/// Event data 2 and 3 hold the major and minor BIOS version.
pub(super) const BIOS_VERSION: OemRule = OemRule {
    vendor: Vendor::Inventec,
    description: "BIOS version at POST start",
    guard: is_bios_version,
    render: OemRender::Combined(bios_version),
};

fn is_post_error_code(ctx: &OemContext, event: &SystemEventRecord, _: &EventData) -> bool {
    is_5441(ctx)
        && event.generator_id == GENERATOR_POST_ERROR_CODE
        && event.event_reading_type_code == 0x6F
        && SensorType::from(event.sensor_type) == SensorType::SystemFirmwareProgress
        && event.sensor_number == SENSOR_NUMBER_POST_ERROR_CODE
}

fn post_error_code(event: &SystemEventRecord) -> Option<String> {
    let code = u16::from_le_bytes([event.event_data[1], event.event_data[2]]);
    Some(format!("POST Error Code = {code:04X}h"))
}

/// Event data 2 and 3 are one BIOS error code.
pub(super) const POST_ERROR_CODE: OemRule = OemRule {
    vendor: Vendor::Inventec,
    description: "POST error code",
    guard: is_post_error_code,
    render: OemRender::Combined(post_error_code),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        oem::{combined_text, oem_override, tests::system_event},
        storage::sel::decode,
    };

    #[test]
    fn bios_version() {
        let ctx = OemContext::new(MANUFACTURER_ID, PRODUCT_ID_5441);
        let record = system_event(0x01, 0xC1, 0x81, 0x70, [0xA0, 0x01, 0x07]);

        assert_eq!(oem_override(&ctx, &record), Some("%c"));
        assert_eq!(combined_text(&ctx, &record).as_deref(), Some("BIOS Version 1.07"));

        // Another product from the same vendor
        let ctx = OemContext::new(MANUFACTURER_ID, 52);
        assert_eq!(oem_override(&ctx, &record), None);
    }

    #[test]
    fn post_error_code() {
        let ctx = OemContext::new(MANUFACTURER_ID, PRODUCT_ID_5441);
        let record = system_event(0x33, 0x0F, 0x06, 0x6F, [0xA0, 0x34, 0x12]);

        assert_eq!(
            combined_text(&ctx, &record).as_deref(),
            Some("POST Error Code = 1234h")
        );

        let record = system_event(0x20, 0x0F, 0x06, 0x6F, [0xA0, 0x34, 0x12]);
        assert_eq!(combined_text(&ctx, &record), None);
    }

    #[test]
    fn generator_id_must_match_in_full() {
        let ctx = OemContext::new(MANUFACTURER_ID, PRODUCT_ID_5441);

        // Same low byte, but a non-zero channel in the upper byte
        let mut raw = *system_event(0x33, 0x0F, 0x06, 0x6F, [0xA0, 0x34, 0x12]).raw();
        raw[8] = 0x10;
        let record = decode(&raw).unwrap();
        assert_eq!(combined_text(&ctx, &record), None);

        let mut raw = *system_event(0x01, 0xC1, 0x81, 0x70, [0xA0, 0x01, 0x07]).raw();
        raw[8] = 0x01;
        let record = decode(&raw).unwrap();
        assert_eq!(oem_override(&ctx, &record), None);
    }
}
