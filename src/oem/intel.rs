//! Intel Windmill (Open Compute) boards.
//!
//! The management engine events are Intel Node Manager events, reported
//! without a Node Manager present.

use super::{OemContext, OemRender, OemRule, Vendor};
use crate::{
    app::IanaManufacturer,
    storage::{
        sdr::{EventData, EventDataFlag, SensorType},
        sel::SystemEventRecord,
    },
};

pub const PRODUCT_ID_WINDMILL: u16 = 0xB000;

const SENSOR_TYPE_ME_FIRMWARE_HEALTH: u8 = 0xDC;
const EVENT_TYPE_ME_FIRMWARE_HEALTH: u8 = 0x75;
const FIRMWARE_STATUS: u8 = 0x00;

const SENSOR_SPECIFIC: u8 = 0x6F;

const MEMORY_CORRECTABLE_ECC: u8 = 0x00;
const MEMORY_UNCORRECTABLE_ECC: u8 = 0x01;
const MEMORY_THROTTLED: u8 = 0x0A;

fn is_windmill(ctx: &OemContext) -> bool {
    ctx.manufacturer_id == IanaManufacturer::Intel.id() && ctx.product_id == PRODUCT_ID_WINDMILL
}

fn oem_codes(data: &EventData) -> bool {
    data.flags() == (EventDataFlag::OemCode, EventDataFlag::OemCode)
}

fn sensor_specific(event: &SystemEventRecord, sensor_type: SensorType) -> bool {
    event.event_reading_type_code == SENSOR_SPECIFIC && SensorType::from(event.sensor_type) == sensor_type
}

fn me_firmware_health(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    is_windmill(ctx)
        && event.sensor_type == SENSOR_TYPE_ME_FIRMWARE_HEALTH
        && event.event_reading_type_code == EVENT_TYPE_ME_FIRMWARE_HEALTH
        && data.offset == FIRMWARE_STATUS
        && oem_codes(data)
}

fn health_event(value: u8) -> String {
    let text = match value {
        0x00 => "Recovery GPIO forced",
        0x01 => "Image execution failed",
        0x02 => "Flash erase error",
        0x03 => "Flash state information",
        0x04 => "Internal error",
        0x05 => "BMC did not respond to cold reset",
        0x06 => "Direct flash update requested by the BIOS",
        0x07 => "Manufacturing error",
        0x08 => "Persistent storage integrity error",
        _ => return format!("Health Event Type = {value:02X}h"),
    };

    text.into()
}

/// Event data 2 is the health event, event data 3 extra error detail.
pub(super) const ME_FIRMWARE_HEALTH: OemRule = OemRule {
    vendor: Vendor::Intel,
    description: "ME firmware health event",
    guard: me_firmware_health,
    render: OemRender::Separate {
        data2: health_event,
        data3: |value| format!("Extended Error Info = {value:02X}h"),
    },
};

/// CPU, channel and DIMM packed as bits [7:5], [4:3] and [2:0].
fn dimm_location(value: u8) -> String {
    format!(
        "CPU = {}, Channel = {}, DIMM = {}",
        value >> 5,
        (value >> 3) & 0x03,
        value & 0x07
    )
}

fn memory_throttling(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    is_windmill(ctx)
        && sensor_specific(event, SensorType::Memory)
        && data.offset == MEMORY_THROTTLED
        && oem_codes(data)
}

fn throttling_type(value: u8) -> String {
    match value & 0x03 {
        0 => "Native Throttling".into(),
        1 => "External Throttling".into(),
        other => format!("Throttling Type = {other}"),
    }
}

pub(super) const MEMORY_THROTTLING: OemRule = OemRule {
    vendor: Vendor::Intel,
    description: "memory throttling",
    guard: memory_throttling,
    render: OemRender::Separate {
        data2: throttling_type,
        data3: dimm_location,
    },
};

fn memory_error(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    is_windmill(ctx)
        && sensor_specific(event, SensorType::Memory)
        && matches!(data.offset, MEMORY_CORRECTABLE_ECC | MEMORY_UNCORRECTABLE_ECC)
        && oem_codes(data)
}

pub(super) const MEMORY_ERROR_LOCATION: OemRule = OemRule {
    vendor: Vendor::Intel,
    description: "memory ECC error location",
    guard: memory_error,
    render: OemRender::Separate {
        data2: |value| format!("Logical Rank = {}", value & 0x03),
        data3: dimm_location,
    },
};

fn pci_error(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    // PCI PERR, PCI SERR and the three bus error severities
    is_windmill(ctx)
        && sensor_specific(event, SensorType::CriticalInterrupt)
        && matches!(data.offset, 0x04 | 0x05 | 0x07 | 0x08 | 0x0A)
        && oem_codes(data)
}

fn error_source(value: u8) -> String {
    let source = match value & 0x07 {
        0 => "IRP0".to_string(),
        1 => "IRP1".to_string(),
        2 => "IIO-Core".to_string(),
        3 => "VT-d".to_string(),
        other => format!("Unknown ({other})"),
    };

    format!("CPU = {}, Source = {source}", value >> 5)
}

pub(super) const PCI_ERROR_LOCATION: OemRule = OemRule {
    vendor: Vendor::Intel,
    description: "PCI error device and source",
    guard: pci_error,
    render: OemRender::Separate {
        data2: |value| format!("Device = {}, Function = {}", value >> 3, value & 0x07),
        data3: error_source,
    },
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        format::{format, FormatContext, FormatFlags, FormatOptions},
        oem::{combined_text, data2_text, data3_text, matching_rule, oem_override, tests::system_event},
    };

    fn windmill() -> OemContext {
        OemContext::new(IanaManufacturer::Intel.id(), PRODUCT_ID_WINDMILL)
    }

    #[test]
    fn me_firmware_health() {
        let record = system_event(0x2C, 0xDC, 0x17, 0x75, [0xA0, 0x02, 0x1F]);

        assert_eq!(oem_override(&windmill(), &record), Some("%f ; %h"));
        assert_eq!(data2_text(&windmill(), &record).as_deref(), Some("Flash erase error"));
        assert_eq!(
            data3_text(&windmill(), &record).as_deref(),
            Some("Extended Error Info = 1Fh")
        );
        assert_eq!(combined_text(&windmill(), &record), None);

        // 09h is only defined by newer Node Manager firmware
        let record = system_event(0x2C, 0xDC, 0x17, 0x75, [0xA0, 0x09, 0x00]);
        assert_eq!(
            data2_text(&windmill(), &record).as_deref(),
            Some("Health Event Type = 09h")
        );

        // Other boards from the same vendor
        let ctx = OemContext::new(IanaManufacturer::Intel.id(), 0x0051);
        assert_eq!(oem_override(&ctx, &record), None);
    }

    #[test]
    fn memory_throttling() {
        let record = system_event(0x20, 0x0C, 0x60, 0x6F, [0xAA, 0x01, 0x5A]);

        assert_eq!(
            data2_text(&windmill(), &record).as_deref(),
            Some("External Throttling")
        );
        assert_eq!(
            data3_text(&windmill(), &record).as_deref(),
            Some("CPU = 2, Channel = 3, DIMM = 2")
        );
    }

    #[test]
    fn memory_error_location() {
        let record = system_event(0x20, 0x0C, 0x60, 0x6F, [0xA0, 0x02, 0x21]);

        assert_eq!(
            matching_rule(&windmill(), &record).map(|r| r.description),
            Some("memory ECC error location")
        );
        assert_eq!(data2_text(&windmill(), &record).as_deref(), Some("Logical Rank = 2"));
        assert_eq!(
            data3_text(&windmill(), &record).as_deref(),
            Some("CPU = 1, Channel = 0, DIMM = 1")
        );

        // Without OEM codes in both bytes the generic layout applies
        let record = system_event(0x20, 0x0C, 0x60, 0x6F, [0x80, 0x02, 0x21]);
        assert_eq!(oem_override(&windmill(), &record), None);
    }

    #[test]
    fn pci_error_location() {
        let record = system_event(0x20, 0x13, 0x04, 0x6F, [0xA5, 0x1B, 0x42]);

        assert_eq!(
            data2_text(&windmill(), &record).as_deref(),
            Some("Device = 3, Function = 3")
        );
        assert_eq!(
            data3_text(&windmill(), &record).as_deref(),
            Some("CPU = 2, Source = IIO-Core")
        );

        // Front panel NMI
        let record = system_event(0x20, 0x13, 0x04, 0x6F, [0xA0, 0x1B, 0x42]);
        assert_eq!(oem_override(&windmill(), &record), None);
    }

    #[test]
    fn event_detail_uses_both_fields() {
        let record = system_event(0x20, 0x0C, 0x60, 0x6F, [0xA0, 0x02, 0x21]);
        let options = FormatOptions::new(
            FormatFlags::IGNORE_UNAVAILABLE
                | FormatFlags::OUTPUT_NOT_AVAILABLE
                | FormatFlags::INTERPRET_OEM_DATA,
        );
        let ctx = windmill();
        let format_ctx = FormatContext::new(&record, &options).with_oem(Some(&ctx));

        assert_eq!(
            format(&format_ctx, "%E", 256).unwrap().text,
            "Logical Rank = 2 ; CPU = 1, Channel = 0, DIMM = 1"
        );
    }
}
