//! Dell PowerEdge 2900, 2950, R610 and R710.
//!
//! All four models report the same product ID.

use super::{OemContext, OemRender, OemRule, Vendor};
use crate::storage::{
    sdr::{
        event_extension::{power_supply_error_type, POWER_SUPPLY_CONFIGURATION_ERROR},
        EventData, EventDataFlag, SensorType,
    },
    sel::SystemEventRecord,
};

pub const MANUFACTURER_ID: u32 = 674;
pub const PRODUCT_ID_POWEREDGE: u16 = 0x0100;

const SENSOR_TYPE_LINK_TUNING: u8 = 0xC1;
const SENSOR_TYPE_NON_FATAL_ERROR: u8 = 0xC2;
const SENSOR_TYPE_FATAL_IO_ERROR: u8 = 0xC3;

const EVENT_TYPE_OEM_DIAGNOSTIC: u8 = 0x7E;

const LINK_TUNING_OPTION_ROM_FAILED: u8 = 0x02;
const NON_FATAL_ERROR_PCIE: u8 = 0x00;
const FATAL_IO_ERROR: u8 = 0x00;

const SENSOR_NUMBER_PCI_PARITY_ERROR: u8 = 0x04;

const SENSOR_SPECIFIC: u8 = 0x6F;
const TRANSITION_SEVERITY: u8 = 0x07;
const REDUNDANCY: u8 = 0x0B;

const POWER_SUPPLY_RATING_MISMATCH: u8 = 0x03;

fn is_poweredge(ctx: &OemContext) -> bool {
    ctx.manufacturer_id == MANUFACTURER_ID && ctx.product_id == PRODUCT_ID_POWEREDGE
}

fn oem_codes(data: &EventData) -> bool {
    data.flags() == (EventDataFlag::OemCode, EventDataFlag::OemCode)
}

fn sensor_type(event: &SystemEventRecord) -> SensorType {
    SensorType::from(event.sensor_type)
}

fn link_tuning_diagnostic(ctx: &OemContext, event: &SystemEventRecord, _: &EventData) -> bool {
    is_poweredge(ctx)
        && event.sensor_type == SENSOR_TYPE_LINK_TUNING
        && event.event_reading_type_code == EVENT_TYPE_OEM_DIAGNOSTIC
}

/// Link tuning diagnostics set no event data flags, but both bytes are valid.
pub(super) const LINK_TUNING_DIAGNOSTIC: OemRule = OemRule {
    vendor: Vendor::Dell,
    description: "link tuning diagnostic data",
    guard: link_tuning_diagnostic,
    render: OemRender::Separate {
        data2: |value| format!("Diagnostic Data 1 = {value:02X}h"),
        data3: |value| format!("Diagnostic Data 2 = {value:02X}h"),
    },
};

fn memory_location(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    use SensorType::*;

    let offset = data.offset;
    let signature = match (event.event_reading_type_code, sensor_type(event)) {
        (SENSOR_SPECIFIC, Memory) => matches!(offset, 0x00 | 0x01 | 0x0A),
        (SENSOR_SPECIFIC, EventLoggingDisabled) => offset == 0x00,
        (REDUNDANCY, Memory) => offset == 0x01,
        (TRANSITION_SEVERITY, Memory) => matches!(offset, 0x01 | 0x02),
        _ => false,
    };

    is_poweredge(ctx) && signature && ctx.is_ipmi_2_0() && oem_codes(data)
}

/// Event data 2 holds the memory card and the upper DIMM bits, event
/// data 3 the lower eight DIMM bits.
fn dimm_location(event: &SystemEventRecord) -> Option<String> {
    let (data2, data3) = (event.event_data[1], event.event_data[2]);
    let dimms = u16::from_le_bytes([data3, data2 & 0x0F]);

    let dimm_list: Vec<String> = (0..12u16)
        .filter(|bit| dimms & (1 << bit) != 0)
        .map(|bit| (bit + 1).to_string())
        .collect();

    if dimm_list.is_empty() {
        return None;
    }

    let card = data2 >> 4;
    let dimms = format!("DIMM {}", dimm_list.join(", "));

    if card == 0x0F || card == 0 {
        Some(dimms)
    } else {
        let card = char::from(b'A' + card - 1);
        Some(format!("Memory Card {card}, {dimms}"))
    }
}

pub(super) const MEMORY_LOCATION: OemRule = OemRule {
    vendor: Vendor::Dell,
    description: "memory card and DIMM location",
    guard: memory_location,
    render: OemRender::Combined(dimm_location),
};

fn pci_location(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    let offset = data.offset;
    let signature = event.event_reading_type_code == SENSOR_SPECIFIC
        && match (sensor_type(event), event.sensor_type) {
            (SensorType::CriticalInterrupt, _) => {
                (offset == 0x04 && event.sensor_number == SENSOR_NUMBER_PCI_PARITY_ERROR)
                    || offset == 0x05
                    || offset == 0x0A
            }
            (_, SENSOR_TYPE_NON_FATAL_ERROR) => offset == NON_FATAL_ERROR_PCIE,
            (_, SENSOR_TYPE_FATAL_IO_ERROR) => offset == FATAL_IO_ERROR,
            _ => false,
        };

    is_poweredge(ctx) && signature && oem_codes(data)
}

/// Event data 2 is the bus, event data 3 the device (bits [7:3]) and
/// function (bits [2:0]).
fn bus_device_function(event: &SystemEventRecord) -> Option<String> {
    let (data2, data3) = (event.event_data[1], event.event_data[2]);

    Some(format!(
        "Bus {:02X}h, Device {:02X}h, Function {:X}h",
        data2,
        data3 >> 3,
        data3 & 0x07
    ))
}

pub(super) const PCI_LOCATION: OemRule = OemRule {
    vendor: Vendor::Dell,
    description: "PCI bus, device and function",
    guard: pci_location,
    render: OemRender::Combined(bus_device_function),
};

fn hardware_incompatibility(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    is_poweredge(ctx)
        && event.event_reading_type_code == SENSOR_SPECIFIC
        && sensor_type(event) == SensorType::VersionChange
        && data.offset == 0x02
        && oem_codes(data)
}

fn incompatible_component(event: &SystemEventRecord) -> Option<String> {
    Some(format!(
        "Component ID = {:02X}h, Slot = {}",
        event.event_data[1], event.event_data[2]
    ))
}

pub(super) const HARDWARE_INCOMPATIBILITY: OemRule = OemRule {
    vendor: Vendor::Dell,
    description: "incompatible hardware component",
    guard: hardware_incompatibility,
    render: OemRender::Combined(incompatible_component),
};

fn option_rom_link_tuning(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    is_poweredge(ctx)
        && event.event_reading_type_code == SENSOR_SPECIFIC
        && event.sensor_type == SENSOR_TYPE_LINK_TUNING
        && data.offset == LINK_TUNING_OPTION_ROM_FAILED
        && oem_codes(data)
}

/// Event data 2 is the slot, with bit 7 set for mezzanine slots. Event data 3
/// holds device and function like [`bus_device_function`].
fn slot_device_function(event: &SystemEventRecord) -> Option<String> {
    let (data2, data3) = (event.event_data[1], event.event_data[2]);

    let slot = if data2 & 0x80 != 0 {
        format!("Mezzanine {}", data2 & 0x7F)
    } else {
        format!("Slot {}", data2)
    };

    Some(format!(
        "{slot}, Device {:02X}h, Function {:X}h",
        data3 >> 3,
        data3 & 0x07
    ))
}

pub(super) const OPTION_ROM_LINK_TUNING: OemRule = OemRule {
    vendor: Vendor::Dell,
    description: "option ROM failed to support link tuning",
    guard: option_rom_link_tuning,
    render: OemRender::Combined(slot_device_function),
};

fn firmware_incompatibility(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    is_poweredge(ctx)
        && event.event_reading_type_code == SENSOR_SPECIFIC
        && sensor_type(event) == SensorType::VersionChange
        && data.offset == 0x03
        && ctx.is_ipmi_2_0()
        && oem_codes(data)
}

fn firmware_version(event: &SystemEventRecord) -> Option<String> {
    Some(format!(
        "Firmware Version {}.{:02}",
        event.event_data[1], event.event_data[2]
    ))
}

pub(super) const FIRMWARE_INCOMPATIBILITY: OemRule = OemRule {
    vendor: Vendor::Dell,
    description: "incompatible firmware version",
    guard: firmware_incompatibility,
    render: OemRender::Combined(firmware_version),
};

fn power_supply_rating(ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
    is_poweredge(ctx)
        && event.event_reading_type_code == SENSOR_SPECIFIC
        && sensor_type(event) == SensorType::PowerSupply
        && data.offset == POWER_SUPPLY_CONFIGURATION_ERROR
        && oem_codes(data)
        && power_supply_error_type(event.event_data[2]) == POWER_SUPPLY_RATING_MISMATCH
}

/// The rated output in watts, event data 2 holding the low and event data 3
/// bits [7:4] the high bits.
fn power_supply_watts(event: &SystemEventRecord) -> Option<String> {
    let (data2, data3) = (event.event_data[1], event.event_data[2]);
    let watts = u16::from_le_bytes([data2, data3 >> 4]);

    Some(format!("Power Supply rating mismatch, Rating = {watts} W"))
}

pub(super) const POWER_SUPPLY_RATING: OemRule = OemRule {
    vendor: Vendor::Dell,
    description: "power supply rating mismatch",
    guard: power_supply_rating,
    render: OemRender::Combined(power_supply_watts),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oem::{combined_text, data2_text, data3_text, oem_override, tests::system_event};

    fn poweredge() -> OemContext {
        OemContext::new(MANUFACTURER_ID, PRODUCT_ID_POWEREDGE)
    }

    #[test]
    fn link_tuning_uses_separate_fields() {
        let record = system_event(0x20, 0xC1, 0x70, 0x7E, [0x00, 0x12, 0x34]);

        assert_eq!(oem_override(&poweredge(), &record), Some("%f ; %h"));
        assert_eq!(
            data2_text(&poweredge(), &record).as_deref(),
            Some("Diagnostic Data 1 = 12h")
        );
        assert_eq!(
            data3_text(&poweredge(), &record).as_deref(),
            Some("Diagnostic Data 2 = 34h")
        );
        assert_eq!(combined_text(&poweredge(), &record), None);
    }

    #[test]
    fn dimm_location() {
        // Correctable ECC, card B, DIMMs 1 and 3
        let record = system_event(0x20, 0x0C, 0x60, 0x6F, [0xA0, 0x20, 0x05]);
        assert_eq!(
            combined_text(&poweredge(), &record).as_deref(),
            Some("Memory Card B, DIMM 1, 3")
        );

        // No card, DIMM 9
        let record = system_event(0x20, 0x0C, 0x60, 0x6F, [0xA1, 0xF1, 0x00]);
        assert_eq!(combined_text(&poweredge(), &record).as_deref(), Some("DIMM 9"));

        // Requires IPMI 2.0
        let ctx = poweredge().with_ipmi_version(1, 5);
        assert_eq!(oem_override(&ctx, &record), None);
    }

    #[test]
    fn pci_location() {
        let record = system_event(0x20, 0x13, 0x04, 0x6F, [0xA4, 0x03, 0x11]);
        assert_eq!(
            combined_text(&poweredge(), &record).as_deref(),
            Some("Bus 03h, Device 02h, Function 1h")
        );

        // PCI PERR is only decoded for the parity error sensor
        let record = system_event(0x20, 0x13, 0x05, 0x6F, [0xA4, 0x03, 0x11]);
        assert_eq!(oem_override(&poweredge(), &record), None);

        let record = system_event(0x20, 0xC2, 0x05, 0x6F, [0xA0, 0x03, 0x11]);
        assert_eq!(oem_override(&poweredge(), &record), Some("%c"));
    }

    #[test]
    fn option_rom_slot() {
        let record = system_event(0x20, 0xC1, 0x70, 0x6F, [0xA2, 0x81, 0x08]);
        assert_eq!(
            combined_text(&poweredge(), &record).as_deref(),
            Some("Mezzanine 1, Device 01h, Function 0h")
        );
    }

    #[test]
    fn version_change() {
        let record = system_event(0x20, 0x2B, 0x70, 0x6F, [0xA2, 0x1C, 0x02]);
        assert_eq!(
            combined_text(&poweredge(), &record).as_deref(),
            Some("Component ID = 1Ch, Slot = 2")
        );

        let record = system_event(0x20, 0x2B, 0x70, 0x6F, [0xA3, 0x01, 0x05]);
        assert_eq!(
            combined_text(&poweredge(), &record).as_deref(),
            Some("Firmware Version 1.05")
        );
    }

    #[test]
    fn power_supply_rating_mismatch() {
        let record = system_event(0x20, 0x08, 0x50, 0x6F, [0xA6, 0x84, 0x33]);
        assert_eq!(
            combined_text(&poweredge(), &record).as_deref(),
            Some("Power Supply rating mismatch, Rating = 900 W")
        );

        // Other configuration errors use the generic layout
        let record = system_event(0x20, 0x08, 0x50, 0x6F, [0xA6, 0x84, 0x31]);
        assert_eq!(oem_override(&poweredge(), &record), None);
    }
}
