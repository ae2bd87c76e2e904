//! Sensor-specific event extension codes carried in event data 2 and 3.
//!
//! Reference: IPMI 2.0 Specification, Table 42-3 "Sensor Type Codes", the
//! "Event Data 2" and "Event Data 3" notes of each sensor type.

use super::SensorType;

const FIRMWARE_ERROR: &[&str] = &[
    "Unspecified",
    "No system memory is physically installed in the system",
    "No usable system memory, all installed memory has experienced an unrecoverable failure",
    "Unrecoverable hard-disk/ATAPI/IDE device failure",
    "Unrecoverable system-board failure",
    "Unrecoverable diskette subsystem failure",
    "Unrecoverable hard-disk controller failure",
    "Unrecoverable PS/2 or USB keyboard failure",
    "Removable boot media not found",
    "Unrecoverable video controller failure",
    "No video device detected",
    "Firmware (BIOS) ROM corruption detected",
    "CPU voltage mismatch",
    "CPU speed matching failure",
];

const FIRMWARE_PROGRESS: &[&str] = &[
    "Unspecified",
    "Memory initialization",
    "Hard-disk initialization",
    "Secondary processor(s) initialization",
    "User authentication",
    "User-initiated system setup",
    "USB resource configuration",
    "PCI resource configuration",
    "Option ROM initialization",
    "Video initialization",
    "Cache initialization",
    "SM Bus initialization",
    "Keyboard controller initialization",
    "Embedded controller/management controller initialization",
    "Docking station attachment",
    "Enabling docking station",
    "Docking station ejection",
    "Disabling docking station",
    "Calling operating system wake-up vector",
    "Starting operating system boot process",
    "Baseboard or motherboard initialization",
    "",
    "Floppy initialization",
    "Keyboard test",
    "Pointing device test",
    "Primary processor initialization",
];

const VERSION_CHANGE_TYPE: &[&str] = &[
    "Unspecified",
    "Management controller device ID",
    "Management controller firmware revision",
    "Management controller device revision",
    "Management controller manufacturer ID",
    "Management controller IPMI version",
    "Management controller auxiliary firmware ID",
    "Management controller firmware boot block",
    "Other management controller firmware",
    "System firmware (EFI/BIOS) change",
    "SMBIOS change",
    "Operating system change",
    "Operating system loader change",
    "Service or diagnostic partition change",
    "Management software agent change",
    "Management software application change",
    "Management software middleware change",
    "Programmable hardware change",
    "Board/FRU module change",
    "Board/FRU component change",
    "Board/FRU replaced with equivalent version",
    "Board/FRU replaced with newer version",
    "Board/FRU replaced with older version",
    "Board/FRU hardware configuration change",
];

const FRU_STATE_CAUSE: &[&str] = &[
    "Normal State Change",
    "Change Commanded by software external to FRU",
    "State Change due to operator changing a Handle latch",
    "State Change due to operator pressing the hotswap push button",
    "State Change due to FRU programmatic action",
    "Communication Lost",
    "Communication Lost due to local failure",
    "State Change due to unexpected extraction",
    "State Change due to operator intervention/update",
    "Unable to compute IPMB address",
    "Unexpected Deactivation",
];

const POWER_SUPPLY_CONFIG_ERROR: &[&str] = &[
    "Vendor mismatch",
    "Revision mismatch",
    "Processor missing",
    "Power Supply rating mismatch",
    "Voltage rating mismatch",
];

fn lookup(table: &'static [&'static str], index: u8) -> Option<&'static str> {
    table
        .get(usize::from(index))
        .copied()
        .filter(|msg| !msg.is_empty())
}

/// Power Supply "Configuration error" offset.
pub const POWER_SUPPLY_CONFIGURATION_ERROR: u8 = 0x06;

/// The error type held in event data 3 of a Power Supply configuration error.
pub fn power_supply_error_type(data3: u8) -> u8 {
    data3 & 0x0F
}

/// Text for a sensor-specific extension code in event data 2.
pub fn data2_message(sensor_type: u8, offset: u8, data2: u8) -> Option<String> {
    use SensorType::*;

    let offset = offset & 0x0F;

    match (SensorType::from(sensor_type), offset) {
        (ChassisIntrusion, 0x04) => Some(format!("Network controller #{data2}")),
        (SystemFirmwareProgress, 0x00) => lookup(FIRMWARE_ERROR, data2).map(Into::into),
        (SystemFirmwareProgress, 0x01 | 0x02) => lookup(FIRMWARE_PROGRESS, data2).map(Into::into),
        (EventLoggingDisabled, 0x00) => Some(format!("Memory Module/Device ID = {data2}")),
        (EventLoggingDisabled, 0x01) => Some(format!("Event/Reading Type Code = {data2:02X}h")),
        (EventLoggingDisabled, 0x06) => Some(format!("Processor Number = {data2}")),
        (SystemEvent, 0x03) => {
            let action = match data2 >> 4 {
                0x0 => "Log entry action = Entry added",
                0x1 => "Log entry action = Entry added because event did not map to standard IPMI event",
                0x2 => "Log entry action = Entry added along with one or more corresponding SEL entries",
                0x3 => "Log entry action = Log cleared",
                0x4 => "Log entry action = Log disabled",
                0x5 => "Log entry action = Log enabled",
                _ => return None,
            };
            let log_type = match data2 & 0x0F {
                0x0 => "MCA Log",
                0x1 => "OEM 1",
                0x2 => "OEM 2",
                _ => return None,
            };
            Some(format!("{action}, Log Type = {log_type}"))
        }
        (SystemEvent, 0x04) => {
            let actions: Vec<&str> = [
                (0x20, "Diagnostic Interrupt (NMI)"),
                (0x10, "OEM Action"),
                (0x08, "Power Cycle"),
                (0x04, "Reset"),
                (0x02, "Power Off"),
                (0x01, "Alert"),
            ]
            .iter()
            .filter(|(bit, _)| data2 & bit != 0)
            .map(|(_, name)| *name)
            .collect();

            if actions.is_empty() {
                None
            } else {
                Some(format!("PEF Action = {}", actions.join(", ")))
            }
        }
        (SystemEvent, 0x05) => {
            let pair = if data2 & 0x80 == 0 {
                "first of pair"
            } else {
                "second of pair"
            };
            let clock = match data2 & 0x0F {
                0x0 => "SEL Timestamp Clock updated",
                0x1 => "SDR Timestamp Clock updated",
                _ => return None,
            };
            Some(format!("{clock}, {pair}"))
        }
        (Watchdog2, _) => {
            let interrupt = match data2 >> 4 {
                0x0 => "none",
                0x1 => "SMI",
                0x2 => "NMI",
                0x3 => "Messaging Interrupt",
                0xF => "unspecified",
                _ => return None,
            };
            let timer = match data2 & 0x0F {
                0x1 => "BIOS FRB2",
                0x2 => "BIOS/POST",
                0x3 => "OS Load",
                0x4 => "SMS/OS",
                0x5 => "OEM",
                0xF => "unspecified",
                _ => return None,
            };
            Some(format!("Interrupt type = {interrupt}, Timer use at expiration = {timer}"))
        }
        (ManagementSubSysHealth, 0x04) => Some(format!("Sensor Number = {data2}")),
        (SessionAudit, _) => {
            let user = data2 & 0x3F;
            if user == 0 {
                Some("User ID = unspecified".into())
            } else {
                Some(format!("User ID = {user}"))
            }
        }
        (VersionChange, _) => {
            lookup(VERSION_CHANGE_TYPE, data2).map(|t| format!("Version change type = {t}"))
        }
        (FRUState, _) => {
            let cause = match data2 >> 4 {
                0xF => "State Change, Cause Unknown",
                c => lookup(FRU_STATE_CAUSE, c)?,
            };
            let previous = super::event_offset::sensor_specific_message(sensor_type, data2 & 0x0F)?;
            Some(format!("Cause of state change = {cause}, Previous state = {previous}"))
        }
        (SlotOrConnector, _) => {
            let slot_type = match data2 & 0x7F {
                0x00 => "PCI",
                0x01 => "Drive Array",
                0x02 => "External Peripheral Connector",
                0x03 => "Docking",
                0x04 => "other standard internal expansion slot",
                0x05 => "slot associated with entity specified by Entity ID for sensor",
                0x06 => "AdvancedTCA",
                0x07 => "DIMM/memory device",
                0x08 => "FAN",
                0x09 => "PCI Express",
                0x0A => "SCSI (parallel)",
                0x0B => "SATA/SAS",
                _ => return None,
            };
            Some(format!("Slot/Connector Type = {slot_type}"))
        }
        _ => None,
    }
}

/// Text for a sensor-specific extension code in event data 3.
///
/// Some event data 3 encodings depend on event data 2, which is passed along.
pub fn data3_message(sensor_type: u8, offset: u8, data2: u8, data3: u8) -> Option<String> {
    use SensorType::*;

    let offset = offset & 0x0F;

    match (SensorType::from(sensor_type), offset) {
        (PowerSupply, POWER_SUPPLY_CONFIGURATION_ERROR) => {
            lookup(POWER_SUPPLY_CONFIG_ERROR, power_supply_error_type(data3))
                .map(|e| format!("Error type = {e}"))
        }
        (Memory, _) => Some(format!("Memory Module/Device ID = {data3}")),
        (EventLoggingDisabled, 0x01) => {
            let direction = if data3 & 0x10 == 0 {
                "Assertion Event"
            } else {
                "Deassertion Event"
            };
            if data3 & 0x20 != 0 {
                Some(format!("Logging disabled for all events of given type, {direction}"))
            } else {
                Some(format!("Event Offset = {:02X}h, {direction}", data3 & 0x0F))
            }
        }
        (EventLoggingDisabled, 0x05) => Some(format!("SEL is {data3}% full")),
        (EventLoggingDisabled, 0x06) => Some(correctable_mce_logging_disabled(data2, data3)),
        (SessionAudit, 0x01) => {
            let cause = match (data3 >> 4) & 0x3 {
                0b00 => "unspecified",
                0b01 => "Close Session command",
                0b10 => "timeout",
                _ => "configuration change",
            };
            Some(format!(
                "Channel number = {}, Deactivation cause = {cause}",
                data3 & 0x0F
            ))
        }
        (SessionAudit, _) => Some(format!("Channel number = {}", data3 & 0x0F)),
        (SlotOrConnector, _) => Some(format!("Slot/Connector Number = {data3}")),
        _ => None,
    }
}

/// The combined text for a Correctable Machine Check Error Logging Disabled event:
/// event data 2 holds a processor number whose kind is given by bit 7 of event data 3.
pub fn correctable_mce_logging_disabled(data2: u8, data3: u8) -> String {
    if data3 & 0x80 == 0 {
        format!("Entity Instance Number = {data2}")
    } else {
        format!("Vendor Specific Processor Number = {data2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firmware_progress() {
        assert_eq!(
            data2_message(0x0F, 0x02, 0x09).as_deref(),
            Some("Video initialization")
        );
        assert_eq!(
            data2_message(0x0F, 0x00, 0x01).as_deref(),
            Some("No system memory is physically installed in the system")
        );
        assert_eq!(data2_message(0x0F, 0x02, 0x15), None);
        assert_eq!(data2_message(0x0F, 0x02, 0x80), None);
    }

    #[test]
    fn system_event_extensions() {
        assert_eq!(
            data2_message(0x12, 0x04, 0x06).as_deref(),
            Some("PEF Action = Reset, Power Off")
        );
        assert_eq!(
            data2_message(0x12, 0x05, 0x81).as_deref(),
            Some("SDR Timestamp Clock updated, second of pair")
        );
    }

    #[test]
    fn memory_and_power_supply() {
        assert_eq!(
            data3_message(0x0C, 0x01, 0x00, 0x03).as_deref(),
            Some("Memory Module/Device ID = 3")
        );
        assert_eq!(
            data3_message(0x08, 0x06, 0x00, 0x03).as_deref(),
            Some("Error type = Power Supply rating mismatch")
        );
        assert_eq!(data3_message(0x08, 0x06, 0x00, 0x0A), None);
    }

    #[test]
    fn processor_number_kind() {
        assert_eq!(correctable_mce_logging_disabled(2, 0x00), "Entity Instance Number = 2");
        assert_eq!(
            correctable_mce_logging_disabled(5, 0x80),
            "Vendor Specific Processor Number = 5"
        );
    }
}
