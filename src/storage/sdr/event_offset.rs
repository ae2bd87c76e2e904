//! Event offset messages.
//!
//! Reference: IPMI 2.0 Specification, Table 42-2 "Generic Event/Reading Type Codes"
//! and Table 42-3 "Sensor Type Codes"

use super::{classify, SensorClass, SensorType};

const THRESHOLD: &[&str] = &[
    "Lower Non-critical - going low",
    "Lower Non-critical - going high",
    "Lower Critical - going low",
    "Lower Critical - going high",
    "Lower Non-recoverable - going low",
    "Lower Non-recoverable - going high",
    "Upper Non-critical - going low",
    "Upper Non-critical - going high",
    "Upper Critical - going low",
    "Upper Critical - going high",
    "Upper Non-recoverable - going low",
    "Upper Non-recoverable - going high",
];

const SEVERITY: &[&str] = &[
    "transition to OK",
    "transition to Non-Critical from OK",
    "transition to Critical from less severe",
    "transition to Non-recoverable from less severe",
    "transition to Non-Critical from more severe",
    "transition to Critical from Non-recoverable",
    "transition to Non-recoverable",
    "Monitor",
    "Informational",
];

fn generic_table(event_reading_type_code: u8) -> &'static [&'static str] {
    match event_reading_type_code {
        0x01 => THRESHOLD,
        0x02 => &["Transition to Idle", "Transition to Active", "Transition to Busy"],
        0x03 => &["State Deasserted", "State Asserted"],
        0x04 => &["Predictive Failure deasserted", "Predictive Failure asserted"],
        0x05 => &["Limit Not Exceeded", "Limit Exceeded"],
        0x06 => &["Performance Met", "Performance Lags"],
        0x07 => SEVERITY,
        0x08 => &["Device Removed/Device Absent", "Device Inserted/Device Present"],
        0x09 => &["Device Disabled", "Device Enabled"],
        0x0A => &[
            "transition to Running",
            "transition to In Test",
            "transition to Power Off",
            "transition to On Line",
            "transition to Off Line",
            "transition to Off Duty",
            "transition to Degraded",
            "transition to Power Save",
            "Install Error",
        ],
        0x0B => &[
            "Fully Redundant",
            "Redundancy Lost",
            "Redundancy Degraded",
            "Non-redundant:Sufficient Resources from Redundant",
            "Non-redundant:Sufficient Resources from Insufficient Resources",
            "Non-redundant:Insufficient Resources",
            "Redundancy Degraded from Fully Redundant",
            "Redundancy Degraded from Non-redundant",
        ],
        0x0C => &[
            "D0 Power State",
            "D1 Power State",
            "D2 Power State",
            "D3 Power State",
        ],
        _ => &[],
    }
}

/// Empty strings mark offsets that are reserved for the sensor type.
fn sensor_specific_table(sensor_type: SensorType) -> &'static [&'static str] {
    use SensorType::*;

    match sensor_type {
        ChassisIntrusion => &[
            "General Chassis Intrusion",
            "Drive Bay intrusion",
            "I/O Card area intrusion",
            "Processor area intrusion",
            "LAN Leash Lost",
            "Unauthorized dock/undock",
            "FAN area intrusion",
        ],
        PlatformSecurityViolationAttempt => &[
            "Secure Mode Violation attempt",
            "Pre-boot Password Violation - user password",
            "Pre-boot Password Violation attempt - setup password",
            "Pre-boot Password Violation - network boot password",
            "Other pre-boot Password Violation",
            "Out-of-band Access Password Violation",
        ],
        Processor => &[
            "IERR",
            "Thermal Trip",
            "FRB1/BIST failure",
            "FRB2/Hang in POST failure",
            "FRB3/Processor Startup/Initialization failure",
            "Configuration Error",
            "SM BIOS 'Uncorrectable CPU-complex Error'",
            "Processor Presence detected",
            "Processor disabled",
            "Terminator Presence Detected",
            "Processor Automatically Throttled",
            "Machine Check Exception (Uncorrectable)",
            "Correctable Machine Check Error",
        ],
        PowerSupply => &[
            "Presence detected",
            "Power Supply Failure detected",
            "Predictive Failure",
            "Power Supply input lost (AC/DC)",
            "Power Supply input lost or out-of-range",
            "Power Supply input out-of-range, but present",
            "Configuration error",
            "Power Supply Inactive",
        ],
        PowerUnit => &[
            "Power Off/Power Down",
            "Power Cycle",
            "240VA Power Down",
            "Interlock Power Down",
            "AC lost/Power input lost",
            "Soft Power Control Failure",
            "Power Unit Failure detected",
            "Predictive Failure",
        ],
        Memory => &[
            "Correctable ECC/other correctable memory error",
            "Uncorrectable ECC/other uncorrectable memory error",
            "Parity",
            "Memory Scrub Failed",
            "Memory Device Disabled",
            "Correctable ECC/other correctable memory error logging limit reached",
            "Presence detected",
            "Configuration error",
            "Spare",
            "Memory Automatically Throttled",
            "Critical Overtemperature",
        ],
        DriveSlotBay => &[
            "Drive Presence",
            "Drive Fault",
            "Predictive Failure",
            "Hot Spare",
            "Consistency Check/Parity Check in progress",
            "In Critical Array",
            "In Failed Array",
            "Rebuild/Remap in progress",
            "Rebuild/Remap Aborted",
        ],
        SystemFirmwareProgress => &[
            "System Firmware Error",
            "System Firmware Hang",
            "System Firmware Progress",
        ],
        EventLoggingDisabled => &[
            "Correctable Memory Error Logging Disabled",
            "Event 'Type' Logging Disabled",
            "Log Area Reset/Cleared",
            "All Event Logging Disabled",
            "SEL Full",
            "SEL Almost Full",
            "Correctable Machine Check Error Logging Disabled",
        ],
        Watchdog1 => &[
            "BIOS Watchdog Reset",
            "OS Watchdog Reset",
            "OS Watchdog Shut Down",
            "OS Watchdog Power Down",
            "OS Watchdog Power Cycle",
            "OS Watchdog NMI/Diagnostic Interrupt",
            "OS Watchdog Expired, status only",
            "OS Watchdog pre-timeout Interrupt, non-NMI",
        ],
        SystemEvent => &[
            "System Reconfigured",
            "OEM System Boot Event",
            "Undetermined system hardware failure",
            "Entry added to Auxiliary Log",
            "PEF Action",
            "Timestamp Clock Synch",
        ],
        CriticalInterrupt => &[
            "Front Panel NMI/Diagnostic Interrupt",
            "Bus Timeout",
            "I/O channel check NMI",
            "Software NMI",
            "PCI PERR",
            "PCI SERR",
            "EISA Fail Safe Timeout",
            "Bus Correctable Error",
            "Bus Uncorrectable Error",
            "Fatal NMI",
            "Bus Fatal Error",
            "Bus Degraded",
        ],
        ButtonOrSwitch => &[
            "Power Button pressed",
            "Sleep Button pressed",
            "Reset Button pressed",
            "FRU latch open",
            "FRU service request button",
        ],
        ChipSet => &["Soft Power Control Failure", "Thermal Trip"],
        CableOrInterconnect => &[
            "Cable/Interconnect is connected",
            "Configuration Error - Incorrect cable connected/Incorrect interconnection",
        ],
        SystemBootOrRestartInitiated => &[
            "Initiated by power up",
            "Initiated by hard reset",
            "Initiated by warm reset",
            "User requested PXE boot",
            "Automatic boot to diagnostic",
            "OS/run-time software initiated hard reset",
            "OS/run-time software initiated warm reset",
            "System Restart",
        ],
        BootError => &[
            "No bootable media",
            "Non-bootable diskette left in drive",
            "PXE Server not found",
            "Invalid boot sector",
            "Timeout waiting for user selection of boot source",
        ],
        BaseOsBootOrInstallationStatus => &[
            "A: boot completed",
            "C: boot completed",
            "PXE boot completed",
            "Diagnostic boot completed",
            "CD-ROM boot completed",
            "ROM boot completed",
            "boot completed - boot device not specified",
            "Base OS/Hypervisor Installation started",
            "Base OS/Hypervisor Installation completed",
            "Base OS/Hypervisor Installation aborted",
            "Base OS/Hypervisor Installation failed",
        ],
        OsStopOrShutdown => &[
            "Critical stop during OS load/initialization",
            "Run-time Critical Stop",
            "OS Graceful Stop",
            "OS Graceful Shutdown",
            "Soft Shutdown initiated by PEF",
            "Agent Not Responding",
        ],
        SlotOrConnector => &[
            "Fault Status asserted",
            "Identify Status asserted",
            "Slot/Connector Device installed/attached",
            "Slot/Connector Ready for Device Installation",
            "Slot/Connector Ready for Device Removal",
            "Slot Power is Off",
            "Slot/Connector Device Removal Request",
            "Interlock asserted",
            "Slot is Disabled",
            "Slot holds spare device",
        ],
        SystemACPIPowerState => &[
            "S0/G0 'working'",
            "S1 'sleeping with system h/w & processor context maintained'",
            "S2 'sleeping, processor context lost'",
            "S3 'sleeping, processor & h/w context lost, memory retained'",
            "S4 'non-volatile sleep/suspend-to disk'",
            "S5/G2 'soft-off'",
            "S4/S5 soft-off, particular S4/S5 state cannot be determined",
            "G3/Mechanical Off",
            "Sleeping in an S1, S2, or S3 states",
            "G1 sleeping",
            "S5 entered by override",
            "Legacy ON state",
            "Legacy OFF state",
            "",
            "Unknown",
        ],
        Watchdog2 => &[
            "Timer expired, status only",
            "Hard Reset",
            "Power Down",
            "Power Cycle",
            "",
            "",
            "",
            "",
            "Timer interrupt",
        ],
        PlatformAlert => &[
            "platform generated page",
            "platform generated LAN alert",
            "Platform Event Trap generated",
            "platform generated SNMP trap",
        ],
        EntityPresence => &["Entity Present", "Entity Absent", "Entity Disabled"],
        LAN => &["LAN Heartbeat Lost", "LAN Heartbeat"],
        ManagementSubSysHealth => &[
            "sensor access degraded or unavailable",
            "controller access degraded or unavailable",
            "management controller off-line",
            "management controller unavailable",
            "Sensor failure",
            "FRU failure",
        ],
        Battery => &["battery low", "battery failed", "battery presence detected"],
        SessionAudit => &[
            "Session Activated",
            "Session Deactivated",
            "Invalid Username or Password",
            "Invalid password disable",
        ],
        VersionChange => &[
            "Hardware change detected with associated Entity",
            "Firmware or software change detected with associated Entity",
            "Hardware incompatibility detected with associated Entity",
            "Firmware or software incompatibility detected with associated Entity",
            "Entity is of an invalid or unsupported hardware version",
            "Entity contains an invalid or unsupported firmware or software version",
            "Hardware Change detected with associated Entity was successful",
            "Software or F/W Change detected with associated Entity was successful",
        ],
        FRUState => &[
            "FRU Not Installed",
            "FRU Inactive",
            "FRU Activation Requested",
            "FRU Activation In Progress",
            "FRU Active",
            "FRU Deactivation Requested",
            "FRU Deactivation In Progress",
            "FRU Communication Lost",
        ],
        _ => &[],
    }
}

fn lookup(table: &'static [&'static str], offset: u8) -> Option<&'static str> {
    table
        .get(usize::from(offset & 0x0F))
        .copied()
        .filter(|msg| !msg.is_empty())
}

/// The message for an offset of the threshold event/reading type.
pub fn threshold_message(offset: u8) -> Option<&'static str> {
    lookup(THRESHOLD, offset)
}

/// The message for an offset of the generic severity event/reading type (`0x07`).
pub fn severity_message(offset: u8) -> Option<&'static str> {
    lookup(SEVERITY, offset)
}

pub fn generic_message(event_reading_type_code: u8, offset: u8) -> Option<&'static str> {
    lookup(generic_table(event_reading_type_code & 0x7F), offset)
}

pub fn sensor_specific_message(sensor_type: u8, offset: u8) -> Option<&'static str> {
    lookup(sensor_specific_table(SensorType::from(sensor_type)), offset)
}

/// The message describing `offset` for a sensor of `sensor_type` reporting
/// with `event_reading_type_code`.
///
/// OEM event/reading types have no standard messages.
pub fn event_message(event_reading_type_code: u8, sensor_type: u8, offset: u8) -> Option<&'static str> {
    match classify(event_reading_type_code) {
        SensorClass::Threshold | SensorClass::GenericDiscrete => {
            generic_message(event_reading_type_code, offset)
        }
        SensorClass::SensorSpecificDiscrete => sensor_specific_message(sensor_type, offset),
        SensorClass::Oem => None,
    }
}

/// All messages for the bits set in a 15 bit discrete state mask, as
/// returned by Get Sensor Reading.
pub fn state_messages(event_reading_type_code: u8, sensor_type: u8, mask: u16) -> Vec<&'static str> {
    (0..15u8)
        .filter(|bit| mask & (1 << bit) != 0)
        .filter_map(|bit| event_message(event_reading_type_code, sensor_type, bit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_and_threshold() {
        assert_eq!(event_message(0x01, 0x01, 0x09), Some("Upper Critical - going high"));
        assert_eq!(event_message(0x01, 0x01, 0x0C), None);
        assert_eq!(event_message(0x0B, 0x04, 0x01), Some("Redundancy Lost"));
        assert_eq!(severity_message(0x02), Some("transition to Critical from less severe"));
    }

    #[test]
    fn sensor_specific() {
        assert_eq!(event_message(0x6F, 0x12, 0x05), Some("Timestamp Clock Synch"));
        assert_eq!(event_message(0x6F, 0x04, 0x01), None);
        assert_eq!(sensor_specific_message(0x22, 0x00), Some("S0/G0 'working'"));
        assert_eq!(sensor_specific_message(0x22, 0x0D), None);
        assert_eq!(sensor_specific_message(0x23, 0x08), Some("Timer interrupt"));
        assert_eq!(sensor_specific_message(0x23, 0x05), None);
    }

    #[test]
    fn oem_types_have_no_message() {
        assert_eq!(event_message(0x70, 0x12, 0x00), None);
        assert_eq!(event_message(0x7E, 0xC1, 0x02), None);
    }

    #[test]
    fn discrete_state_mask() {
        assert_eq!(
            state_messages(0x6F, 0x08, 0b0000_0011),
            vec!["Presence detected", "Power Supply Failure detected"]
        );
        assert!(state_messages(0x6F, 0x08, 0).is_empty());
    }
}
