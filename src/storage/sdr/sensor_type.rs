//! Sensor Type Codes
//!
//! Reference: IPMI 2.0 Specification, Table 42-3 "Sensor Type Codes"

macro_rules ! sensor_type {
    {
        pub enum SensorType {
            $($name:ident = $value:literal => $display:literal,)*
            [$reserved_range:pat],
            [$oem_reserved_range:pat],
        }
    } => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum SensorType {
            $($name,)*
            Reserved(u8),
            OemReserved(u8),
        }

        impl From<u8> for SensorType {
            fn from(value: u8) -> Self {
                match value {
                    $($value => Self::$name,)*
                    0 | $reserved_range => Self::Reserved(value),
                    $oem_reserved_range => Self::OemReserved(value),
                }
            }
        }

        impl From<SensorType> for u8 {
            fn from(value: SensorType) -> u8 {
                match value {
                    $(SensorType::$name => $value,)*
                    SensorType::Reserved(v) => v,
                    SensorType::OemReserved(v) => v,
                }
            }
        }

        impl TryFrom<&str> for SensorType {
            type Error = ();

            /// Match either the variant name or the display name, ignoring case,
            /// spaces, dashes and slashes.
            fn try_from(input: &str) -> Result<Self, Self::Error> {
                let normalize = |s: &str| {
                    s.chars()
                        .filter(|c| c.is_ascii_alphanumeric())
                        .map(|c| c.to_ascii_lowercase())
                        .collect::<String>()
                };
                let input = normalize(input);

                $(
                    if normalize(stringify!($name)) == input || normalize($display) == input {
                        return Ok(SensorType::$name);
                    }
                )*

                Err(())
            }
        }

        impl SensorType {
            /// The name printed for this sensor type in SEL output.
            pub fn name(&self) -> &'static str {
                match self {
                    $(SensorType::$name => $display,)*
                    SensorType::Reserved(_) => "Reserved",
                    SensorType::OemReserved(_) => "OEM Reserved",
                }
            }
        }

        impl core::fmt::Display for SensorType {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.name())
            }
        }
    }
}

sensor_type! {
    pub enum SensorType {
        Temperature = 0x01 => "Temperature",
        Voltage = 0x02 => "Voltage",
        Current = 0x03 => "Current",
        Fan = 0x04 => "Fan",
        ChassisIntrusion = 0x05 => "Physical Security",
        PlatformSecurityViolationAttempt = 0x06 => "Platform Security Violation Attempt",
        Processor = 0x07 => "Processor",
        PowerSupply = 0x08 => "Power Supply",
        PowerUnit = 0x09 => "Power Unit",
        CoolingDevice = 0x0A => "Cooling Device",
        UnitsBasedSensor = 0x0B => "Other Units Based Sensor",
        Memory = 0x0C => "Memory",
        DriveSlotBay = 0x0D => "Drive Slot",
        PostMemoryResize = 0x0E => "POST Memory Resize",
        SystemFirmwareProgress = 0x0F => "System Firmware Progress",
        EventLoggingDisabled = 0x10 => "Event Logging Disabled",
        Watchdog1 = 0x11 => "Watchdog 1",
        SystemEvent = 0x12 => "System Event",
        CriticalInterrupt = 0x13 => "Critical Interrupt",
        ButtonOrSwitch = 0x14 => "Button/Switch",
        ModuleOrBoard = 0x15 => "Module/Board",
        MicroControllerOrCoprocessor = 0x16 => "Microcontroller/Coprocessor",
        AddinCard = 0x17 => "Add In Card",
        Chassis = 0x18 => "Chassis",
        ChipSet = 0x19 => "Chip Set",
        OtherFRU = 0x1A => "Other FRU",
        CableOrInterconnect = 0x1B => "Cable/Interconnect",
        Terminator = 0x1C => "Terminator",
        SystemBootOrRestartInitiated = 0x1D => "System Boot Initiated",
        BootError = 0x1E => "Boot Error",
        BaseOsBootOrInstallationStatus = 0x1F => "OS Boot",
        OsStopOrShutdown = 0x20 => "OS Critical Stop",
        SlotOrConnector = 0x21 => "Slot/Connector",
        SystemACPIPowerState = 0x22 => "System ACPI Power State",
        Watchdog2 = 0x23 => "Watchdog 2",
        PlatformAlert = 0x24 => "Platform Alert",
        EntityPresence = 0x25 => "Entity Presence",
        MonitorAsicOrIc = 0x26 => "Monitor ASIC/IC",
        LAN = 0x27 => "LAN",
        ManagementSubSysHealth = 0x28 => "Management Subsystem Health",
        Battery = 0x29 => "Battery",
        SessionAudit = 0x2A => "Session Audit",
        VersionChange = 0x2B => "Version Change",
        FRUState = 0x2C => "FRU State",
        [0x2D..=0xBF],
        [0xC0..=0xFF],
    }
}

#[test]
fn sensor_type_names() {
    assert_eq!(SensorType::from(0x05).to_string(), "Physical Security");
    assert_eq!(SensorType::from(0xC1).to_string(), "OEM Reserved");
    assert_eq!(u8::from(SensorType::from(0xC1)), 0xC1);
    assert_eq!(SensorType::try_from("power supply"), Ok(SensorType::PowerSupply));
    assert_eq!(SensorType::try_from("PowerSupply"), Ok(SensorType::PowerSupply));
    assert_eq!(SensorType::try_from("Button/Switch"), Ok(SensorType::ButtonOrSwitch));
    assert_eq!(SensorType::try_from("nonsense"), Err(()));
}
