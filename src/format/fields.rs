//! Directive values for a single record.

use super::{
    detail::{event_state, render_event_detail, select_event_detail},
    Directive, FieldSource, FormatContext, FormatFlags,
};
use crate::{
    app::manufacturer_name,
    error::FormatError,
    oem,
    storage::{
        sdr::{
            event_extension::{correctable_mce_logging_disabled, data2_message, data3_message},
            event_offset::{event_message, severity_message},
            EventData, EventDataFlag, SensorClass, SensorDescriptor, SensorType, Unit,
        },
        sel::{RecordBody, SystemEventRecord},
    },
};

/// Generator ID used by some Supermicro BMCs for sensors that the SDR
/// lists under the BMC's slave address.
const SHIFTED_BMC_ADDRESS: u8 = 0x40;
const BMC_ADDRESS: u8 = 0x20;

const UNSPECIFIED_NIBBLE: u8 = 0x0F;

const CORRECTABLE_MCE_LOGGING_DISABLED: u8 = 0x06;

impl FieldSource for FormatContext<'_> {
    fn field(&self, directive: Directive) -> Result<Option<String>, FormatError> {
        let value = match directive {
            Directive::RecordId => Some(self.record.record_id().value().to_string()),
            Directive::Date => self.timestamp_text(true),
            Directive::Time => self.timestamp_text(false),
            Directive::SensorName => self.sensor_name(),
            Directive::SensorType => self
                .system_event()
                .map(|event| SensorType::from(event.sensor_type).to_string()),
            Directive::EventText => self.event_text(),
            Directive::EventData2 => self.event_data2(),
            Directive::EventData3 => self.event_data3(),
            Directive::EventDataCombined => self.event_data_combined(),
            Directive::PreviousState => self.previous_state(),
            Directive::EventDirection => self
                .system_event()
                .map(|event| event.event_direction.to_string()),
            Directive::EventState => event_state(self.record).map(|state| state.to_string()),
            Directive::EventDetail => {
                return match select_event_detail(self.record, self.oem_context()) {
                    Some(detail) => render_event_detail(self, detail, self.options),
                    None => Ok(None),
                }
            }
            Directive::Manufacturer => self.manufacturer(),
            Directive::OemBytes => self.oem_bytes(),
            Directive::OemText => self.oem_text(),
        };

        Ok(value)
    }
}

impl<'a> FormatContext<'a> {
    fn system_event(&self) -> Option<&'a SystemEventRecord> {
        self.record.system_event()
    }

    fn flag(&self, flag: FormatFlags) -> bool {
        self.options.flags.contains(flag)
    }

    fn sensor(&self) -> Option<&'a SensorDescriptor> {
        let event = self.system_event()?;

        if let Some(sensor) = self.sdr.find_sensor(event.sensor_number, event.generator_id) {
            return Some(sensor);
        }

        if event.generator_address() == SHIFTED_BMC_ADDRESS {
            let [_, high] = event.generator_id.to_le_bytes();
            let generator_id = u16::from_le_bytes([BMC_ADDRESS, high]);

            log::trace!(
                "No sensor #{} for generator 0x{:04X}, retrying with 0x{generator_id:04X}",
                event.sensor_number,
                event.generator_id
            );

            return self.sdr.find_sensor(event.sensor_number, generator_id);
        }

        None
    }

    fn timestamp_text(&self, date: bool) -> Option<String> {
        let timestamp = self.record.timestamp()?;

        if timestamp.is_unspecified() {
            return None;
        } else if timestamp.is_post_init() {
            return Some("PostInit".into());
        }

        let text = match timestamp.parts(self.options.utc_offset_seconds) {
            Some(parts) if date => parts.date(self.flag(FormatFlags::DATE_MONTH_STRING)),
            Some(parts) => parts.time(),
            None => None,
        };

        Some(text.unwrap_or_else(|| timestamp.value().to_string()))
    }

    fn sensor_name(&self) -> Option<String> {
        let event = self.system_event()?;

        let name = match self.sensor() {
            Some(sensor) if self.flag(FormatFlags::ENTITY_SENSOR_NAMES) => {
                sensor.entity_sensor_name()
            }
            Some(sensor) => sensor.name.clone(),
            None => format!("Sensor #{}", event.sensor_number),
        };

        Some(name)
    }

    fn event_text(&self) -> Option<String> {
        let event = self.system_event()?;
        let offset = event.event_data1_offset();

        if let Some(message) = event_message(event.event_reading_type_code, event.sensor_type, offset)
        {
            return Some(message.into());
        }

        if event.sensor_class() == SensorClass::Oem {
            Some(format!("OEM Event Offset = {offset:02X}h"))
        } else if self.flag(FormatFlags::VERBOSE) {
            Some(format!("Event Offset = {offset:02X}h"))
        } else {
            None
        }
    }

    /// A raw reading converted with the sensor's calibration, or as hex if
    /// the sensor has none.
    fn reading_text(&self, raw: u8) -> String {
        match self.sensor().and_then(|s| s.value(raw).map(|v| (s, v))) {
            Some((sensor, value)) => self.value_text(sensor, value),
            None => format!("{raw:02X}h"),
        }
    }

    fn value_text(&self, sensor: &SensorDescriptor, value: f64) -> String {
        if sensor.unit == Unit::Unspecified && !sensor.unit_is_percentage {
            format!("{value:.2}")
        } else {
            let abbreviated = !self.flag(FormatFlags::NON_ABBREVIATED_UNITS);
            sensor
                .unit
                .display(value, abbreviated, sensor.unit_is_percentage)
        }
    }

    fn previous_state_message(event: &SystemEventRecord, data2: u8) -> Option<&'static str> {
        let previous = data2 & 0x0F;
        if previous == UNSPECIFIED_NIBBLE {
            return None;
        }

        event_message(event.event_reading_type_code, event.sensor_type, previous)
    }

    fn previous_state_or_severity(event: &SystemEventRecord, data2: u8) -> Option<String> {
        let previous = Self::previous_state_message(event, data2)
            .map(|state| format!("Previous State = {state}"));

        let severity = match data2 >> 4 {
            UNSPECIFIED_NIBBLE => None,
            severity => severity_message(severity).map(|s| format!("Severity = {s}")),
        };

        match (previous, severity) {
            (Some(previous), Some(severity)) => Some(format!("{previous}, {severity}")),
            (previous, severity) => previous.or(severity),
        }
    }

    fn extension_code(code: u8) -> String {
        format!("Sensor-specific Event Extension Code = {code:02X}h")
    }

    fn oem_code(code: u8) -> String {
        format!("OEM code = {code:02X}h")
    }

    fn event_data2(&self) -> Option<String> {
        if let Some(text) = self
            .oem_context()
            .and_then(|ctx| oem::data2_text(ctx, self.record))
        {
            return Some(text);
        }

        let event = self.system_event()?;
        let EventData { offset, data2, .. } = event.event_data();

        match data2.flag {
            EventDataFlag::TriggerReadingValue => {
                Some(format!("Reading = {}", self.reading_text(data2.value)))
            }
            EventDataFlag::PreviousStateOrSeverity => {
                Self::previous_state_or_severity(event, data2.value)
            }
            EventDataFlag::SensorSpecificExtensionCode => Some(
                data2_message(event.sensor_type, offset, data2.value)
                    .unwrap_or_else(|| Self::extension_code(data2.value)),
            ),
            EventDataFlag::OemCode => Some(Self::oem_code(data2.value)),
            EventDataFlag::TriggerThresholdValue
            | EventDataFlag::Unspecified
            | EventDataFlag::UnavailableByte => None,
        }
    }

    fn event_data3(&self) -> Option<String> {
        if let Some(text) = self
            .oem_context()
            .and_then(|ctx| oem::data3_text(ctx, self.record))
        {
            return Some(text);
        }

        let event = self.system_event()?;
        let EventData { offset, data3, .. } = event.event_data();

        match data3.flag {
            EventDataFlag::TriggerThresholdValue => {
                Some(format!("Threshold = {}", self.reading_text(data3.value)))
            }
            EventDataFlag::SensorSpecificExtensionCode => Some(
                data3_message(event.sensor_type, offset, event.event_data[1], data3.value)
                    .unwrap_or_else(|| Self::extension_code(data3.value)),
            ),
            EventDataFlag::OemCode => Some(Self::oem_code(data3.value)),
            EventDataFlag::TriggerReadingValue
            | EventDataFlag::PreviousStateOrSeverity
            | EventDataFlag::Unspecified
            | EventDataFlag::UnavailableByte => None,
        }
    }

    fn event_data_combined(&self) -> Option<String> {
        if let Some(text) = self
            .oem_context()
            .and_then(|ctx| oem::combined_text(ctx, self.record))
        {
            return Some(text);
        }

        let event = self.system_event()?;
        let data = event.event_data();
        let (data2, data3) = (data.data2.value, data.data3.value);

        match (event.sensor_class(), data.flags()) {
            (
                SensorClass::Threshold,
                (EventDataFlag::TriggerReadingValue, EventDataFlag::TriggerThresholdValue),
            ) => {
                // Odd offsets are "going high"
                let comparison = if data.offset & 0x01 == 0x01 { ">" } else { "<" };

                let calibrated = self.sensor().and_then(|sensor| {
                    Some((sensor, sensor.value(data2)?, sensor.value(data3)?))
                });

                let text = match calibrated {
                    Some((sensor, reading, threshold)) => format!(
                        "Reading {reading:.2} {comparison} Threshold {}",
                        self.value_text(sensor, threshold)
                    ),
                    None => format!("Reading {data2:02X}h {comparison} Threshold {data3:02X}h"),
                };

                Some(text)
            }
            (
                SensorClass::SensorSpecificDiscrete,
                (EventDataFlag::SensorSpecificExtensionCode, EventDataFlag::SensorSpecificExtensionCode),
            ) if SensorType::from(event.sensor_type) == SensorType::EventLoggingDisabled
                && data.offset == CORRECTABLE_MCE_LOGGING_DISABLED =>
            {
                Some(correctable_mce_logging_disabled(data2, data3))
            }
            _ => None,
        }
    }

    fn previous_state(&self) -> Option<String> {
        let event = self.system_event()?;
        let data = event.event_data();

        match data.data2.flag {
            EventDataFlag::PreviousStateOrSeverity => {
                Self::previous_state_message(event, data.data2.value).map(Into::into)
            }
            _ => None,
        }
    }

    fn manufacturer(&self) -> Option<String> {
        match self.record.body() {
            RecordBody::TimestampedOem(oem) if oem.manufacturer_id != 0 => {
                let id = oem.manufacturer_id;
                Some(
                    manufacturer_name(id)
                        .map(Into::into)
                        .unwrap_or_else(|| format!("Manufacturer ID = {id:X}h")),
                )
            }
            _ => None,
        }
    }

    fn oem_bytes(&self) -> Option<String> {
        let bytes: Vec<String> = self
            .record
            .oem_defined()?
            .iter()
            .map(|b| format!("{b:02X}h"))
            .collect();

        Some(format!("OEM defined = {}", bytes.join(" ")))
    }

    fn oem_text(&self) -> Option<String> {
        if !self.flag(FormatFlags::INTERPRET_OEM_DATA) {
            return None;
        }

        oem::oem_record_text(self.oem, self.record)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        format::{format, FormatContext, FormatFlags, FormatOptions},
        oem::OemContext,
        storage::sel::{decode, SelRecord},
    };

    fn system_event(sensor_type: u8, event_type: u8, data: [u8; 3]) -> SelRecord {
        decode(&[
            0x01,
            0x00,
            0x02,
            0x00,
            0x01,
            0x00,
            0x00,
            0x20,
            0x00,
            0x04,
            sensor_type,
            0x10,
            event_type,
            data[0],
            data[1],
            data[2],
        ])
        .unwrap()
    }

    fn render(record: &SelRecord, template: &str) -> String {
        let options = FormatOptions::default();
        let ctx = FormatContext::new(record, &options);
        format(&ctx, template, 256).unwrap().text
    }

    #[test]
    fn post_init_timestamp() {
        let record = system_event(0x01, 0x01, [0x59, 0x4B, 0x46]);
        assert_eq!(render(&record, "%d %t"), "PostInit PostInit");
    }

    #[test]
    fn unavailable_previous_state_falls_back_to_data3() {
        // Memory, previous state offset 0x0E is not defined
        let record = system_event(0x0C, 0x6F, [0x71, 0xFE, 0x03]);

        assert_eq!(render(&record, "%f ; %h"), "N/A ; Memory Module/Device ID = 3");
        assert_eq!(render(&record, "%E"), "Memory Module/Device ID = 3");
    }

    #[test]
    fn previous_state_and_severity() {
        // Power supply failure, previous state "Presence detected", severity Critical
        let record = system_event(0x08, 0x6F, [0x41, 0x20, 0x00]);

        assert_eq!(
            render(&record, "%e: %f"),
            "Power Supply Failure detected: Previous State = Presence detected, \
             Severity = transition to Critical from less severe"
        );
        assert_eq!(render(&record, "%p"), "Presence detected");
    }

    #[test]
    fn extension_codes() {
        // System firmware progress, video initialization
        let record = system_event(0x0F, 0x6F, [0xC2, 0x09, 0x00]);
        assert_eq!(render(&record, "%e ; %E"), "System Firmware Progress ; Video initialization");

        let record = system_event(0x0F, 0x6F, [0xC2, 0x7F, 0x00]);
        assert_eq!(
            render(&record, "%f"),
            "Sensor-specific Event Extension Code = 7Fh"
        );

        // Correctable machine check error logging disabled
        let record = system_event(0x10, 0x6F, [0xF6, 0x02, 0x80]);
        assert_eq!(render(&record, "%E"), "Vendor Specific Processor Number = 2");
    }

    #[test]
    fn oem_event_text() {
        let record = system_event(0xC1, 0x70, [0xA3, 0x01, 0x02]);

        assert_eq!(render(&record, "%T: %e"), "OEM Reserved: OEM Event Offset = 03h");
        assert_eq!(render(&record, "%E"), "OEM code = 01h ; OEM code = 02h");
    }

    #[test]
    fn unknown_offsets_in_verbose_mode() {
        let record = system_event(0x08, 0x6F, [0x0E, 0x00, 0x00]);
        assert_eq!(render(&record, "%e"), "N/A");

        let options = FormatOptions::default().with_flags(FormatFlags::VERBOSE);
        let ctx = FormatContext::new(&record, &options);
        assert_eq!(format(&ctx, "%e", 64).unwrap().text, "Event Offset = 0Eh");
    }

    #[test]
    fn inventec_bios_version() {
        let record = decode(&[
            0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x50, 0x01, 0x00, 0x04, 0xC1, 0x81, 0x70, 0xA0,
            0x01, 0x07,
        ])
        .unwrap();
        let inventec = OemContext::new(20569, 51);
        let options = FormatOptions::default().with_flags(FormatFlags::INTERPRET_OEM_DATA);
        let ctx = FormatContext::new(&record, &options).with_oem(Some(&inventec));

        assert_eq!(format(&ctx, "%E", 64).unwrap().text, "BIOS Version 1.07");
    }
}
