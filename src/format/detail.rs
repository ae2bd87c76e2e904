//! Event detail selection and event state.

use super::{expand, Directive, FieldSource, FormatFlags, FormatOptions, Segment, Template};
use crate::{
    error::FormatError,
    oem::{self, OemContext},
    storage::{
        sdr::{EventDataFlag, SensorClass, SensorType},
        sel::{EventDirection, SelRecord},
    },
};

/// Which event data directives describe an event best.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDetail {
    /// `%c`
    Combined,
    /// `%f`, the separator and `%h`.
    ///
    /// With `check_for_na`, a rendering where one of the two fields is not
    /// available is replaced by the other field alone.
    Both { check_for_na: bool },
    /// `%f`
    Data2,
    /// `%h`
    Data3,
}

impl EventDetail {
    pub fn template(&self, separator: &str) -> Template {
        let segments = match self {
            Self::Combined => vec![Segment::Directive(Directive::EventDataCombined)],
            Self::Both { .. } => vec![
                Segment::Directive(Directive::EventData2),
                Segment::Literal(separator.into()),
                Segment::Directive(Directive::EventData3),
            ],
            Self::Data2 => vec![Segment::Directive(Directive::EventData2)],
            Self::Data3 => vec![Segment::Directive(Directive::EventData3)],
        };

        Template::from(segments)
    }
}

const CORRECTABLE_MCE_LOGGING_DISABLED: u8 = 0x06;

/// Pick the event detail directives for `record`.
///
/// A vendor specific rule matching `oem` takes precedence over the generic
/// selection. Returns `None` if neither event data 2 nor 3 carry anything.
pub fn select_event_detail(record: &SelRecord, oem: Option<&OemContext>) -> Option<EventDetail> {
    let event = record.system_event()?;

    if let Some(rule) = oem.and_then(|ctx| oem::matching_rule(ctx, record)) {
        return Some(if rule.is_combined() {
            EventDetail::Combined
        } else {
            EventDetail::Both {
                check_for_na: false,
            }
        });
    }

    let data = event.event_data();

    let detail = match (event.sensor_class(), data.flags()) {
        (
            SensorClass::Threshold,
            (EventDataFlag::TriggerReadingValue, EventDataFlag::TriggerThresholdValue),
        ) => EventDetail::Combined,
        // Event data 3 says how to read event data 2
        (
            SensorClass::SensorSpecificDiscrete,
            (EventDataFlag::SensorSpecificExtensionCode, EventDataFlag::SensorSpecificExtensionCode),
        ) if SensorType::from(event.sensor_type) == SensorType::EventLoggingDisabled
            && data.offset == CORRECTABLE_MCE_LOGGING_DISABLED =>
        {
            EventDetail::Combined
        }
        _ if data.data2.is_meaningful() && data.data3.is_meaningful() => EventDetail::Both {
            check_for_na: true,
        },
        _ if data.data2.is_meaningful() => EventDetail::Data2,
        _ if data.data3.is_meaningful() => EventDetail::Data3,
        _ => return None,
    };

    Some(detail)
}

/// Render `detail`. With `check_for_na`, a two field rendering where one of
/// the fields is not available falls back to the other field alone.
pub(crate) fn render_event_detail(
    source: &dyn FieldSource,
    detail: EventDetail,
    options: &FormatOptions,
) -> Result<Option<String>, FormatError> {
    if detail == (EventDetail::Both { check_for_na: true }) {
        let available = |directive| -> Result<Option<String>, FormatError> {
            Ok(source.field(directive)?.filter(|value| !value.is_empty()))
        };

        let text = match (available(Directive::EventData2)?, available(Directive::EventData3)?) {
            (Some(data2), Some(data3)) => format!("{data2}{}{data3}", options.separator),
            (Some(single), None) | (None, Some(single)) => {
                log::trace!("Event detail has a single available field: \"{single}\"");
                single
            }
            (None, None) => return Ok(None),
        };

        return Ok(Some(text));
    }

    let options = FormatOptions {
        flags: options.flags | FormatFlags::IGNORE_UNAVAILABLE | FormatFlags::OUTPUT_NOT_AVAILABLE,
        ..options.clone()
    };

    let rendered = expand(source, &detail.template(&options.separator), &options)?;
    Ok(rendered.has_output.then_some(rendered.text))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Nominal,
    Warning,
    Critical,
}

impl core::fmt::Display for EventState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Nominal => write!(f, "Nominal"),
            Self::Warning => write!(f, "Warning"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

const TRANSITION_SEVERITY: u8 = 0x07;

/// The severity of the condition a system event reports.
///
/// Only threshold and severity events carry a state; other events return
/// `None`.
pub fn event_state(record: &SelRecord) -> Option<EventState> {
    let event = record.system_event()?;
    let offset = event.event_data1_offset();
    let asserted = event.event_direction == EventDirection::Assertion;

    let severity = event.event_reading_type_code == TRANSITION_SEVERITY;

    let state = match (event.sensor_class(), asserted) {
        (SensorClass::Threshold, false) => EventState::Nominal,
        // Non-critical thresholds
        (SensorClass::Threshold, true) => match offset {
            0x00 | 0x01 | 0x06 | 0x07 => EventState::Warning,
            0x02..=0x05 | 0x08..=0x0B => EventState::Critical,
            _ => return None,
        },
        (SensorClass::GenericDiscrete, false) if severity => EventState::Nominal,
        (SensorClass::GenericDiscrete, true) if severity => match offset {
            0x00 | 0x07 | 0x08 => EventState::Nominal,
            0x01 | 0x04 => EventState::Warning,
            0x02 | 0x03 | 0x05 | 0x06 => EventState::Critical,
            _ => return None,
        },
        _ => return None,
    };

    Some(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        format::{format, FormatContext},
        storage::sel::decode,
    };

    fn system_event(sensor_type: u8, event_type: u8, data: [u8; 3]) -> SelRecord {
        decode(&[
            0x01,
            0x00,
            0x02,
            0x00,
            0x00,
            0x00,
            0x50,
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

    struct Fields(Option<&'static str>, Option<&'static str>);

    impl FieldSource for Fields {
        fn field(&self, directive: Directive) -> Result<Option<String>, FormatError> {
            let value = match directive {
                Directive::EventData2 => self.0,
                Directive::EventData3 => self.1,
                _ => None,
            };
            Ok(value.map(Into::into))
        }
    }

    #[test]
    fn check_for_na_keeps_available_field() {
        let options = FormatOptions::default();
        let both = EventDetail::Both { check_for_na: true };

        assert_eq!(
            render_event_detail(&Fields(None, Some("Fan Fault")), both, &options),
            Ok(Some("Fan Fault".into()))
        );
        assert_eq!(
            render_event_detail(&Fields(Some("Fan Fault"), None), both, &options),
            Ok(Some("Fan Fault".into()))
        );
        assert_eq!(
            render_event_detail(&Fields(Some("A"), Some("B")), both, &options),
            Ok(Some("A ; B".into()))
        );
        assert_eq!(render_event_detail(&Fields(None, None), both, &options), Ok(None));

        // Without the check, both fields are kept
        let both = EventDetail::Both {
            check_for_na: false,
        };
        assert_eq!(
            render_event_detail(&Fields(None, Some("Fan Fault")), both, &options),
            Ok(Some("N/A ; Fan Fault".into()))
        );
    }

    #[test]
    fn check_for_na_with_empty_na_string() {
        let options = FormatOptions {
            na_string: String::new(),
            ..Default::default()
        };
        let both = EventDetail::Both { check_for_na: true };

        assert_eq!(
            render_event_detail(&Fields(Some("Previous State = 1"), Some("Device ID = 3")), both, &options),
            Ok(Some("Previous State = 1 ; Device ID = 3".into()))
        );
        assert_eq!(
            render_event_detail(&Fields(None, Some("Device ID = 3")), both, &options),
            Ok(Some("Device ID = 3".into()))
        );
    }

    #[test]
    fn event_detail_keeps_both_fields_with_empty_na_string() {
        let memory = system_event(0x0C, 0x6F, [0x70, 0xFE, 0x03]);
        let options = FormatOptions {
            na_string: String::new(),
            ..Default::default()
        };
        let ctx = FormatContext::new(&memory, &options);

        let both = format(&ctx, "%f ; %h", 64).unwrap().text;
        let detail = format(&ctx, "%E", 64).unwrap().text;

        assert!(both.contains(" ; "));
        assert_eq!(detail, both);
    }

    #[test]
    fn detail_selection() {
        let threshold = system_event(0x01, 0x01, [0x59, 0x4B, 0x46]);
        assert_eq!(select_event_detail(&threshold, None), Some(EventDetail::Combined));

        let mce = system_event(0x10, 0x6F, [0xF6, 0x02, 0x80]);
        assert_eq!(select_event_detail(&mce, None), Some(EventDetail::Combined));

        let memory = system_event(0x0C, 0x6F, [0x70, 0xFE, 0x03]);
        assert_eq!(
            select_event_detail(&memory, None),
            Some(EventDetail::Both { check_for_na: true })
        );

        let data2_only = system_event(0x0F, 0x6F, [0xC2, 0x09, 0x00]);
        assert_eq!(select_event_detail(&data2_only, None), Some(EventDetail::Data2));

        let data3_only = system_event(0x0C, 0x6F, [0x31, 0x00, 0x03]);
        assert_eq!(select_event_detail(&data3_only, None), Some(EventDetail::Data3));

        let nothing = system_event(0x0C, 0x6F, [0x01, 0x00, 0x00]);
        assert_eq!(select_event_detail(&nothing, None), None);
    }

    #[test]
    fn event_states() {
        let upper_critical = system_event(0x01, 0x01, [0x59, 0x4B, 0x46]);
        assert_eq!(event_state(&upper_critical), Some(EventState::Critical));

        let upper_non_critical = system_event(0x01, 0x01, [0x57, 0x4B, 0x46]);
        assert_eq!(event_state(&upper_non_critical), Some(EventState::Warning));

        let deasserted = system_event(0x01, 0x81, [0x59, 0x4B, 0x46]);
        assert_eq!(event_state(&deasserted), Some(EventState::Nominal));

        let to_critical = system_event(0x0C, 0x07, [0x02, 0x00, 0x00]);
        assert_eq!(event_state(&to_critical), Some(EventState::Critical));

        let presence = system_event(0x08, 0x6F, [0x00, 0x00, 0x00]);
        assert_eq!(event_state(&presence), None);
    }
}
