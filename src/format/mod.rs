//! Rendering of SEL records through `%` format templates.
//!
//! | Directive | Output                                                  |
//! |-----------|---------------------------------------------------------|
//! | `%i`      | record ID                                               |
//! | `%d`      | date                                                    |
//! | `%t`      | time                                                    |
//! | `%s`      | sensor name                                             |
//! | `%T`/`%g` | sensor type                                             |
//! | `%e`      | event text                                              |
//! | `%f`      | event data 2 text                                       |
//! | `%h`      | event data 3 text                                       |
//! | `%c`      | combined event data 2 and 3 text                        |
//! | `%p`      | previous state                                          |
//! | `%k`      | event direction                                         |
//! | `%I`      | event state (`Nominal`, `Warning` or `Critical`)        |
//! | `%E`      | event detail, the best of `%c`, `%f` and `%h`           |
//! | `%m`      | manufacturer of a timestamped OEM record                |
//! | `%o`      | OEM defined bytes                                       |
//! | `%O`      | text carried by OEM records                             |
//! | `%%`      | `%`                                                     |

use crate::{
    error::FormatError,
    oem::OemContext,
    storage::{
        sdr::SdrLookup,
        sel::{RecordTypeClass, SelRecord},
    },
};

mod detail;
pub use detail::{event_state, select_event_detail, EventDetail, EventState};

mod fields;

mod template;
pub use template::{Directive, Segment, Template};

/// The default text for fields that are not available.
pub const NA_STRING: &str = "N/A";

/// The default separator between event data 2 and 3 texts.
pub const EVENT_SEPARATOR: &str = " ; ";

bitflags::bitflags! {
    pub struct FormatFlags: u16 {
        /// Render unavailable fields as nothing instead of failing.
        const IGNORE_UNAVAILABLE = 0x0001;
        /// Render unavailable fields as the N/A string.
        const OUTPUT_NOT_AVAILABLE = 0x0002;
        /// Dates as `Mon-DD-YYYY` instead of `MM/DD/YYYY`.
        const DATE_MONTH_STRING = 0x0004;
        const VERBOSE = 0x0008;
        const NON_ABBREVIATED_UNITS = 0x0010;
        /// Apply vendor specific interpretations.
        const INTERPRET_OEM_DATA = 0x0020;
        /// Prefix sensor names with their entity.
        const ENTITY_SENSOR_NAMES = 0x0040;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    pub flags: FormatFlags,
    pub na_string: String,
    pub separator: String,
    /// Applied to timestamps before rendering dates and times.
    pub utc_offset_seconds: i32,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            flags: FormatFlags::IGNORE_UNAVAILABLE | FormatFlags::OUTPUT_NOT_AVAILABLE,
            na_string: NA_STRING.into(),
            separator: EVENT_SEPARATOR.into(),
            utc_offset_seconds: 0,
        }
    }
}

impl FormatOptions {
    pub fn new(flags: FormatFlags) -> Self {
        Self {
            flags,
            ..Default::default()
        }
    }

    pub fn with_flags(mut self, flags: FormatFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    pub fn with_utc_offset(mut self, utc_offset_seconds: i32) -> Self {
        self.utc_offset_seconds = utc_offset_seconds;
        self
    }
}

/// Everything needed to render one record.
#[derive(Clone, Copy)]
pub struct FormatContext<'a> {
    pub record: &'a SelRecord,
    pub sdr: &'a dyn SdrLookup,
    pub oem: Option<&'a OemContext>,
    pub options: &'a FormatOptions,
}

impl<'a> FormatContext<'a> {
    pub fn new(record: &'a SelRecord, options: &'a FormatOptions) -> Self {
        Self {
            record,
            sdr: &(),
            oem: None,
            options,
        }
    }

    pub fn with_sdr(mut self, sdr: &'a dyn SdrLookup) -> Self {
        self.sdr = sdr;
        self
    }

    pub fn with_oem(mut self, oem: Option<&'a OemContext>) -> Self {
        self.oem = oem;
        self
    }

    /// The OEM context, if vendor specific interpretation is enabled.
    pub fn oem_context(&self) -> Option<&'a OemContext> {
        if self.options.flags.contains(FormatFlags::INTERPRET_OEM_DATA) {
            self.oem
        } else {
            None
        }
    }
}

/// The result of rendering a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    /// Whether `text` was cut to fit the requested capacity.
    pub truncated: bool,
    /// Whether at least one directive produced a value. Literal text and
    /// N/A placeholders do not count.
    pub has_output: bool,
}

/// Render `record` through `template`, keeping at most `capacity` bytes.
pub fn format(ctx: &FormatContext, template: &str, capacity: usize) -> Result<Formatted, FormatError> {
    if capacity == 0 {
        return Err(FormatError::ZeroCapacity);
    }

    format_template(ctx, &Template::parse(template)?, capacity)
}

/// Like [`format`], for an already parsed template.
pub fn format_template(
    ctx: &FormatContext,
    template: &Template,
    capacity: usize,
) -> Result<Formatted, FormatError> {
    if capacity == 0 {
        return Err(FormatError::ZeroCapacity);
    }

    let Expanded { mut text, has_output } = expand(ctx, template, ctx.options)?;

    let truncated = text.len() > capacity;
    if truncated {
        let mut end = capacity;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }

    Ok(Formatted {
        text,
        truncated,
        has_output,
    })
}

/// Resolves the value of a single directive. `Ok(None)` means that the field
/// is not available.
pub(crate) trait FieldSource {
    fn field(&self, directive: Directive) -> Result<Option<String>, FormatError>;
}

pub(crate) struct Expanded {
    pub text: String,
    pub has_output: bool,
}

pub(crate) fn expand(
    source: &dyn FieldSource,
    template: &Template,
    options: &FormatOptions,
) -> Result<Expanded, FormatError> {
    let mut text = String::new();
    let mut has_output = false;

    for segment in template.segments() {
        let directive = match segment {
            Segment::Literal(literal) => {
                text.push_str(literal);
                continue;
            }
            Segment::Directive(directive) => *directive,
        };

        match source.field(directive)? {
            Some(value) if !value.is_empty() => {
                has_output = true;
                text.push_str(&value);
            }
            _ if options.flags.contains(FormatFlags::OUTPUT_NOT_AVAILABLE) => {
                text.push_str(&options.na_string)
            }
            _ if options.flags.contains(FormatFlags::IGNORE_UNAVAILABLE) => {}
            _ => return Err(FormatError::UnavailableField(directive.as_char())),
        }
    }

    Ok(Expanded { text, has_output })
}

/// A fixed layout hex dump of the raw record bytes.
pub fn hex_dump(record: &SelRecord) -> String {
    let raw = record.raw();
    let hex = |bytes: &[u8]| -> String { bytes.iter().map(|b| format!("[{b:02X}]")).collect() };

    match record.record_type_class() {
        RecordTypeClass::SystemEvent => format!(
            "RID:{} RT:{} TS:{} GID:{} ER:{} ST:{} SN:{} EDIR:{} ED1: {} ED2: {} ED3: {}",
            hex(&raw[0..2]),
            hex(&raw[2..3]),
            hex(&raw[3..7]),
            hex(&raw[7..9]),
            hex(&raw[9..10]),
            hex(&raw[10..11]),
            hex(&raw[11..12]),
            hex(&raw[12..13]),
            hex(&raw[13..14]),
            hex(&raw[14..15]),
            hex(&raw[15..16]),
        ),
        RecordTypeClass::TimestampedOem => format!(
            "RID:{} RT:{} TS:{} MID:{} OEM:{}",
            hex(&raw[0..2]),
            hex(&raw[2..3]),
            hex(&raw[3..7]),
            hex(&raw[7..10]),
            hex(&raw[10..16]),
        ),
        RecordTypeClass::NonTimestampedOem => format!(
            "RID:{} RT:{} OEM:{}",
            hex(&raw[0..2]),
            hex(&raw[2..3]),
            hex(&raw[3..16]),
        ),
        RecordTypeClass::Invalid => format!(
            "RID:{} RT:{} DATA:{}",
            hex(&raw[0..2]),
            hex(&raw[2..3]),
            hex(&raw[3..16]),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        oem::OemContext,
        storage::{
            sdr::{SensorCalibration, SensorDescriptor, SensorTable, SensorType, Unit},
            sel::decode,
        },
    };

    // 2021-03-04T05:06:07Z
    const TIMESTAMP: [u8; 4] = [0xBF, 0x6A, 0x40, 0x60];

    fn threshold_event() -> SelRecord {
        decode(&[
            0x34,
            0x12,
            0x02,
            TIMESTAMP[0],
            TIMESTAMP[1],
            TIMESTAMP[2],
            TIMESTAMP[3],
            0x20,
            0x00,
            0x04,
            0x01,
            0x30,
            0x01,
            0x59,
            0x4B,
            0x46,
        ])
        .unwrap()
    }

    fn sensors() -> SensorTable {
        let mut table = SensorTable::new();
        table.insert(
            0x20,
            0x30,
            SensorDescriptor::new("Inlet Temp", SensorType::Temperature, 0x01)
                .with_calibration(SensorCalibration::linear(1, 0, 0, 0), Unit::DegreesCelsius)
                .with_entity(0x42, 1),
        );
        table
    }

    fn render(ctx: &FormatContext, template: &str) -> String {
        format(ctx, template, 256).unwrap().text
    }

    #[test]
    fn record_id_round_trip() {
        for id in [0x0001u16, 0x1234, 0xFFFE, 0x8000] {
            let [lo, hi] = id.to_le_bytes();
            let record = decode(&[lo, hi, 0x02, 0, 0, 0, 0x50, 0x20, 0, 4, 1, 1, 1, 0, 0, 0]).unwrap();
            let options = FormatOptions::default();
            let ctx = FormatContext::new(&record, &options);

            assert_eq!(render(&ctx, "%i").parse::<u16>(), Ok(id));
        }
    }

    #[cfg(feature = "time")]
    #[test]
    fn system_event_fields() {
        let record = threshold_event();
        let table = sensors();
        let options = FormatOptions::default();
        let ctx = FormatContext::new(&record, &options).with_sdr(&table);

        assert_eq!(
            render(&ctx, "%i | %d | %t | %s | %T | %e"),
            "4660 | 03/04/2021 | 05:06:07 | Inlet Temp | Temperature | Upper Critical - going high"
        );
        assert_eq!(render(&ctx, "%k, %I"), "Assertion Event, Critical");
        assert_eq!(render(&ctx, "%f ; %h"), "Reading = 75.00 C ; Threshold = 70.00 C");
        assert_eq!(render(&ctx, "%c"), "Reading 75.00 > Threshold 70.00 C");
        assert_eq!(render(&ctx, "%E"), "Reading 75.00 > Threshold 70.00 C");
        assert_eq!(render(&ctx, "%m %o %p 100%%"), "N/A N/A N/A 100%");

        let options = FormatOptions::default().with_flags(
            FormatFlags::DATE_MONTH_STRING
                | FormatFlags::NON_ABBREVIATED_UNITS
                | FormatFlags::ENTITY_SENSOR_NAMES,
        );
        let ctx = FormatContext::new(&record, &options).with_sdr(&table);
        assert_eq!(render(&ctx, "%d %s"), "Mar-04-2021 Baseboard 1 Inlet Temp");
        assert_eq!(render(&ctx, "%f"), "Reading = 75.00 degrees C");
    }

    #[test]
    fn without_sdr() {
        let record = threshold_event();
        let options = FormatOptions::default();
        let ctx = FormatContext::new(&record, &options);

        assert_eq!(render(&ctx, "%s"), "Sensor #48");
        assert_eq!(render(&ctx, "%c"), "Reading 4Bh > Threshold 46h");
        assert_eq!(render(&ctx, "%h"), "Threshold = 46h");
    }

    #[test]
    fn shifted_generator_address() {
        let mut raw = *threshold_event().raw();
        raw[7] = 0x40;
        let record = decode(&raw).unwrap();
        let table = sensors();
        let options = FormatOptions::default();
        let ctx = FormatContext::new(&record, &options).with_sdr(&table);

        assert_eq!(render(&ctx, "%s"), "Inlet Temp");
    }

    #[test]
    fn formatting_is_idempotent() {
        let record = threshold_event();
        let table = sensors();
        let options = FormatOptions::default();
        let ctx = FormatContext::new(&record, &options).with_sdr(&table);
        let template = "%i %d %t %s %T %e %E %I %k %m %o";

        assert_eq!(format(&ctx, template, 256), format(&ctx, template, 256));
    }

    #[test]
    fn unavailable_fields() {
        let record = threshold_event();

        let options = FormatOptions::default();
        let ctx = FormatContext::new(&record, &options);
        let formatted = format(&ctx, "%m:%o", 64).unwrap();
        assert_eq!(formatted.text, "N/A:N/A");
        assert!(!formatted.has_output);

        let options = FormatOptions::new(FormatFlags::IGNORE_UNAVAILABLE);
        let ctx = FormatContext::new(&record, &options);
        assert_eq!(render(&ctx, "%m:%o"), ":");

        let options = FormatOptions::new(FormatFlags::empty());
        let ctx = FormatContext::new(&record, &options);
        assert_eq!(
            format(&ctx, "%i %m", 64),
            Err(FormatError::UnavailableField('m'))
        );
    }

    #[test]
    fn truncation() {
        let record = threshold_event();
        let options = FormatOptions::default();
        let ctx = FormatContext::new(&record, &options);

        let formatted = format(&ctx, "%i %T", 8).unwrap();
        assert_eq!(formatted.text, "4660 Tem");
        assert!(formatted.truncated);
        assert!(formatted.has_output);

        assert_eq!(format(&ctx, "%i", 0), Err(FormatError::ZeroCapacity));
        assert_eq!(format(&ctx, "%i %", 8), Err(FormatError::UnterminatedDirective));
    }

    #[test]
    fn timestamped_oem_without_manufacturer() {
        let record = decode(&[
            0x10, 0x00, 0xC5, 0x00, 0x00, 0x00, 0x50, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04,
            0x05, 0x06,
        ])
        .unwrap();
        let options = FormatOptions::default().with_flags(FormatFlags::INTERPRET_OEM_DATA);
        let ctx = FormatContext::new(&record, &options).with_oem(None);

        assert_eq!(render(&ctx, "%m"), "N/A");
        assert_eq!(
            render(&ctx, "%m:%o:%O"),
            "N/A:OEM defined = 01h 02h 03h 04h 05h 06h:N/A"
        );
        assert_eq!(render(&ctx, "%s %e %E"), "N/A N/A N/A");
    }

    #[test]
    fn timestamped_oem_manufacturer() {
        let record = decode(&[
            0x10, 0x00, 0xC5, 0x00, 0x00, 0x00, 0x50, 0xA2, 0x02, 0x00, 0x01, 0x02, 0x03, 0x04,
            0x05, 0x06,
        ])
        .unwrap();
        let options = FormatOptions::default();
        let ctx = FormatContext::new(&record, &options);
        assert_eq!(render(&ctx, "%m"), "Dell Inc.");

        let record = decode(&[
            0x10, 0x00, 0xC5, 0x00, 0x00, 0x00, 0x50, 0x34, 0x12, 0x00, 0x01, 0x02, 0x03, 0x04,
            0x05, 0x06,
        ])
        .unwrap();
        let ctx = FormatContext::new(&record, &options);
        assert_eq!(render(&ctx, "%m"), "Manufacturer ID = 1234h");
    }

    #[test]
    fn oem_interpretation_is_opt_in() {
        // Dell power supply rating mismatch
        let record = decode(&[
            0x10, 0x00, 0x02, 0x00, 0x00, 0x00, 0x50, 0x20, 0x00, 0x04, 0x08, 0x50, 0x6F, 0xA6,
            0x84, 0x33,
        ])
        .unwrap();
        let dell = OemContext::new(674, 0x0100);

        let options = FormatOptions::default();
        let ctx = FormatContext::new(&record, &options).with_oem(Some(&dell));
        assert_eq!(render(&ctx, "%E"), "OEM code = 84h ; OEM code = 33h");

        let options = FormatOptions::default().with_flags(FormatFlags::INTERPRET_OEM_DATA);
        let ctx = FormatContext::new(&record, &options).with_oem(Some(&dell));
        assert_eq!(render(&ctx, "%E"), "Power Supply rating mismatch, Rating = 900 W");
    }

    #[test]
    fn hex_dumps() {
        let record = threshold_event();
        assert_eq!(
            hex_dump(&record),
            "RID:[34][12] RT:[02] TS:[BF][6A][40][60] GID:[20][00] ER:[04] ST:[01] SN:[30] \
             EDIR:[01] ED1: [59] ED2: [4B] ED3: [46]"
        );

        let record = decode(&[0x01, 0x00, 0xE0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]).unwrap();
        assert_eq!(
            hex_dump(&record),
            "RID:[01][00] RT:[E0] OEM:[01][02][03][04][05][06][07][08][09][0A][0B][0C][0D]"
        );
    }
}
