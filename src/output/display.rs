use std::collections::VecDeque;

use crate::{
    connection::IpmiConnection,
    error::FormatError,
    format::{format, hex_dump, FormatContext, FormatFlags, FormatOptions},
    oem::OemContext,
    session::{SelSession, Visit},
    storage::{
        sdr::{EventDataFlag, SdrLookup, SensorType},
        sel::{RecordId, RecordTypeClass, SelRecord},
    },
    SelError,
};

use super::OUTPUT_CAPACITY;

const ID_WIDTH: usize = 2;
const DATE_WIDTH: usize = 11;
const TIME_WIDTH: usize = 8;
const NAME_WIDTH: usize = 16;
const TYPE_WIDTH: usize = 16;
const DIRECTION_WIDTH: usize = 17;
const EVENT_WIDTH: usize = 36;

/// Options of the interactive SEL listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayOptions {
    /// `1` adds the sensor type, event direction and event detail columns,
    /// `3` and above also explain events that have no text of their own.
    pub verbosity: u8,
    pub comma_separated: bool,
    /// Colon separated output of older tools.
    pub legacy: bool,
    pub hex_dump: bool,
    pub no_header: bool,
    pub show_sensor_type: bool,
    pub interpret_oem_data: bool,
    pub entity_sensor_names: bool,
    pub non_abbreviated_units: bool,
    pub utc_offset_seconds: i32,

    /// Only show events of these sensor types.
    pub sensor_types: Vec<SensorType>,
    pub exclude_sensor_types: Vec<SensorType>,
    pub system_event_only: bool,
    pub oem_event_only: bool,

    /// Only show these records.
    pub record_ids: Vec<RecordId>,
    pub record_range: Option<(RecordId, RecordId)>,
    pub exclude_record_ids: Vec<RecordId>,
    pub exclude_record_range: Option<(RecordId, RecordId)>,

    /// Show the first `n` records.
    pub head: Option<u16>,
    /// Show (roughly) the last `n` records.
    pub tail: Option<u16>,

    /// Clear the SEL once everything has been shown.
    pub clear_after_display: bool,
}

impl DisplayOptions {
    fn format_options(&self) -> FormatOptions {
        let mut flags = FormatFlags::IGNORE_UNAVAILABLE | FormatFlags::OUTPUT_NOT_AVAILABLE;

        if !self.legacy {
            flags |= FormatFlags::DATE_MONTH_STRING;
        }
        if self.verbosity >= 3 {
            flags |= FormatFlags::VERBOSE;
        }
        if self.non_abbreviated_units {
            flags |= FormatFlags::NON_ABBREVIATED_UNITS;
        }
        if self.interpret_oem_data {
            flags |= FormatFlags::INTERPRET_OEM_DATA;
        }
        if self.entity_sensor_names {
            flags |= FormatFlags::ENTITY_SENSOR_NAMES;
        }

        FormatOptions::new(flags).with_utc_offset(self.utc_offset_seconds)
    }

    fn show_type(&self) -> bool {
        self.show_sensor_type || self.verbosity >= 1
    }
}

/// Hands lines to a sink, preceded by the header on the first one.
struct Emitter<'s> {
    header: Option<String>,
    shown: usize,
    sink: &'s mut dyn FnMut(&str),
}

impl Emitter<'_> {
    fn emit(&mut self, line: String) {
        if let Some(header) = self.header.take() {
            (self.sink)(&header);
        }
        (self.sink)(&line);
        self.shown += 1;
    }
}

/// Renders SEL records as table rows, CSV, legacy lines or hex dumps.
pub struct SelDisplay<'a> {
    options: DisplayOptions,
    format: FormatOptions,
    sdr: &'a dyn SdrLookup,
    oem: Option<OemContext>,
}

impl<'a> SelDisplay<'a> {
    pub fn new(options: DisplayOptions) -> Self {
        Self {
            format: options.format_options(),
            options,
            sdr: &(),
            oem: None,
        }
    }

    pub fn with_sdr(mut self, sdr: &'a dyn SdrLookup) -> Self {
        self.sdr = sdr;
        self
    }

    pub fn with_oem(mut self, oem: OemContext) -> Self {
        self.oem = Some(oem);
        self
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    /// The column header, if one is printed.
    pub fn header(&self) -> Option<String> {
        let options = &self.options;
        if options.no_header || options.legacy || options.hex_dump {
            return None;
        }

        let mut columns = vec![
            ("ID", ID_WIDTH),
            ("Date", DATE_WIDTH),
            ("Time", TIME_WIDTH),
            ("Name", NAME_WIDTH),
        ];

        if options.show_type() {
            columns.push(("Type", TYPE_WIDTH));
        }
        if options.verbosity >= 1 {
            columns.push(("Event Direction", DIRECTION_WIDTH));
        }
        columns.push(("Event", EVENT_WIDTH));
        if options.verbosity >= 1 {
            columns.push(("Event Detail", 0));
        }

        Some(self.join(columns.into_iter().map(|(name, width)| (name.to_string(), width)).collect()))
    }

    /// Whether `record` passes the display filters.
    pub fn is_displayed(&self, record: &SelRecord) -> bool {
        let options = &self.options;
        let id = record.record_id();

        let in_range = |range: Option<(RecordId, RecordId)>| {
            range.map_or(false, |(first, last)| id >= first && id <= last)
        };

        if options.exclude_record_ids.contains(&id) || in_range(options.exclude_record_range) {
            return false;
        }

        if options.record_range.is_some() && !in_range(options.record_range) {
            return false;
        }

        let class = record.record_type_class();
        let is_oem = matches!(
            class,
            RecordTypeClass::TimestampedOem | RecordTypeClass::NonTimestampedOem
        );

        if (options.system_event_only && class != RecordTypeClass::SystemEvent)
            || (options.oem_event_only && !is_oem)
        {
            return false;
        }

        if options.sensor_types.is_empty() && options.exclude_sensor_types.is_empty() {
            return true;
        }

        match record.system_event() {
            Some(event) => {
                let sensor_type = SensorType::from(event.sensor_type);
                (options.sensor_types.is_empty() || options.sensor_types.contains(&sensor_type))
                    && !options.exclude_sensor_types.contains(&sensor_type)
            }
            None => options.sensor_types.is_empty(),
        }
    }

    /// Render one record. Returns `None` for records that are filtered out
    /// or cannot be displayed.
    pub fn render(&self, record: &SelRecord) -> Result<Option<String>, FormatError> {
        if !self.is_displayed(record) {
            return Ok(None);
        }

        if self.options.hex_dump {
            return Ok(Some(hex_dump(record)));
        }

        if record.record_type_class() == RecordTypeClass::Invalid {
            log::warn!("Unknown SEL Record Type: {:X}h", record.record_type());
            return Ok(None);
        }

        if self.options.legacy {
            self.legacy_line(record)
        } else {
            self.line(record).map(Some)
        }
    }

    /// List the SEL through `session`, handing every line to `sink`.
    ///
    /// Returns the number of records shown.
    pub fn run<CON, F>(&self, session: &mut SelSession<'_, CON>, mut sink: F) -> Result<usize, SelError>
    where
        CON: IpmiConnection,
        F: FnMut(&str),
    {
        let mut out = Emitter {
            header: self.header(),
            shown: 0,
            sink: &mut sink,
        };

        if !self.options.record_ids.is_empty() {
            for id in &self.options.record_ids {
                match self.collect(session, *id, *id, None) {
                    Ok(records) => {
                        for line in self.render_all(&records)? {
                            out.emit(line);
                        }
                    }
                    Err(SelError::NotFound { record_id }) => {
                        log::warn!("SEL record {record_id} not found");
                    }
                    Err(e) => return Err(e),
                }
            }
        } else if let Some(count) = self.options.tail {
            let start = session.tail_start(count)?;
            let records = match self.collect(session, start, RecordId::LAST, Some(count)) {
                Err(SelError::NotFound { .. }) if !start.is_first() => {
                    log::debug!("Tail start {start} does not exist, reading from the first record");
                    self.collect(session, RecordId::FIRST, RecordId::LAST, Some(count))?
                }
                result => result?,
            };

            for line in self.render_all(&records)? {
                out.emit(line);
            }
        } else {
            let end = self.options.record_range.map_or(RecordId::LAST, |(_, last)| last);
            let limit = self.options.head.map(usize::from);
            let mut failure = None;

            session.parse(RecordId::FIRST, end, |record| {
                if limit.map_or(false, |limit| out.shown >= limit) {
                    return Visit::Abort;
                }

                match self.render(record) {
                    Ok(Some(line)) => out.emit(line),
                    Ok(None) => {}
                    Err(e) => {
                        failure = Some(e);
                        return Visit::Abort;
                    }
                }

                if limit.map_or(false, |limit| out.shown >= limit) {
                    Visit::Abort
                } else {
                    Visit::Continue
                }
            })?;

            if let Some(e) = failure {
                return Err(e.into());
            }
        }

        if self.options.clear_after_display {
            session.clear()?;
        }

        Ok(out.shown)
    }

    /// The displayed records in `start..=end`, keeping only the last `keep`.
    fn collect<CON>(
        &self,
        session: &mut SelSession<'_, CON>,
        start: RecordId,
        end: RecordId,
        keep: Option<u16>,
    ) -> Result<VecDeque<SelRecord>, SelError>
    where
        CON: IpmiConnection,
    {
        let mut records = VecDeque::new();

        session.parse(start, end, |record| {
            if self.is_displayed(record) {
                records.push_back(record.clone());
                if keep.map_or(false, |keep| records.len() > usize::from(keep)) {
                    records.pop_front();
                }
            }
            Visit::Continue
        })?;

        Ok(records)
    }

    fn render_all(&self, records: &VecDeque<SelRecord>) -> Result<Vec<String>, FormatError> {
        let mut lines = Vec::with_capacity(records.len());
        for record in records {
            if let Some(line) = self.render(record)? {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    fn context<'r>(&'r self, record: &'r SelRecord) -> FormatContext<'r> {
        FormatContext::new(record, &self.format)
            .with_sdr(self.sdr)
            .with_oem(self.oem.as_ref())
    }

    fn field(&self, record: &SelRecord, template: &str) -> Result<String, FormatError> {
        let text = format(&self.context(record), template, OUTPUT_CAPACITY)?.text;

        if text.is_empty() {
            Ok(self.format.na_string.clone())
        } else {
            Ok(text)
        }
    }

    fn join(&self, columns: Vec<(String, usize)>) -> String {
        if self.options.comma_separated {
            return columns
                .into_iter()
                .map(|(text, _)| text)
                .collect::<Vec<_>>()
                .join(",");
        }

        let last = columns.len().saturating_sub(1);
        columns
            .into_iter()
            .enumerate()
            .map(|(idx, (text, width))| {
                if idx == last {
                    text
                } else {
                    format!("{text:<width$}")
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn line(&self, record: &SelRecord) -> Result<String, FormatError> {
        let options = &self.options;
        let mut columns = vec![(self.field(record, "%i")?, ID_WIDTH)];

        match record.record_type_class() {
            RecordTypeClass::SystemEvent => {
                columns.push((self.field(record, "%d")?, DATE_WIDTH));
                columns.push((self.field(record, "%t")?, TIME_WIDTH));
                columns.push((self.field(record, "%s")?, NAME_WIDTH));

                if options.show_type() {
                    columns.push((self.field(record, "%T")?, TYPE_WIDTH));
                }
                if options.verbosity >= 1 {
                    columns.push((self.field(record, "%k")?, DIRECTION_WIDTH));
                }

                columns.push((self.field(record, "%e")?, EVENT_WIDTH));

                if options.verbosity >= 1 {
                    columns.push((self.field(record, "%E")?, 0));
                }
            }
            RecordTypeClass::TimestampedOem => {
                columns.push((self.field(record, "%d")?, DATE_WIDTH));
                columns.push((self.field(record, "%t")?, TIME_WIDTH));
                columns.push((self.field(record, "%m")?, NAME_WIDTH));
                columns.push((self.oem_data(record)?, 0));
            }
            RecordTypeClass::NonTimestampedOem => {
                columns.push((self.oem_data(record)?, 0));
            }
            RecordTypeClass::Invalid => {}
        }

        Ok(self.join(columns))
    }

    /// The text carried by an OEM record if it can be interpreted, the raw
    /// OEM bytes otherwise.
    fn oem_data(&self, record: &SelRecord) -> Result<String, FormatError> {
        if self.options.interpret_oem_data {
            if let Some(text) = self.output(record, "%O")? {
                return Ok(text);
            }
        }

        self.field(record, "%o")
    }

    /// `template` rendered for `record`, or `None` if none of its fields
    /// produced anything.
    fn output(&self, record: &SelRecord, template: &str) -> Result<Option<String>, FormatError> {
        let formatted = format(&self.context(record), template, OUTPUT_CAPACITY)?;
        Ok(formatted.has_output.then_some(formatted.text))
    }

    fn legacy_line(&self, record: &SelRecord) -> Result<Option<String>, FormatError> {
        let template = match record.system_event() {
            Some(event) => {
                let class = event.sensor_class();
                let data = event.event_data();
                let mut template = String::from("%i:%d %t:%T %s:%e");

                let discrete_state = class.is_discrete()
                    && data.data2.flag == EventDataFlag::PreviousStateOrSeverity;

                if data.data2.is_meaningful() && !discrete_state {
                    template.push_str(":%f");
                }
                if data.data3.is_meaningful() {
                    template.push_str(":%h");
                }

                template
            }
            None if record.record_type_class() == RecordTypeClass::TimestampedOem => {
                "%i:%d %t:%m:%o".into()
            }
            None => "%i:%o".into(),
        };

        let line = self.output(record, &template)?;
        if line.is_none() {
            log::debug!("Nothing to show for SEL record {}", record.record_id());
        }

        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        storage::sel::decode,
        tests::{system_event_raw, FakeBmc},
        Ipmi,
    };

    fn event(id: u16) -> SelRecord {
        decode(&system_event_raw(id, 0x30)).unwrap()
    }

    fn timestamped_oem(id: u16) -> SelRecord {
        let [lsb, msb] = id.to_le_bytes();
        decode(&[
            lsb, msb, 0xC5, 0x00, 0x00, 0x00, 0x60, 0xA2, 0x02, 0x00, 0x01, 0x02, 0x03, 0x04,
            0x05, 0x06,
        ])
        .unwrap()
    }

    fn run(options: DisplayOptions, bmc: FakeBmc) -> (Result<usize, SelError>, Vec<String>, FakeBmc) {
        let mut ipmi = Ipmi::new(bmc);
        let mut session = SelSession::new(&mut ipmi);
        let display = SelDisplay::new(options);

        let mut lines = Vec::new();
        let result = display.run(&mut session, |line| lines.push(line.to_string()));
        drop(session);

        (result, lines, ipmi.release())
    }

    #[cfg(feature = "time")]
    #[test]
    fn table_rows() {
        let display = SelDisplay::new(DisplayOptions::default());

        assert_eq!(
            display.header().unwrap(),
            "ID | Date        | Time     | Name             | Event"
        );
        assert_eq!(
            display.render(&event(1)).unwrap().unwrap(),
            "1  | Jan-14-2021 | 08:25:36 | Sensor #48       | Upper Critical - going high"
        );
        assert_eq!(
            display.render(&timestamped_oem(2)).unwrap().unwrap(),
            "2  | Jan-14-2021 | 08:25:36 | Dell Inc.        | OEM defined = 01h 02h 03h 04h 05h 06h"
        );

        let display = SelDisplay::new(DisplayOptions {
            verbosity: 1,
            ..Default::default()
        });
        assert_eq!(
            display.render(&event(1)).unwrap().unwrap(),
            "1  | Jan-14-2021 | 08:25:36 | Sensor #48       | Temperature      | Assertion Event   \
             | Upper Critical - going high          | Reading 4Bh > Threshold 46h"
        );
    }

    #[cfg(feature = "time")]
    #[test]
    fn csv_rows() {
        let display = SelDisplay::new(DisplayOptions {
            comma_separated: true,
            show_sensor_type: true,
            ..Default::default()
        });

        assert_eq!(display.header().unwrap(), "ID,Date,Time,Name,Type,Event");
        assert_eq!(
            display.render(&event(1)).unwrap().unwrap(),
            "1,Jan-14-2021,08:25:36,Sensor #48,Temperature,Upper Critical - going high"
        );
    }

    #[cfg(feature = "time")]
    #[test]
    fn legacy_lines() {
        let display = SelDisplay::new(DisplayOptions {
            legacy: true,
            ..Default::default()
        });

        assert!(display.header().is_none());
        assert_eq!(
            display.render(&event(1)).unwrap().unwrap(),
            "1:01/14/2021 08:25:36:Temperature Sensor #48:Upper Critical - going high:Reading = 4Bh:Threshold = 46h"
        );
        assert_eq!(
            display.render(&timestamped_oem(2)).unwrap().unwrap(),
            "2:01/14/2021 08:25:36:Dell Inc.:OEM defined = 01h 02h 03h 04h 05h 06h"
        );

        // Previous state of a discrete sensor is left out
        let mut raw = system_event_raw(3, 0x30);
        raw[10] = 0x08;
        raw[12] = 0x6F;
        raw[13..16].copy_from_slice(&[0x71, 0x00, 0xFF]);
        assert_eq!(
            display.render(&decode(&raw).unwrap()).unwrap().unwrap(),
            "3:01/14/2021 08:25:36:Power Supply Sensor #48:Power Supply Failure detected"
        );
    }

    #[test]
    fn lines_without_output_are_dropped() {
        let display = SelDisplay::new(DisplayOptions {
            legacy: true,
            ..Default::default()
        });

        // A threshold offset without a state
        let mut raw = system_event_raw(4, 0x30);
        raw[13] = 0x5F;
        let record = decode(&raw).unwrap();

        assert_eq!(display.output(&record, "%e:").unwrap(), None);
        assert_eq!(display.output(&record, "%i:%e").unwrap().as_deref(), Some("4:N/A"));
    }

    #[test]
    fn hex_dump_rows() {
        let display = SelDisplay::new(DisplayOptions {
            hex_dump: true,
            ..Default::default()
        });

        assert!(display.header().is_none());
        assert_eq!(
            display.render(&event(1)).unwrap().unwrap(),
            "RID:[01][00] RT:[02] TS:[00][00][00][60] GID:[20][00] ER:[04] ST:[01] SN:[30] \
             EDIR:[01] ED1: [59] ED2: [4B] ED3: [46]"
        );
    }

    #[test]
    fn filters() {
        let options = DisplayOptions {
            exclude_record_ids: vec![RecordId::new_raw(2)],
            ..Default::default()
        };
        let display = SelDisplay::new(options);
        assert!(display.is_displayed(&event(1)));
        assert!(!display.is_displayed(&event(2)));

        let display = SelDisplay::new(DisplayOptions {
            system_event_only: true,
            ..Default::default()
        });
        assert!(!display.is_displayed(&timestamped_oem(1)));

        let display = SelDisplay::new(DisplayOptions {
            oem_event_only: true,
            ..Default::default()
        });
        assert!(display.is_displayed(&timestamped_oem(1)));
        assert!(!display.is_displayed(&event(1)));

        let display = SelDisplay::new(DisplayOptions {
            sensor_types: vec![SensorType::Fan],
            ..Default::default()
        });
        assert!(!display.is_displayed(&event(1)));
        assert!(!display.is_displayed(&timestamped_oem(1)));

        let display = SelDisplay::new(DisplayOptions {
            exclude_sensor_types: vec![SensorType::Fan],
            exclude_record_range: Some((RecordId::new_raw(5), RecordId::new_raw(7))),
            ..Default::default()
        });
        assert!(display.is_displayed(&event(1)));
        assert!(!display.is_displayed(&event(6)));
        assert_eq!(display.render(&event(6)), Ok(None));
    }

    #[test]
    fn listing() {
        let options = DisplayOptions {
            hex_dump: true,
            ..Default::default()
        };

        let (result, lines, _) = run(options.clone(), FakeBmc::with_events(1..=5));
        assert_eq!(result, Ok(5));
        assert!(lines[0].starts_with("RID:[01][00]"));

        let head = DisplayOptions {
            head: Some(2),
            ..options.clone()
        };
        let (result, lines, _) = run(head, FakeBmc::with_events(1..=5));
        assert_eq!(result, Ok(2));
        assert!(lines[1].starts_with("RID:[02][00]"));

        let tail = DisplayOptions {
            tail: Some(2),
            ..options.clone()
        };
        let (result, lines, _) = run(tail, FakeBmc::with_events(1..=5));
        assert_eq!(result, Ok(2));
        assert!(lines[0].starts_with("RID:[04][00]"));
        assert!(lines[1].starts_with("RID:[05][00]"));

        let ids = DisplayOptions {
            record_ids: vec![RecordId::new_raw(3), RecordId::new_raw(9)],
            ..options.clone()
        };
        let (result, lines, _) = run(ids, FakeBmc::with_events(1..=5));
        assert_eq!(result, Ok(1));
        assert!(lines[0].starts_with("RID:[03][00]"));

        let range = DisplayOptions {
            record_range: Some((RecordId::new_raw(2), RecordId::new_raw(3))),
            clear_after_display: true,
            ..options
        };
        let (result, _, bmc) = run(range, FakeBmc::with_events(1..=5));
        assert_eq!(result, Ok(2));
        assert!(bmc.record_ids().is_empty());
    }

    #[test]
    fn header_comes_first() {
        let (result, lines, _) = run(DisplayOptions::default(), FakeBmc::with_events(1..=2));
        assert_eq!(result, Ok(2));
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID | Date"));

        let (result, lines, _) = run(DisplayOptions::default(), FakeBmc::new());
        assert_eq!(result, Ok(0));
        assert!(lines.is_empty());
    }
}
