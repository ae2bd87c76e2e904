use crate::{
    connection::IpmiConnection,
    error::FormatError,
    format::{format, FormatContext, FormatFlags, FormatOptions},
    oem::OemContext,
    session::{SelSession, Visit},
    storage::{
        sdr::SdrLookup,
        sel::{RecordId, RecordTypeClass, SelRecord},
    },
    SelError,
};

use super::OUTPUT_CAPACITY;

/// Templates used to turn SEL records into log messages.
#[derive(Debug, Clone, PartialEq)]
pub struct SyslogOptions {
    pub system_event_template: String,
    pub timestamped_oem_template: String,
    pub non_timestamped_oem_template: String,
    pub format: FormatOptions,
}

impl Default for SyslogOptions {
    fn default() -> Self {
        Self {
            system_event_template: "SEL System Event: %s, %I, %E".into(),
            timestamped_oem_template: "SEL OEM Event: %I, %o".into(),
            non_timestamped_oem_template: "SEL OEM Event: %I, %o".into(),
            format: FormatOptions::new(
                FormatFlags::IGNORE_UNAVAILABLE
                    | FormatFlags::OUTPUT_NOT_AVAILABLE
                    | FormatFlags::DATE_MONTH_STRING,
            ),
        }
    }
}

/// Turns new SEL records into one log message each.
///
/// The forwarder remembers the last record it has seen, so repeated calls to
/// [`SyslogForwarder::forward`] only produce messages for records added in
/// between.
pub struct SyslogForwarder<'a> {
    options: SyslogOptions,
    sdr: &'a dyn SdrLookup,
    oem: Option<OemContext>,
    last_record_id: Option<RecordId>,
}

impl<'a> SyslogForwarder<'a> {
    pub fn new(options: SyslogOptions) -> Self {
        Self {
            options,
            sdr: &(),
            oem: None,
            last_record_id: None,
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

    /// Resume after `record_id`, e.g. from state persisted by a previous run.
    pub fn with_last_record_id(mut self, record_id: RecordId) -> Self {
        self.last_record_id = Some(record_id);
        self
    }

    pub fn last_record_id(&self) -> Option<RecordId> {
        self.last_record_id
    }

    /// The log message for `record`.
    ///
    /// Returns `None` if the template produced nothing but literal text and
    /// placeholders, and for records of an unknown type.
    pub fn message(&self, record: &SelRecord) -> Result<Option<String>, FormatError> {
        let template = match record.record_type_class() {
            RecordTypeClass::SystemEvent => &self.options.system_event_template,
            RecordTypeClass::TimestampedOem => &self.options.timestamped_oem_template,
            RecordTypeClass::NonTimestampedOem => &self.options.non_timestamped_oem_template,
            RecordTypeClass::Invalid => {
                log::debug!("Not logging SEL record {} of unknown type {:02X}h", record.record_id(), record.record_type());
                return Ok(None);
            }
        };

        let ctx = FormatContext::new(record, &self.options.format)
            .with_sdr(self.sdr)
            .with_oem(self.oem.as_ref());

        let formatted = format(&ctx, template, OUTPUT_CAPACITY)?;

        if formatted.truncated {
            log::debug!("Log message for SEL record {} was truncated", record.record_id());
        }

        Ok(formatted.has_output.then_some(formatted.text))
    }

    /// Hand a message for every record added since the previous call to `sink`.
    ///
    /// If the last seen record has disappeared, the SEL was cleared and all
    /// records are forwarded again. Returns the number of messages produced.
    pub fn forward<CON, F>(&mut self, session: &mut SelSession<'_, CON>, mut sink: F) -> Result<usize, SelError>
    where
        CON: IpmiConnection,
        F: FnMut(&str),
    {
        let start = self.last_record_id.unwrap_or(RecordId::FIRST);

        match self.forward_from(session, start, &mut sink) {
            Err(SelError::NotFound { record_id }) if !start.is_first() => {
                log::info!("SEL record {record_id} is gone, assuming the SEL was cleared");
                self.last_record_id = None;
                self.forward_from(session, RecordId::FIRST, &mut sink)
            }
            result => result,
        }
    }

    fn forward_from<CON>(
        &mut self,
        session: &mut SelSession<'_, CON>,
        start: RecordId,
        sink: &mut dyn FnMut(&str),
    ) -> Result<usize, SelError>
    where
        CON: IpmiConnection,
    {
        let previous = self.last_record_id;
        let mut last = previous;
        let mut sent = 0;

        let result = session.parse(start, RecordId::LAST, |record| {
            let id = record.record_id();
            if Some(id) == previous {
                return Visit::Continue;
            }
            last = Some(id);

            match self.message(record) {
                Ok(Some(message)) => {
                    sink(&message);
                    sent += 1;
                }
                Ok(None) => {}
                Err(e) => log::warn!("Cannot format SEL record {id}: {e}"),
            }

            Visit::Continue
        });

        self.last_record_id = last;
        result.map(|_| sent)
    }
}
