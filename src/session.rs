//! Reading, deleting and clearing SEL records over a live connection.
//!
//! A [`SelSession`] owns one SEL reservation. The BMC cancels a reservation
//! whenever someone else reserves, deletes or clears, so a command that fails
//! with "reservation cancelled" is retried once with a fresh reservation. A
//! second cancellation within the same session is handed to the caller.

use std::{collections::HashSet, num::NonZeroU16};

use crate::{
    app::{DeviceId, GetDeviceId},
    connection::{CompletionErrorCode, IpmiCommand, IpmiConnection},
    oem::OemContext,
    storage::sel::{
        decode_with, ClearSel, DecodeOptions, DeleteSelEntry, ErasureProgress, GetSelEntry,
        GetSelInfo, RecordId, ReserveSel, SelAllocInfo, SelEntryData, SelGetAllocInfo, SelInfo,
        SelRecord,
    },
    Ipmi, SelError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    ReservationHeld,
    Iterating,
    Completed,
    Aborted,
}

/// What a visitor wants [`SelSession::parse`] to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    Abort,
}

pub struct SelSession<'ipmi, CON> {
    ipmi: &'ipmi mut Ipmi<CON>,
    /// `None` before reserving, and on BMCs that do not implement Reserve SEL.
    reservation: Option<NonZeroU16>,
    state: SessionState,
    decode_options: DecodeOptions,
    reservation_retried: bool,
}

impl<'ipmi, CON> SelSession<'ipmi, CON>
where
    CON: IpmiConnection,
{
    pub fn new(ipmi: &'ipmi mut Ipmi<CON>) -> Self {
        Self {
            ipmi,
            reservation: None,
            state: SessionState::Idle,
            decode_options: DecodeOptions::default(),
            reservation_retried: false,
        }
    }

    pub fn with_decode_options(mut self, decode_options: DecodeOptions) -> Self {
        self.decode_options = decode_options;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn reservation_id(&self) -> Option<NonZeroU16> {
        self.reservation
    }

    pub fn info(&mut self) -> Result<SelInfo, SelError> {
        self.ipmi
            .send_recv(GetSelInfo)
            .map_err(|e| SelError::from_ipmi("Get SEL Info", 0, e))
    }

    pub fn alloc_info(&mut self) -> Result<SelAllocInfo, SelError> {
        self.ipmi
            .send_recv(SelGetAllocInfo)
            .map_err(|e| SelError::from_ipmi("Get SEL Allocation Info", 0, e))
    }

    pub fn device_id(&mut self) -> Result<DeviceId, SelError> {
        self.ipmi
            .send_recv(GetDeviceId)
            .map_err(|e| SelError::from_ipmi("Get Device ID", 0, e))
    }

    /// The vendor context used to pick OEM interpretations for this BMC.
    pub fn oem_context(&mut self) -> Result<OemContext, SelError> {
        self.device_id().map(|id| OemContext::from(&id))
    }

    /// Obtain a new reservation, replacing the one currently held.
    ///
    /// BMCs that answer with "invalid command" do not support reservations.
    /// Subsequent commands then carry reservation ID `0x0000`.
    pub fn reserve(&mut self) -> Result<Option<NonZeroU16>, SelError> {
        let reservation = match self.ipmi.send_recv(ReserveSel) {
            Ok(id) => Some(id),
            Err(e) if e.completion_code() == Some(CompletionErrorCode::InvalidCommand) => {
                log::debug!("BMC does not support Reserve SEL, continuing without reservation");
                None
            }
            Err(e) => return Err(SelError::from_ipmi("Reserve SEL", 0, e)),
        };

        self.reservation = reservation;
        self.state = SessionState::ReservationHeld;
        Ok(reservation)
    }

    /// Fetch the raw entry stored under `record_id`.
    pub fn get_entry(&mut self, record_id: RecordId) -> Result<SelEntryData, SelError> {
        self.with_reservation("Get SEL Entry", record_id, |reservation| {
            GetSelEntry::new(reservation, record_id)
        })
    }

    /// Visit every record from `start` up to and including `end`.
    ///
    /// Both ends may be [`RecordId::FIRST`] or [`RecordId::LAST`]. Entries
    /// that fail to decode are skipped. Returns the number of records that
    /// were handed to `visitor`.
    pub fn parse<F>(&mut self, start: RecordId, end: RecordId, mut visitor: F) -> Result<usize, SelError>
    where
        F: FnMut(&SelRecord) -> Visit,
    {
        if self.state == SessionState::Idle {
            self.reserve()?;
        }

        self.state = SessionState::Iterating;

        let mut current = start;
        let mut seen = HashSet::new();
        let mut visited = 0;

        loop {
            let entry = match self.get_entry(current) {
                Ok(entry) => entry,
                Err(SelError::NotFound { .. }) if current.is_first() && seen.is_empty() => {
                    log::debug!("SEL is empty");
                    break;
                }
                Err(e @ SelError::NotFound { .. }) => {
                    log::debug!("SEL record {current} does not exist");
                    self.state = SessionState::Aborted;
                    return Err(e);
                }
                Err(e) => {
                    log::error!("Unrecoverable error while reading SEL record {current}: {e}");
                    self.state = SessionState::Aborted;
                    return Err(e);
                }
            };

            let record_id = entry_record_id(&entry).unwrap_or(current);
            seen.insert(record_id);

            // A FIRST end stops after the first record, a LAST end never passes
            let past_end = !end.is_last() && !end.is_first() && record_id > end;

            match decode_with(&entry.data, &self.decode_options) {
                Ok(_) if past_end => break,
                Ok(record) => {
                    visited += 1;
                    if visitor(&record) == Visit::Abort {
                        log::debug!("SEL iteration aborted at record {record_id}");
                        self.state = SessionState::Aborted;
                        return Ok(visited);
                    }
                }
                Err(e) => {
                    let error = SelError::InvalidSelEntry {
                        record_id: record_id.value(),
                    };
                    log::debug!("Recoverable error while parsing SEL record: {error} ({e}). Skipping to next.");
                }
            }

            let next = entry.next_entry;

            if next.is_last() || next.is_first() || end.is_first() || record_id == end || past_end {
                break;
            }

            if seen.contains(&next) {
                log::warn!("SEL record {record_id} points back to record {next}, stopping");
                break;
            }

            current = next;
        }

        self.state = SessionState::Completed;
        Ok(visited)
    }

    /// Delete a single record.
    ///
    /// [`RecordId::FIRST`] and [`RecordId::LAST`] are refused, the BMC would
    /// read them as "the oldest record" and "the newest record".
    pub fn delete(&mut self, record_id: RecordId) -> Result<RecordId, SelError> {
        if record_id.is_first() || record_id.is_last() {
            return Err(SelError::ReservedRecordId {
                record_id: record_id.value(),
            });
        }

        if self.state == SessionState::Idle {
            self.reserve()?;
        }

        self.with_reservation("Delete SEL Entry", record_id, |reservation| {
            DeleteSelEntry::new(reservation, record_id)
        })
    }

    /// Delete every record ID in `first..=last`.
    ///
    /// Record IDs need not be contiguous, so IDs that do not exist are
    /// skipped, as are the FIRST and LAST sentinels. Returns the number of
    /// records that were deleted.
    pub fn delete_range(&mut self, first: RecordId, last: RecordId) -> Result<usize, SelError> {
        let mut deleted = 0;

        let first = first.value().max(RecordId::FIRST.value() + 1);
        let last = last.value().min(RecordId::LAST.value() - 1);

        for id in first..=last {
            match self.delete(RecordId::new_raw(id)) {
                Ok(_) => deleted += 1,
                Err(SelError::NotFound { record_id }) => {
                    log::debug!("SEL record {record_id} does not exist, not deleting it");
                }
                Err(e) => {
                    log::error!("Failed to delete SEL record {id}: {e}");
                    return Err(e);
                }
            }
        }

        Ok(deleted)
    }

    /// Start erasing the whole SEL. Completion is not awaited, see
    /// [`SelSession::clear_status`].
    pub fn clear(&mut self) -> Result<ErasureProgress, SelError> {
        if self.state == SessionState::Idle {
            self.reserve()?;
        }

        self.with_reservation("Clear SEL", RecordId::FIRST, ClearSel::initiate)
    }

    pub fn clear_status(&mut self) -> Result<ErasureProgress, SelError> {
        self.with_reservation("Clear SEL", RecordId::FIRST, ClearSel::get_status)
    }

    /// A record ID to start from so that roughly the last `count` records
    /// are visited.
    ///
    /// Record IDs are not required to be contiguous, so this assumes they are
    /// spread evenly between the first and last record. The result may land
    /// on an ID that does not exist, or visit a few more or fewer records.
    pub fn tail_start(&mut self, count: u16) -> Result<RecordId, SelError> {
        let entries = u32::from(self.info()?.entries);
        let count = u32::from(count.max(1));

        if entries <= count {
            return Ok(RecordId::FIRST);
        }

        let first = self.record_id_at(RecordId::FIRST)?;
        let last = self.record_id_at(RecordId::LAST)?;

        let (first, last) = (u32::from(first.value()), u32::from(last.value()));
        let range = (last + 1).saturating_sub(first);

        let span = if range < entries {
            count
        } else {
            count * (range / entries)
        };

        if span + 1 >= last {
            Ok(RecordId::FIRST)
        } else {
            // span + 1 < last, so this fits
            Ok(RecordId::new_raw((last - span + 1) as u16))
        }
    }

    fn record_id_at(&mut self, record_id: RecordId) -> Result<RecordId, SelError> {
        let entry = self.get_entry(record_id)?;
        entry_record_id(&entry).ok_or_else(|| SelError::BadResponse {
            command: "Get SEL Entry",
            detail: format!("{} byte record", entry.data.len()),
        })
    }

    fn with_reservation<CMD, F>(
        &mut self,
        command: &'static str,
        record_id: RecordId,
        make: F,
    ) -> Result<CMD::Output, SelError>
    where
        CMD: IpmiCommand,
        CMD::Error: core::fmt::Debug,
        F: Fn(Option<NonZeroU16>) -> CMD,
    {
        let result = self
            .ipmi
            .send_recv(make(self.reservation))
            .map_err(|e| SelError::from_ipmi(command, record_id.value(), e));

        match result {
            Err(SelError::ReservationCancelled) if !self.reservation_retried => {
                log::warn!("SEL reservation cancelled during {command} (record {record_id}), reserving again");
                self.reservation_retried = true;

                let state = self.state;
                self.reserve()?;
                if state == SessionState::Iterating {
                    self.state = state;
                }

                self.ipmi
                    .send_recv(make(self.reservation))
                    .map_err(|e| SelError::from_ipmi(command, record_id.value(), e))
            }
            result => result,
        }
    }
}

fn entry_record_id(entry: &SelEntryData) -> Option<RecordId> {
    match entry.data.get(0..2) {
        Some(&[lsb, msb]) => Some(RecordId::new_raw(u16::from_le_bytes([lsb, msb]))),
        _ => None,
    }
}
