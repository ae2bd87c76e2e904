//! System Event Log commands and the SEL record model.
//!
//! Reference: IPMI 2.0 Specification, Section 31 "SEL Device Commands" and
//! Section 32 "SEL Record Formats"

mod clear;
pub use clear::{ClearSel, ClearSelAction, ErasureProgress};

mod delete_entry;
pub use delete_entry::DeleteSelEntry;

mod get_alloc_info;
pub use get_alloc_info::{AllocInfo as SelAllocInfo, GetAllocInfo as SelGetAllocInfo};

mod get_entry;
pub use get_entry::{EntryData as SelEntryData, GetEntry as GetSelEntry};

mod get_info;
pub use get_info::{GetInfo as GetSelInfo, Info as SelInfo, SupportedOperations};

mod reserve;
pub use reserve::ReserveSel;

mod record;
pub use record::{
    decode, decode_with, DecodeOptions, EventDirection, EventGenerator, EventMessageRevision,
    NonTimestampedOemRecord, RecordBody, RecordTypeClass, SelRecord, SystemEventRecord,
    TimestampedOemRecord, SEL_RECORD_LEN,
};

/// The ID of a SEL record.
///
/// `0x0000` and `0xFFFF` are reserved as the "first" and "last"
/// sentinels when addressing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u16);

impl RecordId {
    pub const FIRST: Self = Self(0x0000);
    pub const LAST: Self = Self(0xFFFF);

    /// Create a record ID that addresses a real record.
    ///
    /// Returns `None` for the two sentinel values.
    pub fn new(id: u16) -> Option<Self> {
        if id == Self::FIRST.0 || id == Self::LAST.0 {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn new_raw(id: u16) -> Self {
        RecordId(id)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn is_first(&self) -> bool {
        self == &Self::FIRST
    }

    pub fn is_last(&self) -> bool {
        self == &Self::LAST
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
