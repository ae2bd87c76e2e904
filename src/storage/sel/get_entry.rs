//! Get SEL Entry Command
//!
//! Reference: IPMI 2.0 Specification, Section 31.5 "Get SEL Entry Command"

use std::num::NonZeroU16;

use nonmax::NonMaxU8;

use crate::connection::{IpmiCommand, Message, NetFn, NotEnoughData};

use super::{RecordId, SEL_RECORD_LEN};

#[derive(Clone, Debug, PartialEq)]
pub struct GetEntry {
    reservation_id: Option<NonZeroU16>,
    record_id: RecordId,
    offset: u8,
    bytes_to_read: Option<NonMaxU8>,
}

impl GetEntry {
    pub fn new(reservation_id: Option<NonZeroU16>, record_id: RecordId) -> Self {
        Self {
            reservation_id,
            record_id,
            // Always read the entire record
            offset: 0,
            bytes_to_read: None,
        }
    }
}

/// The undecoded response to a [`GetEntry`].
///
/// Decoding is left to the caller, so that a malformed record does not
/// hide the ID of the record that follows it.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryData {
    pub next_entry: RecordId,
    pub data: Vec<u8>,
}

impl IpmiCommand for GetEntry {
    type Output = EntryData;
    type Error = NotEnoughData;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        if data.len() < 2 {
            return Err(NotEnoughData);
        }

        let next_entry = RecordId::new_raw(u16::from_le_bytes([data[0], data[1]]));
        let data = data[2..].iter().take(SEL_RECORD_LEN + 1).copied().collect();

        Ok(EntryData { next_entry, data })
    }
}

impl From<GetEntry> for Message {
    fn from(value: GetEntry) -> Self {
        let GetEntry {
            reservation_id,
            record_id,
            offset,
            bytes_to_read,
        } = value;

        let mut data = vec![0u8; 6];

        data[0..2].copy_from_slice(&reservation_id.map(|v| v.get()).unwrap_or(0).to_le_bytes());
        data[2..4].copy_from_slice(&record_id.value().to_le_bytes());
        data[4] = offset;
        data[5] = bytes_to_read.map(|v| v.get()).unwrap_or(0xFF);

        Message::new_request(NetFn::Storage, 0x43, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_little_endian() {
        let message: Message = GetEntry::new(NonZeroU16::new(0x1234), RecordId::LAST).into();

        assert_eq!(message.netfn(), NetFn::Storage);
        assert_eq!(message.cmd(), 0x43);
        assert_eq!(message.data(), &[0x34, 0x12, 0xFF, 0xFF, 0x00, 0xFF]);
    }

    #[test]
    fn response_carries_next_id() {
        let mut response = vec![0x05, 0x00];
        response.extend_from_slice(&[0xAA; 16]);

        let entry = GetEntry::parse_success_response(&response).unwrap();
        assert_eq!(entry.next_entry, RecordId::new_raw(5));
        assert_eq!(entry.data, vec![0xAA; 16]);

        assert_eq!(GetEntry::parse_success_response(&[0x05]), Err(NotEnoughData));
    }
}
