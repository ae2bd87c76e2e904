//! Delete SEL Entry Command
//!
//! Reference: IPMI 2.0 Specification, Section 31.8 "Delete SEL Entry Command"

use std::num::NonZeroU16;

use crate::connection::{IpmiCommand, Message, NetFn, NotEnoughData};

use super::RecordId;

#[derive(Clone, Debug, PartialEq)]
pub struct DeleteSelEntry {
    reservation_id: Option<NonZeroU16>,
    record_id: RecordId,
}

impl DeleteSelEntry {
    pub fn new(reservation_id: Option<NonZeroU16>, record_id: RecordId) -> Self {
        Self {
            reservation_id,
            record_id,
        }
    }
}

impl IpmiCommand for DeleteSelEntry {
    /// The ID of the record that was deleted.
    type Output = RecordId;
    type Error = NotEnoughData;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        if data.len() < 2 {
            return Err(NotEnoughData);
        }

        Ok(RecordId::new_raw(u16::from_le_bytes([data[0], data[1]])))
    }
}

impl From<DeleteSelEntry> for Message {
    fn from(value: DeleteSelEntry) -> Self {
        let mut data = vec![0u8; 4];

        data[0..2].copy_from_slice(&value.reservation_id.map_or(0, |v| v.get()).to_le_bytes());
        data[2..4].copy_from_slice(&value.record_id.value().to_le_bytes());

        Message::new_request(NetFn::Storage, 0x46, data)
    }
}

#[test]
fn delete_request_layout() {
    let message: Message =
        DeleteSelEntry::new(NonZeroU16::new(0xBEEF), RecordId::new_raw(0x0007)).into();

    assert_eq!(message.cmd(), 0x46);
    assert_eq!(message.data(), &[0xEF, 0xBE, 0x07, 0x00]);
    assert_eq!(
        DeleteSelEntry::parse_success_response(&[0x07, 0x00]),
        Ok(RecordId::new_raw(7))
    );
}
