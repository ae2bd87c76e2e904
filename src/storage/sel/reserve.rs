//! Reserve SEL Command
//!
//! Reference: IPMI 2.0 Specification, Section 31.4 "Reserve SEL Command"

use std::num::NonZeroU16;

use crate::connection::{IpmiCommand, Message, NetFn, NotEnoughData};

/// Reserve SEL command.
///
/// Sets the present owner of the SEL. Any later reservation, SEL clear or
/// record deletion by another party cancels the reservation, and commands
/// carrying the stale ID fail with completion code `0xC5`.
pub struct ReserveSel;

impl IpmiCommand for ReserveSel {
    type Output = NonZeroU16;
    type Error = NotEnoughData;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        if data.len() < 2 {
            return Err(NotEnoughData);
        }

        // A reservation ID of 0 is never handed out.
        NonZeroU16::new(u16::from_le_bytes([data[0], data[1]])).ok_or(NotEnoughData)
    }
}

impl From<ReserveSel> for Message {
    fn from(_: ReserveSel) -> Self {
        Message::new_request(NetFn::Storage, 0x42, Vec::new())
    }
}

#[test]
fn parse_reservation() {
    assert_eq!(
        ReserveSel::parse_success_response(&[0x34, 0x12]),
        Ok(NonZeroU16::new(0x1234).unwrap())
    );
    assert_eq!(ReserveSel::parse_success_response(&[0, 0]), Err(NotEnoughData));
    assert_eq!(ReserveSel::parse_success_response(&[1]), Err(NotEnoughData));
}
