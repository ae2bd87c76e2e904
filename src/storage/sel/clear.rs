//! Clear SEL Command
//!
//! Reference: IPMI 2.0 Specification, Section 31.9 "Clear SEL Command"

use std::num::NonZeroU16;

use crate::connection::{IpmiCommand, Message, NetFn, NotEnoughData};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearSelAction {
    /// Initiate erase (`0xAA`)
    InitiateErase,
    /// Get erasure status (`0x00`)
    GetStatus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErasureProgress {
    InProgress,
    Completed,
}

/// Clear SEL command.
///
/// Clearing is two-step: `initiate` starts the erase, after which
/// `get_status` may be polled until it reports [`ErasureProgress::Completed`].
/// BMCs that do not support reservations accept a reservation ID of `0x0000`.
pub struct ClearSel {
    reservation_id: Option<NonZeroU16>,
    action: ClearSelAction,
}

impl ClearSel {
    pub fn initiate(reservation_id: Option<NonZeroU16>) -> Self {
        Self {
            reservation_id,
            action: ClearSelAction::InitiateErase,
        }
    }

    pub fn get_status(reservation_id: Option<NonZeroU16>) -> Self {
        Self {
            reservation_id,
            action: ClearSelAction::GetStatus,
        }
    }

    pub fn action(&self) -> ClearSelAction {
        self.action
    }
}

impl IpmiCommand for ClearSel {
    type Output = ErasureProgress;
    type Error = NotEnoughData;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        let progress = data.first().ok_or(NotEnoughData)?;

        Ok(if progress & 0x0F == 0x01 {
            ErasureProgress::Completed
        } else {
            ErasureProgress::InProgress
        })
    }
}

impl From<ClearSel> for Message {
    fn from(value: ClearSel) -> Self {
        let action = match value.action {
            ClearSelAction::InitiateErase => 0xAA,
            ClearSelAction::GetStatus => 0x00,
        };

        let mut data = Vec::with_capacity(6);
        data.extend_from_slice(&value.reservation_id.map_or(0, |id| id.get()).to_le_bytes());
        data.extend_from_slice(b"CLR");
        data.push(action);

        Message::new_request(NetFn::Storage, 0x47, data)
    }
}

#[test]
fn clear_request_layout() {
    let message: Message = ClearSel::initiate(NonZeroU16::new(0x0102)).into();

    assert_eq!(message.netfn(), NetFn::Storage);
    assert_eq!(message.cmd(), 0x47);
    assert_eq!(message.data(), &[0x02, 0x01, b'C', b'L', b'R', 0xAA]);

    let message: Message = ClearSel::get_status(None).into();
    assert_eq!(message.data(), &[0x00, 0x00, b'C', b'L', b'R', 0x00]);

    assert_eq!(
        ClearSel::parse_success_response(&[0x01]),
        Ok(ErasureProgress::Completed)
    );
    assert_eq!(
        ClearSel::parse_success_response(&[0x00]),
        Ok(ErasureProgress::InProgress)
    );
}
