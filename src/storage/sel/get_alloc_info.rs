//! Get SEL Allocation Info Command
//!
//! Reference: IPMI 2.0 Specification, Section 31.3 "Get SEL Allocation Info Command"

use std::num::NonZeroU16;

use crate::{
    connection::{IpmiCommand, Message, NetFn, NotEnoughData},
    log_vec, Loggable,
};

pub struct GetAllocInfo;

impl IpmiCommand for GetAllocInfo {
    type Output = AllocInfo;
    type Error = NotEnoughData;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        AllocInfo::parse(data).ok_or(NotEnoughData)
    }
}

impl From<GetAllocInfo> for Message {
    fn from(_: GetAllocInfo) -> Self {
        Message::new_request(NetFn::Storage, 0x41, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocInfo {
    pub num_alloc_units: Option<NonZeroU16>,
    pub alloc_unit_size: Option<NonZeroU16>,
    pub num_free_units: u16,
    pub largest_free_blk: u16,
    pub max_record_size: u8,
}

impl AllocInfo {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 9 {
            return None;
        }

        Some(Self {
            num_alloc_units: NonZeroU16::new(u16::from_le_bytes([data[0], data[1]])),
            alloc_unit_size: NonZeroU16::new(u16::from_le_bytes([data[2], data[3]])),
            num_free_units: u16::from_le_bytes([data[4], data[5]]),
            largest_free_blk: u16::from_le_bytes([data[6], data[7]]),
            max_record_size: data[8],
        })
    }
}

impl Loggable for AllocInfo {
    fn as_log(&self) -> Vec<crate::LogItem> {
        let unspecified_if_zero = |v: Option<NonZeroU16>| match v {
            Some(v) => v.get().to_string(),
            None => "Unspecified".into(),
        };

        log_vec![
            (0, "SEL Allocation Information"),
            (1, "# of units", unspecified_if_zero(self.num_alloc_units)),
            (1, "Unit size", unspecified_if_zero(self.alloc_unit_size)),
            (1, "# free units", self.num_free_units),
            (1, "Largest free block", self.largest_free_blk),
            (1, "Max record size", self.max_record_size),
        ]
    }
}

#[test]
fn alloc_info_needs_nine_bytes() {
    let data = [0x00, 0x02, 0x10, 0x00, 0x80, 0x01, 0x40, 0x00, 0x10];
    let info = AllocInfo::parse(&data).unwrap();

    assert_eq!(info.num_alloc_units, NonZeroU16::new(0x200));
    assert_eq!(info.alloc_unit_size, NonZeroU16::new(16));
    assert_eq!(info.num_free_units, 0x180);
    assert_eq!(info.largest_free_blk, 0x40);
    assert_eq!(info.max_record_size, 16);

    assert!(AllocInfo::parse(&data[..8]).is_none());
}
