//! Get SEL Info Command
//!
//! Reference: IPMI 2.0 Specification, Section 31.2 "Get SEL Info Command"

use crate::{
    connection::{IpmiCommand, Message, NetFn, NotEnoughData},
    log_vec,
    storage::Timestamp,
    Loggable,
};

pub struct GetInfo;

impl IpmiCommand for GetInfo {
    type Output = Info;
    type Error = NotEnoughData;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        Info::from_data(data).ok_or(NotEnoughData)
    }
}

impl From<GetInfo> for Message {
    fn from(_: GetInfo) -> Self {
        Message::new_request(NetFn::Storage, 0x40, Vec::new())
    }
}

bitflags::bitflags! {
    /// The operation support byte of the SEL info response.
    pub struct SupportedOperations: u8 {
        const DELETE = 0x08;
        const PARTIAL_ADD = 0x04;
        const RESERVE = 0x02;
        const GET_ALLOC_INFO = 0x01;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    pub version_maj: u8,
    pub version_min: u8,
    pub entries: u16,
    pub bytes_free: u16,
    pub last_add_time: Timestamp,
    pub last_del_time: Timestamp,
    pub overflow: bool,
    pub supported_ops: SupportedOperations,
}

impl Info {
    pub fn from_data(data: &[u8]) -> Option<Self> {
        if data.len() < 14 {
            return None;
        }

        let version_maj = data[0] & 0xF;
        let version_min = (data[0] >> 4) & 0xF;

        let entries = u16::from_le_bytes([data[1], data[2]]);
        let bytes_free = u16::from_le_bytes([data[3], data[4]]);

        let last_add_time = u32::from_le_bytes([data[5], data[6], data[7], data[8]]);
        let last_del_time = u32::from_le_bytes([data[9], data[10], data[11], data[12]]);

        Some(Info {
            version_maj,
            version_min,
            entries,
            bytes_free,
            last_add_time: Timestamp::from(last_add_time),
            last_del_time: Timestamp::from(last_del_time),
            overflow: data[13] & 0x80 == 0x80,
            supported_ops: SupportedOperations::from_bits_truncate(data[13]),
        })
    }

    /// Render the info block, with timestamps shifted by `utc_offset_seconds`.
    pub fn as_log_with_offset(&self, utc_offset_seconds: i32) -> Vec<crate::LogItem> {
        let supported = [
            (SupportedOperations::DELETE, "Delete"),
            (SupportedOperations::PARTIAL_ADD, "Partial Add"),
            (SupportedOperations::RESERVE, "Reserve"),
            (SupportedOperations::GET_ALLOC_INFO, "Get Allocation Info"),
        ]
        .iter()
        .filter(|(op, _)| self.supported_ops.contains(*op))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" ");

        let time = |ts: Timestamp| {
            if ts.is_unspecified() {
                "N/A".to_string()
            } else {
                ts.long_string(utc_offset_seconds)
            }
        };

        log_vec![
            (0, "SEL information"),
            (1, "Version", format!("{}.{}", self.version_maj, self.version_min)),
            (1, "Number of Entries", self.entries),
            (1, "Free Space Remaining", format!("{} bytes", self.bytes_free)),
            (1, "Last Add Time", time(self.last_add_time)),
            (1, "Last Erase Time", time(self.last_del_time)),
            (1, "Overflow", self.overflow),
            (1, "Supported Operations", supported),
        ]
    }
}

impl Loggable for Info {
    fn as_log(&self) -> Vec<crate::LogItem> {
        self.as_log_with_offset(0)
    }
}
