//! Get Device ID Command
//!
//! Reference: IPMI 2.0 Specification, Section 20.1 "Get Device ID Command"

use crate::{
    connection::{IpmiCommand, Message, NetFn, NotEnoughData},
    log_vec, Loggable,
};

use super::manufacturer_name;

pub struct GetDeviceId;

impl From<GetDeviceId> for Message {
    fn from(_: GetDeviceId) -> Self {
        Message::new_request(NetFn::App, 0x01, Vec::new())
    }
}

impl IpmiCommand for GetDeviceId {
    type Output = DeviceId;
    type Error = NotEnoughData;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        DeviceId::from_data(data).ok_or(NotEnoughData)
    }
}

bitflags::bitflags! {
    /// The "Additional Device Support" byte.
    pub struct DeviceSupport: u8 {
        const CHASSIS = 0x80;
        const BRIDGE = 0x40;
        const IPMB_EVENT_GENERATOR = 0x20;
        const IPMB_EVENT_RECEIVER = 0x10;
        const FRU_INVENTORY = 0x08;
        const SEL = 0x04;
        const SDR_REPOSITORY = 0x02;
        const SENSOR = 0x01;
    }
}

/// The identity of a BMC.
///
/// Only the manufacturer, product and IPMI version are needed to pick
/// vendor specific SEL interpretations; the remaining fields are kept
/// for display.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceId {
    pub device_id: u8,
    pub device_revision: u8,
    pub provides_device_sdrs: bool,
    /// `false` while the device is in firmware update, SDR repository update
    /// or self-initialization state.
    pub device_available: bool,
    pub major_fw_revision: u8,
    /// Decoded from BCD.
    pub minor_fw_revision: u8,
    pub ipmi_version_major: u8,
    pub ipmi_version_minor: u8,
    pub support: DeviceSupport,
    /// 20 bit IANA enterprise number.
    pub manufacturer_id: u32,
    pub product_id: u16,
    pub aux_revision: Option<[u8; 4]>,
}

impl DeviceId {
    pub fn from_data(data: &[u8]) -> Option<Self> {
        if data.len() < 11 {
            return None;
        }

        let aux_revision = data.get(11..15).map(|aux| [aux[0], aux[1], aux[2], aux[3]]);

        let minor_fw_revision = (data[3] & 0xF) + ((data[3] >> 4) & 0xF) * 10;

        Some(Self {
            device_id: data[0],
            device_revision: data[1] & 0xF,
            provides_device_sdrs: (data[1] & 0x80) == 0x80,
            device_available: (data[2] & 0x80) != 0x80,
            major_fw_revision: data[2] & 0x7F,
            minor_fw_revision,
            ipmi_version_major: data[4] & 0xF,
            ipmi_version_minor: (data[4] >> 4) & 0xF,
            support: DeviceSupport::from_bits_truncate(data[5]),
            manufacturer_id: u32::from_le_bytes([data[6], data[7], data[8] & 0x0F, 0]),
            product_id: u16::from_le_bytes([data[9], data[10]]),
            aux_revision,
        })
    }
}

impl Loggable for DeviceId {
    fn as_log(&self) -> Vec<crate::LogItem> {
        let manufacturer = match manufacturer_name(self.manufacturer_id) {
            Some(name) => format!("{name} ({})", self.manufacturer_id),
            None => format!("{}", self.manufacturer_id),
        };

        let mut log = log_vec![
            (0, "Device ID information"),
            (1, "Device ID", format!("0x{:02X}", self.device_id)),
            (1, "Device revision", self.device_revision),
            (1, "Firmware revision", format!("{}.{:02}", self.major_fw_revision, self.minor_fw_revision)),
            (1, "IPMI version", format!("{}.{}", self.ipmi_version_major, self.ipmi_version_minor)),
            (1, "Manufacturer ID", manufacturer),
            (1, "Product ID", format!("0x{:04X}", self.product_id)),
            (1, "Device available", self.device_available),
            (1, "SEL device", self.support.contains(DeviceSupport::SEL)),
            (1, "SDR repository", self.support.contains(DeviceSupport::SDR_REPOSITORY)),
        ];

        if let Some(aux) = &self.aux_revision {
            log.push((1, "Auxiliary revision", format!("{aux:02X?}")).into());
        }

        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dell_device_id() {
        let data = [
            0x20, 0x81, 0x02, 0x15, 0x02, 0xBF, 0xA2, 0x02, 0x00, 0x00, 0x01,
        ];
        let id = DeviceId::from_data(&data).unwrap();

        assert_eq!(id.device_id, 0x20);
        assert!(id.provides_device_sdrs);
        assert!(id.device_available);
        assert_eq!((id.major_fw_revision, id.minor_fw_revision), (2, 15));
        assert_eq!((id.ipmi_version_major, id.ipmi_version_minor), (2, 0));
        assert!(id.support.contains(DeviceSupport::SEL | DeviceSupport::CHASSIS));
        assert_eq!(id.manufacturer_id, 674);
        assert_eq!(id.product_id, 0x0100);
        assert_eq!(id.aux_revision, None);

        let lines = crate::Logger::render(&id.as_log());
        assert!(lines.contains(&"  Manufacturer ID:   Dell Inc. (674)".to_string()));
    }

    #[test]
    fn short_response() {
        assert_eq!(GetDeviceId::parse_success_response(&[0x20; 10]), Err(NotEnoughData));
    }
}
