//! Vendor specific interpretation of system event data.
//!
//! Vendors pack their own meaning into event data 2 and 3 for some sensors.
//! Rendering those bytes with the generic two field layout produces nonsense,
//! so the rules in this module substitute a template and the text for the
//! affected directives.
//!
//! Rules are evaluated in order and the first match wins. A record that
//! matches no rule is rendered with the generic layout.

use crate::{
    app::DeviceId,
    storage::{
        sdr::EventData,
        sel::{SelRecord, SystemEventRecord},
    },
};

mod dell;
mod fujitsu;
mod intel;
mod inventec;

pub use fujitsu::{decode_oem_text, OemText};

/// What is known about the BMC that wrote the SEL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OemContext {
    pub manufacturer_id: u32,
    pub product_id: u16,
    pub ipmi_version_major: u8,
    pub ipmi_version_minor: u8,
}

impl OemContext {
    pub fn new(manufacturer_id: u32, product_id: u16) -> Self {
        Self {
            manufacturer_id,
            product_id,
            ipmi_version_major: 2,
            ipmi_version_minor: 0,
        }
    }

    pub fn with_ipmi_version(mut self, major: u8, minor: u8) -> Self {
        self.ipmi_version_major = major;
        self.ipmi_version_minor = minor;
        self
    }

    pub fn is_ipmi_2_0(&self) -> bool {
        self.ipmi_version_major == 2 && self.ipmi_version_minor == 0
    }
}

impl From<&DeviceId> for OemContext {
    fn from(value: &DeviceId) -> Self {
        Self {
            manufacturer_id: value.manufacturer_id,
            product_id: value.product_id,
            ipmi_version_major: value.ipmi_version_major,
            ipmi_version_minor: value.ipmi_version_minor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Dell,
    Fujitsu,
    Intel,
    Inventec,
}

/// How a matching rule renders event data 2 and 3.
#[derive(Clone, Copy)]
pub(crate) enum OemRender {
    /// Both bytes form a single value, rendered by `%c`.
    Combined(fn(&SystemEventRecord) -> Option<String>),
    /// Both bytes carry vendor defined values, rendered by `%f` and `%h`.
    Separate {
        data2: fn(u8) -> String,
        data3: fn(u8) -> String,
    },
}

/// The signature of a vendor specific event.
pub struct OemRule {
    pub vendor: Vendor,
    pub description: &'static str,
    guard: fn(&OemContext, &SystemEventRecord, &EventData) -> bool,
    render: OemRender,
}

impl OemRule {
    pub fn matches(&self, ctx: &OemContext, event: &SystemEventRecord, data: &EventData) -> bool {
        (self.guard)(ctx, event, data)
    }

    /// Whether event data 2 and 3 are rendered as one value.
    pub fn is_combined(&self) -> bool {
        matches!(self.render, OemRender::Combined(_))
    }

    /// The event detail template to use for a matching record.
    pub fn template(&self) -> &'static str {
        match self.render {
            OemRender::Combined(_) => "%c",
            OemRender::Separate { .. } => "%f ; %h",
        }
    }
}

impl core::fmt::Debug for OemRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OemRule")
            .field("vendor", &self.vendor)
            .field("description", &self.description)
            .finish()
    }
}

static RULES: &[OemRule] = &[
    inventec::BIOS_VERSION,
    inventec::POST_ERROR_CODE,
    dell::LINK_TUNING_DIAGNOSTIC,
    dell::MEMORY_LOCATION,
    dell::PCI_LOCATION,
    dell::HARDWARE_INCOMPATIBILITY,
    dell::OPTION_ROM_LINK_TUNING,
    dell::FIRMWARE_INCOMPATIBILITY,
    dell::POWER_SUPPLY_RATING,
    fujitsu::MEMORY_LOCATION,
    fujitsu::PROCESSOR_LOCATION,
    intel::ME_FIRMWARE_HEALTH,
    intel::MEMORY_THROTTLING,
    intel::MEMORY_ERROR_LOCATION,
    intel::PCI_ERROR_LOCATION,
];

/// All rules, in evaluation order.
pub fn rules() -> &'static [OemRule] {
    RULES
}

/// The first rule that matches `record`, if any.
pub fn matching_rule(ctx: &OemContext, record: &SelRecord) -> Option<&'static OemRule> {
    let event = record.system_event()?;
    let data = event.event_data();

    let rule = RULES.iter().find(|rule| rule.matches(ctx, event, &data))?;

    log::trace!(
        "Record {} matches OEM rule {:?} ({})",
        record.record_id(),
        rule.vendor,
        rule.description
    );

    Some(rule)
}

/// The event detail template a vendor specific rule substitutes for `record`.
pub fn oem_override(ctx: &OemContext, record: &SelRecord) -> Option<&'static str> {
    matching_rule(ctx, record).map(OemRule::template)
}

/// The combined text of event data 2 and 3, if a rule defines one for `record`.
pub fn combined_text(ctx: &OemContext, record: &SelRecord) -> Option<String> {
    match matching_rule(ctx, record)?.render {
        OemRender::Combined(render) => render(record.system_event()?),
        OemRender::Separate { .. } => None,
    }
}

/// The vendor specific text of event data 2, if a rule defines one for `record`.
pub fn data2_text(ctx: &OemContext, record: &SelRecord) -> Option<String> {
    match matching_rule(ctx, record)?.render {
        OemRender::Separate { data2, .. } => Some(data2(record.system_event()?.event_data[1])),
        OemRender::Combined(_) => None,
    }
}

/// The vendor specific text of event data 3, if a rule defines one for `record`.
pub fn data3_text(ctx: &OemContext, record: &SelRecord) -> Option<String> {
    match matching_rule(ctx, record)?.render {
        OemRender::Separate { data3, .. } => Some(data3(record.system_event()?.event_data[2])),
        OemRender::Combined(_) => None,
    }
}

/// Text carried by an OEM record, for the `%O` directive.
pub fn oem_record_text(ctx: Option<&OemContext>, record: &SelRecord) -> Option<String> {
    let manufacturer_id = record
        .manufacturer_id()
        .or_else(|| ctx.map(|ctx| ctx.manufacturer_id))?;

    if !fujitsu::is_fujitsu(manufacturer_id) {
        return None;
    }

    match decode_oem_text(record.oem_defined()?) {
        OemText::Text(text) | OemText::EndOfMessage(text) if !text.is_empty() => Some(text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sel::decode;

    pub(super) fn system_event(
        generator: u8,
        sensor_type: u8,
        sensor_number: u8,
        event_type: u8,
        data: [u8; 3],
    ) -> SelRecord {
        decode(&[
            0x10,
            0x00,
            0x02,
            0x00,
            0x00,
            0x00,
            0x50,
            generator,
            0x00,
            0x04,
            sensor_type,
            sensor_number,
            event_type,
            data[0],
            data[1],
            data[2],
        ])
        .unwrap()
    }

    #[test]
    fn rules_need_matching_vendor() {
        let dell = OemContext::new(674, dell::PRODUCT_ID_POWEREDGE);
        let other = OemContext::new(343, dell::PRODUCT_ID_POWEREDGE);

        // Power supply configuration error, rating mismatch, OEM codes in data 2 and 3
        let record = system_event(0x20, 0x08, 0x50, 0x6F, [0xA6, 0x4B, 0x03]);

        assert_eq!(oem_override(&dell, &record), Some("%c"));
        assert_eq!(oem_override(&other, &record), None);
        assert_eq!(
            matching_rule(&dell, &record).map(|r| r.vendor),
            Some(Vendor::Dell)
        );
    }

    #[test]
    fn unmatched_records_fall_through() {
        let dell = OemContext::new(674, dell::PRODUCT_ID_POWEREDGE);
        let record = system_event(0x20, 0x01, 0x30, 0x01, [0x59, 0x5A, 0x50]);

        assert!(matching_rule(&dell, &record).is_none());
        assert_eq!(combined_text(&dell, &record), None);
        assert_eq!(data2_text(&dell, &record), None);
    }

    #[test]
    fn oem_records_never_match_event_rules() {
        let dell = OemContext::new(674, dell::PRODUCT_ID_POWEREDGE);
        let record = decode(&[
            0x11, 0x00, 0xC5, 0x00, 0x00, 0x00, 0x50, 0xA2, 0x02, 0x00, 1, 2, 3, 4, 5, 6,
        ])
        .unwrap();

        assert!(matching_rule(&dell, &record).is_none());
    }

    #[test]
    fn every_vendor_has_rules() {
        for vendor in [Vendor::Dell, Vendor::Fujitsu, Vendor::Intel, Vendor::Inventec] {
            assert!(rules().iter().any(|rule| rule.vendor == vendor), "{vendor:?}");
        }
    }

    #[test]
    fn context_from_device_id() {
        let device_id = DeviceId::from_data(&[
            0x20, 0x01, 0x02, 0x15, 0x51, 0xBF, 0x59, 0x50, 0x00, 0x33, 0x00,
        ])
        .unwrap();

        let ctx = OemContext::from(&device_id);
        assert_eq!(ctx.manufacturer_id, 20569);
        assert_eq!(ctx.product_id, 51);
        assert!(!ctx.is_ipmi_2_0());
        assert_eq!(ctx.ipmi_version_minor, 5);
    }
}
