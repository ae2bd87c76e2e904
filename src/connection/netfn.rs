/// The network function of a message.
///
/// Only the functions that the SEL engine issues commands under are named, everything
/// else is carried as [`NetFn::Unknown`] with its request (even) value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NetFn {
    SensorEvent,
    App,
    Storage,
    Unknown(u8),
}

impl NetFn {
    pub const fn request_value(&self) -> u8 {
        match self {
            NetFn::SensorEvent => 0x04,
            NetFn::App => 0x06,
            NetFn::Storage => 0x0A,
            NetFn::Unknown(v) => *v & !1,
        }
    }

    pub const fn response_value(&self) -> u8 {
        self.request_value() | 1
    }
}

impl From<u8> for NetFn {
    fn from(value: u8) -> Self {
        match value & !1 {
            0x04 => Self::SensorEvent,
            0x06 => Self::App,
            0x0A => Self::Storage,
            v => Self::Unknown(v),
        }
    }
}

#[test]
fn netfn_request_response_values() {
    assert_eq!(NetFn::Storage.request_value(), 0x0A);
    assert_eq!(NetFn::Storage.response_value(), 0x0B);
    assert_eq!(NetFn::from(0x0B), NetFn::Storage);
    assert_eq!(NetFn::from(0x07), NetFn::App);
    assert_eq!(NetFn::from(0x31), NetFn::Unknown(0x30));
}
