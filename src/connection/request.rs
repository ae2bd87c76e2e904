use super::{LogicalUnit, Message, NetFn};

/// An IPMI request addressed to the BMC.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    lun: LogicalUnit,
    message: Message,
}

impl Request {
    pub fn new(message: Message, lun: LogicalUnit) -> Self {
        Self { lun, message }
    }

    pub fn netfn(&self) -> NetFn {
        self.message.netfn()
    }

    /// The raw netfn value, always a request (even) value.
    pub fn netfn_raw(&self) -> u8 {
        self.message.netfn().request_value()
    }

    pub fn cmd(&self) -> u8 {
        self.message.cmd()
    }

    /// The data of the request (does not include netfn or command).
    pub fn data(&self) -> &[u8] {
        self.message.data()
    }

    pub fn lun(&self) -> LogicalUnit {
        self.lun
    }
}

impl From<Message> for Request {
    fn from(message: Message) -> Self {
        Self::new(message, LogicalUnit::Zero)
    }
}
