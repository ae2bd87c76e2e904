//! The command channel that SEL operations are issued over.
//!
//! Transports (LAN, RMCP+, in-band drivers) live outside of this crate: anything that
//! can carry a [`Request`] to a BMC and hand back its [`Response`] implements
//! [`IpmiConnection`].

use std::num::NonZeroU8;

mod completion_code;
pub use completion_code::{CompletionErrorCode, ResponseUnavailableReason};

mod netfn;
pub use netfn::NetFn;

mod request;
pub use request::Request;

mod response;
pub use response::Response;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChannelNumber(NonZeroU8);

impl ChannelNumber {
    /// Create a new `ChannelNumber`.
    ///
    /// This function returns `None` if `value > 0xB`
    pub fn new(value: NonZeroU8) -> Option<Self> {
        if value.get() <= 0xB {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> NonZeroU8 {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Channel {
    Primary,
    Numbered(ChannelNumber),
    System,
    Current,
}

impl Channel {
    /// Create a new `Channel`.
    ///
    /// This function returns `None` if `value == 0xC || value == 0xD || value > 0xF`
    pub fn new(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Primary),
            0xE => Some(Self::Current),
            0xF => Some(Self::System),
            v => Some(Self::Numbered(ChannelNumber::new(NonZeroU8::new(v)?)?)),
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            Channel::Primary => 0x0,
            Channel::Numbered(v) => v.value().get(),
            Channel::Current => 0xE,
            Channel::System => 0xF,
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Channel::Primary => write!(f, "Primary channel"),
            Channel::Numbered(number) => write!(f, "Channel 0x{:01X}", number.value()),
            Channel::Current => write!(f, "Current channel"),
            Channel::System => write!(f, "System channel"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogicalUnit {
    Zero,
    One,
    Two,
    Three,
}

impl LogicalUnit {
    /// Construct a `LogicalUnit` from the two lowest bits of `value`,
    /// ignoring all other bits.
    pub fn from_low_bits(value: u8) -> Self {
        match value & 0b11 {
            0b00 => Self::Zero,
            0b01 => Self::One,
            0b10 => Self::Two,
            _ => Self::Three,
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            LogicalUnit::Zero => 0,
            LogicalUnit::One => 1,
            LogicalUnit::Two => 2,
            LogicalUnit::Three => 3,
        }
    }
}

/// A blocking request/response channel to a BMC.
pub trait IpmiConnection {
    type Error: core::fmt::Debug;

    fn send_recv(&mut self, request: &Request) -> Result<Response, Self::Error>;
}

impl<T> IpmiConnection for &mut T
where
    T: IpmiConnection + ?Sized,
{
    type Error = T::Error;

    fn send_recv(&mut self, request: &Request) -> Result<Response, Self::Error> {
        (**self).send_recv(request)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    netfn: NetFn,
    cmd: u8,
    data: Vec<u8>,
}

impl Message {
    pub fn new_request(netfn: NetFn, cmd: u8, data: Vec<u8>) -> Self {
        Self { netfn, cmd, data }
    }

    pub fn netfn(&self) -> NetFn {
        self.netfn
    }

    pub fn cmd(&self) -> u8 {
        self.cmd
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// The response did not contain enough data to be parsed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NotEnoughData;

/// A typed IPMI command.
pub trait IpmiCommand: Into<Message> {
    type Output;
    type Error;

    /// Parse the response data of a command that completed successfully
    /// (the completion code is not included in `data`).
    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error>;

    /// Give the command a chance to turn a non-zero completion code into
    /// one of its own errors.
    fn handle_completion_code(
        completion_code: CompletionErrorCode,
        data: &[u8],
    ) -> Option<Self::Error> {
        let _ = (completion_code, data);
        None
    }
}
