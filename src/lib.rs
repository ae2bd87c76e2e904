//! ipmi-sel: decoding, formatting and management of the IPMI System Event Log.
//!
//! Raw SEL records are decoded into [`SelRecord`](storage::sel::SelRecord)s (in the
//! [`storage`] module), rendered through `%` format templates (in [`format`]), and read,
//! deleted and cleared over any [`IpmiConnection`](connection::IpmiConnection) by a
//! [`SelSession`](session::SelSession). Vendor specific interpretations live in [`oem`],
//! and [`output`] holds the interactive and syslog callers.

pub mod app;

pub mod connection;

mod error;
pub use error::{DecodeError, FormatError, IpmiError, SelError};

pub mod format;

pub mod oem;

pub mod output;

pub mod sensor_event;

pub mod session;

pub mod storage;

#[macro_use]
mod fmt;

pub use fmt::{LogItem, LogOutput, Loggable, Logger};

use connection::{CompletionErrorCode, IpmiCommand, LogicalUnit, Request};

pub struct Ipmi<CON> {
    inner: CON,
}

impl<CON> Ipmi<CON> {
    pub fn release(self) -> CON {
        self.inner
    }
}

impl<CON> From<CON> for Ipmi<CON>
where
    CON: connection::IpmiConnection,
{
    fn from(value: CON) -> Self {
        Self::new(value)
    }
}

impl<CON> Ipmi<CON>
where
    CON: connection::IpmiConnection,
{
    pub fn inner_mut(&mut self) -> &mut CON {
        &mut self.inner
    }

    pub fn new(inner: CON) -> Self {
        Self { inner }
    }

    pub fn send_recv<CMD>(
        &mut self,
        request: CMD,
    ) -> Result<CMD::Output, IpmiError<CON::Error, CMD::Error>>
    where
        CMD: IpmiCommand,
    {
        let message = request.into();
        let (message_netfn, message_cmd) = (message.netfn(), message.cmd());
        let request = Request::new(message, LogicalUnit::Zero);

        let response = self.inner.send_recv(&request)?;

        if response.netfn() != message_netfn || response.cmd() != message_cmd {
            return Err(IpmiError::UnexpectedResponse {
                netfn_sent: message_netfn,
                netfn_recvd: response.netfn(),
                cmd_sent: message_cmd,
                cmd_recvd: response.cmd(),
            });
        }

        if let Ok(completion_code) = CompletionErrorCode::try_from(response.cc()) {
            let error = CMD::handle_completion_code(completion_code, response.data())
                .map(|error| IpmiError::Command {
                    error,
                    netfn: response.netfn(),
                    cmd: response.cmd(),
                    completion_code: Some(completion_code),
                    data: response.data().to_vec(),
                })
                .unwrap_or_else(|| IpmiError::Failed {
                    netfn: response.netfn(),
                    cmd: response.cmd(),
                    completion_code,
                    data: response.data().to_vec(),
                });

            return Err(error);
        }

        CMD::parse_success_response(response.data()).map_err(|error| IpmiError::Command {
            error,
            netfn: response.netfn(),
            cmd: response.cmd(),
            completion_code: None,
            data: response.data().to_vec(),
        })
    }
}
