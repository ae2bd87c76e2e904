use crate::connection::{CompletionErrorCode, NetFn};

/// The error returned by [`Ipmi::send_recv`](crate::Ipmi::send_recv).
#[derive(Clone, Debug, PartialEq)]
pub enum IpmiError<CON, P> {
    UnexpectedResponse {
        netfn_sent: NetFn,
        netfn_recvd: NetFn,
        cmd_sent: u8,
        cmd_recvd: u8,
    },
    Failed {
        netfn: NetFn,
        cmd: u8,
        completion_code: CompletionErrorCode,
        data: Vec<u8>,
    },
    Command {
        error: P,
        netfn: NetFn,
        cmd: u8,
        completion_code: Option<CompletionErrorCode>,
        data: Vec<u8>,
    },
    Connection(CON),
}

impl<CON, P> From<CON> for IpmiError<CON, P> {
    fn from(value: CON) -> Self {
        Self::Connection(value)
    }
}

impl<CON, P> IpmiError<CON, P> {
    /// The completion code that caused this error, if any.
    pub fn completion_code(&self) -> Option<CompletionErrorCode> {
        match self {
            IpmiError::Failed {
                completion_code, ..
            } => Some(*completion_code),
            IpmiError::Command {
                completion_code, ..
            } => *completion_code,
            _ => None,
        }
    }
}

/// A raw SEL record could not be decoded.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("SEL record must be {expected} bytes long, got {actual}")]
    BadLength { expected: usize, actual: usize },
}

/// A format template could not be rendered.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("format template ends in the middle of a directive")]
    UnterminatedDirective,
    #[error("unknown format directive '%{0}'")]
    UnknownDirective(char),
    #[error("output capacity must be non-zero")]
    ZeroCapacity,
    #[error("'%{0}' is not available for this record")]
    UnavailableField(char),
}

/// Errors surfaced by SEL sessions and the output callers built on them.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SelError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid SEL entry at record ID {record_id}")]
    InvalidSelEntry { record_id: u16 },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("SEL reservation cancelled")]
    ReservationCancelled,
    #[error("SEL record {record_id} not found")]
    NotFound { record_id: u16 },
    /// The first (0x0000) and last (0xFFFF) record IDs address whichever record
    /// is currently first or last, so they cannot name a record to delete.
    #[error("record ID 0x{record_id:04X} does not name a single SEL record")]
    ReservedRecordId { record_id: u16 },
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("{command} failed: {completion_code}")]
    Command {
        command: &'static str,
        completion_code: CompletionErrorCode,
    },
    #[error("{command} returned an unexpected response: {detail}")]
    BadResponse {
        command: &'static str,
        detail: String,
    },
}

impl SelError {
    /// Map a command error into the SEL error taxonomy.
    ///
    /// Completion codes 0xC5 and 0xCB become [`SelError::ReservationCancelled`] and
    /// [`SelError::NotFound`] respectively, so callers can decide whether they are fatal.
    pub(crate) fn from_ipmi<CON, P>(
        command: &'static str,
        record_id: u16,
        error: IpmiError<CON, P>,
    ) -> Self
    where
        CON: core::fmt::Debug,
        P: core::fmt::Debug,
    {
        if let Some(completion_code) = error.completion_code() {
            if completion_code.is_reservation_cancelled() {
                return SelError::ReservationCancelled;
            } else if completion_code.is_not_present() {
                return SelError::NotFound { record_id };
            }
        }

        match error {
            IpmiError::Connection(e) => SelError::Transport(format!("{e:?}")),
            IpmiError::Failed {
                completion_code, ..
            } => SelError::Command {
                command,
                completion_code,
            },
            IpmiError::Command {
                error,
                completion_code: Some(completion_code),
                ..
            } => {
                log::debug!("{command} failed with {completion_code}: {error:?}");
                SelError::Command {
                    command,
                    completion_code,
                }
            }
            IpmiError::Command { error, .. } => SelError::BadResponse {
                command,
                detail: format!("{error:?}"),
            },
            IpmiError::UnexpectedResponse {
                netfn_recvd,
                cmd_recvd,
                ..
            } => SelError::BadResponse {
                command,
                detail: format!("netfn {netfn_recvd:?}, cmd 0x{cmd_recvd:02X}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_codes_map_to_sel_errors() {
        let cancelled: IpmiError<(), ()> = IpmiError::Failed {
            netfn: NetFn::Storage,
            cmd: 0x43,
            completion_code: CompletionErrorCode::ReservationCancelledOrInvalidId,
            data: Vec::new(),
        };
        assert_eq!(
            SelError::from_ipmi("Get SEL Entry", 7, cancelled),
            SelError::ReservationCancelled
        );

        let missing: IpmiError<(), ()> = IpmiError::Failed {
            netfn: NetFn::Storage,
            cmd: 0x46,
            completion_code: CompletionErrorCode::RequestedDatapointNotPresent,
            data: Vec::new(),
        };
        assert_eq!(
            SelError::from_ipmi("Delete SEL Entry", 7, missing),
            SelError::NotFound { record_id: 7 }
        );

        let transport: IpmiError<&str, ()> = IpmiError::Connection("timed out");
        assert_eq!(
            SelError::from_ipmi("Get SEL Entry", 7, transport),
            SelError::Transport("\"timed out\"".into())
        );
    }

    #[test]
    fn error_messages() {
        let err = SelError::from(DecodeError::BadLength {
            expected: 16,
            actual: 15,
        });
        assert_eq!(err.to_string(), "SEL record must be 16 bytes long, got 15");

        let err = SelError::Command {
            command: "Clear SEL",
            completion_code: CompletionErrorCode::InsufficientPrivilege,
        };
        assert_eq!(err.to_string(), "Clear SEL failed: insufficient privilege level");

        let err = SelError::ReservedRecordId { record_id: 0xFFFF };
        assert_eq!(err.to_string(), "record ID 0xFFFF does not name a single SEL record");
    }
}
