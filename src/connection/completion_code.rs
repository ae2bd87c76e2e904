#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResponseUnavailableReason {
    Unknown,
    SdrInUpdate,
    DeviceInFwUpdate,
    BmcInitializing,
}

/// A non-zero completion code.
///
/// Reference: IPMI 2.0 Specification, Table 5-2 "Completion Codes"
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum CompletionErrorCode {
    NodeBusy,
    InvalidCommand,
    InvalidCommandForLun,
    ProcessingTimeout,
    OutOfSpace,
    ReservationCancelledOrInvalidId,
    RequestDataTruncated,
    RequestDataLenInvalid,
    RequestDataLengthLimitExceeded,
    ParameterOutOfRange,
    CannotReturnNumOfRequestedBytes,
    RequestedDatapointNotPresent,
    InvalidDataFieldInRequest,
    CommandIllegalForSensorOrRecord,
    ResponseUnavailable { reason: ResponseUnavailableReason },
    CannotExecuteDuplicateRequest,
    DestinationUnavailable,
    InsufficientPrivilege,
    CannotExecuteCommandInCurrentState,
    SubFunctionDisabled,
    Unspecified,
    Oem(u8),
    CommandSpecific(u8),
    Reserved(u8),
}

impl TryFrom<u8> for CompletionErrorCode {
    type Error = ();

    /// Fails for `0x00`, which is the only code that signals success.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let value = match value {
            0 => return Err(()),
            0xC0 => Self::NodeBusy,
            0xC1 => Self::InvalidCommand,
            0xC2 => Self::InvalidCommandForLun,
            0xC3 => Self::ProcessingTimeout,
            0xC4 => Self::OutOfSpace,
            0xC5 => Self::ReservationCancelledOrInvalidId,
            0xC6 => Self::RequestDataTruncated,
            0xC7 => Self::RequestDataLenInvalid,
            0xC8 => Self::RequestDataLengthLimitExceeded,
            0xC9 => Self::ParameterOutOfRange,
            0xCA => Self::CannotReturnNumOfRequestedBytes,
            0xCB => Self::RequestedDatapointNotPresent,
            0xCC => Self::InvalidDataFieldInRequest,
            0xCD => Self::CommandIllegalForSensorOrRecord,
            0xCE => Self::ResponseUnavailable {
                reason: ResponseUnavailableReason::Unknown,
            },
            0xCF => Self::CannotExecuteDuplicateRequest,
            0xD0 => Self::ResponseUnavailable {
                reason: ResponseUnavailableReason::SdrInUpdate,
            },
            0xD1 => Self::ResponseUnavailable {
                reason: ResponseUnavailableReason::DeviceInFwUpdate,
            },
            0xD2 => Self::ResponseUnavailable {
                reason: ResponseUnavailableReason::BmcInitializing,
            },
            0xD3 => Self::DestinationUnavailable,
            0xD4 => Self::InsufficientPrivilege,
            0xD5 => Self::CannotExecuteCommandInCurrentState,
            0xD6 => Self::SubFunctionDisabled,
            0xFF => Self::Unspecified,
            0x01..=0x7E => Self::Oem(value),
            0x80..=0xBE => Self::CommandSpecific(value),
            v => Self::Reserved(v),
        };

        Ok(value)
    }
}

impl CompletionErrorCode {
    /// The reservation used by the request was cancelled, or the ID was never valid.
    pub fn is_reservation_cancelled(&self) -> bool {
        matches!(self, Self::ReservationCancelledOrInvalidId)
    }

    /// The requested record (or other datapoint) does not exist.
    pub fn is_not_present(&self) -> bool {
        matches!(self, Self::RequestedDatapointNotPresent)
    }
}

impl core::fmt::Display for CompletionErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NodeBusy => write!(f, "node busy"),
            Self::InvalidCommand => write!(f, "invalid command"),
            Self::InvalidCommandForLun => write!(f, "invalid command for LUN"),
            Self::ProcessingTimeout => write!(f, "timeout while processing command"),
            Self::OutOfSpace => write!(f, "out of space"),
            Self::ReservationCancelledOrInvalidId => {
                write!(f, "reservation cancelled or invalid reservation ID")
            }
            Self::RequestDataTruncated => write!(f, "request data truncated"),
            Self::RequestDataLenInvalid => write!(f, "request data length invalid"),
            Self::RequestDataLengthLimitExceeded => write!(f, "request data length limit exceeded"),
            Self::ParameterOutOfRange => write!(f, "parameter out of range"),
            Self::CannotReturnNumOfRequestedBytes => {
                write!(f, "cannot return number of requested data bytes")
            }
            Self::RequestedDatapointNotPresent => {
                write!(f, "requested sensor, data, or record not present")
            }
            Self::InvalidDataFieldInRequest => write!(f, "invalid data field in request"),
            Self::CommandIllegalForSensorOrRecord => {
                write!(f, "command illegal for specified sensor or record type")
            }
            Self::ResponseUnavailable { reason } => {
                write!(f, "command response could not be provided ({reason:?})")
            }
            Self::CannotExecuteDuplicateRequest => write!(f, "cannot execute duplicated request"),
            Self::DestinationUnavailable => write!(f, "destination unavailable"),
            Self::InsufficientPrivilege => write!(f, "insufficient privilege level"),
            Self::CannotExecuteCommandInCurrentState => {
                write!(f, "command not supported in present state")
            }
            Self::SubFunctionDisabled => write!(f, "command sub-function disabled or unavailable"),
            Self::Unspecified => write!(f, "unspecified error"),
            Self::Oem(v) => write!(f, "OEM completion code 0x{v:02X}"),
            Self::CommandSpecific(v) => write!(f, "command specific completion code 0x{v:02X}"),
            Self::Reserved(v) => write!(f, "reserved completion code 0x{v:02X}"),
        }
    }
}

#[test]
fn sel_relevant_completion_codes() {
    let cancelled = CompletionErrorCode::try_from(0xC5).unwrap();
    assert!(cancelled.is_reservation_cancelled());
    assert!(!cancelled.is_not_present());

    let missing = CompletionErrorCode::try_from(0xCB).unwrap();
    assert!(missing.is_not_present());

    assert!(CompletionErrorCode::try_from(0x00).is_err());
    assert_eq!(
        CompletionErrorCode::try_from(0x81),
        Ok(CompletionErrorCode::CommandSpecific(0x81))
    );
}
