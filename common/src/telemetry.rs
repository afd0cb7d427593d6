//! Telemetry fetch errors shared by the firmware client, the simulator source
//! and the payload parser.

use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// No complete response within the fetch timeout.
    Timeout,
    /// Host name could not be resolved.
    Dns,
    /// TCP connect, write or read failed.
    Transport,
    /// Response did not fit the receive buffer.
    Overflow,
    /// Server answered with a status other than 200.
    Status(u16),
    /// Response was not a parseable HTTP message or state object.
    Payload,
    /// The reading carried no `timestamp` field.
    NoData,
}

impl fmt::Display for FetchError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timed out"),
            Self::Dns => f.write_str("dns lookup failed"),
            Self::Transport => f.write_str("connection failed"),
            Self::Overflow => f.write_str("response too large"),
            Self::Status(code) => write!(f, "http status {code}"),
            Self::Payload => f.write_str("malformed payload"),
            Self::NoData => f.write_str("no data returned"),
        }
    }
}
