//! Minimal HTTP/1.0 client framing for the Home Assistant state request.
//!
//! Only the byte-level parts live here so they can be tested on the host:
//! building the request and splitting a buffered response into status and
//! body. The socket handling is in the firmware binary.

use core::fmt::{self, Write};

use heapless::String;
use solar_dash_common::{FetchError, config::STATE_PATH};

use crate::credentials::{Credentials, Endpoint};

/// Request text buffer. Sized for the longest host, path and token.
pub const REQUEST_LEN: usize = 512;

const HEADER_END: &[u8] = b"\r\n\r\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum HttpError {
    /// Request did not fit [`REQUEST_LEN`].
    RequestTooLong,
    /// No status line or no end of headers.
    Malformed,
    /// Status other than 200.
    Status(u16),
}

impl fmt::Display for HttpError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::RequestTooLong => f.write_str("request too long"),
            Self::Malformed => f.write_str("malformed response"),
            Self::Status(code) => write!(f, "unexpected status {code}"),
        }
    }
}

impl From<HttpError> for FetchError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Status(code) => Self::Status(code),
            HttpError::RequestTooLong | HttpError::Malformed => Self::Payload,
        }
    }
}

/// `Host` header value: the port is only spelled out when it is not 80.
fn host_header(
    out: &mut String<REQUEST_LEN>,
    endpoint: &Endpoint,
) -> fmt::Result {
    match endpoint.port {
        80 => write!(out, "Host: {}\r\n", endpoint.host),
        port => write!(out, "Host: {}:{port}\r\n", endpoint.host),
    }
}

/// Build the GET request for the dashboard state entity.
pub fn state_request(credentials: &Credentials) -> Result<String<REQUEST_LEN>, HttpError> {
    let mut out = String::new();
    (|| {
        write!(out, "GET {}{STATE_PATH} HTTP/1.0\r\n", credentials.endpoint.path)?;
        host_header(&mut out, &credentials.endpoint)?;
        write!(out, "Authorization: Bearer {}\r\n", credentials.token)?;
        out.write_str("Content-Type: application/json\r\n")?;
        out.write_str("Connection: close\r\n\r\n")
    })()
    .map_err(|_| HttpError::RequestTooLong)?;
    Ok(out)
}

/// Status code from the first line, e.g. `HTTP/1.1 200 OK`.
fn status_code(response: &[u8]) -> Result<u16, HttpError> {
    let line_end = response.windows(2).position(|w| w == b"\r\n").ok_or(HttpError::Malformed)?;
    let line = core::str::from_utf8(&response[..line_end]).map_err(|_| HttpError::Malformed)?;
    let mut parts = line.split_ascii_whitespace();
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code.parse().map_err(|_| HttpError::Malformed),
        _ => Err(HttpError::Malformed),
    }
}

/// Check the status of a complete response and return its body.
pub fn response_body(response: &[u8]) -> Result<&[u8], HttpError> {
    let status = status_code(response)?;
    if status != 200 {
        return Err(HttpError::Status(status));
    }
    let headers_end = response.windows(HEADER_END.len()).position(|w| w == HEADER_END).ok_or(HttpError::Malformed)?;
    Ok(&response[headers_end + HEADER_END.len()..])
}
