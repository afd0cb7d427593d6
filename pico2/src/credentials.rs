//! Credential blob stored in flash.
//!
//! One line of four comma separated fields, written at provisioning time:
//!
//! ```text
//! <wifi ssid>,<wifi password>,<home assistant base url>,<access token>
//! ```
//!
//! The base URL must be plain `http://host[:port][/path]`; TLS is not
//! supported. Erased flash (`0xFF`) or a NUL byte terminates the blob.

use core::fmt;

use heapless::String;

/// Longest SSID allowed by 802.11.
pub const SSID_LEN: usize = 32;
/// Longest WPA2 passphrase.
pub const PASSWORD_LEN: usize = 64;
pub const HOST_LEN: usize = 64;
pub const PATH_LEN: usize = 64;
/// Home Assistant long-lived tokens are around 180 characters.
pub const TOKEN_LEN: usize = 256;

/// Flash sector reserved for the blob.
pub const BLOB_LEN: usize = 4096;

const FIELD_COUNT: usize = 4;
const SCHEME: &str = "http://";
const DEFAULT_PORT: u16 = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum CredentialsError {
    /// Blob is empty (never provisioned or wiped by a factory reset).
    Missing,
    NotUtf8,
    /// Wrong number of comma separated fields.
    FieldCount(usize),
    /// Named field is empty or too long for its buffer.
    Field(&'static str),
    /// URL does not start with `http://`.
    Scheme,
    Port,
}

impl fmt::Display for CredentialsError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("no credentials stored"),
            Self::NotUtf8 => f.write_str("credentials are not valid UTF-8"),
            Self::FieldCount(count) => write!(f, "expected {FIELD_COUNT} fields, found {count}"),
            Self::Field(name) => write!(f, "{name} is empty or too long"),
            Self::Scheme => f.write_str("only http:// URLs are supported"),
            Self::Port => f.write_str("invalid port in URL"),
        }
    }
}

/// Where the Home Assistant API lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String<HOST_LEN>,
    pub port: u16,
    /// Base path without a trailing slash; empty for the server root.
    pub path: String<PATH_LEN>,
}

impl Endpoint {
    pub fn parse(url: &str) -> Result<Self, CredentialsError> {
        let rest = url.strip_prefix(SCHEME).ok_or(CredentialsError::Scheme)?;
        let (authority, path) = rest.find('/').map_or((rest, ""), |at| rest.split_at(at));
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, port.parse::<u16>().map_err(|_| CredentialsError::Port)?),
            None => (authority, DEFAULT_PORT),
        };
        if port == 0 {
            return Err(CredentialsError::Port);
        }

        Ok(Self { host: field("host", host)?, port, path: bounded("path", path.trim_end_matches('/'))? })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: String<SSID_LEN>,
    pub password: String<PASSWORD_LEN>,
    pub endpoint: Endpoint,
    pub token: String<TOKEN_LEN>,
}

impl Credentials {
    /// Parse the four field text form.
    pub fn parse(text: &str) -> Result<Self, CredentialsError> {
        let text = text.trim_end();
        if text.is_empty() {
            return Err(CredentialsError::Missing);
        }

        let count = text.split(',').count();
        if count != FIELD_COUNT {
            return Err(CredentialsError::FieldCount(count));
        }

        let mut fields = text.split(',');
        let mut next = || fields.next().unwrap_or_default();
        let ssid = field("ssid", next())?;
        // Open networks have no password
        let password = bounded("password", next())?;
        let endpoint = Endpoint::parse(next().trim())?;
        let token = field("token", next().trim())?;

        Ok(Self { ssid, password, endpoint, token })
    }

    /// Parse the raw flash contents.
    pub fn from_blob(blob: &[u8]) -> Result<Self, CredentialsError> {
        let end = blob.iter().position(|&b| b == 0xFF || b == 0).unwrap_or(blob.len());
        let text = core::str::from_utf8(&blob[..end]).map_err(|_| CredentialsError::NotUtf8)?;
        Self::parse(text)
    }
}

fn bounded<const N: usize>(
    name: &'static str,
    value: &str,
) -> Result<String<N>, CredentialsError> {
    String::try_from(value).map_err(|_| CredentialsError::Field(name))
}

fn field<const N: usize>(
    name: &'static str,
    value: &str,
) -> Result<String<N>, CredentialsError> {
    if value.is_empty() {
        return Err(CredentialsError::Field(name));
    }
    bounded(name, value)
}
