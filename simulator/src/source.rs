//! File-backed telemetry and credentials.
//!
//! The state file plays the part of the Home Assistant endpoint: it holds the
//! same JSON the firmware receives, so it can be edited while the simulator
//! runs.

use std::fs;
use std::io;
use std::path::Path;

use solar_dash_common::{FetchError, RawReading, payload};
use solar_dash_pico2::{Credentials, CredentialsError};

pub fn fetch_state(path: &Path) -> Result<RawReading, FetchError> {
    let body = fs::read(path).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "telemetry file unreadable");
        FetchError::Transport
    })?;
    payload::parse_state(&body)
}

pub fn load_credentials(path: &Path) -> Result<Credentials, CredentialsError> {
    match fs::read(path) {
        Ok(blob) => Credentials::from_blob(&blob),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CredentialsError::Missing),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "credentials file unreadable");
            Err(CredentialsError::Missing)
        }
    }
}

/// Factory reset: remove the credentials file.
pub fn wipe_credentials(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::info!(path = %path.display(), "credentials removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "credentials not removed"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use solar_dash_common::RawValue;

    use super::*;

    /// Unique scratch path under the system temp directory.
    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("solar-dash-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_reads_sample_state() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("telemetry.json");
        let reading = fetch_state(&path).unwrap();
        assert_eq!(reading.get("solar_in"), Some(&RawValue::Number(2345.0)));
        assert!(reading.contains("timestamp"));
    }

    #[test]
    fn test_missing_file_is_fetch_error() {
        assert_eq!(fetch_state(&scratch("absent.json")), Err(FetchError::Transport));
    }

    #[test]
    fn test_garbage_file_is_payload_error() {
        let path = scratch("garbage.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(fetch_state(&path), Err(FetchError::Payload));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_wipe_then_load_is_missing() {
        let path = scratch("credentials.env");
        fs::write(&path, "net,pw,http://ha.local,token\n").unwrap();
        assert!(load_credentials(&path).is_ok());

        wipe_credentials(&path);
        assert_eq!(load_credentials(&path), Err(CredentialsError::Missing));
        // Wiping twice is harmless
        wipe_credentials(&path);
    }
}
