//! Credential blob in the last sector of on-board flash.

use defmt::{info, warn};
use embassy_rp::Peri;
use embassy_rp::flash::{Blocking, ERASE_SIZE, Flash};
use embassy_rp::peripherals::FLASH;
use solar_dash_pico2::credentials::{BLOB_LEN, Credentials, CredentialsError};

/// Pico 2 W: 4 MiB QSPI flash.
pub const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// Offset of the credentials sector, relative to the start of flash.
const BLOB_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

const _: () = assert!(BLOB_LEN == ERASE_SIZE);

pub struct CredentialStore<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> CredentialStore<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self { Self { flash: Flash::new_blocking(flash) } }

    pub fn load(&mut self) -> Result<Credentials, CredentialsError> {
        let mut blob = [0u8; BLOB_LEN];
        if let Err(e) = self.flash.blocking_read(BLOB_OFFSET, &mut blob) {
            warn!("Credentials read failed: {}", e);
            return Err(CredentialsError::Missing);
        }
        Credentials::from_blob(&blob)
    }

    /// Factory reset: erase the sector so the next boot finds no credentials.
    pub fn wipe(&mut self) {
        match self.flash.blocking_erase(BLOB_OFFSET, BLOB_OFFSET + ERASE_SIZE as u32) {
            Ok(()) => info!("Credentials erased"),
            Err(e) => warn!("Credentials erase failed: {}", e),
        }
    }
}
