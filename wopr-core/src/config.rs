//! Operating configuration
//!
//! One record holds everything that survives a power cycle: the display
//! window, the master switch, the UTC offset and the WiFi credentials.
//! It is stored in flash as a postcard blob (see the firmware `storage`
//! module); absence or corruption on load falls back to the defaults
//! below, which are then persisted once.

use heapless::String;
use log::warn;
use serde::{Deserialize, Serialize};

/// Maximum SSID length accepted by the WiFi stack.
pub const MAX_SSID_LEN: usize = 32;
/// Maximum passphrase length (WPA2 upper bound).
pub const MAX_PASS_LEN: usize = 64;

/// Upper bound for a serialized record, used to size flash buffers.
pub const MAX_CONFIG_SIZE: usize = 128;

/// Smallest selectable UTC offset.
pub const TIMEZONE_MIN: i8 = -12;
/// Largest selectable UTC offset.
pub const TIMEZONE_MAX: i8 = 14;

/// Errors from encoding or decoding a persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Serialization failed or the buffer was too small.
    Encode,
    /// The stored bytes do not decode to a record.
    Decode,
}

/// The one mutable configuration record.
///
/// Owned by the scheduler loop; the request handler borrows it mutably,
/// the window evaluator immutably. Hour fields are always in 0..=23 and
/// the timezone in -12..=14 - the setters reject anything else, so no
/// out-of-range value ever reaches flash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Inclusive start of the active display window.
    pub start_hour: u8,
    /// Exclusive end of the active display window. May be numerically
    /// below `start_hour`, meaning the window crosses midnight.
    pub end_hour: u8,
    /// Display master switch, independent of the window.
    pub enabled: bool,
    /// Whole-hour offset applied to the device's UTC clock.
    pub timezone: i8,
    /// Station SSID, set at provisioning.
    pub wifi_ssid: String<MAX_SSID_LEN>,
    /// Station passphrase, set at provisioning.
    pub wifi_pass: String<MAX_PASS_LEN>,
}

impl Default for Config {
    fn default() -> Self {
        let mut wifi_ssid = String::new();
        wifi_ssid.push_str("SSID").ok();
        let mut wifi_pass = String::new();
        wifi_pass.push_str("PASS").ok();
        Self {
            start_hour: 7,
            end_hour: 1,
            enabled: true,
            timezone: -5,
            wifi_ssid,
            wifi_pass,
        }
    }
}

impl Config {
    /// Set the window start. Returns false (and leaves the field
    /// untouched) when the value is outside 0..=23.
    pub fn set_start_hour(&mut self, value: i32) -> bool {
        match hour_in_range(value) {
            Some(hour) => {
                self.start_hour = hour;
                true
            }
            None => {
                warn!("Rejected start hour {}", value);
                false
            }
        }
    }

    /// Set the window end. Same range rule as `set_start_hour`.
    pub fn set_end_hour(&mut self, value: i32) -> bool {
        match hour_in_range(value) {
            Some(hour) => {
                self.end_hour = hour;
                true
            }
            None => {
                warn!("Rejected end hour {}", value);
                false
            }
        }
    }

    /// Set the UTC offset. Rejects values outside -12..=14.
    pub fn set_timezone(&mut self, value: i32) -> bool {
        if (TIMEZONE_MIN as i32..=TIMEZONE_MAX as i32).contains(&value) {
            self.timezone = value as i8;
            true
        } else {
            warn!("Rejected timezone {}", value);
            false
        }
    }

    /// Serialize the whole record into `buf`, returning the used slice.
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encode).map(|used| &*used)
    }

    /// Decode a persisted record. A blob that deserializes but carries
    /// out-of-range fields counts as corrupt.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        if config.start_hour > 23
            || config.end_hour > 23
            || !(TIMEZONE_MIN..=TIMEZONE_MAX).contains(&config.timezone)
        {
            return Err(ConfigError::Decode);
        }
        Ok(config)
    }
}

fn hour_in_range(value: i32) -> Option<u8> {
    if (0..=23).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}
