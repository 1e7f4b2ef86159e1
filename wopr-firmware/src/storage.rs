//! Flash-backed configuration persistence
//!
//! The whole record is stored as one postcard blob under a single map
//! key in a small partition at the end of flash; sequential-storage
//! handles wear leveling across the partition's two sectors. Loading
//! falls back to defaults (and persists them once) when the record is
//! absent or unreadable.

use embassy_embedded_hal::adapter::BlockingAsync;
use esp_storage::FlashStorage;
use log::{info, warn};
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use wopr_core::config::{Config, MAX_CONFIG_SIZE};

/// 4 MB flash part; the record lives in the last two 4 KiB sectors.
const FLASH_SIZE: u32 = 4 * 1024 * 1024;
const PARTITION_SIZE: u32 = 8 * 1024;
const CONFIG_RANGE: core::ops::Range<u32> = (FLASH_SIZE - PARTITION_SIZE)..FLASH_SIZE;

/// Map key for the one configuration record.
const CONFIG_KEY: u8 = 0;

/// Errors from persisting or fetching the record.
#[derive(Debug, Clone, Copy)]
pub enum StorageError {
    /// The record did not fit its encode buffer.
    Encode,
    /// Flash read/write failed underneath sequential-storage.
    Flash,
}

/// Owning handle on the config partition.
pub struct ConfigStorage {
    flash: BlockingAsync<FlashStorage>,
}

impl ConfigStorage {
    pub fn new() -> Self {
        Self {
            flash: BlockingAsync::new(FlashStorage::new()),
        }
    }

    /// Load the persisted record, defaulting (and persisting the
    /// defaults) when there is nothing usable in flash.
    pub async fn load_or_default(&mut self) -> Config {
        let mut data_buffer = [0u8; MAX_CONFIG_SIZE * 2];
        let fetched = map::fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &CONFIG_KEY,
        )
        .await;

        match fetched {
            Ok(Some(bytes)) => match Config::from_bytes(bytes) {
                Ok(config) => {
                    info!("Loaded persisted configuration");
                    return config;
                }
                Err(_) => warn!("Persisted configuration corrupt, using defaults"),
            },
            Ok(None) => info!("No persisted configuration, using defaults"),
            Err(_) => warn!("Flash read failed, using defaults"),
        }

        let config = Config::default();
        if let Err(e) = self.persist(&config).await {
            warn!("Could not persist default configuration: {:?}", e);
        }
        config
    }

    /// Write the whole record. Called after every mutation.
    pub async fn persist(&mut self, config: &Config) -> Result<(), StorageError> {
        let mut encode_buffer = [0u8; MAX_CONFIG_SIZE];
        let mut data_buffer = [0u8; MAX_CONFIG_SIZE * 2];
        let bytes = config.to_bytes(&mut encode_buffer).map_err(|_| StorageError::Encode)?;

        map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &CONFIG_KEY,
            &bytes,
        )
        .await
        .map_err(|_| StorageError::Flash)
    }
}
