//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the traffic node.  The node configuration
//! is stored as a single `postcard` blob under namespace `traffic`, key
//! `nodecfg`.  Lamp state is never persisted: every boot starts dark.
//!
//! - **`target_os = "espidf"`**: `EspNvs` on the default NVS partition.
//!   Taking the partition runs `nvs_flash_init`, erasing and re-initialising
//!   the flash when it is full or from an older IDF version.
//! - **all other targets**: in-memory simulation backend.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::NodeConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

const CONFIG_NAMESPACE: &str = "traffic";
const CONFIG_KEY: &str = "nodecfg";

/// Largest config blob accepted on read.
const MAX_BLOB_SIZE: usize = 1024;

pub struct NvsAdapter {
    #[cfg(target_os = "espidf")]
    nvs: EspNvs<NvsDefault>,
    #[cfg(not(target_os = "espidf"))]
    blob: std::cell::RefCell<Option<Vec<u8>>>,
}

impl NvsAdapter {
    /// Open the config namespace on the default partition.
    #[cfg(target_os = "espidf")]
    pub fn new(partition: EspDefaultNvsPartition) -> Result<Self, ConfigError> {
        let nvs = EspNvs::new(partition, CONFIG_NAMESPACE, true).map_err(|e| {
            warn!("NvsAdapter: open '{}' failed: {}", CONFIG_NAMESPACE, e);
            ConfigError::IoError
        })?;
        info!("NvsAdapter: ESP-IDF NVS namespace '{}' open", CONFIG_NAMESPACE);
        Ok(Self { nvs })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, ConfigError> {
        info!("NvsAdapter: simulation backend");
        Ok(Self {
            blob: std::cell::RefCell::new(None),
        })
    }

    /// Remove the stored config (factory reset).
    pub fn erase(&mut self) -> Result<(), ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            self.nvs.remove(CONFIG_KEY).map_err(|e| {
                warn!("NvsAdapter: erase failed: {}", e);
                ConfigError::IoError
            })?;
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.blob.borrow_mut().take();
        }

        info!("NvsAdapter: stored config erased");
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<NodeConfig, ConfigError> {
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::Corrupted);
        }
        let cfg: NodeConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        // A blob that decodes but no longer validates is as good as corrupt.
        cfg.validate().map_err(|_| ConfigError::Corrupted)?;
        Ok(cfg)
    }

    #[cfg(not(target_os = "espidf"))]
    #[cfg(test)]
    fn poke_raw(&self, bytes: &[u8]) {
        *self.blob.borrow_mut() = Some(bytes.to_vec());
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<NodeConfig, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            let mut buf = [0u8; MAX_BLOB_SIZE];
            match self.nvs.get_raw(CONFIG_KEY, &mut buf) {
                Ok(Some(bytes)) => {
                    let cfg = Self::decode(bytes)?;
                    info!("NvsAdapter: loaded config from NVS ({} bytes)", bytes.len());
                    Ok(cfg)
                }
                Ok(None) => Err(ConfigError::NotFound),
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            match self.blob.borrow().as_deref() {
                Some(bytes) => {
                    let cfg = Self::decode(bytes)?;
                    info!("NvsAdapter: loaded config from store");
                    Ok(cfg)
                }
                None => Err(ConfigError::NotFound),
            }
        }
    }

    fn save(&mut self, config: &NodeConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::StorageFull);
        }

        #[cfg(target_os = "espidf")]
        {
            self.nvs.set_raw(CONFIG_KEY, &bytes).map_err(|e| {
                warn!("NvsAdapter: NVS write error {}", e);
                ConfigError::IoError
            })?;
            info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("NvsAdapter: config saved (simulation, {} bytes)", bytes.len());
            *self.blob.borrow_mut() = Some(bytes);
        }

        Ok(())
    }
}
