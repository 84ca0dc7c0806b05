use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Name of the optional external start-up bundle inside the data directory.
pub const BUNDLE_FILENAME: &str = "bundle.json";

pub struct PortablePathManager;

impl PortablePathManager {
    /// Directory holding the executable, or the working directory when that
    /// cannot be resolved.
    pub fn root_dir() -> PathBuf {
        match env::current_exe() {
            Ok(mut path) => {
                path.pop();
                path
            }
            Err(e) => {
                warn!(
                    "Failed to get current exe path: {}. Falling back to current_dir.",
                    e
                );
                env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            }
        }
    }

    /// Main data directory (`SOLACE_DATA_DIR`, else `./data` next to the executable).
    pub fn data_dir() -> PathBuf {
        match env::var("SOLACE_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => Self::root_dir().join("data"),
        }
    }

    /// Model cache directory (./data/models).
    pub fn models_dir() -> PathBuf {
        Self::data_dir().join("models")
    }

    /// Path of the optional external bundle (./data/bundle.json).
    pub fn bundle_path() -> PathBuf {
        Self::data_dir().join(BUNDLE_FILENAME)
    }

    /// Creates the data and models directories if they do not exist.
    pub fn init() -> Result<(), std::io::Error> {
        let data_path = Self::data_dir();
        let models_path = Self::models_dir();

        if !data_path.exists() {
            info!("Creating data directory: {:?}", data_path);
            fs::create_dir_all(&data_path)?;
        }

        if !models_path.exists() {
            info!("Creating models directory: {:?}", models_path);
            fs::create_dir_all(&models_path)?;
        }

        Ok(())
    }
}
