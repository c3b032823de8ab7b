use crate::error::{FlooringError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_ORDERS_DIR: &str = "Orders";
const DEFAULT_DATA_DIR: &str = "Data";

/// Keys accepted by [`FlooringConfig::get`] and [`FlooringConfig::set`].
pub const CONFIG_KEYS: [&str; 3] = ["orders-dir", "data-dir", "minimum-area"];

/// Configuration for flooring, stored in `<home>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlooringConfig {
    /// Directory holding `Orders_MMDDYYYY.txt` files. Relative paths resolve against home.
    #[serde(default = "default_orders_dir")]
    pub orders_dir: PathBuf,

    /// Directory holding `Products.txt` and `Taxes.txt`. Relative paths resolve against home.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Smallest area, in square feet, an order may be placed for.
    #[serde(default = "default_minimum_area")]
    pub minimum_area: Decimal,
}

fn default_orders_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ORDERS_DIR)
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_minimum_area() -> Decimal {
    Decimal::new(10000, 2)
}

impl Default for FlooringConfig {
    fn default() -> Self {
        Self {
            orders_dir: default_orders_dir(),
            data_dir: default_data_dir(),
            minimum_area: default_minimum_area(),
        }
    }
}

impl FlooringConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(home: P) -> Result<Self> {
        let config_path = home.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            FlooringError::persistence(format!("Could not read {}", config_path.display()), e)
        })?;
        let config: FlooringConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, home: P) -> Result<()> {
        let home = home.as_ref();

        if !home.exists() {
            fs::create_dir_all(home).map_err(|e| {
                FlooringError::persistence(format!("Could not create {}", home.display()), e)
            })?;
        }

        let config_path = home.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, content).map_err(|e| {
            FlooringError::persistence(format!("Could not write {}", config_path.display()), e)
        })?;
        Ok(())
    }

    pub fn orders_path(&self, home: &Path) -> PathBuf {
        home.join(&self.orders_dir)
    }

    pub fn data_path(&self, home: &Path) -> PathBuf {
        home.join(&self.data_dir)
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "orders-dir" => Ok(self.orders_dir.display().to_string()),
            "data-dir" => Ok(self.data_dir.display().to_string()),
            "minimum-area" => Ok(self.minimum_area.to_string()),
            other => Err(unknown_key(other)),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "orders-dir" => self.orders_dir = PathBuf::from(value),
            "data-dir" => self.data_dir = PathBuf::from(value),
            "minimum-area" => {
                let area = Decimal::from_str(value).map_err(|_| {
                    FlooringError::InvalidInput(format!("minimum-area must be a number: {value}"))
                })?;
                if area.is_sign_negative() {
                    return Err(FlooringError::InvalidInput(
                        "minimum-area cannot be negative".to_string(),
                    ));
                }
                self.minimum_area = area;
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> FlooringError {
    FlooringError::InvalidInput(format!(
        "Unknown config key: {key} (expected one of {})",
        CONFIG_KEYS.join(", ")
    ))
}
