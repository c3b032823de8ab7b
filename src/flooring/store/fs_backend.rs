use super::backend::{CatalogKind, StorageBackend};
use crate::error::{FlooringError, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const ORDER_FILE_PREFIX: &str = "Orders_";
const ORDER_FILE_SUFFIX: &str = ".txt";
const ORDER_DATE_FORMAT: &str = "%m%d%Y";

/// `Orders_MMDDYYYY.txt`
pub fn order_file_name(date: NaiveDate) -> String {
    format!(
        "{}{}{}",
        ORDER_FILE_PREFIX,
        date.format(ORDER_DATE_FORMAT),
        ORDER_FILE_SUFFIX
    )
}

/// Recover the fulfillment date from an order file name.
/// Returns None for anything but an exact `Orders_MMDDYYYY.txt`; a `.TXT`
/// file would never be found again by [`order_file_name`].
pub fn parse_order_file_name(name: &str) -> Option<NaiveDate> {
    let digits = name
        .strip_prefix(ORDER_FILE_PREFIX)?
        .strip_suffix(ORDER_FILE_SUFFIX)?;
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, ORDER_DATE_FORMAT).ok()
}

pub struct FsBackend {
    orders_dir: PathBuf,
    data_dir: PathBuf,
}

impl FsBackend {
    pub fn new(orders_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            orders_dir,
            data_dir,
        }
    }

    pub fn orders_dir(&self) -> &Path {
        &self.orders_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| {
                FlooringError::persistence(format!("Could not create {}", path.display()), e)
            })?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn list_order_dates(&self) -> Result<Vec<NaiveDate>> {
        let entries = fs::read_dir(&self.orders_dir).map_err(|e| {
            FlooringError::persistence(
                format!(
                    "Could not read orders directory {}",
                    self.orders_dir.display()
                ),
                e,
            )
        })?;

        let mut dates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                FlooringError::persistence("Could not read orders directory entry", e)
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if !name.starts_with(ORDER_FILE_PREFIX) {
                continue;
            }
            match parse_order_file_name(name) {
                Some(date) => dates.push(date),
                None => warn!(file = name, "skipping file that is not named Orders_MMDDYYYY.txt"),
            }
        }

        dates.sort();
        Ok(dates)
    }

    fn read_orders(&self, date: NaiveDate) -> Result<Option<String>> {
        let path = self.orders_path(date);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            FlooringError::persistence(format!("Could not load orders from {}", path.display()), e)
        })?;
        debug!(path = %path.display(), bytes = content.len(), "read order file");
        Ok(Some(content))
    }

    fn write_orders(&self, date: NaiveDate, content: &str) -> Result<()> {
        self.ensure_dir(&self.orders_dir)?;
        let target_path = self.orders_path(date);
        let save_error = |e: std::io::Error| {
            FlooringError::persistence(
                format!("Could not save orders to {}", target_path.display()),
                e,
            )
        };

        // Atomic Write
        let tmp_path = self
            .orders_dir
            .join(format!(".orders-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, content).map_err(save_error)?;
        if let Err(e) = fs::rename(&tmp_path, &target_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(save_error(e));
        }

        debug!(path = %target_path.display(), "wrote order file");
        Ok(())
    }

    fn delete_orders(&self, date: NaiveDate) -> Result<()> {
        let path = self.orders_path(date);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                FlooringError::persistence(format!("Could not delete {}", path.display()), e)
            })?;
            debug!(path = %path.display(), "deleted empty order file");
        }
        Ok(())
    }

    fn orders_path(&self, date: NaiveDate) -> PathBuf {
        self.orders_dir.join(order_file_name(date))
    }

    fn read_catalog(&self, kind: CatalogKind) -> Result<String> {
        let path = self.data_dir.join(kind.file_name());
        fs::read_to_string(&path).map_err(|e| {
            FlooringError::persistence(format!("Could not load {}", path.display()), e)
        })
    }
}
