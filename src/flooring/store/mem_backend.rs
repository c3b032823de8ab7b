use super::backend::{CatalogKind, StorageBackend};
use crate::error::{FlooringError, Result};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::PathBuf;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the store is single-threaded.
/// This lets the `StorageBackend` trait keep `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    orders: RefCell<BTreeMap<NaiveDate, String>>,
    catalogs: RefCell<HashMap<CatalogKind, String>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Seed a catalog body as if it had been read from disk.
    pub fn set_catalog(&self, kind: CatalogKind, content: impl Into<String>) {
        self.catalogs.borrow_mut().insert(kind, content.into());
    }

    /// Seed an order file body for `date`.
    pub fn set_orders(&self, date: NaiveDate, content: impl Into<String>) {
        self.orders.borrow_mut().insert(date, content.into());
    }

    /// Raw body currently stored for `date`, if any.
    pub fn orders_content(&self, date: NaiveDate) -> Option<String> {
        self.orders.borrow().get(&date).cloned()
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(FlooringError::persistence(
                "Could not save orders",
                io::Error::other("simulated write error"),
            ));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn list_order_dates(&self) -> Result<Vec<NaiveDate>> {
        Ok(self.orders.borrow().keys().copied().collect())
    }

    fn read_orders(&self, date: NaiveDate) -> Result<Option<String>> {
        Ok(self.orders_content(date))
    }

    fn write_orders(&self, date: NaiveDate, content: &str) -> Result<()> {
        self.check_writable()?;
        self.orders.borrow_mut().insert(date, content.to_string());
        Ok(())
    }

    fn delete_orders(&self, date: NaiveDate) -> Result<()> {
        self.check_writable()?;
        self.orders.borrow_mut().remove(&date);
        Ok(())
    }

    fn orders_path(&self, date: NaiveDate) -> PathBuf {
        PathBuf::from(format!("memory://{}", super::fs_backend::order_file_name(date)))
    }

    fn read_catalog(&self, kind: CatalogKind) -> Result<String> {
        self.catalogs.borrow().get(&kind).cloned().ok_or_else(|| {
            FlooringError::persistence(
                format!("Could not load {}", kind.file_name()),
                io::Error::new(io::ErrorKind::NotFound, "catalog not seeded"),
            )
        })
    }
}
