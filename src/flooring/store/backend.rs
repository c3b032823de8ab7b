use crate::error::Result;
use chrono::NaiveDate;
use std::path::PathBuf;

/// The two reference catalogs read at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Products,
    StateTaxes,
}

impl CatalogKind {
    pub fn file_name(self) -> &'static str {
        match self {
            CatalogKind::Products => "Products.txt",
            CatalogKind::StateTaxes => "Taxes.txt",
        }
    }
}

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while `OrderStore` handles the "what" (partitions, numbering, codec).
pub trait StorageBackend {
    // --- Order files ---

    /// List every fulfillment date that has an order file.
    /// Fails if the orders location itself cannot be read.
    fn list_order_dates(&self) -> Result<Vec<NaiveDate>>;

    /// Read the raw body of the order file for `date`.
    /// Returns Ok(None) if there is no file for that date.
    fn read_orders(&self, date: NaiveDate) -> Result<Option<String>>;

    /// Replace the order file for `date` with `content`.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write_orders(&self, date: NaiveDate, content: &str) -> Result<()>;

    /// Remove the order file for `date`. Missing files are not an error.
    fn delete_orders(&self, date: NaiveDate) -> Result<()>;

    /// Location of the order file for `date` (virtual for non-file backends).
    fn orders_path(&self, date: NaiveDate) -> PathBuf;

    // --- Reference catalogs ---

    /// Read the raw body of a catalog file. A missing catalog is an error.
    fn read_catalog(&self, kind: CatalogKind) -> Result<String>;
}
