//! # Storage Layer
//!
//! This module defines the storage abstraction for flooring orders. The
//! [`DataStore`] trait is the only way the rest of the crate touches orders,
//! so a different store (a database, a remote service) can be dropped in
//! without changing the API layer.
//!
//! ## Split of Responsibilities
//!
//! - [`order_store::OrderStore`] keeps the authoritative in-memory copy of every
//!   order, partitioned by fulfillment date, and hands out order numbers.
//! - [`backend::StorageBackend`] moves raw text in and out of storage, one body
//!   per fulfillment date plus the two reference catalogs.
//! - [`codec`] turns that text into orders and back.
//!
//! ## Persistence Model
//!
//! Mutations (add, edit, remove) only touch memory. Writing to storage is an
//! explicit step: [`DataStore::save_order`] rewrites one date,
//! [`DataStore::save_all_orders`] rewrites every date that has orders or was
//! touched since the last save. A date whose last order was removed has its
//! file deleted instead of being left with a bare header.
//!
//! A failed save leaves memory as it was; the same save can be retried.
//!
//! ## Implementations
//!
//! - [`FileStore`]: production store over [`fs_backend::FsBackend`].
//! - [`InMemoryStore`]: store over [`mem_backend::MemBackend`], for tests.
//!
//! ## Storage Layout
//!
//! ```text
//! <home>/
//! ├── config.json               # FlooringConfig
//! ├── Data/
//! │   ├── Products.txt          # ProductType::CostPerSquareFoot::LaborCostPerSquareFoot
//! │   └── Taxes.txt             # State::StateName::TaxRate
//! └── Orders/
//!     └── Orders_MMDDYYYY.txt   # header + one order per line
//! ```

use crate::error::Result;
use crate::model::{Order, OrderEdit, Product, StateTax};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::PathBuf;

pub mod backend;
pub mod codec;
pub mod fs_backend;
pub mod mem_backend;
pub mod order_store;

pub type FileStore = order_store::OrderStore<fs_backend::FsBackend>;
pub type InMemoryStore = order_store::OrderStore<mem_backend::MemBackend>;

/// Report from loading orders out of storage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub dates_loaded: usize,
    pub orders_loaded: usize,
}

/// Abstract interface for order storage.
pub trait DataStore {
    /// Read every order file into memory, replacing the partitions it covers.
    fn load_all_orders(&mut self) -> Result<LoadReport>;

    /// Read the products catalog.
    fn load_products(&self) -> Result<Vec<Product>>;

    /// Read the state tax catalog.
    fn load_state_taxes(&self) -> Result<Vec<StateTax>>;

    /// Look up one order. Fails with `NoOrdersOnDate` when the date has no
    /// orders at all, `OrderNotFound` when it has orders but not this one.
    fn get_order(&self, order_number: u32, date: NaiveDate) -> Result<&Order>;

    /// All orders on a date, ascending by order number.
    fn get_orders_on_date(&self, date: NaiveDate) -> Result<Vec<&Order>>;

    /// Insert an order under its own date and number, returning whatever
    /// previously occupied that slot.
    fn add_order(&mut self, order: Order) -> Option<Order>;

    /// Build a priced order with the next available number. The order is
    /// not inserted; pass it to [`DataStore::add_order`] to commit it.
    fn create_order(
        &self,
        date: NaiveDate,
        customer_name: &str,
        state_tax: StateTax,
        product: Product,
        area: Decimal,
    ) -> Result<Order>;

    /// Apply an edit in place. `Ok(None)` means nothing changed.
    /// Costs are not recalculated.
    fn edit_order(
        &mut self,
        order_number: u32,
        date: NaiveDate,
        edit: OrderEdit,
    ) -> Result<Option<&mut Order>>;

    /// Remove and return an order, dropping the date once it is empty.
    fn remove_order(&mut self, order_number: u32, date: NaiveDate) -> Result<Order>;

    /// Persist one date. An empty date deletes its file.
    fn save_order(&mut self, date: NaiveDate) -> Result<()>;

    /// Persist every date with orders, plus every emptied date not yet saved.
    fn save_all_orders(&mut self) -> Result<()>;

    /// One past the highest order number on any date, or 1 when empty.
    /// Fails once the highest number is `u32::MAX`.
    fn next_order_number(&self) -> Result<u32>;

    /// Dates changed in memory since they were last loaded or saved.
    fn dirty_dates(&self) -> Vec<NaiveDate>;

    /// Storage location for a date's orders.
    fn orders_path(&self, date: NaiveDate) -> PathBuf;
}
