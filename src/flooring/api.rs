//! # API Facade
//!
//! The API layer is the single entry point for collaborators (the bundled CLI,
//! or any other front end). It owns the store and the reference catalogs and
//! adds the input rules the store itself does not enforce.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Resolves** catalog keys (product type, state abbreviation) into values
//! - **Validates** customer names and areas before they reach the store
//! - **Keeps costs consistent**: an edited order is repriced before it is returned
//!
//! ## What the API Does NOT Do
//!
//! - **Presentation**: no stdout, stderr or formatting
//! - **Implicit persistence**: nothing is written until `save_order` or
//!   `save_all_orders` is called
//!
//! ## Generic Over DataStore
//!
//! `FlooringApi<S: DataStore>` is generic over the storage backend:
//! - Production: `FlooringApi<FileStore>`
//! - Testing: `FlooringApi<InMemoryStore>`

use crate::catalog::Catalog;
use crate::error::{FlooringError, Result};
use crate::model::{self, Order, OrderEdit, Product, StateTax};
use crate::pricing::{self, round2};
use crate::store::{DataStore, LoadReport};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Partial update for an order, expressed in catalog keys. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderChanges {
    pub customer_name: Option<String>,
    pub state: Option<String>,
    pub product: Option<String>,
    pub area: Option<Decimal>,
}

/// The main API facade for flooring operations.
pub struct FlooringApi<S: DataStore> {
    store: S,
    catalog: Catalog,
    minimum_area: Decimal,
}

impl<S: DataStore> FlooringApi<S> {
    pub fn new(store: S, minimum_area: Decimal) -> Self {
        Self {
            store,
            catalog: Catalog::default(),
            minimum_area,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load both catalogs and every order file.
    pub fn load_all(&mut self) -> Result<LoadReport> {
        self.load_all_products()?;
        self.load_all_state_taxes()?;
        self.load_all_orders()
    }

    pub fn load_all_products(&mut self) -> Result<usize> {
        let products = self.store.load_products()?;
        let count = products.len();
        self.catalog.set_products(products);
        Ok(count)
    }

    pub fn load_all_state_taxes(&mut self) -> Result<usize> {
        let taxes = self.store.load_state_taxes()?;
        let count = taxes.len();
        self.catalog.set_state_taxes(taxes);
        Ok(count)
    }

    pub fn load_all_orders(&mut self) -> Result<LoadReport> {
        self.store.load_all_orders()
    }

    pub fn products(&self) -> Vec<&Product> {
        self.catalog.products()
    }

    pub fn state_taxes(&self) -> Vec<&StateTax> {
        self.catalog.state_taxes()
    }

    pub fn get_product(&self, product_type: &str) -> Result<&Product> {
        self.catalog.product(product_type)
    }

    pub fn get_state_tax(&self, abbreviation: &str) -> Result<&StateTax> {
        self.catalog.state_tax(abbreviation)
    }

    pub fn minimum_area(&self) -> Decimal {
        self.minimum_area
    }

    pub fn is_valid_customer_name(&self, name: &str) -> bool {
        model::is_valid_customer_name(name)
    }

    pub fn get_order(&self, order_number: u32, date: NaiveDate) -> Result<&Order> {
        self.store.get_order(order_number, date)
    }

    pub fn get_orders_on_date(&self, date: NaiveDate) -> Result<Vec<&Order>> {
        self.store.get_orders_on_date(date)
    }

    /// Build a priced order from catalog keys. Nothing is stored; pass the
    /// result to [`FlooringApi::add_order`] to commit it.
    pub fn create_order(
        &self,
        date: NaiveDate,
        customer_name: &str,
        state: &str,
        product_type: &str,
        area: Decimal,
    ) -> Result<Order> {
        self.check_customer_name(customer_name)?;
        let area = self.check_area(area)?;
        let state_tax = self.catalog.state_tax(state)?.clone();
        let product = self.catalog.product(product_type)?.clone();
        self.store
            .create_order(date, customer_name, state_tax, product, area)
    }

    pub fn add_order(&mut self, order: Order) -> Option<Order> {
        self.store.add_order(order)
    }

    /// Apply new values to an order and reprice it.
    ///
    /// Returns `Ok(None)` when the values match the order as it stands.
    /// Passing the values from [`Order::current_edit`] taken before an edit
    /// reverts that edit.
    pub fn edit_order(
        &mut self,
        order_number: u32,
        date: NaiveDate,
        mut edit: OrderEdit,
    ) -> Result<Option<Order>> {
        self.check_customer_name(&edit.customer_name)?;
        edit.area = self.check_area(edit.area)?;
        // Price first so a failed edit leaves the stored order untouched
        pricing::calculate(edit.area, &edit.product, &edit.state_tax)?;

        match self.store.edit_order(order_number, date, edit)? {
            Some(order) => Ok(Some(order.recalculate()?.clone())),
            None => Ok(None),
        }
    }

    /// Like [`FlooringApi::edit_order`], but only the given fields change and
    /// state and product are named by catalog key.
    pub fn update_order(
        &mut self,
        order_number: u32,
        date: NaiveDate,
        changes: OrderChanges,
    ) -> Result<Option<Order>> {
        let mut edit = self.store.get_order(order_number, date)?.current_edit();
        if let Some(name) = changes.customer_name {
            edit.customer_name = name;
        }
        if let Some(state) = changes.state {
            edit.state_tax = self.catalog.state_tax(&state)?.clone();
        }
        if let Some(product_type) = changes.product {
            edit.product = self.catalog.product(&product_type)?.clone();
        }
        if let Some(area) = changes.area {
            edit.area = area;
        }
        self.edit_order(order_number, date, edit)
    }

    pub fn remove_order(&mut self, order_number: u32, date: NaiveDate) -> Result<Order> {
        self.store.remove_order(order_number, date)
    }

    pub fn save_order(&mut self, date: NaiveDate) -> Result<()> {
        self.store.save_order(date)
    }

    pub fn save_all_orders(&mut self) -> Result<()> {
        self.store.save_all_orders()
    }

    pub fn next_order_number(&self) -> Result<u32> {
        self.store.next_order_number()
    }

    pub fn dirty_dates(&self) -> Vec<NaiveDate> {
        self.store.dirty_dates()
    }

    pub fn orders_path(&self, date: NaiveDate) -> PathBuf {
        self.store.orders_path(date)
    }

    fn check_customer_name(&self, name: &str) -> Result<()> {
        if model::is_valid_customer_name(name) {
            Ok(())
        } else {
            Err(FlooringError::InvalidInput(format!(
                "Customer name '{name}' may only contain letters, digits, spaces, commas and periods"
            )))
        }
    }

    fn check_area(&self, area: Decimal) -> Result<Decimal> {
        let area = round2(area).ok_or(FlooringError::AmountOutOfRange("area"))?;
        if area < self.minimum_area {
            return Err(FlooringError::InvalidInput(format!(
                "Area {area} is below the minimum of {} sq ft",
                self.minimum_area
            )));
        }
        Ok(area)
    }
}
