use crate::error::Result;
use crate::pricing::{self, OrderCosts};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A flooring product as listed in the products catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_type: String,
    pub cost_per_square_foot: Decimal,
    pub labor_cost_per_square_foot: Decimal,
}

impl Product {
    pub fn new(
        product_type: impl Into<String>,
        cost_per_square_foot: Decimal,
        labor_cost_per_square_foot: Decimal,
    ) -> Self {
        Self {
            product_type: product_type.into(),
            cost_per_square_foot,
            labor_cost_per_square_foot,
        }
    }
}

/// A state's sales tax rate, expressed as a percentage (`6.25` means 6.25%).
///
/// The full state name is informational only: order files do not carry it, so
/// equality is decided by abbreviation and rate alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTax {
    pub state_abbreviation: String,
    pub state_name: String,
    pub tax_rate: Decimal,
}

impl StateTax {
    pub fn new(
        state_abbreviation: impl Into<String>,
        state_name: impl Into<String>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            state_abbreviation: state_abbreviation.into(),
            state_name: state_name.into(),
            tax_rate,
        }
    }
}

impl PartialEq for StateTax {
    fn eq(&self, other: &Self) -> bool {
        self.state_abbreviation == other.state_abbreviation && self.tax_rate == other.tax_rate
    }
}

impl Eq for StateTax {}

/// An installation order. `order_number` is unique within `fulfillment_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_number: u32,
    pub fulfillment_date: NaiveDate,
    pub customer_name: String,
    pub state_tax: StateTax,
    pub product: Product,
    pub area: Decimal,
    pub material_cost: Decimal,
    pub labor_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Order {
    /// Build an order and price it from its inputs.
    pub fn new(
        fulfillment_date: NaiveDate,
        order_number: u32,
        customer_name: impl Into<String>,
        state_tax: StateTax,
        product: Product,
        area: Decimal,
    ) -> Result<Self> {
        let costs = pricing::calculate(area, &product, &state_tax)?;
        Ok(Self {
            order_number,
            fulfillment_date,
            customer_name: customer_name.into(),
            state_tax,
            product,
            area,
            material_cost: costs.material_cost,
            labor_cost: costs.labor_cost,
            tax: costs.tax,
            total: costs.total,
        })
    }

    /// Recompute the derived cost fields from area, product and state tax.
    /// On error the order is left as it was.
    pub fn recalculate(&mut self) -> Result<&mut Self> {
        let costs = pricing::calculate(self.area, &self.product, &self.state_tax)?;
        self.apply_costs(costs);
        Ok(self)
    }

    pub fn costs(&self) -> OrderCosts {
        OrderCosts {
            material_cost: self.material_cost,
            labor_cost: self.labor_cost,
            tax: self.tax,
            total: self.total,
        }
    }

    fn apply_costs(&mut self, costs: OrderCosts) {
        self.material_cost = costs.material_cost;
        self.labor_cost = costs.labor_cost;
        self.tax = costs.tax;
        self.total = costs.total;
    }

    /// Apply new editable values in place.
    ///
    /// Returns `None` without touching the order when every value already
    /// matches. Cost fields are left alone; call [`Order::recalculate`] after a
    /// successful edit.
    pub fn edit(&mut self, edit: OrderEdit) -> Option<&mut Self> {
        if edit.customer_name == self.customer_name
            && edit.state_tax == self.state_tax
            && edit.product == self.product
            && edit.area == self.area
        {
            return None;
        }

        self.customer_name = edit.customer_name;
        self.state_tax = edit.state_tax;
        self.product = edit.product;
        self.area = edit.area;
        Some(self)
    }

    /// Snapshot of the editable values, used to revert a cancelled edit.
    pub fn current_edit(&self) -> OrderEdit {
        OrderEdit {
            customer_name: self.customer_name.clone(),
            state_tax: self.state_tax.clone(),
            product: self.product.clone(),
            area: self.area,
        }
    }
}

/// The four user-editable values of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEdit {
    pub customer_name: String,
    pub state_tax: StateTax,
    pub product: Product,
    pub area: Decimal,
}

/// Customer names may not be blank and may only contain ASCII letters, digits,
/// spaces, commas and periods. This keeps the field delimiter out of records.
pub fn is_valid_customer_name(name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '.'))
}
