//! # Order Pricing
//!
//! Derived costs are computed from area, product and state tax:
//!
//! ```text
//! material = round2(area * cost_per_sqft)
//! labor    = round2(area * labor_cost_per_sqft)
//! tax      = round2((material + labor) * round2(tax_rate / 100))
//! total    = round2(material + labor + tax)
//! ```
//!
//! Every step rounds half-up to two places. Rounding the rate itself before
//! multiplying changes the last cent for rates like `9.25`, and stored orders
//! depend on that exact sequence.
//!
//! Arithmetic is checked. An amount too large to hold two fractional digits
//! fails with [`FlooringError::AmountOutOfRange`] instead of losing cents.

use crate::error::{FlooringError, Result};
use crate::model::{Product, StateTax};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// The four derived cost fields of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderCosts {
    pub material_cost: Decimal,
    pub labor_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Round half-up to two places and pin the scale to exactly two digits.
/// Returns None when the value is too large to carry two fractional digits.
pub fn round2(value: Decimal) -> Option<Decimal> {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    (rounded.scale() == 2).then_some(rounded)
}

fn money(field: &'static str, value: Option<Decimal>) -> Result<Decimal> {
    value
        .and_then(round2)
        .ok_or(FlooringError::AmountOutOfRange(field))
}

pub fn calculate(area: Decimal, product: &Product, state_tax: &StateTax) -> Result<OrderCosts> {
    let material_cost = money(
        "material cost",
        area.checked_mul(product.cost_per_square_foot),
    )?;
    let labor_cost = money(
        "labor cost",
        area.checked_mul(product.labor_cost_per_square_foot),
    )?;
    let rate = money(
        "tax rate",
        state_tax.tax_rate.checked_div(Decimal::ONE_HUNDRED),
    )?;
    let subtotal = material_cost.checked_add(labor_cost);
    let tax = money("tax", subtotal.and_then(|s| s.checked_mul(rate)))?;
    let total = money("total", subtotal.and_then(|s| s.checked_add(tax)))?;

    Ok(OrderCosts {
        material_cost,
        labor_cost,
        tax,
        total,
    })
}
