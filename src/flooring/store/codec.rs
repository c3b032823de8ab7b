//! # Record Codec
//!
//! Orders, products and state taxes are stored as one record per line, with
//! fields separated by [`DELIMITER`]. Every file starts with a header line that
//! is discarded on read and regenerated verbatim on write.
//!
//! Order records carry twelve fields:
//!
//! ```text
//! OrderNumber::CustomerName::State::TaxRate::ProductType::Area::
//! CostPerSquareFoot::LaborCostPerSquareFoot::MaterialCost::LaborCost::Tax::Total
//! ```
//!
//! The fulfillment date is not part of the record (it comes from the file
//! name), and neither is the state's full name, which decodes as empty.
//!
//! Decimals are written with the scale they carry, so a record that was read
//! in is written back byte for byte.

use crate::model::{Order, Product, StateTax};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

pub const DELIMITER: &str = "::";

pub const ORDER_FIELDS: [&str; 12] = [
    "OrderNumber",
    "CustomerName",
    "State",
    "TaxRate",
    "ProductType",
    "Area",
    "CostPerSquareFoot",
    "LaborCostPerSquareFoot",
    "MaterialCost",
    "LaborCost",
    "Tax",
    "Total",
];

pub const PRODUCT_FIELDS: [&str; 3] = ["ProductType", "CostPerSquareFoot", "LaborCostPerSquareFoot"];

pub const STATE_TAX_FIELDS: [&str; 3] = ["State", "StateName", "TaxRate"];

/// Why a single line failed to decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("{field} is not a valid order number: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("{field} is not a valid decimal: '{value}'")]
    InvalidDecimal { field: &'static str, value: String },
}

pub fn order_header() -> String {
    ORDER_FIELDS.join(DELIMITER)
}

pub fn product_header() -> String {
    PRODUCT_FIELDS.join(DELIMITER)
}

pub fn state_tax_header() -> String {
    STATE_TAX_FIELDS.join(DELIMITER)
}

fn split_fields<const N: usize>(line: &str) -> Result<[&str; N], RecordError> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    fields.try_into().map_err(|fields: Vec<&str>| RecordError::FieldCount {
        expected: N,
        found: fields.len(),
    })
}

/// Values that do not render back to the same text (more digits than a
/// `Decimal` holds, a leading `+`, padding zeros) are rejected so that a
/// stored line always re-encodes byte for byte.
fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, RecordError> {
    let invalid = || RecordError::InvalidDecimal {
        field,
        value: value.to_string(),
    };
    let decimal = Decimal::from_str(value).map_err(|_| invalid())?;
    if decimal.to_string() != value {
        return Err(invalid());
    }
    Ok(decimal)
}

pub fn encode_order(order: &Order) -> String {
    [
        order.order_number.to_string(),
        order.customer_name.clone(),
        order.state_tax.state_abbreviation.clone(),
        order.state_tax.tax_rate.to_string(),
        order.product.product_type.clone(),
        order.area.to_string(),
        order.product.cost_per_square_foot.to_string(),
        order.product.labor_cost_per_square_foot.to_string(),
        order.material_cost.to_string(),
        order.labor_cost.to_string(),
        order.tax.to_string(),
        order.total.to_string(),
    ]
    .join(DELIMITER)
}

pub fn decode_order(line: &str, fulfillment_date: NaiveDate) -> Result<Order, RecordError> {
    let [number, customer_name, state, tax_rate, product_type, area, cost, labor, material_cost, labor_cost, tax, total] =
        split_fields::<12>(line)?;

    let order_number = number
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0 && n.to_string() == number)
        .ok_or_else(|| RecordError::InvalidInteger {
            field: ORDER_FIELDS[0],
            value: number.to_string(),
        })?;

    Ok(Order {
        order_number,
        fulfillment_date,
        customer_name: customer_name.to_string(),
        state_tax: StateTax::new(state, "", parse_decimal(ORDER_FIELDS[3], tax_rate)?),
        product: Product::new(
            product_type,
            parse_decimal(ORDER_FIELDS[6], cost)?,
            parse_decimal(ORDER_FIELDS[7], labor)?,
        ),
        area: parse_decimal(ORDER_FIELDS[5], area)?,
        material_cost: parse_decimal(ORDER_FIELDS[8], material_cost)?,
        labor_cost: parse_decimal(ORDER_FIELDS[9], labor_cost)?,
        tax: parse_decimal(ORDER_FIELDS[10], tax)?,
        total: parse_decimal(ORDER_FIELDS[11], total)?,
    })
}

pub fn encode_product(product: &Product) -> String {
    format!(
        "{}{d}{}{d}{}",
        product.product_type,
        product.cost_per_square_foot,
        product.labor_cost_per_square_foot,
        d = DELIMITER
    )
}

pub fn decode_product(line: &str) -> Result<Product, RecordError> {
    let [product_type, cost, labor] = split_fields::<3>(line)?;
    Ok(Product::new(
        product_type,
        parse_decimal(PRODUCT_FIELDS[1], cost)?,
        parse_decimal(PRODUCT_FIELDS[2], labor)?,
    ))
}

pub fn encode_state_tax(state_tax: &StateTax) -> String {
    format!(
        "{}{d}{}{d}{}",
        state_tax.state_abbreviation,
        state_tax.state_name,
        state_tax.tax_rate,
        d = DELIMITER
    )
}

pub fn decode_state_tax(line: &str) -> Result<StateTax, RecordError> {
    let [abbreviation, name, rate] = split_fields::<3>(line)?;
    Ok(StateTax::new(
        abbreviation,
        name,
        parse_decimal(STATE_TAX_FIELDS[2], rate)?,
    ))
}

/// Data lines of a file body: the header is dropped, as are blank lines.
/// Yields 1-based line numbers for error reporting.
pub fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line))
}

/// Render a complete file body: header, then one line per record.
pub fn render_body(header: &str, lines: impl IntoIterator<Item = String>) -> String {
    let mut body = String::from(header);
    body.push('\n');
    for line in lines {
        body.push_str(&line);
        body.push('\n');
    }
    body
}
