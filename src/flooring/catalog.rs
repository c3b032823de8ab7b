use crate::error::{FlooringError, Result};
use crate::model::{Product, StateTax};
use std::collections::HashMap;

/// Read-only reference data: products keyed by type, state taxes keyed by
/// abbreviation. Loaded once at startup.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    products: HashMap<String, Product>,
    state_taxes: HashMap<String, StateTax>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, state_taxes: Vec<StateTax>) -> Self {
        let mut catalog = Self::default();
        catalog.set_products(products);
        catalog.set_state_taxes(state_taxes);
        catalog
    }

    /// Replace the products. A repeated type keeps the last entry.
    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products
            .into_iter()
            .map(|p| (p.product_type.clone(), p))
            .collect();
    }

    /// Replace the state taxes. A repeated abbreviation keeps the last entry.
    pub fn set_state_taxes(&mut self, state_taxes: Vec<StateTax>) {
        self.state_taxes = state_taxes
            .into_iter()
            .map(|s| (s.state_abbreviation.clone(), s))
            .collect();
    }

    pub fn product(&self, product_type: &str) -> Result<&Product> {
        self.products
            .get(product_type)
            .ok_or_else(|| FlooringError::UnknownProduct(product_type.to_string()))
    }

    pub fn state_tax(&self, abbreviation: &str) -> Result<&StateTax> {
        self.state_taxes
            .get(abbreviation)
            .ok_or_else(|| FlooringError::UnknownState(abbreviation.to_string()))
    }

    /// Products sorted by type.
    pub fn products(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.values().collect();
        products.sort_by(|a, b| a.product_type.cmp(&b.product_type));
        products
    }

    /// State taxes sorted by abbreviation.
    pub fn state_taxes(&self) -> Vec<&StateTax> {
        let mut taxes: Vec<&StateTax> = self.state_taxes.values().collect();
        taxes.sort_by(|a, b| a.state_abbreviation.cmp(&b.state_abbreviation));
        taxes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                Product::new("Wood", dec("5.15"), dec("4.75")),
                Product::new("Carpet", dec("2.25"), dec("2.10")),
            ],
            vec![
                StateTax::new("WA", "Washington", dec("9.25")),
                StateTax::new("KY", "Kentucky", dec("6.00")),
            ],
        )
    }

    #[test]
    fn lookups_by_key() {
        let catalog = catalog();
        assert_eq!(catalog.product("Wood").unwrap().cost_per_square_foot, dec("5.15"));
        assert_eq!(catalog.state_tax("KY").unwrap().state_name, "Kentucky");
    }

    #[test]
    fn unknown_keys() {
        let catalog = catalog();
        assert!(matches!(
            catalog.product("Marble"),
            Err(FlooringError::UnknownProduct(p)) if p == "Marble"
        ));
        assert!(matches!(
            catalog.state_tax("ZZ"),
            Err(FlooringError::UnknownState(s)) if s == "ZZ"
        ));
    }

    #[test]
    fn listings_are_sorted() {
        let catalog = catalog();
        let types: Vec<_> = catalog.products().iter().map(|p| p.product_type.as_str()).collect();
        assert_eq!(types, vec!["Carpet", "Wood"]);
        let states: Vec<_> = catalog
            .state_taxes()
            .iter()
            .map(|s| s.state_abbreviation.as_str())
            .collect();
        assert_eq!(states, vec!["KY", "WA"]);
    }

    #[test]
    fn duplicate_keys_keep_last() {
        let catalog = Catalog::new(
            vec![
                Product::new("Tile", dec("1.00"), dec("1.00")),
                Product::new("Tile", dec("3.50"), dec("4.15")),
            ],
            Vec::new(),
        );
        assert_eq!(catalog.products().len(), 1);
        assert_eq!(catalog.product("Tile").unwrap().cost_per_square_foot, dec("3.50"));
    }
}
