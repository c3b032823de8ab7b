use super::backend::{CatalogKind, StorageBackend};
use super::codec::{self, RecordError};
use super::{DataStore, LoadReport};
use crate::error::{FlooringError, Result};
use crate::model::{Order, OrderEdit, Product, StateTax};
use crate::pricing::round2;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{debug, info};

type Partition = BTreeMap<u32, Order>;

pub struct OrderStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    partitions: BTreeMap<NaiveDate, Partition>,
    dirty: BTreeSet<NaiveDate>,
}

impl<B: StorageBackend> OrderStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            partitions: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read_catalog<T>(
        &self,
        kind: CatalogKind,
        decode: impl Fn(&str) -> std::result::Result<T, RecordError>,
    ) -> Result<Vec<T>> {
        let content = self.backend.read_catalog(kind)?;
        let records = decode_body(|| kind.file_name().to_string(), &content, decode)?;
        debug!(catalog = kind.file_name(), records = records.len(), "loaded catalog");
        Ok(records)
    }
}

fn decode_body<T>(
    origin: impl Fn() -> String,
    content: &str,
    decode: impl Fn(&str) -> std::result::Result<T, RecordError>,
) -> Result<Vec<T>> {
    codec::data_lines(content)
        .map(|(line, text)| {
            decode(text).map_err(|source| FlooringError::Malformed {
                origin: origin(),
                line,
                source,
            })
        })
        .collect()
}

fn partition_of(
    partitions: &BTreeMap<NaiveDate, Partition>,
    date: NaiveDate,
) -> Result<&Partition> {
    partitions
        .get(&date)
        .filter(|p| !p.is_empty())
        .ok_or(FlooringError::NoOrdersOnDate(date))
}

fn partition_of_mut(
    partitions: &mut BTreeMap<NaiveDate, Partition>,
    date: NaiveDate,
) -> Result<&mut Partition> {
    partitions
        .get_mut(&date)
        .filter(|p| !p.is_empty())
        .ok_or(FlooringError::NoOrdersOnDate(date))
}

fn not_found(order_number: u32, date: NaiveDate) -> FlooringError {
    FlooringError::OrderNotFound { order_number, date }
}

impl<B: StorageBackend> DataStore for OrderStore<B> {
    fn load_all_orders(&mut self) -> Result<LoadReport> {
        // Decode everything first so a bad file leaves memory untouched
        let mut loaded = Vec::new();
        for date in self.backend.list_order_dates()? {
            let Some(content) = self.backend.read_orders(date)? else {
                continue;
            };
            let orders = decode_body(
                || self.backend.orders_path(date).display().to_string(),
                &content,
                |line| codec::decode_order(line, date),
            )?;
            loaded.push((date, orders));
        }

        let mut report = LoadReport::default();
        for (date, orders) in loaded {
            self.dirty.remove(&date);
            // A header-only file contributes no partition
            if orders.is_empty() {
                continue;
            }
            report.dates_loaded += 1;
            report.orders_loaded += orders.len();
            let partition = orders
                .into_iter()
                .map(|order| (order.order_number, order))
                .collect();
            self.partitions.insert(date, partition);
        }

        info!(
            dates = report.dates_loaded,
            orders = report.orders_loaded,
            "loaded orders"
        );
        Ok(report)
    }

    fn load_products(&self) -> Result<Vec<Product>> {
        self.read_catalog(CatalogKind::Products, codec::decode_product)
    }

    fn load_state_taxes(&self) -> Result<Vec<StateTax>> {
        self.read_catalog(CatalogKind::StateTaxes, codec::decode_state_tax)
    }

    fn get_order(&self, order_number: u32, date: NaiveDate) -> Result<&Order> {
        partition_of(&self.partitions, date)?
            .get(&order_number)
            .ok_or_else(|| not_found(order_number, date))
    }

    fn get_orders_on_date(&self, date: NaiveDate) -> Result<Vec<&Order>> {
        Ok(partition_of(&self.partitions, date)?.values().collect())
    }

    fn add_order(&mut self, order: Order) -> Option<Order> {
        let date = order.fulfillment_date;
        self.dirty.insert(date);
        self.partitions
            .entry(date)
            .or_default()
            .insert(order.order_number, order)
    }

    fn create_order(
        &self,
        date: NaiveDate,
        customer_name: &str,
        state_tax: StateTax,
        product: Product,
        area: Decimal,
    ) -> Result<Order> {
        let area = round2(area).ok_or(FlooringError::AmountOutOfRange("area"))?;
        Order::new(
            date,
            self.next_order_number()?,
            customer_name,
            state_tax,
            product,
            area,
        )
    }

    fn edit_order(
        &mut self,
        order_number: u32,
        date: NaiveDate,
        edit: OrderEdit,
    ) -> Result<Option<&mut Order>> {
        let order = partition_of_mut(&mut self.partitions, date)?
            .get_mut(&order_number)
            .ok_or_else(|| not_found(order_number, date))?;

        if order.edit(edit).is_none() {
            return Ok(None);
        }
        self.dirty.insert(date);
        Ok(Some(order))
    }

    fn remove_order(&mut self, order_number: u32, date: NaiveDate) -> Result<Order> {
        let partition = partition_of_mut(&mut self.partitions, date)?;
        let order = partition
            .remove(&order_number)
            .ok_or_else(|| not_found(order_number, date))?;

        if partition.is_empty() {
            self.partitions.remove(&date);
        }
        self.dirty.insert(date);
        Ok(order)
    }

    fn save_order(&mut self, date: NaiveDate) -> Result<()> {
        match partition_of(&self.partitions, date) {
            Ok(partition) => {
                let body = codec::render_body(
                    &codec::order_header(),
                    partition.values().map(codec::encode_order),
                );
                self.backend.write_orders(date, &body)?;
                debug!(%date, orders = partition.len(), "saved orders");
            }
            Err(_) => {
                self.backend.delete_orders(date)?;
                debug!(%date, "no orders left, removed file");
            }
        }
        self.dirty.remove(&date);
        Ok(())
    }

    fn save_all_orders(&mut self) -> Result<()> {
        let dates: BTreeSet<NaiveDate> = self
            .partitions
            .keys()
            .chain(self.dirty.iter())
            .copied()
            .collect();
        for date in dates {
            self.save_order(date)?;
        }
        Ok(())
    }

    fn next_order_number(&self) -> Result<u32> {
        let highest = self
            .partitions
            .values()
            .flat_map(|partition| partition.keys())
            .max()
            .copied()
            .unwrap_or(0);
        highest
            .checked_add(1)
            .ok_or(FlooringError::OrderNumbersExhausted(highest))
    }

    fn dirty_dates(&self) -> Vec<NaiveDate> {
        self.dirty.iter().copied().collect()
    }

    fn orders_path(&self, date: NaiveDate) -> PathBuf {
        self.backend.orders_path(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use crate::store::InMemoryStore;
    use std::str::FromStr;

    const HEADER: &str = "OrderNumber::CustomerName::State::TaxRate::ProductType::Area::CostPerSquareFoot::LaborCostPerSquareFoot::MaterialCost::LaborCost::Tax::Total";
    const ADA_LINE: &str =
        "1::Ada Lovelace::CA::25.00::Tile::249.00::3.50::4.15::871.50::1033.35::476.21::2381.06";
    const DOCTOR_LINE: &str =
        "2::Doctor Who::WA::9.25::Wood::243.00::5.15::4.75::1251.45::1154.25::216.51::2622.21";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2013, 6, day).unwrap()
    }

    fn tile() -> Product {
        Product::new("Tile", dec("3.50"), dec("4.15"))
    }

    fn california() -> StateTax {
        StateTax::new("CA", "California", dec("25.00"))
    }

    fn order(number: u32, date: NaiveDate, name: &str) -> Order {
        Order::new(date, number, name, california(), tile(), dec("249.00")).unwrap()
    }

    fn new_store() -> InMemoryStore {
        OrderStore::with_backend(MemBackend::new())
    }

    fn loaded_store(files: &[(NaiveDate, String)]) -> InMemoryStore {
        let backend = MemBackend::new();
        for (date, body) in files {
            backend.set_orders(*date, body.clone());
        }
        let mut store = OrderStore::with_backend(backend);
        store.load_all_orders().unwrap();
        store
    }

    #[test]
    fn next_number_on_empty_store_is_one() {
        assert_eq!(new_store().next_order_number().unwrap(), 1);
    }

    #[test]
    fn next_number_is_global_across_dates() {
        let mut store = new_store();
        store.add_order(order(1, june(1), "Ada"));
        store.add_order(order(3, june(2), "Grace"));
        assert_eq!(store.next_order_number().unwrap(), 4);
    }

    #[test]
    fn next_number_fails_when_numbers_run_out() {
        let last = format!(
            "{HEADER}\n4294967295::Ada Lovelace::CA::25.00::Tile::249.00::3.50::4.15::871.50::1033.35::476.21::2381.06\n"
        );
        let store = loaded_store(&[(june(1), last)]);

        assert!(matches!(
            store.next_order_number(),
            Err(FlooringError::OrderNumbersExhausted(u32::MAX))
        ));
        assert!(matches!(
            store.create_order(june(2), "Grace", california(), tile(), dec("100")),
            Err(FlooringError::OrderNumbersExhausted(_))
        ));
    }

    #[test]
    fn create_rejects_area_without_room_for_cents() {
        let store = new_store();
        assert!(matches!(
            store.create_order(june(1), "Ada", california(), tile(), Decimal::MAX),
            Err(FlooringError::AmountOutOfRange("area"))
        ));
    }

    #[test]
    fn get_distinguishes_missing_date_from_missing_number() {
        let mut store = new_store();
        store.add_order(order(1, june(1), "Ada"));

        assert!(matches!(
            store.get_order(1, june(2)),
            Err(FlooringError::NoOrdersOnDate(d)) if d == june(2)
        ));
        assert!(matches!(
            store.get_order(4, june(1)),
            Err(FlooringError::OrderNotFound { order_number: 4, date }) if date == june(1)
        ));
        assert_eq!(store.get_order(1, june(1)).unwrap().customer_name, "Ada");
    }

    #[test]
    fn orders_on_date_are_sorted() {
        let mut store = new_store();
        for n in [3, 1, 2] {
            store.add_order(order(n, june(1), "Ada"));
        }

        let numbers: Vec<u32> = store
            .get_orders_on_date(june(1))
            .unwrap()
            .iter()
            .map(|o| o.order_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        assert!(matches!(
            store.get_orders_on_date(june(9)),
            Err(FlooringError::NoOrdersOnDate(_))
        ));
    }

    #[test]
    fn add_replaces_existing_slot() {
        let mut store = new_store();
        assert!(store.add_order(order(1, june(1), "Ada")).is_none());

        let previous = store.add_order(order(1, june(1), "Grace")).unwrap();
        assert_eq!(previous.customer_name, "Ada");
        assert_eq!(store.get_order(1, june(1)).unwrap().customer_name, "Grace");
        assert_eq!(store.get_orders_on_date(june(1)).unwrap().len(), 1);
    }

    #[test]
    fn create_prices_but_does_not_insert() {
        let mut store = new_store();
        store.add_order(order(5, june(1), "Ada"));

        let created = store.create_order(
            june(2),
            "Doctor Who",
            StateTax::new("WA", "Washington", dec("9.25")),
            Product::new("Wood", dec("5.15"), dec("4.75")),
            dec("242.995"),
        )
        .unwrap();

        assert_eq!(created.order_number, 6);
        assert_eq!(created.area.to_string(), "243.00");
        assert_eq!(created.material_cost, dec("1251.45"));
        assert_eq!(created.labor_cost, dec("1154.25"));
        assert_eq!(created.tax, dec("216.51"));
        assert_eq!(created.total, dec("2622.21"));

        assert!(store.get_orders_on_date(june(2)).is_err());
        assert_eq!(store.next_order_number().unwrap(), 6);
        assert!(!store.dirty_dates().contains(&june(2)));
    }

    #[test]
    fn edit_without_changes_is_noop() {
        let mut store = loaded_store(&[(june(1), format!("{HEADER}\n{ADA_LINE}\n"))]);
        let before = store.get_order(1, june(1)).unwrap().clone();
        let edit = before.current_edit();

        assert!(store.edit_order(1, june(1), edit).unwrap().is_none());
        assert_eq!(store.get_order(1, june(1)).unwrap(), &before);
        assert!(store.dirty_dates().is_empty());
    }

    #[test]
    fn edit_mutates_in_place_without_repricing() {
        let mut store = loaded_store(&[(june(1), format!("{HEADER}\n{ADA_LINE}\n"))]);
        let edit = OrderEdit {
            customer_name: "Ada Lovelace III".to_string(),
            state_tax: StateTax::new("OR", "Oregon", dec("1.00")),
            product: Product::new("Wood", dec("1.00"), dec("1.00")),
            area: dec("100.00"),
        };

        let edited = store.edit_order(1, june(1), edit).unwrap().unwrap();
        assert_eq!(edited.total, dec("2381.06"));
        edited.recalculate().unwrap();

        let stored = store.get_order(1, june(1)).unwrap();
        assert_eq!(stored.customer_name, "Ada Lovelace III");
        assert_eq!(stored.total, dec("202.00"));
        assert_eq!(store.dirty_dates(), vec![june(1)]);
    }

    #[test]
    fn edit_of_unknown_order_fails() {
        let mut store = new_store();
        let edit = order(1, june(1), "Ada").current_edit();
        assert!(matches!(
            store.edit_order(1, june(1), edit),
            Err(FlooringError::NoOrdersOnDate(_))
        ));
    }

    #[test]
    fn remove_then_get() {
        let mut store = new_store();
        store.add_order(order(1, june(1), "Ada"));
        store.add_order(order(2, june(1), "Grace"));

        let removed = store.remove_order(1, june(1)).unwrap();
        assert_eq!(removed.customer_name, "Ada");
        assert!(matches!(
            store.get_order(1, june(1)),
            Err(FlooringError::OrderNotFound { .. })
        ));

        store.remove_order(2, june(1)).unwrap();
        assert!(matches!(
            store.get_order(2, june(1)),
            Err(FlooringError::NoOrdersOnDate(_))
        ));
        assert_eq!(store.next_order_number().unwrap(), 1);
    }

    #[test]
    fn remove_missing_order_does_not_mutate() {
        let mut store = new_store();
        store.add_order(order(1, june(1), "Ada"));
        store.save_all_orders().unwrap();

        assert!(matches!(
            store.remove_order(9, june(1)),
            Err(FlooringError::OrderNotFound { .. })
        ));
        assert!(matches!(
            store.remove_order(1, june(2)),
            Err(FlooringError::NoOrdersOnDate(_))
        ));
        assert!(store.dirty_dates().is_empty());
        assert!(store.get_order(1, june(1)).is_ok());
    }

    #[test]
    fn save_writes_header_and_sorted_lines() {
        let mut store = new_store();
        let ada = codec::decode_order(ADA_LINE, june(1)).unwrap();
        let doctor = codec::decode_order(DOCTOR_LINE, june(1)).unwrap();
        store.add_order(doctor);
        store.add_order(ada);

        store.save_order(june(1)).unwrap();

        assert_eq!(
            store.backend.orders_content(june(1)).unwrap(),
            format!("{HEADER}\n{ADA_LINE}\n{DOCTOR_LINE}\n")
        );
        assert!(store.dirty_dates().is_empty());
    }

    #[test]
    fn load_then_save_is_byte_identical() {
        let body = format!("{HEADER}\n{ADA_LINE}\n{DOCTOR_LINE}\n");
        let mut store = loaded_store(&[(june(1), body.clone())]);

        store.save_order(june(1)).unwrap();

        assert_eq!(store.backend.orders_content(june(1)).unwrap(), body);
    }

    #[test]
    fn saving_emptied_date_deletes_file() {
        let mut store = loaded_store(&[(june(1), format!("{HEADER}\n{ADA_LINE}\n"))]);

        store.remove_order(1, june(1)).unwrap();
        store.save_order(june(1)).unwrap();

        assert_eq!(store.backend.orders_content(june(1)), None);
    }

    #[test]
    fn save_all_covers_emptied_dates() {
        let mut store = loaded_store(&[
            (june(1), format!("{HEADER}\n{ADA_LINE}\n")),
            (june(2), format!("{HEADER}\n{DOCTOR_LINE}\n")),
        ]);

        store.remove_order(1, june(1)).unwrap();
        store.add_order(order(7, june(3), "Grace"));
        assert_eq!(store.dirty_dates(), vec![june(1), june(3)]);

        store.save_all_orders().unwrap();

        assert_eq!(store.backend.orders_content(june(1)), None);
        assert!(store.backend.orders_content(june(2)).is_some());
        assert!(store
            .backend
            .orders_content(june(3))
            .unwrap()
            .contains("7::Grace::CA"));
        assert!(store.dirty_dates().is_empty());
    }

    #[test]
    fn header_only_file_creates_no_partition() {
        let store = loaded_store(&[(june(1), format!("{HEADER}\n"))]);
        assert!(matches!(
            store.get_orders_on_date(june(1)),
            Err(FlooringError::NoOrdersOnDate(_))
        ));
        assert_eq!(store.next_order_number().unwrap(), 1);
    }

    #[test]
    fn load_reports_counts() {
        let backend = MemBackend::new();
        backend.set_orders(june(1), format!("{HEADER}\n{ADA_LINE}\n{DOCTOR_LINE}\n"));
        backend.set_orders(june(2), format!("{HEADER}\n"));
        let mut store = OrderStore::with_backend(backend);

        let report = store.load_all_orders().unwrap();

        assert_eq!(
            report,
            LoadReport {
                dates_loaded: 1,
                orders_loaded: 2
            }
        );
    }

    #[test]
    fn malformed_line_fails_load_without_partial_state() {
        let backend = MemBackend::new();
        backend.set_orders(june(1), format!("{HEADER}\n{ADA_LINE}\n"));
        backend.set_orders(june(2), format!("{HEADER}\n{DOCTOR_LINE}\n2::broken\n"));
        let mut store = OrderStore::with_backend(backend);

        let err = store.load_all_orders().unwrap_err();

        match err {
            FlooringError::Malformed { origin, line, .. } => {
                assert_eq!(origin, "memory://Orders_06022013.txt");
                assert_eq!(line, 3);
            }
            other => panic!("Expected Malformed, got {other:?}"),
        }
        assert!(store.get_orders_on_date(june(1)).is_err());
    }

    #[test]
    fn failed_save_keeps_memory_and_can_retry() {
        let mut store = new_store();
        store.add_order(order(1, june(1), "Ada"));
        store.backend.set_simulate_write_error(true);

        let err = store.save_order(june(1)).unwrap_err();
        assert!(matches!(err, FlooringError::Persistence { .. }));
        assert!(store.get_order(1, june(1)).is_ok());
        assert_eq!(store.dirty_dates(), vec![june(1)]);

        store.backend.set_simulate_write_error(false);
        store.save_order(june(1)).unwrap();
        assert!(store.backend.orders_content(june(1)).is_some());
        assert!(store.dirty_dates().is_empty());
    }

    #[test]
    fn loads_catalogs() {
        let backend = MemBackend::new();
        backend.set_catalog(
            CatalogKind::Products,
            "ProductType::CostPerSquareFoot::LaborCostPerSquareFoot\nCarpet::2.25::2.10\nTile::3.50::4.15\n",
        );
        backend.set_catalog(
            CatalogKind::StateTaxes,
            "State::StateName::TaxRate\nTX::Texas::4.45\n",
        );
        let store = OrderStore::with_backend(backend);

        let products = store.load_products().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1], tile());

        let taxes = store.load_state_taxes().unwrap();
        assert_eq!(taxes[0].state_name, "Texas");
    }

    #[test]
    fn malformed_catalog_names_the_file() {
        let backend = MemBackend::new();
        backend.set_catalog(CatalogKind::StateTaxes, "header\nTX::Texas\n");
        let store = OrderStore::with_backend(backend);

        match store.load_state_taxes().unwrap_err() {
            FlooringError::Malformed { origin, line, .. } => {
                assert_eq!(origin, "Taxes.txt");
                assert_eq!(line, 2);
            }
            other => panic!("Expected Malformed, got {other:?}"),
        }
    }
}
