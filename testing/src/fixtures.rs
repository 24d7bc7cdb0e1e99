//! Catalog fixtures.
//!
//! [`Catalog`] hands out entities with sequential serial ids, the way the
//! database would, and wires them into orders. [`sample_catalog`] is the
//! shared dataset most handler tests start from.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity

use crate::order_mocks::InMemoryOrderRepository;
use chrono::{DateTime, TimeZone, Utc};
use retrofun_core::entity::{
    Country, CountryId, Customer, CustomerId, Manufacturer, ManufacturerId, Order, OrderId,
    OrderItem, Product, ProductId,
};

/// Builder for a small catalog of manufacturers, products, customers and orders.
///
/// # Example
///
/// ```
/// use retrofun_testing::Catalog;
/// use retrofun_testing::fixtures::march;
///
/// let mut catalog = Catalog::new();
/// let acme = catalog.manufacturer("Acme");
/// let gizmo = catalog.product("Gizmo", &acme, 1984, None, &[]);
/// let alice = catalog.customer("Alice");
/// let order = catalog.order(&alice, march(1), &[(&gizmo, 2, 9.5)]);
///
/// assert_eq!(order.total(), 19.0);
/// assert_eq!(catalog.orders().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    manufacturers: Vec<Manufacturer>,
    countries: Vec<Country>,
    products: Vec<Product>,
    customers: Vec<Customer>,
    orders: Vec<Order>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a manufacturer.
    pub fn manufacturer(&mut self, name: &str) -> Manufacturer {
        let manufacturer = Manufacturer {
            id: ManufacturerId::new(next_serial(self.manufacturers.len())),
            name: name.to_string(),
        };
        self.manufacturers.push(manufacturer.clone());
        manufacturer
    }

    /// Add a country.
    pub fn country(&mut self, name: &str) -> Country {
        let country = Country {
            id: CountryId::new(next_serial(self.countries.len())),
            name: name.to_string(),
        };
        self.countries.push(country.clone());
        country
    }

    /// Add a product made by `manufacturer` in `countries`.
    ///
    /// Countries are stored by ascending id.
    pub fn product(
        &mut self,
        name: &str,
        manufacturer: &Manufacturer,
        year: i32,
        cpu: Option<&str>,
        countries: &[&Country],
    ) -> Product {
        let mut countries: Vec<Country> = countries.iter().map(|&c| c.clone()).collect();
        countries.sort_by_key(|c| c.id);

        let product = Product {
            id: ProductId::new(next_serial(self.products.len())),
            name: name.to_string(),
            manufacturer: manufacturer.clone(),
            year,
            cpu: cpu.map(str::to_string),
            countries,
        };
        self.products.push(product.clone());
        product
    }

    /// Add a customer with a generated id and address.
    pub fn customer(&mut self, name: &str) -> Customer {
        let customer = Customer {
            id: CustomerId::new(),
            name: name.to_string(),
            address: Some(format!("{name} Street 1")),
            phone: None,
        };
        self.customers.push(customer.clone());
        customer
    }

    /// Add an order of `(product, quantity, unit_price)` line items.
    ///
    /// Items are stored by ascending product id.
    pub fn order(
        &mut self,
        customer: &Customer,
        timestamp: DateTime<Utc>,
        items: &[(&Product, u32, f64)],
    ) -> Order {
        let mut order_items: Vec<OrderItem> = items
            .iter()
            .map(|&(product, quantity, unit_price)| OrderItem {
                product: product.clone(),
                quantity,
                unit_price,
            })
            .collect();
        order_items.sort_by_key(|item| item.product.id);

        let order = Order {
            id: OrderId::new(),
            timestamp,
            customer: customer.clone(),
            order_items,
        };
        self.orders.push(order.clone());
        order
    }

    /// Every order added so far, in insertion order.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Every customer added so far.
    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Every product added so far.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Load the orders into an [`InMemoryOrderRepository`].
    #[must_use]
    pub fn into_repository(self) -> InMemoryOrderRepository {
        InMemoryOrderRepository::with_orders(self.orders)
    }
}

fn next_serial(len: usize) -> i32 {
    i32::try_from(len + 1).unwrap()
}

/// Noon UTC on the given day of March 2024.
#[must_use]
pub fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).single().unwrap()
}

/// The shared dataset:
///
/// | Placed   | Customer | Items                                  | Total |
/// |----------|----------|----------------------------------------|-------|
/// | March 1  | Alice    | Zed 2 × 10, Amber 1 × 5                | 25    |
/// | March 2  | Carol    | Commodore 64 1 × 150                   | 150   |
/// | March 3  | Dave     | Commodore 64 1 × 150, ZX Spectrum 2 × 100 | 350 |
/// | March 4  | Erin     | none (never listed)                    |       |
/// | March 5  | Carol    | ZX Spectrum 1 × 100                    | 100   |
///
/// Nobody named Bob has ordered anything.
#[must_use]
pub fn sample_catalog() -> Catalog {
    let mut catalog = Catalog::new();

    let acme = catalog.manufacturer("Acme");
    let commodore = catalog.manufacturer("Commodore");
    let sinclair = catalog.manufacturer("Sinclair");
    let usa = catalog.country("USA");
    let uk = catalog.country("UK");

    let zed = catalog.product("Zed", &acme, 1985, None, &[]);
    let amber = catalog.product("Amber", &acme, 1986, None, &[]);
    let c64 = catalog.product("Commodore 64", &commodore, 1982, Some("6510"), &[&usa]);
    let spectrum = catalog.product("ZX Spectrum", &sinclair, 1982, Some("Z80"), &[&uk, &usa]);

    let alice = catalog.customer("Alice");
    let carol = catalog.customer("Carol");
    let dave = catalog.customer("Dave");
    let erin = catalog.customer("Erin");

    catalog.order(&alice, march(1), &[(&zed, 2, 10.0), (&amber, 1, 5.0)]);
    catalog.order(&carol, march(2), &[(&c64, 1, 150.0)]);
    catalog.order(&dave, march(3), &[(&spectrum, 2, 100.0), (&c64, 1, 150.0)]);
    catalog.order(&erin, march(4), &[]);
    catalog.order(&carol, march(5), &[(&spectrum, 1, 100.0)]);

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_ids_and_sorted_relations() {
        let catalog = sample_catalog();

        let ids: Vec<i32> = catalog.products().iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let spectrum = &catalog.products()[3];
        let countries: Vec<&str> = spectrum.countries.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(countries, vec!["USA", "UK"]);

        let dave_order = &catalog.orders()[2];
        let products: Vec<&str> = dave_order
            .order_items
            .iter()
            .map(|item| item.product.name.as_str())
            .collect();
        assert_eq!(products, vec!["Commodore 64", "ZX Spectrum"]);
    }

    #[test]
    fn test_sample_totals() {
        let totals: Vec<f64> = sample_catalog().orders().iter().map(Order::total).collect();
        assert_eq!(totals, vec![25.0, 150.0, 350.0, 0.0, 100.0]);
    }
}
