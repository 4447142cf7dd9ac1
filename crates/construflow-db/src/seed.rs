//! # Seed Data
//!
//! Starting catalog, clients and suppliers for a fresh store. These are the
//! values a collection reads as when its key has never been written.
//!
//! Users deliberately have no seed: an empty users collection routes the app
//! to the first-run setup screen.

use construflow_core::{
    Client, ClientSegment, Money, Product, Quantity, Supplier, UnitOfMeasure,
};

pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: "1".to_string(),
            code: "001".to_string(),
            name: "Cimento CP II 50kg".to_string(),
            category: "Cimento".to_string(),
            unit: UnitOfMeasure::Bag,
            cost_price: Money::from_cents(2_850),
            sale_price: Money::from_cents(3_500),
            fractionable: false,
            current_stock: Quantity::from_whole(150),
            minimum_stock: Quantity::from_whole(50),
            supplier_id: "f1".to_string(),
            active: true,
        },
        Product {
            id: "2".to_string(),
            code: "002".to_string(),
            name: "Piso Cerâmico 60x60".to_string(),
            category: "Revestimentos".to_string(),
            unit: UnitOfMeasure::SquareMeter,
            cost_price: Money::from_cents(1_800),
            sale_price: Money::from_cents(2_990),
            fractionable: true,
            current_stock: Quantity::from_milli(200_500),
            minimum_stock: Quantity::from_whole(40),
            supplier_id: "f2".to_string(),
            active: true,
        },
        Product {
            id: "3".to_string(),
            code: "003".to_string(),
            name: "Areia Lavada (m³)".to_string(),
            category: "Agregados".to_string(),
            unit: UnitOfMeasure::Meter,
            cost_price: Money::from_cents(8_000),
            sale_price: Money::from_cents(12_000),
            fractionable: true,
            current_stock: Quantity::from_whole(15),
            minimum_stock: Quantity::from_whole(5),
            supplier_id: "f1".to_string(),
            active: true,
        },
    ]
}

pub fn clients() -> Vec<Client> {
    vec![
        Client {
            id: "c1".to_string(),
            name: "Consumidor Final".to_string(),
            tax_id: "000.000.000-00".to_string(),
            phone: String::new(),
            address: String::new(),
            segment: ClientSegment::Retail,
            credit_limit: Money::zero(),
            active: true,
        },
        Client {
            id: "c2".to_string(),
            name: "Construtora Silva LTDA".to_string(),
            tax_id: "12.345.678/0001-99".to_string(),
            phone: "(11) 98888-7777".to_string(),
            address: "Rua das Obras, 123".to_string(),
            segment: ClientSegment::Wholesale,
            credit_limit: Money::from_cents(500_000),
            active: true,
        },
    ]
}

pub fn suppliers() -> Vec<Supplier> {
    vec![
        Supplier {
            id: "f1".to_string(),
            name: "Votorantim Cimentos".to_string(),
            tax_id: "33.444.555/0001-22".to_string(),
            phone: "0800 123 456".to_string(),
            address: "Av. Industrial, 500".to_string(),
        },
        Supplier {
            id: "f2".to_string(),
            name: "Portobello Revestimentos".to_string(),
            tax_id: "44.555.666/0001-33".to_string(),
            phone: "(48) 3333-2222".to_string(),
            address: "Rodovia SC 401".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_references_resolve() {
        let suppliers = suppliers();
        for product in products() {
            assert!(suppliers.iter().any(|s| s.id == product.supplier_id));
        }
    }

    #[test]
    fn test_seed_codes_unique() {
        let products = products();
        let mut codes: Vec<&str> = products.iter().map(|p| p.code.as_str()).collect();
        codes.dedup();
        assert_eq!(codes.len(), products.len());
    }
}
