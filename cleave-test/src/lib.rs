// Integration test utilities and fixture graphs for cleave.

use std::sync::Arc;

use cleave_core::config::CleaveConfig;
use cleave_graph::{ClassEntry, ClassGraph, GraphDocument};

/// Build a graph from entries, panicking on invalid fixtures.
pub fn graph_from(classes: Vec<ClassEntry>) -> Arc<ClassGraph> {
    Arc::new(ClassGraph::from_document(&GraphDocument { classes }).expect("valid fixture graph"))
}

/// Classes A, B, C with A⇄B and C isolated.
pub fn abc() -> Arc<ClassGraph> {
    graph_from(vec![
        ClassEntry::behavioral(1, "A").calls(2, 1),
        ClassEntry::behavioral(2, "B").calls(1, 1),
        ClassEntry::behavioral(3, "C"),
    ])
}

/// A small shop with three modules and one cross-module call.
///
/// Orders: 1 OrderController, 2 OrderService, 3 OrderValidator.
/// Billing: 4 InvoiceController, 5 BillingService, 6 PaymentGateway.
/// Catalog: 7 CatalogController, 8 ProductService, 9 PriceCalculator.
/// Data classes 10 Order, 11 Invoice, 12 Product.
pub fn shop_document() -> GraphDocument {
    GraphDocument {
        classes: vec![
            ClassEntry::behavioral(1, "OrderController").calls(2, 5),
            ClassEntry::behavioral(2, "OrderService")
                .calls(3, 2)
                .accesses(10, 4),
            ClassEntry::behavioral(3, "OrderValidator").calls(2, 1),
            ClassEntry::behavioral(4, "InvoiceController").calls(5, 4),
            ClassEntry::behavioral(5, "BillingService")
                .calls(6, 3)
                .calls(2, 1)
                .accesses(10, 1)
                .accesses(11, 3),
            ClassEntry::behavioral(6, "PaymentGateway").calls(5, 1),
            ClassEntry::behavioral(7, "CatalogController").calls(8, 4),
            ClassEntry::behavioral(8, "ProductService")
                .calls(9, 2)
                .accesses(12, 2),
            ClassEntry::behavioral(9, "PriceCalculator").calls(8, 1),
            ClassEntry::data(10, "Order"),
            ClassEntry::data(11, "Invoice"),
            ClassEntry::data(12, "Product"),
        ],
    }
}

pub fn shop() -> Arc<ClassGraph> {
    Arc::new(ClassGraph::from_document(&shop_document()).expect("valid shop graph"))
}

/// The shop graph as a JSON document.
pub fn shop_json() -> String {
    serde_json::to_string_pretty(&shop_document()).expect("serializable document")
}

/// `n` behavioral classes, each calling its successor.
pub fn chain(n: u64) -> Arc<ClassGraph> {
    graph_from(
        (0..n)
            .map(|i| {
                let entry = ClassEntry::behavioral(i, format!("C{i}"));
                if i + 1 < n { entry.calls(i + 1, 1 + i % 4) } else { entry }
            })
            .collect(),
    )
}

/// Parse a config fixture, panicking on invalid input.
pub fn config(toml: &str) -> CleaveConfig {
    CleaveConfig::from_toml_str(toml).expect("valid fixture config")
}

/// Microservices as sorted lists of raw class ids, in sorted order.
pub fn partition_ids(solution: &cleave_core::solution::Solution) -> Vec<Vec<u64>> {
    let mut services: Vec<Vec<u64>> = solution
        .microservices
        .iter()
        .map(|m| {
            let mut ids: Vec<u64> = m.classes.iter().map(|c| c.0).collect();
            ids.sort_unstable();
            ids
        })
        .collect();
    services.sort();
    services
}
