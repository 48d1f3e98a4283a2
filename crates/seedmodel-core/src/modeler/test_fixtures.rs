//! Small in-memory datasets for modeler unit tests.

use serde_json::{json, Value as Json};

use crate::data::encode::NumericEncoder;
use crate::data::loader::parse_dataset;
use crate::navigator::InMemoryNavigator;

pub(crate) fn navigator_from_json(dataset: Json) -> InMemoryNavigator {
    let loaded = parse_dataset(&dataset.to_string()).unwrap();
    InMemoryNavigator::from_loaded(loaded, &NumericEncoder::new()).unwrap()
}

/// customers ← orders ← order_items.
///
/// Customer 1 has 10 orders, customer 2 has 3, customer 3 has 1 and
/// customer 4 has none. Orders have 5 numeric columns.
pub(crate) fn shop_navigator() -> InMemoryNavigator {
    let customers: Vec<Json> = (1..=4)
        .map(|id| {
            let segment = ["a", "b"][id as usize % 2];
            json!({ "customer_id": id, "age": 20 + id * 7, "segment": segment })
        })
        .collect();

    let mut orders = Vec::new();
    let mut order_id = 100;
    for (customer_id, count) in [(1, 10), (2, 3), (3, 1)] {
        for n in 0..count {
            let status = ["paid", "shipped", "cancelled"][n as usize % 3];
            orders.push(json!({
                "order_id": order_id,
                "customer_id": customer_id,
                "amount": 10.0 + (n * n) as f64 * 1.5 + customer_id as f64,
                "quantity": 1 + (n % 4),
                "status": status,
            }));
            order_id += 1;
        }
    }

    let mut items = Vec::new();
    let mut item_id = 1000;
    for order in 100..114 {
        for n in 0..(order % 4) {
            items.push(json!({
                "item_id": item_id,
                "order_id": order,
                "price": 2.5 * (n + 1) as f64 + (order % 7) as f64,
                "units": 1 + (item_id % 3),
            }));
            item_id += 1;
        }
    }

    navigator_from_json(json!({
        "meta": {
            "name": "shop",
            "tables": {
                "customers": {
                    "primary_key": "customer_id",
                    "fields": {
                        "customer_id": { "type": "id" },
                        "age": { "type": "integer" },
                        "segment": { "type": "categorical" }
                    }
                },
                "orders": {
                    "primary_key": "order_id",
                    "fields": {
                        "order_id": { "type": "id" },
                        "customer_id": { "type": "id", "ref": { "table": "customers", "field": "customer_id" } },
                        "amount": { "type": "number" },
                        "quantity": { "type": "integer" },
                        "status": { "type": "categorical" }
                    }
                },
                "order_items": {
                    "primary_key": "item_id",
                    "fields": {
                        "item_id": { "type": "id" },
                        "order_id": { "type": "id", "ref": { "table": "orders", "field": "order_id" } },
                        "price": { "type": "number" },
                        "units": { "type": "integer" }
                    }
                }
            }
        },
        "tables": { "customers": customers, "orders": orders, "order_items": items }
    }))
}

/// a ← b ← c, two rows of c per row of b and two rows of b per row of a.
pub(crate) fn chain_navigator() -> InMemoryNavigator {
    let a: Vec<Json> = (1..=3).map(|id| json!({ "id": id, "x": id as f64 * 1.5 })).collect();
    let b: Vec<Json> = (1..=6)
        .map(|id| json!({ "id": id, "a_id": (id + 1) / 2, "y": (id * id) as f64 }))
        .collect();
    let c: Vec<Json> = (1..=12)
        .map(|id| json!({ "id": id, "b_id": (id + 1) / 2, "z": (id % 5) as f64 - 2.0 }))
        .collect();

    navigator_from_json(json!({
        "meta": {
            "name": "chain",
            "tables": {
                "a": {
                    "primary_key": "id",
                    "fields": { "id": { "type": "id" }, "x": { "type": "number" } }
                },
                "b": {
                    "primary_key": "id",
                    "fields": {
                        "id": { "type": "id" },
                        "a_id": { "type": "id", "ref": { "table": "a", "field": "id" } },
                        "y": { "type": "number" }
                    }
                },
                "c": {
                    "primary_key": "id",
                    "fields": {
                        "id": { "type": "id" },
                        "b_id": { "type": "id", "ref": { "table": "b", "field": "id" } },
                        "z": { "type": "number" }
                    }
                }
            }
        },
        "tables": { "a": a, "b": b, "c": c }
    }))
}
