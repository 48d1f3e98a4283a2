use indexmap::IndexMap;

use seedmodel_core::data::encode::NumericEncoder;
use seedmodel_core::data::loader::LoadedDataset;
use seedmodel_core::data::{Dataset, Value};
use seedmodel_core::navigator::InMemoryNavigator;
use seedmodel_core::schema::types::*;

/// Metadata of a small shop: customers ← orders ← order_items.
pub fn shop_meta() -> DatasetMeta {
    let mut meta = DatasetMeta::new("shop".to_string());

    let mut customers = TableMeta::new("customers".to_string());
    customers.primary_key = Some("customer_id".to_string());
    for (name, field_type) in [
        ("customer_id", FieldType::Id),
        ("age", FieldType::Integer),
        ("segment", FieldType::Categorical),
        ("is_member", FieldType::Boolean),
        ("notes", FieldType::Text),
    ] {
        customers
            .fields
            .insert(name.to_string(), FieldMeta::new(name.to_string(), field_type));
    }
    meta.tables.insert("customers".to_string(), customers);

    let mut orders = TableMeta::new("orders".to_string());
    orders.primary_key = Some("order_id".to_string());
    orders.fields.insert(
        "order_id".to_string(),
        FieldMeta::new("order_id".to_string(), FieldType::Id),
    );
    orders.fields.insert(
        "customer_id".to_string(),
        FieldMeta::new("customer_id".to_string(), FieldType::Id)
            .referencing("customers", "customer_id"),
    );
    for (name, field_type) in [
        ("amount", FieldType::Number),
        ("quantity", FieldType::Integer),
        ("status", FieldType::Categorical),
    ] {
        orders
            .fields
            .insert(name.to_string(), FieldMeta::new(name.to_string(), field_type));
    }
    meta.tables.insert("orders".to_string(), orders);

    let mut items = TableMeta::new("order_items".to_string());
    items.primary_key = Some("item_id".to_string());
    items.fields.insert(
        "item_id".to_string(),
        FieldMeta::new("item_id".to_string(), FieldType::Id),
    );
    items.fields.insert(
        "order_id".to_string(),
        FieldMeta::new("order_id".to_string(), FieldType::Id).referencing("orders", "order_id"),
    );
    for (name, field_type) in [("price", FieldType::Number), ("units", FieldType::Integer)] {
        items
            .fields
            .insert(name.to_string(), FieldMeta::new(name.to_string(), field_type));
    }
    meta.tables.insert("order_items".to_string(), items);

    meta
}

/// Shop rows for `customers` customers.
///
/// Customer `i` (0-based) places `i % 6` orders, so every sixth customer has
/// none and the next one a single order. Order `j` has `j % 4` items. Values
/// are deterministic.
pub fn shop_dataset(customers: usize) -> LoadedDataset {
    let meta = shop_meta();
    let mut tables = IndexMap::new();

    let mut customer_rows = dataset_for(&meta, "customers");
    let mut order_rows = dataset_for(&meta, "orders");
    let mut item_rows = dataset_for(&meta, "order_items");

    let segments = ["retail", "wholesale", "online"];
    let statuses = ["paid", "shipped", "cancelled", "refunded"];
    let mut order_id = 0i64;
    let mut item_id = 0i64;

    for c in 0..customers {
        let customer_id = c as i64 + 1;
        customer_rows
            .push_row(vec![
                Value::Int(customer_id),
                Value::Int(18 + (c as i64 * 7) % 60),
                Value::String(segments[c % segments.len()].to_string()),
                Value::Bool(c % 3 == 0),
                Value::String(format!("customer {}", customer_id)),
            ])
            .expect("customer row width");

        for n in 0..(c % 6) {
            order_id += 1;
            let amount = 15.0 + (c % 11) as f64 * 3.5 + (n * n) as f64 * 1.25;
            order_rows
                .push_row(vec![
                    Value::Int(order_id),
                    Value::Int(customer_id),
                    Value::Float(amount),
                    Value::Int(1 + (order_id % 5)),
                    Value::String(statuses[order_id as usize % statuses.len()].to_string()),
                ])
                .expect("order row width");

            for k in 0..(order_id % 4) {
                item_id += 1;
                item_rows
                    .push_row(vec![
                        Value::Int(item_id),
                        Value::Int(order_id),
                        Value::Float(2.0 + (item_id % 13) as f64 * 0.75 + k as f64),
                        Value::Int(1 + (item_id % 3)),
                    ])
                    .expect("item row width");
            }
        }
    }

    tables.insert("customers".to_string(), customer_rows);
    tables.insert("orders".to_string(), order_rows);
    tables.insert("order_items".to_string(), item_rows);
    LoadedDataset { meta, tables }
}

/// Tables `t0 … t{depth-1}` where `t{i+1}` references `t{i}` and every row
/// has `fanout` children.
pub fn chain_dataset(depth: usize, fanout: usize) -> LoadedDataset {
    let edges: Vec<(usize, usize)> = (1..depth).map(|i| (i, i - 1)).collect();
    edge_dataset(depth, &edges, fanout)
}

/// A dataset over tables `t0 … t{n-1}` with one reference per
/// `(child, parent)` edge.
///
/// Every table has an `id` primary key and a numeric `v` column; a child gets
/// a `t{parent}_id` field per parent. Root tables get 3 rows and each other
/// table `fanout` rows per row of its first parent.
pub fn edge_dataset(tables: usize, edges: &[(usize, usize)], fanout: usize) -> LoadedDataset {
    let mut meta = DatasetMeta::new("edges".to_string());
    for t in 0..tables {
        let name = format!("t{}", t);
        let mut table = TableMeta::new(name.clone());
        table.primary_key = Some("id".to_string());
        table
            .fields
            .insert("id".to_string(), FieldMeta::new("id".to_string(), FieldType::Id));
        for &(child, parent) in edges {
            if child == t {
                let field = format!("t{}_id", parent);
                table.fields.insert(
                    field.clone(),
                    FieldMeta::new(field, FieldType::Id).referencing(&format!("t{}", parent), "id"),
                );
            }
        }
        table
            .fields
            .insert("v".to_string(), FieldMeta::new("v".to_string(), FieldType::Number));
        meta.tables.insert(name, table);
    }

    // Row counts follow parents, so fill tables parents first.
    let mut counts = vec![0usize; tables];
    let mut filled = vec![false; tables];
    while filled.iter().any(|f| !f) {
        let mut progressed = false;
        for t in 0..tables {
            if filled[t] {
                continue;
            }
            let parents: Vec<usize> = edges
                .iter()
                .filter(|(c, _)| *c == t)
                .map(|(_, p)| *p)
                .collect();
            if parents.iter().all(|p| filled[*p]) {
                counts[t] = match parents.first() {
                    Some(&p) => counts[p] * fanout,
                    None => 3,
                };
                filled[t] = true;
                progressed = true;
            }
        }
        assert!(progressed, "edge_dataset needs an acyclic edge list");
    }

    let mut data = IndexMap::new();
    for t in 0..tables {
        let name = format!("t{}", t);
        let mut rows = dataset_for(&meta, &name);
        let table_meta = &meta.tables[&name];
        for r in 0..counts[t] {
            let mut row = Vec::with_capacity(table_meta.fields.len());
            for field in table_meta.fields.values() {
                let value = match &field.reference {
                    Some(reference) => {
                        let parent: usize = reference.table[1..].parse().expect("t<index>");
                        Value::Int((r % counts[parent].max(1)) as i64 + 1)
                    }
                    None if field.name == "id" => Value::Int(r as i64 + 1),
                    None => Value::Float(((r * 7 + t * 3) % 11) as f64 - 5.0),
                };
                row.push(value);
            }
            rows.push_row(row).expect("edge row width");
        }
        data.insert(name, rows);
    }

    LoadedDataset { meta, tables: data }
}

/// Encode a loaded dataset and wrap it in a navigator.
pub fn navigator(loaded: LoadedDataset) -> InMemoryNavigator {
    InMemoryNavigator::from_loaded(loaded, &NumericEncoder::new()).expect("fixture dataset")
}

pub fn shop_navigator(customers: usize) -> InMemoryNavigator {
    navigator(shop_dataset(customers))
}

pub fn chain_navigator(depth: usize, fanout: usize) -> InMemoryNavigator {
    navigator(chain_dataset(depth, fanout))
}

fn dataset_for(meta: &DatasetMeta, table: &str) -> Dataset {
    let columns = meta.tables[table].fields.keys().cloned().collect();
    Dataset::new(table, columns)
}
