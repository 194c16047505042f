//! FILENAME: data-pivot/benches/pivot_populate.rs
//! PURPOSE: Benchmarks populate() over a synthetic sales table.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_pivot::{Aggregate, DataPivot};
use relation::{ColumnInfo, Table, Value, ValueType};

const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Center"];
const PRODUCTS: [&str; 8] = [
    "apples", "pears", "plums", "cherries", "grapes", "melons", "figs", "dates",
];

fn sales_table(rows: usize) -> Table {
    let mut table = Table::new(vec![
        ColumnInfo::new("region", ValueType::Text),
        ColumnInfo::new("product", ValueType::Text),
        ColumnInfo::new("qty", ValueType::Int32),
        ColumnInfo::new("price", ValueType::Double),
    ]);
    for i in 0..rows {
        table.push_row(vec![
            Value::Text(REGIONS[i % REGIONS.len()].to_string()),
            Value::Text(PRODUCTS[(i * 7) % PRODUCTS.len()].to_string()),
            Value::Int32((i % 50) as i32),
            Value::Double((i % 100) as f64 * 0.25),
        ]);
    }
    table
}

fn bench_populate(c: &mut Criterion) {
    let table = sales_table(10_000);

    c.bench_function("populate 10k rows, sum", |b| {
        b.iter(|| {
            let mut pivot = DataPivot::new();
            pivot.bind(table.clone()).unwrap();
            pivot.add_row_field("region", None).unwrap();
            pivot
                .add_data_field(Aggregate::Sum, "qty * price", None)
                .unwrap();
            pivot.populate().unwrap();
            black_box(pivot.row_count().unwrap())
        })
    });

    c.bench_function("populate 10k rows, cross tab", |b| {
        b.iter(|| {
            let mut pivot = DataPivot::new();
            pivot.bind(table.clone()).unwrap();
            pivot.add_row_field("region", None).unwrap();
            pivot.add_column_field("product", None).unwrap();
            pivot
                .add_data_field(Aggregate::Avg, "price", Some("mean"))
                .unwrap();
            pivot.populate().unwrap();
            black_box(pivot.column_count().unwrap())
        })
    });
}

criterion_group!(benches, bench_populate);
criterion_main!(benches);
