use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Columns shown per counterparty in a portfolio table.
const BOOK_COLUMNS: [&str; 8] = [
    "pd",
    "pd_source",
    "correlation",
    "maturity_adjustment",
    "k",
    "ead",
    "rwa",
    "original_rwa",
];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else if let Some(Value::Array(rows)) = map.get("results") {
                print_array_table(rows);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match (result.get("summary"), result.get("results")) {
        (Some(summary), Some(Value::Array(rows))) => {
            print_flat_object(summary);
            println!();
            print_book_table(rows);
            if let Some(Value::Array(rejected)) = result.get("rejected") {
                if !rejected.is_empty() {
                    println!("\nRejected:");
                    print_array_table(rejected);
                }
            }
        }
        _ if result.is_object() => print_flat_object(result),
        _ => print_flat_object(&Value::Object(envelope.clone())),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_book_table(rows: &[Value]) {
    let mut builder = Builder::default();
    let mut header = vec!["counterparty"];
    header.extend(BOOK_COLUMNS);
    builder.push_record(header);

    for row in rows {
        let label = row.get("label").map(format_value).unwrap_or_default();
        let mut record = vec![label];
        record.extend(BOOK_COLUMNS.iter().map(|col| {
            row.pointer(&format!("/result/{col}"))
                .map(format_value)
                .unwrap_or_default()
        }));
        builder.push_record(record);
    }

    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
