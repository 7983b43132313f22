use serde_json::{Map, Value};
use std::io;

type StdoutCsv<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Portfolio runs produce one row per counterparty with the result fields
/// flattened next to the label; single results produce `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => match result.get("results") {
                Some(Value::Array(rows)) => write_book_csv(&mut wtr, rows),
                _ => write_pairs(&mut wtr, result),
            },
            _ => match map.get("results") {
                Some(Value::Array(rows)) => write_array_csv(&mut wtr, rows),
                _ => write_pairs(&mut wtr, map),
            },
        },
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_pairs(wtr: &mut StdoutCsv<'_>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_book_csv(wtr: &mut StdoutCsv<'_>, rows: &[Value]) {
    let flattened: Vec<Value> = rows
        .iter()
        .filter_map(|row| {
            let mut flat = Map::new();
            flat.insert("index".into(), row.get("index")?.clone());
            flat.insert("label".into(), row.get("label")?.clone());
            if let Some(Value::Object(result)) = row.get("result") {
                flat.extend(result.clone());
            }
            Some(Value::Object(flat))
        })
        .collect();
    write_array_csv(wtr, &flattened);
}

fn write_array_csv(wtr: &mut StdoutCsv<'_>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    // Union of keys across rows; optional fields (original_rwa, ttc_pd) may be
    // absent on the first row.
    let mut headers: Vec<String> = Vec::new();
    for item in arr {
        if let Value::Object(map) = item {
            for key in map.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    if headers.is_empty() {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    }

    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
