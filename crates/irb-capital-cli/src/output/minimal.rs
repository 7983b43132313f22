use serde_json::Value;

/// Result fields that answer each command, most specific first:
/// `calculate` -> rwa, `ttc-pd` -> ttc_pd, `pd-rating` -> implied_rating,
/// `rating-pd` -> pd.
const HEADLINE_FIELDS: [&str; 4] = ["rwa", "ttc_pd", "implied_rating", "pd"];

/// Print the single number (or grade) a shell pipeline wants from a run.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result = value.get("result").unwrap_or(value);

    // Portfolio runs answer with the book total
    if let Some(total) = result.pointer("/summary/total_rwa") {
        return render(total);
    }

    if let Some(found) = HEADLINE_FIELDS
        .iter()
        .filter_map(|key| result.get(*key))
        .find(|v| !v.is_null())
    {
        return render(found);
    }

    // Anything else: first field, labelled
    match result.as_object().and_then(|map| map.iter().next()) {
        Some((key, val)) => format!("{}: {}", key, render(val)),
        None => render(result),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
