use serde_json::Value;
use std::io::{self, Read};

/// Counterparty records or a whole book piped in, e.g. from an upstream
/// extract. `None` when stdin is interactive or carries only whitespace.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_document(&buffer)
}

/// JSON first; YAML books exported by risk tooling are accepted too.
fn parse_document(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(text) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => match serde_yaml::from_str::<Value>(text) {
            Ok(value) if value.is_object() || value.is_array() => Ok(Some(value)),
            _ => Err(format!("stdin is neither a JSON nor a YAML document: {json_err}").into()),
        },
    }
}
