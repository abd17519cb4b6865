use anyhow::Result;
use serde_json::Value;

/// Print a document to stdout, pretty unless `compact`.
pub fn print_document(value: &Value, compact: bool) -> Result<()> {
    println!("{}", render_document(value, compact)?);
    Ok(())
}

fn render_document(value: &Value, compact: bool) -> Result<String> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(rendered)
}
