use serde_json::{json, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output labelled fields, as a JSON object or as aligned `label: value` lines
pub fn output_fields(output_format: &OutputFormat, fields: &[(&str, Value)]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let object: serde_json::Map<String, Value> = fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&Value::Object(object))?);
        }
        OutputFormat::Text => {
            let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
            for (label, value) in fields {
                println!("{:width$}  {}", label, text_value(value), width = width);
            }
        }
    }
    Ok(())
}

/// Output a list of strings under a heading
pub fn output_list(output_format: &OutputFormat, name: &str, items: &[String]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ name: items }))?);
        }
        OutputFormat::Text => {
            println!("{}:", name);
            if items.is_empty() {
                println!("  (none)");
            }
            for item in items {
                println!("  {}", item);
            }
        }
    }
    Ok(())
}

fn text_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
