use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::database::Fact;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
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

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": false,
                "error": message
            });
            eprintln!("{}", response);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn output_facts(output_format: &OutputFormat, facts: &[Fact]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "facts": facts }))?);
        }
        OutputFormat::Text => {
            for fact in facts {
                println!("{}", format_fact_line(fact));
            }
        }
    }
    Ok(())
}

pub fn output_fact(output_format: &OutputFormat, message: &str, fact: &Fact) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_success(output_format, message, Some(json!({ "fact": fact }))),
        OutputFormat::Text => {
            println!("✓ {}", message);
            println!("{}", format_fact_line(fact));
            Ok(())
        }
    }
}

fn format_fact_line(fact: &Fact) -> String {
    format!(
        "#{:<5} {}  {}",
        fact.id,
        fact.created_at.format("%Y-%m-%d %H:%M"),
        fact.fact_text
    )
}
