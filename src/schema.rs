use schemars::schema_for;

use crate::insight::Insight;

/// Generate and print the JSON Schema for `Insight`.
pub fn run() -> anyhow::Result<()> {
    let schema = schema_for!(Insight);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
