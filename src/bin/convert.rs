//! Convert tabular media indicators into enriched profile JSON.
//!
//! Reads one CSV of per-outlet indicators, runs the enrichment pipeline and
//! writes the id → profile mapping consumed by the server at startup. The
//! first malformed row aborts the whole conversion.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin convert -- [input.csv] [output.json]
//! # defaults: media_indicators.csv media_profiles.json
//! ```

use anyhow::Context;

use mediasim::profiles::enrich::enrich_rows;
use mediasim::profiles::row::read_rows_from_path;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "media_indicators.csv".to_string());
    let output = args.next().unwrap_or_else(|| "media_profiles.json".to_string());

    let rows = read_rows_from_path(&input)
        .with_context(|| format!("failed to read indicator rows from {}", input))?;
    let profiles = enrich_rows(&rows);

    let mut map = serde_json::Map::new();
    for (id, profile) in &profiles {
        map.insert(id.clone(), serde_json::to_value(profile)?);
    }

    if let Some(parent) = std::path::Path::new(&output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(&map)?;
    std::fs::write(&output, json).with_context(|| format!("failed to write {}", output))?;

    println!("converted {} media profiles to {}", profiles.len(), output);
    Ok(())
}
