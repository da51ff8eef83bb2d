//! Console table formatting.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use ogc_client::CacheStats;
use ogc_common::feature::display_value;
use ogc_common::{ExceptionRecord, Feature, InfoRow, Legend, StyleSet};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header);
    table
}

/// One row per styled feature; values are read from `features`, the
/// collection the styles were derived from.
pub fn styles_table(styles: &StyleSet, features: &[Feature]) -> String {
    let property = styles.property.as_deref();
    let mut table = new_table(vec![
        "#",
        "Id",
        property.unwrap_or("-"),
        "Class",
        "Color",
        "Radius",
    ]);

    for feature in &styles.features {
        let value = property
            .and_then(|p| features.get(feature.index)?.value(p))
            .map(display_value)
            .unwrap_or_default();
        table.add_row(vec![
            feature.index.to_string(),
            feature.id.clone().unwrap_or_default(),
            value,
            feature.style.class.clone(),
            feature.style.color.clone(),
            feature.style.radius.to_string(),
        ]);
    }

    table.to_string()
}

pub fn legends_table(legends: &[Legend]) -> String {
    let mut table = new_table(vec!["Property", "Title", "Type", "Class", "Color"]);

    for legend in legends {
        for (i, (color, label)) in legend.swatches().into_iter().enumerate() {
            let (property, title, kind) = if i == 0 {
                (legend.property.as_str(), legend.title.as_str(), legend.kind_name())
            } else {
                ("", "", "")
            };
            table.add_row(vec![property, title, kind, label.as_str(), color.as_str()]);
        }
    }

    table.to_string()
}

pub fn info_rows_table(rows: &[InfoRow]) -> String {
    let mut table = new_table(vec!["Layer", "Attribute", "Value"]);
    for row in rows {
        table.add_row(vec![
            row.source_label.as_str(),
            row.attribute_name.as_deref().unwrap_or("(value)"),
            row.value.as_str(),
        ]);
    }
    table.to_string()
}

pub fn exceptions_table(records: &[ExceptionRecord]) -> String {
    let mut table = new_table(vec!["Code", "Message"]);
    for record in records {
        table.add_row(vec![
            record.code.as_deref().unwrap_or("-"),
            record.message.as_str(),
        ]);
    }
    table.to_string()
}

pub fn cache_stats_table(namespace: &str, stats: &CacheStats) -> String {
    let title = format!("Response cache: {}", namespace);
    let mut table = new_table(vec![title.as_str(), ""]);
    table.add_row(vec!["Entries:".to_string(), stats.entries.to_string()]);
    table.add_row(vec!["Hits:".to_string(), stats.hits.to_string()]);
    table.add_row(vec!["Misses:".to_string(), stats.misses.to_string()]);
    table.add_row(vec!["Coalesced:".to_string(), stats.coalesced.to_string()]);
    table.add_row(vec![
        "Network fetches:".to_string(),
        stats.network_fetches.to_string(),
    ]);
    table.to_string()
}
