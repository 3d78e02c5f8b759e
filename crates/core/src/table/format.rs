//! Pure display formatting for table metadata.

use super::TableDescription;

/// Format a table description as the lines printed for `describe`.
pub fn format_table_info(table: &TableDescription) -> Vec<String> {
    let mut lines = vec![
        format!("Table name  : {}", table.table_name),
        format!(
            "Table ARN   : {}",
            table.table_arn.as_deref().unwrap_or("-")
        ),
        format!("Status      : {}", table.status),
        format!("Item count  : {}", table.item_count),
        format!("Size (bytes): {}", table.size_bytes),
    ];

    lines.push("Throughput".to_string());
    match &table.throughput {
        Some(throughput) => {
            lines.push(format!(
                "  Read Capacity : {}",
                throughput.read_capacity_units
            ));
            lines.push(format!(
                "  Write Capacity: {}",
                throughput.write_capacity_units
            ));
        }
        None => lines.push("  (on-demand)".to_string()),
    }

    lines.push("Attributes".to_string());
    for attribute in &table.attribute_definitions {
        lines.push(format!("  {} ({})", attribute.name, attribute.attribute_type));
    }

    lines
}
