//! Pure functions for calculating table lifecycle plans (Functional Core).

use super::{KeyAttribute, ProvisionedThroughput, TableDescription, TableSpec, TableStatus};

/// Planned changes for creating a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatePlan {
    /// Table doesn't exist, needs to be created.
    Create { spec: TableSpec },
    /// Table is still being deleted; wait for it to disappear, then create it.
    RecreateAfterDeletion { spec: TableSpec },
    /// Table already exists with a compatible key schema.
    Reuse {
        table_name: String,
        status: TableStatus,
    },
    /// Table exists but is keyed differently.
    KeySchemaMismatch {
        table_name: String,
        existing: Option<KeyAttribute>,
        desired: KeyAttribute,
    },
}

/// Planned changes for a throughput update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThroughputPlan {
    Update {
        table_name: String,
        from: Option<ProvisionedThroughput>,
        to: ProvisionedThroughput,
    },
    /// Current throughput already matches.
    NoChanges {
        table_name: String,
        throughput: ProvisionedThroughput,
    },
}

/// Plan for destroying a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyPlan {
    /// Table exists and will be deleted.
    DeleteTable { table_name: String },
    /// Table is already being deleted; only wait.
    AlreadyDeleting { table_name: String },
    /// Table doesn't exist, nothing to do.
    AlreadyGone { table_name: String },
}

/// Pure function: Calculate what is needed to have the desired table.
pub fn calculate_create_plan(current: Option<&TableDescription>, desired: &TableSpec) -> CreatePlan {
    match current {
        None => CreatePlan::Create {
            spec: desired.clone(),
        },
        Some(state) if state.status == TableStatus::Deleting => {
            CreatePlan::RecreateAfterDeletion {
                spec: desired.clone(),
            }
        }
        Some(state) => {
            let existing = state.hash_key_attribute();
            let compatible = match (&existing, state.hash_key.as_deref()) {
                (Some(key), _) => *key == desired.hash_key,
                // Key name reported without a usable type: compare names only
                (None, Some(name)) => name == desired.hash_key.name,
                (None, None) => true,
            };

            if compatible {
                CreatePlan::Reuse {
                    table_name: desired.table_name.clone(),
                    status: state.status.clone(),
                }
            } else {
                CreatePlan::KeySchemaMismatch {
                    table_name: desired.table_name.clone(),
                    existing,
                    desired: desired.hash_key.clone(),
                }
            }
        }
    }
}

/// Pure function: Calculate a throughput update plan.
pub fn calculate_throughput_plan(
    current: &TableDescription,
    desired: ProvisionedThroughput,
) -> ThroughputPlan {
    match current.throughput {
        Some(throughput) if throughput == desired => ThroughputPlan::NoChanges {
            table_name: current.table_name.clone(),
            throughput,
        },
        from => ThroughputPlan::Update {
            table_name: current.table_name.clone(),
            from,
            to: desired,
        },
    }
}

/// Pure function: Calculate destroy plan.
pub fn calculate_destroy_plan(current: Option<&TableDescription>, table_name: &str) -> DestroyPlan {
    match current {
        Some(state) if state.status == TableStatus::Deleting => DestroyPlan::AlreadyDeleting {
            table_name: table_name.to_string(),
        },
        Some(_) => DestroyPlan::DeleteTable {
            table_name: table_name.to_string(),
        },
        None => DestroyPlan::AlreadyGone {
            table_name: table_name.to_string(),
        },
    }
}

/// Pure function: Format a create plan for display.
pub fn format_create_plan(plan: &CreatePlan) -> Vec<String> {
    match plan {
        CreatePlan::Create { spec } => format_new_table(spec, "+ Create table"),
        CreatePlan::RecreateAfterDeletion { spec } => {
            let mut lines = vec![format!(
                "~ Wait for table '{}' to finish deleting",
                spec.table_name
            )];
            lines.extend(format_new_table(spec, "+ Recreate table"));
            lines
        }
        CreatePlan::Reuse { table_name, status } => {
            vec![format!(
                "= Table '{}' already exists ({})",
                table_name, status
            )]
        }
        CreatePlan::KeySchemaMismatch {
            table_name,
            existing,
            desired,
        } => {
            let existing = existing
                .as_ref()
                .map(|k| format!("{} ({})", k.name, k.attribute_type))
                .unwrap_or_else(|| "unknown".to_string());
            vec![format!(
                "! Table '{}' is keyed on {}, expected {} ({})",
                table_name, existing, desired.name, desired.attribute_type
            )]
        }
    }
}

fn format_new_table(spec: &TableSpec, header: &str) -> Vec<String> {
    vec![
        format!("{}: {}", header, spec.table_name),
        format!(
            "  Hash key: {} ({})",
            spec.hash_key.name, spec.hash_key.attribute_type
        ),
        format!(
            "  Provisioned throughput: read {} / write {}",
            spec.throughput.read_capacity_units, spec.throughput.write_capacity_units
        ),
    ]
}

/// Pure function: Format a throughput plan for display.
pub fn format_throughput_plan(plan: &ThroughputPlan) -> Vec<String> {
    match plan {
        ThroughputPlan::Update {
            table_name,
            from,
            to,
        } => {
            let from = from
                .map(|t| t.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            vec![format!(
                "~ Update throughput of {}: {} -> {}",
                table_name, from, to
            )]
        }
        ThroughputPlan::NoChanges {
            table_name,
            throughput,
        } => {
            vec![format!(
                "= Table '{}' already provisioned at {}",
                table_name, throughput
            )]
        }
    }
}

/// Pure function: Format a destroy plan for display.
pub fn format_destroy_plan(plan: &DestroyPlan) -> Vec<String> {
    match plan {
        DestroyPlan::DeleteTable { table_name } => {
            vec![format!(
                "- Delete table: {} (ALL DATA WILL BE LOST)",
                table_name
            )]
        }
        DestroyPlan::AlreadyDeleting { table_name } => {
            vec![format!("~ Table '{}' is already being deleted", table_name)]
        }
        DestroyPlan::AlreadyGone { table_name } => {
            vec![format!("= Table '{}' does not exist", table_name)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AttributeKind;
    use crate::table::AttributeDefinition;

    fn id_key() -> KeyAttribute {
        KeyAttribute {
            name: "id".to_string(),
            attribute_type: AttributeKind::Number,
        }
    }

    fn spec() -> TableSpec {
        TableSpec::new("Person", id_key(), ProvisionedThroughput::new(5, 5))
    }

    fn state(status: TableStatus, key_type: &str) -> TableDescription {
        TableDescription {
            table_name: "Person".to_string(),
            table_arn: None,
            status,
            item_count: 0,
            size_bytes: 0,
            hash_key: Some("id".to_string()),
            throughput: Some(ProvisionedThroughput::new(5, 5)),
            attribute_definitions: vec![AttributeDefinition {
                name: "id".to_string(),
                attribute_type: key_type.to_string(),
            }],
        }
    }

    #[test]
    fn test_create_plan_when_missing() {
        let plan = calculate_create_plan(None, &spec());
        assert_eq!(plan, CreatePlan::Create { spec: spec() });
    }

    #[test]
    fn test_create_plan_reuses_compatible_table() {
        let current = state(TableStatus::Creating, "N");
        let plan = calculate_create_plan(Some(&current), &spec());
        assert_eq!(
            plan,
            CreatePlan::Reuse {
                table_name: "Person".to_string(),
                status: TableStatus::Creating,
            }
        );
    }

    #[test]
    fn test_create_plan_detects_key_mismatch() {
        let current = state(TableStatus::Active, "S");
        let plan = calculate_create_plan(Some(&current), &spec());
        assert!(matches!(plan, CreatePlan::KeySchemaMismatch { .. }));
    }

    #[test]
    fn test_create_plan_waits_for_deleting_table() {
        let current = state(TableStatus::Deleting, "N");
        let plan = calculate_create_plan(Some(&current), &spec());
        assert_eq!(plan, CreatePlan::RecreateAfterDeletion { spec: spec() });
    }

    #[test]
    fn test_throughput_plan_no_changes() {
        let current = state(TableStatus::Active, "N");
        let plan = calculate_throughput_plan(&current, ProvisionedThroughput::new(5, 5));
        assert!(matches!(plan, ThroughputPlan::NoChanges { .. }));
    }

    #[test]
    fn test_throughput_plan_update() {
        let current = state(TableStatus::Active, "N");
        let plan = calculate_throughput_plan(&current, ProvisionedThroughput::new(6, 7));
        assert_eq!(
            plan,
            ThroughputPlan::Update {
                table_name: "Person".to_string(),
                from: Some(ProvisionedThroughput::new(5, 5)),
                to: ProvisionedThroughput::new(6, 7),
            }
        );
    }

    #[test]
    fn test_destroy_plan_states() {
        assert_eq!(
            calculate_destroy_plan(None, "Person"),
            DestroyPlan::AlreadyGone {
                table_name: "Person".to_string()
            }
        );
        assert_eq!(
            calculate_destroy_plan(Some(&state(TableStatus::Active, "N")), "Person"),
            DestroyPlan::DeleteTable {
                table_name: "Person".to_string()
            }
        );
        assert_eq!(
            calculate_destroy_plan(Some(&state(TableStatus::Deleting, "N")), "Person"),
            DestroyPlan::AlreadyDeleting {
                table_name: "Person".to_string()
            }
        );
    }

    #[test]
    fn test_format_create_plan() {
        let lines = format_create_plan(&CreatePlan::Create { spec: spec() });
        assert_eq!(
            lines,
            vec![
                "+ Create table: Person",
                "  Hash key: id (N)",
                "  Provisioned throughput: read 5 / write 5",
            ]
        );
    }

    #[test]
    fn test_format_throughput_plan() {
        let lines = format_throughput_plan(&ThroughputPlan::Update {
            table_name: "Person".to_string(),
            from: Some(ProvisionedThroughput::new(5, 5)),
            to: ProvisionedThroughput::new(6, 7),
        });
        assert_eq!(lines, vec!["~ Update throughput of Person: 5/5 -> 6/7"]);
    }

    #[test]
    fn test_format_destroy_plan() {
        let lines = format_destroy_plan(&DestroyPlan::DeleteTable {
            table_name: "Person".to_string(),
        });
        assert_eq!(lines, vec!["- Delete table: Person (ALL DATA WILL BE LOST)"]);
    }
}
