mod format;
mod planning;
mod types;
mod wait;

pub use format::format_table_info;
pub use planning::{
    calculate_create_plan, calculate_destroy_plan, calculate_throughput_plan, format_create_plan,
    format_destroy_plan, format_throughput_plan, CreatePlan, DestroyPlan, ThroughputPlan,
};
pub use types::{
    AttributeDefinition, KeyAttribute, ProvisionedThroughput, TableDescription, TableSpec,
    TableStatus,
};
pub use wait::WaitPolicy;
