//! The walkthrough driver.
//!
//! Runs the table and record operations in order:
//!
//! 1. create the table and wait for it to become active
//! 2. describe it
//! 3. save, load, update, strongly load and delete one `Person`
//! 4. list tables
//! 5. update the provisioned throughput and describe the result
//! 6. delete the table and wait until it is gone
//!
//! Every step is contained: a failure is logged and recorded in the
//! report. Steps that depend on the table skip when creation failed.
//! Deletion still runs after a record or throughput failure so the table
//! is not left behind. After cancellation every remaining step is skipped.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::TryStreamExt;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use dynowalk_core::person::Person;
use dynowalk_core::record::{MappingError, ReadConsistency};
use dynowalk_core::storage::{ItemStore, StoreError, TableAdmin};
use dynowalk_core::table::{format_table_info, ProvisionedThroughput, TableDescription};

use crate::config::Config;
use crate::lifecycle::TableLifecycle;
use crate::mapper::RecordMapper;
use crate::output::Console;

/// Errors a walkthrough step can end with.
#[derive(Debug, Error)]
pub enum WalkthroughError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Expected {expected} but loaded {found}")]
    UnexpectedRecord { expected: String, found: String },

    #[error("Table '{table}' was listed {count} times, expected {expected}")]
    ListedCount {
        table: String,
        count: usize,
        expected: usize,
    },

    #[error("Table '{table}' has throughput {found}, expected {expected}")]
    ThroughputMismatch {
        table: String,
        expected: ProvisionedThroughput,
        found: String,
    },
}

impl WalkthroughError {
    fn is_cancelled(&self) -> bool {
        matches!(self, WalkthroughError::Store(StoreError::Cancelled))
    }
}

/// Walkthrough steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CreateTable,
    DescribeTable,
    RecordOperations,
    ListTables,
    UpdateThroughput,
    DeleteTable,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::CreateTable => "create table",
            Step::DescribeTable => "describe table",
            Step::RecordOperations => "record operations",
            Step::ListTables => "list tables",
            Step::UpdateThroughput => "update throughput",
            Step::DeleteTable => "delete table",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed { error: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: Step,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// What happened during a walkthrough run.
#[derive(Debug, Clone, Serialize)]
pub struct WalkthroughReport {
    pub table_name: String,
    pub steps: Vec<StepReport>,
    /// Table names from the listing step.
    pub tables: Vec<String>,
    /// The last description fetched for the table.
    pub description: Option<TableDescription>,
    #[serde(skip)]
    cancelled: bool,
}

impl WalkthroughReport {
    fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            steps: Vec::new(),
            tables: Vec::new(),
            description: None,
            cancelled: false,
        }
    }

    /// Whether every step succeeded.
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.outcome == Outcome::Succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, Outcome::Failed { .. }))
    }

    fn record(&mut self, step: Step, outcome: Outcome) {
        self.steps.push(StepReport { step, outcome });
    }
}

/// Runs the walkthrough against an explicitly passed store.
pub struct Walkthrough {
    admin: Arc<dyn TableAdmin>,
    people: RecordMapper<Person>,
    lifecycle: TableLifecycle,
    config: Config,
    console: Console,
}

impl Walkthrough {
    /// Builds the walkthrough. Fails when the `Person` mapping is invalid.
    pub fn new(
        items: Arc<dyn ItemStore>,
        admin: Arc<dyn TableAdmin>,
        table_name: &str,
        config: Config,
        cancel: CancellationToken,
        console: Console,
    ) -> Result<Self, MappingError> {
        let people = RecordMapper::<Person>::new(items)?.with_table_name(table_name);
        let lifecycle = TableLifecycle::new(admin.clone(), config.wait_policy, cancel, console);

        Ok(Self {
            admin,
            people,
            lifecycle,
            config,
            console,
        })
    }

    pub fn table_name(&self) -> &str {
        self.people.table_name()
    }

    pub async fn run(&self) -> WalkthroughReport {
        let mut report = WalkthroughReport::new(self.table_name());
        tracing::info!(table = %self.table_name(), "Starting walkthrough");

        let created = self
            .step(&mut report, Step::CreateTable, self.create_table())
            .await
            .is_some();

        if created {
            if let Some(table) = self
                .step(&mut report, Step::DescribeTable, self.describe_table())
                .await
            {
                report.description = Some(table);
            }
            self.step(&mut report, Step::RecordOperations, self.record_operations())
                .await;
        } else {
            self.skip(&mut report, &[Step::DescribeTable, Step::RecordOperations]);
        }

        if let Some(tables) = self
            .step(&mut report, Step::ListTables, self.list_tables(created))
            .await
        {
            report.tables = tables;
        }

        if created {
            if let Some(table) = self
                .step(&mut report, Step::UpdateThroughput, self.update_throughput())
                .await
            {
                report.description = Some(table);
            }
            self.step(&mut report, Step::DeleteTable, self.delete_table())
                .await;
        } else {
            self.skip(&mut report, &[Step::UpdateThroughput, Step::DeleteTable]);
        }

        let failed = report.failures().count();
        if failed == 0 && !report.cancelled {
            tracing::info!(table = %self.table_name(), "Walkthrough finished");
        } else {
            tracing::warn!(table = %self.table_name(), failed, cancelled = report.cancelled, "Walkthrough finished with failures");
        }
        report
    }

    /// Runs one step, recording its outcome. Failures are logged and contained.
    async fn step<T>(
        &self,
        report: &mut WalkthroughReport,
        step: Step,
        work: impl Future<Output = Result<T, WalkthroughError>>,
    ) -> Option<T> {
        if report.cancelled {
            self.skip(report, &[step]);
            return None;
        }

        self.console.section(&capitalize(&step.to_string()));
        tracing::debug!(%step, "Running step");

        match work.await {
            Ok(value) => {
                report.record(step, Outcome::Succeeded);
                Some(value)
            }
            Err(err) => {
                tracing::error!(%step, error = %err, "Step failed");
                self.console.failure(&format!("Failed to {}: {}", step, err));
                report.cancelled |= err.is_cancelled();
                report.record(
                    step,
                    Outcome::Failed {
                        error: err.to_string(),
                    },
                );
                None
            }
        }
    }

    /// Records steps that cannot run, either after cancellation or without a table.
    fn skip(&self, report: &mut WalkthroughReport, steps: &[Step]) {
        let reason = if report.cancelled {
            "cancelled"
        } else {
            "table was not created"
        };
        for step in steps {
            self.console.warn(&format!("Skipping {}: {}", step, reason));
            report.record(
                *step,
                Outcome::Skipped {
                    reason: reason.to_string(),
                },
            );
        }
    }

    async fn create_table(&self) -> Result<(), WalkthroughError> {
        let spec = self.people.table_spec(self.config.initial_throughput);
        let table = self.lifecycle.create_table(&spec).await?;
        self.console.success(&format!(
            "Table '{}' is {}",
            table.table_name, table.status
        ));
        Ok(())
    }

    async fn describe_table(&self) -> Result<TableDescription, WalkthroughError> {
        let table = self.lifecycle.describe_table(self.table_name()).await?;
        self.console.block(&format_table_info(&table));
        Ok(table)
    }

    async fn record_operations(&self) -> Result<(), WalkthroughError> {
        let derek = Person::new(1, "Derek Smith", 42);
        self.people.save(&derek).await?;
        self.console.field("Saved:", &derek);

        let loaded = self.people.load(derek.id, ReadConsistency::Eventual).await?;
        expect_record(Some(&derek), loaded.as_ref())?;
        if let Some(loaded) = &loaded {
            self.console.field("Loaded:", loaded);
        }

        let kyle = derek.clone().with_name("Kyle Smith");
        self.people.save(&kyle).await?;
        self.console
            .field("Updated:", format!("name {} -> {}", derek.name, kyle.name));

        let loaded = self.people.load(kyle.id, ReadConsistency::Strong).await?;
        expect_record(Some(&kyle), loaded.as_ref())?;
        if let Some(loaded) = &loaded {
            self.console.field("Loaded (strongly consistent):", loaded);
        }

        self.people.delete(&kyle).await?;
        self.console.field("Deleted:", &kyle);

        // Deletes are not guaranteed to be visible to eventually consistent reads.
        let loaded = self.people.load(kyle.id, ReadConsistency::Strong).await?;
        expect_record(None, loaded.as_ref())?;
        self.console
            .success(&format!("Person {} no longer exists", kyle.id));

        Ok(())
    }

    /// Lists all tables. When the walkthrough table was created it must be
    /// listed exactly once.
    async fn list_tables(&self, created: bool) -> Result<Vec<String>, WalkthroughError> {
        let tables: Vec<String> = self.admin.list_tables().try_collect().await?;
        for name in &tables {
            self.console.line(&format!("  {}", name));
        }
        self.console
            .line(&format!("{} table(s) found", tables.len()));

        if created {
            expect_listed(&tables, self.table_name(), 1)?;
        }
        Ok(tables)
    }

    async fn update_throughput(&self) -> Result<TableDescription, WalkthroughError> {
        let desired = self.config.updated_throughput;
        let table = self
            .lifecycle
            .update_throughput(self.table_name(), desired)
            .await?;

        // Re-describe once the update has settled.
        let table = self.lifecycle.describe_table(&table.table_name).await?;
        if table.throughput != Some(desired) {
            return Err(WalkthroughError::ThroughputMismatch {
                table: table.table_name,
                expected: desired,
                found: table
                    .throughput
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "on-demand".to_string()),
            });
        }

        self.console.block(&format_table_info(&table));
        Ok(table)
    }

    /// Deletes the table and checks it is no longer listed.
    async fn delete_table(&self) -> Result<(), WalkthroughError> {
        self.lifecycle.delete_table(self.table_name()).await?;

        let tables: Vec<String> = self.admin.list_tables().try_collect().await?;
        expect_listed(&tables, self.table_name(), 0)?;

        self.console
            .success(&format!("Table '{}' deleted", self.table_name()));
        Ok(())
    }
}

fn expect_record(expected: Option<&Person>, found: Option<&Person>) -> Result<(), WalkthroughError> {
    if expected == found {
        return Ok(());
    }
    let describe = |p: Option<&Person>| p.map_or_else(|| "nothing".to_string(), Person::to_string);
    Err(WalkthroughError::UnexpectedRecord {
        expected: describe(expected),
        found: describe(found),
    })
}

fn expect_listed(tables: &[String], table: &str, expected: usize) -> Result<(), WalkthroughError> {
    let count = tables.iter().filter(|name| *name == table).count();
    if count != expected {
        return Err(WalkthroughError::ListedCount {
            table: table.to_string(),
            count,
            expected,
        });
    }
    Ok(())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
