//! Table lifecycle operations with bounded status waits.
//!
//! Each operation describes the table, computes a plan with the pure
//! planning functions from `dynowalk_core::table`, prints it and then
//! executes it. Waits poll `describe_table` on the [`WaitPolicy`] schedule
//! and stop early when the cancellation token fires.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use dynowalk_core::storage::{Result, StoreError, TableAdmin};
use dynowalk_core::table::{
    calculate_create_plan, calculate_destroy_plan, calculate_throughput_plan, format_create_plan,
    format_destroy_plan, format_throughput_plan, CreatePlan, DestroyPlan, ProvisionedThroughput,
    TableDescription, TableSpec, TableStatus, ThroughputPlan, WaitPolicy,
};

use crate::output::Console;

/// Drives table create, update and delete requests through to a settled status.
pub struct TableLifecycle {
    admin: Arc<dyn TableAdmin>,
    policy: WaitPolicy,
    cancel: CancellationToken,
    console: Console,
}

impl TableLifecycle {
    pub fn new(
        admin: Arc<dyn TableAdmin>,
        policy: WaitPolicy,
        cancel: CancellationToken,
        console: Console,
    ) -> Self {
        Self {
            admin,
            policy,
            cancel,
            console,
        }
    }

    /// Makes sure a table matching `spec` exists and is active.
    ///
    /// An existing table with the same hash key is reused as is.
    pub async fn create_table(&self, spec: &TableSpec) -> Result<TableDescription> {
        let current = self.admin.describe_table(&spec.table_name).await?;
        let plan = calculate_create_plan(current.as_ref(), spec);
        self.console.plan(&format_create_plan(&plan));

        match plan {
            CreatePlan::Create { spec } => {
                self.admin.create_table(&spec).await?;
                tracing::info!(table = %spec.table_name, throughput = %spec.throughput, "Table creation requested");
            }
            CreatePlan::RecreateAfterDeletion { spec } => {
                self.wait_for_deleted(&spec.table_name).await?;
                self.admin.create_table(&spec).await?;
                tracing::info!(table = %spec.table_name, throughput = %spec.throughput, "Table recreation requested");
            }
            CreatePlan::Reuse { table_name, status } => {
                tracing::info!(table = %table_name, %status, "Reusing existing table");
            }
            CreatePlan::KeySchemaMismatch {
                table_name,
                desired,
                ..
            } => {
                return Err(StoreError::table_conflict(
                    table_name,
                    format!("not keyed on {} ({})", desired.name, desired.attribute_type),
                ));
            }
        }

        self.wait_for_active(&spec.table_name).await
    }

    /// Fetches table metadata, failing when the table does not exist.
    pub async fn describe_table(&self, table_name: &str) -> Result<TableDescription> {
        self.admin
            .describe_table(table_name)
            .await?
            .ok_or_else(|| StoreError::table_not_found(table_name))
    }

    /// Changes the provisioned throughput and waits for the table to settle.
    ///
    /// A table already at the requested throughput is returned unchanged.
    pub async fn update_throughput(
        &self,
        table_name: &str,
        throughput: ProvisionedThroughput,
    ) -> Result<TableDescription> {
        let mut current = self.describe_table(table_name).await?;
        if current.status != TableStatus::Active {
            current = self.wait_for_active(table_name).await?;
        }

        let plan = calculate_throughput_plan(&current, throughput);
        self.console.plan(&format_throughput_plan(&plan));

        match plan {
            ThroughputPlan::NoChanges { .. } => Ok(current),
            ThroughputPlan::Update { from, to, .. } => {
                self.admin.update_throughput(table_name, to).await?;
                tracing::info!(
                    table = %table_name,
                    from = ?from,
                    to = %to,
                    "Throughput update requested"
                );
                self.wait_for_active(table_name).await
            }
        }
    }

    /// Deletes the table and waits until it is gone. A missing table is not an error.
    pub async fn delete_table(&self, table_name: &str) -> Result<()> {
        let current = self.admin.describe_table(table_name).await?;
        let plan = calculate_destroy_plan(current.as_ref(), table_name);
        self.console.plan(&format_destroy_plan(&plan));

        match plan {
            DestroyPlan::AlreadyGone { .. } => return Ok(()),
            DestroyPlan::AlreadyDeleting { .. } => {}
            DestroyPlan::DeleteTable { .. } => {
                // Tables in a transition reject deletion.
                if current.is_some_and(|t| t.status.is_transitional()) {
                    self.wait_for_active(table_name).await?;
                }
                self.admin.delete_table(table_name).await?;
                tracing::info!(table = %table_name, "Table deletion requested");
            }
        }

        self.wait_for_deleted(table_name).await
    }

    /// Polls until the table reports ACTIVE.
    ///
    /// A table that is briefly invisible right after creation keeps the
    /// wait going. Transient describe failures are retried on the same
    /// schedule.
    pub async fn wait_for_active(&self, table_name: &str) -> Result<TableDescription> {
        self.console
            .line(&format!("Waiting for table '{}' to become active...", table_name));
        tracing::debug!(
            table = %table_name,
            attempts = self.policy.max_attempts,
            max_wait = ?self.policy.max_total_delay(),
            "Waiting for table to become active"
        );

        for attempt in 0..self.policy.max_attempts {
            match self.admin.describe_table(table_name).await {
                Ok(Some(table)) if table.status == TableStatus::Active => {
                    tracing::debug!(table = %table_name, attempt, "Table is active");
                    return Ok(table);
                }
                Ok(Some(table))
                    if !matches!(table.status, TableStatus::Creating | TableStatus::Updating) =>
                {
                    return Err(StoreError::table_conflict(
                        table_name,
                        format!("table is {} and will not become active", table.status),
                    ));
                }
                Ok(Some(table)) => {
                    tracing::debug!(table = %table_name, attempt, status = %table.status, "Table not active yet");
                }
                Ok(None) => {
                    tracing::debug!(table = %table_name, attempt, "Table not visible yet");
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(table = %table_name, attempt, error = %err, "Describe failed, retrying");
                }
                Err(err) => return Err(err),
            }

            self.pause(attempt).await?;
        }

        Err(self.timeout(table_name))
    }

    /// Polls until the table no longer exists.
    pub async fn wait_for_deleted(&self, table_name: &str) -> Result<()> {
        self.console
            .line(&format!("Waiting for table '{}' to be deleted...", table_name));
        tracing::debug!(
            table = %table_name,
            attempts = self.policy.max_attempts,
            max_wait = ?self.policy.max_total_delay(),
            "Waiting for table to be deleted"
        );

        for attempt in 0..self.policy.max_attempts {
            match self.admin.describe_table(table_name).await {
                Ok(None) => {
                    tracing::debug!(table = %table_name, attempt, "Table is gone");
                    return Ok(());
                }
                Ok(Some(table)) => {
                    tracing::debug!(table = %table_name, attempt, status = %table.status, "Table still present");
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(table = %table_name, attempt, error = %err, "Describe failed, retrying");
                }
                Err(err) => return Err(err),
            }

            self.pause(attempt).await?;
        }

        Err(self.timeout(table_name))
    }

    /// Sleeps between attempts. Nothing is slept after the last attempt.
    async fn pause(&self, attempt: u32) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        if attempt + 1 >= self.policy.max_attempts {
            return Ok(());
        }

        tokio::select! {
            _ = self.cancel.cancelled() => Err(StoreError::Cancelled),
            _ = tokio::time::sleep(self.policy.delay_for(attempt)) => Ok(()),
        }
    }

    fn timeout(&self, table_name: &str) -> StoreError {
        tracing::warn!(table = %table_name, attempts = self.policy.max_attempts, "Gave up waiting for table");
        StoreError::Timeout {
            table: table_name.to_string(),
            attempts: self.policy.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use futures_util::stream::BoxStream;

    use crate::storage::InMemoryStore;
    use dynowalk_core::record::AttributeKind;
    use dynowalk_core::table::KeyAttribute;

    fn person_spec() -> TableSpec {
        TableSpec::new(
            "Person",
            KeyAttribute {
                name: "id".to_string(),
                attribute_type: AttributeKind::Number,
            },
            ProvisionedThroughput::new(5, 5),
        )
    }

    fn lifecycle(admin: impl TableAdmin + 'static, max_attempts: u32) -> TableLifecycle {
        TableLifecycle::new(
            Arc::new(admin),
            WaitPolicy::immediate(max_attempts),
            CancellationToken::new(),
            Console::new(true),
        )
    }

    /// Fails the first `failures` describe calls with a transient error.
    struct FlakyAdmin {
        inner: InMemoryStore,
        failures: AtomicU32,
    }

    #[async_trait]
    impl TableAdmin for FlakyAdmin {
        async fn create_table(&self, spec: &TableSpec) -> Result<()> {
            self.inner.create_table(spec).await
        }

        async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescription>> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(StoreError::Transient("throttled".to_string()));
            }
            self.inner.describe_table(table_name).await
        }

        async fn update_throughput(
            &self,
            table_name: &str,
            throughput: ProvisionedThroughput,
        ) -> Result<()> {
            self.inner.update_throughput(table_name, throughput).await
        }

        async fn delete_table(&self, table_name: &str) -> Result<()> {
            self.inner.delete_table(table_name).await
        }

        fn list_tables(&self) -> BoxStream<'_, Result<String>> {
            self.inner.list_tables()
        }
    }

    #[tokio::test]
    async fn test_create_table_waits_until_active() {
        let store = InMemoryStore::new().with_transition_polls(3);
        let lifecycle = lifecycle(store.clone(), 10);

        let table = lifecycle.create_table(&person_spec()).await.unwrap();

        assert_eq!(table.status, TableStatus::Active);
        assert_eq!(table.throughput, Some(ProvisionedThroughput::new(5, 5)));
    }

    #[tokio::test]
    async fn test_create_table_reuses_existing_table() {
        let store = InMemoryStore::new();
        let lifecycle = lifecycle(store.clone(), 5);
        lifecycle.create_table(&person_spec()).await.unwrap();

        let table = lifecycle.create_table(&person_spec()).await.unwrap();
        assert_eq!(table.table_name, "Person");
    }

    #[tokio::test]
    async fn test_create_table_rejects_other_key_schema() {
        let store = InMemoryStore::new();
        let other = TableSpec::new(
            "Person",
            KeyAttribute {
                name: "email".to_string(),
                attribute_type: AttributeKind::String,
            },
            ProvisionedThroughput::new(1, 1),
        );
        store.create_table(&other).await.unwrap();
        let lifecycle = lifecycle(store, 5);

        let result = lifecycle.create_table(&person_spec()).await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_table_after_pending_deletion() {
        let store = InMemoryStore::new().with_transition_polls(2);
        let lifecycle = lifecycle(store.clone(), 10);
        lifecycle.create_table(&person_spec()).await.unwrap();
        store.delete_table("Person").await.unwrap();

        let table = lifecycle.create_table(&person_spec()).await.unwrap();
        assert_eq!(table.status, TableStatus::Active);
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let store = InMemoryStore::new().with_transition_polls(10);
        let lifecycle = lifecycle(store, 3);

        let result = lifecycle.create_table(&person_spec()).await;
        assert_eq!(
            result,
            Err(StoreError::Timeout {
                table: "Person".to_string(),
                attempts: 3,
            })
        );
    }

    #[tokio::test]
    async fn test_wait_is_cancelled() {
        let store = InMemoryStore::new().with_transition_polls(10);
        let cancel = CancellationToken::new();
        let lifecycle = TableLifecycle::new(
            Arc::new(store),
            WaitPolicy::default(),
            cancel.clone(),
            Console::new(true),
        );
        cancel.cancel();

        let result = lifecycle.create_table(&person_spec()).await;
        assert_eq!(result, Err(StoreError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_sleep() {
        let store = InMemoryStore::new().with_transition_polls(100);
        let cancel = CancellationToken::new();
        let lifecycle = TableLifecycle::new(
            Arc::new(store),
            WaitPolicy::default(),
            cancel.clone(),
            Console::new(true),
        );

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let result = lifecycle.create_table(&person_spec()).await;
        assert_eq!(result, Err(StoreError::Cancelled));
    }

    #[tokio::test]
    async fn test_wait_retries_transient_failures() {
        let store = InMemoryStore::new();
        store.create_table(&person_spec()).await.unwrap();
        let flaky = FlakyAdmin {
            inner: store,
            failures: AtomicU32::new(2),
        };
        let lifecycle = lifecycle(flaky, 5);

        let table = lifecycle.wait_for_active("Person").await.unwrap();
        assert_eq!(table.status, TableStatus::Active);
    }

    #[tokio::test]
    async fn test_update_throughput() {
        let store = InMemoryStore::new().with_transition_polls(1);
        let lifecycle = lifecycle(store, 10);
        lifecycle.create_table(&person_spec()).await.unwrap();

        let table = lifecycle
            .update_throughput("Person", ProvisionedThroughput::new(6, 7))
            .await
            .unwrap();

        assert_eq!(table.status, TableStatus::Active);
        assert_eq!(table.throughput, Some(ProvisionedThroughput::new(6, 7)));
    }

    #[tokio::test]
    async fn test_update_throughput_without_changes() {
        let store = InMemoryStore::new();
        let lifecycle = lifecycle(store, 5);
        lifecycle.create_table(&person_spec()).await.unwrap();

        let table = lifecycle
            .update_throughput("Person", ProvisionedThroughput::new(5, 5))
            .await
            .unwrap();
        assert_eq!(table.throughput, Some(ProvisionedThroughput::new(5, 5)));
    }

    #[tokio::test]
    async fn test_update_missing_table_is_not_found() {
        let lifecycle = lifecycle(InMemoryStore::new(), 5);

        let result = lifecycle
            .update_throughput("Person", ProvisionedThroughput::new(6, 7))
            .await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_table_waits_until_gone() {
        let store = InMemoryStore::new().with_transition_polls(2);
        let lifecycle = lifecycle(store.clone(), 10);
        lifecycle.create_table(&person_spec()).await.unwrap();

        lifecycle.delete_table("Person").await.unwrap();

        assert_eq!(store.describe_table("Person").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_table_is_ok() {
        let lifecycle = lifecycle(InMemoryStore::new(), 5);
        lifecycle.delete_table("Person").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_table_while_creating() {
        let store = InMemoryStore::new().with_transition_polls(2);
        store.create_table(&person_spec()).await.unwrap();
        let lifecycle = lifecycle(store.clone(), 10);

        lifecycle.delete_table("Person").await.unwrap();
        assert_eq!(store.describe_table("Person").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_describe_missing_table_is_not_found() {
        let lifecycle = lifecycle(InMemoryStore::new(), 5);

        let result = lifecycle.describe_table("Person").await;
        assert_eq!(result, Err(StoreError::table_not_found("Person")));
    }
}
