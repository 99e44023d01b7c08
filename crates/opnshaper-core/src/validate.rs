// ── Referential validation ──
//
// Cross-entity checks run before a mutation is staged: a queue's parent
// pipe, a rule's target and a rule's interfaces must exist. The checks are
// advisory (another client can change the firewall between the check and
// the write); the firewall's own validation remains authoritative.

use std::future::Future;

use opnshaper_api::ApiClient;
use tracing::debug;

use crate::error::{CoreError, EntityKind, OpContext, Operation};
use crate::model::{EntityId, Queue, Rule};

// ── Interface inventory ─────────────────────────────────────────────

/// Source of the interface names a rule may refer to.
pub trait InterfaceInventory: Send + Sync {
    /// Every known interface identifier.
    fn interface_names(&self) -> impl Future<Output = Result<Vec<String>, CoreError>> + Send;

    fn interface_exists(&self, name: &str) -> impl Future<Output = Result<bool, CoreError>> + Send {
        async move {
            let known = self.interface_names().await?;
            Ok(known.iter().any(|k| k == name))
        }
    }

    /// `true` only if every name is known. One inventory lookup per call.
    fn interfaces_exist(
        &self,
        names: &[&str],
    ) -> impl Future<Output = Result<bool, CoreError>> + Send {
        async move {
            let known = self.interface_names().await?;
            Ok(names.iter().all(|name| known.iter().any(|k| k == name)))
        }
    }
}

/// Reads assigned interfaces from the firewall.
impl InterfaceInventory for ApiClient {
    async fn interface_names(&self) -> Result<Vec<String>, CoreError> {
        let rows = self
            .list_interfaces()
            .await
            .map_err(|e| CoreError::from_api(&OpContext::interfaces(), e))?;
        Ok(rows.into_iter().map(|row| row.identifier).collect())
    }
}

/// Fixed interface list, for tests and offline use.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    names: Vec<String>,
}

impl StaticInventory {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl InterfaceInventory for StaticInventory {
    async fn interface_names(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.names.clone())
    }
}

// ── Validator ────────────────────────────────────────────────────────

/// Existence checks shared by every create/update path.
pub struct ReferenceValidator<'a, I> {
    client: &'a ApiClient,
    inventory: &'a I,
}

impl<'a, I: InterfaceInventory> ReferenceValidator<'a, I> {
    pub fn new(client: &'a ApiClient, inventory: &'a I) -> Self {
        Self { client, inventory }
    }

    /// `Ok(false)` when the firewall reports no such pipe; transport and
    /// decode failures are errors.
    pub async fn pipe_exists(&self, id: &EntityId) -> Result<bool, CoreError> {
        let ctx = OpContext::new(Operation::Read, EntityKind::Pipe).with_id(id);
        self.client
            .pipe_exists(id.as_str())
            .await
            .map_err(|e| CoreError::from_api(&ctx, e))
    }

    pub async fn queue_exists(&self, id: &EntityId) -> Result<bool, CoreError> {
        let ctx = OpContext::new(Operation::Read, EntityKind::Queue).with_id(id);
        self.client
            .queue_exists(id.as_str())
            .await
            .map_err(|e| CoreError::from_api(&ctx, e))
    }

    pub async fn interfaces_exist(&self, names: &[&str]) -> Result<bool, CoreError> {
        self.inventory.interfaces_exist(names).await
    }

    /// A queue's parent pipe must exist.
    pub async fn check_queue(&self, queue: &Queue, ctx: &OpContext) -> Result<(), CoreError> {
        if self.pipe_exists(&queue.pipe).await? {
            return Ok(());
        }
        debug!(pipe = %queue.pipe, "queue parent pipe missing");
        Err(CoreError::UnresolvedReference {
            context: ctx.clone(),
            field: "pipe",
            reference: queue.pipe.to_string(),
            expected: "pipe",
        })
    }

    /// A rule's target must be a pipe or a queue, and its interfaces must
    /// be assigned.
    pub async fn check_rule(&self, rule: &Rule, ctx: &OpContext) -> Result<(), CoreError> {
        let target_found =
            self.pipe_exists(&rule.target).await? || self.queue_exists(&rule.target).await?;
        if !target_found {
            debug!(target = %rule.target, "rule target missing");
            return Err(CoreError::UnresolvedReference {
                context: ctx.clone(),
                field: "target",
                reference: rule.target.to_string(),
                expected: "pipe or queue",
            });
        }

        let known = self
            .inventory
            .interface_names()
            .await
            .map_err(|e| e.within(ctx))?;
        if let Some(missing) = rule
            .interfaces()
            .into_iter()
            .find(|name| !known.iter().any(|k| k == name))
        {
            let field = if missing == rule.interface {
                "interface"
            } else {
                "interface2"
            };
            return Err(CoreError::UnresolvedReference {
                context: ctx.clone(),
                field,
                reference: missing.to_owned(),
                expected: "interface",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_inventory_membership() {
        let inv = StaticInventory::new(["lan", "wan"]);
        assert!(inv.interface_exists("lan").await.unwrap());
        assert!(!inv.interface_exists("opt9").await.unwrap());
        assert!(inv.interfaces_exist(&["lan", "wan"]).await.unwrap());
        assert!(!inv.interfaces_exist(&["lan", "opt9"]).await.unwrap());
        assert!(inv.interfaces_exist(&[]).await.unwrap());
    }
}
