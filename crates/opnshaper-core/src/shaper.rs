// ── Shaper engine ──
//
// Entry point for consumers. Every mutation runs the same pipeline:
// local field checks, registry encoding, referential validation, stage,
// commit. Reads decode the firewall's read-back into the desired-state
// model so it can be compared with what the caller asked for.

use opnshaper_api::ApiClient;
use opnshaper_api::interfaces::InterfaceRow;
use opnshaper_api::shaper::DeleteOutcome;
use tracing::{debug, info};

use crate::apply::{Applied, ApplyCoordinator, ApplyState};
use crate::config::ShaperConfig;
use crate::convert;
use crate::error::{CoreError, EntityKind, OpContext, Operation};
use crate::model::{EntityId, EntitySummary, Pipe, Queue, Rule};
use crate::registry::EnumRegistry;
use crate::validate::{InterfaceInventory, ReferenceValidator};

/// Traffic shaper engine for one firewall.
///
/// Strictly sequential: each operation awaits its requests one after
/// another, holds no cache and retries nothing.
pub struct Shaper<I = ApiClient> {
    client: ApiClient,
    registry: EnumRegistry,
    inventory: I,
    auto_commit: bool,
}

impl Shaper<ApiClient> {
    /// Engine that reads interfaces from the same firewall.
    pub fn new(client: ApiClient) -> Result<Self, CoreError> {
        let inventory = client.clone();
        Self::with_inventory(client, inventory)
    }

    /// Build the HTTP client from `config` and wrap it.
    pub fn connect(config: &ShaperConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(
            config.url.as_str(),
            config.credentials.clone().map(Into::into),
            &config.transport(),
        )
        .map_err(|e| CoreError::Config {
            message: e.to_string(),
        })?;
        Self::new(client)
    }
}

impl<I: InterfaceInventory> Shaper<I> {
    pub fn with_inventory(client: ApiClient, inventory: I) -> Result<Self, CoreError> {
        Ok(Self {
            client,
            registry: EnumRegistry::opnsense()?,
            inventory,
            auto_commit: true,
        })
    }

    #[must_use]
    pub fn with_registry(mut self, registry: EnumRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// With `false`, mutations are staged only and report
    /// [`ApplyState::Staged`]; call [`reconfigure`](Self::reconfigure) once
    /// at the end of a batch.
    #[must_use]
    pub fn with_auto_commit(mut self, auto_commit: bool) -> Self {
        self.auto_commit = auto_commit;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn registry(&self) -> &EnumRegistry {
        &self.registry
    }

    pub fn validator(&self) -> ReferenceValidator<'_, I> {
        ReferenceValidator::new(&self.client, &self.inventory)
    }

    fn coordinator(&self) -> ApplyCoordinator<'_> {
        ApplyCoordinator::new(&self.client, self.auto_commit)
    }

    // ── Pipes ────────────────────────────────────────────────────────

    pub async fn create_pipe(&self, pipe: &Pipe) -> Result<Applied<EntityId>, CoreError> {
        let ctx = OpContext::new(Operation::Create, EntityKind::Pipe);
        pipe.validate().map_err(|e| e.with_context(&ctx))?;
        let body = convert::encode_pipe(pipe, &self.registry).map_err(|e| e.with_context(&ctx))?;

        self.coordinator()
            .apply(&ctx, async {
                let id = self.client.add_pipe(&body).await.map_err(api_err(&ctx))?;
                let id = EntityId::from(id);
                info!(%id, "pipe staged");
                Ok(id)
            })
            .await
    }

    pub async fn read_pipe(&self, id: &EntityId) -> Result<Pipe, CoreError> {
        let ctx = OpContext::new(Operation::Read, EntityKind::Pipe).with_id(id);
        let record = self
            .client
            .get_pipe(id.as_str())
            .await
            .map_err(api_err(&ctx))?
            .ok_or_else(|| not_found(&ctx))?;
        convert::decode_pipe(&record, &self.registry).map_err(|e| e.with_context(&ctx))
    }

    /// An unknown `id` is [`CoreError::NotFound`] and nothing is committed.
    pub async fn update_pipe(&self, id: &EntityId, pipe: &Pipe) -> Result<Applied<()>, CoreError> {
        let ctx = OpContext::new(Operation::Update, EntityKind::Pipe).with_id(id);
        pipe.validate().map_err(|e| e.with_context(&ctx))?;
        let body = convert::encode_pipe(pipe, &self.registry).map_err(|e| e.with_context(&ctx))?;

        self.coordinator()
            .apply(&ctx, async {
                self.client
                    .set_pipe(id.as_str(), &body)
                    .await
                    .map_err(api_err(&ctx))
            })
            .await
    }

    /// Deleting an absent pipe succeeds with [`DeleteOutcome::NotFound`].
    pub async fn delete_pipe(&self, id: &EntityId) -> Result<Applied<DeleteOutcome>, CoreError> {
        let ctx = OpContext::new(Operation::Delete, EntityKind::Pipe).with_id(id);
        self.coordinator()
            .apply(&ctx, async {
                self.client.del_pipe(id.as_str()).await.map_err(api_err(&ctx))
            })
            .await
    }

    pub async fn list_pipes(&self) -> Result<Vec<EntitySummary>, CoreError> {
        let ctx = OpContext::new(Operation::List, EntityKind::Pipe);
        let rows = self.client.search_pipes().await.map_err(api_err(&ctx))?;
        Ok(rows.into_iter().map(EntitySummary::from).collect())
    }

    // ── Queues ───────────────────────────────────────────────────────

    pub async fn create_queue(&self, queue: &Queue) -> Result<Applied<EntityId>, CoreError> {
        let ctx = OpContext::new(Operation::Create, EntityKind::Queue);
        queue.validate().map_err(|e| e.with_context(&ctx))?;
        let body =
            convert::encode_queue(queue, &self.registry).map_err(|e| e.with_context(&ctx))?;
        self.validator().check_queue(queue, &ctx).await?;

        self.coordinator()
            .apply(&ctx, async {
                let id = self.client.add_queue(&body).await.map_err(api_err(&ctx))?;
                let id = EntityId::from(id);
                info!(%id, pipe = %queue.pipe, "queue staged");
                Ok(id)
            })
            .await
    }

    pub async fn read_queue(&self, id: &EntityId) -> Result<Queue, CoreError> {
        let ctx = OpContext::new(Operation::Read, EntityKind::Queue).with_id(id);
        let record = self
            .client
            .get_queue(id.as_str())
            .await
            .map_err(api_err(&ctx))?
            .ok_or_else(|| not_found(&ctx))?;
        convert::decode_queue(&record, &self.registry).map_err(|e| e.with_context(&ctx))
    }

    pub async fn update_queue(
        &self,
        id: &EntityId,
        queue: &Queue,
    ) -> Result<Applied<()>, CoreError> {
        let ctx = OpContext::new(Operation::Update, EntityKind::Queue).with_id(id);
        queue.validate().map_err(|e| e.with_context(&ctx))?;
        let body =
            convert::encode_queue(queue, &self.registry).map_err(|e| e.with_context(&ctx))?;
        self.validator().check_queue(queue, &ctx).await?;

        self.coordinator()
            .apply(&ctx, async {
                self.client
                    .set_queue(id.as_str(), &body)
                    .await
                    .map_err(api_err(&ctx))
            })
            .await
    }

    pub async fn delete_queue(&self, id: &EntityId) -> Result<Applied<DeleteOutcome>, CoreError> {
        let ctx = OpContext::new(Operation::Delete, EntityKind::Queue).with_id(id);
        self.coordinator()
            .apply(&ctx, async {
                self.client.del_queue(id.as_str()).await.map_err(api_err(&ctx))
            })
            .await
    }

    pub async fn list_queues(&self) -> Result<Vec<EntitySummary>, CoreError> {
        let ctx = OpContext::new(Operation::List, EntityKind::Queue);
        let rows = self.client.search_queues().await.map_err(api_err(&ctx))?;
        Ok(rows.into_iter().map(EntitySummary::from).collect())
    }

    // ── Rules ────────────────────────────────────────────────────────

    pub async fn create_rule(&self, rule: &Rule) -> Result<Applied<EntityId>, CoreError> {
        let ctx = OpContext::new(Operation::Create, EntityKind::Rule);
        rule.validate().map_err(|e| e.with_context(&ctx))?;
        let body = convert::encode_rule(rule, &self.registry).map_err(|e| e.with_context(&ctx))?;
        self.validator().check_rule(rule, &ctx).await?;

        self.coordinator()
            .apply(&ctx, async {
                let id = self.client.add_rule(&body).await.map_err(api_err(&ctx))?;
                let id = EntityId::from(id);
                info!(%id, target = %rule.target, "rule staged");
                Ok(id)
            })
            .await
    }

    pub async fn read_rule(&self, id: &EntityId) -> Result<Rule, CoreError> {
        let ctx = OpContext::new(Operation::Read, EntityKind::Rule).with_id(id);
        let record = self
            .client
            .get_rule(id.as_str())
            .await
            .map_err(api_err(&ctx))?
            .ok_or_else(|| not_found(&ctx))?;
        convert::decode_rule(&record, &self.registry).map_err(|e| e.with_context(&ctx))
    }

    pub async fn update_rule(&self, id: &EntityId, rule: &Rule) -> Result<Applied<()>, CoreError> {
        let ctx = OpContext::new(Operation::Update, EntityKind::Rule).with_id(id);
        rule.validate().map_err(|e| e.with_context(&ctx))?;
        let body = convert::encode_rule(rule, &self.registry).map_err(|e| e.with_context(&ctx))?;
        self.validator().check_rule(rule, &ctx).await?;

        self.coordinator()
            .apply(&ctx, async {
                self.client
                    .set_rule(id.as_str(), &body)
                    .await
                    .map_err(api_err(&ctx))
            })
            .await
    }

    pub async fn delete_rule(&self, id: &EntityId) -> Result<Applied<DeleteOutcome>, CoreError> {
        let ctx = OpContext::new(Operation::Delete, EntityKind::Rule).with_id(id);
        self.coordinator()
            .apply(&ctx, async {
                self.client.del_rule(id.as_str()).await.map_err(api_err(&ctx))
            })
            .await
    }

    pub async fn list_rules(&self) -> Result<Vec<EntitySummary>, CoreError> {
        let ctx = OpContext::new(Operation::List, EntityKind::Rule);
        let rows = self.client.search_rules().await.map_err(api_err(&ctx))?;
        Ok(rows.into_iter().map(EntitySummary::from).collect())
    }

    // ── Service ──────────────────────────────────────────────────────

    /// Interfaces assigned on the firewall; rules refer to their identifiers.
    pub async fn list_interfaces(&self) -> Result<Vec<InterfaceRow>, CoreError> {
        let ctx = OpContext::interfaces();
        self.client.list_interfaces().await.map_err(api_err(&ctx))
    }

    /// Apply everything staged so far.
    ///
    /// Unlike the commit that follows a mutation, failure here is an error:
    /// committing is the whole point of the call.
    pub async fn reconfigure(&self) -> Result<ApplyState, CoreError> {
        let ctx = OpContext::reconfigure();
        debug!("explicit reconfigure");
        let status = self
            .client
            .reconfigure_shaper()
            .await
            .map_err(api_err(&ctx))?;
        if status.is_ok() {
            info!("traffic shaper reconfigured");
            Ok(ApplyState::Committed)
        } else {
            Err(CoreError::CommitFailed {
                message: format!("firewall returned status '{}'", status.status),
            })
        }
    }
}

fn api_err(ctx: &OpContext) -> impl FnOnce(opnshaper_api::Error) -> CoreError + '_ {
    move |e| CoreError::from_api(ctx, e)
}

fn not_found(ctx: &OpContext) -> CoreError {
    CoreError::NotFound {
        context: ctx.clone(),
    }
}
