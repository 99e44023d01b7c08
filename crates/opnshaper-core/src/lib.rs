// opnshaper-core: Reconciliation engine between desired shaper state and the firewall API.

pub mod apply;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod registry;
pub mod shaper;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use apply::{Applied, ApplyCoordinator, ApplyState};
pub use config::{Credentials, ShaperConfig, TlsVerification};
pub use error::{CoreError, EntityKind, OpContext, Operation};
pub use registry::{EnumKind, EnumRegistry, LabelMap, ValueSet};
pub use shaper::Shaper;
pub use validate::{InterfaceInventory, ReferenceValidator, StaticInventory};

pub use model::{
    Bandwidth, EntityId, EntitySummary, Pipe, PipeCodel, Queue, QueueCodel, Rule, StringSet, UNSET,
};

pub use opnshaper_api::interfaces::InterfaceRow;
pub use opnshaper_api::shaper::DeleteOutcome;
