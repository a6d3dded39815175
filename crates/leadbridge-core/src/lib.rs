pub mod error;
pub mod event;
pub mod money;
pub mod naming;
pub mod payload;
pub mod stage;

pub use error::{CoreError, ErrorCategory, Result};
pub use event::{EventKind, Handler, Routed, route};
pub use money::minor_to_major;
pub use naming::deal_name;
pub use payload::{
    AppointmentPayload, CustomerPayload, EstimateOption, EstimatePayload, JobPayload,
    WebhookEnvelope,
};
pub use stage::{ApprovalStagePolicy, Stage, StageMap, resolve_stage};
