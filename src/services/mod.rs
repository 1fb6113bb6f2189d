pub mod client_service;
pub mod flow_service;
pub mod language_service;
pub mod project_service;
pub mod user_service;
pub mod validation;

pub use client_service::{ClientService, ClientSystemView, JobWithTranscripts};
pub use flow_service::FlowService;
pub use language_service::{parse_language_ids, LanguageService, ReconcileOutcome};
pub use project_service::{NewProject, ProjectService, ProjectUpdate};
pub use user_service::UserService;
pub use validation::*;
