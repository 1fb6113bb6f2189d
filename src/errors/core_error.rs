use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use super::{FlowError, ProjectError};
use crate::common::db_errors::DbErrorKind;
use crate::common::transaction::DatabaseFailure;

/// Transport-neutral error classification shared by every outer surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreErrorKind {
    NotFound,
    Validation,
    Forbidden,
    /// Transient contention; the same request may succeed later
    Unavailable,
    Internal,
}

impl CoreErrorKind {
    /// HTTP status an API layer would answer with
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::Forbidden => 403,
            Self::Unavailable => 503,
            Self::Internal => 500,
        }
    }
}

#[derive(Debug)]
pub struct CoreError {
    kind: CoreErrorKind,
    code: &'static str,
    message: String,
    fields: Option<BTreeMap<String, String>>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        let code = match kind {
            CoreErrorKind::NotFound => "NOT_FOUND",
            CoreErrorKind::Validation => "VALIDATION_FAILED",
            CoreErrorKind::Forbidden => "FORBIDDEN",
            CoreErrorKind::Unavailable => "UNAVAILABLE",
            CoreErrorKind::Internal => "INTERNAL",
        };
        Self {
            kind,
            code,
            message: message.into(),
            fields: None,
            source: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Internal, message)
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> CoreErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        self.fields.as_ref()
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl StdError for CoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        let mut core = CoreError::internal(format!("{:#}", err));
        core.source = Some(err.into());
        core
    }
}

fn is_contention(err: &impl DatabaseFailure) -> bool {
    err.db_err()
        .map(|db_err| DbErrorKind::from_db_err(db_err).is_retryable())
        .unwrap_or(false)
}

impl From<FlowError> for CoreError {
    fn from(err: FlowError) -> Self {
        let kind = if err.is_not_found() {
            CoreErrorKind::NotFound
        } else if err.is_client_error() {
            CoreErrorKind::Validation
        } else if is_contention(&err) {
            CoreErrorKind::Unavailable
        } else {
            CoreErrorKind::Internal
        };

        let mut core = CoreError::new(kind, err.to_string());
        if kind != CoreErrorKind::Unavailable {
            core = core.with_code(err.error_code());
        }

        match &err {
            FlowError::ProjectNotFound(id) => {
                core = core.with_field("projectId", id.to_string());
            }
            FlowError::UnknownNodeType { node, node_type } => {
                core = core
                    .with_field("nodeId", node.clone())
                    .with_field("type", node_type.clone());
            }
            FlowError::DuplicateNode(node) => {
                core = core.with_field("nodeId", node.clone());
            }
            _ => {}
        }
        core.with_source(err)
    }
}

impl From<ProjectError> for CoreError {
    fn from(err: ProjectError) -> Self {
        let kind = if err.is_not_found() {
            CoreErrorKind::NotFound
        } else if matches!(err, ProjectError::WrongRole { .. }) {
            CoreErrorKind::Forbidden
        } else if err.is_client_error() {
            CoreErrorKind::Validation
        } else if is_contention(&err) {
            CoreErrorKind::Unavailable
        } else {
            CoreErrorKind::Internal
        };

        let mut core = CoreError::new(kind, err.to_string());
        if kind != CoreErrorKind::Unavailable {
            core = core.with_code(err.error_code());
        }
        if let Some(field) = err.field() {
            core = core.with_field("field", field.to_string());
        }
        core.with_source(err)
    }
}
