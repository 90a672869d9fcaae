//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce cross-entity invariants (note link rules, delete
//!   cascades) that single repositories cannot see.
//! - Publish change events after successful commits.
//!
//! # Invariants
//! - Validation failures never reach the store.
//! - Events are published only after the storage write succeeded.

use crate::model::category::CategoryId;
use crate::model::subcategory::SubcategoryId;
use crate::model::{EntityKind, ValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod catalog_service;
pub mod note_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error shared by the catalog and note use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any store mutation was attempted.
    Validation(ValidationError),
    /// Target record does not exist.
    NotFound { kind: EntityKind, id: Uuid },
    /// Note links a subcategory that belongs to a different category.
    SubcategoryMismatch {
        subcategory: SubcategoryId,
        expected_category: CategoryId,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::SubcategoryMismatch {
                subcategory,
                expected_category,
            } => write!(
                f,
                "subcategory {subcategory} belongs to category {expected_category}, not the requested one"
            ),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent store state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
