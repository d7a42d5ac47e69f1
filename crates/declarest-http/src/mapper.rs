//! Response exception mappers
//!
//! A mapper turns an HTTP error response into a typed failure value. Mappers
//! are registered on the client builder with an integer priority (lower
//! value wins) and evaluated by the [`MapperChain`](crate::MapperChain) until
//! the first applicable one produces a failure the call may raise.

use crate::transport::WireResponse;
use declarest_core::ErrorKind;
use http::{HeaderMap, StatusCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

/// Priority assumed when a mapper does not override [`ResponseExceptionMapper::priority`]
pub const USER_PRIORITY: i32 = 5000;

/// Priority of the default mapper: the largest value, so it is evaluated
/// last
pub const DEFAULT_MAPPER_PRIORITY: i32 = i32::MAX;

/// A typed failure produced by a mapper
///
/// A failure is either *fatal* — raised unconditionally — or *checked*,
/// carrying the [`ErrorKind`] of its concrete type and raised only when the
/// invoked method declares that kind. An undeclared checked failure is
/// silently dropped and the chain moves on.
#[derive(Debug)]
pub struct MappedFailure {
    error: Box<dyn Error + Send + Sync>,
    kind: Option<ErrorKind>,
}

impl MappedFailure {
    /// A failure that is raised no matter what the method declares
    pub fn fatal(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        MappedFailure {
            error: error.into(),
            kind: None,
        }
    }

    /// A failure raised only when the invoked method declares `E`
    pub fn checked<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        MappedFailure {
            error: Box::new(error),
            kind: Some(ErrorKind::of::<E>()),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_none()
    }

    /// The declared-failure kind, or `None` for a fatal failure
    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.error.downcast_ref()
    }

    pub fn into_error(self) -> Box<dyn Error + Send + Sync> {
        self.error
    }
}

impl Display for MappedFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.error, f)
    }
}

/// Trait for response exception mappers
pub trait ResponseExceptionMapper: Send + Sync {
    /// Whether this mapper applies to a response with the given status and
    /// headers. Defaults to any error status.
    fn handles(&self, status: StatusCode, headers: &HeaderMap) -> bool {
        let _ = headers;
        status.as_u16() >= 400
    }

    /// Produce the failure for an applicable response, or `None` to let the
    /// chain continue
    fn to_failure(&self, response: &WireResponse) -> Option<MappedFailure>;

    /// Evaluation priority; lower values are consulted first
    fn priority(&self) -> i32 {
        USER_PRIORITY
    }
}

/// The generic application error produced by the default mapper
#[derive(Debug, Error)]
#[error("unknown error, status code {status}")]
pub struct UnexpectedStatus {
    pub status: StatusCode,
}

/// Default mapper: matches any status >= 400, lowest precedence, produces a
/// fatal [`UnexpectedStatus`]
///
/// Appended automatically by the builder unless disabled through
/// configuration.
pub struct DefaultExceptionMapper;

impl ResponseExceptionMapper for DefaultExceptionMapper {
    fn to_failure(&self, response: &WireResponse) -> Option<MappedFailure> {
        Some(MappedFailure::fatal(UnexpectedStatus {
            status: response.status,
        }))
    }

    fn priority(&self) -> i32 {
        DEFAULT_MAPPER_PRIORITY
    }
}

/// A registered mapper with its effective priority
///
/// Identity is the `Arc` pointer: registering the same instance twice is
/// detected and ignored by the builder.
#[derive(Clone)]
pub struct LocalProvider {
    mapper: Arc<dyn ResponseExceptionMapper>,
    priority: i32,
}

impl LocalProvider {
    pub fn new(mapper: Arc<dyn ResponseExceptionMapper>, priority: i32) -> Self {
        LocalProvider { mapper, priority }
    }

    pub fn mapper(&self) -> &dyn ResponseExceptionMapper {
        self.mapper.as_ref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether this provider wraps the given mapper instance
    pub fn is_instance(&self, mapper: &Arc<dyn ResponseExceptionMapper>) -> bool {
        Arc::ptr_eq(&self.mapper, mapper)
    }
}
