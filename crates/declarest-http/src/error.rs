//! Error types for declarest-http

use crate::codec::CodecError;
use crate::mapper::MappedFailure;
use crate::transport::TransportError;
use declarest_core::{DefinitionError, PlanError};
use thiserror::Error;

/// Everything a call through the binding engine can fail with
#[derive(Debug, Error)]
pub enum ClientError {
    /// Static interface misconfiguration, raised at build time
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The invocation's arguments could not be turned into a call plan
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Failure from the HTTP collaborator; never passed through the mapping
    /// chain
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A typed failure produced by the exception mapping chain
    #[error("mapped application error: {0}")]
    Mapped(MappedFailure),

    /// The request body could not be encoded
    #[error("failed to encode request body: {0}")]
    Encode(#[source] CodecError),

    /// A success-status response whose body could not be decoded into the
    /// declared return type
    #[error("failed to decode response: {0}")]
    Decode(#[source] CodecError),

    /// The invoked method carries no recognized HTTP verb marker
    #[error("unknown HTTP method on {interface}::{method}")]
    UnknownVerb { interface: String, method: String },

    /// The invoked method name is not part of the interface descriptor
    #[error("no method named {method} on {interface}")]
    UnknownMethod { interface: String, method: String },

    /// No base URL was set on the builder and none was configured
    #[error("no base URL configured for {interface}")]
    MissingBaseUrl { interface: String },
}

impl ClientError {
    /// The mapped failure, when this error came out of the mapping chain
    pub fn mapped(&self) -> Option<&MappedFailure> {
        match self {
            ClientError::Mapped(failure) => Some(failure),
            _ => None,
        }
    }
}
