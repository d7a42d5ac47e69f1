//! The exception mapping chain
//!
//! An ordered walk over the registered mappers: the first applicable mapper
//! whose failure may actually be raised ends the walk. Later mappers are
//! never consulted once a failure is produced.

use crate::mapper::{LocalProvider, MappedFailure};
use crate::transport::WireResponse;
use declarest_core::ErrorKind;
use std::sync::Arc;

/// Outcome of evaluating a single mapper against a response
enum Evaluation {
    NoMatch,
    Matched(MappedFailure),
}

/// A frozen, priority-ordered sequence of providers
///
/// Construction sorts ascending by priority with a stable sort, so
/// registration order breaks ties. The chain is immutable afterwards and
/// cheap to clone; concurrent calls share it without locking.
#[derive(Clone)]
pub struct MapperChain {
    providers: Arc<[LocalProvider]>,
}

impl MapperChain {
    pub fn new(mut providers: Vec<LocalProvider>) -> Self {
        providers.sort_by_key(LocalProvider::priority);
        MapperChain {
            providers: providers.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub(crate) fn providers(&self) -> &[LocalProvider] {
        &self.providers
    }

    /// Evaluate the chain against a response
    ///
    /// Walks the providers in priority order. For each one: if it handles
    /// the status and header set and produces a failure, that failure is
    /// returned when it is fatal or when its kind appears in `declared`;
    /// an undeclared checked failure is dropped without a trace and the walk
    /// continues. This silent drop is specified behavior, preserved from the
    /// source model.
    ///
    /// At most one failure is returned per call. A mapper that panics is not
    /// caught.
    pub fn evaluate(
        &self,
        response: &WireResponse,
        declared: &[ErrorKind],
    ) -> Option<MappedFailure> {
        for provider in self.providers.iter() {
            match Self::evaluate_one(provider, response, declared) {
                Evaluation::Matched(failure) => return Some(failure),
                Evaluation::NoMatch => {}
            }
        }
        None
    }

    fn evaluate_one(
        provider: &LocalProvider,
        response: &WireResponse,
        declared: &[ErrorKind],
    ) -> Evaluation {
        let mapper = provider.mapper();
        if !mapper.handles(response.status, &response.headers) {
            return Evaluation::NoMatch;
        }

        let Some(failure) = mapper.to_failure(response) else {
            return Evaluation::NoMatch;
        };

        if failure.is_fatal() {
            return Evaluation::Matched(failure);
        }
        match failure.kind() {
            Some(kind) if declared.contains(&kind) => Evaluation::Matched(failure),
            _ => Evaluation::NoMatch,
        }
    }
}
