//! Endpoint and method descriptors
//!
//! A descriptor is the compiled, immutable form of a declarative interface:
//! the caller states each method's HTTP verb, URI template and parameter
//! roles once, and the invocation engine reads the descriptor on every call
//! instead of re-deriving anything.

use std::any::{type_name, TypeId};
use std::fmt::{Display, Formatter};

/// HTTP verbs recognized by the binding engine
///
/// Exactly these four are supported. A method carrying none of them fails at
/// its first invocation; a method carrying more than one fails verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Put,
    Post,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Put => "PUT",
            Verb::Post => "POST",
            Verb::Delete => "DELETE",
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role one parameter plays in a request
///
/// Path, query and header parameters carry the binding name; a body
/// parameter has none. An unannotated parameter in the source model is a
/// `Body` binding here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBinding {
    /// Substituted into the URI template under the given variable name.
    Path(String),
    /// Appended to the request URI as a query parameter.
    Query(String),
    /// Appended to the request headers. A header name may repeat.
    Header(String),
    /// Serialized as the request body. At most one body is meaningful per
    /// call; when several are declared the last one wins at plan time.
    Body,
}

impl ParamBinding {
    /// The binding name, or `None` for a body binding
    pub fn name(&self) -> Option<&str> {
        match self {
            ParamBinding::Path(name) | ParamBinding::Query(name) | ParamBinding::Header(name) => {
                Some(name)
            }
            ParamBinding::Body => None,
        }
    }
}

/// Identity of a checked failure type a method declares it can surface
///
/// Replaces a checked-exception list on a method signature: a mapper's
/// non-fatal failure is only raised when its concrete type matches one of
/// the kinds declared here. Matching is exact — Rust error types have no
/// subtype relation.
#[derive(Debug, Clone, Copy, Eq)]
pub struct ErrorKind {
    id: TypeId,
    name: &'static str,
}

impl ErrorKind {
    pub fn of<E: 'static>() -> Self {
        ErrorKind {
            id: TypeId::of::<E>(),
            name: type_name::<E>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::hash::Hash for ErrorKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Compiled metadata for one interface method
///
/// Built once through the chainable constructors, then treated as immutable.
///
/// # Example
///
/// ```rust
/// use declarest_core::MethodDescriptor;
///
/// let method = MethodDescriptor::new("get_item")
///     .get()
///     .path("/items/{id}")
///     .path_param("id")
///     .query_param("verbose");
/// assert_eq!(method.template(), "/items/{id}");
/// ```
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    name: String,
    verbs: Vec<Verb>,
    template: String,
    params: Vec<ParamBinding>,
    errors: Vec<ErrorKind>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        MethodDescriptor {
            name: name.into(),
            verbs: Vec::new(),
            template: String::new(),
            params: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Add a verb marker. Declaring more than one is possible here and
    /// rejected by the verifier, mirroring how an interface definition can
    /// be written wrong before it is checked.
    pub fn verb(mut self, verb: Verb) -> Self {
        self.verbs.push(verb);
        self
    }

    pub fn get(self) -> Self {
        self.verb(Verb::Get)
    }

    pub fn put(self) -> Self {
        self.verb(Verb::Put)
    }

    pub fn post(self) -> Self {
        self.verb(Verb::Post)
    }

    pub fn delete(self) -> Self {
        self.verb(Verb::Delete)
    }

    /// Set the method-level path template. May be left empty.
    pub fn path(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Declare the next parameter as a path variable
    pub fn path_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamBinding::Path(name.into()));
        self
    }

    /// Declare the next parameter as a query parameter
    pub fn query_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamBinding::Query(name.into()));
        self
    }

    /// Declare the next parameter as a header
    pub fn header_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamBinding::Header(name.into()));
        self
    }

    /// Declare the next parameter as the request body
    pub fn body_param(mut self) -> Self {
        self.params.push(ParamBinding::Body);
        self
    }

    /// Declare a checked failure type this method can surface
    pub fn error<E: 'static>(mut self) -> Self {
        self.errors.push(ErrorKind::of::<E>());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All verb markers as declared. A well-formed method has exactly one.
    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter bindings in declaration order
    pub fn params(&self) -> &[ParamBinding] {
        &self.params
    }

    /// Checked failure kinds declared on this method
    pub fn declared_errors(&self) -> &[ErrorKind] {
        &self.errors
    }
}

/// Compiled metadata for one remote interface
///
/// Owns the interface name (used in error messages and configuration keys),
/// an optional class-level path prefix and the method descriptors. Immutable
/// once verified; the client builder caches the verification per interface
/// name.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    interface: String,
    prefix: String,
    methods: Vec<MethodDescriptor>,
}

impl EndpointDescriptor {
    pub fn new(interface: impl Into<String>) -> Self {
        EndpointDescriptor {
            interface: interface.into(),
            prefix: String::new(),
            methods: Vec::new(),
        }
    }

    /// Set the class-level path prefix shared by every method
    pub fn path(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Look up a method descriptor by name
    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|method| method.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chainable_construction_accumulates_in_order() {
        let method = MethodDescriptor::new("update")
            .put()
            .path("/items/{id}")
            .path_param("id")
            .header_param("X-Trace")
            .body_param();

        assert_eq!(method.verbs(), &[Verb::Put]);
        assert_eq!(
            method.params(),
            &[
                ParamBinding::Path("id".to_string()),
                ParamBinding::Header("X-Trace".to_string()),
                ParamBinding::Body,
            ]
        );
    }

    #[test]
    fn binding_names() {
        assert_eq!(ParamBinding::Query("q".to_string()).name(), Some("q"));
        assert_eq!(ParamBinding::Body.name(), None);
    }

    #[test]
    fn error_kinds_match_by_type() {
        #[derive(Debug)]
        struct NotFound;
        #[derive(Debug)]
        struct Conflict;

        assert_eq!(ErrorKind::of::<NotFound>(), ErrorKind::of::<NotFound>());
        assert_ne!(ErrorKind::of::<NotFound>(), ErrorKind::of::<Conflict>());
    }

    #[test]
    fn method_lookup_by_name() {
        let endpoint = EndpointDescriptor::new("ItemService")
            .path("/svc")
            .method(MethodDescriptor::new("list").get())
            .method(MethodDescriptor::new("fetch").get().path("/{id}").path_param("id"));

        assert_eq!(endpoint.find_method("fetch").map(|m| m.name()), Some("fetch"));
        assert!(endpoint.find_method("missing").is_none());
    }

    #[test]
    fn verb_display() {
        assert_eq!(Verb::Get.to_string(), "GET");
        assert_eq!(Verb::Delete.as_str(), "DELETE");
    }
}
