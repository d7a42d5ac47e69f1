//! Per-invocation call plans
//!
//! A [`CallPlan`] is the request shape derived from one method invocation:
//! the resolved path, query pairs, headers and optional body. It is created
//! fresh for every call and discarded when the call completes.

use crate::descriptor::{EndpointDescriptor, MethodDescriptor, ParamBinding};
use crate::error::PlanError;
use crate::template;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Characters escaped in query keys and values. Notably `' '` becomes `%20`,
/// not `+`.
const QUERY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'%')
    .add(b'&')
    .add(b'=')
    .add(b'+')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One invocation argument
///
/// Arguments are captured as JSON values once, at the call boundary. The
/// binding role decides how the value is used: path, query and header
/// bindings take the string form, a body binding takes the JSON value
/// itself.
#[derive(Debug, Clone)]
pub struct CallArg {
    value: Value,
}

impl CallArg {
    /// Capture a serializable argument
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Serialize`] when the value cannot be represented
    /// as JSON.
    pub fn new<T: Serialize>(value: &T) -> Result<Self, PlanError> {
        Ok(CallArg {
            value: serde_json::to_value(value)?,
        })
    }

    pub fn from_value(value: Value) -> Self {
        CallArg { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The string form used for path, query and header bindings
    ///
    /// A JSON string renders without quotes; any other value renders as its
    /// JSON text.
    pub fn as_string(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// The request shape for a single invocation
#[derive(Debug, Clone)]
pub struct CallPlan {
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Value>,
}

impl CallPlan {
    /// The resolved path: class prefix plus method template with all
    /// variables substituted
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query pairs in declaration order. Keys are unique; a duplicate key in
    /// the same invocation overwrote the earlier value.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Header multimap. A header name may carry several values.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// The percent-encoded query string, without the leading `?`. Empty when
    /// the plan has no query parameters.
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, QUERY),
                    utf8_percent_encode(value, QUERY)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Build the call plan for one invocation of `method`
///
/// Arguments are matched positionally against the method's parameter
/// bindings and dispatched by role. When more than one body binding is
/// declared the last body argument wins; this is a permissive policy, not a
/// validated one.
///
/// # Errors
///
/// Returns [`PlanError::ArityMismatch`] when the argument count differs from
/// the binding count, [`PlanError::InvalidHeaderName`] /
/// [`PlanError::InvalidHeaderValue`] for malformed headers, and a wrapped
/// [`DefinitionError`](crate::DefinitionError) when a template variable has
/// no bound value (prevented for verified descriptors).
pub fn build_plan(
    endpoint: &EndpointDescriptor,
    method: &MethodDescriptor,
    args: &[CallArg],
) -> Result<CallPlan, PlanError> {
    if method.params().len() != args.len() {
        return Err(PlanError::ArityMismatch {
            expected: method.params().len(),
            got: args.len(),
        });
    }

    let mut path_values: HashMap<String, String> = HashMap::new();
    let mut query: Vec<(String, String)> = Vec::new();
    let mut headers = HeaderMap::new();
    let mut body: Option<Value> = None;

    for (binding, arg) in method.params().iter().zip(args) {
        match binding {
            ParamBinding::Path(name) => {
                path_values.insert(name.clone(), arg.as_string());
            }
            ParamBinding::Query(name) => {
                set_query(&mut query, name, arg.as_string());
            }
            ParamBinding::Header(name) => {
                let header_name = HeaderName::try_from(name.as_str())
                    .map_err(|_| PlanError::InvalidHeaderName(name.clone()))?;
                let header_value = HeaderValue::try_from(arg.as_string())
                    .map_err(|_| PlanError::InvalidHeaderValue(name.clone()))?;
                headers.append(header_name, header_value);
            }
            ParamBinding::Body => {
                body = Some(arg.value().clone());
            }
        }
    }

    let template = join_paths(endpoint.prefix(), method.template());
    let path = template::substitute(&template, &path_values)?;

    Ok(CallPlan {
        path,
        query,
        headers,
        body,
    })
}

/// Overwrite the value when the key already exists, keeping its original
/// position; append otherwise
fn set_query(query: &mut Vec<(String, String)>, name: &str, value: String) {
    match query.iter_mut().find(|(key, _)| key == name) {
        Some((_, existing)) => *existing = value,
        None => query.push((name.to_string(), value)),
    }
}

/// Concatenate the class prefix and method template, inserting a separating
/// slash when the next segment does not already start with one
fn join_paths(prefix: &str, template: &str) -> String {
    let mut path = String::new();
    for segment in [prefix, template] {
        if segment.is_empty() {
            continue;
        }
        if !segment.starts_with('/') {
            path.push('/');
        }
        path.push_str(segment);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MethodDescriptor;
    use pretty_assertions::assert_eq;

    fn arg<T: Serialize>(value: T) -> CallArg {
        CallArg::new(&value).unwrap()
    }

    mod arguments {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn string_form_drops_quotes() {
            assert_eq!(arg("abc").as_string(), "abc");
        }

        #[test]
        fn numbers_and_booleans_render_as_json_text() {
            assert_eq!(arg(42).as_string(), "42");
            assert_eq!(arg(true).as_string(), "true");
        }
    }

    mod paths {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn slash_inserted_between_segments() {
            assert_eq!(join_paths("svc", "items"), "/svc/items");
            assert_eq!(join_paths("/svc", "/items"), "/svc/items");
            assert_eq!(join_paths("/svc", "items"), "/svc/items");
        }

        #[test]
        fn empty_segments_are_skipped() {
            assert_eq!(join_paths("", "/items"), "/items");
            assert_eq!(join_paths("/svc", ""), "/svc");
            assert_eq!(join_paths("", ""), "");
        }

        #[test]
        fn prefix_and_template_resolve_together() {
            let endpoint = EndpointDescriptor::new("ItemService").path("/svc");
            let method = MethodDescriptor::new("fetch")
                .get()
                .path("/items/{id}")
                .path_param("id")
                .query_param("q");

            let plan = build_plan(&endpoint, &method, &[arg(42), arg("x y")]).unwrap();
            assert_eq!(plan.path(), "/svc/items/42");
            assert_eq!(plan.query_string(), "q=x%20y");
        }
    }

    mod queries {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn declaration_order_is_kept() {
            let endpoint = EndpointDescriptor::new("ItemService");
            let method = MethodDescriptor::new("search")
                .get()
                .path("/items")
                .query_param("b")
                .query_param("a");

            let plan = build_plan(&endpoint, &method, &[arg("1"), arg("2")]).unwrap();
            assert_eq!(plan.query_string(), "b=1&a=2");
        }

        #[test]
        fn duplicate_key_last_write_wins_in_place() {
            let endpoint = EndpointDescriptor::new("ItemService");
            let method = MethodDescriptor::new("search")
                .get()
                .path("/items")
                .query_param("q")
                .query_param("page")
                .query_param("q");

            let plan = build_plan(&endpoint, &method, &[arg("old"), arg(2), arg("new")]).unwrap();
            assert_eq!(
                plan.query(),
                &[
                    ("q".to_string(), "new".to_string()),
                    ("page".to_string(), "2".to_string()),
                ]
            );
        }

        #[test]
        fn reserved_characters_are_escaped() {
            let endpoint = EndpointDescriptor::new("ItemService");
            let method = MethodDescriptor::new("search").get().path("/items").query_param("q");

            let plan = build_plan(&endpoint, &method, &[arg("a&b=c")]).unwrap();
            assert_eq!(plan.query_string(), "q=a%26b%3Dc");
        }
    }

    mod headers {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn a_header_may_repeat() {
            let endpoint = EndpointDescriptor::new("ItemService");
            let method = MethodDescriptor::new("fetch")
                .get()
                .path("/items")
                .header_param("X-Tag")
                .header_param("X-Tag");

            let plan = build_plan(&endpoint, &method, &[arg("one"), arg("two")]).unwrap();
            let tags: Vec<_> = plan.headers().get_all("X-Tag").iter().collect();
            assert_eq!(tags.len(), 2);
        }

        #[test]
        fn invalid_header_name_is_rejected() {
            let endpoint = EndpointDescriptor::new("ItemService");
            let method = MethodDescriptor::new("fetch")
                .get()
                .path("/items")
                .header_param("bad header");

            let err = build_plan(&endpoint, &method, &[arg("v")]).unwrap_err();
            assert!(matches!(err, PlanError::InvalidHeaderName(_)));
        }
    }

    mod bodies {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn last_unbound_argument_wins() {
            let endpoint = EndpointDescriptor::new("ItemService");
            let method = MethodDescriptor::new("create")
                .post()
                .path("/items")
                .body_param()
                .body_param();

            let plan = build_plan(&endpoint, &method, &[arg("first"), arg("second")]).unwrap();
            assert_eq!(plan.body(), Some(&Value::String("second".to_string())));
        }

        #[test]
        fn no_body_binding_means_no_body() {
            let endpoint = EndpointDescriptor::new("ItemService");
            let method = MethodDescriptor::new("fetch").get().path("/items");

            let plan = build_plan(&endpoint, &method, &[]).unwrap();
            assert!(plan.body().is_none());
        }
    }

    mod arity {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn argument_count_must_match_bindings() {
            let endpoint = EndpointDescriptor::new("ItemService");
            let method = MethodDescriptor::new("fetch").get().path("/items/{id}").path_param("id");

            let err = build_plan(&endpoint, &method, &[]).unwrap_err();
            assert!(matches!(
                err,
                PlanError::ArityMismatch {
                    expected: 1,
                    got: 0
                }
            ));
        }
    }
}
