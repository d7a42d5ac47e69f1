//! Static interface verification
//!
//! Every interface is verified exactly once, before the first client for it
//! is constructed. Verification failures are fatal at build time; a verified
//! descriptor never fails these checks at call time.

use crate::descriptor::{EndpointDescriptor, ParamBinding};
use crate::error::DefinitionError;
use crate::template::extract_variables;
use std::collections::BTreeSet;

/// Verify an endpoint descriptor
///
/// Checks:
/// 1. No method carries more than one HTTP verb marker.
/// 2. For every method with a path template, the variables of the combined
///    template (class prefix plus method template) and the path-bound
///    parameter names form a total bijection: same cardinality, full
///    coverage in both directions.
///
/// Methods without a path template are skipped by check 2; their path-bound
/// parameters, if any, have nothing to match against and the class prefix
/// alone does not oblige them.
///
/// # Errors
///
/// Returns a [`DefinitionError`] naming the offending interface and method.
pub fn verify(endpoint: &EndpointDescriptor) -> Result<(), DefinitionError> {
    for method in endpoint.methods() {
        if method.verbs().len() > 1 {
            return Err(DefinitionError::AmbiguousVerb {
                interface: endpoint.interface().to_string(),
                method: method.name().to_string(),
            });
        }
    }

    let class_variables: BTreeSet<String> =
        extract_variables(endpoint.prefix()).into_iter().collect();

    for method in endpoint.methods() {
        if method.template().is_empty() {
            continue;
        }

        let mut variables = class_variables.clone();
        variables.extend(extract_variables(method.template()));

        let parameter_names: BTreeSet<&str> = method
            .params()
            .iter()
            .filter_map(|binding| match binding {
                ParamBinding::Path(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();

        if variables.len() != parameter_names.len() {
            return Err(DefinitionError::PathVariableMismatch {
                interface: endpoint.interface().to_string(),
                method: method.name().to_string(),
            });
        }

        let unmatched = parameter_names
            .iter()
            .any(|name| !variables.contains(*name));
        if unmatched {
            return Err(DefinitionError::PathParamMismatch {
                interface: endpoint.interface().to_string(),
                method: method.name().to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MethodDescriptor;

    fn endpoint() -> EndpointDescriptor {
        EndpointDescriptor::new("ItemService").path("/svc")
    }

    mod verbs {
        use super::*;

        #[test]
        fn single_verb_is_accepted() {
            let descriptor = endpoint().method(MethodDescriptor::new("list").get());
            assert!(verify(&descriptor).is_ok());
        }

        #[test]
        fn two_verb_markers_are_ambiguous() {
            let descriptor = endpoint().method(MethodDescriptor::new("broken").get().post());
            assert_eq!(
                verify(&descriptor),
                Err(DefinitionError::AmbiguousVerb {
                    interface: "ItemService".to_string(),
                    method: "broken".to_string(),
                })
            );
        }

        #[test]
        fn missing_verb_is_not_a_verification_error() {
            // A verb-less method fails at its first invocation, not here.
            let descriptor = endpoint().method(MethodDescriptor::new("later"));
            assert!(verify(&descriptor).is_ok());
        }
    }

    mod path_variables {
        use super::*;

        #[test]
        fn bijection_is_accepted() {
            let descriptor = endpoint().method(
                MethodDescriptor::new("fetch")
                    .get()
                    .path("/items/{id}")
                    .path_param("id"),
            );
            assert!(verify(&descriptor).is_ok());
        }

        #[test]
        fn class_prefix_variables_count() {
            let descriptor = EndpointDescriptor::new("TenantService")
                .path("/tenants/{tenant}")
                .method(
                    MethodDescriptor::new("fetch")
                        .get()
                        .path("/items/{id}")
                        .path_param("tenant")
                        .path_param("id"),
                );
            assert!(verify(&descriptor).is_ok());
        }

        #[test]
        fn unbound_variable_is_rejected() {
            let descriptor = endpoint().method(MethodDescriptor::new("fetch").get().path("/items/{id}"));
            assert_eq!(
                verify(&descriptor),
                Err(DefinitionError::PathVariableMismatch {
                    interface: "ItemService".to_string(),
                    method: "fetch".to_string(),
                })
            );
        }

        #[test]
        fn misnamed_parameter_is_rejected() {
            let descriptor = endpoint().method(
                MethodDescriptor::new("fetch")
                    .get()
                    .path("/items/{id}")
                    .path_param("item_id"),
            );
            assert_eq!(
                verify(&descriptor),
                Err(DefinitionError::PathParamMismatch {
                    interface: "ItemService".to_string(),
                    method: "fetch".to_string(),
                })
            );
        }

        #[test]
        fn pattern_braces_do_not_add_variables() {
            let descriptor = endpoint().method(
                MethodDescriptor::new("fetch")
                    .get()
                    .path("/items/{id: [0-9]{4}}")
                    .path_param("id"),
            );
            assert!(verify(&descriptor).is_ok());
        }

        #[test]
        fn pathless_method_skips_the_variable_check() {
            let descriptor = EndpointDescriptor::new("TenantService")
                .path("/tenants/{tenant}")
                .method(MethodDescriptor::new("ping").get());
            assert!(verify(&descriptor).is_ok());
        }
    }
}
