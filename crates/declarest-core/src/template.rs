//! URI template parsing and substitution
//!
//! Templates declare variables as `{name}` or `{name: pattern}`. The pattern
//! portion after the colon constrains the value on the server side and is
//! ignored here, except that its braces must stay balanced: `{id: [0-9]{4}}`
//! declares exactly one variable, `id`. Only braces at depth 1 delimit
//! variables; everything nested deeper is opaque pattern content.

use crate::error::DefinitionError;
use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use std::collections::HashMap;

const URI_PARAM_NAME_REGEX: &str = r"\w[\w\.-]*";
const URI_PARAM_PATTERN_REGEX: &str = r"[^{}][^{}]*";

/// Sentinels used to mask braces nested inside a pattern while the variable
/// regex runs. Both are control characters that cannot appear in a URI.
const OPEN_BRACE_SENTINEL: char = '\u{6}';
const CLOSE_BRACE_SENTINEL: char = '\u{7}';

/// Characters escaped when a variable value is substituted into a path
/// segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'%')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

lazy_static! {
    static ref URI_PARAM: Regex = Regex::new(&format!(
        r"\{{\s*({URI_PARAM_NAME_REGEX})\s*(:\s*({URI_PARAM_PATTERN_REGEX}))?\}}"
    ))
    .unwrap();
}

/// Extract the variable names declared in a template, in order of first
/// occurrence
///
/// A name may appear more than once; duplicates are returned as-is. Callers
/// that need set semantics collect the result themselves.
///
/// # Examples
///
/// ```rust
/// use declarest_core::template::extract_variables;
///
/// assert_eq!(extract_variables("/items/{id}/tags/{tag}"), vec!["id", "tag"]);
/// assert_eq!(extract_variables("/items/{id: [0-9]{4}}"), vec!["id"]);
/// ```
pub fn extract_variables(template: &str) -> Vec<String> {
    let masked = mask_nested_braces(template);
    URI_PARAM
        .captures_iter(&masked)
        .map(|captures| captures[1].to_string())
        .collect()
}

/// Substitute every `{name...}` occurrence with the string form of its bound
/// value, percent-encoded as a path segment
///
/// # Errors
///
/// Returns [`DefinitionError::UnresolvedVariable`] when the template declares
/// a variable with no bound value. The interface verifier guarantees this
/// never happens for a verified descriptor, so hitting it at call time means
/// the descriptor was never verified.
pub fn substitute(
    template: &str,
    values: &HashMap<String, String>,
) -> Result<String, DefinitionError> {
    let masked = mask_nested_braces(template);

    let mut result = String::with_capacity(template.len());
    let mut last_end = 0;
    for captures in URI_PARAM.captures_iter(&masked) {
        let whole = captures.get(0).expect("capture group 0 always present");
        let name = &captures[1];

        let value = values
            .get(name)
            .ok_or_else(|| DefinitionError::UnresolvedVariable {
                name: name.to_string(),
                template: template.to_string(),
            })?;

        // The mask is length-preserving, so match offsets index into the
        // original template as well.
        result.push_str(&template[last_end..whole.start()]);
        result.extend(utf8_percent_encode(value, PATH_SEGMENT));
        last_end = whole.end();
    }
    result.push_str(&template[last_end..]);

    Ok(result)
}

/// Replace braces nested deeper than depth 1 with sentinel characters so the
/// variable regex only sees the outermost `{...}` pairs
fn mask_nested_braces(template: &str) -> String {
    let mut open = 0usize;
    template
        .chars()
        .map(|c| match c {
            '{' => {
                let masked = if open != 0 { OPEN_BRACE_SENTINEL } else { c };
                open += 1;
                masked
            }
            '}' => {
                open = open.saturating_sub(1);
                if open != 0 {
                    CLOSE_BRACE_SENTINEL
                } else {
                    c
                }
            }
            _ => c,
        })
        .collect()
}
