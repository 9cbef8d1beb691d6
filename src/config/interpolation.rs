//! Configuration references in step parameters.
//!
//! Parameter values may reference configuration keys using `${dotted.key}`.
//!
//! # Syntax
//!
//! - `${cluster.name}` - replaced with the value at that key
//! - `$${literal}` - produces literal `${literal}` in output
//!
//! A reference to a missing key resolves to an empty string. The caller is
//! told which references were missing so it can log them, but the argument
//! is still passed so the collaborator's interface stays stable.
//!
//! # Example
//!
//! ```
//! use clusterup::config::resolve_template;
//!
//! let resolved = resolve_template("aks-${env}", |key| {
//!     (key == "env").then(|| "dev".to_string())
//! });
//! assert_eq!(resolved.value, "aks-dev");
//! assert!(resolved.missing.is_empty());
//! ```

/// A segment of a parameter template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Configuration reference: ${key}
    Reference(String),
}

/// Parse a template containing `${key}` references.
pub fn parse_template(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                literal.push('$');
                if chars.peek() == Some(&'{') {
                    // $${...} stays literal up to the closing brace
                    for c in chars.by_ref() {
                        literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                }
            }
            Some('{') => {
                chars.next();
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let key: String = chars.by_ref().take_while(|c| *c != '}').collect();
                segments.push(Segment::Reference(key.trim().to_string()));
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// All keys referenced by a template, in order of appearance.
pub fn extract_references(input: &str) -> Vec<String> {
    parse_template(input)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Reference(key) => Some(key),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Result of resolving a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// The substituted value.
    pub value: String,
    /// References that had no value and were replaced with "".
    pub missing: Vec<String>,
}

/// Resolve every reference in a template using `lookup`.
pub fn resolve_template<F>(input: &str, lookup: F) -> ResolvedTemplate
where
    F: Fn(&str) -> Option<String>,
{
    let mut value = String::new();
    let mut missing = Vec::new();

    for segment in parse_template(input) {
        match segment {
            Segment::Literal(text) => value.push_str(&text),
            Segment::Reference(key) => match lookup(&key) {
                Some(v) => value.push_str(&v),
                None => missing.push(key),
            },
        }
    }

    ResolvedTemplate { value, missing }
}
