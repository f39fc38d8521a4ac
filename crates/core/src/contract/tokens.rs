use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\s*\}\}")
            .expect("token pattern is a valid literal regex")
    })
}

/// Generic `{{token}}` substitution over a JSON context bundle. Total by
/// contract: unknown tokens render as a bracketed label, never an error.
pub trait TokenReplacer: Send + Sync {
    fn replace_tokens(&self, html: &str, context: &Value) -> String;
}

/// Default replacer: resolves dotted paths (`{{client.name}}`) against the
/// context object. Scalars render directly; missing paths and non-scalar
/// values fall back to `[path]`.
#[derive(Clone, Debug, Default)]
pub struct ContextTokenReplacer;

impl TokenReplacer for ContextTokenReplacer {
    fn replace_tokens(&self, html: &str, context: &Value) -> String {
        token_pattern()
            .replace_all(html, |caps: &regex::Captures<'_>| {
                let path = &caps[1];
                match lookup(context, path) {
                    Some(Value::String(text)) => text.clone(),
                    Some(Value::Number(number)) => number.to_string(),
                    Some(Value::Bool(flag)) => flag.to_string(),
                    _ => format!("[{path}]"),
                }
            })
            .into_owned()
    }
}

fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = context;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}
