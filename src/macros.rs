//! Macro substitution seam.
//!
//! The host application owns macro expansion ({{user}}, {{char}}, dates,
//! whatever its template language supports); the engine only needs two
//! capabilities: a general expansion pass for replacement text and trim
//! entries, and a pattern-source expansion pass that can escape each
//! substituted value so it matches literally inside a compiled pattern.
//!
//! `MapExpander` is a self-contained implementation for hosts (and tests)
//! whose macro language is plain `{{key}}` lookup; richer hosts implement
//! the trait over their own substitution engine.

use std::collections::BTreeMap;

/// Escaping applied to substituted values before they land in regex source.
pub type EscapeFn = fn(&str) -> String;

/// Caller-supplied macro substitution.
pub trait MacroExpander {
    /// Expand macros in template text. `character_override` names the
    /// active character/persona when the caller wants `{{char}}`-style
    /// macros resolved against someone other than the current one.
    fn expand(&self, text: &str, character_override: Option<&str>) -> String;

    /// Expand macros in regex source text, passing each substituted value
    /// through `escape` when one is supplied. No character override here:
    /// pattern substitution always resolves against the current context.
    fn expand_pattern(&self, text: &str, escape: Option<EscapeFn>) -> String;
}

/// Identity expander for hosts without a macro system.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopExpander;

impl MacroExpander for NoopExpander {
    fn expand(&self, text: &str, _character_override: Option<&str>) -> String {
        text.to_string()
    }

    fn expand_pattern(&self, text: &str, _escape: Option<EscapeFn>) -> String {
        text.to_string()
    }
}

/// `{{key}}` lookup against a value map.
///
/// The `char` key is special: a character override supplied at expansion
/// time wins over the map entry.
///
/// Expansion is a single pass over the keys in lexicographic order, so a
/// value that itself contains a placeholder only gets expanded when the
/// placeholder's key sorts after the one that produced it. Hosts needing
/// recursive macro languages implement `MacroExpander` themselves.
#[derive(Clone, Debug, Default)]
pub struct MapExpander {
    values: BTreeMap<String, String>,
}

impl MapExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, key: String, value: String) {
        self.values.insert(key, value);
    }
}

impl MacroExpander for MapExpander {
    fn expand(&self, text: &str, character_override: Option<&str>) -> String {
        let mut result = text.to_string();
        // Override first so a `char` map entry cannot shadow it.
        if let Some(name) = character_override {
            result = result.replace("{{char}}", name);
        }
        for (key, value) in &self.values {
            let placeholder = format!("{{{{{}}}}}", key);
            result = result.replace(&placeholder, value);
        }
        result
    }

    fn expand_pattern(&self, text: &str, escape: Option<EscapeFn>) -> String {
        let mut result = text.to_string();
        for (key, value) in &self.values {
            let placeholder = format!("{{{{{}}}}}", key);
            if !result.contains(&placeholder) {
                continue;
            }
            let substituted = match escape {
                Some(escape) => escape(value),
                None => value.clone(),
            };
            result = result.replace(&placeholder, &substituted);
        }
        result
    }
}

/// Escape a substituted value so a compiled pattern treats it literally.
///
/// Control characters are rendered as the escape sequences the `regex`
/// crate understands (`\n`, `\r`, `\t`, `\x0B`, `\x0C`, `\x00`); pattern
/// metacharacters get a leading backslash.
pub fn escape_regex_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0B' => out.push_str("\\x0B"),
            '\x0C' => out.push_str("\\x0C"),
            '\0' => out.push_str("\\x00"),
            '.' | '^' | '$' | '*' | '+' | '?' | '{' | '}' | '[' | ']' | '\\' | '/' | '|'
            | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}
