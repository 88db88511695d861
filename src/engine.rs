//! The rewrite engine: per-script match/replace and the pipeline driver.
//!
//! Scripts run strictly in collection order and each eligible script's
//! replacement completes over the whole string before the next script
//! sees it, so later scripts observe earlier scripts' output. The engine
//! is stateless: every invocation is a pure function of the script
//! collection, the input text, and the call context.
//!
//! Replacement templates support the case-insensitive `{{match}}` marker
//! and `$0..$N` capture references. Overlay or merge strategies beyond
//! straight substitution are not supported.

use std::sync::OnceLock;

use regex::{Captures, NoExpand, Regex};
use tracing::{debug, trace, warn};

use crate::error::ResultExt;
use crate::macros::{escape_regex_value, MacroExpander};
use crate::pattern::{parse_find_pattern, ParsedPattern};
use crate::script::{Placement, Script, SubstituteMode};
use crate::selector::{is_eligible, EvalContext};

/// `{{match}}` marker in replacement templates, matched case-insensitively.
fn match_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?i)\{\{match\}\}").expect("literal marker pattern"))
}

/// `$<digits>` capture references in replacement templates.
fn group_ref() -> &'static Regex {
    static GROUP_REF: OnceLock<Regex> = OnceLock::new();
    GROUP_REF.get_or_init(|| Regex::new(r"\$(\d+)").expect("literal group-ref pattern"))
}

/// Strip every trim entry out of a matched fragment.
///
/// Each entry is macro-expanded first (the character override applies),
/// then removed as an exact literal, all occurrences, in list order -
/// later entries see the result of earlier removals.
pub fn filter_fragment(
    fragment: &str,
    trim_strings: &[String],
    macros: &dyn MacroExpander,
    character_override: Option<&str>,
) -> String {
    let mut result = fragment.to_string();
    for entry in trim_strings {
        let literal = macros.expand(entry, character_override);
        if literal.is_empty() {
            continue;
        }
        result = result.replace(&literal, "");
    }
    result
}

/// Assemble the replacement text for one match.
fn build_replacement(
    script: &Script,
    caps: &Captures<'_>,
    macros: &dyn MacroExpander,
    character_override: Option<&str>,
) -> String {
    // {{match}} is sugar for the full-match reference.
    let template = match_marker().replace_all(&script.replace_string, NoExpand("$0"));

    let expanded = group_ref().replace_all(&template, |refs: &Captures<'_>| {
        let group = refs
            .get(1)
            .and_then(|digits| digits.as_str().parse::<usize>().ok())
            .and_then(|index| caps.get(index));
        match group {
            Some(text) => {
                filter_fragment(text.as_str(), &script.trim_strings, macros, character_override)
            }
            // Missing or unmatched groups are defined as empty.
            None => String::new(),
        }
    });

    macros.expand(&expanded, character_override)
}

/// Splice replacements into `text` for every match (global) or only the
/// first (non-global).
fn replace_matches(
    parsed: &ParsedPattern,
    script: &Script,
    text: &str,
    macros: &dyn MacroExpander,
    character_override: Option<&str>,
) -> String {
    if parsed.global {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for caps in parsed.regex.captures_iter(text) {
            let Some(full) = caps.get(0) else { continue };
            result.push_str(&text[last..full.start()]);
            result.push_str(&build_replacement(script, &caps, macros, character_override));
            last = full.end();
        }
        result.push_str(&text[last..]);
        result
    } else {
        let Some(caps) = parsed.regex.captures(text) else {
            return text.to_string();
        };
        let Some(full) = caps.get(0) else {
            return text.to_string();
        };
        let mut result = String::with_capacity(text.len());
        result.push_str(&text[..full.start()]);
        result.push_str(&build_replacement(script, &caps, macros, character_override));
        result.push_str(&text[full.end()..]);
        result
    }
}

/// Apply one script to `text`, returning the rewritten string.
///
/// Disabled scripts, scripts with no pattern, and empty input all pass the
/// text through unchanged. So does any script whose pattern source fails
/// to parse or compile: scripts are user-authored and a bad one must
/// degrade to a no-op, never an error.
pub fn apply_script(
    script: &Script,
    text: &str,
    macros: &dyn MacroExpander,
    character_override: Option<&str>,
) -> String {
    if script.disabled || script.find_regex.is_empty() || text.is_empty() {
        return text.to_string();
    }

    let pattern_source = match script.substitute_regex {
        SubstituteMode::None => script.find_regex.clone(),
        SubstituteMode::Raw => macros.expand_pattern(&script.find_regex, None),
        SubstituteMode::Escaped => {
            macros.expand_pattern(&script.find_regex, Some(escape_regex_value))
        }
        SubstituteMode::Unknown => {
            warn!(
                script = script.display_name(),
                "Unknown substitution mode, using pattern source verbatim"
            );
            script.find_regex.clone()
        }
    };

    let Some(parsed) = parse_find_pattern(&pattern_source).warn_on_err() else {
        debug!(
            script = script.display_name(),
            "Find pattern unusable, script skipped"
        );
        return text.to_string();
    };

    replace_matches(&parsed, script, text, macros, character_override)
}

/// Per-invocation options for the pipeline driver.
#[derive(Clone, Debug, Default)]
pub struct RewriteOptions {
    /// Resolve `{{char}}`-style macros against this name instead of the
    /// current character.
    pub character_override: Option<String>,
    pub is_markdown: bool,
    pub is_prompt: bool,
    pub is_edit: bool,
    pub depth: Option<i64>,
}

/// The full rewrite pipeline: an ordered script collection, an optional
/// scoped collection appended after it, a kill switch, and the host's
/// macro expander.
///
/// Holds only borrows; build one per invocation or keep it around, either
/// way each `run` is independent and reentrant.
pub struct RewritePipeline<'a> {
    scripts: &'a [Script],
    scoped_scripts: &'a [Script],
    disabled: bool,
    macros: &'a dyn MacroExpander,
}

impl<'a> RewritePipeline<'a> {
    pub fn new(scripts: &'a [Script], macros: &'a dyn MacroExpander) -> Self {
        Self {
            scripts,
            scoped_scripts: &[],
            disabled: false,
            macros,
        }
    }

    /// Context-scoped scripts, run after the global collection.
    pub fn with_scoped_scripts(mut self, scoped_scripts: &'a [Script]) -> Self {
        self.scoped_scripts = scoped_scripts;
        self
    }

    /// Subsystem kill switch; when set, `run` passes text through untouched.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Run every eligible script over `raw`, in order, threading the text
    /// through each one.
    ///
    /// Passes the text through unchanged when the subsystem is disabled,
    /// the text is empty, or no placement was supplied.
    pub fn run(&self, raw: &str, placement: Option<Placement>, opts: &RewriteOptions) -> String {
        if self.disabled || raw.is_empty() {
            return raw.to_string();
        }
        let Some(placement) = placement else {
            trace!("No placement supplied, passing text through");
            return raw.to_string();
        };

        let ctx = EvalContext {
            placement,
            is_markdown: opts.is_markdown,
            is_prompt: opts.is_prompt,
            is_edit: opts.is_edit,
            depth: opts.depth,
        };
        let character_override = opts.character_override.as_deref();

        let mut result = raw.to_string();
        for script in self.scripts.iter().chain(self.scoped_scripts) {
            if script.disabled || !is_eligible(script, &ctx) {
                continue;
            }
            trace!(
                script = script.display_name(),
                placement = ?placement,
                "Applying script"
            );
            result = apply_script(script, &result, self.macros, character_override);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::NoopExpander;

    fn script(find: &str, replace: &str) -> Script {
        Script::new(find.to_string(), replace.to_string())
    }

    #[test]
    fn test_apply_simple_replacement() {
        let s = script("/world/", "there");
        let out = apply_script(&s, "hello world world", &NoopExpander, None);
        // Non-global: first match only.
        assert_eq!(out, "hello there world");
    }

    #[test]
    fn test_apply_global_replacement() {
        let s = script("/o/g", "0");
        let out = apply_script(&s, "foo bot", &NoopExpander, None);
        assert_eq!(out, "f00 b0t");
    }

    #[test]
    fn test_apply_group_references() {
        let s = script(r"/(\w+)@(\w+)/", "user=$1 host=$2 all={{match}}");
        let out = apply_script(&s, "alice@example", &NoopExpander, None);
        assert_eq!(out, "user=alice host=example all=alice@example");
    }

    #[test]
    fn test_match_marker_case_insensitive() {
        let s = script("/abc/", "[{{MATCH}}]");
        let out = apply_script(&s, "abc", &NoopExpander, None);
        assert_eq!(out, "[abc]");
    }

    #[test]
    fn test_missing_group_expands_empty() {
        let s = script("/(a)(b)?/", "1=$1 2=$2 9=$9");
        let out = apply_script(&s, "a", &NoopExpander, None);
        assert_eq!(out, "1=a 2= 9=");
    }

    #[test]
    fn test_trim_applied_to_groups() {
        let s = Script {
            trim_strings: vec!["  ".to_string()],
            ..script("/\\[(.*)\\]/", "$1")
        };
        let out = apply_script(&s, "[  secret  ]", &NoopExpander, None);
        assert_eq!(out, "secret");
    }

    #[test]
    fn test_disabled_script_is_noop() {
        let s = Script {
            disabled: true,
            ..script("/a/g", "b")
        };
        assert_eq!(apply_script(&s, "aaa", &NoopExpander, None), "aaa");
    }

    #[test]
    fn test_empty_pattern_is_noop() {
        let s = script("", "b");
        assert_eq!(apply_script(&s, "aaa", &NoopExpander, None), "aaa");
    }

    #[test]
    fn test_malformed_pattern_is_noop() {
        let s = script("/(unclosed/", "b");
        assert_eq!(apply_script(&s, "aaa", &NoopExpander, None), "aaa");
    }

    #[test]
    fn test_empty_text_is_noop() {
        let s = script("/a/", "b");
        assert_eq!(apply_script(&s, "", &NoopExpander, None), "");
    }

    #[test]
    fn test_no_match_leaves_text() {
        let s = script("/xyz/", "b");
        assert_eq!(apply_script(&s, "hello", &NoopExpander, None), "hello");
    }

    #[test]
    fn test_unknown_mode_falls_back_to_verbatim() {
        let s = Script {
            substitute_regex: SubstituteMode::Unknown,
            ..script("/a/g", "b")
        };
        assert_eq!(apply_script(&s, "aa", &NoopExpander, None), "bb");
    }

    #[test]
    fn test_filter_fragment_order_matters() {
        // "abab" removed first leaves nothing for "ab" in that span.
        let out = filter_fragment(
            "xababx",
            &["abab".to_string(), "x".to_string()],
            &NoopExpander,
            None,
        );
        assert_eq!(out, "");
    }

    #[test]
    fn test_filter_fragment_empty_entry_skipped() {
        let out = filter_fragment("keep", &[String::new()], &NoopExpander, None);
        assert_eq!(out, "keep");
    }

    #[test]
    fn test_case_insensitive_flag_respected() {
        let s = script("/hello/gi", "hi");
        let out = apply_script(&s, "Hello HELLO", &NoopExpander, None);
        assert_eq!(out, "hi hi");
    }

    #[test]
    fn test_adjacent_matches_global() {
        let s = script("/ab/g", "-");
        assert_eq!(apply_script(&s, "ababab", &NoopExpander, None), "---");
    }
}
