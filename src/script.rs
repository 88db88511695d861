//! Script records and their wire form.
//!
//! A `Script` is a user-authored rewrite rule: a delimited find pattern, a
//! replacement template, and applicability conditions (placement, markdown/
//! prompt mode, edit flag, depth bounds). Collections of scripts are plain
//! JSON arrays in camelCase, so `#[serde(default)]` keeps partially-filled
//! records deserializing tolerantly.

use serde::{Deserialize, Serialize};

/// Placeholder shown for scripts saved without a name.
pub const DEFAULT_SCRIPT_NAME: &str = "Unnamed script";

/// Context in which a script is permitted to run.
///
/// `SendAs` is a legacy display-only value kept for old saved collections;
/// the selector never matches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement {
    UserInput,
    AiOutput,
    SlashCommand,
    WorldInfo,
    Reasoning,
    SendAs,
}

impl Placement {
    /// Whether the engine is allowed to match against this placement.
    pub fn is_matchable(self) -> bool {
        !matches!(self, Placement::SendAs)
    }
}

/// How macro substitution is applied to `find_regex` before compiling it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubstituteMode {
    /// Use the pattern source verbatim.
    #[default]
    None,
    /// Expand macros into the pattern source as-is.
    Raw,
    /// Expand macros with every regex metacharacter in the substituted
    /// values escaped so they match literally.
    Escaped,
    /// Unrecognized wire value. Logged and treated as `None` at use time.
    #[serde(other)]
    Unknown,
}

/// A user-authored rewrite rule.
///
/// Immutable for the duration of one pipeline invocation. Field semantics
/// follow the saved-collection format:
/// - `find_regex` holds a delimited `/body/flags` pattern source.
/// - `replace_string` may contain literal text, the `{{match}}` marker
///   (case-insensitive), and `$0..$N` capture references.
/// - `trim_strings` are exact literals removed from every referenced
///   capture before it is interpolated.
/// - `min_depth`/`max_depth` only take effect inside their valid sign
///   ranges (`min_depth >= -1`, `max_depth >= 0`); anything else is inert.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Script {
    /// Display identifier. Not unique; `display_name` falls back to a
    /// placeholder when absent.
    #[serde(rename = "scriptName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Disabled scripts never match, never list, never contribute.
    pub disabled: bool,
    /// Delimited pattern source (`/body/flags`).
    pub find_regex: String,
    /// Replacement template.
    pub replace_string: String,
    /// Literal substrings stripped from matched fragments, in list order.
    pub trim_strings: Vec<String>,
    /// Contexts this script is allowed to run in.
    pub placement: Vec<Placement>,
    pub markdown_only: bool,
    pub prompt_only: bool,
    /// If false the script is skipped whenever the call is an edit.
    pub run_on_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_depth: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<i64>,
    pub substitute_regex: SubstituteMode,
}

impl Script {
    /// Create a script with just a pattern and replacement; everything else
    /// takes its default (enabled, no placements, no trims).
    pub fn new(find_regex: String, replace_string: String) -> Self {
        Self {
            find_regex,
            replace_string,
            ..Self::default()
        }
    }

    /// The script's name, or the placeholder for unnamed scripts.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_SCRIPT_NAME)
    }
}

/// Names of all non-disabled scripts, in collection order.
///
/// Unnamed scripts appear under the placeholder name.
pub fn active_script_names(scripts: &[Script]) -> Vec<String> {
    scripts
        .iter()
        .filter(|script| !script.disabled)
        .map(|script| script.display_name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let script = Script::new("/a/".to_string(), "b".to_string());
        assert_eq!(script.display_name(), DEFAULT_SCRIPT_NAME);

        let named = Script {
            name: Some("Strip quotes".to_string()),
            ..Script::default()
        };
        assert_eq!(named.display_name(), "Strip quotes");
    }

    #[test]
    fn test_active_script_names_skips_disabled() {
        let scripts = vec![
            Script {
                name: Some("first".to_string()),
                ..Script::default()
            },
            Script {
                name: Some("second".to_string()),
                disabled: true,
                ..Script::default()
            },
            Script::default(),
        ];

        assert_eq!(
            active_script_names(&scripts),
            vec!["first".to_string(), DEFAULT_SCRIPT_NAME.to_string()]
        );
    }

    #[test]
    fn test_active_script_names_preserves_order() {
        let scripts: Vec<Script> = (0..4)
            .map(|i| Script {
                name: Some(format!("s{}", i)),
                ..Script::default()
            })
            .collect();

        assert_eq!(active_script_names(&scripts), vec!["s0", "s1", "s2", "s3"]);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "scriptName": "de-smilify",
            "findRegex": "/:\\)/g",
            "replaceString": "",
            "trimStrings": ["  "],
            "placement": ["aiOutput", "userInput"],
            "markdownOnly": true,
            "runOnEdit": true,
            "minDepth": 0,
            "maxDepth": 3,
            "substituteRegex": "escaped"
        }"#;

        let script: Script = serde_json::from_str(json).unwrap();
        assert_eq!(script.display_name(), "de-smilify");
        assert_eq!(script.find_regex, "/:\\)/g");
        assert_eq!(script.trim_strings, vec!["  ".to_string()]);
        assert_eq!(
            script.placement,
            vec![Placement::AiOutput, Placement::UserInput]
        );
        assert!(script.markdown_only);
        assert!(!script.prompt_only);
        assert!(script.run_on_edit);
        assert_eq!(script.min_depth, Some(0));
        assert_eq!(script.max_depth, Some(3));
        assert_eq!(script.substitute_regex, SubstituteMode::Escaped);
        assert!(!script.disabled);
    }

    #[test]
    fn test_deserialize_defaults() {
        let script: Script = serde_json::from_str("{}").unwrap();
        assert_eq!(script, Script::default());
        assert_eq!(script.substitute_regex, SubstituteMode::None);
    }

    #[test]
    fn test_deserialize_unknown_substitute_mode() {
        let script: Script =
            serde_json::from_str(r#"{"substituteRegex": "macroMagic"}"#).unwrap();
        assert_eq!(script.substitute_regex, SubstituteMode::Unknown);
    }

    #[test]
    fn test_serialize_round_trip() {
        let script = Script {
            name: Some("quotes".to_string()),
            find_regex: "/\"([^\"]*)\"/g".to_string(),
            replace_string: "$1".to_string(),
            placement: vec![Placement::SlashCommand],
            ..Script::default()
        };

        let json = serde_json::to_string(&script).unwrap();
        assert!(json.contains("\"scriptName\":\"quotes\""));
        assert!(json.contains("\"slashCommand\""));

        let back: Script = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script);
    }

    #[test]
    fn test_send_as_not_matchable() {
        assert!(!Placement::SendAs.is_matchable());
        assert!(Placement::UserInput.is_matchable());
        assert!(Placement::Reasoning.is_matchable());
    }
}
