//! regex-kit - rule-based text rewriting with user-authored regex scripts.
//!
//! An ordered collection of scripts is applied, in order, to input text.
//! Each script carries a delimited find pattern (`/body/flags`), a
//! replacement template (`{{match}}` marker plus `$0..$N` capture
//! references), applicability conditions (placement, markdown/prompt mode,
//! edit flag, depth bounds), and per-script post-processing (literal trim
//! strings, macro substitution).
//!
//! Scripts are user data: a malformed pattern degrades to "this script
//! does nothing", never an error. The pipeline is synchronous, stateless,
//! and reentrant.
//!
//! # Example
//!
//! ```
//! use regex_kit::{NoopExpander, Placement, RewriteOptions, RewritePipeline, Script};
//!
//! let scripts = vec![Script {
//!     placement: vec![Placement::AiOutput],
//!     ..Script::new("/~(.+?)~/g".to_string(), "*$1*".to_string())
//! }];
//!
//! let pipeline = RewritePipeline::new(&scripts, &NoopExpander);
//! let out = pipeline.run(
//!     "~hello~ world",
//!     Some(Placement::AiOutput),
//!     &RewriteOptions::default(),
//! );
//! assert_eq!(out, "*hello* world");
//! ```

pub mod engine;
pub mod error;
pub mod logging;
pub mod macros;
pub mod pattern;
pub mod script;
pub mod selector;


pub use engine::{apply_script, filter_fragment, RewriteOptions, RewritePipeline};
pub use error::{PatternError, ResultExt};
pub use macros::{escape_regex_value, EscapeFn, MacroExpander, MapExpander, NoopExpander};
pub use pattern::{parse_find_pattern, ParsedPattern};
pub use script::{active_script_names, Placement, Script, SubstituteMode, DEFAULT_SCRIPT_NAME};
pub use selector::{is_eligible, EvalContext};
