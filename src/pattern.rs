//! Parsing of user-authored `/body/flags` pattern strings.
//!
//! The delimited form is parsed by one pure function so it can be tested
//! independently of the replace logic. Flags map onto `RegexBuilder`
//! options; `g` is not a builder option and is surfaced on the parsed
//! result so the replacer knows whether to replace all matches or only
//! the first.

use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

/// Flags accepted after the closing delimiter.
///
/// `i`, `m`, `s`, and `x` map to builder options, `g` selects replace-all,
/// and `u` is accepted as a no-op (patterns are always Unicode here).
const VALID_FLAGS: &[char] = &['g', 'i', 'm', 's', 'u', 'x'];

/// A compiled find pattern plus its replace semantics.
#[derive(Clone, Debug)]
pub struct ParsedPattern {
    pub regex: Regex,
    /// True when the `g` flag was present: replace every match instead of
    /// only the first.
    pub global: bool,
}

/// Parse a delimited pattern source into an executable pattern.
///
/// The source must start with `/`; the last `/` in the string closes the
/// body and anything after it is flags. A `\/` inside the body stays part
/// of the body because the closing delimiter is found from the right.
///
/// Any malformed input is a typed error, never a panic - callers treat a
/// failed parse as "this script does nothing".
pub fn parse_find_pattern(source: &str) -> Result<ParsedPattern, PatternError> {
    let rest = source
        .strip_prefix('/')
        .ok_or_else(|| PatternError::Malformed(source.to_string()))?;
    let close = rest
        .rfind('/')
        .ok_or_else(|| PatternError::Malformed(source.to_string()))?;

    let body = &rest[..close];
    let flags = &rest[close + 1..];
    if body.is_empty() {
        return Err(PatternError::EmptyPattern);
    }

    let mut builder = RegexBuilder::new(body);
    let mut global = false;
    let mut seen = String::new();
    for flag in flags.chars() {
        if seen.contains(flag) || !VALID_FLAGS.contains(&flag) {
            return Err(PatternError::InvalidFlags(flags.to_string()));
        }
        seen.push(flag);
        match flag {
            'g' => global = true,
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            // Unicode mode is always on.
            'u' => {}
            _ => unreachable!("flag validated against VALID_FLAGS"),
        }
    }

    let regex = builder.build()?;
    Ok(ParsedPattern { regex, global })
}
