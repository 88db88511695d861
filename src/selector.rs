//! Script eligibility.
//!
//! A pure predicate over one script and the call context. Skip reasons are
//! traced at debug level for operators chasing "why didn't my script run";
//! the traces carry no behavior.

use tracing::debug;

use crate::script::{Placement, Script};

/// The context one pipeline invocation runs under.
#[derive(Clone, Copy, Debug)]
pub struct EvalContext {
    pub placement: Placement,
    pub is_markdown: bool,
    pub is_prompt: bool,
    pub is_edit: bool,
    /// Conversation depth, when the caller scopes by depth at all.
    pub depth: Option<i64>,
}

/// Whether `script` may run under `ctx`. All gates must hold.
pub fn is_eligible(script: &Script, ctx: &EvalContext) -> bool {
    // Mode gate: exactly one of three mutually exclusive shapes may match.
    // A script flagged both markdown-only and prompt-only satisfies none
    // of them and is never eligible.
    let mode_ok = match (script.markdown_only, script.prompt_only) {
        (true, true) => false,
        (true, false) => ctx.is_markdown,
        (false, true) => ctx.is_prompt,
        (false, false) => !ctx.is_markdown && !ctx.is_prompt,
    };
    if !mode_ok {
        debug!(
            script = script.display_name(),
            markdown_only = script.markdown_only,
            prompt_only = script.prompt_only,
            is_markdown = ctx.is_markdown,
            is_prompt = ctx.is_prompt,
            "Skipping script: markdown/prompt mode mismatch"
        );
        return false;
    }

    if ctx.is_edit && !script.run_on_edit {
        debug!(
            script = script.display_name(),
            "Skipping script: does not run on edit"
        );
        return false;
    }

    if let Some(depth) = ctx.depth {
        // A bound outside its valid sign range is inert, as if unset.
        if let Some(min_depth) = script.min_depth {
            if min_depth >= -1 && depth < min_depth {
                debug!(
                    script = script.display_name(),
                    depth, min_depth, "Skipping script: below min depth"
                );
                return false;
            }
        }
        if let Some(max_depth) = script.max_depth {
            if max_depth >= 0 && depth > max_depth {
                debug!(
                    script = script.display_name(),
                    depth, max_depth, "Skipping script: above max depth"
                );
                return false;
            }
        }
    }

    let placement_ok = script
        .placement
        .iter()
        .any(|p| p.is_matchable() && *p == ctx.placement);
    if !placement_ok {
        debug!(
            script = script.display_name(),
            placement = ?ctx.placement,
            "Skipping script: placement not listed"
        );
        return false;
    }

    true
}
