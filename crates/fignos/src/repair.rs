//! Recovers references that pandoc mistook for email addresses.
//!
//! `text@fig:a` reads as an address, so pandoc emits a `mailto:` link where
//! a citation was meant.

use std::sync::LazyLock;

use fignos_ast::{Citation, Inline, ListPosition, stringify};
use regex::Regex;

use crate::context::RunContext;
use crate::error::FilterError;
use crate::stage::Stage;

static SWALLOWED_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(.*?)@(fig:[\w/-]+)(.*)$").expect("invalid reference regex")
});

#[derive(Debug, Default)]
pub(crate) struct RepairReferences;

impl Stage for RepairReferences {
    fn name(&self) -> &'static str {
        "repair-references"
    }

    fn inlines(
        &mut self,
        inlines: &mut Vec<Inline>,
        _position: ListPosition,
        _ctx: &mut RunContext,
    ) -> Result<(), FilterError> {
        let mut index = 0;
        while index < inlines.len() {
            match repair_at(inlines, index) {
                Some(inserted) => index += inserted,
                None => index += 1,
            }
        }
        Ok(())
    }
}

/// Rebuild a swallowed reference at `index`, returning how many inlines
/// replaced it.
fn repair_at(inlines: &mut Vec<Inline>, index: usize) -> Option<usize> {
    let Inline::Link(_, text, target) = &inlines[index] else {
        return None;
    };
    if !target.url.starts_with("mailto:") {
        return None;
    }

    let mut flat = stringify(text);
    let following = match inlines.get(index + 1) {
        Some(Inline::Str(s)) => {
            flat.push_str(s);
            true
        }
        _ => false,
    };

    let captures = SWALLOWED_REFERENCE.captures(&flat)?;
    let (prefix, label, suffix) = (&captures[1], &captures[2], &captures[3]);

    let mut replacement = Vec::with_capacity(3);
    if !prefix.is_empty() {
        replacement.push(Inline::str(prefix));
    }
    replacement.push(Inline::Cite(
        vec![Citation::author_in_text(label)],
        vec![Inline::str(format!("@{label}"))],
    ));
    if !suffix.is_empty() {
        replacement.push(Inline::str(suffix));
    }

    tracing::debug!(label, "Repaired reference swallowed by email link");
    let end = if following { index + 1 } else { index };
    let count = replacement.len();
    inlines.splice(index..=end, replacement);
    Some(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{OutputFormat, PandocVersion};
    use fignos_ast::{Attr, Target};
    use fignos_config::Config;
    use pretty_assertions::assert_eq;

    fn mailto(text: &str) -> Inline {
        Inline::Link(
            Attr::default(),
            vec![Inline::str(text)],
            Target::new(format!("mailto:{text}"), ""),
        )
    }

    fn cite(label: &str) -> Inline {
        Inline::Cite(
            vec![Citation::author_in_text(label)],
            vec![Inline::str(format!("@{label}"))],
        )
    }

    fn run(inlines: &mut Vec<Inline>) {
        let mut ctx = RunContext::new(
            Config::default(),
            OutputFormat::Html,
            PandocVersion::default(),
        );
        RepairReferences
            .inlines(inlines, ListPosition::Block, &mut ctx)
            .unwrap();
    }

    #[test]
    fn test_repairs_reference_with_prefix_and_suffix() {
        let mut inlines = vec![mailto("Fig.@fig:a"), Inline::str(").")];
        run(&mut inlines);
        assert_eq!(
            inlines,
            vec![Inline::str("Fig."), cite("fig:a"), Inline::str(").")]
        );
    }

    #[test]
    fn test_repairs_bare_reference() {
        let mut inlines = vec![Inline::str("see"), Inline::Space, mailto("x@fig:b")];
        run(&mut inlines);
        assert_eq!(
            inlines,
            vec![
                Inline::str("see"),
                Inline::Space,
                Inline::str("x"),
                cite("fig:b"),
            ]
        );
    }

    #[test]
    fn test_leaves_real_email() {
        let mut inlines = vec![mailto("me@example.com")];
        let before = inlines.clone();
        run(&mut inlines);
        assert_eq!(inlines, before);
    }
}
