//! Cross-reference resolution against a [`SymbolIndex`].
//!
//! For every reference site, each kind in its expected set is looked up
//! separately. An explicit version selects an exact syntactic match; a
//! version-less reference defers to the [`VersionPolicy`]. One surviving
//! kind resolves the site, several make it ambiguous, none leave it
//! unresolved. None of these outcomes is a syntax error.

use crate::ast::{CrossReference, Program, Resolution, Target};
use crate::error::{Diagnostic, DiagnosticKind, Severity};
use crate::index::{Symbol, SymbolIndex};
use std::cmp::Ordering;

/// Picks one symbol among same-kind, same-name candidates for a
/// version-less reference. Candidates arrive in declaration order and are
/// never empty.
pub trait VersionPolicy {
    fn name(&self) -> &'static str;
    fn select<'s>(&self, candidates: &[&'s Symbol]) -> Option<&'s Symbol>;
}

/// The most recently declared candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestDeclared;

impl VersionPolicy for LatestDeclared {
    fn name(&self) -> &'static str {
        "latest-declared"
    }

    fn select<'s>(&self, candidates: &[&'s Symbol]) -> Option<&'s Symbol> {
        candidates.last().copied()
    }
}

/// The greatest version by segment-wise comparison; unversioned candidates
/// rank lowest and ties go to the later declaration.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestVersion;

impl VersionPolicy for HighestVersion {
    fn name(&self) -> &'static str {
        "highest-version"
    }

    fn select<'s>(&self, candidates: &[&'s Symbol]) -> Option<&'s Symbol> {
        candidates.iter().copied().fold(None, |best, sym| match best {
            None => Some(sym),
            Some(cur) => {
                let ord = match (&sym.version, &cur.version) {
                    (Some(a), Some(b)) => a.cmp_segments(b),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                };
                if ord == Ordering::Less {
                    Some(cur)
                } else {
                    Some(sym)
                }
            }
        })
    }
}

/// Resolve one reference site.
pub fn resolve(
    index: &SymbolIndex,
    policy: &dyn VersionPolicy,
    reference: &CrossReference,
) -> Resolution {
    let mut found: Vec<Target> = Vec::new();
    for &kind in reference.expected {
        let candidates = index.lookup(kind, &reference.name);
        if candidates.is_empty() {
            continue;
        }
        let pick = match &reference.version {
            Some(wanted) => candidates
                .iter()
                .rev()
                .find(|s| s.version.as_ref() == Some(wanted))
                .copied(),
            None => policy.select(&candidates),
        };
        if let Some(sym) = pick {
            found.push(Target {
                kind: sym.kind,
                id: sym.id.clone(),
                version: sym.version.clone(),
            });
        }
    }
    match found.len() {
        0 => Resolution::Unresolved,
        1 => Resolution::Resolved(found.remove(0)),
        _ => Resolution::Ambiguous(found),
    }
}

/// Link every reference in `program`, replacing any earlier resolution.
/// Returns the link-time diagnostics, all below error severity.
pub fn link_program(
    program: &mut Program,
    file: &str,
    index: &SymbolIndex,
    policy: &dyn VersionPolicy,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    program.for_each_reference_mut(&mut |reference: &mut CrossReference| {
        let resolution = resolve(index, policy, reference);
        tracing::trace!(
            reference = %reference.display_name(),
            ?resolution,
            "resolved reference"
        );
        match &resolution {
            Resolution::Unresolved => {
                diagnostics.push(unresolved(index, file, reference));
            }
            Resolution::Ambiguous(targets) => {
                let kinds: Vec<_> = targets.iter().map(|t| t.kind.keyword()).collect();
                diagnostics.push(Diagnostic::new(
                    Severity::Warning,
                    DiagnosticKind::AmbiguousReference,
                    file,
                    reference.span,
                    format!(
                        "reference '{}' is ambiguous: it names a {}",
                        reference.display_name(),
                        kinds.join(" and a ")
                    ),
                ));
            }
            Resolution::Resolved(_) | Resolution::Pending => {}
        }
        reference.resolution = resolution;
    });
    diagnostics
}

fn unresolved(index: &SymbolIndex, file: &str, reference: &CrossReference) -> Diagnostic {
    let expected: Vec<_> = reference.expected.iter().map(|k| k.keyword()).collect();
    let other_versions = reference.version.is_some()
        && reference
            .expected
            .iter()
            .any(|&k| !index.lookup(k, &reference.name).is_empty());
    let message = if other_versions {
        format!(
            "no version {} of '{}' is declared",
            reference.version.as_ref().map(|v| v.as_str()).unwrap_or_default(),
            reference.name
        )
    } else {
        format!(
            "unknown reference '{}' (expected {})",
            reference.display_name(),
            expected.join(", ")
        )
    };
    Diagnostic::new(
        Severity::Warning,
        DiagnosticKind::UnresolvedReference,
        file,
        reference.span,
        message,
    )
}
