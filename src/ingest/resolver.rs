//! Header resolution: which observed header, if any, feeds a canonical field.
//!
//! Matching is deterministic and tiered; the first tier that finds a header
//! wins:
//!
//! 1. exact equality with the field's canonical name,
//! 2. exact equality with one of the field's aliases,
//! 3. substring containment in either direction with the canonical name,
//! 4. a shared token (longer than two characters) with the canonical name.
//!
//! All comparisons ignore case and surrounding whitespace. Placeholder keys
//! such as `__EMPTY_3` or `Column 7` never take part.

use std::collections::HashSet;

use crate::models::CanonicalField;

use super::aliases::{AliasSet, normalize_label};

/// Contained side of a substring match must be at least this long.
const SUBSTRING_MIN_LEN: usize = 3;

/// The tier at which a header matched, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// Equal to the canonical name.
    CanonicalName,
    /// Equal to an alias.
    Alias,
    /// Contains, or is contained in, the canonical name.
    Substring,
    /// Shares a token with the canonical name.
    TokenOverlap,
}

/// A resolved header and the tier it matched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatch<'h> {
    /// The observed header, exactly as supplied.
    pub header: &'h str,
    /// The tier that matched.
    pub tier: MatchTier,
}

/// Returns true for auto-generated column keys that carry no header text.
///
/// # Example
///
/// ```
/// use payroll_ingest::ingest::is_placeholder_header;
///
/// assert!(is_placeholder_header("__EMPTY_2"));
/// assert!(is_placeholder_header("Column 4"));
/// assert!(is_placeholder_header("7"));
/// assert!(!is_placeholder_header("Gross Pay"));
/// ```
pub fn is_placeholder_header(header: &str) -> bool {
    let label = normalize_label(header);
    if label.is_empty() || label.starts_with("__empty") || label.starts_with("unnamed") {
        return true;
    }
    if label
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | ' '))
    {
        return true;
    }
    ["column", "col", "field"].iter().any(|prefix| {
        label.strip_prefix(prefix).is_some_and(|rest| {
            let digits = rest.trim_start_matches([' ', '_', '-']);
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        })
    })
}

/// Splits text into lowercase tokens longer than two characters.
fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// Resolves canonical fields against observed header strings.
///
/// # Example
///
/// ```
/// use payroll_ingest::ingest::{AliasSet, HeaderResolver};
/// use payroll_ingest::models::CanonicalField;
///
/// let aliases = AliasSet::builtin();
/// let resolver = HeaderResolver::new(&aliases);
/// let headers = ["Staff No", "Gross Pay", "__EMPTY"];
///
/// assert_eq!(resolver.resolve(CanonicalField::GrossIncome, &headers), Some("Gross Pay"));
/// assert_eq!(resolver.resolve(CanonicalField::TaxPin, &headers), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HeaderResolver<'a> {
    aliases: &'a AliasSet,
}

impl<'a> HeaderResolver<'a> {
    /// Creates a resolver over an alias dictionary.
    pub fn new(aliases: &'a AliasSet) -> Self {
        Self { aliases }
    }

    /// The alias dictionary in use.
    pub fn aliases(&self) -> &'a AliasSet {
        self.aliases
    }

    /// Returns the best-matching observed header for `target`, or `None` if
    /// the field is absent.
    pub fn resolve<'h>(&self, target: CanonicalField, observed: &[&'h str]) -> Option<&'h str> {
        self.resolve_with_tier(target, observed)
            .map(|found| found.header)
    }

    /// Like [`resolve`](Self::resolve), also reporting the tier that matched.
    pub fn resolve_with_tier<'h>(
        &self,
        target: CanonicalField,
        observed: &[&'h str],
    ) -> Option<HeaderMatch<'h>> {
        let candidates: Vec<(&'h str, String)> = observed
            .iter()
            .copied()
            .filter(|header| !is_placeholder_header(header))
            .map(|header| (header, normalize_label(header)))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let canonical = target.name();
        let spaced = canonical.replace('_', " ");
        let is_canonical = |label: &str| label == canonical || label == spaced;

        let find = |tier: MatchTier, accept: &dyn Fn(&str) -> bool| {
            candidates
                .iter()
                .find(|(_, label)| accept(label.as_str()))
                .map(|(header, _)| HeaderMatch {
                    header: *header,
                    tier,
                })
        };

        if let Some(found) = find(MatchTier::CanonicalName, &|label: &str| is_canonical(label)) {
            return Some(found);
        }

        let aliases = self.aliases.aliases(target);
        if let Some(found) = find(MatchTier::Alias, &|label: &str| {
            aliases.iter().any(|alias| alias == label)
        }) {
            return Some(found);
        }

        if let Some(found) = find(MatchTier::Substring, &|label: &str| {
            [canonical, spaced.as_str()].iter().any(|name| {
                (label.len() >= SUBSTRING_MIN_LEN && name.contains(label))
                    || (name.len() >= SUBSTRING_MIN_LEN && label.contains(name))
            })
        }) {
            return Some(found);
        }

        let canonical_tokens = tokens(canonical);
        find(MatchTier::TokenOverlap, &|label: &str| {
            !tokens(label).is_disjoint(&canonical_tokens)
        })
    }
}
