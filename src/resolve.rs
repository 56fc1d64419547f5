//! Locates the column that carries a canonical field in a record set whose
//! headers were written by hand.
//!
//! Matching runs three tiers in strict priority order and the first hit wins:
//!
//! 1. exact: a normalised alias equals a normalised header;
//! 2. substring: a normalised alias occurs inside a normalised header;
//! 3. token subset: every word of an alias occurs inside a normalised header.
//!
//! [`resolve`] reports the outcome as a [`Resolution`], [`resolve_header`]
//! turns anything but a match into [`ToolError::HeaderNotFound`] and
//! [`suggest_header`] returns an optional default for a manual selection.

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::{CanonicalField, RecordSet, SourceKind};
use crate::normalize::normalize_text;

/// Tier that produced a header match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Substring,
    TokenSubset,
}

/// Outcome of resolving one field against a set of headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A header matched.
    Found { header: String, tier: MatchTier },
    /// Nothing matched; the caller has to pick one of the candidates.
    NeedsManual { candidates: Vec<String> },
    /// The record set has no headers to pick from.
    NotFound,
}

impl Resolution {
    /// The matched header, if any.
    pub fn header(&self) -> Option<&str> {
        match self {
            Resolution::Found { header, .. } => Some(header),
            _ => None,
        }
    }
}

/// Resolves a list of alias candidates against actual headers.
pub fn resolve_aliases<S: AsRef<str>>(headers: &[String], aliases: &[S]) -> Resolution {
    if headers.is_empty() {
        return Resolution::NotFound;
    }

    let normalized_headers: Vec<String> = headers.iter().map(|h| normalize_text(h)).collect();
    let normalized_aliases: Vec<String> = aliases
        .iter()
        .map(|alias| normalize_text(alias.as_ref()))
        .filter(|alias| !alias.is_empty())
        .collect();

    let found = |index: usize, tier: MatchTier| Resolution::Found {
        header: headers[index].clone(),
        tier,
    };

    for alias in &normalized_aliases {
        if let Some(index) = normalized_headers.iter().position(|header| header == alias) {
            return found(index, MatchTier::Exact);
        }
    }

    for (index, header) in normalized_headers.iter().enumerate() {
        if normalized_aliases
            .iter()
            .any(|alias| header.contains(alias.as_str()))
        {
            return found(index, MatchTier::Substring);
        }
    }

    for (index, header) in normalized_headers.iter().enumerate() {
        let covered = normalized_aliases.iter().any(|alias| {
            alias
                .split_whitespace()
                .all(|token| header.contains(token))
        });
        if covered {
            return found(index, MatchTier::TokenSubset);
        }
    }

    Resolution::NeedsManual {
        candidates: headers.to_vec(),
    }
}

/// Resolves a canonical field using its built-in alias list.
pub fn resolve(headers: &[String], field: CanonicalField) -> Resolution {
    let resolution = resolve_aliases(headers, field.aliases());
    match &resolution {
        Resolution::Found { header, tier } => {
            debug!(%field, header = %header, ?tier, "resolved column");
        }
        _ => debug!(%field, "no column matched"),
    }
    resolution
}

/// Strict resolution: the matched header or [`ToolError::HeaderNotFound`].
pub fn resolve_header(
    headers: &[String],
    field: CanonicalField,
    role: SourceKind,
) -> Result<String> {
    match resolve(headers, field) {
        Resolution::Found { header, .. } => Ok(header),
        Resolution::NeedsManual { .. } | Resolution::NotFound => Err(ToolError::HeaderNotFound {
            role,
            field,
            aliases: field.aliases().iter().map(|alias| alias.to_string()).collect(),
            headers: headers.to_vec(),
        }),
    }
}

/// Lenient resolution used to pre-select a column in a manual picker.
pub fn suggest_header(headers: &[String], field: CanonicalField) -> Option<String> {
    resolve(headers, field).header().map(str::to_string)
}

/// Everything a selection control needs to let a person choose the column for
/// one required field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChoice {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
    pub headers: Vec<String>,
    pub suggested: Option<String>,
    pub tier: Option<MatchTier>,
}

/// Builds one [`FieldChoice`] per field the given role requires.
pub fn field_choices(records: &RecordSet, role: SourceKind) -> Vec<FieldChoice> {
    role.required_fields()
        .iter()
        .map(|&field| {
            let resolution = resolve(records.headers(), field);
            let tier = match &resolution {
                Resolution::Found { tier, .. } => Some(*tier),
                Resolution::NeedsManual { .. } | Resolution::NotFound => None,
            };
            let suggested = resolution.header().map(str::to_string);
            FieldChoice {
                field,
                aliases: field.aliases().iter().map(|alias| alias.to_string()).collect(),
                headers: records.headers().to_vec(),
                suggested,
                tier,
            }
        })
        .collect()
}
