//! # Endpoint Identifier Expressions
//!
//! Canonical, wildcard-capable EID strings and the overlap matcher used by
//! every rule lookup in the database.
//!
//! ## Matching Semantics
//!
//! An expression ending in the wildcard marker `~` covers every EID sharing
//! its prefix. A bare `~` covers everything. The matcher compares only the
//! shorter of the two relevant prefixes and never verifies that the shorter
//! string was fully consumed, so `"ipn:1"` matches `"ipn:12"`. That
//! truncating comparison is inherited from the source system and downstream
//! policy decisions may depend on it; it is pinned by regression tests and
//! must not be tightened.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::SecDbError;

/// Maximum length of an EID expression in bytes.
pub const MAX_EID_LEN: usize = 255;

/// Canonical wildcard marker. An input-time `*` is rewritten to this.
pub const WILDCARD: char = '~';

/// Where an EID expression is being used, which controls validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EidContext {
    /// A concrete endpoint named in a query (or a clear-filter).
    Literal,
    /// An endpoint of a rule being stored. Rules apply to whole nodes,
    /// so the canonical form must end in the wildcard marker.
    WildcardRule,
}

/// A canonical EID expression.
///
/// Non-empty, at most [`MAX_EID_LEN`] bytes, with any trailing `*` already
/// rewritten to `~`. Construct via [`EidExpression::canonicalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EidExpression(String);

impl EidExpression {
    /// Validate and canonicalize a raw EID string.
    ///
    /// # Errors
    /// * `InvalidEidLength` - empty or longer than [`MAX_EID_LEN`]
    /// * `RuleMustCoverWholeNode` - `WildcardRule` context and the canonical
    ///   form does not end in `~`
    pub fn canonicalize(raw: &str, context: EidContext) -> Result<Self, SecDbError> {
        if raw.is_empty() || raw.len() > MAX_EID_LEN {
            return Err(SecDbError::InvalidEidLength { len: raw.len() });
        }

        let mut eid = raw.to_string();
        if eid.ends_with('*') {
            eid.pop();
            eid.push(WILDCARD);
        }

        if context == EidContext::WildcardRule && !eid.ends_with(WILDCARD) {
            return Err(SecDbError::RuleMustCoverWholeNode { eid });
        }

        Ok(Self(eid))
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this expression ends in the wildcard marker.
    pub fn is_wildcarded(&self) -> bool {
        self.0.ends_with(WILDCARD)
    }

    /// Whether either expression covers the other.
    ///
    /// Exact truncating-prefix algorithm of the source system:
    /// 1. A bare `~` on either side matches everything.
    /// 2. Both wildcarded: compare over the shorter prefix.
    /// 3. One wildcarded: compare its prefix against the other string,
    ///    truncated to the shorter of the two.
    /// 4. Neither wildcarded: compare over the shorter full length.
    pub fn matches(&self, other: &EidExpression) -> bool {
        let a = self.0.as_bytes();
        let b = other.0.as_bytes();
        let pa = wildcard_pos(a);
        let pb = wildcard_pos(b);

        match (pa, pb) {
            // The whole expression is just the wildcard marker.
            (Some(0), _) | (_, Some(0)) => true,
            (Some(pa), Some(pb)) => {
                let n = pa.min(pb);
                a[..n] == b[..n]
            }
            (Some(pa), None) => {
                let n = pa.min(b.len());
                a[..n] == b[..n]
            }
            (None, Some(pb)) => {
                let n = self.0.len().min(pb);
                a[..n] == b[..n]
            }
            (None, None) => {
                let n = a.len().min(b.len());
                a[..n] == b[..n]
            }
        }
    }
}

/// Index of the trailing wildcard marker, if present.
fn wildcard_pos(s: &[u8]) -> Option<usize> {
    match s.last() {
        Some(&c) if c == WILDCARD as u8 => Some(s.len() - 1),
        _ => None,
    }
}

impl fmt::Display for EidExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EidExpression {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
