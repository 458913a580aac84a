//! The push_swap operation vocabulary.
//!
//! Eleven tokens, each naming a primitive action on stack A, stack B, or both.
//! Parsing is strict: anything outside the vocabulary is an error, never a no-op.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One primitive stack operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Swap the top two elements of A.
    Sa,
    /// Swap the top two elements of B.
    Sb,
    /// `sa` and `sb` at once.
    Ss,
    /// Pop the top of B and push it onto A.
    Pa,
    /// Pop the top of A and push it onto B.
    Pb,
    /// Rotate A: top element goes to the bottom.
    Ra,
    /// Rotate B.
    Rb,
    /// `ra` and `rb` at once.
    Rr,
    /// Reverse-rotate A: bottom element comes to the top.
    Rra,
    /// Reverse-rotate B.
    Rrb,
    /// `rra` and `rrb` at once.
    Rrr,
}

impl Operation {
    /// Every operation, in canonical order.
    pub const ALL: [Operation; 11] = [
        Self::Sa,
        Self::Sb,
        Self::Ss,
        Self::Pa,
        Self::Pb,
        Self::Ra,
        Self::Rb,
        Self::Rr,
        Self::Rra,
        Self::Rrb,
        Self::Rrr,
    ];

    /// The wire token for this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sa => "sa",
            Self::Sb => "sb",
            Self::Ss => "ss",
            Self::Pa => "pa",
            Self::Pb => "pb",
            Self::Ra => "ra",
            Self::Rb => "rb",
            Self::Rr => "rr",
            Self::Rra => "rra",
            Self::Rrb => "rrb",
            Self::Rrr => "rrr",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token that is not part of the operation vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation: {token:?}")]
pub struct UnknownOperation {
    pub token: String,
}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "sa" => Self::Sa,
            "sb" => Self::Sb,
            "ss" => Self::Ss,
            "pa" => Self::Pa,
            "pb" => Self::Pb,
            "ra" => Self::Ra,
            "rb" => Self::Rb,
            "rr" => Self::Rr,
            "rra" => Self::Rra,
            "rrb" => Self::Rrb,
            "rrr" => Self::Rrr,
            _ => {
                return Err(UnknownOperation {
                    token: s.to_string(),
                });
            }
        };
        Ok(op)
    }
}

/// Subject output containing one or more tokens outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid output token(s): {tokens:?}")]
pub struct MalformedOutput {
    /// Offending tokens, in order of appearance.
    pub tokens: Vec<String>,
    /// Number of whitespace-separated tokens in the output, valid or not.
    pub total_tokens: usize,
}

/// Split subject output on any whitespace and parse every token.
///
/// Single-line output such as `"sa ra"` is accepted as well as one token per line.
/// On failure every unknown token is reported, not only the first.
pub fn parse_operations(text: &str) -> Result<Vec<Operation>, MalformedOutput> {
    let mut ops = Vec::new();
    let mut unknown = Vec::new();
    let mut total = 0;

    for token in text.split_whitespace() {
        total += 1;
        match token.parse::<Operation>() {
            Ok(op) => ops.push(op),
            Err(err) => unknown.push(err.token),
        }
    }

    if unknown.is_empty() {
        Ok(ops)
    } else {
        Err(MalformedOutput {
            tokens: unknown,
            total_tokens: total,
        })
    }
}

/// Render operations back to newline-separated wire format.
pub fn format_operations(ops: &[Operation]) -> String {
    let mut out = String::with_capacity(ops.len() * 4);
    for op in ops {
        out.push_str(op.as_str());
        out.push('\n');
    }
    out
}
