use serde::{Deserialize, Serialize};

use crate::{
    config::Limits,
    error::RollError,
    roll_parser::parse_dice,
    rules::dice::{Advantage, RollSpec},
};

/// What an empty query is answered with: a plain d20 ability check.
pub const DEFAULT_QUERY: &str = "1d20>10";

/// A query split into its parts: `[name] [A|D] <notation>[>threshold]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub raw: String,
    /// Set when the query text was empty and [`DEFAULT_QUERY`] was used.
    pub defaulted: bool,
    pub check_name: Option<String>,
    pub advantage: Advantage,
    pub notation: String,
    pub threshold: Option<i32>,
}

impl Query {
    pub fn parse(text: &str) -> Self {
        let defaulted = text.trim().is_empty();
        let raw = if defaulted { DEFAULT_QUERY } else { text.trim() };

        let tokens: Vec<&str> = raw.split_whitespace().collect();
        let (check_name, advantage, dice) = match tokens.as_slice() {
            [dice] => (None, Advantage::Normal, *dice),
            [first, dice] => match Advantage::from_token(first) {
                Some(advantage) => (None, advantage, *dice),
                None => (Some(first.to_string()), Advantage::Normal, *dice),
            },
            [name, advantage, dice, ..] => (
                Some(name.to_string()),
                Advantage::from_token(advantage).unwrap_or_default(),
                *dice,
            ),
            [] => (None, Advantage::Normal, DEFAULT_QUERY),
        };

        // An unreadable threshold checks against 0.
        let parts: Vec<&str> = dice.split('>').collect();
        let (notation, threshold) = match parts.as_slice() {
            [notation, threshold] => (
                *notation,
                Some(threshold.trim().parse::<i32>().unwrap_or(0)),
            ),
            _ => (parts[0], None),
        };

        Self {
            raw: raw.to_string(),
            defaulted,
            check_name,
            advantage,
            notation: notation.to_string(),
            threshold,
        }
    }

    /// Builds the roll spec for this query.
    ///
    /// Unparsable notation falls back to [`RollSpec::default`]. Oversized
    /// specs are rejected. The returned spec is normalized: a multi-die roll
    /// never carries advantage.
    pub fn spec(&self, limits: &Limits) -> Result<RollSpec, RollError> {
        let mut spec = parse_dice(&self.notation).unwrap_or_else(|e| {
            log::debug!("{}; falling back to 1d20", e);
            RollSpec::default()
        });
        spec.check_name = self.check_name.clone();
        spec.check_threshold = self.threshold;
        spec.advantage = self.advantage;

        limits.check(spec.dice_count, spec.dice_faces)?;
        spec.normalize();

        Ok(spec)
    }
}
