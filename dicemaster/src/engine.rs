use std::time::Duration;

use crate::{
    config::Limits,
    entropy::{EntropyCache, EntropySource, EntropyState},
    error::RollError,
    roller::Roller,
    rules::dice::{Advantage, RollOutcome, RollSpec},
};

const LOGGED_RESULT_LEN: usize = 64;

pub struct RollEngine<S> {
    entropy: EntropyCache<S>,
    limits: Limits,
}

impl<S: EntropySource> RollEngine<S> {
    pub fn new(source: S, refresh_interval: Duration, limits: Limits) -> Self {
        Self {
            entropy: EntropyCache::new(source, refresh_interval),
            limits,
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn entropy_snapshot(&self) -> EntropyState {
        self.entropy.snapshot()
    }

    /// Rolls a spec that has already been normalized.
    ///
    /// Specs above the configured limits are rejected before any draw. A spec
    /// carrying advantage with more than one die breaks the normalization
    /// precondition; it is logged and rolled as a plain sum instead.
    pub fn roll(&self, spec: &RollSpec) -> Result<RollOutcome, RollError> {
        self.limits.check(spec.dice_count, spec.dice_faces)?;

        let advantage = if !spec.advantage.is_normal() && spec.dice_count != 1 {
            log::warn!(
                "{}",
                RollError::InvariantViolation(format!(
                    "{:?} requested with {} dice",
                    spec.advantage, spec.dice_count
                ))
            );
            Advantage::Normal
        } else {
            spec.advantage
        };
        let count = match advantage {
            Advantage::Normal => spec.dice_count,
            Advantage::Advantage | Advantage::Disadvantage => 2,
        };

        let material = self.entropy.current_seed_material();
        let mut roller = Roller::from_seed(material.seed);
        let draws = roller.roll_many(count, spec.dice_faces);

        let mut result = format!("{:?}", draws);
        if result.len() > LOGGED_RESULT_LEN {
            result.truncate(LOGGED_RESULT_LEN);
            result.push_str("...");
        }
        log::info!("Rolled {}d{} seed={} result={}", count, spec.dice_faces, material.seed, result);

        Ok(RollOutcome::from_draws(spec, advantage, draws, material.seed))
    }
}
