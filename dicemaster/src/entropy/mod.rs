//! Shared seed material for every roll.
//!
//! An [`EntropyCache`] holds the last block hash fetched from an
//! [`EntropySource`] and refreshes it once it is older than the refresh
//! interval. Each seed request mixes that hash with a per-hash draw counter and
//! the wall clock, so rolls between refreshes still get distinct seeds.

use std::{
    hash::Hasher,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::error::{EntropyError, RollError};

pub mod source;

pub use source::{BlockInfo, EntropySource, EthRpcSource, OfflineSource};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntropyState {
    pub raw_hash: String,
    pub last_height: Option<String>,
    /// `None` until the first successful refresh.
    pub last_refreshed_at: Option<Instant>,
    pub draws_since_refresh: u64,
}

impl EntropyState {
    pub fn is_stale(&self, refresh_interval: Duration, now: Instant) -> bool {
        match self.last_refreshed_at {
            Some(at) => now.saturating_duration_since(at) >= refresh_interval,
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMaterial {
    pub hash_token: String,
    pub use_index: u64,
    pub seed: u64,
}

pub struct EntropyCache<S> {
    source: S,
    refresh_interval: Duration,
    state: Mutex<EntropyState>,
}

impl<S: EntropySource> EntropyCache<S> {
    pub fn new(source: S, refresh_interval: Duration) -> Self {
        Self {
            source,
            refresh_interval,
            state: Mutex::new(EntropyState::default()),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Returns fresh seed material, refreshing the block hash first if it has
    /// gone stale. The staleness check, the refresh and the counter increment
    /// all happen under one lock.
    pub fn current_seed_material(&self) -> SeedMaterial {
        let mut state = self.state.lock();

        if self.source.is_configured() && state.is_stale(self.refresh_interval, Instant::now()) {
            self.refresh(&mut state);
        }

        let use_index = state.draws_since_refresh;
        let seed = mix_seed(&state.raw_hash, use_index, clock_micros());
        state.draws_since_refresh += 1;

        SeedMaterial {
            hash_token: state.raw_hash.clone(),
            use_index,
            seed,
        }
    }

    /// A copy of the current state, taken under the lock.
    pub fn snapshot(&self) -> EntropyState {
        self.state.lock().clone()
    }

    fn refresh(&self, state: &mut EntropyState) {
        match self.source.fetch_latest_block() {
            Ok(block) => {
                log::info!(
                    "Block hash updated: height={} hash={}",
                    block.height,
                    block.hash
                );
                state.raw_hash = block.hash;
                state.last_height = Some(block.height);
                state.last_refreshed_at = Some(Instant::now());
                state.draws_since_refresh = 0;
            }
            Err(EntropyError::NotConfigured) => {
                log::debug!("No entropy source configured, keeping hash {:?}", state.raw_hash);
            }
            Err(e) => {
                log::error!(
                    "{} (keeping hash {:?})",
                    RollError::EntropySourceUnavailable(e),
                    state.raw_hash
                );
            }
        }
    }
}

fn clock_micros() -> u64 {
    chrono::Utc::now().timestamp_micros() as u64
}

/// The counter lands in the high half so that a clock step cannot cancel it out.
fn mix_seed(raw_hash: &str, use_index: u64, micros: u64) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(raw_hash.as_bytes());
    hasher.finish() ^ use_index.rotate_left(32) ^ micros
}
