pub mod config;
pub mod engine;
pub mod entropy;
pub mod error;
pub mod query;
pub mod roll_parser;
pub mod roller;
pub mod rules;
pub mod service;

pub mod prelude {
    pub use crate::{
        config::{Config, Limits},
        engine::RollEngine,
        entropy::{
            BlockInfo, EntropyCache, EntropySource, EntropyState, EthRpcSource, OfflineSource,
            SeedMaterial,
        },
        error::{EntropyError, RollError},
        query::{DEFAULT_QUERY, Query},
        roll_parser::parse_dice,
        roller::Roller,
        rules::dice::{
            Advantage, CheckResult, Critical, DEFAULT_CHECK_THRESHOLD, RollOutcome, RollSpec,
            Verdict,
        },
        service::{Answer, DiceMaster},
    };
}
