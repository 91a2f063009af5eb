use serde::{Deserialize, Serialize};

use crate::{
    config::{Config, Limits},
    engine::RollEngine,
    entropy::{EntropySource, EntropyState, EthRpcSource, OfflineSource},
    error::{EntropyError, RollError},
    query::Query,
    rules::dice::{RollOutcome, RollSpec},
};

/// Everything the presentation layer needs to render one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub query: Query,
    pub spec: RollSpec,
    pub outcome: RollOutcome,
}

/// Answers dice queries. One instance is shared by reference across all
/// request threads; the entropy cache inside is its only mutable state.
pub struct DiceMaster<S> {
    engine: RollEngine<S>,
}

impl DiceMaster<Box<dyn EntropySource>> {
    /// Builds a dice master from configuration, talking to the configured
    /// Ethereum RPC endpoint or running offline when there is none.
    pub fn from_config(config: &Config) -> Result<Self, EntropyError> {
        let source: Box<dyn EntropySource> = match &config.eth_rpc_url {
            Some(url) => {
                log::info!("Using Ethereum JSON-RPC entropy source");
                Box::new(EthRpcSource::new(url, config.request_timeout)?)
            }
            None => {
                log::warn!("ETH_RPC_URL not set, rolling without block hash entropy");
                Box::new(OfflineSource)
            }
        };
        Ok(Self::new(source, config))
    }
}

impl<S: EntropySource> DiceMaster<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            engine: RollEngine::new(source, config.refresh_interval, config.limits),
        }
    }

    pub fn limits(&self) -> Limits {
        self.engine.limits()
    }

    pub fn entropy_snapshot(&self) -> EntropyState {
        self.engine.entropy_snapshot()
    }

    /// Answers one query. `LimitExceeded` is the only error that reaches the
    /// caller; bad notation falls back to a d20 and entropy outages are
    /// absorbed by the cache.
    pub fn answer(&self, text: &str) -> Result<Answer, RollError> {
        let query = Query::parse(text);
        let spec = query.spec(&self.engine.limits())?;
        let outcome = self.engine.roll(&spec)?;
        Ok(Answer {
            query,
            spec,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;
    use crate::{
        entropy::source::testing::ScriptedSource,
        rules::dice::{Advantage, Verdict},
    };

    fn dice_master(source: ScriptedSource) -> DiceMaster<ScriptedSource> {
        let config = Config {
            refresh_interval: Duration::from_secs(3600),
            ..Config::default()
        };
        DiceMaster::new(source, &config)
    }

    #[test]
    fn test_answer_advantage_check() -> anyhow::Result<()> {
        let dm = dice_master(ScriptedSource::succeeding());
        let answer = dm.answer("Athletics A 1d20+2>15")?;
        assert_eq!(answer.spec.check_name.as_deref(), Some("Athletics"));
        assert_eq!(answer.spec.advantage, Advantage::Advantage);
        assert_eq!(answer.spec.modifier_text, "+2");
        assert_eq!(answer.outcome.individual_results.len(), 2);
        let rolls = &answer.outcome.individual_results;
        assert_eq!(answer.outcome.aggregate, rolls[0].max(rolls[1]) as i64);
        let check = answer.outcome.check.unwrap();
        assert_eq!(check.passed, answer.outcome.final_value >= 15);
        Ok(())
    }

    #[test]
    fn test_answer_bad_notation_defaults() -> anyhow::Result<()> {
        let dm = dice_master(ScriptedSource::succeeding());
        let answer = dm.answer("fireball")?;
        assert_eq!(answer.spec.dice_count, 1);
        assert_eq!(answer.spec.dice_faces, 20);
        assert_eq!(answer.outcome.individual_results.len(), 1);
        Ok(())
    }

    #[test]
    fn test_answer_empty_query() -> anyhow::Result<()> {
        let dm = dice_master(ScriptedSource::succeeding());
        let answer = dm.answer("")?;
        assert!(answer.query.defaulted);
        assert_eq!(answer.spec.check_threshold, Some(10));
        let verdict = answer.outcome.verdict(10);
        match answer.outcome.aggregate {
            20 => assert_eq!(verdict, Verdict::CriticalSuccess),
            1 => assert_eq!(verdict, Verdict::CriticalFailure),
            n if n >= 10 => assert_eq!(verdict, Verdict::Success),
            _ => assert_eq!(verdict, Verdict::Failure),
        }
        Ok(())
    }

    #[test]
    fn test_answer_limit_exceeded() {
        let dm = dice_master(ScriptedSource::succeeding());
        let err = dm.answer("1001d6").unwrap_err();
        assert!(err.is_limit_exceeded());
        assert_eq!(dm.entropy_snapshot().draws_since_refresh, 0);
    }

    #[test]
    fn test_answer_survives_entropy_outage() -> anyhow::Result<()> {
        let dm = dice_master(ScriptedSource::failing_after(0));
        let answer = dm.answer("4d8")?;
        assert_eq!(answer.outcome.individual_results.len(), 4);
        Ok(())
    }

    #[test]
    fn test_concurrent_answers() {
        let dm = dice_master(ScriptedSource::succeeding());
        let shared = &dm;
        let seeds: Vec<u64> = thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| scope.spawn(move || shared.answer("2d6+1").map(|a| a.outcome.seed)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });
        assert_eq!(seeds.len(), 16);
        assert_eq!(dm.entropy_snapshot().draws_since_refresh, 16);
    }
}
