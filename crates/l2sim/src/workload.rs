//! Session workload driven through the decorator chain

use std::sync::Arc;

use l2cache::{
    LoggingCache, SharedCache, SoftCache, SoftEntry, TransactionalCacheManager,
};
use l2store::{Cache, PerpetualCache, Result};
use tracing::{debug, info};

use crate::config::ChainConfig;

type Soft = SoftCache<u64, String, PerpetualCache<u64, SoftEntry<String>>>;

/// Knobs of a simulated run
#[derive(Debug, Clone)]
pub struct Workload {
    /// Number of sessions to run
    pub sessions: u64,

    /// Distinct keys the sessions read
    pub keys: u64,

    /// Lookups per session
    pub reads: u64,

    /// Every n-th session rolls back instead of committing (0 = never)
    pub rollback_every: u64,

    /// Apply full memory pressure every n sessions (0 = never)
    pub pressure_every: u64,
}

/// Outcome of a run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Report {
    pub commits: u64,
    pub rollbacks: u64,
    pub loads: u64,
    pub reclaimed: u64,
    pub size: usize,
    pub pinned: usize,
    pub hit_ratio: Option<f64>,
}

/// The shared side of the chain, typed so its layers stay inspectable
pub struct Chain {
    soft: Arc<Soft>,
    logging: Option<Arc<LoggingCache<Arc<Soft>>>>,
    shared: SharedCache<u64, Arc<String>>,
}

impl Chain {
    /// Build PerpetualCache -> SoftCache (-> LoggingCache)
    pub fn build(config: &ChainConfig) -> Result<Self> {
        let soft = Arc::new(SoftCache::with_config(
            PerpetualCache::new(config.id.clone()),
            config.soft,
        )?);

        let logging = config
            .logging
            .then(|| Arc::new(LoggingCache::new(Arc::clone(&soft))));
        let shared: SharedCache<u64, Arc<String>> = match &logging {
            Some(logging) => Arc::clone(logging) as SharedCache<u64, Arc<String>>,
            None => Arc::clone(&soft) as SharedCache<u64, Arc<String>>,
        };

        Ok(Self {
            soft,
            logging,
            shared,
        })
    }

    /// Run `workload` session by session
    pub fn run(&self, workload: &Workload) -> Result<Report> {
        let mut report = Report::default();

        for session in 0..workload.sessions {
            let mut tcm = TransactionalCacheManager::new();

            for read in 0..workload.reads {
                let key = (session * 7 + read * 13) % workload.keys.max(1);
                if tcm.get(&self.shared, &key)?.is_none() {
                    tcm.put(&self.shared, key, Arc::new(format!("row-{}", key)))?;
                    report.loads += 1;
                }
            }

            if workload.rollback_every > 0 && session % workload.rollback_every == 0 {
                tcm.rollback()?;
                report.rollbacks += 1;
            } else {
                tcm.commit()?;
                report.commits += 1;
            }

            if workload.pressure_every > 0 && (session + 1) % workload.pressure_every == 0 {
                let reclaimed = self.soft.collector().shrink(0);
                debug!(session, reclaimed, "applied memory pressure");
            }
        }

        report.reclaimed = self.soft.collector().reclaimed_count();
        report.size = self.shared.size()?;
        report.pinned = self.soft.pinned_len();
        report.hit_ratio = self.logging.as_ref().map(|l| l.stats().hit_ratio());

        info!(
            commits = report.commits,
            rollbacks = report.rollbacks,
            loads = report.loads,
            reclaimed = report.reclaimed,
            size = report.size,
            "workload finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload() -> Workload {
        Workload {
            sessions: 20,
            keys: 50,
            reads: 10,
            rollback_every: 0,
            pressure_every: 0,
        }
    }

    #[test]
    fn test_committed_loads_are_reused() {
        let chain = Chain::build(&ChainConfig::default()).unwrap();

        let first = chain.run(&Workload { sessions: 1, ..workload() }).unwrap();
        assert_eq!(first.loads, 10);
        assert_eq!(first.size, 10);

        // Same keys again: every read hits
        let again = chain.run(&Workload { sessions: 1, ..workload() }).unwrap();
        assert_eq!(again.loads, 0);
        assert_eq!(again.hit_ratio, Some(0.5));
    }

    #[test]
    fn test_rolled_back_loads_are_not_published() {
        let chain = Chain::build(&ChainConfig::default()).unwrap();

        let report = chain
            .run(&Workload {
                sessions: 1,
                rollback_every: 1,
                ..workload()
            })
            .unwrap();

        assert_eq!(report.rollbacks, 1);
        assert_eq!(report.commits, 0);
        // Only miss-values were written
        assert_eq!(report.size, 10);
        assert_eq!(chain.shared.get(&0).unwrap(), None);
    }

    #[test]
    fn test_pressure_reclaims_unpinned_values() {
        let config = ChainConfig {
            logging: false,
            ..ChainConfig::default()
        };
        let chain = Chain::build(&config).unwrap();

        chain.soft.set_size(0);
        let report = chain
            .run(&Workload {
                pressure_every: 1,
                ..workload()
            })
            .unwrap();

        assert!(report.reclaimed > 0);
        assert_eq!(report.pinned, 0);
        assert_eq!(report.hit_ratio, None);
        assert_eq!(report.commits, 20);
    }
}
