//! Fair-share level per account.

use super::share_label;
use crate::config::{AggregateError, AggregationConfig, Family};
use crate::types::{FairShareMetrics, FairShareMetricsMap};
use slurmex_api::SharesResponse;

/// Record the fair-share level of every association, keyed by name.
///
/// An account listed more than once keeps the last level seen.
pub fn aggregate_fairshare(
    shares: &SharesResponse,
    config: &AggregationConfig,
) -> Result<FairShareMetricsMap, AggregateError> {
    let policy = config.policy(Family::FairShare);
    let mut accounts = FairShareMetricsMap::new();

    for (idx, share) in shares.shares.shares.iter().enumerate() {
        let resolved = share
            .name()
            .and_then(|name| Ok((name, share.fairshare_level()?)));
        let Some((name, level)) =
            policy.resolve(Family::FairShare, || share_label(idx, share), resolved)?
        else {
            continue;
        };

        accounts.entry(name.to_string()).or_default().fairshare = level;
    }

    Ok(accounts)
}
