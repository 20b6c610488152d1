use crate::format::{compact, grouped};
use crate::models::{AccountReach, AnalyticsSummary, AppSettings, Kpi, Record, RegionCount};
use crate::region::RegionResolver;
use std::collections::HashMap;

fn kpi(title: &'static str, description: &'static str, value: u64) -> Kpi {
    Kpi {
        title,
        description,
        value,
        metric: compact(value),
        raw: grouped(value),
    }
}

/// Accounts per canonical region, largest first; ties keep first-seen order.
pub fn region_counts(records: &[Record], resolver: &RegionResolver) -> Vec<RegionCount> {
    let mut counts: Vec<RegionCount> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for record in records {
        let name = resolver.canonical_name(record.location_label.as_deref());
        match positions.get(&name) {
            Some(position) => counts[*position].value += 1,
            None => {
                positions.insert(name.clone(), counts.len());
                counts.push(RegionCount { name, value: 1 });
            }
        }
    }
    counts.sort_by(|left, right| right.value.cmp(&left.value));
    counts
}

pub fn top_accounts(records: &[Record], limit: usize) -> Vec<AccountReach> {
    let mut ranked = records.iter().collect::<Vec<_>>();
    ranked.sort_by(|left, right| right.followers_or_zero().cmp(&left.followers_or_zero()));
    ranked
        .into_iter()
        .take(limit)
        .map(|record| AccountReach {
            handle: record.handle.clone(),
            followers: record.followers_or_zero(),
        })
        .collect()
}

pub fn summarize(records: &[Record], resolver: &RegionResolver, settings: &AppSettings) -> AnalyticsSummary {
    let total_accounts = records.len() as u64;
    let total_reach = records.iter().map(Record::followers_or_zero).sum::<u64>();
    let total_tweets = records.iter().map(Record::tweets_or_zero).sum::<u64>();
    let average_tweets = if total_accounts == 0 {
        0
    } else {
        (total_tweets as f64 / total_accounts as f64).round() as u64
    };

    let mut top_regions = region_counts(records, resolver);
    top_regions.truncate(settings.top_regions);
    let region_share = top_regions.iter().take(settings.share_slices).cloned().collect();

    AnalyticsSummary {
        total_accounts: kpi(
            "Total Users",
            "Unique accounts currently tracked in the database",
            total_accounts,
        ),
        total_reach: kpi(
            "Total Network Reach",
            "Sum of followers across all user accounts",
            total_reach,
        ),
        average_tweets: kpi(
            "Avg. Tweets / User",
            "Average number of tweets per tracked account",
            average_tweets,
        ),
        top_regions,
        top_accounts: top_accounts(records, settings.top_accounts),
        region_share,
    }
}
