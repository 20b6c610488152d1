use crate::format::grouped_or_dash;
use crate::models::{AccountDetail, DetailView, Record};
use crate::store::RecordStore;

const NO_LOCATION: &str = "Unknown Location";
const NO_BIO: &str = "No biography available.";

pub fn profile_url(handle: &str) -> String {
    format!("https://twitter.com/{}", handle)
}

fn account_detail(record: &Record) -> AccountDetail {
    let raw = serde_json::to_string_pretty(record).unwrap_or_else(|error| {
        tracing::warn!(handle = %record.handle, error = %error, "failed to render raw record");
        String::new()
    });

    AccountDetail {
        id: record.id.clone(),
        name: record.name.clone(),
        handle: record.handle.clone(),
        location: record
            .location_label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(NO_LOCATION)
            .to_string(),
        joined: record
            .creation_timestamp
            .map(|timestamp| timestamp.format("%-m/%-d/%Y").to_string()),
        bio: record
            .bio
            .clone()
            .filter(|bio| !bio.trim().is_empty())
            .unwrap_or_else(|| NO_BIO.to_string()),
        avatar_url: record.avatar_url.clone(),
        followers: grouped_or_dash(record.follower_count),
        tweets: grouped_or_dash(record.tweet_count),
        following: grouped_or_dash(record.following_count),
        profile_url: profile_url(&record.handle),
        raw,
    }
}

/// Detail view for a handle, matched case-insensitively. An unknown handle
/// is a regular "not found" state.
pub fn detail_view(store: &RecordStore, handle: &str) -> DetailView {
    match store.find_by_handle(handle) {
        Some((_, record)) => DetailView::Found(Box::new(account_detail(record))),
        None => {
            tracing::debug!(handle = %handle, "detail requested for unknown handle");
            DetailView::NotFound {
                handle: handle.to_string(),
            }
        }
    }
}
