use crate::models::{QueryState, Record, SortField, SortOrder, ALL_LOCATIONS};
use crate::region::RegionResolver;
use std::cmp::Ordering;
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Comparison key approximating locale collation: base letters first,
/// then accents, then case (lowercase before uppercase), then raw text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: String,
    secondary: String,
    tertiary: Vec<u8>,
    raw: String,
}

impl CollationKey {
    pub fn new(value: &str) -> Self {
        let decomposed = value.nfd().collect::<String>();
        let primary = decomposed
            .chars()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect();
        let secondary = decomposed.chars().flat_map(char::to_lowercase).collect();
        let tertiary = decomposed
            .chars()
            .filter(|c| !is_combining_mark(*c))
            .map(|c| u8::from(c.is_uppercase()))
            .collect();
        Self {
            primary,
            secondary,
            tertiary,
            raw: value.to_string(),
        }
    }
}

pub fn locale_cmp(left: &str, right: &str) -> Ordering {
    CollationKey::new(left).cmp(&CollationKey::new(right))
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Count(Option<u64>),
    Text(CollationKey),
}

fn sort_key(record: &Record, field: SortField) -> SortKey {
    match field {
        SortField::Name => SortKey::Text(CollationKey::new(&record.name)),
        SortField::Location => SortKey::Text(CollationKey::new(record.location_label.as_deref().unwrap_or(""))),
        SortField::FollowerCount => SortKey::Count(record.follower_count),
        SortField::TweetCount => SortKey::Count(record.tweet_count),
    }
}

fn matches_search(record: &Record, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record.name.to_lowercase().contains(needle)
        || record.handle.to_lowercase().contains(needle)
        || record
            .location_label
            .as_deref()
            .map(|label| label.to_lowercase().contains(needle))
            .unwrap_or(false)
}

/// Store indices of the directory view for `query`, in display order.
pub fn derive_indices(records: &[Record], query: &QueryState, resolver: &RegionResolver) -> Vec<usize> {
    let needle = query.search.to_lowercase();
    let location = if query.is_location_filtered() {
        Some(resolver.canonical_name(Some(&query.location_filter)))
    } else {
        None
    };

    let mut keyed = records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_search(record, &needle))
        .filter(|(_, record)| match &location {
            Some(location) => resolver.canonical_name(record.location_label.as_deref()) == *location,
            None => true,
        })
        .map(|(index, record)| (sort_key(record, query.sort_field), index))
        .collect::<Vec<_>>();

    keyed.sort_by(|(left, _), (right, _)| match query.sort_order {
        SortOrder::Asc => left.cmp(right),
        SortOrder::Desc => right.cmp(left),
    });
    keyed.into_iter().map(|(_, index)| index).collect()
}

/// Filtered and sorted records. Pure: the same inputs always give the same
/// output, ties keeping store order.
pub fn derive<'a>(records: &'a [Record], query: &QueryState, resolver: &RegionResolver) -> Vec<&'a Record> {
    derive_indices(records, query, resolver)
        .into_iter()
        .filter_map(|index| records.get(index))
        .collect()
}

/// Choices for the location dropdown: "All" followed by every canonical
/// region present, collated.
pub fn location_options(records: &[Record], resolver: &RegionResolver) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = records
        .iter()
        .map(|record| resolver.canonical_name(record.location_label.as_deref()))
        .filter(|name| seen.insert(name.clone()))
        .collect::<Vec<_>>();
    names.sort_by(|left, right| locale_cmp(left, right));

    let mut options = Vec::with_capacity(names.len() + 1);
    options.push(ALL_LOCATIONS.to_string());
    options.extend(names);
    options
}
