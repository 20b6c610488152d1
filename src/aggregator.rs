use crate::models::{Record, RegionGroup};
use crate::region::RegionResolver;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub groups: Vec<RegionGroup>,
    /// Regions without a coordinate. Diagnostic only, never plotted.
    pub unmapped: Vec<RegionGroup>,
}

/// Groups records by canonical region in first-seen order and drops the
/// groups that have no coordinate.
pub fn aggregate(records: &[Record], resolver: &RegionResolver) -> Vec<RegionGroup> {
    aggregate_with_diagnostics(records, resolver).groups
}

pub fn aggregate_with_diagnostics(records: &[Record], resolver: &RegionResolver) -> Aggregation {
    let mut groups: Vec<(RegionGroup, bool)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, record) in records.iter().enumerate() {
        let region = resolver.resolve(record.location_label.as_deref());
        match positions.get(&region.canonical_name) {
            Some(position) => groups[*position].0.members.push(index),
            None => {
                positions.insert(region.canonical_name.clone(), groups.len());
                groups.push((
                    RegionGroup {
                        name: region.canonical_name,
                        coordinate: region.coordinate,
                        members: vec![index],
                    },
                    region.mapped,
                ));
            }
        }
    }

    let (mapped, unmapped): (Vec<_>, Vec<_>) = groups
        .into_iter()
        .partition(|(group, mapped)| *mapped || !group.coordinate.is_sentinel());
    let aggregation = Aggregation {
        groups: mapped.into_iter().map(|(group, _)| group).collect(),
        unmapped: unmapped.into_iter().map(|(group, _)| group).collect(),
    };

    if !aggregation.unmapped.is_empty() {
        let names = aggregation
            .unmapped
            .iter()
            .map(|group| group.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        tracing::warn!(
            count = aggregation.unmapped.len(),
            regions = %names,
            "regions missing coordinates; excluded from map"
        );
    }

    aggregation
}

#[cfg(test)]
mod tests {
    use super::{aggregate, aggregate_with_diagnostics};
    use crate::models::Record;
    use crate::region::RegionResolver;

    fn record(handle: &str, location: Option<&str>) -> Record {
        Record {
            id: handle.to_string(),
            name: handle.to_uppercase(),
            handle: handle.to_string(),
            location_label: location.map(str::to_string),
            follower_count: None,
            tweet_count: None,
            following_count: None,
            creation_timestamp: None,
            avatar_url: None,
            bio: None,
        }
    }

    #[test]
    fn folds_case_variants_into_one_group() {
        let records = vec![record("a", Some("Iraq")), record("b", Some("iraq"))];
        let groups = aggregate(&records, &RegionResolver::new());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Iraq");
        assert_eq!(groups[0].count(), 2);
        assert_eq!(groups[0].members, vec![0, 1]);
    }

    #[test]
    fn keeps_first_seen_order_and_single_member_groups() {
        let records = vec![
            record("a", Some("Germany")),
            record("b", Some("Japan")),
            record("c", Some("germany")),
            record("d", Some("Kenya")),
        ];
        let names = aggregate(&records, &RegionResolver::new())
            .into_iter()
            .map(|group| (group.name, group.members.len()))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                ("Germany".to_string(), 2),
                ("Japan".to_string(), 1),
                ("Kenya".to_string(), 1)
            ]
        );
    }

    #[test]
    fn unmapped_regions_are_reported_not_plotted() {
        let records = vec![
            record("a", None),
            record("b", Some("Atlantis")),
            record("c", Some("Iraq")),
        ];
        let aggregation = aggregate_with_diagnostics(&records, &RegionResolver::new());
        assert_eq!(aggregation.groups.len(), 1);
        let unmapped = aggregation
            .unmapped
            .iter()
            .map(|group| group.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(unmapped, vec!["Unknown", "Atlantis"]);
    }

    #[test]
    fn counts_sum_to_mapped_records() {
        let labels = [
            Some("Iraq"),
            Some("iran"),
            None,
            Some("USA"),
            Some("Nowhere"),
            Some("usa"),
            Some("India"),
        ];
        let records = labels
            .iter()
            .enumerate()
            .map(|(index, label)| record(&format!("h{}", index), *label))
            .collect::<Vec<_>>();
        let resolver = RegionResolver::new();
        let total: usize = aggregate(&records, &resolver).iter().map(|group| group.count()).sum();
        let mapped = records
            .iter()
            .filter(|record| resolver.resolve(record.location_label.as_deref()).mapped)
            .count();
        assert_eq!(total, mapped);
        assert_eq!(total, 5);
    }
}
