// Variant groups and host exclusion derived from sample metadata

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::{self, Display};
use log::{debug, warn};

use super::alignment::Alignment;

pub const ALL_SCOPE: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMetadata {
    pub id: String,
    pub variant: String,
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantGroup {
    pub label: String,
    pub members: BTreeSet<String>,
}

impl VariantGroup {
    pub fn new(label: impl Into<String>, members: BTreeSet<String>) -> Self {
        Self { label: label.into(), members }
    }

    pub fn all(alignment: &Alignment, reference_id: &str) -> Self {
        let members = alignment
            .ids()
            .filter(|id| *id != reference_id)
            .map(str::to_string)
            .collect();
        Self::new(ALL_SCOPE, members)
    }

    pub fn restricted_to(&self, alignment: &Alignment, reference_id: &str) -> Self {
        let members: BTreeSet<String> = self
            .members
            .iter()
            .filter(|id| id.as_str() != reference_id && alignment.contains(id))
            .cloned()
            .collect();
        if members.len() < self.members.len() {
            debug!(
                "Variant {}: {} of {} members present after filtering",
                self.label,
                members.len(),
                self.members.len()
            );
        }
        Self::new(self.label.clone(), members)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariantScope {
    All,
    Variant(String),
}

impl VariantScope {
    pub fn label(&self) -> &str {
        match self {
            VariantScope::All => ALL_SCOPE,
            VariantScope::Variant(label) => label.as_str(),
        }
    }
}

impl Display for VariantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// Records without a variant label are ignored.
pub fn variant_groups_of(metadata: &[SampleMetadata]) -> Vec<VariantGroup> {
    let mut groups: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    let mut unlabelled = 0usize;
    for record in metadata {
        let label = record.variant.trim();
        if label.is_empty() {
            unlabelled += 1;
            continue;
        }
        groups.entry(label).or_default().insert(record.id.clone());
    }
    if unlabelled > 0 {
        warn!("{} metadata records have no variant label", unlabelled);
    }
    groups
        .into_iter()
        .map(|(label, members)| VariantGroup::new(label, members))
        .collect()
}

pub fn excluded_by_host<P>(metadata: &[SampleMetadata], keep_host: P) -> HashSet<String>
where
    P: Fn(&str) -> bool,
{
    metadata
        .iter()
        .filter(|record| !keep_host(record.host.trim()))
        .map(|record| record.id.clone())
        .collect()
}

pub fn host_is(expected: &str) -> impl Fn(&str) -> bool + '_ {
    move |host: &str| host.eq_ignore_ascii_case(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(id: &str, variant: &str, host: &str) -> SampleMetadata {
        SampleMetadata {
            id: id.to_string(),
            variant: variant.to_string(),
            host: host.to_string(),
        }
    }

    #[test]
    fn groups_by_label() {
        let metadata = vec![
            record("s1", "Omicron", "Human"),
            record("s2", "Delta", "Human"),
            record("s3", "Omicron", "Human"),
            record("s4", "", "Human"),
        ];
        let groups = variant_groups_of(&metadata);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Delta", "Omicron"]);
        assert_eq!(groups[1].members.iter().collect::<Vec<_>>(), vec!["s1", "s3"]);
    }

    #[test]
    fn excludes_other_hosts() {
        let metadata = vec![
            record("s1", "A", "Human"),
            record("s2", "A", "Felis catus"),
            record("s3", "A", "human"),
        ];
        let excluded = excluded_by_host(&metadata, host_is("Human"));
        assert_eq!(excluded, ["s2".to_string()].into_iter().collect());
    }

    #[test]
    fn restriction_drops_missing_ids_and_reference() {
        let aln = Alignment::from_rows([("ref", "AC"), ("s1", "AC")]).unwrap();
        let group = VariantGroup::new(
            "A",
            ["ref", "s1", "gone"].iter().map(|s| s.to_string()).collect(),
        );
        let restricted = group.restricted_to(&aln, "ref");
        assert_eq!(restricted.members.into_iter().collect::<Vec<_>>(), vec!["s1".to_string()]);
        assert_eq!(VariantGroup::all(&aln, "ref").len(), 1);
    }
}
