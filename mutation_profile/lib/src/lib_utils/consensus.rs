// Majority-vote consensus per variant, classified against the reference

use log::debug;

use super::alignment::{Alignment, Sequence};
use super::domain::DomainMap;
use super::errors::Result;
use super::frequency::{compute_column_frequencies, ColumnFrequency};
use super::residue::{Classification, GAP};
use super::variant::VariantGroup;

#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusRecord {
    pub scope: String,
    pub position: usize,
    pub domain: String,
    pub reference_residue: u8,
    pub consensus_residue: u8,
    pub support: f64,
    pub classification: Classification,
}

impl ConsensusRecord {
    // Gaps never win the vote; an all-gap column yields a gap consensus.
    pub fn from_column(column: &ColumnFrequency) -> Self {
        let (consensus_residue, support) = match column.most_frequent_residue() {
            Some((residue, count)) => (residue, count as f64 / column.residue_depth() as f64),
            None => (GAP, 0.0),
        };
        Self {
            scope: column.scope.clone(),
            position: column.position,
            domain: column.domain.clone(),
            reference_residue: column.reference_residue,
            consensus_residue,
            support,
            classification: Classification::of(consensus_residue, column.reference_residue),
        }
    }
}

pub fn consensus_from_frequencies(columns: &[ColumnFrequency]) -> Vec<ConsensusRecord> {
    columns.iter().map(ConsensusRecord::from_column).collect()
}

pub fn build_consensus(
    alignment: &Alignment,
    group: &VariantGroup,
    domains: &DomainMap,
    reference: &Sequence,
) -> Result<Vec<ConsensusRecord>> {
    let columns = compute_column_frequencies(alignment, group, domains, reference)?;
    let records = consensus_from_frequencies(&columns);
    debug!(
        "Consensus for {}: {} mutated positions",
        group.label,
        records
            .iter()
            .filter(|r| r.classification == Classification::Mutation)
            .count()
    );
    Ok(records)
}

pub fn consensus_sequence(records: &[ConsensusRecord]) -> String {
    records.iter().map(|r| r.consensus_residue as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn all_of(aln: &Alignment) -> VariantGroup {
        VariantGroup::all(aln, "ref")
    }

    #[test]
    fn gap_excluded_from_vote() {
        let aln = Alignment::from_rows([
            ("ref", "AACD"),
            ("seq1", "AACD"),
            ("seq2", "AACD"),
            ("seq3", "AAC-"),
        ])
        .unwrap();
        let domains = DomainMap::unannotated(4).unwrap();
        let reference = aln.reference("ref").unwrap().clone();
        let records = build_consensus(&aln, &all_of(&aln), &domains, &reference).unwrap();
        let fourth = &records[3];
        assert_eq!(fourth.consensus_residue, b'D');
        assert_eq!(fourth.classification, Classification::Conserved);
        assert_eq!(fourth.support, 1.0);
        assert_eq!(consensus_sequence(&records), "AACD");
    }

    #[test]
    fn gap_only_column_is_missing() {
        let aln = Alignment::from_rows([("ref", "AK"), ("seq1", "A-"), ("seq2", "A-")]).unwrap();
        let domains = DomainMap::unannotated(2).unwrap();
        let reference = aln.reference("ref").unwrap().clone();
        let records = build_consensus(&aln, &all_of(&aln), &domains, &reference).unwrap();
        assert_eq!(records[1].consensus_residue, GAP);
        assert_eq!(records[1].classification, Classification::Missing);
    }

    #[test]
    fn majority_beats_gaps_and_ties_use_symbol_order() {
        let aln = Alignment::from_rows([
            ("ref", "N"),
            ("s1", "-"),
            ("s2", "-"),
            ("s3", "-"),
            ("s4", "Y"),
            ("s5", "K"),
        ])
        .unwrap();
        let domains = DomainMap::unannotated(1).unwrap();
        let reference = aln.reference("ref").unwrap().clone();
        let records = build_consensus(&aln, &all_of(&aln), &domains, &reference).unwrap();
        assert_eq!(records[0].consensus_residue, b'K');
        assert_eq!(records[0].classification, Classification::Mutation);
        assert_eq!(records[0].support, 0.5);
    }
}
