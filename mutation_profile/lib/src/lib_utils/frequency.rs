/*
    Genotype frequencies per alignment column
        Subset the alignment to the variant group
        Count the occurrence of each residue at every position
        Attach the reference residue and domain while building the record
    Frequencies keep full precision, round only when presenting.
*/

use std::collections::BTreeMap;
use log::{debug, trace};

use super::alignment::{Alignment, Sequence};
use super::domain::DomainMap;
use super::errors::{MsaError, Result};
use super::residue::{is_gap, Classification};
use super::variant::VariantGroup;

pub const DEFAULT_MIN_KEEP_FREQUENCY: f64 = 0.02;
const DISPLAY_DECIMALS: i32 = 3;

pub fn round_frequency(value: f64) -> f64 {
    let factor = 10f64.powi(DISPLAY_DECIMALS);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResidueFrequency {
    pub residue: u8,
    pub count: usize,
    pub frequency: f64,
    pub classification: Classification,
}

impl ResidueFrequency {
    // Worth surfacing: a mutation seen at or above `min_frequency`.
    pub fn keep(&self, min_frequency: f64) -> bool {
        self.classification == Classification::Mutation && self.frequency >= min_frequency
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFrequency {
    pub scope: String,
    pub position: usize,
    pub domain: String,
    pub reference_residue: u8,
    // Number of sequences counted at this position.
    pub depth: usize,
    pub counts: BTreeMap<u8, usize>,
}

impl ColumnFrequency {
    pub fn frequency(&self, residue: u8) -> f64 {
        match self.counts.get(&residue) {
            Some(&count) if self.depth > 0 => count as f64 / self.depth as f64,
            _ => 0.0,
        }
    }

    pub fn frequencies(&self) -> BTreeMap<u8, f64> {
        self.counts
            .keys()
            .map(|&residue| (residue, self.frequency(residue)))
            .collect()
    }

    pub fn observations(&self) -> impl Iterator<Item = ResidueFrequency> + '_ {
        self.counts.iter().map(move |(&residue, &count)| ResidueFrequency {
            residue,
            count,
            frequency: self.frequency(residue),
            classification: Classification::of(residue, self.reference_residue),
        })
    }

    // Most frequent non-gap residue, equal counts resolve to the lower symbol
    pub fn most_frequent_residue(&self) -> Option<(u8, usize)> {
        pick_majority(
            self.counts
                .iter()
                .filter(|&(&r, _)| !is_gap(r))
                .map(|(&r, &c)| (r, c)),
        )
    }

    pub fn residue_depth(&self) -> usize {
        self.counts
            .iter()
            .filter(|&(&r, _)| !is_gap(r))
            .map(|(_, &c)| c)
            .sum()
    }
}

// input must be in ascending symbol order
fn pick_majority<I>(counts: I) -> Option<(u8, usize)>
where
    I: Iterator<Item = (u8, usize)>,
{
    counts.fold(None, |best, (residue, count)| match best {
        Some((_, best_count)) if best_count >= count => best,
        _ => Some((residue, count)),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportableMutation {
    pub scope: String,
    pub position: usize,
    pub domain: String,
    pub reference_residue: u8,
    pub residue: u8,
    pub count: usize,
    pub frequency: f64,
}

pub fn reportable_mutations(columns: &[ColumnFrequency], min_frequency: f64) -> Vec<ReportableMutation> {
    columns
        .iter()
        .flat_map(|column| {
            column
                .observations()
                .filter(move |obs| obs.keep(min_frequency))
                .map(move |obs| ReportableMutation {
                    scope: column.scope.clone(),
                    position: column.position,
                    domain: column.domain.clone(),
                    reference_residue: column.reference_residue,
                    residue: obs.residue,
                    count: obs.count,
                    frequency: obs.frequency,
                })
        })
        .collect()
}

pub(crate) fn check_widths(alignment: &Alignment, domains: &DomainMap, reference: &Sequence) -> Result<()> {
    if domains.width() != alignment.width() {
        return Err(MsaError::Format(format!(
            "domain map covers {} positions but the alignment has {} columns",
            domains.width(),
            alignment.width()
        )));
    }
    if reference.len() != alignment.width() {
        return Err(MsaError::Format(format!(
            "reference '{}' has length {} but the alignment has {} columns",
            reference.id,
            reference.len(),
            alignment.width()
        )));
    }
    Ok(())
}

pub fn compute_column_frequencies(
    alignment: &Alignment,
    group: &VariantGroup,
    domains: &DomainMap,
    reference: &Sequence,
) -> Result<Vec<ColumnFrequency>> {
    check_widths(alignment, domains, reference)?;
    let members = alignment.subset(&group.label, &group.members)?;
    debug!(
        "Counting residues for {} over {} sequences",
        group.label,
        members.len()
    );
    let mut count_vec: Vec<BTreeMap<u8, usize>> = vec![BTreeMap::new(); alignment.width()];
    for sequence in members.sequences() {
        trace!("Counting {}", sequence.id);
        sequence
            .residues
            .iter()
            .zip(count_vec.iter_mut())
            .for_each(|(&residue, column)| update_counts(column, residue));
    }
    count_vec
        .into_iter()
        .zip(reference.residues.iter())
        .enumerate()
        .map(|(idx, (counts, &reference_residue))| -> Result<ColumnFrequency> {
            let position = idx + 1;
            Ok(ColumnFrequency {
                scope: group.label.clone(),
                position,
                domain: domains.domain_for(position)?.to_string(),
                reference_residue,
                depth: members.len(),
                counts,
            })
        })
        .collect()
}

// update counts at given location
fn update_counts(column: &mut BTreeMap<u8, usize>, residue: u8) {
    *column.entry(residue).or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn group(label: &str, ids: &[&str]) -> VariantGroup {
        VariantGroup::new(label, ids.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>())
    }

    fn scenario() -> (Alignment, DomainMap) {
        let aln = Alignment::from_rows([("REF", "A-CDE"), ("seq1", "ACCDE"), ("seq2", "A-CD-")]).unwrap();
        let domains = DomainMap::unannotated(5).unwrap();
        (aln, domains)
    }

    #[test]
    fn gap_reference_column() {
        let (aln, domains) = scenario();
        let reference = aln.reference("REF").unwrap().clone();
        let columns =
            compute_column_frequencies(&aln, &group("v", &["seq1", "seq2"]), &domains, &reference).unwrap();
        let second = &columns[1];
        assert_eq!(second.position, 2);
        assert_eq!(second.reference_residue, b'-');
        assert_eq!(second.frequencies(), BTreeMap::from([(b'-', 0.5), (b'C', 0.5)]));
        let classes: Vec<(u8, Classification)> =
            second.observations().map(|o| (o.residue, o.classification)).collect();
        assert_eq!(
            classes,
            vec![(b'-', Classification::Missing), (b'C', Classification::Mutation)]
        );
    }

    #[test]
    fn frequencies_sum_to_one() {
        let (aln, domains) = scenario();
        let reference = aln.reference("REF").unwrap().clone();
        let columns =
            compute_column_frequencies(&aln, &group("v", &["seq1", "seq2", "REF"]), &domains, &reference).unwrap();
        for column in &columns {
            let total: f64 = column.frequencies().values().sum();
            assert!((total - 1.0).abs() < 1e-9, "position {}", column.position);
        }
    }

    #[test]
    fn ties_resolve_to_lower_symbol() {
        let column = ColumnFrequency {
            scope: "v".to_string(),
            position: 1,
            domain: "d".to_string(),
            reference_residue: b'A',
            depth: 4,
            counts: BTreeMap::from([(b'-', 2), (b'K', 1), (b'D', 1)]),
        };
        assert_eq!(column.most_frequent_residue(), Some((b'D', 1)));
    }

    #[test]
    fn keep_needs_mutation_above_threshold() {
        let (aln, domains) = scenario();
        let reference = aln.reference("REF").unwrap().clone();
        let columns =
            compute_column_frequencies(&aln, &group("v", &["seq1", "seq2"]), &domains, &reference).unwrap();
        let kept = reportable_mutations(&columns, DEFAULT_MIN_KEEP_FREQUENCY);
        assert_eq!(kept.len(), 1);
        assert_eq!((kept[0].position, kept[0].residue), (2, b'C'));
        assert!(reportable_mutations(&columns, 0.6).is_empty());
    }

    #[test]
    fn empty_group_is_reported() {
        let (aln, domains) = scenario();
        let reference = aln.reference("REF").unwrap().clone();
        let err = compute_column_frequencies(&aln, &group("ghost", &["nope"]), &domains, &reference).unwrap_err();
        assert!(matches!(err, MsaError::EmptySubset(label) if label == "ghost"));
    }

    #[test]
    fn mismatched_domain_width_is_rejected() {
        let (aln, _) = scenario();
        let reference = aln.reference("REF").unwrap().clone();
        let domains = DomainMap::unannotated(4).unwrap();
        assert!(matches!(
            compute_column_frequencies(&aln, &group("v", &["seq1"]), &domains, &reference),
            Err(MsaError::Format(_))
        ));
    }

    #[test]
    fn rounding_is_presentation_only() {
        assert_eq!(round_frequency(1.0 / 3.0), 0.333);
        assert_eq!(round_frequency(0.6666), 0.667);
    }
}
