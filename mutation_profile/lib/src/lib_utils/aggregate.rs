/*
    Roll column frequencies up into mutation summaries
        Pooled: one row per (scope, position)
            mutation mass = non-gap residues that differ from the reference
            conserved mass = reference residue and gaps
        With residue: one row per observed residue at (scope, position)
        Domain and genome rollups of the pooled rows
    Gap mass counts as conserved here, unlike the per-column classification.
*/

use log::debug;

use super::frequency::ColumnFrequency;
use super::residue::Classification;

pub const GENOME_DOMAIN: &str = "genome";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    Pooled,
    WithResidue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationSummary {
    pub scope: String,
    pub position: usize,
    pub domain: String,
    pub reference_residue: u8,
    // Observed residue, only set in `WithResidue` mode.
    pub residue: Option<u8>,
    pub genomes: usize,
    pub mutated_genomes: usize,
    pub conserved_genomes: usize,
    pub mutation_percentage: f64,
    pub conserved_percentage: f64,
}

fn counts_as_mutation(residue: u8, reference: u8) -> bool {
    match Classification::of(residue, reference) {
        Classification::Mutation => true,
        Classification::Conserved | Classification::Missing => false,
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

fn summary_row(column: &ColumnFrequency, residue: Option<u8>, mutated: usize, conserved: usize) -> MutationSummary {
    MutationSummary {
        scope: column.scope.clone(),
        position: column.position,
        domain: column.domain.clone(),
        reference_residue: column.reference_residue,
        residue,
        genomes: column.depth,
        mutated_genomes: mutated,
        conserved_genomes: conserved,
        mutation_percentage: percentage(mutated, column.depth),
        conserved_percentage: percentage(conserved, column.depth),
    }
}

pub fn pooled(columns: &[ColumnFrequency]) -> Vec<MutationSummary> {
    columns
        .iter()
        .map(|column| {
            let mutated: usize = column
                .counts
                .iter()
                .filter(|&(&residue, _)| counts_as_mutation(residue, column.reference_residue))
                .map(|(_, &count)| count)
                .sum();
            summary_row(column, None, mutated, column.depth - mutated)
        })
        .collect()
}

pub fn with_residues(columns: &[ColumnFrequency]) -> Vec<MutationSummary> {
    columns
        .iter()
        .flat_map(|column| {
            column.counts.iter().map(move |(&residue, &count)| {
                if counts_as_mutation(residue, column.reference_residue) {
                    summary_row(column, Some(residue), count, 0)
                } else {
                    summary_row(column, Some(residue), 0, count)
                }
            })
        })
        .collect()
}

pub fn aggregate(columns: &[ColumnFrequency], mode: AggregationMode) -> Vec<MutationSummary> {
    match mode {
        AggregationMode::Pooled => pooled(columns),
        AggregationMode::WithResidue => with_residues(columns),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainSummary {
    pub scope: String,
    pub domain: String,
    pub positions: usize,
    pub mutated_positions: usize,
    pub mean_mutation_percentage: f64,
    pub max_mutation_percentage: f64,
}

impl DomainSummary {
    fn empty(scope: &str, domain: &str) -> Self {
        Self {
            scope: scope.to_string(),
            domain: domain.to_string(),
            positions: 0,
            mutated_positions: 0,
            mean_mutation_percentage: 0.0,
            max_mutation_percentage: 0.0,
        }
    }

    fn add(&mut self, row: &MutationSummary) {
        self.positions += 1;
        if row.mutated_genomes > 0 {
            self.mutated_positions += 1;
        }
        // running sum, divided in finish()
        self.mean_mutation_percentage += row.mutation_percentage;
        self.max_mutation_percentage = self.max_mutation_percentage.max(row.mutation_percentage);
    }

    fn finish(mut self) -> Self {
        if self.positions > 0 {
            self.mean_mutation_percentage /= self.positions as f64;
        }
        self
    }
}

fn rollup<'a, F>(pooled: &'a [MutationSummary], key: F) -> Vec<DomainSummary>
where
    F: Fn(&'a MutationSummary) -> &'a str,
{
    let mut summaries: Vec<DomainSummary> = Vec::new();
    for row in pooled.iter().filter(|row| row.residue.is_none()) {
        let domain = key(row);
        let idx = match summaries
            .iter()
            .position(|s| s.scope == row.scope && s.domain == domain)
        {
            Some(idx) => idx,
            None => {
                summaries.push(DomainSummary::empty(&row.scope, domain));
                summaries.len() - 1
            }
        };
        summaries[idx].add(row);
    }
    summaries.into_iter().map(DomainSummary::finish).collect()
}

// Per (scope, domain) rollup in order of first appearance. Residue rows are ignored.
pub fn summarize_domains(pooled: &[MutationSummary]) -> Vec<DomainSummary> {
    let summaries = rollup(pooled, |row| row.domain.as_str());
    debug!("Summarised {} domain rows", summaries.len());
    summaries
}

pub fn summarize_genome(pooled: &[MutationSummary]) -> Vec<DomainSummary> {
    rollup(pooled, |_| GENOME_DOMAIN)
}
