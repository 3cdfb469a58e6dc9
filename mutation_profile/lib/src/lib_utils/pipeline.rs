/*
    One profiling run
        prepare: filter the alignment, locate the reference, build the scopes
        analyse: for every scope compute
            column frequencies
            consensus
            pooled and per-residue mutation summaries
            domain and genome rollups
            reportable mutations
    An empty variant group skips that scope only. Anything else aborts the run.
*/

use std::collections::HashSet;
use log::{debug, info, warn};

use super::aggregate::{aggregate, summarize_domains, summarize_genome, AggregationMode, DomainSummary, MutationSummary};
use super::alignment::{Alignment, Sequence};
use super::consensus::{consensus_from_frequencies, ConsensusRecord};
use super::domain::DomainMap;
use super::errors::{MsaError, Result};
use super::filter::SequenceFilter;
use super::frequency::{
    check_widths, compute_column_frequencies, reportable_mutations, ColumnFrequency, ReportableMutation,
    DEFAULT_MIN_KEEP_FREQUENCY,
};
use super::variant::{excluded_by_host, variant_groups_of, SampleMetadata, VariantGroup, VariantScope};

pub const DEFAULT_MAX_GAP_FRACTION: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub reference_id: String,
    pub max_gap_fraction: f64,
    pub min_keep_frequency: f64,
    pub include_all_scope: bool,
}

impl PipelineConfig {
    pub fn new(reference_id: impl Into<String>) -> Self {
        Self {
            reference_id: reference_id.into(),
            max_gap_fraction: DEFAULT_MAX_GAP_FRACTION,
            min_keep_frequency: DEFAULT_MIN_KEEP_FREQUENCY,
            include_all_scope: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub alignment: Alignment,
    pub reference: Sequence,
    pub domains: DomainMap,
    pub scopes: Vec<(VariantScope, VariantGroup)>,
    pub min_keep_frequency: f64,
}

#[derive(Debug, Clone)]
pub struct ScopeReport {
    pub scope: VariantScope,
    pub sequences: usize,
    pub frequencies: Vec<ColumnFrequency>,
    pub consensus: Vec<ConsensusRecord>,
    pub pooled: Vec<MutationSummary>,
    pub with_residue: Vec<MutationSummary>,
    pub domain_summaries: Vec<DomainSummary>,
    pub genome_summary: Vec<DomainSummary>,
    pub reportable: Vec<ReportableMutation>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub reports: Vec<ScopeReport>,
    pub skipped: Vec<String>,
}

impl PipelineOutput {
    // Keeps successful reports in the given order, records empty scopes and
    // fails on the first other error.
    pub fn from_results<I>(results: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<ScopeReport>>,
    {
        let mut output = PipelineOutput::default();
        for result in results {
            match result {
                Ok(report) => output.reports.push(report),
                Err(MsaError::EmptySubset(label)) => {
                    warn!("Skipping variant {}: no sequences survived filtering", label);
                    output.skipped.push(label);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(output)
    }
}

impl PreparedRun {
    pub fn analyse_scope(&self, idx: usize) -> Result<ScopeReport> {
        let (scope, group) = self.scopes.get(idx).ok_or_else(|| {
            MsaError::Range(format!("scope index {} outside 0..{}", idx, self.scopes.len()))
        })?;
        let frequencies = compute_column_frequencies(&self.alignment, group, &self.domains, &self.reference)?;
        let pooled_rows = aggregate(&frequencies, AggregationMode::Pooled);
        let report = ScopeReport {
            scope: scope.clone(),
            sequences: group.len(),
            consensus: consensus_from_frequencies(&frequencies),
            with_residue: aggregate(&frequencies, AggregationMode::WithResidue),
            domain_summaries: summarize_domains(&pooled_rows),
            genome_summary: summarize_genome(&pooled_rows),
            reportable: reportable_mutations(&frequencies, self.min_keep_frequency),
            pooled: pooled_rows,
            frequencies,
        };
        debug!(
            "Scope {}: {} sequences, {} reportable mutations",
            scope,
            report.sequences,
            report.reportable.len()
        );
        Ok(report)
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    pub config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn prepare<P>(
        &self,
        alignment: &Alignment,
        metadata: &[SampleMetadata],
        domains: DomainMap,
        keep_host: P,
    ) -> Result<PreparedRun>
    where
        P: Fn(&str) -> bool,
    {
        let reference_id = self.config.reference_id.as_str();
        let reference = alignment.reference(reference_id)?.clone();
        check_widths(alignment, &domains, &reference)?;

        let excluded: HashSet<String> = excluded_by_host(metadata, keep_host);
        let filter = SequenceFilter::new(reference_id, self.config.max_gap_fraction);
        let filtered = filter.apply(alignment, &excluded)?;
        // guards against a filter ever dropping the reference
        filtered.reference(reference_id)?;

        let mut scopes = Vec::new();
        if self.config.include_all_scope {
            scopes.push((VariantScope::All, VariantGroup::all(&filtered, reference_id)));
        }
        for group in variant_groups_of(metadata) {
            let restricted = group.restricted_to(&filtered, reference_id);
            scopes.push((VariantScope::Variant(group.label.clone()), restricted));
        }
        info!(
            "Prepared {} scopes over {} sequences",
            scopes.len(),
            filtered.len()
        );
        Ok(PreparedRun {
            alignment: filtered,
            reference,
            domains,
            scopes,
            min_keep_frequency: self.config.min_keep_frequency,
        })
    }

    pub fn run<P>(
        &self,
        alignment: &Alignment,
        metadata: &[SampleMetadata],
        domains: DomainMap,
        keep_host: P,
    ) -> Result<PipelineOutput>
    where
        P: Fn(&str) -> bool,
    {
        let prepared = self.prepare(alignment, metadata, domains, keep_host)?;
        PipelineOutput::from_results((0..prepared.scopes.len()).map(|idx| prepared.analyse_scope(idx)))
    }
}
