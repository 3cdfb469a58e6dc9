/*
    Mutation profiling of a protein multiple sequence alignment against a reference
        load: read the alignment and enforce equal lengths and a valid alphabet
        filter: drop gap-heavy sequences and excluded hosts, never the reference
        group: split sequences into variant scopes from metadata
        count: residue frequencies at every column for every scope
        consensus: majority residue per column, gaps do not vote
        aggregate: mutation / conserved percentages per position, domain and genome
*/

pub mod lib_utils;

pub use lib_utils::aggregate::{
    aggregate, pooled, summarize_domains, summarize_genome, with_residues, AggregationMode, DomainSummary,
    MutationSummary, GENOME_DOMAIN,
};
pub use lib_utils::alignment::{Alignment, AlignmentFormat, Sequence};
pub use lib_utils::consensus::{build_consensus, consensus_from_frequencies, consensus_sequence, ConsensusRecord};
pub use lib_utils::domain::{DomainMap, DomainRange, UNANNOTATED_DOMAIN};
pub use lib_utils::errors::{MsaError, Result};
pub use lib_utils::filter::{gap_fraction, GapReport, SequenceFilter};
pub use lib_utils::frequency::{
    compute_column_frequencies, reportable_mutations, round_frequency, ColumnFrequency, ReportableMutation,
    ResidueFrequency, DEFAULT_MIN_KEEP_FREQUENCY,
};
pub use lib_utils::pipeline::{
    Pipeline, PipelineConfig, PipelineOutput, PreparedRun, ScopeReport, DEFAULT_MAX_GAP_FRACTION,
};
pub use lib_utils::residue::{Classification, AMBIGUOUS, GAP};
pub use lib_utils::variant::{
    excluded_by_host, host_is, variant_groups_of, SampleMetadata, VariantGroup, VariantScope, ALL_SCOPE,
};
