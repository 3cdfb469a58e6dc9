/*
    Profile mutations of one alignment file
        Load the alignment and the optional metadata / domain tables
        Filter the alignment and build the variant scopes
        Hand every scope to the threadpool
        Collect the scope reports in scope order
        Write the tables
*/

use std::path::Path;
use std::sync::{mpsc, Arc};
use anyhow::{bail, Context, Result};
use log::{debug, error, info};
use msa_core::{host_is, Alignment, Pipeline, PipelineConfig, PipelineOutput, PreparedRun, ScopeReport};
use threadpool::ThreadPool;
use super::get_args::Cli;
use super::inputs::{read_domains, read_metadata};
use super::report::ReportWriter;

pub fn pipeline_config(cli: &Cli) -> PipelineConfig {
    let mut config = PipelineConfig::new(cli.reference_id.clone());
    config.max_gap_fraction = cli.max_gap_fraction;
    config.min_keep_frequency = cli.min_keep_frequency;
    config.include_all_scope = !cli.no_all;
    config
}

pub fn report_profile(file: &Path, cli: &Cli) -> Result<()> {
    let alignment = Alignment::load(file, cli.format.into())
        .with_context(|| format!("Alignment {:?} could not be loaded", file))?;
    let metadata = match &cli.metadata {
        Some(path) => read_metadata(path)?,
        None => {
            info!("No metadata given, profiling every sequence as one scope");
            Vec::new()
        }
    };
    let domains = read_domains(cli.domains.as_deref(), alignment.width())?;
    let prepared = Pipeline::new(pipeline_config(cli))
        .prepare(&alignment, &metadata, domains, host_is(&cli.host))
        .with_context(|| format!("Filtering {:?} failed", file))?;
    info!("Positions initialised");
    let output = process_scopes(prepared, cli.nproc)?;
    if !output.skipped.is_empty() {
        info!("Variants without sequences: {}", output.skipped.join(", "));
    }
    ReportWriter::new(file, &cli.output_suffix, cli.delimiter).write_all(&output)?;
    Ok(())
}

// Analyse every scope on the threadpool, reassemble in scope order
pub fn process_scopes(prepared: PreparedRun, nproc: usize) -> Result<PipelineOutput> {
    let scope_count = prepared.scopes.len();
    let shared_run = Arc::new(prepared);
    let pool = ThreadPool::new(nproc.max(1));
    let (sender, receiver) = mpsc::channel::<(usize, msa_core::Result<ScopeReport>)>();
    for idx in 0..scope_count {
        let run = Arc::clone(&shared_run);
        let sender = sender.clone();
        debug!("Processing scope {}", run.scopes[idx].0);
        pool.execute(move || {
            let result = run.analyse_scope(idx);
            if sender.send((idx, result)).is_err() {
                error!("Report of scope {} could not be collected", idx);
            }
        });
    }
    drop(sender);
    pool.join();
    info!("Threadpool jobs complete");
    let mut results: Vec<(usize, msa_core::Result<ScopeReport>)> = receiver.iter().collect();
    if results.len() != scope_count {
        bail!(
            "{} of {} scope analyses did not finish",
            scope_count - results.len(),
            scope_count
        );
    }
    results.sort_by_key(|(idx, _)| *idx);
    Ok(PipelineOutput::from_results(results.into_iter().map(|(_, result)| result))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use msa_core::{DomainMap, SampleMetadata, VariantScope};
    use pretty_assertions::assert_eq;

    fn record(id: &str, variant: &str) -> SampleMetadata {
        SampleMetadata { id: id.to_string(), variant: variant.to_string(), host: "Human".to_string() }
    }

    #[test]
    fn pool_matches_sequential_run() {
        let alignment = Alignment::from_rows([
            ("REF", "MFVFL"),
            ("a1", "MFVFL"),
            ("a2", "MFIFL"),
            ("b1", "MYVFL"),
            ("b2", "MYVF-"),
        ])
        .unwrap();
        let metadata = vec![record("a1", "A"), record("a2", "A"), record("b1", "B"), record("b2", "B"), record("c1", "C")];
        let pipeline = Pipeline::new(PipelineConfig::new("REF"));
        let domains = DomainMap::unannotated(5).unwrap();

        let sequential = pipeline.run(&alignment, &metadata, domains.clone(), host_is("Human")).unwrap();
        let prepared = pipeline.prepare(&alignment, &metadata, domains, host_is("Human")).unwrap();
        let pooled = process_scopes(prepared, 3).unwrap();

        let scopes: Vec<VariantScope> = pooled.reports.iter().map(|r| r.scope.clone()).collect();
        assert_eq!(
            scopes,
            sequential.reports.iter().map(|r| r.scope.clone()).collect::<Vec<_>>()
        );
        assert_eq!(pooled.skipped, vec!["C".to_string()]);
        for (left, right) in pooled.reports.iter().zip(sequential.reports.iter()) {
            assert_eq!(left.frequencies, right.frequencies);
            assert_eq!(left.pooled, right.pooled);
        }
    }
}
