/*
    Write the profile tables of one alignment
        <alignment>_<suffix>_frequencies.tsv     residue frequencies per scope and position
        <alignment>_<suffix>_consensus.tsv       consensus residue per scope and position
        <alignment>_<suffix>_consensus.fasta     consensus sequence per scope
        <alignment>_<suffix>_mutations.tsv       pooled mutation / conserved percentages
        <alignment>_<suffix>_residues.tsv        the same, split by observed residue
        <alignment>_<suffix>_domains.tsv         domain and genome rollups
        <alignment>_<suffix>_reportable.tsv      mutations above the frequency threshold
    Frequencies and percentages are rounded to three decimals here and nowhere else.
*/

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::info;
use msa_core::{consensus_sequence, round_frequency, MutationSummary, PipelineOutput};
use serde::Serialize;

pub struct ReportWriter {
    alignment_path: PathBuf,
    suffix: String,
    delimiter: u8,
}

#[derive(Serialize)]
struct FrequencyRow<'a> {
    scope: &'a str,
    position: usize,
    domain: &'a str,
    reference: char,
    residue: char,
    count: usize,
    frequency: f64,
    classification: &'static str,
}

#[derive(Serialize)]
struct ConsensusRow<'a> {
    scope: &'a str,
    position: usize,
    domain: &'a str,
    reference: char,
    consensus: char,
    support: f64,
    classification: &'static str,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    scope: &'a str,
    position: usize,
    domain: &'a str,
    reference: char,
    residue: Option<char>,
    genomes: usize,
    mutated_genomes: usize,
    conserved_genomes: usize,
    mutation_percentage: f64,
    conserved_percentage: f64,
}

impl<'a> From<&'a MutationSummary> for SummaryRow<'a> {
    fn from(row: &'a MutationSummary) -> Self {
        Self {
            scope: &row.scope,
            position: row.position,
            domain: &row.domain,
            reference: row.reference_residue as char,
            residue: row.residue.map(|r| r as char),
            genomes: row.genomes,
            mutated_genomes: row.mutated_genomes,
            conserved_genomes: row.conserved_genomes,
            mutation_percentage: round_frequency(row.mutation_percentage),
            conserved_percentage: round_frequency(row.conserved_percentage),
        }
    }
}

#[derive(Serialize)]
struct DomainRow<'a> {
    scope: &'a str,
    domain: &'a str,
    positions: usize,
    mutated_positions: usize,
    mean_mutation_percentage: f64,
    max_mutation_percentage: f64,
}

#[derive(Serialize)]
struct ReportableRow<'a> {
    scope: &'a str,
    position: usize,
    domain: &'a str,
    reference: char,
    residue: char,
    count: usize,
    frequency: f64,
}

impl ReportWriter {
    pub fn new(alignment_path: &Path, suffix: &str, delimiter: char) -> Self {
        Self {
            alignment_path: alignment_path.to_path_buf(),
            suffix: suffix.to_string(),
            // the argument parser only lets ASCII delimiters through
            delimiter: delimiter as u8,
        }
    }

    // `<alignment>_<suffix>_<table>.<extension>` next to the alignment.
    pub fn output_path(&self, table: &str, extension: &str) -> PathBuf {
        let mut name = OsString::from(self.alignment_path.as_os_str());
        name.push(format!("_{}_{}.{}", self.suffix, table, extension));
        PathBuf::from(name)
    }

    fn table<T, I>(&self, table: &str, rows: I) -> Result<PathBuf>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let path = self.output_path(table, "tsv");
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(&path)
            .with_context(|| format!("Unable to create {:?}", path))?;
        let mut count = 0usize;
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Unable to write to {:?}", path))?;
            count += 1;
        }
        writer.flush().with_context(|| format!("Unable to write to {:?}", path))?;
        info!("Wrote {} rows to {:?}", count, path);
        Ok(path)
    }

    pub fn write_all(&self, output: &PipelineOutput) -> Result<Vec<PathBuf>> {
        let reports = &output.reports;
        let mut written = Vec::new();

        written.push(self.table(
            "frequencies",
            reports.iter().flat_map(|report| {
                report.frequencies.iter().flat_map(|column| {
                    column.observations().map(move |obs| FrequencyRow {
                        scope: &column.scope,
                        position: column.position,
                        domain: &column.domain,
                        reference: column.reference_residue as char,
                        residue: obs.residue as char,
                        count: obs.count,
                        frequency: round_frequency(obs.frequency),
                        classification: obs.classification.as_str(),
                    })
                })
            }),
        )?);

        written.push(self.table(
            "consensus",
            reports.iter().flat_map(|report| {
                report.consensus.iter().map(|record| ConsensusRow {
                    scope: &record.scope,
                    position: record.position,
                    domain: &record.domain,
                    reference: record.reference_residue as char,
                    consensus: record.consensus_residue as char,
                    support: round_frequency(record.support),
                    classification: record.classification.as_str(),
                })
            }),
        )?);

        written.push(self.table(
            "mutations",
            reports.iter().flat_map(|report| report.pooled.iter().map(SummaryRow::from)),
        )?);

        written.push(self.table(
            "residues",
            reports.iter().flat_map(|report| report.with_residue.iter().map(SummaryRow::from)),
        )?);

        written.push(self.table(
            "domains",
            reports.iter().flat_map(|report| {
                report
                    .domain_summaries
                    .iter()
                    .chain(report.genome_summary.iter())
                    .map(|summary| DomainRow {
                        scope: &summary.scope,
                        domain: &summary.domain,
                        positions: summary.positions,
                        mutated_positions: summary.mutated_positions,
                        mean_mutation_percentage: round_frequency(summary.mean_mutation_percentage),
                        max_mutation_percentage: round_frequency(summary.max_mutation_percentage),
                    })
            }),
        )?);

        written.push(self.table(
            "reportable",
            reports.iter().flat_map(|report| {
                report.reportable.iter().map(|mutation| ReportableRow {
                    scope: &mutation.scope,
                    position: mutation.position,
                    domain: &mutation.domain,
                    reference: mutation.reference_residue as char,
                    residue: mutation.residue as char,
                    count: mutation.count,
                    frequency: round_frequency(mutation.frequency),
                })
            }),
        )?);

        written.push(self.consensus_fasta(output)?);
        Ok(written)
    }

    fn consensus_fasta(&self, output: &PipelineOutput) -> Result<PathBuf> {
        let path = self.output_path("consensus", "fasta");
        let out_file = File::create(&path).with_context(|| format!("Unable to create {:?}", path))?;
        let mut fasta_writer = BufWriter::new(out_file);
        for report in &output.reports {
            writeln!(fasta_writer, ">{}_consensus\n{}", report.scope, consensus_sequence(&report.consensus))
                .with_context(|| format!("Unable to write to {:?}", path))?;
        }
        fasta_writer.flush().with_context(|| format!("Unable to write to {:?}", path))?;
        info!("Output file: {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msa_core::{host_is, Alignment, DomainMap, Pipeline, PipelineConfig};
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn writes_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let alignment_path = dir.path().join("spike.fasta");
        let alignment = Alignment::from_rows([("REF", "A-CDE"), ("seq1", "ACCDE"), ("seq2", "A-CD-")]).unwrap();
        // keep seq2 (2 of 5 columns are gaps) so both rows reach the tables
        let mut config = PipelineConfig::new("REF");
        config.max_gap_fraction = 1.0;
        let output = Pipeline::new(config)
            .run(&alignment, &[], DomainMap::unannotated(5).unwrap(), host_is("Human"))
            .unwrap();

        let writer = ReportWriter::new(&alignment_path, "profile", '\t');
        let written = writer.write_all(&output).unwrap();
        assert_eq!(written.len(), 7);

        let frequencies = fs::read_to_string(writer.output_path("frequencies", "tsv")).unwrap();
        let mut lines = frequencies.lines();
        assert_eq!(
            lines.next().unwrap(),
            "scope\tposition\tdomain\treference\tresidue\tcount\tfrequency\tclassification"
        );
        assert!(frequencies.contains("all\t2\tprotein\t-\tC\t1\t0.5\tmutation"));
        assert!(frequencies.contains("all\t2\tprotein\t-\t-\t1\t0.5\tmissing"));

        assert_eq!(output.reports[0].sequences, 2);

        // the gap in seq2 does not vote, seq1 decides positions 2 and 5
        let fasta = fs::read_to_string(writer.output_path("consensus", "fasta")).unwrap();
        assert_eq!(fasta, ">all_consensus\nACCDE\n");
    }

    #[test]
    fn output_names_follow_the_alignment() {
        let writer = ReportWriter::new(Path::new("/data/spike.fasta"), "run1", ',');
        assert_eq!(
            writer.output_path("domains", "tsv"),
            PathBuf::from("/data/spike.fasta_run1_domains.tsv")
        );
    }
}
