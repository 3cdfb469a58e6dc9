/*
    Validate protein alignments before profiling
        every record has a header and a sequence
        every sequence has the same length
        every symbol is an amino acid, a gap or X
        the reference, if named, is present

    Report
        gap fraction of every sequence
        whether the gap filter at the given threshold keeps it
*/

use std::path::{Path, PathBuf};
use std::ops::RangeInclusive;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, error, info, warn};
use msa_core::{round_frequency, Alignment, AlignmentFormat, SequenceFilter, DEFAULT_MAX_GAP_FRACTION};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to protein alignment file(s)
    #[arg(short='i', long="infile", required = true, action=clap::ArgAction::Append)]
    input_alignment: Vec<PathBuf>,
    /// Layout of the alignment file. Default: fasta
    #[arg(short='f', long="format", value_enum, default_value_t=Format::Fasta)]
    format: Format,
    /// Identifier of the reference sequence, checked for presence
    #[arg(short='r', long="reference")]
    reference_id: Option<String>,
    /// Maximum fraction of gaps allowed in a sequence. Default: 0.05
    #[arg(short='g', long="max-gap-fraction", value_parser=validate_percent, default_value_t=DEFAULT_MAX_GAP_FRACTION)]
    max_gap_fraction: f64,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Fasta,
    Simple
}

const PERCENTAGE: RangeInclusive<f64> = 0f64..=1f64;

fn validate_percent(input_str: &str) -> Result<f64, String> {
    let percent: f64 = input_str
        .parse()
        .map_err(|_| format!("'{}' is not a number", input_str))?;
    if PERCENTAGE.contains(&percent) {
        Ok(percent)
    } else {
        Err(format!("Threshold not in the range {} - {}", PERCENTAGE.start(), PERCENTAGE.end()))
    }
}

fn check_alignment(file: &Path, cli: &Cli) -> Result<()> {
    let format = match cli.format {
        Format::Fasta => AlignmentFormat::Fasta,
        Format::Simple => AlignmentFormat::Simple,
    };
    let alignment = Alignment::load(file, format)
        .with_context(|| format!("Alignment {:?} failed validation", file))?;
    info!(
        "Alignment complies requirements {:?}: {} sequences, {} columns",
        file,
        alignment.len(),
        alignment.width()
    );
    let reference_id = match &cli.reference_id {
        Some(id) => {
            alignment.reference(id)?;
            debug!("Reference {} found", id);
            id.clone()
        }
        None => String::new(),
    };
    let filter = SequenceFilter::new(reference_id, cli.max_gap_fraction);
    let report = filter.gap_report(&alignment);
    println!("file\tid\tgap_fraction\tretained");
    for row in &report {
        println!(
            "{}\t{}\t{}\t{}",
            file.display(),
            row.id,
            round_frequency(row.gap_fraction),
            row.retained
        );
    }
    let dropped = report.iter().filter(|r| !r.retained).count();
    if dropped > 0 {
        warn!(
            "{} of {} sequences exceed the gap threshold {}",
            dropped,
            report.len(),
            cli.max_gap_fraction
        );
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let mut failed = false;
    for file in &cli.input_alignment {
        debug!("Processing file: {:?}", file);
        if let Err(e) = check_alignment(file, &cli) {
            error!("{:#}", e);
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }
}
