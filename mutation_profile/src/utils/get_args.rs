use clap::{Parser, ValueEnum};
use msa_core::{AlignmentFormat, DEFAULT_MAX_GAP_FRACTION, DEFAULT_MIN_KEEP_FREQUENCY};
use std::ops::RangeInclusive;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to protein alignment file(s)
    #[arg(short='i', long="infile", required = true, action=clap::ArgAction::Append)]
    pub input_alignment: Vec<PathBuf>,
    /// Layout of the alignment file. Default: fasta
    #[arg(short='f', long="format", value_enum, default_value_t=Format::Fasta)]
    pub format: Format,
    /// Identifier of the reference sequence inside the alignment
    #[arg(short='r', long="reference", required = true)]
    pub reference_id: String,
    /// Tab separated metadata with the columns id, variant and host
    #[arg(short='M', long="metadata")]
    pub metadata: Option<PathBuf>,
    /// Tab separated domain table with the columns start, end and name
    #[arg(short='D', long="domains")]
    pub domains: Option<PathBuf>,
    /// Host to keep, sequences from other hosts are removed. Default: "Human"
    #[arg(long="host", default_value_t=String::from("Human"))]
    pub host: String,
    /// Maximum fraction of gaps allowed in a sequence. Default: 0.05
    #[arg(short='g', long="max-gap-fraction", value_parser=validate_percent, default_value_t=DEFAULT_MAX_GAP_FRACTION)]
    pub max_gap_fraction: f64,
    /// Minimum frequency for a mutation to be reported. Default: 0.02
    #[arg(short='k', long="min-frequency", value_parser=validate_percent, default_value_t=DEFAULT_MIN_KEEP_FREQUENCY)]
    pub min_keep_frequency: f64,
    /// Skip the pooled "all" scope and only profile variants
    #[arg(long="no-all")]
    pub no_all: bool,
    /// Suffix appended to the alignment file name for every table. Default: "profile"
    #[arg(short='s', long="output-suffix", default_value_t=String::from("profile"))]
    pub output_suffix: String,
    /// Column delimiter of the output tables. Default: tab
    #[arg(short='d', long="delimiter", value_parser=validate_delimiter, default_value_t='\t')]
    pub delimiter: char,
    /// Number of worker threads used to profile variants
    #[arg(short='n', long="threads", default_value_t=4)]
    pub nproc: usize
}

const PERCENTAGE: RangeInclusive<f64> = 0f64..=1f64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Format {
    Fasta,
    Simple
}

impl From<Format> for AlignmentFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Fasta => AlignmentFormat::Fasta,
            Format::Simple => AlignmentFormat::Simple,
        }
    }
}

fn validate_percent(input_str: &str) -> Result<f64, String> {
    let percent: f64 = input_str
        .parse()
        .map_err(|_| format!("'{}' is not a number", input_str))?;
    if PERCENTAGE.contains(&percent) {
        Ok(percent)
    } else {
        Err(
            format!("Threshold not in the range {} - {}",PERCENTAGE.start(), PERCENTAGE.end())
        )
    }
}

fn validate_delimiter(input_str: &str) -> Result<char, String> {
    let delimiter = match input_str {
        "\\t" | "tab" => '\t',
        x if x.chars().count() == 1 => x.chars().next().unwrap_or('\t'),
        _ => return Err(format!("Delimiter must be a single character, got '{}'", input_str)),
    };
    if delimiter.is_ascii() {
        Ok(delimiter)
    } else {
        Err(format!("Delimiter must be an ASCII character, got '{}'", delimiter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", Some(0.0))]
    #[case("0.1", Some(0.1))]
    #[case("1", Some(1.0))]
    #[case("1.5", None)]
    #[case("abc", None)]
    fn fractions_are_range_checked(#[case] input: &str, #[case] expected: Option<f64>) {
        assert_eq!(validate_percent(input).ok(), expected);
    }

    #[rstest]
    #[case("\\t", Some('\t'))]
    #[case("tab", Some('\t'))]
    #[case(",", Some(','))]
    #[case(";;", None)]
    #[case("é", None)]
    fn delimiters(#[case] input: &str, #[case] expected: Option<char>) {
        assert_eq!(validate_delimiter(input).ok(), expected);
    }

    #[rstest]
    fn parses_a_full_command_line() {
        let cli = Cli::try_parse_from([
            "mutation_profile", "-i", "spike.fasta", "-r", "Wuhan-Hu-1", "-M", "meta.tsv", "-g", "0.1", "--no-all",
        ])
        .unwrap();
        assert_eq!(cli.reference_id, "Wuhan-Hu-1");
        assert_eq!(cli.max_gap_fraction, 0.1);
        assert_eq!(cli.min_keep_frequency, DEFAULT_MIN_KEEP_FREQUENCY);
        assert_eq!(cli.format, Format::Fasta);
        assert!(cli.no_all);
        assert_eq!(cli.delimiter, '\t');
    }
}
