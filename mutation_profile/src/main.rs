/*
Profile mutations of a viral protein alignment against a reference sequence
    + check that every row of the alignment has the same length and a valid alphabet
    + drop sequences with too many gaps and sequences from other hosts
        + the reference is never dropped
    + group sequences by variant using the metadata table
    + for every variant, and for all sequences together
        + residue frequencies at every position
        + consensus sequence
        + % of genomes mutated / conserved at every position, domain and the whole protein

Implement clap to parse cli

Libs
    get arguments
    inputs: read the metadata and domain tables
    profile_alignment: run the pipeline, one threadpool job per variant
    report: write the tables next to the alignment

Arguments
    get path to alignment file
    reference id
*/

mod utils;
use clap::Parser;
use utils::get_args::Cli;
use utils::profile_alignment::report_profile;
use log::{debug, error, info};

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    debug!("Parsing commandline arguments");
    let mut failed = false;
    for file in &cli.input_alignment {
        debug!("Processing file: {:?}", file);
        match report_profile(file, &cli) {
            Ok(()) => info!("Profile complete for {:?}", file),
            Err(e) => {
                error!("Profiling {:?} failed: {:#}", file, e);
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}
