// Readers for the tab separated metadata and domain tables

use std::path::Path;
use anyhow::{Context, Result};
use log::{debug, info};
use msa_core::{DomainMap, DomainRange, SampleMetadata};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MetadataRow {
    id: String,
    #[serde(default)]
    variant: String,
    #[serde(default)]
    host: String,
}

#[derive(Debug, Deserialize)]
struct DomainRow {
    start: usize,
    end: usize,
    name: String,
}

fn tsv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Unable to open {:?}", path))
}

// Reads `id`, `variant` and `host` columns; other columns are ignored.
pub fn read_metadata(path: &Path) -> Result<Vec<SampleMetadata>> {
    let mut reader = tsv_reader(path)?;
    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<MetadataRow>().enumerate() {
        // header is line 1
        let row = row.with_context(|| format!("Malformed metadata at line {} of {:?}", idx + 2, path))?;
        records.push(SampleMetadata {
            id: row.id,
            variant: row.variant,
            host: row.host,
        });
    }
    info!("Read {} metadata records from {:?}", records.len(), path);
    Ok(records)
}

// Domain table from `path`, or a single domain over the whole alignment.
pub fn read_domains(path: Option<&Path>, width: usize) -> Result<DomainMap> {
    let Some(path) = path else {
        debug!("No domain table given, using one domain over {} positions", width);
        return Ok(DomainMap::unannotated(width)?);
    };
    let mut reader = tsv_reader(path)?;
    let mut ranges = Vec::new();
    for (idx, row) in reader.deserialize::<DomainRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed domain at line {} of {:?}", idx + 2, path))?;
        ranges.push(DomainRange::new(row.start, row.end, row.name));
    }
    let domains = DomainMap::new(ranges, width).with_context(|| format!("Domain table {:?}", path))?;
    info!("Read {} domains from {:?}", domains.ranges().len(), path);
    Ok(domains)
}
