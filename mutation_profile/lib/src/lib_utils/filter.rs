/*
    Remove sequences before profiling
        gap filter: drop rows whose gap fraction is above the threshold
        exclusion filter: drop rows listed in an exclusion set (e.g. non-human hosts)
    The reference row is never removed by either filter.
*/

use std::collections::HashSet;
use log::{debug, info};

use super::alignment::{Alignment, Sequence};
use super::errors::Result;
use super::residue::is_gap;

pub fn gap_fraction(sequence: &Sequence) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let gaps = sequence.residues.iter().filter(|&&r| is_gap(r)).count();
    gaps as f64 / sequence.len() as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct GapReport {
    pub id: String,
    pub gap_fraction: f64,
    pub retained: bool,
}

#[derive(Debug, Clone)]
pub struct SequenceFilter {
    pub reference_id: String,
    pub max_gap_fraction: f64,
}

impl SequenceFilter {
    pub fn new(reference_id: impl Into<String>, max_gap_fraction: f64) -> Self {
        Self {
            reference_id: reference_id.into(),
            max_gap_fraction,
        }
    }

    // Keeps sequences with `gap_fraction <= threshold`, plus the reference.
    pub fn filter_by_gap(&self, alignment: &Alignment, threshold: f64) -> Result<Alignment> {
        alignment.reference(&self.reference_id)?;
        let filtered = alignment.retain(|s| {
            let fraction = gap_fraction(s);
            let keep = s.id == self.reference_id || fraction <= threshold;
            if !keep {
                debug!("Dropping {}: gap fraction {:.3} > {}", s.id, fraction, threshold);
            }
            keep
        });
        Ok(filtered)
    }

    pub fn filter_by_exclusion_set(
        &self,
        alignment: &Alignment,
        excluded_ids: &HashSet<String>,
    ) -> Result<Alignment> {
        alignment.reference(&self.reference_id)?;
        if excluded_ids.contains(&self.reference_id) {
            debug!("Reference {} is in the exclusion set, keeping it", self.reference_id);
        }
        Ok(alignment.retain(|s| s.id == self.reference_id || !excluded_ids.contains(&s.id)))
    }

    pub fn gap_report(&self, alignment: &Alignment) -> Vec<GapReport> {
        alignment
            .sequences()
            .iter()
            .map(|s| {
                let fraction = gap_fraction(s);
                GapReport {
                    id: s.id.clone(),
                    gap_fraction: fraction,
                    retained: s.id == self.reference_id || fraction <= self.max_gap_fraction,
                }
            })
            .collect()
    }

    pub fn apply(&self, alignment: &Alignment, excluded_ids: &HashSet<String>) -> Result<Alignment> {
        let gap_filtered = self.filter_by_gap(alignment, self.max_gap_fraction)?;
        info!(
            "Gap filter (max {}) removed {} of {} sequences",
            self.max_gap_fraction,
            alignment.len() - gap_filtered.len(),
            alignment.len()
        );
        let excluded = self.filter_by_exclusion_set(&gap_filtered, excluded_ids)?;
        info!(
            "Exclusion filter removed {} sequences, {} remain",
            gap_filtered.len() - excluded.len(),
            excluded.len()
        );
        Ok(excluded)
    }
}
