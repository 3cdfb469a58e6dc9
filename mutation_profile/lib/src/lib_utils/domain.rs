// Static position -> structural domain lookup

use log::debug;

use super::errors::{MsaError, Result};

pub const UNANNOTATED_DOMAIN: &str = "protein";

// 1-based, inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRange {
    pub start: usize,
    pub end: usize,
    pub name: String,
}

impl DomainRange {
    pub fn new(start: usize, end: usize, name: impl Into<String>) -> Self {
        Self { start, end, name: name.into() }
    }

    // zero for an inverted range, DomainMap::new rejects those
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }
}

#[derive(Debug, Clone)]
pub struct DomainMap {
    ranges: Vec<DomainRange>,
    width: usize,
}

impl DomainMap {
    pub fn new(mut ranges: Vec<DomainRange>, width: usize) -> Result<Self> {
        ranges.sort_by_key(|r| r.start);
        let mut expected_start = 1usize;
        for range in &ranges {
            if range.start > range.end {
                return Err(MsaError::InvalidDomainTable(format!(
                    "domain '{}' starts at {} after its end {}",
                    range.name, range.start, range.end
                )));
            }
            if range.start != expected_start {
                let problem = if range.start < expected_start { "overlaps" } else { "leaves a gap before" };
                return Err(MsaError::InvalidDomainTable(format!(
                    "domain '{}' ({}-{}) {} position {}",
                    range.name, range.start, range.end, problem, expected_start
                )));
            }
            expected_start = range.end + 1;
        }
        if expected_start != width + 1 {
            return Err(MsaError::InvalidDomainTable(format!(
                "domains cover positions 1-{} but the alignment has {} columns",
                expected_start - 1,
                width
            )));
        }
        debug!("Domain map with {} domains over {} positions", ranges.len(), width);
        Ok(Self { ranges, width })
    }

    pub fn unannotated(width: usize) -> Result<Self> {
        Self::new(vec![DomainRange::new(1, width, UNANNOTATED_DOMAIN)], width)
    }

    pub fn domain_for(&self, position: usize) -> Result<&str> {
        if position == 0 || position > self.width {
            return Err(MsaError::Range(format!(
                "position {} has no domain, valid positions are 1..={}",
                position, self.width
            )));
        }
        // ranges are sorted and contiguous
        let idx = self.ranges.partition_point(|r| r.end < position);
        Ok(&self.ranges[idx].name)
    }

    pub fn ranges(&self) -> &[DomainRange] {
        &self.ranges
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike_like() -> DomainMap {
        DomainMap::new(
            vec![
                DomainRange::new(4, 7, "RBD"),
                DomainRange::new(1, 3, "NTD"),
                DomainRange::new(8, 10, "S2"),
            ],
            10,
        )
        .unwrap()
    }

    #[test]
    fn every_position_maps_to_one_domain() {
        let map = spike_like();
        let names: Vec<&str> = (1..=10).map(|p| map.domain_for(p).unwrap()).collect();
        assert_eq!(
            names,
            vec!["NTD", "NTD", "NTD", "RBD", "RBD", "RBD", "RBD", "S2", "S2", "S2"]
        );
        let covered: usize = map.ranges().iter().map(|r| r.len()).sum();
        assert_eq!(covered, 10);
    }

    #[test]
    fn out_of_range_positions() {
        let map = spike_like();
        assert!(matches!(map.domain_for(0), Err(MsaError::Range(_))));
        assert!(matches!(map.domain_for(11), Err(MsaError::Range(_))));
    }

    #[test]
    fn rejects_gaps_overlaps_and_short_tables() {
        let gap = DomainMap::new(vec![DomainRange::new(1, 3, "a"), DomainRange::new(5, 10, "b")], 10);
        assert!(matches!(gap, Err(MsaError::InvalidDomainTable(msg)) if msg.contains("gap")));
        let overlap = DomainMap::new(vec![DomainRange::new(1, 5, "a"), DomainRange::new(5, 10, "b")], 10);
        assert!(matches!(overlap, Err(MsaError::InvalidDomainTable(msg)) if msg.contains("overlaps")));
        let short = DomainMap::new(vec![DomainRange::new(1, 8, "a")], 10);
        assert!(matches!(short, Err(MsaError::InvalidDomainTable(_))));
        let inverted = DomainMap::new(vec![DomainRange::new(1, 10, "a"), DomainRange::new(12, 11, "b")], 10);
        assert!(matches!(inverted, Err(MsaError::InvalidDomainTable(_))));
    }

    #[test]
    fn inverted_range_has_no_length() {
        assert_eq!(DomainRange::new(5, 2, "odd").len(), 0);
        assert_eq!(DomainRange::new(3, 3, "one").len(), 1);
    }

    #[test]
    fn unannotated_covers_everything() {
        let map = DomainMap::unannotated(4).unwrap();
        assert_eq!(map.domain_for(4).unwrap(), UNANNOTATED_DOMAIN);
        assert_eq!(map.ranges(), &[DomainRange::new(1, 4, UNANNOTATED_DOMAIN)]);
    }
}
