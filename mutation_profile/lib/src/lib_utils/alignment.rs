/*
    In-memory multiple sequence alignment
        Read FASTA or "simple" (id<space>row) alignments
        Enforce the alignment contract
            every row has the same length
            every symbol belongs to the residue alphabet
            ids are unique
        Column access by 1-based position
        Whole-sequence subsetting, never per-residue edits
*/

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use log::{debug, info, trace};

use super::errors::{MsaError, Result};
use super::residue::normalise_residue;
use super::struct_helper::FileBufferHelper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFormat {
    Fasta,
    // id<whitespace>row per line, '#' comments
    Simple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub id: String,
    pub residues: Vec<u8>,
}

impl Sequence {
    pub fn new(id: impl Into<String>, raw: &[u8]) -> Result<Self> {
        let id = id.into();
        let residues = raw
            .iter()
            .enumerate()
            .map(|(idx, &symbol)| {
                normalise_residue(symbol).ok_or_else(|| {
                    MsaError::Format(format!(
                        "sequence '{}' has unrecognised symbol '{}' at position {}",
                        id,
                        symbol.escape_ascii(),
                        idx + 1
                    ))
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        Ok(Self { id, residues })
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Alignment {
    sequences: Vec<Sequence>,
    index: HashMap<String, usize>,
    width: usize,
}

impl Alignment {
    pub fn new(sequences: Vec<Sequence>) -> Result<Self> {
        let first = sequences
            .first()
            .ok_or_else(|| MsaError::Format("alignment contains no sequences".to_string()))?;
        let width = first.len();
        let first_id = first.id.clone();
        if width == 0 {
            return Err(MsaError::Format(format!(
                "sequence '{}' is empty, the alignment has no columns",
                first_id
            )));
        }
        for sequence in &sequences {
            if sequence.len() != width {
                return Err(MsaError::Format(format!(
                    "sequence '{}' has length {}, expected {} (length of '{}')",
                    sequence.id,
                    sequence.len(),
                    width,
                    first_id
                )));
            }
        }
        let mut index = HashMap::with_capacity(sequences.len());
        for (idx, sequence) in sequences.iter().enumerate() {
            if index.insert(sequence.id.clone(), idx).is_some() {
                return Err(MsaError::Format(format!(
                    "duplicate sequence id '{}'",
                    sequence.id
                )));
            }
        }
        debug!("Alignment of {} sequences with width {}", sequences.len(), width);
        Ok(Self { sequences, index, width })
    }

    pub fn from_rows<I, S, R>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, R)>,
        S: Into<String>,
        R: AsRef<[u8]>,
    {
        let sequences = rows
            .into_iter()
            .map(|(id, row)| Sequence::new(id, row.as_ref()))
            .collect::<Result<Vec<Sequence>>>()?;
        Self::new(sequences)
    }

    pub fn load(path: &Path, format: AlignmentFormat) -> Result<Self> {
        let mut file = FileBufferHelper::new(path)?;
        info!("Reading {:?} alignment from {:?}", format, path);
        let sequences = match format {
            AlignmentFormat::Fasta => read_fasta(&mut file)?,
            AlignmentFormat::Simple => read_simple(&mut file)?,
        };
        let alignment = Self::new(sequences)?;
        info!(
            "Loaded {} sequences of length {} from {:?}",
            alignment.len(),
            alignment.width(),
            path
        );
        Ok(alignment)
    }

    // Rows taken from an already validated alignment keep its width.
    fn from_validated(sequences: Vec<Sequence>, width: usize) -> Self {
        let index = sequences
            .iter()
            .enumerate()
            .map(|(idx, sequence)| (sequence.id.clone(), idx))
            .collect();
        Self { sequences, index, width }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    // L
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sequences.iter().map(|s| s.id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn reference(&self, id: &str) -> Result<&Sequence> {
        self.index
            .get(id)
            .map(|&idx| &self.sequences[idx])
            .ok_or_else(|| MsaError::ReferenceMissing(id.to_string()))
    }

    // 1-based column, alignment order
    pub fn column_slice(&self, position: usize) -> Result<Vec<(&str, u8)>> {
        if position == 0 || position > self.width {
            return Err(MsaError::Range(format!(
                "position {} outside alignment columns 1..={}",
                position, self.width
            )));
        }
        Ok(self
            .sequences
            .iter()
            .map(|s| (s.id.as_str(), s.residues[position - 1]))
            .collect())
    }

    // `label` names the requested group when nothing matches
    pub fn subset(&self, label: &str, ids: &BTreeSet<String>) -> Result<Alignment> {
        let kept = self.retain(|s| ids.contains(&s.id));
        if kept.is_empty() {
            return Err(MsaError::EmptySubset(label.to_string()));
        }
        trace!("Subset '{}' keeps {} of {} sequences", label, kept.len(), self.len());
        Ok(kept)
    }

    // may be empty
    pub(crate) fn retain<F>(&self, mut keep: F) -> Alignment
    where
        F: FnMut(&Sequence) -> bool,
    {
        let sequences = self
            .sequences
            .iter()
            .filter(|s| keep(s))
            .cloned()
            .collect();
        Self::from_validated(sequences, self.width)
    }
}

fn split_fields(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|b| b.is_ascii_whitespace()).filter(|field| !field.is_empty())
}

fn read_fasta(file: &mut FileBufferHelper) -> Result<Vec<Sequence>> {
    let mut sequences = Vec::new();
    let mut current: Option<(String, Vec<u8>, usize)> = None;
    while file.next_line()? {
        let line = file.line.trim_ascii();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix(b">") {
            if let Some(record) = current.take() {
                sequences.push(finish_record(record)?);
            }
            let id = split_fields(header).next().ok_or_else(|| {
                MsaError::Format(format!("line {}: header without an identifier", file.line_number))
            })?;
            let id = String::from_utf8_lossy(id).into_owned();
            trace!("Processing >{}", id);
            current = Some((id, Vec::new(), file.line_number));
        } else {
            match current.as_mut() {
                Some((_, residues, _)) => residues.extend_from_slice(line),
                None => {
                    return Err(MsaError::Format(format!(
                        "line {}: sequence data encountered before any header",
                        file.line_number
                    )))
                }
            }
        }
    }
    if let Some(record) = current.take() {
        sequences.push(finish_record(record)?);
    }
    Ok(sequences)
}

fn finish_record((id, residues, header_line): (String, Vec<u8>, usize)) -> Result<Sequence> {
    if residues.is_empty() {
        return Err(MsaError::Format(format!(
            "record '{}' (line {}) has no sequence",
            id, header_line
        )));
    }
    Sequence::new(id, &residues)
}

fn read_simple(file: &mut FileBufferHelper) -> Result<Vec<Sequence>> {
    let mut sequences = Vec::new();
    while file.next_line()? {
        let line = file.line.trim_ascii();
        if line.is_empty() || line.starts_with(b"#") {
            continue;
        }
        let mut fields = split_fields(line);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(id), Some(row), None) => {
                sequences.push(Sequence::new(String::from_utf8_lossy(id), row)?)
            }
            _ => {
                return Err(MsaError::Format(format!(
                    "line {}: expected '<id> <aligned row>'",
                    file.line_number
                )))
            }
        }
    }
    Ok(sequences)
}
