//! PDB text parsing into the atom/residue model the scene is built from.
//!
//! Coordinates, residues, chains and conformers come from pdbtbx. Only the
//! first model is read, and only the first alternate location of each
//! residue is kept. Biological assembly 1 is rebuilt from the `REMARK 350`
//! records pdbtbx keeps. `HELIX`/`SHEET` ranges are read from the raw text.

use std::io::{BufReader, Cursor};

use glam::{Mat4, Vec3, Vec4};
use pdbtbx::{Format, ReadOptions, PDB};

use super::secondary::{classify_from_trace, SsKind};
use crate::error::StructviewError;

/// Largest Cα–Cα distance still treated as a peptide-bonded neighbour.
pub const MAX_CA_STEP: f32 = 4.2;

/// One atom of the first model.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom name, trimmed (e.g. `CA`).
    pub name: String,
    /// Element symbol, upper case.
    pub element: String,
    /// Cartesian position in Å.
    pub position: Vec3,
    /// Whether the atom came from a `HETATM` record.
    pub hetero: bool,
}

/// A residue: the atoms of one chain position in its first conformer.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    /// Chain identifier.
    pub chain: char,
    /// Author sequence number.
    pub seq: i32,
    /// Insertion code (space when absent).
    pub insertion: char,
    /// Three-letter residue name.
    pub name: String,
    /// First atom index.
    pub first_atom: usize,
    /// One past the last atom index.
    pub end_atom: usize,
    /// Secondary structure class.
    pub ss: SsKind,
}

impl Residue {
    /// Index of this residue's Cα, if present.
    #[must_use]
    pub fn ca(&self, atoms: &[Atom]) -> Option<usize> {
        (self.first_atom..self.end_atom).find(|&i| atoms[i].name == "CA")
    }
}

/// Symmetry operator of the biological assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyOperator {
    /// Chains the operator applies to; empty means every chain.
    pub chains: Vec<char>,
    /// Rigid transform.
    pub matrix: Mat4,
}

impl AssemblyOperator {
    /// Whether the operator applies to `chain`.
    #[must_use]
    pub fn applies_to(&self, chain: char) -> bool {
        self.chains.is_empty() || self.chains.contains(&chain)
    }
}

/// Parsed structure file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    /// Atoms in file order.
    pub atoms: Vec<Atom>,
    /// Residues in file order.
    pub residues: Vec<Residue>,
    /// Operators of biological assembly 1, in file order.
    pub assembly: Vec<AssemblyOperator>,
}

/// Inclusive residue range from a `HELIX` or `SHEET` record.
struct SsRange {
    kind: SsKind,
    chain: char,
    start: i32,
    end: i32,
}

/// Accumulates `REMARK 350` lines into assembly operators.
#[derive(Default)]
struct AssemblyParser {
    in_first: bool,
    chains: Vec<char>,
    rows: [Vec4; 3],
    operators: Vec<AssemblyOperator>,
}

impl Structure {
    /// Parse PDB-format text.
    ///
    /// # Errors
    ///
    /// Returns [`StructviewError::StructureParse`] if pdbtbx rejects the
    /// text or the first model has no atoms.
    pub fn parse(text: &str) -> Result<Self, StructviewError> {
        let (pdb, warnings) = ReadOptions::default()
            .set_format(Format::Pdb)
            .set_level(pdbtbx::StrictnessLevel::Loose)
            .read_raw(BufReader::new(Cursor::new(text.as_bytes())))
            .map_err(|e| {
                StructviewError::StructureParse(format!("{e:?}"))
            })?;
        if !warnings.is_empty() {
            log::debug!("{} warnings while parsing structure", warnings.len());
        }

        let mut structure = Self::from_pdb(&pdb);
        if structure.atoms.is_empty() {
            return Err(StructviewError::StructureParse(
                "no atom records".into(),
            ));
        }

        let ranges: Vec<SsRange> = text.lines().filter_map(ss_range).collect();
        if ranges.is_empty() {
            structure.assign_ss_from_geometry();
        } else {
            structure.assign_ss_from_records(&ranges);
        }
        Ok(structure)
    }

    fn from_pdb(pdb: &PDB) -> Self {
        let mut structure = Self::default();

        if let Some(model) = pdb.models().next() {
            for chain in model.chains() {
                let chain_id = chain.id().chars().next().unwrap_or(' ');
                for residue in chain.residues() {
                    structure.push_residue(chain_id, residue);
                }
            }
        }

        let mut assembly = AssemblyParser::default();
        for (number, text) in pdb.remarks() {
            if *number == 350 {
                assembly.feed(text);
            }
        }
        structure.assembly = assembly.operators;
        structure
    }

    fn push_residue(&mut self, chain: char, residue: &pdbtbx::Residue) {
        // The conformer without an alternate location plus the first
        // alternate location seen.
        let mut kept_alt: Option<&str> = None;
        let first_atom = self.atoms.len();
        for conformer in residue.conformers() {
            if let Some(alt) = conformer.alternative_location() {
                match kept_alt {
                    Some(kept) if kept != alt => continue,
                    _ => kept_alt = Some(alt),
                }
            }
            for atom in conformer.atoms() {
                let name = atom.name().trim().to_owned();
                let element = atom.element().map_or_else(
                    || element_from_name(&name),
                    |e| e.symbol().to_ascii_uppercase(),
                );
                let (x, y, z) = atom.pos();
                self.atoms.push(Atom {
                    name,
                    element,
                    position: Vec3::new(x as f32, y as f32, z as f32),
                    hetero: atom.hetero(),
                });
            }
        }
        if self.atoms.len() == first_atom {
            return;
        }
        self.residues.push(Residue {
            chain,
            seq: residue.serial_number() as i32,
            insertion: residue
                .insertion_code()
                .and_then(|code| code.chars().next())
                .unwrap_or(' '),
            name: residue.name().unwrap_or("UNK").to_owned(),
            first_atom,
            end_atom: self.atoms.len(),
            ss: SsKind::Coil,
        });
    }

    /// Distinct chain identifiers in order of first appearance.
    #[must_use]
    pub fn chains(&self) -> Vec<char> {
        let mut chains = Vec::new();
        for residue in &self.residues {
            if !chains.contains(&residue.chain) {
                chains.push(residue.chain);
            }
        }
        chains
    }

    /// Contiguous Cα traces: residue indices split at chain changes and
    /// gaps longer than [`MAX_CA_STEP`].
    #[must_use]
    pub fn backbone_segments(&self) -> Vec<Vec<usize>> {
        let mut segments: Vec<Vec<usize>> = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut last: Option<(char, Vec3)> = None;

        for (ri, residue) in self.residues.iter().enumerate() {
            let Some(ca) = residue.ca(&self.atoms) else {
                continue;
            };
            let pos = self.atoms[ca].position;
            let connected = last.is_some_and(|(chain, prev)| {
                chain == residue.chain && prev.distance(pos) <= MAX_CA_STEP
            });
            if !connected && !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            current.push(ri);
            last = Some((residue.chain, pos));
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    fn assign_ss_from_records(&mut self, ranges: &[SsRange]) {
        for residue in &mut self.residues {
            if let Some(range) = ranges.iter().find(|r| {
                r.chain == residue.chain
                    && (r.start..=r.end).contains(&residue.seq)
            }) {
                residue.ss = range.kind;
            }
        }
    }

    fn assign_ss_from_geometry(&mut self) {
        for segment in self.backbone_segments() {
            let ca: Vec<Vec3> = segment
                .iter()
                .filter_map(|&ri| self.residues[ri].ca(&self.atoms))
                .map(|ai| self.atoms[ai].position)
                .collect();
            for (&ri, ss) in segment.iter().zip(classify_from_trace(&ca)) {
                self.residues[ri].ss = ss;
            }
        }
    }
}

impl AssemblyParser {
    /// Consume the text of one `REMARK 350` record.
    fn feed(&mut self, text: &str) {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if let Some(pos) = tokens.iter().position(|t| *t == "BIOMOLECULE:") {
            self.in_first = tokens.get(pos + 1) == Some(&"1");
            self.chains.clear();
            return;
        }
        if !self.in_first {
            return;
        }
        if let Some(pos) = text.find("CHAINS:") {
            if text.contains("APPLY") {
                self.chains.clear();
            }
            self.chains.extend(
                text[pos + "CHAINS:".len()..]
                    .split(',')
                    .filter_map(|c| c.trim().chars().next()),
            );
            return;
        }
        let Some((pos, row)) = tokens.iter().enumerate().find_map(|(i, t)| {
            t.strip_prefix("BIOMT")
                .and_then(|r| r.parse::<usize>().ok())
                .filter(|r| (1..=3).contains(r))
                .map(|r| (i, r))
        }) else {
            return;
        };
        // BIOMTn, operator serial, then the four matrix row values.
        let values: Vec<f32> = tokens
            .iter()
            .skip(pos + 2)
            .take(4)
            .filter_map(|t| t.parse().ok())
            .collect();
        if values.len() != 4 {
            return;
        }
        self.rows[row - 1] = Vec4::new(values[0], values[1], values[2], values[3]);
        if row == 3 {
            let [r0, r1, r2] = self.rows;
            let matrix = Mat4::from_cols(
                Vec4::new(r0.x, r1.x, r2.x, 0.0),
                Vec4::new(r0.y, r1.y, r2.y, 0.0),
                Vec4::new(r0.z, r1.z, r2.z, 0.0),
                Vec4::new(r0.w, r1.w, r2.w, 1.0),
            );
            self.operators.push(AssemblyOperator {
                chains: self.chains.clone(),
                matrix,
            });
        }
    }
}

/// First alphabetic character of the atom name, for files without an
/// element column.
fn element_from_name(name: &str) -> String {
    name.chars()
        .find(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

fn ss_range(line: &str) -> Option<SsRange> {
    // HELIX and SHEET place their residue fields in different columns.
    let (kind, start_chain, start_seq, end_seq) = match column(line, 0, 6) {
        "HELIX" => (SsKind::Helix, 19, (21, 25), (33, 37)),
        "SHEET" => (SsKind::Strand, 21, (22, 26), (33, 37)),
        _ => return None,
    };
    Some(SsRange {
        kind,
        chain: char_at(line, start_chain),
        start: column(line, start_seq.0, start_seq.1).parse().ok()?,
        end: column(line, end_seq.0, end_seq.1).parse().ok()?,
    })
}

/// Trimmed fixed-width field; missing columns read as empty.
fn column(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).map_or("", str::trim)
}

fn char_at(line: &str, idx: usize) -> char {
    line.get(idx..=idx)
        .and_then(|s| s.chars().next())
        .unwrap_or(' ')
}
