//! Per-residue coloring policies.

use rustc_hash::FxHashMap;

use super::secondary::SsKind;
use super::structure::Structure;
use crate::options::ColorScheme;

/// Linear RGB color, components in `0.0..=1.0`.
pub type Rgb = [f32; 3];

/// Color of residues outside any helix or strand.
pub const COIL_COLOR: Rgb = [0.8, 0.8, 0.8];

/// Stops of the succession gradient, first element to last.
const RAINBOW: [Rgb; 5] = [
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
];

/// Sample the rainbow gradient at `t` in `0.0..=1.0`.
#[must_use]
pub fn gradient(t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0) * (RAINBOW.len() - 1) as f32;
    let i = (t.floor() as usize).min(RAINBOW.len() - 2);
    let f = t - i as f32;
    let (a, b) = (RAINBOW[i], RAINBOW[i + 1]);
    [
        a[0] + (b[0] - a[0]) * f,
        a[1] + (b[1] - a[1]) * f,
        a[2] + (b[2] - a[2]) * f,
    ]
}

/// One color per residue of `structure`.
#[must_use]
pub fn residue_colors(structure: &Structure, scheme: ColorScheme) -> Vec<Rgb> {
    match scheme {
        ColorScheme::SsSuccession => ss_succession(structure),
        ColorScheme::Chain => by_chain(structure),
    }
}

/// Helices and strands are colored along the gradient in the order they
/// occur within their chain; coil is neutral grey.
fn ss_succession(structure: &Structure) -> Vec<Rgb> {
    // Element index of each residue within its chain, and element count per
    // chain.
    let mut element_of: Vec<Option<usize>> =
        Vec::with_capacity(structure.residues.len());
    let mut counts: FxHashMap<char, usize> = FxHashMap::default();
    let mut prev: Option<(char, SsKind)> = None;

    for residue in &structure.residues {
        let count = counts.entry(residue.chain).or_insert(0);
        if residue.ss == SsKind::Coil {
            element_of.push(None);
        } else {
            if prev != Some((residue.chain, residue.ss)) {
                *count += 1;
            }
            element_of.push(Some(*count - 1));
        }
        prev = Some((residue.chain, residue.ss));
    }

    structure
        .residues
        .iter()
        .zip(element_of)
        .map(|(residue, element)| match element {
            None => COIL_COLOR,
            Some(idx) => {
                let total = counts.get(&residue.chain).copied().unwrap_or(1);
                if total <= 1 {
                    gradient(0.0)
                } else {
                    gradient(idx as f32 / (total - 1) as f32)
                }
            }
        })
        .collect()
}

fn by_chain(structure: &Structure) -> Vec<Rgb> {
    let chains = structure.chains();
    let steps = chains.len().saturating_sub(1).max(1) as f32;
    structure
        .residues
        .iter()
        .map(|r| {
            let idx = chains.iter().position(|&c| c == r.chain).unwrap_or(0);
            gradient(idx as f32 / steps)
        })
        .collect()
}
