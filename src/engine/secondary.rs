//! Secondary structure assignment.
//!
//! Structures that carry `HELIX`/`SHEET` records use them directly. When a
//! file has none, each chain segment is classified from Cα geometry alone.

use glam::Vec3;

/// Secondary structure class of a residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SsKind {
    /// Alpha helix.
    Helix,
    /// Beta strand.
    Strand,
    /// Anything else.
    #[default]
    Coil,
}

/// Minimum consecutive Cα matches kept as a helix.
const MIN_HELIX_RUN: usize = 4;
/// Minimum consecutive Cα matches kept as a strand.
const MIN_STRAND_RUN: usize = 3;

/// Classify a contiguous Cα segment.
///
/// - Helix: Cα(i)–Cα(i+3) within 4.5–6.0 Å and Cα(i)–Cα(i+4) within
///   5.0–7.0 Å.
/// - Strand: Cα(i)–Cα(i+1) within 3.5–4.1 Å and Cα(i)–Cα(i+2) within
///   6.0–8.0 Å.
///
/// Returns one entry per input position.
pub fn classify_from_trace(ca: &[Vec3]) -> Vec<SsKind> {
    let n = ca.len();
    if n < 4 {
        return vec![SsKind::Coil; n];
    }

    let dist = |i: usize, j: usize| ca[i].distance(ca[j]);
    let raw: Vec<SsKind> = (0..n)
        .map(|i| {
            if i + 4 < n {
                let (d3, d4) = (dist(i, i + 3), dist(i, i + 4));
                if (4.5..=6.0).contains(&d3) && (5.0..=7.0).contains(&d4) {
                    return SsKind::Helix;
                }
            }
            if i + 2 < n {
                let (d1, d2) = (dist(i, i + 1), dist(i, i + 2));
                if (3.5..=4.1).contains(&d1) && (6.0..=8.0).contains(&d2) {
                    return SsKind::Strand;
                }
            }
            SsKind::Coil
        })
        .collect();

    let mut out = vec![SsKind::Coil; n];
    for (start, end) in runs(&raw, SsKind::Helix) {
        if end - start >= MIN_HELIX_RUN {
            // A helical match at i spans the turn up to i+3.
            out[start..(end + 3).min(n)].fill(SsKind::Helix);
        }
    }
    for (start, end) in runs(&raw, SsKind::Strand) {
        if end - start < MIN_STRAND_RUN {
            continue;
        }
        for slot in &mut out[start..end] {
            if *slot != SsKind::Helix {
                *slot = SsKind::Strand;
            }
        }
    }
    out
}

/// Half-open index ranges of maximal runs equal to `kind`.
fn runs(values: &[SsKind], kind: SsKind) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < values.len() {
        if values[i] != kind {
            i += 1;
            continue;
        }
        let start = i;
        while i < values.len() && values[i] == kind {
            i += 1;
        }
        out.push((start, i));
    }
    out
}
