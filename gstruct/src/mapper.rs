//! Placement of protein domains onto the coding sequence of a transcript.
use std::cmp::{max, min};

use itertools::Itertools;
use log::warn;

use crate::{Coord, Feature, FeatureError, FeatureKind, Transcript};


/// Colors cycled through as new domain names are seen.
pub const DOMAIN_PALETTE: [&str; 10] = [
    "#add8e6",
    "#f08080",
    "#90ee90",
    "#d62728",
    "#9467bd",
    "#8c564b",
    "#e377c2",
    "#7f7f7f",
    "#bcbd22",
    "#17becf",
];

/// Number of nucleotides per amino acid.
const CODON_LEN: i64 = 3;

/// Largest amino acid position whose cDNA coordinate fits in an `i64`.
pub const MAX_AA_POS: i64 = i64::MAX / CODON_LEN;

/// Converts a 1-based, inclusive amino acid interval into cDNA coordinates.
///
/// Returns `None` unless `1 <= start_aa <= end_aa <= MAX_AA_POS`.
#[inline]
pub fn cdna_range(start_aa: i64, end_aa: i64) -> Option<Coord<i64>> {
    if start_aa < 1 || start_aa > end_aa {
        return None;
    }
    let cdna_end = end_aa.checked_mul(CODON_LEN)?;
    Some(((start_aa - 1) * CODON_LEN + 1, cdna_end))
}

/// Maps a cDNA interval onto the given CDS segments.
///
/// The segments must be sorted by ascending start. One genomic interval is returned per CDS
/// segment the cDNA interval touches, read from left to right.
fn cdna_to_genomic(cds: &[Coord<i64>], cdna: Coord<i64>) -> Vec<Coord<i64>> {
    let (cdna_start, cdna_end) = cdna;
    let mut segments = Vec::new();
    let mut current = 1;

    for &(start, end) in cds.iter() {
        let next = current + (end - start);
        if next < cdna_start {
            current = next + 1;
            continue;
        }
        if current > cdna_end {
            break;
        }
        let offset_start = max(cdna_start, current) - current;
        let offset_end = min(cdna_end, next) - current;
        segments.push((start + offset_start, start + offset_end));
        current = next + 1;
    }

    segments
}

impl Transcript {

    /// Returns the color of the given domain name, assigning the next palette color on first
    /// use.
    pub fn domain_color(&mut self, name: &str) -> String {
        if let Some(color) = self.domain_colors.get(name) {
            return color.clone();
        }
        let color = DOMAIN_PALETTE[self.domain_colors.len() % DOMAIN_PALETTE.len()].to_owned();
        let _ = self.domain_colors.insert(name.to_owned(), color.clone());
        color
    }

    /// Adds a domain given in 1-based amino acid coordinates.
    ///
    /// The CDS features are walked in ascending coordinate order and one domain feature is
    /// added for every CDS segment the domain covers. A domain extending past the last coding
    /// base is truncated to the coding sequence. Without any CDS features, or when the amino
    /// acid interval is empty or out of range, nothing is added.
    ///
    /// Returns the number of domain features added.
    pub fn add_domain_from_protein_coords(&mut self, start_aa: i64, end_aa: i64, name: &str)
        -> usize
    {
        let cds = self.features.iter()
            .filter(|fx| fx.kind() == &FeatureKind::Cds)
            .map(|fx| (fx.start, fx.end))
            .sorted_by_key(|coord| coord.0)
            .collect::<Vec<Coord<i64>>>();

        let cdna = match cdna_range(start_aa, end_aa) {
            Some(cdna) => cdna,
            None => {
                warn!("ignoring domain '{}' of {} at amino acids {}-{}: invalid interval",
                      name, self.id(), start_aa, end_aa);
                return 0;
            },
        };
        let cds_len = cds.iter().map(|&(start, end)| end - start + 1).sum::<i64>();
        if !cds.is_empty() && cdna.1 > cds_len {
            warn!("domain '{}' ends at amino acid {} past the coding sequence of {} ({} aa), \
                   truncating", name, end_aa, self.id(), cds_len / CODON_LEN);
        }

        let segments = cdna_to_genomic(&cds, cdna);
        for &(start, end) in segments.iter() {
            let color = self.domain_color(name);
            let kind = FeatureKind::Domain { name: name.to_owned(), color };
            let feature = Feature {
                seq_name: self.seq_name().to_owned(),
                start,
                end,
                kind,
                strand: self.strand().clone(),
            };
            self.features.push(feature);
        }
        segments.len()
    }

    /// Adds a domain given directly in the coordinates of the feature list.
    pub fn add_domain(&mut self, start: i64, end: i64, name: &str) -> Result<(), FeatureError> {
        if start > end {
            return Err(FeatureError::InvalidInterval(start, end));
        }
        let color = self.domain_color(name);
        let kind = FeatureKind::Domain { name: name.to_owned(), color };
        let feature = Feature::new(self.seq_name(), start, end, kind, self.strand().clone())?;
        self.add_feature(feature);
        Ok(())
    }
}
