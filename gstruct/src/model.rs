use std::cmp::max;

use bio_types::strand::Strand;
use linked_hash_map::LinkedHashMap;

use crate::consts::{CDS_STR, DELETION_STR, DOMAIN_STR, EXON_STR, INTRON_STR, UTR3_STR, UTR5_STR};

quick_error! {
    /// Errors that occur when creating features or coordinate windows.
    #[derive(Debug)]
    pub enum FeatureError {
        /// Occurs when a feature would start after its end.
        InvalidInterval(start: i64, end: i64) {
            display("interval start coordinate {} larger than its end coordinate {}",
                    start, end)
        }
        /// Occurs when a region window starts after its end.
        InvalidRegion(seq_name: String, start: i64, end: i64) {
            display("region {}:{}-{} has a start larger than its end", seq_name, start, end)
        }
    }
}

/// Kinds of features a transcript may hold.
///
/// Domains carry their display name and color, every other kind is a plain tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Exon,
    Cds,
    Utr5,
    Utr3,
    Intron,
    Domain { name: String, color: String },
    Deletion,
    Any(String),
}

impl FeatureKind {

    /// Resolves the feature type column of an annotation record.
    pub fn from_feature_type(value: &str) -> FeatureKind {
        match value {
            EXON_STR => FeatureKind::Exon,
            CDS_STR => FeatureKind::Cds,
            UTR5_STR => FeatureKind::Utr5,
            UTR3_STR => FeatureKind::Utr3,
            INTRON_STR => FeatureKind::Intron,
            DELETION_STR => FeatureKind::Deletion,
            otherwise => FeatureKind::Any(otherwise.to_owned()),
        }
    }

    /// Feature type column value of the kind.
    pub fn as_str(&self) -> &str {
        match self {
            FeatureKind::Exon => EXON_STR,
            FeatureKind::Cds => CDS_STR,
            FeatureKind::Utr5 => UTR5_STR,
            FeatureKind::Utr3 => UTR3_STR,
            FeatureKind::Intron => INTRON_STR,
            FeatureKind::Domain { .. } => DOMAIN_STR,
            FeatureKind::Deletion => DELETION_STR,
            FeatureKind::Any(ref s) => s.as_str(),
        }
    }

    /// Whether the kind is part of the mature transcript (exon, CDS, or UTR).
    pub fn is_exon_like(&self) -> bool {
        matches!(self, FeatureKind::Exon | FeatureKind::Cds | FeatureKind::Utr5 | FeatureKind::Utr3)
    }

    /// Whether the kind may anchor relative coordinates.
    pub fn is_anchor(&self) -> bool {
        matches!(self, FeatureKind::Exon | FeatureKind::Cds)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub(crate) seq_name: String,
    pub(crate) start: i64,
    pub(crate) end: i64,
    pub(crate) kind: FeatureKind,
    pub(crate) strand: Strand,
}

impl_span!(Feature);

impl Feature {

    pub fn new<T>(
        seq_name: T,
        start: i64,
        end: i64,
        kind: FeatureKind,
        strand: Strand,
    ) -> Result<Feature, FeatureError>
        where T: Into<String>
    {
        if start > end {
            return Err(FeatureError::InvalidInterval(start, end));
        }
        Ok(Feature { seq_name: seq_name.into(), start, end, kind, strand })
    }

    pub fn seq_name(&self) -> &str {
        self.seq_name.as_str()
    }

    pub fn kind(&self) -> &FeatureKind {
        &self.kind
    }

    pub fn strand(&self) -> &Strand {
        &self.strand
    }

    /// Domain name, for domain features.
    pub fn name(&self) -> Option<&str> {
        match self.kind {
            FeatureKind::Domain { ref name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Domain display color, for domain features.
    pub fn color(&self) -> Option<&str> {
        match self.kind {
            FeatureKind::Domain { ref color, .. } => Some(color.as_str()),
            _ => None,
        }
    }

    /// Copy of the feature over another interval.
    ///
    /// Returns `None` when the interval is empty.
    pub(crate) fn with_coords(&self, start: i64, end: i64) -> Option<Feature> {
        if start > end {
            return None;
        }
        Some(Feature {
            seq_name: self.seq_name.clone(),
            start,
            end,
            kind: self.kind.clone(),
            strand: self.strand.clone(),
        })
    }

    #[inline]
    pub(crate) fn shift(&mut self, offset: i64) {
        self.start += offset;
        self.end += offset;
    }
}

/// A single transcript and every feature drawn on it.
///
/// Features are kept in insertion order. Minus strand transcripts parsed for a single
/// transcript hold negated coordinates, so every transcript can be handled as if it were
/// on the plus strand.
#[derive(Debug, Clone)]
pub struct Transcript {
    id: String,
    seq_name: String,
    strand: Strand,
    pub(crate) features: Vec<Feature>,
    pub(crate) insertions: Vec<i64>,
    pub(crate) snps: Vec<i64>,
    pub(crate) domain_colors: LinkedHashMap<String, String>,
}

impl Transcript {

    pub fn new<T, U>(id: T, seq_name: U, strand: Strand) -> Transcript
        where T: Into<String>, U: Into<String>
    {
        Transcript {
            id: id.into(),
            seq_name: seq_name.into(),
            strand,
            features: Vec::new(),
            insertions: Vec::new(),
            snps: Vec::new(),
            domain_colors: LinkedHashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn seq_name(&self) -> &str {
        self.seq_name.as_str()
    }

    pub fn strand(&self) -> &Strand {
        &self.strand
    }

    pub fn features(&self) -> &[Feature] {
        self.features.as_slice()
    }

    pub fn insertions(&self) -> &[i64] {
        self.insertions.as_slice()
    }

    pub fn snps(&self) -> &[i64] {
        self.snps.as_slice()
    }

    /// Domain names and their colors, in order of first use.
    pub fn domain_colors(&self) -> &LinkedHashMap<String, String> {
        &self.domain_colors
    }

    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Features ordered by ascending start coordinate.
    ///
    /// Features sharing a start keep their insertion order.
    pub fn sorted_features(&self) -> Vec<&Feature> {
        let mut features = self.features.iter().collect::<Vec<&Feature>>();
        features.sort_by_key(|fx| fx.start);
        features
    }

    /// Adds an intron for every gap between consecutive exon-like features.
    ///
    /// Gaps are measured from the furthest end seen so far, so overlapping exon and CDS
    /// records never produce an intron that overlaps either of them.
    pub fn add_introns(&mut self) {
        let mut exon_likes = self.features.iter()
            .filter(|fx| fx.kind.is_exon_like())
            .map(|fx| (fx.start, fx.end))
            .collect::<Vec<(i64, i64)>>();
        exon_likes.sort_by_key(|coord| coord.0);

        let mut introns = Vec::new();
        let mut covered_end = None;
        for (start, end) in exon_likes {
            if let Some(prev_end) = covered_end {
                let (intron_start, intron_end) = (prev_end + 1, start - 1);
                if intron_start <= intron_end {
                    introns.push(Feature {
                        seq_name: self.seq_name.clone(),
                        start: intron_start,
                        end: intron_end,
                        kind: FeatureKind::Intron,
                        strand: self.strand.clone(),
                    });
                }
            }
            covered_end = Some(covered_end.map_or(end, |prev| max(prev, end)));
        }
        self.features.append(&mut introns);
    }

    /// Re-bases all features so the first exon or CDS base is at position 1.
    ///
    /// Returns the smallest resulting start over all features, which is negative when a
    /// feature such as a 5'UTR lies before the anchor. When no exon or CDS exists nothing
    /// is changed and 0 is returned. Calling this twice shifts the coordinates twice.
    pub fn to_relative(&mut self) -> i64 {
        let anchor = match self.features.iter()
            .filter(|fx| fx.kind.is_anchor())
            .map(|fx| fx.start)
            .min()
        {
            Some(anchor) => anchor,
            None => return 0,
        };
        let offset = 1 - anchor;
        for fx in self.features.iter_mut() {
            fx.shift(offset);
        }
        self.features.iter().map(|fx| fx.start).min().unwrap_or(0)
    }
}

/// Returns the right-most feature to be drawn as the tip of the transcript.
///
/// 3'UTRs take precedence over CDS features, which take precedence over exons. Ties on
/// the end coordinate resolve to the first feature.
pub fn terminal_feature<'a>(features: &[&'a Feature]) -> Option<&'a Feature> {
    let priority = [FeatureKind::Utr3, FeatureKind::Cds, FeatureKind::Exon];
    for kind in priority.iter() {
        let found = features.iter()
            .filter(|fx| &fx.kind == kind)
            .fold(None, |acc: Option<&'a Feature>, fx| match acc {
                Some(best) if best.end >= fx.end => Some(best),
                _ => Some(*fx),
            });
        if found.is_some() {
            return found;
        }
    }
    None
}

#[cfg(test)]
mod test_feature {
    use super::*;
    use crate::span::Span;

    #[test]
    fn new() {
        let fx = Feature::new("chr1", 10, 100, FeatureKind::Exon, Strand::Forward).unwrap();
        assert_eq!(fx.seq_name(), "chr1");
        assert_eq!(fx.start(), 10);
        assert_eq!(fx.end(), 100);
        assert_eq!(fx.kind(), &FeatureKind::Exon);
        assert_eq!(fx.name(), None);
    }

    #[test]
    fn new_single_base() {
        let fx = Feature::new("chr1", 7, 7, FeatureKind::Cds, Strand::Forward);
        assert!(fx.is_ok());
    }

    #[test]
    fn new_invalid() {
        let fx = Feature::new("chr1", 100, 10, FeatureKind::Exon, Strand::Forward);
        assert!(fx.is_err());
    }

    #[test]
    fn domain_attributes() {
        let kind = FeatureKind::Domain { name: "Kinase".to_owned(), color: "#add8e6".to_owned() };
        let fx = Feature::new("chr1", 1, 9, kind, Strand::Reverse).unwrap();
        assert_eq!(fx.name(), Some("Kinase"));
        assert_eq!(fx.color(), Some("#add8e6"));
        assert_eq!(fx.kind().as_str(), "domain");
    }

    #[test]
    fn kind_round_trip_names() {
        for name in ["exon", "CDS", "five_prime_UTR", "three_prime_UTR", "intron",
                     "deletion", "mRNA"].iter() {
            assert_eq!(FeatureKind::from_feature_type(name).as_str(), *name);
        }
        assert_eq!(FeatureKind::from_feature_type("mRNA"), FeatureKind::Any("mRNA".to_owned()));
    }
}

#[cfg(test)]
mod test_transcript {
    use super::*;
    use crate::span::Span;

    fn trx(coords: &[(i64, i64, FeatureKind)]) -> Transcript {
        let mut t = Transcript::new("T1", "chr1", Strand::Forward);
        for &(start, end, ref kind) in coords.iter() {
            t.add_feature(Feature::new("chr1", start, end, kind.clone(), Strand::Forward).unwrap());
        }
        t
    }

    fn coords_of(t: &Transcript, kind: &FeatureKind) -> Vec<(i64, i64)> {
        t.sorted_features().into_iter()
            .filter(|fx| fx.kind() == kind)
            .map(|fx| (fx.start(), fx.end()))
            .collect()
    }

    #[test]
    fn sorted_features() {
        let t = trx(&[(300, 400, FeatureKind::Exon), (1, 100, FeatureKind::Exon),
                      (150, 200, FeatureKind::Exon)]);
        let starts = t.sorted_features().iter().map(|fx| fx.start()).collect::<Vec<i64>>();
        assert_eq!(starts, vec![1, 150, 300]);
        // write view keeps insertion order
        assert_eq!(t.features()[0].start(), 300);
    }

    #[test]
    fn add_introns() {
        let mut t = trx(&[(1, 100, FeatureKind::Exon), (300, 400, FeatureKind::Exon),
                          (150, 200, FeatureKind::Exon)]);
        t.add_introns();
        assert_eq!(coords_of(&t, &FeatureKind::Intron), vec![(101, 149), (201, 299)]);
    }

    #[test]
    fn add_introns_zero_width_gap() {
        let mut t = trx(&[(1, 100, FeatureKind::Utr5), (101, 200, FeatureKind::Cds),
                          (201, 250, FeatureKind::Utr3)]);
        t.add_introns();
        assert!(coords_of(&t, &FeatureKind::Intron).is_empty());
    }

    #[test]
    fn add_introns_single_base_gap() {
        let mut t = trx(&[(1, 100, FeatureKind::Cds), (102, 200, FeatureKind::Cds)]);
        t.add_introns();
        assert_eq!(coords_of(&t, &FeatureKind::Intron), vec![(101, 101)]);
    }

    #[test]
    fn add_introns_ignores_other_kinds() {
        let mut t = trx(&[(1, 1000, FeatureKind::Any("mRNA".to_owned())),
                          (1, 100, FeatureKind::Exon), (501, 1000, FeatureKind::Exon)]);
        t.add_introns();
        assert_eq!(coords_of(&t, &FeatureKind::Intron), vec![(101, 500)]);
    }

    #[test]
    fn add_introns_overlapping_exon_and_cds() {
        let mut t = trx(&[(1, 100, FeatureKind::Exon), (20, 100, FeatureKind::Cds),
                          (200, 300, FeatureKind::Exon), (200, 250, FeatureKind::Cds)]);
        t.add_introns();
        let introns = coords_of(&t, &FeatureKind::Intron);
        assert_eq!(introns, vec![(101, 199)]);
        for fx in t.features().iter().filter(|fx| fx.kind().is_exon_like()) {
            for intron in introns.iter() {
                assert!(!fx.overlaps(intron));
            }
        }
    }

    #[test]
    fn to_relative() {
        let mut t = trx(&[(1001, 1100, FeatureKind::Cds), (1301, 1400, FeatureKind::Cds)]);
        t.add_introns();
        let min_start = t.to_relative();
        assert_eq!(min_start, 1);
        assert_eq!(coords_of(&t, &FeatureKind::Cds), vec![(1, 100), (301, 400)]);
        assert_eq!(coords_of(&t, &FeatureKind::Intron), vec![(101, 300)]);
    }

    #[test]
    fn to_relative_utr_before_anchor() {
        let mut t = trx(&[(901, 1000, FeatureKind::Utr5), (1001, 1100, FeatureKind::Cds)]);
        let min_start = t.to_relative();
        assert_eq!(min_start, -99);
        assert_eq!(coords_of(&t, &FeatureKind::Utr5), vec![(-99, 0)]);
        assert_eq!(coords_of(&t, &FeatureKind::Cds), vec![(1, 100)]);
    }

    #[test]
    fn to_relative_negated_coords() {
        let mut t = trx(&[(-600, -500, FeatureKind::Exon), (-400, -300, FeatureKind::Exon)]);
        assert_eq!(t.to_relative(), 1);
        assert_eq!(coords_of(&t, &FeatureKind::Exon), vec![(1, 101), (201, 301)]);
    }

    #[test]
    fn to_relative_without_anchor() {
        let mut t = trx(&[(500, 600, FeatureKind::Utr5)]);
        assert_eq!(t.to_relative(), 0);
        assert_eq!(coords_of(&t, &FeatureKind::Utr5), vec![(500, 600)]);
    }

    #[test]
    fn terminal_feature_priority() {
        let t = trx(&[(1, 100, FeatureKind::Exon), (50, 100, FeatureKind::Cds),
                      (200, 300, FeatureKind::Exon), (200, 250, FeatureKind::Cds),
                      (251, 300, FeatureKind::Utr3)]);
        let fxs = t.sorted_features();
        let term = terminal_feature(&fxs).unwrap();
        assert_eq!(term.kind(), &FeatureKind::Utr3);
        assert_eq!(term.end(), 300);
    }

    #[test]
    fn terminal_feature_fallback() {
        let t = trx(&[(1, 100, FeatureKind::Exon), (200, 300, FeatureKind::Exon)]);
        let fxs = t.sorted_features();
        assert_eq!(terminal_feature(&fxs).map(|fx| fx.start()), Some(200));

        let empty = trx(&[(1, 100, FeatureKind::Intron)]);
        assert!(terminal_feature(&empty.sorted_features()).is_none());
    }
}
