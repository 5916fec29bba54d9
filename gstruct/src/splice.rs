//! Integration of deletions, insertions, and SNPs into a transcript.
use log::warn;

use crate::{Coord, Feature, FeatureKind, Transcript};


/// Removes a deleted region from each of the given segments.
///
/// Segments outside the deletion are kept as they are, overlapping segments are cut down to
/// the parts left and/or right of it, and segments inside the deletion vanish.
pub fn subtract_region(segments: &[Coord<i64>], deletion: Coord<i64>) -> Vec<Coord<i64>> {
    let (del_start, del_end) = deletion;
    let mut remaining = Vec::with_capacity(segments.len() + 1);
    for &(start, end) in segments.iter() {
        if end < del_start || start > del_end {
            remaining.push((start, end));
            continue;
        }
        if start < del_start {
            remaining.push((start, del_start - 1));
        }
        if end > del_end {
            remaining.push((del_end + 1, end));
        }
    }
    remaining
}

impl Transcript {

    /// Cuts the given deletion regions out of every feature.
    ///
    /// Regions are applied in order, so a feature may be split by several of them. One
    /// `deletion` marker feature is added per region, ahead of the surviving features.
    /// Regions must be in the current coordinate space of the feature list; those with a
    /// start after their end are ignored.
    pub fn update_features_with_deletions(&mut self, deletion_regions: &[Coord<i64>]) {
        let regions = deletion_regions.iter()
            .filter(|&&(start, end)| {
                if start > end {
                    warn!("ignoring deletion {}-{} on {}: start is after end",
                          start, end, self.id());
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect::<Vec<Coord<i64>>>();

        let mut updated = Vec::with_capacity(self.features.len() + regions.len());
        for &(start, end) in regions.iter() {
            updated.push(Feature {
                seq_name: self.seq_name().to_owned(),
                start,
                end,
                kind: FeatureKind::Deletion,
                strand: self.strand().clone(),
            });
        }

        for feature in self.features.iter() {
            let segments = regions.iter()
                .fold(vec![(feature.start, feature.end)],
                      |segs, &region| subtract_region(&segs, region));
            updated.extend(segments.into_iter()
                .filter_map(|(start, end)| feature.with_coords(start, end)));
        }

        self.features = updated;
    }

    /// Sets the insertion positions of the transcript.
    ///
    /// Positions are kept sorted and unique. They are drawn as point markers and are not
    /// affected by deletions.
    pub fn add_insertions<I>(&mut self, positions: I)
        where I: IntoIterator<Item=i64>
    {
        self.insertions = point_set(positions);
    }

    /// Sets the SNP positions of the transcript.
    ///
    /// Positions are kept sorted and unique. They are drawn as point markers and are not
    /// affected by deletions.
    pub fn add_snps<I>(&mut self, positions: I)
        where I: IntoIterator<Item=i64>
    {
        self.snps = point_set(positions);
    }
}

fn point_set<I>(positions: I) -> Vec<i64>
    where I: IntoIterator<Item=i64>
{
    let mut points = positions.into_iter().collect::<Vec<i64>>();
    points.sort_unstable();
    points.dedup();
    points
}

#[cfg(test)]
mod test_splice {
    use super::*;
    use bio_types::strand::Strand;
    use crate::span::Span;

    fn single(start: i64, end: i64, kind: FeatureKind) -> Transcript {
        let mut t = Transcript::new("T1", "chr1", Strand::Reverse);
        t.add_feature(Feature::new("chr1", start, end, kind, Strand::Reverse).unwrap());
        t
    }

    fn coords_of(t: &Transcript, kind: &FeatureKind) -> Vec<(i64, i64)> {
        t.features().iter()
            .filter(|fx| fx.kind() == kind)
            .map(|fx| (fx.start(), fx.end()))
            .collect()
    }

    #[test]
    fn subtract_region_cases() {
        assert_eq!(subtract_region(&[(10, 100)], (20, 30)), vec![(10, 19), (31, 100)]);
        assert_eq!(subtract_region(&[(10, 100)], (1, 5)), vec![(10, 100)]);
        assert_eq!(subtract_region(&[(10, 100)], (5, 50)), vec![(51, 100)]);
        assert_eq!(subtract_region(&[(10, 100)], (50, 200)), vec![(10, 49)]);
        assert_eq!(subtract_region(&[(10, 20)], (5, 25)), Vec::<Coord<i64>>::new());
        assert_eq!(subtract_region(&[(10, 20)], (10, 20)), Vec::<Coord<i64>>::new());
        assert_eq!(subtract_region(&[(10, 20), (40, 60)], (15, 45)), vec![(10, 14), (46, 60)]);
    }

    #[test]
    fn deletion_splits_feature() {
        let mut t = single(10, 100, FeatureKind::Exon);
        t.update_features_with_deletions(&[(20, 30)]);
        assert_eq!(coords_of(&t, &FeatureKind::Exon), vec![(10, 19), (31, 100)]);
        for fx in t.features().iter().filter(|fx| fx.kind() == &FeatureKind::Exon) {
            assert_eq!(fx.strand(), &Strand::Reverse);
        }
        assert_eq!(coords_of(&t, &FeatureKind::Deletion), vec![(20, 30)]);
    }

    #[test]
    fn deletion_covers_feature() {
        let mut t = single(10, 20, FeatureKind::Cds);
        t.update_features_with_deletions(&[(5, 25)]);
        assert!(coords_of(&t, &FeatureKind::Cds).is_empty());
        assert_eq!(coords_of(&t, &FeatureKind::Deletion), vec![(5, 25)]);
    }

    #[test]
    fn deletion_adjacent_regions() {
        let mut t = single(1, 100, FeatureKind::Exon);
        t.update_features_with_deletions(&[(20, 29), (30, 39), (90, 120)]);
        assert_eq!(coords_of(&t, &FeatureKind::Exon), vec![(1, 19), (40, 89)]);
        assert_eq!(coords_of(&t, &FeatureKind::Deletion), vec![(20, 29), (30, 39), (90, 120)]);
    }

    #[test]
    fn deletion_keeps_domain_attributes() {
        let kind = FeatureKind::Domain { name: "Kinase".to_owned(), color: "#add8e6".to_owned() };
        let mut t = single(1, 60, kind.clone());
        t.update_features_with_deletions(&[(31, 40)]);
        assert_eq!(coords_of(&t, &kind), vec![(1, 30), (41, 60)]);
        assert!(t.features().iter()
            .filter(|fx| fx.kind() != &FeatureKind::Deletion)
            .all(|fx| fx.name() == Some("Kinase")));
    }

    #[test]
    fn deletion_markers_lead() {
        let mut t = single(1, 100, FeatureKind::Exon);
        t.update_features_with_deletions(&[(50, 60), (10, 12)]);
        let kinds = t.features().iter().map(|fx| fx.kind().clone()).collect::<Vec<_>>();
        assert_eq!(kinds[0], FeatureKind::Deletion);
        assert_eq!(kinds[1], FeatureKind::Deletion);
        assert_eq!((t.features()[0].start(), t.features()[1].start()), (50, 10));
    }

    #[test]
    fn deletion_markers_without_features() {
        let mut t = Transcript::new("T1", "chr1", Strand::Forward);
        t.update_features_with_deletions(&[(5, 9)]);
        assert_eq!(coords_of(&t, &FeatureKind::Deletion), vec![(5, 9)]);
    }

    #[test]
    fn deletion_invalid_region_ignored() {
        let mut t = single(1, 100, FeatureKind::Exon);
        t.update_features_with_deletions(&[(60, 50)]);
        assert_eq!(coords_of(&t, &FeatureKind::Exon), vec![(1, 100)]);
        assert!(coords_of(&t, &FeatureKind::Deletion).is_empty());
    }

    #[test]
    fn deletion_preserves_span() {
        let mut t = single(1, 100, FeatureKind::Exon);
        t.update_features_with_deletions(&[(11, 20), (51, 55)]);
        let kept = t.features().iter()
            .filter(|fx| fx.kind() == &FeatureKind::Exon)
            .map(|fx| fx.len())
            .sum::<i64>();
        assert_eq!(kept, 100 - 10 - 5);
    }

    #[test]
    fn insertions_and_snps() {
        let mut t = single(1, 100, FeatureKind::Exon);
        t.add_insertions(vec![50, 10, 50]);
        t.add_snps(vec![7]);
        assert_eq!(t.insertions(), &[10, 50]);
        assert_eq!(t.snps(), &[7]);

        t.update_features_with_deletions(&[(1, 60)]);
        assert_eq!(t.insertions(), &[10, 50]);
        assert_eq!(t.snps(), &[7]);
    }
}
