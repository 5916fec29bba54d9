//! Region windows and the row layout of transcripts drawn on a shared axis.
use crate::{FeatureError, Transcript};


/// Smallest number of bases between two transcripts sharing a track.
pub const MIN_TRACK_GAP: i64 = 500;

/// A genomic window on a single sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionWindow {
    seq_name: String,
    start: i64,
    end: i64,
}

impl_span!(RegionWindow);

impl RegionWindow {

    pub fn new<T>(seq_name: T, start: i64, end: i64) -> Result<RegionWindow, FeatureError>
        where T: Into<String>
    {
        let seq_name = seq_name.into();
        if start > end {
            return Err(FeatureError::InvalidRegion(seq_name, start, end));
        }
        Ok(RegionWindow { seq_name, start, end })
    }

    pub fn seq_name(&self) -> &str {
        self.seq_name.as_str()
    }

    /// Output file name of the window, without extension.
    pub fn file_stem(&self) -> String {
        format!("{}_{}-{}", self.seq_name, self.start, self.end)
    }
}

/// The outermost coordinates of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub start: i64,
    pub end: i64,
}

impl_span!(Extent);

impl Transcript {

    /// Smallest start and largest end over all features, if any.
    pub fn extent(&self) -> Option<Extent> {
        let start = self.features.iter().map(|fx| fx.start).min()?;
        let end = self.features.iter().map(|fx| fx.end).max()?;
        Some(Extent { start, end })
    }
}

/// Assignment of transcripts to display rows.
///
/// Tracks are filled greedily: extents are visited by ascending start and each goes to the
/// lowest track whose last extent ends more than the minimum gap before it. When there is
/// no such track, a new one is opened. The result is deterministic but not necessarily the
/// smallest possible number of tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackLayout {
    assignments: Vec<usize>,
    num_tracks: usize,
}

impl TrackLayout {

    /// Assigns tracks with the default minimum gap.
    pub fn assign(extents: &[Extent]) -> TrackLayout {
        TrackLayout::with_gap(extents, MIN_TRACK_GAP)
    }

    pub fn with_gap(extents: &[Extent], min_gap: i64) -> TrackLayout {
        let mut order = (0..extents.len()).collect::<Vec<usize>>();
        order.sort_by_key(|&idx| extents[idx].start);

        let mut track_ends: Vec<i64> = Vec::new();
        let mut assignments = vec![0; extents.len()];
        for idx in order {
            let extent = extents[idx];
            let free = track_ends.iter().position(|&end| extent.start > end + min_gap);
            let track = match free {
                Some(track) => {
                    track_ends[track] = extent.end;
                    track
                },
                None => {
                    track_ends.push(extent.end);
                    track_ends.len() - 1
                },
            };
            assignments[idx] = track;
        }

        TrackLayout { assignments, num_tracks: track_ends.len() }
    }

    /// Track of the extent at the given input position.
    pub fn track_of(&self, idx: usize) -> Option<usize> {
        self.assignments.get(idx).cloned()
    }

    /// Tracks of all extents, in input order.
    pub fn tracks(&self) -> &[usize] {
        self.assignments.as_slice()
    }

    pub fn num_tracks(&self) -> usize {
        self.num_tracks
    }
}
