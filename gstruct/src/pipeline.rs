/*! Ordered transformation stages of a transcript.

A transcript moves through three stages, each consuming the previous one:

1. `Parsed`: features as read from the annotation.
2. `Structured`: introns have been derived.
3. `Relative`: coordinates are re-based to the first exon or CDS base.

Domain placement is allowed once introns exist. Variants are only accepted on relative
coordinates, which is the coordinate space batch descriptors use.
*/
use std::marker::PhantomData;

use crate::{Coord, Transcript};


/// Transcript as parsed from the annotation.
#[derive(Debug)]
pub struct Parsed;

/// Transcript with introns derived.
#[derive(Debug)]
pub struct Structured;

/// Transcript re-based to relative coordinates.
#[derive(Debug)]
pub struct Relative;

/// Stages on which domains may be placed.
pub trait DomainStage {}

impl DomainStage for Structured {}
impl DomainStage for Relative {}

/// A transcript tagged with the stage it has reached.
#[derive(Debug)]
pub struct Pipeline<S> {
    transcript: Transcript,
    min_start: Option<i64>,
    _stage: PhantomData<S>,
}

impl<S> Pipeline<S> {

    fn advance<T>(self) -> Pipeline<T> {
        Pipeline { transcript: self.transcript, min_start: self.min_start, _stage: PhantomData }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }
}

impl Pipeline<Parsed> {

    pub fn new(transcript: Transcript) -> Pipeline<Parsed> {
        Pipeline { transcript, min_start: None, _stage: PhantomData }
    }

    pub fn add_introns(mut self) -> Pipeline<Structured> {
        self.transcript.add_introns();
        self.advance()
    }
}

impl Pipeline<Structured> {

    pub fn to_relative(mut self) -> Pipeline<Relative> {
        self.min_start = Some(self.transcript.to_relative());
        self.advance()
    }
}

impl<S: DomainStage> Pipeline<S> {

    pub fn add_domain_from_protein_coords(mut self, start_aa: i64, end_aa: i64, name: &str)
        -> Pipeline<S>
    {
        let _ = self.transcript.add_domain_from_protein_coords(start_aa, end_aa, name);
        self
    }
}

impl Pipeline<Relative> {

    /// Smallest start over all features right after re-basing.
    pub fn min_start(&self) -> i64 {
        self.min_start.unwrap_or(0)
    }

    pub fn update_features_with_deletions(mut self, deletion_regions: &[Coord<i64>])
        -> Pipeline<Relative>
    {
        self.transcript.update_features_with_deletions(deletion_regions);
        self
    }

    pub fn add_insertions<I>(mut self, positions: I) -> Pipeline<Relative>
        where I: IntoIterator<Item=i64>
    {
        self.transcript.add_insertions(positions);
        self
    }

    pub fn add_snps<I>(mut self, positions: I) -> Pipeline<Relative>
        where I: IntoIterator<Item=i64>
    {
        self.transcript.add_snps(positions);
        self
    }
}
