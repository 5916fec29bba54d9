//! Closed-interval behaviour shared by annotation features.
//!
//! All coordinates are 1-based and inclusive on both ends, matching the annotation file
//! convention. They are signed because minus strand transcripts store negated coordinates.

pub trait Span {

    /// Start coordinate of the interval.
    fn start(&self) -> i64;

    /// End coordinate of the interval.
    fn end(&self) -> i64;

    /// The number of bases covered by the interval.
    fn len(&self) -> i64 {
        self.end() - self.start() + 1
    }

    /// Whether the interval covers no bases.
    fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    /// Whether two intervals share at least one base.
    fn overlaps<S: Span + ?Sized>(&self, other: &S) -> bool {
        self.end() >= other.start() && self.start() <= other.end()
    }

    /// Whether one interval completely contains the other.
    fn envelops<S: Span + ?Sized>(&self, other: &S) -> bool {
        self.start() <= other.start() && self.end() >= other.end()
    }

    /// Whether two intervals cover a contiguous region without any overlaps.
    fn is_adjacent<S: Span + ?Sized>(&self, other: &S) -> bool {
        self.end() + 1 == other.start() || other.end() + 1 == self.start()
    }
}

/// Macro for `Span` implementations of types with `start` and `end` fields.
macro_rules! impl_span {
    ($struct_ty:ty) => (

        impl $crate::span::Span for $struct_ty {

            fn start(&self) -> i64 {
                self.start
            }

            fn end(&self) -> i64 {
                self.end
            }
        }

    );
}

impl Span for (i64, i64) {

    fn start(&self) -> i64 {
        self.0
    }

    fn end(&self) -> i64 {
        self.1
    }
}
