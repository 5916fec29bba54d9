#![deny(
        trivial_casts, trivial_numeric_casts,
        unsafe_code,
        unstable_features,
        unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unused_results)]

#[macro_use]
extern crate quick_error;

use std::io::Error as IoError;

pub use bio_types::strand::Strand;
use csv::Error as CsvError;
use regex::Error as RegexError;

#[macro_use]
mod span;
pub use span::Span;

mod model;
pub use model::{Feature, FeatureError, FeatureKind, Transcript, terminal_feature};

mod mapper;
pub use mapper::{cdna_range, DOMAIN_PALETTE, MAX_AA_POS};

mod splice;
pub use splice::subtract_region;

mod pipeline;
pub use pipeline::{Pipeline, Parsed, Structured, Relative};

mod io_gff;
pub use io_gff::{Annotation, GffRecord, Reader as GffReader, Writer as GffWriter,
                 parse_attributes};

mod region;
pub use region::{Extent, RegionWindow, TrackLayout, MIN_TRACK_GAP};

mod batch;
pub use batch::{BatchError, BatchRow, DomainSpec, VariantSet,
                parse_deletions, parse_domains, parse_positions, read_batch};

pub mod render;


quick_error! {
    #[derive(Debug)]
    pub enum Error {
        Feature(err: FeatureError) {
            display("{}", err)
            from()
            source(err)
        }
        Batch(err: BatchError) {
            display("{}", err)
            from()
            source(err)
        }
        Csv(err: CsvError) {
            display("{}", err)
            from()
            source(err)
        }
        Io(err: IoError) {
            display("{}", err)
            from()
            source(err)
        }
        Regex(err: RegexError) {
            display("{}", err)
            from()
            source(err)
        }
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

// Helper type for raw coordinates
pub type Coord<T> = (T, T);

// Crate-wide constants
pub(crate) mod consts {
    // Feature column values with a dedicated feature kind.
    pub(crate) const EXON_STR: &str = "exon";
    pub(crate) const CDS_STR: &str = "CDS";
    pub(crate) const UTR5_STR: &str = "five_prime_UTR";
    pub(crate) const UTR3_STR: &str = "three_prime_UTR";
    pub(crate) const INTRON_STR: &str = "intron";
    pub(crate) const DOMAIN_STR: &str = "domain";
    pub(crate) const DELETION_STR: &str = "deletion";

    // Feature column values of transcript records, used in region mode.
    pub(crate) const MRNA_STR: &str = "mRNA";
    pub(crate) const TRANSCRIPT_STR: &str = "transcript";

    // Commonly-used attribute keys.
    pub(crate) const ID_STR: &str = "ID";
    pub(crate) const PARENT_STR: &str = "Parent";
    pub(crate) const NAME_STR: &str = "name";
    pub(crate) const COLOR_STR: &str = "color";

    // Source column value of dumped features.
    pub(crate) const SOURCE_STR: &str = "manual";

    // Value for unknown columns.
    pub(crate) const UNK_STR: &str = ".";
    pub(crate) const UNK_CHAR: char = '.';
}

// Generic utilities
pub(crate) mod utils {
    use bio_types::strand::Strand;

    use crate::consts::UNK_CHAR;

    /// Parses the strand column of an annotation record.
    ///
    /// Anything other than `+` or `-` is treated as an unknown strand.
    #[inline]
    pub(crate) fn strand_from_str(value: &str) -> Strand {
        match value {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }

    #[inline]
    pub(crate) fn strand_to_char(strand: &Strand) -> char {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => UNK_CHAR,
        }
    }
}
