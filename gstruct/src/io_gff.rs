/*! Reader and writer for GFF3-style annotation records.

Records are nine tab-separated columns: sequence name, source, feature type, start, end,
score, strand, phase, and a `;`-separated list of `key=value` attributes. Transcripts are
assembled from the records through their `ID` and `Parent` attributes.

Lines starting with `#` and blank lines are skipped. So are rows without exactly nine
columns and rows whose coordinates are not integers, since annotation files often mix
feature rows with other content.
*/
use std::convert::AsRef;
use std::fs;
use std::io;
use std::path::Path;

use bio_types::strand::Strand;
use linked_hash_map::LinkedHashMap;
use log::debug;
use multimap::MultiMap;

use crate::{Error, Feature, FeatureError, FeatureKind, RegionWindow, Result, Transcript};
use crate::consts::{COLOR_STR, DOMAIN_STR, ID_STR, MRNA_STR, NAME_STR, PARENT_STR, SOURCE_STR,
                    TRANSCRIPT_STR, UNK_STR};
use crate::span::Span;
use crate::utils::{strand_from_str, strand_to_char};


/// Number of columns of a valid record.
const NUM_COLUMNS: usize = 9;

/// Parses a `;`-separated attribute column.
///
/// Each entry is split on its first `=`. Entries without `=` are ignored.
pub fn parse_attributes(raw: &str) -> MultiMap<String, String> {
    let mut attributes = MultiMap::new();
    for entry in raw.split(';').map(|e| e.trim()).filter(|e| !e.is_empty()) {
        if let Some(idx) = entry.find('=') {
            let (key, value) = (&entry[..idx], &entry[idx + 1..]);
            attributes.insert(key.trim().to_owned(), value.trim().to_owned());
        }
    }
    attributes
}

/// A single annotation record.
#[derive(Debug, Clone)]
pub struct GffRecord {
    seq_name: String,
    source: String,
    feature_type: String,
    start: i64,
    end: i64,
    score: String,
    strand: Strand,
    phase: String,
    attributes: MultiMap<String, String>,
}

impl_span!(GffRecord);

impl GffRecord {

    /// Creates a record from a row of columns.
    ///
    /// Returns `None` for rows that are not feature records.
    fn try_from_row(row: &csv::StringRecord) -> Option<GffRecord> {
        let line = row.position().map(|pos| pos.line()).unwrap_or(0);
        if row.len() != NUM_COLUMNS {
            debug!("skipping line {}: expected {} columns, found {}",
                   line, NUM_COLUMNS, row.len());
            return None;
        }
        let (start, end) = match (row[3].trim().parse::<i64>(), row[4].trim().parse::<i64>()) {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                debug!("skipping line {}: non-integer coordinates '{}' and '{}'",
                       line, &row[3], &row[4]);
                return None;
            },
        };
        if start > end {
            debug!("skipping line {}: start {} larger than end {}", line, start, end);
            return None;
        }
        Some(GffRecord {
            seq_name: row[0].to_owned(),
            source: row[1].to_owned(),
            feature_type: row[2].to_owned(),
            start,
            end,
            score: row[5].to_owned(),
            strand: strand_from_str(row[6].trim()),
            phase: row[7].to_owned(),
            attributes: parse_attributes(&row[8]),
        })
    }

    pub fn seq_name(&self) -> &str {
        self.seq_name.as_str()
    }

    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    pub fn feature_type(&self) -> &str {
        self.feature_type.as_str()
    }

    pub fn score(&self) -> &str {
        self.score.as_str()
    }

    pub fn strand(&self) -> &Strand {
        &self.strand
    }

    pub fn phase(&self) -> &str {
        self.phase.as_str()
    }

    pub fn attributes(&self) -> &MultiMap<String, String> {
        &self.attributes
    }

    /// Value of the `ID` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get(ID_STR).map(|v| v.as_str())
    }

    /// Values of the `Parent` attribute, with comma-separated lists expanded.
    pub fn parents(&self) -> Vec<&str> {
        self.attributes.get_vec(PARENT_STR)
            .map(|values| values.iter()
                 .flat_map(|v| v.split(','))
                 .map(|v| v.trim())
                 .filter(|v| !v.is_empty())
                 .collect())
            .unwrap_or_default()
    }

    /// Whether the record names the identifier as its `ID` or as one of its `Parent` values.
    pub fn refers_to(&self, id: &str) -> bool {
        self.id() == Some(id) || self.parents().contains(&id)
    }

    /// Creates a feature from the record, optionally with negated coordinates.
    fn to_feature(&self, negate: bool) -> ::std::result::Result<Feature, FeatureError> {
        let (start, end) = if negate {
            (-self.end, -self.start)
        } else {
            (self.start, self.end)
        };
        let kind = match (self.feature_type.as_str(),
                          self.attributes.get(NAME_STR), self.attributes.get(COLOR_STR)) {
            (DOMAIN_STR, Some(name), Some(color)) =>
                FeatureKind::Domain { name: name.clone(), color: color.clone() },
            (otherwise, _, _) => FeatureKind::from_feature_type(otherwise),
        };
        Feature::new(self.seq_name.as_str(), start, end, kind, self.strand.clone())
    }
}

/// Records of an annotation file, held in file order.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    records: Vec<GffRecord>,
}

impl Annotation {

    pub fn from_records(records: Vec<GffRecord>) -> Annotation {
        Annotation { records }
    }

    pub fn records(&self) -> &[GffRecord] {
        self.records.as_slice()
    }

    /// Collects the features of a single transcript.
    ///
    /// Every record listing the identifier as its `ID` or as one of its `Parent` values is
    /// added. The sequence name and strand of the transcript come from the first of those.
    /// Features of minus strand records are stored with negated coordinates.
    ///
    /// Returns `None` when no record refers to the identifier.
    pub fn transcript(&self, transcript_id: &str) -> Result<Option<Transcript>> {
        let mut transcript: Option<Transcript> = None;

        for rec in self.records.iter().filter(|rec| rec.refers_to(transcript_id)) {
            let trx = transcript.get_or_insert_with(|| {
                Transcript::new(transcript_id, rec.seq_name.as_str(), rec.strand.clone())
            });
            let negate = matches!(rec.strand, Strand::Reverse);
            trx.add_feature(rec.to_feature(negate)?);
        }

        Ok(transcript)
    }

    /// Collects every transcript overlapping the given window.
    ///
    /// The first pass finds `mRNA` and `transcript` records on the window sequence that
    /// overlap it. The second pass attaches each record to the candidates named by its `ID`
    /// or `Parent` attributes. Coordinates are kept as they are on both strands, so all
    /// transcripts share one axis.
    ///
    /// Transcripts are returned by ascending smallest feature start.
    pub fn region_transcripts(&self, window: &RegionWindow) -> Result<Vec<Transcript>> {
        let mut candidates: LinkedHashMap<String, Transcript> = LinkedHashMap::new();

        for rec in self.records.iter() {
            let is_transcript = rec.feature_type == MRNA_STR || rec.feature_type == TRANSCRIPT_STR;
            if !is_transcript || rec.seq_name() != window.seq_name() || !rec.overlaps(window) {
                continue;
            }
            match rec.id() {
                Some(id) if !candidates.contains_key(id) => {
                    let trx = Transcript::new(id, rec.seq_name.as_str(), rec.strand.clone());
                    let _ = candidates.insert(id.to_owned(), trx);
                },
                Some(_) => {},
                None => debug!("skipping {} record at {}:{}-{} without an ID",
                               rec.feature_type, rec.seq_name, rec.start, rec.end),
            }
        }

        for rec in self.records.iter() {
            let mut owners = rec.parents();
            if let Some(id) = rec.id() {
                if !owners.contains(&id) {
                    owners.push(id);
                }
            }
            for owner in owners {
                if let Some(trx) = candidates.get_mut(owner) {
                    trx.add_feature(rec.to_feature(false)?);
                }
            }
        }

        let mut transcripts = candidates.into_iter()
            .map(|(_, trx)| trx)
            .collect::<Vec<Transcript>>();
        transcripts.sort_by_key(|trx| {
            trx.features().iter().map(|fx| fx.start()).min().unwrap_or(i64::MAX)
        });
        Ok(transcripts)
    }
}

/// Annotation record reader.
pub struct Reader<R: io::Read> {
    inner: csv::Reader<R>,
}

impl<R: io::Read> Reader<R> {

    /// Creates a reader from another reader.
    pub fn from_reader(in_reader: R) -> Reader<R> {
        Reader {
            inner: csv::ReaderBuilder::new()
                .delimiter(b'\t')
                .has_headers(false)
                .flexible(true)
                .quoting(false)
                .comment(Some(b'#'))
                .from_reader(in_reader)
        }
    }

    /// Creates an iterator over the feature records.
    pub fn records_stream(&mut self) -> GffRecords<R> {
        GffRecords { inner: self.inner.records() }
    }

    /// Reads all feature records into memory.
    ///
    /// Region mode scans the records twice, so they are kept instead of streamed.
    pub fn read_annotation(&mut self) -> Result<Annotation> {
        let records = self.records_stream().collect::<Result<Vec<GffRecord>>>()?;
        Ok(Annotation::from_records(records))
    }
}

impl Reader<fs::File> {

    /// Creates a reader that reads from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        fs::File::open(path).map(Reader::from_reader)
    }
}

/// Iterator over feature records.
pub struct GffRecords<'a, R: 'a + io::Read> {
    inner: csv::StringRecordsIter<'a, R>,
}

impl<'a, R: io::Read> Iterator for GffRecords<'a, R> {

    type Item = Result<GffRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        for result in self.inner.by_ref() {
            match result {
                Ok(row) => {
                    if let Some(rec) = GffRecord::try_from_row(&row) {
                        return Some(Ok(rec));
                    }
                },
                Err(e) => return Some(Err(Error::from(e))),
            }
        }
        None
    }
}

/// Writer of features as annotation records.
pub struct Writer<W: io::Write> {
    inner: csv::Writer<W>,
}

impl<W: io::Write> Writer<W> {

    /// Creates a writer from another writer.
    pub fn from_writer(in_writer: W) -> Writer<W> {
        Writer {
            inner: csv::WriterBuilder::new()
                .delimiter(b'\t')
                .has_headers(false)
                .quote_style(csv::QuoteStyle::Never)
                .from_writer(in_writer)
        }
    }

    /// Writes a single feature.
    ///
    /// Domains carry their name and color as attributes, other features have none.
    pub fn write_feature(&mut self, feature: &Feature) -> Result<()> {
        let attributes = match feature.kind() {
            FeatureKind::Domain { name, color } =>
                format!("{}={};{}={}", NAME_STR, name, COLOR_STR, color),
            _ => UNK_STR.to_owned(),
        };
        let start = feature.start().to_string();
        let end = feature.end().to_string();
        let strand = strand_to_char(feature.strand()).to_string();
        self.inner
            .write_record(&[feature.seq_name(), SOURCE_STR, feature.kind().as_str(),
                            start.as_str(), end.as_str(), UNK_STR, strand.as_str(), UNK_STR,
                            attributes.as_str()])
            .map_err(Error::from)
    }

    /// Writes the features of a transcript ordered by start coordinate.
    pub fn write_transcript(&mut self, transcript: &Transcript) -> Result<()> {
        for feature in transcript.sorted_features() {
            self.write_feature(feature)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(Error::from)
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.inner.into_inner().map_err(|e| Error::from(e.into_error()))
    }
}

impl Writer<fs::File> {

    /// Creates a writer that writes to the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let f = fs::File::create(path)?;
        Ok(Writer::from_writer(f))
    }
}
