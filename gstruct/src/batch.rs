/*! Batch descriptors of transcripts to draw.

A descriptor is a CSV file with a header. Each row names a transcript and optionally lists
variants and domains, all in transcript-relative coordinates:

| column          | grammar                        | example               |
|-----------------|--------------------------------|-----------------------|
| `transcript_id` | text, required                 | `T1`                  |
| `snp`           | `pos(;pos)*`                   | `100;200`             |
| `deletions`     | `start-end(;start-end)*`       | `12-200;-40--10`      |
| `insertions`    | `pos(;pos)*`                   | `150`                 |
| `domains`       | `start-end:name(;start-end:name)*` | `1-30:Kinase`     |

Domain coordinates are amino acids. Empty fields and empty `;`-separated tokens are
ignored.
*/
use std::io;

use itertools::Itertools;
use regex::Regex;
use serde::Deserialize;

use crate::{Coord, Error, Pipeline, Relative, Result, MAX_AA_POS};


quick_error! {
    /// Errors that occur when reading batch descriptors.
    #[derive(Debug)]
    pub enum BatchError {
        /// Occurs when a point position is not an integer.
        InvalidPosition(token: String) {
            display("invalid position '{}', expected an integer", token)
        }
        /// Occurs when a deletion is not a `start-end` pair with start not after end.
        InvalidDeletion(token: String) {
            display("invalid deletion '{}', expected 'start-end'", token)
        }
        /// Occurs when a domain is not a `start-end:name` triple of positive amino acid
        /// coordinates with start not after end and small enough to map onto nucleotides.
        InvalidDomain(token: String) {
            display("invalid domain '{}', expected 'start-end:name'", token)
        }
        /// Occurs when a row has an empty transcript identifier.
        MissingTranscriptId(row: usize) {
            display("batch row {} has no transcript_id", row)
        }
    }
}

/// Splits a `;`-separated field into its non-empty tokens.
fn tokens(raw: &str) -> impl Iterator<Item=&str> {
    raw.split(';').map(|t| t.trim()).filter(|t| !t.is_empty())
}

/// Parses a `;`-separated list of integer positions.
pub fn parse_positions(raw: &str) -> Result<Vec<i64>> {
    tokens(raw)
        .map(|token| token.parse::<i64>()
             .map_err(|_| Error::from(BatchError::InvalidPosition(token.to_owned()))))
        .collect()
}

/// Parses a `;`-separated list of `start-end` deletion regions.
///
/// Both coordinates may be negative, for deletions upstream of the first coding base.
pub fn parse_deletions(raw: &str) -> Result<Vec<Coord<i64>>> {
    let re = Regex::new(r"^(-?\d+)\s*-\s*(-?\d+)$")?;
    tokens(raw)
        .map(|token| {
            let invalid = || Error::from(BatchError::InvalidDeletion(token.to_owned()));
            let caps = re.captures(token).ok_or_else(invalid)?;
            let start = caps[1].parse::<i64>().map_err(|_| invalid())?;
            let end = caps[2].parse::<i64>().map_err(|_| invalid())?;
            if start > end {
                return Err(invalid());
            }
            Ok((start, end))
        })
        .collect()
}

/// A protein domain in amino acid coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpec {
    pub start_aa: i64,
    pub end_aa: i64,
    pub name: String,
}

/// Parses a `;`-separated list of `start-end:name` domains.
pub fn parse_domains(raw: &str) -> Result<Vec<DomainSpec>> {
    let re = Regex::new(r"^(\d+)\s*-\s*(\d+)\s*:\s*(\S.*)$")?;
    tokens(raw)
        .map(|token| {
            let invalid = || Error::from(BatchError::InvalidDomain(token.to_owned()));
            let caps = re.captures(token).ok_or_else(invalid)?;
            let start_aa = caps[1].parse::<i64>().map_err(|_| invalid())?;
            let end_aa = caps[2].parse::<i64>().map_err(|_| invalid())?;
            if start_aa < 1 || start_aa > end_aa || end_aa > MAX_AA_POS {
                return Err(invalid());
            }
            Ok(DomainSpec { start_aa, end_aa, name: caps[3].trim().to_owned() })
        })
        .collect()
}

/// A single row of a batch descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchRow {
    pub transcript_id: String,
    #[serde(default)]
    pub snp: Option<String>,
    #[serde(default)]
    pub deletions: Option<String>,
    #[serde(default)]
    pub insertions: Option<String>,
    #[serde(default)]
    pub domains: Option<String>,
}

impl BatchRow {

    pub fn new<T: Into<String>>(transcript_id: T) -> BatchRow {
        BatchRow { transcript_id: transcript_id.into(), ..BatchRow::default() }
    }

    /// Parses the variant and domain fields of the row.
    pub fn variants(&self) -> Result<VariantSet> {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        Ok(VariantSet {
            snps: parse_positions(&field(&self.snp))?,
            deletions: parse_deletions(&field(&self.deletions))?,
            insertions: parse_positions(&field(&self.insertions))?,
            domains: parse_domains(&field(&self.domains))?,
        })
    }
}

/// Parsed variants and domains of a batch row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSet {
    pub snps: Vec<i64>,
    pub deletions: Vec<Coord<i64>>,
    pub insertions: Vec<i64>,
    pub domains: Vec<DomainSpec>,
}

impl VariantSet {

    /// Applies domains, deletions, insertions, and SNPs, in that order.
    ///
    /// Domains go first so their segments are cut by the deletions like any other feature.
    pub fn apply(&self, pipeline: Pipeline<Relative>) -> Pipeline<Relative> {
        let pipeline = self.domains.iter()
            .fold(pipeline, |acc, dom| {
                acc.add_domain_from_protein_coords(dom.start_aa, dom.end_aa, &dom.name)
            });
        pipeline
            .update_features_with_deletions(&self.deletions)
            .add_insertions(self.insertions.iter().cloned())
            .add_snps(self.snps.iter().cloned())
    }

    /// Output file name for the given transcript with these variants applied.
    ///
    /// The transcript identifier is followed by one suffix per non-empty variant type, in
    /// the order SNPs, deletions, insertions, domains. Characters that are unsafe in file
    /// names are replaced with `_`.
    pub fn file_name(&self, transcript_id: &str) -> String {
        let mut name = transcript_id.to_owned();
        if !self.snps.is_empty() {
            name.push_str(&format!("_SNP_{}", self.snps.iter().join("_")));
        }
        if !self.deletions.is_empty() {
            let dels = self.deletions.iter().map(|(s, e)| format!("{}-{}", s, e)).join("_");
            name.push_str(&format!("_DEL_{}", dels));
        }
        if !self.insertions.is_empty() {
            name.push_str(&format!("_INS_{}", self.insertions.iter().join("_")));
        }
        if !self.domains.is_empty() {
            name.push_str(&format!("_DOM_{}", self.domains.iter().map(|d| &d.name).join("_")));
        }
        let mut sanitized = name.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            })
            .collect::<String>();
        sanitized.push_str(".svg");
        sanitized
    }
}

/// Reads all rows of a batch descriptor.
pub fn read_batch<R: io::Read>(in_reader: R) -> Result<Vec<BatchRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(in_reader);
    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<BatchRow>().enumerate() {
        let row = result?;
        if row.transcript_id.is_empty() {
            return Err(Error::from(BatchError::MissingTranscriptId(idx + 1)));
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod test_batch {
    use super::*;
    use matches::assert_matches;

    #[test]
    fn positions() {
        assert_eq!(parse_positions("100;200;1000").unwrap(), vec![100, 200, 1000]);
        assert_eq!(parse_positions(" 7 ;;-3;").unwrap(), vec![7, -3]);
        assert!(parse_positions("").unwrap().is_empty());
        assert_matches!(parse_positions("10;x"),
                        Err(Error::Batch(BatchError::InvalidPosition(ref t))) if t == "x");
    }

    #[test]
    fn deletions() {
        assert_eq!(parse_deletions("12-2000;3000-3500").unwrap(),
                   vec![(12, 2000), (3000, 3500)]);
        assert_eq!(parse_deletions("-40--10; -5-5").unwrap(), vec![(-40, -10), (-5, 5)]);
        assert_matches!(parse_deletions("30-20"),
                        Err(Error::Batch(BatchError::InvalidDeletion(_))));
        assert_matches!(parse_deletions("30"),
                        Err(Error::Batch(BatchError::InvalidDeletion(_))));
    }

    #[test]
    fn domains() {
        let doms = parse_domains("1-200:domain1;201-500:Zinc finger").unwrap();
        assert_eq!(doms, vec![
            DomainSpec { start_aa: 1, end_aa: 200, name: "domain1".to_owned() },
            DomainSpec { start_aa: 201, end_aa: 500, name: "Zinc finger".to_owned() },
        ]);
        assert_matches!(parse_domains("0-10:a"), Err(Error::Batch(BatchError::InvalidDomain(_))));
        assert_matches!(parse_domains("10-5:a"), Err(Error::Batch(BatchError::InvalidDomain(_))));
        assert_matches!(parse_domains("1-5:"), Err(Error::Batch(BatchError::InvalidDomain(_))));
        assert_matches!(parse_domains("1-5"), Err(Error::Batch(BatchError::InvalidDomain(_))));
        assert_matches!(parse_domains("1-4000000000000000000:big"),
                        Err(Error::Batch(BatchError::InvalidDomain(ref t)))
                        if t == "1-4000000000000000000:big");
        assert_matches!(parse_domains("1-99999999999999999999:huge"),
                        Err(Error::Batch(BatchError::InvalidDomain(_))));
    }

    #[test]
    fn file_name_suffixes() {
        let row = BatchRow {
            transcript_id: "T1".to_owned(),
            snp: Some("150;120".to_owned()),
            deletions: Some("21-30".to_owned()),
            insertions: None,
            domains: Some("1-30:Kinase domain".to_owned()),
        };
        let variants = row.variants().unwrap();
        assert_eq!(variants.file_name("T1"), "T1_SNP_150_120_DEL_21-30_DOM_Kinase_domain.svg");
        assert_eq!(VariantSet::default().file_name("gene:T1/2"), "gene_T1_2.svg");
    }

    #[test]
    fn read_rows() {
        let raw = "\
transcript_id,snp,deletions,insertions,domains
T1,100;200,,150,1-30:d1
T2,,,,
";
        let rows = read_batch(raw.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].transcript_id, "T1");
        let variants = rows[0].variants().unwrap();
        assert_eq!(variants.snps, vec![100, 200]);
        assert!(variants.deletions.is_empty());
        assert_eq!(variants.insertions, vec![150]);
        assert_eq!(rows[1].variants().unwrap(), VariantSet::default());
    }

    #[test]
    fn read_rows_transcript_only() {
        let rows = read_batch("transcript_id\nT9\n".as_bytes()).unwrap();
        assert_eq!(rows, vec![BatchRow::new("T9")]);
    }

    #[test]
    fn read_rows_missing_id() {
        let raw = "transcript_id,snp\nT1,5\n,6\n";
        assert_matches!(read_batch(raw.as_bytes()),
                        Err(Error::Batch(BatchError::MissingTranscriptId(2))));
    }
}
