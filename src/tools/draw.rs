use std::fs;
use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{info, warn};

use gstruct::{read_batch, Annotation, BatchRow, Extent, GffReader, Pipeline, RegionWindow, Span,
              TrackLayout};
use gstruct::render::{self, RenderConfig};

use crate::tools::{ToolError, TEMPLATE_SUBCMD};
use crate::utils::resolve_reader;

pub const NAME: &str = "draw";


pub fn build_cli() -> Command {
    Command::new(NAME)
        .about("Draws transcripts or all transcripts of a region as SVG images")
        .help_template(TEMPLATE_SUBCMD)
        .arg(Arg::new("gff")
                .long("gff")
                .value_name("path")
                .help("Path to input GFF3 annotation file or '-' for stdin")
                .required(true))
        .arg(Arg::new("input")
                .long("input")
                .short('i')
                .value_name("csv")
                .help("Path to batch descriptor with one transcript per row"))
        .arg(Arg::new("transcript")
                .long("transcript")
                .short('t')
                .value_name("id")
                .help("Identifier of a single transcript to draw"))
        .arg(Arg::new("snp")
                .long("snp")
                .value_name("positions")
                .help("SNP positions of --transcript, as 'pos;pos'")
                .requires("transcript"))
        .arg(Arg::new("deletions")
                .long("deletions")
                .value_name("regions")
                .help("Deletions of --transcript, as 'start-end;start-end'")
                .requires("transcript"))
        .arg(Arg::new("insertions")
                .long("insertions")
                .value_name("positions")
                .help("Insertion positions of --transcript, as 'pos;pos'")
                .requires("transcript"))
        .arg(Arg::new("domains")
                .long("domains")
                .value_name("domains")
                .help("Protein domains of --transcript, as 'start-end:name;start-end:name'")
                .requires("transcript"))
        .arg(Arg::new("seqid")
                .long("seqid")
                .value_name("name")
                .help("Sequence name of the region to draw"))
        .arg(Arg::new("start")
                .long("start")
                .value_name("pos")
                .help("Start coordinate of the region to draw")
                .value_parser(value_parser!(i64)))
        .arg(Arg::new("end")
                .long("end")
                .value_name("pos")
                .help("End coordinate of the region to draw")
                .value_parser(value_parser!(i64)))
        .arg(Arg::new("outdir")
                .long("outdir")
                .short('o')
                .value_name("dir")
                .help("Directory to write images to")
                .default_value("."))
        .arg(Arg::new("exon-gradient")
                .long("exon-gradient")
                .help("Fills exons and CDS with a vertical gradient")
                .action(ArgAction::SetTrue))
        .arg(Arg::new("utr-gradient")
                .long("utr-gradient")
                .help("Fills UTRs with a vertical gradient")
                .action(ArgAction::SetTrue))
        .arg(Arg::new("domain-gradient")
                .long("domain-gradient")
                .help("Fills domains with a vertical gradient")
                .action(ArgAction::SetTrue))
        .arg(Arg::new("scale")
                .long("scale")
                .value_name("factor")
                .help("Horizontal scale factor")
                .value_parser(value_parser!(f64))
                .default_value("2.0"))
        .arg(Arg::new("shrink")
                .long("shrink")
                .value_name("bases")
                .help("Number of bases per unscaled horizontal unit")
                .value_parser(value_parser!(f64))
                .default_value("30.0"))
}

/// What to draw.
#[derive(Debug, PartialEq)]
enum Mode {
    /// One image per transcript row.
    Batch { input: Option<String>, row: Option<BatchRow> },
    /// One image of all transcripts overlapping a window.
    Region(RegionWindow),
}

fn resolve_mode(args: &ArgMatches) -> Result<Mode, ToolError> {
    let input = args.get_one::<String>("input").cloned();
    let row = args.get_one::<String>("transcript").map(|tid| BatchRow {
        transcript_id: tid.clone(),
        snp: args.get_one::<String>("snp").cloned(),
        deletions: args.get_one::<String>("deletions").cloned(),
        insertions: args.get_one::<String>("insertions").cloned(),
        domains: args.get_one::<String>("domains").cloned(),
    });
    let seqid = args.get_one::<String>("seqid");
    let start = args.get_one::<i64>("start").copied();
    let end = args.get_one::<i64>("end").copied();

    let is_batch = input.is_some() || row.is_some();
    match (seqid, start, end) {
        (None, None, None) if is_batch => Ok(Mode::Batch { input, row }),
        (None, None, None) => Err(ToolError::InvalidMode(
            "either --input or --transcript, or a region given by --seqid, --start, and --end \
             is required")),
        (Some(_), Some(_), Some(_)) if is_batch => Err(ToolError::InvalidMode(
            "batch input and region flags can not be used together")),
        (Some(seqid), Some(start), Some(end)) => RegionWindow::new(seqid.as_str(), start, end)
            .map(Mode::Region)
            .map_err(|e| ToolError::from(gstruct::Error::from(e))),
        _ => Err(ToolError::InvalidMode("--seqid, --start, and --end must be given together")),
    }
}

fn render_config(args: &ArgMatches) -> RenderConfig {
    let mut config = RenderConfig::default()
        .exon_gradient(args.get_flag("exon-gradient"))
        .utr_gradient(args.get_flag("utr-gradient"))
        .domain_gradient(args.get_flag("domain-gradient"));
    if let Some(&scale) = args.get_one::<f64>("scale") {
        config = config.scale(scale);
    }
    if let Some(&shrink) = args.get_one::<f64>("shrink") {
        config = config.shrink_factor(shrink);
    }
    config
}

/// Draws one image per row, skipping rows that can not be drawn.
fn draw_batch(
    annotation: &Annotation,
    rows: &[BatchRow],
    config: &RenderConfig,
    outdir: &Path,
) -> Result<Vec<PathBuf>, ToolError> {
    let mut written = Vec::new();
    for row in rows {
        let variants = match row.variants() {
            Ok(variants) => variants,
            Err(e) => {
                warn!("skipping transcript '{}': {}", row.transcript_id, e);
                continue;
            },
        };
        let transcript = match annotation.transcript(&row.transcript_id)? {
            Some(trx) => trx,
            None => {
                warn!("transcript '{}' not found in the annotation, skipping", row.transcript_id);
                continue;
            },
        };

        let pipeline = Pipeline::new(transcript).add_introns().to_relative();
        let transcript = variants.apply(pipeline).into_transcript();

        let path = outdir.join(variants.file_name(&row.transcript_id));
        render::save(&path, &render::render_transcript(&transcript, config))?;
        info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Draws all transcripts overlapping the window into one image.
///
/// Returns `None` when the window holds no transcripts.
fn draw_region(
    annotation: &Annotation,
    window: &RegionWindow,
    config: &RenderConfig,
    outdir: &Path,
) -> Result<Option<PathBuf>, ToolError> {
    let mut transcripts = annotation.region_transcripts(window)?;
    if transcripts.is_empty() {
        warn!("no transcripts overlap {}:{}-{}, nothing drawn",
              window.seq_name(), window.start(), window.end());
        return Ok(None);
    }
    for trx in transcripts.iter_mut() {
        trx.add_introns();
    }

    let extents = transcripts.iter()
        .map(|trx| trx.extent().unwrap_or(Extent { start: window.start(), end: window.start() }))
        .collect::<Vec<Extent>>();
    let layout = TrackLayout::assign(&extents);
    info!("placed {} transcripts on {} tracks", transcripts.len(), layout.num_tracks());

    let path = outdir.join(format!("{}.svg", window.file_stem()));
    render::save(&path, &render::render_region(&transcripts, &layout, window, config))?;
    info!("wrote {}", path.display());
    Ok(Some(path))
}

pub fn run(args: &ArgMatches) -> Result<(), ToolError> {
    let mode = resolve_mode(args)?;
    let config = render_config(args);
    let outdir = args.get_one::<String>("outdir").map_or_else(|| PathBuf::from("."), PathBuf::from);

    let gff = args.get_one::<String>("gff")
        .ok_or(ToolError::InvalidMode("--gff is required"))?;
    let annotation = GffReader::from_reader(resolve_reader(gff)?).read_annotation()?;
    fs::create_dir_all(&outdir)?;

    match mode {
        Mode::Batch { input, row } => {
            let mut rows = match input {
                Some(path) => read_batch(resolve_reader(&path)?)?,
                None => Vec::new(),
            };
            rows.extend(row);
            let _ = draw_batch(&annotation, &rows, &config, &outdir)?;
        },
        Mode::Region(window) => {
            let _ = draw_region(&annotation, &window, &config, &outdir)?;
        },
    }
    Ok(())
}

#[cfg(test)]
mod test_draw {
    use super::*;
    use tempfile::TempDir;

    static GENES_GFF3: &str = include_str!("../../gstruct/tests/data/genes.gff3");

    fn matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec![NAME];
        argv.extend_from_slice(args);
        build_cli().try_get_matches_from(argv).unwrap()
    }

    fn gff_file(dir: &TempDir) -> String {
        let path = dir.path().join("genes.gff3");
        fs::write(&path, GENES_GFF3).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn svg_files(dir: &Path) -> Vec<String> {
        let mut names = fs::read_dir(dir).unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".svg"))
            .collect::<Vec<String>>();
        names.sort();
        names
    }

    #[test]
    fn mode_batch() {
        let args = matches(&["--gff", "a.gff3", "--transcript", "T1", "--snp", "5;6"]);
        match resolve_mode(&args).unwrap() {
            Mode::Batch { input, row } => {
                assert_eq!(input, None);
                let row = row.unwrap();
                assert_eq!(row.transcript_id, "T1");
                assert_eq!(row.snp, Some("5;6".to_owned()));
                assert_eq!(row.domains, None);
            },
            other => panic!("unexpected mode: {:?}", other),
        }
    }

    #[test]
    fn mode_region() {
        let args = matches(&["--gff", "a.gff3", "--seqid", "chr1", "--start", "1",
                             "--end", "2000"]);
        let window = RegionWindow::new("chr1", 1, 2000).unwrap();
        assert_eq!(resolve_mode(&args).unwrap(), Mode::Region(window));
    }

    #[test]
    fn mode_invalid() {
        let partial = matches(&["--gff", "a.gff3", "--seqid", "chr1", "--start", "1"]);
        assert!(matches!(resolve_mode(&partial), Err(ToolError::InvalidMode(_))));

        let both = matches(&["--gff", "a.gff3", "--transcript", "T1", "--seqid", "chr1",
                             "--start", "1", "--end", "10"]);
        assert!(matches!(resolve_mode(&both), Err(ToolError::InvalidMode(_))));

        let neither = matches(&["--gff", "a.gff3"]);
        assert!(matches!(resolve_mode(&neither), Err(ToolError::InvalidMode(_))));

        let reversed = matches(&["--gff", "a.gff3", "--seqid", "chr1", "--start", "10",
                                 "--end", "1"]);
        assert!(matches!(resolve_mode(&reversed), Err(ToolError::Lib(_))));
    }

    #[test]
    fn variant_flags_need_transcript() {
        let argv = vec![NAME, "--gff", "a.gff3", "--snp", "5"];
        assert!(build_cli().try_get_matches_from(argv).is_err());
    }

    #[test]
    fn config_from_flags() {
        let args = matches(&["--gff", "a.gff3", "--transcript", "T1", "--exon-gradient",
                             "--scale", "3"]);
        let expected = RenderConfig::default().exon_gradient(true).scale(3.0);
        assert_eq!(render_config(&args), expected);
    }

    #[test]
    fn run_batch() {
        let dir = TempDir::new().unwrap();
        let gff = gff_file(&dir);
        let outdir = dir.path().join("out");
        let batch = dir.path().join("batch.csv");
        fs::write(&batch, "transcript_id,snp,deletions,insertions,domains\n\
                           T1,,21-30,,\n\
                           T404,,,,\n\
                           T2,5;x,,,\n").unwrap();

        let args = matches(&["--gff", &gff, "--input", batch.to_str().unwrap(),
                             "--transcript", "T2", "--domains", "1-10:Kinase",
                             "--outdir", outdir.to_str().unwrap()]);
        run(&args).unwrap();
        assert_eq!(svg_files(&outdir), vec!["T1_DEL_21-30.svg", "T2_DOM_Kinase.svg"]);

        let drawn = fs::read_to_string(outdir.join("T2_DOM_Kinase.svg")).unwrap();
        assert!(drawn.contains("<svg"));
        assert!(drawn.contains("#add8e6"));
    }

    #[test]
    fn run_region() {
        let dir = TempDir::new().unwrap();
        let gff = gff_file(&dir);
        let outdir = dir.path().join("out");
        let args = matches(&["--gff", &gff, "--seqid", "chr1", "--start", "1", "--end", "6000",
                             "--outdir", outdir.to_str().unwrap()]);
        run(&args).unwrap();
        assert_eq!(svg_files(&outdir), vec!["chr1_1-6000.svg"]);
    }

    #[test]
    fn run_empty_region() {
        let dir = TempDir::new().unwrap();
        let gff = gff_file(&dir);
        let outdir = dir.path().join("out");
        let args = matches(&["--gff", &gff, "--seqid", "chr3", "--start", "1", "--end", "6000",
                             "--outdir", outdir.to_str().unwrap()]);
        run(&args).unwrap();
        assert!(svg_files(&outdir).is_empty());
    }
}
