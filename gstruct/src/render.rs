/*! SVG drawing of transcripts.

Rendering consumes finished transcripts and never changes them. Every style and geometry
setting lives in a [`RenderConfig`] passed to the drawing functions.

Horizontal positions are `left_margin + (pos - origin) / shrink_factor * scale`, where the
origin is the leftmost coordinate that has to fit on the canvas.
*/
use std::path::Path;

use bio_types::strand::Strand;
use itertools::Itertools;
use linked_hash_map::LinkedHashMap;
use svg::Document;
use svg::node::element::{Definitions, Group, Line, LinearGradient, Polygon, Polyline,
                         Rectangle, Stop, Text};

use crate::{Error, Feature, FeatureKind, RegionWindow, Result, TrackLayout, Transcript,
            terminal_feature};
use crate::span::Span;


/// Space above the first feature row.
const TOP_MARGIN: f64 = 50.0;

/// Height of the deletion chevron above the feature midline.
const CHEVRON_HEIGHT: f64 = 10.0;

const MARKER_WIDTH: f64 = 8.0;
const MARKER_HEIGHT: f64 = 6.0;

/// Distance between the feature row and insertion or SNP marker ends.
const MARKER_OFFSET: f64 = 8.0;

/// Lightening factors of the middle and top gradient stops.
const GRADIENT_LIGHT: f64 = 0.4;
const GRADIENT_LIGHTER: f64 = 0.7;

const BLACK: &str = "#000000";

/// Fill and outline of one feature kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStyle {
    pub fill: String,
    pub outline: String,
    pub outline_width: f64,
    pub outline_enabled: bool,
}

impl FeatureStyle {

    /// Style with the given fill and a black outline of width 1.
    pub fn new<T: Into<String>>(fill: T) -> FeatureStyle {
        FeatureStyle {
            fill: fill.into(),
            outline: BLACK.to_owned(),
            outline_width: 1.0,
            outline_enabled: true,
        }
    }

    fn stroke(&self) -> (&str, f64) {
        if self.outline_enabled {
            (self.outline.as_str(), self.outline_width)
        } else {
            ("none", 0.0)
        }
    }
}

/// Drawing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    exon: FeatureStyle,
    utr5: FeatureStyle,
    utr3: FeatureStyle,
    intron: FeatureStyle,
    domain: FeatureStyle,
    exon_gradient: bool,
    utr_gradient: bool,
    domain_gradient: bool,
    scale: f64,
    shrink_factor: f64,
    left_margin: f64,
    extra_padding: f64,
    feature_height: f64,
    track_height: f64,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            exon: FeatureStyle::new("#1e90ff"),
            utr5: FeatureStyle::new("#ffffff"),
            utr3: FeatureStyle::new("#ffffff"),
            intron: FeatureStyle::new(BLACK),
            domain: FeatureStyle::new("#008000"),
            exon_gradient: false,
            utr_gradient: false,
            domain_gradient: false,
            scale: 2.0,
            shrink_factor: 30.0,
            left_margin: 50.0,
            extra_padding: 100.0,
            feature_height: 15.0,
            track_height: 40.0,
        }
    }
}

impl RenderConfig {

    /// Style of exon and CDS features.
    pub fn exon_style(mut self, style: FeatureStyle) -> Self {
        self.exon = style;
        self
    }

    pub fn utr5_style(mut self, style: FeatureStyle) -> Self {
        self.utr5 = style;
        self
    }

    pub fn utr3_style(mut self, style: FeatureStyle) -> Self {
        self.utr3 = style;
        self
    }

    /// Style of intron lines, drawn in the fill color.
    pub fn intron_style(mut self, style: FeatureStyle) -> Self {
        self.intron = style;
        self
    }

    /// Outline of domain boxes. The fill is used only for domains without a color.
    pub fn domain_style(mut self, style: FeatureStyle) -> Self {
        self.domain = style;
        self
    }

    pub fn exon_gradient(mut self, enabled: bool) -> Self {
        self.exon_gradient = enabled;
        self
    }

    pub fn utr_gradient(mut self, enabled: bool) -> Self {
        self.utr_gradient = enabled;
        self
    }

    pub fn domain_gradient(mut self, enabled: bool) -> Self {
        self.domain_gradient = enabled;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Number of bases per unscaled horizontal unit.
    pub fn shrink_factor(mut self, shrink_factor: f64) -> Self {
        self.shrink_factor = shrink_factor;
        self
    }

    pub fn left_margin(mut self, left_margin: f64) -> Self {
        self.left_margin = left_margin;
        self
    }

    pub fn extra_padding(mut self, extra_padding: f64) -> Self {
        self.extra_padding = extra_padding;
        self
    }

    pub fn feature_height(mut self, feature_height: f64) -> Self {
        self.feature_height = feature_height;
        self
    }

    pub fn track_height(mut self, track_height: f64) -> Self {
        self.track_height = track_height;
        self
    }

    /// Style and gradient toggle of a box-drawn feature kind.
    fn box_style(&self, kind: &FeatureKind) -> Option<(&FeatureStyle, bool)> {
        match kind {
            FeatureKind::Exon | FeatureKind::Cds => Some((&self.exon, self.exon_gradient)),
            FeatureKind::Utr5 => Some((&self.utr5, self.utr_gradient)),
            FeatureKind::Utr3 => Some((&self.utr3, self.utr_gradient)),
            _ => None,
        }
    }
}

/// Lightens a `#rrggbb` color by moving its HLS lightness towards white.
///
/// Returns `None` for colors in any other notation.
pub fn lighten_color(hex: &str, factor: f64) -> Option<String> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |idx: usize| {
        u8::from_str_radix(&digits[idx..idx + 2], 16).map(|v| f64::from(v) / 255.0)
    };
    let (r, g, b) = (channel(0).ok()?, channel(2).ok()?, channel(4).ok()?);

    let (h, l, s) = rgb_to_hls(r, g, b);
    let l = (l + factor * (1.0 - l)).min(1.0);
    let (r, g, b) = hls_to_rgb(h, l, s);

    let byte = |v: f64| (v * 255.0) as u8;
    Some(format!("#{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b)))
}

fn rgb_to_hls(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let l = (maxc + minc) / 2.0;
    if maxc == minc {
        return (0.0, l, 0.0);
    }
    let range = maxc - minc;
    let s = if l <= 0.5 { range / (maxc + minc) } else { range / (2.0 - maxc - minc) };
    let (rc, gc, bc) = ((maxc - r) / range, (maxc - g) / range, (maxc - b) / range);
    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    ((h / 6.0).rem_euclid(1.0), l, s)
}

fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    let channel = |hue: f64| {
        let hue = hue.rem_euclid(1.0);
        if hue < 1.0 / 6.0 {
            m1 + (m2 - m1) * hue * 6.0
        } else if hue < 0.5 {
            m2
        } else if hue < 2.0 / 3.0 {
            m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
        } else {
            m1
        }
    };
    (channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

/// Gradient definitions, one per base color.
#[derive(Default)]
struct Gradients {
    ids: LinkedHashMap<String, String>,
    defs: Vec<LinearGradient>,
}

impl Gradients {

    /// Fill value for the given base color, creating its gradient on first use.
    ///
    /// Falls back to the plain color when gradients are disabled or the color can not be
    /// lightened.
    fn fill(&mut self, base: &str, enabled: bool) -> String {
        if !enabled {
            return base.to_owned();
        }
        if let Some(id) = self.ids.get(base) {
            return format!("url(#{})", id);
        }
        let (light, lighter) = match (lighten_color(base, GRADIENT_LIGHT),
                                      lighten_color(base, GRADIENT_LIGHTER)) {
            (Some(light), Some(lighter)) => (light, lighter),
            _ => return base.to_owned(),
        };
        let id = format!("grad_{}", self.ids.len());
        self.defs.push(LinearGradient::new()
            .set("id", id.as_str())
            .set("x1", "0%").set("y1", "100%")
            .set("x2", "0%").set("y2", "0%")
            .add(Stop::new().set("offset", 0.0).set("stop-color", base))
            .add(Stop::new().set("offset", 0.5).set("stop-color", light))
            .add(Stop::new().set("offset", 1.0).set("stop-color", lighter)));
        let fill = format!("url(#{})", id);
        let _ = self.ids.insert(base.to_owned(), id);
        fill
    }

    fn into_definitions(self) -> Definitions {
        self.defs.into_iter().fold(Definitions::new(), |defs, grad| defs.add(grad))
    }
}

/// Maps coordinates onto the canvas.
#[derive(Debug, Clone, Copy)]
struct Frame {
    origin: i64,
    left: f64,
    scale: f64,
    shrink: f64,
}

impl Frame {

    fn x(&self, pos: i64) -> f64 {
        self.left + (pos - self.origin) as f64 / self.shrink * self.scale
    }
}

/// Formats a `points` attribute value.
fn points(coords: &[(f64, f64)]) -> String {
    coords.iter().map(|(x, y)| format!("{},{}", x, y)).join(" ")
}

/// Right-most or left-most feature to draw as an arrow, by the same kind priority as
/// [`terminal_feature`].
fn arrow_feature<'a>(features: &[&'a Feature], pointing_left: bool) -> Option<&'a Feature> {
    if !pointing_left {
        return terminal_feature(features);
    }
    [FeatureKind::Utr3, FeatureKind::Cds, FeatureKind::Exon].iter()
        .filter_map(|kind| {
            features.iter()
                .filter(|fx| fx.kind() == kind)
                .fold(None, |acc: Option<&'a Feature>, fx| match acc {
                    Some(best) if best.start() <= fx.start() => Some(best),
                    _ => Some(*fx),
                })
        })
        .next()
}

/// Draws the features of a transcript in one row starting at `y`.
fn draw_features(
    mut group: Group,
    transcript: &Transcript,
    frame: &Frame,
    y: f64,
    pointing_left: bool,
    config: &RenderConfig,
    gradients: &mut Gradients,
) -> Group {
    let h = config.feature_height;
    let mid = y + h / 2.0;
    let features = transcript.sorted_features();
    let arrow = arrow_feature(&features, pointing_left);

    for &fx in features.iter() {
        let (x1, x2) = (frame.x(fx.start()), frame.x(fx.end()));
        match fx.kind() {
            FeatureKind::Deletion => {
                group = group.add(Polyline::new()
                    .set("points", points(&[(x1, mid), ((x1 + x2) / 2.0, mid - CHEVRON_HEIGHT),
                                            (x2, mid)]))
                    .set("fill", "none")
                    .set("stroke", BLACK)
                    .set("stroke-width", 1.0)
                    .set("stroke-dasharray", "2,2"));
            },
            FeatureKind::Intron => {
                if x1 < x2 {
                    group = group.add(Line::new()
                        .set("x1", x1).set("y1", mid)
                        .set("x2", x2).set("y2", mid)
                        .set("stroke", config.intron.fill.as_str())
                        .set("stroke-width", config.intron.outline_width));
                }
            },
            kind => {
                let (style, gradient) = match config.box_style(kind) {
                    Some(found) => found,
                    None => continue,
                };
                let fill = gradients.fill(&style.fill, gradient);
                let (stroke, stroke_width) = style.stroke();
                if arrow.map_or(false, |a| ::std::ptr::eq(a, fx)) {
                    let tip = (h / 2.0).min(x2 - x1);
                    let outline = if pointing_left {
                        [(x2, y), (x1 + tip, y), (x1, mid), (x1 + tip, y + h), (x2, y + h)]
                    } else {
                        [(x1, y), (x2 - tip, y), (x2, mid), (x2 - tip, y + h), (x1, y + h)]
                    };
                    group = group.add(Polygon::new()
                        .set("points", points(&outline))
                        .set("fill", fill)
                        .set("stroke", stroke)
                        .set("stroke-width", stroke_width));
                } else {
                    group = group.add(Rectangle::new()
                        .set("x", x1).set("y", y)
                        .set("width", x2 - x1).set("height", h)
                        .set("fill", fill)
                        .set("stroke", stroke)
                        .set("stroke-width", stroke_width));
                }
            },
        }
    }

    for &pos in transcript.insertions() {
        let x = frame.x(pos);
        let top = y - MARKER_OFFSET;
        group = group.add(Polygon::new()
            .set("points", points(&[(x - MARKER_WIDTH / 2.0, top), (x + MARKER_WIDTH / 2.0, top),
                                    (x, top + MARKER_HEIGHT)]))
            .set("fill", BLACK)
            .set("stroke", BLACK)
            .set("stroke-width", 1.5));
    }

    for &pos in transcript.snps() {
        let x = frame.x(pos);
        group = group.add(Line::new()
            .set("x1", x).set("y1", y - MARKER_OFFSET)
            .set("x2", x).set("y2", y + h + MARKER_OFFSET)
            .set("stroke", BLACK)
            .set("stroke-width", 1.2));
    }

    // domains sit on top of everything else
    let (stroke, stroke_width) = config.domain.stroke();
    for &fx in features.iter().filter(|fx| fx.name().is_some()) {
        let (x1, x2) = (frame.x(fx.start()), frame.x(fx.end()));
        let base = fx.color().unwrap_or(config.domain.fill.as_str());
        group = group.add(Rectangle::new()
            .set("x", x1).set("y", y)
            .set("width", x2 - x1).set("height", h)
            .set("fill", gradients.fill(base, config.domain_gradient))
            .set("stroke", stroke)
            .set("stroke-width", stroke_width));
    }

    group
}

fn document(width: f64, height: f64, gradients: Gradients, body: Group) -> Document {
    Document::new()
        .set("viewBox", (0.0, 0.0, width, height))
        .set("width", width)
        .set("height", height)
        .add(gradients.into_definitions())
        .add(body)
}

/// Draws a single transcript.
///
/// The canvas is shifted so features before the origin, such as a 5'UTR left of the first
/// coding base, stay visible.
pub fn render_transcript(transcript: &Transcript, config: &RenderConfig) -> Document {
    let (min_start, max_end) = transcript.extent()
        .map(|ext| (ext.start, ext.end))
        .unwrap_or((0, 0));
    let frame = Frame {
        origin: min_start.min(0),
        left: config.left_margin,
        scale: config.scale,
        shrink: config.shrink_factor,
    };

    let mut gradients = Gradients::default();
    let body = draw_features(Group::new(), transcript, &frame, TOP_MARGIN, false, config,
                             &mut gradients);

    let width = frame.x(max_end) + config.extra_padding;
    let height = 2.0 * TOP_MARGIN + config.feature_height;
    document(width, height, gradients, body)
}

/// Draws all transcripts of a region on one shared axis, one row per track.
///
/// Transcripts are labelled with their identifier. Minus strand transcripts point left.
pub fn render_region(
    transcripts: &[Transcript],
    layout: &TrackLayout,
    window: &RegionWindow,
    config: &RenderConfig,
) -> Document {
    let extents = transcripts.iter().filter_map(|trx| trx.extent()).collect::<Vec<_>>();
    let min_start = extents.iter().map(|ext| ext.start).min()
        .map_or(window.start(), |start| start.min(window.start()));
    let max_end = extents.iter().map(|ext| ext.end).max()
        .map_or(window.end(), |end| end.max(window.end()));
    let frame = Frame {
        origin: min_start,
        left: config.left_margin,
        scale: config.scale,
        shrink: config.shrink_factor,
    };

    let mut gradients = Gradients::default();
    let mut body = Group::new();
    for (idx, trx) in transcripts.iter().enumerate() {
        let track = layout.track_of(idx).unwrap_or(idx);
        let y = TOP_MARGIN + track as f64 * config.track_height;
        let label_x = trx.extent().map_or(frame.x(window.start()), |ext| frame.x(ext.start));
        body = body.add(Text::new(trx.id())
            .set("x", label_x)
            .set("y", y - 4.0)
            .set("font-family", "sans-serif")
            .set("font-size", 10)
            .set("fill", BLACK));
        let pointing_left = matches!(trx.strand(), Strand::Reverse);
        body = draw_features(body, trx, &frame, y, pointing_left, config, &mut gradients);
    }

    let rows = layout.num_tracks().max(1) as f64;
    let width = frame.x(max_end) + config.extra_padding;
    let height = 2.0 * TOP_MARGIN + (rows - 1.0) * config.track_height + config.feature_height;
    document(width, height, gradients, body)
}

/// Writes a drawing to the given path.
pub fn save<P: AsRef<Path>>(path: P, document: &Document) -> Result<()> {
    svg::save(path, document).map_err(Error::from)
}
