//! Incremental atlas parser.
//!
//! The parser is pull-based: [`AtlasParser::advance`] consumes lines until it
//! either reaches the end of the text or finishes reading a page header. In the
//! second case it returns [`ParseStep::LoadTexture`] and will not read any
//! further until [`AtlasParser::resolve_texture`] hands it the page image,
//! because region coordinates are divided by that image's resolution.
//!
//! Page layout:
//!
//! ```text
//! hero.png
//! size: 256, 128        (optional)
//! format: RGBA8888
//! filter: Linear, Linear
//! repeat: none
//! head
//!   rotate: false
//!   xy: 2, 4
//!   size: 30, 40
//!   split: 1, 2, 3, 4   (optional)
//!   pad: 1, 1, 1, 1     (optional, only after split)
//!   orig: 34, 44
//!   offset: 2, 1
//!   index: -1
//! ```
//!
//! A blank line ends the page; the next non-blank line names a new one.

use crate::error::AtlasError;
use crate::model::{usable_resolution, Atlas, Page, Rect, Region};
use crate::reader::{parse_field, parse_float, LineReader, Tuple};
use crate::texture::{ImageResource, RepeatAxis, SharedImage, TextureFilter};

/// Rotation code written for `rotate: true`.
pub const ROTATE_TRUE: i32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStep {
    /// A page header was read. Pass the image for this page name to
    /// [`AtlasParser::resolve_texture`] before advancing again.
    LoadTexture(String),
    /// Every line has been consumed.
    Finished,
}

/// Page header read from text, waiting for its image.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPage {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub repeat: RepeatAxis,
}

impl PendingPage {
    fn finalize(self, image: SharedImage, resolution: f32) -> Page {
        if !image.is_valid() {
            image.set_size(self.width, self.height);
        }
        let mut page = Page {
            name: self.name,
            width: self.width,
            height: self.height,
            min_filter: self.min_filter,
            mag_filter: self.mag_filter,
            u_wrap: self.repeat.u_wrap(),
            v_wrap: self.repeat.v_wrap(),
            image,
            resolution,
        };
        page.image.apply_sampler(page.sampler());

        if page.width == 0 || page.height == 0 {
            page.width = page.image.real_width();
            page.height = page.image.real_height();
            if page.width == 0 || page.height == 0 {
                log::warn!(
                    "Atlas page '{}' has no size; meshes using it will not map correctly. Declare `size:` in the atlas.",
                    page.name
                );
            }
        }
        page
    }
}

/// One region exactly as written, before resolution scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub name: String,
    pub rotate: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub splits: Option<[i32; 4]>,
    pub pads: Option<[i32; 4]>,
    pub orig_width: i32,
    pub orig_height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub index: i32,
}

impl RegionRecord {
    pub fn finalize(&self, page: usize, resolution: f32) -> Region {
        let x = self.x as f32 / resolution;
        let y = self.y as f32 / resolution;
        let width = self.width as f32 / resolution;
        let height = self.height as f32 / resolution;
        let orig_width = self.orig_width as f32 / resolution;
        let orig_height = self.orig_height as f32 / resolution;
        let offset_x = self.offset_x as f32 / resolution;
        let offset_y = self.offset_y as f32 / resolution;

        // Packed frames of rotated regions are stored sideways.
        let frame = if self.rotate != 0 {
            Rect::new(x, y, height, width)
        } else {
            Rect::new(x, y, width, height)
        };

        Region {
            name: self.name.clone(),
            page,
            index: self.index,
            rotate: self.rotate,
            frame,
            orig: Rect::new(0.0, 0.0, orig_width, orig_height),
            // Packer offsets count from the bottom edge.
            trim: Rect::new(offset_x, orig_height - height - offset_y, width, height),
            splits: self.splits,
            pads: self.pads,
        }
    }
}

/// Maps a `rotate:` value to a rotation code.
///
/// `true` is [`ROTATE_TRUE`], `false` is 0, and a degree angle `d` becomes
/// `((720 - d) % 360) / 45` truncated toward zero, with `%` keeping the sign of
/// the dividend.
pub fn decode_rotation(value: &str) -> Result<i32, AtlasError> {
    if value.eq_ignore_ascii_case("true") {
        return Ok(ROTATE_TRUE);
    }
    if value.eq_ignore_ascii_case("false") {
        return Ok(0);
    }
    let degrees = parse_float("rotate", value)?;
    Ok((((720.0 - degrees) % 360.0) / 45.0) as i32)
}

#[derive(Debug)]
enum ParserState {
    ExpectingPage,
    AwaitingTexture(PendingPage),
    ParsingRegions { page: usize, resolution: f32 },
    Done,
    Failed,
}

#[derive(Debug)]
pub struct AtlasParser {
    reader: LineReader,
    tuple: Tuple,
    atlas: Atlas,
    state: ParserState,
}

impl AtlasParser {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_atlas(text, Atlas::new())
    }

    /// Parses into an atlas that may already hold pages, e.g. from
    /// [`Atlas::add_texture`].
    pub fn with_atlas(text: impl Into<String>, atlas: Atlas) -> Self {
        Self {
            reader: LineReader::new(text),
            tuple: Tuple::default(),
            atlas,
            state: ParserState::ExpectingPage,
        }
    }

    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    pub fn into_atlas(self) -> Atlas {
        self.atlas
    }

    /// Moves the atlas out, leaving an empty one behind.
    pub fn take_atlas(&mut self) -> Atlas {
        std::mem::take(&mut self.atlas)
    }

    pub fn pending_page(&self) -> Option<&PendingPage> {
        match &self.state {
            ParserState::AwaitingTexture(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, ParserState::Done)
    }

    pub fn advance(&mut self) -> Result<ParseStep, AtlasError> {
        let step = self.advance_lines();
        if step.is_err() {
            self.state = ParserState::Failed;
        }
        step
    }

    /// Finishes the pending page with its image. `None` means the image could
    /// not be loaded: the page is dropped and the parse stops.
    pub fn resolve_texture(&mut self, image: Option<SharedImage>) -> Result<(), AtlasError> {
        let pending = match std::mem::replace(&mut self.state, ParserState::Failed) {
            ParserState::AwaitingTexture(pending) => pending,
            other => {
                self.state = other;
                return Err(AtlasError::NoPendingPage);
            }
        };

        let Some(image) = image else {
            log::error!("Texture for atlas page '{}' failed to load", pending.name);
            return Err(AtlasError::PageLoadFailed { page: pending.name });
        };

        let resolution = usable_resolution(&pending.name, &image);
        let page = self.atlas.push_page(pending.finalize(image, resolution));
        log::debug!(
            "Atlas page '{}' resolved at resolution {}",
            self.atlas.pages()[page].name,
            resolution
        );
        self.state = ParserState::ParsingRegions { page, resolution };
        Ok(())
    }

    fn advance_lines(&mut self) -> Result<ParseStep, AtlasError> {
        loop {
            match &self.state {
                ParserState::Done => return Ok(ParseStep::Finished),
                ParserState::Failed => return Err(AtlasError::Aborted),
                ParserState::AwaitingTexture(pending) => {
                    return Ok(ParseStep::LoadTexture(pending.name.clone()))
                }
                ParserState::ExpectingPage | ParserState::ParsingRegions { .. } => {}
            }

            let Some(line) = self.reader.read_line() else {
                self.state = ParserState::Done;
                log::info!(
                    "Parsed atlas: {} pages, {} regions",
                    self.atlas.pages().len(),
                    self.atlas.regions().len()
                );
                return Ok(ParseStep::Finished);
            };
            let line = line.trim().to_string();

            if line.is_empty() {
                self.state = ParserState::ExpectingPage;
                continue;
            }

            match self.state {
                ParserState::ParsingRegions { page, resolution } => {
                    let record = self.read_region(line)?;
                    self.atlas.push_region(record.finalize(page, resolution));
                }
                _ => {
                    let pending = self.read_page_header(line)?;
                    let name = pending.name.clone();
                    log::debug!("Atlas page '{}' waiting for its texture", name);
                    self.state = ParserState::AwaitingTexture(pending);
                    return Ok(ParseStep::LoadTexture(name));
                }
            }
        }
    }

    fn read_page_header(&mut self, name: String) -> Result<PendingPage, AtlasError> {
        let reader = &mut self.reader;
        let tuple = &mut self.tuple;

        let mut width = 0;
        let mut height = 0;
        // Old packers omit `size:`, in which case this line is `format:`.
        if reader.read_tuple(tuple)? == 2 {
            width = parse_field("page width", &tuple[0])?;
            height = parse_field("page height", &tuple[1])?;
            reader.read_tuple(tuple)?;
        }

        reader.read_tuple(tuple)?;
        let min_filter = tuple[0].parse::<TextureFilter>()?;
        let mag_filter = tuple[1].parse::<TextureFilter>()?;

        let repeat = RepeatAxis::from_token(reader.read_value()?);

        Ok(PendingPage {
            name,
            width,
            height,
            min_filter,
            mag_filter,
            repeat,
        })
    }

    fn read_region(&mut self, name: String) -> Result<RegionRecord, AtlasError> {
        let reader = &mut self.reader;
        let tuple = &mut self.tuple;

        let rotate = decode_rotation(reader.read_value()?)?;

        reader.read_tuple(tuple)?;
        let x = parse_field("x", &tuple[0])?;
        let y = parse_field("y", &tuple[1])?;

        reader.read_tuple(tuple)?;
        let width = parse_field("width", &tuple[0])?;
        let height = parse_field("height", &tuple[1])?;

        let mut splits = None;
        let mut pads = None;
        // Any 4-field tuple here is taken as `split:`, then `pad:`.
        if reader.read_tuple(tuple)? == 4 {
            splits = Some(parse_quad("split", tuple)?);
            if reader.read_tuple(tuple)? == 4 {
                pads = Some(parse_quad("pad", tuple)?);
                reader.read_tuple(tuple)?;
            }
        }

        let orig_width = parse_field("orig width", &tuple[0])?;
        let orig_height = parse_field("orig height", &tuple[1])?;

        reader.read_tuple(tuple)?;
        let offset_x = parse_field("offset x", &tuple[0])?;
        let offset_y = parse_field("offset y", &tuple[1])?;

        let index = parse_field("index", reader.read_value()?)?;

        Ok(RegionRecord {
            name,
            rotate,
            x,
            y,
            width,
            height,
            splits,
            pads,
            orig_width,
            orig_height,
            offset_x,
            offset_y,
            index,
        })
    }
}

fn parse_quad(field: &'static str, tuple: &Tuple) -> Result<[i32; 4], AtlasError> {
    Ok([
        parse_field(field, &tuple[0])?,
        parse_field(field, &tuple[1])?,
        parse_field(field, &tuple[2])?,
        parse_field(field, &tuple[3])?,
    ])
}
