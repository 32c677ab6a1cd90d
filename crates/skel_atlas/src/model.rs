//! Pages and regions produced by the parser.
//!
//! Regions refer to their page by index into [`Atlas::pages`]. Pages are only
//! ever appended, so an index handed out once stays valid for the atlas'
//! lifetime.

use std::rc::Rc;

use skel_core::Disposable;

use crate::texture::{ImageResource, SamplerSettings, SharedImage, TextureFilter, TextureWrap};

/// Page name used for pages created from already loaded images.
pub const TEXTURE_PAGE_NAME: &str = "texturePage";

/// Axis-aligned rectangle in resolution-adjusted units.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub name: String,
    /// Declared or derived size in raw pixels, 0 when neither was available.
    pub width: u32,
    pub height: u32,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub u_wrap: TextureWrap,
    pub v_wrap: TextureWrap,
    pub image: SharedImage,
    pub(crate) resolution: f32,
}

impl Page {
    pub fn sampler(&self) -> SamplerSettings {
        SamplerSettings::from_filters(self.min_filter, self.u_wrap, self.v_wrap)
    }

    /// Scale that region coordinates on this page were divided by.
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Page size divided by the image resolution.
    pub fn logical_size(&self) -> (f32, f32) {
        let resolution = self.resolution();
        (
            self.width as f32 / resolution,
            self.height as f32 / resolution,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    /// Index into [`Atlas::pages`].
    pub page: usize,
    /// Packing index for multi-part regions, -1 when unused.
    pub index: i32,
    /// 6 for a region packed with `rotate: true`, otherwise derived from the
    /// degree angle (see `decode_rotation`).
    pub rotate: i32,
    /// Packed rectangle inside the page image. Width and height are swapped
    /// when the region is rotated.
    pub frame: Rect,
    /// Untrimmed size, always at the origin.
    pub orig: Rect,
    /// Visible pixels within `orig`.
    pub trim: Rect,
    /// Nine-patch split lines in raw pixels (left, right, top, bottom).
    pub splits: Option<[i32; 4]>,
    /// Nine-patch content padding in raw pixels, only present with splits.
    pub pads: Option<[i32; 4]>,
}

impl Region {
    /// Any non-zero rotation code swaps the frame axes, not only the 90°
    /// `true` code.
    pub fn is_rotated(&self) -> bool {
        self.rotate != 0
    }
}

#[derive(Debug, Default, Clone)]
pub struct Atlas {
    pages: Vec<Page>,
    regions: Vec<Region>,
}

impl Atlas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_of(&self, region: &Region) -> Option<&Page> {
        self.pages.get(region.page)
    }

    pub fn find_page(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.name == name)
    }

    /// First region named `name`, in declaration order.
    ///
    /// This is a linear scan. Callers doing many lookups should index
    /// [`Atlas::regions`] themselves.
    pub fn find_region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.name == name)
    }

    /// Normalized `[u0, v0, u1, v1]` of the region's frame, or `None` when the
    /// page has no usable size.
    pub fn uv_rect(&self, region: &Region) -> Option<[f32; 4]> {
        let page = self.page_of(region)?;
        let (page_w, page_h) = page.logical_size();
        if page_w <= 0.0 || page_h <= 0.0 {
            return None;
        }
        let frame = region.frame;
        Some([
            frame.x / page_w,
            frame.y / page_h,
            frame.right() / page_w,
            frame.bottom() / page_h,
        ])
    }

    /// Registers an already loaded image as a single region covering the whole
    /// image. Images that are the same handle share one page.
    pub fn add_texture(&mut self, name: &str, image: SharedImage) -> &Region {
        let existing = self
            .pages
            .iter()
            .position(|page| Rc::ptr_eq(&page.image, &image));
        let page = match existing {
            Some(existing) => existing,
            None => self.push_page(Page {
                resolution: usable_resolution(TEXTURE_PAGE_NAME, &image),
                name: TEXTURE_PAGE_NAME.to_string(),
                width: image.real_width(),
                height: image.real_height(),
                min_filter: TextureFilter::Nearest,
                mag_filter: TextureFilter::Nearest,
                u_wrap: TextureWrap::ClampToEdge,
                v_wrap: TextureWrap::ClampToEdge,
                image: Rc::clone(&image),
            }),
        };

        let resolution = self.pages[page].resolution;
        let full = Rect::new(
            0.0,
            0.0,
            image.real_width() as f32 / resolution,
            image.real_height() as f32 / resolution,
        );
        self.push_region(Region {
            name: name.to_string(),
            page,
            index: -1,
            rotate: 0,
            frame: full,
            orig: full,
            trim: full,
            splits: None,
            pads: None,
        })
    }

    /// [`Atlas::add_texture`] for every entry, in iteration order. With
    /// `strip_extension` the key is cut at its last `.`.
    pub fn add_texture_hash<I, K>(&mut self, textures: I, strip_extension: bool)
    where
        I: IntoIterator<Item = (K, SharedImage)>,
        K: AsRef<str>,
    {
        for (key, image) in textures {
            let key = key.as_ref();
            let name = if strip_extension {
                strip_file_extension(key)
            } else {
                key
            };
            self.add_texture(name, image);
        }
    }

    /// Releases every page image. Consumes the atlas, so this happens once.
    pub fn dispose(self) {
        for page in &self.pages {
            log::debug!("Disposing atlas page '{}'", page.name);
            page.image.dispose();
        }
    }

    pub(crate) fn push_page(&mut self, page: Page) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }

    pub(crate) fn push_region(&mut self, region: Region) -> &Region {
        debug_assert!(region.page < self.pages.len());
        self.regions.push(region);
        &self.regions[self.regions.len() - 1]
    }
}

/// The image's resolution, or 1 when it reports a non-finite or non-positive
/// value.
pub(crate) fn usable_resolution(page_name: &str, image: &SharedImage) -> f32 {
    let resolution = image.resolution();
    if resolution.is_finite() && resolution > 0.0 {
        return resolution;
    }
    log::warn!(
        "Atlas page '{}' image reports resolution {}; using 1",
        page_name,
        resolution
    );
    1.0
}

fn strip_file_extension(key: &str) -> &str {
    match key.rfind('.') {
        Some(dot) => &key[..dot],
        None => key,
    }
}
