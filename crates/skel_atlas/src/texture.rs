//! Texture sampling enums and the image collaborator contract.
//!
//! The atlas never decodes pixels. A [`TextureLoader`] supplied by the caller
//! turns a page name into an [`ImageResource`] handle, and the parser only reads
//! sizes and the resolution scale from it.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use skel_core::Disposable;

use crate::error::AtlasError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    #[default]
    Nearest,
    Linear,
    MipMap,
    MipMapNearestNearest,
    MipMapLinearNearest,
    MipMapNearestLinear,
    MipMapLinearLinear,
}

impl TextureFilter {
    pub const ALL: &'static [TextureFilter] = &[
        TextureFilter::Nearest,
        TextureFilter::Linear,
        TextureFilter::MipMap,
        TextureFilter::MipMapNearestNearest,
        TextureFilter::MipMapLinearNearest,
        TextureFilter::MipMapNearestLinear,
        TextureFilter::MipMapLinearLinear,
    ];

    /// Name as written in atlas text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Nearest => "Nearest",
            Self::Linear => "Linear",
            Self::MipMap => "MipMap",
            Self::MipMapNearestNearest => "MipMapNearestNearest",
            Self::MipMapLinearNearest => "MipMapLinearNearest",
            Self::MipMapNearestLinear => "MipMapNearestLinear",
            Self::MipMapLinearLinear => "MipMapLinearLinear",
        }
    }

    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, Self::Nearest | Self::Linear)
    }
}

impl FromStr for TextureFilter {
    type Err = AtlasError;

    /// Case-insensitive lookup in the filter table.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|filter| filter.label().eq_ignore_ascii_case(name))
            .ok_or_else(|| AtlasError::UnknownFilter {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for TextureFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    #[default]
    ClampToEdge,
    Repeat,
}

/// Axes a page repeats on, from the `repeat:` header value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatAxis {
    #[default]
    None,
    U,
    V,
    Both,
}

impl RepeatAxis {
    /// `"x"`, `"y"` and `"xy"` select an axis; anything else repeats nothing.
    pub fn from_token(token: &str) -> Self {
        match token {
            "x" => Self::U,
            "y" => Self::V,
            "xy" => Self::Both,
            _ => Self::None,
        }
    }

    pub fn u_wrap(self) -> TextureWrap {
        match self {
            Self::U | Self::Both => TextureWrap::Repeat,
            Self::None | Self::V => TextureWrap::ClampToEdge,
        }
    }

    pub fn v_wrap(self) -> TextureWrap {
        match self {
            Self::V | Self::Both => TextureWrap::Repeat,
            Self::None | Self::U => TextureWrap::ClampToEdge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleMode {
    Nearest,
    Linear,
}

/// What a renderer needs to configure sampling for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerSettings {
    pub scale_mode: ScaleMode,
    pub mipmap: bool,
    pub u_wrap: TextureWrap,
    pub v_wrap: TextureWrap,
}

impl SamplerSettings {
    /// Sampling is driven by the min filter; the mag filter only matters to
    /// backends that distinguish them.
    pub fn from_filters(min_filter: TextureFilter, u_wrap: TextureWrap, v_wrap: TextureWrap) -> Self {
        let (scale_mode, mipmap) = match min_filter {
            TextureFilter::Linear => (ScaleMode::Linear, false),
            TextureFilter::Nearest => (ScaleMode::Nearest, false),
            TextureFilter::MipMapNearestNearest => (ScaleMode::Nearest, true),
            _ => (ScaleMode::Linear, true),
        };
        Self {
            scale_mode,
            mipmap,
            u_wrap,
            v_wrap,
        }
    }
}

/// Handle to a loaded page image.
///
/// Handles are shared (`Rc`) between the loader, the page and any caller that
/// keeps one, so mutation goes through `&self`.
pub trait ImageResource: Disposable + fmt::Debug {
    /// Pixel width of the decoded image, 0 if unknown.
    fn real_width(&self) -> u32;
    /// Pixel height of the decoded image, 0 if unknown.
    fn real_height(&self) -> u32;

    /// Device pixel ratio the image was authored for. Raw atlas coordinates
    /// are divided by this value.
    fn resolution(&self) -> f32 {
        1.0
    }

    /// False until the backend knows the image's size.
    fn is_valid(&self) -> bool;

    /// Sets the logical size of an image that is not valid yet.
    fn set_size(&self, width: u32, height: u32);

    fn apply_sampler(&self, _sampler: SamplerSettings) {}
}

pub type SharedImage = Rc<dyn ImageResource>;

/// Completion handed to a [`TextureLoader`]. Must be called exactly once;
/// `None` means the page image could not be loaded.
pub type TextureCallback = Box<dyn FnOnce(Option<SharedImage>)>;

pub trait TextureLoader {
    /// Starts loading the image for `page_name`. `done` may be called before
    /// this returns or at any later point on the same thread.
    fn load(&self, page_name: &str, done: TextureCallback);
}

impl<F> TextureLoader for F
where
    F: Fn(&str, TextureCallback),
{
    fn load(&self, page_name: &str, done: TextureCallback) {
        self(page_name, done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_names_parse_case_insensitively() {
        assert_eq!("Linear".parse::<TextureFilter>(), Ok(TextureFilter::Linear));
        assert_eq!("nearest".parse::<TextureFilter>(), Ok(TextureFilter::Nearest));
        assert_eq!(
            "MIPMAPLINEARNEAREST".parse::<TextureFilter>(),
            Ok(TextureFilter::MipMapLinearNearest)
        );
    }

    #[test]
    fn every_filter_label_round_trips() {
        for &filter in TextureFilter::ALL {
            assert_eq!(filter.label().parse::<TextureFilter>(), Ok(filter));
            assert_eq!(format!("{}", filter), filter.label());
        }
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let err = "Bilinear".parse::<TextureFilter>().expect_err("unknown");
        assert!(err.to_string().contains("Bilinear"));
    }

    #[test]
    fn repeat_tokens_select_axes() {
        assert_eq!(RepeatAxis::from_token("x").u_wrap(), TextureWrap::Repeat);
        assert_eq!(RepeatAxis::from_token("x").v_wrap(), TextureWrap::ClampToEdge);
        assert_eq!(RepeatAxis::from_token("y").u_wrap(), TextureWrap::ClampToEdge);
        assert_eq!(RepeatAxis::from_token("y").v_wrap(), TextureWrap::Repeat);
        assert_eq!(RepeatAxis::from_token("xy"), RepeatAxis::Both);
        assert_eq!(RepeatAxis::from_token("none"), RepeatAxis::None);
        assert_eq!(RepeatAxis::from_token(""), RepeatAxis::None);
    }

    #[test]
    fn sampler_follows_min_filter() {
        let clamp = TextureWrap::ClampToEdge;
        let linear = SamplerSettings::from_filters(TextureFilter::Linear, clamp, clamp);
        assert_eq!(linear.scale_mode, ScaleMode::Linear);
        assert!(!linear.mipmap);

        let nn = SamplerSettings::from_filters(TextureFilter::MipMapNearestNearest, clamp, clamp);
        assert_eq!(nn.scale_mode, ScaleMode::Nearest);
        assert!(nn.mipmap);

        let ll = SamplerSettings::from_filters(TextureFilter::MipMapLinearLinear, clamp, clamp);
        assert_eq!(ll.scale_mode, ScaleMode::Linear);
        assert!(ll.mipmap);
        assert!(TextureFilter::MipMap.uses_mipmaps());
        assert!(!TextureFilter::Nearest.uses_mipmaps());
    }
}
