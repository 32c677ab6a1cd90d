//! Texture atlas loading for skeletal animation.
//!
//! Reads the line-oriented `.atlas` text written by sprite packers and turns it
//! into [`Page`]s (one per source image) and named [`Region`]s (sub-rectangles
//! with trim and rotation metadata). Pixel data never passes through here: a
//! caller-supplied [`TextureLoader`] resolves each page name to an
//! [`ImageResource`] handle, and region coordinates are scaled by that image's
//! resolution.
//!
//! Two entry points:
//!  - [`AtlasLoad`] for callback-based loaders that may answer later.
//!  - [`parse_atlas`] when images are available immediately.
//!
//! [`AtlasParser`] is the underlying state machine for callers that want to
//! drive loading themselves.

pub mod error;
pub mod load;
pub mod model;
pub mod parser;
pub mod reader;
pub mod texture;

pub use error::AtlasError;
pub use load::{parse_atlas, AtlasLoad, CompletionCallback};
pub use model::{Atlas, Page, Rect, Region};
pub use parser::{decode_rotation, AtlasParser, ParseStep, PendingPage, RegionRecord};
pub use reader::LineReader;
pub use texture::{
    ImageResource, RepeatAxis, SamplerSettings, ScaleMode, SharedImage, TextureCallback,
    TextureFilter, TextureLoader, TextureWrap,
};
