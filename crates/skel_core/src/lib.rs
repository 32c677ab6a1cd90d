//! Value types and helpers shared by the skeletal animation runtime: colors,
//! easing curves, object pooling, frame timing and small numeric utilities.

pub mod color;
pub mod int_set;
pub mod interpolation;
pub mod math;
pub mod pool;
pub mod time;
pub mod windowed_mean;

pub use color::Color;
pub use int_set::IntSet;
pub use interpolation::{Interpolation, Pow, PowOut};
pub use pool::{Pool, Resettable};
pub use time::TimeKeeper;
pub use windowed_mean::WindowedMean;

/// Capability for handles that own a releasable resource, such as a page
/// image.
pub trait Disposable {
    fn dispose(&self);
}
