//! Scalar helpers shared by the animation runtime. Everything is single
//! precision to match exported animation data.

use rand::Rng;

pub const PI: f32 = std::f32::consts::PI;
pub const PI2: f32 = PI * 2.0;
pub const RAD_DEG: f32 = 180.0 / PI;
pub const DEG_RAD: f32 = PI / 180.0;

pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        return min;
    }
    if value > max {
        return max;
    }
    value
}

pub fn cos_deg(degrees: f32) -> f32 {
    (degrees * DEG_RAD).cos()
}

pub fn sin_deg(degrees: f32) -> f32 {
    (degrees * DEG_RAD).sin()
}

/// -1, 0 or 1. Unlike `f32::signum`, zero maps to 0.
pub fn signum(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Truncates toward zero.
pub fn to_int(x: f32) -> f32 {
    x.trunc()
}

pub fn cbrt(x: f32) -> f32 {
    x.cbrt()
}

/// Triangular distribution peaking halfway between `min` and `max`.
pub fn random_triangular(min: f32, max: f32) -> f32 {
    random_triangular_with(&mut rand::thread_rng(), min, max, (min + max) * 0.5)
}

pub fn random_triangular_with<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32, mode: f32) -> f32 {
    let u: f32 = rng.gen();
    let d = max - min;
    if u <= (mode - min) / d {
        return min + (u * d * (mode - min)).sqrt();
    }
    max - ((1.0 - u) * d * (max - mode)).sqrt()
}
