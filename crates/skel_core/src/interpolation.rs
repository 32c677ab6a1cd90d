use glam::Vec2;

/// Easing curve over `a` in `[0, 1]`.
pub trait Interpolation {
    fn apply_internal(&self, a: f32) -> f32;

    fn apply(&self, start: f32, end: f32, a: f32) -> f32 {
        start + (end - start) * self.apply_internal(a)
    }

    fn apply_vec2(&self, start: Vec2, end: Vec2, a: f32) -> Vec2 {
        start.lerp(end, self.apply_internal(a))
    }
}

/// Ease in and out with the given power.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pow {
    pub power: i32,
}

impl Pow {
    pub fn new(power: i32) -> Self {
        Self { power }
    }
}

impl Default for Pow {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Interpolation for Pow {
    fn apply_internal(&self, a: f32) -> f32 {
        if a <= 0.5 {
            return (a * 2.0).powi(self.power) / 2.0;
        }
        let divisor = if self.power % 2 == 0 { -2.0 } else { 2.0 };
        ((a - 1.0) * 2.0).powi(self.power) / divisor + 1.0
    }
}

/// Ease out only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowOut {
    pub power: i32,
}

impl PowOut {
    pub fn new(power: i32) -> Self {
        Self { power }
    }
}

impl Interpolation for PowOut {
    fn apply_internal(&self, a: f32) -> f32 {
        let sign = if self.power % 2 == 0 { -1.0 } else { 1.0 };
        (a - 1.0).powi(self.power) * sign + 1.0
    }
}
