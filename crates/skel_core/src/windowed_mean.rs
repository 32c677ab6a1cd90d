pub const DEFAULT_WINDOW_SIZE: usize = 32;

/// Moving average over the last `window_size` samples.
#[derive(Debug, Clone)]
pub struct WindowedMean {
    values: Vec<f32>,
    added_values: usize,
    last_value: usize,
    mean: f32,
    dirty: bool,
}

impl WindowedMean {
    /// `window_size` of 0 is treated as 1.
    pub fn new(window_size: usize) -> Self {
        Self {
            values: vec![0.0; window_size.max(1)],
            added_values: 0,
            last_value: 0,
            mean: 0.0,
            dirty: true,
        }
    }

    pub fn window_size(&self) -> usize {
        self.values.len()
    }

    pub fn has_enough_data(&self) -> bool {
        self.added_values >= self.values.len()
    }

    pub fn add_value(&mut self, value: f32) {
        if self.added_values < self.values.len() {
            self.added_values += 1;
        }
        self.values[self.last_value] = value;
        self.last_value = (self.last_value + 1) % self.values.len();
        self.dirty = true;
    }

    /// Mean of the window, or 0 until the window has been filled once.
    pub fn mean(&mut self) -> f32 {
        if !self.has_enough_data() {
            return 0.0;
        }
        if self.dirty {
            self.mean = self.values.iter().sum::<f32>() / self.values.len() as f32;
            self.dirty = false;
        }
        self.mean
    }
}

impl Default for WindowedMean {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}
