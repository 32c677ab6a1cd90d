//! Free-list object pool.
//!
//! Whether freed items get reset is decided when the pool is built:
//! [`Pool::resetting`] is only available for types implementing
//! [`Resettable`], and only such pools call `reset` on `free`.

/// Capability for items that must be cleared before reuse.
pub trait Resettable {
    fn reset(&mut self);
}

pub struct Pool<T> {
    items: Vec<T>,
    instantiator: Box<dyn Fn() -> T>,
    reset: Option<fn(&mut T)>,
}

impl<T> Pool<T> {
    /// Pool whose items are reused as-is.
    pub fn new(instantiator: impl Fn() -> T + 'static) -> Self {
        Self {
            items: Vec::new(),
            instantiator: Box::new(instantiator),
            reset: None,
        }
    }

    /// A pooled item if one is free, otherwise a new one.
    pub fn obtain(&mut self) -> T {
        self.items.pop().unwrap_or_else(|| (self.instantiator)())
    }

    pub fn free(&mut self, mut item: T) {
        if let Some(reset) = self.reset {
            reset(&mut item);
        }
        self.items.push(item);
    }

    pub fn free_all(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.free(item);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of free items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Resettable> Pool<T> {
    /// Pool that resets every item handed back to it.
    pub fn resetting(instantiator: impl Fn() -> T + 'static) -> Self {
        Self {
            reset: Some(T::reset),
            ..Self::new(instantiator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Scratch {
        values: Vec<f32>,
    }

    impl Resettable for Scratch {
        fn reset(&mut self) {
            self.values.clear();
        }
    }

    #[test]
    fn obtain_creates_when_empty_and_reuses_freed() {
        let mut pool = Pool::new(|| vec![1u8]);
        let mut item = pool.obtain();
        item.push(2);
        pool.free(item);
        assert_eq!(pool.len(), 1);

        // Plain pools hand items back untouched.
        assert_eq!(pool.obtain(), vec![1, 2]);
        assert!(pool.is_empty());
    }

    #[test]
    fn resetting_pool_resets_on_free() {
        let mut pool = Pool::resetting(Scratch::default);
        let mut item = pool.obtain();
        item.values.push(4.0);
        pool.free(item);
        assert_eq!(pool.obtain(), Scratch::default());
    }

    #[test]
    fn free_all_keeps_every_item() {
        let mut pool = Pool::resetting(Scratch::default);
        let items = vec![
            Scratch { values: vec![1.0] },
            Scratch { values: vec![2.0] },
            Scratch { values: vec![3.0] },
        ];
        pool.free_all(items);
        assert_eq!(pool.len(), 3);
        assert!(pool.obtain().values.is_empty());

        pool.clear();
        assert!(pool.is_empty());
    }
}
