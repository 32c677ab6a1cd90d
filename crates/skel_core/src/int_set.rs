/// Set of small non-negative integers backed by a presence table.
#[derive(Debug, Default, Clone)]
pub struct IntSet {
    present: Vec<bool>,
}

impl IntSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `value` was not already in the set.
    pub fn add(&mut self, value: usize) -> bool {
        if value >= self.present.len() {
            self.present.resize(value + 1, false);
        }
        !std::mem::replace(&mut self.present[value], true)
    }

    pub fn contains(&self, value: usize) -> bool {
        self.present.get(value).copied().unwrap_or(false)
    }

    pub fn remove(&mut self, value: usize) {
        if let Some(slot) = self.present.get_mut(value) {
            *slot = false;
        }
    }

    pub fn clear(&mut self) {
        self.present.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reports_new_members() {
        let mut set = IntSet::new();
        assert!(set.add(3));
        assert!(!set.add(3));
        assert!(set.contains(3));
        assert!(!set.contains(2));
        assert!(!set.contains(100));
    }

    #[test]
    fn remove_and_clear() {
        let mut set = IntSet::new();
        set.add(0);
        set.add(5);
        set.remove(5);
        set.remove(42);
        assert!(!set.contains(5));
        assert!(set.contains(0));
        set.clear();
        assert!(!set.contains(0));
    }
}
