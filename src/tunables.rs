//! Default/live value tables for runtime-editable parameters.
//!
//! Lights, tessellation settings and specular powers all need the same thing: a table of
//! values the control surface can edit freely plus the compiled-in values to return to.
//! [`Tunables`] keeps the defaults immutable and hands out the live copy.

/// An immutable table of defaults paired with a mutable table of live values.
#[derive(Clone, Debug)]
pub struct Tunables<T> {
    defaults: Box<[T]>,
    live: Vec<T>,
}

impl<T: Clone> Tunables<T> {
    /// Creates a table whose live values start equal to `defaults`.
    pub fn new(defaults: impl Into<Vec<T>>) -> Self {
        let defaults: Vec<T> = defaults.into();
        let live = defaults.clone();
        Self {
            defaults: defaults.into_boxed_slice(),
            live,
        }
    }

    /// Creates a table holding a single value.
    pub fn single(default: T) -> Self {
        Self::new(vec![default])
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live value at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn get(&self, id: usize) -> &T {
        &self.live[id]
    }

    /// Mutable live value at `id`.
    pub fn get_mut(&mut self, id: usize) -> &mut T {
        &mut self.live[id]
    }

    /// The compiled-in value at `id`.
    pub fn default_value(&self, id: usize) -> &T {
        &self.defaults[id]
    }

    /// Restores one entry to its default.
    pub fn reset_to_default(&mut self, id: usize) {
        self.live[id] = self.defaults[id].clone();
    }

    /// Restores every entry to its default.
    pub fn reset_all(&mut self) {
        self.live.clone_from_slice(&self.defaults);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.live.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_do_not_touch_defaults() {
        let mut table = Tunables::new(vec![1.0_f32, 2.0, 3.0]);
        *table.get_mut(1) = 20.0;

        assert_eq!(*table.get(1), 20.0);
        assert_eq!(*table.default_value(1), 2.0);
    }

    #[test]
    fn reset_to_default_restores_only_that_entry() {
        let mut table = Tunables::new(vec![1, 2, 3]);
        *table.get_mut(0) = 10;
        *table.get_mut(2) = 30;

        table.reset_to_default(2);

        assert_eq!(table.as_slice(), &[10, 2, 3]);
    }

    #[test]
    fn reset_all_restores_everything() {
        let mut table = Tunables::new(vec!["a".to_string(), "b".to_string()]);
        table.get_mut(0).push('!');
        table.get_mut(1).push('?');

        table.reset_all();

        assert_eq!(table.as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn single_holds_one_entry() {
        let table = Tunables::single(7u8);
        assert_eq!(table.len(), 1);
        assert_eq!(*table.get(0), 7);
    }
}
