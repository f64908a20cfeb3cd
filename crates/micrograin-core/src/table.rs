//! Growable per-label side tables
//!
//! Feature and parent ids are not known before a flood fill runs, so the
//! tables keyed by them grow as new ids appear. A [`SlotTable`] is indexed
//! by id and only ever grows; slot 0 belongs to the background label.

/// Table of slots indexed by a label id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotTable<T> {
    slots: Vec<T>,
}

/// One "alive" flag per feature or parent slot
pub type ActiveFlags = SlotTable<bool>;

impl<T: Clone + Default> SlotTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Create a table with `len` default slots
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![T::default(); len],
        }
    }

    /// Grow to `len` slots; a smaller `len` is a no-op
    ///
    /// Returns `true` if the table grew.
    pub fn grow_to(&mut self, len: usize) -> bool {
        if len > self.slots.len() {
            self.slots.resize(len, T::default());
            true
        } else {
            false
        }
    }

    /// Store `value` at `id`, growing the table if needed
    pub fn set(&mut self, id: usize, value: T) {
        self.grow_to(id + 1);
        self.slots[id] = value;
    }
}

impl<T> SlotTable<T> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&T> {
        self.slots.get(id)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.slots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.slots
    }
}

impl SlotTable<bool> {
    /// Number of slots flagged active
    pub fn count_active(&self) -> usize {
        self.slots.iter().filter(|&&a| a).count()
    }

    /// Whether `id` is flagged active (missing slots are inactive)
    pub fn is_active(&self, id: usize) -> bool {
        self.slots.get(id).copied().unwrap_or(false)
    }
}
