//! DataArray - named, multi-component typed array
//!
//! `DataArray<T>` stores `num_tuples × num_components` values of type `T`
//! in tuple-major order: component `c` of tuple `i` lives at
//! `i * num_components + c`. Cell arrays hold one tuple per voxel; feature
//! and ensemble arrays hold one tuple per feature or phase.
//!
//! # Examples
//!
//! ```
//! use micrograin_core::DataArray;
//!
//! let mut quats = DataArray::new("Quats", 3, 4).unwrap();
//! quats.tuple_mut(1).copy_from_slice(&[0.0f32, 0.0, 0.0, 1.0]);
//! assert_eq!(quats.tuple(1), &[0.0, 0.0, 0.0, 1.0]);
//! assert_eq!(quats.num_tuples(), 3);
//! ```

use crate::error::{Error, Result};

/// Named array of fixed-width tuples
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray<T> {
    name: String,
    num_components: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> DataArray<T> {
    /// Create an array of `num_tuples` default-valued tuples
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `num_components` is 0.
    pub fn new(name: &str, num_tuples: usize, num_components: usize) -> Result<Self> {
        Self::with_value(name, num_tuples, num_components, T::default())
    }

    /// Create an array with every component set to `value`
    pub fn with_value(
        name: &str,
        num_tuples: usize,
        num_components: usize,
        value: T,
    ) -> Result<Self> {
        if num_components == 0 {
            return Err(Error::InvalidParameter(format!(
                "array '{name}' needs at least one component"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            num_components,
            data: vec![value; num_tuples * num_components],
        })
    }

    /// Wrap existing data
    ///
    /// # Errors
    ///
    /// Returns an error if `num_components` is 0 or the data length is not a
    /// multiple of it.
    pub fn from_vec(name: &str, num_components: usize, data: Vec<T>) -> Result<Self> {
        if num_components == 0 || data.len() % num_components != 0 {
            return Err(Error::ComponentCountMismatch {
                name: name.to_string(),
                expected: num_components,
                actual: data.len(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            num_components,
            data,
        })
    }

    /// Resize to `num_tuples`, filling new tuples with the default value
    pub fn resize_tuples(&mut self, num_tuples: usize) {
        self.data
            .resize(num_tuples * self.num_components, T::default());
    }

    /// Grow to at least `num_tuples`; never shrinks
    pub fn grow_to(&mut self, num_tuples: usize) {
        if num_tuples > self.num_tuples() {
            self.resize_tuples(num_tuples);
        }
    }

    /// Set every component to `value`
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> DataArray<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    pub fn num_tuples(&self) -> usize {
        self.data.len() / self.num_components
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Components of tuple `i`
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn tuple(&self, i: usize) -> &[T] {
        let start = i * self.num_components;
        &self.data[start..start + self.num_components]
    }

    /// Mutable components of tuple `i`
    #[inline]
    pub fn tuple_mut(&mut self, i: usize) -> &mut [T] {
        let start = i * self.num_components;
        &mut self.data[start..start + self.num_components]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Check the component count an operation expects
    pub fn check_components(&self, expected: usize) -> Result<()> {
        if self.num_components != expected {
            return Err(Error::ComponentCountMismatch {
                name: self.name.clone(),
                expected,
                actual: self.num_components,
            });
        }
        Ok(())
    }

    /// Check the tuple count an operation expects
    pub fn check_tuples(&self, expected: usize) -> Result<()> {
        if self.num_tuples() != expected {
            return Err(Error::TupleCountMismatch {
                name: self.name.clone(),
                expected,
                actual: self.num_tuples(),
            });
        }
        Ok(())
    }
}

impl<T: Copy> DataArray<T> {
    /// First component of tuple `i`
    #[inline]
    pub fn value(&self, i: usize) -> T {
        self.data[i * self.num_components]
    }

    /// Set the first component of tuple `i`
    #[inline]
    pub fn set_value(&mut self, i: usize, value: T) {
        self.data[i * self.num_components] = value;
    }

    /// Bounds-checked read of the first component of tuple `i`
    pub fn get(&self, i: usize) -> Result<T> {
        if i >= self.num_tuples() {
            return Err(Error::IndexOutOfBounds {
                index: i,
                len: self.num_tuples(),
            });
        }
        Ok(self.value(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_access() {
        let mut arr: DataArray<i32> = DataArray::new("FeatureIds", 5, 1).unwrap();
        assert_eq!(arr.num_tuples(), 5);
        arr.set_value(3, 7);
        assert_eq!(arr.value(3), 7);
        assert_eq!(arr.get(3).unwrap(), 7);
        assert!(arr.get(5).is_err());
    }

    #[test]
    fn test_zero_components_rejected() {
        assert!(DataArray::<f32>::new("bad", 4, 0).is_err());
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(DataArray::from_vec("Quats", 4, vec![0.0f32; 7]).is_err());
        let arr = DataArray::from_vec("Quats", 4, vec![0.0f32; 8]).unwrap();
        assert_eq!(arr.num_tuples(), 2);
    }

    #[test]
    fn test_grow_never_shrinks() {
        let mut arr = DataArray::with_value("Active", 3, 1, true).unwrap();
        arr.grow_to(5);
        assert_eq!(arr.num_tuples(), 5);
        assert!(!arr.value(4));
        arr.grow_to(2);
        assert_eq!(arr.num_tuples(), 5);
    }

    #[test]
    fn test_check_components() {
        let arr: DataArray<f32> = DataArray::new("Quats", 2, 4).unwrap();
        assert!(arr.check_components(4).is_ok());
        assert!(matches!(
            arr.check_components(3),
            Err(Error::ComponentCountMismatch { expected: 3, actual: 4, .. })
        ));
    }
}
