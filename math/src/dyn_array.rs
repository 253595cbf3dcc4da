use crate::error::{Error, Result};

/// Growable buffer of fixed-width integers with explicit size/capacity.
///
/// Unlike `Vec`, capacity is exact: it only changes through [DynArray::reserve],
/// growth in [DynArray::resize]/[DynArray::push], and [DynArray::shrink_to_fit].
/// Slots in [size, capacity) hold `T::default()` and are not addressable.
#[derive(Clone, Debug)]
pub struct DynArray<T> {
    data: Box<[T]>,
    size: usize,
}

impl<T: Copy + Default> DynArray<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![T::default(); capacity].into_boxed_slice(),
            size: 0,
        }
    }

    pub fn from_slice(values: &[T]) -> Self {
        Self {
            data: values.to_vec().into_boxed_slice(),
            size: values.len(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn empty(&self) -> bool {
        self.size == 0
    }

    /// Reallocates to exactly `capacity` slots, keeping [0, size).
    fn reallocate(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.size);
        let mut data: Box<[T]> = vec![T::default(); capacity].into_boxed_slice();
        data[..self.size].copy_from_slice(&self.data[..self.size]);
        self.data = data;
    }

    /// Grows capacity to at least `capacity`; size and values are unchanged.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.capacity() {
            self.reallocate(capacity);
        }
    }

    /// Sets the logical size to `size`, growing capacity if needed.
    /// New slots are zero; capacity never shrinks.
    pub fn resize(&mut self, size: usize) {
        if size > self.capacity() {
            self.reallocate(size);
        }
        if size < self.size {
            self.data[size..self.size].fill(T::default());
        }
        self.size = size;
    }

    pub fn shrink_to_fit(&mut self) {
        if self.capacity() != self.size {
            self.reallocate(self.size);
        }
    }

    pub fn clear(&mut self) {
        self.resize(0)
    }

    /// Appends `value`, doubling capacity when full.
    pub fn push(&mut self, value: T) {
        if self.size == self.capacity() {
            self.reallocate((self.capacity() << 1).max(1));
        }
        self.data[self.size] = value;
        self.size += 1;
    }

    pub fn at(&self, index: usize) -> Result<T> {
        self.check_index(index)?;
        Ok(self.data[index])
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index)?;
        self.data[index] = value;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.size {
            return Err(Error::IndexOutOfRange {
                index,
                size: self.size,
            });
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.size]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data[..self.size]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T: Copy + Default> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default + PartialEq> PartialEq for DynArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Copy + Default + Eq> Eq for DynArray<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_grows_and_zero_fills() {
        let mut a: DynArray<u64> = DynArray::from_slice(&[1, 2, 3]);
        a.resize(5);
        assert_eq!(a.as_slice(), &[1, 2, 3, 0, 0]);
        assert_eq!(a.capacity(), 5);
        a.resize(1);
        assert_eq!(a.capacity(), 5);
        a.resize(3);
        assert_eq!(a.as_slice(), &[1, 0, 0]);
    }

    #[test]
    fn out_of_range() {
        let mut a: DynArray<i64> = DynArray::with_capacity(8);
        assert!(a.empty());
        assert_eq!(a.at(0), Err(Error::IndexOutOfRange { index: 0, size: 0 }));
        a.resize(2);
        assert!(a.set(1, -4).is_ok());
        assert_eq!(a.at(1), Ok(-4));
        assert!(a.set(2, 0).is_err());
    }

    #[test]
    fn push_doubles() {
        let mut a: DynArray<u32> = DynArray::new();
        (0..5).for_each(|i| a.push(i));
        assert_eq!(a.size(), 5);
        assert_eq!(a.capacity(), 8);
        assert_eq!(a.iter().copied().collect::<Vec<u32>>(), vec![0, 1, 2, 3, 4]);
        a.clear();
        assert!(a.empty());
        assert_eq!(a.capacity(), 8);
    }
}
