// LabeledArray — samples and their labels, kept index-aligned
//
// `data` is one flat row-major buffer holding `len * item_len` elements;
// sample `i` occupies `data[i * item_len..(i + 1) * item_len]` and its label
// is `targets[i]`. Nothing outside this module can change the number of
// samples, so the two buffers can never drift apart.

use crate::error::{Error, Result};
use crate::shape::Shape;

/// An in-memory labeled dataset: `N` samples of identical shape plus `N`
/// integer labels.
///
/// Labels are `i64` so that forgotten samples can carry a negative
/// tombstone label (see `unlearn_data::forget::mark_label`).
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray<T = u8> {
    data: Vec<T>,
    item_shape: Shape,
    targets: Vec<i64>,
}

impl<T: Copy> LabeledArray<T> {
    /// Build an array, checking that `data` holds exactly one item per label.
    pub fn new(data: Vec<T>, item_shape: impl Into<Shape>, targets: Vec<i64>) -> Result<Self> {
        let item_shape = item_shape.into();
        if data.len() != targets.len() * item_shape.elem_count() {
            return Err(Error::LengthMismatch {
                data: data.len(),
                shape: item_shape,
                targets: targets.len(),
            });
        }
        Ok(Self {
            data,
            item_shape,
            targets,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn item_shape(&self) -> &Shape {
        &self.item_shape
    }

    /// Elements per sample.
    pub fn item_len(&self) -> usize {
        self.item_shape.elem_count()
    }

    /// The whole flat data buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn targets(&self) -> &[i64] {
        &self.targets
    }

    /// Mutable labels. A slice, so the label count stays fixed.
    pub fn targets_mut(&mut self) -> &mut [i64] {
        &mut self.targets
    }

    /// Data of sample `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn item(&self, index: usize) -> &[T] {
        let n = self.item_len();
        &self.data[index * n..(index + 1) * n]
    }

    /// Mutable data of sample `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn item_mut(&mut self, index: usize) -> &mut [T] {
        let n = self.item_len();
        &mut self.data[index * n..(index + 1) * n]
    }

    /// Label of sample `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn target(&self, index: usize) -> i64 {
        self.targets[index]
    }

    pub fn set_target(&mut self, index: usize, label: i64) -> Result<()> {
        self.check_index(index)?;
        self.targets[index] = label;
        Ok(())
    }

    /// Return an error unless `index < self.len()`.
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Check every index of `indexes` at once.
    pub fn check_indexes(&self, indexes: &[usize]) -> Result<()> {
        indexes.iter().try_for_each(|&i| self.check_index(i))
    }

    /// Gather the given samples, in the given order, into a new array.
    ///
    /// The result owns freshly allocated buffers: mutating it never touches
    /// `self`, and two selections of the same array never share storage.
    pub fn select(&self, indexes: &[usize]) -> Result<Self> {
        self.check_indexes(indexes)?;
        let n = self.item_len();
        let mut data = Vec::with_capacity(indexes.len() * n);
        let mut targets = Vec::with_capacity(indexes.len());
        for &i in indexes {
            data.extend_from_slice(self.item(i));
            targets.push(self.targets[i]);
        }
        Ok(Self {
            data,
            item_shape: self.item_shape.clone(),
            targets,
        })
    }

    /// Overwrite sample `dst` (data and label) with a copy of `src`.
    pub fn copy_sample(&mut self, dst: usize, src: usize) -> Result<()> {
        self.check_index(dst)?;
        self.check_index(src)?;
        if dst != src {
            let n = self.item_len();
            self.data.copy_within(src * n..(src + 1) * n, dst * n);
            self.targets[dst] = self.targets[src];
        }
        Ok(())
    }

    /// Overwrite the data of sample `dst` with `item`, leaving its label alone.
    pub fn set_item(&mut self, dst: usize, item: &[T]) -> Result<()> {
        self.check_index(dst)?;
        if item.len() != self.item_len() {
            return Err(Error::ShapeMismatch {
                expected: self.item_shape.clone(),
                got: Shape::from(item.len()),
            });
        }
        self.item_mut(dst).copy_from_slice(item);
        Ok(())
    }

    /// Largest label, or `None` for an empty array.
    pub fn max_target(&self) -> Option<i64> {
        self.targets.iter().copied().max()
    }

    /// Keep every `stride`-th row and column of each `[H, W, ...]` sample.
    pub fn strided_hw(&self, stride: usize) -> Result<Self> {
        let shape = self.item_shape.dims();
        let new_shape = self.item_shape.strided_hw(stride)?;
        let (h, w) = (shape[0], shape[1]);
        let inner: usize = shape[2..].iter().product();
        let mut data = Vec::with_capacity(self.len() * new_shape.elem_count());
        for i in 0..self.len() {
            let item = self.item(i);
            for r in (0..h).step_by(stride) {
                for c in (0..w).step_by(stride) {
                    let start = (r * w + c) * inner;
                    data.extend_from_slice(&item[start..start + inner]);
                }
            }
        }
        Ok(Self {
            data,
            item_shape: new_shape,
            targets: self.targets.clone(),
        })
    }
}
