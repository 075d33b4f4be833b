use std::fmt;

// Shape — per-sample shape of a labeled array
//
// Every sample of a dataset has the same shape, e.g. [28, 28] for a
// grayscale digit or [32, 32, 3] for an HWC colour image. The batch
// dimension is never part of it; the loader prepends it when it builds a
// batch.

/// Shape of a single sample (no batch dimension).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    /// The dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Number of elements in one sample. A scalar shape [] has 1 element.
    pub fn elem_count(&self) -> usize {
        self.0.iter().product::<usize>().max(1)
    }

    /// Shape of a batch of `n` samples: `[n, ...dims]`.
    pub fn batched(&self, n: usize) -> Vec<usize> {
        let mut dims = Vec::with_capacity(self.rank() + 1);
        dims.push(n);
        dims.extend_from_slice(&self.0);
        dims
    }

    /// Shape after keeping every `stride`-th row and column of an
    /// `[H, W, ...]` sample (rounding up, like `x[::s, ::s]`).
    pub fn strided_hw(&self, stride: usize) -> crate::Result<Shape> {
        if self.rank() < 2 || stride == 0 {
            crate::bail!("cannot stride shape {self} by {stride}: need rank >= 2 and stride > 0");
        }
        let mut dims = self.0.clone();
        dims[0] = dims[0].div_ceil(stride);
        dims[1] = dims[1].div_ceil(stride);
        Ok(Shape(dims))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<usize> for Shape {
    fn from(d: usize) -> Self {
        Shape(vec![d])
    }
}

impl From<(usize, usize)> for Shape {
    fn from((d0, d1): (usize, usize)) -> Self {
        Shape(vec![d0, d1])
    }
}

impl From<(usize, usize, usize)> for Shape {
    fn from((d0, d1, d2): (usize, usize, usize)) -> Self {
        Shape(vec![d0, d1, d2])
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Shape(v)
    }
}

impl From<&[usize]> for Shape {
    fn from(s: &[usize]) -> Self {
        Shape(s.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::new(vec![]);
        assert_eq!(s.rank(), 0);
        assert_eq!(s.elem_count(), 1);
    }

    #[test]
    fn test_image_shape() {
        let s: Shape = (32usize, 32usize, 3usize).into();
        assert_eq!(s.elem_count(), 3072);
        assert_eq!(s.batched(8), vec![8, 32, 32, 3]);
    }

    #[test]
    fn test_strided_hw() {
        let s: Shape = vec![64, 63, 3].into();
        assert_eq!(s.strided_hw(2).unwrap(), Shape::new(vec![32, 32, 3]));
        assert!(Shape::from(5usize).strided_hw(2).is_err());
        match s.strided_hw(0) {
            Err(crate::Error::Msg(msg)) => assert!(msg.contains("[64, 63, 3]")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Shape::from((2usize, 3usize))), "[2, 3]");
    }
}
