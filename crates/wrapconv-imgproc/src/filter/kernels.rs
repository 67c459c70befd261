use super::FilterError;

/// A 2D kernel of real-valued weights stored row-major.
///
/// The weights are used as given: no normalization is applied, so a blur kernel must
/// already sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel2d {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Kernel2d {
    /// Create a kernel from row-major weights.
    ///
    /// # Arguments
    ///
    /// * `width` - The number of columns of the kernel.
    /// * `height` - The number of rows of the kernel.
    /// * `data` - The weights, `width * height` values in row-major order.
    ///
    /// # Errors
    ///
    /// If the number of weights does not match the kernel size, or the size overflows
    /// `usize`, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use wrapconv_imgproc::filter::Kernel2d;
    ///
    /// let kernel = Kernel2d::new(2, 1, vec![0.5, 0.5]).unwrap();
    /// assert_eq!(kernel.get(1, 0), Some(0.5));
    /// ```
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self, FilterError> {
        let expected = match width.checked_mul(height) {
            Some(n) if n == data.len() => n,
            n => {
                return Err(FilterError::InvalidKernelShape {
                    width,
                    height,
                    expected: n.unwrap_or(usize::MAX),
                    actual: data.len(),
                })
            }
        };

        // a kernel without rows has no width either
        let (width, height) = if expected == 0 { (0, 0) } else { (width, height) };

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a kernel from a list of rows.
    ///
    /// # Errors
    ///
    /// If the rows do not all have the same length, an error is returned.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, FilterError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(FilterError::JaggedKernel {
                row,
                expected: width,
                actual: r.len(),
            });
        }

        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    /// Create a 1x1 kernel that reproduces the input.
    pub fn identity() -> Self {
        Self {
            width: 1,
            height: 1,
            data: vec![1.0],
        }
    }

    /// Create a box (averaging) kernel whose weights are all `1 / (width * height)`.
    ///
    /// A zero-area size, or one whose area overflows `usize`, gives the empty kernel.
    pub fn box_kernel(width: usize, height: usize) -> Self {
        let n = width.checked_mul(height).unwrap_or(0);
        if n == 0 {
            return Self {
                width: 0,
                height: 0,
                data: Vec::new(),
            };
        }

        Self {
            width,
            height,
            data: vec![1.0 / n as f64; n],
        }
    }

    /// Get the kernel width.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the kernel height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the kernel has no weights at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the kernel weights in row-major order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Get the weight at column `x` and row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Get the sum of all kernel weights.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

impl std::fmt::Display for Kernel2d {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.width == 0 {
            return Ok(());
        }
        for row in self.data.chunks_exact(self.width) {
            let line = row
                .iter()
                .map(|w| format!("{w:.6}"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
