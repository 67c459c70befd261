use wrapconv_image::Rgba8Image;

use super::{FilterError, Kernel2d};
use crate::parallel::{
    for_each_chunk, partition_rows, split_rows_mut, ExecutionStrategy, RowChunk,
};

const RGBA: usize = 4;

/// Map `pos + tap - half` back into `[0, len)` as if the image tiled infinitely.
#[inline]
fn wrap_index(pos: usize, tap: usize, half: usize, len: usize) -> usize {
    ((pos + tap) as isize - half as isize).rem_euclid(len as isize) as usize
}

/// Truncate toward zero and saturate to [0, 255]; NaN maps to 0.
#[inline]
fn saturate_u8(v: f64) -> u8 {
    (v as i64).clamp(0, 255) as u8
}

/// Convolve the rows of one chunk with wrap-around borders.
///
/// Every output pixel is the weighted sum of its neighbourhood, where the neighbourhood is
/// centred at `(width / 2, height / 2)` of the kernel and out of range coordinates wrap
/// around the image. Only the red, green and blue channels are convolved; alpha is copied
/// from the source pixel.
///
/// # Arguments
///
/// * `src` - The whole source image. Any row may be read because of the wrap-around.
/// * `kernel` - The kernel weights.
/// * `chunk` - The rows to compute.
/// * `dst_rows` - The destination rows of the chunk, `chunk.len * width * 4` bytes.
///
/// PRECONDITION: `chunk` lies inside the source image.
pub fn convolve_rows(src: &Rgba8Image, kernel: &Kernel2d, chunk: RowChunk, dst_rows: &mut [u8]) {
    let (width, height) = (src.width(), src.height());
    if width == 0 || height == 0 {
        return;
    }

    let (kw, kh) = (kernel.width(), kernel.height());
    let (half_w, half_h) = (kw / 2, kh / 2);
    let stride = src.row_stride();
    let src_data = src.as_slice();
    let weights = kernel.data();

    // wrapped source column for every (x, kx) pair, shared by all the rows
    let src_cols = (0..width)
        .flat_map(|x| (0..kw).map(move |kx| wrap_index(x, kx, half_w, width)))
        .collect::<Vec<_>>();

    let rows = chunk.start..chunk.end().min(height);
    for (y, dst_row) in rows.zip(dst_rows.chunks_exact_mut(stride)) {
        let center_row = &src_data[y * stride..(y + 1) * stride];

        for (x, dst_px) in dst_row.chunks_exact_mut(RGBA).enumerate() {
            let mut acc = [0.0f64; 3];
            let cols = &src_cols[x * kw..(x + 1) * kw];

            for (ky, kernel_row) in weights.chunks_exact(kw.max(1)).take(kh).enumerate() {
                let sy = wrap_index(y, ky, half_h, height);
                let src_row = &src_data[sy * stride..(sy + 1) * stride];

                for (&w, &sx) in kernel_row.iter().zip(cols) {
                    let px = &src_row[sx * RGBA..sx * RGBA + RGBA];
                    acc[0] += px[0] as f64 * w;
                    acc[1] += px[1] as f64 * w;
                    acc[2] += px[2] as f64 * w;
                }
            }

            dst_px[0] = saturate_u8(acc[0]);
            dst_px[1] = saturate_u8(acc[1]);
            dst_px[2] = saturate_u8(acc[2]);
            dst_px[3] = center_row[x * RGBA + 3];
        }
    }
}

/// Convolve an RGBA image with a kernel using wrap-around borders.
///
/// The rows of `dst` are split into disjoint chunks according to `strategy`. All chunks but
/// the last are spawned on the thread pool while the last one is computed on the calling
/// thread (on a pool thread for `Fixed`); the function returns once every chunk has
/// finished. The result does not depend on the strategy.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 4).
/// * `dst` - The destination image with shape (H, W, 4).
/// * `kernel` - The kernel weights.
/// * `strategy` - How many chunks to use and where to run them.
///
/// # Errors
///
/// If `src` and `dst` differ in size, or the strategy is invalid, an error is returned.
pub fn convolve_wrap(
    src: &Rgba8Image,
    dst: &mut Rgba8Image,
    kernel: &Kernel2d,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    if src.size() != dst.size() {
        return Err(FilterError::SizeMismatch {
            src: src.size(),
            dst: dst.size(),
        });
    }

    let workers = strategy.num_workers()?;
    if src.size().is_empty() {
        return Ok(());
    }

    let chunks = partition_rows(src.height(), workers);
    log::debug!(
        "convolving {} with a {}x{} kernel in {} chunks",
        src.size(),
        kernel.width(),
        kernel.height(),
        chunks.len()
    );

    let parts = split_rows_mut(dst.as_slice_mut(), src.row_stride(), &chunks)?;
    let evaluate = |id: usize, chunk: RowChunk, rows: &mut [u8]| {
        convolve_rows(src, kernel, chunk, rows);
        log::trace!("chunk {id} finished rows {}..{}", chunk.start, chunk.end());
    };

    if parts.len() == 1 {
        for_each_chunk(parts, evaluate);
        return Ok(());
    }

    strategy.install(move || for_each_chunk(parts, evaluate))?;

    Ok(())
}

/// Convolve an RGBA image with a kernel using wrap-around borders.
///
/// Allocates the output image and fills it with [`convolve_wrap`].
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 4).
/// * `kernel` - The kernel weights.
/// * `strategy` - How many chunks to use and where to run them.
///
/// # Returns
///
/// A new image with the same size as `src`.
///
/// # Examples
///
/// ```
/// use wrapconv_image::Rgba8Image;
/// use wrapconv_imgproc::filter::{convolve, Kernel2d};
/// use wrapconv_imgproc::parallel::ExecutionStrategy;
///
/// let src = Rgba8Image::new([1, 1].into(), vec![90, 90, 90, 7]).unwrap();
/// let dst = convolve(&src, &Kernel2d::box_kernel(3, 3), ExecutionStrategy::Serial).unwrap();
///
/// assert_eq!(dst.as_slice(), &[90, 90, 90, 7]);
/// ```
pub fn convolve(
    src: &Rgba8Image,
    kernel: &Kernel2d,
    strategy: ExecutionStrategy,
) -> Result<Rgba8Image, FilterError> {
    let mut dst = Rgba8Image::from_size_val(src.size(), 0)?;
    convolve_wrap(src, &mut dst, kernel, strategy)?;
    Ok(dst)
}
