use std::ops::Range;

use rayon::prelude::*;
use thiserror::Error;

use poi_image::Image;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how row-wise operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    #[default]
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    ParallelRows,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

/// Apply a function to each pixel in the image in parallel.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    // zero-width images have no rows to chunk
    if src.cols() == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C1 * src.cols())
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * src.cols()))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Map every row index of `rows` to a vector of items and concatenate the
/// results in row order.
///
/// The output order does not depend on the strategy: rows processed in
/// parallel are merged back in ascending row order.
///
/// # Arguments
///
/// * `strategy` - How the rows are distributed.
/// * `rows` - The row indices to visit.
/// * `f` - Produces the items of one row.
pub fn map_rows<R, F>(
    strategy: ExecutionStrategy,
    rows: Range<usize>,
    f: F,
) -> Result<Vec<R>, ParallelError>
where
    R: Send,
    F: Fn(usize) -> Vec<R> + Send + Sync,
{
    let out: Vec<R> = match strategy {
        ExecutionStrategy::Serial => rows.flat_map(f).collect(),
        ExecutionStrategy::ParallelRows => rows.into_par_iter().flat_map_iter(f).collect(),
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| rows.into_par_iter().flat_map_iter(f).collect())
        }
    };

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_items(y: usize) -> Vec<(usize, usize)> {
        (0..y % 3).map(|x| (y, x)).collect()
    }

    #[test]
    fn test_map_rows_serial() -> Result<(), ParallelError> {
        let out = map_rows(ExecutionStrategy::Serial, 0..5, row_items)?;
        assert_eq!(out, vec![(1, 0), (2, 0), (2, 1), (4, 0)]);
        Ok(())
    }

    #[test]
    fn test_map_rows_strategies_agree() -> Result<(), ParallelError> {
        let expected = map_rows(ExecutionStrategy::Serial, 0..257, row_items)?;
        let parallel = map_rows(ExecutionStrategy::ParallelRows, 0..257, row_items)?;
        let fixed = map_rows(ExecutionStrategy::Fixed(3), 0..257, row_items)?;
        assert_eq!(parallel, expected);
        assert_eq!(fixed, expected);
        Ok(())
    }

    #[test]
    fn test_map_rows_empty_range() -> Result<(), ParallelError> {
        let out = map_rows(ExecutionStrategy::ParallelRows, 4..4, row_items)?;
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn test_map_rows_fixed_error() {
        let res = map_rows(ExecutionStrategy::Fixed(0), 0..4, row_items);
        assert_eq!(res, Err(ParallelError::InvalidThreadCount(0)));
    }

    #[test]
    fn test_par_iter_rows() -> Result<(), poi_image::ImageError> {
        let src = Image::<u8, 2>::new([2, 2].into(), vec![1, 2, 3, 4, 5, 6, 7, 8])?;
        let mut dst = Image::<u16, 1>::from_size_val(src.size(), 0)?;
        par_iter_rows(&src, &mut dst, |s, d| d[0] = s[0] as u16 + s[1] as u16);
        assert_eq!(dst.as_slice(), &[3, 7, 11, 15]);
        Ok(())
    }
}
