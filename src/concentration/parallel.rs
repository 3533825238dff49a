use std::ops::Range;

use ndarray::Array2;
use num_integer::div_rem;
use num_traits::Zero;
use rayon::prelude::*;
use tracing::debug;

use super::ConcentrationKernel;
use crate::error::{Result, SlepianError};

/// Splits `[start, end)` into exactly `workers` contiguous ranges whose
/// lengths differ by at most one; the leading ranges take the remainder.
pub fn split_into_chunks(end: usize, workers: usize, start: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let len = end.saturating_sub(start);
    let (base, extra) = div_rem(len, workers);
    let mut chunks = Vec::with_capacity(workers);
    let mut lo = start;
    for w in 0..workers {
        let size = base + usize::from(w < extra);
        chunks.push(lo..lo + size);
        lo += size;
    }
    chunks
}

/// Fills rows `rows` of an `n x n` matrix, one contiguous row slab per
/// worker. Rows outside `rows` stay zero.
pub fn fill_rows<K: ConcentrationKernel>(
    kernel: &K,
    rows: Range<usize>,
    workers: usize,
) -> Result<Array2<K::Elem>> {
    let n = kernel.size();
    if rows.start > rows.end || rows.end > n {
        return Err(SlepianError::config(
            "rows",
            format!("row range {}..{} outside matrix of size {n}", rows.start, rows.end),
        ));
    }
    let workers = workers.max(1);
    let mut buffer = vec![K::Elem::zero(); n * n];
    let chunks = split_into_chunks(rows.end, workers, rows.start);

    let mut rest = &mut buffer[rows.start * n..rows.end * n];
    let mut slabs = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let (slab, tail) = std::mem::take(&mut rest).split_at_mut(chunk.len() * n);
        slabs.push((chunk, slab));
        rest = tail;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    pool.install(|| {
        slabs
            .into_par_iter()
            .try_for_each(|(chunk, slab)| fill_slab(kernel, chunk, slab, n))
    })?;

    Ok(Array2::from_shape_vec((n, n), buffer)?)
}

fn fill_slab<K: ConcentrationKernel>(
    kernel: &K,
    chunk: Range<usize>,
    slab: &mut [K::Elem],
    n: usize,
) -> Result<()> {
    if chunk.is_empty() {
        return Ok(());
    }
    debug!(start = chunk.start, end = chunk.end, "worker picked up rows");
    for (offset, row) in chunk.clone().enumerate() {
        debug!(row, "start row");
        let out = &mut slab[offset * n..(offset + 1) * n];
        kernel
            .fill_row(row, out)
            .map_err(|source| SlepianError::Concurrency {
                rows: chunk.clone(),
                source: Box::new(source),
            })?;
        debug!(row, "finish row");
    }
    Ok(())
}

