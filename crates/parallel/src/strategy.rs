//! Parallel processing strategies

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use geospec_core::{Error, Result};

/// How independent units (scenes, tile groups) are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode", content = "threads")]
pub enum ProcessingMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing on the global rayon pool
    #[default]
    Parallel,
    /// Parallel on a dedicated pool with the given number of threads
    ParallelWith(usize),
}

/// Strategy for running a function over a batch of inputs.
///
/// Every implementation returns outputs in input order, whatever order the
/// workers finish in.
pub trait ParallelStrategy {
    /// Map `f` over `items`, preserving order.
    fn map_ordered<I, T, F>(&self, items: &[I], f: F) -> Result<Vec<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> T + Sync + Send;
}

impl ParallelStrategy for ProcessingMode {
    fn map_ordered<I, T, F>(&self, items: &[I], f: F) -> Result<Vec<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> T + Sync + Send,
    {
        match self {
            ProcessingMode::Sequential => Ok(items.iter().map(f).collect()),
            #[cfg(feature = "parallel")]
            ProcessingMode::Parallel => Ok(items.par_iter().map(f).collect()),
            #[cfg(feature = "parallel")]
            ProcessingMode::ParallelWith(threads) => {
                if *threads == 0 {
                    return Err(Error::InvalidParameter {
                        name: "threads",
                        value: "0".into(),
                        reason: "need at least one worker thread".into(),
                    });
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*threads)
                    .build()
                    .map_err(|e| Error::ThreadPool(e.to_string()))?;
                Ok(pool.install(|| items.par_iter().map(f).collect()))
            }
            #[cfg(not(feature = "parallel"))]
            ProcessingMode::Parallel | ProcessingMode::ParallelWith(_) => {
                Ok(items.iter().map(f).collect())
            }
        }
    }
}

/// Number of worker threads a `Parallel` run would use
pub fn num_threads() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_preserves_order() {
        let items: Vec<u64> = (0..500).collect();
        let expected: Vec<u64> = items.iter().map(|v| v * v).collect();

        for mode in [
            ProcessingMode::Sequential,
            ProcessingMode::Parallel,
            ProcessingMode::ParallelWith(3),
        ] {
            let out = mode.map_ordered(&items, |v| v * v).unwrap();
            assert_eq!(out, expected, "mode {mode:?}");
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn zero_threads_is_rejected() {
        let r = ProcessingMode::ParallelWith(0).map_ordered(&[1, 2, 3], |v| *v);
        assert!(matches!(r, Err(Error::InvalidParameter { name: "threads", .. })));
    }

    #[test]
    fn default_is_parallel() {
        assert_eq!(ProcessingMode::default(), ProcessingMode::Parallel);
        assert!(num_threads() >= 1);
    }
}
