//! Row-parallel iteration that degrades to plain iterators.
//!
//! With the `parallel` feature this is rayon's prelude. Without it,
//! `into_par_iter()` is `into_iter()` and the rest of the chain resolves to
//! `Iterator` methods, so kernels compile unchanged either way.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
