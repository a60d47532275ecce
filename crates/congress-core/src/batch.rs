//! Fixed-size batching over lazy record streams.

/// Default batch size for committee and person passes.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Groups an iterator's items into ordered chunks of at most `size` items.
///
/// Input order is preserved. A chunk is yielded once full or once the input
/// is exhausted, so only the final chunk may be short.
#[derive(Debug)]
pub struct Batcher<I: Iterator> {
    inner: I,
    size: usize,
}

impl<I: Iterator> Batcher<I> {
    /// A size of zero is treated as one.
    pub fn new(inner: I, size: usize) -> Self {
        Self {
            inner,
            size: size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.size
    }
}

impl<I: Iterator> Iterator for Batcher<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<I::Item> = self.inner.by_ref().take(self.size).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.inner.size_hint();
        (
            lower.div_ceil(self.size),
            upper.map(|n| n.div_ceil(self.size)),
        )
    }
}

/// Adapter for building a [`Batcher`] from any iterator.
pub trait BatchExt: Iterator + Sized {
    fn batched(self, size: usize) -> Batcher<Self> {
        Batcher::new(self, size)
    }
}

impl<I: Iterator> BatchExt for I {}
