//! Provides a queue of ray batches for the worker threads. The queue
//! itself is not changed after creation, we simply work through it
//! with an atomic counter to track the index of the next batch to work
//! on.

use std::sync::atomic::{AtomicUsize, Ordering};

/// A contiguous range of ray indices traced as one unit of work.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Batch {
    /// position of the batch in the queue, used to seed its generator
    pub index: u64,
    /// index of the first ray
    pub first: u64,
    /// number of rays
    pub len: u64,
}

/// The queue of batches to be worked on shared immutably between
/// worker threads.
pub struct BlockQueue {
    batches: Vec<Batch>,
    /// Index of the next batch to be worked on
    next: AtomicUsize,
}

impl BlockQueue {
    /// Splits `n_rays` into batches of `batch_size` rays; the last one
    /// may be shorter. A zero batch size is treated as one.
    pub fn new(n_rays: u64, batch_size: u64) -> BlockQueue {
        let batch_size: u64 = batch_size.max(1);
        let n_batches: u64 = (n_rays + batch_size - 1) / batch_size;
        let batches: Vec<Batch> = (0..n_batches)
            .map(|i| {
                let first: u64 = i * batch_size;
                Batch {
                    index: i,
                    first,
                    len: batch_size.min(n_rays - first),
                }
            })
            .collect();
        if batches.is_empty() {
            log::warn!("block queue is empty, no rays to trace");
        }
        BlockQueue {
            batches,
            next: AtomicUsize::new(0),
        }
    }
    /// Get an iterator to work through the queue
    pub fn iter(&self) -> BlockQueueIterator {
        BlockQueueIterator { queue: self }
    }
    /// Get the next batch in the queue or None if the queue is finished
    pub fn next(&self) -> Option<Batch> {
        let i = self.next.fetch_add(1, Ordering::AcqRel);
        self.batches.get(i).copied()
    }
    /// Get the length of the queue
    pub fn len(&self) -> usize {
        self.batches.len()
    }
    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.next.load(Ordering::Acquire) >= self.batches.len()
    }
}

/// Iterator to work through the queue safely
pub struct BlockQueueIterator<'a> {
    queue: &'a BlockQueue,
}

impl<'a> Iterator for BlockQueueIterator<'a> {
    type Item = Batch;
    fn next(&mut self) -> Option<Batch> {
        self.queue.next()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn batches_cover_every_ray_once() {
        let queue = BlockQueue::new(1003, 100);
        assert_eq!(queue.len(), 11);
        let batches: Vec<Batch> = queue.iter().collect();
        assert_eq!(batches.iter().map(|b| b.len).sum::<u64>(), 1003);
        assert_eq!(batches[10], Batch { index: 10, first: 1000, len: 3 });
        assert!(queue.is_empty());
        assert!(queue.next().is_none());
    }

    #[test]
    fn no_rays_no_batches() {
        let queue = BlockQueue::new(0, 64);
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
    }
}
