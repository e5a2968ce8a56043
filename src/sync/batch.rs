// ABOUTME: Bounded group of pending cell writes flushed as one bulk apply
// ABOUTME: Owned by a single table's restore and moved into each flush

use crate::store::Mutation;

/// Default number of mutations per bulk-apply call
///
/// Only a cap on request payload size; tune as necessary.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Row keys and their mutations, kept in lockstep
#[derive(Debug, Clone)]
pub struct MutationBatch {
    limit: usize,
    keys: Vec<String>,
    mutations: Vec<Mutation>,
}

impl Default for MutationBatch {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl MutationBatch {
    /// Create an empty batch holding at most `limit` mutations (at least one)
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            keys: Vec::with_capacity(limit),
            mutations: Vec::with_capacity(limit),
        }
    }

    pub fn push(&mut self, key: String, mutation: Mutation) {
        self.keys.push(key);
        self.mutations.push(mutation);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.limit
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Move the accumulated entries out, leaving an empty batch with the same limit
    pub fn take(&mut self) -> MutationBatch {
        let limit = self.limit;
        std::mem::replace(self, MutationBatch::new(limit))
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutation(i: usize) -> Mutation {
        Mutation::set_cell("cf", "c", i as i64, vec![i as u8])
    }

    #[test]
    fn test_fills_at_limit() {
        let mut batch = MutationBatch::new(3);
        for i in 0..2 {
            batch.push(format!("k{}", i), mutation(i));
            assert!(!batch.is_full());
        }
        batch.push("k2".to_string(), mutation(2));
        assert!(batch.is_full());
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.keys(), ["k0", "k1", "k2"]);
    }

    #[test]
    fn test_take_leaves_empty_batch() {
        let mut batch = MutationBatch::new(2);
        batch.push("a".to_string(), mutation(0));

        let taken = batch.take();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken.mutations()[0], mutation(0));
        assert!(batch.is_empty());
        assert_eq!(batch.limit(), 2);
    }

    #[test]
    fn test_zero_limit_clamped() {
        let batch = MutationBatch::new(0);
        assert_eq!(batch.limit(), 1);
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(MutationBatch::default().limit(), DEFAULT_BATCH_SIZE);
    }
}
