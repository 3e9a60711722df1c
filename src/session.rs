/// The state that a [`crate::PredicateIndex`] keeps for a single match attempt: the set of
/// subscriptions that have been suspended because their predicate no longer matters.
#[derive(Clone, Debug, Default)]
pub struct MatchSession {
    suspended: Vec<u64>,
}

impl MatchSession {
    const KEYS_PER_BUCKET: usize = 64;

    /// Create a session sized for subscription keys below `capacity`; larger keys are still
    /// accepted.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            suspended: vec![0; capacity / Self::KEYS_PER_BUCKET + 1],
        }
    }

    #[inline]
    pub fn suspend(&mut self, key: usize) {
        let bucket = key / Self::KEYS_PER_BUCKET;
        if bucket >= self.suspended.len() {
            self.suspended.resize(bucket + 1, 0);
        }
        Self::set_bit(&mut self.suspended, key);
    }

    #[inline]
    pub fn is_suspended(&self, key: usize) -> bool {
        key / Self::KEYS_PER_BUCKET < self.suspended.len()
            && Self::get_bit(&self.suspended, key) != 0
    }

    /// Resume every subscription, keeping the allocated buckets.
    #[inline]
    pub fn clear(&mut self) {
        self.suspended.fill(0);
    }

    #[inline]
    const fn set_bit(entries: &mut [u64], key: usize) {
        let position_in_entry: usize = key % Self::KEYS_PER_BUCKET;
        entries[key / Self::KEYS_PER_BUCKET] |= 1u64 << position_in_entry;
    }

    #[inline]
    const fn get_bit(entries: &[u64], key: usize) -> u64 {
        let entry = entries[key / Self::KEYS_PER_BUCKET];
        let position_in_entry: usize = key % Self::KEYS_PER_BUCKET;
        entry & (1u64 << position_in_entry)
    }
}
