// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tracing::debug;

use super::addressing::Probe;
use super::atomic::set_bits;
use super::builder::BLOCK_BITS;
use super::builder::BLOCK_WORDS;
use super::builder::NUM_PROBES;
use super::builder::WORD_BITS;
use super::BlockedBloomFilterBuilder;
use super::Cardinality;
use crate::error::Error;

/// A blocked Bloom filter over `u64` keys that is safe to mutate from many threads at once.
///
/// Provides fast membership queries with:
/// - No false negatives for keys whose `add` completed before the query
/// - Tunable false positive rate
/// - At most one cache line touched per insert or query
///
/// All operations take `&self`. Each word is updated with atomic read-modify-write, so no lock
/// is involved and no operation blocks. Guarantees hold per word only: a `test` racing with an
/// unfinished `add` of the same key may return `false`, and `reset`, `is_empty`, `equal`,
/// `len` and `to_words` are not snapshots while writers are active.
///
/// Use [`new()`](Self::new), [`with_estimate()`](Self::with_estimate) or
/// [`super::BlockedBloomFilterBuilder`] to construct instances.
pub struct BlockedBloomFilter {
    /// Bit array packed into u64 words; the length is a positive multiple of 8.
    words: Box<[AtomicU64]>,
}

impl BlockedBloomFilter {
    /// Creates a filter with at least `num_bits` bits, rounded up to a multiple of 512.
    ///
    /// # Panics
    ///
    /// Panics if `num_bits` exceeds [`MAX_NUM_BITS`](super::MAX_NUM_BITS).
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockbloom::bloom::BlockedBloomFilter;
    /// let filter = BlockedBloomFilter::new(1_000_000);
    /// assert_eq!(filter.bits() % 512, 0);
    /// ```
    pub fn new(num_bits: u64) -> Self {
        BlockedBloomFilterBuilder::with_size(num_bits).build()
    }

    /// Shorthand for `new(estimate_num_bits(max_items, fpp))`.
    ///
    /// # Panics
    ///
    /// Panics if `max_items` is 0, `fpp` is not in (0.0, 1.0), or the pair needs more than
    /// [`MAX_NUM_BITS`](super::MAX_NUM_BITS) bits.
    pub fn with_estimate(max_items: u64, fpp: f64) -> Self {
        BlockedBloomFilterBuilder::with_accuracy(max_items, fpp).build()
    }

    pub(super) fn zeroed(num_words: usize) -> Self {
        debug_assert!(num_words > 0 && num_words % BLOCK_WORDS == 0);
        let words = (0..num_words).map(|_| AtomicU64::new(0)).collect();
        BlockedBloomFilter { words }
    }

    /// Reconstructs a filter from raw words, as returned by [`to_words()`](Self::to_words).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData) if `words` is
    /// empty or its length is not a multiple of 8.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockbloom::bloom::BlockedBloomFilter;
    /// let filter = BlockedBloomFilter::new(4096);
    /// filter.add(0xdead_beef_cafe_f00d);
    ///
    /// let restored = BlockedBloomFilter::from_words(filter.to_words()).unwrap();
    /// assert_eq!(filter, restored);
    /// assert!(BlockedBloomFilter::from_words(vec![0; 12]).is_err());
    /// ```
    pub fn from_words(words: Vec<u64>) -> Result<Self, Error> {
        if words.is_empty() || words.len() % BLOCK_WORDS != 0 {
            return Err(Error::misaligned_words(words.len()));
        }
        debug!(num_words = words.len(), "restoring blocked bloom filter");
        let words = words.into_iter().map(AtomicU64::new).collect();
        Ok(BlockedBloomFilter { words })
    }

    /// Adds `key` to the filter.
    ///
    /// Adding a key twice leaves the filter unchanged. The complexity is O(1).
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockbloom::bloom::BlockedBloomFilter;
    /// # use blockbloom::hash::mix64;
    /// let filter = BlockedBloomFilter::new(4096);
    /// filter.add(mix64(1));
    /// assert!(filter.test(mix64(1)));
    /// ```
    #[inline]
    pub fn add(&self, key: u64) {
        let probe = self.probe(key);
        for (&w, &mask) in probe.words.iter().zip(&probe.masks) {
            set_bits(&self.words[w], mask);
        }
    }

    /// Adds every key yielded by `keys`.
    pub fn add_all<I: IntoIterator<Item = u64>>(&self, keys: I) {
        for key in keys {
            self.add(key);
        }
    }

    /// Tests whether `key` may be in the filter.
    ///
    /// Returns:
    /// - `true`: `key` was **possibly** added (or false positive)
    /// - `false`: `key` was **definitely not** added
    ///
    /// The complexity is O(1).
    #[inline]
    pub fn test(&self, key: u64) -> bool {
        let probe = self.probe(key);
        probe.matches(probe.words.map(|w| self.words[w].load(Ordering::Acquire)))
    }

    /// Tests and adds `key` in a single pass.
    ///
    /// Returns whether `key` was possibly present before this call. This is cheaper than
    /// calling [`test()`](Self::test) then [`add()`](Self::add), since each word is visited once.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockbloom::bloom::BlockedBloomFilter;
    /// # use blockbloom::hash::mix64;
    /// let filter = BlockedBloomFilter::new(4096);
    /// assert!(!filter.test_and_add(mix64(7))); // first insertion
    /// assert!(filter.test_and_add(mix64(7))); // now it's in the set
    /// ```
    #[inline]
    pub fn test_and_add(&self, key: u64) -> bool {
        let probe = self.probe(key);
        let mut before = [0u64; 4];
        for (i, (&w, &mask)) in probe.words.iter().zip(&probe.masks).enumerate() {
            before[i] = set_bits(&self.words[w], mask);
        }
        probe.matches(before)
    }

    /// Returns the total number of bits in the filter (capacity).
    pub fn bits(&self) -> u64 {
        self.words.len() as u64 * WORD_BITS
    }

    /// Returns the number of 64-bit words backing the filter.
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Returns the number of 512-bit blocks in the filter.
    pub fn num_blocks(&self) -> usize {
        self.words.len() / BLOCK_WORDS
    }

    /// Returns whether no bit is set.
    ///
    /// The complexity is O(n) but the scan stops at the first non-zero word, so this is cheaper
    /// than checking [`len()`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| w.load(Ordering::Acquire) == 0)
    }

    /// Returns whether `self` and `other` have the same size and the same bits set.
    ///
    /// Filters of different sizes are never equal, even when both are empty.
    /// The complexity is O(n).
    pub fn equal(&self, other: &BlockedBloomFilter) -> bool {
        self.is_compatible(other)
            && self
                .words
                .iter()
                .zip(other.words.iter())
                .all(|(a, b)| a.load(Ordering::Acquire) == b.load(Ordering::Acquire))
    }

    /// Estimates the number of distinct keys added to the filter.
    ///
    /// Each block is treated as an independent Bloom filter of 512 bits with 8 probes, and the
    /// per-block estimates `-(512 / 8) * ln(1 - ones / 512)` are summed. The estimate may land on
    /// either side of the true count; keys whose probed bits coincide pull it down.
    ///
    /// Returns [`Cardinality::Saturated`] as soon as one block has every bit set.
    /// The complexity is O(n).
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockbloom::bloom::{BlockedBloomFilter, Cardinality};
    /// # use blockbloom::hash::mix64;
    /// let filter = BlockedBloomFilter::with_estimate(1000, 0.01);
    /// assert_eq!(filter.len(), Cardinality::Estimate(0));
    ///
    /// filter.add_all((1..=100).map(mix64));
    /// let n = filter.len().estimate().unwrap();
    /// assert!(n > 90 && n <= 102);
    /// ```
    pub fn len(&self) -> Cardinality {
        // https://en.wikipedia.org/wiki/Bloom_filter#Approximating_the_number_of_items_in_a_Bloom_filter
        let block_bits = BLOCK_BITS as f64;
        let mut sum = 0.0;
        for block in self.words.chunks_exact(BLOCK_WORDS) {
            let ones: u32 = block
                .iter()
                .map(|w| w.load(Ordering::Acquire).count_ones())
                .sum();
            if u64::from(ones) == BLOCK_BITS {
                return Cardinality::Saturated;
            }
            if ones != 0 {
                sum += (-f64::from(ones) / block_bits).ln_1p();
            }
        }
        let n = -(block_bits / f64::from(NUM_PROBES)) * sum;
        Cardinality::Estimate(n.round() as u64)
    }

    /// Clears every bit while preserving capacity.
    ///
    /// Words are cleared one at a time; keys added concurrently may survive partially.
    pub fn reset(&self) {
        for word in self.words.iter() {
            word.store(0, Ordering::Release);
        }
    }

    /// Merges `other` into this filter via bitwise OR (union).
    ///
    /// Afterwards this filter recognizes every key recognized by either filter. Concurrent
    /// `add` calls on either filter are allowed.
    ///
    /// # Panics
    ///
    /// Panics if the filters differ in size. Use [`is_compatible()`](Self::is_compatible) to
    /// check first, or [`try_union_with()`](Self::try_union_with).
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockbloom::bloom::BlockedBloomFilter;
    /// let f1 = BlockedBloomFilter::new(4096);
    /// let f2 = BlockedBloomFilter::new(4096);
    /// f1.add(0x1111_2222_3333_4444);
    /// f2.add(0x5555_6666_7777_8888);
    ///
    /// f1.union_with(&f2);
    /// assert!(f1.test(0x1111_2222_3333_4444));
    /// assert!(f1.test(0x5555_6666_7777_8888));
    /// ```
    pub fn union_with(&self, other: &BlockedBloomFilter) {
        assert!(
            self.is_compatible(other),
            "cannot union with filter of unequal size"
        );
        self.union_words(other);
    }

    /// Fallible variant of [`union_with()`](Self::union_with).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if the
    /// filters differ in size; `self` is left untouched.
    pub fn try_union_with(&self, other: &BlockedBloomFilter) -> Result<(), Error> {
        if !self.is_compatible(other) {
            return Err(Error::unequal_size(self.bits(), other.bits()));
        }
        self.union_words(other);
        Ok(())
    }

    fn union_words(&self, other: &BlockedBloomFilter) {
        debug!(num_bits = self.bits(), "merging blocked bloom filters");
        for (word, other_word) in self.words.iter().zip(other.words.iter()) {
            set_bits(word, other_word.load(Ordering::Acquire));
        }
    }

    /// Checks if two filters can be merged, i.e. have the same number of bits.
    pub fn is_compatible(&self, other: &BlockedBloomFilter) -> bool {
        self.words.len() == other.words.len()
    }

    /// Returns the number of bits set to 1.
    ///
    /// Useful for monitoring filter saturation.
    pub fn bits_used(&self) -> u64 {
        self.words
            .iter()
            .map(|w| u64::from(w.load(Ordering::Acquire).count_ones()))
            .sum()
    }

    /// Returns the current load factor (fraction of bits set).
    pub fn load_factor(&self) -> f64 {
        self.bits_used() as f64 / self.bits() as f64
    }

    /// Estimates the current false positive probability as `load_factor^8`.
    ///
    /// This assumes bits are spread evenly over blocks. Blocks always carry some imbalance, so
    /// the observed rate is somewhat higher.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powi(NUM_PROBES as i32)
    }

    /// Copies the raw words out of the filter.
    ///
    /// Together with [`from_words()`](Self::from_words) this lets callers persist a filter in
    /// whatever format they choose.
    pub fn to_words(&self) -> Vec<u64> {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Acquire))
            .collect()
    }

    #[inline]
    fn probe(&self, key: u64) -> Probe {
        Probe::new(key, self.words.len())
    }
}

impl Clone for BlockedBloomFilter {
    fn clone(&self) -> Self {
        let words = self
            .words
            .iter()
            .map(|w| AtomicU64::new(w.load(Ordering::Acquire)))
            .collect();
        BlockedBloomFilter { words }
    }
}

impl PartialEq for BlockedBloomFilter {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl fmt::Debug for BlockedBloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockedBloomFilter")
            .field("num_bits", &self.bits())
            .field("num_blocks", &self.num_blocks())
            .finish()
    }
}

impl Extend<u64> for BlockedBloomFilter {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, keys: I) {
        self.add_all(keys);
    }
}

#[cfg(test)]
mod tests {
    use super::BlockedBloomFilter;
    use crate::bloom::Cardinality;
    use crate::hash::mix64;

    #[test]
    fn test_add_and_test() {
        let filter = BlockedBloomFilter::new(1_000_000);
        assert_eq!(filter.bits() % 512, 0);
        assert!(!filter.test(mix64(1)));
        filter.add(mix64(1));
        assert!(filter.test(mix64(1)));
        assert!(!filter.is_empty());

        filter.reset();
        assert!(filter.is_empty());
        assert!(!filter.test(mix64(1)));
    }

    #[test]
    fn test_add_sets_at_most_eight_bits() {
        let filter = BlockedBloomFilter::new(4096);
        filter.add(mix64(5));
        let used = filter.bits_used();
        assert!((4..=8).contains(&used), "{used}");
    }

    #[test]
    fn test_add_is_idempotent() {
        let once = BlockedBloomFilter::new(8192);
        let twice = BlockedBloomFilter::new(8192);
        for i in 1..=200 {
            once.add(mix64(i));
            twice.add(mix64(i));
            twice.add(mix64(i));
        }
        assert_eq!(once.to_words(), twice.to_words());
    }

    #[test]
    fn test_test_and_add() {
        let filter = BlockedBloomFilter::new(1 << 16);
        assert!(!filter.test_and_add(mix64(42)));
        assert!(filter.test_and_add(mix64(42)));
        assert!(filter.test(mix64(42)));
    }

    #[test]
    fn test_test_and_add_matches_add() {
        let a = BlockedBloomFilter::new(1 << 14);
        let b = BlockedBloomFilter::new(1 << 14);
        for i in 1..=500 {
            a.add(mix64(i));
            b.test_and_add(mix64(i));
        }
        assert!(a.equal(&b));
    }

    #[test]
    fn test_zero_key() {
        let filter = BlockedBloomFilter::new(512);
        assert!(!filter.test(0));
        filter.add(0);
        assert!(filter.test(0));
    }

    #[test]
    fn test_len_empty_and_saturated() {
        let filter = BlockedBloomFilter::new(100_000);
        assert_eq!(filter.len(), Cardinality::Estimate(0));

        let full = BlockedBloomFilter::from_words(vec![u64::MAX; filter.num_words()]).unwrap();
        assert_eq!(full.len(), Cardinality::Saturated);

        // one saturated block is enough
        let mut words = vec![0; 16];
        words[8..].fill(u64::MAX);
        let partial = BlockedBloomFilter::from_words(words).unwrap();
        assert!(partial.len().is_saturated());
    }

    #[test]
    fn test_statistics() {
        let filter = BlockedBloomFilter::new(1024);
        assert_eq!(filter.bits_used(), 0);
        assert_eq!(filter.load_factor(), 0.0);
        assert_eq!(filter.estimated_fpp(), 0.0);

        filter.add(mix64(3));
        assert!(filter.bits_used() > 0);
        assert!(filter.load_factor() > 0.0);
        assert!(filter.estimated_fpp() > 0.0);
    }

    #[test]
    fn test_clone_is_independent() {
        let filter = BlockedBloomFilter::new(2048);
        filter.add(mix64(1));
        let copy = filter.clone();
        assert_eq!(filter, copy);
        copy.add(mix64(2));
        assert_ne!(filter, copy);
    }

    #[test]
    fn test_extend() {
        let mut filter = BlockedBloomFilter::new(2048);
        filter.extend((1..=10).map(mix64));
        assert!((1..=10).all(|i| filter.test(mix64(i))));
    }

    #[test]
    fn test_debug_omits_bits() {
        let filter = BlockedBloomFilter::new(1024);
        assert_eq!(
            format!("{filter:?}"),
            "BlockedBloomFilter { num_bits: 1024, num_blocks: 2 }"
        );
    }
}
