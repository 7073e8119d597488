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

use tracing::debug;

use super::BlockedBloomFilter;
use crate::error::Error;

/// Bits in one machine word of the filter.
pub const WORD_BITS: u64 = 64;
/// Bits in one block, the unit of memory touched by a single key.
pub const BLOCK_BITS: u64 = 512;
/// Words in one block.
pub const BLOCK_WORDS: usize = (BLOCK_BITS / WORD_BITS) as usize;
/// Number of bits probed per key (k).
pub const NUM_PROBES: u32 = 8;

/// Smallest filter: a single block.
pub const MIN_NUM_BITS: u64 = BLOCK_BITS;
/// Largest filter: block selection uses the low 32 bits of a key, so at most 2^32 words are
/// reachable; targets with a narrower `usize` are capped to the whole blocks they can index.
pub const MAX_NUM_BITS: u64 = MAX_NUM_WORDS * WORD_BITS;

const MAX_NUM_WORDS: u64 = {
    let addressable = u32::MAX as u64 + 1;
    let indexable = usize::MAX as u64 / BLOCK_WORDS as u64 * BLOCK_WORDS as u64;
    if indexable < addressable {
        indexable
    } else {
        addressable
    }
};

// ln(1 / 2^ln(2)), the bits-per-element factor of an optimally loaded filter.
const LN_INV_POW2_LN2: f64 = -0.4804530139182015;

/// Builder for creating [`BlockedBloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify expected items and false positive rate
///   (recommended)
/// - [`with_size()`](Self::with_size): Specify the requested bit count (manual)
///
/// Either way the capacity is rounded up to a whole number of 512-bit blocks.
#[derive(Debug, Clone)]
pub struct BlockedBloomFilterBuilder {
    num_bits: u64,
}

impl BlockedBloomFilterBuilder {
    /// Creates a builder sized for `max_items` keys at a false positive probability of `fpp`.
    ///
    /// # Panics
    ///
    /// Panics if `max_items` is 0, `fpp` is not in (0.0, 1.0), or the pair needs more than
    /// MAX_NUM_BITS bits.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockbloom::bloom::BlockedBloomFilterBuilder;
    /// let filter = BlockedBloomFilterBuilder::with_accuracy(10_000, 0.01).build();
    /// assert_eq!(filter.bits() % 512, 0);
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Self {
        BlockedBloomFilterBuilder {
            num_bits: estimate_num_bits(max_items, fpp),
        }
    }

    /// Creates a builder for a filter of at least `num_bits` bits.
    ///
    /// Requests below one block are raised to one block.
    ///
    /// # Panics
    ///
    /// Panics if `num_bits` > MAX_NUM_BITS.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockbloom::bloom::BlockedBloomFilterBuilder;
    /// let filter = BlockedBloomFilterBuilder::with_size(1000).build();
    /// assert_eq!(filter.bits(), 1024);
    /// ```
    pub fn with_size(num_bits: u64) -> Self {
        assert!(
            num_bits <= MAX_NUM_BITS,
            "num_bits must not exceed {}",
            MAX_NUM_BITS
        );

        BlockedBloomFilterBuilder {
            num_bits: round_up_to_block(num_bits.max(MIN_NUM_BITS)),
        }
    }

    /// Returns the capacity in bits the built filter will have.
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    /// Builds the filter with all bits cleared.
    pub fn build(self) -> BlockedBloomFilter {
        let num_words = (self.num_bits / WORD_BITS) as usize;
        debug!(
            num_bits = self.num_bits,
            num_blocks = num_words / BLOCK_WORDS,
            "allocating blocked bloom filter"
        );
        BlockedBloomFilter::zeroed(num_words)
    }
}

/// Estimates the number of bits needed to hold `max_items` keys with a false positive
/// probability of `fpp`.
///
/// Formula: `m = ceil(n * ln(p) / ln(1 / 2^ln(2)))`, raised to at least MIN_NUM_BITS and rounded
/// up to a multiple of 512.
///
/// This is the optimal size for a flat Bloom filter; the number of probes stays fixed at
/// [`NUM_PROBES`] regardless of `fpp`.
///
/// # Panics
///
/// Panics if `max_items` is 0, `fpp` is not in (0.0, 1.0), or `m` exceeds MAX_NUM_BITS. Use
/// [`try_estimate_num_bits`] to get an error instead.
///
/// # Examples
///
/// ```
/// # use blockbloom::bloom::estimate_num_bits;
/// let bits = estimate_num_bits(1000, 0.01);
/// assert_eq!(bits, 9728); // ~9585 bits rounded up to 19 blocks
/// ```
pub fn estimate_num_bits(max_items: u64, fpp: f64) -> u64 {
    assert!(max_items > 0, "max_items must be greater than 0");
    assert!(
        fpp > 0.0 && fpp < 1.0,
        "fpp must be between 0.0 and 1.0 (exclusive)"
    );

    let bits = required_bits(max_items, fpp);
    assert!(
        bits <= MAX_NUM_BITS,
        "num_bits must not exceed {}",
        MAX_NUM_BITS
    );
    round_up_to_block(bits.max(MIN_NUM_BITS))
}

/// Fallible variant of [`estimate_num_bits`].
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
/// `max_items` is 0, `fpp` is not in (0.0, 1.0), or the estimate exceeds MAX_NUM_BITS.
pub fn try_estimate_num_bits(max_items: u64, fpp: f64) -> Result<u64, Error> {
    if max_items == 0 {
        return Err(Error::invalid_argument("max_items must be greater than 0"));
    }
    if !(fpp > 0.0 && fpp < 1.0) {
        return Err(
            Error::invalid_argument("fpp must be between 0.0 and 1.0 (exclusive)")
                .with_context("fpp", fpp),
        );
    }
    let bits = required_bits(max_items, fpp);
    if bits > MAX_NUM_BITS {
        return Err(
            Error::invalid_argument(format!("num_bits must not exceed {MAX_NUM_BITS}"))
                .with_context("max_items", max_items)
                .with_context("fpp", fpp),
        );
    }
    Ok(estimate_num_bits(max_items, fpp))
}

// Saturates at u64::MAX for out-of-range products.
fn required_bits(max_items: u64, fpp: f64) -> u64 {
    (max_items as f64 * fpp.ln() / LN_INV_POW2_LN2).ceil() as u64
}

fn round_up_to_block(bits: u64) -> u64 {
    bits.div_ceil(BLOCK_BITS) * BLOCK_BITS
}
