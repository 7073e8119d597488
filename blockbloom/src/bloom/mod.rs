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

//! Blocked Bloom filter for concurrent, probabilistic set membership testing.
//!
//! A Bloom filter answers "possibly in set" or "definitely not in set". This variant splits its
//! bit array into 512-bit blocks, the size of a cache line on most hardware, and confines every
//! key to a single block. Within the block a key sets 8 bits spread over 4 words.
//!
//! # Properties
//!
//! - **No false negatives**: once `add(x)` has returned, `test(x)` is `true` on every thread
//!   that observes the return
//! - **Possible false positives**: `test()` may return `true` for keys never added
//! - **Fixed size**: capacity is chosen at construction; filters never grow
//! - **Lock-free**: all operations take `&self` and update words with compare-and-swap
//! - **No deletion**: keys can only be added, or the whole filter reset
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use blockbloom::bloom::BlockedBloomFilter;
//! use blockbloom::hash::mix64;
//!
//! // Sized for 100_000 keys with a 0.1% false positive rate
//! let filter = Arc::new(BlockedBloomFilter::with_estimate(100_000, 0.001));
//!
//! let workers: Vec<_> = (0..4u64)
//!     .map(|t| {
//!         let filter = Arc::clone(&filter);
//!         std::thread::spawn(move || {
//!             for i in (t * 1000)..((t + 1) * 1000) {
//!                 filter.add(mix64(i));
//!             }
//!         })
//!     })
//!     .collect();
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//!
//! assert!(filter.test(mix64(1234)));
//! println!("{} keys in {} bits", filter.len(), filter.bits());
//! ```
//!
//! # Keys
//!
//! Keys are `u64` values that must already be well distributed, such as the output of a
//! [`std::hash::Hasher`]. Sequential integers must be mixed with [`crate::hash::mix64`] first.
//!
//! # Implementation Details
//!
//! - 8 probes per key (k), fixed
//! - Block selection from the low 32 bits of the key, sector words and bit offsets derived by
//!   double hashing over both 32-bit halves
//! - Per-block cardinality estimation from population counts
//!
//! # References
//!
//! - Kirsch and Mitzenmacher (2008). "Less Hashing, Same Performance: Building a Better Bloom
//!   Filter"
//! - Putze, Sanders and Singler (2007). "Cache-, Hash- and Space-Efficient Bloom Filters"
//! - Lang et al. (2019). "Performance-Optimal Filtering: Bloom Overtakes Cuckoo at High
//!   Throughput"

mod addressing;
mod atomic;
mod builder;
mod cardinality;
mod filter;

pub use self::builder::estimate_num_bits;
pub use self::builder::try_estimate_num_bits;
pub use self::builder::BlockedBloomFilterBuilder;
pub use self::builder::BLOCK_BITS;
pub use self::builder::BLOCK_WORDS;
pub use self::builder::MAX_NUM_BITS;
pub use self::builder::MIN_NUM_BITS;
pub use self::builder::NUM_PROBES;
pub use self::builder::WORD_BITS;
pub use self::cardinality::Cardinality;
pub use self::filter::BlockedBloomFilter;
