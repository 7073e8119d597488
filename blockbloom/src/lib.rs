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

//! # blockbloom
//!
//! A cache-blocked Bloom filter over 64-bit keys that many threads can mutate at once without
//! taking a lock.
//!
//! Every key touches exactly one 512-bit block, so an insert or a query costs at most one cache
//! miss. Words are updated with a compare-and-swap loop, which makes [`bloom::BlockedBloomFilter`]
//! safe to share between threads through a plain reference or an `Arc`.
//!
//! Keys are `u64` values that are expected to be well distributed already. Sequential or
//! otherwise structured integers must go through [`hash::mix64`] first.
//!
//! ```rust
//! use blockbloom::bloom::BlockedBloomFilter;
//! use blockbloom::hash::mix64;
//!
//! let filter = BlockedBloomFilter::with_estimate(10_000, 0.001);
//! filter.add(mix64(7));
//! assert!(filter.test(mix64(7)));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod bloom;
pub mod error;
pub mod hash;
