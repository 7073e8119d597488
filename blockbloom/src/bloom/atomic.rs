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

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Atomically sets the bits of `mask` in `word` and returns the value seen before the update.
///
/// Words that already carry every bit of `mask` are returned without a write. Otherwise the
/// update retries until the compare-and-swap wins; a failed attempt means another thread changed
/// the word first. Lock-free, not wait-free.
#[inline]
pub(super) fn set_bits(word: &AtomicU64, mask: u64) -> u64 {
    let mut old = word.load(Ordering::Acquire);
    loop {
        if old & mask == mask {
            return old;
        }
        match word.compare_exchange_weak(old, old | mask, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => return old,
            Err(actual) => old = actual,
        }
    }
}
