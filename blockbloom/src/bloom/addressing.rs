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

//! Maps a key onto one block, four words and eight bits.
//!
//! Layout of a block (8 words, 512 bits):
//!
//! ```text
//! | sector 0 | sector 1 | sector 2 | sector 3 |
//! | w0 | w1  | w2 | w3  | w4 | w5  | w6 | w7  |
//! ```
//!
//! A key picks one word of each sector and sets two bits in each picked word, for a total of
//! eight probed bits. All positions are derived from the two 32-bit halves of the key with
//! wrapping 32-bit arithmetic, in the style of Kirsch and Mitzenmacher's double hashing.

/// The four word indices and matching bit masks probed for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Probe {
    pub(super) words: [usize; 4],
    pub(super) masks: [u64; 4],
}

impl Probe {
    /// Computes the probe for `key` in a filter of `num_words` words.
    ///
    /// `num_words` must be a positive multiple of 8.
    #[inline]
    pub(super) fn new(key: u64, num_words: usize) -> Probe {
        debug_assert!(num_words > 0 && num_words % 8 == 0);
        let (h0, h1) = split(key);
        Probe {
            words: sectors(h0, h1, num_words),
            masks: bitmasks(h0, h1),
        }
    }

    /// Whether `values`, read from `self.words` in order, carry every probed bit.
    #[inline]
    pub(super) fn matches(&self, values: [u64; 4]) -> bool {
        values[0] & self.masks[0] == self.masks[0]
            && values[1] & self.masks[1] == self.masks[1]
            && values[2] & self.masks[2] == self.masks[2]
            && values[3] & self.masks[3] == self.masks[3]
    }
}

#[inline]
fn split(key: u64) -> (u32, u32) {
    (key as u32, (key >> 32) as u32)
}

/// Selects the block from `h0` and, within each sector, one of its two words from the top bit
/// of `i * h1`.
#[inline]
fn sectors(h0: u32, h1: u32, num_words: usize) -> [usize; 4] {
    let block = (h0 as usize % num_words) & !7;
    [
        block + (h1 >> 31) as usize,
        block + 2 + (h1.wrapping_mul(2) >> 31) as usize,
        block + 4 + (h1.wrapping_mul(3) >> 31) as usize,
        block + 6 + (h1.wrapping_mul(4) >> 31) as usize,
    ]
}

#[inline]
fn bit(h0: u32, h1: u32, i: u32) -> u64 {
    1 << ((h0.wrapping_add(h1.wrapping_mul(i)) >> 16) & 63)
}

#[inline]
fn bitmasks(h0: u32, h1: u32) -> [u64; 4] {
    [
        bit(h0, h1, 1) | bit(h0, h1, 2),
        bit(h0, h1, 3) | bit(h0, h1, 4),
        bit(h0, h1, 5) | bit(h0, h1, 6),
        bit(h0, h1, 7) | bit(h0, h1, 8),
    ]
}
