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

// Constants from Pelle Evensen's "moremur" variant of the SplitMix64 finalizer:
// https://mostlymangling.blogspot.com/2019/12/stronger-better-morer-moremur-better.html
const M1: u64 = 0x3C79AC492BA7B653;
const M2: u64 = 0x1C69B3F74AC4AE35;

/// Scrambles `x` so that every input bit affects every output bit.
///
/// Use this to pseudo-randomize sequential integers before they are added to a
/// [`BlockedBloomFilter`](crate::bloom::BlockedBloomFilter).
///
/// The function is a bijection on `u64`. Note that `mix64(0) == 0`.
///
/// # Examples
///
/// ```
/// # use blockbloom::hash::mix64;
/// assert_eq!(mix64(0), 0);
/// assert_ne!(mix64(1), 1);
/// assert_ne!(mix64(1), mix64(2));
/// ```
#[inline]
pub const fn mix64(mut x: u64) -> u64 {
    x ^= x >> 27;
    x = x.wrapping_mul(M1);
    x ^= x >> 33;
    x = x.wrapping_mul(M2);
    x ^= x >> 27;
    x
}

/// Shorthand for `mix64(x as u64)`.
#[inline]
pub const fn mix_i64(x: i64) -> u64 {
    mix64(x as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_fixed_point() {
        assert_eq!(mix64(0), 0);
        assert_eq!(mix_i64(0), 0);
    }

    #[test]
    fn test_signed_shorthand() {
        assert_eq!(mix_i64(42), mix64(42));
        assert_eq!(mix_i64(-1), mix64(u64::MAX));
    }

    #[test]
    fn test_sequential_inputs_spread_over_high_and_low_halves() {
        // Both 32-bit halves of the key feed the addressing, so both must vary.
        let mut low = std::collections::HashSet::new();
        let mut high = std::collections::HashSet::new();
        for i in 1..=1000u64 {
            let h = mix64(i);
            low.insert(h as u32 >> 24);
            high.insert((h >> 56) as u32);
        }
        assert!(low.len() > 200, "low half poorly mixed: {}", low.len());
        assert!(high.len() > 200, "high half poorly mixed: {}", high.len());
    }

    #[test]
    fn test_single_bit_flip_avalanches() {
        for bit in 0..64 {
            let a = mix64(0x0123_4567_89ab_cdef);
            let b = mix64(0x0123_4567_89ab_cdef ^ (1 << bit));
            let flipped = (a ^ b).count_ones();
            assert!(
                (12..=52).contains(&flipped),
                "bit {bit} flipped {flipped} output bits"
            );
        }
    }
}
