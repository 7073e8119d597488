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

//! Concurrency tests for BlockedBloomFilter.
//!
//! Filters are shared by reference between scoped threads; no test takes a lock.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use blockbloom::bloom::BlockedBloomFilter;
use blockbloom::hash::mix64;

#[test]
fn test_parallel_insertion_matches_sequential() {
    let n = 1_000_000u64;

    let expected = BlockedBloomFilter::with_estimate(n, 0.001);
    for i in 1..=n {
        expected.add(mix64(i));
    }

    for c in [2u64, 4, 8, 16, 32, 64] {
        let filter = BlockedBloomFilter::with_estimate(n, 0.001);
        let d = n / c;
        thread::scope(|s| {
            for start in (1..=n).step_by(d as usize) {
                let filter = &filter;
                s.spawn(move || {
                    for i in start..start + d {
                        filter.add(mix64(i));
                    }
                });
            }
        });
        assert!(filter.equal(&expected), "{c} threads diverged");
    }
}

#[test]
fn test_parallel_insertion_reversed_order() {
    let n = 100_000u64;
    let forward = BlockedBloomFilter::new(1 << 20);
    forward.add_all((1..=n).map(mix64));

    let backward = BlockedBloomFilter::new(1 << 20);
    thread::scope(|s| {
        for t in 0..8 {
            let backward = &backward;
            s.spawn(move || {
                for i in (1..=n).rev().filter(|i| i % 8 == t) {
                    backward.test_and_add(mix64(i));
                }
            });
        }
    });
    assert_eq!(forward, backward);
}

#[test]
fn test_concurrent_test_and_add_same_keys() {
    let n = 50_000u64;
    let filter = BlockedBloomFilter::with_estimate(n, 0.001);
    let fresh = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..4 {
            let filter = &filter;
            let fresh = &fresh;
            s.spawn(move || {
                for i in 1..=n {
                    if !filter.test_and_add(mix64(i)) {
                        fresh.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    assert!((1..=n).all(|i| filter.test(mix64(i))));
    // Every key needs at least one caller that saw it absent, minus false positives. Callers
    // racing on the same key may both see it absent.
    let fresh = fresh.load(Ordering::Relaxed) as u64;
    assert!(fresh >= n * 99 / 100, "{fresh}");
    assert!(fresh <= 4 * n, "{fresh}");
}

#[test]
fn test_concurrent_union_and_add() {
    let n = 20_000u64;
    let target = Arc::new(BlockedBloomFilter::new(1 << 20));
    let sources: Vec<_> = (0..4)
        .map(|t| {
            let f = BlockedBloomFilter::new(1 << 20);
            f.add_all((t * n + 1..=(t + 1) * n).map(mix64));
            f
        })
        .collect();

    thread::scope(|s| {
        for source in &sources {
            let target = Arc::clone(&target);
            s.spawn(move || target.union_with(source));
        }
        let target = Arc::clone(&target);
        s.spawn(move || target.add_all((4 * n + 1..=5 * n).map(mix64)));
    });

    assert!((1..=5 * n).all(|i| target.test(mix64(i))));

    let expected = BlockedBloomFilter::new(1 << 20);
    expected.add_all((1..=5 * n).map(mix64));
    assert_eq!(*target, expected);
}

#[test]
fn test_readers_never_see_false_negatives_after_join() {
    let filter = Arc::new(BlockedBloomFilter::with_estimate(100_000, 0.01));

    let writers: Vec<_> = (0..4u64)
        .map(|t| {
            let filter = Arc::clone(&filter);
            thread::spawn(move || {
                for i in (t * 25_000 + 1)..=((t + 1) * 25_000) {
                    filter.add(mix64(i));
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let readers: Vec<_> = (0..4u64)
        .map(|t| {
            let filter = Arc::clone(&filter);
            thread::spawn(move || {
                ((t * 25_000 + 1)..=((t + 1) * 25_000)).all(|i| filter.test(mix64(i)))
            })
        })
        .collect();
    for reader in readers {
        assert!(reader.join().unwrap());
    }
}
