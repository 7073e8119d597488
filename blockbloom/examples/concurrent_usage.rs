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

use std::sync::Arc;
use std::thread;

use blockbloom::bloom::BlockedBloomFilter;
use blockbloom::hash::mix64;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Sized for 1M keys with a 0.1% false positive rate
    let n = 1_000_000u64;
    let filter = Arc::new(BlockedBloomFilter::with_estimate(n, 0.001));
    println!(
        "Created filter with {} bits ({} blocks)",
        filter.bits(),
        filter.num_blocks()
    );

    // Insert from 8 threads without any locking
    let threads = 8;
    let chunk = n / threads;
    println!("\nAdding {n} mixed integers from {threads} threads...");
    let workers: Vec<_> = (0..threads)
        .map(|t| {
            let filter = Arc::clone(&filter);
            thread::spawn(move || {
                for i in (t * chunk + 1)..=((t + 1) * chunk) {
                    filter.add(mix64(i));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    println!("Estimated keys: {}", filter.len());
    println!("Load factor: {:.4}", filter.load_factor());
    println!("Est. FPP: {:.4}%", filter.estimated_fpp() * 100.0);

    // Measure false positives on keys that were never added
    let probes = 1_000_000u64;
    let false_positives = (n + 1..=n + probes)
        .filter(|&i| filter.test(mix64(i)))
        .count();
    println!(
        "Observed FPP: {:.4}%",
        false_positives as f64 / probes as f64 * 100.0
    );

    // Merge with a second filter of the same size
    let other = BlockedBloomFilter::with_estimate(n, 0.001);
    other.add_all((n + 1..=n + 1000).map(mix64));
    filter.union_with(&other);
    println!("\nAfter union: {}", filter.len());

    // Raw words can be stored anywhere and restored later
    let words = filter.to_words();
    let restored = BlockedBloomFilter::from_words(words).unwrap();
    println!("Restored filter equal: {}", restored == *filter);
}
