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

//! Integer mixing for filter keys.
//!
//! The filter consumes `u64` keys directly and derives its block and bit positions from the raw
//! key bits. Keys that are not already the output of a good hash function (counters, row ids,
//! small integers) cluster into a handful of blocks and inflate the false positive rate by
//! orders of magnitude. Run such keys through [`mix64`] before adding or testing them.

mod moremur;

pub use self::moremur::mix64;
pub use self::moremur::mix_i64;
