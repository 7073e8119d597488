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

/// The result of estimating how many distinct keys a filter holds.
///
/// Once any block has all 512 bits set its contribution is unbounded, and so is the estimate.
/// Such a filter reports [`Cardinality::Saturated`]; at that point `test` is also `true` for
/// every key that maps to the saturated block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Approximate number of distinct keys added so far.
    Estimate(u64),
    /// At least one block is full and the count can no longer be estimated.
    Saturated,
}

impl Cardinality {
    /// Returns the estimate, or `None` if the filter is saturated.
    pub fn estimate(self) -> Option<u64> {
        match self {
            Cardinality::Estimate(n) => Some(n),
            Cardinality::Saturated => None,
        }
    }

    /// Returns whether the filter is saturated.
    pub fn is_saturated(self) -> bool {
        matches!(self, Cardinality::Saturated)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Estimate(n) => write!(f, "~{n}"),
            Cardinality::Saturated => write!(f, "saturated"),
        }
    }
}
