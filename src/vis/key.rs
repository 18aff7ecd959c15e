// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Identifiers for individual waterfalls.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// A visibility polarisation. Parsing is case insensitive; displaying is
/// always lowercase (e.g. "ee").
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Pol {
    XX,
    YY,
    XY,
    YX,
    EE,
    NN,
    EN,
    NE,
}

/// A pair of antenna numbers. The order matters; (1, 2) is a different baseline
/// to (2, 1), as the latter is the conjugate of the former.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AntPair(pub u32, pub u32);

impl AntPair {
    /// Is this an auto-correlation?
    pub fn is_auto(self) -> bool {
        self.0 == self.1
    }
}

impl fmt::Display for AntPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// The key for one waterfall in a collection: an antenna pair and a
/// polarisation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BaselineKey {
    pub ants: AntPair,
    pub pol: Pol,
}

impl BaselineKey {
    pub fn new(ant1: u32, ant2: u32, pol: Pol) -> BaselineKey {
        BaselineKey {
            ants: AntPair(ant1, ant2),
            pol,
        }
    }
}

impl fmt::Display for BaselineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.ants.0, self.ants.1, self.pol)
    }
}

impl From<(u32, u32, Pol)> for BaselineKey {
    fn from((ant1, ant2, pol): (u32, u32, Pol)) -> Self {
        BaselineKey::new(ant1, ant2, pol)
    }
}
