// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visibility waterfalls and keyed collections of them.

mod error;
mod key;

pub use error::VisError;
pub use key::{AntPair, BaselineKey, Pol};

use indexmap::IndexMap;
use ndarray::prelude::*;

use crate::c64;

/// A (time, frequency) grid of complex visibilities for a single baseline and
/// polarisation, with its flags and sample counts. All three arrays always have
/// the same shape; rows are chronologically ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Waterfall {
    /// The visibilities.
    pub data: Array2<c64>,

    /// `true` means the corresponding visibility is excluded.
    pub flags: Array2<bool>,

    /// The number of raw samples each visibility represents.
    pub nsamples: Array2<f64>,
}

impl Waterfall {
    /// Wrap visibilities into a [Waterfall] with nothing flagged and a sample
    /// count of 1 everywhere.
    pub fn new(data: Array2<c64>) -> Waterfall {
        let flags = Array2::from_elem(data.raw_dim(), false);
        let nsamples = Array2::ones(data.raw_dim());
        Waterfall {
            data,
            flags,
            nsamples,
        }
    }

    /// Assemble a [Waterfall] from its parts. If the flags or sample counts are
    /// not supplied they default to "unflagged" and 1.0, respectively.
    pub fn from_parts(
        data: Array2<c64>,
        flags: Option<Array2<bool>>,
        nsamples: Option<Array2<f64>>,
    ) -> Result<Waterfall, VisError> {
        let mut waterfall = Waterfall::new(data);
        if let Some(flags) = flags {
            waterfall = waterfall.with_flags(flags)?;
        }
        if let Some(nsamples) = nsamples {
            waterfall = waterfall.with_nsamples(nsamples)?;
        }
        Ok(waterfall)
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: Array2<bool>) -> Result<Waterfall, VisError> {
        check_shape("flags", flags.dim(), self.data.dim())?;
        self.flags = flags;
        Ok(self)
    }

    /// Replace the sample counts.
    pub fn with_nsamples(mut self, nsamples: Array2<f64>) -> Result<Waterfall, VisError> {
        check_shape("nsamples", nsamples.dim(), self.data.dim())?;
        self.nsamples = nsamples;
        Ok(self)
    }

    pub fn num_times(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn num_freqs(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }
}

pub(crate) fn check_shape(
    what: &'static str,
    got: (usize, usize),
    expected: (usize, usize),
) -> Result<(), VisError> {
    if got == expected {
        Ok(())
    } else {
        Err(VisError::ShapeMismatch {
            what,
            got,
            expected,
        })
    }
}

/// The operations needed of a keyed collection of waterfall-like things. Keys
/// are unique and iteration order must be deterministic.
pub trait VisCollection<T> {
    fn get(&self, key: &BaselineKey) -> Option<&T>;

    fn keys(&self) -> Vec<BaselineKey>;

    fn contains(&self, key: &BaselineKey) -> bool;

    /// Insert `value` at `key`, returning whatever was there before.
    fn set(&mut self, key: BaselineKey, value: T) -> Option<T>;
}

/// A collection of things keyed by [BaselineKey], iterated in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct VisContainer<T>(IndexMap<BaselineKey, T>);

impl<T> Default for VisContainer<T> {
    fn default() -> Self {
        VisContainer(IndexMap::new())
    }
}

impl<T> VisContainer<T> {
    pub fn new() -> VisContainer<T> {
        VisContainer::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BaselineKey, &T)> {
        self.0.iter()
    }

    /// Remove an entry, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &BaselineKey) -> Option<T> {
        self.0.shift_remove(key)
    }
}

impl<T> VisCollection<T> for VisContainer<T> {
    fn get(&self, key: &BaselineKey) -> Option<&T> {
        self.0.get(key)
    }

    fn keys(&self) -> Vec<BaselineKey> {
        self.0.keys().copied().collect()
    }

    fn contains(&self, key: &BaselineKey) -> bool {
        self.0.contains_key(key)
    }

    fn set(&mut self, key: BaselineKey, value: T) -> Option<T> {
        self.0.insert(key, value)
    }
}

impl<T> FromIterator<(BaselineKey, T)> for VisContainer<T> {
    fn from_iter<I: IntoIterator<Item = (BaselineKey, T)>>(iter: I) -> Self {
        VisContainer(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for VisContainer<T> {
    type Item = (BaselineKey, T);
    type IntoIter = indexmap::map::IntoIter<BaselineKey, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<T> std::ops::Index<&BaselineKey> for VisContainer<T> {
    type Output = T;

    fn index(&self, key: &BaselineKey) -> &T {
        &self.0[key]
    }
}
