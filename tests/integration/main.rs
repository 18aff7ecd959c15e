// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod averaging;
mod filtering;

use std::io::Write;

use hifitime::Epoch;
use ndarray::prelude::*;
use tempfile::{Builder, NamedTempFile};

use hyperfrf::{
    c64, AntPair, BaselineKey, BaselineVector, FrFilter, FrFilterBuilder, Pol, VisContainer,
    Waterfall,
};

const NUM_TIMES: usize = 60;
const NUM_FREQS: usize = 64;
/// \[seconds\]
const INT_TIME: f64 = 10.737418;

fn make_arg_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn get_keys() -> Vec<BaselineKey> {
    vec![
        BaselineKey::new(24, 25, Pol::EE),
        BaselineKey::new(24, 25, Pol::NN),
        BaselineKey::new(37, 38, Pol::EE),
        BaselineKey::new(24, 38, Pol::EE),
    ]
}

fn get_freqs() -> Vec<f64> {
    (0..NUM_FREQS).map(|i| 120e6 + 97.65625e3 * i as f64).collect()
}

fn get_timestamps() -> Vec<Epoch> {
    (0..NUM_TIMES)
        .map(|i| Epoch::from_gpst_seconds(1192201224.0 + INT_TIME * i as f64))
        .collect()
}

/// LSTs that cross 2π part way through the observation.
fn get_lsts(offset: f64) -> Vec<f64> {
    let lst_rate = INT_TIME * std::f64::consts::TAU / 86164.0905;
    (0..NUM_TIMES)
        .map(|i| (6.25 + offset + lst_rate * i as f64).rem_euclid(std::f64::consts::TAU))
        .collect()
}

/// A waterfall with something varying in both time and frequency.
fn get_waterfall(seed: f64) -> Waterfall {
    Waterfall::new(Array2::from_shape_fn((NUM_TIMES, NUM_FREQS), |(t, f)| {
        let (t, f) = (t as f64, f as f64);
        c64::new(
            3.0 + (seed * t).sin() * (0.1 * f).cos(),
            (0.02 * t * f + seed).sin(),
        )
    }))
}

fn get_data() -> VisContainer<Waterfall> {
    get_keys()
        .into_iter()
        .enumerate()
        .map(|(i, key)| (key, get_waterfall(0.05 + 0.1 * i as f64)))
        .collect()
}

fn get_builder(lst_offset: f64) -> FrFilterBuilder {
    FrFilter::builder()
        .freqs(get_freqs())
        .timestamps(get_timestamps())
        .lsts(get_lsts(lst_offset))
        .baselines([
            (AntPair(24, 25), BaselineVector::new(14.6, 0.0, 0.0)),
            (AntPair(37, 38), BaselineVector::new(14.6, 0.0, 0.0)),
            (AntPair(24, 38), BaselineVector::new(-7.3, 12.64, 0.02)),
        ])
}
