// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `hyperfrf` should do as many
calculations as possible in double precision before converting to a lower
precision, if it is ever required.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Sums of weights are clipped to be at least this value before being used as
/// a divisor. A fully-flagged averaging window (or lane of a filter) therefore
/// produces zeros rather than NaNs.
pub const WEIGHT_FLOOR: f64 = 1e-10;

/// Weights with an absolute value at or below this are considered to be zero
/// when flagging fringe-rate-filtered output.
pub const ZERO_WEIGHT_TOLERANCE: f64 = 1e-8;

/// Speed of light \[metres/second\].
pub const VEL_C: f64 = 299_792_458.0;

/// HERA latitude \[degrees\].
pub const HERA_LAT_DEG: f64 = -30.72152;

/// The fractional part of `Ntimes / Navg` must be bigger than this for the
/// last averaging window to be considered partial.
pub const PARTIAL_WINDOW_TOLERANCE: f64 = 1e-10;

/// The default shape parameter of a Tukey taper.
pub const DEFAULT_TUKEY_ALPHA: f64 = 0.5;
