// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Time averaging of visibility waterfalls.

mod error;

pub use error::{AverageFactorError, AveragingError};

use std::ops::Range;

use hifitime::Duration;
use indexmap::IndexMap;
use log::{debug, warn};
use ndarray::{prelude::*, CowArray, Zip};

use crate::{
    c64,
    constants::{HERA_LAT_DEG, PARTIAL_WINDOW_TOLERANCE, WEIGHT_FLOOR},
    math::{mean, unwrap_angles, wrap_angle},
    rephase::{BaselineVector, LstRephaser, Rephase},
    unit_parsing::parse_time,
    vis::check_shape,
};

/// A contiguous run of time indices that are averaged together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AveragingWindow {
    /// The index of the averaged output row.
    pub index: usize,

    /// The input time indices that comprise this window. All windows have
    /// `navg` indices, except possibly the last, which may have fewer.
    pub range: Range<usize>,
}

/// Partition `num_times` time indices into `ceil(num_times / navg)` contiguous
/// windows.
///
/// e.g. 10 timesteps with `navg` = 3:
///
/// [[0, 1, 2], [3, 4, 5], [6, 7, 8], [9]]
pub fn averaging_windows(
    num_times: usize,
    navg: usize,
) -> Result<Vec<AveragingWindow>, AveragingError> {
    if navg == 0 || navg > num_times {
        return Err(AveragingError::InvalidNavg { navg, num_times });
    }

    Ok((0..num_times)
        .step_by(navg)
        .enumerate()
        .map(|(index, start)| AveragingWindow {
            index,
            range: start..(start + navg).min(num_times),
        })
        .collect())
}

/// Optional inputs to [time_average_waterfall]. The defaults are: no flags,
/// sample counts of 1, weight by sample counts, no rephasing, no LSTs and HERA's
/// latitude.
pub struct TimeAverageArgs<'a> {
    /// Flags with the same shape as the data; `true` is flagged.
    pub flags: Option<ArrayView2<'a, bool>>,

    /// Sample counts with the same shape as the data.
    pub nsamples: Option<ArrayView2<'a, f64>>,

    /// If `true`, the average is weighted by sample counts as well as flags.
    /// Output sample counts are unaffected by this.
    pub weight_by_nsamples: bool,

    /// Rephase each integration to the centre of its averaging window before
    /// averaging. Requires `lsts`, `freqs` and `baseline`.
    pub rephase: bool,

    /// The LST of each integration \[radians\]. If supplied, the averaged
    /// (wrapped) LSTs are returned.
    pub lsts: Option<&'a [f64]>,

    /// The frequency of each channel \[Hz\].
    pub freqs: Option<&'a [f64]>,

    /// The baseline vector of the waterfall.
    pub baseline: Option<BaselineVector>,

    /// Observatory latitude \[radians\].
    pub latitude_rad: f64,

    /// Any other series with one value per integration (e.g. timestamps).
    /// These are averaged without weights.
    pub extra_series: IndexMap<String, &'a [f64]>,

    /// What does the rephasing.
    pub rephaser: &'a dyn Rephase,
}

impl Default for TimeAverageArgs<'_> {
    fn default() -> Self {
        TimeAverageArgs {
            flags: None,
            nsamples: None,
            weight_by_nsamples: true,
            rephase: false,
            lsts: None,
            freqs: None,
            baseline: None,
            latitude_rad: HERA_LAT_DEG.to_radians(),
            extra_series: IndexMap::new(),
            rephaser: &LstRephaser,
        }
    }
}

/// The result of [time_average_waterfall]. Every array has one row per
/// averaging window.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAveraged {
    /// The weighted average of each window.
    pub data: Array2<c64>,

    /// A window is flagged only if all of its input samples are flagged.
    pub flags: Array2<bool>,

    /// The sum of the unflagged input sample counts of each window.
    pub nsamples: Array2<f64>,

    /// The centre LST of each window, wrapped into [0, 2π). `None` if no LSTs
    /// were supplied.
    pub lsts: Option<Vec<f64>>,

    /// The averages of the extra series, keyed by the same names.
    pub extra_series: IndexMap<String, Vec<f64>>,
}

/// If the last averaging window has fewer than `navg` integrations, the
/// warning to give about it.
pub(crate) fn partial_window_advisory(num_times: usize, navg: usize) -> Option<String> {
    ((num_times as f64 / navg as f64).fract() > PARTIAL_WINDOW_TOLERANCE).then(|| {
        format!("The number of timesteps ({num_times}) is not evenly divisible by the averaging factor ({navg}); the last averaged timestep will be noisier than the others")
    })
}

/// Average a waterfall of shape `(num_times, num_freqs)` along time in windows
/// of `navg` integrations. For each window and channel:
///
/// avg = sum(data * w) / max(sum(w), 1e-10)
///
/// where `w` is 1 for unflagged samples (0 for flagged) multiplied by the
/// sample count when weighting by sample counts. The output sample count is
/// sum(nsamples * (1 - flags)), regardless of the weighting.
pub fn time_average_waterfall(
    data: ArrayView2<c64>,
    navg: usize,
    args: &TimeAverageArgs,
) -> Result<TimeAveraged, AveragingError> {
    let (num_times, num_freqs) = data.dim();
    let windows = averaging_windows(num_times, navg)?;

    // Validate everything before doing any work.
    let flags: CowArray<bool, Ix2> = match args.flags {
        Some(f) => {
            check_shape("flags", f.dim(), data.dim())?;
            f.into()
        }
        None => Array2::from_elem(data.raw_dim(), false).into(),
    };
    let nsamples: CowArray<f64, Ix2> = match args.nsamples {
        Some(n) => {
            check_shape("nsamples", n.dim(), data.dim())?;
            n.into()
        }
        None => Array2::ones(data.raw_dim()).into(),
    };
    if let Some(lsts) = args.lsts {
        check_len("lsts", lsts.len(), num_times)?;
    }
    if let Some(freqs) = args.freqs {
        check_len("freqs", freqs.len(), num_freqs)?;
    }
    for series in args.extra_series.values() {
        check_len("extra series", series.len(), num_times)?;
    }
    let rephase_params = if args.rephase {
        match (args.lsts, args.freqs, args.baseline) {
            (Some(_), Some(freqs), Some(baseline)) => Some((freqs, baseline)),
            (lsts, freqs, baseline) => {
                let missing = [
                    ("lsts", lsts.is_none()),
                    ("freqs", freqs.is_none()),
                    ("baseline vector", baseline.is_none()),
                ]
                .into_iter()
                .filter(|(_, m)| *m)
                .map(|(name, _)| name)
                .collect::<Vec<_>>()
                .join(", ");
                return Err(AveragingError::RephaseMissingInputs { missing });
            }
        }
    } else {
        None
    };

    // Unwrap the LSTs so that a window spanning 2π -> 0 is averaged correctly.
    let lsts = args.lsts.map(unwrap_angles);

    let num_windows = windows.len();
    if let Some(advisory) = partial_window_advisory(num_times, navg) {
        warn!("{advisory}");
    }
    debug!("Averaging {num_times} timesteps into {num_windows} windows of (up to) {navg}");

    let mut avg_data = Array2::zeros((num_windows, num_freqs));
    let mut avg_flags = Array2::from_elem((num_windows, num_freqs), false);
    let mut avg_nsamples = Array2::zeros((num_windows, num_freqs));
    let mut avg_lsts = lsts.as_ref().map(|_| Vec::with_capacity(num_windows));
    let mut avg_extra_series: IndexMap<String, Vec<f64>> = args
        .extra_series
        .keys()
        .map(|name| (name.clone(), Vec::with_capacity(num_windows)))
        .collect();

    for window in &windows {
        let range = window.range.clone();
        let window_data = data.slice(s![range.clone(), ..]);

        let window_data: CowArray<c64, Ix2> = match lsts.as_ref() {
            Some(lsts) => {
                let window_lsts = &lsts[range.clone()];
                let centre_lst = mean(window_lsts);
                if let Some(avg_lsts) = avg_lsts.as_mut() {
                    avg_lsts.push(wrap_angle(centre_lst));
                }

                match rephase_params {
                    Some((freqs, baseline)) => {
                        let dlsts = window_lsts
                            .iter()
                            .map(|lst| centre_lst - lst)
                            .collect::<Vec<_>>();
                        args.rephaser
                            .rephase(window_data, baseline, freqs, &dlsts, args.latitude_rad)
                            .into()
                    }
                    None => window_data.into(),
                }
            }
            None => window_data.into(),
        };

        Zip::from(avg_data.row_mut(window.index))
            .and(avg_flags.row_mut(window.index))
            .and(avg_nsamples.row_mut(window.index))
            .and(window_data.columns())
            .and(flags.slice(s![range.clone(), ..]).columns())
            .and(nsamples.slice(s![range.clone(), ..]).columns())
            .for_each(|avg_vis, avg_flag, avg_nsample, vis_t, flags_t, nsamples_t| {
                let mut weighted_sum = c64::default();
                let mut weight_sum = 0.0;
                let mut nsample_sum = 0.0;
                let mut all_flagged = true;
                vis_t
                    .iter()
                    .zip(flags_t.iter())
                    .zip(nsamples_t.iter())
                    .for_each(|((&vis, &flag), &nsample)| {
                        let flag_weight = if flag { 0.0 } else { 1.0 };
                        let weight = if args.weight_by_nsamples {
                            flag_weight * nsample
                        } else {
                            flag_weight
                        };
                        weighted_sum += vis * weight;
                        weight_sum += weight;
                        nsample_sum += nsample * flag_weight;
                        all_flagged &= flag;
                    });
                *avg_vis = weighted_sum / weight_sum.max(WEIGHT_FLOOR);
                *avg_flag = all_flagged;
                *avg_nsample = nsample_sum;
            });

        for (name, series) in &args.extra_series {
            if let Some(avg_series) = avg_extra_series.get_mut(name) {
                avg_series.push(mean(&series[range.clone()]));
            }
        }
    }

    Ok(TimeAveraged {
        data: avg_data,
        flags: avg_flags,
        nsamples: avg_nsamples,
        lsts: avg_lsts,
        extra_series: avg_extra_series,
    })
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<(), AveragingError> {
    if got == expected {
        Ok(())
    } else {
        Err(AveragingError::LengthMismatch {
            what,
            got,
            expected,
        })
    }
}

/// Determine a time average factor given a time resolution and user input. Use
/// the default if the user didn't supply anything.
///
/// A bare number is an averaging factor and must be an integer. A number with a
/// time unit (e.g. "35s") is converted into a factor by dividing by the time
/// resolution and rounding to the nearest integer. In both cases, factors larger
/// than the number of timesteps are clamped.
pub fn parse_time_average_factor(
    time_resolution: Option<Duration>,
    user_input_time_factor: Option<&str>,
    num_timesteps: usize,
    default: usize,
) -> Result<usize, AverageFactorError> {
    let factor = match (time_resolution, user_input_time_factor.map(parse_time)) {
        (None, _) => {
            // If the time resolution is unknown, we assume it's because there's
            // only one timestep.
            return Ok(1);
        }

        (_, None) => default,

        // propagate any errors encountered during parsing.
        (_, Some(Err(e))) => return Err(AverageFactorError::Parse(e)),

        // User input is OK but has no unit.
        (_, Some(Ok((factor, None)))) => {
            // Zero is not allowed.
            if factor < f64::EPSILON {
                return Err(AverageFactorError::Zero);
            }
            // Reject non-integer floats.
            if (factor - factor.round()).abs() > 1e-6 {
                return Err(AverageFactorError::NotInteger);
            }

            factor.round() as _
        }

        // User input is OK and has a unit.
        (Some(time_res), Some(Ok((quantity, Some(time_format))))) => {
            let t_avg = time_format.to_seconds(quantity);
            navg_from_seconds(time_res, t_avg)?
        }
    };

    if factor > num_timesteps {
        debug!("Clamping the time average factor ({factor}) to the number of timesteps ({num_timesteps})");
        Ok(num_timesteps.max(1))
    } else {
        Ok(factor)
    }
}

/// Convert a time-averaging width \[seconds\] into an averaging factor, rounding
/// to the nearest integer. A rounded factor of zero is an error.
pub fn navg_from_seconds(time_res: Duration, t_avg: f64) -> Result<usize, AverageFactorError> {
    let time_res = time_res.to_seconds();
    let factor = (t_avg / time_res).round();
    if !factor.is_finite() || factor < 1.0 {
        return Err(AverageFactorError::TooSmall { t_avg, time_res });
    }
    Ok(factor as usize)
}
