// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Time averaging and fringe-rate filtering of many waterfalls at once.

[FrFilter] holds the metadata shared by all waterfalls of an observation
(frequencies, timestamps, LSTs, baseline vectors) along with the collaborators
used to rephase and taper. Each waterfall is processed independently (and in
parallel); whether a key is skipped is decided before any work is dispatched,
and results are written to the caller's destination collection serially, in
key order.
 */

mod error;
mod filter;

pub use error::FrfError;
pub use filter::{filter_waterfall, EdgeTaper};

use hifitime::{Duration, Epoch};
use indexmap::IndexMap;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use log::{debug, info, warn};
use ndarray::{prelude::*, Zip};
use rayon::prelude::*;
use vec1::Vec1;

use crate::{
    averaging::{
        averaging_windows, navg_from_seconds, time_average_waterfall, AverageFactorError,
        TimeAverageArgs,
    },
    c64,
    constants::HERA_LAT_DEG,
    math::{average_epoch, mean, median, unwrap_angles, wrap_angle},
    rephase::{BaselineVector, LstRephaser, Rephase},
    taper::{StandardTaper, Taper},
    vis::{AntPair, BaselineKey, VisCollection, VisContainer, Waterfall},
    PROGRESS_BARS,
};

/// How wide time averaging windows should be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageWidth {
    /// The number of integrations in each window.
    Factor(usize),

    /// The duration of each window \[seconds\]. This is rounded to the nearest
    /// whole number of integrations.
    Seconds(f64),
}

/// Options for [FrFilter::time_average].
#[derive(Debug, Clone, PartialEq)]
pub struct AverageOptions {
    /// Weight the averages by sample counts as well as flags.
    pub weight_by_nsamples: bool,

    /// Rephase integrations to the centre LST of their averaging window.
    pub rephase: bool,

    /// Replace keys that are already in the destination.
    pub overwrite: bool,

    /// Stop at (and return) the first failure, writing nothing.
    pub fail_fast: bool,

    /// Only process these keys. If `None`, all keys of the input are processed.
    pub keys: Option<Vec<BaselineKey>>,
}

impl Default for AverageOptions {
    fn default() -> Self {
        AverageOptions {
            weight_by_nsamples: true,
            rephase: false,
            overwrite: false,
            fail_fast: false,
            keys: None,
        }
    }
}

/// Options for [FrFilter::filter].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub edge_taper: EdgeTaper,

    /// The axis to filter along; 0 is time.
    pub axis: Axis,

    /// Replace keys that are already in the destination.
    pub overwrite: bool,

    /// Stop at (and return) the first failure, writing nothing.
    pub fail_fast: bool,

    /// Only process these keys. If `None`, all keys of the input are processed.
    pub keys: Option<Vec<BaselineKey>>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions {
            edge_taper: EdgeTaper::default(),
            axis: Axis(0),
            overwrite: false,
            fail_fast: false,
            keys: None,
        }
    }
}

/// What happened to each key of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Keys whose results were written to the destination.
    pub processed: Vec<BaselineKey>,

    /// Keys that were already in the destination (and not overwritten).
    pub skipped: Vec<BaselineKey>,

    /// Keys that couldn't be processed, and why.
    pub failed: Vec<(BaselineKey, FrfError)>,
}

impl BatchReport {
    /// Did every key that wasn't skipped succeed?
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Time-averaged waterfalls. The timestamps and LSTs are shared by all
/// waterfalls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AveragedVis {
    pub waterfalls: VisContainer<Waterfall>,

    /// The average timestamp of each window.
    pub timestamps: Vec<Epoch>,

    /// The centre LST of each window \[radians\], wrapped into [0, 2π).
    pub lsts: Vec<f64>,

    /// The number of integrations in each window (except possibly the last).
    pub navg: Option<usize>,

    /// The width of each window \[seconds\]. `None` if the time resolution is
    /// unknown.
    pub t_avg: Option<f64>,
}

impl AveragedVis {
    /// Combine the flags of all waterfalls into one; a sample is flagged only
    /// if it is flagged in every waterfall. `None` if there are no waterfalls.
    pub fn flag_waterfall(&self) -> Option<Array2<bool>> {
        let mut flags = self.waterfalls.iter().map(|(_, wf)| &wf.flags);
        let first = flags.next()?.clone();
        Some(flags.fold(first, |mut acc, f| {
            Zip::from(&mut acc).and(f).for_each(|a, &b| *a &= b);
            acc
        }))
    }
}

/// Builds a [FrFilter]. The frequencies, timestamps and LSTs must be given, as
/// must a rephaser and a taper (see
/// [FrFilterBuilder::with_default_capabilities]).
#[derive(Default)]
pub struct FrFilterBuilder {
    freqs: Option<Vec<f64>>,
    timestamps: Option<Vec<Epoch>>,
    lsts: Option<Vec<f64>>,
    baselines: IndexMap<AntPair, BaselineVector>,
    latitude_rad: Option<f64>,
    rephaser: Option<Box<dyn Rephase>>,
    taper: Option<Box<dyn Taper>>,
}

impl FrFilterBuilder {
    pub fn new() -> FrFilterBuilder {
        FrFilterBuilder::default()
    }

    /// Channel frequencies \[Hz\].
    pub fn freqs(mut self, freqs: Vec<f64>) -> Self {
        self.freqs = Some(freqs);
        self
    }

    /// The timestamps of the integrations, in chronological order.
    pub fn timestamps(mut self, timestamps: Vec<Epoch>) -> Self {
        self.timestamps = Some(timestamps);
        self
    }

    /// The LST of each integration \[radians\].
    pub fn lsts(mut self, lsts: Vec<f64>) -> Self {
        self.lsts = Some(lsts);
        self
    }

    /// The ENU baseline vector of an antenna pair.
    pub fn baseline(mut self, ants: AntPair, baseline: BaselineVector) -> Self {
        self.baselines.insert(ants, baseline);
        self
    }

    pub fn baselines<I: IntoIterator<Item = (AntPair, BaselineVector)>>(mut self, iter: I) -> Self {
        self.baselines.extend(iter);
        self
    }

    /// The observatory latitude \[radians\]. Defaults to HERA's.
    pub fn latitude_rad(mut self, latitude_rad: f64) -> Self {
        self.latitude_rad = Some(latitude_rad);
        self
    }

    pub fn rephaser<R: Rephase + 'static>(mut self, rephaser: R) -> Self {
        self.rephaser = Some(Box::new(rephaser));
        self
    }

    pub fn taper<T: Taper + 'static>(mut self, taper: T) -> Self {
        self.taper = Some(Box::new(taper));
        self
    }

    /// Use [LstRephaser] and [StandardTaper] for any collaborators not already
    /// set.
    pub fn with_default_capabilities(mut self) -> Self {
        if self.rephaser.is_none() {
            self.rephaser = Some(Box::new(LstRephaser));
        }
        if self.taper.is_none() {
            self.taper = Some(Box::<StandardTaper>::default());
        }
        self
    }

    pub fn build(self) -> Result<FrFilter, FrfError> {
        let freqs = self.freqs.ok_or(FrfError::MissingMetadata("frequencies"))?;
        let timestamps = self
            .timestamps
            .ok_or(FrfError::MissingMetadata("timestamps"))
            .and_then(|t| Vec1::try_from_vec(t).map_err(|_| FrfError::MissingMetadata("timestamps")))?;
        let lsts = self.lsts.ok_or(FrfError::MissingMetadata("LSTs"))?;
        if lsts.len() != timestamps.len() {
            return Err(FrfError::MetadataLength {
                what: "LSTs",
                got: lsts.len(),
                expected: timestamps.len(),
            });
        }
        let rephaser = self.rephaser.ok_or(FrfError::MissingCapability("rephaser"))?;
        let taper = self.taper.ok_or(FrfError::MissingCapability("taper"))?;

        Ok(FrFilter {
            freqs,
            timestamps,
            lsts,
            baselines: self.baselines,
            latitude_rad: self.latitude_rad.unwrap_or_else(|| HERA_LAT_DEG.to_radians()),
            rephaser,
            taper,
        })
    }
}

/// Time averages and fringe-rate filters collections of waterfalls that share
/// the same metadata.
pub struct FrFilter {
    freqs: Vec<f64>,
    timestamps: Vec1<Epoch>,
    lsts: Vec<f64>,
    baselines: IndexMap<AntPair, BaselineVector>,
    latitude_rad: f64,
    rephaser: Box<dyn Rephase>,
    taper: Box<dyn Taper>,
}

impl FrFilter {
    pub fn builder() -> FrFilterBuilder {
        FrFilterBuilder::new()
    }

    pub fn freqs(&self) -> &[f64] {
        &self.freqs
    }

    pub fn timestamps(&self) -> &Vec1<Epoch> {
        &self.timestamps
    }

    pub fn lsts(&self) -> &[f64] {
        &self.lsts
    }

    pub fn latitude_rad(&self) -> f64 {
        self.latitude_rad
    }

    pub fn num_timesteps(&self) -> usize {
        self.timestamps.len()
    }

    pub fn baseline(&self, ants: AntPair) -> Option<BaselineVector> {
        self.baselines.get(&ants).copied()
    }

    /// The median absolute difference between consecutive timestamps. `None`
    /// if there's only one timestamp.
    pub fn time_resolution(&self) -> Option<Duration> {
        let diffs = self
            .timestamps
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| (b - a).to_seconds().abs())
            .collect::<Vec<_>>();
        median(&diffs).map(Duration::from_seconds)
    }

    /// Work out the averaging factor and the corresponding window width
    /// \[seconds\] for a requested width.
    fn resolve_average_width(
        &self,
        width: AverageWidth,
    ) -> Result<(usize, Option<f64>), FrfError> {
        let num_times = self.num_timesteps();
        let time_res = self.time_resolution();
        let navg = match (width, time_res) {
            (AverageWidth::Factor(0), _) => return Err(AverageFactorError::Zero.into()),
            (AverageWidth::Factor(navg), _) => navg,
            // A single timestep can only be "averaged" with itself.
            (AverageWidth::Seconds(_), None) => 1,
            (AverageWidth::Seconds(t_avg), Some(time_res)) => {
                navg_from_seconds(time_res, t_avg)?
            }
        };
        let navg = if navg > num_times {
            debug!("Clamping the time average factor ({navg}) to the number of timesteps ({num_times})");
            num_times
        } else {
            navg
        };

        let t_avg = time_res.map(|r| navg as f64 * r.to_seconds());
        if let (AverageWidth::Seconds(requested), Some(achieved)) = (width, t_avg) {
            if (requested - achieved).abs() > 1e-6 {
                warn!("The t_avg provided of {requested:.3}s has been shifted to {achieved:.3}s to make Navg = {navg}");
            }
        }
        Ok((navg, t_avg))
    }

    /// Time average every waterfall of `data` (or the subset in `options`) into
    /// `dest`. Keys already in `dest` are skipped unless overwriting. The
    /// timestamps, LSTs, averaging factor and averaging width of `dest` are
    /// replaced if anything was written.
    pub fn time_average(
        &self,
        data: &VisContainer<Waterfall>,
        width: AverageWidth,
        options: &AverageOptions,
        dest: &mut AveragedVis,
    ) -> Result<BatchReport, FrfError> {
        let (navg, t_avg) = self.resolve_average_width(width)?;
        let windows = averaging_windows(self.num_timesteps(), navg)?;
        let unwrapped_lsts = unwrap_angles(&self.lsts);
        let avg_lsts = windows
            .iter()
            .map(|w| wrap_angle(mean(&unwrapped_lsts[w.range.clone()])))
            .collect::<Vec<_>>();
        let avg_timestamps = windows
            .iter()
            .filter_map(|w| average_epoch(self.timestamps[w.range.clone()].iter().copied()))
            .collect::<Vec<_>>();

        let (to_process, skipped) =
            resolve_keys(data, options.keys.as_deref(), &dest.waterfalls, options.overwrite);
        info!(
            "Time averaging {} waterfalls with Navg = {navg} ({} skipped)",
            to_process.len(),
            skipped.len()
        );

        let expected_dim = (self.num_timesteps(), self.freqs.len());
        let results = process_keys(to_process, "Averaging", |key| {
            let waterfall = data.get(&key).ok_or(FrfError::MissingKey(key))?;
            if waterfall.dim() != expected_dim {
                return Err(FrfError::WaterfallShape {
                    key,
                    got: waterfall.dim(),
                    expected: expected_dim,
                });
            }
            let baseline = self.baseline(key.ants);
            if options.rephase && baseline.is_none() {
                return Err(FrfError::MissingBaseline {
                    key,
                    ants: key.ants,
                });
            }

            let args = TimeAverageArgs {
                flags: Some(waterfall.flags.view()),
                nsamples: Some(waterfall.nsamples.view()),
                weight_by_nsamples: options.weight_by_nsamples,
                rephase: options.rephase,
                // The averaged LSTs are shared by every key and computed above.
                lsts: options.rephase.then_some(self.lsts.as_slice()),
                freqs: Some(&self.freqs),
                baseline,
                latitude_rad: self.latitude_rad,
                extra_series: IndexMap::new(),
                rephaser: self.rephaser.as_ref(),
            };
            let averaged = time_average_waterfall(waterfall.data.view(), navg, &args)?;
            Ok(Waterfall {
                data: averaged.data,
                flags: averaged.flags,
                nsamples: averaged.nsamples,
            })
        });

        let report = commit(results, skipped, options.fail_fast, |key, waterfall| {
            dest.waterfalls.set(key, waterfall);
        })?;
        if !report.processed.is_empty() {
            if dest.navg.is_some_and(|old| old != navg) {
                warn!(
                    "The destination previously held waterfalls averaged with a different Navg; they are now inconsistent with the shared timestamps"
                );
            }
            dest.timestamps = avg_timestamps;
            dest.lsts = avg_lsts;
            dest.navg = Some(navg);
            dest.t_avg = t_avg;
        }
        Ok(report)
    }

    /// Fringe-rate filter every waterfall of `data` (or the subset in
    /// `options`) with its profile in `profiles`, writing into `dest`. Each
    /// profile must have the same shape as its waterfall. Keys already in
    /// `dest` are skipped unless overwriting.
    pub fn filter(
        &self,
        data: &VisContainer<Waterfall>,
        profiles: &VisContainer<Array2<c64>>,
        options: &FilterOptions,
        dest: &mut VisContainer<Waterfall>,
    ) -> Result<BatchReport, FrfError> {
        let (to_process, skipped) =
            resolve_keys(data, options.keys.as_deref(), &*dest, options.overwrite);
        info!(
            "Fringe-rate filtering {} waterfalls along axis {} ({} skipped)",
            to_process.len(),
            options.axis.index(),
            skipped.len()
        );

        let results = process_keys(to_process, "Filtering", |key| {
            let waterfall = data.get(&key).ok_or(FrfError::MissingKey(key))?;
            let profile = profiles.get(&key).ok_or(FrfError::MissingProfile(key))?;
            filter_waterfall(
                waterfall,
                profile.view(),
                self.taper.as_ref(),
                options.edge_taper,
                options.axis,
            )
        });

        commit(results, skipped, options.fail_fast, |key, waterfall| {
            dest.set(key, waterfall);
        })
    }
}

/// Split the requested keys (or all keys of `data`) into those to be processed
/// and those to be skipped because they're already in `dest`.
fn resolve_keys<T, U>(
    data: &impl VisCollection<T>,
    requested: Option<&[BaselineKey]>,
    dest: &impl VisCollection<U>,
    overwrite: bool,
) -> (Vec<BaselineKey>, Vec<BaselineKey>) {
    let keys = match requested {
        Some(keys) => keys.iter().copied().unique().collect(),
        None => data.keys(),
    };
    keys.into_iter().partition(|key| {
        let skip = !overwrite && dest.contains(key);
        if skip {
            debug!("{key} exists in the output and overwriting is disabled; skipping");
        }
        !skip
    })
}

/// Run `work` on every key in parallel. The results are in the same order as
/// the keys.
fn process_keys<T, F>(
    keys: Vec<BaselineKey>,
    message: &'static str,
    work: F,
) -> Vec<(BaselineKey, Result<T, FrfError>)>
where
    T: Send,
    F: Fn(BaselineKey) -> Result<T, FrfError> + Send + Sync,
{
    let style = ProgressStyle::default_bar()
        .template("{msg:12}: [{wide_bar:.blue}] {pos:3}/{len:3} waterfalls ({elapsed_precise}<{eta_precise})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    let pb = ProgressBar::with_draw_target(
        Some(keys.len() as _),
        if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        },
    )
    .with_style(style)
    .with_message(message);

    let results = keys
        .into_par_iter()
        .progress_with(pb.clone())
        .map(|key| (key, work(key)))
        .collect();
    pb.finish_with_message(format!("{message} done"));
    results
}

/// Write successful results in key order. With `fail_fast`, the first failure
/// is returned and nothing is written.
fn commit<T>(
    results: Vec<(BaselineKey, Result<T, FrfError>)>,
    skipped: Vec<BaselineKey>,
    fail_fast: bool,
    mut write: impl FnMut(BaselineKey, T),
) -> Result<BatchReport, FrfError> {
    let mut report = BatchReport {
        skipped,
        ..Default::default()
    };
    let mut successes = Vec::with_capacity(results.len());
    for (key, result) in results {
        match result {
            Ok(value) => successes.push((key, value)),
            Err(err) if fail_fast => {
                return Err(FrfError::KeyFailed {
                    key,
                    err: Box::new(err),
                })
            }
            Err(err) => {
                warn!("Failed to process {key}: {err}");
                report.failed.push((key, err));
            }
        }
    }

    for (key, value) in successes {
        write(key, value);
        report.processed.push(key);
    }
    Ok(report)
}
