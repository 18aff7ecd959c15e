// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Handling of fringe-rate filtering arguments.
//!
//! Strategy: Users give arguments ([FrfArgs]), possibly in a toml or json
//! file. Arguments are turned into parameters ([FrfParams]), which are what
//! [crate::FrFilter] uses. Using this paradigm, the code to handle arguments and
//! parameters (and associated errors) can be neatly split.

mod error;

pub use error::FrfArgsError;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use hifitime::Duration;
use itertools::Itertools;
use log::debug;
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    averaging::parse_time_average_factor,
    frf::{AverageOptions, EdgeTaper, FilterOptions, FrFilterBuilder},
    taper::{StandardTaper, TaperKind},
    PROGRESS_BARS,
};

#[derive(Debug, Display, EnumIter, EnumString)]
enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// Arguments for time averaging and fringe-rate filtering, as a user would
/// supply them. Nothing here has been checked; see [FrfArgs::parse].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrfArgs {
    /// The number of timesteps to average together. A time unit may be given
    /// (e.g. "30s"), in which case the closest whole number of timesteps is
    /// used. Default: 1 (no averaging).
    pub time_average: Option<String>,

    /// Don't weight time averages by sample counts; only flags are used.
    pub no_weight_by_nsamples: bool,

    /// Rephase integrations to the centre of their averaging window.
    pub rephase: bool,

    /// Replace results that already exist in the destination.
    pub overwrite: bool,

    /// Stop at the first baseline that can't be processed.
    pub fail_fast: bool,

    /// The taper applied along the filtered axis. Default: none.
    pub taper: Option<String>,

    /// The shape parameter of a Tukey taper.
    pub tukey_alpha: Option<f64>,

    /// The number of samples at the start of the filtered axis to zero.
    pub edgecut_low: Option<usize>,

    /// The number of samples at the end of the filtered axis to zero.
    pub edgecut_hi: Option<usize>,

    /// The axis to filter along; 0 is time, 1 is frequency. Default: 0.
    pub filter_axis: Option<usize>,

    /// The latitude of the observatory \[degrees\]. Default: HERA's.
    pub latitude: Option<f64>,

    /// Draw progress bars.
    pub progress_bars: bool,
}

impl FrfArgs {
    /// Read arguments from a toml or json file. The type is determined by the
    /// file extension.
    pub fn from_file<P: AsRef<Path>>(arg_file: P) -> Result<FrfArgs, FrfArgsError> {
        fn inner(arg_file: &Path) -> Result<FrfArgs, FrfArgsError> {
            debug!(
                "Attempting to parse argument file {} ...",
                arg_file.display()
            );

            let mut contents = String::new();
            let file_args_extension = arg_file
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .and_then(|e| ArgFileTypes::from_str(&e).ok());
            match file_args_extension {
                Some(ArgFileTypes::Toml) => {
                    debug!("Parsing toml file...");
                    let mut fh = File::open(arg_file)?;
                    fh.read_to_string(&mut contents)?;
                    toml::from_str(&contents).map_err(|e| FrfArgsError::TomlDecode {
                        file: arg_file.display().to_string(),
                        err: e.to_string(),
                    })
                }

                Some(ArgFileTypes::Json) => {
                    debug!("Parsing json file...");
                    let mut fh = File::open(arg_file)?;
                    fh.read_to_string(&mut contents)?;
                    serde_json::from_str(&contents).map_err(|e| FrfArgsError::JsonDecode {
                        file: arg_file.display().to_string(),
                        err: e.to_string(),
                    })
                }

                None => Err(FrfArgsError::UnrecognisedArgFileExt(
                    arg_file.display().to_string(),
                    ArgFileTypes::iter().join(", "),
                )),
            }
        }
        inner(arg_file.as_ref())
    }

    /// Consolidate two sets of arguments. Anything specified in `self` is
    /// preferred over `other`; flags are set if they're set in either.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub fn merge(self, other: FrfArgs) -> FrfArgs {
        // Ensure all of the other args are accounted for by pattern matching.
        let FrfArgs {
            time_average,
            no_weight_by_nsamples,
            rephase,
            overwrite,
            fail_fast,
            taper,
            tukey_alpha,
            edgecut_low,
            edgecut_hi,
            filter_axis,
            latitude,
            progress_bars,
        } = other;
        FrfArgs {
            time_average: self.time_average.or(time_average),
            no_weight_by_nsamples: self.no_weight_by_nsamples || no_weight_by_nsamples,
            rephase: self.rephase || rephase,
            overwrite: self.overwrite || overwrite,
            fail_fast: self.fail_fast || fail_fast,
            taper: self.taper.or(taper),
            tukey_alpha: self.tukey_alpha.or(tukey_alpha),
            edgecut_low: self.edgecut_low.or(edgecut_low),
            edgecut_hi: self.edgecut_hi.or(edgecut_hi),
            filter_axis: self.filter_axis.or(filter_axis),
            latitude: self.latitude.or(latitude),
            progress_bars: self.progress_bars || progress_bars,
        }
    }

    /// [FrfArgs::merge] with arguments read from a file.
    pub fn merge_file<P: AsRef<Path>>(self, arg_file: P) -> Result<FrfArgs, FrfArgsError> {
        Ok(self.merge(FrfArgs::from_file(arg_file)?))
    }

    /// Make sense of the arguments. The time resolution and number of
    /// timesteps of the data are needed to turn a time average into a factor.
    /// This also sets whether progress bars are drawn.
    pub fn parse(
        self,
        time_resolution: Option<Duration>,
        num_timesteps: usize,
    ) -> Result<FrfParams, FrfArgsError> {
        let FrfArgs {
            time_average,
            no_weight_by_nsamples,
            rephase,
            overwrite,
            fail_fast,
            taper,
            tukey_alpha,
            edgecut_low,
            edgecut_hi,
            filter_axis,
            latitude,
            progress_bars,
        } = self;

        let time_average_factor = parse_time_average_factor(
            time_resolution,
            time_average.as_deref(),
            num_timesteps,
            1,
        )?;
        debug!("Time average factor: {time_average_factor}");

        let taper_kind = match taper {
            None => TaperKind::default(),
            Some(t) => TaperKind::from_str(&t).map_err(|_| FrfArgsError::UnrecognisedTaper {
                got: t,
                valid: TaperKind::all_names(),
            })?,
        };
        let taper = match tukey_alpha {
            Some(alpha) => StandardTaper::new(alpha)?,
            None => StandardTaper::default(),
        };

        let axis = match filter_axis.unwrap_or(0) {
            a @ (0 | 1) => Axis(a),
            a => return Err(FrfArgsError::InvalidAxis(a)),
        };

        let latitude_rad = match latitude {
            Some(l) if !(-90.0..=90.0).contains(&l) => {
                return Err(FrfArgsError::InvalidLatitude(l))
            }
            Some(l) => Some(l.to_radians()),
            None => None,
        };

        PROGRESS_BARS.store(progress_bars);

        Ok(FrfParams {
            time_average_factor,
            weight_by_nsamples: !no_weight_by_nsamples,
            rephase,
            overwrite,
            fail_fast,
            edge_taper: EdgeTaper {
                kind: taper_kind,
                edgecut_low: edgecut_low.unwrap_or(0),
                edgecut_hi: edgecut_hi.unwrap_or(0),
            },
            taper,
            axis,
            latitude_rad,
        })
    }
}

/// Parameters for time averaging and fringe-rate filtering; the result of
/// [FrfArgs::parse].
#[derive(Debug, Clone, PartialEq)]
pub struct FrfParams {
    /// The number of timesteps in each averaging window.
    pub time_average_factor: usize,

    pub weight_by_nsamples: bool,
    pub rephase: bool,
    pub overwrite: bool,
    pub fail_fast: bool,
    pub edge_taper: EdgeTaper,
    pub taper: StandardTaper,

    /// The axis to filter along.
    pub axis: Axis,

    /// The latitude of the observatory \[radians\]. If `None`, the default of
    /// [crate::FrFilter] is used.
    pub latitude_rad: Option<f64>,
}

impl FrfParams {
    /// Give the latitude and taper to a [crate::FrFilter] builder.
    pub fn configure(&self, builder: FrFilterBuilder) -> FrFilterBuilder {
        let builder = builder.taper(self.taper);
        match self.latitude_rad {
            Some(l) => builder.latitude_rad(l),
            None => builder,
        }
    }

    /// Options for [crate::FrFilter::time_average].
    pub fn average_options(&self) -> AverageOptions {
        AverageOptions {
            weight_by_nsamples: self.weight_by_nsamples,
            rephase: self.rephase,
            overwrite: self.overwrite,
            fail_fast: self.fail_fast,
            keys: None,
        }
    }

    /// Options for [crate::FrFilter::filter].
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            edge_taper: self.edge_taper,
            axis: self.axis,
            overwrite: self.overwrite,
            fail_fast: self.fail_fast,
            keys: None,
        }
    }
}
