// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Fringe-rate filtering and time averaging of radio-interferometric visibility
waterfalls.

A "waterfall" is a (time, frequency) grid of complex visibilities for one
baseline and polarisation. This crate can:

- average waterfalls into coarser time bins, weighted by flags and sample
  counts and optionally rephased to the centre of each averaging window;
- turn a fringe-rate profile into an FIR kernel (and back);
- convolve FIR kernels against weighted waterfalls along an axis;
- estimate the effective integration time gained by fringe-rate filtering;
- drive all of the above over many baselines with [`FrFilter`].
 */

pub mod args;
pub mod averaging;
pub mod constants;
pub mod fir;
pub mod frf;
pub(crate) mod math;
pub mod rephase;
pub mod taper;
pub(crate) mod unit_parsing;
pub mod vis;

// Re-exports.
pub use args::{FrfArgs, FrfArgsError, FrfParams};
pub use averaging::{time_average_waterfall, AveragingError, TimeAverageArgs, TimeAveraged};
pub use fir::{
    convolve_fir, effective_integration_ratio, profile_to_kernel, FirConversion, FirError,
};
pub use frf::{
    filter_waterfall, AverageOptions, AverageWidth, AveragedVis, BatchReport, EdgeTaper,
    FilterOptions, FrFilter, FrFilterBuilder, FrfError,
};
pub use rephase::{BaselineVector, LstRephaser, Rephase};
pub use taper::{StandardTaper, Taper, TaperError, TaperKind};
pub use unit_parsing::UnitParseError;
pub use vis::{AntPair, BaselineKey, Pol, VisCollection, VisContainer, VisError, Waterfall};

use crossbeam_utils::atomic::AtomicCell;

/// Complex number of double precision floats.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;

/// Should progress bars be drawn? Off by default; callers driving `hyperfrf`
/// from an interactive terminal may turn them on.
pub static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty (e.g. a
/// terminal); piped output will be formatted sensibly. Source code lines are
/// displayed in log messages when verbosity >= 3.
pub fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.try_init()
}
