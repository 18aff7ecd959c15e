// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use indoc::indoc;

use super::*;
use hyperfrf::{AverageOptions, AverageWidth, AveragedVis, FrfArgs, VisCollection};

#[test]
fn test_average_whole_observation() {
    let frf = get_builder(0.0).with_default_capabilities().build().unwrap();
    let data = get_data();
    let mut avg = AveragedVis::default();
    let report = frf
        .time_average(
            &data,
            AverageWidth::Factor(NUM_TIMES),
            &AverageOptions::default(),
            &mut avg,
        )
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.processed, get_keys());

    assert_eq!(avg.timestamps.len(), 1);
    assert_eq!(avg.lsts.len(), 1);
    for key in get_keys() {
        let wf = &avg.waterfalls[&key];
        assert_eq!(wf.dim(), (1, NUM_FREQS));
        for &n in wf.nsamples.iter() {
            assert_abs_diff_eq!(n, NUM_TIMES as f64);
        }
        // Unflagged and unit weights; this is the mean.
        let mean = data[&key].data.mean_axis(Axis(0)).unwrap();
        for (a, b) in wf.data.iter().zip(mean.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_average_with_an_uneven_last_window_from_an_arg_file() {
    let file = make_arg_file(
        ".toml",
        indoc! {r#"
            time_average = "25"
            rephase = true
        "#},
    );
    let frf = get_builder(0.0).with_default_capabilities().build().unwrap();
    let params = FrfArgs::from_file(file.path())
        .unwrap()
        .parse(frf.time_resolution(), frf.num_timesteps())
        .unwrap();
    assert_eq!(params.time_average_factor, 25);

    let data = get_data();
    let mut avg = AveragedVis::default();
    let report = frf
        .time_average(
            &data,
            AverageWidth::Factor(params.time_average_factor),
            &params.average_options(),
            &mut avg,
        )
        .unwrap();
    assert!(report.is_success());
    assert_eq!(avg.navg, Some(25));
    assert_abs_diff_eq!(avg.t_avg.unwrap(), 25.0 * INT_TIME, epsilon = 1e-4);
    assert_eq!(avg.timestamps.len(), 3);
    for (_, wf) in avg.waterfalls.iter() {
        assert_eq!(wf.dim(), (3, NUM_FREQS));
        assert!(wf.nsamples.row(0).iter().all(|&n| n == 25.0));
        assert!(wf.nsamples.row(1).iter().all(|&n| n == 25.0));
        assert!(wf.nsamples.row(2).iter().all(|&n| n == 10.0));
    }

    // The same thing, asked for in seconds.
    let mut avg_s = AveragedVis::default();
    frf.time_average(
        &data,
        AverageWidth::Seconds(25.2 * INT_TIME),
        &params.average_options(),
        &mut avg_s,
    )
    .unwrap();
    assert_eq!(avg_s.navg, Some(25));
    assert_eq!(avg_s.waterfalls, avg.waterfalls);
}

#[test]
fn test_lst_shift_does_not_change_averages() {
    let shift = 1.52917804;
    let data = get_data();
    let options = AverageOptions {
        rephase: true,
        ..Default::default()
    };

    let mut results = vec![];
    for offset in [0.0, shift] {
        let frf = get_builder(offset)
            .with_default_capabilities()
            .build()
            .unwrap();
        let mut avg = AveragedVis::default();
        frf.time_average(&data, AverageWidth::Factor(7), &options, &mut avg)
            .unwrap();
        results.push(avg);
    }

    let (a, b) = (&results[0], &results[1]);
    for key in get_keys() {
        for (x, y) in a.waterfalls[&key]
            .data
            .iter()
            .zip(b.waterfalls[&key].data.iter())
        {
            assert_abs_diff_eq!(x.re, y.re, epsilon = 1e-9);
            assert_abs_diff_eq!(x.im, y.im, epsilon = 1e-9);
        }
    }
    let tau = std::f64::consts::TAU;
    for (x, y) in a.lsts.iter().zip(b.lsts.iter()) {
        assert!((0.0..tau).contains(x));
        assert!((0.0..tau).contains(y));
        let diff = (y - x - shift).rem_euclid(tau);
        assert!(diff.min(tau - diff) < 1e-9);
    }
}

#[test]
fn test_zeroed_nsamples_and_flags() {
    let frf = get_builder(0.0).with_default_capabilities().build().unwrap();
    let key = get_keys()[0];
    let mut wf = get_waterfall(0.3);
    // The first window has no samples, the second is entirely flagged.
    wf.nsamples.slice_mut(s![..10, ..]).fill(0.0);
    wf.flags.slice_mut(s![10..20, ..]).fill(true);
    let data: VisContainer<Waterfall> = [(key, wf)].into_iter().collect();

    let mut weighted = AveragedVis::default();
    frf.time_average(
        &data,
        AverageWidth::Factor(10),
        &AverageOptions::default(),
        &mut weighted,
    )
    .unwrap();
    let result = &weighted.waterfalls[&key];
    assert_eq!(result.dim(), (6, NUM_FREQS));
    assert!(result.data.row(0).iter().all(|v| v.re == 0.0 && v.im == 0.0));
    assert!(result.nsamples.row(0).iter().all(|&n| n == 0.0));
    assert!(result.flags.row(0).iter().all(|&f| !f));
    assert!(result.data.row(1).iter().all(|v| v.re == 0.0 && v.im == 0.0));
    assert!(result.nsamples.row(1).iter().all(|&n| n == 0.0));
    assert!(result.flags.row(1).iter().all(|&f| f));
    assert!(result.flags.slice(s![2.., ..]).iter().all(|&f| !f));

    let mut unweighted = AveragedVis::default();
    frf.time_average(
        &data,
        AverageWidth::Factor(10),
        &AverageOptions {
            weight_by_nsamples: false,
            ..Default::default()
        },
        &mut unweighted,
    )
    .unwrap();
    let result = &unweighted.waterfalls[&key];
    assert!(result.data.row(0).iter().all(|v| v.re > 1.0));
    assert!(result.nsamples.row(0).iter().all(|&n| n == 0.0));
    assert!(result.data.iter().all(|v| v.re.is_finite() && v.im.is_finite()));

    // Only one key, so the combined flags are its flags.
    assert_eq!(unweighted.flag_waterfall().unwrap(), result.flags);
}

#[test]
fn test_average_in_stages() {
    let frf = get_builder(0.0).with_default_capabilities().build().unwrap();
    let data = get_data();
    let keys = get_keys();
    let mut avg = AveragedVis::default();

    let options = AverageOptions {
        keys: Some(vec![keys[3], keys[1]]),
        ..Default::default()
    };
    frf.time_average(&data, AverageWidth::Factor(6), &options, &mut avg)
        .unwrap();
    let report = frf
        .time_average(&data, AverageWidth::Factor(6), &AverageOptions::default(), &mut avg)
        .unwrap();
    assert_eq!(report.processed, vec![keys[0], keys[2]]);
    assert_eq!(report.skipped, vec![keys[1], keys[3]]);
    assert_eq!(avg.waterfalls.keys(), vec![keys[3], keys[1], keys[0], keys[2]]);

    let mut all_at_once = AveragedVis::default();
    frf.time_average(
        &data,
        AverageWidth::Factor(6),
        &AverageOptions::default(),
        &mut all_at_once,
    )
    .unwrap();
    for key in keys {
        assert_eq!(avg.waterfalls[&key], all_at_once.waterfalls[&key]);
    }
}
