// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use indoc::indoc;

use super::*;
use hyperfrf::{
    effective_integration_ratio, profile_to_kernel, FilterOptions, FrfArgs, FrfError,
    VisCollection,
};

/// A fringe-rate profile that only passes fringe rates within `half_width` bins
/// of zero, in every channel.
fn low_pass_profile(half_width: usize) -> Array2<c64> {
    Array2::from_shape_fn((NUM_TIMES, NUM_FREQS), |(i, _)| {
        if i.abs_diff(NUM_TIMES / 2) <= half_width {
            c64::new(1.0, 0.0)
        } else {
            c64::default()
        }
    })
}

#[test]
fn test_zero_fringe_rate_filter_keeps_only_the_mean() {
    let frf = get_builder(0.0).with_default_capabilities().build().unwrap();
    let key = get_keys()[0];
    // A constant plus something that wraps around exactly 3 times in the
    // observation.
    let wf = Waterfall::new(Array2::from_shape_fn((NUM_TIMES, NUM_FREQS), |(t, f)| {
        let phase = std::f64::consts::TAU * 3.0 * t as f64 / NUM_TIMES as f64;
        c64::new(2.0 + 0.01 * f as f64, 0.0) + c64::from_polar(0.5, phase)
    }));
    let data: VisContainer<Waterfall> = [(key, wf)].into_iter().collect();
    let profiles: VisContainer<Array2<c64>> = [(key, low_pass_profile(0))].into_iter().collect();

    let mut filtered = VisContainer::new();
    let report = frf
        .filter(&data, &profiles, &FilterOptions::default(), &mut filtered)
        .unwrap();
    assert!(report.is_success());

    let result = &filtered[&key];
    // The middle row is where the (flat) kernel spans the whole observation.
    for (f, v) in result.data.row(NUM_TIMES / 2).iter().enumerate() {
        assert_abs_diff_eq!(v.re, 2.0 + 0.01 * f as f64, epsilon = 1e-10);
        assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-10);
    }
    // Passing one fringe rate bin of 60 is like integrating 60 times longer.
    for &n in result.nsamples.iter() {
        assert_abs_diff_eq!(n, NUM_TIMES as f64, epsilon = 1e-9);
    }
    assert!(result.flags.iter().all(|&f| !f));
}

#[test]
fn test_effective_integration_of_a_top_hat() {
    let profile = low_pass_profile(5);
    let ratio = effective_integration_ratio(profile.view(), None, Axis(0)).unwrap();
    assert_eq!(ratio.dim(), (1, NUM_FREQS));
    for &r in ratio.iter() {
        assert_abs_diff_eq!(r, NUM_TIMES as f64 / 11.0, epsilon = 1e-12);
    }

    // The kernel converts back into the profile.
    let kernel = profile_to_kernel(profile.view(), Some(INT_TIME), Axis(0), false).unwrap();
    let fr_bins = kernel.bins.unwrap();
    assert_abs_diff_eq!(fr_bins[NUM_TIMES / 2], 0.0);
    let undone = profile_to_kernel(kernel.values.view(), None, Axis(0), true).unwrap();
    for (a, b) in undone.values.iter().zip(profile.iter()) {
        assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
        assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
    }
}

#[test]
fn test_filter_from_an_arg_file() {
    let file = make_arg_file(
        ".json",
        indoc! {r#"
            {
                "taper": "tukey",
                "tukey_alpha": 0.5,
                "edgecut_low": 4,
                "edgecut_hi": 6
            }
        "#},
    );
    let params = FrfArgs::from_file(file.path())
        .unwrap()
        .parse(None, NUM_TIMES)
        .unwrap();
    let frf = params
        .configure(get_builder(0.0))
        .with_default_capabilities()
        .build()
        .unwrap();

    let data = get_data();
    let keys = get_keys();
    let mut profiles: VisContainer<Array2<c64>> = keys
        .iter()
        .map(|&key| (key, low_pass_profile(8)))
        .collect();
    // One key's profile is the wrong shape.
    profiles.set(keys[2], Array2::zeros((NUM_TIMES - 1, NUM_FREQS)));

    let mut filtered = VisContainer::new();
    let report = frf
        .filter(&data, &profiles, &params.filter_options(), &mut filtered)
        .unwrap();
    assert_eq!(report.processed, vec![keys[0], keys[1], keys[3]]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, keys[2]);
    assert!(matches!(report.failed[0].1, FrfError::ProfileShape { .. }));
    assert!(!filtered.contains(&keys[2]));

    for key in report.processed {
        let result = &filtered[&key];
        assert_eq!(result.dim(), (NUM_TIMES, NUM_FREQS));
        for (i_time, row) in result.flags.outer_iter().enumerate() {
            // The edge cuts, plus the zeros at each end of the Tukey window.
            let flagged = i_time <= 4 || i_time >= NUM_TIMES - 7;
            assert!(row.iter().all(|&f| f == flagged), "row {i_time}");
        }
        assert!(result
            .data
            .iter()
            .all(|v| v.re.is_finite() && v.im.is_finite()));
        // The sample counts are constant along time.
        for col in result.nsamples.columns() {
            assert!(col.iter().all(|&n| n == col[0]));
            assert!(col[0] > 0.0);
        }
    }
}

#[test]
fn test_many_keys_are_written_in_order() {
    let frf = get_builder(0.0).with_default_capabilities().build().unwrap();
    let keys = (0..40)
        .map(|i| BaselineKey::new(i, i + 1, if i % 2 == 0 { Pol::XX } else { Pol::YY }))
        .collect::<Vec<_>>();
    let data: VisContainer<Waterfall> = keys
        .iter()
        .enumerate()
        .map(|(i, &key)| (key, get_waterfall(0.01 * i as f64)))
        .collect();
    let profiles: VisContainer<Array2<c64>> = keys
        .iter()
        .map(|&key| (key, low_pass_profile(3)))
        .collect();

    let mut filtered = VisContainer::new();
    let report = frf
        .filter(&data, &profiles, &FilterOptions::default(), &mut filtered)
        .unwrap();
    assert_eq!(report.processed, keys);
    assert_eq!(filtered.keys(), keys);
}
