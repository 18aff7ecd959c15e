// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_parse_taper_kinds() {
    for (s, expected) in [
        ("none", TaperKind::None),
        ("boxcar", TaperKind::None),
        ("TopHat", TaperKind::None),
        ("hann", TaperKind::Hann),
        ("Blackman", TaperKind::Blackman),
        ("blackmanharris", TaperKind::BlackmanHarris),
        ("TUKEY", TaperKind::Tukey),
    ] {
        assert_eq!(s.parse::<TaperKind>(), Ok(expected));
    }
    assert!("gaussian".parse::<TaperKind>().is_err());

    assert_eq!(TaperKind::None.to_string(), "none");
    assert_eq!(TaperKind::BlackmanHarris.to_string(), "blackmanharris");
    assert_eq!(
        TaperKind::all_names(),
        "none, hann, blackman, blackmanharris, tukey"
    );
}

#[test]
fn test_boxcar_with_edgecuts() {
    let window = StandardTaper::default()
        .window(TaperKind::None, 8, 2, 1)
        .unwrap();
    assert_eq!(window, vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0]);

    let window = StandardTaper::default()
        .window(TaperKind::None, 4, 0, 0)
        .unwrap();
    assert_eq!(window, vec![1.0; 4]);
}

#[test]
fn test_hann() {
    let window = StandardTaper::default()
        .window(TaperKind::Hann, 5, 0, 0)
        .unwrap();
    for (w, e) in window.iter().zip([0.0, 0.5, 1.0, 0.5, 0.0]) {
        assert_abs_diff_eq!(*w, e, epsilon = 1e-15);
    }
}

#[test]
fn test_blackman_family_is_symmetric_and_peaks_in_the_middle() {
    for kind in [TaperKind::Blackman, TaperKind::BlackmanHarris] {
        let window = StandardTaper::default().window(kind, 11, 0, 0).unwrap();
        for i in 0..11 {
            assert_abs_diff_eq!(window[i], window[10 - i], epsilon = 1e-15);
            assert!((-1e-15..=1.0 + 1e-15).contains(&window[i]));
        }
        assert_abs_diff_eq!(window[5], 1.0, epsilon = 1e-12);
    }

    // Blackman values from scipy.signal.windows.blackman(5).
    let window = StandardTaper::default()
        .window(TaperKind::Blackman, 5, 0, 0)
        .unwrap();
    for (w, e) in window.iter().zip([0.0, 0.34, 1.0, 0.34, 0.0]) {
        assert_abs_diff_eq!(*w, e, epsilon = 1e-15);
    }
}

#[test]
fn test_tukey() {
    // scipy.signal.windows.tukey(10, 0.5)
    let expected = [
        0.0,
        0.41317591,
        0.96984631,
        1.0,
        1.0,
        1.0,
        1.0,
        0.96984631,
        0.41317591,
        0.0,
    ];
    let window = StandardTaper::default()
        .window(TaperKind::Tukey, 10, 0, 0)
        .unwrap();
    for (w, e) in window.iter().zip(expected) {
        assert_abs_diff_eq!(*w, e, epsilon = 1e-8);
    }

    // Extreme alphas.
    let boxcar = StandardTaper::new(0.0)
        .unwrap()
        .window(TaperKind::Tukey, 6, 0, 0)
        .unwrap();
    assert_eq!(boxcar, vec![1.0; 6]);
    let tukey = StandardTaper::new(1.0)
        .unwrap()
        .window(TaperKind::Tukey, 7, 1, 1)
        .unwrap();
    let hann = StandardTaper::default()
        .window(TaperKind::Hann, 7, 1, 1)
        .unwrap();
    assert_eq!(tukey, hann);

    assert_eq!(StandardTaper::new(1.5), Err(TaperError::InvalidTukeyAlpha(1.5)));
}

#[test]
fn test_single_sample_window() {
    for kind in TaperKind::iter() {
        let window = StandardTaper::default().window(kind, 3, 1, 1).unwrap();
        assert_eq!(window, vec![0.0, 1.0, 0.0]);
    }
}

#[test]
fn test_edgecuts_too_big() {
    let taper = StandardTaper::default();
    assert_eq!(
        taper.window(TaperKind::Hann, 4, 2, 2),
        Err(TaperError::EdgecutsTooBig {
            low: 2,
            hi: 2,
            length: 4
        })
    );
    assert!(taper.window(TaperKind::None, 4, 5, 0).is_err());
    assert!(taper.window(TaperKind::None, 0, 0, 0).is_err());
}
