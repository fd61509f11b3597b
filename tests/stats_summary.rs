use wbi_dash::stats::{latest_change, linear_fit, summarize};
use wbi_dash::{DataPoint, Series, SeriesKey};

fn series(vals: &[(u32, f64)]) -> Series {
    Series::new(
        SeriesKey::new("IN", "FS.AST.PRVT.GD.ZS"),
        vals.iter().map(|&(y, v)| DataPoint::new(y, v)),
    )
}

#[test]
fn summary_handles_median_even_odd() {
    // [1,2,3,4] -> median = (2+3)/2 = 2.5
    let even = summarize(&series(&[(2018, 1.0), (2019, 2.0), (2020, 3.0), (2021, 4.0)]));
    assert_eq!(even.count, 4);
    assert_eq!(even.min, Some(1.0));
    assert_eq!(even.max, Some(4.0));
    assert!((even.mean.unwrap() - 2.5).abs() < 1e-9);
    assert!((even.median.unwrap() - 2.5).abs() < 1e-9);
    assert_eq!(even.key.indicator, "FS.AST.PRVT.GD.ZS");

    // [30,10,20] -> median 20
    let odd = summarize(&series(&[(2018, 30.0), (2019, 10.0), (2020, 20.0)]));
    assert_eq!(odd.median, Some(20.0));
    assert_eq!(odd.mean, Some(20.0));
}

#[test]
fn summary_of_empty_series_is_all_none() {
    let s = summarize(&Series::empty(SeriesKey::new("IN", "X")));
    assert_eq!(s.count, 0);
    assert!(s.min.is_none() && s.max.is_none() && s.mean.is_none() && s.median.is_none());
}

#[test]
fn latest_change_uses_last_two_observations() {
    let l = latest_change(&series(&[(2019, 50.0), (2020, 55.5), (2022, 53.0)])).unwrap();
    assert_eq!(l.year, 2022);
    assert_eq!(l.value, 53.0);
    assert!((l.delta.unwrap() + 2.5).abs() < 1e-9);

    let single = latest_change(&series(&[(2020, 1.0)])).unwrap();
    assert_eq!(single.delta, None);

    assert!(latest_change(&Series::empty(SeriesKey::new("IN", "X"))).is_none());
}

#[test]
fn linear_fit_recovers_exact_line() {
    let pairs = [(1.0, 3.0), (2.0, 5.0), (3.0, 7.0), (4.0, 9.0)];
    let fit = linear_fit(&pairs).unwrap();
    assert!((fit.slope - 2.0).abs() < 1e-9);
    assert!((fit.intercept - 1.0).abs() < 1e-9);
    assert!((fit.r_squared - 1.0).abs() < 1e-9);
    assert_eq!(fit.n, 4);
    assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);
}

#[test]
fn linear_fit_needs_spread_in_x() {
    assert!(linear_fit(&[(1.0, 2.0)]).is_none());
    assert!(linear_fit(&[(1.0, 2.0), (1.0, 3.0)]).is_none());
}
