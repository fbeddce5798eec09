//! ISO 286 fit deviations.

/// Mean deviation (mm) per nominal size bracket `(min, max]`.
type FitTable = &'static [(f64, f64, f64)];

/// Hole basis H7.
const H7: FitTable = &[
    (0.0, 3.0, 0.005),
    (3.0, 6.0, 0.006),
    (6.0, 10.0, 0.0075),
    (10.0, 18.0, 0.009),
    (18.0, 30.0, 0.0105),
    (30.0, 50.0, 0.0125),
    (50.0, 80.0, 0.015),
];

/// Shaft g6.
const G6: FitTable = &[
    (0.0, 3.0, -0.004),
    (3.0, 6.0, -0.008),
    (6.0, 10.0, -0.009),
    (10.0, 18.0, -0.011),
    (18.0, 30.0, -0.013),
    (30.0, 50.0, -0.016),
];

fn table(code: &str) -> Option<FitTable> {
    match code {
        "H7" => Some(H7),
        "g6" => Some(G6),
        _ => None,
    }
}

/// Mean deviation and manufacturing note for a nominal size under a fit class.
///
/// Codes are case-sensitive (`H7` is a hole fit, `h7` a shaft fit). Unknown
/// codes and sizes outside every bracket give `(0.0, "")`.
pub fn apply_fit(nominal_mm: f64, fit_code: &str) -> (f64, String) {
    let delta = table(fit_code).and_then(|rows| {
        rows.iter()
            .find(|(min, max, _)| nominal_mm > *min && nominal_mm <= *max)
            .map(|(_, _, delta)| *delta)
    });

    match delta {
        Some(delta) => (
            delta,
            format!(
                "Modeled at {:.4}mm ({}mm {} mean)",
                nominal_mm + delta,
                nominal_mm,
                fit_code
            ),
        ),
        None => (0.0, String::new()),
    }
}

/// Whether a fit class has a deviation table.
pub fn is_known_fit(fit_code: &str) -> bool {
    table(fit_code).is_some()
}
