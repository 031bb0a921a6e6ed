// Financial helpers used by the dashboards: percentages, margins, ROI and rounding.
// Every ratio returns 0 when its denominator is not positive.

pub struct Calculator;

impl Calculator {
    /// Share of `value` in `total`, as a percentage.
    pub fn percentage(value: f64, total: f64) -> f64 {
        if total > 0.0 {
            value / total * 100.0
        } else {
            0.0
        }
    }

    /// Gross margin over revenue, as a percentage.
    pub fn margin(revenue: f64, cost: f64) -> f64 {
        if revenue > 0.0 {
            (revenue - cost) / revenue * 100.0
        } else {
            0.0
        }
    }

    /// Return on investment relative to cost, as a percentage.
    pub fn roi(gain: f64, cost: f64) -> f64 {
        if cost > 0.0 {
            (gain - cost) / cost * 100.0
        } else {
            0.0
        }
    }

    /// Rounds to `decimals` places with `f64::round` (half away from zero).
    ///
    /// The scaling happens in binary floating point, so values such as `1.005`
    /// that are stored slightly below the midpoint round down: `round(1.005, 2) == 1.0`.
    pub fn round(value: f64, decimals: i32) -> f64 {
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    }

    pub fn round2(value: f64) -> f64 {
        Self::round(value, 2)
    }
}
