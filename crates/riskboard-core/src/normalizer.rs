//! Min-max scaling for sparkline bar heights.

use crate::error::DashboardError;

/// Height given to every bar when the input has no spread.
pub const FLAT_SERIES_HEIGHT_PERCENT: f64 = 100.0;

/// One sparkline bar: its share of the track plus the display floor in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparklineBar {
    pub height_percent: f64,
    pub min_height_px: f64,
}

/// Scales `values` into `[0, 100]` relative to their own minimum and maximum.
///
/// Constant and single-element inputs scale to 100 for every element.
#[tracing::instrument(level = "debug", skip(values), fields(len = values.len()))]
pub fn min_max_scale(values: &[f64]) -> Result<Vec<f64>, DashboardError> {
    if values.is_empty() {
        return Err(DashboardError::invalid_input(
            "cannot scale an empty sequence",
        ));
    }
    if let Some(index) = values.iter().position(|value| !value.is_finite()) {
        return Err(DashboardError::invalid_input(format!(
            "value at index {index} is not a finite number"
        )));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 0.0 {
        return Ok(vec![FLAT_SERIES_HEIGHT_PERCENT; values.len()]);
    }
    Ok(values
        .iter()
        .map(|value| ((value - min) / range * 100.0).clamp(0.0, 100.0))
        .collect())
}

pub fn scale_sparkline(
    values: &[f64],
    min_height_px: f64,
) -> Result<Vec<SparklineBar>, DashboardError> {
    if !min_height_px.is_finite() || min_height_px < 0.0 {
        return Err(DashboardError::invalid_input(format!(
            "sparkline minimum height {min_height_px} must be a non-negative number"
        )));
    }
    Ok(min_max_scale(values)?
        .into_iter()
        .map(|height_percent| SparklineBar {
            height_percent,
            min_height_px,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{min_max_scale, scale_sparkline};

    #[test]
    fn functional_trend_scales_relative_to_min_and_max() {
        let heights = min_max_scale(&[65.0, 78.0, 82.0, 91.0, 89.0, 95.0, 88.0, 92.0])
            .expect("trend scales");
        assert_eq!(heights.len(), 8);
        assert_eq!(heights[0], 0.0);
        assert_eq!(heights[5], 100.0);
        assert!((heights[1] - 43.333).abs() < 0.001);
    }

    #[test]
    fn unit_single_and_constant_sequences_render_full_height() {
        assert_eq!(min_max_scale(&[42.0]).expect("single"), vec![100.0]);
        assert_eq!(
            min_max_scale(&[7.0, 7.0, 7.0]).expect("constant"),
            vec![100.0, 100.0, 100.0]
        );
    }

    #[test]
    fn regression_empty_and_non_finite_inputs_are_invalid() {
        let error = min_max_scale(&[]).expect_err("empty input fails");
        assert!(error.is_invalid_input());
        let error = min_max_scale(&[1.0, f64::NAN]).expect_err("NaN fails");
        assert!(error.to_string().contains("index 1"));
    }

    #[test]
    fn unit_sparkline_bars_carry_the_minimum_height() {
        let bars = scale_sparkline(&[1.0, 3.0], 8.0).expect("bars");
        assert_eq!(bars[0].height_percent, 0.0);
        assert_eq!(bars[1].height_percent, 100.0);
        assert!(bars.iter().all(|bar| bar.min_height_px == 8.0));
        assert!(scale_sparkline(&[1.0], -1.0).is_err());
        assert!(scale_sparkline(&[1.0], f64::INFINITY).is_err());
    }

    proptest! {
        #[test]
        fn property_scaled_values_stay_in_track(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..32)
        ) {
            let heights = min_max_scale(&values).expect("finite non-empty input");
            prop_assert_eq!(heights.len(), values.len());
            prop_assert!(heights.iter().all(|height| (0.0..=100.0).contains(height)));
        }

        #[test]
        fn property_constant_sequences_are_full_height(
            value in -1.0e6f64..1.0e6,
            len in 1usize..16
        ) {
            let heights = min_max_scale(&vec![value; len]).expect("constant input");
            prop_assert!(heights.iter().all(|height| *height == 100.0));
        }
    }
}
