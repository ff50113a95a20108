//! # Disparity statistics
//!
//! Plots the per-row valid-pixel ratio and disparity range of a map, handy for spotting
//! rectification problems or a badly chosen search range.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::Path;

use plotters::prelude::*;

use crate::disparity::DisparityMap;
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Statistics of one row of a disparity map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowStatistics {
    pub row: usize,

    /// Fraction of the row's pixels holding a valid disparity.
    pub valid_ratio: f32,

    /// Minimum, mean and maximum valid disparity, `None` if the row has no valid pixel.
    pub disparity: Option<(f32, f32, f32)>,
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Valid-pixel ratio and disparity range of every row of `map`.
pub fn row_statistics(map: &DisparityMap) -> Vec<RowStatistics> {
    (0..map.height())
        .map(|y| {
            let valid: Vec<f32> = (0..map.width()).filter_map(|x| map.disparity(x, y)).collect();

            let valid_ratio = if map.width() == 0 {
                0.0
            } else {
                valid.len() as f32 / map.width() as f32
            };

            let disparity = if valid.is_empty() {
                None
            } else {
                let min = valid.iter().cloned().fold(std::f32::INFINITY, f32::min);
                let max = valid.iter().cloned().fold(std::f32::NEG_INFINITY, f32::max);
                let mean = valid.iter().sum::<f32>() / valid.len() as f32;

                Some((min, mean, max))
            };

            RowStatistics {
                row: y,
                valid_ratio,
                disparity,
            }
        })
        .collect()
}

/// Plot the row statistics of `map` into a PNG at `path`.
///
/// The upper panel shows the valid-pixel ratio of each row, the lower one its minimum, mean and
/// maximum disparity.
pub fn plot_row_statistics<P: AsRef<Path>>(map: &DisparityMap, path: P) -> Result<()> {
    let stats = row_statistics(map);

    let root = BitMapBackend::new(path.as_ref(), (800, 900)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let panels = root.split_evenly((2, 1));

    // ---- VALID RATIO ----

    let mut ratio_chart = ChartBuilder::on(&panels[0])
        .caption("Valid pixels per row", ("sans-serif", 20).into_font())
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_ranged(0f32..1f32, 0..map.height())
        .map_err(plot_err)?;

    ratio_chart.configure_mesh().draw().map_err(plot_err)?;

    ratio_chart
        .draw_series(LineSeries::new(
            stats.iter().map(|s| (s.valid_ratio, s.row)),
            &BLACK,
        ))
        .map_err(plot_err)?;

    // ---- DISPARITY RANGE ----

    let mut chart = ChartBuilder::on(&panels[1])
        .caption("Disparity per row", ("sans-serif", 20).into_font())
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_ranged(map.min_disp..(map.max_disp + 1.0), 0..map.height())
        .map_err(plot_err)?;

    chart.configure_mesh().draw().map_err(plot_err)?;

    let series = [
        ("Min disparity", 0, &RED),
        ("Mean disparity", 1, &GREEN),
        ("Max disparity", 2, &BLUE),
    ];

    for &(label, idx, colour) in series.iter() {
        let points: Vec<(f32, usize)> = stats
            .iter()
            .filter_map(|s| s.disparity.map(|(min, mean, max)| ([min, mean, max][idx], s.row)))
            .collect();

        chart
            .draw_series(LineSeries::new(points, colour))
            .map_err(plot_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}

fn plot_err<E: std::fmt::Debug>(e: E) -> Error {
    Error::Statistics(format!("{:?}", e))
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::Plane;

    #[test]
    fn rows_report_ratio_and_range() {
        let values = vec![2.0, -1.0, 4.0, 3.0, -1.0, -1.0, -1.0, -1.0];
        let data = Plane::from_vec(4, 2, values).unwrap();
        let map = DisparityMap::new(data, Plane::new(4, 2), -1.0, 0.0, 7.0);

        let stats = row_statistics(&map);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].valid_ratio, 0.75);
        assert_eq!(stats[0].disparity, Some((2.0, 3.0, 4.0)));
        assert_eq!(stats[1].valid_ratio, 0.0);
        assert_eq!(stats[1].disparity, None);
    }
}
