//! SVG rendering of an [`ErrorRateTable`].

use std::fmt::Display;
use std::path::Path;

use plotters::prelude::*;
use tracing::{info, instrument};

use crate::error::TrajectoryError;
use crate::table::ErrorRateTable;

/// Line chart of OOB error rate against ensemble size, one line per series.
///
/// The x axis spans the table's estimator range; the y axis starts at zero
/// and leaves 10% headroom above the largest error. The legend sits in the
/// upper right.
#[derive(Debug, Clone)]
pub struct ErrorRatePlot {
    size: (u32, u32),
    caption: Option<String>,
}

impl ErrorRatePlot {
    /// An 800x600 plot without a caption.
    #[must_use]
    pub fn new() -> Self {
        Self {
            size: (800, 600),
            caption: None,
        }
    }

    /// Set the image size in pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Draw `table` into an SVG file at `path`, in series insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::EmptyTable`] if no point was recorded and
    /// [`TrajectoryError::Plot`] if the backend fails to draw or write.
    #[instrument(skip_all, fields(path = %path.display(), n_series = table.series().len()))]
    pub fn render(&self, table: &ErrorRateTable, path: &Path) -> Result<(), TrajectoryError> {
        if table.is_empty() {
            return Err(TrajectoryError::EmptyTable);
        }

        let range = table.range();
        let x_min = range.min() as f64;
        let x_max = (range.max() as f64).max(x_min + 1.0);
        let y_max = (table.max_error().unwrap_or(0.0) * 1.1).max(0.05);

        let root = SVGBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error(path))?;

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60);
        if let Some(caption) = &self.caption {
            builder.caption(caption, ("sans-serif", 22).into_font());
        }
        let mut chart = builder
            .build_cartesian_2d(x_min..x_max, 0.0..y_max)
            .map_err(plot_error(path))?;

        chart
            .configure_mesh()
            .x_desc("n_estimators")
            .y_desc("OOB error rate")
            .x_label_formatter(&|x| format!("{x:.0}"))
            .y_label_formatter(&|y| format!("{y:.3}"))
            .draw()
            .map_err(plot_error(path))?;

        for (idx, series) in table.series().iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            let (xs, ys) = series.unzip();
            let points = xs.into_iter().map(|n| n as f64).zip(ys);
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(plot_error(path))?
                .label(series.label())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_error(path))?;

        root.present().map_err(plot_error(path))?;
        info!(path = %path.display(), "plot written");
        Ok(())
    }
}

impl Default for ErrorRatePlot {
    fn default() -> Self {
        Self::new()
    }
}

fn plot_error<E: Display>(path: &Path) -> impl Fn(E) -> TrajectoryError + '_ {
    move |err| TrajectoryError::Plot {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
