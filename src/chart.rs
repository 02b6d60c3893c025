// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};
use crate::metric::{Metric, Scale};
use crate::series::Series;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use std::path::Path;

pub const DEFAULT_CAPTION: &str = "Diminishing returns from multithreading and over-laning";
pub const X_DESC: &str = "Number of threads";
pub const DEFAULT_SIZE: (u32, u32) = (1024, 768);

macro_rules! hexcolour {
    ($colour:literal) => {
        RGBColor(
            (($colour & 0xFF0000) >> 16) as u8,
            (($colour & 0x00FF00) >> 8) as u8,
            ($colour & 0x0000FF) as u8,
        )
    };
}

const COLOURS: &[RGBColor] = &[
    hexcolour!(0xAA0000),
    hexcolour!(0x0000FF),
    hexcolour!(0x888888),
    hexcolour!(0xDDCC77),
    hexcolour!(0x999933),
    hexcolour!(0x332288),
    hexcolour!(0x117733),
    hexcolour!(0x88CCEE),
    hexcolour!(0x882255),
    hexcolour!(0x44AA99),
    hexcolour!(0xAA4499),
    hexcolour!(0xCC6677),
];

/// Image encodings, picked by output file extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    Bitmap,
    Svg,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Format> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("png") | Some("bmp") | Some("jpg") | Some("jpeg") => Ok(Format::Bitmap),
            Some("svg") => Ok(Format::Svg),
            Some(other) => Err(Error::output(
                path,
                format!("unsupported image format: {}", other),
            )),
            None => Err(Error::output(path, "no image format extension")),
        }
    }
}

pub struct ScalingChart {
    caption: String,
    metric: Metric,
    size: (u32, u32),
}

impl ScalingChart {
    pub fn new(metric: Metric) -> Self {
        Self {
            caption: DEFAULT_CAPTION.to_owned(),
            metric,
            size: DEFAULT_SIZE,
        }
    }

    pub fn caption(&mut self, caption: impl AsRef<str>) -> &mut Self {
        self.caption = caption.as_ref().to_owned();
        self
    }

    pub fn size(&mut self, size: (u32, u32)) -> &mut Self {
        self.size = size;
        self
    }

    /// Draws one line per series and writes the image to `filename`. Nothing
    /// is left at `filename` unless the whole chart was drawn.
    pub fn plot(&self, series: &[Series], filename: &Path) -> Result<()> {
        let format = Format::from_path(filename)?;

        let x = x_range(series);
        let y = y_range(series, self.metric.scale());
        if !(y.0.is_finite() && y.1.is_finite()) {
            return Err(Error::MalformedInput {
                line: None,
                reason: format!("{} values exceed the plottable range", self.metric),
            });
        }

        write_atomically(filename, |scratch| match format {
            Format::Bitmap => self
                .draw(
                    BitMapBackend::new(scratch, self.size).into_drawing_area(),
                    series,
                    x,
                    y,
                )
                .map_err(|e| render_error(filename, e)),
            Format::Svg => self
                .draw(
                    SVGBackend::new(scratch, self.size).into_drawing_area(),
                    series,
                    x,
                    y,
                )
                .map_err(|e| render_error(filename, e)),
        })
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: DrawingArea<DB, Shift>,
        series: &[Series],
        (x_min, x_max): (f64, f64),
        (y_min, y_max): (f64, f64),
    ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        macro_rules! plot_series {
            ($y_spec:expr) => {{
                let mut chart = ChartBuilder::on(&root)
                    .caption(&self.caption, ("sans-serif", 30))
                    .margin(20)
                    .set_label_area_size(LabelAreaPosition::Left, 100)
                    .set_label_area_size(LabelAreaPosition::Bottom, 50)
                    .build_cartesian_2d(x_min..x_max, $y_spec)?;

                chart
                    .configure_mesh()
                    .x_desc(X_DESC)
                    .y_desc(self.metric.y_desc())
                    .draw()?;

                for (i, s) in series.iter().enumerate() {
                    let colour = COLOURS[i % COLOURS.len()];
                    let points: Vec<(f64, f64)> =
                        s.points().iter().map(|&(x, y)| (x as f64, y)).collect();

                    chart
                        .draw_series(LineSeries::new(
                            points.iter().copied(),
                            colour.stroke_width(2),
                        ))?
                        .label(s.label())
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2))
                        });

                    // single point series have no line to show
                    chart.draw_series(
                        points
                            .iter()
                            .map(|&point| Circle::new(point, 3, colour.filled())),
                    )?;
                }

                chart
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8).filled())
                    .border_style(BLACK.stroke_width(1))
                    .draw()?;
            }};
        }

        match self.metric.scale() {
            Scale::Linear => plot_series!(y_min..y_max),
            Scale::Log => plot_series!((y_min..y_max).log_scale()),
        }

        root.present()?;
        Ok(())
    }
}

fn render_error<E: std::error::Error + Send + Sync>(
    filename: &Path,
    e: DrawingAreaErrorKind<E>,
) -> Error {
    debug!("plotters error: {:?}", e);
    Error::output(filename, format!("rendering failed: {}", e))
}

/// Hands `draw` a scratch file beside `filename` and moves it into place only
/// once `draw` succeeds. On error the scratch file is removed.
fn write_atomically<F>(filename: &Path, draw: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let dir = match filename.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(Error::output(filename, "no such directory"));
    }

    // backends pick the encoding from the extension
    let suffix = filename
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let scratch = tempfile::Builder::new()
        .prefix(".scaling-graph")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| Error::output(filename, e))?;

    draw(scratch.path())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(scratch.path(), std::fs::Permissions::from_mode(0o644))
            .map_err(|e| Error::output(filename, e))?;
    }

    scratch
        .persist(filename)
        .map_err(|e| Error::output(filename, e.error))?;
    Ok(())
}

fn x_range(series: &[Series]) -> (f64, f64) {
    let threads = series
        .iter()
        .flat_map(|s| s.points().iter().map(|p| p.0 as f64));
    let (min, max) = bounds(threads).unwrap_or((1.0, 1.0));
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

fn y_range(series: &[Series], scale: Scale) -> (f64, f64) {
    let values = series.iter().flat_map(|s| s.points().iter().map(|p| p.1));
    match (scale, bounds(values)) {
        (Scale::Linear, Some((_, max))) => (0.0, max * 1.1),
        (Scale::Linear, None) => (0.0, 1.0),
        (Scale::Log, Some((min, max))) => (min * 0.8, max * 1.25),
        (Scale::Log, None) => (0.1, 1.0),
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::record::BenchmarkRecord;
    use crate::series::group;

    #[test]
    fn format_by_extension() {
        assert_eq!(Format::from_path(Path::new("a.png")).unwrap(), Format::Bitmap);
        assert_eq!(Format::from_path(Path::new("a.JPG")).unwrap(), Format::Bitmap);
        assert_eq!(Format::from_path(Path::new("dir/a.bmp")).unwrap(), Format::Bitmap);
        assert_eq!(Format::from_path(Path::new("a.svg")).unwrap(), Format::Svg);
    }

    #[test]
    fn unsupported_format() {
        for name in &["a.gif", "a.pdf", "a"] {
            match Format::from_path(Path::new(name)) {
                Err(Error::OutputWriteError { .. }) => {}
                other => panic!("{}: expected output error, got: {:?}", name, other),
            }
        }
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("chart.png");
        let series = group(&[BenchmarkRecord::new(1, 1, 1e9)], Metric::Throughput).unwrap();

        match ScalingChart::new(Metric::Throughput).plot(&series, &output) {
            Err(Error::OutputWriteError { path, .. }) => assert_eq!(path, output),
            other => panic!("expected output error, got: {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn failed_draw_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("chart.png");

        let result = write_atomically(&output, |scratch| {
            std::fs::write(scratch, b"\x89PNG half").unwrap();
            Err(render_error::<std::io::Error>(
                &output,
                DrawingAreaErrorKind::LayoutError,
            ))
        });
        assert!(matches!(result, Err(Error::OutputWriteError { .. })));
        assert!(!output.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn replaces_previous_chart() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("chart.svg");
        std::fs::write(&output, "old").unwrap();

        write_atomically(&output, |scratch| {
            assert_eq!(scratch.extension().unwrap(), "svg");
            std::fs::write(scratch, "<svg/>").unwrap();
            Ok(())
        })
        .unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "<svg/>");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&output).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }

    #[test]
    fn rendering_errors_say_so() {
        let output = Path::new("chart.png");
        match render_error::<std::io::Error>(output, DrawingAreaErrorKind::LayoutError) {
            Error::OutputWriteError { path, reason } => {
                assert_eq!(path, output);
                assert!(reason.starts_with("rendering failed"), "{}", reason);
            }
            other => panic!("expected output error, got: {:?}", other),
        }
    }

    #[test]
    fn overflowing_range() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("chart.png");
        // finite throughput, but the headroom above it is not
        let series = group(&[BenchmarkRecord::new(1, 1, 6e-300)], Metric::Throughput).unwrap();

        let result = ScalingChart::new(Metric::Throughput).plot(&series, &output);
        assert!(matches!(result, Err(Error::MalformedInput { line: None, .. })));
        assert!(!output.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn ranges() {
        let records = vec![
            BenchmarkRecord::new(1, 1, 1e9),
            BenchmarkRecord::new(1, 8, 2.5e8),
            BenchmarkRecord::new(2, 4, 4e9),
        ];

        let series = group(&records, Metric::Throughput).unwrap();
        assert_eq!(x_range(&series), (1.0, 8.0));
        let (lo, hi) = y_range(&series, Scale::Linear);
        assert_eq!(lo, 0.0);
        assert!(hi > 4.0);

        let series = group(&records, Metric::Latency).unwrap();
        let (lo, hi) = y_range(&series, Scale::Log);
        assert!(lo > 0.0 && lo < 0.25);
        assert!(hi > 4.0);
    }

    #[test]
    fn single_thread_count_widens_x() {
        let series = group(&[BenchmarkRecord::new(4, 2, 1e9)], Metric::Throughput).unwrap();
        assert_eq!(x_range(&series), (1.0, 3.0));
    }
}
