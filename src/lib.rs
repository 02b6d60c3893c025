// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Renders benchmark results as a thread scaling chart with one line per
//! lane count.

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

mod chart;
mod config;
mod error;
mod logger;
mod metric;
mod record;
mod series;

pub use crate::chart::{Format, ScalingChart};
pub use crate::config::{Config, NAME, VERSION};
pub use crate::error::{Error, Result};
pub use crate::logger::Logger;
pub use crate::metric::{Metric, Scale};
pub use crate::record::{load, read, BenchmarkRecord};
pub use crate::series::{group, Series};

/// Loads the configured input, groups it by lane count and writes the chart
/// to the configured output. Returns the plotted series.
pub fn render(config: &Config) -> Result<Vec<Series>> {
    let metric = config.metric();
    let output = config.output();

    // reject an unusable output before touching the input
    Format::from_path(output)?;

    let records = load(config.input())?;
    info!(
        "Loaded {} records from {}",
        records.len(),
        config.input().display()
    );

    let series = group(&records, metric)?;
    info!("Plotting {} series of {}", series.len(), metric);
    for s in &series {
        if let Some((threads, value)) = s.best(metric) {
            debug!(
                "{}: {} points, best {} {:.4} at {} threads",
                s.label(),
                s.points().len(),
                metric,
                value,
                threads
            );
        }
    }

    let mut chart = ScalingChart::new(metric);
    chart.size(config.size());
    if let Some(title) = config.title() {
        chart.caption(title);
    }
    chart.plot(&series, output)?;

    info!("Wrote {}", output.display());
    Ok(series)
}
