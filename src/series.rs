// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};
use crate::metric::Metric;
use crate::record::BenchmarkRecord;

use std::collections::HashMap;

/// All points sharing one lane count, in the order they were read.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    lane_count: u64,
    points: Vec<(u64, f64)>,
}

impl Series {
    fn new(lane_count: u64) -> Self {
        Self {
            lane_count,
            points: Vec::new(),
        }
    }

    pub fn lane_count(&self) -> u64 {
        self.lane_count
    }

    /// `(thread_count, value)` pairs.
    pub fn points(&self) -> &[(u64, f64)] {
        &self.points
    }

    pub fn label(&self) -> String {
        format!("L={}", self.lane_count)
    }

    /// The point with the best value for `metric`. Ties keep the earliest.
    pub fn best(&self, metric: Metric) -> Option<(u64, f64)> {
        self.points.iter().copied().fold(None, |best, point| match best {
            Some((_, value)) if !metric.is_better(point.1, value) => best,
            _ => Some(point),
        })
    }
}

/// Splits `records` into one series per lane count. Series are ordered by
/// first appearance of their lane count; duplicate thread counts are kept.
/// Fails if a record's value is not a positive finite number.
pub fn group(records: &[BenchmarkRecord], metric: Metric) -> Result<Vec<Series>> {
    let mut series: Vec<Series> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for record in records {
        let value = metric.value(record.elapsed_ns());
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::MalformedInput {
                line: None,
                reason: format!(
                    "{} of {} ns ({} lanes, {} threads) is not plottable: {}",
                    metric,
                    record.elapsed_ns(),
                    record.lane_count(),
                    record.thread_count(),
                    value
                ),
            });
        }

        let i = *index.entry(record.lane_count()).or_insert_with(|| {
            series.push(Series::new(record.lane_count()));
            series.len() - 1
        });
        series[i].points.push((record.thread_count(), value));
    }

    Ok(series)
}
