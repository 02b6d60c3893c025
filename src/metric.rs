// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde_derive::Deserialize;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

const NANOS_PER_SEC: f64 = 1e9;

/// The quantity plotted on the y-axis, derived from each record's elapsed
/// time.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Solutions graded per second, on a linear axis.
    #[strum(serialize = "throughput")]
    Throughput,
    /// Wall time in seconds, on a logarithmic axis.
    #[strum(serialize = "latency")]
    Latency,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Log,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Throughput
    }
}

impl Metric {
    pub fn value(self, elapsed_ns: f64) -> f64 {
        match self {
            Metric::Throughput => NANOS_PER_SEC / elapsed_ns,
            Metric::Latency => elapsed_ns / NANOS_PER_SEC,
        }
    }

    pub fn y_desc(self) -> &'static str {
        match self {
            Metric::Throughput => "Grading throughput (solns/sec)",
            Metric::Latency => "Time taken to find best first guess",
        }
    }

    pub fn scale(self) -> Scale {
        match self {
            Metric::Throughput => Scale::Linear,
            Metric::Latency => Scale::Log,
        }
    }

    /// Returns true if `a` is a better result than `b`.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Metric::Throughput => a > b,
            Metric::Latency => a < b,
        }
    }
}
