// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::chart::DEFAULT_SIZE;
use crate::error::{Error, Result};
use crate::metric::Metric;

use clap::{App, Arg, ArgMatches};
use log::Level;
use serde_derive::Deserialize;
use strum::IntoEnumIterator;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Clone, Debug)]
pub struct Config {
    input: PathBuf,
    output: PathBuf,
    general: General,
    chart: Chart,
}

/// Contents of the optional TOML config file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    general: General,
    #[serde(default)]
    chart: Chart,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct General {
    #[serde(default)]
    metric: Metric,
    #[serde(default = "default_logging_level")]
    logging: Level,
}

impl Default for General {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            logging: default_logging_level(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Chart {
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
    title: Option<String>,
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: None,
        }
    }
}

fn default_logging_level() -> Level {
    Level::Info
}

fn default_width() -> u32 {
    DEFAULT_SIZE.0
}

fn default_height() -> u32 {
    DEFAULT_SIZE.1
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::ConfigError(format!("failed to parse {}: {}", path.display(), e))
        })
    }
}

fn app<'a, 'b>(metrics: &[&'b str]) -> App<'a, 'b> {
    App::new(NAME)
        .version(VERSION)
        .about("Plots benchmark scaling by thread count, one line per lane count")
        .arg(
            Arg::with_name("input")
                .value_name("INPUT")
                .help("CSV of lane_count,thread_count,elapsed_nanoseconds rows")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .value_name("OUTPUT")
                .help("Image to write, format chosen by extension (png, bmp, jpg, svg)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("metric")
                .long("metric")
                .value_name("METRIC")
                .help("Quantity on the y-axis")
                .possible_values(metrics)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("width")
                .long("width")
                .value_name("PIXELS")
                .help("Image width")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("height")
                .long("height")
                .value_name("PIXELS")
                .help("Image height")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Increase verbosity by one level. Can be used more than once")
                .multiple(true),
        )
}

impl Config {
    /// parse command line options and return `Config`
    pub fn new() -> Result<Config> {
        let metrics = metric_names();
        Self::from_matches(&app(&metrics).get_matches())
    }

    /// parse the given arguments, the first being the program name
    pub fn from_args<I, T>(args: I) -> Result<Config>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let metrics = metric_names();
        let matches = app(&metrics)
            .get_matches_from_safe(args)
            .map_err(|e| Error::ConfigError(e.message))?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Config> {
        let mut file = match matches.value_of("config") {
            Some(path) => ConfigFile::load(Path::new(path))?,
            None => ConfigFile::default(),
        };

        if let Some(metric) = matches.value_of("metric") {
            file.general.metric = metric
                .parse()
                .map_err(|_| Error::ConfigError(format!("unknown metric: {}", metric)))?;
        }
        if let Some(width) = pixels(matches, "width")? {
            file.chart.width = width;
        }
        if let Some(height) = pixels(matches, "height")? {
            file.chart.height = height;
        }
        match matches.occurrences_of("verbose") {
            0 => {}
            1 => file.general.logging = Level::Debug,
            _ => file.general.logging = Level::Trace,
        }

        let input = matches
            .value_of_os("input")
            .ok_or_else(|| Error::ConfigError("missing input path".to_owned()))?;
        let output = matches
            .value_of_os("output")
            .ok_or_else(|| Error::ConfigError("missing output path".to_owned()))?;

        Ok(Config {
            input: PathBuf::from(input),
            output: PathBuf::from(output),
            general: file.general,
            chart: file.chart,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn metric(&self) -> Metric {
        self.general.metric
    }

    pub fn logging(&self) -> Level {
        self.general.logging
    }

    pub fn size(&self) -> (u32, u32) {
        (self.chart.width, self.chart.height)
    }

    pub fn title(&self) -> Option<&str> {
        self.chart.title.as_deref()
    }

    pub fn print(&self) {
        info!("-----");
        info!("Config:");
        info!("Config: Input: {}", self.input.display());
        info!("Config: Output: {}", self.output.display());
        info!("Config: Metric: {}", self.metric());
        debug!("Config: Logging: {}", self.logging());
        debug!("Config: Size: {}x{}", self.chart.width, self.chart.height);
        if let Some(title) = self.title() {
            debug!("Config: Title: {}", title);
        }
    }
}

fn metric_names() -> Vec<&'static str> {
    Metric::iter().map(|m| m.into()).collect()
}

fn pixels(matches: &ArgMatches, name: &str) -> Result<Option<u32>> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(value) => match value.parse() {
            Ok(0) | Err(_) => Err(Error::ConfigError(format!(
                "invalid value for '{}': {}",
                name, value
            ))),
            Ok(pixels) => Ok(Some(pixels)),
        },
    }
}
