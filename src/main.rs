// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate log;
#[macro_use]
extern crate scaling_graph;

use scaling_graph::{Config, Logger, NAME, VERSION};

use log::Level;

fn main() {
    let config = Config::new();

    Logger::new()
        .label(NAME)
        .level(config.as_ref().map(|c| c.logging()).unwrap_or(Level::Info))
        .init()
        .expect("Failed to initialize logger");

    let config = match config {
        Ok(config) => config,
        Err(e) => fatal!("{}", e),
    };

    info!("{} {}", NAME, VERSION);
    config.print();

    if let Err(e) = scaling_graph::render(&config) {
        fatal!("{}", e);
    }
}
