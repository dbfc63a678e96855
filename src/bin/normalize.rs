// src/bin/normalize.rs
//
// usage: normalize <pre-data-directory> <output-data-directory>
// Every row of every .csv file is normalized, the first one included.

use midnight_normalizer::{cli, logging, NormalizeOptions};
use std::{env, process::exit};

fn main() {
    logging::init_logging();
    let args: Vec<String> = env::args().collect();
    exit(cli::run(&args, &NormalizeOptions::default()));
}
