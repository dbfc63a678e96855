// src/bin/normalize_with_header.rs
//
// usage: normalize_with_header <pre-data-directory> <output-data-directory>
// Like `normalize`, but the first row of each file is copied through as a header.

use midnight_normalizer::{cli, logging, NormalizeOptions};
use std::{env, process::exit};

fn main() {
    logging::init_logging();
    let args: Vec<String> = env::args().collect();
    exit(cli::run(&args, &NormalizeOptions::with_header()));
}
