use std::fs::File;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Result};
use indicatif::ProgressBar;

use asar::prelude::*;

use super::CommandTrait;
use crate::keys::key_names;

/// This command extracts an entire archive into a new directory
pub struct Evaluator;

impl CommandTrait for Evaluator {
	fn evaluate(&self, args: &clap::ArgMatches) -> Result<()> {
		let input_path = match args.value_of(key_names::INPUT) {
			Some(path) => path,
			None => bail!("Please provide an input archive file!"),
		};

		let destination = match args.value_of(key_names::DESTINATION) {
			Some(path) => Path::new(path),
			None => bail!("Please provide a destination directory!"),
		};

		if destination.exists() {
			bail!(
				"Destination '{}' already exists. Remove it first or choose a different path",
				destination.display()
			);
		}

		let file = match File::open(input_path) {
			Ok(it) => it,
			Err(err) => bail!("IOError: {} @ {}", err, input_path),
		};

		let mut archive = Archive::from_handle(file)?;
		let count = archive.leaf_paths().len();

		// For measuring the time difference
		let time = Instant::now();

		let pbar = ProgressBar::new_spinner();
		pbar.enable_steady_tick(super::SPINNER_TICK_MILLIS);
		pbar.set_message(format!("Extracting {}", input_path));

		let result = archive.extract(destination);
		pbar.finish_and_clear();
		result?;

		log::info!(
			"Extracted {} files into {} in {:.2}s",
			count,
			destination.display(),
			time.elapsed().as_secs_f64()
		);

		Ok(())
	}
}
