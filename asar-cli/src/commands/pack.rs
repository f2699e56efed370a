use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Result};
use indicatif::ProgressBar;

use super::CommandTrait;
use crate::keys::key_names;

/// This command packs a directory into a new .asar archive
pub struct Evaluator;

impl CommandTrait for Evaluator {
	fn evaluate(&self, args: &clap::ArgMatches) -> Result<()> {
		let source = match args.value_of(key_names::SOURCE) {
			Some(path) => Path::new(path),
			None => bail!("Please provide a source directory!"),
		};

		let destination = match args.value_of(key_names::DESTINATION) {
			Some(path) => Path::new(path),
			None => bail!("Please provide an output archive path!"),
		};

		if !source.is_dir() {
			bail!("Source '{}' is not a directory", source.display());
		}

		if destination.exists() && !args.is_present(key_names::FORCE) {
			bail!(
				"'{}' already exists. Pass --force to overwrite it",
				destination.display()
			);
		}

		let time = Instant::now();

		let pbar = ProgressBar::new_spinner();
		pbar.enable_steady_tick(super::SPINNER_TICK_MILLIS);
		pbar.set_message(format!("Packing {}", source.display()));

		let result = asar::prelude::pack(source, destination);
		pbar.finish_and_clear();
		result?;

		log::info!(
			"Packed {} into {} in {:.2}s",
			source.display(),
			destination.display(),
			time.elapsed().as_secs_f64()
		);

		Ok(())
	}
}
