use std::fs::File;
use std::path::Path;

use anyhow::{bail, Result};

use asar::prelude::*;

use super::CommandTrait;
use crate::keys::key_names;

/// This command extracts a single file from an archive
pub struct Evaluator;

impl CommandTrait for Evaluator {
	fn evaluate(&self, args: &clap::ArgMatches) -> Result<()> {
		let input_path = match args.value_of(key_names::INPUT) {
			Some(path) => path,
			None => bail!("Please provide an input archive file!"),
		};

		let entry_path = match args.value_of(key_names::ENTRY) {
			Some(path) => path,
			None => bail!("Please provide the archive-relative path of a file!"),
		};

		let destination = match args.value_of(key_names::DESTINATION) {
			Some(path) => Path::new(path),
			None => bail!("Please provide a destination path!"),
		};

		let file = match File::open(input_path) {
			Ok(it) => it,
			Err(err) => bail!("IOError: {} @ {}", err, input_path),
		};

		let mut archive = Archive::from_handle(file)?;
		archive.extract_file(entry_path, destination)?;

		log::info!("Extracted {} to {}", entry_path, destination.display());

		Ok(())
	}
}
