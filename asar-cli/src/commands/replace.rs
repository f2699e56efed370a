use std::fs::{self, File};
use std::path::Path;

use anyhow::{bail, Result};

use asar::prelude::*;

use super::CommandTrait;
use crate::keys::key_names;

/// This command replaces a single file inside an archive, leaving every
/// other byte untouched
pub struct Evaluator;

impl CommandTrait for Evaluator {
	fn evaluate(&self, args: &clap::ArgMatches) -> Result<()> {
		let archive_path = match args.value_of(key_names::INPUT) {
			Some(path) => path,
			None => bail!("Please provide an input archive file!"),
		};

		let entry_path = match args.value_of(key_names::ENTRY) {
			Some(path) => path,
			None => bail!("Please provide the archive-relative path of the file to replace!"),
		};

		let source = match args.value_of(key_names::SOURCE) {
			Some(path) => Path::new(path),
			None => bail!("Please provide the replacement file!"),
		};

		if !source.is_file() {
			bail!(
				"Source '{}' does not exist or is not a regular file",
				source.display()
			);
		}

		// Overwrites the original archive unless -o | --output is given
		let target = args.value_of(key_names::OUTPUT).unwrap_or(archive_path);
		let new_content = fs::read(source)?;

		let file = match File::open(archive_path) {
			Ok(it) => it,
			Err(err) => bail!("IOError: {} @ {}", err, archive_path),
		};

		let mut archive = Archive::from_handle(file)?;
		let patched = replace_file(&mut archive, entry_path, &new_content)?;

		// Release the original handle before renaming over it
		drop(archive);

		let buffer = patched.into_inner().into_inner();
		commit(&buffer, Path::new(target))?;

		log::info!("Replaced {} in {}", entry_path, target);

		Ok(())
	}
}
