use std::fs::File;

use anyhow::{bail, Result};
use bytesize::ByteSize;
use serde::Serialize;
use tabled::{Style, Table, Tabled};

use asar::prelude::*;

use super::CommandTrait;
use crate::keys::key_names;

/// This command lists the file entries in an archive, in one of a few formats
pub struct Evaluator;

impl CommandTrait for Evaluator {
	fn evaluate(&self, args: &clap::ArgMatches) -> Result<()> {
		let archive_path = match args.value_of(key_names::INPUT) {
			Some(path) => path,
			None => bail!("Please provide an input archive file!"),
		};

		let file = File::open(archive_path)?;
		let archive = Archive::from_handle(file)?;

		let mut entries = archive.list_entries();
		entries.sort_by(|a, b| a.path.cmp(&b.path));

		if entries.is_empty() {
			println!("(archive is empty)");
			return Ok(());
		}

		// --long is a shorthand for --format long
		let format = if args.is_present(key_names::LONG) {
			"long"
		} else {
			args.value_of(key_names::FORMAT).unwrap_or("plain")
		};

		match format {
			"plain" => {
				for entry in &entries {
					println!("{}", entry.path);
				}
			},
			"long" => {
				let rows: Vec<FileTableEntry> = entries
					.iter()
					.map(|entry| FileTableEntry {
						path: entry.path.clone(),
						size: ByteSize(entry.size).to_string(),
						unpacked: if entry.unpacked { "yes" } else { "" }.to_string(),
					})
					.collect();

				let table = Table::new(rows).with(Style::pseudo_clean());
				println!("{}", table.to_string());
			},
			"json" => {
				let rows: Vec<JsonEntry> = entries
					.iter()
					.map(|entry| JsonEntry {
						path: &entry.path,
						size: entry.size,
						unpacked: entry.unpacked,
					})
					.collect();

				println!("{}", serde_json::to_string_pretty(&rows)?);
			},
			unknown => bail!("Unknown list format: {}. Valid formats: plain, long, json", unknown),
		}

		Ok(())
	}
}

#[derive(Tabled)]
struct FileTableEntry {
	path: String,
	size: String,
	unpacked: String,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
	path: &'a str,
	size: u64,
	unpacked: bool,
}
