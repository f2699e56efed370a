use std::collections::HashMap;

use clap::{App, Arg, SubCommand};

const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn build_app<'a, 'b>(key_map: HashMap<&'static str, Arg<'a, 'b>>) -> App<'a, 'b> {
	use crate::keys::key_names;

	App::new("asar-cli")
		.author(AUTHORS)
		.version(VERSION)
		.about("A command-line interface for inspecting, unpacking and patching .asar archives")
		.subcommand(
			SubCommand::with_name("list")
				.alias("ls")
				.about("Lists all the file entries in an archive")
				.arg(key_map.get(key_names::INPUT).unwrap())
				.arg(key_map.get(key_names::FORMAT).unwrap())
				.arg(key_map.get(key_names::LONG).unwrap()),
		)
		.subcommand(
			SubCommand::with_name("extract")
				.alias("x")
				.about("Extracts the entire archive into a new directory")
				.arg(key_map.get(key_names::INPUT).unwrap())
				.arg(key_map.get(key_names::DESTINATION).unwrap()),
		)
		.subcommand(
			SubCommand::with_name("extract-file")
				.alias("xf")
				.about("Extracts a single file from the archive")
				.arg(key_map.get(key_names::INPUT).unwrap())
				.arg(key_map.get(key_names::ENTRY).unwrap())
				.arg(key_map.get(key_names::DESTINATION).unwrap()),
		)
		.subcommand(
			SubCommand::with_name("replace")
				.alias("r")
				.about("Replaces a single file inside the archive, preserving every other byte")
				.arg(key_map.get(key_names::INPUT).unwrap())
				.arg(key_map.get(key_names::ENTRY).unwrap())
				.arg(key_map.get(key_names::SOURCE).unwrap())
				.arg(key_map.get(key_names::OUTPUT).unwrap()),
		)
		.subcommand(
			SubCommand::with_name("pack")
				.alias("p")
				.about("Packs a directory into a new .asar archive")
				.arg(key_map.get(key_names::SOURCE).unwrap())
				.arg(key_map.get(key_names::DESTINATION).unwrap())
				.arg(key_map.get(key_names::FORCE).unwrap()),
		)
}
