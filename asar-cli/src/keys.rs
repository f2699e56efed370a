use std::collections::HashMap;

use clap::Arg;

/// The names of every key in use by the subcommands, also what
/// `ArgMatches::value_of` is queried with.
pub mod key_names {
	pub const INPUT: &str = "input";
	pub const ENTRY: &str = "entry";
	pub const SOURCE: &str = "source";
	pub const DESTINATION: &str = "destination";
	pub const OUTPUT: &str = "output";
	pub const FORMAT: &str = "format";
	pub const LONG: &str = "long";
	pub const FORCE: &str = "force";
}

/// Build the pool of keys the subcommands pick their arguments from.
pub fn build_keys<'a, 'b>() -> HashMap<&'static str, Arg<'a, 'b>> {
	let mut map = HashMap::new();

	map.insert(
		key_names::INPUT,
		Arg::with_name(key_names::INPUT)
			.required(true)
			.value_name("ARCHIVE")
			.help("Path to the .asar archive"),
	);

	map.insert(
		key_names::ENTRY,
		Arg::with_name(key_names::ENTRY)
			.required(true)
			.value_name("FILE")
			.help("Archive-relative path of a file, e.g. src/index.js"),
	);

	map.insert(
		key_names::SOURCE,
		Arg::with_name(key_names::SOURCE)
			.required(true)
			.value_name("SOURCE")
			.help("A path on disk to read from"),
	);

	map.insert(
		key_names::DESTINATION,
		Arg::with_name(key_names::DESTINATION)
			.required(true)
			.value_name("DESTINATION")
			.help("A path on disk to write to"),
	);

	map.insert(
		key_names::OUTPUT,
		Arg::with_name(key_names::OUTPUT)
			.short("o")
			.long("output")
			.takes_value(true)
			.value_name("OUTPUT")
			.help("Write the patched archive here instead of overwriting the original"),
	);

	map.insert(
		key_names::FORMAT,
		Arg::with_name(key_names::FORMAT)
			.short("f")
			.long("format")
			.takes_value(true)
			.possible_values(&["plain", "long", "json"])
			.default_value("plain")
			.help("The output format of the listing"),
	);

	map.insert(
		key_names::LONG,
		Arg::with_name(key_names::LONG)
			.short("l")
			.long("long")
			.help("Shorthand for --format long (show file sizes)"),
	);

	map.insert(
		key_names::FORCE,
		Arg::with_name(key_names::FORCE)
			.long("force")
			.help("Overwrite the output archive if it already exists"),
	);

	map
}
