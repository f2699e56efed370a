use std::collections::HashMap;

use anyhow::Result;
use clap::ArgMatches;

// A common spinner style for the slower commands
pub(crate) const SPINNER_TICK_MILLIS: u64 = 120;

// Trait that must be implemented by all subcommands
pub trait CommandTrait: Sync {
	fn evaluate(&self, args: &ArgMatches) -> Result<()>;
}

// All sub-commands are defined in the below modules
pub mod extract;
pub mod extract_file;
pub mod list;
pub mod pack;
pub mod replace;

pub fn build_commands() -> HashMap<&'static str, Box<dyn CommandTrait>> {
	let mut map: HashMap<&'static str, Box<dyn CommandTrait>> = HashMap::new();

	map.insert("list", Box::new(list::Evaluator));
	map.insert("extract", Box::new(extract::Evaluator));
	map.insert("extract-file", Box::new(extract_file::Evaluator));
	map.insert("replace", Box::new(replace::Evaluator));
	map.insert("pack", Box::new(pack::Evaluator));

	map
}
