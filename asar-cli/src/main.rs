mod app;
mod commands;
mod keys;

use std::{env, process};

use log::error;

fn main() {
	if env::var("RUST_LOG").is_err() {
		// log level not explicitly set by the user
		env::set_var("RUST_LOG", "info");
	}
	pretty_env_logger::init();

	let key_map = keys::build_keys();
	let matches = app::build_app(key_map).get_matches();
	let commands = commands::build_commands();

	let (name, args) = matches.subcommand();
	let command = match commands.get(name) {
		Some(command) => command,
		None => {
			error!("No action specified! Run with --help to see the available subcommands");
			process::exit(1);
		},
	};

	if let Some(args) = args {
		if let Err(err) = command.evaluate(args) {
			error!("An error occurred while executing the command: {}", err);
			process::exit(1);
		}
	}
}
