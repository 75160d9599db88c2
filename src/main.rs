use std::{
	path::PathBuf, //
	process::ExitCode,
};

use clap::Parser;

use asninja::{config::Settings, ConvertOptions, DEFAULT_CONFIG};

/// Converts an Atmel Studio project into a ninja build file.
#[derive(Debug, Parser)]
#[command(name = "asninja", version, about)]
struct Args {
	/// Atmel Studio project file
	#[arg(long)]
	prj: PathBuf,

	/// Configuration name
	#[arg(long, default_value = DEFAULT_CONFIG)]
	config: String,

	/// Output path (if absent, same as configuration name)
	#[arg(long)]
	outpath: Option<PathBuf>,

	/// Output name (if absent, same as the project file name)
	#[arg(long)]
	output: Option<String>,

	/// Additional compiler and linker flags, separated by spaces
	#[arg(long, default_value = "")]
	flags: String,

	/// Additional defines, separated by spaces
	#[arg(long = "add_defs", default_value = "")]
	add_defs: String,

	/// Defines to remove, separated by spaces
	#[arg(long = "del_defs", default_value = "")]
	del_defs: String,

	/// Path to the GCC toolchain bin directory
	#[arg(long = "gcc_toolchain")]
	gcc_toolchain: Option<PathBuf>,

	/// Settings file (default: ./asninja.toml, then the user config directory)
	#[arg(long)]
	settings: Option<PathBuf>,
}

fn split_list(text: &str) -> Vec<String> {
	if text.is_empty() {
		Vec::new()
	} else {
		text.split(' ').map(String::from).collect()
	}
}

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().filter_or("ASNINJA_LOG", "warn"))
		.format_timestamp(None)
		.init();

	let args = Args::parse();

	let settings = match Settings::load(args.settings.as_deref()) {
		Ok(x) => x,
		Err(e) => {
			println!("Error: {:#}", e);
			return ExitCode::FAILURE;
		}
	};

	let opts = ConvertOptions {
		prj: args.prj,
		config: args.config,
		outpath: args.outpath,
		output: args.output,
		flags: split_list(&args.flags),
		add_defs: split_list(&args.add_defs),
		del_defs: split_list(&args.del_defs),
		gcc_toolchain: args.gcc_toolchain,
	};

	match asninja::convert(&opts, &settings) {
		Ok(path) => {
			println!("Generated {}", path.display());
			ExitCode::SUCCESS
		}
		Err(e) => {
			println!("Error: {:#}", e);
			ExitCode::FAILURE
		}
	}
}
