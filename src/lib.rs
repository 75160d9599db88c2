pub mod config;
pub mod error;
pub mod flags;
pub mod generator;
pub mod library;
pub mod misc;
pub mod project;
pub mod toolchain;

use std::path::{Path, PathBuf};

use anyhow::Context;

use config::Settings;
use error::ProjectError;
use generator::Ninja;
use project::AtmelStudioProject;
use toolchain::{
	atmel_studio,
	registry::{LayeredRegistry, SystemRegistry},
	GccToolchain,
};

pub const DEFAULT_CONFIG: &str = "Debug";

/// Inputs of one conversion run.
#[derive(Clone, Debug, Default)]
pub struct ConvertOptions {
	pub prj: PathBuf,
	/// Configuration name, `Debug` if empty.
	pub config: String,
	/// Directory receiving `build.ninja`, the configuration name if absent.
	pub outpath: Option<PathBuf>,
	/// Output base name, the project file stem if absent.
	pub output: Option<String>,
	pub flags: Vec<String>,
	pub add_defs: Vec<String>,
	pub del_defs: Vec<String>,
	pub gcc_toolchain: Option<PathBuf>,
}

impl ConvertOptions {
	pub fn config_name(&self) -> &str {
		if self.config.is_empty() {
			DEFAULT_CONFIG
		} else {
			&self.config
		}
	}

	pub fn outpath(&self) -> PathBuf {
		self.outpath.clone().unwrap_or_else(|| PathBuf::from(self.config_name()))
	}
}

/// Last component of `outpath` as written, e.g. `Debug` for `build/Debug`.
pub fn outdir_name(outpath: &Path) -> String {
	let text = outpath.to_string_lossy();
	let text = text.trim_end_matches(['/', '\\']);
	match text.rfind(['/', '\\']) {
		Some(pos) => text[pos + 1..].to_owned(),
		None => text.to_owned(),
	}
}

/// Picks the toolchain: explicit path first, then the settings file, then the
/// toolchain recorded in the project.
pub fn resolve_toolchain(
	asp: &AtmelStudioProject,
	explicit: Option<&Path>,
	settings: &Settings,
) -> anyhow::Result<GccToolchain> {
	if let Some(path) = explicit.or(settings.gcc_toolchain.as_deref()) {
		return Ok(GccToolchain::from_path(path)?);
	}
	let registry = LayeredRegistry::new().with(settings.static_registry()).with(SystemRegistry);
	Ok(atmel_studio::from_project(asp.toolchain_id(), &registry)?)
}

/// Converts the project in `opts.prj` into `<outpath>/build.ninja`.
pub fn convert(opts: &ConvertOptions, settings: &Settings) -> anyhow::Result<PathBuf> {
	let output = match &opts.output {
		Some(x) => x.clone(),
		None => misc::file_stem(&opts.prj).unwrap_or_default(),
	};
	let mut asp = AtmelStudioProject::from_file(&opts.prj, &output)
		.with_context(|| format!("Error loading {}", opts.prj.display()))?;

	let config = opts.config_name();
	if !asp.select_config(config) {
		return Err(ProjectError::UndefinedConfiguration(config.to_owned()).into());
	}
	log::info!("configuration: {}", config);

	let outpath = opts.outpath();
	let outdir = outdir_name(&outpath);
	let flags = asp.resolve_flags(&opts.flags, &opts.add_defs, &opts.del_defs, &outdir);

	let toolchain = resolve_toolchain(&asp, opts.gcc_toolchain.as_deref(), settings)?;
	let exes = toolchain.executables(asp.is_cpp);

	Ninja::generate(&asp, &flags, &exes, &outpath, &outdir).map_err(anyhow::Error::msg)?;
	Ok(outpath.join("build.ninja"))
}
