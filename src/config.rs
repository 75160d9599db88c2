use std::{
	collections::BTreeMap, //
	env,
	fs,
	path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::toolchain::registry::StaticRegistry;

pub const SETTINGS_TOML: &str = "asninja.toml";

/// Contents of `asninja.toml`.
///
/// ```toml
/// gcc_toolchain = "/opt/arm-gnu-toolchain/bin"
///
/// [registry.'Software\Atmel\AtmelStudio\7.0_Config']
/// InstallDir = 'C:\Program Files (x86)\Atmel\Studio\7.0'
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
	pub gcc_toolchain: Option<PathBuf>,
	#[serde(default)]
	pub registry: BTreeMap<String, BTreeMap<String, String>>,
}

impl Settings {
	pub fn parse(text: &str) -> Result<Self, anyhow::Error> {
		Ok(toml::from_str::<Settings>(text)?)
	}

	pub fn read(path: &Path) -> Result<Self, anyhow::Error> {
		let text = match fs::read_to_string(path) {
			Ok(x) => x,
			Err(e) => return Err(anyhow::anyhow!("Error opening {}: {}", path.display(), e)),
		};
		match Settings::parse(&text) {
			Ok(x) => Ok(x),
			Err(e) => Err(anyhow::anyhow!("Error reading {}: {}", path.display(), e)),
		}
	}

	/// Reads the settings file given on the command line, else the first of
	/// `./asninja.toml` and `<config dir>/asninja/asninja.toml` that exists.
	/// No file at all gives default settings.
	pub fn load(explicit: Option<&Path>) -> Result<Self, anyhow::Error> {
		if let Some(path) = explicit {
			return Settings::read(path);
		}
		let mut candidates = Vec::new();
		if let Ok(dir) = env::current_dir() {
			candidates.push(dir.join(SETTINGS_TOML));
		}
		if let Some(dir) = dirs::config_dir() {
			candidates.push(dir.join("asninja").join(SETTINGS_TOML));
		}
		match candidates.into_iter().find(|x| x.is_file()) {
			Some(path) => {
				log::debug!("settings: {}", path.display());
				Settings::read(&path)
			}
			None => Ok(Settings::default()),
		}
	}

	pub fn static_registry(&self) -> StaticRegistry {
		StaticRegistry { keys: self.registry.clone() }
	}
}
