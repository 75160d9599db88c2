//! Lookup of Atmel Studio installation data.
//!
//! Atmel Studio records its install directory and toolchain packages under
//! `HKEY_CURRENT_USER`. Lookups never fail hard: anything missing is `None`.

use std::collections::BTreeMap;

pub trait RegistryLookup {
	/// Reads string value `value_name` of registry key `key_name`.
	fn read(&self, key_name: &str, value_name: &str) -> Option<String>;
}

/// Reads `HKEY_CURRENT_USER` of the Windows registry. Finds nothing on other hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRegistry;

#[cfg(windows)]
impl RegistryLookup for SystemRegistry {
	fn read(&self, key_name: &str, value_name: &str) -> Option<String> {
		use winreg::{enums::HKEY_CURRENT_USER, RegKey};

		let key = match RegKey::predef(HKEY_CURRENT_USER).open_subkey(key_name) {
			Ok(x) => x,
			Err(e) => {
				log::debug!("registry key HKCU\\{} not opened: {}", key_name, e);
				return None;
			}
		};
		match key.get_value::<String, _>(value_name) {
			Ok(x) => Some(x).filter(|x| !x.is_empty()),
			Err(e) => {
				log::debug!("registry value HKCU\\{}\\{} not read: {}", key_name, value_name, e);
				None
			}
		}
	}
}

#[cfg(not(windows))]
impl RegistryLookup for SystemRegistry {
	fn read(&self, key_name: &str, value_name: &str) -> Option<String> {
		log::debug!("no registry on this host, {}\\{} not read", key_name, value_name);
		None
	}
}

/// Registry values supplied by the settings file, keyed by key then value name.
#[derive(Clone, Debug, Default)]
pub struct StaticRegistry {
	pub keys: BTreeMap<String, BTreeMap<String, String>>,
}

impl RegistryLookup for StaticRegistry {
	fn read(&self, key_name: &str, value_name: &str) -> Option<String> {
		self.keys.get(key_name)?.get(value_name).cloned()
	}
}

/// Consults each lookup in turn and returns the first non-empty value.
#[derive(Default)]
pub struct LayeredRegistry {
	layers: Vec<Box<dyn RegistryLookup>>,
}

impl LayeredRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, layer: impl RegistryLookup + 'static) -> Self {
		self.layers.push(Box::new(layer));
		self
	}
}

impl RegistryLookup for LayeredRegistry {
	fn read(&self, key_name: &str, value_name: &str) -> Option<String> {
		self.layers
			.iter()
			.filter_map(|x| x.read(key_name, value_name))
			.find(|x| !x.is_empty())
	}
}
