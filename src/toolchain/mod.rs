pub mod atmel_studio;
pub mod registry;

use std::{
	fmt, //
	path::{Path, PathBuf},
};

use crate::error::ToolchainError;

/// Target architecture family of a GCC toolchain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolType {
	Arm,
	Avr32,
	Avr8,
}

impl ToolType {
	/// Detects the family from an `arm-`, `avr32-` or `avr8-` marker in `path`.
	pub fn from_path(path: &str) -> Result<ToolType, ToolchainError> {
		if path.contains("arm-") {
			Ok(ToolType::Arm)
		} else if path.contains("avr32-") {
			Ok(ToolType::Avr32)
		} else if path.contains("avr8-") {
			Ok(ToolType::Avr8)
		} else {
			Err(ToolchainError::UnsupportedToolchain(path.to_owned()))
		}
	}

	pub fn tool_prefix(&self) -> &'static str {
		match self {
			ToolType::Arm => "arm-none-eabi",
			ToolType::Avr32 => "avr32",
			ToolType::Avr8 => "avr8",
		}
	}
}

impl fmt::Display for ToolType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ToolType::Arm => write!(f, "arm"),
			ToolType::Avr32 => write!(f, "avr32"),
			ToolType::Avr8 => write!(f, "avr8"),
		}
	}
}

/// Executables referenced by the generated build rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Executables {
	pub cc: String,
	pub cxx: String,
	pub ar: String,
	pub link: String,
}

/// A GCC cross toolchain installed in a single `bin` directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GccToolchain {
	pub path: PathBuf,
	pub tool_type: ToolType,
}

impl GccToolchain {
	pub fn new(path: impl Into<PathBuf>, tool_type: ToolType) -> Self {
		GccToolchain { path: path.into(), tool_type }
	}

	/// Toolchain at an explicitly given directory; the family is read from the path.
	pub fn from_path(path: &Path) -> Result<Self, ToolchainError> {
		let tool_type = ToolType::from_path(&path.to_string_lossy())?;
		log::info!("toolchain: {} ({})", path.display(), tool_type);
		Ok(GccToolchain::new(path, tool_type))
	}

	fn tool(&self, name: &str) -> String {
		self.path
			.join(format!("{}-{}", self.tool_type.tool_prefix(), name))
			.to_string_lossy()
			.into_owned()
	}

	pub fn cc(&self) -> String {
		self.tool("gcc")
	}

	pub fn cxx(&self) -> String {
		self.tool("g++")
	}

	pub fn ar(&self) -> String {
		self.tool("ar")
	}

	/// C projects link with the C driver, C++ projects with the C++ driver.
	pub fn executables(&self, is_cpp: bool) -> Executables {
		let (cc, cxx) = (self.cc(), self.cxx());
		let link = if is_cpp { cxx.clone() } else { cc.clone() };
		Executables { cc, cxx, ar: self.ar(), link }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tool_type() {
		assert_eq!(ToolType::from_path("arm-").unwrap(), ToolType::Arm);
		assert_eq!(ToolType::from_path("/opt/avr32-gnu-toolchain/bin").unwrap(), ToolType::Avr32);
		assert_eq!(ToolType::from_path("avr8-").unwrap(), ToolType::Avr8);
		assert!(matches!(
			ToolType::from_path("PathWithoutToolchainMarker"),
			Err(ToolchainError::UnsupportedToolchain(x)) if x == "PathWithoutToolchainMarker"
		));
	}

	#[test]
	fn test_tool_prefix() {
		assert_eq!(ToolType::Arm.tool_prefix(), "arm-none-eabi");
		assert_eq!(ToolType::Avr32.tool_prefix(), "avr32");
		assert_eq!(ToolType::Avr8.tool_prefix(), "avr8");
	}

	#[test]
	fn test_from_path() {
		let tc = GccToolchain::from_path(Path::new("arm-")).unwrap();
		assert_eq!(tc.path, PathBuf::from("arm-"));
		assert_eq!(tc.tool_type, ToolType::Arm);
		assert!(GccToolchain::from_path(Path::new("TestPath")).is_err());
	}

	#[test]
	fn test_executables() {
		let bin = PathBuf::from("opt").join("arm-gnu-toolchain").join("bin");
		let tc = GccToolchain::new(&bin, ToolType::Arm);
		let exes = tc.executables(false);
		assert_eq!(exes.cc, bin.join("arm-none-eabi-gcc").to_string_lossy());
		assert_eq!(exes.cxx, bin.join("arm-none-eabi-g++").to_string_lossy());
		assert_eq!(exes.ar, bin.join("arm-none-eabi-ar").to_string_lossy());
		assert_eq!(exes.link, exes.cc);
		assert_eq!(tc.executables(true).link, exes.cxx);
	}
}
