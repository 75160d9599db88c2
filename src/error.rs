use std::io;

use thiserror::Error;

const TOOLCHAIN_HINT: &str = "You can set toolchain explicitly with --gcc_toolchain";

/// Errors raised while loading an Atmel Studio project file.
#[derive(Debug, Error)]
pub enum ProjectError {
	#[error("Error reading project file: {0}")]
	Io(#[from] io::Error),

	#[error("Error parsing project file: {0}")]
	Xml(#[from] roxmltree::Error),

	#[error("Unsupported project schema version {0:?}")]
	UnsupportedSchema(String),

	#[error("Project file has no <{0}> element")]
	MissingKey(&'static str),

	#[error("Referenced library name \"{0}\" must not carry the \"lib\" prefix or \".a\" suffix")]
	InvalidLibraryName(String),

	#[error("Undefined config in project: {0}")]
	UndefinedConfiguration(String),
}

/// Errors raised while locating the GCC executables.
#[derive(Debug, Error)]
pub enum ToolchainError {
	#[error("Unsupported toolchain {0}. {hint}", hint = TOOLCHAIN_HINT)]
	UnsupportedToolchain(String),

	#[error("Unsupported project version {0}. {hint}", hint = TOOLCHAIN_HINT)]
	UnsupportedProjectVersion(String),

	#[error("Path to Atmel Studio {0} not detected. {hint}", hint = TOOLCHAIN_HINT)]
	StudioNotFound(String),

	#[error("Path to non-native toolchain flavour {flavour} of {name} not detected. {hint}", hint = TOOLCHAIN_HINT)]
	ToolchainNotFound { name: String, flavour: String },
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn toolchain_errors_suggest_override() {
		let errors = [
			ToolchainError::UnsupportedToolchain("com.Atmel.MIPS".to_owned()),
			ToolchainError::UnsupportedProjectVersion("5.1".to_owned()),
			ToolchainError::StudioNotFound("7.0".to_owned()),
			ToolchainError::ToolchainNotFound { name: "com.Atmel.ARMGCC.C".to_owned(), flavour: "GCC-5".to_owned() },
		];
		for e in errors {
			let msg = e.to_string();
			assert!(msg.ends_with(TOOLCHAIN_HINT), "{}", msg);
		}
		assert!(ToolchainError::UnsupportedProjectVersion("5.1".to_owned()).to_string().contains("5.1"));
	}
}
