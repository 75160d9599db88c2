use std::path::PathBuf;

use super::{registry::RegistryLookup, GccToolchain, ToolType};
use crate::{error::ToolchainError, project::ToolchainId};

const NATIVE_FLAVOUR: &str = "Native";

/// `bin` directories relative to the Atmel Studio 6.2 install directory.
fn as62_suffix(tool_type: ToolType) -> &'static [&'static str] {
	match tool_type {
		ToolType::Arm => &["..", "Atmel Toolchain", "ARM GCC", "Native", "4.8.1437", "arm-gnu-toolchain", "bin"],
		ToolType::Avr32 => &["..", "Atmel Toolchain", "AVR32 GCC", "Native", "3.4.1067", "avr32-gnu-toolchain", "bin"],
		ToolType::Avr8 => &["..", "Atmel Toolchain", "AVR8 GCC", "Native", "3.4.1061", "avr8-gnu-toolchain", "bin"],
	}
}

/// `bin` directories relative to the Atmel Studio 7.0 install directory.
fn as70_suffix(tool_type: ToolType) -> &'static [&'static str] {
	match tool_type {
		ToolType::Arm => &["toolchain", "arm", "arm-gnu-toolchain", "bin"],
		ToolType::Avr32 => &["toolchain", "avr32", "avr32-gnu-toolchain", "bin"],
		ToolType::Avr8 => &["toolchain", "avr8", "avr8-gnu-toolchain", "bin"],
	}
}

fn native_tool_type(toolchain_name: &str) -> Result<ToolType, ToolchainError> {
	if toolchain_name.contains("ARMGCC") {
		Ok(ToolType::Arm)
	} else if toolchain_name.contains("AVR32GCC") {
		Ok(ToolType::Avr32)
	} else if toolchain_name.contains("AVR8GCC") {
		Ok(ToolType::Avr8)
	} else {
		Err(ToolchainError::UnsupportedToolchain(toolchain_name.to_owned()))
	}
}

/// Locates the toolchain a project was configured with.
///
/// Native toolchains ship with Atmel Studio and live at a fixed place below
/// its install directory. Other flavours are registered toolchain packages
/// with their own base path.
pub fn from_project(id: &ToolchainId, registry: &dyn RegistryLookup) -> Result<GccToolchain, ToolchainError> {
	log::debug!("toolchain id: {} {} {}", id.project_version, id.name, id.flavour);
	let toolchain = if id.flavour == NATIVE_FLAVOUR {
		let tool_type = native_tool_type(&id.name)?;
		let suffix = match id.project_version.as_str() {
			"6.2" => as62_suffix(tool_type),
			"7.0" => as70_suffix(tool_type),
			version => return Err(ToolchainError::UnsupportedProjectVersion(version.to_owned())),
		};
		let key_name = format!("Software\\Atmel\\AtmelStudio\\{}_Config", id.project_version);
		let as_dir = registry
			.read(&key_name, "InstallDir")
			.filter(|x| !x.is_empty())
			.ok_or_else(|| ToolchainError::StudioNotFound(id.project_version.clone()))?;
		log::info!("Atmel Studio {} install dir: {}", id.project_version, as_dir);
		let path = suffix.iter().fold(PathBuf::from(as_dir), |path, x| path.join(x));
		GccToolchain::new(path, tool_type)
	} else {
		let key_name = format!(
			"Software\\Atmel\\AtmelStudio\\{}\\ToolchainPackages\\{}\\{}",
			id.project_version, id.name, id.flavour
		);
		let path = registry
			.read(&key_name, "BasePath")
			.filter(|x| !x.is_empty())
			.ok_or_else(|| ToolchainError::ToolchainNotFound { name: id.name.clone(), flavour: id.flavour.clone() })?;
		GccToolchain::from_path(&PathBuf::from(path))?
	};
	log::info!("toolchain: {}", toolchain.path.display());
	Ok(toolchain)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::toolchain::registry::StaticRegistry;

	fn id(version: &str, name: &str, flavour: &str) -> ToolchainId {
		ToolchainId { project_version: version.to_owned(), name: name.to_owned(), flavour: flavour.to_owned() }
	}

	fn registry(entries: &[(&str, &str, &str)]) -> StaticRegistry {
		let mut registry = StaticRegistry::default();
		for (key, value, data) in entries {
			registry.keys.entry(key.to_string()).or_default().insert(value.to_string(), data.to_string());
		}
		registry
	}

	#[test]
	fn native_as62() {
		let reg = registry(&[("Software\\Atmel\\AtmelStudio\\6.2_Config", "InstallDir", "DUMMY_PATH")]);
		let tc = from_project(&id("6.2", "com.Atmel.ARMGCC.C", "Native"), &reg).unwrap();
		let expected = ["..", "Atmel Toolchain", "ARM GCC", "Native", "4.8.1437", "arm-gnu-toolchain", "bin"]
			.iter()
			.fold(PathBuf::from("DUMMY_PATH"), |p, x| p.join(x));
		assert_eq!(tc.path, expected);
		assert_eq!(tc.tool_type, ToolType::Arm);
	}

	#[test]
	fn native_as70() {
		let reg = registry(&[("Software\\Atmel\\AtmelStudio\\7.0_Config", "InstallDir", "AS7")]);
		let tc = from_project(&id("7.0", "com.Atmel.AVR8GCC.C", "Native"), &reg).unwrap();
		assert_eq!(tc.path, PathBuf::from("AS7").join("toolchain").join("avr8").join("avr8-gnu-toolchain").join("bin"));
		assert_eq!(tc.tool_type, ToolType::Avr8);
	}

	#[test]
	fn native_errors() {
		let reg = registry(&[]);
		assert!(matches!(
			from_project(&id("6.2", "com.Atmel.MIPSGCC.C", "Native"), &reg),
			Err(ToolchainError::UnsupportedToolchain(_))
		));
		assert!(matches!(
			from_project(&id("6.1", "com.Atmel.ARMGCC.C", "Native"), &reg),
			Err(ToolchainError::UnsupportedProjectVersion(v)) if v == "6.1"
		));
		assert!(matches!(
			from_project(&id("7.0", "com.Atmel.ARMGCC.C", "Native"), &reg),
			Err(ToolchainError::StudioNotFound(_))
		));
	}

	#[test]
	fn package_flavour() {
		let key = "Software\\Atmel\\AtmelStudio\\7.0\\ToolchainPackages\\com.Atmel.ARMGCC.C\\arm-gnu-toolchain-6";
		let reg = registry(&[(key, "BasePath", "/opt/arm-gnu-toolchain-6/bin")]);
		let tc = from_project(&id("7.0", "com.Atmel.ARMGCC.C", "arm-gnu-toolchain-6"), &reg).unwrap();
		assert_eq!(tc.path, PathBuf::from("/opt/arm-gnu-toolchain-6/bin"));
		assert_eq!(tc.tool_type, ToolType::Arm);

		assert!(matches!(
			from_project(&id("7.0", "com.Atmel.ARMGCC.C", "Other"), &reg),
			Err(ToolchainError::ToolchainNotFound { .. })
		));
	}
}
