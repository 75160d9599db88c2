use std::{
	collections::HashMap, //
	fs,
	path::Path,
};

use roxmltree::{Document, Node};

use crate::{
	error::ProjectError,
	library::RefLibrary,
	misc::{split_ext, split_path, to_forward_slashes},
};

pub const SUPPORTED_SCHEMA_VERSION: &str = "2.0";
const PROJECT_NAME_VAR: &str = "$(MSBuildProjectName)";

/// Settings element holding the per-configuration GCC keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolchainSettings {
	ArmGcc,
	ArmGccCpp,
}

impl ToolchainSettings {
	pub fn element_name(&self) -> &'static str {
		match self {
			ToolchainSettings::ArmGcc => "ArmGcc",
			ToolchainSettings::ArmGccCpp => "ArmGccCpp",
		}
	}

	/// Prefix of the linker and archiver keys, e.g. `armgcccpp`.
	pub fn key_prefix(&self) -> &'static str {
		match self {
			ToolchainSettings::ArmGcc => "armgcc",
			ToolchainSettings::ArmGccCpp => "armgcccpp",
		}
	}
}

/// `(ProjectVersion, ToolchainName, ToolchainFlavour)` as written by Atmel Studio.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolchainId {
	pub project_version: String,
	pub name: String,
	pub flavour: String,
}

#[derive(Clone, Debug, Default)]
struct Key {
	text: Option<String>,
	values: Vec<String>,
}

#[derive(Clone, Debug)]
struct ConfigGroup {
	name: String,
	keys: HashMap<String, Key>,
}

/// An Atmel Studio `.cproj` file.
///
/// Identity fields are fixed at load time. Key lookups go through the
/// configuration picked by [`select_config`](Self::select_config); the
/// selection may be changed any number of times.
#[derive(Clone, Debug)]
pub struct AtmelStudioProject {
	pub is_cpp: bool,
	pub is_lib: bool,
	pub output_name: String,
	pub output_ext: String,
	pub toolchain_settings: ToolchainSettings,
	pub ref_libs: Vec<RefLibrary>,
	toolchain_id: ToolchainId,
	src_files: Vec<String>,
	config_groups: Vec<ConfigGroup>,
	config_group: Option<usize>,
}

impl AtmelStudioProject {
	pub fn from_file(file_name: &Path, output: &str) -> Result<Self, ProjectError> {
		let source = fs::read_to_string(file_name)?;
		Self::parse(&source, output)
	}

	/// Parses project XML. `output` replaces `$(MSBuildProjectName)` in the output file name.
	pub fn parse(source: &str, output: &str) -> Result<Self, ProjectError> {
		let doc = Document::parse(source)?;
		let root = doc.root_element();

		let schema_version = property(root, "SchemaVersion").unwrap_or_default();
		if schema_version != SUPPORTED_SCHEMA_VERSION {
			return Err(ProjectError::UnsupportedSchema(schema_version));
		}
		let is_cpp = property(root, "Language").ok_or(ProjectError::MissingKey("Language"))? == "CPP";
		let is_lib = property(root, "OutputType").ok_or(ProjectError::MissingKey("OutputType"))? == "StaticLibrary";
		let output_name = property(root, "OutputFileName")
			.ok_or(ProjectError::MissingKey("OutputFileName"))?
			.replace(PROJECT_NAME_VAR, output);
		let output_ext = property(root, "OutputFileExtension").ok_or(ProjectError::MissingKey("OutputFileExtension"))?;
		let toolchain_settings = if is_cpp { ToolchainSettings::ArmGccCpp } else { ToolchainSettings::ArmGcc };
		let toolchain_id = ToolchainId {
			project_version: property(root, "ProjectVersion").unwrap_or_default(),
			name: property(root, "ToolchainName").unwrap_or_default(),
			flavour: property(root, "ToolchainFlavour").unwrap_or_default(),
		};

		let mut ref_libs = Vec::new();
		for include in item_includes(root, "ProjectReference") {
			let (path, prj_name) = split_path(&include);
			let (raw_name, _) = split_ext(prj_name);
			ref_libs.push(RefLibrary::new(path, raw_name)?);
		}
		let src_files = item_includes(root, "Compile");

		let config_groups = root
			.children()
			.filter(|n| n.has_tag_name("PropertyGroup"))
			.filter_map(|group| {
				let name = configuration_name(group.attribute("Condition")?)?;
				Some(ConfigGroup { name: name.to_owned(), keys: settings_keys(group, toolchain_settings) })
			})
			.collect::<Vec<_>>();
		log::debug!(
			"project configurations: {}",
			config_groups.iter().map(|x| x.name.as_str()).collect::<Vec<_>>().join(", ")
		);

		Ok(AtmelStudioProject {
			is_cpp,
			is_lib,
			output_name,
			output_ext,
			toolchain_settings,
			ref_libs,
			toolchain_id,
			src_files,
			config_groups,
			config_group: None,
		})
	}

	/// Output file name including extension, e.g. `Korsar3.elf`.
	pub fn output(&self) -> String {
		format!("{}{}", self.output_name, self.output_ext)
	}

	pub fn toolchain_id(&self) -> &ToolchainId {
		&self.toolchain_id
	}

	/// Selects the configuration named `config_name`. Returns `false` and
	/// clears the selection when the project has no such configuration.
	pub fn select_config(&mut self, config_name: &str) -> bool {
		self.config_group = self.config_groups.iter().position(|x| x.name == config_name);
		self.config_group.is_some()
	}

	pub fn selected_config(&self) -> Option<&str> {
		self.config_group.map(|i| self.config_groups[i].name.as_str())
	}

	fn key(&self, name: &str) -> Option<&Key> {
		let index = match self.config_group {
			Some(x) => x,
			None => panic!("No configuration selected while reading key {}", name),
		};
		self.config_groups[index].keys.get(name)
	}

	/// Raw text of a key in the selected configuration.
	///
	/// # Panics
	/// Panics if no configuration is selected. The same holds for every `key_*` accessor.
	pub fn key_raw(&self, name: &str) -> Option<&str> {
		self.key(name).map(|x| x.text.as_deref().unwrap_or(""))
	}

	pub fn key_as_bool(&self, name: &str, default: bool) -> bool {
		match self.key_raw(name) {
			Some(text) => text == "True",
			None => default,
		}
	}

	/// Substitutes the key text for `{}` in `fmt`, or returns `default` if the key is absent.
	pub fn key_as_str(&self, name: &str, fmt: &str, default: &str) -> String {
		match self.key_raw(name) {
			Some(text) => fmt.replace("{}", text),
			None => default.to_owned(),
		}
	}

	/// Formats every `ListValues/Value` entry of a key. Absent keys give an empty list.
	pub fn key_as_strlist(&self, name: &str, fmt: &str) -> Vec<String> {
		match self.key(name) {
			Some(key) => key.values.iter().map(|x| fmt.replace("{}", x)).collect(),
			None => Vec::new(),
		}
	}

	/// Compile items in project order, with `/` separators.
	pub fn src_files(&self) -> &[String] {
		&self.src_files
	}
}

fn property(root: Node, name: &str) -> Option<String> {
	root.descendants()
		.filter(|n| n.has_tag_name("PropertyGroup"))
		.flat_map(|group| group.children())
		.find(|n| n.has_tag_name(name))
		.map(|n| n.text().unwrap_or("").to_owned())
}

fn item_includes(root: Node, item: &str) -> Vec<String> {
	root.descendants()
		.filter(|n| n.has_tag_name("ItemGroup"))
		.flat_map(|group| group.children())
		.filter(|n| n.has_tag_name(item))
		.filter_map(|n| n.attribute("Include"))
		.map(to_forward_slashes)
		.collect()
}

/// Extracts `Debug` from ` '$(Configuration)' == 'Debug' `.
fn configuration_name(condition: &str) -> Option<&str> {
	condition
		.trim()
		.strip_prefix("'$(Configuration)' == '")?
		.strip_suffix('\'')
		.filter(|x| !x.contains('\''))
}

fn settings_keys(group: Node, settings: ToolchainSettings) -> HashMap<String, Key> {
	let mut keys = HashMap::new();
	for settings_node in group.descendants().filter(|n| n.has_tag_name(settings.element_name())) {
		for key_node in settings_node.children().filter(Node::is_element) {
			let values = key_node
				.children()
				.filter(|n| n.has_tag_name("ListValues"))
				.flat_map(|list| list.children())
				.filter(|n| n.has_tag_name("Value"))
				.map(|n| n.text().unwrap_or("").to_owned())
				.collect();
			let key = Key { text: key_node.text().map(str::to_owned), values };
			keys.entry(key_node.tag_name().name().to_owned()).or_insert(key);
		}
	}
	keys
}
