use crate::error::ProjectError;

pub const LIB_PREFIX: &str = "lib";
pub const LIB_EXT: &str = ".a";

/// A sibling project whose static library output this project links against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefLibrary {
	/// Directory of the referenced project, relative to this project, with `/` separators.
	pub path: String,
	/// Library name without the `lib` prefix and `.a` extension.
	pub raw_name: String,
}

impl RefLibrary {
	/// Only a leading `lib` or a trailing `.a` is rejected, so names such as `Calibration` are valid.
	pub fn new(path: impl Into<String>, raw_name: impl Into<String>) -> Result<Self, ProjectError> {
		let raw_name = raw_name.into();
		if raw_name.starts_with(LIB_PREFIX) || raw_name.ends_with(LIB_EXT) {
			return Err(ProjectError::InvalidLibraryName(raw_name));
		}
		Ok(RefLibrary { path: path.into(), raw_name })
	}

	pub fn lib_name(&self, with_ext: bool) -> String {
		if with_ext {
			format!("{}{}{}", LIB_PREFIX, self.raw_name, LIB_EXT)
		} else {
			format!("{}{}", LIB_PREFIX, self.raw_name)
		}
	}

	/// Location of the archive built for `config_dir`, relative to this project.
	pub fn full_name(&self, config_dir: &str) -> String {
		format!("{}/{}/{}", self.path, config_dir, self.lib_name(true))
	}

	/// Reduces `libFoo.a`, `libFoo` or `Foo.a` to `Foo`.
	pub fn extract_name(lib_name: &str) -> &str {
		let name = lib_name.strip_prefix(LIB_PREFIX).unwrap_or(lib_name);
		name.strip_suffix(LIB_EXT).unwrap_or(name)
	}
}
