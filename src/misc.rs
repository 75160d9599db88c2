use std::path::Path;

const UPDIR: &str = "../";

/// Removes every leading `../` from `file_name`.
///
/// Any name starting with `..` loses three characters per step, so a
/// malformed `..Path` becomes `ath`.
pub fn strip_updir(file_name: &str) -> &str {
	let mut name = file_name;
	while name.starts_with("..") {
		name = name.get(UPDIR.len()..).unwrap_or("");
	}
	name
}

pub fn strip_empty_symbols(symbols: &[String]) -> Vec<String> {
	symbols.iter().filter(|x| !x.is_empty()).cloned().collect()
}

pub fn to_forward_slashes(path: &str) -> String {
	path.replace('\\', "/")
}

/// Splits `a/b/name.ext` into (`a/b`, `name.ext`).
pub(crate) fn split_path(path: &str) -> (&str, &str) {
	match path.rfind('/') {
		Some(pos) => (&path[..pos], &path[pos + 1..]),
		None => ("", path),
	}
}

/// Splits `a/b/name.ext` into (`a/b/name`, `.ext`). The dot of a leading
/// dot-file is not treated as an extension.
pub(crate) fn split_ext(path: &str) -> (&str, &str) {
	let (_, file_name) = split_path(path);
	match file_name.rfind('.') {
		Some(0) | None => (path, ""),
		Some(pos) => {
			let split_at = path.len() - file_name.len() + pos;
			(&path[..split_at], &path[split_at..])
		}
	}
}

pub(crate) fn is_c_source(ext: &str) -> bool {
	ext == ".c"
}

pub(crate) fn is_cpp_source(ext: &str) -> bool {
	matches!(ext, ".cpp" | ".cc" | ".cxx")
}

pub(crate) fn file_stem(path: &Path) -> Option<String> {
	path.file_stem().map(|x| x.to_string_lossy().into_owned())
}
