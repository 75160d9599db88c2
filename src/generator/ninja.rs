use std::{
	collections::HashSet,
	fs,
	io::{self, BufWriter, Write},
	path::{Path, PathBuf}, //
};

use super::writer::{NinjaBuild, NinjaFile, NinjaRspFile, NinjaRule};
use crate::{
	flags::ResolvedFlags,
	misc::{is_c_source, is_cpp_source, split_ext, strip_updir},
	project::AtmelStudioProject,
	toolchain::Executables,
};

const BUILD_FILE: &str = "build.ninja";

/// Quotes an executable path that would otherwise split the command line.
fn command_exe(exe: &str) -> String {
	if exe.contains(char::is_whitespace) {
		format!("\"{}\"", exe)
	} else {
		exe.to_owned()
	}
}

fn compile_rule(name: &str, command: String) -> NinjaRule {
	NinjaRule {
		name: name.to_owned(),
		command,
		description: Some(format!("{} $out", name)),
		depfile: Some("$out.d".to_owned()),
		rspfile: None,
		deps: Some("gcc".to_owned()),
	}
}

/// Finds the linker script passed with `-T`. The last occurrence wins.
///
/// The script is taken relative to the sibling build directory, so a single
/// leading `../` is removed to make it relative to the project directory.
pub fn detect_linker_script(lflags: &[String]) -> Option<String> {
	let mut linker_script = None;
	for lflag in lflags {
		for (pos, _) in lflag.match_indices("-T") {
			let rest = &lflag[pos + 2..];
			let script = rest.split(' ').next().unwrap_or(rest);
			linker_script = Some(script.strip_prefix("../").unwrap_or(script).to_owned());
		}
	}
	linker_script
}

pub struct Ninja {}

impl Ninja {
	/// Builds the ninja graph for the selected configuration of `asp`.
	///
	/// `outdir` is the name of the build directory; referenced projects are
	/// expected to be built into a directory of the same name.
	///
	/// # Panics
	/// Panics if a C++ source file is listed in a C project.
	pub fn graph(
		asp: &AtmelStudioProject,
		flags: &ResolvedFlags,
		exes: &Executables,
		outdir: &str,
	) -> Result<NinjaFile, String> {
		let mut nw = NinjaFile::default();

		nw.variable("ninja_required_version", "1.3");
		nw.newline();

		nw.variable("builddir", ".");
		nw.variable("src", "$builddir/..");
		nw.newline();

		if !asp.ref_libs.is_empty() {
			for ref_lib in &asp.ref_libs {
				nw.comment(format!("subninja $builddir/../{}/{}/{}", ref_lib.path, outdir, BUILD_FILE));
			}
			nw.newline();
		}

		nw.variable_list("ccflags", &flags.cc_flags);
		nw.newline();

		let cc = command_exe(&exes.cc);
		nw.rule(compile_rule("cc", format!("{} -x c -c $ccflags -MD -MF $out.d -MT $out -o $out $in", cc)));
		nw.newline();

		if asp.is_cpp {
			nw.variable_list("cxxflags", flags.cxx_flags.as_deref().unwrap_or_default());
			nw.newline();

			let cxx = command_exe(&exes.cxx);
			nw.rule(compile_rule("cxx", format!("{} -c $cxxflags -MD -MF $out.d -MT $out -o $out $in", cxx)));
			nw.newline();
		}

		if asp.is_lib {
			nw.variable_list("arflags", &flags.link_or_archive_flags);
			nw.newline();

			nw.rule(NinjaRule {
				name: "ar".to_owned(),
				command: format!("{} $arflags -c -o $out $in", command_exe(&exes.ar)),
				description: Some("ar $out".to_owned()),
				..Default::default()
			});
		} else {
			nw.variable_list("lflags", &flags.link_or_archive_flags);
			nw.newline();

			nw.rule(NinjaRule {
				name: "link".to_owned(),
				command: format!("{} -o $out @$out.rsp $lflags", command_exe(&exes.link)),
				description: Some("link $out".to_owned()),
				rspfile: Some(NinjaRspFile { rspfile: "$out.rsp".to_owned(), rspfile_content: "$in".to_owned() }),
				..Default::default()
			});
		}
		nw.newline();

		let mut obj_files = Vec::new();
		let mut seen = HashSet::new();
		for src_file in asp.src_files() {
			let (stem, ext) = split_ext(src_file);
			let rule = if is_c_source(ext) {
				"cc"
			} else if is_cpp_source(ext) {
				assert!(asp.is_cpp, "C++ source {} in a C project", src_file);
				"cxx"
			} else {
				log::warn!("Skipping file {}", src_file);
				continue;
			};
			let obj_file = format!("$builddir/{}.o", strip_updir(stem));
			if !seen.insert(obj_file.clone()) {
				return Err(format!("Object file {} of {} is produced twice", obj_file, src_file));
			}
			obj_files.extend(nw.build(NinjaBuild {
				outputs: vec![obj_file],
				rule: rule.to_owned(),
				inputs: vec![format!("$src/{}", src_file)],
				implicit: Vec::new(),
			}));
		}
		log::debug!("{} object files", obj_files.len());

		if obj_files.is_empty() {
			return Ok(nw);
		}
		nw.newline();

		let output = format!("$builddir/{}", asp.output());
		let def_target = if asp.is_lib {
			nw.build(NinjaBuild { outputs: vec![output], rule: "ar".to_owned(), inputs: obj_files, implicit: Vec::new() })
		} else {
			let mut implicit = Vec::new();
			if let Some(linker_script) = detect_linker_script(&flags.link_or_archive_flags) {
				log::info!("linker script: {}", linker_script);
				implicit.push(format!("$src/{}", linker_script));
			}
			for lib in &asp.ref_libs {
				implicit.push(format!("$builddir/../{}", lib.full_name(outdir)));
			}
			nw.build(NinjaBuild { outputs: vec![output], rule: "link".to_owned(), inputs: obj_files, implicit })
		};
		nw.newline();

		nw.default_target(def_target);
		Ok(nw)
	}

	/// Writes the graph to `build.ninja` in `build_dir`, creating the directory if needed.
	pub fn generate(
		asp: &AtmelStudioProject,
		flags: &ResolvedFlags,
		exes: &Executables,
		build_dir: &Path,
		outdir: &str,
	) -> Result<(), String> {
		let nw = Ninja::graph(asp, flags, exes, outdir)?;

		if let Err(e) = fs::create_dir_all(build_dir) {
			return Err(format!("Error creating directory {}: {}", build_dir.display(), e));
		}
		let path = build_dir.join(BUILD_FILE);
		if let Err(e) = replace_file(&path, |writer| nw.write_to(writer)) {
			return Err(format!("Error writing {}: {}", path.display(), e));
		}
		log::info!("Wrote {}", path.display());
		Ok(())
	}
}

/// Writes into `<path>.tmp` and renames it over `path` once complete, so a
/// failed write never leaves a truncated file behind.
fn replace_file(path: &Path, write: impl FnOnce(&mut BufWriter<fs::File>) -> io::Result<()>) -> io::Result<()> {
	let mut tmp_name = path.as_os_str().to_owned();
	tmp_name.push(".tmp");
	let tmp_path = PathBuf::from(tmp_name);

	let result = fs::File::create(&tmp_path).and_then(|file| {
		let mut writer = BufWriter::new(file);
		write(&mut writer)?;
		writer.flush()
	});
	let result = result.and_then(|_| fs::rename(&tmp_path, path));
	if result.is_err() {
		let _ = fs::remove_file(&tmp_path);
	}
	result
}
