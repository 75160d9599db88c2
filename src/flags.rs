//! Translation of per-configuration project keys into GCC command line flags.
//!
//! Flag order follows the order of the Atmel Studio property pages and is
//! preserved verbatim; later flags may override earlier ones at tool level.

use std::sync::OnceLock;

use regex::Regex;

use crate::{library::RefLibrary, misc::strip_empty_symbols, project::AtmelStudioProject};

fn opt_level_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"-O[0123s]").unwrap())
}

fn debug_level_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"-g[123]").unwrap())
}

/// Flags resolved for one conversion run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedFlags {
	pub cc_flags: Vec<String>,
	pub cxx_flags: Option<Vec<String>>,
	/// Linker flags for executables, archiver flags for static libraries.
	pub link_or_archive_flags: Vec<String>,
}

fn push_if(flags: &mut Vec<String>, cond: bool, flag: &str) {
	if cond {
		flags.push(flag.to_owned());
	}
}

fn push_text(flags: &mut Vec<String>, text: String) {
	if !text.is_empty() {
		flags.push(text);
	}
}

/// Merges caller and project defines, then removes `del_defs`.
///
/// # Panics
/// Panics if a name in `del_defs` occurs more than once in the merged list.
pub fn merge_defines(add_defs: &[String], project_defs: Vec<String>, del_defs: &[String]) -> Vec<String> {
	let mut inc_defs = strip_empty_symbols(add_defs);
	inc_defs.extend(project_defs);
	for del_def in del_defs {
		let count = inc_defs.iter().filter(|x| *x == del_def).count();
		if count > 0 {
			assert_eq!(count, 1, "define {} to remove occurs {} times", del_def, count);
			inc_defs.retain(|x| x != del_def);
		}
	}
	inc_defs
}

impl AtmelStudioProject {
	/// Flags of the C (`c_compiler == true`) or C++ compiler page.
	pub fn compiler_flags(
		&self,
		c_compiler: bool,
		add_defs: &[String],
		del_defs: &[String],
		add_undefs: &[String],
	) -> Vec<String> {
		let prefix = if c_compiler { "armgcc.compiler." } else { "armgcccpp.compiler." };
		let key = |name: &str| format!("{}{}", prefix, name);
		let flag = |name: &str| self.key_as_bool(&key(name), false);
		let mut flags = Vec::new();

		// General
		push_if(&mut flags, flag("general.ChangeDefaultCharTypeUnsigned"), "-funsigned-char");
		push_if(&mut flags, flag("general.ChangeDefaultBitFieldUnsigned"), "-funsigned-bitfields");
		// Preprocessor
		push_if(&mut flags, flag("general.DoNotSearchSystemDirectories"), "-nostdinc");
		push_if(&mut flags, flag("general.PreprocessOnly"), "-E");
		// Symbols
		let defines = merge_defines(add_defs, self.key_as_strlist(&key("symbols.DefSymbols"), "{}"), del_defs);
		flags.extend(defines.iter().map(|x| format!("-D{}", x)));
		let mut undefines = strip_empty_symbols(add_undefs);
		undefines.extend(self.key_as_strlist(&key("preprocessor.UndefSymbols"), "{}"));
		flags.extend(undefines.iter().map(|x| format!("-U{}", x)));
		// Directories
		flags.extend(self.key_as_strlist(&key("directories.IncludePaths"), "-I\"{}\""));
		// Optimization
		match self.key_raw(&key("optimization.level")) {
			Some(text) => {
				// Unrecognised level text emits nothing rather than a default.
				if let Some(m) = opt_level_re().find(text) {
					flags.push(m.as_str().to_owned());
				}
			}
			None => flags.push("-O0".to_owned()),
		}
		push_text(&mut flags, self.key_as_str(&key("optimization.OtherFlags"), "{}", ""));
		push_if(&mut flags, flag("optimization.PrepareFunctionsForGarbageCollection"), "-ffunction-sections");
		push_if(&mut flags, flag("optimization.PrepareDataForGarbageCollection"), "-fdata-sections");
		push_if(&mut flags, flag("optimization.EnableUnsafeMatchOptimizations"), "-funsafe-math-optimizations");
		push_if(&mut flags, flag("optimization.EnableFastMath"), "-ffast-math");
		push_if(&mut flags, flag("optimization.GeneratePositionIndependentCode"), "-fpic");
		push_if(&mut flags, self.key_as_bool(&key("optimization.EnableLongCalls"), true), "-mlong-calls");
		// Debugging
		if let Some(text) = self.key_raw(&key("optimization.DebugLevel")) {
			if let Some(m) = debug_level_re().find(text) {
				flags.push(m.as_str().to_owned());
			}
		}
		push_text(&mut flags, self.key_as_str(&key("optimization.OtherDebuggingFlags"), "{}", ""));
		push_if(&mut flags, flag("optimization.GenerateGprofInformation"), "-pg");
		push_if(&mut flags, flag("optimization.GenerateProfInformation"), "-p");
		// Warnings
		push_if(&mut flags, flag("warnings.AllWarnings"), "-Wall");
		push_if(&mut flags, flag("warnings.ExtraWarnings"), "-Wextra");
		push_if(&mut flags, flag("warnings.Undefined"), "-Wundef");
		push_if(&mut flags, flag("warnings.WarningsAsErrors"), "-Werror");
		push_if(&mut flags, flag("warnings.CheckSyntaxOnly"), "-fsyntax-only");
		push_if(&mut flags, flag("warnings.Pedantic"), "-pedantic");
		push_if(&mut flags, flag("warnings.PedanticWarningsAsErrors"), "-pedantic-errors");
		push_if(&mut flags, flag("warnings.InhibitAllWarnings"), "-w");
		// Miscellaneous
		push_text(&mut flags, self.key_as_str(&key("miscellaneous.OtherFlags"), "{}", ""));
		push_if(&mut flags, flag("miscellaneous.Verbose"), "-v");
		push_if(&mut flags, flag("miscellaneous.SupportAnsiPrograms"), "-ansi");

		log::debug!("{}compiler flags: {}", if c_compiler { "C " } else { "C++ " }, flags.join(" "));
		flags
	}

	/// Linker page flags. `outdir` is the name of the build output directory,
	/// which referenced projects are assumed to share.
	pub fn linker_flags(&self, outdir: &str) -> Vec<String> {
		let prefix = format!("{}.linker.", self.toolchain_settings.key_prefix());
		let key = |name: &str| format!("{}{}", prefix, name);
		let flag = |name: &str| self.key_as_bool(&key(name), false);
		let mut flags = Vec::new();

		// General
		push_if(&mut flags, flag("general.DoNotUseStandardStartFiles"), "-nostartfiles");
		push_if(&mut flags, flag("general.DoNotUseDefaultLibraries"), "-nodefaultlibs");
		push_if(&mut flags, flag("general.NoStartupOrDefaultLibs"), "-nostdlib");
		push_if(&mut flags, flag("general.OmitAllSymbolInformation"), "-s");
		push_if(&mut flags, flag("general.NoSharedLibraries"), "-static");
		if self.key_as_bool(&key("general.GenerateMAPFile"), true) {
			flags.push(format!("-Wl,-Map=\"{}.map\"", self.output_name));
		}
		push_if(&mut flags, flag("general.UseNewlibNano"), "--specs=nano.specs");
		// Libraries
		let mut inc_libs = self.key_as_strlist(&key("libraries.Libraries"), "{}");
		inc_libs.extend(self.ref_libs.iter().map(|x| x.raw_name.clone()));
		let group = inc_libs
			.iter()
			.map(|x| format!(" -l{}", RefLibrary::extract_name(x)))
			.collect::<String>();
		flags.push(format!("-Wl,--start-group{} -Wl,--end-group", group));
		flags.extend(self.key_as_strlist(&key("libraries.LibrarySearchPaths"), "-L\"{}\""));
		flags.extend(self.ref_libs.iter().map(|x| format!("-L\"../{}/{}\"", x.path, outdir)));
		// Optimization
		push_if(&mut flags, flag("optimization.GarbageCollectUnusedSections"), "-Wl,--gc-sections");
		push_if(&mut flags, flag("optimization.EnableUnsafeMatchOptimizations"), "-funsafe-math-optimizations");
		push_if(&mut flags, flag("optimization.EnableFastMath"), "-ffast-math");
		push_if(&mut flags, flag("optimization.GeneratePositionIndependentCode"), "-fpic");
		// Miscellaneous
		push_text(&mut flags, self.key_as_str(&key("miscellaneous.LinkerFlags"), "{}", ""));
		flags.extend(self.key_as_strlist(&key("miscellaneous.OtherOptions"), "-Xlinker {}"));
		flags.extend(self.key_as_strlist(&key("miscellaneous.OtherObjects"), "{}"));

		log::debug!("linker flags: {}", flags.join(" "));
		flags
	}

	pub fn archiver_flags(&self) -> Vec<String> {
		let key = format!("{}.archiver.general.ArchiverFlags", self.toolchain_settings.key_prefix());
		vec![self.key_as_str(&key, "{}", "-r")]
	}

	/// Resolves every flag group the selected configuration needs.
	/// `flags` are caller supplied and prepended to compiler and linker flags.
	pub fn resolve_flags(
		&self,
		flags: &[String],
		add_defs: &[String],
		del_defs: &[String],
		outdir: &str,
	) -> ResolvedFlags {
		let mut cc_flags = flags.to_vec();
		cc_flags.extend(self.compiler_flags(true, add_defs, del_defs, &[]));
		let cxx_flags = self.is_cpp.then(|| {
			let mut cxx_flags = flags.to_vec();
			cxx_flags.extend(self.compiler_flags(false, add_defs, del_defs, &[]));
			cxx_flags
		});
		let link_or_archive_flags = if self.is_lib {
			self.archiver_flags()
		} else {
			let mut lflags = flags.to_vec();
			lflags.extend(self.linker_flags(outdir));
			lflags
		};
		ResolvedFlags { cc_flags, cxx_flags, link_or_archive_flags }
	}
}
