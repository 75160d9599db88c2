use std::{
	fs,
	path::{Path, PathBuf},
};

use pretty_assertions::assert_eq;

use asninja::{
	config::Settings,
	generator::{Ninja, NinjaFile},
	project::AtmelStudioProject,
	toolchain::{GccToolchain, ToolType},
	ConvertOptions,
};

fn korsar3_path() -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data").join("Korsar3.cproj")
}

fn project_xml(output_type: &str, linker_flags: &str, sources: &[&str], refs: &[&str]) -> String {
	let compile = sources.iter().map(|x| format!("    <Compile Include=\"{}\" />\n", x)).collect::<String>();
	let references = refs
		.iter()
		.map(|x| format!("    <ProjectReference Include=\"{}\"><Name>x</Name></ProjectReference>\n", x))
		.collect::<String>();
	format!(
		r#"<?xml version="1.0" encoding="utf-8"?>
<Project DefaultTargets="Build" xmlns="http://schemas.microsoft.com/developer/msbuild/2003" ToolsVersion="14.0">
  <PropertyGroup>
    <SchemaVersion>2.0</SchemaVersion>
    <ProjectVersion>7.0</ProjectVersion>
    <ToolchainName>com.Atmel.ARMGCC.C</ToolchainName>
    <ToolchainFlavour>Native</ToolchainFlavour>
    <OutputType>{}</OutputType>
    <Language>C</Language>
    <OutputFileName>$(MSBuildProjectName)</OutputFileName>
    <OutputFileExtension>.a</OutputFileExtension>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)' == 'Debug' ">
    <ToolchainSettings>
      <ArmGcc>
        <armgcc.linker.miscellaneous.LinkerFlags>{}</armgcc.linker.miscellaneous.LinkerFlags>
      </ArmGcc>
    </ToolchainSettings>
  </PropertyGroup>
  <ItemGroup>
{}  </ItemGroup>
  <ItemGroup>
{}  </ItemGroup>
</Project>
"#,
		output_type, linker_flags, compile, references
	)
}

fn graph(source: &str, outdir: &str) -> NinjaFile {
	let mut asp = AtmelStudioProject::parse(source, "Test").unwrap();
	assert!(asp.select_config("Debug"));
	let flags = asp.resolve_flags(&[], &[], &[], outdir);
	let exes = GccToolchain::new("bin", ToolType::Arm).executables(asp.is_cpp);
	Ninja::graph(&asp, &flags, &exes, outdir).unwrap()
}

#[test]
fn static_library_graph() {
	let source = project_xml("StaticLibrary", "", &["src\\lib.c"], &["..\\A\\A.cproj", "..\\B\\B.cproj"]);
	let nw = graph(&source, "Debug");

	let objs = nw.builds().filter(|x| x.rule == "cc").count();
	assert_eq!(objs, 1);
	let terminal = nw.builds().filter(|x| x.rule == "ar" || x.rule == "link").collect::<Vec<_>>();
	assert_eq!(terminal.len(), 1);
	assert_eq!(terminal[0].rule, "ar");
	assert!(terminal[0].implicit.is_empty());
	assert_eq!(terminal[0].outputs, ["$builddir/Test.a"]);
	assert!(nw.rules().all(|x| x.name != "link"));
}

#[test]
fn executable_graph() {
	let source = project_xml("Executable", "-T../link.ld", &["main.c", "inc\\main.h"], &["..\\Center\\Center.cproj"]);
	let nw = graph(&source, "Debug");

	let link = nw.builds().filter(|x| x.rule == "link").collect::<Vec<_>>();
	assert_eq!(link.len(), 1);
	assert_eq!(link[0].inputs, ["$builddir/main.o"]);
	assert_eq!(link[0].implicit, ["$src/link.ld", "$builddir/../../Center/Debug/libCenter.a"]);
	assert_eq!(nw.defaults().count(), 1);
	assert!(nw.rules().all(|x| x.name != "ar"));
}

#[test]
fn no_sources_no_terminal_edge() {
	let source = project_xml("Executable", "", &[], &["..\\Center\\Center.cproj"]);
	let nw = graph(&source, "Debug");
	assert_eq!(nw.builds().count(), 0);
	assert_eq!(nw.defaults().count(), 0);
	assert!(nw.rules().any(|x| x.name == "link"));
}

#[test]
#[should_panic(expected = "C++ source")]
fn cpp_source_in_c_project() {
	let source = project_xml("Executable", "", &["main.cpp"], &[]);
	graph(&source, "Debug");
}

#[test]
fn convert_korsar3() {
	let dir = tempfile::tempdir().unwrap();
	let outpath = dir.path().join("Debug");
	let opts = ConvertOptions {
		prj: korsar3_path(),
		config: "Debug".to_owned(),
		outpath: Some(outpath.clone()),
		gcc_toolchain: Some(PathBuf::from("arm-gnu-toolchain")),
		..Default::default()
	};
	let path = asninja::convert(&opts, &Settings::default()).unwrap();
	assert_eq!(path, outpath.join("build.ninja"));

	let text = fs::read_to_string(&path).unwrap();
	let cc = Path::new("arm-gnu-toolchain").join("arm-none-eabi-gcc");
	assert!(text.starts_with("ninja_required_version = 1.3\n\nbuilddir = .\nsrc = $builddir/..\n\n"));
	assert!(text.contains(
		"# subninja $builddir/../../Center/Debug/build.ninja\n# subninja $builddir/../../Balancing/Debug/build.ninja\n"
	));
	assert!(text.contains(&format!(
		"rule cc\n  command = {} -x c -c $ccflags -MD -MF $out.d -MT $out -o $out $in\n  description = cc $out\n  \
		 depfile = $out.d\n  deps = gcc\n",
		cc.display()
	)));
	assert!(text.contains("build $builddir/src/main.o: cc $src/src/main.c\n"));
	assert!(text.contains("build $builddir/src/board.o: cc $src/src/board.c\n"));
	assert!(text.contains("build $builddir/common/util.o: cc $src/../common/util.c\n"));
	assert!(!text.contains("board.h"));
	assert!(!text.contains("rule cxx"));
	assert!(!text.contains("rule ar"));
	assert!(text.ends_with("\ndefault $builddir/Korsar3.elf\n"));
	assert!(text.lines().all(|x| x.len() <= 120));
}

#[test]
fn convert_output_override() {
	let dir = tempfile::tempdir().unwrap();
	let opts = ConvertOptions {
		prj: korsar3_path(),
		config: "Release".to_owned(),
		outpath: Some(dir.path().join("out")),
		output: Some("Firmware".to_owned()),
		flags: vec!["-mcpu=cortex-m4".to_owned()],
		gcc_toolchain: Some(PathBuf::from("arm-gnu-toolchain")),
		..Default::default()
	};
	let path = asninja::convert(&opts, &Settings::default()).unwrap();
	let text = fs::read_to_string(path).unwrap();
	assert!(text.contains("ccflags = -mcpu=cortex-m4 "));
	assert!(text.contains("# subninja $builddir/../../Center/out/build.ninja\n"));
	assert!(text.ends_with("\ndefault $builddir/Firmware.elf\n"));
}

#[test]
fn convert_errors() {
	let dir = tempfile::tempdir().unwrap();
	let opts = ConvertOptions {
		prj: korsar3_path(),
		config: "Missing".to_owned(),
		outpath: Some(dir.path().join("Missing")),
		gcc_toolchain: Some(PathBuf::from("arm-gnu-toolchain")),
		..Default::default()
	};
	let e = asninja::convert(&opts, &Settings::default()).unwrap_err();
	assert_eq!(e.to_string(), "Undefined config in project: Missing");
	assert!(!dir.path().join("Missing").exists());

	let opts =
		ConvertOptions { gcc_toolchain: Some(PathBuf::from("mips-toolchain")), config: "Debug".to_owned(), ..opts };
	let e = asninja::convert(&opts, &Settings::default()).unwrap_err();
	assert!(e.to_string().ends_with("You can set toolchain explicitly with --gcc_toolchain"));

	let opts = ConvertOptions { prj: dir.path().join("none.cproj"), ..opts };
	assert!(asninja::convert(&opts, &Settings::default()).is_err());
}

#[test]
fn convert_with_settings_registry() {
	let dir = tempfile::tempdir().unwrap();
	let settings = Settings::parse(
		r#"
[registry.'Software\Atmel\AtmelStudio\6.2_Config']
InstallDir = 'AS62'
"#,
	)
	.unwrap();
	let opts = ConvertOptions {
		prj: korsar3_path(),
		config: "Debug".to_owned(),
		outpath: Some(dir.path().join("Debug")),
		..Default::default()
	};
	let path = asninja::convert(&opts, &settings).unwrap();
	let text = fs::read_to_string(path).unwrap();
	assert!(text.contains("arm-gnu-toolchain"));
	assert!(text.contains("arm-none-eabi-gcc"));
}
