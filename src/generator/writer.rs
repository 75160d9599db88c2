use std::io::{self, Write};

pub const LINE_WIDTH: usize = 120;

/// Escapes a path for use in a `build` or `default` line.
pub fn escape_path(word: &str) -> String {
	word.replace("$ ", "$$ ").replace(' ', "$ ").replace(':', "$:")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NinjaRspFile {
	pub rspfile: String,
	pub rspfile_content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NinjaRule {
	pub name: String,
	pub command: String,
	pub description: Option<String>,
	pub depfile: Option<String>,
	pub rspfile: Option<NinjaRspFile>,
	pub deps: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NinjaBuild {
	pub outputs: Vec<String>,
	pub rule: String,
	pub inputs: Vec<String>,
	pub implicit: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NinjaItem {
	Newline,
	Comment(String),
	Variable { key: String, value: String },
	Rule(NinjaRule),
	Build(NinjaBuild),
	Default(Vec<String>),
}

/// An ordered ninja file, kept in memory until written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NinjaFile {
	pub items: Vec<NinjaItem>,
}

impl NinjaFile {
	pub fn newline(&mut self) {
		self.items.push(NinjaItem::Newline);
	}

	pub fn comment(&mut self, text: impl Into<String>) {
		self.items.push(NinjaItem::Comment(text.into()));
	}

	pub fn variable(&mut self, key: &str, value: impl Into<String>) {
		self.items.push(NinjaItem::Variable { key: key.to_owned(), value: value.into() });
	}

	/// Empty entries are dropped and the rest joined with single spaces.
	pub fn variable_list(&mut self, key: &str, values: &[String]) {
		let value = values.iter().filter(|x| !x.is_empty()).map(String::as_str).collect::<Vec<_>>().join(" ");
		self.variable(key, value);
	}

	pub fn rule(&mut self, rule: NinjaRule) {
		self.items.push(NinjaItem::Rule(rule));
	}

	/// Adds a build edge and returns its outputs.
	pub fn build(&mut self, build: NinjaBuild) -> Vec<String> {
		let outputs = build.outputs.clone();
		self.items.push(NinjaItem::Build(build));
		outputs
	}

	pub fn default_target(&mut self, targets: Vec<String>) {
		self.items.push(NinjaItem::Default(targets));
	}

	pub fn builds(&self) -> impl Iterator<Item = &NinjaBuild> {
		self.items.iter().filter_map(|x| match x {
			NinjaItem::Build(build) => Some(build),
			_ => None,
		})
	}

	pub fn rules(&self) -> impl Iterator<Item = &NinjaRule> {
		self.items.iter().filter_map(|x| match x {
			NinjaItem::Rule(rule) => Some(rule),
			_ => None,
		})
	}

	pub fn defaults(&self) -> impl Iterator<Item = &Vec<String>> {
		self.items.iter().filter_map(|x| match x {
			NinjaItem::Default(targets) => Some(targets),
			_ => None,
		})
	}

	pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
		for item in &self.items {
			match item {
				NinjaItem::Newline => writeln!(out)?,
				NinjaItem::Comment(text) => {
					for line in text.lines() {
						writeln!(out, "# {}", line)?;
					}
				}
				NinjaItem::Variable { key, value } => write_variable(out, key, value, 0)?,
				NinjaItem::Rule(rule) => {
					write_line(out, &format!("rule {}", rule.name), 0)?;
					write_variable(out, "command", &rule.command, 1)?;
					if let Some(description) = &rule.description {
						write_variable(out, "description", description, 1)?;
					}
					if let Some(depfile) = &rule.depfile {
						write_variable(out, "depfile", depfile, 1)?;
					}
					if let Some(rspfile) = &rule.rspfile {
						write_variable(out, "rspfile", &rspfile.rspfile, 1)?;
						write_variable(out, "rspfile_content", &rspfile.rspfile_content, 1)?;
					}
					if let Some(deps) = &rule.deps {
						write_variable(out, "deps", deps, 1)?;
					}
				}
				NinjaItem::Build(build) => {
					let outputs = build.outputs.iter().map(|x| escape_path(x)).collect::<Vec<_>>();
					let mut inputs = vec![build.rule.clone()];
					inputs.extend(build.inputs.iter().map(|x| escape_path(x)));
					if !build.implicit.is_empty() {
						inputs.push("|".to_owned());
						inputs.extend(build.implicit.iter().map(|x| escape_path(x)));
					}
					write_line(out, &format!("build {}: {}", outputs.join(" "), inputs.join(" ")), 0)?;
				}
				NinjaItem::Default(targets) => write_line(out, &format!("default {}", targets.join(" ")), 0)?,
			}
		}
		Ok(())
	}

	pub fn to_text(&self) -> String {
		let mut buf = Vec::new();
		// Writing into a Vec cannot fail.
		let _ = self.write_to(&mut buf);
		String::from_utf8_lossy(&buf).into_owned()
	}
}

fn write_variable<W: Write>(out: &mut W, key: &str, value: &str, indent: usize) -> io::Result<()> {
	write_line(out, &format!("{} = {}", key, value), indent)
}

fn count_dollars_before(bytes: &[u8], index: usize) -> usize {
	bytes[..index].iter().rev().take_while(|&&b| b == b'$').count()
}

/// Finds a space that is not escaped by a `$`, searching backwards from
/// `available` first and forwards from it second.
fn find_break(bytes: &[u8], available: usize) -> Option<usize> {
	let mut end = available.min(bytes.len());
	while let Some(i) = bytes[..end].iter().rposition(|&b| b == b' ') {
		if count_dollars_before(bytes, i) % 2 == 0 {
			return Some(i);
		}
		end = i;
	}
	let mut start = available.max(1);
	while let Some(i) = bytes.get(start..)?.iter().position(|&b| b == b' ').map(|i| i + start) {
		if count_dollars_before(bytes, i) % 2 == 0 {
			return Some(i);
		}
		start = i + 1;
	}
	None
}

/// Writes `text`, wrapping at `LINE_WIDTH` with ` $` continuations.
fn write_line<W: Write>(out: &mut W, text: &str, indent: usize) -> io::Result<()> {
	let mut leading_space = "  ".repeat(indent);
	let mut text = text;
	while leading_space.len() + text.len() > LINE_WIDTH {
		let available_space = LINE_WIDTH.saturating_sub(leading_space.len() + " $".len());
		let space = match find_break(text.as_bytes(), available_space) {
			Some(x) => x,
			None => break,
		};
		writeln!(out, "{}{} $", leading_space, &text[..space])?;
		text = &text[space + 1..];
		leading_space = "  ".repeat(indent + 2);
	}
	writeln!(out, "{}{}", leading_space, text)
}
