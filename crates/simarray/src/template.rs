//! Parameter file templates.
//!
//! A template is a plain text parameter file where each line reads
//! `name<sep>value...`. Parsing splits a line at the first separator only, so
//! vector values keep their own spacing (`traits 0 0 0` has the value
//! `0 0 0`). Lines that don't split into a name and a value (blank lines,
//! bare words) are kept verbatim.
//!
//! Updating a template replaces the value of every key that a combination row
//! names. Updated lines are re-serialized as `name<sep>value`; every other
//! line is written back byte for byte, in its original order. Each line keeps
//! its own terminator (`\n`, `\r\n` or none on a final line), and appended
//! lines use the first terminator found in the file.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::table::CombinationRow;

/// Separator between a parameter name and its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParamSeparator {
    /// Any run of whitespace; written back as a single space
    #[default]
    Whitespace,
    /// An exact string
    Literal(String),
}

impl ParamSeparator {
    /// Build from an optional user-supplied separator.
    pub fn from_option(separator: Option<&str>) -> Result<Self> {
        match separator {
            None => Ok(Self::Whitespace),
            Some("") => Err(Error::InvalidConfig(
                "parameter separator must not be empty".to_string(),
            )),
            Some(sep) => Ok(Self::Literal(sep.to_string())),
        }
    }

    /// Split a line into `(name, value)` at the first separator.
    pub fn split<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let line = line.trim();
        let (name, value) = match self {
            Self::Whitespace => {
                let at = line.find(char::is_whitespace)?;
                (&line[..at], line[at..].trim_start())
            }
            Self::Literal(sep) => {
                let (name, value) = line.split_once(sep.as_str())?;
                (name.trim(), value)
            }
        };
        if name.is_empty() {
            return None;
        }
        Some((name, value))
    }

    /// Text placed between name and value when writing a line.
    pub fn joiner(&self) -> &str {
        match self {
            Self::Whitespace => " ",
            Self::Literal(sep) => sep,
        }
    }
}

/// How to treat row parameters the template does not define.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingKeys {
    /// Leave them out of the written file
    #[default]
    Ignore,
    /// Append a `name<sep>value` line for each one
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Verbatim(String),
    Entry {
        name: String,
        value: String,
        /// Original text, dropped once the value changes
        raw: Option<String>,
    },
}

/// Parsed parameter file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    lines: Vec<Line>,
    /// Parameter name -> line index
    index: IndexMap<String, usize>,
    /// Names defined on more than one line
    duplicates: Vec<String>,
    /// Terminator of each line, parallel to `lines`
    endings: Vec<&'static str>,
    /// Terminator given to appended lines
    newline: &'static str,
    separator: ParamSeparator,
}

impl Template {
    fn empty(separator: ParamSeparator) -> Self {
        Self {
            lines: Vec::new(),
            index: IndexMap::new(),
            duplicates: Vec::new(),
            endings: Vec::new(),
            newline: "\n",
            separator,
        }
    }

    fn push_line(&mut self, line: Line, ending: &'static str) {
        self.lines.push(line);
        self.endings.push(ending);
    }

    /// Add a line after the last one, terminating the previous final line
    /// first if it had no terminator.
    fn append_line(&mut self, line: Line) {
        let newline = self.newline;
        let ending = match self.endings.last_mut() {
            Some(last) if last.is_empty() => {
                *last = newline;
                ""
            }
            _ => newline,
        };
        self.push_line(line, ending);
    }

    /// Parse template text.
    ///
    /// A name defined on several lines is remembered rather than rejected
    /// here; see [`Template::check_keys`].
    pub fn parse(text: &str, separator: ParamSeparator) -> Self {
        let mut template = Self::empty(separator);
        if let Some(first) = text
            .split_inclusive('\n')
            .map(line_ending)
            .find(|e| !e.is_empty())
        {
            template.newline = first;
        }

        for chunk in text.split_inclusive('\n') {
            let ending = line_ending(chunk);
            let raw = &chunk[..chunk.len() - ending.len()];
            match template.separator.split(raw) {
                Some((name, value)) => {
                    let at = template.lines.len();
                    if template.index.contains_key(name) {
                        if !template.duplicates.iter().any(|d| d == name) {
                            template.duplicates.push(name.to_string());
                        }
                    } else {
                        template.index.insert(name.to_string(), at);
                    }
                    template.push_line(
                        Line::Entry {
                            name: name.to_string(),
                            value: value.to_string(),
                            raw: Some(raw.to_string()),
                        },
                        ending,
                    );
                }
                None => template.push_line(Line::Verbatim(raw.to_string()), ending),
            }
        }

        template
    }

    /// Read and parse a template file.
    pub fn load(path: &Path, separator: ParamSeparator) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::TemplateNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::parse(&text, separator))
    }

    /// Fail with [`Error::DuplicateTemplateKey`] if any of `names` is
    /// defined on more than one line, since it could not be updated
    /// unambiguously.
    pub fn check_keys<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        match names
            .iter()
            .map(|name| -> &str { name.as_ref() })
            .find(|name| self.duplicates.iter().any(|d| d.as_str() == *name))
        {
            Some(name) => Err(Error::DuplicateTemplateKey {
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Minimal parameter file listing a row's pairs, used when no template is
    /// configured.
    pub fn from_row(row: &CombinationRow<'_>, separator: ParamSeparator) -> Self {
        let mut template = Self::empty(separator);
        template.apply(row, MissingKeys::Append);
        template
    }

    /// Current value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.lines.get(*self.index.get(name)?)? {
            Line::Entry { value, .. } => Some(value.as_str()),
            Line::Verbatim(_) => None,
        }
    }

    /// All `(name, value)` pairs in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            Line::Entry { name, value, .. } => Some((name.as_str(), value.as_str())),
            Line::Verbatim(_) => None,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn separator(&self) -> &ParamSeparator {
        &self.separator
    }

    /// Replace the value of an existing parameter. Returns `false` (and
    /// changes nothing) if the template has no such parameter.
    pub fn set(&mut self, name: &str, new_value: &str) -> bool {
        let Some(&at) = self.index.get(name) else {
            return false;
        };
        if let Some(Line::Entry { value, raw, .. }) = self.lines.get_mut(at) {
            if value.as_str() != new_value {
                *value = new_value.to_string();
                *raw = None;
            }
        }
        true
    }

    /// Overwrite every parameter the row names. Returns how many template
    /// lines were updated or appended.
    pub fn apply(&mut self, row: &CombinationRow<'_>, missing: MissingKeys) -> usize {
        let mut touched = 0;
        for (name, value) in row.pairs() {
            if self.set(name, value) {
                touched += 1;
            } else if missing == MissingKeys::Append {
                self.index.insert(name.to_string(), self.lines.len());
                self.append_line(Line::Entry {
                    name: name.to_string(),
                    value: value.to_string(),
                    raw: None,
                });
                touched += 1;
            } else {
                debug!(parameter = name, "Parameter not in template, skipped");
            }
        }
        touched
    }

    /// Serialize back to text.
    pub fn render(&self) -> String {
        let joiner = self.separator.joiner();
        let mut out = String::new();
        for (line, ending) in self.lines.iter().zip(&self.endings) {
            match line {
                Line::Verbatim(text) => out.push_str(text),
                Line::Entry { raw: Some(text), .. } => out.push_str(text),
                Line::Entry {
                    name,
                    value,
                    raw: None,
                } => {
                    out.push_str(name);
                    out.push_str(joiner);
                    out.push_str(value);
                }
            }
            out.push_str(ending);
        }
        out
    }

    /// Write the rendered template to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render()).map_err(|e| Error::io(path, e))
    }
}

/// Terminator at the end of a `split_inclusive('\n')` chunk.
fn line_ending(chunk: &str) -> &'static str {
    if chunk.ends_with("\r\n") {
        "\r\n"
    } else if chunk.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Change one parameter's value in an existing parameter file, in place.
///
/// Returns `false` and leaves the file untouched when the file does not
/// define `name`.
pub fn update_file(
    path: &Path,
    name: &str,
    value: &str,
    separator: ParamSeparator,
) -> Result<bool> {
    let mut template = Template::load(path, separator)?;
    template.check_keys(&[name])?;
    if !template.set(name, value) {
        return Ok(false);
    }
    template.write_to(path)?;
    debug!(file = %path.display(), parameter = name, "Updated parameter value");
    Ok(true)
}

/// Name of the parameter file written into each folder: the explicit
/// override, else the template's file name, else `parameters.txt`.
pub fn output_file_name(explicit: Option<&str>, template: Option<&Path>) -> PathBuf {
    if let Some(name) = explicit {
        return PathBuf::from(name);
    }
    template
        .and_then(|path| path.file_name())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("parameters.txt"))
}
