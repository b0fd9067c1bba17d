use crate::constants::DEFAULT_EXCLUDES;
use crate::error::{Result, SweepError};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// How candidate filenames are tested against file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The filename is compiled as a regular expression, unescaped. A name
    /// like `a.png` therefore also matches `aXpng`, and a name containing
    /// `(` fails to compile and aborts the scan.
    #[default]
    Pattern,
    /// The filename only counts as referenced when it appears as an exact
    /// substring.
    Literal,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub exclude: HashSet<String>,
    pub mode: MatchMode,
}

impl ScanOptions {
    /// Seed the exclusion set with the defaults plus any caller additions.
    pub fn new(extra_excludes: &[String], mode: MatchMode) -> Self {
        let mut exclude: HashSet<String> =
            DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
        exclude.extend(extra_excludes.iter().cloned());
        Self { exclude, mode }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new(&[], MatchMode::default())
    }
}

/// List a directory's entry names in sorted order.
pub fn list_dir(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Scan one directory level, removing every name from `names` whose text is
/// found inside a file at this level.
///
/// The list is mutated in place: what survives is the level's deletion
/// candidates. Subdirectories are entered with a fresh list of their own
/// entries, so a reference inside a subdirectory file never rescues a name
/// at this level.
///
/// Because files are compared against the same list that is being pruned, a
/// file whose content contains its own name removes itself from candidacy.
/// That matches the behavior this tool has always had and is covered by a
/// test below; use `MatchMode::Literal` to at least keep metacharacter
/// filenames from matching unrelated content.
///
/// Any filesystem error aborts the whole scan.
pub fn scan(names: &mut Vec<String>, dir: &Path, options: &ScanOptions) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }

    // 隐藏文件和排除名单先过滤掉, 之后不再 stat
    names.retain(|name| !is_hidden(name) && !options.exclude.contains(name));

    let mut idx = 0;
    while idx < names.len() {
        let entry = dir.join(&names[idx]);
        let meta = fs::metadata(&entry)?;

        if meta.is_dir() {
            // 子目录有自己独立的候选列表
            let mut children = list_dir(&entry)?;
            scan(&mut children, &entry, options)?;
        } else if meta.is_file() {
            let content = read_as_text(&entry)?;
            strike_referenced(names, &content, options.mode)?;
        }

        // A removal shifts the next name into the current slot; advancing
        // anyway reproduces the original iterate-while-mutating walk.
        idx += 1;
    }

    Ok(())
}

/// Remove every name that matches `content`, rechecking the slot a removal
/// shifts into so no name is skipped.
fn strike_referenced(names: &mut Vec<String>, content: &str, mode: MatchMode) -> Result<()> {
    let mut i = 0;
    while i < names.len() {
        if matches_content(&names[i], content, mode)? {
            names.remove(i);
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn matches_content(name: &str, content: &str, mode: MatchMode) -> Result<bool> {
    match mode {
        MatchMode::Literal => Ok(content.contains(name)),
        MatchMode::Pattern => {
            let re = Regex::new(name).map_err(|source| SweepError::InvalidPattern {
                name: name.to_string(),
                source: Box::new(source),
            })?;
            Ok(re.is_match(content))
        }
    }
}

/// Leading dot followed by at least one non-whitespace character.
fn is_hidden(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('.') && chars.next().is_some_and(|c| !c.is_whitespace())
}

/// Binary content is not special-cased: bytes are interpreted as UTF-8
/// lossily, only the read itself can fail.
fn read_as_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
