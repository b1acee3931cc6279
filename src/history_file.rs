use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Plain-text prompt history, one entry per line, oldest first on disk.
///
/// Entries may span multiple lines in the editor, so `\n` is escaped as
/// `\\n` (and backslash as `\\\\`) when written. The editor consumes history
/// most-recent-first; `load` returns it in that order.

fn escape(entry: &str) -> String {
    entry.replace('\\', "\\\\").replace('\n', "\\n")
}

fn unescape(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Load history entries, most recent first. A missing file is empty history.
pub fn load(path: &Path) -> Result<Vec<String>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut entries: Vec<String> = contents
        .lines()
        .filter(|line| !line.is_empty())
        .map(unescape)
        .collect();
    entries.reverse();
    Ok(entries)
}

/// Append one entry to the history file.
pub fn append(path: &Path, entry: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", escape(entry))?;
    Ok(())
}
