//! Validated interactive prompts.

use anyhow::Result;
use rustyline::DefaultEditor;

/// Read a line and parse it, re-asking until `parse` accepts the input.
pub fn read_validated<T, F>(
    editor: &mut DefaultEditor,
    prompt: &str,
    error: &str,
    parse: F,
) -> Result<T>
where
    F: Fn(&str) -> Option<T>,
{
    loop {
        let line = editor.readline(prompt)?;
        if let Some(value) = parse(line.trim()) {
            return Ok(value);
        }
        eprintln!("  {error}");
    }
}
