//! `mapscout filter`: interactive set operations over saved CSV files.

use crate::cli::output::Styled;
use crate::records::{self, LocationRecord};
use crate::setops;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

const HELP: &str = "\
Available commands:

  union <file1> <file2>       All locations from both files
  intersect <file1> <file2>   Locations whose address appears in both files
  difference <file1> <file2>  Locations from the first file absent from the second
  unique <file>               First occurrence of each address
  sort <file>                 Rows ordered by address
  help                        Show this message
  end                         Leave filter mode

File names are relative to the locations/ directory.
";

/// One parsed filter-shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCommand {
    Union(String, String),
    Intersect(String, String),
    Difference(String, String),
    Unique(String),
    Sort(String),
    Help,
    End,
}

/// Parse a shell line. `Err` carries the message shown to the operator.
pub fn parse_command(line: &str) -> Result<FilterCommand, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((cmd, args)) = parts.split_first() else {
        return Err("No command entered".into());
    };

    match (cmd.to_lowercase().as_str(), args) {
        ("union", [a, b]) => Ok(FilterCommand::Union(a.to_string(), b.to_string())),
        ("intersect", [a, b]) => Ok(FilterCommand::Intersect(a.to_string(), b.to_string())),
        ("difference", [a, b]) => Ok(FilterCommand::Difference(a.to_string(), b.to_string())),
        ("unique", [f]) => Ok(FilterCommand::Unique(f.to_string())),
        ("sort", [f]) => Ok(FilterCommand::Sort(f.to_string())),
        ("help", _) => Ok(FilterCommand::Help),
        ("end", _) => Ok(FilterCommand::End),
        ("union" | "intersect" | "difference", _) => {
            Err("Command requires two file names".into())
        }
        ("unique" | "sort", _) => Err("Command requires one file name".into()),
        (other, _) => Err(format!("Unknown command: {other}")),
    }
}

/// Run the interactive filter shell.
pub async fn run() -> Result<()> {
    std::fs::create_dir_all(records::LOCATIONS_DIR)?;
    let s = Styled::new();
    println!("{HELP}");

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline("filter> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let _ = editor.add_history_entry(&line);

        match parse_command(&line) {
            Ok(FilterCommand::End) => break,
            Ok(FilterCommand::Help) => println!("{HELP}"),
            Ok(command) => {
                if let Err(e) = execute(&command, &s) {
                    eprintln!("  {} {e:#}", s.fail_sym());
                }
            }
            Err(message) => eprintln!("  {} {message}", s.fail_sym()),
        }
    }
    Ok(())
}

fn execute(command: &FilterCommand, s: &Styled) -> Result<()> {
    let dir = Path::new(records::LOCATIONS_DIR);
    let (result, prefix) = match command {
        FilterCommand::Union(a, b) => {
            (setops::union(&load(dir, a)?, &load(dir, b)?), "union_result_")
        }
        FilterCommand::Intersect(a, b) => (
            setops::intersect(&load(dir, a)?, &load(dir, b)?),
            "intersection_result_",
        ),
        FilterCommand::Difference(a, b) => (
            setops::difference(&load(dir, a)?, &load(dir, b)?),
            "difference_result_",
        ),
        FilterCommand::Unique(f) => (setops::unique(&load(dir, f)?), "unique_result_"),
        FilterCommand::Sort(f) => (setops::sort_by_address(&load(dir, f)?), "sort_result_"),
        FilterCommand::Help | FilterCommand::End => return Ok(()),
    };

    let out = records::unique_csv_path(dir, prefix);
    records::write_records(&out, &result)?;
    println!(
        "  {} {} rows written to {}",
        s.ok_sym(),
        result.len(),
        out.display()
    );
    Ok(())
}

fn load(dir: &Path, name: &str) -> Result<Vec<LocationRecord>> {
    let path = dir.join(name);
    anyhow::ensure!(path.exists(), "file does not exist: {}", path.display());
    records::read_records(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binary_commands() {
        assert_eq!(
            parse_command("union a.csv b.csv"),
            Ok(FilterCommand::Union("a.csv".into(), "b.csv".into()))
        );
        assert_eq!(
            parse_command("Intersect a b"),
            Ok(FilterCommand::Intersect("a".into(), "b".into()))
        );
        assert_eq!(
            parse_command("DIFFERENCE a b"),
            Ok(FilterCommand::Difference("a".into(), "b".into()))
        );
    }

    #[test]
    fn test_parse_unary_commands() {
        assert_eq!(
            parse_command("unique a.csv"),
            Ok(FilterCommand::Unique("a.csv".into()))
        );
        assert_eq!(
            parse_command("sort a.csv"),
            Ok(FilterCommand::Sort("a.csv".into()))
        );
        assert_eq!(parse_command("help"), Ok(FilterCommand::Help));
        assert_eq!(parse_command("end"), Ok(FilterCommand::End));
    }

    #[test]
    fn test_parse_arity_errors() {
        assert!(parse_command("union only-one.csv").is_err());
        assert!(parse_command("union a b c").is_err());
        assert!(parse_command("sort").is_err());
        assert!(parse_command("sort a b").is_err());
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        assert!(parse_command("").is_err());
        assert!(parse_command("   ").is_err());
        assert!(parse_command("frobnicate a b").is_err());
    }
}
