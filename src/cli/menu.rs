//! Interactive top-level menu shown when no subcommand is given.

use crate::capture;
use crate::cli::output::{self, Styled};
use crate::cli::{capture_cmd, filter_cmd, scan_cmd};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const BANNER_WIDTH: usize = 56;

fn print_banner(s: &Styled) {
    let top = format!("╔{}╗", "═".repeat(BANNER_WIDTH));
    let bottom = format!("╚{}╝", "═".repeat(BANNER_WIDTH));
    let line = |text: &str| {
        let pad = BANNER_WIDTH.saturating_sub(text.chars().count());
        let left = pad / 2;
        format!("║{}{}{}║", " ".repeat(left), text, " ".repeat(pad - left))
    };

    println!("{}", s.title(&top));
    println!("{}", s.title(&line("MAPSCOUT")));
    println!("{}", s.title(&line("building scanner for Google Maps")));
    println!("{}", s.title(&bottom));
    println!();
    println!("  1. Scan     enumerate addresses around a point");
    println!("  2. Filter   set operations over saved CSV files");
    println!("  3. Capture  screenshot every location in a file");
    println!("  q. Quit");
    println!();
}

/// Run the menu loop until the operator quits.
pub async fn run(headless: bool) -> Result<()> {
    let s = Styled::new();
    let mut editor = DefaultEditor::new()?;

    loop {
        if !output::no_color() {
            // Clear screen and move the cursor home.
            print!("\x1b[2J\x1b[H");
        }
        print_banner(&s);

        let choice = match editor.readline("Select a mode: ") {
            Ok(line) => line.trim().to_lowercase(),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let result = match choice.as_str() {
            "1" | "scan" => scan_cmd::run(None, None, None, headless).await,
            "2" | "filter" => filter_cmd::run().await,
            "3" | "capture" => {
                capture_cmd::run(None, capture::DEFAULT_WORKERS, headless).await
            }
            "q" | "quit" | "exit" => break,
            "" => continue,
            other => {
                eprintln!("  {} Unknown option: {other}", s.fail_sym());
                continue;
            }
        };

        // Mode errors return to the menu instead of exiting the program.
        if let Err(e) = result {
            eprintln!("  {} {e:#}", s.fail_sym());
        }

        match editor.readline("Press Enter to return to the menu...") {
            Ok(_) => {}
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
