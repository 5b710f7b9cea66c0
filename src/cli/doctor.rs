//! Environment readiness check.

use crate::records;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use std::path::Path;
use std::process::Command;

/// Check Chromium availability, output directories, and available memory.
pub async fn run() -> Result<()> {
    println!("Mapscout Doctor");
    println!("===============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome or Chromium, or set MAPSCOUT_CHROMIUM_PATH."
        ),
    }

    for dir in [records::LOCATIONS_DIR, records::BUILDINGS_DIR] {
        match check_writable(Path::new(dir)) {
            Ok(()) => println!("[OK] {dir}/ is writable"),
            Err(e) => println!("[!!] {dir}/ is not writable: {e}"),
        }
    }

    match get_available_memory_mb() {
        Some(mb) => {
            if mb >= 512 {
                println!("[OK] Available memory: {mb}MB (>= 512MB required)");
            } else {
                println!("[!!] Available memory: {mb}MB (< 512MB, capture workers may fail)");
            }
        }
        None => println!("[??] Could not determine available memory"),
    }

    println!();
    if chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
        println!("  Install Chrome or Chromium, or set MAPSCOUT_CHROMIUM_PATH.");
    }

    Ok(())
}

/// Create the directory if needed and verify a file can be written in it.
fn check_writable(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let probe = dir.join(".doctor_probe");
    std::fs::write(&probe, b"ok")?;
    std::fs::remove_file(&probe)
}

/// Get available memory in MB (platform-specific).
fn get_available_memory_mb() -> Option<u64> {
    #[cfg(target_os = "macos")]
    {
        let output = Command::new("sysctl")
            .args(["-n", "hw.memsize"])
            .output()
            .ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        let bytes: u64 = s.trim().parse().ok()?;
        Some(bytes / 1_048_576)
    }
    #[cfg(target_os = "linux")]
    {
        let output = Command::new("free").args(["-m"]).output().ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        for line in s.lines() {
            if line.starts_with("Mem:") {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 7 {
                    return parts[6].parse().ok();
                }
            }
        }
        None
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        None
    }
}
