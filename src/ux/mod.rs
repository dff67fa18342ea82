use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::config::API_KEY_ENV;
use crate::extract::{PortfolioExport, PortfolioTable, CSV_MIME};
use crate::generate::Generation;
use crate::log::SavedPaths;

pub const APP_TITLE: &str = "SWOT → Problem Statements → Project Charters (S2C)";

pub fn print_api_status(connected: bool, secrets_path: &std::path::Path) {
    println!("{}", "API Status".bold());
    if connected {
        println!("  {}", "✅ OpenAI: Connected".green().bold());
    } else {
        println!("  {}", "❌ OpenAI: Not Connected".red().bold());
        println!(
            "  Add {} in {} or set {}.",
            "[openai] api_key".cyan(),
            secrets_path.display(),
            API_KEY_ENV.cyan()
        );
    }
}

pub fn heading(title: &str) {
    println!("\n{}", format!("=== {title} ===").bold());
}

pub fn spinner(enabled: bool, msg: &str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

pub fn show_generation(g: &Generation) {
    heading("Model Output");
    println!("{}", g.output);

    let Some(export) = &g.export else { return };
    heading("Portfolio CSV");
    println!("{}", g.csv_block.dimmed());
    match export {
        PortfolioExport::Parsed(table) => {
            println!();
            println!("{}", render_table(table));
        }
        PortfolioExport::Raw(_) => {
            println!("{}", "(table did not parse; raw block kept for download)".yellow());
        }
    }
}

pub fn show_saved(saved: &SavedPaths) {
    heading("Saved");
    println!("  dir:    {}", saved.dir.display());
    println!("  prompt: {}", saved.prompt.display());
    println!("  output: {}", saved.output.display());
    if let Some(p) = &saved.csv {
        println!("  csv:    {} ({CSV_MIME})", p.display());
    }
    println!("  run:    {}", saved.run.display());
}

/// Aligned plain-text rendering of a parsed portfolio.
pub fn render_table(table: &PortfolioTable) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}", w = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };
    let mut out = vec![line(table.headers.as_slice())];
    out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    out.extend(table.rows.iter().map(|r| line(r.as_slice())));
    out.join("\n")
}
