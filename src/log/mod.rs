use anyhow::Result;
use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::extract::CSV_FILE_NAME;
use crate::form::OrgTier;
use crate::generate::{Generation, Outcome};
use crate::prompt::ComposedPrompt;
use crate::wire::ModelName;

pub const PROMPT_FILE_NAME: &str = "s2c_prompt_openai.txt";
pub const OUTPUT_FILE_NAME: &str = "output.md";
pub const RUN_FILE_NAME: &str = "run.json";

/// Logs go to stderr; `RUST_LOG` overrides the level chosen here.
pub fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Serialize)]
pub struct RunRecord<'a> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub model: ModelName,
    pub temperature: f32,
    pub outcome: Outcome,
    pub tiers: &'a [OrgTier],
    pub table_found: bool,
    pub table_parsed: bool,
}

pub struct SavedPaths {
    pub dir: PathBuf,
    pub prompt: PathBuf,
    pub output: PathBuf,
    pub csv: Option<PathBuf>,
    pub run: PathBuf,
}

pub fn run_dir(out_dir: &Path, run: Uuid) -> PathBuf {
    out_dir.join(run.to_string())
}

pub fn save_prompt(path: &Path, prompt: &ComposedPrompt) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, prompt.combined())?;
    Ok(())
}

pub fn save_run(
    out_dir: &Path,
    record: &RunRecord<'_>,
    prompt: &ComposedPrompt,
    generation: &Generation,
) -> Result<SavedPaths> {
    let dir = run_dir(out_dir, record.id);
    fs::create_dir_all(&dir)?;

    let prompt_path = dir.join(PROMPT_FILE_NAME);
    save_prompt(&prompt_path, prompt)?;

    let output_path = dir.join(OUTPUT_FILE_NAME);
    fs::write(&output_path, &generation.output)?;

    let csv_path = match &generation.export {
        Some(export) => {
            let p = dir.join(CSV_FILE_NAME);
            fs::write(&p, export.bytes())?;
            Some(p)
        }
        None => None,
    };

    let run_path = dir.join(RUN_FILE_NAME);
    fs::write(&run_path, to_string_pretty(record)?)?;

    tracing::info!(dir = %dir.display(), "run artifacts saved");
    Ok(SavedPaths { dir, prompt: prompt_path, output: output_path, csv: csv_path, run: run_path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{PortfolioExport, KNOWN_HEADERS};

    fn prompt() -> ComposedPrompt {
        ComposedPrompt { system: "SYS".into(), user: "USR".into() }
    }

    fn record(outcome: Outcome) -> RunRecord<'static> {
        RunRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            model: ModelName::default(),
            temperature: 0.2,
            outcome,
            tiers: &[OrgTier::Executive],
            table_found: false,
            table_parsed: false,
        }
    }

    #[test]
    fn saves_prompt_output_csv_and_record() {
        let tmp = tempfile::tempdir().unwrap();
        let block = format!("{}\nP1,X,1,1,Low,Kaizen,IT,2025-01-01", KNOWN_HEADERS[2]);
        let generation = Generation {
            outcome: Outcome::Completed,
            output: format!("text\n{block}\n"),
            csv_block: block.clone(),
            export: Some(PortfolioExport::from_block(&block)),
        };
        let rec = record(Outcome::Completed);
        let saved = save_run(tmp.path(), &rec, &prompt(), &generation).unwrap();

        assert_eq!(saved.dir, tmp.path().join(rec.id.to_string()));
        assert_eq!(std::fs::read_to_string(&saved.prompt).unwrap(), "SYS\n\nUSR");
        assert_eq!(std::fs::read_to_string(&saved.output).unwrap(), generation.output);
        let csv = std::fs::read_to_string(saved.csv.unwrap()).unwrap();
        assert_eq!(csv, format!("{block}\n"));

        let run: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&saved.run).unwrap()).unwrap();
        assert_eq!(run["outcome"], "completed");
        assert_eq!(run["model"], "gpt-4o-mini");
        assert_eq!(run["tiers"][0], "executive");
    }

    #[test]
    fn no_csv_file_without_table() {
        let tmp = tempfile::tempdir().unwrap();
        let generation = Generation {
            outcome: Outcome::Failed,
            output: "⚠️ Error generating response: boom".into(),
            csv_block: String::new(),
            export: None,
        };
        let saved = save_run(tmp.path(), &record(Outcome::Failed), &prompt(), &generation).unwrap();
        assert!(saved.csv.is_none());
        assert!(!saved.dir.join(CSV_FILE_NAME).exists());
    }

    #[test]
    fn save_prompt_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/dir/prompt.txt");
        save_prompt(&path, &prompt()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "SYS\n\nUSR");
    }
}
