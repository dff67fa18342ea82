use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use fs_err as fs;
use std::path::PathBuf;

use crate::form::{FormInput, OrgTier, TierSelection};
use crate::wire::{parse_temperature, ModelName};

#[derive(Parser, Debug)]
#[command(name = "s2c", version, about = "SWOT notes → problem statements → DMAIC project charters via a chat model")]
pub struct Args {
    /// TOML file overriding built-in defaults (model, temperature, api_base, out_dir, secrets_path)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose the prompt, call the model, render and save the results
    Generate(GenerateArgs),
    /// Show or save the composed prompt without calling the model
    Prompt(PromptArgs),
    /// Pull the portfolio CSV out of a saved model response
    Extract(ExtractArgs),
    /// Report whether an API key is configured
    Status,
}

#[derive(ClapArgs, Debug, Default)]
pub struct FormArgs {
    /// Form file with [context], [tiers] and [swot] sections
    #[arg(long)]
    pub form: Option<PathBuf>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub industry: Option<String>,

    #[arg(long)]
    pub fy_start: Option<String>,

    #[arg(long)]
    pub strengths_file: Option<PathBuf>,

    #[arg(long)]
    pub weaknesses_file: Option<PathBuf>,

    #[arg(long)]
    pub opportunities_file: Option<PathBuf>,

    #[arg(long)]
    pub threats_file: Option<PathBuf>,

    /// Repeatable; replaces the selected tiers
    #[arg(long = "tier", value_enum)]
    pub tiers: Vec<OrgTier>,

    #[arg(long, default_value_t = false, conflicts_with = "tiers")]
    pub no_tiers: bool,
}

impl FormArgs {
    /// Form file (or defaults) with command-line overrides applied on top.
    pub fn resolve(&self) -> Result<FormInput> {
        let mut form = match &self.form {
            Some(p) => FormInput::load(p)?,
            None => FormInput::default(),
        };
        if let Some(v) = &self.region { form.context.region = v.clone(); }
        if let Some(v) = &self.industry { form.context.industry = v.clone(); }
        if let Some(v) = &self.fy_start { form.context.fy_start = v.clone(); }

        let notes = [
            (&self.strengths_file, &mut form.swot.strengths),
            (&self.weaknesses_file, &mut form.swot.weaknesses),
            (&self.opportunities_file, &mut form.swot.opportunities),
            (&self.threats_file, &mut form.swot.threats),
        ];
        for (path, slot) in notes {
            if let Some(p) = path {
                *slot = fs::read_to_string(p).with_context(|| format!("reading notes {}", p.display()))?;
            }
        }

        if self.no_tiers {
            form.tiers.include = false;
        } else if !self.tiers.is_empty() {
            form.tiers.include = true;
            form.tiers.selected = TierSelection::new(self.tiers.iter().copied());
        }
        Ok(form)
    }
}

#[derive(ClapArgs, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub form: FormArgs,

    #[arg(long, value_enum)]
    pub model: Option<ModelName>,

    #[arg(long, value_parser = parse_temperature)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_save: bool,

    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PromptPart {
    System,
    User,
    #[default]
    Combined,
}

#[derive(ClapArgs, Debug)]
pub struct PromptArgs {
    #[command(flatten)]
    pub form: FormArgs,

    #[arg(long, value_enum, default_value_t = PromptPart::Combined)]
    pub part: PromptPart,

    /// Also write the combined prompt to this file
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ExtractArgs {
    /// Saved model response (e.g. output.md)
    pub input: PathBuf,

    #[arg(long, default_value = "portfolio.csv")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("s2c").chain(args.iter().copied()))
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn generate_flags() {
        let args = parse(&[
            "generate", "--model", "gpt-4.1", "--temperature", "0.65",
            "--tier", "operational", "--tier", "executive", "--debug",
        ])
        .unwrap();
        assert!(args.debug);
        let Command::Generate(g) = args.command else { panic!("expected generate") };
        assert_eq!(g.model, Some(ModelName::Gpt41));
        assert_eq!(g.temperature, Some(0.65));
        let form = g.form.resolve().unwrap();
        assert_eq!(form.tiers.selected.tiers(), &[OrgTier::Executive, OrgTier::Operational]);
    }

    #[test]
    fn temperature_out_of_range_is_rejected() {
        assert!(parse(&["generate", "--temperature", "1.2"]).is_err());
    }

    #[test]
    fn unknown_model_is_rejected() {
        assert!(parse(&["generate", "--model", "gpt-5"]).is_err());
    }

    #[test]
    fn no_tiers_conflicts_with_tier() {
        assert!(parse(&["prompt", "--no-tiers", "--tier", "executive"]).is_err());
        let args = parse(&["prompt", "--no-tiers", "--part", "user"]).unwrap();
        let Command::Prompt(p) = args.command else { panic!("expected prompt") };
        assert_eq!(p.part, PromptPart::User);
        assert!(!p.form.resolve().unwrap().tiers.include);
    }

    #[test]
    fn overrides_apply_on_top_of_form_file() {
        let dir = tempfile::tempdir().unwrap();
        let form_path = dir.path().join("form.toml");
        let mut f = std::fs::File::create(&form_path).unwrap();
        writeln!(f, "[context]\nregion = \"EMEA\"\nindustry = \"Retail\"\n\n[swot]\nthreats = \"from form\"").unwrap();
        let notes_path = dir.path().join("threats.txt");
        std::fs::write(&notes_path, "from file\n").unwrap();

        let fa = FormArgs {
            form: Some(form_path),
            industry: Some("Banking".into()),
            threats_file: Some(notes_path),
            ..FormArgs::default()
        };
        let form = fa.resolve().unwrap();
        assert_eq!(form.context.region, "EMEA");
        assert_eq!(form.context.industry, "Banking");
        assert_eq!(form.swot.threats, "from file\n");
    }

    #[test]
    fn missing_notes_file_is_an_error() {
        let fa = FormArgs { strengths_file: Some("/nonexistent/notes.txt".into()), ..FormArgs::default() };
        assert!(fa.resolve().is_err());
    }
}
