use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use fs_err as fs;
use uuid::Uuid;

mod cli;
mod config;
mod errors;
mod extract;
mod form;
mod generate;
mod log;
mod prompt;
mod provider;
mod ux;
mod wire;

use cli::{Command, ExtractArgs, GenerateArgs, PromptArgs, PromptPart};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    log::init_logging(args.debug);

    let cfg = config::Config::load(args.config.as_deref())?;

    match args.command {
        Command::Generate(g) => run_generate(g, cfg).await,
        Command::Prompt(p) => run_prompt(p),
        Command::Extract(e) => run_extract(e),
        Command::Status => {
            ux::print_api_status(cfg.api_key.is_some(), &cfg.secrets_path);
            Ok(())
        }
    }
}

async fn run_generate(args: GenerateArgs, mut cfg: config::Config) -> Result<()> {
    if let Some(m) = args.model { cfg.model = m; }
    if let Some(t) = args.temperature { cfg.temperature = t; }
    if let Some(s) = args.timeout_secs { cfg.timeout_secs = s; }
    if let Some(d) = args.out_dir.clone() { cfg.out_dir = d; }

    let form = args.form.resolve()?;
    let composed = prompt::compose(&form)?;

    println!("{}", ux::APP_TITLE);
    let provider = provider::make_provider(&cfg)?;
    ux::print_api_status(provider.is_some(), &cfg.secrets_path);

    let pb = ux::spinner(!args.no_progress && provider.is_some(), "Generating portfolio…");
    let generation = generate::generate(provider.as_deref(), &composed, cfg.model, cfg.temperature).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    ux::show_generation(&generation);

    if args.no_save {
        return Ok(());
    }
    let tiers = form.effective_tiers();
    let record = log::RunRecord {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        model: cfg.model,
        temperature: cfg.temperature,
        outcome: generation.outcome,
        tiers: tiers.tiers(),
        table_found: generation.export.is_some(),
        table_parsed: generation.export.as_ref().and_then(|e| e.table()).is_some(),
    };
    let saved = log::save_run(&cfg.out_dir, &record, &composed, &generation)?;
    ux::show_saved(&saved);
    Ok(())
}

fn run_prompt(args: PromptArgs) -> Result<()> {
    let form = args.form.resolve()?;
    let composed = prompt::compose(&form)?;

    match args.part {
        PromptPart::System => println!("{}", composed.system),
        PromptPart::User => println!("{}", composed.user),
        PromptPart::Combined => println!("{}", composed.combined()),
    }
    if let Some(out) = &args.out {
        log::save_prompt(out, &composed)?;
        eprintln!("prompt saved at: {}", out.display());
    }
    Ok(())
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading response {}", args.input.display()))?;
    let block = extract::extract_csv_block(Some(&text));
    if block.is_empty() {
        println!("No portfolio table found in {}.", args.input.display());
        return Ok(());
    }
    let export = extract::PortfolioExport::from_block(&block);
    fs::write(&args.out, export.bytes())?;
    match export.table() {
        Some(t) => println!("{}\n\n{} rows written to {}", ux::render_table(t), t.rows.len(), args.out.display()),
        None => println!("Raw table block written to {} (did not parse as CSV)", args.out.display()),
    }
    Ok(())
}
