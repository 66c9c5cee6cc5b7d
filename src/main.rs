use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use livespell::cli::output::{self, OutputFormat};
use livespell::cli::replay;
use livespell::editor::EditingSurface;
use livespell::{dict, CheckResult, Config, DictionaryStore, Editor, Session};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "livespell")]
#[command(version, about = "Live spell checking for rich-text editing", long_about = None)]
struct Cli {
    /// Files to replay through the editor
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Open the suggestion overlay on every flagged word and write fixes back
    #[arg(short, long)]
    fix: bool,

    /// Underline flagged words in the rendered document
    #[arg(long)]
    highlight: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if words are flagged
    #[arg(long)]
    no_fail: bool,

    /// Language key to activate once dictionaries are loaded (e.g., en, fr)
    #[arg(short, long, env = "LIVESPELL_LANGUAGE")]
    language: Option<String>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Pattern to ignore (regex)
    #[arg(long)]
    ignore_pattern: Vec<String>,

    /// Personal dictionary file
    #[arg(long)]
    personal_dict: Option<PathBuf>,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// List configured dictionaries and where their data lives
    List,
    /// Download dictionaries into the cache
    Fetch {
        /// Language key (all configured languages when omitted)
        language: Option<String>,
    },
    /// Remove cached dictionary payloads
    ClearCache,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "livespell", &mut io::stdout());
        return Ok(());
    }

    if let Some(command) = cli.command {
        let config = Config::load(cli.language.clone(), None, Vec::new())?;
        return handle_command(command, &config).await;
    }

    let config = Config::load(
        cli.language.clone(),
        cli.personal_dict.clone(),
        cli.ignore_pattern.clone(),
    )?;

    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    let colored = !cli.no_color;
    let mut store = DictionaryStore::from_config(&config)?;
    let report = dict::manager::load_dictionaries(&config, &mut store).await;

    let mut session = Session::new();
    if !session.dictionaries_loaded(&store, &config.default_language) {
        let reason = report
            .failed
            .iter()
            .find(|(language, _)| *language == config.default_language)
            .map(|(_, reason)| reason.clone())
            .unwrap_or_else(|| "not configured".to_string());
        warn!(
            language = %config.default_language,
            %reason,
            "spellcheck disabled"
        );
    }
    session.set_highlight(config.highlight_enabled() || cli.highlight);

    let mut total_errors = 0;
    let mut total_fixed = 0;

    for file_path in &cli.files {
        if !file_path.exists() {
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }

        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let mut editor = Editor::default();
        replay::type_text(&mut editor, &session, &store, &content)
            .with_context(|| format!("Failed to replay {}", file_path.display()))?;

        if cli.fix {
            let fixed = replay::fix_with(&mut editor, &session, &store, |request| {
                output::prompt_overlay(request, colored)
            })?;
            if fixed > 0 {
                let mut text = editor.document().text();
                if content.ends_with('\n') && !text.ends_with('\n') {
                    text.push('\n');
                }
                fs::write(file_path, text)
                    .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
            }
            total_fixed += fixed;
        } else {
            let errors = replay::collect_errors(&editor, &session, &store);
            let result = CheckResult {
                error_count: errors.len(),
                fixed_count: 0,
                errors,
            };
            output::print_report(
                file_path,
                editor.document(),
                &result,
                session.active_language(&store),
                session.highlight(),
                colored,
                &cli.format,
            )?;
            total_errors += result.error_count;
        }
    }

    if matches!(cli.format, OutputFormat::Text) {
        if cli.fix {
            output::print_fix_summary(total_fixed, &cli.files, colored);
        } else {
            output::print_check_summary(total_errors, &cli.files, colored);
        }
    }

    if total_errors > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Dict { action } => match action {
            DictCommands::List => {
                dict::manager::list_dictionaries(config)?;
            }
            DictCommands::Fetch { language } => {
                dict::manager::fetch_dictionaries(config, language.as_deref()).await?;
            }
            DictCommands::ClearCache => {
                dict::manager::clear_cache()?;
            }
        },
    }
    Ok(())
}
