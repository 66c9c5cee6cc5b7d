use crate::editor::{Document, Mark, OverlayRequest};
use crate::CheckResult;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    file: String,
    language: Option<&'a str>,
    total_errors: usize,
    errors: &'a [crate::SpellError],
}

/// Document text with flagged runs underlined when `highlight` is on.
pub fn render_document(doc: &Document, highlight: bool, colored_output: bool) -> String {
    doc.blocks()
        .iter()
        .map(|block| {
            block
                .runs()
                .iter()
                .map(|run| {
                    if highlight && colored_output && run.marks.contains(&Mark::Error) {
                        run.text.red().underline().to_string()
                    } else {
                        run.text.clone()
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_report(
    file_path: &Path,
    doc: &Document,
    result: &CheckResult,
    language: Option<&str>,
    highlight: bool,
    colored_output: bool,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            print_text_report(file_path, doc, result, highlight, colored_output);
            Ok(())
        }
        OutputFormat::Json => {
            let output = JsonOutput {
                file: file_path.display().to_string(),
                language,
                total_errors: result.error_count,
                errors: &result.errors,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}

fn print_text_report(
    file_path: &Path,
    doc: &Document,
    result: &CheckResult,
    highlight: bool,
    colored_output: bool,
) {
    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    if highlight {
        for line in render_document(doc, highlight, colored_output).lines() {
            println!("  {}", line);
        }
        println!();
    }

    for error in &result.errors {
        let location = format!("{}:{}", error.line, error.column);

        if colored_output {
            println!("  {} {}", location.blue().bold(), error.word.red().bold());
            if !error.suggestions.is_empty() {
                let suggestions = error
                    .suggestions
                    .iter()
                    .map(|s| s.green().to_string())
                    .collect::<Vec<_>>()
                    .join(&", ".dimmed().to_string());
                println!("    {} {}", "→".dimmed(), suggestions);
            }
        } else {
            println!("  {} {}", location, error.word);
            if !error.suggestions.is_empty() {
                println!("    → {}", error.suggestions.join(", "));
            }
        }
    }
}

pub fn print_check_summary(total_errors: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    let file_word = if files.len() == 1 { "file" } else { "files" };
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No spelling errors found!".green().bold());
        } else {
            println!("✓ No spelling errors found!");
        }
    } else {
        let error_word = if total_errors == 1 { "word" } else { "words" };
        if colored {
            println!(
                "{} {} flagged {} in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files.len(),
                file_word
            );
        } else {
            println!(
                "✗ {} flagged {} in {} {}",
                total_errors,
                error_word,
                files.len(),
                file_word
            );
        }
    }
}

pub fn print_fix_summary(total_fixed: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_fixed == 0 {
        if colored {
            println!("{}", "No corrections applied.".green().bold());
        } else {
            println!("No corrections applied.");
        }
    } else {
        let fix_word = if total_fixed == 1 { "correction" } else { "corrections" };
        let file_word = if files.len() == 1 { "file" } else { "files" };
        if colored {
            println!(
                "{} {} {} applied to {} {}",
                "✓".green().bold(),
                total_fixed.to_string().green().bold(),
                fix_word,
                files.len(),
                file_word
            );
        } else {
            println!("✓ {} {} applied to {} {}", total_fixed, fix_word, files.len(), file_word);
        }
    }
}

/// Terminal rendition of the suggestion overlay. `None` means dismissed.
pub fn prompt_overlay(request: &OverlayRequest, colored: bool) -> Option<String> {
    if request.suggestions.is_empty() {
        if colored {
            println!("{} {}", "No suggestions for".yellow(), request.word.red().bold());
        } else {
            println!("No suggestions for {}", request.word);
        }
        return None;
    }

    let mut items: Vec<String> = request.suggestions.clone();
    items.push("[skip]".to_string());

    let prompt = format!("Replace '{}' with", request.word);
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact_opt()
        .ok()
        .flatten()?;

    request.suggestions.get(selection).cloned()
}
