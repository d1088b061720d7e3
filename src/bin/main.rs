// src/bin/main.rs
use clap::Parser;
use crossterm::{
    cursor::MoveTo,
    execute,
    style::Stylize,
    terminal::{Clear, ClearType},
};
use predictor_core::content::{ABOUT, ADVICE, HEALTH_TIPS};
use predictor_core::core::reference::ReferenceTables;
use predictor_core::core::vocabulary::FeatureVocabulary;
use predictor_core::persistence::load_context;
use predictor_core::{DataConfig, InferenceEngine, PredictionResult};
use std::collections::BTreeSet;
use std::io::{self, stdin, stdout, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "predictor_cli", version, about = "Select symptoms and get a predicted disease")]
struct Args {
    /// JSON file naming the model, label encoder and reference tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory laid out as disease_model.bin, label_encoder.bin and data/*.csv
    #[arg(long, conflicts_with = "config")]
    data_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.data_dir {
        Some(dir) => Ok(DataConfig::from_dir(dir)),
        None => DataConfig::resolve(args.config.as_deref()),
    };
    let engine = match config.and_then(|c| load_context(&c)) {
        Ok(context) => InferenceEngine::new(context),
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    match run(&engine) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &InferenceEngine) -> io::Result<()> {
    let mut selected: BTreeSet<String> = BTreeSet::new();
    let mut out = stdout();

    print_banner(&mut out)?;
    loop {
        print_selection(engine, &selected);
        print!("\n> ");
        out.flush()?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let mut words = input.split_whitespace();
        let Some(cmd) = words.next() else { continue };

        match cmd {
            "exit" | "quit" => break,
            "list" => print_symptoms(engine),
            "tips" => {
                println!("\n{}", "General health tips".bold());
                for tip in HEALTH_TIPS {
                    println!("  - {tip}");
                }
            }
            "about" => println!("\n{ABOUT}"),
            "clear" => {
                selected.clear();
                execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
                print_banner(&mut out)?;
            }
            "remove" => {
                let (found, _) = resolve_all(engine, &words.collect::<Vec<_>>());
                for symptom in found {
                    selected.remove(&symptom);
                }
            }
            "predict" => {
                if selected.is_empty() {
                    println!("{}", "Please select at least one symptom.".yellow());
                    continue;
                }
                match engine.predict(&selected) {
                    Ok(result) => print_result(&result),
                    Err(e) => eprintln!("{} {}", "[ERROR]".red().bold(), e),
                }
            }
            first => {
                let line: Vec<&str> = std::iter::once(first).chain(words).collect();
                let (found, unknown) = resolve_all(engine, &line);
                selected.extend(found);
                for word in unknown {
                    println!("{} '{}'", "Unknown symptom".yellow(), word);
                }
            }
        }
    }
    Ok(())
}

/// Accepts a symptom name or its 1-based number from `list`.
fn resolve(vocabulary: &FeatureVocabulary, word: &str) -> Option<String> {
    if let Ok(n) = word.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| vocabulary.symptoms().get(i)).cloned();
    }
    vocabulary.contains(word).then(|| word.to_string())
}

fn resolve_all(engine: &InferenceEngine, words: &[&str]) -> (Vec<String>, Vec<String>) {
    select_words(engine.context().vocabulary(), words)
}

/// Some symptom names contain spaces, so at each position the longest run of
/// words that names a symptom wins. Returns (selected, unknown words).
fn select_words(vocabulary: &FeatureVocabulary, words: &[&str]) -> (Vec<String>, Vec<String>) {
    let mut found = Vec::new();
    let mut unknown = Vec::new();
    let mut i = 0;
    while i < words.len() {
        let matched = (i + 1..=words.len())
            .rev()
            .find_map(|end| resolve(vocabulary, &words[i..end].join(" ")).map(|s| (s, end)));
        match matched {
            Some((symptom, end)) => {
                found.push(symptom);
                i = end;
            }
            None => {
                unknown.push(words[i].to_string());
                i += 1;
            }
        }
    }
    (found, unknown)
}

fn print_banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "Disease Predictor".bold())?;
    writeln!(out, "---------------------------------------------------------------")?;
    writeln!(out, "Type symptom names or numbers to select them, 'list' to see all.")?;
    writeln!(out, "'predict', 'remove <symptom>', 'clear', 'tips', 'about', 'exit'.")
}

fn print_symptoms(engine: &InferenceEngine) {
    let tables = engine.context().tables();
    for (i, symptom) in engine.context().vocabulary().symptoms().iter().enumerate() {
        match tables.severity(symptom) {
            Some(weight) => println!("  {:>3}: {} (severity {})", i + 1, symptom, weight),
            None => println!("  {:>3}: {}", i + 1, symptom),
        }
    }
}

fn print_selection(engine: &InferenceEngine, selected: &BTreeSet<String>) {
    if selected.is_empty() {
        println!("\nSelected: (none)");
        return;
    }
    let total = total_severity(engine.context().tables(), selected);
    let names: Vec<&str> = selected.iter().map(String::as_str).collect();
    println!("\nSelected: {} (total severity {})", names.join(", "), total);
}

fn total_severity(tables: &ReferenceTables, selected: &BTreeSet<String>) -> i64 {
    selected
        .iter()
        .filter_map(|s| tables.severity(s))
        .fold(0, i64::saturating_add)
}

fn print_result(result: &PredictionResult) {
    println!("\n{} {}", "Predicted disease:".green().bold(), result.disease);
    println!("\n{}", "Description".bold());
    println!("{}", result.description);
    println!("\n{}", "Precautions".bold());
    for (i, p) in result.precautions.iter().enumerate() {
        println!("  {}. {}", i + 1, p);
    }
    println!("\n{}", ADVICE.cyan());
}
