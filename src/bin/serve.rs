// Line protocol on stdin/stdout for hosts that drive the predictor as a child process.
//   SYMPTOMS            -> JSON array of the vocabulary
//   PREDICT ["s", ...]  -> JSON prediction, or "ERROR <message>"
//   EXIT
use clap::Parser;
use log::{debug, error, warn};
use predictor_core::persistence::load_context;
use predictor_core::{DataConfig, InferenceEngine};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "predictor_serve", version, about = "Serve predictions over a stdin/stdout line protocol")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, conflicts_with = "config")]
    data_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    // stdout carries the protocol, so logs go to stderr only.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
    let args = Args::parse();

    let config = match &args.data_dir {
        Some(dir) => Ok(DataConfig::from_dir(dir)),
        None => DataConfig::resolve(args.config.as_deref()),
    };
    let engine = match config.and_then(|c| load_context(&c)) {
        Ok(context) => InferenceEngine::new(context),
        Err(e) => {
            error!("cannot start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(e) = serve(&engine, stdin.lock(), &mut stdout) {
        error!("protocol stream failed: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn serve(engine: &InferenceEngine, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        debug!("<- {:?}", line);
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match command {
            "SYMPTOMS" => {
                let symptoms = engine.context().vocabulary().symptoms();
                writeln!(out, "{}", serde_json::to_string(symptoms)?)?;
            }
            "PREDICT" => {
                // A JSON array, since symptom names may contain spaces.
                let selected: Vec<String> = match serde_json::from_str(rest.trim()) {
                    Ok(s) => s,
                    Err(e) => {
                        writeln!(out, "ERROR expected a JSON array of symptoms: {}", e)?;
                        out.flush()?;
                        continue;
                    }
                };
                if selected.is_empty() {
                    writeln!(out, "ERROR no symptoms selected")?;
                } else {
                    match engine.predict(&selected) {
                        Ok(result) => writeln!(out, "{}", serde_json::to_string(&result)?)?,
                        Err(e) => {
                            error!("prediction failed: {}", e);
                            writeln!(out, "ERROR {}", e)?;
                        }
                    }
                }
            }
            "EXIT" => break,
            "" => continue,
            other => {
                warn!("unknown command {:?}", other);
                writeln!(out, "ERROR unknown command {}", other)?;
            }
        }
        out.flush()?;
    }
    Ok(())
}
