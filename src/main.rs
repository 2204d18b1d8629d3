use std::process::ExitCode;

use anyhow::{Context, Result};

use lesson_check::config::{Config, OutputFormat};
use lesson_check::lesson::Validator;

fn main() -> Result<ExitCode> {
    let config = Config::from_args_and_env()?;

    // RUST_LOG still takes precedence over --log-level
    env_logger::Builder::new()
        .parse_filters(&config.log_level)
        .parse_default_env()
        .init();

    let registry = config.load_registry()?;
    let validator = Validator::new(registry, config.validate_options())
        .context("Failed to compile the role table")?;

    let result = validator
        .run(&config.root)
        .with_context(|| format!("Failed to validate {}", config.root.display()))?;

    match config.format {
        OutputFormat::Text => print!("{}", result.render_text()),
        OutputFormat::Json => println!(
            "{}",
            result.render_json().context("Failed to serialize report")?
        ),
    }

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
