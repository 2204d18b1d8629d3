//! Configuration management for lesson-check.
//!
//! Handles:
//! - Command-line argument parsing
//! - The optional project file `.lesson-check.toml` in the lesson root
//! - Rule file discovery in the user config directory

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::Role;
use crate::lesson::{ValidateOptions, DEFAULT_IGNORE};
use crate::schema::SchemaRegistry;

/// Name of the project file looked up in the lesson root
pub const PROJECT_FILE: &str = ".lesson-check.toml";

/// Command-line arguments for lesson-check
#[derive(Debug, Parser)]
#[command(name = "lesson-check")]
#[command(about = "Check lesson documents against their structural templates")]
#[command(version)]
pub struct Args {
    /// Lesson root directory
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Validate every document as this role
    #[arg(long, help = "Force a role (home, episode, reference, ...)")]
    pub role: Option<String>,

    /// Rule file replacing the built-in rules
    #[arg(long, help = "TOML rule file to use instead of the built-in rules")]
    pub schemas: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Check that the lesson contains its required files
    #[arg(long)]
    pub require_files: bool,

    /// Log level
    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Contents of `.lesson-check.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Rule file, relative to the lesson root
    pub schemas: Option<PathBuf>,
    /// Replaces the default ignore list
    pub ignore: Option<Vec<String>>,
    pub require_files: Option<bool>,
}

impl ProjectConfig {
    /// Load the project file from `root`, if there is one
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(PROJECT_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid project config {}", path.display()))?;
        log::debug!("Loaded project config from {}", path.display());
        Ok(Some(config))
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    /// Role explicitly set via command line
    pub role: Option<Role>,
    /// Rule file in effect; `None` means the built-in rules
    pub schemas: Option<PathBuf>,
    pub ignore: Vec<String>,
    pub require_files: bool,
    pub format: OutputFormat,
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing).
    ///
    /// Precedence: command line, then project file, then the user rule file,
    /// then built-in defaults.
    pub fn from_args(args: Args) -> Result<Self> {
        let role = args
            .role
            .as_deref()
            .map(str::parse::<Role>)
            .transpose()
            .context("Invalid --role")?;

        let project = ProjectConfig::load(&args.root)?.unwrap_or_default();

        let schemas = args
            .schemas
            .or_else(|| project.schemas.map(|p| args.root.join(p)))
            .or_else(user_rule_file);

        Ok(Config {
            role,
            schemas,
            ignore: project
                .ignore
                .unwrap_or_else(|| DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect()),
            require_files: args.require_files || project.require_files.unwrap_or(false),
            format: args.format,
            log_level: args.log_level,
            root: args.root,
        })
    }

    /// Load the rule set this configuration points at
    pub fn load_registry(&self) -> Result<SchemaRegistry> {
        match &self.schemas {
            Some(path) => {
                log::info!("Using rule file {}", path.display());
                SchemaRegistry::from_path(path)
                    .with_context(|| format!("Failed to load rules from {}", path.display()))
            }
            None => SchemaRegistry::builtin().context("Failed to load built-in rules"),
        }
    }

    pub fn validate_options(&self) -> ValidateOptions {
        ValidateOptions {
            role: self.role,
            ignore: self.ignore.clone(),
            require_files: self.require_files,
        }
    }
}

/// `<config dir>/lesson-check/schemas.toml`, when it exists
fn user_rule_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("lesson-check").join("schemas.toml");
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(root: &Path) -> Args {
        Args::parse_from(["lesson-check", root.to_str().unwrap()])
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_args(args(dir.path())).unwrap();
        assert_eq!(config.role, None);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.log_level, "warn");
        assert!(!config.require_files);
        assert!(config.ignore.contains(&"README.md".to_string()));
    }

    #[test]
    fn test_cli_flags() {
        let parsed = Args::parse_from([
            "lesson-check",
            "lesson",
            "--role",
            "episode",
            "--format",
            "json",
            "--require-files",
        ]);
        let config = Config::from_args(parsed).unwrap();
        assert_eq!(config.root, PathBuf::from("lesson"));
        assert_eq!(config.role, Some(Role::Episode));
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.require_files);
    }

    #[test]
    fn test_invalid_role() {
        let parsed = Args::parse_from(["lesson-check", "--role", "motivation"]);
        assert!(Config::from_args(parsed).is_err());
    }

    #[test]
    fn test_project_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "schemas = \"rules.toml\"\nignore = [\"NOTES.md\"]\nrequire_files = true\n",
        )
        .unwrap();

        let config = Config::from_args(args(dir.path())).unwrap();
        assert_eq!(config.schemas, Some(dir.path().join("rules.toml")));
        assert_eq!(config.ignore, vec!["NOTES.md".to_string()]);
        assert!(config.require_files);

        // Command line wins over the project file
        let parsed = Args::parse_from([
            "lesson-check",
            dir.path().to_str().unwrap(),
            "--schemas",
            "other.toml",
        ]);
        let config = Config::from_args(parsed).unwrap();
        assert_eq!(config.schemas, Some(PathBuf::from("other.toml")));
    }

    #[test]
    fn test_load_registry() {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join("rules.toml");
        std::fs::write(&rules, "[[schemas]]\nrole = \"faq\"\n").unwrap();

        let mut config = Config::from_args(args(dir.path())).unwrap();
        config.schemas = Some(rules);
        assert_eq!(config.load_registry().unwrap().roles(), vec![Role::Faq]);

        config.schemas = Some(dir.path().join("missing.toml"));
        assert!(config.load_registry().is_err());
    }
}
