use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, info, success, warning};
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            println!("📄 Current configuration:\n");
            let yaml = serde_yaml::to_string(cfg).map_err(|e| AppError::Config(e.to_string()))?;
            println!("{}", yaml);
        }

        if *check {
            if !path.exists() {
                warning(format!(
                    "No configuration file at {}; defaults are in use",
                    path.display()
                ));
            } else {
                let missing = Config::missing_keys(&path)?;
                if missing.is_empty() {
                    success(format!("{} is complete", path.display()));
                } else {
                    warning(format!(
                        "{} is missing: {} (defaults apply)",
                        path.display(),
                        missing.join(", ")
                    ));
                }
            }
        }

        if *edit_config {
            let default_editor = std::env::var("EDITOR")
                .or_else(|_| std::env::var("VISUAL"))
                .unwrap_or_else(|_| {
                    if cfg!(target_os = "windows") {
                        "notepad".to_string()
                    } else {
                        "nano".to_string()
                    }
                });

            let editor_to_use = editor.clone().unwrap_or_else(|| default_editor.clone());

            match Command::new(&editor_to_use).arg(&path).status() {
                Ok(s) if s.success() => {
                    success(format!("Configuration edited with '{}'", editor_to_use));
                }
                _ if editor_to_use != default_editor => {
                    info(format!(
                        "Editor '{}' not available, falling back to '{}'",
                        editor_to_use, default_editor
                    ));
                    match Command::new(&default_editor).arg(&path).status() {
                        Ok(s) if s.success() => {
                            success(format!("Configuration edited with '{}'", default_editor));
                        }
                        _ => error(format!(
                            "Failed to edit configuration file with '{}'",
                            default_editor
                        )),
                    }
                }
                _ => error(format!(
                    "Failed to edit configuration file with '{}'",
                    editor_to_use
                )),
            }
        }
    }

    Ok(())
}
