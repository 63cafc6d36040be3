//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// File written by `yaml5 init`.
pub const CONFIG_FILE_NAME: &str = "yaml5.toml";

const DEFAULT_CONFIG: &str = r"# yaml5 configuration
#
# Command-line flags override the values below.

[allow]
# Accept 'single quoted' strings next to double quoted ones
single_quote_strings = true

# Accept unquoted object keys that are valid ES5.1 identifiers,
# e.g. {name: 1} instead of {'name': 1}
ident_obj_keys = true
";

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    let path = write_config(Path::new("."), force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to relax the rules you need");
    println!("  2. Run: yaml5 lint .");

    Ok(())
}

/// Writes the default configuration into `dir`.
fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use yaml5_core::Config;

    #[test]
    fn test_default_config_matches_builtin_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_write_config_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), false).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "[allow]\nident_obj_keys = false\n").unwrap();
        let err = write_config(tmp.path(), false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        write_config(tmp.path(), true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
