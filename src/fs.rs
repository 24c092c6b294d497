use std::env;
use std::path::PathBuf;
use anyhow::{Context, Result};

pub(crate) fn expand_home(path: &str) -> Result<PathBuf> {
    let expanded_path = match path.strip_prefix("~/") {
        Some(rest) => {
            let home = env::var("HOME")
                .with_context(|| format!("Cannot expand '{}': HOME is not set", path))?;
            PathBuf::from(home).join(rest)
        }
        None => PathBuf::from(path),
    };
    Ok(expanded_path)
}
