use std::fs;

use camino::Utf8PathBuf;
use crossterm::style::Stylize as _;
use docent_config::fs::{CONFIG_TEMPLATE, PROJECT_CONFIG_FILE};
use tracing::info;

use super::Output;
use crate::{current_dir, error::Error};

#[derive(Debug, clap::Args)]
pub(crate) struct Init {
    /// Directory to write the configuration to. Defaults to the current
    /// directory.
    path: Option<Utf8PathBuf>,

    /// Overwrite an existing configuration file.
    #[arg(long)]
    force: bool,
}

impl Init {
    pub(crate) fn run(&self) -> Output {
        let root = match &self.path {
            Some(path) => path.clone(),
            None => current_dir()?,
        };

        fs::create_dir_all(&root)?;

        let file = root.join(PROJECT_CONFIG_FILE);
        if file.exists() && !self.force {
            return Err(Error::Exists(file).into());
        }

        fs::write(&file, CONFIG_TEMPLATE)?;
        info!(path = file.as_str(), "Wrote default configuration.");

        Ok(format!("Initialized configuration at {}", file.as_str().bold()).into())
    }
}

#[cfg(test)]
mod tests {
    use camino_tempfile::tempdir;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_init_writes_template() {
        let dir = tempdir().unwrap();
        let init = Init {
            path: Some(dir.path().join("project")),
            force: false,
        };

        init.run().unwrap();

        let file = dir.path().join("project").join(PROJECT_CONFIG_FILE);
        assert_eq!(fs::read_to_string(&file).unwrap(), CONFIG_TEMPLATE);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(&file, "[assistant]\n").unwrap();

        let init = Init {
            path: Some(dir.path().to_path_buf()),
            force: false,
        };

        let error = init.run().unwrap_err();
        assert_eq!(error.to_string(), "File already exists");
        assert_eq!(fs::read_to_string(&file).unwrap(), "[assistant]\n");

        let init = Init { force: true, ..init };
        init.run().unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), CONFIG_TEMPLATE);
    }
}
