use std::{
    fs::{create_dir_all, File},
    io::{Read, Write},
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::{cert_sign_request::dn::SubjectFields, cli::Cli};

pub const KEY_BITS: RangeInclusive<u32> = 2048..=8192;

#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Offered as option 1 of the subject menu.
    #[serde(default)]
    pub subject: SubjectFields,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub csr_dir: PathBuf,
    pub key_dir: PathBuf,
    pub key_bits: u32,
    pub password_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csr_dir: PathBuf::from("csr"),
            key_dir: PathBuf::from("keys"),
            key_bits: 2048,
            password_file: PathBuf::from(".password"),
        }
    }
}

/// Config file and command line merged for one session.
#[derive(Debug)]
pub struct SessionPlan {
    pub subject_defaults: SubjectFields,
    pub output: OutputConfig,
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let mut str = String::new();
    File::open(path)
        .with_context(|| format!("can't open {path:?}"))?
        .read_to_string(&mut str)
        .with_context(|| format!("Can't read {path:?}"))?;
    toml::from_str::<Config>(&str)
        .with_context(|| format!("Can't parse file {path:?}"))
}

/// Reads `--config` if given, else `config.toml` in `config_dir`, writing a
/// default one there first if it is missing.
pub fn read_config(config_dir: &Path, cli: &Cli) -> anyhow::Result<Config> {
    if let Some(user_config_path) = &cli.config {
        if !user_config_path.exists() {
            bail!("can't find file {user_config_path:?}");
        }
        load_config(user_config_path)
    } else {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            load_config(&config_path)
        } else {
            let config = Config::default();
            create_dir_all(config_dir).context("Can't create config dir")?;
            File::create(&config_path)
                .with_context(|| format!("Can't create file {config_path:?}"))?
                .write_all(toml::to_string_pretty(&config)?.as_bytes())
                .with_context(|| format!("Can't write file {config_path:?}"))?;
            Ok(config)
        }
    }
}

pub fn create_plan(cli: Cli, config: Config) -> anyhow::Result<SessionPlan> {
    let mut output = config.output;
    if let Some(csr_dir) = cli.csr_dir {
        output.csr_dir = csr_dir;
    }
    if let Some(key_dir) = cli.key_dir {
        output.key_dir = key_dir;
    }
    if let Some(key_bits) = cli.key_bits {
        output.key_bits = key_bits;
    }
    if !KEY_BITS.contains(&output.key_bits) {
        bail!(
            "key_bits must be between {} and {}, got {}",
            KEY_BITS.start(),
            KEY_BITS.end(),
            output.key_bits
        );
    }

    Ok(SessionPlan {
        subject_defaults: config.subject,
        output,
    })
}
