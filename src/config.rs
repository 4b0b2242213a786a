//! Command-line configuration for the `heapinspect` binary.

use std::path::PathBuf;

use thiserror::Error;

/// Usage text printed for `--help` and on usage errors.
pub const USAGE: &str = "\
Usage:
  heapinspect --file /path/to/16567 [--page 0] [--demo=true] [--all]

Options:
  --file <PATH>       relation file (e.g. base/DBOID/RELFILENODE)
  --page <N>          page number, 0-based (default 0)
  --demo[=BOOL]       decode demo columns (id BIGINT, name TEXT) (default true)
  --no-demo           same as --demo=false
  --all               inspect every page in the file
  -h, --help          print this help
";

/// Invalid command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required flag --file")]
    MissingFile,

    #[error("flag {0} needs a value")]
    MissingValue(String),

    #[error("invalid value {value:?} for {flag}")]
    InvalidValue { flag: String, value: String },

    #[error("unknown flag {0}")]
    UnknownFlag(String),
}

/// Settings for one run of the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Relation file to read.
    pub file: PathBuf,
    /// Page to inspect when `all` is off.
    pub page: u64,
    /// Decode the demo columns of each tuple.
    pub demo: bool,
    /// Inspect every page instead of `page`.
    pub all: bool,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Inspect(Config),
    Help,
}

impl Config {
    /// Parses command-line arguments (without the program name).
    ///
    /// Flags accept both `--flag value` and `--flag=value`.
    pub fn from_args<I>(args: I) -> Result<Invocation, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut file = None;
        let mut page = 0;
        let mut demo = true;
        let mut all = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg, None),
            };

            match flag.as_str() {
                "-h" | "--help" => return Ok(Invocation::Help),
                "--file" => {
                    let value = value_of(&flag, inline, &mut args)?;
                    file = Some(PathBuf::from(value));
                }
                "--page" => {
                    let value = value_of(&flag, inline, &mut args)?;
                    page = value.parse().map_err(|_| ConfigError::InvalidValue {
                        flag: flag.clone(),
                        value,
                    })?;
                }
                "--demo" => {
                    demo = match inline {
                        None => true,
                        Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                            flag: flag.clone(),
                            value,
                        })?,
                    };
                }
                "--no-demo" => demo = false,
                "--all" => all = true,
                _ => return Err(ConfigError::UnknownFlag(flag)),
            }
        }

        let file = file
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigError::MissingFile)?;

        Ok(Invocation::Inspect(Config {
            file,
            page,
            demo,
            all,
        }))
    }
}

fn value_of(
    flag: &str,
    inline: Option<String>,
    rest: &mut impl Iterator<Item = String>,
) -> Result<String, ConfigError> {
    inline
        .or_else(|| rest.next())
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "true" | "T" | "TRUE" | "True" => Some(true),
        "0" | "f" | "false" | "F" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
