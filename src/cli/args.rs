//! CLI argument parsing.
//!
//! Hand-rolled so that `parse_from` can be driven from tests with any
//! iterator of strings.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the unit system of a param file
    Units {
        param_path: PathBuf,
        json: bool,
    },
    /// Derive a unit system from a mass and a length unit
    SetupUnits {
        mass: String,
        length: String,
        json: bool,
    },
    /// Write a director file scaled to new density bounds
    Director {
        sigma_min: f64,
        sigma_max: f64,
        r: f64,
        resolution: Option<u32>,
        filename: Option<String>,
        output: Option<PathBuf>,
    },
    /// Compute run length and output intervals for a param
    Schedule {
        param_path: PathBuf,
        /// Tipsy snapshot; defaults to the param's `achInFile`.
        snapshot: Option<PathBuf>,
        plan: Option<PathBuf>,
        output: Option<PathBuf>,
    },
    /// Write a param for a tipsy snapshot
    MakeParam {
        snapshot: PathBuf,
        /// Param describing the snapshot's units.
        units_param: PathBuf,
        name: Option<String>,
        output: Option<PathBuf>,
    },
    /// Run the units and director sections of a YAML plan
    Plan {
        plan_path: PathBuf,
        output_dir: Option<PathBuf>,
    },
    /// Locate the param and log files of a run directory
    Find {
        simdir: PathBuf,
        prefix: Option<String>,
    },
    /// Arguments could not be parsed
    Invalid {
        message: String,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let rest = &args[2..];
        let command = match args[1].as_str() {
            "units" => Self::parse_units_command(rest),
            "setup-units" => Self::parse_setup_units_command(rest),
            "director" => Self::parse_director_command(rest),
            "schedule" => Self::parse_schedule_command(rest),
            "make-param" => Self::parse_make_param_command(rest),
            "plan" => Self::parse_plan_command(rest),
            "find" => Self::parse_find_command(rest),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => invalid(format!("unknown command '{unknown}'")),
        };

        Self { command }
    }

    fn parse_units_command(rest: &[String]) -> Command {
        let options = match Options::split(rest, &[], &["--json"]) {
            Ok(options) => options,
            Err(message) => return invalid(message),
        };
        match options.positional.as_slice() {
            [path] => Command::Units {
                param_path: PathBuf::from(path),
                json: options.has("--json"),
            },
            _ => invalid("'units' requires exactly one param file"),
        }
    }

    fn parse_setup_units_command(rest: &[String]) -> Command {
        let options = match Options::split(rest, &[], &["--json"]) {
            Ok(options) => options,
            Err(message) => return invalid(message),
        };
        match options.positional.as_slice() {
            [mass, length] => Command::SetupUnits {
                mass: mass.clone(),
                length: length.clone(),
                json: options.has("--json"),
            },
            _ => invalid("'setup-units' requires a mass unit and a length unit"),
        }
    }

    fn parse_director_command(rest: &[String]) -> Command {
        let options = match Options::split(rest, &["--resolution", "--file", "-o", "--output"], &[]) {
            Ok(options) => options,
            Err(message) => return invalid(message),
        };
        Self::director_from(&options).unwrap_or_else(invalid)
    }

    fn director_from(options: &Options) -> Result<Command, String> {
        let [sigma_min, sigma_max, r] = options.positional.as_slice() else {
            return Err("'director' requires <sigma_min> <sigma_max> <r>".to_string());
        };
        let number = |name: &str, text: &str| {
            text.parse::<f64>()
                .map_err(|_| format!("{name} must be a number, got '{text}'"))
        };
        let resolution = options
            .value("--resolution")
            .map(|text| {
                text.parse::<u32>()
                    .map_err(|_| format!("--resolution must be a positive integer, got '{text}'"))
            })
            .transpose()?;

        Ok(Command::Director {
            sigma_min: number("sigma_min", sigma_min)?,
            sigma_max: number("sigma_max", sigma_max)?,
            r: number("r", r)?,
            resolution,
            filename: options.value("--file").map(str::to_string),
            output: options.output(),
        })
    }

    fn parse_schedule_command(rest: &[String]) -> Command {
        let options = match Options::split(rest, &["--snapshot", "--plan", "-o", "--output"], &[]) {
            Ok(options) => options,
            Err(message) => return invalid(message),
        };
        match options.positional.as_slice() {
            [path] => Command::Schedule {
                param_path: PathBuf::from(path),
                snapshot: options.value("--snapshot").map(PathBuf::from),
                plan: options.value("--plan").map(PathBuf::from),
                output: options.output(),
            },
            _ => invalid("'schedule' requires exactly one param file"),
        }
    }

    fn parse_make_param_command(rest: &[String]) -> Command {
        let options = match Options::split(rest, &["--units", "--name", "-o", "--output"], &[]) {
            Ok(options) => options,
            Err(message) => return invalid(message),
        };
        let [snapshot] = options.positional.as_slice() else {
            return invalid("'make-param' requires exactly one snapshot file");
        };
        let Some(units_param) = options.value("--units") else {
            return invalid("'make-param' requires --units <file.param>");
        };
        Command::MakeParam {
            snapshot: PathBuf::from(snapshot),
            units_param: PathBuf::from(units_param),
            name: options.value("--name").map(str::to_string),
            output: options.output(),
        }
    }

    fn parse_plan_command(rest: &[String]) -> Command {
        let options = match Options::split(rest, &["-o", "--output"], &[]) {
            Ok(options) => options,
            Err(message) => return invalid(message),
        };
        match options.positional.as_slice() {
            [path] => Command::Plan {
                plan_path: PathBuf::from(path),
                output_dir: options.output(),
            },
            _ => invalid("'plan' requires exactly one plan file"),
        }
    }

    fn parse_find_command(rest: &[String]) -> Command {
        let options = match Options::split(rest, &["--prefix"], &[]) {
            Ok(options) => options,
            Err(message) => return invalid(message),
        };
        let simdir = match options.positional.as_slice() {
            [] => PathBuf::from("."),
            [dir] => PathBuf::from(dir),
            _ => return invalid("'find' takes at most one directory"),
        };
        Command::Find {
            simdir,
            prefix: options.value("--prefix").map(str::to_string),
        }
    }
}

fn invalid(message: impl Into<String>) -> Command {
    Command::Invalid {
        message: message.into(),
    }
}

/// Positional arguments, `--flag value` pairs and switches.
#[derive(Debug, Default)]
struct Options {
    positional: Vec<String>,
    values: Vec<(String, String)>,
    switches: Vec<String>,
}

impl Options {
    fn split(args: &[String], flags: &[&str], switches: &[&str]) -> Result<Self, String> {
        let mut options = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if flags.contains(&arg.as_str()) {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("{arg} requires a value"))?;
                options.values.push((arg.clone(), value.clone()));
            } else if switches.contains(&arg.as_str()) {
                options.switches.push(arg.clone());
            } else if arg.starts_with('-') && arg.parse::<f64>().is_err() {
                return Err(format!("unknown option '{arg}'"));
            } else {
                options.positional.push(arg.clone());
            }
        }
        Ok(options)
    }

    /// Last value given for `flag`.
    fn value(&self, flag: &str) -> Option<&str> {
        self.values
            .iter()
            .rev()
            .find(|(f, _)| f == flag)
            .map(|(_, v)| v.as_str())
    }

    fn has(&self, switch: &str) -> bool {
        self.switches.iter().any(|s| s == switch)
    }

    fn output(&self) -> Option<PathBuf> {
        self.value("-o")
            .or_else(|| self.value("--output"))
            .map(PathBuf::from)
    }
}
