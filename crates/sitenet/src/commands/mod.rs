//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod normalize;
pub mod projects;
pub mod sync;
pub mod topology;
pub mod util;

use std::path::PathBuf;

use clap::ValueEnum;

use sitenet_config::Config;
use sitenet_core::Project;

use crate::cli::{ColorMode, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Global options resolved against the loaded config.
pub struct Context {
    pub output: OutputFormat,
    pub color: ColorMode,
    pub quiet: bool,
    pub yes: bool,
    pub project: Option<u8>,
    pub state_path: PathBuf,
    pub config: Config,
    pub config_path: PathBuf,
}

impl Context {
    /// Flags win over config values, which win over built-in defaults.
    pub fn resolve(
        global: &GlobalOpts,
        config: Config,
        config_path: PathBuf,
    ) -> Result<Self, CliError> {
        let output = match global.output {
            Some(output) => output,
            None => parse_value_enum("defaults.output", &config.defaults.output)?,
        };
        let color = match global.color {
            Some(color) => color,
            None => parse_value_enum("defaults.color", &config.defaults.color)?,
        };
        let state_path = global
            .state
            .clone()
            .or_else(|| config.defaults.state_file.clone())
            .unwrap_or_else(sitenet_config::state_path);

        Ok(Self {
            output,
            color,
            quiet: global.quiet,
            yes: global.yes,
            project: global.project.or(config.default_project),
            state_path,
            config,
            config_path,
        })
    }

    /// The project code selected by flag, environment or config.
    pub fn project_code(&self) -> Result<u8, CliError> {
        self.project.ok_or_else(|| CliError::NoProject {
            config_path: self.config_path.display().to_string(),
        })
    }

    /// Look up the selected project in the site state.
    pub fn project_in(&self, site: &util::Site) -> Result<Project, CliError> {
        site.project(self.project_code()?)
    }
}

fn parse_value_enum<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Sync(args) => sync::handle(args, ctx).await,
        Command::Devices(args) => devices::handle(args, ctx).await,
        Command::Projects(args) => projects::handle(args, ctx),
        Command::Topology(args) => topology::handle(&args, ctx),
        Command::Normalize(args) => normalize::handle(&args, ctx),
        Command::Config(args) => config_cmd::handle(args, ctx),
        // Completions are generated before a context exists
        Command::Completions(_) => Ok(()),
    }
}
