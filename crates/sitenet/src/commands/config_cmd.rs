//! Config subcommand handlers.

use sitenet_config::{Config, save_config_to};

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util;

fn as_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

pub fn handle(args: ConfigArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = &ctx.config_path;
            if path.exists()
                && !force
                && !util::confirm(
                    "config init",
                    &format!("Overwrite {}?", path.display()),
                    ctx.yes,
                )?
            {
                return Ok(());
            }
            let cfg = Config {
                default_project: ctx.project,
                ..Config::default()
            };
            save_config_to(&cfg, path)?;
            if !ctx.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let out = output::render_single(ctx.output, &ctx.config, as_toml, as_toml)?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&ctx.config_path.display().to_string(), ctx.quiet);
            Ok(())
        }
    }
}
