//! Project command handlers.

use tabled::Tabled;

use sitenet_core::normalize::normalize_text;
use sitenet_core::{Project, ProjectId, ProjectStatus};

use crate::cli::{ProjectsArgs, ProjectsCommand};
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util::Site;

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "Code")]
    code: u8,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            code: p.code,
            name: p.name.clone(),
            status: p.status.to_string(),
            id: p.id.to_string(),
        }
    }
}

fn detail(p: &Project) -> String {
    [
        format!("Code:   {}", p.code),
        format!("Name:   {}", p.name),
        format!("Status: {}", p.status),
        format!("ID:     {}", p.id),
    ]
    .join("\n")
}

fn parse_status(raw: &str) -> Result<ProjectStatus, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "status".into(),
        reason: format!("'{raw}' is not one of active, suspended, archived"),
    })
}

pub fn handle(args: ProjectsArgs, ctx: &Context) -> Result<(), CliError> {
    let site = Site::open(&ctx.state_path)?;

    let project = match args.command {
        ProjectsCommand::List => {
            let projects = site.projects.all();
            let out = output::render_list(
                ctx.output,
                &projects,
                |p| ProjectRow::from(p),
                |p| p.code.to_string(),
            )?;
            output::print_output(&out, ctx.quiet);
            return Ok(());
        }

        ProjectsCommand::Add { code, name, status } => {
            if site.project(code).is_ok() {
                return Err(CliError::Conflict {
                    message: format!("project code {code} is already in use"),
                });
            }
            let name = normalize_text(Some(name.as_str())).ok_or_else(|| CliError::Validation {
                field: "name".into(),
                reason: "must not be blank".into(),
            })?;
            Project {
                id: ProjectId::new(),
                code,
                name,
                status: parse_status(&status)?,
            }
        }

        ProjectsCommand::SetStatus { code, status } => Project {
            status: parse_status(&status)?,
            ..site.project(code)?
        },
    };

    site.projects.insert(project.clone());
    site.save()?;

    let out = output::render_single(ctx.output, &project, detail, |p| p.id.to_string())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
