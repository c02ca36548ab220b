//! Device command handlers.

use tabled::Tabled;

use sitenet_core::normalize::{normalize_ip, normalize_text};
use sitenet_core::{
    Device, DeviceEdit, DeviceFilter, DeviceStatus, DeviceType, MacAddress, RegisterDevice,
    Source,
};

use crate::cli::{DevicesArgs, DevicesCommand};
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util::{self, Site};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        let mut status = d.status.to_string();
        if d.is_hidden() {
            status.push_str(" (hidden)");
        }
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            dtype: d.device_type.to_string(),
            status,
            mac: d.mac_address.as_ref().map(ToString::to_string).unwrap_or_default(),
            ip: d.ip_address.clone().unwrap_or_default(),
            last_seen: d
                .last_seen_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

fn detail(d: &Device, color: bool) -> String {
    let m = &d.metadata;
    let mut lines = vec![
        format!("ID:        {}", d.id),
        format!("Name:      {}", d.name),
        format!("Type:      {}", d.device_type),
        format!("Status:    {}", output::paint_status(d.status, color)),
        format!(
            "MAC:       {}",
            d.mac_address.as_ref().map_or_else(|| "-".into(), ToString::to_string)
        ),
        format!("IP:        {}", d.ip_address.as_deref().unwrap_or("-")),
        format!("Model:     {}", m.model.as_deref().unwrap_or("-")),
    ];
    if let Some(gw) = &m.gateway_mac {
        lines.push(format!(
            "Gateway:   {gw} ({})",
            m.gateway_ip.as_deref().unwrap_or("-")
        ));
    }
    if let Some(role) = m.bridge_role {
        lines.push(format!("Bridge:    {role}"));
    }
    if let Some(extra) = m.extra_statuses.as_ref().filter(|s| !s.is_empty()) {
        lines.push(format!("Flags:     {}", extra.join(", ")));
    }
    if let Some(metrics) = &m.metrics {
        let rendered: Vec<String> = metrics.iter().map(|(k, v)| format!("{k}={v}")).collect();
        lines.push(format!("Metrics:   {}", rendered.join(" ")));
    }
    lines.push(format!(
        "Last Seen: {}",
        d.last_seen_at.map_or_else(|| "-".into(), |t| t.to_rfc3339())
    ));
    if let Some(hidden) = d.hidden_at {
        lines.push(format!("Hidden:    {}", hidden.to_rfc3339()));
    }
    lines.push(format!("Created:   {}", d.created_at.to_rfc3339()));
    lines.push(format!("Updated:   {}", d.updated_at.to_rfc3339()));
    lines.join("\n")
}

// ── Argument parsing ────────────────────────────────────────────────

fn parse_status(raw: &str) -> Result<DeviceStatus, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "status".into(),
        reason: format!("'{raw}' is not one of online, offline, warning, unknown"),
    })
}

fn parse_type(raw: &str) -> Result<DeviceType, CliError> {
    normalize_text(Some(raw))
        .map(DeviceType::from)
        .ok_or_else(|| CliError::Validation {
            field: "type".into(),
            reason: "must not be blank".into(),
        })
}

fn parse_mac(raw: Option<&str>) -> Result<Option<MacAddress>, CliError> {
    Ok(raw.map(MacAddress::parse).transpose()?)
}

fn parse_ip(raw: Option<&str>) -> Result<Option<String>, CliError> {
    Ok(raw.map(normalize_ip).transpose()?)
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(args: DevicesArgs, ctx: &Context) -> Result<(), CliError> {
    let site = Site::open(&ctx.state_path)?;
    let project = ctx.project_in(&site)?;
    let registry = &site.registry;
    let actor = util::operator();
    let color = output::should_color(ctx.color);

    match args.command {
        DevicesCommand::List {
            device_type,
            status,
            all,
            hidden,
        } => {
            let visibility = if hidden {
                DeviceFilter::Hidden
            } else if all {
                DeviceFilter::All
            } else {
                DeviceFilter::Visible
            };
            let mut devices = registry.list_filtered(project.id, &visibility).await?;
            if let Some(raw) = device_type.as_deref() {
                let by_type = DeviceFilter::ByType(parse_type(raw)?);
                devices.retain(|d| by_type.matches(d));
            }
            if let Some(raw) = status.as_deref() {
                let by_status = DeviceFilter::ByStatus(parse_status(raw)?);
                devices.retain(|d| by_status.matches(d));
            }
            let out = output::render_list(ctx.output, &devices, |d| DeviceRow::from(d), |d| {
                d.id.to_string()
            })?;
            output::print_output(&out, ctx.quiet);
        }

        DevicesCommand::Get { device } => {
            let device = site.resolve_device(&project, &device).await?;
            let out = output::render_single(
                ctx.output,
                &device,
                |d| detail(d, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, ctx.quiet);
        }

        DevicesCommand::Available => {
            let devices = registry.available_for_placement(project.id).await?;
            let out = output::render_list(ctx.output, &devices, |d| DeviceRow::from(d), |d| {
                d.id.to_string()
            })?;
            output::print_output(&out, ctx.quiet);
        }

        DevicesCommand::Add {
            device_type,
            name,
            model,
            mac,
            ip,
        } => {
            let request = RegisterDevice {
                name,
                model,
                mac: parse_mac(mac.as_deref())?,
                ip: parse_ip(ip.as_deref())?,
                ..RegisterDevice::new(parse_type(&device_type)?)
            };
            let registered = registry
                .register(project.id, request, Source::Manual, &actor)
                .await?;
            site.save()?;
            let verb = if registered.created { "Created" } else { "Merged into" };
            if !ctx.quiet {
                eprintln!("{verb} device {}", registered.device.id);
            }
            print_device(&registered.device, ctx, color)?;
        }

        DevicesCommand::Edit {
            device,
            name,
            device_type,
            mac,
            ip,
        } => {
            let target = site.resolve_device(&project, &device).await?;
            let edit = DeviceEdit {
                name,
                device_type: device_type.as_deref().map(parse_type).transpose()?,
                mac: parse_mac(mac.as_deref())?,
                ip: parse_ip(ip.as_deref())?,
            };
            let saved = registry.update(project.id, target.id, edit, &actor).await?;
            site.save()?;
            print_device(&saved, ctx, color)?;
        }

        DevicesCommand::Hide { device } => {
            let target = site.resolve_device(&project, &device).await?;
            let saved = registry.set_hidden(project.id, target.id, true, &actor).await?;
            site.save()?;
            print_device(&saved, ctx, color)?;
        }

        DevicesCommand::Show { device } => {
            let target = site.resolve_device(&project, &device).await?;
            let saved = registry.set_hidden(project.id, target.id, false, &actor).await?;
            site.save()?;
            print_device(&saved, ctx, color)?;
        }

        DevicesCommand::Remove { devices } => {
            let mut targets = Vec::with_capacity(devices.len());
            for identifier in &devices {
                targets.push(site.resolve_device(&project, identifier).await?);
            }
            let names: Vec<&str> = targets.iter().map(|d| d.name.as_str()).collect();
            let prompt = format!("Remove {} device(s): {}?", targets.len(), names.join(", "));
            if !util::confirm("devices remove", &prompt, ctx.yes)? {
                return Ok(());
            }

            let ids: Vec<_> = targets.iter().map(|d| d.id).collect();
            let removed = registry.remove(project.id, &ids, &actor).await?;
            site.save()?;
            let out = output::render_list(ctx.output, &removed, |d| DeviceRow::from(d), |d| {
                d.id.to_string()
            })?;
            output::print_output(&out, ctx.quiet);
        }

        DevicesCommand::Place { device } => {
            let target = site.resolve_device(&project, &device).await?;
            site.placements.place(target.id);
            site.save()?;
            print_device(&target, ctx, color)?;
        }

        DevicesCommand::Unplace { device } => {
            let target = site.resolve_device(&project, &device).await?;
            if !site.placements.unplace(target.id) {
                return Err(CliError::NotFound {
                    resource_type: "placement".into(),
                    identifier: target.id.to_string(),
                    list_command: "devices list".into(),
                });
            }
            site.save()?;
            print_device(&target, ctx, color)?;
        }
    }
    Ok(())
}

fn print_device(device: &Device, ctx: &Context, color: bool) -> Result<(), CliError> {
    let out = output::render_single(
        ctx.output,
        device,
        |d| detail(d, color),
        |d| d.id.to_string(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn manual_types_keep_free_text() {
        assert_eq!(parse_type("camera").unwrap(), DeviceType::Camera);
        assert_eq!(
            parse_type(" Access Point ").unwrap(),
            DeviceType::Other("Access Point".into())
        );
        assert!(parse_type("  ").is_err());
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(parse_status("OFFLINE").unwrap(), DeviceStatus::Offline);
        assert!(parse_status("asleep").is_err());
    }

    #[test]
    fn mac_and_ip_flags_are_normalized() {
        let mac = parse_mac(Some("AA-BB-CC-00-11-22")).unwrap();
        assert_eq!(mac.unwrap().as_str(), "aa:bb:cc:00:11:22");
        assert!(parse_mac(Some("aa:bb")).is_err());
        assert_eq!(parse_ip(None).unwrap(), None);
        assert!(parse_ip(Some("10.0.0.300")).is_err());
    }
}
