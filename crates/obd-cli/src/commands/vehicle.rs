//! Vehicle commands - create and edit vehicle definition files

use std::path::Path;

use anyhow::{bail, Context, Result};
use obd_core::{RequestDefinition, VehicleDefinition};
use uuid::Uuid;

use crate::output::{OutputContext, OutputFormat, RequestRow};

/// Optional descriptive fields for `vehicle add`
#[derive(Debug, Default)]
pub struct RequestDetails {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Create an empty vehicle file; never overwrites
pub fn vehicle_new(file: &Path, make: &str, model: &str, ctx: &OutputContext) -> Result<()> {
    if file.exists() {
        bail!("{} already exists", file.display());
    }

    let vehicle = VehicleDefinition::with_make_model(make, model);
    vehicle.save(file).context("Cannot save vehicle file")?;
    ctx.success(&format!("Created {} ({})", file.display(), vehicle.id()));
    Ok(())
}

/// Print a vehicle file's metadata and requests
pub fn vehicle_show(file: &Path, ctx: &OutputContext) -> Result<()> {
    let vehicle = load(file)?;

    if ctx.format == OutputFormat::Json {
        ctx.print_json(&vehicle);
        return Ok(());
    }

    ctx.print_kv(&[
        ("ID", vehicle.id().to_string()),
        ("Make", vehicle.make().to_string()),
        ("Model", vehicle.model().to_string()),
    ]);
    ctx.print(&request_rows(&vehicle));
    Ok(())
}

/// Append a request parsed from `ECU:SERVICE:PID[:FORMULA[:UNIT]]`
pub fn vehicle_add(
    file: &Path,
    spec: &str,
    details: RequestDetails,
    ctx: &OutputContext,
) -> Result<Uuid> {
    let mut vehicle = load(file)?;

    let mut request = RequestDefinition::parse_spec(spec).context("Invalid request")?;
    if let Some(name) = details.name {
        request = request.with_name(name);
    }
    if let Some(description) = details.description {
        request = request.with_description(description);
    }
    if let Some(category) = details.category {
        request = request.with_category(category);
    }

    let id = request.id();
    let label = request.label();
    vehicle.add_request(request);
    vehicle.save(file).context("Cannot save vehicle file")?;

    ctx.success(&format!("Added {} ({})", label, id));
    Ok(id)
}

/// Remove a request by id
pub fn vehicle_remove(file: &Path, id: &Uuid, ctx: &OutputContext) -> Result<()> {
    let mut vehicle = load(file)?;

    let request = vehicle
        .get_request(id)
        .context("Cannot remove request")?
        .clone();
    vehicle.remove_request(&request);
    vehicle.save(file).context("Cannot save vehicle file")?;

    ctx.success(&format!("Removed {} ({})", request.label(), id));
    Ok(())
}

fn load(file: &Path) -> Result<VehicleDefinition> {
    VehicleDefinition::load(file).context("Cannot load vehicle file")
}

fn request_rows(vehicle: &VehicleDefinition) -> Vec<RequestRow> {
    vehicle
        .requests()
        .map(|r| RequestRow {
            id: r.id().to_string(),
            name: r.name.clone(),
            address: r.address_string(),
            formula: r.formula.clone(),
            unit: r.unit.clone(),
            category: r.category.clone(),
        })
        .collect()
}
