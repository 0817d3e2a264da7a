//! Generic list / show / create / update / delete over any resource

use std::path::PathBuf;

use clap::Args;
use colored::*;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::read_form_file;
use crate::client::{missing_as_not_found, ApiClient};
use crate::models::{Load, Page, ResourceKind};
use crate::services::filter::{field_text, ListView, SearchField};
use crate::services::forms::{submit_create, submit_update};
use crate::services::screens::{driver_edit_context, load_detail};
use crate::utils::errors::{AppError, AppResult};

const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Args)]
pub struct ListArgs {
    pub resource: ResourceKind,

    /// Case-insensitive substring to look for
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Field to search in (`all` searches every field)
    #[arg(short, long, default_value = "all")]
    pub field: String,

    /// Only records with this status
    #[arg(long)]
    pub status: Option<String>,

    /// Server-side page (loads only)
    #[arg(long)]
    pub page: Option<u32>,

    /// Page size (loads only)
    #[arg(long)]
    pub size: Option<u32>,

    /// Follow `next` links until the last page (loads only)
    #[arg(long)]
    pub all_pages: bool,

    /// Print the matching records as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub resource: ResourceKind,
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    pub resource: ResourceKind,

    /// JSON object with the form fields
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub resource: ResourceKind,
    pub id: i64,

    /// JSON object with the form fields
    #[arg(short, long)]
    pub file: PathBuf,

    /// PATCH only the given fields instead of replacing the record
    #[arg(long)]
    pub partial: bool,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub resource: ResourceKind,
    pub id: i64,
}

/// Columns shown in list output
fn summary_fields(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::Load => &[
            "load_id",
            "reference_id",
            "load_status",
            "pickup_location",
            "delivery_location",
            "load_pay",
        ],
        ResourceKind::Driver => &["first_name", "last_name", "phone", "driver_status"],
        ResourceKind::Dispatcher => &["first_name", "last_name", "email", "dispatcher_status"],
        ResourceKind::Employee => &["first_name", "last_name", "position", "employee_status"],
        ResourceKind::Truck => &["unit_number", "make", "model", "truck_status"],
        ResourceKind::Trailer => &["trailer_number", "trailer_type", "trailer_status"],
        ResourceKind::Broker => &["company_name", "mc_number", "phone_number", "status"],
        ResourceKind::Team => &["name", "comment"],
        ResourceKind::Unit => &["unit_number", "unit_status"],
        ResourceKind::Ifta => &["quarter", "state", "invoice_number", "total_miles"],
        ResourceKind::FuelTaxRate => &["quarter", "state", "rate", "mpg"],
        ResourceKind::IftaReport => &["quarter", "total_miles", "total_tax"],
        ResourceKind::User => &["username", "email", "first_name", "last_name"],
        ResourceKind::Role => &["name"],
        ResourceKind::Location => &["name", "address"],
    }
}

fn summary_line(kind: ResourceKind, record: &Value) -> String {
    let id = record.get("id").map(field_text).unwrap_or_default();
    let columns: Vec<String> = summary_fields(kind)
        .iter()
        .map(|field| record.get(*field).map(field_text).unwrap_or_default())
        .collect();
    format!("#{:<6} {}", id, columns.join(" | "))
}

async fn fetch_source(client: &ApiClient, args: &ListArgs) -> AppResult<Vec<Value>> {
    let paged = args.page.is_some() || args.size.is_some() || args.all_pages;
    if args.resource != ResourceKind::Load || !paged {
        if paged {
            warn!("⚠️ Pagination is only supported for loads, fetching the full list");
        }
        return client.list_raw(&args.resource.collection_path()).await;
    }

    let mut page: Page<Load> = client
        .list_loads_page(args.page.unwrap_or(1), args.size.unwrap_or(DEFAULT_PAGE_SIZE))
        .await?;
    let count = page.count;
    let mut loads = std::mem::take(&mut page.results);

    while args.all_pages {
        let Some(next) = page.next.clone() else {
            break;
        };
        debug!("Following {}", next);
        page = client.follow_page(&next).await?;
        loads.append(&mut page.results);
    }

    println!(
        "{}",
        format!(
            "page {} · {} of {} loads{}",
            args.page.unwrap_or(1),
            loads.len(),
            count,
            if page.has_next() { " · more available" } else { "" }
        )
        .dimmed()
    );

    loads
        .iter()
        .map(|load| serde_json::to_value(load).map_err(AppError::from))
        .collect()
}

/// A failed fetch leaves the list empty; only an expired session aborts
pub async fn list(client: &ApiClient, args: ListArgs) -> AppResult<()> {
    let source = match fetch_source(client, &args).await {
        Ok(source) => source,
        Err(AppError::SessionExpired) => return Err(AppError::SessionExpired),
        Err(e) => {
            error!("❌ Failed to load {} list: {}", args.resource, e);
            Vec::new()
        }
    };

    let mut view = ListView::new(source);
    if let Some(field) = args.resource.status_field() {
        view = view.with_status_field(field);
    }
    view.set_query(&args.search);
    view.set_field(SearchField::parse(&args.field));
    if let Some(status) = &args.status {
        if args.resource.status_field().is_none() {
            warn!("⚠️ {} records have no status, ignoring --status", args.resource);
        }
        view.toggle_status(status);
    }

    let visible = view.filtered();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("📋 {} ({} of {})", args.resource, visible.len(), view.source().len())
            .bright_cyan()
            .bold()
    );
    for record in &visible {
        println!("{}", summary_line(args.resource, record));
    }
    Ok(())
}

fn print_json(title: &str, value: &impl serde::Serialize) -> AppResult<()> {
    println!("{}", title.bright_cyan().bold());
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn show(client: &ApiClient, args: ShowArgs) -> AppResult<()> {
    match args.resource {
        ResourceKind::Load => {
            let detail = load_detail(client, args.id).await?;
            print_json(&format!("🚚 load {}", args.id), &detail.load)?;
            if let Some(truck) = &detail.truck {
                println!("   truck:      {}", truck.display_name());
            }
            if let Some(trailer) = &detail.trailer {
                println!(
                    "   trailer:    {}",
                    trailer.trailer_number.as_deref().unwrap_or("-")
                );
            }
            if let Some(dispatcher) = &detail.dispatcher {
                println!("   dispatcher: {}", dispatcher.full_name());
            }
        }
        ResourceKind::Driver => {
            let context = driver_edit_context(client, args.id).await?;
            print_json(&format!("🧑 driver {}", args.id), &context.driver)?;
            let truck = context
                .trucks
                .iter()
                .find(|truck| truck.id.is_some() && truck.id == context.driver.truck)
                .map(|truck| truck.display_name());
            let trailer = context
                .trailers
                .iter()
                .find(|trailer| trailer.id.is_some() && trailer.id == context.driver.trailer)
                .and_then(|trailer| trailer.trailer_number.clone());
            let dispatcher = context
                .dispatchers
                .iter()
                .find(|d| d.id.is_some() && d.id == context.driver.dispatcher)
                .map(|d| d.full_name());
            println!("   truck:      {}", truck.unwrap_or_else(|| "-".into()));
            println!("   trailer:    {}", trailer.unwrap_or_else(|| "-".into()));
            println!("   dispatcher: {}", dispatcher.unwrap_or_else(|| "-".into()));
            println!(
                "   ({} trucks, {} trailers, {} dispatchers available)",
                context.trucks.len(),
                context.trailers.len(),
                context.dispatchers.len()
            );
        }
        kind => {
            let record: Value = client
                .get_json(&kind.record_path(args.id))
                .await
                .map_err(|e| missing_as_not_found(e, kind.path(), args.id))?;
            print_json(&format!("📄 {} {}", kind, args.id), &record)?;
        }
    }
    Ok(())
}

pub async fn create(client: &ApiClient, args: CreateArgs) -> AppResult<()> {
    let form = read_form_file(&args.file)?;
    let created = submit_create(client, args.resource, form).await?;
    println!(
        "{} created {} {}",
        "✅".green(),
        args.resource,
        created.get("id").map(field_text).unwrap_or_default()
    );
    Ok(())
}

pub async fn update(client: &ApiClient, args: UpdateArgs) -> AppResult<()> {
    let form = read_form_file(&args.file)?;
    submit_update(client, args.resource, args.id, form, args.partial).await?;
    println!("{} updated {} {}", "✅".green(), args.resource, args.id);
    Ok(())
}

pub async fn delete(client: &ApiClient, args: DeleteArgs) -> AppResult<()> {
    client
        .delete(&args.resource.record_path(args.id))
        .await
        .map_err(|e| missing_as_not_found(e, args.resource.path(), args.id))?;
    println!("{} deleted {} {}", "🗑️".green(), args.resource, args.id);
    Ok(())
}
