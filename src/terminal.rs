//! Interactive terminal front-end.

use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use inquire::validator::Validation;
use inquire::{InquireError, Text};
use tracing::warn;

use crate::fees::GST_RATE;
use crate::format;
use crate::generate::{GeneratedInvoice, generate_invoice};
use crate::input;
use crate::model::{InvoiceRequest, Supplier};
use crate::settings::Settings;

/// Values passed on the command line. Anything missing or invalid is
/// prompted for.
#[derive(Debug, Clone, Default)]
pub struct Presets {
    pub supplier: Option<String>,
    pub project_number: Option<String>,
    pub project_address: Option<String>,
    pub contract_value: Option<String>,
}

pub fn run(settings: &Settings, presets: &Presets) -> Result<()> {
    println!("Welcome to the Invoice Generator!");
    println!("{}", supplier_table(&settings.suppliers));

    let request = match collect_request(settings, presets) {
        Ok(request) => request,
        Err(e) if is_cancelled(&e) => {
            println!("Cancelled");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let generated = generate_invoice(settings, request.clone(), Local::now().naive_local())
        .context("Failed to generate invoice")?;

    println!("{}", summary_table(&request, &generated));
    println!("Invoice generated successfully: {}", generated.path.display());
    Ok(())
}

fn collect_request(settings: &Settings, presets: &Presets) -> Result<InvoiceRequest> {
    let count = settings.suppliers.len();

    let choice = match preset(presets.supplier.as_deref(), "supplier", |raw| {
        input::parse_supplier_choice(raw, count)
    }) {
        Some(choice) => choice,
        None => {
            let raw = Text::new(&format!("Choose a supplier (1-{count}):"))
                .with_validator(move |raw: &str| Ok(validation(input::parse_supplier_choice(raw, count))))
                .prompt()?;
            input::parse_supplier_choice(&raw, count)?
        }
    };
    let supplier = settings
        .supplier(choice)
        .cloned()
        .with_context(|| format!("supplier {choice} is not configured"))?;
    println!("✅ Selected Supplier: {}", supplier.name);

    let project_number = match preset(
        presets.project_number.as_deref(),
        "project number",
        input::validate_project_number,
    ) {
        Some(value) => value,
        None => {
            let raw = Text::new("Enter project number:")
                .with_validator(|raw: &str| Ok(validation(input::validate_project_number(raw))))
                .prompt()?;
            input::validate_project_number(&raw)?
        }
    };

    let project_address = match preset(
        presets.project_address.as_deref(),
        "project address",
        input::validate_project_address,
    ) {
        Some(value) => value,
        None => {
            let raw = Text::new("Enter project address:")
                .with_validator(|raw: &str| Ok(validation(input::validate_project_address(raw))))
                .prompt()?;
            input::validate_project_address(&raw)?
        }
    };

    let contract_value = match preset(
        presets.contract_value.as_deref(),
        "contract value",
        input::parse_contract_value,
    ) {
        Some(value) => value,
        None => {
            let raw = Text::new("Enter total contract value: $")
                .with_validator(|raw: &str| Ok(validation(input::parse_contract_value(raw))))
                .prompt()?;
            input::parse_contract_value(&raw)?
        }
    };

    Ok(InvoiceRequest::new(
        supplier,
        &project_number,
        &project_address,
        contract_value,
    )?)
}

/// Parses a command-line value. An invalid value is reported and treated
/// as absent so the field gets prompted for.
fn preset<T>(
    raw: Option<&str>,
    field: &str,
    parse: impl Fn(&str) -> crate::error::Result<T>,
) -> Option<T> {
    match parse(raw?) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(field, error = %e, "ignoring invalid command-line value");
            println!("❌ {e}");
            None
        }
    }
}

fn validation<T>(result: crate::error::Result<T>) -> Validation {
    match result {
        Ok(_) => Validation::Valid,
        Err(e) => Validation::Invalid(e.to_string().into()),
    }
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<InquireError>(),
        Some(InquireError::OperationCanceled | InquireError::OperationInterrupted)
    )
}

pub fn supplier_table(suppliers: &[Supplier]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Supplier"),
        Cell::new("Address"),
    ]);
    for supplier in suppliers {
        table.add_row(vec![
            Cell::new(supplier.id),
            Cell::new(&supplier.name),
            Cell::new(supplier.address.join(" ")),
        ]);
    }
    table
}

fn summary_table(request: &InvoiceRequest, generated: &GeneratedInvoice) -> Table {
    let computation = &generated.computation;
    let money = |amount: f64| Cell::new(format::currency(amount)).set_alignment(CellAlignment::Right);

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(format!("Invoice {}", request.project_number())),
        Cell::new(""),
    ]);
    table.add_row(vec![Cell::new("Supplier"), Cell::new(&request.supplier().name)]);
    table.add_row(vec![Cell::new("Project Address"), Cell::new(request.project_address())]);
    table.add_row(vec![
        Cell::new("Invoice Date"),
        Cell::new(format::invoice_date(&computation.invoice_date)),
    ]);
    table.add_row(vec![
        Cell::new("Due Date"),
        Cell::new(format::invoice_date(&computation.due_date)),
    ]);
    table.add_row(vec![Cell::new("Contract Value"), money(computation.contract_value)]);
    table.add_row(vec![Cell::new("Total without GST"), money(computation.invoice_amount())]);
    table.add_row(vec![
        Cell::new(format!("GST ({:.0}%)", GST_RATE * 100.0)),
        money(computation.gst()),
    ]);
    table.add_row(vec![
        Cell::new("Total with GST").add_attribute(Attribute::Bold),
        money(computation.total()).add_attribute(Attribute::Bold),
    ]);
    table
}
