//! Single-page web form front-end.

use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::{error, info, warn};

use crate::document::{invoice_file_name, invoice_path};
use crate::error::Result;
use crate::fees::due_date_for;
use crate::format;
use crate::generate::{GeneratedInvoice, generate_invoice};
use crate::input;
use crate::model::InvoiceRequest;
use crate::settings::Settings;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html.tera");

const DEFAULT_CONTRACT_VALUE: &str = "1000.00";

pub struct AppState {
    tera: Tera,
    settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self {
            tera,
            settings: Arc::new(settings),
        })
    }
}

/// Raw form fields. Missing fields arrive empty and are reported by
/// validation rather than rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InvoiceForm {
    pub supplier: String,
    pub project_number: String,
    pub project_address: String,
    pub contract_value: String,
}

impl InvoiceForm {
    /// Checks fields in form order: project number, project address,
    /// contract value, supplier.
    fn to_request(&self, settings: &Settings) -> Result<InvoiceRequest> {
        let project_number = input::validate_project_number(&self.project_number)?;
        let project_address = input::validate_project_address(&self.project_address)?;
        let contract_value = input::parse_contract_value(&self.contract_value)?;
        let choice = input::parse_supplier_choice(&self.supplier, settings.suppliers.len())?;
        let supplier = settings.suppliers[choice - 1].clone();

        InvoiceRequest::new(supplier, &project_number, &project_address, contract_value)
    }
}

/// Values echoed back into the form.
#[derive(Debug, Serialize)]
struct FormView<'a> {
    supplier: usize,
    project_number: &'a str,
    project_address: &'a str,
    contract_value: &'a str,
}

impl<'a> FormView<'a> {
    fn from_form(form: &'a InvoiceForm) -> Self {
        Self {
            supplier: form.supplier.trim().parse().unwrap_or(1),
            project_number: &form.project_number,
            project_address: &form.project_address,
            contract_value: if form.contract_value.trim().is_empty() {
                DEFAULT_CONTRACT_VALUE
            } else {
                form.contract_value.as_str()
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultView {
    invoice_number: String,
    file_name: String,
    invoice_amount: String,
    gst: String,
    total: String,
}

impl ResultView {
    fn new(invoice_number: &str, generated: &GeneratedInvoice) -> Self {
        let computation = &generated.computation;
        Self {
            invoice_number: invoice_number.to_string(),
            file_name: invoice_file_name(invoice_number),
            invoice_amount: format::currency(computation.invoice_amount()),
            gst: format::currency(computation.gst()),
            total: format::currency(computation.total()),
        }
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/invoice", web::post().to(submit))
        .route("/invoices/{project_number}", web::get().to(download))
        .route("/logo", web::get().to(logo))
        .route("/health_check", web::get().to(health_check));
}

pub async fn serve(settings: Settings, bind: &str, port: u16) -> anyhow::Result<()> {
    let state = web::Data::new(AppState::new(settings)?);

    info!(bind, port, "starting web server");
    println!("🚀 Server running on http://{bind}:{port}");

    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .bind((bind, port))?
        .run()
        .await?;
    Ok(())
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok()
}

async fn index(state: web::Data<AppState>) -> HttpResponse {
    render_page(&state, StatusCode::OK, &InvoiceForm::default(), None, None)
}

async fn submit(state: web::Data<AppState>, form: web::Form<InvoiceForm>) -> HttpResponse {
    let form = form.into_inner();

    let request = match form.to_request(&state.settings) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejected invoice form");
            let status = if e.is_recoverable() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            return render_page(&state, status, &form, Some(e.to_string()), None);
        }
    };

    let number = request.project_number().to_string();
    let settings = Arc::clone(&state.settings);
    let now = Local::now().naive_local();
    let outcome = web::block(move || generate_invoice(&settings, request, now)).await;

    match outcome {
        Ok(Ok(generated)) => {
            let result = ResultView::new(&number, &generated);
            render_page(&state, StatusCode::OK, &form, None, Some(result))
        }
        Ok(Err(e)) => {
            error!(project_number = %number, error = %e, "invoice generation failed");
            let message = format!("Error generating invoice: {e}");
            render_page(&state, StatusCode::INTERNAL_SERVER_ERROR, &form, Some(message), None)
        }
        Err(e) => {
            error!(project_number = %number, error = %e, "invoice generation task failed");
            let message = "Error generating invoice: the worker was interrupted".to_string();
            render_page(&state, StatusCode::INTERNAL_SERVER_ERROR, &form, Some(message), None)
        }
    }
}

async fn download(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Ok(project_number) = input::validate_project_number(&path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };
    let file = invoice_path(&state.settings.output_dir, &project_number);

    match web::block(move || fs::read(file)).await {
        Ok(Ok(bytes)) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", invoice_file_name(&project_number)),
            ))
            .body(bytes),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => HttpResponse::NotFound().finish(),
        Ok(Err(e)) => {
            error!(%project_number, error = %e, "cannot read invoice");
            HttpResponse::InternalServerError().finish()
        }
        Err(e) => {
            error!(%project_number, error = %e, "invoice read task failed");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Serves the configured logo for the page header.
async fn logo(state: web::Data<AppState>) -> HttpResponse {
    let path = state.settings.logo_path.clone();
    let Ok(format) = image::ImageFormat::from_path(&path) else {
        return HttpResponse::NotFound().finish();
    };

    match web::block(move || fs::read(path)).await {
        Ok(Ok(bytes)) => HttpResponse::Ok()
            .content_type(format.to_mime_type())
            .body(bytes),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => HttpResponse::NotFound().finish(),
        Ok(Err(e)) => {
            error!(error = %e, "cannot read logo");
            HttpResponse::InternalServerError().finish()
        }
        Err(e) => {
            error!(error = %e, "logo read task failed");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn render_page(
    state: &AppState,
    status: StatusCode,
    form: &InvoiceForm,
    error: Option<String>,
    result: Option<ResultView>,
) -> HttpResponse {
    let settings = &state.settings;
    let today = Local::now().naive_local();

    let mut context = Context::new();
    context.insert("company", &settings.company);
    context.insert("suppliers", &settings.suppliers);
    context.insert("has_logo", &settings.logo_path.is_file());
    context.insert("invoice_date", &format::invoice_date(&today));
    context.insert("due_date", &format::invoice_date(&due_date_for(today)));
    context.insert("form", &FormView::from_form(form));
    context.insert("error", &error);
    context.insert("result", &result);

    match state.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) => {
            error!(error = ?e, "template rendering failed");
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}
