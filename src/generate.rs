//! The compute-then-render pipeline both front-ends call.

use chrono::NaiveDateTime;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::document::{InvoiceDocument, invoice_path};
use crate::error::Result;
use crate::fees::InvoiceComputation;
use crate::logo::LogoAsset;
use crate::model::InvoiceRequest;
use crate::render::{DocumentInfo, PageGeometry, PdfRenderer, write_atomically};
use crate::settings::Settings;

/// A written invoice and the figures printed on it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedInvoice {
    pub path: PathBuf,
    pub computation: InvoiceComputation,
}

/// Computes the invoice for `request`, renders it and writes it to
/// `{output_dir}/invoice_{project_number}.pdf`, replacing any earlier file
/// with the same project number.
pub fn generate_invoice(
    settings: &Settings,
    request: InvoiceRequest,
    invoice_date: NaiveDateTime,
) -> Result<GeneratedInvoice> {
    let computation = InvoiceComputation::new(request.contract_value(), invoice_date)?;
    let path = invoice_path(&settings.output_dir, request.project_number());

    let logo = LogoAsset::load(&settings.logo_path)?;
    if !logo.is_present() {
        warn!(path = %settings.logo_path.display(), "logo missing, rendering text-only header");
    }

    let document = InvoiceDocument::new(settings, request, computation);
    let info = DocumentInfo {
        title: format!("Invoice {}", document.invoice_number()),
        author: document.company.name.clone(),
    };
    let bytes = PdfRenderer::new(PageGeometry::a4())
        .with_info(info)
        .render(&document.blocks(logo))?;

    write_atomically(&path, &bytes)?;
    info!(
        path = %path.display(),
        supplier = %document.request.supplier().name,
        total = computation.total(),
        "invoice written"
    );

    Ok(GeneratedInvoice { path, computation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvoiceError;
    use chrono::NaiveDate;
    use std::fs;

    fn settings(name: &str) -> Settings {
        let mut settings = Settings::embedded().unwrap();
        settings.output_dir =
            std::env::temp_dir().join(format!("invoice-generate-{}-{name}", std::process::id()));
        settings.logo_path = PathBuf::from("no/such/logo.png");
        settings
    }

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_writes_pdf_at_expected_path() {
        let settings = settings("path");
        let supplier = settings.supplier(2).unwrap().clone();
        let request = InvoiceRequest::new(supplier, "PN-7", "1 Lift Lane", 10_000.0).unwrap();

        let generated = generate_invoice(&settings, request, date()).unwrap();

        assert_eq!(generated.path, settings.output_dir.join("invoice_PN-7.pdf"));
        assert!(fs::read(&generated.path).unwrap().starts_with(b"%PDF-"));
        assert!((generated.computation.total() - 550.0).abs() < 1e-9);

        fs::remove_dir_all(&settings.output_dir).ok();
    }

    #[test]
    fn test_corrupt_logo_writes_nothing() {
        let settings = settings("corrupt");
        fs::create_dir_all(&settings.output_dir).unwrap();
        let logo = settings.output_dir.join("logo.png");
        fs::write(&logo, b"not an image").unwrap();
        let settings = Settings {
            logo_path: logo,
            ..settings
        };

        let supplier = settings.supplier(1).unwrap().clone();
        let request = InvoiceRequest::new(supplier, "PN-8", "1 Lift Lane", 100.0).unwrap();
        let err = generate_invoice(&settings, request, date()).unwrap_err();

        assert!(matches!(err, InvoiceError::RenderFailure(_)));
        assert!(!settings.output_dir.join("invoice_PN-8.pdf").exists());

        fs::remove_dir_all(&settings.output_dir).ok();
    }
}
