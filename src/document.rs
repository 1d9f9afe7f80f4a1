//! The invoice's fixed structure, built from the profile, the request and
//! the computed figures.

use std::path::{Path, PathBuf};

use crate::fees::InvoiceComputation;
use crate::format;
use crate::layout::{Align, Block, Cell, Color, Header, Paragraph, Table, TextStyle};
use crate::logo::LogoAsset;
use crate::model::{BankDetails, CompanyProfile, InvoiceRequest};
use crate::settings::Settings;

const POINTS_PER_INCH: f64 = 72.0;

pub const LINE_ITEM_DESCRIPTION: &str = "Sales & Marketing Activities";

/// `invoice_{project_number}.pdf`
pub fn invoice_file_name(project_number: &str) -> String {
    format!("invoice_{project_number}.pdf")
}

pub fn invoice_path(output_dir: &Path, project_number: &str) -> PathBuf {
    output_dir.join(invoice_file_name(project_number))
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    pub company: CompanyProfile,
    pub bank: BankDetails,
    pub request: InvoiceRequest,
    pub computation: InvoiceComputation,
}

impl InvoiceDocument {
    pub fn new(settings: &Settings, request: InvoiceRequest, computation: InvoiceComputation) -> Self {
        Self {
            company: settings.company.clone(),
            bank: settings.bank.clone(),
            request,
            computation,
        }
    }

    pub fn invoice_number(&self) -> &str {
        self.request.project_number()
    }

    pub fn file_name(&self) -> String {
        invoice_file_name(self.invoice_number())
    }

    /// Blocks in page order: header, title, metadata, line items, totals,
    /// payment.
    pub fn blocks(&self, logo: LogoAsset) -> Vec<Block> {
        vec![
            self.header(logo),
            Block::Spacer(20.0),
            Block::Paragraph(Paragraph::new(
                "INVOICE",
                TextStyle::bold(40.0).colored(Color::salmon()),
            )),
            Block::Spacer(50.0),
            Block::Table(self.metadata()),
            Block::Spacer(20.0),
            Block::Table(self.line_items()),
            Block::Spacer(20.0),
            Block::Table(self.totals()),
            Block::Spacer(20.0),
            Block::Paragraph(Paragraph::new("Pay To:", TextStyle::bold(12.0))),
            Block::Spacer(5.0),
            Block::Table(self.payment()),
        ]
    }

    fn header(&self, logo: LogoAsset) -> Block {
        Block::Header(Header {
            logo,
            logo_size: (2.0 * POINTS_PER_INCH, POINTS_PER_INCH),
            lines: self.company.header_lines(),
            style: TextStyle::regular(10.0).aligned(Align::Right),
        })
    }

    fn metadata(&self) -> Table {
        let supplier = self.request.supplier();
        let mut bill_to = vec![supplier.name.clone()];
        bill_to.extend(supplier.address.iter().cloned());

        Table::new(vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 6.0, 1.0 / 3.0])
            .row(vec![
                Cell::new("Invoice No:"),
                Cell::new(self.invoice_number()),
                Cell::new("Invoice Date:"),
                Cell::new(format::invoice_date(&self.computation.invoice_date)),
            ])
            .row(vec![
                Cell::new("Bill to:"),
                Cell::new(bill_to.join("\n")),
                Cell::new("Due Date:"),
                Cell::new(format::invoice_date(&self.computation.due_date)),
            ])
    }

    fn line_items(&self) -> Table {
        let number = self.invoice_number();
        Table::new(vec![1.0 / 8.0, 1.0 / 2.0, 1.0 / 6.0, 1.0 / 6.0])
            .padding(6.0)
            .grid_first_row()
            .rule_below()
            .row(vec![
                Cell::new("Item").bold(),
                Cell::new("Description").bold(),
                Cell::new("Tax").bold(),
                Cell::new("Amount").bold().right(),
            ])
            .row(vec![
                Cell::new("1."),
                Cell::new(LINE_ITEM_DESCRIPTION),
                Cell::new("Total without GST"),
                Cell::new(format::currency(self.computation.invoice_amount())).right(),
            ])
            .row(vec![
                Cell::empty(),
                Cell::new(format!("Job Reference: {number}")),
                Cell::new("GST"),
                Cell::new(format::currency(self.computation.gst())).right(),
            ])
            .row(vec![
                Cell::empty(),
                Cell::empty(),
                Cell::new("Total with GST"),
                Cell::new(format::currency(self.computation.total())).right(),
            ])
            .row(vec![
                Cell::empty(),
                Cell::new(format!("Project Address: {}", self.request.project_address())),
                Cell::empty().right(),
                Cell::empty().right(),
            ])
    }

    fn totals(&self) -> Table {
        Table::new(vec![0.8, 0.2]).font_size(12.0).row(vec![
            Cell::new("Invoice Total").bold().right(),
            Cell::new(format::currency(self.computation.total())).bold().right(),
        ])
    }

    fn payment(&self) -> Table {
        let mut table = Table::new(vec![1.0 / 6.0, 5.0 / 6.0]);
        for field in self.bank.iter() {
            table = table.row(vec![
                Cell::new(format!("{}:", field.label)),
                Cell::new(field.value.as_str()),
            ]);
        }
        table.row(vec![Cell::new("Reference:"), Cell::new(self.invoice_number())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FontWeight;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn document() -> InvoiceDocument {
        let settings = Settings::embedded().unwrap();
        let supplier = settings.supplier(1).unwrap().clone();
        let request = InvoiceRequest::new(supplier, "PN-2024-001", "12 Test St", 10_000.0).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let computation = InvoiceComputation::new(request.contract_value(), date).unwrap();
        InvoiceDocument::new(&settings, request, computation)
    }

    fn tables(blocks: &[Block]) -> Vec<&Table> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            invoice_path(Path::new("invoices"), "PN-2024-001"),
            PathBuf::from("invoices/invoice_PN-2024-001.pdf")
        );
        assert_eq!(
            invoice_path(Path::new("invoices"), "Job 7, Stage (b)"),
            PathBuf::from("invoices/invoice_Job 7, Stage (b).pdf")
        );
    }

    #[test]
    fn test_block_order() {
        let blocks = document().blocks(LogoAsset::TextOnly);
        let kinds: Vec<&str> = blocks
            .iter()
            .filter(|b| !matches!(b, Block::Spacer(_)))
            .map(|b| match b {
                Block::Header(_) => "header",
                Block::Paragraph(p) => p.text.as_str(),
                Block::Table(_) => "table",
                Block::Spacer(_) => unreachable!(),
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["header", "INVOICE", "table", "table", "table", "Pay To:", "table"]
        );
    }

    #[test]
    fn test_header_lines_and_logo_variant() {
        let doc = document();
        let Block::Header(header) = &doc.blocks(LogoAsset::TextOnly)[0] else {
            panic!("first block must be the header");
        };
        assert_eq!(header.logo, LogoAsset::TextOnly);
        assert_eq!(header.style.align, Align::Right);
        assert_eq!(
            header.lines,
            vec![
                "LIFTHUB PTY LTD",
                "ACN: 667592800",
                "120 Spencer Street, Melbourne, 3000",
                "Email: info@lifthub.com.au",
                "Tel: +61422 099 979",
            ]
        );
    }

    #[test]
    fn test_metadata_table() {
        let blocks = document().blocks(LogoAsset::TextOnly);
        let metadata = tables(&blocks)[0];
        assert_eq!(
            metadata.texts(),
            vec![
                "Invoice No:",
                "PN-2024-001",
                "Invoice Date:",
                "05 JUN, 2024",
                "Bill to:",
                "Platinum Elevators Pty Ltd\nSuite 19/2 Kirkham Rd W,\nKeysborough,\nVIC, 3173",
                "Due Date:",
                "11 JUN, 2024",
            ]
        );
    }

    #[test]
    fn test_line_items_table() {
        let blocks = document().blocks(LogoAsset::TextOnly);
        let items = tables(&blocks)[1];
        assert!(items.grid_first_row);
        assert!(items.rule_below);
        assert_eq!(items.padding, 6.0);
        assert_eq!(
            items.texts(),
            vec![
                "Item", "Description", "Tax", "Amount",
                "1.", "Sales & Marketing Activities", "Total without GST", "$500.00",
                "", "Job Reference: PN-2024-001", "GST", "$50.00",
                "", "", "Total with GST", "$550.00",
                "", "Project Address: 12 Test St", "", "",
            ]
        );
        assert!(items.rows[0].iter().all(|c| c.weight == FontWeight::Bold));
        assert!(items.rows.iter().all(|row| row[3].align == Align::Right));
    }

    #[test]
    fn test_totals_and_payment() {
        let blocks = document().blocks(LogoAsset::TextOnly);
        let tables = tables(&blocks);

        assert_eq!(tables[2].texts(), vec!["Invoice Total", "$550.00"]);
        assert_eq!(tables[2].font_size, 12.0);

        assert_eq!(
            tables[3].texts(),
            vec![
                "ACC Name:", "LIFTHUB PTY LTD",
                "BSB:", "033 - 002",
                "Account:", "143 - 276",
                "Reference:", "PN-2024-001",
            ]
        );
    }
}
