//! Flows layout blocks onto A4 pages and produces PDF bytes.
//!
//! Coordinates follow PDF convention: points, origin at the bottom-left.
//! The cursor tracks the top of the next block and moves down the page.

pub mod metrics;
mod pdf;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{InvoiceError, Result};
use crate::layout::{Align, Block, Color, Header, Paragraph, Table, TextStyle};
use crate::logo::{LogoAsset, LogoImage};
use metrics::{Font, wrap};

pub use pdf::DocumentInfo;

/// Points per millimetre.
pub const MM: f64 = 72.0 / 25.4;

/// Horizontal padding inside table cells.
const CELL_PADDING_X: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl PageGeometry {
    /// A4 with 25mm side margins and 20mm top and bottom margins.
    pub fn a4() -> Self {
        Self {
            width: 210.0 * MM,
            height: 297.0 * MM,
            margin_left: 25.0 * MM,
            margin_right: 25.0 * MM,
            margin_top: 20.0 * MM,
            margin_bottom: 20.0 * MM,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    fn top(&self) -> f64 {
        self.height - self.margin_top
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Laid-out pages: one content stream per page plus the images they draw.
#[derive(Debug, Clone, Default)]
pub struct PagePlan {
    pub pages: Vec<String>,
    pub images: Vec<LogoImage>,
}

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    geometry: PageGeometry,
    info: DocumentInfo,
}

impl PdfRenderer {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            info: DocumentInfo::default(),
        }
    }

    pub fn with_info(self, info: DocumentInfo) -> Self {
        Self { info, ..self }
    }

    pub fn render(&self, blocks: &[Block]) -> Result<Vec<u8>> {
        let plan = self.layout(blocks)?;
        debug!(pages = plan.pages.len(), images = plan.images.len(), "layout complete");
        pdf::assemble(&self.geometry, &plan, &self.info)
    }

    /// Fails with `RenderFailure` when a single block or table row is
    /// taller than the printable area of a page.
    pub fn layout(&self, blocks: &[Block]) -> Result<PagePlan> {
        let mut composer = Composer::new(&self.geometry);
        for block in blocks {
            match block {
                Block::Header(header) => composer.header(header)?,
                Block::Paragraph(paragraph) => composer.paragraph(paragraph)?,
                Block::Table(table) => composer.table(table)?,
                Block::Spacer(height) => composer.spacer(*height),
            }
        }
        Ok(composer.finish())
    }
}

/// Writes `bytes` to a sibling temporary file, then renames it over `path`.
/// A failed write never leaves a truncated file at `path`.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    if let Err(e) = fs::write(&partial, bytes) {
        fs::remove_file(&partial).ok();
        return Err(e.into());
    }
    fs::rename(&partial, path)?;
    Ok(())
}

struct Composer<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<String>,
    content: String,
    cursor: f64,
    images: Vec<LogoImage>,
}

impl<'a> Composer<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            content: String::new(),
            cursor: geometry.top(),
            images: Vec::new(),
        }
    }

    fn finish(mut self) -> PagePlan {
        self.pages.push(std::mem::take(&mut self.content));
        PagePlan {
            pages: self.pages,
            images: self.images,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.content));
        self.cursor = self.geometry.top();
    }

    fn at_page_top(&self) -> bool {
        self.cursor >= self.geometry.top() - f64::EPSILON
    }

    /// Starts a new page if `height` does not fit below the cursor.
    fn reserve(&mut self, height: f64, what: &str) -> Result<()> {
        let available = self.geometry.top() - self.geometry.margin_bottom;
        if height > available {
            return Err(InvoiceError::RenderFailure(format!(
                "{what} does not fit on a page ({height:.1}pt, {available:.1}pt available)"
            )));
        }
        if self.cursor - height < self.geometry.margin_bottom && !self.at_page_top() {
            self.new_page();
        }
        Ok(())
    }

    fn spacer(&mut self, height: f64) {
        if self.cursor - height < self.geometry.margin_bottom {
            self.new_page();
        } else {
            self.cursor -= height;
        }
    }

    fn paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        let style = paragraph.style;
        let font = Font::for_weight(style.weight);
        let width = self.geometry.content_width();
        let lines = wrap(&paragraph.text, font, style.size, width);

        self.reserve(lines.len() as f64 * style.leading, "paragraph")?;
        let left = self.geometry.margin_left;
        self.text_lines(&lines, &style, left, width, self.cursor);
        self.cursor -= lines.len() as f64 * style.leading;
        Ok(())
    }

    fn header(&mut self, header: &Header) -> Result<()> {
        let style = header.style;
        let content_width = self.geometry.content_width();
        let left = self.geometry.margin_left;
        let text_height = header.lines.len() as f64 * style.leading;

        let height = match &header.logo {
            LogoAsset::WithLogo(image) => {
                let (logo_w, logo_h) = header.logo_size;
                let height = text_height.max(logo_h);
                self.reserve(height, "header")?;

                let name = pdf::image_name(self.images.len());
                self.images.push(image.clone());
                self.content.push_str(&format!(
                    "q {logo_w:.2} 0 0 {logo_h:.2} {left:.2} {:.2} cm /{name} Do Q\n",
                    self.cursor - logo_h
                ));

                let half = content_width / 2.0;
                self.text_lines(&header.lines, &style, left + half, half, self.cursor);
                height
            }
            LogoAsset::TextOnly => {
                self.reserve(text_height, "header")?;
                self.text_lines(&header.lines, &style, left, content_width, self.cursor);
                text_height
            }
        };
        self.cursor -= height;
        Ok(())
    }

    fn table(&mut self, table: &Table) -> Result<()> {
        let content_width = self.geometry.content_width();
        let leading = table.font_size * 1.2;
        let widths: Vec<f64> = table.columns.iter().map(|f| f * content_width).collect();
        let table_width: f64 = widths.iter().sum();
        let last = table.rows.len().saturating_sub(1);

        for (index, row) in table.rows.iter().enumerate() {
            let wrapped: Vec<Vec<String>> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let font = Font::for_weight(cell.weight);
                    wrap(&cell.text, font, table.font_size, width - 2.0 * CELL_PADDING_X)
                })
                .collect();
            let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
            let row_height = line_count as f64 * leading + 2.0 * table.padding;

            self.reserve(row_height, "table row")?;
            let top = self.cursor;
            let mut x = self.geometry.margin_left;

            for ((cell, lines), width) in row.iter().zip(&wrapped).zip(&widths) {
                let style = TextStyle {
                    size: table.font_size,
                    leading,
                    weight: cell.weight,
                    color: Color::black(),
                    align: cell.align,
                };
                self.text_lines(
                    lines,
                    &style,
                    x + CELL_PADDING_X,
                    width - 2.0 * CELL_PADDING_X,
                    top - table.padding,
                );
                if table.grid_first_row && index == 0 {
                    self.content.push_str(&format!(
                        "1 w {x:.2} {:.2} {width:.2} {row_height:.2} re S\n",
                        top - row_height
                    ));
                }
                x += width;
            }

            if table.rule_below && index == last {
                let y = top - row_height;
                self.content.push_str(&format!(
                    "1 w {:.2} {y:.2} m {:.2} {y:.2} l S\n",
                    self.geometry.margin_left,
                    self.geometry.margin_left + table_width,
                ));
            }
            self.cursor = top - row_height;
        }
        Ok(())
    }

    /// Draws `lines` inside the box starting at `left` and `width` points
    /// wide, the first line hanging from `top`.
    fn text_lines(&mut self, lines: &[String], style: &TextStyle, left: f64, width: f64, top: f64) {
        let font = Font::for_weight(style.weight);
        let Color { r, g, b } = style.color;

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_width = font.measure(line, style.size);
            let x = match style.align {
                Align::Left => left,
                Align::Center => left + (width - line_width) / 2.0,
                Align::Right => left + width - line_width,
            };
            let baseline = top - style.size - i as f64 * style.leading;
            self.content.push_str(&format!(
                "BT /{} {} Tf {r:.3} {g:.3} {b:.3} rg {x:.2} {baseline:.2} Td {} Tj ET\n",
                font.resource_name(),
                style.size,
                pdf::literal(line),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Cell;

    fn renderer() -> PdfRenderer {
        PdfRenderer::new(PageGeometry::a4())
    }

    fn logo() -> LogoImage {
        LogoImage {
            width: 2,
            height: 1,
            rgb: vec![0, 0, 0, 255, 255, 255],
        }
    }

    #[test]
    fn test_a4_geometry() {
        let g = PageGeometry::a4();
        assert!((g.width - 595.2756).abs() < 1e-3);
        assert!((g.height - 841.8898).abs() < 1e-3);
        assert!((g.margin_left - 70.8661).abs() < 1e-3);
        assert!((g.margin_top - 56.6929).abs() < 1e-3);
    }

    #[test]
    fn test_paragraph_is_drawn_with_style() {
        let blocks = vec![Block::Paragraph(Paragraph::new(
            "INVOICE",
            TextStyle::bold(40.0).colored(Color::salmon()),
        ))];
        let plan = renderer().layout(&blocks).unwrap();

        assert_eq!(plan.pages.len(), 1);
        let page = &plan.pages[0];
        assert!(page.contains("/F2 40 Tf"));
        assert!(page.contains("0.980 0.502 0.447 rg"));
        assert!(page.contains("(INVOICE) Tj"));
    }

    #[test]
    fn test_right_aligned_cell_hugs_column_edge() {
        let g = PageGeometry::a4();
        let table = Table::new(vec![0.8, 0.2]).row(vec![Cell::new("Total"), Cell::new("$550.00").right()]);
        let plan = renderer().layout(&[Block::Table(table)]).unwrap();

        let text_width = Font::Helvetica.measure("$550.00", 10.0);
        let expected_x = g.margin_left + g.content_width() - CELL_PADDING_X - text_width;
        assert!(plan.pages[0].contains(&format!("{expected_x:.2} ")));
    }

    #[test]
    fn test_text_only_header_has_no_image() {
        let header = Header {
            logo: LogoAsset::TextOnly,
            logo_size: (144.0, 72.0),
            lines: vec!["LIFTHUB PTY LTD".to_string()],
            style: TextStyle::regular(10.0).aligned(Align::Right),
        };
        let plan = renderer().layout(&[Block::Header(header)]).unwrap();
        assert!(plan.images.is_empty());
        assert!(!plan.pages[0].contains(" Do "));
        assert!(plan.pages[0].contains("(LIFTHUB PTY LTD) Tj"));
    }

    #[test]
    fn test_logo_header_places_image() {
        let header = Header {
            logo: LogoAsset::WithLogo(logo()),
            logo_size: (144.0, 72.0),
            lines: vec!["LIFTHUB PTY LTD".to_string()],
            style: TextStyle::regular(10.0).aligned(Align::Right),
        };
        let plan = renderer().layout(&[Block::Header(header)]).unwrap();
        assert_eq!(plan.images.len(), 1);
        assert!(plan.pages[0].contains("144.00 0 0 72.00"));
        assert!(plan.pages[0].contains("/Im1 Do"));
    }

    #[test]
    fn test_grid_and_rule() {
        let table = Table::new(vec![0.5, 0.5])
            .grid_first_row()
            .rule_below()
            .row(vec![Cell::new("Item").bold(), Cell::new("Amount").bold()])
            .row(vec![Cell::new("1."), Cell::new("$1.00")]);
        let plan = renderer().layout(&[Block::Table(table)]).unwrap();
        let page = &plan.pages[0];

        assert_eq!(page.matches(" re S").count(), 2);
        assert_eq!(page.matches(" l S").count(), 1);
    }

    #[test]
    fn test_long_table_spills_onto_new_pages() {
        let mut table = Table::new(vec![1.0]);
        for i in 0..120 {
            table = table.row(vec![Cell::new(format!("row {i}"))]);
        }
        let plan = renderer().layout(&[Block::Table(table)]).unwrap();

        assert!(plan.pages.len() > 1);
        assert!(plan.pages[0].contains("(row 0) Tj"));
        assert!(plan.pages.last().unwrap().contains("(row 119) Tj"));
    }

    #[test]
    fn test_row_taller_than_a_page_is_render_failure() {
        let words: Vec<String> = (0..1500).map(|i| format!("W{i}")).collect();
        let table = Table::new(vec![0.2, 0.8])
            .row(vec![Cell::new("Address"), Cell::new(words.join(" "))]);

        let err = renderer().layout(&[Block::Table(table.clone())]).unwrap_err();
        assert!(matches!(err, InvoiceError::RenderFailure(_)));
        assert!(renderer().render(&[Block::Table(table)]).is_err());
    }

    #[test]
    fn test_text_stays_inside_the_page() {
        let mut table = Table::new(vec![1.0]);
        for i in 0..120 {
            table = table.row(vec![Cell::new(format!("row {i}"))]);
        }
        let plan = renderer().layout(&[Block::Table(table)]).unwrap();
        let bottom = PageGeometry::a4().margin_bottom;

        for page in &plan.pages {
            for line in page.lines().filter(|l| l.starts_with("BT ")) {
                let fields: Vec<&str> = line.split_whitespace().collect();
                let td = fields.iter().position(|f| *f == "Td").unwrap();
                let y: f64 = fields[td - 1].parse().unwrap();
                assert!(y >= bottom - 1.0, "baseline {y} below margin: {line}");
            }
        }
    }

    #[test]
    fn test_render_produces_loadable_pdf() {
        let blocks = vec![
            Block::Header(Header {
                logo: LogoAsset::WithLogo(logo()),
                logo_size: (144.0, 72.0),
                lines: vec!["LIFTHUB PTY LTD".to_string()],
                style: TextStyle::regular(10.0).aligned(Align::Right),
            }),
            Block::Spacer(20.0),
            Block::Paragraph(Paragraph::new("INVOICE", TextStyle::bold(40.0))),
        ];
        let bytes = renderer()
            .with_info(DocumentInfo {
                title: "Invoice PN-1".to_string(),
                author: "LIFTHUB PTY LTD".to_string(),
            })
            .render(&blocks)
            .unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_write_atomically_replaces_file() {
        let dir = std::env::temp_dir().join(format!("invoice-render-{}", std::process::id()));
        let path = dir.join("nested").join("out.pdf");

        write_atomically(&path, b"first version").unwrap();
        write_atomically(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!dir.join("nested").join("out.pdf.part").exists());
        fs::remove_dir_all(dir).ok();
    }
}
