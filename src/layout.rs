//! Declarative page content: the blocks the renderer flows onto pages.

use crate::logo::LogoAsset;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// RGB colour, components 0.0 - 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0 }
    }

    pub fn salmon() -> Self {
        Self::from_rgb(250, 128, 114)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub leading: f64,
    pub weight: FontWeight,
    pub color: Color,
    pub align: Align,
}

impl TextStyle {
    pub fn regular(size: f64) -> Self {
        Self {
            size,
            leading: size * 1.2,
            weight: FontWeight::Regular,
            color: Color::black(),
            align: Align::Left,
        }
    }

    pub fn bold(size: f64) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..Self::regular(size)
        }
    }

    pub fn aligned(self, align: Align) -> Self {
        Self { align, ..self }
    }

    pub fn colored(self, color: Color) -> Self {
        Self { color, ..self }
    }
}

/// Text that may span several lines (`\n` separated) and wraps to the
/// available width.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub text: String,
    pub weight: FontWeight,
    pub align: Align,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bold(self) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..self
        }
    }

    pub fn right(self) -> Self {
        Self {
            align: Align::Right,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column widths as fractions of the content width.
    pub columns: Vec<f64>,
    pub rows: Vec<Vec<Cell>>,
    pub font_size: f64,
    /// Vertical padding above and below each row's text.
    pub padding: f64,
    /// Box every cell of the first row.
    pub grid_first_row: bool,
    /// Draw a rule under the last row.
    pub rule_below: bool,
}

impl Table {
    pub fn new(columns: Vec<f64>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            font_size: 10.0,
            padding: 3.0,
            grid_first_row: false,
            rule_below: false,
        }
    }

    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn font_size(self, font_size: f64) -> Self {
        Self { font_size, ..self }
    }

    pub fn padding(self, padding: f64) -> Self {
        Self { padding, ..self }
    }

    pub fn grid_first_row(self) -> Self {
        Self {
            grid_first_row: true,
            ..self
        }
    }

    pub fn rule_below(self) -> Self {
        Self {
            rule_below: true,
            ..self
        }
    }

    /// All cell texts in reading order.
    pub fn texts(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.iter().map(|cell| cell.text.as_str()))
            .collect()
    }
}

/// Company block at the top of the first page. With a logo, the logo takes
/// the left half and the text the right half; without one the text spans
/// the full width.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub logo: LogoAsset,
    /// Logo size in points.
    pub logo_size: (f64, f64),
    pub lines: Vec<String>,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Header(Header),
    Paragraph(Paragraph),
    Table(Table),
    Spacer(f64),
}
