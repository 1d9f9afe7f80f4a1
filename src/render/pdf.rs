//! PDF object assembly for laid-out pages.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Document, Object, Stream, StringFormat, dictionary};
use std::io::Write;

use super::metrics::Font;
use super::{PageGeometry, PagePlan};
use crate::error::{InvoiceError, Result};

/// Document information dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
}

pub(super) fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

pub(super) fn assemble(
    geometry: &PageGeometry,
    plan: &PagePlan,
    info: &DocumentInfo,
) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }

    let mut resources = dictionary! { "Font" => fonts };
    if !plan.images.is_empty() {
        let mut xobjects = Dictionary::new();
        for (index, image) in plan.images.iter().enumerate() {
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width as i64,
                    "Height" => image.height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8_i64,
                    "Filter" => "FlateDecode",
                },
                deflate(&image.rgb)?,
            );
            xobjects.set(image_name(index), doc.add_object(stream));
        }
        resources.set("XObject", xobjects);
    }
    let resources_id = doc.add_object(resources);

    let mut kids = Vec::with_capacity(plan.pages.len());
    for content in &plan.pages {
        let stream = Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            deflate(content.as_bytes())?,
        );
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![real(0.0), real(0.0), real(geometry.width), real(geometry.height)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(&info.title), StringFormat::Literal),
        "Author" => Object::String(encode_win_ansi(&info.author), StringFormat::Literal),
        "Producer" => Object::string_literal(env!("CARGO_PKG_NAME")),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| InvoiceError::RenderFailure(format!("failed to serialize PDF: {e}")))?;
    Ok(bytes)
}

fn real(value: f64) -> Object {
    Object::Real(value as _)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Maps text onto WinAnsiEncoding, the encoding declared for the standard
/// fonts. Characters it cannot represent become `?`.
pub(super) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{A0}'..='\u{FF}' => ch as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// A PDF literal string, e.g. `(Pay To:)`. Bytes outside printable ASCII
/// are written as octal escapes so the content stream stays ASCII.
pub(super) fn literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for byte in encode_win_ansi(text) {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            }
            0x20..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_escapes() {
        assert_eq!(literal("INVOICE"), "(INVOICE)");
        assert_eq!(literal("Savaria (Australia)"), "(Savaria \\(Australia\\))");
        assert_eq!(literal("a\\b"), "(a\\\\b)");
        assert_eq!(literal("Café"), "(Caf\\351)");
        assert_eq!(literal("日"), "(?)");
    }

    #[test]
    fn test_deflate_round_trip() {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        let packed = deflate(b"BT ET").unwrap();
        let mut out = String::new();
        ZlibDecoder::new(packed.as_slice()).read_to_string(&mut out).unwrap();
        assert_eq!(out, "BT ET");
    }
}
