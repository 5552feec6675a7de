//! PDF export: title + body text → paginated PDF bytes.
//!
//! ## Data Flow
//!
//! ```text
//! title, body ──▶ layout ──▶ content streams ──▶ lopdf Document ──▶ bytes
//!                (wrap,       (BT/Tf/rg/Td/Tj)
//!                 paginate)
//! ```
//!
//! User text only ever reaches the PDF as the operand of a `Tj` string
//! literal. It is first re-encoded to WinAnsi (unsupported characters become
//! `?`), then lopdf's literal-string writer escapes `(`, `)` and `\`, so no
//! input can close the string and inject operators of its own.

pub mod fonts;
pub mod layout;

use crate::error::ExportError;
use fonts::{encode_win_ansi, Font};
use layout::{layout, LineKind, Page, PageGeometry, TextStyle};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

/// Title and body to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub title: String,
    pub body: String,
}

impl ExportDocument {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Render with the default exporter.
    pub fn to_pdf(&self) -> Result<Vec<u8>, ExportError> {
        DocumentExporter::default().export(&self.title, &self.body)
    }
}

/// Fixed-layout renderer: one title paragraph, one body paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentExporter {
    pub geometry: PageGeometry,
    pub title_style: TextStyle,
    pub body_style: TextStyle,
}

impl Default for DocumentExporter {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::a4(),
            title_style: TextStyle::title(),
            body_style: TextStyle::body(),
        }
    }
}

impl DocumentExporter {
    /// Render `title` and `body` to PDF bytes.
    ///
    /// The body may be empty or arbitrarily long; only an empty title is
    /// rejected. A whitespace-only title renders as a blank title line.
    pub fn export(&self, title: &str, body: &str) -> Result<Vec<u8>, ExportError> {
        if title.is_empty() {
            return Err(ExportError::EmptyTitle);
        }

        let pages = layout(
            title,
            body,
            &self.geometry,
            &self.title_style,
            &self.body_style,
        );
        debug!("PDF export: {} page(s), body {} chars", pages.len(), body.len());

        let mut doc = self.build_document(title, &pages)?;
        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        Ok(buf)
    }

    fn build_document(&self, title: &str, pages: &[Page]) -> Result<Document, ExportError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(font_dictionary(Font::Helvetica));
        let bold = doc.add_object(font_dictionary(Font::HelveticaBold));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                Font::Helvetica.resource_name() => regular,
                Font::HelveticaBold.resource_name() => bold,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in pages {
            let content = self.page_content(page);
            let encoded = content
                .encode()
                .map_err(|e| ExportError::Encode(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(self.geometry.width),
                Object::Real(self.geometry.height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_win_ansi(title)),
            "Producer" => Object::string_literal(concat!("edgequake-art ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Info", info_id);

        Ok(doc)
    }

    fn page_content(&self, page: &Page) -> Content {
        let mut operations = Vec::new();
        for line in page.lines.iter().filter(|l| !l.text.is_empty()) {
            let style = match line.kind {
                LineKind::Title => &self.title_style,
                LineKind::Body => &self.body_style,
            };
            let [r, g, b] = style.color;
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![style.font.resource_name().into(), Object::Real(style.size)],
                ),
                Operation::new(
                    "rg",
                    vec![Object::Real(r), Object::Real(g), Object::Real(b)],
                ),
                Operation::new("Td", vec![Object::Real(line.x), Object::Real(line.y)]),
                Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(&line.text))]),
                Operation::new("ET", vec![]),
            ]);
        }
        Content { operations }
    }
}

fn font_dictionary(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Render `title` and `body` with the default A4 layout.
pub fn export_pdf(title: &str, body: &str) -> Result<Vec<u8>, ExportError> {
    DocumentExporter::default().export(title, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decode every `Tj` operand of every page, in page order.
    fn shown_strings(pdf: &[u8]) -> Vec<Vec<u8>> {
        let doc = Document::load_mem(pdf).expect("valid pdf");
        let mut out = Vec::new();
        for (_, page_id) in doc.get_pages() {
            let raw = doc.get_page_content(page_id).expect("page content");
            let content = Content::decode(&raw).expect("decodable content");
            for op in content.operations {
                if op.operator == "Tj" {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        out.push(bytes.clone());
                    }
                }
            }
        }
        out
    }

    fn page_count(pdf: &[u8]) -> usize {
        Document::load_mem(pdf).expect("valid pdf").get_pages().len()
    }

    #[test]
    fn produces_pdf_bytes() {
        let pdf = export_pdf("AI Art Prompt", "A misty harbour at dawn").unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));
        assert_eq!(page_count(&pdf), 1);
    }

    #[test]
    fn empty_body_still_renders() {
        let pdf = export_pdf("Art Style Report", "").unwrap();
        assert!(!pdf.is_empty());
        assert_eq!(shown_strings(&pdf), vec![b"Art Style Report".to_vec()]);
    }

    #[test]
    fn empty_title_rejected() {
        assert!(matches!(
            export_pdf("", "body"),
            Err(ExportError::EmptyTitle)
        ));
    }

    #[test]
    fn whitespace_title_renders_blank_line() {
        let pdf = export_pdf(" ", "body").unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(page_count(&pdf), 1);
        assert_eq!(shown_strings(&pdf), vec![b"body".to_vec()]);
    }

    #[test]
    fn markup_characters_render_literally() {
        let title = "Tom & Jerry <b>(draft)</b> \\ end";
        let body = "x) Tj ET BT (injected";
        let pdf = export_pdf(title, body).unwrap();
        let shown = shown_strings(&pdf);
        assert_eq!(shown, vec![title.as_bytes().to_vec(), body.as_bytes().to_vec()]);
    }

    #[test]
    fn newlines_become_line_breaks() {
        let pdf = export_pdf("T", "one\ntwo\nthree").unwrap();
        let shown = shown_strings(&pdf);
        assert_eq!(
            shown,
            vec![b"T".to_vec(), b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn long_body_paginates() {
        let body = "A cinematic wide shot of a lighthouse. ".repeat(2_000);
        let pdf = export_pdf("Creative Workflow Report", &body).unwrap();
        assert!(page_count(&pdf) > 1);
    }

    #[test]
    fn non_latin_text_is_replaced_not_rejected() {
        let pdf = export_pdf("🎨 Prompt", "水彩 watercolor").unwrap();
        let shown = shown_strings(&pdf);
        assert_eq!(shown[0], b"? Prompt".to_vec());
        assert_eq!(shown[1], b"?? watercolor".to_vec());
    }

    #[test]
    fn export_document_helper() {
        let doc = ExportDocument::new("Title", "Body");
        assert!(!doc.to_pdf().unwrap().is_empty());
    }
}
