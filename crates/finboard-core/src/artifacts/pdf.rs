//! PDF rendition of insight reports
//!
//! Laid out on A4 pages with the built-in Helvetica fonts, so no font file is
//! embedded. Text is word-wrapped and flows onto as many pages as it needs.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Language;

use super::{Artifact, PDF_MIME};

/// Document title stored in the PDF metadata
pub const PDF_TITLE: &str = "AI Savings Recommendations";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const FONT_SIZE: f32 = 12.0;
const LEADING: f32 = 5.6;
const WRAP_COLUMNS: usize = 80;

/// Download name for a report in `language`
pub fn pdf_file_name(language: Language) -> String {
    format!("savings_insights_{}.pdf", language.as_str().to_lowercase())
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    bold: bool,
    text: String,
}

impl Line {
    fn blank() -> Self {
        Self {
            bold: false,
            text: String::new(),
        }
    }
}

/// A titled single-column text document
#[derive(Debug, Clone)]
pub struct PdfReport {
    title: String,
    heading: String,
    body: String,
    language: Language,
}

impl PdfReport {
    pub fn for_insights(text: &str, language: Language) -> Self {
        Self {
            title: PDF_TITLE.to_string(),
            heading: format!("AI-Powered Savings Insights ({})", language.as_str()),
            body: text.to_string(),
            language,
        }
    }

    pub fn file_name(&self) -> String {
        pdf_file_name(self.language)
    }

    /// Render and write to a temporary file
    pub fn write(&self) -> Result<Artifact> {
        let bytes = self.to_bytes()?;
        if bytes.is_empty() {
            return Err(Error::Document("empty PDF output".into()));
        }
        Artifact::write_temp(&self.file_name(), PDF_MIME, bytes)
    }

    fn lines(&self) -> Vec<Line> {
        let mut lines = vec![
            Line {
                bold: true,
                text: self.heading.clone(),
            },
            Line::blank(),
        ];

        for paragraph in self.body.lines() {
            if paragraph.trim().is_empty() {
                lines.push(Line::blank());
                continue;
            }
            for wrapped in textwrap::wrap(paragraph, WRAP_COLUMNS) {
                lines.push(Line {
                    bold: false,
                    text: wrapped.into_owned(),
                });
            }
        }
        lines
    }

    fn pages(&self) -> Vec<Vec<Line>> {
        let lines_per_page = ((PAGE_HEIGHT - 2.0 * MARGIN) / LEADING).floor() as usize;
        self.lines()
            .chunks(lines_per_page)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let pages = self.pages();
        let (doc, first_page, first_layer) =
            PdfDocument::new(&self.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let regular = builtin_font(&doc, BuiltinFont::Helvetica)?;
        let bold = builtin_font(&doc, BuiltinFont::HelveticaBold)?;

        for (i, page_lines) in pages.iter().enumerate() {
            let (page, layer) = if i == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Page {}", i + 1))
            };
            let layer = doc.get_page(page).get_layer(layer);

            let mut y = PAGE_HEIGHT - MARGIN;
            for line in page_lines {
                if !line.text.is_empty() {
                    let font = if line.bold { &bold } else { &regular };
                    layer.use_text(line.text.as_str(), FONT_SIZE, Mm(MARGIN), Mm(y), font);
                }
                y -= LEADING;
            }
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| Error::Document(e.to_string()))?;
        debug!(pages = pages.len(), size = bytes.len(), "PDF rendered");
        Ok(bytes)
    }
}

fn builtin_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| Error::Document(e.to_string()))
}
