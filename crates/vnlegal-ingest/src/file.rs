//! File text extraction for the formats legal documents arrive in.

use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use vnlegal_core::{Error, Result};

/// Supported file types for text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PlainText,
    Markdown,
    Pdf,
    Docx,
    Html,
    Csv,
    Json,
    /// Scanned pages; recognized but needs an external OCR engine.
    Image,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "txt" => Self::PlainText,
            "md" | "markdown" => Self::Markdown,
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "html" | "htm" => Self::Html,
            "csv" => Self::Csv,
            "json" => Self::Json,
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => Self::Image,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(path.extension().and_then(|e| e.to_str()).unwrap_or(""))
    }

    /// Whether text can be extracted without OCR.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Image | Self::Unknown)
    }
}

static DOCX_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|</w:p>|<w:tab/>|<w:br\b[^>]*/>").unwrap()
});
static HTML_DROP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style|head)\b.*?</(script|style|head)>").unwrap());
static HTML_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|tr|table|section|article)>").unwrap()
});
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());

/// Extract text content from a file.
pub fn extract_text(path: &Path) -> Result<String> {
    let file_type = FileType::from_path(path);
    debug!("Extracting {:?} text from {}", file_type, path.display());

    match file_type {
        FileType::PlainText | FileType::Markdown | FileType::Csv => read_utf8(path),
        FileType::Json => extract_json(&read_utf8(path)?),
        FileType::Html => Ok(html_to_text(&read_utf8(path)?)),
        FileType::Docx => extract_docx(path),
        FileType::Pdf => extract_pdf(path),
        FileType::Image => Err(Error::Extraction(format!(
            "{} is an image; run OCR first and upload the text",
            path.display()
        ))),
        FileType::Unknown => Err(Error::UnsupportedFile(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        )),
    }
}

fn read_utf8(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

fn extract_pdf(path: &Path) -> Result<String> {
    let text = pdf_extract::extract_text(path)
        .map_err(|e| Error::Extraction(format!("failed to extract text from {}: {}", path.display(), e)))?;
    // pdf_extract separates pages with form feeds.
    Ok(text.replace('\x0c', "\n"))
}

fn extract_docx(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::Extraction(format!("failed to read DOCX as ZIP: {}", e)))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| Error::Extraction(format!("DOCX has no word/document.xml: {}", e)))?
        .read_to_string(&mut xml)?;
    Ok(docx_xml_to_text(&xml))
}

/// Text of WordprocessingML: runs joined, one line per paragraph.
pub fn docx_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    for cap in DOCX_TOKEN.captures_iter(xml) {
        match cap.get(1) {
            Some(run) => out.push_str(&unescape_xml(run.as_str())),
            None => match &cap[0] {
                "<w:tab/>" => out.push('\t'),
                _ => out.push('\n'),
            },
        }
    }
    out.trim_end().to_string()
}

/// Visible text of an HTML page, with block elements as line breaks.
pub fn html_to_text(html: &str) -> String {
    let text = HTML_DROP.replace_all(html, "");
    let text = HTML_BREAK.replace_all(&text, "\n");
    let text = HTML_TAG.replace_all(&text, "");
    unescape_xml(&text).replace("&nbsp;", " ")
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// A JSON string, or the `text`/`content` field of an object, or the JSON itself.
fn extract_json(raw: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let text = match &value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => ["text", "content"]
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
        _ => raw.to_string(),
    };
    Ok(text)
}
