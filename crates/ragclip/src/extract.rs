//! Multi-format text extraction.
//!
//! Dispatches on the lowercase file extension:
//!
//! | Extension | Reader |
//! |-----------|--------|
//! | `txt`, `md` | UTF-8 (lossy) |
//! | `pdf` | `pdf-extract` |
//! | `docx` | `word/document.xml` via `zip` + `quick-xml`, one line per paragraph |
//! | `xlsx` | worksheets via `zip` + `quick-xml`, one line per row |
//! | `html`, `htm` | tag stripper, `script`/`style` dropped |
//!
//! [`extract_bytes`] returns a typed [`ExtractError`]; [`extract_file`] is
//! the pipeline entry point and never fails: errors are logged and the
//! file is treated as empty, so it is retried on the next run.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use thiserror::Error;
use tracing::warn;

/// Maximum sheets to process in an xlsx.
const XLSX_MAX_SHEETS: usize = 100;
/// Maximum cells to process per sheet (avoids unbounded memory).
const XLSX_MAX_CELLS_PER_SHEET: usize = 100_000;
/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("OOXML extraction failed: {0}")]
    Ooxml(String),
}

/// Lowercase extension of `path`, without the dot.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Best-effort text of the file at `path`. Returns an empty string (and
/// logs a warning) when the file cannot be read or parsed.
pub fn extract_file(path: &Path, max_bytes: u64) -> String {
    match try_extract_file(path, max_bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "skipping file");
            String::new()
        }
    }
}

fn try_extract_file(path: &Path, max_bytes: u64) -> Result<String, ExtractError> {
    let ext = extension_of(path);
    if !is_supported(&ext) {
        return Err(ExtractError::Unsupported(ext));
    }
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(ExtractError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let bytes = std::fs::read(path)?;
    extract_bytes(&bytes, &ext)
}

pub fn is_supported(ext: &str) -> bool {
    matches!(ext, "txt" | "md" | "pdf" | "docx" | "xlsx" | "html" | "htm")
}

/// Extract plain text from `bytes` of a file with extension `ext`.
pub fn extract_bytes(bytes: &[u8], ext: &str) -> Result<String, ExtractError> {
    match ext {
        "txt" | "md" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "pdf" => extract_pdf(bytes),
        "docx" => extract_docx(bytes),
        "xlsx" => extract_xlsx(bytes),
        "html" | "htm" => Ok(extract_html(&String::from_utf8_lossy(bytes))),
        other => Err(ExtractError::Unsupported(other.to_string())),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed documents.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(result) => result.map_err(|e| ExtractError::Pdf(e.to_string())),
        Err(_) => Err(ExtractError::Pdf("parser panicked".to_string())),
    }
}

type Archive<'a> = zip::ZipArchive<std::io::Cursor<&'a [u8]>>;

fn open_archive(bytes: &[u8]) -> Result<Archive<'_>, ExtractError> {
    zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Ooxml(e.to_string()))
}

fn read_zip_entry_bounded(
    archive: &mut Archive<'_>,
    name: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, ExtractError> {
    let entry = archive
        .by_name(name)
        .map_err(|e| ExtractError::Ooxml(format!("{}: {}", name, e)))?;
    let mut out = Vec::new();
    entry.take(max_bytes).read_to_end(&mut out)?;
    if out.len() as u64 >= max_bytes {
        return Err(ExtractError::Ooxml(format!(
            "ZIP entry {} exceeds size limit ({} bytes)",
            name, max_bytes
        )));
    }
    Ok(out)
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = open_archive(bytes)?;
    let xml = read_zip_entry_bounded(&mut archive, "word/document.xml", MAX_XML_ENTRY_BYTES)?;
    docx_paragraphs(&xml)
}

/// Text of every `w:p`, one paragraph per line.
fn docx_paragraphs(xml: &[u8]) -> Result<String, ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_t = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_t = true;
                }
            }
            Ok(Event::Text(te)) if in_t => {
                let text = te.unescape().map_err(|e| ExtractError::Ooxml(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                b"p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}

fn extract_xlsx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = open_archive(bytes)?;
    let shared_strings = if archive.file_names().any(|n| n == "xl/sharedStrings.xml") {
        let xml =
            read_zip_entry_bounded(&mut archive, "xl/sharedStrings.xml", MAX_XML_ENTRY_BYTES)?;
        read_shared_strings(&xml)?
    } else {
        Vec::new()
    };

    let mut sheets = Vec::new();
    for name in list_worksheet_names(&archive).into_iter().take(XLSX_MAX_SHEETS) {
        let xml = read_zip_entry_bounded(&mut archive, &name, MAX_XML_ENTRY_BYTES)?;
        let rows = extract_sheet_rows(&xml, &shared_strings)?;
        if !rows.is_empty() {
            sheets.push(rows);
        }
    }
    Ok(sheets.join("\n"))
}

/// One string per `si`, rich-text runs concatenated.
fn read_shared_strings(xml: &[u8]) -> Result<Vec<String>, ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_t = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_t = true,
                _ => {}
            },
            Ok(Event::Text(te)) if in_t => {
                let text = te.unescape().map_err(|e| ExtractError::Ooxml(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"si" => strings.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

fn list_worksheet_names(archive: &Archive<'_>) -> Vec<String> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    names.sort_by_key(|name| {
        name.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    names
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Shared,
    Inline,
    Value,
}

/// Cells of each `row` joined with tabs, one row per line.
fn extract_sheet_rows(xml: &[u8], shared_strings: &[String]) -> Result<String, ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut rows: Vec<String> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut kind = CellKind::Value;
    let mut in_text = false;
    let mut cell_text = String::new();
    let mut cell_count = 0usize;

    loop {
        if cell_count >= XLSX_MAX_CELLS_PER_SHEET {
            break;
        }
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"c" => {
                    kind = CellKind::Value;
                    cell_text.clear();
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"t" {
                            kind = match attr.value.as_ref() {
                                b"s" => CellKind::Shared,
                                b"inlineStr" => CellKind::Inline,
                                _ => CellKind::Value,
                            };
                        }
                    }
                }
                b"v" => in_text = kind != CellKind::Inline,
                b"t" => in_text = kind == CellKind::Inline,
                _ => {}
            },
            Ok(Event::Text(te)) if in_text => {
                let text = te.unescape().map_err(|e| ExtractError::Ooxml(e.to_string()))?;
                cell_text.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_text = false,
                b"c" => {
                    let value = match kind {
                        CellKind::Shared => cell_text
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .and_then(|i| shared_strings.get(i).cloned())
                            .unwrap_or_default(),
                        _ => cell_text.trim().to_string(),
                    };
                    if !value.is_empty() {
                        row.push(value);
                        cell_count += 1;
                    }
                }
                b"row" => {
                    if !row.is_empty() {
                        rows.push(row.join("\t"));
                        row.clear();
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    if !row.is_empty() {
        rows.push(row.join("\t"));
    }
    Ok(rows.join("\n"))
}

/// Tags that end a line of visible text.
const HTML_BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "td", "th", "title", "tr", "ul",
];

/// Visible text of an HTML document, block elements separated by newlines.
pub fn extract_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        out.push_str(&decode_entities(&rest[..lt]));
        let after = &rest[lt + 1..];

        // Only a name, `/`, `!` or `?` opens a tag. Anything else is text.
        let opens_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        if !opens_tag {
            out.push('<');
            rest = after;
            continue;
        }

        if let Some(comment) = after.strip_prefix("!--") {
            rest = comment.find("-->").map(|i| &comment[i + 3..]).unwrap_or("");
            continue;
        }

        let Some(gt) = after.find('>') else {
            rest = "";
            break;
        };
        let tag = &after[..gt];
        rest = &after[gt + 1..];

        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if !tag.starts_with('/') && (name == "script" || name == "style") {
            let close = format!("</{}", name);
            let lower = rest.to_ascii_lowercase();
            rest = match lower.find(&close) {
                Some(i) => rest[i..].find('>').map(|j| &rest[i + j + 1..]).unwrap_or(""),
                None => "",
            };
            continue;
        }

        if HTML_BLOCK_TAGS.contains(&name.as_str()) {
            out.push('\n');
        } else {
            out.push(' ');
        }
    }
    out.push_str(&decode_entities(rest));

    out.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &after[..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
