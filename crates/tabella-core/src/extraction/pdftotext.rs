use crate::error::TabellaError;
use crate::extraction::table::grids_for_pages;
use crate::extraction::{BBox, PageScope, PageWords, RawGrid, RegionExtractor, Word};
use crate::registry::schema::Rectangle;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use std::process::Command;

/// Region extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox` to get every word with its bounding box, then
/// keeps the words inside the requested region and rebuilds the grid.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    /// Run `pdftotext -bbox` and parse the word boxes of every page in scope.
    pub fn page_words(&self, pdf: &Path, pages: PageScope) -> Result<Vec<PageWords>, TabellaError> {
        let mut command = Command::new("pdftotext");
        command.arg("-bbox");
        if let PageScope::Only(page) = pages {
            command
                .arg("-f")
                .arg(page.to_string())
                .arg("-l")
                .arg(page.to_string());
        }
        let output = command
            .arg(pdf)
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TabellaError::PdftotextNotFound
                } else {
                    TabellaError::ExtractionFailure(format!("pdftotext -bbox failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TabellaError::PdftotextFailed { code, stderr });
        }

        let first_page = match pages {
            PageScope::All => 1,
            PageScope::Only(page) => page,
        };
        let html = String::from_utf8_lossy(&output.stdout);
        parse_bbox_html(&html, first_page)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionExtractor for PdftotextExtractor {
    fn extract_region(
        &self,
        pdf: &Path,
        region: &Rectangle,
        pages: PageScope,
    ) -> Result<Vec<RawGrid>, TabellaError> {
        let pages = self.page_words(pdf, pages)?;
        let grids = grids_for_pages(&pages, region);
        tracing::debug!(
            region = %region,
            pages = pages.len(),
            grids = grids.len(),
            "pdftotext region extraction"
        );
        Ok(grids)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Parse the XHTML written by `pdftotext -bbox`.
///
/// Pages are numbered from `first_page` in document order.
fn parse_bbox_html(html: &str, first_page: usize) -> Result<Vec<PageWords>, TabellaError> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    let mut pages: Vec<PageWords> = Vec::new();
    let mut current_word: Option<(BBox, String)> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(tag) | Event::Empty(tag) if tag.name().as_ref() == b"page" => {
                pages.push(PageWords {
                    page_number: first_page + pages.len(),
                    words: Vec::new(),
                });
            }
            Event::Start(tag) if tag.name().as_ref() == b"word" => {
                current_word = parse_word_bbox(&tag)?.map(|bbox| (bbox, String::new()));
            }
            Event::Text(text) => {
                if let Some((_, buf)) = current_word.as_mut() {
                    buf.push_str(&text.unescape().map_err(xml_error)?);
                }
            }
            Event::End(tag) if tag.name().as_ref() == b"word" => {
                if let (Some((bbox, text)), Some(page)) = (current_word.take(), pages.last_mut()) {
                    let text = text.trim();
                    if !text.is_empty() {
                        page.words.push(Word {
                            text: text.to_string(),
                            bbox,
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

fn parse_word_bbox(tag: &BytesStart<'_>) -> Result<Option<BBox>, TabellaError> {
    let x_min = parse_attr_f32(tag, b"xMin")?;
    let y_min = parse_attr_f32(tag, b"yMin")?;
    let x_max = parse_attr_f32(tag, b"xMax")?;
    let y_max = parse_attr_f32(tag, b"yMax")?;
    Ok(match (x_min, y_min, x_max, y_max) {
        (Some(x_min), Some(y_min), Some(x_max), Some(y_max)) => Some(BBox {
            x_min,
            y_min,
            x_max,
            y_max,
        }),
        _ => None,
    })
}

fn parse_attr_f32(tag: &BytesStart<'_>, name: &[u8]) -> Result<Option<f32>, TabellaError> {
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| {
            TabellaError::ExtractionFailure(format!("malformed pdftotext attribute: {e}"))
        })?;
        if attr.key.as_ref() == name {
            let value = attr.unescape_value().map_err(xml_error)?;
            return Ok(value.trim().parse().ok());
        }
    }
    Ok(None)
}

fn xml_error(e: quick_xml::Error) -> TabellaError {
    TabellaError::ExtractionFailure(format!("could not parse pdftotext output: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<title></title>
<meta name="Producer" content="test"/>
<meta http-equiv="Content-Type" content="text/html; charset=UTF-8"/>
</head>
<body>
<doc>
  <page width="595.000000" height="842.000000">
    <word xMin="420.500000" yMin="53.000000" xMax="462.100000" yMax="61.000000">094384144</word>
    <word xMin="10.000000" yMin="300.000000" xMax="30.000000" yMax="310.000000">A&amp;B</word>
  </page>
  <page width="595.000000" height="842.000000">
  </page>
</doc>
</body>
</html>
"#;

    #[test]
    fn test_parse_bbox_html_pages_and_words() {
        let pages = parse_bbox_html(SAMPLE, 1).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].words.len(), 2);
        assert_eq!(pages[0].words[0].text, "094384144");
        assert_eq!(pages[0].words[0].bbox.x_min, 420.5);
        assert_eq!(pages[0].words[1].text, "A&B");
        assert_eq!(pages[1].page_number, 2);
        assert!(pages[1].words.is_empty());
    }

    #[test]
    fn test_parse_bbox_html_numbers_from_first_page() {
        let pages = parse_bbox_html(SAMPLE, 4).unwrap();
        assert_eq!(pages[0].page_number, 4);
        assert_eq!(pages[1].page_number, 5);
    }

    #[test]
    fn test_probe_region_picks_supplier_code() {
        let pages = parse_bbox_html(SAMPLE, 1).unwrap();
        let region = Rectangle::new(52.3, 420.0, 63.0, 466.0);
        let grids = grids_for_pages(&pages, &region);
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].first_cell(), Some("094384144"));
    }
}
