use crate::error::TabellaError;
use lopdf::{Document, Object};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Size of the first page of a PDF, taken from its `MediaBox`.
///
/// The box may be inherited from an ancestor `Pages` node.
pub fn first_page_size(pdf: &Path) -> Result<PageSize, TabellaError> {
    let document = Document::load(pdf)?;
    let size = page_size(&document, 1)?;
    tracing::info!(
        "The PDF size is {} points wide and {} points high.",
        size.width,
        size.height
    );
    Ok(size)
}

/// Size of a 1-based page of an already loaded document.
pub fn page_size(document: &Document, page_number: u32) -> Result<PageSize, TabellaError> {
    let page_id = document
        .get_pages()
        .get(&page_number)
        .copied()
        .ok_or_else(|| TabellaError::Geometry(format!("page {page_number} does not exist")))?;

    // Malformed page trees can link a node back to itself through `Parent`.
    let mut visited = BTreeSet::from([page_id]);
    let mut dict = document.get_dictionary(page_id)?;
    let media_box = loop {
        if let Ok(found) = dict.get(b"MediaBox") {
            break resolve(document, found)?;
        }
        dict = match dict.get(b"Parent") {
            Ok(Object::Reference(id)) => {
                if !visited.insert(*id) {
                    return Err(TabellaError::Geometry(format!(
                        "MediaBox lookup loops for page {page_number}"
                    )));
                }
                document.get_dictionary(*id)?
            }
            Ok(other) => other.as_dict()?,
            Err(_) => {
                return Err(TabellaError::Geometry(format!(
                    "page {page_number} has no MediaBox"
                )))
            }
        };
    };

    let bounds = media_box
        .as_array()?
        .iter()
        .map(|o| resolve(document, o).and_then(number))
        .collect::<Result<Vec<f32>, TabellaError>>()?;
    match bounds.as_slice() {
        [x0, y0, x1, y1] => Ok(PageSize {
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }),
        _ => Err(TabellaError::Geometry(format!(
            "MediaBox has {} entries, expected 4",
            bounds.len()
        ))),
    }
}

fn resolve<'a>(document: &'a Document, obj: &'a Object) -> Result<&'a Object, TabellaError> {
    match obj {
        Object::Reference(id) => Ok(document.get_object(*id)?),
        other => Ok(other),
    }
}

fn number(obj: &Object) -> Result<f32, TabellaError> {
    match obj {
        Object::Integer(i) => Ok(*i as f32),
        Object::Real(r) => Ok(*r as f32),
        other => Err(TabellaError::Geometry(format!(
            "MediaBox entry is not a number: {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn document_with_boxes(parent_box: Option<Vec<Object>>, page_box: Option<Vec<Object>>) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        if let Some(b) = page_box {
            page.set("MediaBox", b);
        }
        let page_id = doc.add_object(page);

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        if let Some(b) = parent_box {
            pages.set("MediaBox", b);
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_inherited_media_box() {
        let doc = document_with_boxes(
            Some(vec![0.into(), 0.into(), 595.into(), 842.into()]),
            None,
        );
        let size = page_size(&doc, 1).unwrap();
        assert_eq!(size, PageSize { width: 595.0, height: 842.0 });
    }

    #[test]
    fn test_page_media_box_wins() {
        let doc = document_with_boxes(
            Some(vec![0.into(), 0.into(), 595.into(), 842.into()]),
            Some(vec![0.into(), 0.into(), 612.into(), Object::Real(792.0)]),
        );
        let size = page_size(&doc, 1).unwrap();
        assert_eq!(size, PageSize { width: 612.0, height: 792.0 });
    }

    #[test]
    fn test_missing_media_box() {
        let doc = document_with_boxes(None, None);
        assert!(matches!(page_size(&doc, 1), Err(TabellaError::Geometry(_))));
    }

    #[test]
    fn test_parent_cycle_without_media_box() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();
        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => page_id,
            }),
        );
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        match page_size(&doc, 1) {
            Err(TabellaError::Geometry(msg)) => assert!(msg.contains("loops"), "{msg}"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_page() {
        let doc = document_with_boxes(None, None);
        assert!(matches!(page_size(&doc, 3), Err(TabellaError::Geometry(_))));
    }

    #[test]
    fn test_first_page_size_from_file() {
        let mut doc = document_with_boxes(
            Some(vec![0.into(), 0.into(), 595.into(), 842.into()]),
            None,
        );
        let file = tempfile::NamedTempFile::new().unwrap();
        doc.save(file.path()).unwrap();
        let size = first_page_size(file.path()).unwrap();
        assert_eq!(size.width, 595.0);
    }

    #[test]
    fn test_first_page_size_rejects_garbage() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a pdf").unwrap();
        assert!(matches!(
            first_page_size(file.path()),
            Err(TabellaError::PdfLoad(_))
        ));
    }
}
