use crate::error::TabellaError;
use crate::extraction::{PageScope, RawGrid, RegionExtractor};
use crate::model::{CellValue, ColumnKind, FinalTable};
use crate::registry::schema::SupplierTemplate;
use crate::registry::Registry;
use regex::Regex;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

static NON_QUANTITY_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d.,]").expect("quantity filter is a valid regex"));

/// Strip everything except digits, periods and commas.
///
/// `clean_quantity("1.234,56kg") == "1.234,56"`.
pub fn clean_quantity(raw: &str) -> String {
    NON_QUANTITY_CHARS.replace_all(raw, "").into_owned()
}

/// Pick `columns` out of a raw row, in that order.
pub fn project_row(row: &[String], columns: &[usize]) -> Vec<String> {
    columns
        .iter()
        .map(|&c| row.get(c).cloned().unwrap_or_default())
        .collect()
}

/// A column is numeric when it has at least one value and every non-empty
/// value parses as a decimal.
pub fn infer_column_kind<'a>(values: impl IntoIterator<Item = &'a str>) -> ColumnKind {
    let mut seen = false;
    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if Decimal::from_str(value).is_err() {
            return ColumnKind::Text;
        }
        seen = true;
    }
    if seen {
        ColumnKind::Number
    } else {
        ColumnKind::Text
    }
}

/// Turns a resolved supplier id into the final line-item table.
pub struct TableBuilder<'a> {
    extractor: &'a dyn RegionExtractor,
    registry: &'a Registry,
}

impl<'a> TableBuilder<'a> {
    pub fn new(extractor: &'a dyn RegionExtractor, registry: &'a Registry) -> Self {
        TableBuilder {
            extractor,
            registry,
        }
    }

    pub fn build(&self, pdf: &Path, supplier_id: &str) -> Result<FinalTable, TabellaError> {
        let template = self
            .registry
            .template(supplier_id)
            .ok_or_else(|| TabellaError::UnknownSupplier(supplier_id.to_string()))?;

        tracing::info!(
            supplier = supplier_id,
            region = %template.region,
            backend = self.extractor.backend_name(),
            "extracting line-item table"
        );
        let grids = self
            .extractor
            .extract_region(pdf, &template.region, PageScope::All)?;
        if grids.is_empty() {
            return Err(TabellaError::RegionExtractionMiss {
                supplier_id: supplier_id.to_string(),
                region: template.region,
            });
        }

        let table = assemble(template, &grids)?;
        tracing::info!(
            supplier = %table.supplier_id,
            rows = table.row_count(),
            pages = grids.len(),
            "assembled line-item table\n{table}"
        );
        Ok(table)
    }
}

/// Clean, project and concatenate per-page grids according to `template`.
pub fn assemble(template: &SupplierTemplate, grids: &[RawGrid]) -> Result<FinalTable, TabellaError> {
    let required = template.required_width();
    let mut projected: Vec<Vec<String>> = Vec::new();

    for grid in grids.iter().filter(|g| !g.is_empty()) {
        let width = grid.width();
        if width < required {
            return Err(TabellaError::ColumnOutOfRange {
                page: grid.page_number,
                column: required - 1,
                width,
            });
        }

        for row in &grid.rows {
            let mut row = row.clone();
            if let Some(quantity) = row.get_mut(template.quantity_column) {
                *quantity = clean_quantity(quantity);
            }
            projected.push(project_row(&row, &template.columns));
        }
    }

    let code_position = template.code_position();
    let column_kinds: Vec<ColumnKind> = (0..template.columns.len())
        .map(|i| {
            if Some(i) == code_position {
                ColumnKind::Text
            } else {
                infer_column_kind(projected.iter().map(|r| r[i].as_str()))
            }
        })
        .collect();

    let rows: Vec<Vec<CellValue>> = projected
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&column_kinds)
                .map(|(cell, kind)| to_cell(cell, *kind))
                .collect()
        })
        .collect();

    if let Some(code) = code_position {
        let missing = rows.iter().filter(|r| r[code].is_empty()).count();
        if missing > 0 {
            tracing::warn!(
                supplier = %template.supplier_id,
                rows = missing,
                "rows without a code were kept"
            );
        }
    }

    Ok(FinalTable {
        supplier_id: template.supplier_id.clone(),
        headers: template.headers(),
        column_kinds,
        rows,
    })
}

fn to_cell(raw: String, kind: ColumnKind) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match kind {
        ColumnKind::Number => Decimal::from_str(trimmed)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Text(raw)),
        ColumnKind::Text => CellValue::Text(trimmed.to_string()),
    }
}
