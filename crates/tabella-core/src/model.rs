use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Number(Decimal),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Number,
}

/// The assembled line-item table for one invoice.
///
/// Rows keep page order, then row order within each page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalTable {
    pub supplier_id: String,
    pub headers: Vec<String>,
    pub column_kinds: Vec<ColumnKind>,
    pub rows: Vec<Vec<CellValue>>,
}

impl FinalTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, header: &str) -> Option<Vec<&CellValue>> {
        let index = self.column_index(header)?;
        Some(self.rows.iter().filter_map(|r| r.get(index)).collect())
    }
}

/// Renders the table as an aligned text grid with a leading row index.
impl fmt::Display for FinalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();

        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                rendered
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:width$}", "", width = index_width)?;
        for (h, w) in self.headers.iter().zip(&widths) {
            write!(f, "  {:<w$}", h, w = *w)?;
        }
        for (i, row) in rendered.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{:>width$}", i, width = index_width)?;
            for (cell, w) in row.iter().zip(&widths) {
                write!(f, "  {:<w$}", cell, w = *w)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> FinalTable {
        FinalTable {
            supplier_id: "1".into(),
            headers: vec!["ΚΩΔΙΚΟΣ".into(), "ΤΙΜΗ".into()],
            column_kinds: vec![ColumnKind::Text, ColumnKind::Number],
            rows: vec![
                vec![CellValue::Text("0012".into()), CellValue::Number(dec!(2.50))],
                vec![CellValue::Text("7".into()), CellValue::Empty],
            ],
        }
    }

    #[test]
    fn test_display_aligns_columns() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "   ΚΩΔΙΚΟΣ  ΤΙΜΗ");
        assert_eq!(lines[1], "0  0012     2.50");
        assert_eq!(lines[2], "1  7            ");
    }

    #[test]
    fn test_column_lookup() {
        let table = sample();
        let codes: Vec<String> = table
            .column("ΚΩΔΙΚΟΣ")
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(codes, vec!["0012", "7"]);
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_untagged_serialization() {
        let json = serde_json::to_string(&sample().rows[0]).unwrap();
        assert_eq!(json, r#"["0012","2.50"]"#);
    }
}
