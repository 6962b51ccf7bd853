use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::extraction::BBox;

/// A rectangular area on a page, in PDF points with the origin at the
/// top-left corner.
///
/// Serialized as `[top, left, bottom, right]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rectangle {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl Rectangle {
    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Rectangle {
            top,
            left,
            bottom,
            right,
        }
    }

    /// A box belongs to the rectangle when its centre lies inside it.
    pub fn contains_center_of(&self, bbox: &BBox) -> bool {
        let (x, y) = bbox.center();
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    pub fn is_well_formed(&self) -> bool {
        let bounds = [self.top, self.left, self.bottom, self.right];
        bounds.iter().all(|b| b.is_finite() && *b >= 0.0)
            && self.top < self.bottom
            && self.left < self.right
    }
}

impl From<[f32; 4]> for Rectangle {
    fn from([top, left, bottom, right]: [f32; 4]) -> Self {
        Rectangle::new(top, left, bottom, right)
    }
}

impl From<Rectangle> for [f32; 4] {
    fn from(r: Rectangle) -> Self {
        [r.top, r.left, r.bottom, r.right]
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.top, self.left, self.bottom, self.right
        )
    }
}

/// A named region tried while identifying the supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProbe {
    pub label: String,
    pub region: Rectangle,
}

/// Per-supplier extraction layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierTemplate {
    /// The identifier printed on the invoice (e.g. the supplier's tax number).
    pub supplier_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Area holding the line-item table on every page.
    pub region: Rectangle,
    /// Raw column indices to keep, in output order.
    pub columns: Vec<usize>,
    /// Raw column index -> display label.
    pub names: BTreeMap<usize, String>,
    /// Raw column stripped down to digits and separators.
    #[serde(default = "default_quantity_column")]
    pub quantity_column: usize,
    /// Raw column always exported as text.
    #[serde(default = "default_code_column")]
    pub code_column: usize,
}

fn default_quantity_column() -> usize {
    3
}

fn default_code_column() -> usize {
    0
}

impl SupplierTemplate {
    /// Display labels in output order.
    pub fn headers(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| self.names.get(c).cloned().unwrap_or_else(|| c.to_string()))
            .collect()
    }

    /// Position of the code column in the projected output.
    pub fn code_position(&self) -> Option<usize> {
        self.columns.iter().position(|c| *c == self.code_column)
    }

    /// Smallest raw grid width this template can be applied to.
    pub fn required_width(&self) -> usize {
        self.columns
            .iter()
            .copied()
            .chain(std::iter::once(self.quantity_column))
            .max()
            .map_or(0, |c| c + 1)
    }
}

/// Serialized registry: probe list plus supplier templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Tried in this order; the first match wins.
    pub probes: Vec<CandidateProbe>,
    pub suppliers: Vec<SupplierTemplate>,
}
