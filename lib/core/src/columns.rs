// Header detection and column roles

use crate::cell::{CellValue, Row};
use crate::config::KeywordSets;
use crate::normalize::normalize;
use serde::Serialize;

/// Where the header sits and where data rows begin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderLayout {
    /// Grid index of the header row
    pub header_row: usize,
    /// Grid index of the first data row
    pub data_start: usize,
}

impl HeaderLayout {
    /// Detect the header row of a grid.
    ///
    /// A first row with exactly one non-empty cell, followed by another row,
    /// is a title banner: the real header is the second row and data starts
    /// on the third.
    pub fn detect(grid: &[Row]) -> Self {
        let banner = grid
            .first()
            .map(|first| first.iter().filter(|c| !c.is_blank()).count() == 1)
            .unwrap_or(false);

        if banner && grid.len() > 1 {
            Self { header_row: 1, data_start: 2 }
        } else {
            Self { header_row: 0, data_start: 1 }
        }
    }

    pub fn header<'a>(&self, grid: &'a [Row]) -> &'a [CellValue] {
        grid.get(self.header_row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn data<'a>(&self, grid: &'a [Row]) -> &'a [Row] {
        grid.get(self.data_start..).unwrap_or(&[])
    }
}

/// One header column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderColumn {
    pub index: usize,
    /// Header text as it appears in the sheet
    pub name: String,
    pub normalized: String,
}

/// Ordered header columns of a sheet
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HeaderMap {
    pub columns: Vec<HeaderColumn>,
}

impl HeaderMap {
    pub fn from_row(header: &[CellValue]) -> Self {
        let columns = header
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let name = cell.as_text().trim().to_string();
                HeaderColumn {
                    index,
                    normalized: normalize(&name),
                    name,
                }
            })
            .collect();
        Self { columns }
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.name.as_str())
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Detected column roles for one sheet
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ColumnRoles {
    pub identifier: Option<usize>,
    pub subjects: Vec<usize>,
}

impl ColumnRoles {
    /// Classify header columns. The identifier column is the first whose
    /// normalized name contains an identifier keyword; subject columns are
    /// all columns containing a subject keyword.
    pub fn classify(header: &HeaderMap, keywords: &KeywordSets) -> Self {
        let identifier = header
            .columns
            .iter()
            .find(|c| keywords.is_identifier(&c.normalized))
            .map(|c| c.index);

        let subjects = header
            .columns
            .iter()
            .filter(|c| keywords.is_subject(&c.normalized))
            .map(|c| c.index)
            .collect();

        Self { identifier, subjects }
    }

    pub fn has_identifier(&self) -> bool {
        self.identifier.is_some()
    }

    pub fn has_subjects(&self) -> bool {
        !self.subjects.is_empty()
    }
}

/// Header and roles for a grid, computed once per sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub layout: HeaderLayout,
    pub header: HeaderMap,
    pub roles: ColumnRoles,
}

impl SheetLayout {
    pub fn analyze(grid: &[Row], keywords: &KeywordSets) -> Self {
        let layout = HeaderLayout::detect(grid);
        let header = HeaderMap::from_row(layout.header(grid));
        let roles = ColumnRoles::classify(&header, keywords);
        Self { layout, header, roles }
    }

    pub fn identifier_name(&self) -> Option<&str> {
        self.roles.identifier.and_then(|i| self.header.name(i))
    }

    pub fn subject_names(&self) -> Vec<String> {
        self.roles
            .subjects
            .iter()
            .filter_map(|&i| self.header.name(i))
            .map(str::to_string)
            .collect()
    }
}
