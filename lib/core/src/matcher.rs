// Row matching against a classified query

use crate::cell::{cell_at, is_blank_row, join_row, CellValue};
use crate::columns::ColumnRoles;
use crate::config::MatchPolicy;
use crate::normalize::{digits_only, normalize};
use crate::query::{ClassifiedQuery, MIN_IDENTIFIER_DIGITS};
use serde::Serialize;

/// Identifier widths with a known convention: CPF and CNS
pub const IDENTIFIER_WIDTHS: [usize; 2] = [11, 15];

/// Width both sides are padded to under [`MatchPolicy::Exact`]
const EXACT_PAD_WIDTH: usize = 11;

/// Why a row matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    IdentifierColumn,
    SubjectColumn,
    WholeRow,
}

pub trait RowFilter {
    fn check(&self, row: &[CellValue]) -> Option<MatchReason>;

    fn is_match(&self, row: &[CellValue]) -> bool {
        self.check(row).is_some()
    }
}

/// Compare two digit strings under a tolerance policy
pub fn identifiers_match(cell: &str, query: &str, policy: MatchPolicy) -> bool {
    if cell.is_empty() || query.is_empty() {
        return false;
    }

    match policy {
        MatchPolicy::Exact => pad_left(cell, EXACT_PAD_WIDTH) == pad_left(query, EXACT_PAD_WIDTH),
        MatchPolicy::Suffix => {
            if cell == query {
                return true;
            }

            let (short, long) = if cell.len() <= query.len() {
                (cell, query)
            } else {
                (query, cell)
            };
            // Very short digit runs (ages, house numbers) would otherwise
            // match any identifier ending with them
            if short.len() >= MIN_IDENTIFIER_DIGITS && long.ends_with(short) {
                return true;
            }

            IDENTIFIER_WIDTHS.iter().any(|&width| {
                cell.len() >= width
                    && query.len() >= width
                    && cell[cell.len() - width..] == query[query.len() - width..]
            })
        }
    }
}

fn pad_left(digits: &str, width: usize) -> std::borrow::Cow<'_, str> {
    if digits.len() >= width {
        std::borrow::Cow::Borrowed(digits)
    } else {
        std::borrow::Cow::Owned(format!("{:0>width$}", digits, width = width))
    }
}

/// Matches rows of one sheet against one classified query
#[derive(Debug, Clone, Copy)]
pub struct RowMatcher<'a> {
    query: &'a ClassifiedQuery,
    roles: &'a ColumnRoles,
    policy: MatchPolicy,
}

impl<'a> RowMatcher<'a> {
    pub fn new(query: &'a ClassifiedQuery, roles: &'a ColumnRoles, policy: MatchPolicy) -> Self {
        Self { query, roles, policy }
    }

    fn cell_matches_identifier(&self, cell: &CellValue) -> bool {
        if cell.is_blank() {
            return false;
        }
        identifiers_match(&digits_only(&cell.as_text()), &self.query.digits, self.policy)
    }

    fn check_numeric(&self, row: &[CellValue]) -> Option<MatchReason> {
        if let Some(col) = self.roles.identifier {
            if self.cell_matches_identifier(cell_at(row, col)) {
                return Some(MatchReason::IdentifierColumn);
            }
        }

        let other_cell = row
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != self.roles.identifier)
            .any(|(_, cell)| self.cell_matches_identifier(cell));

        (other_cell || self.row_text_has_identifier(row)).then_some(MatchReason::WholeRow)
    }

    /// Identifier buried among other text or digits in a cell, e.g.
    /// `"CPF 123.456.789-09 / CNS 898 0012 3456 7890"`
    fn row_text_has_identifier(&self, row: &[CellValue]) -> bool {
        let text = normalize(&join_row(row));
        let digits = self.query.digits.as_str();
        match self.policy {
            MatchPolicy::Suffix => text.contains(digits),
            MatchPolicy::Exact => text
                .split(' ')
                .filter(|token| token.chars().all(|c| c.is_ascii_digit()))
                .any(|token| identifiers_match(token, digits, MatchPolicy::Exact)),
        }
    }

    fn check_text(&self, row: &[CellValue]) -> Option<MatchReason> {
        let needle = self.query.text.as_str();
        if needle.is_empty() {
            return None;
        }

        if self.roles.has_subjects() {
            let subjects = self
                .roles
                .subjects
                .iter()
                .map(|&i| cell_at(row, i).as_text())
                .collect::<Vec<_>>()
                .join(" ");
            if normalize(&subjects).contains(needle) {
                return Some(MatchReason::SubjectColumn);
            }
        }

        let whole = row
            .iter()
            .map(CellValue::as_text)
            .collect::<Vec<_>>()
            .join(" ");
        normalize(&whole)
            .contains(needle)
            .then_some(MatchReason::WholeRow)
    }
}

impl RowFilter for RowMatcher<'_> {
    fn check(&self, row: &[CellValue]) -> Option<MatchReason> {
        if is_blank_row(row) {
            return None;
        }

        if self.query.is_numeric {
            self.check_numeric(row)
        } else {
            self.check_text(row)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::text_row;

    fn roles(identifier: Option<usize>, subjects: Vec<usize>) -> ColumnRoles {
        ColumnRoles { identifier, subjects }
    }

    #[test]
    fn test_suffix_policy() {
        let p = MatchPolicy::Suffix;
        assert!(identifiers_match("12345678909", "12345678909", p));
        // lost leading zero
        assert!(identifiers_match("2345678909", "02345678909", p));
        // partial entry
        assert!(identifiers_match("12345678909", "45678909", p));
        // same CPF tail under a longer prefix
        assert!(identifiers_match("9912345678909", "0012345678909", p));
        assert!(!identifiers_match("12345678909", "98765432100", p));
        // short runs never match by suffix
        assert!(!identifiers_match("12345678909", "909", p));
        assert!(!identifiers_match("9", "12345678909", p));
        assert!(!identifiers_match("", "12345678909", p));
    }

    #[test]
    fn test_exact_policy() {
        let p = MatchPolicy::Exact;
        assert!(identifiers_match("12345678909", "12345678909", p));
        assert!(identifiers_match("2345678909", "02345678909", p));
        assert!(!identifiers_match("12345678909", "45678909", p));
        assert!(!identifiers_match("9912345678909", "0012345678909", p));
    }

    #[test]
    fn test_numeric_match_in_identifier_column() {
        let query = ClassifiedQuery::classify("12345678909");
        let roles = roles(Some(1), vec![0]);
        let matcher = RowMatcher::new(&query, &roles, MatchPolicy::Suffix);

        let row = text_row(&["Maria Silva", "123.456.789-09"]);
        assert_eq!(matcher.check(&row), Some(MatchReason::IdentifierColumn));
        assert!(!matcher.is_match(&text_row(&["João Souza", "987.654.321-00"])));
    }

    #[test]
    fn test_numeric_cell_in_scientific_notation() {
        let query = ClassifiedQuery::classify("709809060029098");
        let roles = roles(Some(0), vec![]);
        let matcher = RowMatcher::new(&query, &roles, MatchPolicy::Exact);

        assert!(matcher.is_match(&text_row(&["7.09809060029098e+14"])));
        assert!(matcher.is_match(&[CellValue::Number(709809060029098.0)]));
    }

    #[test]
    fn test_numeric_whole_row_fallback() {
        let query = ClassifiedQuery::classify("123.456.789-09");
        let roles = roles(None, vec![]);
        let matcher = RowMatcher::new(&query, &roles, MatchPolicy::Suffix);

        let row = text_row(&["Maria", "Rua A, 12", "12345678909"]);
        assert_eq!(matcher.check(&row), Some(MatchReason::WholeRow));
    }

    #[test]
    fn test_identifier_inside_mixed_document_cell() {
        let query = ClassifiedQuery::classify("123.456.789-09");
        let roles = roles(Some(1), vec![0]);
        let row = text_row(&["Maria Silva", "CPF 123.456.789-09 / CNS 898 0012 3456 7890"]);

        let suffix = RowMatcher::new(&query, &roles, MatchPolicy::Suffix);
        assert_eq!(suffix.check(&row), Some(MatchReason::WholeRow));

        let exact = RowMatcher::new(&query, &roles, MatchPolicy::Exact);
        assert_eq!(exact.check(&row), Some(MatchReason::WholeRow));

        let other = text_row(&["João Souza", "CPF 987.654.321-00 / CNS 898 0012 3456 7890"]);
        assert_eq!(suffix.check(&other), None);
    }

    #[test]
    fn test_exact_policy_ignores_partial_text_identifier() {
        let query = ClassifiedQuery::classify("45678909");
        let roles = roles(Some(1), vec![0]);
        let matcher = RowMatcher::new(&query, &roles, MatchPolicy::Exact);
        assert!(!matcher.is_match(&text_row(&["Maria Silva", "CPF 123.456.789-09 / ativo"])));
    }

    #[test]
    fn test_numeric_query_ignores_text_path() {
        let query = ClassifiedQuery::classify("12345678909");
        let roles = roles(None, vec![0]);
        let matcher = RowMatcher::new(&query, &roles, MatchPolicy::Suffix);
        // digits split across cells do not form an identifier
        assert!(!matcher.is_match(&text_row(&["123456", "78909"])));
    }

    #[test]
    fn test_text_match_in_subject_column() {
        let query = ClassifiedQuery::classify("joao souza");
        let roles = roles(Some(1), vec![0]);
        let matcher = RowMatcher::new(&query, &roles, MatchPolicy::Suffix);

        assert_eq!(
            matcher.check(&text_row(&["JOÃO SOUZA", "987.654.321-00"])),
            Some(MatchReason::SubjectColumn)
        );
        assert!(!matcher.is_match(&text_row(&["Maria Silva", "123.456.789-09"])));
    }

    #[test]
    fn test_text_match_embedded_substring() {
        let query = ClassifiedQuery::classify("silva");
        let roles = roles(None, vec![]);
        let matcher = RowMatcher::new(&query, &roles, MatchPolicy::Suffix);
        assert_eq!(
            matcher.check(&text_row(&["Mariasilvana", "x"])),
            Some(MatchReason::WholeRow)
        );
    }

    #[test]
    fn test_text_whole_row_fallback_outside_subjects() {
        let query = ClassifiedQuery::classify("Rua das Flores");
        let roles = roles(None, vec![0]);
        let matcher = RowMatcher::new(&query, &roles, MatchPolicy::Suffix);
        let row = text_row(&["Ana", "R. das Flores", "Rua das Flôres, 10"]);
        assert_eq!(matcher.check(&row), Some(MatchReason::WholeRow));
    }

    #[test]
    fn test_blank_row_never_matches() {
        let query = ClassifiedQuery::classify("a");
        let roles = roles(None, vec![]);
        let matcher = RowMatcher::new(&query, &roles, MatchPolicy::Suffix);
        assert!(!matcher.is_match(&text_row(&["", "  "])));
        assert!(!matcher.is_match(&[]));
    }

    #[test]
    fn test_short_row_with_identifier_column_past_end() {
        let query = ClassifiedQuery::classify("12345678909");
        let roles = roles(Some(4), vec![]);
        let matcher = RowMatcher::new(&query, &roles, MatchPolicy::Suffix);
        assert!(!matcher.is_match(&text_row(&["Maria"])));
    }
}
