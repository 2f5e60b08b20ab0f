//! Coordinate extraction.
//!
//! Retrieves the geometry vertices of one parcel from a coordinates
//! dataset: rows are matched on the normalized identifier, ordered by the
//! explicit `vertex_index` column when the survey export provides one (in
//! source order otherwise), labelled sequentially and formatted for the
//! coordinate grid.

use delibex_core::{normalize_id, CoordinatePoint, Dataset, FieldValue, Record};

/// Identifier column shared by every dataset.
pub const KEY_COLUMN: &str = "nicad";

/// Explicit vertex-ordering column, present in some survey exports.
const VERTEX_INDEX_COLUMN: &str = "vertex_index";

/// Coordinate column pairs, probed in order: the primary vertex columns,
/// then the centroid-named pair some exports use instead.
const COORDINATE_COLUMNS: [(&str, &str); 2] = [("X", "Y"), ("x_centroid", "y_centroid")];

fn format_coordinate(value: &FieldValue) -> String {
    value.as_f64().map_or_else(String::new, |v| format!("{v:.2}"))
}

/// Ordered, formatted points for the record with the given normalized
/// identifier. Empty when no coordinate row matches.
#[must_use]
pub fn points_for(coords: &Dataset, id: &str) -> Vec<CoordinatePoint> {
    let mut rows: Vec<&Record> = coords
        .rows()
        .iter()
        .filter(|row| normalize_id(row.value(KEY_COLUMN)) == id)
        .collect();
    if rows.is_empty() {
        return Vec::new();
    }

    if coords.has_column(VERTEX_INDEX_COLUMN) {
        // Stable sort: rows without a usable index sink to the end in
        // source order.
        rows.sort_by(|a, b| {
            let ka = a.value(VERTEX_INDEX_COLUMN).as_f64().unwrap_or(f64::INFINITY);
            let kb = b.value(VERTEX_INDEX_COLUMN).as_f64().unwrap_or(f64::INFINITY);
            ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let (col_x, col_y) = COORDINATE_COLUMNS
        .iter()
        .find(|(x, _)| coords.has_column(x))
        .copied()
        .unwrap_or(COORDINATE_COLUMNS[0]);

    rows.iter()
        .enumerate()
        .map(|(i, row)| CoordinatePoint {
            label: format!("P{}", i + 1),
            x: format_coordinate(row.value(col_x)),
            y: format_coordinate(row.value(col_y)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(pairs: &[(&str, FieldValue)]) -> Record {
        Record::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn num(v: f64) -> FieldValue {
        FieldValue::Number(v)
    }

    #[test]
    fn test_filter_and_label() {
        let ds = Dataset::from_rows(
            vec!["nicad".into(), "X".into(), "Y".into()],
            vec![
                record(&[("nicad", num(42.0)), ("X", num(335_120.456)), ("Y", num(1_614_220.1))]),
                record(&[("nicad", num(99.0)), ("X", num(1.0)), ("Y", num(2.0))]),
                record(&[("nicad", num(42.0)), ("X", num(335_130.0)), ("Y", num(1_614_230.0))]),
            ],
        );

        let points = points_for(&ds, "42");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "P1");
        assert_eq!(points[0].x, "335120.46");
        assert_eq!(points[1].label, "P2");
        assert_eq!(points[1].y, "1614230.00");
    }

    #[test]
    fn test_vertex_index_orders_rows() {
        let ds = Dataset::from_rows(
            vec!["nicad".into(), "vertex_index".into(), "X".into(), "Y".into()],
            vec![
                record(&[("nicad", num(1.0)), ("vertex_index", num(2.0)), ("X", num(20.0)), ("Y", num(0.0))]),
                record(&[("nicad", num(1.0)), ("vertex_index", num(1.0)), ("X", num(10.0)), ("Y", num(0.0))]),
            ],
        );

        let points = points_for(&ds, "1");
        assert_eq!(points[0].x, "10.00");
        assert_eq!(points[1].x, "20.00");
    }

    #[test]
    fn test_centroid_column_fallback() {
        let ds = Dataset::from_rows(
            vec!["nicad".into(), "x_centroid".into(), "y_centroid".into()],
            vec![record(&[
                ("nicad", num(5.0)),
                ("x_centroid", num(3.5)),
                ("y_centroid", num(4.25)),
            ])],
        );

        let points = points_for(&ds, "5");
        assert_eq!(points[0].x, "3.50");
        assert_eq!(points[0].y, "4.25");
    }

    #[test]
    fn test_null_coordinate_renders_empty() {
        let ds = Dataset::from_rows(
            vec!["nicad".into(), "X".into(), "Y".into()],
            vec![record(&[("nicad", num(5.0)), ("Y", num(4.0))])],
        );

        let points = points_for(&ds, "5");
        assert_eq!(points[0].x, "");
        assert_eq!(points[0].y, "4.00");
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let ds = Dataset::from_rows(vec!["nicad".into(), "X".into(), "Y".into()], vec![]);
        assert!(points_for(&ds, "42").is_empty());
    }

    #[test]
    fn test_numeric_text_identifier_matches_numeric_key() {
        let ds = Dataset::from_rows(
            vec!["nicad".into(), "X".into(), "Y".into()],
            vec![record(&[
                ("nicad", FieldValue::Text("123".to_string())),
                ("X", num(1.0)),
                ("Y", num(2.0)),
            ])],
        );

        // The record side normalized `123.0` to "123"; the text row joins.
        assert_eq!(points_for(&ds, "123").len(), 1);
    }
}
