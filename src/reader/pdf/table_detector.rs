//! Table detection using text position analysis.
//!
//! Tables are found without ruling lines: spans are grouped into rows by
//! baseline, left edges that line up across rows become column boundaries,
//! and runs of well-aligned rows become table regions.

use std::collections::{HashMap, HashSet};

use crate::normalize::normalize_text;

use super::layout::TextSpan;

/// Left edges within this many points share a column bucket.
const BUCKET_SIZE: f32 = 5.0;

/// How far a span's left edge may sit from a column boundary and still count
/// as aligned with it.
const ALIGN_TOLERANCE: f32 = 5.0;

/// A detected table region with its content.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Baseline of the first row (PDF coordinates, larger is higher)
    pub top_y: f32,
    /// Baseline of the last row
    pub bottom_y: f32,
    /// Right edge of the widest span
    pub right_x: f32,
    /// Column boundaries (left X of each column)
    pub columns: Vec<f32>,
    /// Rows of spans, top first
    pub rows: Vec<TableRowData>,
}

/// A row of text spans in a table.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Average baseline of the row
    pub y: f32,
    /// Spans in this row, sorted by X
    pub spans: Vec<TextSpan>,
}

impl DetectedTable {
    /// Cell text grid, one entry per column in every row.
    ///
    /// Spans falling in the same cell are joined with a space; every cell is
    /// normalized and a cell no span landed in is the empty string.
    pub fn cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut contents: Vec<Vec<&str>> = vec![Vec::new(); self.columns.len()];
                for span in &row.spans {
                    let idx = find_column_for_span(span.x, &self.columns, self.right_x);
                    if let Some(cell) = contents.get_mut(idx) {
                        cell.push(span.text.trim());
                    }
                }
                contents
                    .into_iter()
                    .map(|parts| normalize_text(&parts.join(" ")))
                    .collect()
            })
            .collect()
    }
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Detects tables in a list of text spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables among the spans of one page, top of the page first.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<DetectedTable> {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            log::debug!("table detector: only {} spans, skipping", spans.len());
            return vec![];
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < self.config.min_rows {
            return vec![];
        }

        let columns = self.detect_columns(&rows);
        log::debug!(
            "table detector: {} rows, columns at {:?}",
            rows.len(),
            columns
        );
        if columns.len() < self.config.min_columns {
            return vec![];
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_table_regions(&rows, &columns) {
            let table_rows = rows[start..=end].to_vec();

            // Column edges are re-detected per region; the page-wide set mixes
            // every table on the page.
            let table_columns = self.detect_columns(&table_rows);
            if table_columns.len() < self.config.min_columns {
                continue;
            }
            if table_columns.len() > self.config.max_columns {
                log::debug!(
                    "table detector: skipping region with {} columns",
                    table_columns.len()
                );
                continue;
            }
            if self.is_list_pattern(&table_rows, &table_columns) {
                log::debug!("table detector: skipping list-like region");
                continue;
            }

            let right_x = table_rows
                .iter()
                .flat_map(|r| r.spans.iter())
                .map(TextSpan::right)
                .fold(f32::MIN, f32::max);

            tables.push(DetectedTable {
                top_y: table_rows[0].y,
                bottom_y: table_rows[table_rows.len() - 1].y,
                right_x,
                columns: table_columns,
                rows: table_rows,
            });
        }

        tables
    }

    /// Group spans into rows by Y position.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<TableRowData> {
        let mut sorted = spans.to_vec();
        sorted.sort_by(|a, b| {
            b.y.partial_cmp(&a.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        let mut rows: Vec<TableRowData> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in sorted {
            let tolerance = span.font_size * self.config.y_tolerance_factor;
            match current_y {
                Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        rows.push(row_from_spans(std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }
        if !current.is_empty() {
            rows.push(row_from_spans(current));
        }

        rows
    }

    /// Column boundaries: left-edge buckets shared by enough rows.
    ///
    /// Rows with a single span are ignored when enough multi-span rows exist.
    fn detect_columns(&self, rows: &[TableRowData]) -> Vec<f32> {
        let multi_span_rows: Vec<&TableRowData> =
            rows.iter().filter(|r| r.spans.len() >= 2).collect();

        let (counted, per_row_once): (Vec<&TableRowData>, bool) =
            if multi_span_rows.len() >= self.config.min_rows {
                (multi_span_rows, true)
            } else {
                (rows.iter().collect(), false)
            };
        if counted.is_empty() {
            return vec![];
        }

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        for row in &counted {
            let buckets = row.spans.iter().map(|s| (s.x / BUCKET_SIZE).round() as i32);
            if per_row_once {
                for bucket in buckets.collect::<HashSet<_>>() {
                    *edge_counts.entry(bucket).or_insert(0) += 1;
                }
            } else {
                for bucket in buckets {
                    *edge_counts.entry(bucket).or_insert(0) += 1;
                }
            }
        }

        let min_occurrences =
            ((counted.len() as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<f32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(bucket, _)| bucket as f32 * BUCKET_SIZE)
            .collect();
        edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mut merged: Vec<f32> = Vec::new();
        for edge in edges {
            match merged.last() {
                Some(&last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Contiguous runs of aligned rows at least `min_rows` long.
    fn find_table_regions(&self, rows: &[TableRowData], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if alignment_score(row, columns) >= self.config.min_alignment_ratio {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }

    /// Numbered or bulleted lists split into marker and text spans look like
    /// two-column tables.
    fn is_list_pattern(&self, rows: &[TableRowData], columns: &[f32]) -> bool {
        if columns.len() < 2 || rows.is_empty() {
            return false;
        }

        let mut bullets = 0usize;
        let mut numbers = 0usize;
        for row in rows {
            let Some(first) = row.spans.first() else {
                continue;
            };
            let text = first.text.trim();
            if is_bullet_marker(text) {
                bullets += 1;
            } else if is_number_marker(text) {
                numbers += 1;
            }
        }

        let bullet_ratio = bullets as f32 / rows.len() as f32;
        let marker_ratio = (bullets + numbers) as f32 / rows.len() as f32;

        // Numbered first columns are common in real tables, so only
        // two-column regions are rejected for them.
        bullet_ratio >= 0.5 || (columns.len() == 2 && marker_ratio >= 0.5)
    }
}

fn row_from_spans(spans: Vec<TextSpan>) -> TableRowData {
    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len() as f32;
    TableRowData { y, spans }
}

/// Fraction of a row's spans whose left edge sits on a column boundary.
fn alignment_score(row: &TableRowData, columns: &[f32]) -> f32 {
    if row.spans.is_empty() || columns.is_empty() {
        return 0.0;
    }
    let aligned = row
        .spans
        .iter()
        .filter(|span| columns.iter().any(|col| (span.x - col).abs() <= ALIGN_TOLERANCE))
        .count();
    aligned as f32 / row.spans.len() as f32
}

/// Column index for a span, allowing it to start up to 10pt left of its
/// column; otherwise the nearest column.
fn find_column_for_span(span_x: f32, columns: &[f32], right_x: f32) -> usize {
    for (i, &col_start) in columns.iter().enumerate() {
        let col_end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        if span_x >= col_start - 10.0 && span_x < col_end - 10.0 {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (span_x - **a)
                .abs()
                .partial_cmp(&(span_x - **b).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "▹" | "►" | "■" | "●" | "※"
            | "□" | "◆" | "◇" | "▶" | "▷" | "☞" | "➤" | "➜"
    )
}

/// `1.`, `12)`, a bare number, or a single letter followed by `.` or `)`.
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }

    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let (digits, suffix) = cleaned.split_at(pos);
        if !digits.is_empty() && (suffix == "." || suffix == ")") {
            return true;
        }
    } else {
        return true;
    }

    let mut chars = cleaned.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(letter), Some('.' | ')'), None) if letter.is_alphabetic()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text, x, y, 12.0, "Helvetica")
    }

    #[test]
    fn test_group_into_rows() {
        let detector = TableDetector::new();
        let rows = detector.group_into_rows(&[
            span("A1", 10.0, 100.0),
            span("B1", 60.0, 100.0),
            span("A2", 10.0, 85.0),
            span("B2", 60.0, 85.0),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].spans.len(), 2);
        assert_eq!(rows[0].spans[0].text, "A1");
        assert_eq!(rows[1].spans[1].text, "B2");
    }

    #[test]
    fn test_detect_simple_table() {
        let detector = TableDetector::new();
        let tables = detector.detect(&[
            span("Name", 10.0, 100.0),
            span("Age", 60.0, 100.0),
            span("Alice", 10.0, 85.0),
            span("30", 60.0, 85.0),
            span("Bob", 10.0, 70.0),
            span("25", 60.0, 70.0),
        ]);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns.len(), 2);
        assert_eq!(
            tables[0].cells(),
            vec![
                vec!["Name".to_string(), "Age".to_string()],
                vec!["Alice".to_string(), "30".to_string()],
                vec!["Bob".to_string(), "25".to_string()],
            ]
        );
    }

    #[test]
    fn test_missing_cell_is_empty() {
        let table = DetectedTable {
            top_y: 100.0,
            bottom_y: 85.0,
            right_x: 100.0,
            columns: vec![10.0, 60.0],
            rows: vec![
                row_from_spans(vec![span("Name", 10.0, 100.0), span("Age", 60.0, 100.0)]),
                row_from_spans(vec![span("  Carol   Ann ", 10.0, 85.0)]),
            ],
        };
        assert_eq!(
            table.cells(),
            vec![
                vec!["Name".to_string(), "Age".to_string()],
                vec!["Carol Ann".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn test_no_table_single_column() {
        let detector = TableDetector::new();
        let tables = detector.detect(&[
            span("Line 1", 10.0, 100.0),
            span("Line 2", 10.0, 85.0),
            span("Line 3", 10.0, 70.0),
            span("Line 4", 10.0, 55.0),
        ]);
        assert!(tables.is_empty());
    }

    #[test]
    fn test_numbered_list_not_a_table() {
        let detector = TableDetector::new();
        let spans: Vec<TextSpan> = ["Setup", "Objects", "Routing", "VPN"]
            .iter()
            .enumerate()
            .flat_map(|(i, item)| {
                let y = 400.0 - i as f32 * 30.0;
                vec![span(&format!("{}.", i + 1), 50.0, y), span(item, 80.0, y)]
            })
            .collect();
        assert!(detector.detect(&spans).is_empty());
    }

    #[test]
    fn test_bullet_list_not_a_table() {
        let detector = TableDetector::new();
        let tables = detector.detect(&[
            span("•", 50.0, 400.0),
            span("Management", 80.0, 400.0),
            span("•", 50.0, 370.0),
            span("Interface options", 80.0, 370.0),
            span("•", 50.0, 340.0),
            span("Firmware", 80.0, 340.0),
        ]);
        assert!(tables.is_empty());
    }

    #[test]
    fn test_list_markers() {
        for marker in ["1.", "12.", "1)", "1 .", "3", "a.", "B)"] {
            assert!(is_number_marker(marker), "{marker}");
        }
        for marker in ["-", "•", "*", "–"] {
            assert!(is_bullet_marker(marker), "{marker}");
        }
        for text in ["Name", "Hello World", "Alice", ""] {
            assert!(!is_number_marker(text) && !is_bullet_marker(text), "{text}");
        }
    }
}
