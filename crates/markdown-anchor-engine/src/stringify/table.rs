use crate::ast::Align;

/// Lays out rendered cells as a GFM pipe table.
///
/// The first row is the header. Columns are padded to their widest cell,
/// measured in chars, with a minimum of one column (two for left/right
/// alignment, three for centered) so the delimiter row stays valid.
pub fn layout(rows: &[Vec<String>], align: &[Align]) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(align.len());
    if rows.is_empty() || columns == 0 {
        return String::new();
    }

    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            let content = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0);
            content.max(min_width(align_of(align, col)))
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(row_line(&rows[0], &widths, align));
    lines.push(delimiter_line(&widths, align));
    for row in &rows[1..] {
        lines.push(row_line(row, &widths, align));
    }
    lines.join("\n")
}

fn align_of(align: &[Align], col: usize) -> Align {
    align.get(col).copied().unwrap_or_default()
}

fn min_width(align: Align) -> usize {
    match align {
        Align::None => 1,
        Align::Left | Align::Right => 2,
        Align::Center => 3,
    }
}

fn row_line(row: &[String], widths: &[usize], align: &[Align]) -> String {
    let cells: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(col, &width)| {
            let cell = row.get(col).map(String::as_str).unwrap_or("");
            pad(cell, width, align_of(align, col))
        })
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn delimiter_line(widths: &[usize], align: &[Align]) -> String {
    let cells: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(col, &width)| match align_of(align, col) {
            Align::None => "-".repeat(width),
            Align::Left => format!(":{}", "-".repeat(width - 1)),
            Align::Right => format!("{}:", "-".repeat(width - 1)),
            Align::Center => format!(":{}:", "-".repeat(width - 2)),
        })
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    match align {
        Align::Right => format!("{}{cell}", " ".repeat(fill)),
        Align::Center => {
            let left = fill / 2;
            format!("{}{cell}{}", " ".repeat(left), " ".repeat(fill - left))
        }
        Align::None | Align::Left => format!("{cell}{}", " ".repeat(fill)),
    }
}
