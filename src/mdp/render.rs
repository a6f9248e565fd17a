//! Plain-text tables for value and policy grids.

use ndarray::Array2;

fn separator(out: &mut String, width: usize) {
    out.push_str(&"─".repeat(width));
    out.push('\n');
}

/// Renders a value grid as a boxed table with three decimals per cell.
pub fn render_values(grid: &Array2<f64>) -> String {
    let width = grid.ncols() * 8 + 1;
    let mut out = String::new();
    separator(&mut out, width);
    for row in grid.rows() {
        out.push('│');
        for value in row {
            out.push_str(&format!(" {:6.3} │", value));
        }
        out.push('\n');
        separator(&mut out, width);
    }
    out
}

/// Renders a policy grid as a boxed table with one centred marker per cell.
pub fn render_policy(grid: &Array2<char>) -> String {
    let width = grid.ncols() * 4 + 1;
    let mut out = String::new();
    separator(&mut out, width);
    for row in grid.rows() {
        out.push('│');
        for marker in row {
            out.push_str(&format!(" {:^2} │", marker));
        }
        out.push('\n');
        separator(&mut out, width);
    }
    out
}
