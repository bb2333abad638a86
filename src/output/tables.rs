use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::jobs::Category;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn category_cell(category: Category) -> Cell {
    match category {
        Category::Chromium => Cell::new(category).fg(TableColor::Blue),
        Category::Standalone => Cell::new(category).fg(TableColor::Magenta),
    }
}

pub fn reproducible_cell(reproducible: bool) -> Cell {
    if reproducible {
        Cell::new("yes").fg(TableColor::Green)
    } else {
        Cell::new("no").fg(TableColor::Red)
    }
}
