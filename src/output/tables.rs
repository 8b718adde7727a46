use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::reminder::DispatchOutcome;

use super::styling::Tone;

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn outcome_cell(outcome: Option<&DispatchOutcome>) -> Cell {
    let color = match Tone::of(outcome) {
        Tone::Good => TableColor::Green,
        Tone::Degraded => TableColor::Yellow,
        Tone::Bad => TableColor::Red,
        Tone::Quiet => TableColor::DarkGrey,
    };

    match outcome {
        Some(outcome) => Cell::new(outcome).fg(color),
        None => Cell::new("clear").fg(color),
    }
}
