//! Plain-text rendering of comparison tables and engine options.

use std::fmt;

use elosim_evaluator::comparison::ComparisonTable;
use elosim_model::EngineOptions;

const HEADERS: [&str; 7] = [
    "PlayerName",
    "RealElo",
    "RealEloNormalized",
    "CalculatedElo",
    "CalculatedEloNormalized",
    "Diff",
    "DiffNormalized",
];

/// The comparison table followed by its four metrics.
///
/// Player name is left-aligned, every other column right-aligned; elo columns
/// carry the rank in parentheses, e.g. `3000 ( 1)`.
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a>(pub &'a ComparisonTable);

impl TableView<'_> {
    fn cells(&self) -> Vec<[String; 7]> {
        self.0
            .rows()
            .iter()
            .map(|row| {
                [
                    row.player_name.clone(),
                    format!("{} ({:2})", row.real_elo, row.real_rank),
                    row.real_elo_normalized.to_string(),
                    format!("{} ({:2})", row.calculated_elo, row.calculated_rank),
                    row.calculated_elo_normalized.to_string(),
                    row.diff().to_string(),
                    row.diff_normalized().to_string(),
                ]
            })
            .collect()
    }
}

impl fmt::Display for TableView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.0;
        let cells = self.cells();
        let mut widths = HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let line = |f: &mut fmt::Formatter<'_>, row: [&str; 7]| -> fmt::Result {
            for (i, (cell, width)) in row.iter().zip(widths).enumerate() {
                match i {
                    0 => write!(f, "{cell:<width$}")?,
                    _ => write!(f, " | {cell:>width$}")?,
                }
            }
            writeln!(f)
        };
        let rule = "-".repeat(widths.iter().sum::<usize>() + 3 * (widths.len() - 1));

        line(f, HEADERS)?;
        writeln!(f, "{rule}")?;
        for row in &cells {
            line(f, row.each_ref().map(String::as_str))?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "Average Diff: {:.2}", table.average_diff())?;
        writeln!(
            f,
            "Average Diff Normalized: {:.2}",
            table.average_diff_normalized()
        )?;
        writeln!(f, "MAE of Deltas: {:.2}", table.mae_of_deltas())?;
        writeln!(f, "MAE of Ranks: {:.2}", table.mae_of_ranks())?;
        if !table.missing().is_empty() {
            writeln!(f, "Missing: {}", table.missing().join(", "))?;
        }
        Ok(())
    }
}

/// One `  key: value` line per option.
#[derive(Debug, Clone, Copy)]
pub struct OptionsView<'a>(pub &'a EngineOptions);

impl fmt::Display for OptionsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.0.described() {
            writeln!(f, "  {key}: {value}")?;
        }
        Ok(())
    }
}
