use std::path::PathBuf;

use elosim_model::{MatchEntry, MatchMetadata, Player};
use serde::Serialize;

use crate::util;

use super::SimulationArg;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DumpArg {
    #[clap(flatten)]
    simulation: SimulationArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Players and history, with the generation metadata the engine never sees.
#[derive(Debug, Serialize)]
struct Dump<'a> {
    players: &'a [Player],
    game: &'a str,
    entries: Vec<EntryView<'a>>,
}

#[derive(Debug, Serialize)]
struct EntryView<'a> {
    #[serde(flatten)]
    entry: &'a MatchEntry,
    #[serde(rename = "__metadata", skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a MatchMetadata>,
}

impl<'a> From<&'a MatchEntry> for EntryView<'a> {
    fn from(entry: &'a MatchEntry) -> Self {
        Self {
            entry,
            metadata: entry.metadata.as_ref(),
        }
    }
}

pub(crate) fn run(arg: &DumpArg) -> anyhow::Result<()> {
    let DumpArg { simulation, output } = arg;
    let sim = simulation.params().simulate()?;
    let dump = Dump {
        players: sim.pool.players(),
        game: &sim.history.game,
        entries: sim.history.entries.iter().map(EntryView::from).collect(),
    };
    util::write_json(&dump, output.as_deref())?;

    if let Some(path) = output {
        eprintln!("Dumped {} matches to {}", sim.history.len(), path.display());
    }
    Ok(())
}
