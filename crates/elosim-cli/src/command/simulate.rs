use anyhow::Context as _;
use elosim_evaluator::history_evaluator::HistoryEvaluator;

use crate::view::table::{OptionsView, TableView};

use super::{EngineArg, SimulationArg};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    pub(crate) simulation: SimulationArg,
    #[clap(flatten)]
    pub(crate) engine: EngineArg,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg { simulation, engine } = arg;
    let options = engine.base_options()?;
    let sim = simulation.params().simulate()?;
    let rating_engine = engine.engine();

    let evaluator = HistoryEvaluator::new(&sim.pool, &sim.history, &rating_engine);
    let table = evaluator
        .compare(&options)
        .with_context(|| format!("Failed to rate {} matches", sim.history.len()))?;

    eprintln!("Options:");
    eprint!("{}", OptionsView(&options));
    eprintln!();
    print!("{}", TableView(&table));
    Ok(())
}
