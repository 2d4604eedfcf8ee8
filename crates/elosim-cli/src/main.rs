mod command;
mod config;
mod util;
mod view;

fn main() -> anyhow::Result<()> {
    sensible_env_logger::init!();
    command::run()
}
