//! Data model shared by the simulation, the rating engine client and the optimizer.
//!
//! - [`player`] - ground-truth players and the pool they form
//! - [`history`] - match entries and the history handed to the rating engine
//! - [`options`] - rating engine options, which double as the optimizer's genome
//!
//! All wire formats understood by the external rating engine live here, so the
//! other crates never build engine JSON by hand.

pub use self::{history::*, options::*, player::*};

pub mod history;
pub mod options;
pub mod player;
