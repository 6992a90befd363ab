//! Summarise gem5 runs: extract counters from `stats.txt`, tabulate and plot them
mod charts;
mod collect;
mod config;
mod label;
mod metrics;
mod path;
mod patterns;
mod plot;
mod record;
mod scan;
mod summary;
mod utils;

pub use charts::*;
pub use collect::*;
pub use config::*;
pub use label::*;
pub use metrics::*;
pub use path::*;
pub use patterns::*;
pub use plot::*;
pub use record::*;
pub use scan::*;
pub use summary::*;
pub use utils::*;
