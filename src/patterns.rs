use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

/// Number of cores whose counters are extracted
pub const NUM_CORES: usize = 2;

/// A raw counter read from a gem5 stats file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    /// simulated seconds
    SimSeconds,
    /// shared L2 hits
    L2Hits,
    /// shared L2 misses
    L2Misses,
    /// per core instructions per cycle
    Ipc(usize),
    /// per core committed instructions
    Instructions(usize),
    /// per core L1 data cache hits
    L1Hits(usize),
    /// per core L1 data cache misses
    L1Misses(usize),
    /// per core conditional branches predicted
    BranchPredicted(usize),
    /// per core conditional branches mispredicted
    BranchIncorrect(usize),
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counter::SimSeconds => write!(f, "sim_sec"),
            Counter::L2Hits => write!(f, "l2hit"),
            Counter::L2Misses => write!(f, "l2miss"),
            Counter::Ipc(core) => write!(f, "ipc{core}"),
            Counter::Instructions(core) => write!(f, "inst{core}"),
            Counter::L1Hits(core) => write!(f, "l1hit{core}"),
            Counter::L1Misses(core) => write!(f, "l1miss{core}"),
            Counter::BranchPredicted(core) => write!(f, "bppred{core}"),
            Counter::BranchIncorrect(core) => write!(f, "bpmiss{core}"),
        }
    }
}

// used as map keys in the raw json dump
impl Serialize for Counter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Regex fragment matching the name gem5 gives to a core in stats keys
///
/// The first core shows up as `cpu` in single-core configs and as `cpu0` in
/// multi-core ones.
fn core_token(core: usize) -> String {
    match core {
        0 => r"(?:cpu|cpu0|cpu\.?)".to_string(),
        n => format!("cpu{n}"),
    }
}

/// Fixed set of line patterns, built once and never changed afterwards
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    rules: Vec<(Counter, Regex)>,
}

impl PatternRegistry {
    pub fn new() -> anyhow::Result<PatternRegistry> {
        let mut sources = vec![
            (Counter::SimSeconds, r"^simSeconds\s+([\d.eE+-]+)".to_string()),
            (
                Counter::L2Misses,
                r"^system\.l2\.overall[Mm]isses::total\s+(\d+)".to_string(),
            ),
            (
                Counter::L2Hits,
                r"^system\.l2\.overall[Hh]its::total\s+(\d+)".to_string(),
            ),
        ];

        for c in 0..NUM_CORES {
            let core = core_token(c);
            sources.extend([
                (
                    Counter::Ipc(c),
                    format!(r"^system\.{core}\.ipc\s+([\d.eE+-]+)"),
                ),
                (
                    Counter::L1Misses(c),
                    format!(r"^system\.{core}\.dcache\.overall[Mm]isses::total\s+(\d+)"),
                ),
                (
                    Counter::L1Hits(c),
                    format!(r"^system\.{core}\.dcache\.overall[Hh]its::total\s+(\d+)"),
                ),
                (
                    Counter::Instructions(c),
                    format!(r"^system\.{core}\.commitStats0\.numInsts\s+(\d+)"),
                ),
                (
                    Counter::BranchIncorrect(c),
                    format!(r"^system\.{core}\.branchPred\.condIncorrect\s+(\d+)"),
                ),
                (
                    Counter::BranchPredicted(c),
                    format!(r"^system\.{core}\.branchPred\.condPredicted\s+(\d+)"),
                ),
            ]);
        }

        let mut rules = vec![];
        for (counter, source) in sources {
            rules.push((counter, Regex::new(&source)?));
        }
        Ok(PatternRegistry { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All counters whose pattern matches `line`, with the captured value
    ///
    /// A capture that is not a finite number (e.g. `1.2.3` or `1e999`) counts
    /// as no match.
    pub fn match_line<'a>(
        &'a self,
        line: &'a str,
    ) -> impl Iterator<Item = (Counter, f64)> + 'a {
        self.rules.iter().filter_map(move |(counter, regex)| {
            let captured = regex.captures(line)?.get(1)?.as_str();
            match captured.parse::<f64>() {
                Ok(value) if value.is_finite() => Some((*counter, value)),
                _ => {
                    log::debug!("ignoring non-numeric {counter} value {captured:?}");
                    None
                }
            }
        })
    }
}
