use crate::{Counter, PatternRegistry};
use serde::Serialize;
use std::{collections::BTreeMap, io::BufRead};

/// Raw counter values of one run, absent counters are unknown
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawStats {
    values: BTreeMap<Counter, f64>,
}

impl RawStats {
    pub fn new() -> RawStats {
        RawStats::default()
    }

    /// Store a value, replacing any earlier value of the same counter
    ///
    /// gem5 may dump cumulative counters more than once, the last dump wins.
    pub fn record(&mut self, counter: Counter, value: f64) {
        self.values.insert(counter, value);
    }

    pub fn get(&self, counter: Counter) -> Option<f64> {
        self.values.get(&counter).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Scan a stats stream in one forward pass
pub fn scan_stats<R: BufRead>(
    mut reader: R,
    registry: &PatternRegistry,
) -> std::io::Result<RawStats> {
    let mut stats = RawStats::new();
    let mut buffer = vec![];
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        // stats dumps are ascii, but a stray byte must not stop the scan
        let line = String::from_utf8_lossy(&buffer);
        for (counter, value) in registry.match_line(&line) {
            stats.record(counter, value);
        }
    }
    Ok(stats)
}
