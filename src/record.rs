use crate::{
    Benchmark, BranchPredictor, CoreType, Counter, CpuType, DerivedMetrics, LabelTags, RawStats,
};
use serde::{Deserialize, Serialize};

/// Everything extracted from one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    /// run directory name
    pub label: String,
    pub tags: LabelTags,
    pub raw: RawStats,
    pub derived: DerivedMetrics,
}

/// Columns of the summary table, in order
pub const SUMMARY_COLUMNS: [&str; 17] = [
    "label",
    "core_type",
    "benchmark",
    "cpu_type",
    "branch_predictor",
    "l1_size",
    "l2_size",
    "ipc0",
    "ipc1",
    "sim_sec",
    "L1_MPKI0",
    "L1_MPKI1",
    "L1_miss0%",
    "L1_miss1%",
    "L2_miss%",
    "BP_miss0%",
    "BP_miss1%",
];

/// One row of the summary table
///
/// Field order is the column order of the csv, `None` is an empty cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub core_type: CoreType,
    pub benchmark: Option<Benchmark>,
    pub cpu_type: Option<CpuType>,
    pub branch_predictor: BranchPredictor,
    pub l1_size: Option<String>,
    pub l2_size: Option<String>,
    pub ipc0: Option<f64>,
    pub ipc1: Option<f64>,
    pub sim_sec: Option<f64>,
    #[serde(rename = "L1_MPKI0")]
    pub l1_mpki0: Option<f64>,
    #[serde(rename = "L1_MPKI1")]
    pub l1_mpki1: Option<f64>,
    #[serde(rename = "L1_miss0%")]
    pub l1_miss0: Option<f64>,
    #[serde(rename = "L1_miss1%")]
    pub l1_miss1: Option<f64>,
    #[serde(rename = "L2_miss%")]
    pub l2_miss: Option<f64>,
    #[serde(rename = "BP_miss0%")]
    pub bp_miss0: Option<f64>,
    #[serde(rename = "BP_miss1%")]
    pub bp_miss1: Option<f64>,
}

impl From<&RunRecord> for SummaryRow {
    fn from(record: &RunRecord) -> SummaryRow {
        let tags = &record.tags;
        let derived = &record.derived;
        SummaryRow {
            label: record.label.clone(),
            core_type: tags.core_type,
            benchmark: tags.benchmark,
            cpu_type: tags.cpu_type,
            branch_predictor: tags.branch_predictor,
            l1_size: tags.l1_size.clone(),
            l2_size: tags.l2_size.clone(),
            ipc0: record.raw.get(Counter::Ipc(0)),
            ipc1: record.raw.get(Counter::Ipc(1)),
            sim_sec: record.raw.get(Counter::SimSeconds),
            l1_mpki0: derived.l1_mpki[0],
            l1_mpki1: derived.l1_mpki[1],
            l1_miss0: derived.l1_miss_percent[0],
            l1_miss1: derived.l1_miss_percent[1],
            l2_miss: derived.l2_miss_percent,
            bp_miss0: derived.bp_miss_percent[0],
            bp_miss1: derived.bp_miss_percent[1],
        }
    }
}

impl SummaryRow {
    /// `l1_size` as a number, for sorting and plotting
    pub fn l1_size_kb(&self) -> Option<u64> {
        self.l1_size.as_deref()?.parse().ok()
    }

    /// Sum of both cores' ipc, unknown if either core is
    pub fn aggregate_ipc(&self) -> Option<f64> {
        Some(self.ipc0? + self.ipc1?)
    }
}
