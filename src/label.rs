use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single or dual core configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoreType {
    Single,
    Dual,
}

/// Benchmark binary run in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Benchmark {
    Matmul,
    Dijkstra,
    Sort,
    Interf,
    Rand,
}

/// gem5 cpu model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CpuType {
    DerivO3CPU,
    TimingSimpleCPU,
    #[serde(rename = "o3")]
    O3,
    #[serde(rename = "timing")]
    Timing,
}

/// Branch predictor of the cpu
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BranchPredictor {
    #[serde(rename = "TAGE")]
    Tage,
    #[serde(rename = "static")]
    Static,
}

impl CoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoreType::Single => "single",
            CoreType::Dual => "dual",
        }
    }
}

impl Benchmark {
    /// Candidates in matching priority
    pub const ALL: [Benchmark; 5] = [
        Benchmark::Matmul,
        Benchmark::Dijkstra,
        Benchmark::Sort,
        Benchmark::Interf,
        Benchmark::Rand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Benchmark::Matmul => "matmul",
            Benchmark::Dijkstra => "dijkstra",
            Benchmark::Sort => "sort",
            Benchmark::Interf => "interf",
            Benchmark::Rand => "rand",
        }
    }
}

impl CpuType {
    /// Candidates in matching priority
    pub const ALL: [CpuType; 4] = [
        CpuType::DerivO3CPU,
        CpuType::TimingSimpleCPU,
        CpuType::O3,
        CpuType::Timing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CpuType::DerivO3CPU => "DerivO3CPU",
            CpuType::TimingSimpleCPU => "TimingSimpleCPU",
            CpuType::O3 => "o3",
            CpuType::Timing => "timing",
        }
    }
}

impl BranchPredictor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchPredictor::Tage => "TAGE",
            BranchPredictor::Static => "static",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(CoreType, Benchmark, CpuType, BranchPredictor);

/// Run metadata encoded in the run directory name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelTags {
    pub core_type: CoreType,
    pub benchmark: Option<Benchmark>,
    pub cpu_type: Option<CpuType>,
    pub branch_predictor: BranchPredictor,
    /// L1 size in kB, as written in the label
    pub l1_size: Option<String>,
    /// L2 size in kB, as written in the label
    pub l2_size: Option<String>,
}

/// Derives [`LabelTags`] from labels
#[derive(Debug, Clone)]
pub struct LabelTagger {
    l1_size: Regex,
    l2_size: Regex,
}

impl LabelTagger {
    pub fn new() -> anyhow::Result<LabelTagger> {
        Ok(LabelTagger {
            l1_size: Regex::new(r"_l1(\d+)")?,
            l2_size: Regex::new(r"_l2(\d+)")?,
        })
    }

    pub fn tag(&self, label: &str) -> LabelTags {
        // earliest candidate in the priority list wins, not earliest in the label
        let benchmark = Benchmark::ALL
            .into_iter()
            .find(|benchmark| label.contains(benchmark.as_str()));
        let cpu_type = CpuType::ALL
            .into_iter()
            .find(|cpu_type| label.contains(cpu_type.as_str()));
        let size = |regex: &Regex| {
            regex
                .captures(label)
                .and_then(|captures| captures.get(1))
                .map(|digits| digits.as_str().to_string())
        };

        LabelTags {
            core_type: if label.contains("dual") {
                CoreType::Dual
            } else {
                CoreType::Single
            },
            benchmark,
            cpu_type,
            branch_predictor: if label.contains("TAGE") {
                BranchPredictor::Tage
            } else {
                BranchPredictor::Static
            },
            l1_size: size(&self.l1_size),
            l2_size: size(&self.l2_size),
        }
    }
}
