use crate::{
    DerivedMetrics, LabelTagger, PatternRegistry, RawStats, RunRecord, get_run_label, scan_stats,
};
use anyhow::Context;
use indicatif::ProgressBar;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

/// What to do when a stats file cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFailurePolicy {
    /// warn and leave the run out of the summary
    #[default]
    Skip,
    /// stop at the first unreadable run
    Abort,
}

/// Turns stats files into [`RunRecord`]s
#[derive(Debug, Clone)]
pub struct Extractor {
    registry: PatternRegistry,
    tagger: LabelTagger,
}

impl Extractor {
    pub fn new() -> anyhow::Result<Extractor> {
        Ok(Extractor {
            registry: PatternRegistry::new()?,
            tagger: LabelTagger::new()?,
        })
    }

    /// Build the record of a single stats file; the label comes from the parent directory
    pub fn parse_run<P: AsRef<Path>>(&self, stats_path: P) -> anyhow::Result<RunRecord> {
        let stats_path = stats_path.as_ref();
        let raw = {
            let file = File::open(stats_path)
                .with_context(|| format!("Unable to open {}", stats_path.display()))?;
            scan_stats(BufReader::new(file), &self.registry)
                .with_context(|| format!("Unable to read {}", stats_path.display()))?
        };
        Ok(self.build_record(get_run_label(stats_path), raw))
    }

    pub fn build_record(&self, label: String, raw: RawStats) -> RunRecord {
        log::debug!("{label}: {} counters matched", raw.len());
        RunRecord {
            tags: self.tagger.tag(&label),
            derived: DerivedMetrics::compute(&raw),
            label,
            raw,
        }
    }
}

/// Records of a collection pass and the runs left out of it
#[derive(Debug, Default)]
pub struct Collected {
    pub records: Vec<RunRecord>,
    pub skipped: Vec<PathBuf>,
}

/// Parse every stats file in order, one file at a time
pub fn collect_runs(
    extractor: &Extractor,
    paths: &[PathBuf],
    policy: ReadFailurePolicy,
    pbar: &ProgressBar,
) -> anyhow::Result<Collected> {
    let mut collected = Collected::default();
    for path in paths {
        match extractor.parse_run(path) {
            Ok(record) => collected.records.push(record),
            Err(err) if policy == ReadFailurePolicy::Skip => {
                log::warn!("Skipping run: {err:#}");
                collected.skipped.push(path.clone());
            }
            Err(err) => return Err(err),
        }
        pbar.inc(1);
    }
    pbar.finish_and_clear();
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use crate::{
        Benchmark, BranchPredictor, CoreType, Counter, CpuType, Extractor, ReadFailurePolicy,
        SummaryTable, collect_runs, discover_runs,
    };
    use indicatif::ProgressBar;

    const MATMUL_STATS: &str = "\
simSeconds                                   0.000050
system.cpu.ipc                               1.25
system.cpu.dcache.overallMisses::total       100
system.cpu.commitStats0.numInsts             5000
system.cpu.dcache.overallHits::total         900
";

    #[test]
    fn test_parse_run() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = dir.path().join("single_DerivO3CPU_matmul_l1_32_l2_256");
        std::fs::create_dir(&run_dir).unwrap();
        std::fs::write(run_dir.join("stats.txt"), MATMUL_STATS).unwrap();

        let record = Extractor::new()
            .unwrap()
            .parse_run(run_dir.join("stats.txt"))
            .unwrap();
        assert_eq!(record.label, "single_DerivO3CPU_matmul_l1_32_l2_256");
        assert_eq!(record.raw.get(Counter::Ipc(0)), Some(1.25));
        assert_eq!(record.derived.l1_mpki[0], Some(20.0));
        assert_eq!(record.derived.l1_miss_percent[0], Some(10.0));
        assert_eq!(record.derived.bp_miss_percent, [None, None]);
        assert_eq!(record.tags.benchmark, Some(Benchmark::Matmul));
        assert_eq!(record.tags.cpu_type, Some(CpuType::DerivO3CPU));
        assert_eq!(record.tags.core_type, CoreType::Single);
        assert_eq!(record.tags.branch_predictor, BranchPredictor::Static);
    }

    #[test]
    fn test_zero_predicted() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = dir.path().join("single_o3_TAGE_sort");
        std::fs::create_dir(&run_dir).unwrap();
        std::fs::write(
            run_dir.join("stats.txt"),
            "system.cpu.branchPred.condPredicted 0\nsystem.cpu.branchPred.condIncorrect 0\n",
        )
        .unwrap();

        let record = Extractor::new()
            .unwrap()
            .parse_run(run_dir.join("stats.txt"))
            .unwrap();
        assert_eq!(record.raw.get(Counter::BranchPredicted(0)), Some(0.0));
        assert_eq!(record.derived.bp_miss_percent[0], None);
    }

    #[test]
    fn test_skip_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = dir.path().join("good");
        std::fs::create_dir(&run_dir).unwrap();
        std::fs::write(run_dir.join("stats.txt"), MATMUL_STATS).unwrap();
        let paths = vec![
            dir.path().join("missing/stats.txt"),
            run_dir.join("stats.txt"),
        ];

        let extractor = Extractor::new().unwrap();
        let collected = collect_runs(
            &extractor,
            &paths,
            ReadFailurePolicy::Skip,
            &ProgressBar::hidden(),
        )
        .unwrap();
        assert_eq!(collected.records.len(), 1);
        assert_eq!(collected.records[0].label, "good");
        assert_eq!(collected.skipped, vec![paths[0].clone()]);

        let err = collect_runs(
            &extractor,
            &paths,
            ReadFailurePolicy::Abort,
            &ProgressBar::hidden(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        for (label, stats) in [
            ("single_o3_sort_l132", MATMUL_STATS),
            ("dual_DerivO3CPU_TAGE_matmul", "system.cpu0.ipc 0.9\nsystem.cpu1.ipc 1.1\n"),
            ("empty", ""),
        ] {
            std::fs::create_dir(dir.path().join(label)).unwrap();
            std::fs::write(dir.path().join(label).join("stats.txt"), stats).unwrap();
        }

        let extractor = Extractor::new().unwrap();
        let summarise = |name: &str| {
            let paths = discover_runs(dir.path(), "stats.txt").unwrap();
            let collected = collect_runs(
                &extractor,
                &paths,
                ReadFailurePolicy::Abort,
                &ProgressBar::hidden(),
            )
            .unwrap();
            let path = dir.path().join(name);
            assert_eq!(
                SummaryTable::from_records(&collected.records)
                    .write_csv(&path)
                    .unwrap(),
                3
            );
            std::fs::read(path).unwrap()
        };
        let first = summarise("first.csv");
        assert_eq!(first, summarise("second.csv"));

        let text = String::from_utf8(first).unwrap();
        let labels: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(
            labels,
            vec!["dual_DerivO3CPU_TAGE_matmul", "empty", "single_o3_sort_l132"]
        );
    }
}
