//! Chart data: filters and group-bys over the summary table
use crate::{BranchPredictor, CoreType, SummaryRow, SummaryTable};
use std::collections::{BTreeMap, BTreeSet};

/// One named set of values, aligned with the categories of its panel
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Grouped bars: one group per category, one bar per series in each group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarPanel {
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub legend_title: Option<String>,
    /// rotation of the category labels in degrees
    pub rotation: u32,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

/// A line through `(x, y)` points
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub name: String,
    pub points: Vec<(f64, Option<f64>)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinePanel {
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Bars(BarPanel),
    Lines(LinePanel),
}

/// A figure of one or more side-by-side panels, saved as `file_name`
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub file_name: String,
    pub suptitle: Option<String>,
    pub share_y: bool,
    pub panels: Vec<Panel>,
}

impl Chart {
    fn single(file_name: String, panel: Panel) -> Chart {
        Chart {
            file_name,
            suptitle: None,
            share_y: false,
            panels: vec![panel],
        }
    }
}

/// Mean of the known values, unknown when there are none
fn mean<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 { None } else { Some(sum / count as f64) }
}

/// Distinct values in order of first appearance
fn unique_in_order<T: PartialEq, I: IntoIterator<Item = T>>(items: I) -> Vec<T> {
    let mut unique = vec![];
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

/// Mean of `value` for every (row key, column key) cell
///
/// Rows with an unknown key are left out. Row and column keys are sorted,
/// a cell without rows is unknown.
fn pivot_mean<'a, R, C, I>(
    rows: I,
    row_key: impl Fn(&SummaryRow) -> Option<R>,
    column_key: impl Fn(&SummaryRow) -> Option<C>,
    value: impl Fn(&SummaryRow) -> Option<f64>,
) -> (Vec<R>, Vec<C>, BTreeMap<(R, C), Option<f64>>)
where
    R: Ord + Clone,
    C: Ord + Clone,
    I: IntoIterator<Item = &'a SummaryRow>,
{
    let mut cells: BTreeMap<(R, C), Vec<Option<f64>>> = BTreeMap::new();
    for row in rows {
        if let (Some(r), Some(c)) = (row_key(row), column_key(row)) {
            cells.entry((r, c)).or_default().push(value(row));
        }
    }
    let row_keys: BTreeSet<R> = cells.keys().map(|(r, _)| r.clone()).collect();
    let column_keys: BTreeSet<C> = cells.keys().map(|(_, c)| c.clone()).collect();
    let means = cells
        .into_iter()
        .map(|(key, values)| (key, mean(values)))
        .collect();
    (
        row_keys.into_iter().collect(),
        column_keys.into_iter().collect(),
        means,
    )
}

/// Turn a pivot into a bar panel: rows become categories, columns become series
fn pivot_bars<R: Ord + Clone, C: Ord + Clone>(
    (row_keys, column_keys, means): (Vec<R>, Vec<C>, BTreeMap<(R, C), Option<f64>>),
    row_name: impl Fn(&R) -> String,
    column_name: impl Fn(&C) -> String,
) -> BarPanel {
    let series = column_keys
        .iter()
        .map(|c| Series {
            name: column_name(c),
            values: row_keys
                .iter()
                .map(|r| means.get(&(r.clone(), c.clone())).copied().flatten())
                .collect(),
        })
        .collect();
    BarPanel {
        categories: row_keys.iter().map(row_name).collect(),
        series,
        ..Default::default()
    }
}

fn has_values(panel: &BarPanel) -> bool {
    panel
        .series
        .iter()
        .any(|series| series.values.iter().any(Option::is_some))
}

/// Per-run bars of the given columns, `None` if nothing is known
fn per_run_bars<const N: usize>(
    table: &SummaryTable,
    file_name: &str,
    ylabel: &str,
    columns: [&str; N],
    values: impl Fn(&SummaryRow) -> [Option<f64>; N],
) -> Option<Chart> {
    let series = columns
        .iter()
        .enumerate()
        .map(|(index, name)| Series {
            name: name.to_string(),
            values: table.rows.iter().map(|row| values(row)[index]).collect(),
        })
        .collect();
    let panel = BarPanel {
        xlabel: Some("label".to_string()),
        ylabel: Some(ylabel.to_string()),
        rotation: 60,
        categories: table.rows.iter().map(|row| row.label.clone()).collect(),
        series,
        ..Default::default()
    };
    has_values(&panel).then(|| Chart::single(file_name.to_string(), Panel::Bars(panel)))
}

/// IPC of both cores for every run
pub fn ipc_chart(table: &SummaryTable) -> Option<Chart> {
    per_run_bars(table, "ipc.png", "IPC", ["ipc0", "ipc1"], |row| {
        [row.ipc0, row.ipc1]
    })
}

/// L1 MPKI of both cores for every run
pub fn l1_mpki_chart(table: &SummaryTable) -> Option<Chart> {
    per_run_bars(
        table,
        "l1_mpki.png",
        "L1 MPKI",
        ["L1_MPKI0", "L1_MPKI1"],
        |row| [row.l1_mpki0, row.l1_mpki1],
    )
}

/// Single-core IPC of 32 kB against 128 kB L1, one panel per cpu type
pub fn l1_size_by_cpu_chart(table: &SummaryTable) -> Option<Chart> {
    let single: Vec<&SummaryRow> = table
        .rows
        .iter()
        .filter(|row| row.core_type == CoreType::Single)
        .filter(|row| matches!(row.l1_size_kb(), Some(32 | 128)))
        .collect();
    let cpus = unique_in_order(single.iter().filter_map(|row| row.cpu_type));

    let mut panels = vec![];
    for (index, cpu) in cpus.iter().enumerate() {
        let pivot = pivot_mean(
            single.iter().copied().filter(|row| row.cpu_type == Some(*cpu)),
            |row| row.benchmark.map(|benchmark| benchmark.as_str()),
            |row| row.l1_size_kb(),
            |row| row.ipc0,
        );
        let mut panel = pivot_bars(
            pivot,
            |benchmark| benchmark.to_string(),
            |size| size.to_string(),
        );
        panel.title = Some(format!("{}  (single-core)", cpu.as_str().to_uppercase()));
        panel.xlabel = Some("Benchmark".to_string());
        panel.legend_title = Some("L1 size (kB)".to_string());
        if index == 0 {
            panel.ylabel = Some("IPC₀".to_string());
        }
        panels.push(Panel::Bars(panel));
    }

    if panels.is_empty() {
        return None;
    }
    Some(Chart {
        file_name: "l1_size_by_cpu.png".to_string(),
        suptitle: Some("Single-core IPC₀: 32 kB vs 128 kB L1, by CPU".to_string()),
        share_y: true,
        panels,
    })
}

/// IPC against L1 size for each benchmark, one line per configuration
pub fn l1_sensitivity_charts(table: &SummaryTable) -> Vec<Chart> {
    let benchmarks: BTreeSet<&str> = table
        .rows
        .iter()
        .filter_map(|row| row.benchmark.map(|benchmark| benchmark.as_str()))
        .collect();

    let mut charts = vec![];
    for benchmark in benchmarks {
        // (cpu, predictor, l2) -> points
        let mut groups: BTreeMap<(&str, &str, &str), Vec<(u64, Option<f64>)>> = BTreeMap::new();
        for row in &table.rows {
            if row.benchmark.map(|b| b.as_str()) != Some(benchmark) {
                continue;
            }
            let (Some(cpu), Some(l2), Some(l1)) =
                (row.cpu_type, row.l2_size.as_deref(), row.l1_size_kb())
            else {
                continue;
            };
            groups
                .entry((cpu.as_str(), row.branch_predictor.as_str(), l2))
                .or_default()
                .push((l1, row.ipc0));
        }

        let lines: Vec<Line> = groups
            .into_iter()
            .map(|((cpu, bp, l2), mut points)| {
                points.sort_by_key(|(l1, _)| *l1);
                Line {
                    name: format!("{cpu}/{bp}/L2={l2}kB"),
                    points: points.into_iter().map(|(l1, ipc)| (l1 as f64, ipc)).collect(),
                }
            })
            .collect();
        if lines.is_empty() {
            log::info!(
                "No complete configurations for {benchmark}, skipping its L1 sensitivity chart"
            );
            continue;
        }

        charts.push(Chart::single(
            format!("l1_sensitivity_{benchmark}.png"),
            Panel::Lines(LinePanel {
                title: Some(format!("L1 Size vs IPC0 ({benchmark})")),
                xlabel: Some("L1 size (kB)".to_string()),
                ylabel: Some("IPC0".to_string()),
                lines,
            }),
        ));
    }
    charts
}

/// Static against TAGE branch prediction, one chart per cpu type
pub fn branch_predictor_charts(table: &SummaryTable) -> Vec<Chart> {
    let cpus = unique_in_order(table.rows.iter().filter_map(|row| row.cpu_type));

    let mut charts = vec![];
    for cpu in cpus {
        let pivot = pivot_mean(
            table.rows.iter().filter(|row| row.cpu_type == Some(cpu)),
            |row| row.benchmark.map(|benchmark| benchmark.as_str()),
            |row| Some(row.branch_predictor),
            |row| row.ipc0,
        );
        let mut panel = pivot_bars(
            pivot,
            |benchmark| benchmark.to_string(),
            |bp: &BranchPredictor| bp.to_string(),
        );
        if panel.categories.is_empty() {
            continue;
        }
        panel.title = Some(format!(
            "IPC0 by Branch Predictor on {}",
            cpu.as_str().to_uppercase()
        ));
        panel.xlabel = Some("benchmark".to_string());
        panel.ylabel = Some("IPC0".to_string());
        panel.legend_title = Some("branch_predictor".to_string());
        charts.push(Chart::single(
            format!("branch_predictor_{cpu}.png"),
            Panel::Bars(panel),
        ));
    }
    charts
}

/// Dual-core aggregate IPC of matmul (scaling) and interf (interference)
pub fn dual_aggregate_chart(table: &SummaryTable) -> Option<Chart> {
    let (row_keys, _, means) = pivot_mean(
        table
            .rows
            .iter()
            .filter(|row| row.core_type == CoreType::Dual && row.aggregate_ipc().is_some()),
        |row| row.cpu_type.map(|cpu| (cpu.as_str(), row.branch_predictor.as_str())),
        |row| row.benchmark.map(|benchmark| benchmark.as_str()),
        |row| row.aggregate_ipc(),
    );
    if row_keys.is_empty() {
        return None;
    }

    let series = ["matmul", "interf"]
        .into_iter()
        .map(|benchmark| Series {
            name: benchmark.to_string(),
            values: row_keys
                .iter()
                .map(|key| means.get(&(*key, benchmark)).copied().flatten())
                .collect(),
        })
        .collect();
    let panel = BarPanel {
        title: Some("Aggregate IPC: matmul (scaling) vs interf (interference)".to_string()),
        xlabel: Some("cpu_type,branch_predictor".to_string()),
        ylabel: Some("Agg IPC".to_string()),
        legend_title: Some("benchmark".to_string()),
        rotation: 0,
        categories: row_keys
            .iter()
            .map(|(cpu, bp)| format!("({cpu}, {bp})"))
            .collect(),
        series,
    };
    Some(Chart::single("dual_aggregate_ipc.png".to_string(), Panel::Bars(panel)))
}

/// Quick overview charts written right after extraction
pub fn overview_charts(table: &SummaryTable) -> Vec<Chart> {
    ipc_chart(table).into_iter().chain(l1_mpki_chart(table)).collect()
}

/// Every comparison chart the data allows
pub fn comparison_charts(table: &SummaryTable) -> Vec<Chart> {
    let mut charts = vec![];
    charts.extend(l1_size_by_cpu_chart(table));
    charts.extend(l1_sensitivity_charts(table));
    charts.extend(branch_predictor_charts(table));
    charts.extend(dual_aggregate_chart(table));
    charts
}

#[cfg(test)]
mod tests {
    use super::{mean, unique_in_order};
    use crate::{
        Benchmark, BranchPredictor, CoreType, CpuType, Panel, SummaryRow, SummaryTable,
        branch_predictor_charts, comparison_charts, dual_aggregate_chart, ipc_chart,
        l1_sensitivity_charts, l1_size_by_cpu_chart, overview_charts,
    };

    fn row(
        label: &str,
        core_type: CoreType,
        benchmark: Option<Benchmark>,
        cpu_type: Option<CpuType>,
        branch_predictor: BranchPredictor,
        sizes: (Option<&str>, Option<&str>),
        ipc: (Option<f64>, Option<f64>),
    ) -> SummaryRow {
        SummaryRow {
            label: label.to_string(),
            core_type,
            benchmark,
            cpu_type,
            branch_predictor,
            l1_size: sizes.0.map(str::to_string),
            l2_size: sizes.1.map(str::to_string),
            ipc0: ipc.0,
            ipc1: ipc.1,
            sim_sec: None,
            l1_mpki0: None,
            l1_mpki1: None,
            l1_miss0: None,
            l1_miss1: None,
            l2_miss: None,
            bp_miss0: None,
            bp_miss1: None,
        }
    }

    fn sweep() -> SummaryTable {
        use Benchmark::*;
        use BranchPredictor::*;
        use CoreType::*;
        use CpuType::*;
        SummaryTable {
            rows: vec![
                row(
                    "a",
                    Single,
                    Some(Matmul),
                    Some(O3),
                    Static,
                    (Some("32"), Some("256")),
                    (Some(1.0), None),
                ),
                row(
                    "b",
                    Single,
                    Some(Matmul),
                    Some(O3),
                    Static,
                    (Some("128"), Some("256")),
                    (Some(1.5), None),
                ),
                row(
                    "c",
                    Single,
                    Some(Matmul),
                    Some(O3),
                    Static,
                    (Some("128"), Some("256")),
                    (Some(2.5), None),
                ),
                row(
                    "d",
                    Single,
                    Some(Sort),
                    Some(O3),
                    Tage,
                    (Some("64"), Some("256")),
                    (Some(0.5), None),
                ),
                row(
                    "e",
                    Single,
                    Some(Sort),
                    Some(Timing),
                    Static,
                    (Some("32"), Some("512")),
                    (None, None),
                ),
                row("f", Single, None, None, Static, (Some("32"), None), (Some(9.0), None)),
                row("g", Dual, Some(Matmul), Some(O3), Tage, (None, None), (Some(1.0), Some(1.5))),
                row("h", Dual, Some(Interf), Some(O3), Tage, (None, None), (Some(0.5), Some(0.25))),
                row("i", Dual, Some(Rand), Some(Timing), Static, (None, None), (Some(0.5), None)),
            ],
        }
    }

    fn bars(panel: &Panel) -> &crate::BarPanel {
        match panel {
            Panel::Bars(bars) => bars,
            Panel::Lines(_) => panic!("expected bars"),
        }
    }

    #[test]
    fn test_helpers() {
        assert_eq!(mean([Some(1.0), None, Some(2.0)]), Some(1.5));
        assert_eq!(mean([None, None]), None);
        assert_eq!(unique_in_order([3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn test_ipc_chart() {
        let chart = ipc_chart(&sweep()).unwrap();
        assert_eq!(chart.file_name, "ipc.png");
        let panel = bars(&chart.panels[0]);
        assert_eq!(panel.categories.len(), 9);
        assert_eq!(panel.series[0].name, "ipc0");
        assert_eq!(panel.series[1].values[6], Some(1.5));
        assert_eq!(panel.series[1].values[0], None);
        assert_eq!(panel.rotation, 60);
    }

    #[test]
    fn test_overview_skips_unknown() {
        let charts = overview_charts(&sweep());
        // no run has an L1 MPKI
        assert_eq!(charts.len(), 1);
        assert!(overview_charts(&SummaryTable::default()).is_empty());
    }

    #[test]
    fn test_l1_size_by_cpu() {
        let chart = l1_size_by_cpu_chart(&sweep()).unwrap();
        assert!(chart.share_y);
        assert_eq!(chart.panels.len(), 2);

        let o3 = bars(&chart.panels[0]);
        assert_eq!(o3.title.as_deref(), Some("O3  (single-core)"));
        assert_eq!(o3.ylabel.as_deref(), Some("IPC₀"));
        // the 64 kB sort run is filtered out
        assert_eq!(o3.categories, vec!["matmul"]);
        assert_eq!(o3.series[0].name, "32");
        assert_eq!(o3.series[0].values, vec![Some(1.0)]);
        assert_eq!(o3.series[1].name, "128");
        assert_eq!(o3.series[1].values, vec![Some(2.0)]);

        let timing = bars(&chart.panels[1]);
        assert_eq!(timing.ylabel, None);
        assert_eq!(timing.categories, vec!["sort"]);
        assert_eq!(timing.series[0].values, vec![None]);
    }

    #[test]
    fn test_l1_sensitivity() {
        let charts = l1_sensitivity_charts(&sweep());
        let names: Vec<&str> = charts.iter().map(|chart| chart.file_name.as_str()).collect();
        // interf and rand runs have no sizes
        assert_eq!(names, vec!["l1_sensitivity_matmul.png", "l1_sensitivity_sort.png"]);

        let Panel::Lines(matmul) = &charts[0].panels[0] else {
            panic!("expected lines");
        };
        assert_eq!(matmul.lines.len(), 1);
        assert_eq!(matmul.lines[0].name, "o3/static/L2=256kB");
        assert_eq!(
            matmul.lines[0].points,
            vec![(32.0, Some(1.0)), (128.0, Some(1.5)), (128.0, Some(2.5))]
        );

        let Panel::Lines(sort) = &charts[1].panels[0] else {
            panic!("expected lines");
        };
        let names: Vec<&str> = sort.lines.iter().map(|line| line.name.as_str()).collect();
        assert_eq!(names, vec!["o3/TAGE/L2=256kB", "timing/static/L2=512kB"]);
    }

    #[test]
    fn test_branch_predictor() {
        let charts = branch_predictor_charts(&sweep());
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].file_name, "branch_predictor_o3.png");
        let o3 = bars(&charts[0].panels[0]);
        // dual-core runs count too
        assert_eq!(o3.categories, vec!["interf", "matmul", "sort"]);
        assert_eq!(o3.series[0].name, "TAGE");
        assert_eq!(o3.series[0].values, vec![Some(0.5), Some(1.0), Some(0.5)]);
        assert_eq!(o3.series[1].name, "static");
        assert_eq!(o3.series[1].values, vec![None, Some(5.0 / 3.0), None]);
    }

    #[test]
    fn test_dual_aggregate() {
        let chart = dual_aggregate_chart(&sweep()).unwrap();
        let panel = bars(&chart.panels[0]);
        // the rand run has no ipc1
        assert_eq!(panel.categories, vec!["(o3, TAGE)"]);
        assert_eq!(panel.series[0].name, "matmul");
        assert_eq!(panel.series[0].values, vec![Some(2.5)]);
        assert_eq!(panel.series[1].name, "interf");
        assert_eq!(panel.series[1].values, vec![Some(0.75)]);
    }

    #[test]
    fn test_empty_table() {
        assert!(comparison_charts(&SummaryTable::default()).is_empty());
        assert_eq!(comparison_charts(&sweep()).len(), 1 + 2 + 2 + 1);
    }
}
