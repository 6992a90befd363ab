//! Render [`Chart`]s through python matplotlib
use crate::{BarPanel, Chart, Config, LinePanel, Panel};
use anyhow::{Context, anyhow};
use matplotlib::{Matplotlib, Mpl, Run, serde_json::Value};
use std::path::{Path, PathBuf};

/// Python string literal
fn py_str(s: &str) -> String {
    // a json string is a valid python string
    Value::String(s.to_string()).to_string()
}

fn py_opt_str(s: &Option<String>) -> String {
    match s {
        Some(s) => py_str(s),
        None => "None".to_string(),
    }
}

/// Python float literal, unknown values become NaN so matplotlib leaves a gap
fn py_f64(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:?}"),
        _ => "nan".to_string(),
    }
}

fn py_list<T, F: Fn(&T) -> String>(items: &[T], f: F) -> String {
    format!(
        "[{}]",
        items.iter().map(f).collect::<Vec<String>>().join(", ")
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct CustomPrelude {
    dpi: u32,
}

impl Matplotlib for CustomPrelude {
    fn is_prelude(&self) -> bool {
        true
    }

    fn data(&self) -> Option<Value> {
        None
    }

    fn py_cmd(&self) -> String {
        format!(
            "\
import matplotlib
matplotlib.use(\"Agg\")
import matplotlib.pyplot as plt
import numpy as np
nan = float(\"nan\")
matplotlib.rcParams[\"savefig.dpi\"] = {}
",
            self.dpi
        )
    }
}

/// Creates `fig` with one row of panels in `axes`
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    panels: usize,
    width: f64,
    height: f64,
    share_y: bool,
}

impl Matplotlib for Figure {
    fn is_prelude(&self) -> bool {
        false
    }

    fn data(&self) -> Option<Value> {
        None
    }

    fn py_cmd(&self) -> String {
        format!(
            "fig, axes = plt.subplots(1, {}, figsize=({:?}, {:?}), sharey={}, squeeze=False)",
            self.panels,
            self.width,
            self.height,
            if self.share_y { "True" } else { "False" }
        )
    }
}

/// Makes panel `index` the current `ax`
#[derive(Clone, Debug, PartialEq)]
pub struct SelectPanel(usize);

impl Matplotlib for SelectPanel {
    fn is_prelude(&self) -> bool {
        false
    }

    fn data(&self) -> Option<Value> {
        None
    }

    fn py_cmd(&self) -> String {
        format!("ax = axes[0][{}]", self.0)
    }
}

/// Grouped bars with titles and legend on the current `ax`
#[derive(Clone, Debug, PartialEq)]
pub struct GroupedBars(BarPanel);

impl Matplotlib for GroupedBars {
    fn is_prelude(&self) -> bool {
        false
    }

    fn data(&self) -> Option<Value> {
        None
    }

    fn py_cmd(&self) -> String {
        let panel = &self.0;
        let mut cmd = format!(
            "\
categories = {}
series = [{}]
x = np.arange(len(categories))
width = 0.8 / max(len(series), 1)
for i, (name, values) in enumerate(series):
    ax.bar(x + (i - (len(series) - 1) / 2) * width, values, width, label=name)
ax.set_xticks(x)
ax.set_xticklabels(categories, rotation={}, ha={})
",
            py_list(&panel.categories, |category| py_str(category)),
            panel
                .series
                .iter()
                .map(|series| format!(
                    "({}, {})",
                    py_str(&series.name),
                    py_list(&series.values, |value| py_f64(*value))
                ))
                .collect::<Vec<String>>()
                .join(", "),
            panel.rotation,
            if panel.rotation == 0 {
                "\"center\""
            } else {
                "\"right\""
            }
        );
        cmd += &labels(&panel.title, &panel.xlabel, &panel.ylabel);
        cmd += &format!("ax.legend(title={})\n", py_opt_str(&panel.legend_title));
        cmd
    }
}

/// Lines with markers on the current `ax`
#[derive(Clone, Debug, PartialEq)]
pub struct Lines(LinePanel);

impl Matplotlib for Lines {
    fn is_prelude(&self) -> bool {
        false
    }

    fn data(&self) -> Option<Value> {
        None
    }

    fn py_cmd(&self) -> String {
        let panel = &self.0;
        let mut cmd = String::new();
        for line in &panel.lines {
            cmd += &format!(
                "ax.plot({}, {}, marker=\"o\", label={})\n",
                py_list(&line.points, |(x, _)| py_f64(Some(*x))),
                py_list(&line.points, |(_, y)| py_f64(*y)),
                py_str(&line.name)
            );
        }
        cmd += &labels(&panel.title, &panel.xlabel, &panel.ylabel);
        cmd += "ax.legend()\n";
        cmd
    }
}

fn labels(title: &Option<String>, xlabel: &Option<String>, ylabel: &Option<String>) -> String {
    let mut cmd = String::new();
    if let Some(title) = title {
        cmd += &format!("ax.set_title({})\n", py_str(title));
    }
    if let Some(xlabel) = xlabel {
        cmd += &format!("ax.set_xlabel({})\n", py_str(xlabel));
    }
    if let Some(ylabel) = ylabel {
        cmd += &format!("ax.set_ylabel({})\n", py_str(ylabel));
    }
    cmd
}

/// Figure title and final layout
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    suptitle: Option<String>,
}

impl Matplotlib for Layout {
    fn is_prelude(&self) -> bool {
        false
    }

    fn data(&self) -> Option<Value> {
        None
    }

    fn py_cmd(&self) -> String {
        match &self.suptitle {
            Some(suptitle) => format!(
                "fig.suptitle({})\nfig.tight_layout(rect=[0, 0, 1, 0.95])",
                py_str(suptitle)
            ),
            None => "fig.tight_layout()".to_string(),
        }
    }
}

/// One command of a chart script
#[derive(Clone, Debug, PartialEq)]
pub enum PlotStep {
    Prelude(CustomPrelude),
    Figure(Figure),
    SelectPanel(SelectPanel),
    Bars(GroupedBars),
    Lines(Lines),
    Layout(Layout),
}

impl Matplotlib for PlotStep {
    fn is_prelude(&self) -> bool {
        matches!(self, PlotStep::Prelude(_))
    }

    fn data(&self) -> Option<Value> {
        None
    }

    fn py_cmd(&self) -> String {
        match self {
            PlotStep::Prelude(prelude) => prelude.py_cmd(),
            PlotStep::Figure(figure) => figure.py_cmd(),
            PlotStep::SelectPanel(select) => select.py_cmd(),
            PlotStep::Bars(bars) => bars.py_cmd(),
            PlotStep::Lines(lines) => lines.py_cmd(),
            PlotStep::Layout(layout) => layout.py_cmd(),
        }
    }
}

/// Commands of a chart script in order: prelude, figure, each panel, layout
pub fn plot_steps(chart: &Chart, config: &Config) -> Vec<PlotStep> {
    let mut steps = vec![
        PlotStep::Prelude(CustomPrelude { dpi: config.dpi }),
        PlotStep::Figure(Figure {
            panels: chart.panels.len(),
            width: config.figure_width,
            height: config.figure_height,
            share_y: chart.share_y,
        }),
    ];
    for (index, panel) in chart.panels.iter().enumerate() {
        steps.push(PlotStep::SelectPanel(SelectPanel(index)));
        steps.push(match panel {
            Panel::Bars(bars) => PlotStep::Bars(GroupedBars(bars.clone())),
            Panel::Lines(lines) => PlotStep::Lines(Lines(lines.clone())),
        });
    }
    steps.push(PlotStep::Layout(Layout {
        suptitle: chart.suptitle.clone(),
    }));
    steps
}

/// Build the matplotlib script of a chart
pub fn build_plot(chart: &Chart, config: &Config) -> Mpl {
    plot_steps(chart, config)
        .into_iter()
        .fold(Mpl::new(), |mpl, step| mpl & step)
}

/// Render a chart to `{dir}/{chart.file_name}`
pub fn save_chart<P: AsRef<Path>>(
    chart: &Chart,
    config: &Config,
    dir: P,
) -> anyhow::Result<PathBuf> {
    let path = dir.as_ref().join(&chart.file_name);
    build_plot(chart, config)
        .run(Run::Save(path.clone()))
        .map_err(|err| anyhow!("Unable to save {}: {err:?}", path.display()))?;
    Ok(path)
}

/// Render every chart, reporting failures instead of stopping at them
///
/// Returns the paths that were written.
pub fn save_charts<P: AsRef<Path>>(
    charts: &[Chart],
    config: &Config,
    dir: P,
) -> anyhow::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Unable to create {}", dir.display()))?;
    let mut saved = vec![];
    for chart in charts {
        match save_chart(chart, config, dir) {
            Ok(path) => {
                log::info!("Saved {}", path.display());
                saved.push(path);
            }
            Err(err) => log::warn!("Skipping {}: {err:#}", chart.file_name),
        }
    }
    Ok(saved)
}
