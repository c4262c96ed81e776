//! SVG Gantt chart of an execution timeline.
//!
//! Each process gets one row. A translucent shadow spans its whole
//! turnaround (arrival to completion) and solid bars mark the intervals it
//! actually held the CPU, colored by group.

use std::collections::BTreeMap;
use std::fmt;

use crate::engine::FairShareEngine;
use crate::process::{GroupId, ProcessId, ProcessMetrics};
use crate::timeline::{ExecutionBlock, Timeline};

/// Group colors, handed out in order of first appearance.
pub const PALETTE: [&str; 7] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2",
];

const MARGIN_LEFT: f64 = 60.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 40.0;
const LEGEND_WIDTH: f64 = 120.0;
const ROW_HEIGHT: f64 = 24.0;
const BAR_HEIGHT: f64 = 16.0;

/// Builder and renderer for the chart.
#[derive(Debug, Clone)]
pub struct GanttChart<'a> {
    blocks: &'a [ExecutionBlock],
    /// pid → (arrival, turnaround).
    shadows: BTreeMap<ProcessId, (u64, u64)>,
    sort_by_pid: bool,
    px_per_tick: f64,
}

impl<'a> GanttChart<'a> {
    /// Chart a timeline, shading the turnaround of each completed process.
    pub fn new(timeline: &'a Timeline, completed: &[ProcessMetrics]) -> Self {
        GanttChart {
            blocks: timeline.blocks(),
            shadows: completed
                .iter()
                .map(|m| (m.id, (m.arrival.ticks(), m.turnaround)))
                .collect(),
            sort_by_pid: false,
            px_per_tick: 12.0,
        }
    }

    /// Chart the current state of an engine.
    pub fn from_engine(engine: &'a FairShareEngine) -> Self {
        Self::new(engine.timeline(), &engine.completed_metrics())
    }

    /// Order rows by process id instead of first execution.
    pub fn sort_by_pid(mut self, sort: bool) -> Self {
        self.sort_by_pid = sort;
        self
    }

    /// Horizontal scale in pixels per time unit.
    pub fn scale(mut self, px_per_tick: f64) -> Self {
        if px_per_tick > 0.0 {
            self.px_per_tick = px_per_tick;
        }
        self
    }

    fn ordered_blocks(&self) -> Vec<&'a ExecutionBlock> {
        let mut blocks: Vec<&ExecutionBlock> = self.blocks.iter().collect();
        if self.sort_by_pid {
            blocks.sort_by_key(|b| b.process);
        }
        blocks
    }

    /// Process rows, top to bottom.
    pub fn rows(&self) -> Vec<ProcessId> {
        let mut rows = Vec::new();
        for b in self.ordered_blocks() {
            if !rows.contains(&b.process) {
                rows.push(b.process);
            }
        }
        rows
    }

    /// Color of every charted group, in order of first appearance.
    pub fn group_colors(&self) -> Vec<(GroupId, &'static str)> {
        let mut colors: Vec<(GroupId, &'static str)> = Vec::new();
        for b in self.ordered_blocks() {
            if !colors.iter().any(|(g, _)| *g == b.group) {
                colors.push((b.group, PALETTE[colors.len() % PALETTE.len()]));
            }
        }
        colors
    }

    /// Render to SVG text. `None` when there is nothing to draw.
    pub fn render_svg(&self) -> Option<String> {
        if self.blocks.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }

    fn x(&self, t: u64) -> f64 {
        MARGIN_LEFT + t as f64 * self.px_per_tick
    }
}

impl fmt::Display for GanttChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let colors = self.group_colors();
        let color_of = |g: GroupId| {
            colors
                .iter()
                .find(|(cg, _)| *cg == g)
                .map_or(PALETTE[0], |(_, c)| *c)
        };
        let row_y: BTreeMap<ProcessId, f64> = rows
            .iter()
            .enumerate()
            .map(|(i, pid)| (*pid, MARGIN_TOP + i as f64 * ROW_HEIGHT))
            .collect();

        let makespan = self.blocks.iter().map(|b| b.end.ticks()).max().unwrap_or(0);
        let plot_width = makespan as f64 * self.px_per_tick;
        let width = MARGIN_LEFT + plot_width + LEGEND_WIDTH;
        let height = MARGIN_TOP + rows.len() as f64 * ROW_HEIGHT + MARGIN_BOTTOM;
        let axis_y = MARGIN_TOP + rows.len() as f64 * ROW_HEIGHT;

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" font-family="sans-serif" font-size="11">"#
        )?;
        writeln!(f, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            f,
            r#"<text x="{:.1}" y="20" font-size="14" font-weight="bold">Fair Share Scheduling</text>"#,
            MARGIN_LEFT
        )?;
        writeln!(
            f,
            r##"<text x="{:.1}" y="36" fill="#555">Shadows span each process's turnaround</text>"##,
            MARGIN_LEFT
        )?;

        // Axis, ticks and grid.
        let step = makespan.div_ceil(10).max(1);
        writeln!(
            f,
            r#"<line x1="{:.1}" y1="{axis_y:.1}" x2="{:.1}" y2="{axis_y:.1}" stroke="black"/>"#,
            self.x(0),
            self.x(makespan)
        )?;
        let mut t = 0;
        while t <= makespan {
            let x = self.x(t);
            writeln!(
                f,
                r##"<line x1="{x:.1}" y1="{MARGIN_TOP:.1}" x2="{x:.1}" y2="{axis_y:.1}" stroke="#bbb" stroke-dasharray="4 3"/>"##
            )?;
            writeln!(
                f,
                r#"<text x="{x:.1}" y="{:.1}" text-anchor="middle">{t}</text>"#,
                axis_y + 14.0
            )?;
            t += step;
        }
        writeln!(
            f,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">CPU time</text>"#,
            self.x(makespan / 2),
            axis_y + 32.0
        )?;

        // Row labels.
        for (pid, y) in &row_y {
            writeln!(
                f,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
                MARGIN_LEFT - 8.0,
                y + ROW_HEIGHT / 2.0 + 4.0,
                pid.raw()
            )?;
        }

        // Turnaround shadows under the bars, colored by the row's group.
        let bar_offset = (ROW_HEIGHT - BAR_HEIGHT) / 2.0;
        let mut row_group: BTreeMap<ProcessId, GroupId> = BTreeMap::new();
        for b in self.blocks {
            row_group.entry(b.process).or_insert(b.group);
        }
        for (pid, y) in &row_y {
            let (Some(&(arrival, turnaround)), Some(&group)) =
                (self.shadows.get(pid), row_group.get(pid))
            else {
                continue;
            };
            writeln!(
                f,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{BAR_HEIGHT:.1}" fill="{}" fill-opacity="0.3"/>"#,
                self.x(arrival),
                y + bar_offset,
                turnaround as f64 * self.px_per_tick,
                color_of(group)
            )?;
        }

        // Execution blocks.
        for b in self.blocks {
            let Some(&y) = row_y.get(&b.process) else {
                continue;
            };
            let x = self.x(b.start.ticks());
            let w = b.duration() as f64 * self.px_per_tick;
            writeln!(
                f,
                r#"<rect x="{x:.1}" y="{:.1}" width="{w:.1}" height="{BAR_HEIGHT:.1}" fill="{}" stroke="black"/>"#,
                y + bar_offset,
                color_of(b.group)
            )?;
            writeln!(
                f,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" fill="white" font-weight="bold">{}</text>"#,
                x + w / 2.0,
                y + ROW_HEIGHT / 2.0 + 4.0,
                b.process.raw()
            )?;
        }

        // Legend, groups ascending.
        let legend_x = MARGIN_LEFT + plot_width + 20.0;
        writeln!(
            f,
            r#"<text x="{legend_x:.1}" y="{MARGIN_TOP:.1}" font-weight="bold">Groups</text>"#
        )?;
        let mut legend = colors.clone();
        legend.sort_by_key(|(g, _)| *g);
        for (i, (group, color)) in legend.iter().enumerate() {
            let y = MARGIN_TOP + 8.0 + i as f64 * 18.0;
            writeln!(
                f,
                r#"<rect x="{legend_x:.1}" y="{y:.1}" width="12" height="12" fill="{color}"/>"#
            )?;
            writeln!(
                f,
                r#"<text x="{:.1}" y="{:.1}">{}</text>"#,
                legend_x + 18.0,
                y + 10.0,
                group.raw()
            )?;
        }

        writeln!(f, "</svg>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Process;
    use crate::time::VirtualTime;

    fn engine(processes: Vec<(u64, u64, u64, u64)>) -> FairShareEngine {
        let mut engine = FairShareEngine::new(4).unwrap();
        engine.simulate(processes.into_iter().map(|(id, g, a, b)| {
            Process::new(ProcessId::new(id), GroupId::new(g), VirtualTime::new(a), b)
        }));
        engine
    }

    #[test]
    fn test_empty_timeline_renders_nothing() {
        let engine = engine(vec![]);
        assert!(GanttChart::from_engine(&engine).render_svg().is_none());
    }

    #[test]
    fn test_rows_follow_first_execution_or_pid() {
        let engine = engine(vec![(7, 1, 0, 3), (2, 2, 0, 3), (4, 1, 1, 2)]);
        let chart = GanttChart::from_engine(&engine);
        let rows: Vec<u64> = chart.rows().iter().map(|p| p.raw()).collect();
        assert_eq!(rows, vec![7, 2, 4]);

        let sorted = GanttChart::from_engine(&engine).sort_by_pid(true);
        let rows: Vec<u64> = sorted.rows().iter().map(|p| p.raw()).collect();
        assert_eq!(rows, vec![2, 4, 7]);
    }

    #[test]
    fn test_group_colors_by_first_appearance() {
        let engine = engine(vec![(1, 5, 0, 2), (2, 3, 0, 2)]);
        let colors = GanttChart::from_engine(&engine).group_colors();
        assert_eq!(
            colors,
            vec![(GroupId::new(5), PALETTE[0]), (GroupId::new(3), PALETTE[1])]
        );
    }

    #[test]
    fn test_svg_contains_blocks_and_shadows() {
        let engine = engine(vec![(1, 1, 0, 5), (2, 2, 0, 3)]);
        let svg = GanttChart::from_engine(&engine).render_svg().unwrap();

        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"stroke="black"/>"#).count(), 1 + engine.timeline().len());
        assert_eq!(svg.matches(r#"fill-opacity="0.3""#).count(), 2);
    }
}
