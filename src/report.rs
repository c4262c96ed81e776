//! Plain-text reports over simulation results.
//!
//! Both reports are `Display` adapters, so callers can print them directly
//! or collect them with `to_string()`.

use std::fmt;

use crate::metrics::MetricsSummary;
use crate::process::ProcessMetrics;

const RULE_WIDTH: usize = 55;

/// Global and per-group averages.
pub struct SummaryReport<'a> {
    summary: Option<&'a MetricsSummary>,
}

impl<'a> SummaryReport<'a> {
    pub fn new(summary: Option<&'a MetricsSummary>) -> Self {
        SummaryReport { summary }
    }
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(summary) = self.summary else {
            return writeln!(f, "No completed processes; nothing to average.");
        };
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let o = &summary.overall;

        writeln!(f, "{heavy}")?;
        writeln!(f, "      AVERAGE SYSTEM METRICS ({} processes)", o.count)?;
        writeln!(f, "{heavy}")?;
        writeln!(f, "Average response time (global):   {:.2}", o.response)?;
        writeln!(f, "Average waiting time (global):    {:.2}", o.waiting)?;
        writeln!(f, "Average turnaround time (global): {:.2}", o.turnaround)?;
        writeln!(f, "{light}")?;
        writeln!(f, "      AVERAGES PER GROUP")?;
        writeln!(f, "{light}")?;
        writeln!(
            f,
            "{:>5} | {:>9} | {:>9} | {:>10}",
            "Group", "Response", "Waiting", "Turnaround"
        )?;
        writeln!(f, "{light}")?;
        for (group, avg) in &summary.per_group {
            writeln!(
                f,
                "{:>5} | {:>9.2} | {:>9.2} | {:>10.2}",
                group.raw(),
                avg.response,
                avg.waiting,
                avg.turnaround
            )?;
        }
        writeln!(f, "{heavy}")
    }
}

/// One row per completed process, in the order given.
pub struct ProcessTable<'a> {
    rows: &'a [ProcessMetrics],
}

impl<'a> ProcessTable<'a> {
    pub fn new(rows: &'a [ProcessMetrics]) -> Self {
        ProcessTable { rows }
    }
}

impl fmt::Display for ProcessTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>5} {:>5} {:>7} {:>5} {:>5} {:>6} {:>8} {:>7} {:>10}",
            "PID", "Group", "Arrival", "Burst", "First", "Done", "Response", "Waiting", "Turnaround"
        )?;
        for m in self.rows {
            writeln!(
                f,
                "{:>5} {:>5} {:>7} {:>5} {:>5} {:>6} {:>8} {:>7} {:>10}",
                m.id.raw(),
                m.group.raw(),
                m.arrival.ticks(),
                m.burst,
                m.first_dispatch.ticks(),
                m.completed_at.ticks(),
                m.response,
                m.waiting,
                m.turnaround
            )?;
        }
        Ok(())
    }
}

/// Render the averages report.
pub fn render_summary(summary: Option<&MetricsSummary>) -> String {
    SummaryReport::new(summary).to_string()
}

/// Render the per-process table.
pub fn render_process_table(rows: &[ProcessMetrics]) -> String {
    ProcessTable::new(rows).to_string()
}
