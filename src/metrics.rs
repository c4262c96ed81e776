//! Aggregate metrics over completed processes.

use std::collections::BTreeMap;

use crate::process::{GroupId, Process};

/// Arithmetic means over a set of completed processes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Averages {
    pub count: usize,
    pub response: f64,
    pub waiting: f64,
    pub turnaround: f64,
}

/// Global averages plus one entry per group, groups in ascending order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSummary {
    pub overall: Averages,
    pub per_group: BTreeMap<GroupId, Averages>,
}

#[derive(Default)]
struct Totals {
    count: usize,
    response: u64,
    waiting: u64,
    turnaround: u64,
}

impl Totals {
    fn add(&mut self, response: u64, waiting: u64, turnaround: u64) {
        self.count += 1;
        self.response += response;
        self.waiting += waiting;
        self.turnaround += turnaround;
    }

    fn averages(&self) -> Averages {
        let n = self.count as f64;
        Averages {
            count: self.count,
            response: self.response as f64 / n,
            waiting: self.waiting as f64 / n,
            turnaround: self.turnaround as f64 / n,
        }
    }
}

/// Summarize the completed list.
///
/// Returns `None` when no process has completed. Processes that are not
/// completed are ignored.
pub fn summarize(completed: &[Process]) -> Option<MetricsSummary> {
    let mut overall = Totals::default();
    let mut groups: BTreeMap<GroupId, Totals> = BTreeMap::new();

    for m in completed.iter().filter_map(Process::metrics) {
        overall.add(m.response, m.waiting, m.turnaround);
        groups
            .entry(m.group)
            .or_default()
            .add(m.response, m.waiting, m.turnaround);
    }

    if overall.count == 0 {
        return None;
    }

    Some(MetricsSummary {
        overall: overall.averages(),
        per_group: groups
            .into_iter()
            .map(|(group, totals)| (group, totals.averages()))
            .collect(),
    })
}
