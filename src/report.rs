use crate::{OverlapClass, PolygonId};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PairOverlap {
    pub first: PolygonId,
    pub second: PolygonId,
    pub class: OverlapClass,
}

/// Result of a pairwise overlap run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OverlapReport(pub Vec<PairOverlap>);

impl FromIterator<(PolygonId, PolygonId, OverlapClass)> for OverlapReport {
    fn from_iter<I: IntoIterator<Item = (PolygonId, PolygonId, OverlapClass)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(first, second, class)| PairOverlap {
                    first,
                    second,
                    class,
                })
                .collect(),
        )
    }
}

fn paint(class: OverlapClass) -> ColoredString {
    let label = class.to_string();
    match class {
        OverlapClass::Disjoint => label.green(),
        OverlapClass::Touching => label.yellow(),
        OverlapClass::Overlapping => label.red(),
    }
}

impl OverlapReport {
    pub fn count(&self, class: OverlapClass) -> usize {
        self.0.iter().filter(|pair| pair.class == class).count()
    }

    /// Touching and overlapping pairs only.
    pub fn contacts(&self) -> impl Iterator<Item = &PairOverlap> {
        self.0.iter().filter(|pair| pair.class.is_contact())
    }

    pub fn summary(&self, all: bool) -> String {
        let mut summary = String::new();
        for pair in self.0.iter().filter(|pair| all || pair.class.is_contact()) {
            let ids = format!("{} / {}", pair.first, pair.second);
            summary.push_str(format!("{0: <25}{1: >25}\n", ids, paint(pair.class)).as_str());
        }
        for class in [
            OverlapClass::Overlapping,
            OverlapClass::Touching,
            OverlapClass::Disjoint,
        ] {
            summary.push_str(
                format!("{0: <25}{1: >25}\n", paint(class), self.count(class)).as_str(),
            );
        }
        summary
    }
}

/// Result of a region query, optionally checked against brute force.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryReport {
    pub ids: BTreeSet<PolygonId>,
    pub candidates: usize,
    pub elapsed_micros: u128,
    pub verified: Option<bool>,
}

impl QueryReport {
    pub fn summary(&self) -> String {
        let ids = self
            .ids
            .iter()
            .map(PolygonId::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let mut summary = format!(
            "{0: <25}{1: >25}\n{2: <25}{3: >25}\n",
            "Polygons found:",
            self.ids.len(),
            "Candidates sampled:",
            self.candidates
        );
        summary.push_str(format!("{0: <25}{1: >23}us\n", "Query time:", self.elapsed_micros).as_str());
        match self.verified {
            Some(true) => summary.push_str(&format!("{0: <25}{1: >25}\n", "Brute force:", "matches".green())),
            Some(false) => summary.push_str(&format!("{0: <25}{1: >25}\n", "Brute force:", "differs".red())),
            None => (),
        }
        if !ids.is_empty() {
            summary.push_str(&ids);
            summary.push('\n');
        }
        summary
    }
}
