//! JSON report written by the validation gate.

use std::{fmt, path::Path};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{mapping::MappingMode, validation::LawCheck};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub bars: usize,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<LawCheck>,
}

impl ValidationReport {
    pub fn new(source: impl Into<String>, bars: usize, results: Vec<LawCheck>) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            generated_at: Utc::now(),
            source: source.into(),
            bars,
            total: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn count_by_mode(&self, mode: MappingMode) -> usize {
        self.results.iter().filter(|r| r.mode == mode).count()
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("serialize validation report")?;
        std::fs::write(path, json).with_context(|| format!("write validation report {}", path.display()))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("Law validation ({} bars from {})", self.bars, self.source);
        writeln!(f, "{title}")?;
        writeln!(f, "{}", "-".repeat(title.chars().count()))?;
        for r in &self.results {
            let c = &r.counts;
            write!(
                f,
                "{} {:<8} {:<18} lines={} boxes={} labels={} markers={} specific={}",
                if r.passed { "ok  " } else { "FAIL" },
                r.law_id,
                r.mode.as_str(),
                c.lines_count,
                c.boxes_count,
                c.labels_count,
                c.markers_count,
                c.law_specific_count,
            )?;
            if !r.failures.is_empty() {
                let reasons: Vec<String> = r.failures.iter().map(ToString::to_string).collect();
                write!(f, "  [{}]", reasons.join("; "))?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        write!(f, "{}/{} passed", self.passed, self.total)?;
        let unknown = self.count_by_mode(MappingMode::Unknown) + self.count_by_mode(MappingMode::CategoryHeuristic);
        if unknown > 0 {
            write!(f, ", {unknown} heuristic")?;
        }
        Ok(())
    }
}
