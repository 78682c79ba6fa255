//! Checks the codec against a recorded oracle fixture.
//!
//! The fixture is a JSON object keyed by function name. Each entry is a list
//! of cases shaped as `{ "args": [...], "expected": ... }`, produced by running
//! a reference HEALPix library. Only the sections this crate implements are
//! checked; projection sections are skipped.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::healpix::{nside_to_depth, pixel_area, resolution};
use crate::uniq::{Cell, decode, encode};

/// Relative tolerance for floating-point expectations.
const FLOAT_REL_TOL: f64 = 1e-12;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse fixture JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed case {index} in section {section}: {reason}")]
    MalformedCase {
        section: &'static str,
        index: usize,
        reason: String,
    },
}

/// Depth and pixel index as the fixture spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPix {
    pub order: u8,
    pub ipix: u64,
}

impl fmt::Display for OrderPix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.order, self.ipix)
    }
}

impl From<Cell> for OrderPix {
    fn from(cell: Cell) -> Self {
        OrderPix {
            order: cell.depth(),
            ipix: cell.hash(),
        }
    }
}

/// One recorded call: positional arguments and the oracle's answer.
#[derive(Debug, Clone, Deserialize)]
pub struct Case {
    pub args: Vec<Value>,
    pub expected: Value,
}

/// A parsed fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Fixture {
    sections: BTreeMap<String, Vec<Case>>,
}

impl Fixture {
    pub fn from_reader(reader: impl Read) -> Result<Self, FixtureError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn parse(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

/// Fixture sections this crate can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    OrderPixToUniq,
    UniqToOrderPix,
    NsideToOrder,
    NsideToPixArea,
    NsideToResol,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::OrderPixToUniq,
        Section::UniqToOrderPix,
        Section::NsideToOrder,
        Section::NsideToPixArea,
        Section::NsideToResol,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::OrderPixToUniq => "orderpix2uniq",
            Section::UniqToOrderPix => "uniq2orderpix",
            Section::NsideToOrder => "nside2order",
            Section::NsideToPixArea => "nside2pixarea",
            Section::NsideToResol => "nside2resol",
        }
    }

    pub fn from_name(name: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Configuration for [`check`].
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Maximum number of mismatches kept in the report.
    pub max_reported: usize,
    /// Stop at the first mismatch.
    pub fail_fast: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_reported: 20,
            fail_fast: false,
        }
    }
}

/// A case whose computed value disagrees with the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub section: &'static str,
    pub index: usize,
    pub args: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] args={} expected={} actual={}",
            self.section, self.index, self.args, self.expected, self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    pub section: &'static str,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub sections: Vec<SectionReport>,
    /// Sections present in the fixture that this crate does not implement.
    pub skipped: Vec<String>,
    /// The first `max_reported` mismatches.
    pub mismatches: Vec<Mismatch>,
    pub stopped_early: bool,
}

impl CheckReport {
    pub fn total_passed(&self) -> usize {
        self.sections.iter().map(|s| s.passed).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.sections.iter().map(|s| s.failed).sum()
    }

    pub fn is_success(&self) -> bool {
        self.total_failed() == 0
    }

    pub fn section(&self, name: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.section == name)
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.sections {
            writeln!(f, "{:<14} passed={:<6} failed={}", s.section, s.passed, s.failed)?;
        }
        if !self.skipped.is_empty() {
            writeln!(f, "skipped: {}", self.skipped.join(", "))?;
        }
        for m in &self.mismatches {
            writeln!(f, "  {m}")?;
        }
        if self.stopped_early {
            writeln!(f, "stopped at first mismatch")?;
        }
        write!(
            f,
            "total: passed={}, failed={}",
            self.total_passed(),
            self.total_failed()
        )
    }
}

/// Run every implemented section of `fixture` and collect the results.
pub fn check(fixture: &Fixture, config: &CheckConfig) -> Result<CheckReport, FixtureError> {
    let mut report = CheckReport::default();

    for (name, cases) in &fixture.sections {
        let Some(section) = Section::from_name(name) else {
            debug!(section = %name, cases = cases.len(), "skipping section");
            report.skipped.push(name.clone());
            continue;
        };

        debug!(section = section.name(), cases = cases.len(), "checking section");
        let mut summary = SectionReport {
            section: section.name(),
            passed: 0,
            failed: 0,
        };

        for (index, case) in cases.iter().enumerate() {
            match evaluate(section, index, case)? {
                None => summary.passed += 1,
                Some(mismatch) => {
                    summary.failed += 1;
                    warn!("{mismatch}");
                    if report.mismatches.len() < config.max_reported {
                        report.mismatches.push(mismatch);
                    }
                    if config.fail_fast {
                        report.stopped_early = true;
                        break;
                    }
                }
            }
        }

        report.sections.push(summary);
        if report.stopped_early {
            break;
        }
    }

    info!(
        passed = report.total_passed(),
        failed = report.total_failed(),
        skipped = report.skipped.len(),
        "fixture check finished"
    );
    Ok(report)
}

/// Returns the mismatch, if any, for a single case.
fn evaluate(section: Section, index: usize, case: &Case) -> Result<Option<Mismatch>, FixtureError> {
    let malformed = |reason: String| FixtureError::MalformedCase {
        section: section.name(),
        index,
        reason,
    };

    let arity = match section {
        Section::OrderPixToUniq => 2,
        _ => 1,
    };
    if case.args.len() != arity {
        return Err(malformed(format!(
            "expected {arity} argument(s), got {}",
            case.args.len()
        )));
    }
    let a = &case.args;

    let (expected, actual) = match section {
        Section::OrderPixToUniq => {
            let depth: u64 = typed(&a[0]).map_err(&malformed)?;
            let hash: u64 = typed(&a[1]).map_err(&malformed)?;
            let expected: u64 = typed(&case.expected).map_err(&malformed)?;
            let actual = u8::try_from(depth)
                .map_err(|_| format!("depth {depth} out of range"))
                .and_then(|d| encode(d, hash).map_err(|e| e.to_string()));
            (expected.to_string(), render(actual, |u| *u == expected))
        }
        Section::UniqToOrderPix => {
            let uniq: u64 = typed(&a[0]).map_err(&malformed)?;
            let expected: OrderPix = typed(&case.expected).map_err(&malformed)?;
            let actual = decode(uniq).map(OrderPix::from).map_err(|e| e.to_string());
            (expected.to_string(), render(actual, |op| *op == expected))
        }
        Section::NsideToOrder => {
            let nside: u64 = typed(&a[0]).map_err(&malformed)?;
            let expected: u8 = typed(&case.expected).map_err(&malformed)?;
            let actual = nside_to_depth(nside).map_err(|e| e.to_string());
            (expected.to_string(), render(actual, |d| *d == expected))
        }
        Section::NsideToPixArea | Section::NsideToResol => {
            let nside: u64 = typed(&a[0]).map_err(&malformed)?;
            let expected: f64 = typed(&case.expected).map_err(&malformed)?;
            let actual = nside_to_depth(nside)
                .map(|d| match section {
                    Section::NsideToPixArea => pixel_area(d),
                    _ => resolution(d),
                })
                .map_err(|e| e.to_string());
            (expected.to_string(), render(actual, |v| close(*v, expected)))
        }
    };

    let Some(actual) = actual else {
        return Ok(None);
    };
    Ok(Some(Mismatch {
        section: section.name(),
        index,
        args: Value::Array(case.args.clone()).to_string(),
        expected,
        actual,
    }))
}

/// `None` when `matches` accepts the value, otherwise its rendering.
fn render<T: fmt::Display>(
    actual: Result<T, String>,
    matches: impl Fn(&T) -> bool,
) -> Option<String> {
    match actual {
        Ok(v) if matches(&v) => None,
        Ok(v) => Some(v.to_string()),
        Err(e) => Some(e),
    }
}

fn typed<T: DeserializeOwned>(value: &Value) -> Result<T, String> {
    T::deserialize(value).map_err(|e| format!("{value}: {e}"))
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= FLOAT_REL_TOL * expected.abs().max(f64::MIN_POSITIVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_names_roundtrip() {
        for s in Section::ALL {
            assert_eq!(Section::from_name(s.name()), Some(s));
        }
        assert_eq!(Section::from_name("vec2pix_nest"), None);
    }

    #[test]
    fn float_tolerance() {
        assert!(close(1.0, 1.0));
        assert!(close(1.0 + 1e-14, 1.0));
        assert!(!close(1.0 + 1e-9, 1.0));
        assert!(close(0.0, 0.0));
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let fixture = Fixture::parse(r#"{"orderpix2uniq": [{"args": [3], "expected": 352}]}"#)
            .unwrap();
        let err = check(&fixture, &CheckConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            FixtureError::MalformedCase {
                section: "orderpix2uniq",
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_argument_is_malformed() {
        let fixture =
            Fixture::parse(r#"{"uniq2orderpix": [{"args": ["x"], "expected": {"order": 0, "ipix": 0}}]}"#)
                .unwrap();
        assert!(check(&fixture, &CheckConfig::default()).is_err());
    }

    #[test]
    fn order_pix_from_cell() {
        let cell = Cell::new(3, 100).unwrap();
        assert_eq!(OrderPix::from(cell), OrderPix { order: 3, ipix: 100 });
        assert_eq!(
            serde_json::to_string(&OrderPix::from(cell)).unwrap(),
            r#"{"order":3,"ipix":100}"#
        );
    }
}
