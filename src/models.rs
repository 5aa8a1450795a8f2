//! Data models for smart-meter readings, filter selections, chart series and
//! power-source usage intervals.
//!
//! Readings arrive from the upstream backend as flat JSON objects with
//! `{phase}_{param}` keys. They are decoded once through [`RawReading`] into a
//! typed phase × parameter table so the shaper never builds field names at
//! runtime.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ---

/// A phase selectable in the dashboard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Phase1,
    Phase2,
    Phase3,
    Others,
}

impl Phase {
    /// The three metered phases, in table order.
    pub const METERED: [Phase; 3] = [Phase::Phase1, Phase::Phase2, Phase::Phase3];

    /// Wire identifier, e.g. `phase1`.
    pub fn id(self) -> &'static str {
        match self {
            Phase::Phase1 => "phase1",
            Phase::Phase2 => "phase2",
            Phase::Phase3 => "phase3",
            Phase::Others => "others",
        }
    }

    /// Human label, e.g. `Phase 1`.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Phase1 => "Phase 1",
            Phase::Phase2 => "Phase 2",
            Phase::Phase3 => "Phase 3",
            Phase::Others => "Others",
        }
    }

    /// Row in the per-phase table, `None` for the `others` bucket.
    pub fn metered_index(self) -> Option<usize> {
        match self {
            Phase::Phase1 => Some(0),
            Phase::Phase2 => Some(1),
            Phase::Phase3 => Some(2),
            Phase::Others => None,
        }
    }
}

/// An electrical measurement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Voltage,
    Current,
    Kw,
    Pf,
}

impl Parameter {
    pub fn label(self) -> &'static str {
        match self {
            Parameter::Voltage => "Voltage (V)",
            Parameter::Current => "Current (A)",
            Parameter::Kw => "Power (kW)",
            Parameter::Pf => "Power Factor (PF)",
        }
    }

    /// Y-scale a series of this parameter binds to.
    pub fn axis(self) -> Axis {
        match self {
            Parameter::Kw => Axis::Power,
            Parameter::Voltage => Axis::Voltage,
            Parameter::Current | Parameter::Pf => Axis::Current,
        }
    }
}

/// Named Y-scale of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Voltage,
    Current,
    Power,
}

/// Fields of the `others` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OthersField {
    Frequency,
    AveragePowerFactor,
    TotalKw,
}

impl OthersField {
    pub const ALL: [OthersField; 3] = [
        OthersField::Frequency,
        OthersField::AveragePowerFactor,
        OthersField::TotalKw,
    ];

    /// Upper-cased key suffix used in series labels (`others_tkw` -> `TKW`).
    pub fn suffix(self) -> &'static str {
        match self {
            OthersField::Frequency => "F",
            OthersField::AveragePowerFactor => "APF",
            OthersField::TotalKw => "TKW",
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            OthersField::TotalKw => Axis::Power,
            OthersField::Frequency | OthersField::AveragePowerFactor => Axis::Current,
        }
    }
}

// ---

/// Measurements of one metered phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseValues {
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub kw: Option<f64>,
    pub pf: Option<f64>,
}

impl PhaseValues {
    pub fn get(&self, param: Parameter) -> Option<f64> {
        match param {
            Parameter::Voltage => self.voltage,
            Parameter::Current => self.current,
            Parameter::Kw => self.kw,
            Parameter::Pf => self.pf,
        }
    }

    fn zeroed() -> Self {
        Self {
            voltage: Some(0.0),
            current: Some(0.0),
            kw: Some(0.0),
            pf: Some(0.0),
        }
    }
}

/// Measurements of the `others` bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OthersValues {
    pub f: Option<f64>,
    pub apf: Option<f64>,
    pub tkw: Option<f64>,
}

impl OthersValues {
    pub fn get(&self, field: OthersField) -> Option<f64> {
        match field {
            OthersField::Frequency => self.f,
            OthersField::AveragePowerFactor => self.apf,
            OthersField::TotalKw => self.tkw,
        }
    }
}

/// One meter sample at a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawReading", into = "RawReading")]
pub struct Reading {
    // ---
    pub timestamp: DateTime<Utc>,
    pub phases: [PhaseValues; 3],
    pub others: OthersValues,
    pub avg_current: Option<f64>,
    pub avg_voltage: Option<f64>,
}

impl Reading {
    /// Synthetic gap row: every numeric field is `0`.
    pub fn zeroed(timestamp: DateTime<Utc>) -> Self {
        // ---
        Self {
            timestamp,
            phases: [PhaseValues::zeroed(); 3],
            others: OthersValues {
                f: Some(0.0),
                apf: Some(0.0),
                tkw: Some(0.0),
            },
            avg_current: Some(0.0),
            avg_voltage: Some(0.0),
        }
    }

    /// Per-phase values, `None` for the `others` bucket.
    pub fn phase(&self, phase: Phase) -> Option<&PhaseValues> {
        phase.metered_index().map(|i| &self.phases[i])
    }
}

/// Flat wire shape of a reading as served by the upstream backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReading {
    // ---
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase1_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase1_current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase1_kw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase1_pf: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase2_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase2_current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase2_kw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase2_pf: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase3_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase3_current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase3_kw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase3_pf: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others_f: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others_apf: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others_tkw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_voltage: Option<f64>,
}

impl From<RawReading> for Reading {
    fn from(raw: RawReading) -> Self {
        // ---
        Reading {
            timestamp: raw.timestamp,
            phases: [
                PhaseValues {
                    voltage: raw.phase1_voltage,
                    current: raw.phase1_current,
                    kw: raw.phase1_kw,
                    pf: raw.phase1_pf,
                },
                PhaseValues {
                    voltage: raw.phase2_voltage,
                    current: raw.phase2_current,
                    kw: raw.phase2_kw,
                    pf: raw.phase2_pf,
                },
                PhaseValues {
                    voltage: raw.phase3_voltage,
                    current: raw.phase3_current,
                    kw: raw.phase3_kw,
                    pf: raw.phase3_pf,
                },
            ],
            others: OthersValues {
                f: raw.others_f,
                apf: raw.others_apf,
                tkw: raw.others_tkw,
            },
            avg_current: raw.avg_current,
            avg_voltage: raw.avg_voltage,
        }
    }
}

impl From<Reading> for RawReading {
    fn from(r: Reading) -> Self {
        // ---
        let [p1, p2, p3] = r.phases;
        RawReading {
            timestamp: r.timestamp,
            phase1_voltage: p1.voltage,
            phase1_current: p1.current,
            phase1_kw: p1.kw,
            phase1_pf: p1.pf,
            phase2_voltage: p2.voltage,
            phase2_current: p2.current,
            phase2_kw: p2.kw,
            phase2_pf: p2.pf,
            phase3_voltage: p3.voltage,
            phase3_current: p3.current,
            phase3_kw: p3.kw,
            phase3_pf: p3.pf,
            others_f: r.others.f,
            others_apf: r.others.apf,
            others_tkw: r.others.tkw,
            avg_current: r.avg_current,
            avg_voltage: r.avg_voltage,
        }
    }
}

// ---

/// Filter dimensions chosen by the user, in selection order without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    parameters: Vec<Parameter>,
    phases: Vec<Phase>,
}

impl Selection {
    pub fn new(parameters: Vec<Parameter>, phases: Vec<Phase>) -> Self {
        Self {
            parameters: dedup_in_order(parameters),
            phases: dedup_in_order(phases),
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }
}

fn dedup_in_order<T: PartialEq + Copy>(items: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// One validated chart fetch: device, time range and selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub device_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub selection: Selection,
}

impl ChartRequest {
    /// Build a request, rejecting a missing device id or date bound.
    ///
    /// `start_date <= end_date` is not checked; the backend decides what an
    /// inverted range means.
    pub fn new(
        device_id: &str,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        selection: Selection,
    ) -> Result<Self, AppError> {
        // ---
        let device_id = device_id.trim();
        match (device_id.is_empty(), start_date, end_date) {
            (false, Some(start_date), Some(end_date)) => Ok(Self {
                device_id: device_id.to_string(),
                start_date,
                end_date,
                selection,
            }),
            _ => Err(AppError::Validation(
                "Device ID and date range are required.".to_string(),
            )),
        }
    }
}

// ---

/// One plot-ready line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub axis: Axis,
    /// Aligned 1:1 with [`Chart::labels`].
    pub values: Vec<Option<f64>>,
}

/// Shaper output: shared time axis plus the series plotted against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    pub labels: Vec<DateTime<Utc>>,
    pub series: Vec<Series>,
}

// ---

/// Identifier of a usage row; the backend serves either numbers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{id}"),
            RowId::Text(id) => f.write_str(id),
        }
    }
}

/// A period during which a device drew from one power source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UsageInterval {
    // ---
    pub id: RowId,
    pub device_id: String,
    pub power_source: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds; anything that is not a JSON number decodes as `None`.
    #[serde(default, deserialize_with = "numeric_or_none")]
    pub usage_time: Option<f64>,
}

fn numeric_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// A usage interval rendered for the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub id: String,
    pub device_id: String,
    pub power_source: String,
    pub start_time: String,
    pub end_time: String,
    pub usage_time: String,
    pub ongoing: bool,
}
