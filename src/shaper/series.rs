use crate::models::{Axis, Chart, OthersField, Parameter, Phase, Reading, Selection, Series};

use super::AbsentPolicy;

// ---

/// Turn regularized readings and a filter selection into chart series.
///
/// Cases are checked in order, first match wins:
/// 1. nothing selected: average current and average voltage
/// 2. parameters only: every selected parameter on all three phases
/// 3. no parameters, `others` selected: the `others` fields
/// 4. otherwise: each selected phase in order, `others` contributing its own
///    fields and metered phases crossed with the selected parameters
///
/// A series is emitted only when at least one row defines its field.
pub fn build_chart(readings: &[Reading], selection: &Selection, policy: AbsentPolicy) -> Chart {
    // ---
    let params = selection.parameters();
    let phases = selection.phases();
    let mut builder = SeriesBuilder {
        readings,
        policy,
        series: Vec::new(),
    };

    if params.is_empty() && phases.is_empty() {
        builder.push_always("Average Current (A)".to_string(), Axis::Current, |r| {
            r.avg_current
        });
        builder.push_always("Average Voltage (V)".to_string(), Axis::Voltage, |r| {
            r.avg_voltage
        });
    } else if phases.is_empty() {
        for &param in params {
            for phase in Phase::METERED {
                let label = format!("{} {}", phase.id().to_uppercase(), param.label());
                builder.push_metered(label, phase, param);
            }
        }
    } else if params.is_empty() && phases.contains(&Phase::Others) {
        builder.push_others();
    } else {
        for &phase in phases {
            if phase == Phase::Others {
                builder.push_others();
                continue;
            }
            for &param in params {
                let label = format!("{} {}", phase.label(), param.label());
                builder.push_metered(label, phase, param);
            }
        }
    }

    tracing::debug!(
        "Built {} series over {} readings for {:?}",
        builder.series.len(),
        readings.len(),
        selection
    );

    Chart {
        labels: readings.iter().map(|r| r.timestamp).collect(),
        series: builder.series,
    }
}

struct SeriesBuilder<'a> {
    readings: &'a [Reading],
    policy: AbsentPolicy,
    series: Vec<Series>,
}

impl SeriesBuilder<'_> {
    fn push_metered(&mut self, label: String, phase: Phase, param: Parameter) {
        self.push_if_present(label, param.axis(), |r| {
            r.phase(phase).and_then(|values| values.get(param))
        });
    }

    fn push_others(&mut self) {
        for field in OthersField::ALL {
            let label = format!("Others {}", field.suffix());
            self.push_if_present(label, field.axis(), |r| r.others.get(field));
        }
    }

    fn push_if_present<F>(&mut self, label: String, axis: Axis, field: F)
    where
        F: Fn(&Reading) -> Option<f64>,
    {
        if self.readings.iter().any(|r| field(r).is_some()) {
            self.push_always(label, axis, field);
        }
    }

    fn push_always<F>(&mut self, label: String, axis: Axis, field: F)
    where
        F: Fn(&Reading) -> Option<f64>,
    {
        let values = self
            .readings
            .iter()
            .map(|r| self.policy.apply(field(r)))
            .collect();
        self.series.push(Series {
            label,
            axis,
            values,
        });
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{json, Value};

    fn readings(rows: Vec<Value>) -> Vec<Reading> {
        // ---
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, mut row)| {
                row["timestamp"] = json!(base + Duration::minutes(i as i64));
                serde_json::from_value(row).unwrap()
            })
            .collect()
    }

    fn labels(chart: &Chart) -> Vec<&str> {
        chart.series.iter().map(|s| s.label.as_str()).collect()
    }

    fn assert_aligned(chart: &Chart) {
        for s in &chart.series {
            assert_eq!(s.values.len(), chart.labels.len(), "{} misaligned", s.label);
        }
    }

    #[test]
    fn test_no_selection_plots_averages() {
        // ---
        let data = readings(vec![
            json!({"avg_current": 1.0, "avg_voltage": 3.0}),
            json!({"avg_current": 2.0, "avg_voltage": 4.0}),
        ]);
        let chart = build_chart(&data, &Selection::default(), AbsentPolicy::Zero);

        assert_eq!(chart.labels.len(), 2);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].label, "Average Current (A)");
        assert_eq!(chart.series[0].axis, Axis::Current);
        assert_eq!(chart.series[0].values, vec![Some(1.0), Some(2.0)]);
        assert_eq!(chart.series[1].label, "Average Voltage (V)");
        assert_eq!(chart.series[1].axis, Axis::Voltage);
        assert_eq!(chart.series[1].values, vec![Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_no_selection_emits_averages_even_when_absent() {
        // ---
        let data = readings(vec![json!({}), json!({"avg_voltage": 230.0})]);
        let chart = build_chart(&data, &Selection::default(), AbsentPolicy::Zero);

        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].values, vec![Some(0.0), Some(0.0)]);
        assert_eq!(chart.series[1].values, vec![Some(0.0), Some(230.0)]);
    }

    #[test]
    fn test_parameters_only_skips_unmeasured_phases() {
        // ---
        let data = readings(vec![
            json!({"phase1_kw": 1.5, "phase3_kw": 0.5}),
            json!({"phase1_kw": 1.7}),
        ]);
        let selection = Selection::new(vec![Parameter::Kw], vec![]);
        let chart = build_chart(&data, &selection, AbsentPolicy::Zero);

        assert_eq!(labels(&chart), vec!["PHASE1 Power (kW)", "PHASE3 Power (kW)"]);
        assert!(chart.series.iter().all(|s| s.axis == Axis::Power));
        assert_eq!(chart.series[0].values, vec![Some(1.5), Some(1.7)]);
        assert_eq!(chart.series[1].values, vec![Some(0.5), Some(0.0)]);
        assert_aligned(&chart);
    }

    #[test]
    fn test_parameters_only_follows_selection_order() {
        // ---
        let data = readings(vec![json!({
            "phase1_voltage": 230.0, "phase2_voltage": 231.0,
            "phase1_pf": 0.9, "phase2_current": 4.0
        })]);
        let selection = Selection::new(
            vec![Parameter::Pf, Parameter::Voltage, Parameter::Current],
            vec![],
        );
        let chart = build_chart(&data, &selection, AbsentPolicy::Zero);

        assert_eq!(
            labels(&chart),
            vec![
                "PHASE1 Power Factor (PF)",
                "PHASE1 Voltage (V)",
                "PHASE2 Voltage (V)",
                "PHASE2 Current (A)",
            ]
        );
        let axes: Vec<Axis> = chart.series.iter().map(|s| s.axis).collect();
        assert_eq!(
            axes,
            vec![Axis::Current, Axis::Voltage, Axis::Voltage, Axis::Current]
        );
    }

    #[test]
    fn test_others_only_emits_present_fields() {
        // ---
        let data = readings(vec![json!({"others_tkw": 12.0}), json!({})]);
        let selection = Selection::new(vec![], vec![Phase::Others]);
        let chart = build_chart(&data, &selection, AbsentPolicy::Zero);

        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].label, "Others TKW");
        assert_eq!(chart.series[0].axis, Axis::Power);
        assert_eq!(chart.series[0].values, vec![Some(12.0), Some(0.0)]);
    }

    #[test]
    fn test_others_with_metered_phase_and_no_parameters() {
        // ---
        // phase1 contributes nothing without parameters; others still shows.
        let data = readings(vec![json!({
            "others_f": 50.0, "others_apf": 0.95, "phase1_voltage": 230.0
        })]);
        let selection = Selection::new(vec![], vec![Phase::Phase1, Phase::Others]);
        let chart = build_chart(&data, &selection, AbsentPolicy::Zero);

        assert_eq!(labels(&chart), vec!["Others F", "Others APF"]);
        assert!(chart.series.iter().all(|s| s.axis == Axis::Current));
    }

    #[test]
    fn test_general_case_interleaves_in_phase_order() {
        // ---
        let data = readings(vec![json!({
            "phase2_voltage": 229.0, "phase2_kw": 1.1,
            "phase1_voltage": 231.0,
            "others_tkw": 3.3
        })]);
        let selection = Selection::new(
            vec![Parameter::Voltage, Parameter::Kw],
            vec![Phase::Phase2, Phase::Others, Phase::Phase1],
        );
        let chart = build_chart(&data, &selection, AbsentPolicy::Zero);

        assert_eq!(
            labels(&chart),
            vec![
                "Phase 2 Voltage (V)",
                "Phase 2 Power (kW)",
                "Others TKW",
                "Phase 1 Voltage (V)",
            ]
        );
        assert_eq!(chart.series[1].axis, Axis::Power);
        assert_eq!(chart.series[2].axis, Axis::Power);
        assert_aligned(&chart);
    }

    #[test]
    fn test_metered_phases_without_parameters_is_empty() {
        // ---
        let data = readings(vec![json!({"phase1_voltage": 230.0})]);
        let selection = Selection::new(vec![], vec![Phase::Phase1, Phase::Phase3]);
        let chart = build_chart(&data, &selection, AbsentPolicy::Zero);

        assert!(chart.series.is_empty());
        assert_eq!(chart.labels.len(), 1);
    }

    #[test]
    fn test_null_policy_leaves_gaps() {
        // ---
        let data = readings(vec![json!({"phase1_current": 2.0}), json!({})]);
        let selection = Selection::new(vec![Parameter::Current], vec![Phase::Phase1]);
        let chart = build_chart(&data, &selection, AbsentPolicy::Null);

        assert_eq!(chart.series[0].label, "Phase 1 Current (A)");
        assert_eq!(chart.series[0].values, vec![Some(2.0), None]);
    }

    #[test]
    fn test_gap_rows_flow_into_series() {
        // ---
        use crate::shaper::{fill_gaps, GapFillConfig};

        let mut data = readings(vec![json!({"phase3_kw": 1.0}), json!({"phase3_kw": 2.0})]);
        data[1].timestamp = data[0].timestamp + Duration::seconds(180);
        let filled = fill_gaps(&data, GapFillConfig::default());
        let selection = Selection::new(vec![Parameter::Kw], vec![]);
        let chart = build_chart(&filled, &selection, AbsentPolicy::Null);

        // Synthetic rows define every field, so all three phases now plot.
        assert_eq!(
            labels(&chart),
            vec!["PHASE1 Power (kW)", "PHASE2 Power (kW)", "PHASE3 Power (kW)"]
        );
        // 180s gap: zero rows at +60s, +120s and +180s, then the real reading.
        assert_eq!(
            chart.series[2].values,
            vec![Some(1.0), Some(0.0), Some(0.0), Some(0.0), Some(2.0)]
        );
        assert_eq!(
            chart.series[0].values,
            vec![None, Some(0.0), Some(0.0), Some(0.0), None]
        );
        assert_aligned(&chart);
    }
}
