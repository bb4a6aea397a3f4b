//! Plain-text rendering for the CLI.

use letloose_core::{ControllerDocument, DerivedParam, SimulationRecord};
use std::fmt::Write;

use crate::demo::RunSummary;

pub fn describe_record(record: &SimulationRecord) -> String {
    let mut out = String::new();
    let state = if record.enabled { "enabled" } else { "disabled" };
    let _ = writeln!(out, "{} ({state})", record.id);
    let (lower, upper) = record.range_config.angle_window();
    let _ = writeln!(out, "  angle window: {lower:.0}° .. {upper:.0}°");
    for param in DerivedParam::ALL {
        let (min, max) = record.range_config.bounds(param);
        let decimals = param.decimals() as usize;
        let _ = writeln!(
            out,
            "  {}: {min:.decimals$} .. {max:.decimals$} (baseline {})",
            param.label(),
            record.baseline.get(param.host_param())
        );
    }
    let baseline = &record.baseline;
    let _ = writeln!(
        out,
        "  baseline: weight {} drag {} gravity {} painted rigidity {}",
        baseline.weight, baseline.drag, baseline.gravity_multiplier, baseline.use_painted_rigidity
    );
    out
}

pub fn describe_document(document: &ControllerDocument) -> String {
    if document.is_empty() {
        return "no stored simulations\n".to_owned();
    }
    let mut out = format!(
        "document v{} with {} simulation(s)\n",
        document.version,
        document.records.len()
    );
    for record in &document.records {
        out.push_str(&describe_record(record));
    }
    out
}

pub fn describe_run(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} frames, {} ticks: {}",
        summary.frames, summary.ticks, summary.status
    );
    if summary.restored_records > 0 {
        let _ = writeln!(out, "restored {} stored record(s)", summary.restored_records);
    }
    for id in &summary.removed {
        let _ = writeln!(out, "untracked {id}");
    }
    if let Some(panel) = &summary.panel {
        let _ = writeln!(out, "[{}] {}", panel.label, panel.toggle_label);
        for field in &panel.fields {
            let _ = writeln!(out, "  {}: {}", field.label, field.formatted());
        }
        if !panel.status.is_empty() {
            let _ = writeln!(out, "{}", panel.status);
        }
        if !panel.advisory.is_empty() {
            let _ = writeln!(out, "{}", panel.advisory);
        }
    }
    if let Some(saved) = summary.saved_records {
        let _ = writeln!(out, "saved {saved} record(s)");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use letloose_core::{Baseline, OverrideLimits, RangeConfig, SimId};

    #[test]
    fn record_lists_bounds_with_parameter_precision() {
        let record = SimulationRecord {
            id: SimId::new("hair"),
            baseline: Baseline {
                use_painted_rigidity: false,
                weight: 1.0,
                drag: 0.1,
                gravity_multiplier: 1.0,
                main_rigidity: 0.02,
                tip_rigidity: 0.002,
                style_cling: 0.5,
            },
            enabled: false,
            range_config: RangeConfig::defaults(&OverrideLimits::default()),
        };
        let text = describe_record(&record);
        assert!(text.starts_with("hair (disabled)\n"));
        assert!(text.contains("angle window: 45° .. 90°"));
        assert!(text.contains("Main rigidity: 0.005 .. 0.025 (baseline 0.02)"));
        assert!(text.contains("Tip rigidity: 0.0000 .. 0.0020"));
    }

    #[test]
    fn empty_document_says_so() {
        assert_eq!(
            describe_document(&ControllerDocument::default()),
            "no stored simulations\n"
        );
    }
}
