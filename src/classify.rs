//! Threshold classification of PageSpeed metrics.
//!
//! Flags are tri-state: a metric the API did not report leaves the flag
//! absent, never `false`.

use crate::clients::pagespeed::PageSpeedResult;

pub const LCP_POOR_MS: f64 = 2500.0;
pub const FCP_POOR_MS: f64 = 3000.0;
pub const CLS_POOR: f64 = 0.25;
pub const INP_POOR_MS: f64 = 500.0;
pub const PERF_POOR: i64 = 50;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProblemFlags {
    pub field_speed: Option<bool>,
    pub field_ux: Option<bool>,
    pub lab_speed: Option<bool>,
    pub lab_ux: Option<bool>,
}

/// Derive all four problem flags from one strategy's metrics.
pub fn classify(ps: &PageSpeedResult) -> ProblemFlags {
    ProblemFlags {
        field_speed: merge(&[
            exceeds(ps.field_lcp_ms, LCP_POOR_MS),
            exceeds(ps.field_fcp_ms, FCP_POOR_MS),
        ]),
        field_ux: merge(&[
            exceeds(ps.field_cls, CLS_POOR),
            exceeds(ps.field_inp_ms, INP_POOR_MS),
        ]),
        lab_speed: merge(&[
            exceeds(ps.lab_lcp_ms, LCP_POOR_MS),
            ps.perf_score.map(|s| s < PERF_POOR),
        ]),
        lab_ux: merge(&[
            exceeds(ps.lab_cls, CLS_POOR),
            exceeds(ps.lab_inp_ms, INP_POOR_MS),
        ]),
    }
}

/// Human-readable summary of every triggered condition, for the `issues`
/// column. Absent when no metric was computable at all.
pub fn issue_summary(ps: &PageSpeedResult) -> Option<String> {
    let checks = [
        (exceeds(ps.field_lcp_ms, LCP_POOR_MS), "slow field LCP"),
        (exceeds(ps.field_fcp_ms, FCP_POOR_MS), "slow field FCP"),
        (exceeds(ps.field_cls, CLS_POOR), "high field CLS"),
        (exceeds(ps.field_inp_ms, INP_POOR_MS), "slow field INP"),
        (exceeds(ps.lab_lcp_ms, LCP_POOR_MS), "slow lab LCP"),
        (ps.perf_score.map(|s| s < PERF_POOR), "low performance score"),
        (exceeds(ps.lab_cls, CLS_POOR), "high lab CLS"),
        (exceeds(ps.lab_inp_ms, INP_POOR_MS), "slow lab INP"),
    ];

    if checks.iter().all(|(c, _)| c.is_none()) {
        return None;
    }

    let triggered: Vec<&str> = checks
        .iter()
        .filter(|(c, _)| *c == Some(true))
        .map(|(_, label)| *label)
        .collect();
    Some(triggered.join("; "))
}

fn exceeds(value: Option<f64>, limit: f64) -> Option<bool> {
    value.map(|v| v > limit)
}

/// Combine per-metric checks into one flag: any true wins, all-absent stays
/// absent, otherwise false.
fn merge(checks: &[Option<bool>]) -> Option<bool> {
    if checks.iter().any(|c| *c == Some(true)) {
        Some(true)
    } else if checks.iter().all(|c| c.is_none()) {
        None
    } else {
        Some(false)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poor_lcp_and_score_flag_speed_problems() {
        let ps = PageSpeedResult {
            field_lcp_ms: Some(3100.0),
            lab_lcp_ms: Some(3400.0),
            perf_score: Some(42),
            ..Default::default()
        };
        let flags = classify(&ps);
        assert_eq!(flags.field_speed, Some(true));
        assert_eq!(flags.lab_speed, Some(true));
        // CLS/INP not returned: UX flags stay absent.
        assert_eq!(flags.field_ux, None);
        assert_eq!(flags.lab_ux, None);
    }

    #[test]
    fn good_metrics_flag_false_not_absent() {
        let ps = PageSpeedResult {
            field_lcp_ms: Some(1200.0),
            field_fcp_ms: Some(900.0),
            field_cls: Some(0.02),
            field_inp_ms: Some(120.0),
            lab_lcp_ms: Some(1500.0),
            lab_cls: Some(0.01),
            lab_inp_ms: Some(90.0),
            perf_score: Some(96),
            ..Default::default()
        };
        let flags = classify(&ps);
        assert_eq!(flags.field_speed, Some(false));
        assert_eq!(flags.field_ux, Some(false));
        assert_eq!(flags.lab_speed, Some(false));
        assert_eq!(flags.lab_ux, Some(false));
    }

    #[test]
    fn absent_metrics_leave_flags_absent() {
        let flags = classify(&PageSpeedResult::default());
        assert_eq!(flags, ProblemFlags::default());
    }

    #[test]
    fn one_present_metric_decides_the_flag() {
        // INP alone, poor: UX problem even though CLS is absent.
        let ps = PageSpeedResult {
            field_inp_ms: Some(650.0),
            ..Default::default()
        };
        assert_eq!(classify(&ps).field_ux, Some(true));

        // INP alone, fine: flag is a definite false.
        let ps = PageSpeedResult {
            field_inp_ms: Some(150.0),
            ..Default::default()
        };
        assert_eq!(classify(&ps).field_ux, Some(false));
    }

    #[test]
    fn classification_is_pure() {
        let ps = PageSpeedResult {
            field_lcp_ms: Some(2501.0),
            perf_score: Some(50),
            ..Default::default()
        };
        assert_eq!(classify(&ps), classify(&ps));
        // Boundary: strictly-greater / strictly-less comparisons.
        assert_eq!(classify(&ps).field_speed, Some(true));
        assert_eq!(classify(&ps).lab_speed, Some(false));
    }

    #[test]
    fn issue_summary_lists_triggered_conditions() {
        let ps = PageSpeedResult {
            field_lcp_ms: Some(3100.0),
            perf_score: Some(42),
            lab_cls: Some(0.05),
            ..Default::default()
        };
        let summary = issue_summary(&ps).unwrap();
        assert_eq!(summary, "slow field LCP; low performance score");

        assert_eq!(issue_summary(&PageSpeedResult::default()), None);
    }
}
