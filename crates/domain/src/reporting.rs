// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Summary KPIs over risk, training and PPE collections.
//!
//! Every function here is total: empty inputs produce zero-valued summaries.
//! Where a "most frequent" value is reported, ties go to the value seen
//! first in input order.

use crate::ppe::{ExpiryTier, PpeAssignment, PpeCatalogItem};
use crate::risk::{RiskRecord, RiskStatus, RiskTier};
use crate::training::{Attendance, Survey, Training, TrainingStatus};
use crate::types::Area;
use num_traits::ToPrimitive;
use serde::Serialize;
use time::Date;

/// Returns the most frequent value, first-seen winning ties.
fn most_frequent<T, I>(values: I) -> Option<T>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut counts: Vec<(T, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Divides two counts, yielding 0 when the denominator is 0.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let numerator: f64 = numerator.to_f64().unwrap_or(0.0);
    let denominator: f64 = denominator.to_f64().unwrap_or(1.0);
    numerator / denominator
}

/// Counts of risks per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    /// Low-risk records.
    pub low: usize,
    /// Medium-risk records.
    pub medium: usize,
    /// High-risk records.
    pub high: usize,
}

impl TierCounts {
    fn record(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::Low => self.low += 1,
            RiskTier::Medium => self.medium += 1,
            RiskTier::High => self.high += 1,
        }
    }
}

/// Counts of risks per implementation status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Pending records.
    pub pending: usize,
    /// Records under mitigation.
    pub mitigating: usize,
    /// Controlled records.
    pub controlled: usize,
}

impl StatusCounts {
    fn record(&mut self, status: RiskStatus) {
        match status {
            RiskStatus::Pending => self.pending += 1,
            RiskStatus::Mitigating => self.mitigating += 1,
            RiskStatus::Controlled => self.controlled += 1,
        }
    }
}

/// Headline KPIs for the risk matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskSummary {
    /// Number of records.
    pub total: usize,
    /// Counts per tier.
    pub by_tier: TierCounts,
    /// Counts per status.
    pub by_status: StatusCounts,
    /// The area with the most records.
    pub top_area: Option<Area>,
}

/// Summarizes a collection of risk records.
#[must_use]
pub fn summarize_risks(records: &[RiskRecord]) -> RiskSummary {
    let mut summary: RiskSummary = RiskSummary {
        total: records.len(),
        ..RiskSummary::default()
    };
    for record in records {
        summary.by_tier.record(record.tier());
        summary.by_status.record(record.status);
    }
    summary.top_area = most_frequent(records.iter().map(|r| &r.area)).cloned();
    summary
}

/// Number of cells per heatmap axis.
pub const HEATMAP_SIZE: usize = 5;

/// Counts records per (probability, severity) cell.
///
/// Row index is `probability - 1`, column index is `severity - 1`.
#[must_use]
pub fn risk_heatmap(records: &[RiskRecord]) -> [[usize; HEATMAP_SIZE]; HEATMAP_SIZE] {
    let mut grid: [[usize; HEATMAP_SIZE]; HEATMAP_SIZE] = [[0; HEATMAP_SIZE]; HEATMAP_SIZE];
    for record in records {
        let row: usize = usize::from(record.score.probability().saturating_sub(1));
        let col: usize = usize::from(record.score.severity().saturating_sub(1));
        if let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell += 1;
        }
    }
    grid
}

/// Status counts for a single area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaStatusCounts {
    /// The area.
    pub area: Area,
    /// Counts per status.
    pub counts: StatusCounts,
}

/// Groups status counts by area, areas in first-seen order.
#[must_use]
pub fn status_by_area(records: &[RiskRecord]) -> Vec<AreaStatusCounts> {
    let mut groups: Vec<AreaStatusCounts> = Vec::new();
    for record in records {
        if let Some(group) = groups.iter_mut().find(|g| g.area == record.area) {
            group.counts.record(record.status);
        } else {
            let mut counts: StatusCounts = StatusCounts::default();
            counts.record(record.status);
            groups.push(AreaStatusCounts {
                area: record.area.clone(),
                counts,
            });
        }
    }
    groups
}

/// A training with its roster and surveys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingAggregate {
    /// The training.
    pub training: Training,
    /// Roster entries.
    pub attendances: Vec<Attendance>,
    /// Surveys received.
    pub surveys: Vec<Survey>,
}

/// Effectiveness figures for a single held training.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingEffectiveness {
    /// Training code.
    pub code: String,
    /// Training topic.
    pub topic: String,
    /// Scheduled date.
    pub date: Date,
    /// Workers on the roster.
    pub invited: usize,
    /// Workers who attended.
    pub attended: usize,
    /// `attended / invited`, 0 when nobody was invited.
    pub attendance_rate: f64,
    /// Surveys received.
    pub survey_count: usize,
    /// Mean survey rating; `None` without surveys.
    pub mean_rating: Option<f64>,
}

/// Effectiveness report across held trainings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffectivenessReport {
    /// Per-training rows, in input order.
    pub trainings: Vec<TrainingEffectiveness>,
    /// Total attended across trainings.
    pub total_attended: usize,
    /// Total invited across trainings.
    pub total_invited: usize,
    /// `total_attended / total_invited`, 0 when nobody was invited.
    pub global_attendance_rate: f64,
    /// Mean of per-training mean ratings over trainings with surveys; 0 if none.
    pub global_satisfaction: f64,
}

fn mean_rating(surveys: &[Survey]) -> Option<f64> {
    if surveys.is_empty() {
        return None;
    }
    let sum: usize = surveys.iter().map(|s| usize::from(s.rating)).sum();
    Some(ratio(sum, surveys.len()))
}

/// Builds the effectiveness report. Trainings not yet held are ignored.
#[must_use]
pub fn summarize_training_effectiveness(aggregates: &[TrainingAggregate]) -> EffectivenessReport {
    let mut report: EffectivenessReport = EffectivenessReport::default();
    let mut rating_sum: f64 = 0.0;
    let mut rated_trainings: usize = 0;

    for aggregate in aggregates
        .iter()
        .filter(|a| a.training.status == TrainingStatus::Held)
    {
        let invited: usize = aggregate.attendances.len();
        let attended: usize = aggregate.attendances.iter().filter(|a| a.attended).count();
        let mean: Option<f64> = mean_rating(&aggregate.surveys);

        if let Some(mean) = mean {
            rating_sum += mean;
            rated_trainings += 1;
        }
        report.total_invited += invited;
        report.total_attended += attended;

        report.trainings.push(TrainingEffectiveness {
            code: aggregate.training.code.clone(),
            topic: aggregate.training.topic.clone(),
            date: aggregate.training.scheduled_date(),
            invited,
            attended,
            attendance_rate: ratio(attended, invited),
            survey_count: aggregate.surveys.len(),
            mean_rating: mean,
        });
    }

    report.global_attendance_rate = ratio(report.total_attended, report.total_invited);
    if rated_trainings > 0 {
        report.global_satisfaction = rating_sum / rated_trainings.to_f64().unwrap_or(1.0);
    }
    report
}

/// Headline KPIs for PPE assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PpeSummary {
    /// Number of assignments.
    pub total: usize,
    /// Expired assignments.
    pub expired: usize,
    /// Assignments expiring within 30 days.
    pub expiring_soon: usize,
    /// Assignments valid beyond 30 days.
    pub current: usize,
    /// The most assigned catalog item id.
    pub most_assigned_item_id: Option<i64>,
    /// Its catalog name, when the item is in `catalog`.
    pub most_assigned_item_name: Option<String>,
}

/// Summarizes PPE assignments relative to `today`.
#[must_use]
pub fn summarize_ppe(
    assignments: &[PpeAssignment],
    catalog: &[PpeCatalogItem],
    today: Date,
) -> PpeSummary {
    let mut summary: PpeSummary = PpeSummary {
        total: assignments.len(),
        ..PpeSummary::default()
    };
    for assignment in assignments {
        match assignment.tier(today) {
            ExpiryTier::Expired => summary.expired += 1,
            ExpiryTier::ExpiringSoon => summary.expiring_soon += 1,
            ExpiryTier::Current => summary.current += 1,
        }
    }

    summary.most_assigned_item_id = most_frequent(assignments.iter().map(|a| a.item_id));
    summary.most_assigned_item_name = summary.most_assigned_item_id.and_then(|item_id| {
        catalog
            .iter()
            .find(|item| item.item_id == Some(item_id))
            .map(|item| item.name.clone())
    });
    summary
}

/// Counts of PPE assignments per expiry tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpiryCounts {
    /// Expired assignments.
    pub expired: usize,
    /// Assignments expiring within 30 days.
    pub expiring_soon: usize,
    /// Assignments valid beyond 30 days.
    pub current: usize,
}

impl ExpiryCounts {
    fn record(&mut self, tier: ExpiryTier) {
        match tier {
            ExpiryTier::Expired => self.expired += 1,
            ExpiryTier::ExpiringSoon => self.expiring_soon += 1,
            ExpiryTier::Current => self.current += 1,
        }
    }
}

/// Expiry tier counts for the workers of a single area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaExpiryCounts {
    /// The worker area. `None` groups workers without one.
    pub area: Option<Area>,
    /// Counts per tier.
    pub counts: ExpiryCounts,
}

/// Groups PPE assignments by the holder's area, areas in first-seen order.
#[must_use]
pub fn ppe_tier_by_area<'a, I>(assignments: I, today: Date) -> Vec<AreaExpiryCounts>
where
    I: IntoIterator<Item = (Option<&'a Area>, &'a PpeAssignment)>,
{
    let mut groups: Vec<AreaExpiryCounts> = Vec::new();
    for (area, assignment) in assignments {
        let tier: ExpiryTier = assignment.tier(today);
        if let Some(group) = groups.iter_mut().find(|g| g.area.as_ref() == area) {
            group.counts.record(tier);
        } else {
            let mut counts: ExpiryCounts = ExpiryCounts::default();
            counts.record(tier);
            groups.push(AreaExpiryCounts {
                area: area.cloned(),
                counts,
            });
        }
    }
    groups
}
