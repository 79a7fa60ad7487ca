use std::cmp::Ordering;

use crate::domain::entities::filter::{Sort, SortOrder};
use crate::domain::entities::records::{CellValue, ListRow, TeamMemberPerformance};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamTotals {
    pub leads_assigned: u64,
    pub leads_converted: u64,
    pub conversion_rate: f64,
    pub revenue: f64,
}

/// Highest conversion rate wins; ties go to the alphabetically first name.
/// Entries with a non-finite rate are ignored.
pub fn best_performer(team: &[TeamMemberPerformance]) -> Option<&TeamMemberPerformance> {
    team.iter()
        .filter(|member| member.conversion_rate.is_finite())
        .min_by(|a, b| {
            b.conversion_rate
                .partial_cmp(&a.conversion_rate)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
        })
}

pub fn team_totals(team: &[TeamMemberPerformance]) -> TeamTotals {
    let leads_assigned: u64 = team.iter().map(|m| m.leads_assigned).sum();
    let leads_converted: u64 = team.iter().map(|m| m.leads_converted).sum();
    let revenue: f64 = team.iter().map(|m| m.revenue).sum();
    let conversion_rate = if leads_assigned == 0 {
        0.0
    } else {
        leads_converted as f64 / leads_assigned as f64 * 100.0
    };

    TeamTotals {
        leads_assigned,
        leads_converted,
        conversion_rate,
        revenue,
    }
}

fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Text(a), CellValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
        (CellValue::Currency(a), CellValue::Currency(b))
        | (CellValue::Percent(a), CellValue::Percent(b)) => a.total_cmp(b),
        (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
        // Blanks compare lowest.
        (CellValue::Empty, _) => Ordering::Less,
        (_, CellValue::Empty) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Orders rows held in memory the way the backend orders a list endpoint.
/// An unknown sort column keeps the incoming order.
pub fn sort_rows<R: ListRow>(rows: &mut [R], sort: &Sort) {
    if !R::columns().iter().any(|column| column.key == sort.by) {
        return;
    }
    rows.sort_by(|a, b| {
        let ordering = compare_cells(&a.cell(&sort.by), &b.cell(&sort.by));
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}
