use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    AgeRange, Attendance, Category, CoachProfile, Evaluation, Expense, Frequency, Payment,
    PaymentStatus,
};

/// Percentage of attended sessions. No records means 0, never NaN.
pub fn attendance_rate(attendances: &[Attendance], student_id: &str) -> f64 {
    let (present, total) = attendances
        .iter()
        .filter(|a| a.student_id == student_id)
        .fold((0u32, 0u32), |(present, total), a| {
            (present + u32::from(a.present), total + 1)
        });

    if total == 0 {
        return 0.0;
    }

    f64::from(present) / f64::from(total) * 100.0
}

/// Mean over coaches with a known `experience`. Unknown values are left out rather than guessed.
pub fn average_coach_experience(coaches: &[CoachProfile]) -> Option<f64> {
    let known: Vec<u32> = coaches.iter().filter_map(|c| c.experience).collect();

    if known.is_empty() {
        return None;
    }

    Some(known.iter().map(|&y| f64::from(y)).sum::<f64>() / known.len() as f64)
}

pub fn category_occupancy(category: &Category) -> f64 {
    if category.max_students == 0 {
        return 0.0;
    }

    f64::from(category.current_students) / f64::from(category.max_students) * 100.0
}

pub fn fits_age_range(range: &AgeRange, date_of_birth: NaiveDate, on: NaiveDate) -> bool {
    range.contains(age_on(date_of_birth, on))
}

/// Whole years between `date_of_birth` and `on`. Zero if `on` precedes the birth date.
pub fn age_on(date_of_birth: NaiveDate, on: NaiveDate) -> u32 {
    on.years_since(date_of_birth).unwrap_or(0)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentSummary {
    pub collected: Decimal,
    pub pending: Decimal,
    pub overdue: Decimal,
    pub collected_count: usize,
    pub pending_count: usize,
    pub overdue_count: usize,
}

pub fn payment_summary<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> PaymentSummary {
    let mut summary = PaymentSummary::default();

    for payment in payments {
        match payment.status {
            PaymentStatus::Completed | PaymentStatus::Paid => {
                summary.collected += payment.amount;
                summary.collected_count += 1;
            }
            PaymentStatus::Pending => {
                summary.pending += payment.amount;
                summary.pending_count += 1;
            }
            PaymentStatus::Overdue => {
                summary.overdue += payment.amount;
                summary.overdue_count += 1;
            }
        }
    }

    summary
}

/// What a recurring expense costs per month. One-off expenses contribute nothing.
pub fn monthly_equivalent(expense: &Expense) -> Decimal {
    match (expense.recurring, expense.frequency) {
        (true, Some(Frequency::Weekly)) => expense.amount * Decimal::from(52) / Decimal::from(12),
        (true, Some(Frequency::Monthly)) => expense.amount,
        (true, Some(Frequency::Quarterly)) => expense.amount / Decimal::from(3),
        (true, Some(Frequency::Yearly)) => expense.amount / Decimal::from(12),
        _ => Decimal::ZERO,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpenseSummary {
    pub year: i32,
    pub month: u32,
    pub spent_in_month: Decimal,
    pub recurring_monthly: Decimal,
}

pub fn expense_summary(expenses: &[Expense], year: i32, month: u32) -> ExpenseSummary {
    let spent_in_month = expenses
        .iter()
        .filter(|e| e.date.year() == year && e.date.month() == month)
        .map(|e| e.amount)
        .sum();

    let recurring_monthly = expenses
        .iter()
        .map(monthly_equivalent)
        .sum::<Decimal>()
        .round_dp(2);

    ExpenseSummary {
        year,
        month,
        spent_in_month,
        recurring_monthly,
    }
}

/// Mean of the three scores, one decimal.
pub fn overall_score(technical: u8, physical: u8, mental: u8) -> f64 {
    let mean = (f64::from(technical) + f64::from(physical) + f64::from(mental)) / 3.0;
    (mean * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationAverages {
    pub evaluations: usize,
    pub technical: f64,
    pub physical: f64,
    pub mental: f64,
    pub overall: f64,
}

pub fn evaluation_averages(
    evaluations: &[Evaluation],
    student_id: &str,
) -> Option<EvaluationAverages> {
    let own: Vec<&Evaluation> = evaluations
        .iter()
        .filter(|e| e.student_id == student_id)
        .collect();

    if own.is_empty() {
        return None;
    }

    let n = own.len() as f64;
    let mean = |f: fn(&Evaluation) -> f64| own.iter().map(|e| f(e)).sum::<f64>() / n;

    Some(EvaluationAverages {
        evaluations: own.len(),
        technical: mean(|e| f64::from(e.technical)),
        physical: mean(|e| f64::from(e.physical)),
        mental: mean(|e| f64::from(e.mental)),
        overall: mean(|e| e.overall),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub active_students: usize,
    pub active_coaches: usize,
    pub categories: usize,
    pub monthly_fee_revenue: Decimal,
    pub payments: PaymentSummary,
    pub average_attendance_rate: f64,
    pub average_coach_experience: Option<f64>,
}
