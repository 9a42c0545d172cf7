use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::{Store, validate_input};
use crate::auth::Role;
use crate::error::AppError;
use crate::ids;
use crate::models::{
    Attendance, Evaluation, LogEntryKind, NewAttendance, NewEvaluation, NewLogEntry,
    StudentLogEntry,
};
use crate::stats::{
    self, DashboardSummary, EvaluationAverages, attendance_rate, evaluation_averages,
    overall_score, payment_summary,
};

impl Store {
    /// One record per student, schedule and date. Recording the same triple again
    /// overwrites the earlier record and keeps its id.
    #[instrument(skip_all, fields(student_id = %input.student_id, schedule_id = %input.schedule_id))]
    pub fn record_attendance(&mut self, input: NewAttendance) -> Result<Attendance, AppError> {
        info!("Recording attendance");
        validate_input(&input)?;

        let student = self.require_student_ref(&input.student_id)?;
        let schedule = self.require_schedule_ref(&input.schedule_id)?;
        if student.category_id != schedule.category_id {
            return Err(AppError::Integrity(format!(
                "Student {} is not in the category of schedule {}",
                input.student_id, input.schedule_id
            )));
        }
        if schedule.day_of_week != input.date.weekday() {
            return Err(AppError::Validation(format!(
                "Schedule {} runs on {}, not on {}",
                input.schedule_id, schedule.day_of_week, input.date
            )));
        }
        self.require_staff(&input.checked_by, "checked_by")?;

        if let Some(existing) = self.attendances.iter_mut().find(|a| {
            a.student_id == input.student_id
                && a.schedule_id == input.schedule_id
                && a.date == input.date
        }) {
            existing.present = input.present;
            existing.checked_by = input.checked_by;
            existing.notes = input.notes;
            return Ok(existing.clone());
        }

        let attendance = Attendance {
            id: self.ids.next(ids::ATTENDANCE),
            student_id: input.student_id,
            schedule_id: input.schedule_id,
            date: input.date,
            present: input.present,
            checked_by: input.checked_by,
            notes: input.notes,
        };
        self.attendances.push(attendance.clone());

        Ok(attendance)
    }

    pub fn attendance_for_student(&self, student_id: &str) -> Result<Vec<Attendance>, AppError> {
        self.get_student(student_id)?;

        let mut records: Vec<Attendance> = self
            .attendances
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect();

        records.sort_by_key(|a| a.date);
        Ok(records)
    }

    pub fn attendance_for_schedule(
        &self,
        schedule_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Attendance>, AppError> {
        self.require_schedule_ref(schedule_id)
            .map_err(|_| AppError::not_found("Schedule", schedule_id))?;

        Ok(self
            .attendances
            .iter()
            .filter(|a| a.schedule_id == schedule_id)
            .filter(|a| date.is_none_or(|d| a.date == d))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    pub fn student_attendance_rate(&self, student_id: &str) -> Result<f64, AppError> {
        self.get_student(student_id)?;
        Ok(attendance_rate(&self.attendances, student_id))
    }

    #[instrument(skip_all, fields(student_id = %input.student_id, coach_id = %input.coach_id))]
    pub fn add_evaluation(&mut self, input: NewEvaluation) -> Result<Evaluation, AppError> {
        info!("Recording evaluation");
        validate_input(&input)?;

        self.require_student_ref(&input.student_id)?;
        self.require_user_with_role(&input.coach_id, Role::Coach, "coach_id")?;

        let evaluation = Evaluation {
            id: self.ids.next(ids::EVALUATION),
            student_id: input.student_id,
            coach_id: input.coach_id,
            date: input.date,
            technical: input.technical,
            physical: input.physical,
            mental: input.mental,
            overall: overall_score(input.technical, input.physical, input.mental),
            comments: input.comments,
        };
        self.evaluations.push(evaluation.clone());

        Ok(evaluation)
    }

    /// Most recent first.
    pub fn evaluations_for_student(&self, student_id: &str) -> Result<Vec<Evaluation>, AppError> {
        self.get_student(student_id)?;

        let mut evaluations: Vec<Evaluation> = self
            .evaluations
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect();

        evaluations.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(evaluations)
    }

    pub fn student_evaluation_averages(
        &self,
        student_id: &str,
    ) -> Result<Option<EvaluationAverages>, AppError> {
        self.get_student(student_id)?;
        Ok(evaluation_averages(&self.evaluations, student_id))
    }

    #[instrument(skip(self, input), fields(kind = ?input.kind))]
    pub fn add_log_entry(
        &mut self,
        student_id: &str,
        input: NewLogEntry,
    ) -> Result<StudentLogEntry, AppError> {
        info!("Adding student log entry");
        validate_input(&input)?;

        self.require_student_ref(student_id)?;
        self.require_staff(&input.created_by, "created_by")?;

        let entry = StudentLogEntry {
            id: self.ids.next(ids::LOG_ENTRY),
            student_id: student_id.to_string(),
            date: input.date,
            kind: input.kind,
            title: input.title,
            description: input.description,
            created_by: input.created_by,
        };
        self.log_entries.push(entry.clone());

        Ok(entry)
    }

    /// Most recent first, optionally narrowed to one kind of entry.
    pub fn log_for_student(
        &self,
        student_id: &str,
        kind: Option<LogEntryKind>,
    ) -> Result<Vec<StudentLogEntry>, AppError> {
        self.get_student(student_id)?;

        let mut entries: Vec<StudentLogEntry> = self
            .log_entries
            .iter()
            .filter(|e| e.student_id == student_id)
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .cloned()
            .collect();

        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    pub fn average_coach_experience(&self) -> Option<f64> {
        stats::average_coach_experience(&self.list_coaches(false))
    }

    #[instrument(skip(self))]
    pub fn dashboard_summary(&self) -> DashboardSummary {
        info!("Building dashboard summary");
        let active: Vec<_> = self.students.iter().filter(|s| s.active).collect();

        let monthly_fee_revenue = active
            .iter()
            .filter_map(|s| self.categories.iter().find(|c| c.id == s.category_id))
            .map(|c| c.monthly_fee)
            .sum::<Decimal>();

        let average_attendance_rate = if active.is_empty() {
            0.0
        } else {
            active
                .iter()
                .map(|s| attendance_rate(&self.attendances, &s.id))
                .sum::<f64>()
                / active.len() as f64
        };

        DashboardSummary {
            active_students: active.len(),
            active_coaches: self.list_coaches(false).len(),
            categories: self.categories.len(),
            monthly_fee_revenue,
            payments: payment_summary(&self.payments),
            average_attendance_rate,
            average_coach_experience: self.average_coach_experience(),
        }
    }
}
