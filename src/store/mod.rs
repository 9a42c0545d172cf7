//! In-memory entity store.
//!
//! One `Store` owns every collection. Mutations validate all of their input and
//! references before touching any collection, so a rejected call leaves the
//! store exactly as it was.

mod academy;
mod ledger;
mod people;
mod tracking;

pub use people::EnrollmentPasswords;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use validator::Validate;

use crate::auth::Role;
use crate::error::AppError;
use crate::ids::IdAllocator;
use crate::models::{
    Announcement, Attendance, Category, ChallengeParameter, ClassPlan, CoachProfile, Evaluation,
    Expense, Payment, Schedule, Student, StudentLogEntry, Tournament, TrainingPlan, User,
};
use crate::validation::field_messages;

pub type SharedStore = Arc<RwLock<Store>>;

#[derive(Debug, Clone)]
pub struct Store {
    ids: IdAllocator,
    bcrypt_cost: u32,
    users: Vec<User>,
    students: Vec<Student>,
    coaches: Vec<CoachProfile>,
    categories: Vec<Category>,
    schedules: Vec<Schedule>,
    payments: Vec<Payment>,
    expenses: Vec<Expense>,
    training_plans: Vec<TrainingPlan>,
    class_plans: Vec<ClassPlan>,
    attendances: Vec<Attendance>,
    evaluations: Vec<Evaluation>,
    challenges: Vec<ChallengeParameter>,
    log_entries: Vec<StudentLogEntry>,
    tournaments: Vec<Tournament>,
    announcements: Vec<Announcement>,
}

impl Store {
    pub fn new(bcrypt_cost: u32) -> Self {
        Self {
            ids: IdAllocator::new(),
            bcrypt_cost,
            users: Vec::new(),
            students: Vec::new(),
            coaches: Vec::new(),
            categories: Vec::new(),
            schedules: Vec::new(),
            payments: Vec::new(),
            expenses: Vec::new(),
            training_plans: Vec::new(),
            class_plans: Vec::new(),
            attendances: Vec::new(),
            evaluations: Vec::new(),
            challenges: Vec::new(),
            log_entries: Vec::new(),
            tournaments: Vec::new(),
            announcements: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn coaches(&self) -> &[CoachProfile] {
        &self.coaches
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn attendances(&self) -> &[Attendance] {
        &self.attendances
    }

    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    fn require_user_with_role(
        &self,
        user_id: &str,
        role: Role,
        field: &str,
    ) -> Result<&User, AppError> {
        match self.users.iter().find(|u| u.id == user_id) {
            Some(user) if user.role == role => Ok(user),
            Some(user) => Err(AppError::Integrity(format!(
                "{} {} refers to a {}, expected a {}",
                field, user_id, user.role, role
            ))),
            None => Err(AppError::Integrity(format!(
                "{} {} does not refer to an existing user",
                field, user_id
            ))),
        }
    }

    /// Coaches and admins may both run sessions, take attendance and author records.
    fn require_staff(&self, user_id: &str, field: &str) -> Result<&User, AppError> {
        match self.users.iter().find(|u| u.id == user_id) {
            Some(user) if matches!(user.role, Role::Coach | Role::Admin) => Ok(user),
            Some(user) => Err(AppError::Integrity(format!(
                "{} {} refers to a {}, expected staff",
                field, user_id, user.role
            ))),
            None => Err(AppError::Integrity(format!(
                "{} {} does not refer to an existing user",
                field, user_id
            ))),
        }
    }

    fn require_category_ref(&self, category_id: &str) -> Result<&Category, AppError> {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| {
                AppError::Integrity(format!(
                    "category_id {} does not refer to an existing category",
                    category_id
                ))
            })
    }

    fn require_student_ref(&self, student_id: &str) -> Result<&Student, AppError> {
        self.students
            .iter()
            .find(|s| s.id == student_id)
            .ok_or_else(|| {
                AppError::Integrity(format!(
                    "student_id {} does not refer to an existing student",
                    student_id
                ))
            })
    }

    fn require_schedule_ref(&self, schedule_id: &str) -> Result<&Schedule, AppError> {
        self.schedules
            .iter()
            .find(|s| s.id == schedule_id)
            .ok_or_else(|| {
                AppError::Integrity(format!(
                    "schedule_id {} does not refer to an existing schedule",
                    schedule_id
                ))
            })
    }
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Flattens `validator` output into a single store-level validation error.
pub(crate) fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input.validate().map_err(|errors| {
        let mut fields: Vec<String> = field_messages(&errors)
            .into_iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        fields.sort();

        if fields.is_empty() {
            AppError::Validation(errors.to_string())
        } else {
            AppError::Validation(fields.join("; "))
        }
    })
}

fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: &str,
    kind: &str,
    key: impl Fn(&T) -> &str,
) -> Result<T, AppError> {
    let index = items
        .iter()
        .position(|item| key(item) == id)
        .ok_or_else(|| AppError::not_found(kind, id))?;

    Ok(items.remove(index))
}
