use chrono::{NaiveDate, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::Role;

/// 24h clock, minutes precision ("07:30", "18:00").
pub static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid clock regex"));

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub active: bool,
    pub created_on: NaiveDate,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    pub fn contains(&self, age: u32) -> bool {
        age >= self.min && age <= self.max
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub age_range: AgeRange,
    pub max_students: u32,
    pub current_students: u32,
    pub monthly_fee: Decimal,
    pub coach_id: Option<String>,
}

impl Category {
    pub fn is_full(&self) -> bool {
        self.current_students >= self.max_students
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Student {
    pub id: String,
    pub user_id: String,
    pub parent_id: String,
    pub category_id: String,
    pub date_of_birth: NaiveDate,
    pub enrollment_date: NaiveDate,
    pub active: bool,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoachProfile {
    pub id: String,
    pub user_id: String,
    pub specialization: Vec<String>,
    pub experience: Option<u32>,
    pub certifications: Vec<String>,
    pub assigned_categories: Vec<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Schedule {
    pub id: String,
    pub category_id: String,
    pub coach_id: String,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Overdue,
    Paid,
}

impl PaymentStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Paid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Paid => "paid",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Payment {
    pub id: String,
    pub student_id: String,
    pub amount: Decimal,
    pub concept: String,
    pub due_date: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Equipment,
    Facilities,
    Salaries,
    Transport,
    Tournaments,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Equipment => "equipment",
            ExpenseCategory::Facilities => "facilities",
            ExpenseCategory::Salaries => "salaries",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Tournaments => "tournaments",
            ExpenseCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub category: ExpenseCategory,
    pub payment_method: PaymentMethod,
    pub date: NaiveDate,
    pub recurring: bool,
    pub frequency: Option<Frequency>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct Exercise {
    #[validate(length(min = 1, message = "Exercise name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, max = 240, message = "Duration must be between 1 and 240 minutes"))]
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrainingPlan {
    pub id: String,
    pub category_id: String,
    pub coach_id: String,
    pub title: String,
    pub objectives: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub exercises: Vec<Exercise>,
}

impl TrainingPlan {
    pub fn total_minutes(&self) -> u32 {
        self.exercises.iter().map(|e| e.duration_minutes).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct PlanSection {
    #[validate(length(min = 1, message = "Section description is required"))]
    pub description: String,
    #[validate(range(min = 1, max = 180, message = "Duration must be between 1 and 180 minutes"))]
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClassPlan {
    pub id: String,
    pub category_id: String,
    pub coach_id: String,
    pub date: NaiveDate,
    pub title: String,
    pub warm_up: PlanSection,
    pub main: PlanSection,
    pub cool_down: PlanSection,
    pub materials: Vec<String>,
    pub notes: Option<String>,
}

impl ClassPlan {
    pub fn total_minutes(&self) -> u32 {
        self.warm_up.duration_minutes + self.main.duration_minutes + self.cool_down.duration_minutes
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Attendance {
    pub id: String,
    pub student_id: String,
    pub schedule_id: String,
    pub date: NaiveDate,
    pub present: bool,
    pub checked_by: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Evaluation {
    pub id: String,
    pub student_id: String,
    pub coach_id: String,
    pub date: NaiveDate,
    pub technical: u8,
    pub physical: u8,
    pub mental: u8,
    pub overall: f64,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct DifficultyLevels {
    #[validate(length(min = 1))]
    pub beginner: String,
    #[validate(length(min = 1))]
    pub intermediate: String,
    #[validate(length(min = 1))]
    pub advanced: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChallengeParameter {
    pub id: String,
    pub skill: String,
    pub name: String,
    pub description: String,
    pub difficulty_levels: DifficultyLevels,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryKind {
    Achievement,
    Progress,
    Note,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StudentLogEntry {
    pub id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub kind: LogEntryKind,
    pub title: String,
    pub description: String,
    pub created_by: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Upcoming,
    Ongoing,
    Finished,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub category_ids: Vec<String>,
    pub status: TournamentStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub published_on: NaiveDate,
    pub author_id: String,
    pub audience: Vec<Role>,
}

// Inputs accepted by the store. The HTTP layer deserializes straight into these.

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub role: Role,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub first_name: Option<String>,
    #[validate(length(min = 1))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewParent {
    #[validate(email(message = "Invalid parent email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Parent first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Parent last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentLink {
    Existing { parent_id: String },
    New(NewParent),
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStudent {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category_id: String,
    pub parent: ParentLink,
    pub enrollment_date: Option<NaiveDate>,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StudentUpdate {
    pub category_id: Option<String>,
    pub parent_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilter {
    pub category_id: Option<String>,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCoach {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub specialization: Vec<String>,
    #[validate(range(max = 60, message = "Experience must be at most 60 years"))]
    pub experience: Option<u32>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub assigned_categories: Vec<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCategory {
    pub id: Option<String>,
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub age_range: AgeRange,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub max_students: u32,
    pub monthly_fee: Decimal,
    pub coach_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub age_range: Option<AgeRange>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub max_students: Option<u32>,
    pub monthly_fee: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewSchedule {
    pub category_id: String,
    pub coach_id: String,
    pub day_of_week: Weekday,
    #[validate(regex(path = *CLOCK_TIME, message = "Time must be HH:MM"))]
    pub start_time: String,
    #[validate(regex(path = *CLOCK_TIME, message = "Time must be HH:MM"))]
    pub end_time: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPayment {
    pub student_id: String,
    pub amount: Decimal,
    #[validate(length(min = 1, message = "Concept is required"))]
    pub concept: String,
    pub due_date: NaiveDate,
    pub status: Option<PaymentStatus>,
    pub paid_on: Option<NaiveDate>,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewExpense {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub amount: Decimal,
    pub category: ExpenseCategory,
    pub payment_method: PaymentMethod,
    pub date: NaiveDate,
    #[serde(default)]
    pub recurring: bool,
    pub frequency: Option<Frequency>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAttendance {
    pub student_id: String,
    pub schedule_id: String,
    pub date: NaiveDate,
    pub present: bool,
    pub checked_by: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEvaluation {
    pub student_id: String,
    pub coach_id: String,
    pub date: NaiveDate,
    #[validate(range(min = 1, max = 10, message = "Scores go from 1 to 10"))]
    pub technical: u8,
    #[validate(range(min = 1, max = 10, message = "Scores go from 1 to 10"))]
    pub physical: u8,
    #[validate(range(min = 1, max = 10, message = "Scores go from 1 to 10"))]
    pub mental: u8,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTrainingPlan {
    pub category_id: String,
    pub coach_id: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(nested)]
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewClassPlan {
    /// Category id or category name.
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub coach_id: String,
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(nested)]
    pub warm_up: PlanSection,
    #[validate(nested)]
    pub main: PlanSection,
    #[validate(nested)]
    pub cool_down: PlanSection,
    #[serde(default)]
    pub materials: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewChallengeParameter {
    #[validate(length(min = 1, message = "Skill is required"))]
    pub skill: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(nested)]
    pub difficulty_levels: DifficultyLevels,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewLogEntry {
    pub date: NaiveDate,
    pub kind: LogEntryKind,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_by: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTournament {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[serde(default)]
    pub category_ids: Vec<String>,
    pub status: Option<TournamentStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAnnouncement {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub published_on: NaiveDate,
    pub author_id: String,
    #[serde(default)]
    pub audience: Vec<Role>,
}

/// Plaintext credentials handed back exactly once, to whoever created or reset the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub user_id: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrolledStudent {
    pub student_id: String,
    pub parent_id: String,
    pub student_credentials: Credentials,
    pub parent_credentials: Option<Credentials>,
    pub age_at_enrollment: u32,
    pub age_out_of_range: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrolledCoach {
    pub coach_id: String,
    pub credentials: Credentials,
}

/// A student joined with the records it references, with display fallbacks for anything missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentDetails {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub category_name: String,
    pub coach_name: String,
    pub parent_name: String,
    pub parent_email: String,
    pub parent_phone: String,
    pub date_of_birth: NaiveDate,
    pub enrollment_date: NaiveDate,
    pub active: bool,
}

pub const UNASSIGNED: &str = "Unassigned";
pub const NOT_AVAILABLE: &str = "Not available";
