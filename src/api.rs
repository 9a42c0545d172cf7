use chrono::{Datelike, NaiveDate};
use rocket::http::{ContentType, Status};
use rocket::{Request, State};
use rocket::serde::json::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::auth::{IssuedPassword, Role};
use crate::env::AcademyConfig;
use crate::error::AppError;
use crate::export::{
    EmailDraft, EmailLinks, expenses_csv, password_reset_notice, payments_csv, students_csv,
    welcome_email,
};
use crate::models::{
    Announcement, Attendance, Category, CategoryUpdate, ChallengeParameter, ClassPlan,
    CoachProfile, Credentials, EnrolledCoach, EnrolledStudent, Evaluation, Expense,
    LogEntryKind, NewAnnouncement, NewAttendance, NewCategory, NewChallengeParameter,
    NewClassPlan, NewCoach, NewEvaluation, NewExpense, NewLogEntry, NewPayment, NewSchedule,
    NewStudent, NewTournament, NewTrainingPlan, NewUser, Payment, PaymentStatus, Schedule,
    Student, StudentDetails, StudentFilter, StudentLogEntry, StudentUpdate, Tournament,
    TrainingPlan, User, UserUpdate,
};
use crate::stats::{
    DashboardSummary, EvaluationAverages, ExpenseSummary, PaymentSummary, category_occupancy,
    expense_summary, payment_summary,
};
use crate::store::{EnrollmentPasswords, SharedStore, today};
use crate::validation::{ApiError, AppErrorExt, JsonValidateExt, ToValidationResponse};

type ApiResult<T> = Result<Json<T>, ApiError>;
type CsvResult = Result<(ContentType, String), ApiError>;

#[derive(Deserialize)]
pub struct ActiveRequest {
    pub active: bool,
}

#[derive(Deserialize)]
pub struct CoachAssignment {
    pub coach_id: String,
}

#[derive(Deserialize)]
pub struct PaymentStatusUpdate {
    pub status: PaymentStatus,
    pub paid_on: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize)]
pub struct PasswordResetResponse {
    pub credentials: Credentials,
    pub notice: EmailDraft,
    pub links: EmailLinks,
}

#[derive(Serialize, Deserialize)]
pub struct EmailDraftResponse {
    pub draft: EmailDraft,
    pub links: EmailLinks,
}

#[derive(Serialize, Deserialize)]
pub struct AttendanceRateResponse {
    pub student_id: String,
    pub rate: f64,
}

#[derive(Serialize, Deserialize)]
pub struct CoachStatsResponse {
    pub active_coaches: usize,
    pub average_experience: Option<f64>,
}

#[derive(Serialize)]
pub struct CategoryView {
    #[serde(flatten)]
    pub category: Category,
    pub occupancy: f64,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            occupancy: category_occupancy(&category),
            category,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct SweepResponse {
    pub moved: usize,
}

fn parse_enum<T: DeserializeOwned>(field: &str, raw: &str) -> Result<T, ApiError> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| AppError::Validation(format!("Unknown {}: {}", field, raw)))
        .validate_custom()
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    raw.parse::<NaiveDate>()
        .map_err(|_| AppError::Validation(format!("{} must be YYYY-MM-DD, got {}", field, raw)))
        .validate_custom()
}

fn parse_optional_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    raw.map(|r| parse_date(field, r)).transpose()
}

fn student_filter(
    category_id: Option<String>,
    parent_id: Option<String>,
    include_inactive: Option<bool>,
    search: Option<String>,
) -> StudentFilter {
    StudentFilter {
        category_id,
        parent_id,
        include_inactive: include_inactive.unwrap_or(false),
        search,
    }
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

// Users

#[get("/users?<role>&<include_inactive>")]
pub async fn api_list_users(
    role: Option<&str>,
    include_inactive: Option<bool>,
    store: &State<SharedStore>,
) -> ApiResult<Vec<User>> {
    let role = role.map(|r| r.parse::<Role>()).transpose().validate_custom()?;
    let store = store.read().await;
    Ok(Json(store.list_users(role, include_inactive.unwrap_or(false))))
}

#[post("/users", data = "<user>")]
pub async fn api_create_user(
    user: Json<NewUser>,
    store: &State<SharedStore>,
) -> ApiResult<Credentials> {
    let validated = user.validate_custom()?;
    let cost = store.read().await.bcrypt_cost();
    let issued = IssuedPassword::for_user(&validated, cost).validate_custom()?;

    let mut store = store.write().await;
    Ok(Json(store.add_user_with(validated, issued).validate_custom()?))
}

#[put("/users/<id>", data = "<update>")]
pub async fn api_update_user(
    id: &str,
    update: Json<UserUpdate>,
    store: &State<SharedStore>,
) -> ApiResult<User> {
    let validated = update.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.update_user(id, validated).validate_custom()?))
}

#[put("/users/<id>/active", data = "<request>")]
pub async fn api_set_user_active(
    id: &str,
    request: Json<ActiveRequest>,
    store: &State<SharedStore>,
) -> ApiResult<User> {
    let mut store = store.write().await;
    Ok(Json(store.set_user_active(id, request.active).validate_custom()?))
}

#[post("/users/<id>/reset-password")]
#[instrument(skip(store, config))]
pub async fn api_reset_password(
    id: &str,
    store: &State<SharedStore>,
    config: &State<AcademyConfig>,
) -> ApiResult<PasswordResetResponse> {
    let (role, cost) = {
        let store = store.read().await;
        (store.get_user(id).validate_custom()?.role, store.bcrypt_cost())
    };
    let issued = IssuedPassword::generate(role, cost).validate_custom()?;
    let credentials = store.write().await.reset_password(id, issued).validate_custom()?;
    info!(user_id = %credentials.user_id, "Password reset");

    let notice = password_reset_notice(&credentials, &config.academy_name);
    Ok(Json(PasswordResetResponse {
        links: notice.links(),
        notice,
        credentials,
    }))
}

#[get("/users/<id>/welcome-email")]
pub async fn api_welcome_email(
    id: &str,
    store: &State<SharedStore>,
    config: &State<AcademyConfig>,
) -> ApiResult<EmailDraftResponse> {
    let store = store.read().await;
    let user = store.get_user(id).validate_custom()?;

    let category = store
        .students()
        .iter()
        .find(|s| s.user_id == user.id)
        .and_then(|s| store.get_category(&s.category_id).ok());

    let draft = welcome_email(&user, &config.academy_name, category.as_ref());
    Ok(Json(EmailDraftResponse {
        links: draft.links(),
        draft,
    }))
}

// Students

#[get("/students?<category_id>&<parent_id>&<include_inactive>&<search>")]
pub async fn api_list_students(
    category_id: Option<String>,
    parent_id: Option<String>,
    include_inactive: Option<bool>,
    search: Option<String>,
    store: &State<SharedStore>,
) -> Json<Vec<Student>> {
    let filter = student_filter(category_id, parent_id, include_inactive, search);
    Json(store.read().await.list_students(&filter))
}

#[post("/students", data = "<student>")]
pub async fn api_create_student(
    student: Json<NewStudent>,
    store: &State<SharedStore>,
) -> ApiResult<EnrolledStudent> {
    let validated = student.validate_custom()?;
    let cost = store.read().await.bcrypt_cost();
    let passwords = EnrollmentPasswords::issue(&validated, cost).validate_custom()?;

    let mut store = store.write().await;
    Ok(Json(store.add_new_student_with(validated, passwords).validate_custom()?))
}

#[get("/students/<id>")]
pub async fn api_get_student(id: &str, store: &State<SharedStore>) -> ApiResult<Student> {
    Ok(Json(store.read().await.get_student(id).validate_custom()?))
}

#[get("/students/<id>/details")]
pub async fn api_student_details(
    id: &str,
    store: &State<SharedStore>,
) -> ApiResult<StudentDetails> {
    Ok(Json(store.read().await.student_details(id).validate_custom()?))
}

#[put("/students/<id>", data = "<update>")]
pub async fn api_update_student(
    id: &str,
    update: Json<StudentUpdate>,
    store: &State<SharedStore>,
) -> ApiResult<Student> {
    let validated = update.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.update_student(id, validated).validate_custom()?))
}

#[put("/students/<id>/active", data = "<request>")]
pub async fn api_set_student_active(
    id: &str,
    request: Json<ActiveRequest>,
    store: &State<SharedStore>,
) -> ApiResult<Student> {
    let mut store = store.write().await;
    Ok(Json(store.set_student_active(id, request.active).validate_custom()?))
}

#[get("/students/<id>/attendance")]
pub async fn api_student_attendance(
    id: &str,
    store: &State<SharedStore>,
) -> ApiResult<Vec<Attendance>> {
    Ok(Json(store.read().await.attendance_for_student(id).validate_custom()?))
}

#[get("/students/<id>/attendance-rate")]
pub async fn api_student_attendance_rate(
    id: &str,
    store: &State<SharedStore>,
) -> ApiResult<AttendanceRateResponse> {
    let rate = store.read().await.student_attendance_rate(id).validate_custom()?;
    Ok(Json(AttendanceRateResponse {
        student_id: id.to_string(),
        rate,
    }))
}

#[get("/students/<id>/evaluations")]
pub async fn api_student_evaluations(
    id: &str,
    store: &State<SharedStore>,
) -> ApiResult<Vec<Evaluation>> {
    Ok(Json(store.read().await.evaluations_for_student(id).validate_custom()?))
}

#[get("/students/<id>/evaluations/averages")]
pub async fn api_student_evaluation_averages(
    id: &str,
    store: &State<SharedStore>,
) -> ApiResult<Option<EvaluationAverages>> {
    let averages = store.read().await.student_evaluation_averages(id);
    Ok(Json(averages.validate_custom()?))
}

#[get("/students/<id>/log?<kind>")]
pub async fn api_student_log(
    id: &str,
    kind: Option<&str>,
    store: &State<SharedStore>,
) -> ApiResult<Vec<StudentLogEntry>> {
    let kind = kind
        .map(|k| parse_enum::<LogEntryKind>("log entry kind", k))
        .transpose()?;
    Ok(Json(store.read().await.log_for_student(id, kind).validate_custom()?))
}

#[post("/students/<id>/log", data = "<entry>")]
pub async fn api_add_log_entry(
    id: &str,
    entry: Json<NewLogEntry>,
    store: &State<SharedStore>,
) -> ApiResult<StudentLogEntry> {
    let validated = entry.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_log_entry(id, validated).validate_custom()?))
}

#[get("/parents/<id>/students")]
pub async fn api_parent_students(
    id: &str,
    store: &State<SharedStore>,
) -> ApiResult<Vec<Student>> {
    Ok(Json(store.read().await.students_of_parent(id).validate_custom()?))
}

// Coaches and categories

#[get("/coaches?<include_inactive>")]
pub async fn api_list_coaches(
    include_inactive: Option<bool>,
    store: &State<SharedStore>,
) -> Json<Vec<CoachProfile>> {
    Json(store.read().await.list_coaches(include_inactive.unwrap_or(false)))
}

#[post("/coaches", data = "<coach>")]
pub async fn api_create_coach(
    coach: Json<NewCoach>,
    store: &State<SharedStore>,
) -> ApiResult<EnrolledCoach> {
    let validated = coach.validate_custom()?;
    let cost = store.read().await.bcrypt_cost();
    let issued = IssuedPassword::generate(Role::Coach, cost).validate_custom()?;

    let mut store = store.write().await;
    Ok(Json(store.add_new_coach_with(validated, issued).validate_custom()?))
}

#[get("/coaches/<id>")]
pub async fn api_get_coach(id: &str, store: &State<SharedStore>) -> ApiResult<CoachProfile> {
    Ok(Json(store.read().await.get_coach(id).validate_custom()?))
}

#[get("/stats/coaches")]
pub async fn api_coach_stats(store: &State<SharedStore>) -> Json<CoachStatsResponse> {
    let store = store.read().await;
    Json(CoachStatsResponse {
        active_coaches: store.list_coaches(false).len(),
        average_experience: store.average_coach_experience(),
    })
}

#[get("/categories")]
pub async fn api_list_categories(store: &State<SharedStore>) -> Json<Vec<CategoryView>> {
    let categories = store.read().await.list_categories();
    Json(categories.into_iter().map(CategoryView::from).collect())
}

#[get("/categories/<id>")]
pub async fn api_get_category(id: &str, store: &State<SharedStore>) -> ApiResult<CategoryView> {
    let category = store.read().await.get_category(id).validate_custom()?;
    Ok(Json(category.into()))
}

#[post("/categories", data = "<category>")]
pub async fn api_create_category(
    category: Json<NewCategory>,
    store: &State<SharedStore>,
) -> ApiResult<CategoryView> {
    let validated = category.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_category(validated).validate_custom()?.into()))
}

#[put("/categories/<id>", data = "<update>")]
pub async fn api_update_category(
    id: &str,
    update: Json<CategoryUpdate>,
    store: &State<SharedStore>,
) -> ApiResult<CategoryView> {
    let validated = update.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.update_category(id, validated).validate_custom()?.into()))
}

#[put("/categories/<id>/coach", data = "<assignment>")]
pub async fn api_assign_coach(
    id: &str,
    assignment: Json<CoachAssignment>,
    store: &State<SharedStore>,
) -> ApiResult<CategoryView> {
    let mut store = store.write().await;
    let category = store
        .assign_coach_to_category(id, &assignment.coach_id)
        .validate_custom()?;
    Ok(Json(category.into()))
}

// Schedules and attendance

#[get("/schedules?<category_id>&<coach_id>")]
pub async fn api_list_schedules(
    category_id: Option<&str>,
    coach_id: Option<&str>,
    store: &State<SharedStore>,
) -> Json<Vec<Schedule>> {
    Json(store.read().await.list_schedules(category_id, coach_id))
}

#[post("/schedules", data = "<schedule>")]
pub async fn api_create_schedule(
    schedule: Json<NewSchedule>,
    store: &State<SharedStore>,
) -> ApiResult<Schedule> {
    let validated = schedule.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_schedule(validated).validate_custom()?))
}

#[delete("/schedules/<id>")]
pub async fn api_delete_schedule(id: &str, store: &State<SharedStore>) -> ApiResult<Schedule> {
    Ok(Json(store.write().await.delete_schedule(id).validate_custom()?))
}

#[get("/schedules/<id>/attendance?<date>")]
pub async fn api_schedule_attendance(
    id: &str,
    date: Option<&str>,
    store: &State<SharedStore>,
) -> ApiResult<Vec<Attendance>> {
    let date = parse_optional_date("date", date)?;
    let records = store.read().await.attendance_for_schedule(id, date);
    Ok(Json(records.validate_custom()?))
}

#[post("/attendance", data = "<record>")]
pub async fn api_record_attendance(
    record: Json<NewAttendance>,
    store: &State<SharedStore>,
) -> ApiResult<Attendance> {
    let validated = record.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.record_attendance(validated).validate_custom()?))
}

#[post("/evaluations", data = "<evaluation>")]
pub async fn api_add_evaluation(
    evaluation: Json<NewEvaluation>,
    store: &State<SharedStore>,
) -> ApiResult<Evaluation> {
    let validated = evaluation.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_evaluation(validated).validate_custom()?))
}

// Money

#[get("/payments?<student_id>&<status>")]
pub async fn api_list_payments(
    student_id: Option<&str>,
    status: Option<&str>,
    store: &State<SharedStore>,
) -> ApiResult<Vec<Payment>> {
    let status = status
        .map(|s| parse_enum::<PaymentStatus>("payment status", s))
        .transpose()?;
    Ok(Json(store.read().await.list_payments(student_id, status)))
}

#[post("/payments", data = "<payment>")]
pub async fn api_create_payment(
    payment: Json<NewPayment>,
    store: &State<SharedStore>,
) -> ApiResult<Payment> {
    let validated = payment.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_payment(validated).validate_custom()?))
}

#[put("/payments/<id>/status", data = "<update>")]
pub async fn api_update_payment_status(
    id: &str,
    update: Json<PaymentStatusUpdate>,
    store: &State<SharedStore>,
) -> ApiResult<Payment> {
    let mut store = store.write().await;
    let payment = store
        .update_payment_status(id, update.status, update.paid_on)
        .validate_custom()?;
    Ok(Json(payment))
}

#[post("/payments/mark-overdue")]
pub async fn api_mark_overdue(store: &State<SharedStore>) -> Json<SweepResponse> {
    let moved = store.write().await.mark_overdue_payments(today());
    Json(SweepResponse { moved })
}

#[get("/payments/summary?<student_id>")]
pub async fn api_payment_summary(
    student_id: Option<&str>,
    store: &State<SharedStore>,
) -> Json<PaymentSummary> {
    let store = store.read().await;
    Json(payment_summary(
        store
            .payments()
            .iter()
            .filter(|p| student_id.is_none_or(|s| p.student_id == s)),
    ))
}

#[get("/expenses?<from>&<to>")]
pub async fn api_list_expenses(
    from: Option<&str>,
    to: Option<&str>,
    store: &State<SharedStore>,
) -> ApiResult<Vec<Expense>> {
    let from = parse_optional_date("from", from)?;
    let to = parse_optional_date("to", to)?;
    Ok(Json(store.read().await.list_expenses(from, to)))
}

#[post("/expenses", data = "<expense>")]
pub async fn api_create_expense(
    expense: Json<NewExpense>,
    store: &State<SharedStore>,
) -> ApiResult<Expense> {
    let validated = expense.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_expense(validated).validate_custom()?))
}

#[delete("/expenses/<id>")]
pub async fn api_delete_expense(id: &str, store: &State<SharedStore>) -> ApiResult<Expense> {
    Ok(Json(store.write().await.delete_expense(id).validate_custom()?))
}

/// Defaults to the current month.
#[get("/expenses/summary?<year>&<month>")]
pub async fn api_expense_summary(
    year: Option<i32>,
    month: Option<u32>,
    store: &State<SharedStore>,
) -> ApiResult<ExpenseSummary> {
    let now = today();
    let month = month.unwrap_or(now.month());
    if !(1..=12).contains(&month) {
        return Err(
            AppError::Validation(format!("Month must be 1-12, got {}", month))
                .to_validation_response(),
        );
    }

    let store = store.read().await;
    Ok(Json(expense_summary(
        store.expenses(),
        year.unwrap_or(now.year()),
        month,
    )))
}

// Planning

#[get("/training-plans?<category_id>&<coach_id>")]
pub async fn api_list_training_plans(
    category_id: Option<&str>,
    coach_id: Option<&str>,
    store: &State<SharedStore>,
) -> Json<Vec<TrainingPlan>> {
    Json(store.read().await.list_training_plans(category_id, coach_id))
}

#[post("/training-plans", data = "<plan>")]
pub async fn api_create_training_plan(
    plan: Json<NewTrainingPlan>,
    store: &State<SharedStore>,
) -> ApiResult<TrainingPlan> {
    let validated = plan.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_training_plan(validated).validate_custom()?))
}

#[delete("/training-plans/<id>")]
pub async fn api_delete_training_plan(
    id: &str,
    store: &State<SharedStore>,
) -> ApiResult<TrainingPlan> {
    Ok(Json(store.write().await.delete_training_plan(id).validate_custom()?))
}

#[get("/class-plans?<category_id>&<coach_id>")]
pub async fn api_list_class_plans(
    category_id: Option<&str>,
    coach_id: Option<&str>,
    store: &State<SharedStore>,
) -> Json<Vec<ClassPlan>> {
    Json(store.read().await.list_class_plans(category_id, coach_id))
}

#[post("/class-plans", data = "<plan>")]
pub async fn api_create_class_plan(
    plan: Json<NewClassPlan>,
    store: &State<SharedStore>,
) -> ApiResult<ClassPlan> {
    let validated = plan.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_class_plan(validated).validate_custom()?))
}

#[delete("/class-plans/<id>")]
pub async fn api_delete_class_plan(id: &str, store: &State<SharedStore>) -> ApiResult<ClassPlan> {
    Ok(Json(store.write().await.delete_class_plan(id).validate_custom()?))
}

#[get("/challenges?<skill>")]
pub async fn api_list_challenges(
    skill: Option<&str>,
    store: &State<SharedStore>,
) -> Json<Vec<ChallengeParameter>> {
    Json(store.read().await.list_challenge_parameters(skill))
}

#[post("/challenges", data = "<challenge>")]
pub async fn api_create_challenge(
    challenge: Json<NewChallengeParameter>,
    store: &State<SharedStore>,
) -> ApiResult<ChallengeParameter> {
    let validated = challenge.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_challenge_parameter(validated).validate_custom()?))
}

#[delete("/challenges/<id>")]
pub async fn api_delete_challenge(
    id: &str,
    store: &State<SharedStore>,
) -> ApiResult<ChallengeParameter> {
    Ok(Json(store.write().await.delete_challenge_parameter(id).validate_custom()?))
}

#[get("/tournaments")]
pub async fn api_list_tournaments(store: &State<SharedStore>) -> Json<Vec<Tournament>> {
    Json(store.read().await.list_tournaments())
}

#[post("/tournaments", data = "<tournament>")]
pub async fn api_create_tournament(
    tournament: Json<NewTournament>,
    store: &State<SharedStore>,
) -> ApiResult<Tournament> {
    let validated = tournament.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_tournament(validated).validate_custom()?))
}

#[get("/announcements?<audience>")]
pub async fn api_list_announcements(
    audience: Option<&str>,
    store: &State<SharedStore>,
) -> ApiResult<Vec<Announcement>> {
    let audience = audience.map(|a| a.parse::<Role>()).transpose().validate_custom()?;
    Ok(Json(store.read().await.list_announcements(audience)))
}

#[post("/announcements", data = "<announcement>")]
pub async fn api_create_announcement(
    announcement: Json<NewAnnouncement>,
    store: &State<SharedStore>,
) -> ApiResult<Announcement> {
    let validated = announcement.validate_custom()?;
    let mut store = store.write().await;
    Ok(Json(store.add_announcement(validated).validate_custom()?))
}

#[delete("/announcements/<id>")]
pub async fn api_delete_announcement(
    id: &str,
    store: &State<SharedStore>,
) -> ApiResult<Announcement> {
    Ok(Json(store.write().await.delete_announcement(id).validate_custom()?))
}

#[get("/dashboard")]
pub async fn api_dashboard(store: &State<SharedStore>) -> Json<DashboardSummary> {
    Json(store.read().await.dashboard_summary())
}

// Exports

#[get("/export/students.csv?<category_id>&<parent_id>&<include_inactive>&<search>")]
pub async fn api_export_students(
    category_id: Option<String>,
    parent_id: Option<String>,
    include_inactive: Option<bool>,
    search: Option<String>,
    store: &State<SharedStore>,
) -> CsvResult {
    let filter = student_filter(category_id, parent_id, include_inactive, search);
    let rows = store.read().await.list_student_details(&filter);
    Ok((ContentType::CSV, students_csv(&rows)))
}

#[get("/export/payments.csv?<student_id>&<status>")]
pub async fn api_export_payments(
    student_id: Option<&str>,
    status: Option<&str>,
    store: &State<SharedStore>,
) -> CsvResult {
    let status = status
        .map(|s| parse_enum::<PaymentStatus>("payment status", s))
        .transpose()?;
    let payments = store.read().await.list_payments(student_id, status);
    Ok((ContentType::CSV, payments_csv(&payments)))
}

#[get("/export/expenses.csv?<from>&<to>")]
pub async fn api_export_expenses(
    from: Option<&str>,
    to: Option<&str>,
    store: &State<SharedStore>,
) -> CsvResult {
    let from = parse_optional_date("from", from)?;
    let to = parse_optional_date("to", to)?;
    let expenses = store.read().await.list_expenses(from, to);
    Ok((ContentType::CSV, expenses_csv(&expenses)))
}

#[catch(default)]
pub fn api_default_catcher(status: Status, _request: &Request) -> ApiError {
    status.to_validation_response()
}
