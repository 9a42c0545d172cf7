//! Demo academy used when `ACADEMY_SEED_DEMO_DATA` is on.
//!
//! Everything goes through the regular store operations, so seeded data obeys
//! the same integrity rules as data created at runtime.

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::auth::Role;
use crate::env::AcademyConfig;
use crate::error::AppError;
use crate::models::{
    AgeRange, DifficultyLevels, Exercise, ExpenseCategory, Frequency, LogEntryKind,
    NewAnnouncement, NewAttendance, NewCategory, NewChallengeParameter, NewClassPlan, NewCoach,
    NewEvaluation, NewExpense, NewLogEntry, NewParent, NewPayment, NewSchedule, NewStudent,
    Credentials, NewTournament, NewTrainingPlan, NewUser, ParentLink, PaymentMethod,
    PaymentStatus, PlanSection,
};
use crate::store::Store;

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, AppError> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| AppError::Internal(format!("Invalid seed date {}-{}-{}", y, m, d)))
}

fn euros(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn category(
    id: &str,
    name: &str,
    description: &str,
    ages: (u32, u32),
    max_students: u32,
    fee_cents: i64,
) -> NewCategory {
    NewCategory {
        id: Some(id.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        age_range: AgeRange {
            min: ages.0,
            max: ages.1,
        },
        max_students,
        monthly_fee: euros(fee_cents),
        coach_id: None,
    }
}

fn coach(
    first_name: &str,
    last_name: &str,
    experience: Option<u32>,
    specialization: &[&str],
    categories: &[&str],
) -> NewCoach {
    NewCoach {
        email: format!(
            "{}.{}@academy.local",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        phone: None,
        specialization: specialization.iter().map(|s| s.to_string()).collect(),
        experience,
        certifications: vec!["Level 1 coaching licence".to_string()],
        assigned_categories: categories.iter().map(|c| c.to_string()).collect(),
        bio: None,
    }
}

fn student(
    first_name: &str,
    last_name: &str,
    date_of_birth: NaiveDate,
    category_id: &str,
    parent: ParentLink,
    enrollment_date: NaiveDate,
) -> NewStudent {
    NewStudent {
        email: format!(
            "{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        phone: None,
        date_of_birth,
        category_id: category_id.to_string(),
        parent,
        enrollment_date: Some(enrollment_date),
        medical_notes: None,
        emergency_contact: None,
    }
}

fn new_parent(first_name: &str, last_name: &str, phone: &str) -> ParentLink {
    ParentLink::New(NewParent {
        email: format!(
            "{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        phone: Some(phone.to_string()),
    })
}

fn schedule(
    category_id: &str,
    coach_id: &str,
    day_of_week: Weekday,
    times: (&str, &str),
) -> NewSchedule {
    NewSchedule {
        category_id: category_id.to_string(),
        coach_id: coach_id.to_string(),
        day_of_week,
        start_time: times.0.to_string(),
        end_time: times.1.to_string(),
        location: "Main court".to_string(),
    }
}

fn attendance(
    student_id: &str,
    schedule_id: &str,
    on: NaiveDate,
    present: bool,
    checked_by: &str,
) -> NewAttendance {
    NewAttendance {
        student_id: student_id.to_string(),
        schedule_id: schedule_id.to_string(),
        date: on,
        present,
        checked_by: checked_by.to_string(),
        notes: None,
    }
}

fn payment(
    student_id: &str,
    fee_cents: i64,
    concept: &str,
    due_date: NaiveDate,
    status: PaymentStatus,
    method: PaymentMethod,
) -> NewPayment {
    NewPayment {
        student_id: student_id.to_string(),
        amount: euros(fee_cents),
        concept: concept.to_string(),
        due_date,
        status: Some(status),
        paid_on: None,
        method,
    }
}

fn section(description: &str, duration_minutes: u32) -> PlanSection {
    PlanSection {
        description: description.to_string(),
        duration_minutes,
    }
}

fn exercise(name: &str, description: &str, duration_minutes: u32) -> Exercise {
    Exercise {
        name: name.to_string(),
        description: description.to_string(),
        duration_minutes,
    }
}

/// Returns the seeded store along with the admin's credentials, whose password
/// is generated when none is configured.
#[instrument(skip_all)]
pub fn demo_store(config: &AcademyConfig) -> Result<(Store, Credentials), AppError> {
    info!("Seeding demo academy");
    let mut store = Store::new(config.bcrypt_cost);

    let admin = store.add_user(NewUser {
        email: config.admin_email.clone(),
        role: Role::Admin,
        first_name: "Academy".to_string(),
        last_name: "Admin".to_string(),
        phone: None,
        password: config.admin_password.clone(),
    })?;

    for new_category in [
        category("cat_mini", "Mini Voley", "First contact with the ball", (6, 8), 16, 3500),
        category("cat_infantil", "Infantil", "Fundamentals and game sense", (8, 12), 20, 4500),
        category("cat_cadete", "Cadete", "Positions and systems", (13, 15), 18, 5000),
        category("cat_juvenil", "Juvenil", "Competitive team", (16, 18), 18, 5500),
    ] {
        store.add_category(new_category)?;
    }

    let laura = store
        .add_new_coach(coach(
            "Laura",
            "Martinez",
            Some(8),
            &["setting", "attack"],
            &["cat_mini", "cat_infantil"],
        ))?
        .coach_id;
    let diego = store
        .add_new_coach(coach(
            "Diego",
            "Fernandez",
            Some(12),
            &["reception", "defense"],
            &["cat_cadete"],
        ))?
        .coach_id;
    let sofia = store
        .add_new_coach(coach(
            "Sofia",
            "Ramirez",
            None,
            &["physical conditioning"],
            &["cat_juvenil"],
        ))?
        .coach_id;

    let september = date(2024, 9, 2)?;

    let lucia = store.add_new_student(student(
        "Lucia",
        "Garcia",
        date(2013, 3, 14)?,
        "cat_infantil",
        new_parent("Carmen", "Garcia", "+34 600 111 222"),
        september,
    ))?;
    let pablo = store.add_new_student(student(
        "Pablo",
        "Garcia",
        date(2016, 7, 2)?,
        "cat_mini",
        ParentLink::Existing {
            parent_id: lucia.parent_id.clone(),
        },
        september,
    ))?;
    let martina = store.add_new_student(student(
        "Martina",
        "Lopez",
        date(2010, 5, 21)?,
        "cat_cadete",
        new_parent("Javier", "Lopez", "+34 600 333 444"),
        date(2024, 9, 9)?,
    ))?;
    let hugo = store.add_new_student(student(
        "Hugo",
        "Sanchez",
        date(2007, 11, 30)?,
        "cat_juvenil",
        new_parent("Elena", "Sanchez", "+34 600 555 666"),
        date(2024, 9, 9)?,
    ))?;
    let valeria = store.add_new_student(student(
        "Valeria",
        "Torres",
        date(2012, 1, 10)?,
        "cat_infantil",
        new_parent("Andres", "Torres", "+34 600 777 888"),
        date(2024, 9, 16)?,
    ))?;

    let infantil_mon = store
        .add_schedule(schedule("cat_infantil", &laura, Weekday::Mon, ("17:00", "18:30")))?
        .id;
    let infantil_wed = store
        .add_schedule(schedule("cat_infantil", &laura, Weekday::Wed, ("17:00", "18:30")))?
        .id;
    let mini_tue = store
        .add_schedule(schedule("cat_mini", &laura, Weekday::Tue, ("17:00", "18:00")))?
        .id;
    let cadete_tue = store
        .add_schedule(schedule("cat_cadete", &diego, Weekday::Tue, ("18:30", "20:00")))?
        .id;
    let juvenil_thu = store
        .add_schedule(schedule("cat_juvenil", &sofia, Weekday::Thu, ("19:00", "20:30")))?
        .id;

    for record in [
        attendance(&lucia.student_id, &infantil_mon, date(2024, 10, 7)?, true, &laura),
        attendance(&lucia.student_id, &infantil_wed, date(2024, 10, 9)?, true, &laura),
        attendance(&lucia.student_id, &infantil_mon, date(2024, 10, 14)?, false, &laura),
        attendance(&valeria.student_id, &infantil_mon, date(2024, 10, 7)?, true, &laura),
        attendance(&valeria.student_id, &infantil_wed, date(2024, 10, 9)?, false, &laura),
        attendance(&pablo.student_id, &mini_tue, date(2024, 10, 8)?, true, &laura),
        attendance(&martina.student_id, &cadete_tue, date(2024, 10, 8)?, true, &diego),
        attendance(&hugo.student_id, &juvenil_thu, date(2024, 10, 10)?, true, &sofia),
    ] {
        store.record_attendance(record)?;
    }

    let october = date(2024, 10, 5)?;
    for new_payment in [
        payment(&lucia.student_id, 4500, "October fee", october, PaymentStatus::Paid, PaymentMethod::Card),
        payment(&lucia.student_id, 4500, "November fee", date(2024, 11, 5)?, PaymentStatus::Pending, PaymentMethod::Card),
        payment(&pablo.student_id, 3500, "October fee", october, PaymentStatus::Completed, PaymentMethod::Transfer),
        payment(&martina.student_id, 5000, "October fee", october, PaymentStatus::Overdue, PaymentMethod::Cash),
        payment(&hugo.student_id, 5500, "October fee", october, PaymentStatus::Pending, PaymentMethod::Transfer),
        payment(&valeria.student_id, 4500, "October fee", october, PaymentStatus::Paid, PaymentMethod::Cash),
    ] {
        store.add_payment(new_payment)?;
    }

    for new_expense in [
        NewExpense {
            description: "Match balls (x12)".to_string(),
            amount: euros(24000),
            category: ExpenseCategory::Equipment,
            payment_method: PaymentMethod::Card,
            date: date(2024, 9, 10)?,
            recurring: false,
            frequency: None,
        },
        NewExpense {
            description: "Court rental".to_string(),
            amount: euros(60000),
            category: ExpenseCategory::Facilities,
            payment_method: PaymentMethod::Transfer,
            date: date(2024, 9, 1)?,
            recurring: true,
            frequency: Some(Frequency::Monthly),
        },
        NewExpense {
            description: "Federation insurance".to_string(),
            amount: euros(120000),
            category: ExpenseCategory::Other,
            payment_method: PaymentMethod::Transfer,
            date: date(2024, 9, 1)?,
            recurring: true,
            frequency: Some(Frequency::Yearly),
        },
        NewExpense {
            description: "Van to regional tournament".to_string(),
            amount: euros(18000),
            category: ExpenseCategory::Transport,
            payment_method: PaymentMethod::Cash,
            date: date(2024, 10, 19)?,
            recurring: false,
            frequency: None,
        },
    ] {
        store.add_expense(new_expense)?;
    }

    store.add_evaluation(NewEvaluation {
        student_id: lucia.student_id.clone(),
        coach_id: laura.clone(),
        date: date(2024, 10, 15)?,
        technical: 7,
        physical: 8,
        mental: 9,
        comments: Some("Reads the game well, keep working on the float serve".to_string()),
    })?;
    store.add_evaluation(NewEvaluation {
        student_id: martina.student_id.clone(),
        coach_id: diego.clone(),
        date: date(2024, 10, 16)?,
        technical: 6,
        physical: 7,
        mental: 8,
        comments: None,
    })?;

    store.add_training_plan(NewTrainingPlan {
        category_id: "cat_infantil".to_string(),
        coach_id: laura.clone(),
        title: "Autumn fundamentals".to_string(),
        objectives: vec![
            "Consistent underhand and float serve".to_string(),
            "Forearm pass to target".to_string(),
        ],
        start_date: september,
        end_date: date(2024, 12, 20)?,
        exercises: vec![
            exercise("Serve reception drill", "Three receivers, rotating server", 20),
            exercise("Setting in pairs", "Overhead passes over the net", 15),
            exercise("Scrimmage", "Six on six, coach feeds the ball", 30),
        ],
    })?;

    store.add_class_plan(NewClassPlan {
        category: "Infantil".to_string(),
        coach_id: laura.clone(),
        date: date(2024, 10, 14)?,
        title: "Reception basics".to_string(),
        warm_up: section("Jog, dynamic stretching, ball handling", 10),
        main: section("Platform position and passing to the setter", 60),
        cool_down: section("Static stretching and review", 10),
        materials: vec!["Balls".to_string(), "Cones".to_string()],
        notes: None,
    })?;

    for new_challenge in [
        NewChallengeParameter {
            skill: "serve".to_string(),
            name: "Target serving".to_string(),
            description: "Ten serves at the opposite court".to_string(),
            difficulty_levels: DifficultyLevels {
                beginner: "5 of 10 serves in".to_string(),
                intermediate: "7 of 10 serves into the called half".to_string(),
                advanced: "8 of 10 serves into the called zone".to_string(),
            },
        },
        NewChallengeParameter {
            skill: "reception".to_string(),
            name: "Pass to target".to_string(),
            description: "Receive ten serves and pass to zone 3".to_string(),
            difficulty_levels: DifficultyLevels {
                beginner: "4 of 10 passes playable".to_string(),
                intermediate: "6 of 10 passes to zone 3".to_string(),
                advanced: "8 of 10 passes to zone 3".to_string(),
            },
        },
    ] {
        store.add_challenge_parameter(new_challenge)?;
    }

    store.add_tournament(NewTournament {
        name: "Autumn Cup".to_string(),
        date: date(2024, 11, 16)?,
        location: "Municipal Sports Center".to_string(),
        category_ids: vec!["cat_infantil".to_string(), "cat_cadete".to_string()],
        status: None,
    })?;

    store.add_announcement(NewAnnouncement {
        title: "Season kickoff".to_string(),
        content: "Training starts on Monday 2 September.".to_string(),
        published_on: date(2024, 9, 1)?,
        author_id: admin.user_id.clone(),
        audience: Vec::new(),
    })?;
    store.add_announcement(NewAnnouncement {
        title: "Infantil: Wednesday session moved".to_string(),
        content: "Wednesday training moves to court 2 until further notice.".to_string(),
        published_on: date(2024, 10, 1)?,
        author_id: laura.clone(),
        audience: vec![Role::Parent, Role::Student],
    })?;

    store.add_log_entry(
        &lucia.student_id,
        NewLogEntry {
            date: date(2024, 10, 12)?,
            kind: LogEntryKind::Achievement,
            title: "First ace in a match".to_string(),
            description: String::new(),
            created_by: laura.clone(),
        },
    )?;
    store.add_log_entry(
        &martina.student_id,
        NewLogEntry {
            date: date(2024, 10, 16)?,
            kind: LogEntryKind::Progress,
            title: "Moved to outside hitter".to_string(),
            description: "Approach footwork is now consistent".to_string(),
            created_by: diego,
        },
    )?;

    info!(
        users = store.users().len(),
        students = store.students().len(),
        coaches = store.coaches().len(),
        categories = store.categories().len(),
        schedules = store.schedules().len(),
        attendance = store.attendances().len(),
        evaluations = store.evaluations().len(),
        "Demo academy seeded"
    );

    Ok((store, admin))
}
