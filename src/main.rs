#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod env;
mod error;
mod export;
mod ids;
mod models;
mod seed;
mod stats;
mod store;
mod telemetry;
mod validation;
#[cfg(test)]
mod test;

use api::*;
use env::{AcademyConfig, load_environment};
use error::AppError;
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket, tokio};
use store::{SharedStore, Store, today};
use telemetry::{TelemetryFairing, init_tracing, shutdown_telemetry};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

fn build_store(config: &AcademyConfig) -> Result<Store, Error> {
    let (store, admin) = if config.seed_demo_data {
        seed::demo_store(config)?
    } else {
        info!("Starting with an empty academy");
        let mut store = Store::new(config.bcrypt_cost);
        let admin = store.add_user(models::NewUser {
            email: config.admin_email.clone(),
            role: auth::Role::Admin,
            first_name: "Academy".to_string(),
            last_name: "Admin".to_string(),
            phone: None,
            password: config.admin_password.clone(),
        })?;
        (store, admin)
    };

    if config.admin_password.is_none() {
        // Printed once so the operator can log in; never written to the log.
        println!(
            "Generated admin credentials: {} / {}",
            admin.email, admin.password
        );
    }

    Ok(store)
}

fn bootstrap() -> Result<(SharedStore, AcademyConfig), Error> {
    load_environment().map_err(|e| anyhow::anyhow!("Failed to load environment: {}", e))?;
    let config = AcademyConfig::from_env()?;
    let store = build_store(&config)?.into_shared();
    Ok((store, config))
}

fn spawn_overdue_sweep(store: SharedStore, every_secs: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        loop {
            let moved = store.write().await.mark_overdue_payments(today());
            if moved > 0 {
                info!("Marked {} payments as overdue", moved);
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(every_secs)).await;
        }
    });
}

#[launch]
async fn rocket() -> _ {
    init_tracing();

    let (store, config) = match bootstrap() {
        Ok(ready) => ready,
        Err(e) => {
            error!("Failed to start: {}", e);
            panic!("Startup failed: {}", e);
        }
    };

    spawn_overdue_sweep(store.clone(), config.overdue_sweep_secs);

    init_rocket(store, config).await
}

pub async fn init_rocket(store: SharedStore, config: AcademyConfig) -> Rocket<Build> {
    info!("Starting {}", config.academy_name);

    rocket::build()
        .manage(store)
        .manage(config)
        .mount(
            "/api",
            routes![
                api_list_users,
                api_create_user,
                api_update_user,
                api_set_user_active,
                api_reset_password,
                api_welcome_email,
                api_list_students,
                api_create_student,
                api_get_student,
                api_student_details,
                api_update_student,
                api_set_student_active,
                api_student_attendance,
                api_student_attendance_rate,
                api_student_evaluations,
                api_student_evaluation_averages,
                api_student_log,
                api_add_log_entry,
                api_parent_students,
                api_list_coaches,
                api_create_coach,
                api_get_coach,
                api_coach_stats,
                api_list_categories,
                api_get_category,
                api_create_category,
                api_update_category,
                api_assign_coach,
                api_list_schedules,
                api_create_schedule,
                api_delete_schedule,
                api_schedule_attendance,
                api_record_attendance,
                api_add_evaluation,
                api_list_payments,
                api_create_payment,
                api_update_payment_status,
                api_mark_overdue,
                api_payment_summary,
                api_list_expenses,
                api_create_expense,
                api_delete_expense,
                api_expense_summary,
                api_list_training_plans,
                api_create_training_plan,
                api_delete_training_plan,
                api_list_class_plans,
                api_create_class_plan,
                api_delete_class_plan,
                api_list_challenges,
                api_create_challenge,
                api_delete_challenge,
                api_list_tournaments,
                api_create_tournament,
                api_list_announcements,
                api_create_announcement,
                api_delete_announcement,
                api_dashboard,
                api_export_students,
                api_export_payments,
                api_export_expenses,
            ],
        )
        .register("/api", catchers![api_default_catcher])
        .mount("/api", routes![health])
        .attach(TelemetryFairing)
        .attach(AdHoc::on_shutdown("Telemetry shutdown", |_| {
            Box::pin(async { shutdown_telemetry() })
        }))
}
