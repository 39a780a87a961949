#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod db;
mod env;
mod error;
mod models;
mod routes;
mod telemetry;
mod validation;
#[cfg(test)]
mod test;

use api::{
    api_add_event, api_add_student, api_assign_student, api_attendance_stats, api_belt_videos,
    api_create_belt, api_create_class, api_delete_belt, api_delete_class, api_delete_event,
    api_get_user, api_list_belts, api_list_classes, api_list_events, api_list_students,
    api_login, api_logout, api_mark_attendance, api_me, api_promote_user, api_register,
    api_todays_attendance, api_unassign_student, api_upcoming_renewals, api_update_belt,
    api_update_user, health,
};
use auth::{forbidden_api, unauthorized_api};
use db::clean_expired_sessions;
use env::{Config, load_environment};
use rocket::{Build, Rocket, tokio};
use routes::{sensei_dashboard, student_dashboard};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use telemetry::{TelemetryFairing, init_tracing};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("{0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

async fn connect(config: &Config) -> Result<SqlitePool, Error> {
    let pool = SqlitePoolOptions::new()
        .connect(&config.database_url)
        .await?;

    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations completed successfully");

    Ok(pool)
}

fn spawn_session_cleanup(pool: SqlitePool) {
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        loop {
            match clean_expired_sessions(&pool).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Cleaned up {} expired sessions", count);
                    }
                }
                Err(e) => {
                    error!("Failed to clean expired sessions: {}", e);
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
        }
    });
}

#[launch]
async fn rocket() -> _ {
    if let Err(e) = load_environment() {
        eprintln!("Failed to load environment files: {}", e);
    }

    let otel_guard = init_tracing();
    let config = Config::from_env();

    let pool = match connect(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to prepare database: {}", e);
            panic!("Database setup failed: {}", e);
        }
    };

    spawn_session_cleanup(pool.clone());

    init_rocket(pool, config).await.manage(otel_guard)
}

pub async fn init_rocket(pool: SqlitePool, config: Config) -> Rocket<Build> {
    info!("Starting dojo manager");

    rocket::build()
        .manage(pool)
        .manage(config)
        .mount(
            "/api",
            routes![
                api_login,
                api_logout,
                api_register,
                api_me,
                api_list_belts,
                api_create_belt,
                api_update_belt,
                api_delete_belt,
                api_belt_videos,
                api_list_students,
                api_add_student,
                api_get_user,
                api_update_user,
                api_promote_user,
                api_mark_attendance,
                api_attendance_stats,
                api_todays_attendance,
                api_upcoming_renewals,
                api_list_classes,
                api_create_class,
                api_delete_class,
                api_assign_student,
                api_unassign_student,
                api_list_events,
                api_add_event,
                api_delete_event,
            ],
        )
        .mount("/api", routes![health])
        .mount("/", routes![student_dashboard, sensei_dashboard])
        .register("/api", catchers![unauthorized_api, forbidden_api])
        .attach(TelemetryFairing)
}
