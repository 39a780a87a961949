use chrono::Local;
use rocket::{Responder, State};
use rocket::http::uri::Origin;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use serde::Serialize;
use sqlx::{Pool, Sqlite};

use crate::auth::{PageAccess, User, page_access};
use crate::db::{
    attendance_count, list_belts, list_classes, list_events, list_students, todays_attendance,
    upcoming_renewals, videos_for_belt,
};
use crate::error::AppError;
use crate::models::{
    AttendanceEntry, Belt, DojoClass, Event, UpcomingRenewal, Video, belt_progress,
};
use crate::validation::{ApiError, ToValidationResponse};

const LOGIN_PAGE: &str = "/login";

#[derive(Responder)]
pub enum PageError {
    Redirect(Redirect),
    Api(ApiError),
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError::Api(err.to_validation_response())
    }
}

type PageResult<T> = Result<Json<T>, PageError>;

/// Resolves page access for the requested path, handing back the user when allowed.
fn admit(origin: &Origin<'_>, user: Option<User>) -> Result<User, PageError> {
    let role = user.as_ref().map(|u| u.role);
    match (page_access(origin.path().as_str(), role), user) {
        (PageAccess::Allow, Some(user)) => Ok(user),
        _ => Err(PageError::Redirect(Redirect::to(LOGIN_PAGE))),
    }
}

#[derive(Serialize)]
pub struct StudentDashboard {
    pub user: User,
    pub current_belt: Option<Belt>,
    pub belts: Vec<Belt>,
    pub progress: f64,
    pub videos: Vec<Video>,
    pub events: Vec<Event>,
    pub attendance_total: i64,
}

#[get("/student")]
pub async fn student_dashboard(
    origin: &Origin<'_>,
    user: Option<User>,
    db: &State<Pool<Sqlite>>,
) -> PageResult<StudentDashboard> {
    let user = admit(origin, user)?;

    let belts = list_belts(db).await?;
    let current_belt = belts
        .iter()
        .find(|belt| belt.id == user.current_belt_id)
        .cloned();
    let progress = belt_progress(&belts, &user.current_belt_id);
    let videos = videos_for_belt(db, &user.current_belt_id).await?;
    let events = list_events(db).await?;
    let attendance_total = attendance_count(db, user.id).await?;

    Ok(Json(StudentDashboard {
        user,
        current_belt,
        belts,
        progress,
        videos,
        events,
        attendance_total,
    }))
}

#[derive(Serialize)]
pub struct SenseiDashboard {
    pub user: User,
    pub students: Vec<User>,
    pub belts: Vec<Belt>,
    pub events: Vec<Event>,
    pub renewals: Vec<UpcomingRenewal>,
    pub todays_attendance: Vec<AttendanceEntry>,
    pub classes: Vec<DojoClass>,
}

#[get("/sensei?<search>&<belt>")]
pub async fn sensei_dashboard(
    search: Option<&str>,
    belt: Option<&str>,
    origin: &Origin<'_>,
    user: Option<User>,
    db: &State<Pool<Sqlite>>,
) -> PageResult<SenseiDashboard> {
    let user = admit(origin, user)?;

    let students = list_students(db, search, belt).await?;
    let belts = list_belts(db).await?;
    let events = list_events(db).await?;
    let renewals = upcoming_renewals(db, Local::now().date_naive()).await?;
    let todays_attendance = todays_attendance(db).await?;
    let classes = list_classes(db).await?;

    Ok(Json(SenseiDashboard {
        user,
        students,
        belts,
        events,
        renewals,
        todays_attendance,
        classes,
    }))
}
