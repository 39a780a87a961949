use chrono::{Local, NaiveDate};
use rocket::State;
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::serde::json::{self, Json};
use rocket::serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::info;
use validator::Validate;

use crate::auth::{Permission, Role, SESSION_COOKIE, USER_ID_COOKIE, USER_ROLE_COOKIE, User};
use crate::db::{
    assign_student_to_class, attendance_count, authenticate_user, create_belt, create_class,
    create_event, create_user, create_user_session, delete_belt, delete_class, delete_event,
    get_user, invalidate_session, list_belts, list_classes, list_events, list_students,
    lowest_belt, mark_attendance, todays_attendance, unassign_student_from_class,
    upcoming_renewals, update_belt, update_user, update_user_belt, videos_for_belt,
};
use crate::env::Config;
use crate::error::AppError;
use crate::models::{
    Attendance, AttendanceEntry, Belt, BeltUpdate, CheckInOutcome, ContractRenewal, DayOfWeek,
    DojoClass, Event, NewUser, UpcomingRenewal, UserUpdate, Video, parse_class_time,
};
use crate::validation::{ApiResult, JsonValidateExt};

type Body<'r, T> = Result<Json<T>, json::Error<'r>>;

// Authentication

#[derive(Deserialize, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: Option<UserData>,
    pub error: Option<String>,
    pub redirect_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserData {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub current_belt_id: String,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
            current_belt_id: user.current_belt_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ActionResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl ActionResponse {
    fn ok() -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
        })
    }
}

fn session_cookie(name: &'static str, value: String, config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, value))
        .same_site(SameSite::Lax)
        .http_only(true)
        .max_age(rocket::time::Duration::hours(config.session_hours))
        .build();
    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

fn removal_cookie(name: &'static str, config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::from(name);
    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

fn landing_page(role: Role) -> &'static str {
    match role {
        Role::Sensei => "/sensei",
        Role::Student => "/student",
    }
}

/// Opens a session for `user` and hands the token back in private cookies.
async fn start_session(
    db: &Pool<Sqlite>,
    config: &Config,
    cookies: &CookieJar<'_>,
    user: &User,
) -> Result<(), AppError> {
    let session = create_user_session(db, user.id, config.session_hours).await?;

    cookies.add_private(session_cookie(SESSION_COOKIE, session.token, config));
    cookies.add_private(session_cookie(USER_ID_COOKIE, user.id.to_string(), config));
    cookies.add_private(session_cookie(
        USER_ROLE_COOKIE,
        user.role.to_string(),
        config,
    ));

    Ok(())
}

fn logged_in(user: User) -> Json<LoginResponse> {
    let redirect_url = landing_page(user.role).to_string();
    Json(LoginResponse {
        success: true,
        user: Some(UserData::from(user)),
        error: None,
        redirect_url: Some(redirect_url),
    })
}

#[post("/login", data = "<login>")]
pub async fn api_login(
    login: Body<'_, LoginRequest>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    config: &State<Config>,
) -> ApiResult<Json<LoginResponse>> {
    let validated = login.validate_custom()?;

    match authenticate_user(db, &validated.email, &validated.password).await? {
        Some(user) => {
            start_session(db, config, cookies, &user).await?;
            info!(user_id = user.id, "User logged in");
            Ok(logged_in(user))
        }
        None => Ok(Json(LoginResponse {
            success: false,
            user: None,
            error: Some("Invalid email or password".to_string()),
            redirect_url: None,
        })),
    }
}

#[post("/logout")]
pub async fn api_logout(
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    config: &State<Config>,
) -> Json<ActionResponse> {
    let token = cookies
        .get_private(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());

    if let Some(token) = token {
        if let Err(err) = invalidate_session(db, &token).await {
            err.log_and_record("Logout");
        }
    }

    for name in [SESSION_COOKIE, USER_ID_COOKIE, USER_ROLE_COOKIE] {
        cookies.remove_private(removal_cookie(name, config));
    }

    ActionResponse::ok()
}

#[derive(Deserialize, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Self-service sign up: a student at the lowest belt, logged in straight away.
#[post("/register", data = "<registration>")]
pub async fn api_register(
    registration: Body<'_, RegisterRequest>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    config: &State<Config>,
) -> ApiResult<Json<LoginResponse>> {
    let validated = registration.validate_custom()?;

    let belt = lowest_belt(db).await?;
    let mut new_user = NewUser::student(&validated.name, &validated.email, &belt.id);
    new_user.password = Some(validated.password);

    let user = create_user(db, &new_user).await?;
    start_session(db, config, cookies, &user).await?;
    info!(user_id = user.id, "User registered");

    Ok(logged_in(user))
}

#[get("/me")]
pub async fn api_me(user: User) -> Json<User> {
    Json(user)
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

// Belts

#[get("/belts")]
pub async fn api_list_belts(_user: User, db: &State<Pool<Sqlite>>) -> ApiResult<Json<Vec<Belt>>> {
    Ok(Json(list_belts(db).await?))
}

#[derive(Deserialize, Serialize, Validate)]
pub struct CreateBeltRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 32, message = "Color is required"))]
    pub color: String,
    pub order: i64,
}

#[post("/belts", data = "<belt>")]
pub async fn api_create_belt(
    belt: Body<'_, CreateBeltRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Belt>> {
    user.require_permission(Permission::ManageBelts)?;
    let validated = belt.validate_custom()?;

    let belt = create_belt(db, &validated.name, &validated.color, validated.order).await?;
    Ok(Json(belt))
}

#[derive(Deserialize, Serialize, Validate, Default)]
pub struct UpdateBeltRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32, message = "Color cannot be blank"))]
    pub color: Option<String>,
    pub order: Option<i64>,
}

#[put("/belts/<id>", data = "<belt>")]
pub async fn api_update_belt(
    id: &str,
    belt: Body<'_, UpdateBeltRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Belt>> {
    user.require_permission(Permission::ManageBelts)?;
    let validated = belt.validate_custom()?;

    let update = BeltUpdate {
        name: validated.name,
        color: validated.color,
        order: validated.order,
    };
    Ok(Json(update_belt(db, id, &update).await?))
}

#[delete("/belts/<id>")]
pub async fn api_delete_belt(
    id: &str,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<ActionResponse>> {
    user.require_permission(Permission::ManageBelts)?;

    delete_belt(db, id).await?;
    Ok(ActionResponse::ok())
}

#[get("/belts/<id>/videos")]
pub async fn api_belt_videos(
    id: &str,
    _user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<Video>>> {
    Ok(Json(videos_for_belt(db, id).await?))
}

// Students and users

#[get("/students?<search>&<belt>")]
pub async fn api_list_students(
    search: Option<&str>,
    belt: Option<&str>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<User>>> {
    user.require_permission(Permission::ViewAllStudents)?;

    Ok(Json(list_students(db, search, belt).await?))
}

#[derive(Deserialize, Serialize, Validate)]
pub struct AddStudentRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_renewal: Option<ContractRenewal>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub sensei_notes: Option<String>,
    #[validate(length(max = 500, message = "Address is too long"))]
    pub address: Option<String>,
    pub signed_contract: Option<String>,
}

#[post("/students", data = "<student>")]
pub async fn api_add_student(
    student: Body<'_, AddStudentRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<User>> {
    user.require_permission(Permission::ManageStudents)?;
    let validated = student.validate_custom()?;

    let belt = lowest_belt(db).await?;
    let new_user = NewUser {
        name: validated.name,
        email: validated.email,
        role: Role::Student,
        current_belt_id: belt.id,
        password: validated.password,
        start_date: validated.start_date,
        contract_start_date: validated.contract_start_date,
        contract_renewal: validated.contract_renewal,
        sensei_notes: validated.sensei_notes,
        address: validated.address,
        signed_contract: validated.signed_contract,
    };

    Ok(Json(create_user(db, &new_user).await?))
}

#[get("/users/<id>")]
pub async fn api_get_user(id: i64, user: User, db: &State<Pool<Sqlite>>) -> ApiResult<Json<User>> {
    user.require_self_or(id, Permission::ViewOwnProfile, Permission::ViewAllStudents)?;

    Ok(Json(get_user(db, id).await?))
}

/// Profile fields an instructor may edit. `role` is deliberately absent.
#[derive(Deserialize, Serialize, Validate, Default)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_renewal: Option<ContractRenewal>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub sensei_notes: Option<String>,
    #[validate(length(max = 500, message = "Address is too long"))]
    pub address: Option<String>,
    pub signed_contract: Option<String>,
}

#[put("/users/<id>", data = "<profile>")]
pub async fn api_update_user(
    id: i64,
    profile: Body<'_, UpdateUserRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<User>> {
    user.require_permission(Permission::ManageStudents)?;
    let validated = profile.validate_custom()?;

    let update = UserUpdate {
        name: validated.name,
        email: validated.email,
        password: validated.password,
        start_date: validated.start_date,
        contract_start_date: validated.contract_start_date,
        contract_renewal: validated.contract_renewal,
        sensei_notes: validated.sensei_notes,
        address: validated.address,
        signed_contract: validated.signed_contract,
    };

    Ok(Json(update_user(db, id, &update).await?))
}

#[derive(Deserialize, Serialize, Validate)]
pub struct PromoteRequest {
    #[validate(length(min = 1, message = "Belt is required"))]
    pub belt_id: String,
}

#[put("/users/<id>/belt", data = "<promotion>")]
pub async fn api_promote_user(
    id: i64,
    promotion: Body<'_, PromoteRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<User>> {
    user.require_permission(Permission::PromoteStudents)?;
    let validated = promotion.validate_custom()?;

    let promoted = update_user_belt(db, id, &validated.belt_id).await?;
    info!(user_id = id, belt_id = %promoted.current_belt_id, "User promoted");
    Ok(Json(promoted))
}

// Attendance

#[derive(Deserialize, Serialize, Validate, Default)]
pub struct CheckInRequest {
    #[validate(length(max = 500, message = "Notes are too long"))]
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CheckInResponse {
    pub success: bool,
    pub message: String,
    pub attendance: Option<Attendance>,
}

#[post("/users/<id>/attendance", data = "<check_in>")]
pub async fn api_mark_attendance(
    id: i64,
    check_in: Body<'_, CheckInRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<CheckInResponse>> {
    user.require_self_or(id, Permission::CheckInSelf, Permission::CheckInOthers)?;
    let validated = check_in.validate_custom()?;

    let response = match mark_attendance(db, id, validated.notes.as_deref()).await? {
        CheckInOutcome::CheckedIn(attendance) => CheckInResponse {
            success: true,
            message: "Checked in".to_string(),
            attendance: Some(attendance),
        },
        CheckInOutcome::AlreadyCheckedIn => CheckInResponse {
            success: false,
            message: "Student already checked in today.".to_string(),
            attendance: None,
        },
    };

    Ok(Json(response))
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AttendanceStats {
    pub user_id: i64,
    pub total: i64,
}

#[get("/users/<id>/attendance")]
pub async fn api_attendance_stats(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<AttendanceStats>> {
    user.require_self_or(id, Permission::ViewOwnAttendance, Permission::ViewAllAttendance)?;

    get_user(db, id).await?;
    let total = attendance_count(db, id).await?;
    Ok(Json(AttendanceStats { user_id: id, total }))
}

#[get("/attendance/today")]
pub async fn api_todays_attendance(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<AttendanceEntry>>> {
    user.require_permission(Permission::ViewAllAttendance)?;

    Ok(Json(todays_attendance(db).await?))
}

#[get("/renewals")]
pub async fn api_upcoming_renewals(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<UpcomingRenewal>>> {
    user.require_permission(Permission::ViewAllStudents)?;

    Ok(Json(upcoming_renewals(db, Local::now().date_naive()).await?))
}

// Classes

#[get("/classes")]
pub async fn api_list_classes(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<DojoClass>>> {
    user.require_permission(Permission::ViewSchedule)?;

    Ok(Json(list_classes(db).await?))
}

#[derive(Deserialize, Serialize, Validate)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Day is required"))]
    pub day: String,
    #[validate(length(min = 1, message = "Time is required"))]
    pub time: String,
    #[validate(range(min = 1, max = 600, message = "Duration must be 1-600 minutes"))]
    pub duration: Option<i64>,
}

#[post("/classes", data = "<class>")]
pub async fn api_create_class(
    class: Body<'_, CreateClassRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<DojoClass>> {
    user.require_permission(Permission::ManageClasses)?;
    let validated = class.validate_custom()?;

    let day = DayOfWeek::parse(&validated.day).ok_or_else(|| {
        AppError::Validation(format!("{} is not a day of the week", validated.day))
    })?;
    let time = parse_class_time(&validated.time)
        .ok_or_else(|| AppError::Validation("Time must be formatted HH:MM".to_string()))?;

    let class = create_class(
        db,
        &validated.name,
        day,
        &time,
        validated.duration.unwrap_or(60),
    )
    .await?;
    Ok(Json(class))
}

#[delete("/classes/<id>")]
pub async fn api_delete_class(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<ActionResponse>> {
    user.require_permission(Permission::ManageClasses)?;

    delete_class(db, id).await?;
    Ok(ActionResponse::ok())
}

#[put("/classes/<id>/students/<user_id>")]
pub async fn api_assign_student(
    id: i64,
    user_id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<DojoClass>> {
    user.require_permission(Permission::ManageClasses)?;

    Ok(Json(assign_student_to_class(db, id, user_id).await?))
}

#[delete("/classes/<id>/students/<user_id>")]
pub async fn api_unassign_student(
    id: i64,
    user_id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<DojoClass>> {
    user.require_permission(Permission::ManageClasses)?;

    Ok(Json(unassign_student_from_class(db, id, user_id).await?))
}

// Events

#[get("/events")]
pub async fn api_list_events(_user: User, db: &State<Pool<Sqlite>>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(list_events(db).await?))
}

#[derive(Deserialize, Serialize, Validate)]
pub struct AddEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub date: NaiveDate,
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: Option<String>,
}

#[post("/events", data = "<event>")]
pub async fn api_add_event(
    event: Body<'_, AddEventRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Event>> {
    user.require_permission(Permission::ManageEvents)?;
    let validated = event.validate_custom()?;

    let event = create_event(
        db,
        &validated.title,
        validated.date,
        validated.description.as_deref().unwrap_or_default(),
    )
    .await?;
    Ok(Json(event))
}

#[delete("/events/<id>")]
pub async fn api_delete_event(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<ActionResponse>> {
    user.require_permission(Permission::ManageEvents)?;

    delete_event(db, id).await?;
    Ok(ActionResponse::ok())
}
