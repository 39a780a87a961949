use std::collections::HashMap;

use crate::{
    auth::{
        DbUser, DbUserSession, PasswordCheck, StoredPassword, User, UserSession, hash_password,
    },
    error::AppError,
};
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument, warn};

use crate::models::{
    Attendance, AttendanceEntry, Belt, BeltUpdate, CheckInOutcome, ClassStudent, DayOfWeek,
    DbAttendance, DbAttendanceEntry, DbBelt, DbClassStudent, DbDojoClass, DbEvent, DojoClass,
    Event, NewUser, UpcomingRenewal, UserUpdate, Video, slugify,
};

const USER_COLUMNS: &str = "id, name, email, role, current_belt_id, start_date, \
     contract_start_date, contract_renewal, sensei_notes, address, signed_contract";

const RENEWAL_WINDOW_DAYS: i64 = 30;

// Belts

#[instrument]
pub async fn list_belts(pool: &Pool<Sqlite>) -> Result<Vec<Belt>, AppError> {
    info!("Listing belts");
    let rows = sqlx::query_as::<_, DbBelt>(
        "SELECT id, name, color, rank_order FROM belts ORDER BY rank_order, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Belt::from).collect())
}

#[instrument]
pub async fn get_belt(pool: &Pool<Sqlite>, belt_id: &str) -> Result<Belt, AppError> {
    info!("Fetching belt by ID");
    let row = sqlx::query_as::<_, DbBelt>(
        "SELECT id, name, color, rank_order FROM belts WHERE id = ?",
    )
    .bind(belt_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(belt) => Ok(Belt::from(belt)),
        _ => Err(AppError::NotFound(format!(
            "Belt with id {} not found in database",
            belt_id
        ))),
    }
}

/// The belt new registrations start at.
#[instrument]
pub async fn lowest_belt(pool: &Pool<Sqlite>) -> Result<Belt, AppError> {
    let row = sqlx::query_as::<_, DbBelt>(
        "SELECT id, name, color, rank_order FROM belts ORDER BY rank_order, id LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    row.map(Belt::from)
        .ok_or_else(|| AppError::NotFound("No belts have been defined".to_string()))
}

#[instrument]
pub async fn create_belt(
    pool: &Pool<Sqlite>,
    name: &str,
    color: &str,
    order: i64,
) -> Result<Belt, AppError> {
    let id = slugify(name);
    if id.is_empty() {
        return Err(AppError::Validation("Belt name cannot be blank".to_string()));
    }

    info!(belt_id = %id, "Creating belt");
    sqlx::query("INSERT INTO belts (id, name, color, rank_order) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(name.trim())
        .bind(color)
        .bind(order)
        .execute(pool)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, format!("Belt {} already exists", id)))?;

    get_belt(pool, &id).await
}

#[instrument]
pub async fn update_belt(
    pool: &Pool<Sqlite>,
    belt_id: &str,
    update: &BeltUpdate,
) -> Result<Belt, AppError> {
    info!("Updating belt");
    let current = get_belt(pool, belt_id).await?;

    let name = update.name.as_deref().map(str::trim).unwrap_or(&current.name);
    let color = update.color.as_deref().unwrap_or(&current.color);
    let order = update.order.unwrap_or(current.order);

    sqlx::query("UPDATE belts SET name = ?, color = ?, rank_order = ? WHERE id = ?")
        .bind(name)
        .bind(color)
        .bind(order)
        .bind(belt_id)
        .execute(pool)
        .await?;

    get_belt(pool, belt_id).await
}

#[instrument]
pub async fn count_users_with_belt(pool: &Pool<Sqlite>, belt_id: &str) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE current_belt_id = ?")
        .bind(belt_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Removes a belt nobody currently holds.
#[instrument]
pub async fn delete_belt(pool: &Pool<Sqlite>, belt_id: &str) -> Result<(), AppError> {
    info!("Deleting belt");
    get_belt(pool, belt_id).await?;

    let holders = count_users_with_belt(pool, belt_id).await?;
    if holders > 0 {
        warn!(holders, "Refusing to delete belt that is still held");
        return Err(AppError::Conflict(
            "Cannot delete belt with active students".to_string(),
        ));
    }

    // The foreign key still guards against a promotion landing in between.
    sqlx::query("DELETE FROM belts WHERE id = ?")
        .bind(belt_id)
        .execute(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict("Cannot delete belt with active students".to_string())
            }
            _ => AppError::Database(e),
        })?;

    Ok(())
}

#[instrument]
pub async fn videos_for_belt(pool: &Pool<Sqlite>, belt_id: &str) -> Result<Vec<Video>, AppError> {
    info!("Fetching videos for belt");
    let videos = sqlx::query_as::<_, Video>(
        "SELECT id, title, url, belt_id FROM videos WHERE belt_id = ? ORDER BY title",
    )
    .bind(belt_id)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}

// Users

#[instrument]
pub async fn get_user(pool: &Pool<Sqlite>, id: i64) -> Result<User, AppError> {
    info!("Fetching user by ID");
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    let row = sqlx::query_as::<_, DbUser>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(user) => Ok(User::from(user)),
        _ => Err(AppError::NotFound(format!(
            "User with id {} not found in database",
            id
        ))),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip_all, fields(email = %new_user.email, role = %new_user.role))]
pub async fn create_user(pool: &Pool<Sqlite>, new_user: &NewUser) -> Result<User, AppError> {
    info!("Creating user");
    get_belt(pool, &new_user.current_belt_id).await?;

    let password = match new_user.password.as_deref() {
        Some(password) if !password.is_empty() => hash_password(password)?,
        _ => String::new(),
    };

    let result = sqlx::query(
        "INSERT INTO users (name, email, role, current_belt_id, password, start_date,
                            contract_start_date, contract_renewal, sensei_notes, address,
                            signed_contract)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new_user.name.trim())
    .bind(normalize_email(&new_user.email))
    .bind(new_user.role.as_str())
    .bind(&new_user.current_belt_id)
    .bind(password)
    .bind(new_user.start_date)
    .bind(new_user.contract_start_date)
    .bind(new_user.contract_renewal.map(|renewal| renewal.as_str()))
    .bind(new_user.sensei_notes.as_deref())
    .bind(new_user.address.as_deref())
    .bind(new_user.signed_contract.as_deref())
    .execute(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Email is already registered"))?;

    get_user(pool, result.last_insert_rowid()).await
}

/// Makes `%`, `_` and `\` match themselves inside a LIKE pattern.
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Students only. `search` matches a substring of the name or email; `belt`
/// restricts to holders of that belt.
#[instrument]
pub async fn list_students(
    pool: &Pool<Sqlite>,
    search: Option<&str>,
    belt: Option<&str>,
) -> Result<Vec<User>, AppError> {
    info!("Listing students");
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)));
    let belt = belt.filter(|b| !b.is_empty() && *b != "all");

    let sql = format!(
        "SELECT {} FROM users
         WHERE role = 'student'
           AND (? IS NULL OR name LIKE ? ESCAPE '\\' OR email LIKE ? ESCAPE '\\')
           AND (? IS NULL OR current_belt_id = ?)
         ORDER BY name, id",
        USER_COLUMNS
    );
    let rows = sqlx::query_as::<_, DbUser>(&sql)
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .bind(belt)
        .bind(belt)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(User::from).collect())
}

#[instrument(skip(update))]
pub async fn update_user(
    pool: &Pool<Sqlite>,
    user_id: i64,
    update: &UserUpdate,
) -> Result<User, AppError> {
    info!("Updating user profile");
    let current = get_user(pool, user_id).await?;

    let name = update
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or(&current.name)
        .to_string();
    let email = update
        .email
        .as_deref()
        .map(normalize_email)
        .unwrap_or(current.email);
    let contract_renewal = update.contract_renewal.or(current.contract_renewal);

    sqlx::query(
        "UPDATE users
         SET name = ?, email = ?, start_date = ?, contract_start_date = ?,
             contract_renewal = ?, sensei_notes = ?, address = ?, signed_contract = ?
         WHERE id = ?",
    )
    .bind(name)
    .bind(email)
    .bind(update.start_date.or(current.start_date))
    .bind(update.contract_start_date.or(current.contract_start_date))
    .bind(contract_renewal.map(|renewal| renewal.as_str()))
    .bind(update.sensei_notes.clone().or(current.sensei_notes))
    .bind(update.address.clone().or(current.address))
    .bind(update.signed_contract.clone().or(current.signed_contract))
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Email is already registered"))?;

    if let Some(password) = update.password.as_deref().filter(|p| !p.is_empty()) {
        update_user_password(pool, user_id, password).await?;
    }

    get_user(pool, user_id).await
}

/// Moves a user onto another belt.
#[instrument]
pub async fn update_user_belt(
    pool: &Pool<Sqlite>,
    user_id: i64,
    belt_id: &str,
) -> Result<User, AppError> {
    info!("Promoting user");
    get_belt(pool, belt_id).await?;

    let result = sqlx::query("UPDATE users SET current_belt_id = ? WHERE id = ?")
        .bind(belt_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "User with id {} not found in database",
            user_id
        )));
    }

    get_user(pool, user_id).await
}

#[instrument(skip_all, fields(user_id = user_id))]
pub async fn update_user_password(
    pool: &Pool<Sqlite>,
    user_id: i64,
    new_password: &str,
) -> Result<(), AppError> {
    info!("Updating user password");
    let hashed_password = hash_password(new_password)?;

    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(hashed_password)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[derive(sqlx::FromRow)]
struct DbCredentials {
    id: Option<i64>,
    password: Option<String>,
}

/// Resolves a login. Unknown email and wrong password both come back as `None`.
///
/// A correct clear-text password is replaced with its hash before returning.
#[instrument(skip(password))]
pub async fn authenticate_user(
    pool: &Pool<Sqlite>,
    email: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, DbCredentials>("SELECT id, password FROM users WHERE email = ?")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

    let Some(DbCredentials {
        id: Some(user_id),
        password: stored,
    }) = row
    else {
        info!("Login attempt for unknown email");
        return Ok(None);
    };

    let stored = StoredPassword::parse(stored.as_deref().unwrap_or_default());
    match stored.check(password) {
        PasswordCheck::Match => {}
        PasswordCheck::MatchNeedsRehash => {
            info!(user_id, "Migrating clear-text password to bcrypt");
            update_user_password(pool, user_id, password).await?;
        }
        PasswordCheck::Mismatch => {
            info!(user_id, "Password mismatch");
            return Ok(None);
        }
    }

    Ok(Some(get_user(pool, user_id).await?))
}

/// Students whose next contract renewal falls within the coming 30 days,
/// soonest first.
#[instrument]
pub async fn upcoming_renewals(
    pool: &Pool<Sqlite>,
    today: NaiveDate,
) -> Result<Vec<UpcomingRenewal>, AppError> {
    info!("Computing upcoming renewals");
    let sql = format!(
        "SELECT {} FROM users
         WHERE role = 'student'
           AND contract_start_date IS NOT NULL
           AND contract_renewal IS NOT NULL",
        USER_COLUMNS
    );
    let rows = sqlx::query_as::<_, DbUser>(&sql).fetch_all(pool).await?;

    let mut renewals: Vec<UpcomingRenewal> = rows
        .into_iter()
        .map(User::from)
        .filter_map(|user| {
            let renewal = user.contract_renewal?;
            let start = user.contract_start_date?;
            let renewal_date = renewal.next_renewal(start, today)?;
            let days_until = (renewal_date - today).num_days();
            (0..=RENEWAL_WINDOW_DAYS)
                .contains(&days_until)
                .then(|| UpcomingRenewal {
                    user_id: user.id,
                    name: user.name,
                    email: user.email,
                    contract_renewal: renewal,
                    renewal_date,
                    days_until,
                })
        })
        .collect();

    renewals.sort_by(|a, b| {
        a.days_until
            .cmp(&b.days_until)
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(renewals)
}

// Sessions

#[instrument]
pub async fn create_user_session(
    pool: &Pool<Sqlite>,
    user_id: i64,
    duration_hours: i64,
) -> Result<UserSession, AppError> {
    info!("Creating user session");
    let token = UserSession::generate_token();
    let now = Utc::now().naive_utc();
    let expires_at = now + Duration::hours(duration_hours);

    sqlx::query(
        "INSERT INTO user_sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(&token)
    .bind(now)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(UserSession {
        user_id,
        token,
        expires_at,
    })
}

#[instrument(skip(token))]
pub async fn get_session_by_token(
    pool: &Pool<Sqlite>,
    token: &str,
) -> Result<UserSession, AppError> {
    let row = sqlx::query_as::<_, DbUserSession>(
        "SELECT user_id, token, expires_at FROM user_sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(session) => Ok(UserSession::from(session)),
        _ => Err(AppError::Authentication("Invalid session token".to_string())),
    }
}

#[instrument(skip(token))]
pub async fn invalidate_session(pool: &Pool<Sqlite>, token: &str) -> Result<(), AppError> {
    info!("Invalidating session");
    sqlx::query("DELETE FROM user_sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument]
pub async fn clean_expired_sessions(pool: &Pool<Sqlite>) -> Result<u64, AppError> {
    let now = Utc::now().naive_utc();

    let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// Classes

/// All classes with their rosters, in weekly order.
#[instrument]
pub async fn list_classes(pool: &Pool<Sqlite>) -> Result<Vec<DojoClass>, AppError> {
    info!("Listing classes");
    let rows = sqlx::query_as::<_, DbDojoClass>(
        "SELECT id, name, day, time, duration FROM classes",
    )
    .fetch_all(pool)
    .await?;

    let enrollments = sqlx::query_as::<_, DbClassStudent>(
        "SELECT cs.class_id, cs.user_id, u.name
         FROM class_students cs
         JOIN users u ON u.id = cs.user_id
         ORDER BY u.name, u.id",
    )
    .fetch_all(pool)
    .await?;

    let mut rosters: HashMap<i64, Vec<ClassStudent>> = HashMap::new();
    for row in enrollments {
        rosters
            .entry(row.class_id.unwrap_or_default())
            .or_default()
            .push(ClassStudent {
                id: row.user_id.unwrap_or_default(),
                name: row.name.unwrap_or_default(),
            });
    }

    let mut classes: Vec<DojoClass> = rows
        .into_iter()
        .map(|row| {
            let mut class = DojoClass::from(row);
            class.students = rosters.remove(&class.id).unwrap_or_default();
            class
        })
        .collect();

    classes.sort_by(|a, b| {
        (a.day, &a.time, a.id).cmp(&(b.day, &b.time, b.id))
    });

    Ok(classes)
}

#[instrument]
pub async fn get_class(pool: &Pool<Sqlite>, class_id: i64) -> Result<DojoClass, AppError> {
    let row = sqlx::query_as::<_, DbDojoClass>(
        "SELECT id, name, day, time, duration FROM classes WHERE id = ?",
    )
    .bind(class_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Err(AppError::NotFound(format!(
            "Class with id {} not found in database",
            class_id
        )));
    };

    let students = sqlx::query_as::<_, DbClassStudent>(
        "SELECT cs.class_id, cs.user_id, u.name
         FROM class_students cs
         JOIN users u ON u.id = cs.user_id
         WHERE cs.class_id = ?
         ORDER BY u.name, u.id",
    )
    .bind(class_id)
    .fetch_all(pool)
    .await?;

    let mut class = DojoClass::from(row);
    class.students = students
        .into_iter()
        .map(|s| ClassStudent {
            id: s.user_id.unwrap_or_default(),
            name: s.name.unwrap_or_default(),
        })
        .collect();

    Ok(class)
}

#[instrument]
pub async fn create_class(
    pool: &Pool<Sqlite>,
    name: &str,
    day: DayOfWeek,
    time: &str,
    duration: i64,
) -> Result<DojoClass, AppError> {
    info!("Creating class");
    let result =
        sqlx::query("INSERT INTO classes (name, day, time, duration) VALUES (?, ?, ?, ?)")
            .bind(name.trim())
            .bind(day.as_str())
            .bind(time)
            .bind(duration)
            .execute(pool)
            .await?;

    get_class(pool, result.last_insert_rowid()).await
}

/// Deleting a class drops its roster with it.
#[instrument]
pub async fn delete_class(pool: &Pool<Sqlite>, class_id: i64) -> Result<(), AppError> {
    info!("Deleting class");
    let result = sqlx::query("DELETE FROM classes WHERE id = ?")
        .bind(class_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Class with id {} not found in database",
            class_id
        )));
    }

    Ok(())
}

#[instrument]
pub async fn assign_student_to_class(
    pool: &Pool<Sqlite>,
    class_id: i64,
    user_id: i64,
) -> Result<DojoClass, AppError> {
    info!("Assigning student to class");
    get_class(pool, class_id).await?;
    get_user(pool, user_id).await?;

    sqlx::query(
        "INSERT INTO class_students (class_id, user_id) VALUES (?, ?)
         ON CONFLICT (class_id, user_id) DO NOTHING",
    )
    .bind(class_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    get_class(pool, class_id).await
}

#[instrument]
pub async fn unassign_student_from_class(
    pool: &Pool<Sqlite>,
    class_id: i64,
    user_id: i64,
) -> Result<DojoClass, AppError> {
    info!("Removing student from class");
    get_class(pool, class_id).await?;
    get_user(pool, user_id).await?;

    sqlx::query("DELETE FROM class_students WHERE class_id = ? AND user_id = ?")
        .bind(class_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    get_class(pool, class_id).await
}

// Attendance

/// Checks a user in for the current local day.
pub async fn mark_attendance(
    pool: &Pool<Sqlite>,
    user_id: i64,
    notes: Option<&str>,
) -> Result<CheckInOutcome, AppError> {
    mark_attendance_at(pool, user_id, notes, Local::now()).await
}

/// Inserts at most one check-in per user per local calendar day. A second
/// call on the same day inserts nothing and reports `AlreadyCheckedIn`.
#[instrument]
pub async fn mark_attendance_at(
    pool: &Pool<Sqlite>,
    user_id: i64,
    notes: Option<&str>,
    at: DateTime<Local>,
) -> Result<CheckInOutcome, AppError> {
    get_user(pool, user_id).await?;

    let check_in_day = at.date_naive();
    let checked_in_at = at.with_timezone(&Utc).naive_utc();
    let notes = notes.map(str::trim).filter(|n| !n.is_empty());

    let result = sqlx::query(
        "INSERT INTO attendance (user_id, checked_in_at, check_in_day, notes)
         VALUES (?, ?, ?, ?)
         ON CONFLICT (user_id, check_in_day) DO NOTHING",
    )
    .bind(user_id)
    .bind(checked_in_at)
    .bind(check_in_day)
    .bind(notes)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        info!(%check_in_day, "User already checked in");
        return Ok(CheckInOutcome::AlreadyCheckedIn);
    }

    info!(%check_in_day, "User checked in");
    let row = sqlx::query_as::<_, DbAttendance>(
        "SELECT id, user_id, checked_in_at, check_in_day, notes FROM attendance WHERE id = ?",
    )
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await?;

    Ok(CheckInOutcome::CheckedIn(Attendance::from(row)))
}

#[instrument]
pub async fn attendance_count(pool: &Pool<Sqlite>, user_id: i64) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

#[instrument]
pub async fn attendance_for_day(
    pool: &Pool<Sqlite>,
    day: NaiveDate,
) -> Result<Vec<AttendanceEntry>, AppError> {
    info!("Fetching attendance for day");
    let rows = sqlx::query_as::<_, DbAttendanceEntry>(
        "SELECT a.id, a.user_id, u.name AS user_name, a.checked_in_at, a.notes
         FROM attendance a
         JOIN users u ON u.id = a.user_id
         WHERE a.check_in_day = ?
         ORDER BY a.checked_in_at DESC, a.id DESC",
    )
    .bind(day)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AttendanceEntry::from).collect())
}

pub async fn todays_attendance(pool: &Pool<Sqlite>) -> Result<Vec<AttendanceEntry>, AppError> {
    attendance_for_day(pool, Local::now().date_naive()).await
}

// Events

#[instrument]
pub async fn list_events(pool: &Pool<Sqlite>) -> Result<Vec<Event>, AppError> {
    info!("Listing events");
    let rows = sqlx::query_as::<_, DbEvent>(
        "SELECT id, title, date, description FROM events ORDER BY date, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Event::from).collect())
}

#[instrument]
pub async fn create_event(
    pool: &Pool<Sqlite>,
    title: &str,
    date: NaiveDate,
    description: &str,
) -> Result<Event, AppError> {
    info!("Creating event");
    let result = sqlx::query("INSERT INTO events (title, date, description) VALUES (?, ?, ?)")
        .bind(title.trim())
        .bind(date)
        .bind(description)
        .execute(pool)
        .await?;

    let row = sqlx::query_as::<_, DbEvent>(
        "SELECT id, title, date, description FROM events WHERE id = ?",
    )
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await?;

    Ok(Event::from(row))
}

#[instrument]
pub async fn delete_event(pool: &Pool<Sqlite>, event_id: i64) -> Result<(), AppError> {
    info!("Deleting event");
    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(event_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Event with id {} not found in database",
            event_id
        )));
    }

    Ok(())
}
