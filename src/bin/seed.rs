//! Loads the standard belt ladder and a handful of demo records.
//!
//! Every insert is skipped when the row already exists, so running the
//! seeder twice leaves the database unchanged. Demo passwords are stored in
//! clear text and get hashed on each account's first login.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use tracing::info;

const BELTS: [(&str, &str, &str, i64); 20] = [
    ("11th-kyu", "11th Kyu - Yellow", "#ffc107", 0),
    ("10th-kyu", "10th Kyu - Orange", "#fd7e14", 1),
    ("9th-kyu", "9th Kyu - Green", "#28a745", 2),
    ("8th-kyu", "8th Kyu - Green-Black", "#1e7e34", 3),
    ("7th-kyu", "7th Kyu - Blue", "#007bff", 4),
    ("6th-kyu", "6th Kyu - Blue-Black", "#0056b3", 5),
    ("5th-kyu", "5th Kyu - Purple", "#6f42c1", 6),
    ("4th-kyu", "4th Kyu - Purple-Black", "#5a32a3", 7),
    ("3rd-kyu", "3rd Kyu - Brown", "#795548", 8),
    ("2nd-kyu", "2nd Kyu - Brown", "#5d4037", 9),
    ("1st-kyu", "1st Kyu - Brown", "#3e2723", 10),
    ("jr-black-1", "Junior Black Belt - Level 1", "#343a40", 11),
    ("jr-black-2", "Junior Black Belt - Level 2", "#343a40", 12),
    ("jr-black-3", "Junior Black Belt - Level 3", "#343a40", 13),
    ("jr-black-4", "Junior Black Belt - Level 4", "#343a40", 14),
    ("shodan", "Shodan", "#000000", 15),
    ("nidan", "Nidan", "#000000", 16),
    ("sandan", "Sandan", "#000000", 17),
    ("yondan", "Yondan", "#000000", 18),
    ("rokudan", "Rokudan", "#000000", 19),
];

const VIDEOS: [(&str, &str, &str, &str); 4] = [
    ("v1", "11th Kyu: Stance Basics", "https://www.youtube.com/embed/dQw4w9WgXcQ", "11th-kyu"),
    ("v2", "11th Kyu: First Punch", "https://www.youtube.com/embed/dQw4w9WgXcQ", "11th-kyu"),
    ("v3", "10th Kyu Kata", "https://www.youtube.com/embed/xyz789", "10th-kyu"),
    ("v4", "9th Kyu: Sparring Drills", "https://www.youtube.com/embed/dQw4w9WgXcQ", "9th-kyu"),
];

struct SeedUser {
    name: &'static str,
    email: &'static str,
    role: &'static str,
    belt: &'static str,
    password: &'static str,
    start_date: Option<&'static str>,
    contract_renewal: Option<&'static str>,
    sensei_notes: Option<&'static str>,
    address: Option<&'static str>,
    signed_contract: Option<&'static str>,
}

const USERS: [SeedUser; 3] = [
    SeedUser {
        name: "Sensei Miyagi",
        email: "sensei@dojo.com",
        role: "sensei",
        belt: "rokudan",
        password: "sensei",
        start_date: None,
        contract_renewal: None,
        sensei_notes: None,
        address: None,
        signed_contract: None,
    },
    SeedUser {
        name: "Daniel LaRusso",
        email: "daniel@dojo.com",
        role: "student",
        belt: "11th-kyu",
        password: "student",
        start_date: Some("2024-01-15"),
        contract_renewal: Some("six_months"),
        sensei_notes: Some("Shows great promise. Needs to work on stance."),
        address: Some("123 Dojo Way, Karate City, KC 12345"),
        signed_contract: Some("daniel_larusso_contract.pdf"),
    },
    SeedUser {
        name: "Johnny Lawrence",
        email: "johnny@dojo.com",
        role: "student",
        belt: "10th-kyu",
        password: "student",
        start_date: Some("2024-12-01"),
        contract_renewal: Some("yearly"),
        sensei_notes: Some("Needs to work on discipline."),
        address: None,
        signed_contract: None,
    },
];

const EVENTS: [(&str, &str, &str); 2] = [
    (
        "Belt Promotion Testing",
        "2025-12-15",
        "Testing for all ranks. Please arrive 30 mins early.",
    ),
    (
        "Holiday Dojo Party",
        "2025-12-20",
        "Potluck party for all students and families.",
    ),
];

async fn seed_belts(pool: &Pool<Sqlite>) -> Result<()> {
    for (id, name, color, order) in BELTS {
        sqlx::query(
            "INSERT INTO belts (id, name, color, rank_order) VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(name)
        .bind(color)
        .bind(order)
        .execute(pool)
        .await
        .with_context(|| format!("seeding belt {}", id))?;
    }
    info!("Seeded {} belts", BELTS.len());

    for (id, title, url, belt_id) in VIDEOS {
        sqlx::query(
            "INSERT INTO videos (id, title, url, belt_id) VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(title)
        .bind(url)
        .bind(belt_id)
        .execute(pool)
        .await
        .with_context(|| format!("seeding video {}", id))?;
    }
    info!("Seeded {} videos", VIDEOS.len());

    Ok(())
}

async fn seed_users(pool: &Pool<Sqlite>) -> Result<()> {
    for user in &USERS {
        sqlx::query(
            "INSERT INTO users (name, email, role, current_belt_id, password, start_date,
                                contract_start_date, contract_renewal, sensei_notes, address,
                                signed_contract)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.role)
        .bind(user.belt)
        .bind(user.password)
        .bind(user.start_date)
        .bind(user.start_date)
        .bind(user.contract_renewal)
        .bind(user.sensei_notes)
        .bind(user.address)
        .bind(user.signed_contract)
        .execute(pool)
        .await
        .with_context(|| format!("seeding user {}", user.email))?;
    }
    info!("Seeded {} users", USERS.len());

    Ok(())
}

async fn seed_events(pool: &Pool<Sqlite>) -> Result<()> {
    for (title, date, description) in EVENTS {
        sqlx::query(
            "INSERT INTO events (title, date, description)
             SELECT ?, ?, ?
             WHERE NOT EXISTS (SELECT 1 FROM events WHERE title = ? AND date = ?)",
        )
        .bind(title)
        .bind(date)
        .bind(description)
        .bind(title)
        .bind(date)
        .execute(pool)
        .await
        .with_context(|| format!("seeding event {}", title))?;
    }
    info!("Seeded {} events", EVENTS.len());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename("config/common.env");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let database_url = dotenvy::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://dojo.db?mode=rwc".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .with_context(|| format!("connecting to {}", database_url))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;

    seed_belts(&pool).await?;
    seed_users(&pool).await?;
    seed_events(&pool).await?;

    info!("Seeding finished");
    Ok(())
}
