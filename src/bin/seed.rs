//! Seed script for development — populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env).

use chrono::NaiveDate;
use sqlx::PgPool;

const DEMO_USER: &str = "demo";
const DEMO_PASSWORD: &str = "demo1234";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Run migrations first
    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("=== trenddash Seed Script ===");

    seed_demo_user(&pool).await?;
    seed_analytics(&pool).await?;

    println!("\n=== Seed complete! ===");
    println!("Demo login: {DEMO_USER} / {DEMO_PASSWORD}");

    Ok(())
}

async fn seed_demo_user(pool: &PgPool) -> anyhow::Result<()> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(DEMO_USER)
            .fetch_one(pool)
            .await?;

    let hash = trenddash::services::auth::hash_password(DEMO_PASSWORD)?;

    if exists {
        // Reset password for the existing demo user
        sqlx::query("UPDATE users SET password_hash = $1 WHERE username = $2")
            .bind(&hash)
            .bind(DEMO_USER)
            .execute(pool)
            .await?;
        println!("[done] Updated demo user password");
        return Ok(());
    }

    sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
        .bind(DEMO_USER)
        .bind(&hash)
        .execute(pool)
        .await?;

    println!("[done] Created demo user");
    Ok(())
}

async fn seed_analytics(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM analytics")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Analytics rows already exist ({count})");
        return Ok(());
    }

    let start = NaiveDate::from_ymd_opt(2022, 10, 4).expect("valid date");
    let ages = ["15-25", ">25"];
    let genders = ["Male", "Female"];

    let mut inserted = 0i64;
    for day_offset in 0..28i64 {
        let day = start + chrono::Duration::days(day_offset);
        for (age_idx, age) in ages.iter().enumerate() {
            for (gender_idx, gender) in genders.iter().enumerate() {
                // Deterministic spread so charts have visible shape.
                let base = (day_offset as i32) * 7 + (age_idx as i32) * 13 + (gender_idx as i32) * 29;
                sqlx::query(
                    "INSERT INTO analytics (day, age, gender, a, b, c, d, e, f)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                )
                .bind(day)
                .bind(age)
                .bind(gender)
                .bind(base % 120)
                .bind((base * 3) % 200)
                .bind((base * 5) % 90)
                .bind((base * 7) % 150)
                .bind((base * 11) % 60)
                .bind((base * 13) % 180)
                .execute(pool)
                .await?;
                inserted += 1;
            }
        }
    }

    println!("[done] Inserted {inserted} analytics rows");
    Ok(())
}
