//! User seeding functionality.
//!
//! Generates teacher accounts to own the seeded classes and inserts single
//! accounts for `create-admin` and `seed-demo`.

use classlog_core::UserRole;
use fake::Fake;
use fake::faker::name::en::*;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::SeedResult;
use super::models::UserSeed;

/// Generates teacher accounts in parallel using Rayon.
pub fn generate_teachers(count: usize, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();

            UserSeed {
                email: seed_email(&first_name, &last_name, "teacher", idx),
                name: format!("{} {}", first_name, last_name),
                password_hash: password_hash.to_string(),
                role: UserRole::Teacher,
            }
        })
        .collect()
}

fn seed_email(first_name: &str, last_name: &str, tag: &str, idx: usize) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_lowercase()
    };

    format!(
        "{}.{}+{}{}@example.com",
        clean(first_name),
        clean(last_name),
        tag,
        idx
    )
}

/// Seeds teacher accounts into the database.
pub async fn seed_teachers(db: &PgPool, count: usize, password_hash: &str) -> SeedResult<Vec<Uuid>> {
    let start_time = Instant::now();
    println!("👥 Seeding {} teachers...", count);

    let users = generate_teachers(count, password_hash);
    let ids = insert_users_batch(db, &users).await?;

    println!(
        "   ✓ Inserted {} teachers in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Inserts users in batches. Emails that already exist are skipped, so the
/// returned ids may be fewer than the seeds given.
pub async fn insert_users_batch(db: &PgPool, users: &[UserSeed]) -> SeedResult<Vec<Uuid>> {
    let mut tx = db.begin().await?;

    // 4 params per user
    const BATCH_SIZE: usize = 1000;
    let mut all_ids = Vec::with_capacity(users.len());

    for chunk in users.chunks(BATCH_SIZE) {
        let ids = insert_users_chunk(&mut tx, chunk).await?;
        all_ids.extend(ids);
    }

    tx.commit().await?;
    Ok(all_ids)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> SeedResult<Vec<Uuid>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from("INSERT INTO users (name, email, password, role) VALUES ");
    for i in 0..users.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 4;
        query.push_str(&format!("(${}, ${}, ${}, ${})", p + 1, p + 2, p + 3, p + 4));
    }
    query.push_str(" ON CONFLICT (email) DO NOTHING RETURNING id");

    let mut q = sqlx::query_scalar::<_, Uuid>(&query);
    for user in users {
        q = q
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str());
    }

    let ids = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

/// Inserts one account, returning `None` when the email is already taken.
pub async fn insert_user(db: &PgPool, user: &UserSeed) -> SeedResult<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (name, email, password, role)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .fetch_optional(db)
    .await?;

    Ok(id)
}

/// Looks up an account id by email.
pub async fn find_user_id(db: &PgPool, email: &str) -> SeedResult<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(db)
        .await?;

    Ok(id)
}

/// Deletes every account that no longer owns a class, keeping admins.
pub async fn clear_users(db: &PgPool) -> SeedResult<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing non-admin users...");

    let result = sqlx::query(
        "DELETE FROM users u
         WHERE u.role <> 'ADMIN'
           AND NOT EXISTS (SELECT 1 FROM classes c WHERE c.created_by_id = u.id)",
    )
    .execute(db)
    .await?
    .rows_affected();

    println!(
        "   ✓ Deleted {} users in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}
