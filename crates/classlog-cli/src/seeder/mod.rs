//! Database seeding.
//!
//! `seed_all` fills the database with fake teachers, classes, students and
//! contacts. `seed_demo` creates a small fixed dataset with one account per
//! role. `clear_all` removes classroom data and every non-admin account.
//!
//! Classes, students and contacts have no cascading foreign keys, so
//! clearing deletes children before parents inside one transaction.

pub mod classes;
pub mod models;
pub mod students;
pub mod users;

use std::time::Instant;

use classlog_core::UserRole;
use classlog_core::fields::mask_phone;
use classlog_models::{ClassStatus, ContactType};
use sqlx::PgPool;

pub use models::{ClassSeed, ContactSeed, DEFAULT_SEED_PASSWORD, SeedConfig, StudentSeed, UserSeed};

pub type SeedResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Hashes a seed password, surfacing the failure as a seeding error.
pub fn hash_seed_password(password: &str) -> SeedResult<String> {
    classlog_core::hash_password(password)
        .map_err(|e| format!("Failed to hash password: {}", e.error).into())
}

/// Seeds teachers, their classes, students and contacts.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> SeedResult<()> {
    let start_time = Instant::now();
    println!(
        "🌱 Seeding {} teachers, {} classes, {} students...\n",
        config.teachers,
        config.total_classes(),
        config.total_students()
    );

    let password_hash = hash_seed_password(&config.password)?;

    let teacher_ids = users::seed_teachers(db, config.teachers, &password_hash).await?;
    let class_ids = classes::seed_classes(db, &teacher_ids, config.classes_per_teacher).await?;
    let student_ids = students::seed_students(db, &class_ids, config.students_per_class).await?;
    students::seed_contacts(db, &student_ids, config.contacts_per_student).await?;

    println!("\n✅ Seeding finished in {:?}", start_time.elapsed());
    println!("   Seeded users log in with password: {}", config.password);

    Ok(())
}

pub const DEMO_CLASS_NAME: &str = "Mathematics 101";

/// Demo accounts as `(name, email, password, role)`.
pub const DEMO_USERS: [(&str, &str, &str, UserRole); 3] = [
    ("Admin User", "admin@school.com", "admin123", UserRole::Admin),
    (
        "Coordinator User",
        "coordinator@school.com",
        "coordinator123",
        UserRole::Coordinator,
    ),
    (
        "Teacher User",
        "teacher@school.com",
        "teacher123",
        UserRole::Teacher,
    ),
];

/// Creates one account per role plus a class owned by the teacher with one
/// student and one logged contact. Existing demo accounts are reused.
pub async fn seed_demo(db: &PgPool) -> SeedResult<()> {
    println!("🌱 Seeding demo data...");

    let mut teacher_id = None;
    for (name, email, password, role) in DEMO_USERS {
        let seed = UserSeed {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_seed_password(password)?,
            role,
        };

        let id = match users::insert_user(db, &seed).await? {
            Some(id) => {
                println!("   ✓ Created {} ({})", email, role);
                id
            }
            None => {
                println!("   • {} already exists", email);
                users::find_user_id(db, email)
                    .await?
                    .ok_or_else(|| format!("User {} disappeared while seeding", email))?
            }
        };

        if role == UserRole::Teacher {
            teacher_id = Some(id);
        }
    }

    let teacher_id = teacher_id.ok_or("Demo teacher was not created")?;

    let class_ids = classes::insert_classes_batch(
        db,
        &[ClassSeed {
            name: DEMO_CLASS_NAME.to_string(),
            status: ClassStatus::Active,
            created_by_id: teacher_id,
        }],
    )
    .await?;

    let class_id = class_ids
        .first()
        .copied()
        .ok_or("Demo class was not created")?;

    let student_ids = students::insert_students_batch(
        db,
        &[StudentSeed {
            name: "João Silva".to_string(),
            cpf: students::fake_cpf(),
            phone: mask_phone("11987654321"),
            class_id,
        }],
    )
    .await?;

    if let Some(&student_id) = student_ids.first() {
        students::insert_contacts_batch(
            db,
            &[ContactSeed {
                contact_type: ContactType::Phone,
                contact_name: "Maria Silva".to_string(),
                description: "Called about the upcoming parent meeting".to_string(),
                student_id,
            }],
        )
        .await?;
    }

    println!(
        "   ✓ Created class \"{}\" with {} student(s)",
        DEMO_CLASS_NAME,
        student_ids.len()
    );

    Ok(())
}

/// Counts removed by [`clear_all`].
#[derive(Debug, Default)]
pub struct ClearSummary {
    pub contacts: u64,
    pub students: u64,
    pub classes: u64,
    pub users: u64,
}

/// Deletes all contacts, students and classes, then every non-admin user.
pub async fn clear_all(db: &PgPool) -> SeedResult<ClearSummary> {
    let start_time = Instant::now();
    println!("🗑️  Clearing classroom data...");

    let mut tx = db.begin().await?;
    let mut summary = ClearSummary {
        contacts: sqlx::query("DELETE FROM contacts")
            .execute(&mut *tx)
            .await?
            .rows_affected(),
        ..Default::default()
    };
    summary.students = sqlx::query("DELETE FROM students")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    summary.classes = sqlx::query("DELETE FROM classes")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    tx.commit().await?;

    summary.users = users::clear_users(db).await?;

    println!(
        "   ✓ Deleted {} classes, {} students, {} contacts, {} users in {:?}",
        summary.classes,
        summary.students,
        summary.contacts,
        summary.users,
        start_time.elapsed()
    );

    Ok(summary)
}
