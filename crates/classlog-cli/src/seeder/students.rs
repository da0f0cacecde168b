//! Student and contact seeding functionality.

use classlog_core::fields::{CPF_DIGITS, mask_phone};
use classlog_models::ContactType;
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::*;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::SeedResult;
use super::models::{ContactSeed, StudentSeed};

const CPF_RANGE_END: u64 = 100_000_000_000;
const CONTACT_TYPES: [ContactType; 3] =
    [ContactType::Phone, ContactType::Email, ContactType::Whatsapp];

/// Random eleven-digit CPF, zero padded.
pub fn fake_cpf() -> String {
    let n: u64 = (0..CPF_RANGE_END).fake();
    format!("{:0width$}", n, width = CPF_DIGITS)
}

/// Random São Paulo mobile number, already masked.
pub fn fake_phone() -> String {
    let n: u32 = (0..100_000_000).fake();
    mask_phone(&format!("119{:08}", n))
}

/// Generates students for each class in parallel.
pub fn generate_students(class_ids: &[Uuid], students_per_class: usize) -> Vec<StudentSeed> {
    class_ids
        .par_iter()
        .flat_map(|&class_id| {
            (0..students_per_class)
                .map(|_| {
                    let first_name: String = FirstName().fake();
                    let last_name: String = LastName().fake();

                    StudentSeed {
                        name: format!("{} {}", first_name, last_name),
                        cpf: fake_cpf(),
                        phone: fake_phone(),
                        class_id,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Generates contact log entries for each student in parallel, cycling
/// through the contact types.
pub fn generate_contacts(student_ids: &[Uuid], contacts_per_student: usize) -> Vec<ContactSeed> {
    student_ids
        .par_iter()
        .flat_map(|&student_id| {
            (0..contacts_per_student)
                .map(|idx| {
                    let first_name: String = FirstName().fake();
                    let last_name: String = LastName().fake();

                    ContactSeed {
                        contact_type: CONTACT_TYPES[idx % CONTACT_TYPES.len()],
                        contact_name: format!("{} {}", first_name, last_name),
                        description: Sentence(4..10).fake(),
                        student_id,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Seeds students into the database.
pub async fn seed_students(
    db: &PgPool,
    class_ids: &[Uuid],
    students_per_class: usize,
) -> SeedResult<Vec<Uuid>> {
    let start_time = Instant::now();
    println!(
        "🎓 Seeding {} students ({} per class)...",
        class_ids.len() * students_per_class,
        students_per_class
    );

    let students = generate_students(class_ids, students_per_class);
    let ids = insert_students_batch(db, &students).await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Seeds contact log entries into the database.
pub async fn seed_contacts(
    db: &PgPool,
    student_ids: &[Uuid],
    contacts_per_student: usize,
) -> SeedResult<u64> {
    let start_time = Instant::now();
    println!(
        "📞 Seeding {} contacts ({} per student)...",
        student_ids.len() * contacts_per_student,
        contacts_per_student
    );

    let contacts = generate_contacts(student_ids, contacts_per_student);
    let inserted = insert_contacts_batch(db, &contacts).await?;

    println!(
        "   ✓ Inserted {} contacts in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

/// Inserts students in batches. A CPF collision skips that row.
pub async fn insert_students_batch(
    db: &PgPool,
    students: &[StudentSeed],
) -> SeedResult<Vec<Uuid>> {
    let mut tx = db.begin().await?;

    // 4 params per student
    const BATCH_SIZE: usize = 1000;
    let mut all_ids = Vec::with_capacity(students.len());

    for chunk in students.chunks(BATCH_SIZE) {
        let ids = insert_students_chunk(&mut tx, chunk).await?;
        all_ids.extend(ids);
    }

    tx.commit().await?;
    Ok(all_ids)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> SeedResult<Vec<Uuid>> {
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from("INSERT INTO students (name, cpf, phone, class_id) VALUES ");
    for i in 0..students.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 4;
        query.push_str(&format!("(${}, ${}, ${}, ${})", p + 1, p + 2, p + 3, p + 4));
    }
    query.push_str(" ON CONFLICT (cpf) DO NOTHING RETURNING id");

    let mut q = sqlx::query_scalar::<_, Uuid>(&query);
    for student in students {
        q = q
            .bind(&student.name)
            .bind(&student.cpf)
            .bind(&student.phone)
            .bind(student.class_id);
    }

    let ids = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

/// Inserts contacts in batches, returning the number of rows written.
pub async fn insert_contacts_batch(db: &PgPool, contacts: &[ContactSeed]) -> SeedResult<u64> {
    let mut tx = db.begin().await?;

    const BATCH_SIZE: usize = 1000;
    let mut inserted = 0;

    for chunk in contacts.chunks(BATCH_SIZE) {
        inserted += insert_contacts_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_contacts_chunk(
    tx: &mut Transaction<'_, Postgres>,
    contacts: &[ContactSeed],
) -> SeedResult<u64> {
    if contacts.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO contacts (contact_type, contact_name, description, student_id) VALUES ",
    );
    for i in 0..contacts.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 4;
        query.push_str(&format!("(${}, ${}, ${}, ${})", p + 1, p + 2, p + 3, p + 4));
    }

    let mut q = sqlx::query(&query);
    for contact in contacts {
        q = q
            .bind(contact.contact_type)
            .bind(&contact.contact_name)
            .bind(&contact.description)
            .bind(contact.student_id);
    }

    let result = q.execute(&mut **tx).await?;
    Ok(result.rows_affected())
}
