//! Class seeding functionality.

use classlog_models::ClassStatus;
use fake::Fake;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::SeedResult;
use super::models::ClassSeed;

const SUBJECTS: [&str; 10] = [
    "Mathematics",
    "Portuguese",
    "History",
    "Geography",
    "Biology",
    "Chemistry",
    "Physics",
    "English",
    "Arts",
    "Physical Education",
];

/// Generates classes for each owner in parallel. Every fifth class is inactive.
pub fn generate_classes(owner_ids: &[Uuid], classes_per_owner: usize) -> Vec<ClassSeed> {
    owner_ids
        .par_iter()
        .flat_map(|&owner_id| {
            (0..classes_per_owner)
                .map(|idx| {
                    let subject = SUBJECTS[(0..SUBJECTS.len()).fake::<usize>()];
                    let number: u16 = (100..400).fake();

                    ClassSeed {
                        name: format!("{} {}", subject, number),
                        status: if idx % 5 == 4 {
                            ClassStatus::Inactive
                        } else {
                            ClassStatus::Active
                        },
                        created_by_id: owner_id,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Seeds classes into the database.
pub async fn seed_classes(
    db: &PgPool,
    owner_ids: &[Uuid],
    classes_per_owner: usize,
) -> SeedResult<Vec<Uuid>> {
    let start_time = Instant::now();
    println!(
        "📚 Seeding {} classes ({} per teacher)...",
        owner_ids.len() * classes_per_owner,
        classes_per_owner
    );

    let classes = generate_classes(owner_ids, classes_per_owner);
    let ids = insert_classes_batch(db, &classes).await?;

    println!(
        "   ✓ Inserted {} classes in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Inserts classes in batches using multi-value INSERT statements.
pub async fn insert_classes_batch(db: &PgPool, classes: &[ClassSeed]) -> SeedResult<Vec<Uuid>> {
    let mut tx = db.begin().await?;

    const BATCH_SIZE: usize = 1000;
    let mut all_ids = Vec::with_capacity(classes.len());

    for chunk in classes.chunks(BATCH_SIZE) {
        let ids = insert_classes_chunk(&mut tx, chunk).await?;
        all_ids.extend(ids);
    }

    tx.commit().await?;
    Ok(all_ids)
}

async fn insert_classes_chunk(
    tx: &mut Transaction<'_, Postgres>,
    classes: &[ClassSeed],
) -> SeedResult<Vec<Uuid>> {
    if classes.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from("INSERT INTO classes (name, status, created_by_id) VALUES ");
    for i in 0..classes.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 3;
        query.push_str(&format!("(${}, ${}, ${})", p + 1, p + 2, p + 3));
    }
    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar::<_, Uuid>(&query);
    for class in classes {
        q = q
            .bind(&class.name)
            .bind(class.status)
            .bind(class.created_by_id);
    }

    let ids = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_classes_per_owner() {
        let owners = vec![Uuid::new_v4(), Uuid::new_v4()];
        let classes = generate_classes(&owners, 5);

        assert_eq!(classes.len(), 10);
        for owner in &owners {
            let owned: Vec<_> = classes
                .iter()
                .filter(|c| c.created_by_id == *owner)
                .collect();
            assert_eq!(owned.len(), 5);
            assert_eq!(
                owned
                    .iter()
                    .filter(|c| c.status == ClassStatus::Inactive)
                    .count(),
                1
            );
        }
        assert!(classes.iter().all(|c| !c.name.trim().is_empty()));
    }
}
