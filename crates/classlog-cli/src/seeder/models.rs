//! Data models for database seeding configuration.

use classlog_core::UserRole;
use classlog_models::{ClassStatus, ContactType};
use uuid::Uuid;

/// Seed data for creating a user.
pub struct UserSeed {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Seed data for creating a class.
pub struct ClassSeed {
    pub name: String,
    pub status: ClassStatus,
    pub created_by_id: Uuid,
}

/// Seed data for creating a student. `cpf` holds bare digits and `phone` is
/// already masked, matching what the API stores.
pub struct StudentSeed {
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub class_id: Uuid,
}

/// Seed data for logging a contact.
pub struct ContactSeed {
    pub contact_type: ContactType,
    pub contact_name: String,
    pub description: String,
    pub student_id: Uuid,
}

/// How much data one `seed` run creates.
#[derive(Clone)]
pub struct SeedConfig {
    pub teachers: usize,
    pub classes_per_teacher: usize,
    pub students_per_class: usize,
    pub contacts_per_student: usize,
    /// Plain-text password given to every seeded user.
    pub password: String,
}

pub const DEFAULT_SEED_PASSWORD: &str = "password123";

impl SeedConfig {
    pub fn new(teachers: usize) -> Self {
        Self {
            teachers,
            classes_per_teacher: 2,
            students_per_class: 20,
            contacts_per_student: 2,
            password: DEFAULT_SEED_PASSWORD.to_string(),
        }
    }

    pub fn with_classes(mut self, classes_per_teacher: usize) -> Self {
        self.classes_per_teacher = classes_per_teacher;
        self
    }

    pub fn with_students(mut self, students_per_class: usize) -> Self {
        self.students_per_class = students_per_class;
        self
    }

    pub fn with_contacts(mut self, contacts_per_student: usize) -> Self {
        self.contacts_per_student = contacts_per_student;
        self
    }

    pub fn total_classes(&self) -> usize {
        self.teachers * self.classes_per_teacher
    }

    pub fn total_students(&self) -> usize {
        self.total_classes() * self.students_per_class
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_config_totals() {
        let config = SeedConfig::new(3).with_classes(4).with_students(10);
        assert_eq!(config.total_classes(), 12);
        assert_eq!(config.total_students(), 120);
        assert_eq!(config.contacts_per_student, 2);
        assert_eq!(config.password, DEFAULT_SEED_PASSWORD);
    }
}
