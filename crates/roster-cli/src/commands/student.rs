//! Student command handlers

use anyhow::{bail, Result};
use tracing::info;

use roster_core::{Config, SortOrder, StoredStudent, Student, StudentStore};

use crate::output::Output;

/// Fields for `roster add`
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Fields for `roster update`; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

impl StudentChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
    }

    fn apply(self, student: &mut Student) {
        if let Some(first_name) = self.first_name {
            student.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            student.last_name = last_name;
        }
        if let Some(email) = self.email {
            student.email = email;
        }
        if let Some(avatar) = self.avatar {
            student.avatar = avatar;
        }
    }
}

/// List all students
pub fn list(store: &StudentStore, order: SortOrder, output: &Output) -> Result<()> {
    let students: Vec<Student> = store
        .snapshot(order)?
        .into_iter()
        .map(StoredStudent::into_student)
        .collect();
    output.print_students(&students);
    Ok(())
}

/// Add a new student
///
/// Without `--id` the next local id is used; without `--avatar` a stock
/// avatar is picked.
pub fn add(
    store: &StudentStore,
    config: &Config,
    new: NewStudent,
    output: &Output,
) -> Result<Student> {
    let id = match new.id {
        Some(id) => {
            if store.get(id)?.is_some() {
                bail!(
                    "Student {} already exists. Use `roster update {}` to change it.",
                    id,
                    id
                );
            }
            id
        }
        None => store.next_local_id()?,
    };

    let student = Student::new(id, new.first_name, new.last_name, new.email);
    let student = match new.avatar {
        Some(avatar) => student.with_avatar(avatar),
        None => student.with_default_avatar(&config.avatar_base),
    };
    student.validate()?;

    store.upsert(&student)?;
    info!("Added student {}", student.id);

    if output.is_human() {
        output.success(&format!("Added {} ({})", student.full_name(), student.id));
    } else {
        output.print_student(&student);
    }
    Ok(student)
}

/// Change fields of an existing student
pub fn update(
    store: &StudentStore,
    id: i64,
    changes: StudentChanges,
    output: &Output,
) -> Result<Student> {
    if changes.is_empty() {
        bail!("Nothing to update. Pass at least one of --first-name, --last-name, --email, --avatar.");
    }

    let Some(stored) = store.get(id)? else {
        bail!("Student {} not found. Run `roster list` to see ids.", id);
    };

    let mut student = stored.into_student();
    changes.apply(&mut student);
    student.validate()?;

    store.upsert(&student)?;
    info!("Updated student {}", id);

    if output.is_human() {
        output.success(&format!("Updated {} ({})", student.full_name(), id));
    } else {
        output.print_student(&student);
    }
    Ok(student)
}

/// Remove a student
pub fn remove(store: &StudentStore, id: i64, output: &Output) -> Result<()> {
    let Some(stored) = store.get(id)? else {
        bail!("Student {} not found. Run `roster list` to see ids.", id);
    };

    store.delete_by_id(id)?;
    info!("Removed student {}", id);

    output.success(&format!("Removed {} ({})", stored.student.full_name(), id));
    Ok(())
}
