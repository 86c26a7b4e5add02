//! Seeding helpers for adapter and service unit tests.

use sqlx::SqlitePool;

use crate::domain::models::{LessonId, UserId};

pub(crate) async fn seed_user(pool: &SqlitePool, id: UserId, username: &str) {
    sqlx::query("INSERT INTO users (id, username, full_name, email) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(username)
        .bind(format!("{username} Student"))
        .bind(format!("{username}@example.edu"))
        .execute(pool)
        .await
        .unwrap();
}

pub(crate) async fn seed_lesson(pool: &SqlitePool, id: LessonId, unit_code: &str, title: &str, status: &str) {
    sqlx::query(
        "INSERT INTO lessons (id, unit_code, title, description, objectives, status) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(unit_code)
    .bind(title)
    .bind(format!("About {title}."))
    .bind(format!("Understand {title}."))
    .bind(status)
    .execute(pool)
    .await
    .unwrap();
}

pub(crate) async fn seed_reading(pool: &SqlitePool, lesson_id: LessonId, title: &str, description: &str, position: i64) {
    sqlx::query("INSERT INTO reading_list_items (lesson_id, title, description, position) VALUES (?, ?, ?, ?)")
        .bind(lesson_id)
        .bind(title)
        .bind(description)
        .bind(position)
        .execute(pool)
        .await
        .unwrap();
}

pub(crate) async fn enroll(pool: &SqlitePool, user_id: UserId, lesson_id: LessonId) {
    sqlx::query("INSERT INTO lesson_enrollments (user_id, lesson_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(lesson_id)
        .execute(pool)
        .await
        .unwrap();
}
