//! Student profile summary rendered from platform tables.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::models::UserId;
use crate::domain::ports::ProfileProvider;

#[derive(Clone)]
pub struct SqliteProfileProvider {
    pool: SqlitePool,
}

impl SqliteProfileProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileProvider for SqliteProfileProvider {
    async fn profile_summary(&self, user_id: UserId) -> DomainResult<String> {
        let user: Option<(String, String, String)> =
            sqlx::query_as("SELECT username, full_name, email FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some((username, full_name, email)) = user else {
            return Ok(format!("No profile on record for user {user_id}."));
        };

        let enrolled: Vec<(String, String)> = sqlx::query_as(
            "SELECT l.unit_code, l.title FROM lesson_enrollments e
             JOIN lessons l ON l.id = e.lesson_id
             WHERE e.user_id = ?
             ORDER BY l.unit_code",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let display_name = if full_name.trim().is_empty() { &username } else { &full_name };
        let mut lines = vec![format!("Student: {display_name} ({username})")];
        if !email.is_empty() {
            lines.push(format!("Email: {email}"));
        }

        if enrolled.is_empty() {
            lines.push("Enrolled lessons: none".to_string());
        } else {
            lines.push("Enrolled lessons:".to_string());
            lines.extend(enrolled.iter().map(|(code, title)| format!("- {code}: {title}")));
        }

        Ok(lines.join("\n"))
    }
}
