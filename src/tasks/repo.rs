use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::Task;

impl Task {
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, text, done, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, text, done, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    pub async fn create(db: &PgPool, user_id: Uuid, text: &str) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, text)
            VALUES ($1, $2)
            RETURNING id, user_id, text, done, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(text)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    /// Update only if the task belongs to the user. COALESCE keeps the
    /// stored value for any field not supplied.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        text: Option<&str>,
        done: Option<bool>,
    ) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET text = COALESCE($3, text),
                done = COALESCE($4, done),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, text, done, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(text)
        .bind(done)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Uuid>> {
        let deleted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(deleted.map(|(id,)| id))
    }
}
