//! Project repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::ProjectRow;

type ProjectTuple = (String, String, String, i64, i64, i64, i64);

fn row_from_tuple(
    (id, organization_id, name, traces, scenarios, created_at, updated_at): ProjectTuple,
) -> ProjectRow {
    ProjectRow {
        id,
        organization_id,
        name,
        uses_columnar_traces: traces != 0,
        uses_columnar_scenarios: scenarios != 0,
        created_at,
        updated_at,
    }
}

/// Create a new project with a generated CUID2 ID and both columnar flags off
pub async fn create_project(
    pool: &SqlitePool,
    organization_id: &str,
    name: &str,
) -> Result<ProjectRow, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO projects (id, organization_id, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(organization_id)
    .bind(name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::debug!(project_id = %id, %organization_id, "Project created");

    Ok(ProjectRow {
        id,
        organization_id: organization_id.to_string(),
        name: name.to_string(),
        uses_columnar_traces: false,
        uses_columnar_scenarios: false,
        created_at: now,
        updated_at: now,
    })
}

/// Update the per-project usage backend flags. Returns false if the project doesn't exist.
pub async fn set_project_features(
    pool: &SqlitePool,
    id: &str,
    uses_columnar_traces: bool,
    uses_columnar_scenarios: bool,
) -> Result<bool, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let result = sqlx::query(
        "UPDATE projects SET feature_clickhouse_traces = ?, feature_clickhouse_scenarios = ?, updated_at = ? WHERE id = ?",
    )
    .bind(uses_columnar_traces as i64)
    .bind(uses_columnar_scenarios as i64)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// List all projects of an organization, oldest first
pub async fn list_for_org(
    pool: &SqlitePool,
    organization_id: &str,
) -> Result<Vec<ProjectRow>, SqliteError> {
    let rows = sqlx::query_as::<_, ProjectTuple>(
        r#"
        SELECT id, organization_id, name, feature_clickhouse_traces,
               feature_clickhouse_scenarios, created_at, updated_at
        FROM projects
        WHERE organization_id = ?
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_from_tuple).collect())
}

/// Get projects by ID, oldest first. Unknown IDs are ignored.
pub async fn get_by_ids(pool: &SqlitePool, ids: &[String]) -> Result<Vec<ProjectRow>, SqliteError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let query = format!(
        r#"
        SELECT id, organization_id, name, feature_clickhouse_traces,
               feature_clickhouse_scenarios, created_at, updated_at
        FROM projects
        WHERE id IN ({})
        ORDER BY created_at ASC, rowid ASC
        "#,
        placeholders
    );

    let mut query_builder = sqlx::query_as::<_, ProjectTuple>(&query);
    for id in ids {
        query_builder = query_builder.bind(id);
    }

    let rows = query_builder.fetch_all(pool).await?;
    Ok(rows.into_iter().map(row_from_tuple).collect())
}
