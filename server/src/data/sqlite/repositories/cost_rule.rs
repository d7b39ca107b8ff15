//! Custom model cost repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::CostRuleRow;

type CostRuleTuple = (String, String, String, String, Option<f64>, Option<f64>, i64, i64);

/// Create a custom model cost for a project
pub async fn create_cost_rule(
    pool: &SqlitePool,
    project_id: &str,
    model: &str,
    regex: &str,
    input_cost_per_token: Option<f64>,
    output_cost_per_token: Option<f64>,
) -> Result<CostRuleRow, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO custom_llm_model_costs
            (id, project_id, model, regex, input_cost_per_token, output_cost_per_token, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(project_id)
    .bind(model)
    .bind(regex)
    .bind(input_cost_per_token)
    .bind(output_cost_per_token)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::debug!(cost_rule_id = %id, %project_id, %model, "Custom model cost created");

    Ok(CostRuleRow {
        id,
        project_id: project_id.to_string(),
        model: model.to_string(),
        regex: regex.to_string(),
        input_cost_per_token,
        output_cost_per_token,
        created_at: now,
        updated_at: now,
    })
}

/// List a project's custom model costs, oldest first
pub async fn list_for_project(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<CostRuleRow>, SqliteError> {
    let rows = sqlx::query_as::<_, CostRuleTuple>(
        r#"
        SELECT id, project_id, model, regex, input_cost_per_token,
               output_cost_per_token, created_at, updated_at
        FROM custom_llm_model_costs
        WHERE project_id = ?
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(
                id,
                project_id,
                model,
                regex,
                input_cost_per_token,
                output_cost_per_token,
                created_at,
                updated_at,
            )| CostRuleRow {
                id,
                project_id,
                model,
                regex,
                input_cost_per_token,
                output_cost_per_token,
                created_at,
                updated_at,
            },
        )
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::project::create_project;

    async fn setup_test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_and_list_cost_rules() {
        let pool = setup_test_pool().await;
        let project = create_project(&pool, "org_1", "Costs").await.unwrap();

        let first = create_cost_rule(&pool, &project.id, "gpt-4o", "^gpt-4o$", Some(0.0), Some(0.0))
            .await
            .unwrap();
        let second = create_cost_rule(&pool, &project.id, "claude", "^claude-", Some(3e-6), None)
            .await
            .unwrap();

        let rules = list_for_project(&pool, &project.id).await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0], first);
        assert_eq!(rules[1].id, second.id);
        assert_eq!(rules[1].input_cost_per_token, Some(3e-6));
        assert_eq!(rules[1].output_cost_per_token, None);
    }

    #[tokio::test]
    async fn test_zero_rates_survive_roundtrip() {
        let pool = setup_test_pool().await;
        let project = create_project(&pool, "org_1", "Free").await.unwrap();
        create_cost_rule(&pool, &project.id, "free-model", "^free-model$", Some(0.0), Some(0.0))
            .await
            .unwrap();

        let rules = list_for_project(&pool, &project.id).await.unwrap();
        assert_eq!(rules[0].input_cost_per_token, Some(0.0));
        assert_eq!(rules[0].output_cost_per_token, Some(0.0));
    }

    #[tokio::test]
    async fn test_list_is_project_scoped() {
        let pool = setup_test_pool().await;
        let a = create_project(&pool, "org_1", "A").await.unwrap();
        let b = create_project(&pool, "org_1", "B").await.unwrap();
        create_cost_rule(&pool, &a.id, "gpt-4o", "^gpt-4o$", Some(1e-6), Some(2e-6))
            .await
            .unwrap();

        assert!(list_for_project(&pool, &b.id).await.unwrap().is_empty());
        assert_eq!(list_for_project(&pool, &a.id).await.unwrap().len(), 1);
    }
}
