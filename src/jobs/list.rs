use axum::{
    Json, debug_handler,
    extract::{Query, State},
};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::AppResult;

use super::JobRead;

#[derive(Deserialize)]
pub(crate) struct JobsQuery {
    skip: Option<i64>,
    limit: Option<i64>,
    title: Option<String>,
    min_budget: Option<i64>,
    max_budget: Option<i64>,
    status: Option<String>,
}

#[debug_handler]
pub(crate) async fn list_jobs(
    Query(query): Query<JobsQuery>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Vec<JobRead>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let skip = query.skip.unwrap_or(0).max(0);

    let mut sql: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id,title,description,budget,status,client_id FROM jobs WHERE 1=1");
    if let Some(title) = &query.title {
        sql.push(" AND title LIKE ");
        sql.push_bind(format!("%{title}%"));
    }
    if let Some(min_budget) = query.min_budget {
        sql.push(" AND budget >= ");
        sql.push_bind(min_budget);
    }
    if let Some(max_budget) = query.max_budget {
        sql.push(" AND budget <= ");
        sql.push_bind(max_budget);
    }
    if let Some(status) = query.status {
        sql.push(" AND status = ");
        sql.push_bind(status);
    }
    sql.push(" LIMIT ");
    sql.push_bind(limit);
    sql.push(" OFFSET ");
    sql.push_bind(skip);

    let jobs = sql.build_query_as().fetch_all(&db_pool).await?;
    Ok(Json(jobs))
}
