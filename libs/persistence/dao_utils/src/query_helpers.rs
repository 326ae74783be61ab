use tokio_postgres::{Client, Error, Row, error::SqlState};

pub fn first_row_or_not_found<T, E, F>(
    rows: &[Row], mapper: F, not_found_error: E,
) -> Result<T, E>
where
    F: FnOnce(&Row) -> T,
{
    rows.first().map(mapper).ok_or(not_found_error)
}

pub async fn count_query(client: &Client, table_name: &str) -> Result<i64, Error> {
    let query = format!("SELECT COUNT(*) FROM {table_name}");
    let stmt = client.prepare(&query).await?;
    let row = client.query_one(&stmt, &[]).await?;
    Ok(row.get(0))
}

pub fn is_unique_violation(err: &Error) -> bool {
    err.code() == Some(&SqlState::UNIQUE_VIOLATION)
}
