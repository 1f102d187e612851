//! Raw SQL guard for the `execute_query` tool.
//!
//! This is a textual check, not a parser: a statement is a SELECT when its
//! trimmed text starts with `SELECT`, and any `;` (even inside a string
//! literal) counts as a statement separator.

use crate::error::GuardError;
use crate::models::ExecutionPlan;

/// Decide whether `sql` may run and how.
///
/// Checks run in order: empty input, statement separators, then the
/// read-only restriction.
pub fn authorize(sql: &str, read_only: bool) -> Result<ExecutionPlan, GuardError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(GuardError::EmptyStatement);
    }

    if trimmed.contains(';') {
        return Err(GuardError::MultipleStatements);
    }

    let is_select = starts_with_select(trimmed);
    if read_only && !is_select {
        return Err(GuardError::WriteNotAllowed);
    }

    Ok(if is_select {
        ExecutionPlan::Select
    } else {
        ExecutionPlan::Mutation
    })
}

fn starts_with_select(sql: &str) -> bool {
    sql.get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("SELECT"))
}
