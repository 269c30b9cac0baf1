use scylla::response::query_result::QueryResult;
use scylla::value::{CqlValue, Row};

/// Whether a conditional statement or batch was applied.
///
/// The first column of an LWT result is always `[applied]`; the remaining
/// columns (present only when rejected) vary, so the row is read untyped.
pub(super) fn was_applied(result: QueryResult) -> anyhow::Result<bool> {
    let rows = result.into_rows_result()?;
    let row: Row = rows.first_row()?;
    applied_flag(&row).ok_or_else(|| anyhow::anyhow!("LWT result has no [applied] column"))
}

fn applied_flag(row: &Row) -> Option<bool> {
    match row.columns.first() {
        Some(Some(CqlValue::Boolean(applied))) => Some(*applied),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applied_flag_reads_first_column() {
        let applied = Row {
            columns: vec![Some(CqlValue::Boolean(true))],
        };
        let rejected = Row {
            columns: vec![Some(CqlValue::Boolean(false)), Some(CqlValue::BigInt(4))],
        };

        assert_eq!(applied_flag(&applied), Some(true));
        assert_eq!(applied_flag(&rejected), Some(false));
    }

    #[test]
    fn test_applied_flag_missing() {
        let row = Row {
            columns: vec![Some(CqlValue::BigInt(4))],
        };
        assert_eq!(applied_flag(&row), None);
    }
}
