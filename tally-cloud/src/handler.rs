use {
    serde_json::json,
    tracing::error,
    tally_core::{FIELD_ID, HandlerResponse, InvocationContext, InvocationEvent, Record},
    crate::{
        error::CounterError,
        table::{BoxedTable, Table},
    },
};

/// Key of the single counter record. The table/collection the record lives in
/// carries the same name; both are fixed and provisioned externally.
pub const COUNTER_ID: &str = "visitor-counter";
pub const TABLE_NAME: &str = "visitor-counter";

const FIELD_COUNT: &str = "count";

/// The whole service: read the counter, bump it, write it back. Holds the
/// table handle for the lifetime of the process and nothing else, so every
/// invocation is independent. The get-then-update sequence is deliberately
/// not atomic; concurrent invocations can lose increments.
pub struct CounterHandler {
    table: BoxedTable,
}

impl CounterHandler {
    pub fn new(table: BoxedTable) -> Self {
        Self {
            table,
        }
    }

    /// Never fails: any error from the increment sequence is logged here and
    /// collapsed into the opaque 500 envelope.
    pub fn handle(&self, _event: &InvocationEvent, _context: &InvocationContext) -> HandlerResponse {
        match self.increment() {
            Ok(updated) => success_response(updated),
            Err(err) => {
                error!("failed to increment visitor counter: {err:?}");
                error_response()
            }
        }
    }

    fn increment(&self) -> Result<u64, CounterError> {
        let current = match self.table.get(COUNTER_ID)? {
            Some(record) => stored_count(&record)?,
            None => {
                let record = Record::new()
                    .with_field(FIELD_ID, COUNTER_ID)
                    .with_field(FIELD_COUNT, 0);
                self.table.put(&record)?;
                0
            }
        };

        let updated = current + 1;
        self.table.update(COUNTER_ID, FIELD_COUNT, updated.into())?;
        Ok(updated)
    }
}

/// The store hands counts back as json numbers of whatever precision it
/// keeps; the response body wants a plain integer.
fn stored_count(record: &Record) -> Result<u64, CounterError> {
    let value = record.field(FIELD_COUNT)
        .ok_or_else(|| CounterError::RecordMalformed { reason: format!("record has no `{FIELD_COUNT}` field") })?;
    value.as_u64()
        .ok_or_else(|| CounterError::RecordMalformed { reason: format!("`{FIELD_COUNT}` is not a non-negative integer: {value}") })
}

fn success_response(count: u64) -> HandlerResponse {
    HandlerResponse::new(200)
        .with_header("Content-Type", "application/json")
        .with_header("Access-Control-Allow-Origin", "*")
        .with_header("Access-Control-Allow-Methods", "GET")
        .with_header("Access-Control-Allow-Headers", "Content-Type")
        .with_body(json!({ "count": count }).to_string())
}

fn error_response() -> HandlerResponse {
    HandlerResponse::new(500)
        .with_header("Content-Type", "application/json")
        .with_header("Access-Control-Allow-Origin", "*")
        .with_body(json!({ "message": "Internal Server Error" }).to_string())
}
