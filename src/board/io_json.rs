// Reading records from the JSON export: an array of loose objects.

use std::fs;

use log::{debug, warn};
use snafu::prelude::*;

use poll_insights::ResponseRecord;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::board::*;

pub fn read_json_records(path: &str) -> BoardResult<Vec<ResponseRecord>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu {
        path: path.to_string(),
    })?;
    debug!("read_json_records: read {:?} bytes", contents.len());
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let items = js.as_array().context(JsonNotAnArraySnafu {})?;
    let mut res: Vec<ResponseRecord> = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match item.as_object() {
            Some(fields) => res.push(record_from_fields(fields)),
            None => {
                // One malformed entry does not abort the batch.
                warn!("read_json_records: skipping non-object entry {:?}", idx);
            }
        }
    }
    Ok(res)
}

// Missing keys and non-string values are read as empty fields.
fn record_from_fields(fields: &JSMap<String, JSValue>) -> ResponseRecord {
    let get = |key: &str| -> String {
        match fields.get(key) {
            Some(JSValue::String(s)) => s.clone(),
            _ => String::new(),
        }
    };
    ResponseRecord {
        timestamp: get("Timestamp"),
        poll_id: get("Poll ID"),
        question: get("Question"),
        category: get("Category"),
        response: get("Response"),
        session_id: get("Session ID"),
        user_country: get("User Country"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loose_objects_normalize_to_records() {
        let js = json!([
            {
                "Timestamp": "2025-01-01T00:00:00Z",
                "Poll ID": "poll1",
                "Response": "Yes",
                "Session ID": "s1",
                "User Country": "Nepal"
            },
            {"Poll ID": "poll2", "Response": 42, "Extra": "ignored"}
        ]);
        let fields = js.as_array().unwrap();
        let first = record_from_fields(fields[0].as_object().unwrap());
        assert_eq!(first.poll_id, "poll1");
        assert_eq!(first.question, "");
        let second = record_from_fields(fields[1].as_object().unwrap());
        assert_eq!(second.poll_id, "poll2");
        // A non-string value reads as a missing field.
        assert_eq!(second.response, "");
    }
}
