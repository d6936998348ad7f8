// Primitives for reading and writing CSV record exports.

use std::io;

use log::{debug, warn};
use snafu::prelude::*;

use poll_insights::ResponseRecord;

use crate::board::*;

pub fn read_csv_records(path: &str) -> BoardResult<Vec<ResponseRecord>> {
    let rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {
            path: path.to_string(),
        })?;
    read_records(rdr)
}

// Split from the path handling so the parsing is testable on in-memory
// buffers.
fn read_records<R: io::Read>(mut rdr: csv::Reader<R>) -> BoardResult<Vec<ResponseRecord>> {
    let mut res: Vec<ResponseRecord> = Vec::new();
    for (idx, row) in rdr.deserialize::<RawRecord>().enumerate() {
        match row {
            Ok(raw) => {
                debug!("read_records: row {:?}: {:?}", idx + 1, raw);
                res.push(raw.into());
            }
            Err(e) => {
                // One bad row does not abort the batch.
                warn!("read_records: skipping row {:?}: {:?}", idx + 1, e);
            }
        }
    }
    Ok(res)
}

pub fn write_csv_records(records: &[ResponseRecord], path: &str) -> BoardResult<()> {
    let mut wtr = csv::Writer::from_path(path).context(CsvOpenSnafu {
        path: path.to_string(),
    })?;
    for record in records.iter() {
        wtr.serialize(RawRecord::from(record)).context(CsvWriteSnafu {
            path: path.to_string(),
        })?;
    }
    wtr.flush().context(WritingFileSnafu {
        path: path.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes())
    }

    #[test]
    fn reads_the_full_column_set() {
        let data = "Timestamp,Poll ID,Response,Question,Category,Session ID,User Country\n\
                    2025-01-01T00:00:00Z,poll1,Yes,Q?,C,s1,Nepal\n";
        let records = read_records(reader(data)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].poll_id, "poll1");
        assert_eq!(records[0].response, "Yes");
        assert_eq!(records[0].user_country, "Nepal");
    }

    #[test]
    fn missing_columns_default_to_empty() {
        let data = "Poll ID,Response,Session ID\npoll1,Yes,s1\n";
        let records = read_records(reader(data)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].poll_id, "poll1");
        assert_eq!(records[0].timestamp, "");
        assert_eq!(records[0].user_country, "");
    }

    #[test]
    fn short_rows_read_as_missing_fields() {
        let data = "Timestamp,Poll ID,Response,Question,Category,Session ID,User Country\n\
                    ,poll1,Yes\n\
                    2025-01-01T00:00:00Z,poll2,No,Q?,C,s2,Nepal\n";
        let records = read_records(reader(data)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].poll_id, "poll1");
        assert_eq!(records[0].session_id, "");
        assert_eq!(records[1].user_country, "Nepal");
    }
}
