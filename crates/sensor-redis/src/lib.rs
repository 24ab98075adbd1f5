//! # Sensor Redis
//!
//! This crate defines how processed sensor results are stored in Redis
//! and provides functions for writing and reading them back.
use anyhow::Result;
use redis::{Commands, Connection};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sensor_core::{SensorData, SensorKind, Timestamp};

// --- Data Structures ---

/// Envelope around one session's derived result.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct ResultRecord<T> {
    pub sensor_kind: SensorKind,
    pub sense_start: Timestamp,
    pub stored_at: Timestamp,
    pub data: T,
}

impl<T: SensorData> ResultRecord<T> {
    pub fn new(data: T) -> Self {
        Self {
            sensor_kind: data.sensor_kind(),
            sense_start: data.sense_start(),
            stored_at: Timestamp::now(),
            data,
        }
    }
}

// --- Key Builders ---

pub fn result_key(kind: SensorKind, sense_start: Timestamp) -> String {
    format!("result:{}:{}", kind, sense_start.as_millis())
}

pub fn result_pattern(kind: SensorKind) -> String {
    format!("result:{}:*", kind)
}

pub fn latest_result_key(kind: SensorKind) -> String {
    format!("result:latest:{}", kind)
}

// --- Generic I/O Helpers ---

fn write_struct<T: Serialize>(
    con: &mut Connection,
    key: &str,
    value: &T,
) -> Result<()> {
    let json_string = serde_json::to_string(value)?;
    con.set::<_, _, ()>(key, json_string)?;
    Ok(())
}

fn read_struct<T: DeserializeOwned>(
    con: &mut Connection,
    key: &str,
) -> Result<Option<T>> {
    let json_string: Option<String> = con.get(key)?;
    json_string
        .map(|s| serde_json::from_str(&s).map_err(Into::into))
        .transpose()
}

// --- Read/Write Functions ---

/// Store a result under its own key with a TTL and point the kind's latest key at it.
pub fn write_result<T: SensorData + Serialize + Clone>(
    con: &mut Connection,
    data: &T,
    ttl_seconds: usize,
) -> Result<()> {
    let record = ResultRecord::new(data.clone());
    let key = result_key(record.sensor_kind, record.sense_start);
    write_struct(con, &key, &record)?;
    con.expire::<_, ()>(&key, ttl_seconds as i64)?;
    con.set::<_, _, ()>(latest_result_key(record.sensor_kind), &key)?;
    Ok(())
}

pub fn read_result<T: DeserializeOwned>(
    con: &mut Connection,
    kind: SensorKind,
    sense_start: Timestamp,
) -> Result<Option<ResultRecord<T>>> {
    read_struct(con, &result_key(kind, sense_start))
}

/// The most recently written result of `kind`, if it has not expired.
pub fn read_latest_result<T: DeserializeOwned>(
    con: &mut Connection,
    kind: SensorKind,
) -> Result<Option<ResultRecord<T>>> {
    let key: Option<String> = con.get(latest_result_key(kind))?;
    match key {
        Some(key) => read_struct(con, &key),
        None => Ok(None),
    }
}

/// All stored results of `kind`, oldest session first.
pub fn get_all_results<T: DeserializeOwned>(
    con: &mut Connection,
    kind: SensorKind,
) -> Result<Vec<ResultRecord<T>>> {
    let mut records = Vec::new();
    let keys: Vec<String> = con.keys(result_pattern(kind))?;
    if keys.is_empty() {
        return Ok(records);
    }
    let values: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query(con)?;
    for val in values.into_iter().flatten() {
        let record: ResultRecord<T> = serde_json::from_str(&val)?;
        records.push(record);
    }
    records.sort_by_key(|r| r.sense_start);
    Ok(records)
}


#[cfg(test)]
mod tests {
    use super::*;
    use redis::Client;
    use sensor_core::{Processor, Sample, SensorConfig};
    use sensor_pull::{AccelerometerData, AccelerometerProcessor};

    // NOTE: These tests require a running Redis server on the default port (6379).
    // Run them with `cargo test -- --ignored`.

    fn get_redis_connection() -> Connection {
        let client = Client::open("redis://127.0.0.1/").unwrap();
        client.get_connection().unwrap()
    }

    fn flush_db() {
        let mut con = get_redis_connection();
        redis::cmd("FLUSHDB").execute(&mut con);
    }

    fn sample_data(start: i64) -> AccelerometerData {
        AccelerometerProcessor
            .process(
                Timestamp::from_millis(start),
                &[Sample::new(0.0, 0.0, 9.81), Sample::new(0.1, 0.0, 9.79)],
                &[Timestamp::from_millis(start + 5), Timestamp::from_millis(start + 25)],
                SensorConfig::new().snapshot(),
            )
            .unwrap()
    }

    #[test]
    fn test_key_builders() {
        let start = Timestamp::from_millis(1_700_000_000_123);
        assert_eq!(
            result_key(SensorKind::Accelerometer, start),
            "result:accelerometer:1700000000123"
        );
        assert_eq!(result_pattern(SensorKind::Gyroscope), "result:gyroscope:*");
        assert_eq!(
            latest_result_key(SensorKind::Accelerometer),
            "result:latest:accelerometer"
        );
    }

    #[test]
    fn test_record_envelope_copies_identity() {
        let data = sample_data(42);
        let record = ResultRecord::new(data.clone());
        assert_eq!(record.sensor_kind, SensorKind::Accelerometer);
        assert_eq!(record.sense_start, Timestamp::from_millis(42));
        assert_eq!(record.data, data);
    }

    #[test]
    #[ignore]
    fn test_result_io() {
        flush_db();
        let mut con = get_redis_connection();

        let data = sample_data(1_000);
        assert!(write_result(&mut con, &data, 10).is_ok());

        let read: ResultRecord<AccelerometerData> =
            read_result(&mut con, SensorKind::Accelerometer, data.sense_start)
                .unwrap()
                .unwrap();
        assert_eq!(read.data, data);

        let key = result_key(SensorKind::Accelerometer, data.sense_start);
        let ttl: isize = con.ttl(&key).unwrap();
        assert!(ttl > 0 && ttl <= 10);
    }

    #[test]
    #[ignore]
    fn test_latest_and_all_results() {
        flush_db();
        let mut con = get_redis_connection();

        let none: Option<ResultRecord<AccelerometerData>> =
            read_latest_result(&mut con, SensorKind::Accelerometer).unwrap();
        assert!(none.is_none());

        let older = sample_data(2_000);
        let newer = sample_data(3_000);
        write_result(&mut con, &newer, 10).unwrap();
        write_result(&mut con, &older, 10).unwrap();

        let latest: ResultRecord<AccelerometerData> =
            read_latest_result(&mut con, SensorKind::Accelerometer)
                .unwrap()
                .unwrap();
        assert_eq!(latest.data, older);

        let all: Vec<ResultRecord<AccelerometerData>> =
            get_all_results(&mut con, SensorKind::Accelerometer).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].data, older);
        assert_eq!(all[1].data, newer);
    }
}
