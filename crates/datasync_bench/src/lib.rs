//! Benchmark utilities.

use datasync_engine::KeyedCollection;
use rand::seq::SliceRandom;
use rand::Rng;

/// A synthetic record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Record key.
    pub id: u64,
    /// Payload compared by the benchmarks.
    pub payload: Vec<u8>,
}

/// Generate random payload bytes of the specified size.
pub fn random_payload(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` records with ids `0..count` in random order.
pub fn generate_records(count: usize, payload_size: usize) -> Vec<Record> {
    let mut ids: Vec<u64> = (0..count as u64).collect();
    ids.shuffle(&mut rand::thread_rng());
    ids.into_iter()
        .map(|id| Record {
            id,
            payload: random_payload(payload_size),
        })
        .collect()
}

/// Derive a destination from `source` where roughly `churn` of the records
/// were removed, changed or are new.
pub fn mutate(source: &[Record], churn: f64) -> Vec<Record> {
    let mut rng = rand::thread_rng();
    let mut next_id = source.len() as u64;
    let mut destination = Vec::with_capacity(source.len());

    for record in source {
        if rng.gen_bool(churn) {
            match rng.gen_range(0..3) {
                0 => continue,
                1 => destination.push(Record {
                    id: record.id,
                    payload: random_payload(record.payload.len()),
                }),
                _ => {
                    destination.push(record.clone());
                    destination.push(Record {
                        id: next_id,
                        payload: random_payload(record.payload.len()),
                    });
                    next_id += 1;
                }
            }
        } else {
            destination.push(record.clone());
        }
    }
    destination
}

/// Index records by id.
pub fn keyed(records: &[Record]) -> KeyedCollection<u64, Record> {
    records.iter().map(|r| (r.id, r.clone())).collect()
}
