// Data pipeline: decoding fetched payloads, then reconciling them

pub mod ingestion;
pub mod processing;
