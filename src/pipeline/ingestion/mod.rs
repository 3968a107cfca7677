// Pipeline ingestion: turning fetched bytes into raw records

pub mod decode;
