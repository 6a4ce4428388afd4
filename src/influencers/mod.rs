mod fetch;
mod load;
mod parse;
mod record;

pub use fetch::fetch_bytes;
pub use load::load_dataset;
pub use record::{Dataset, InfluencerRecord};

#[cfg(test)]
pub use load::read_csv_records;
