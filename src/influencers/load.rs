use std::collections::HashSet;
use std::io::Read;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing::{debug, info};

use super::fetch::fetch_bytes;
use super::parse::RawValue;
use super::record::{Dataset, InfluencerRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    pub fn for_source(source: &str) -> Self {
        let path = source.split(['?', '#']).next().unwrap_or(source);
        if path.to_ascii_lowercase().ends_with(".json") {
            Self::Json
        } else {
            Self::Csv
        }
    }
}

/// One source row before normalization. CSV cells arrive as `String`, JSON
/// cells as [`RawValue`]. Every column is optional so a missing column turns
/// into NaN or empty text instead of a load failure.
#[derive(Debug, Deserialize)]
struct RawRow<V> {
    #[serde(rename = "Rank")]
    rank: Option<V>,
    #[serde(rename = "Channel Info")]
    channel_name: Option<String>,
    #[serde(rename = "Country Or Region")]
    country: Option<String>,
    #[serde(rename = "Followers")]
    followers: Option<V>,
    #[serde(rename = "60-Day Eng Rate")]
    engagement_rate: Option<V>,
    #[serde(rename = "Influence Score")]
    influence_score: Option<V>,
    #[serde(rename = "Avg. Likes")]
    avg_likes: Option<V>,
    #[serde(rename = "Posts")]
    posts: Option<V>,
    #[serde(rename = "ImageURL")]
    image_url: Option<String>,
}

impl<V: Into<RawValue>> RawRow<V> {
    fn into_record(self, row: usize) -> Result<InfluencerRecord> {
        let rank = self
            .rank
            .map(Into::into)
            .ok_or_else(|| anyhow!("row {row} has no Rank"))
            .and_then(|value| parse_rank(&value))
            .with_context(|| format!("invalid rank in row {row}"))?;

        let magnitude = |value: Option<V>| {
            value
                .map(|value| value.into().magnitude())
                .unwrap_or(f64::NAN)
        };
        let followers = magnitude(self.followers);
        let engagement_rate = magnitude(self.engagement_rate);
        let avg_likes = magnitude(self.avg_likes);
        let post_count = magnitude(self.posts);
        let influence_score = self
            .influence_score
            .map(|value| value.into().plain())
            .unwrap_or(f64::NAN);

        Ok(InfluencerRecord {
            rank,
            channel_name: self.channel_name.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            followers,
            influence_score,
            engagement_rate,
            avg_likes,
            post_count,
            image_url: self.image_url.unwrap_or_default().trim().to_owned(),
        })
    }
}

fn parse_rank(value: &RawValue) -> Result<u32> {
    let number = value.plain();
    if number.is_finite()
        && number >= 0.0
        && number.fract() == 0.0
        && number <= f64::from(u32::MAX)
    {
        Ok(number as u32)
    } else {
        Err(anyhow!("{value:?} is not a non-negative integer"))
    }
}

fn check_unique_ranks(records: &[InfluencerRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.rank) {
            return Err(anyhow!("rank {} appears more than once", record.rank));
        }
    }
    Ok(())
}

pub fn read_csv_records<R: Read>(reader: R) -> Result<Vec<InfluencerRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<RawRow<String>>().enumerate() {
        let row_number = index + 1;
        let row = row.with_context(|| format!("malformed CSV row {row_number}"))?;
        records.push(row.into_record(row_number)?);
    }

    check_unique_ranks(&records)?;
    Ok(records)
}

pub fn read_json_records(raw: &[u8]) -> Result<Vec<InfluencerRecord>> {
    let rows: Vec<RawRow<RawValue>> =
        serde_json::from_slice(raw).context("dataset JSON must be an array of row objects")?;

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| row.into_record(index + 1))
        .collect::<Result<Vec<_>>>()?;

    check_unique_ranks(&records)?;
    Ok(records)
}

pub fn load_dataset(source: &str) -> Result<Dataset> {
    let raw = fetch_bytes(source).with_context(|| format!("failed to fetch dataset {source}"))?;
    let format = TableFormat::for_source(source);
    debug!(source, ?format, bytes = raw.len(), "dataset fetched");

    let records = match format {
        TableFormat::Csv => read_csv_records(raw.as_slice()),
        TableFormat::Json => read_json_records(&raw),
    }
    .with_context(|| format!("failed to parse dataset {source}"))?;

    info!(source, records = records.len(), "data loaded");
    Ok(Dataset {
        source: source.to_owned(),
        records,
    })
}
