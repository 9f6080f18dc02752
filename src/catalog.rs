use anyhow::Result;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::error::{BlogError, Tiered};

/// A numeric racket spec. The sheet stores these as free text, so anything
/// that does not start with a number is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Value { amount: f64, unit: String },
    Raw(String),
    Missing,
}

impl Measurement {
    pub fn parse(text: &str, default_unit: &str) -> Self {
        static NUMBER: OnceLock<Regex> = OnceLock::new();
        let re = NUMBER.get_or_init(|| Regex::new(r"^(\d+(?:[.,]\d+)?)\s*(\S.*)?$").unwrap());

        let text = text.trim();
        if text.is_empty() {
            return Measurement::Missing;
        }

        let Some(cap) = re.captures(text) else {
            return Measurement::Raw(text.to_string());
        };

        match cap[1].replace(',', ".").parse::<f64>() {
            Ok(amount) => Measurement::Value {
                amount,
                unit: cap
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_else(|| default_unit.to_string()),
            },
            Err(_) => Measurement::Raw(text.to_string()),
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Value { amount, unit } if amount.fract() == 0.0 => write!(f, "{:.0} {}", amount, unit),
            Measurement::Value { amount, unit } => write!(f, "{} {}", amount, unit),
            Measurement::Raw(text) => f.write_str(text),
            Measurement::Missing => f.write_str("n/a"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    pub racket_type: String,
    pub weight: Measurement,
    pub head_size: Measurement,
    pub balance: Measurement,
    pub string_pattern: String,
    pub best_for: String,
    pub standout_tech: String,
    pub skill_level: String,
    pub affiliate_link: String,
}

// One sheet row, keyed by column header. Missing columns read as "".
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SheetRow {
    #[serde(rename = "#")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    racket_type: String,
    #[serde(rename = "Weight (Unstrung, g)")]
    weight: String,
    #[serde(rename = "Head Size (in²)")]
    head_size: String,
    #[serde(rename = "Balance (cm)")]
    balance: String,
    #[serde(rename = "String Pattern")]
    string_pattern: String,
    #[serde(rename = "Best For")]
    best_for: String,
    #[serde(rename = "Standout Tech")]
    standout_tech: String,
    #[serde(rename = "Skill Level")]
    skill_level: String,
    #[serde(rename = "Link")]
    link: String,
}

impl From<SheetRow> for CatalogRecord {
    fn from(row: SheetRow) -> Self {
        Self {
            id: row.id.trim().to_string(),
            name: row.name.trim().to_string(),
            racket_type: row.racket_type.trim().to_string(),
            weight: Measurement::parse(&row.weight, "g"),
            head_size: Measurement::parse(&row.head_size, "in²"),
            balance: Measurement::parse(&row.balance, "cm"),
            string_pattern: row.string_pattern.trim().to_string(),
            best_for: row.best_for.trim().to_string(),
            standout_tech: row.standout_tech.trim().to_string(),
            skill_level: row.skill_level.trim().to_string(),
            affiliate_link: row.link.trim().to_string(),
        }
    }
}

pub struct CatalogLoader {
    client: Client,
    url: String,
}

impl CatalogLoader {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    /// Fetches the sheet; any failure yields the embedded records instead.
    pub async fn load(&self) -> Tiered<Vec<CatalogRecord>> {
        info!(url = %self.url, "Loading racket catalog");

        match self.fetch().await {
            Ok(records) => {
                info!(count = records.len(), "Loaded rackets from catalog feed");
                Tiered::Primary(records)
            }
            Err(e) => {
                warn!(error = %e, "Catalog unavailable, using embedded rackets");
                Tiered::Fallback(fallback_records())
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<CatalogRecord>> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(BlogError::SourceUnavailable(format!("HTTP status {}", response.status())).into());
        }

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .and_then(|ct| ct.split("charset=").nth(1))
            .map(|cs| cs.trim().to_string());
        let bytes = response.bytes().await?;

        let records = parse_csv(&decode(&bytes, charset.as_deref()))?;
        if records.is_empty() {
            return Err(BlogError::SourceUnavailable("feed contained no named rows".into()).into());
        }

        Ok(records)
    }
}

fn decode(bytes: &[u8], charset: Option<&str>) -> String {
    if let Some(encoding) = charset.and_then(|cs| Encoding::for_label(cs.as_bytes())) {
        let (text, _, _) = encoding.decode(bytes);
        return text.into_owned();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

pub fn parse_csv(text: &str) -> Result<Vec<CatalogRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for row in reader.deserialize::<SheetRow>() {
        let row = row?;
        if row.name.trim().is_empty() {
            continue;
        }
        records.push(CatalogRecord::from(row));
    }

    Ok(records)
}

pub fn fallback_records() -> Vec<CatalogRecord> {
    vec![
        CatalogRecord {
            id: "1".into(),
            name: "Babolat Pure Aero 2023".into(),
            racket_type: "Power".into(),
            weight: Measurement::parse("300", "g"),
            head_size: Measurement::parse("100", "in²"),
            balance: Measurement::parse("32.5", "cm"),
            string_pattern: "16x19".into(),
            best_for: "Spin & Power".into(),
            standout_tech: "AeroModular".into(),
            skill_level: "Intermediate+".into(),
            affiliate_link: "https://amzn.to/3JOKGWA".into(),
        },
        CatalogRecord {
            id: "2".into(),
            name: "Wilson Pro Staff RF97 v14".into(),
            racket_type: "Control".into(),
            weight: Measurement::parse("339", "g"),
            head_size: Measurement::parse("97", "in²"),
            balance: Measurement::parse("31.5", "cm"),
            string_pattern: "16x19".into(),
            best_for: "Precision".into(),
            standout_tech: "Braided Graphite".into(),
            skill_level: "Advanced".into(),
            affiliate_link: "https://www.amazon.com/Wilson-Staff-Performance-Tennis-Racket/dp/B0BV8C4ZWX/".into(),
        },
    ]
}
