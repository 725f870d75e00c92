use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::ir::{
    ConnectionType, Corpus, DocumentRef, Link, PartialDate, PlacementError, ScaleBand,
};

// Year-first dates: "2007", "2007-03", "2007/03/12".
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:[-/](\d{1,2})(?:[-/](\d{1,2}))?)?$").unwrap());
// Day-first dates as exported by the legacy archive: "12/03/2007".
static DMY_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
static PLAN_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1\s*:\s*(\d+)$").unwrap());

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorpusFile {
    #[serde(default)]
    documents: Vec<DocumentEntry>,
    #[serde(default)]
    links: Vec<LinkEntry>,
    #[serde(default)]
    positions: BTreeMap<String, PositionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentEntry {
    id: IdField,
    title: String,
    #[serde(rename = "type", default)]
    doc_type: String,
    scale: String,
    plan_number: Option<u32>,
    issuance_date: DateField,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkEntry {
    from: IdField,
    to: IdField,
    #[serde(rename = "type")]
    connection_type: String,
}

#[derive(Debug, Deserialize)]
struct PositionEntry {
    x: f32,
    y: f32,
}

// The legacy export is loose about id and date types: numbers and strings
// both appear.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdField {
    Num(i64),
    Str(String),
}

impl IdField {
    fn into_string(self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Str(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DateField {
    Year(i32),
    Str(String),
}

/// Parses a JSON (or lenient JSON5) corpus export into a validated
/// `Corpus`. Unrecognized scale or connection tokens and malformed dates
/// fail here rather than surfacing as NaN coordinates later.
pub fn parse_corpus(input: &str) -> Result<Corpus> {
    let file: CorpusFile = match serde_json::from_str(input) {
        Ok(file) => file,
        Err(json_err) => json5::from_str(input)
            .map_err(|_| json_err)
            .context("corpus input is not valid JSON")?,
    };

    let mut corpus = Corpus::new();
    let mut seen_ids = BTreeSet::new();

    for entry in file.documents {
        let id = entry.id.into_string();
        if !seen_ids.insert(id.clone()) {
            bail!("duplicate document id {id:?}");
        }
        let doc = convert_document(
            id,
            entry.title,
            entry.doc_type,
            &entry.scale,
            entry.plan_number,
            entry.issuance_date,
        )?;
        doc.validate()
            .with_context(|| format!("document {:?}", doc.id))?;
        corpus.documents.push(doc);
    }

    for entry in file.links {
        let from = entry.from.into_string();
        let to = entry.to.into_string();
        for id in [&from, &to] {
            if !seen_ids.contains(id.as_str()) {
                bail!("link references unknown document id {id:?}");
            }
        }
        let Some(connection_type) = ConnectionType::from_token(&entry.connection_type) else {
            bail!("unrecognized connection type {:?}", entry.connection_type);
        };
        corpus.links.push(Link {
            from,
            to,
            connection_type,
        });
    }

    for (id, position) in file.positions {
        if !seen_ids.contains(id.as_str()) {
            bail!("saved position references unknown document id {id:?}");
        }
        corpus.overrides.insert(id, (position.x, position.y));
    }

    Ok(corpus)
}

fn convert_document(
    id: String,
    title: String,
    doc_type: String,
    scale_token: &str,
    plan_number: Option<u32>,
    date: DateField,
) -> Result<DocumentRef> {
    let Some(scale) = ScaleBand::from_token(scale_token) else {
        return Err(PlacementError::InvalidScale(scale_token.to_string()))
            .with_context(|| format!("document {id:?}"));
    };
    // A "1:N" scale token carries the plan number inline.
    let plan_number = match plan_number {
        Some(n) => Some(n),
        None => PLAN_TOKEN
            .captures(scale_token.trim())
            .and_then(|caps| caps[1].parse().ok()),
    };
    let date = parse_date(date).with_context(|| format!("document {id:?}"))?;
    Ok(DocumentRef {
        id,
        title,
        doc_type,
        scale,
        plan_number,
        date,
    })
}

fn parse_date(field: DateField) -> Result<PartialDate> {
    match field {
        DateField::Year(year) => Ok(PartialDate::year_only(year)),
        DateField::Str(text) => {
            let trimmed = text.trim();
            if let Some(caps) = ISO_DATE.captures(trimmed) {
                return Ok(PartialDate {
                    year: caps[1].parse()?,
                    month: caps.get(2).map(|m| m.as_str().parse()).transpose()?,
                    day: caps.get(3).map(|d| d.as_str().parse()).transpose()?,
                });
            }
            if let Some(caps) = DMY_DATE.captures(trimmed) {
                return Ok(PartialDate {
                    year: caps[3].parse()?,
                    month: Some(caps[2].parse()?),
                    day: Some(caps[1].parse()?),
                });
            }
            Err(PlacementError::InvalidDate(text).into())
        }
    }
}
