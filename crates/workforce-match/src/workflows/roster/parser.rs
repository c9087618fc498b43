use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::matching::{
    Candidate, CandidateId, CandidateStatus, FlexibleDate, Residency,
};

/// One roster line with its id already validated.
#[derive(Debug)]
pub(crate) struct RosterRecord {
    pub(crate) line: u64,
    pub(crate) candidate: Option<Candidate>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<RosterRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        let row: RosterRow = record.deserialize(Some(&headers))?;
        records.push(RosterRecord {
            line,
            candidate: row.into_candidate(),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "ID", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "First Name", default)]
    first_name: String,
    #[serde(rename = "Last Name", default)]
    last_name: String,
    #[serde(rename = "Role", default)]
    role: String,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(
        rename = "Finish Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    finish_date: Option<String>,
    #[serde(rename = "Mobile", default, deserialize_with = "empty_string_as_none")]
    mobile: Option<String>,
    #[serde(
        rename = "Residency",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    residency: Option<String>,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Suburb", default)]
    suburb: String,
}

impl RosterRow {
    fn into_candidate(self) -> Option<Candidate> {
        let id = self.id?;
        Some(Candidate {
            id: CandidateId::new(id),
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            status: self
                .status
                .as_deref()
                .map(CandidateStatus::from_label)
                .unwrap_or_default(),
            finish_date: self.finish_date.as_deref().map(FlexibleDate::parse),
            is_mobile: self.mobile.as_deref().is_some_and(parse_flag),
            residency: self.residency.as_deref().map(Residency::from_label),
            state: self.state,
            suburb: self.suburb,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_flags_accept_common_spellings() {
        for truthy in ["yes", "Y", " TRUE ", "1"] {
            assert!(parse_flag(truthy), "{truthy}");
        }
        for falsy in ["no", "n", "false", "0", "maybe", ""] {
            assert!(!parse_flag(falsy), "{falsy}");
        }
    }
}
