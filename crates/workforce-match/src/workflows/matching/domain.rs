use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use super::temporal::{optional_flexible_date, FlexibleDate};

macro_rules! flexible_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

/// Upstream records carry identifiers as either JSON strings or numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(text) => text.trim().to_string(),
            RawId::Integer(value) => value.to_string(),
            RawId::Float(value) => value.to_string(),
        }
    }
}

flexible_id!(
    /// Identifier of a worker in the candidate pool.
    CandidateId
);
flexible_id!(ProjectId);
flexible_id!(ClientId);
flexible_id!(DemandId);
flexible_id!(RequirementId);
flexible_id!(
    /// Construction phase key such as `02a_concrete`.
    PhaseId
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Available,
    OnJob,
    Placed,
    #[default]
    Unavailable,
}

impl CandidateStatus {
    /// Lenient, case-insensitive parse. Unrecognised statuses are treated as unavailable.
    pub fn from_label(value: &str) -> Self {
        let normalized: String = value
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|ch| if ch == ' ' || ch == '-' { '_' } else { ch })
            .collect();

        match normalized.as_str() {
            "available" => Self::Available,
            "on_job" | "onjob" => Self::OnJob,
            "placed" => Self::Placed,
            _ => Self::Unavailable,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::OnJob => "On Job",
            Self::Placed => "Placed",
            Self::Unavailable => "Unavailable",
        }
    }
}

impl<'de> Deserialize<'de> for CandidateStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_text(deserializer)?;
        Ok(Self::from_label(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Residency {
    Citizen,
    PermanentResident,
    WorkVisa,
    Other(String),
}

impl Residency {
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "citizen" | "nz citizen" => Self::Citizen,
            "resident" | "permanent resident" | "permanent_resident" => Self::PermanentResident,
            "work visa" | "work_visa" => Self::WorkVisa,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Citizen => "Citizen",
            Self::PermanentResident => "Permanent Resident",
            Self::WorkVisa => "Work Visa",
            Self::Other(label) => label,
        }
    }
}

impl Serialize for Residency {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Residency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_text(deserializer)?;
        Ok(Self::from_label(&raw))
    }
}

/// A worker available for placement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CandidateRecord")]
pub struct Candidate {
    pub id: CandidateId,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub status: CandidateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_date: Option<FlexibleDate>,
    pub is_mobile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residency: Option<Residency>,
    pub state: String,
    pub suburb: String,
}

/// Wire shape of a candidate. Older exports name the home locality `region`,
/// newer ones `state`, and some carry both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateRecord {
    id: CandidateId,
    #[serde(default, deserialize_with = "lenient_text")]
    first_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    last_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    role: String,
    #[serde(default)]
    status: CandidateStatus,
    #[serde(default, deserialize_with = "optional_flexible_date")]
    finish_date: Option<FlexibleDate>,
    #[serde(default, deserialize_with = "lenient_flag")]
    is_mobile: bool,
    #[serde(default, deserialize_with = "optional_residency")]
    residency: Option<Residency>,
    #[serde(default, deserialize_with = "lenient_text")]
    state: String,
    #[serde(default, deserialize_with = "lenient_text")]
    region: String,
    #[serde(default, deserialize_with = "lenient_text")]
    suburb: String,
}

impl From<CandidateRecord> for Candidate {
    fn from(record: CandidateRecord) -> Self {
        let state = if record.state.trim().is_empty() {
            record.region
        } else {
            record.state
        };

        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            role: record.role,
            status: record.status,
            finish_date: record.finish_date,
            is_mobile: record.is_mobile,
            residency: record.residency,
            state,
            suburb: record.suburb,
        }
    }
}

impl Candidate {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.id.to_string()
        } else {
            name.to_string()
        }
    }

    /// Mobile workers (explicit flag or work-visa crews) can be placed in any region.
    pub fn is_geographically_flexible(&self) -> bool {
        self.is_mobile || matches!(self.residency, Some(Residency::WorkVisa))
    }

    /// Home locality used for region matching: `state`, falling back to `suburb`.
    pub fn locality(&self) -> &str {
        if self.state.trim().is_empty() {
            self.suburb.trim()
        } else {
            self.state.trim()
        }
    }
}

/// Explicit labour request submitted by a client contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDemand {
    pub id: DemandId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub role: String,
    #[serde(default = "default_quantity", deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    #[serde(
        default,
        deserialize_with = "optional_flexible_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<FlexibleDate>,
}

/// Recruiter plan for when a construction phase begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSetting {
    #[serde(
        default,
        deserialize_with = "optional_flexible_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<FlexibleDate>,
    #[serde(default = "default_offset_weeks", deserialize_with = "lenient_offset")]
    pub offset_weeks: u32,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub skipped: bool,
}

impl Default for PhaseSetting {
    fn default() -> Self {
        Self {
            start_date: None,
            offset_weeks: default_offset_weeks(),
            skipped: false,
        }
    }
}

impl PhaseSetting {
    /// Date by which sourcing for the phase should have started.
    pub fn alert_date(&self) -> Option<chrono::NaiveDate> {
        let start = self.start_date.as_ref()?.date()?;
        start.checked_sub_signed(chrono::Duration::weeks(i64::from(self.offset_weeks)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborRequirement {
    pub id: RequirementId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub trade: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub required_count: u32,
    #[serde(default, deserialize_with = "tolerant_list")]
    pub assigned_ids: Vec<CandidateId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPackage {
    pub phase: PhaseId,
    #[serde(default, deserialize_with = "tolerant_list")]
    pub labor_requirements: Vec<LaborRequirement>,
}

/// A client engagement with a labour pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub region: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: String,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "tolerant_list")]
    pub assigned_company_ids: Vec<ClientId>,
    #[serde(default, deserialize_with = "tolerant_list")]
    pub client_demands: Vec<ClientDemand>,
    #[serde(default, deserialize_with = "tolerant_map")]
    pub phase_settings: BTreeMap<PhaseId, PhaseSetting>,
    #[serde(default, deserialize_with = "tolerant_map")]
    pub packages: BTreeMap<String, WorkPackage>,
}

impl Project {
    pub fn requirement(&self, requirement_id: &RequirementId) -> Option<&LaborRequirement> {
        self.packages
            .values()
            .flat_map(|package| package.labor_requirements.iter())
            .find(|requirement| &requirement.id == requirement_id)
    }

    pub fn requirement_mut(
        &mut self,
        requirement_id: &RequirementId,
    ) -> Option<&mut LaborRequirement> {
        self.packages
            .values_mut()
            .flat_map(|package| package.labor_requirements.iter_mut())
            .find(|requirement| &requirement.id == requirement_id)
    }

    pub fn requirements_for_phase<'a>(
        &'a self,
        phase_id: &'a PhaseId,
    ) -> impl Iterator<Item = &'a LaborRequirement> + 'a {
        self.packages
            .values()
            .filter(move |package| &package.phase == phase_id)
            .flat_map(|package| package.labor_requirements.iter())
    }
}

fn default_quantity() -> u32 {
    1
}

fn default_offset_weeks() -> u32 {
    2
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Number(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl RawCount {
    fn value(self) -> Option<u32> {
        match self {
            RawCount::Number(value) => u32::try_from(value).ok(),
            RawCount::Signed(value) => u32::try_from(value.max(0)).ok(),
            RawCount::Float(value) if value.is_finite() && value >= 0.0 => {
                Some(value.trunc().min(f64::from(u32::MAX)) as u32)
            }
            RawCount::Float(_) => Some(0),
            RawCount::Text(text) => {
                let digits: String = text
                    .trim()
                    .chars()
                    .take_while(|ch| ch.is_ascii_digit())
                    .collect();
                digits.parse().ok()
            }
        }
    }
}

/// Quantities arrive as numbers or form strings; unparseable or zero quantities count as one.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCount>::deserialize(deserializer)?;
    Ok(raw
        .and_then(RawCount::value)
        .filter(|quantity| *quantity > 0)
        .unwrap_or_else(default_quantity))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCount>::deserialize(deserializer)?;
    Ok(raw.and_then(RawCount::value).unwrap_or(0))
}

fn lenient_offset<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCount>::deserialize(deserializer)?;
    Ok(raw
        .and_then(RawCount::value)
        .unwrap_or_else(default_offset_weeks))
}

fn text_of(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Free text: `null` reads as empty, numbers and booleans keep their JSON spelling.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.map(text_of).unwrap_or_default())
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = lenient_text(deserializer)?;
    Ok(Some(text).filter(|text| !text.trim().is_empty()))
}

fn optional_residency<'de, D>(deserializer: D) -> Result<Option<Residency>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.map(|label| Residency::from_label(&label)))
}

/// Booleans exported by spreadsheets arrive as `true`, `"Yes"`, `1` or nothing at all.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|value| value != 0.0),
        Some(Value::String(text)) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        ),
        _ => false,
    })
}

/// Decode each element on its own so one malformed record never sinks its siblings.
pub(crate) fn tolerant_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let records = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(records)) => records,
        _ => Vec::new(),
    };

    Ok(records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                debug!(
                    record = std::any::type_name::<T>(),
                    index,
                    %error,
                    "skipping malformed record"
                );
                None
            }
        })
        .collect())
}

fn tolerant_map<'de, D, K, V>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: DeserializeOwned + Ord,
    V: DeserializeOwned,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(entries)) => entries,
        _ => serde_json::Map::new(),
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| {
            let parsed = serde_json::from_value::<K>(Value::String(key.clone()))
                .and_then(|parsed_key| Ok((parsed_key, serde_json::from_value::<V>(value)?)));
            match parsed {
                Ok(entry) => Some(entry),
                Err(error) => {
                    debug!(key = %key, %error, "skipping malformed entry");
                    None
                }
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_accept_strings_and_numbers() {
        let candidate: Candidate = serde_json::from_value(json!({
            "id": 42,
            "role": "Carpenter",
            "status": "Available"
        }))
        .expect("candidate parses");
        assert_eq!(candidate.id, CandidateId::new("42"));

        let candidate: Candidate =
            serde_json::from_value(json!({ "id": " c-7 " })).expect("candidate parses");
        assert_eq!(candidate.id.as_str(), "c-7");
    }

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!(
            CandidateStatus::from_label("AVAILABLE"),
            CandidateStatus::Available
        );
        assert_eq!(CandidateStatus::from_label("On Job"), CandidateStatus::OnJob);
        assert_eq!(CandidateStatus::from_label("on_job"), CandidateStatus::OnJob);
        assert_eq!(
            CandidateStatus::from_label("holiday"),
            CandidateStatus::Unavailable
        );
    }

    #[test]
    fn candidate_region_fallback_and_work_visa_mobility() {
        let candidate: Candidate = serde_json::from_value(json!({
            "id": "c1",
            "region": "Waikato",
            "residency": "Work Visa",
            "finishDate": "not a date"
        }))
        .expect("candidate parses");

        assert_eq!(candidate.state, "Waikato");
        assert!(candidate.is_geographically_flexible());
        assert_eq!(
            candidate.finish_date,
            Some(FlexibleDate::Invalid("not a date".to_string()))
        );
    }

    #[test]
    fn project_parses_dashboard_payload() {
        let project: Project = serde_json::from_value(json!({
            "id": 7,
            "name": "Harbour Tower",
            "region": "Auckland",
            "clientDemands": [
                { "id": "d1", "role": "Carpenter", "quantity": "3", "startDate": "14/03/2025" },
                { "id": "d2", "role": "Roofer", "quantity": null, "startDate": "" }
            ],
            "phaseSettings": {
                "01_civil": { "startDate": "2025-04-01", "offsetWeeks": 4, "skipped": false }
            },
            "packages": {
                "pkg-1": {
                    "phase": "01_civil",
                    "laborRequirements": [
                        { "id": "lr1", "trade": "Civil Labourer", "requiredCount": 3, "assignedIds": [1, "c2"] }
                    ]
                }
            }
        }))
        .expect("project parses");

        assert_eq!(project.client_demands[0].quantity, 3);
        assert_eq!(project.client_demands[1].quantity, 1);
        assert!(project.client_demands[1].start_date.is_none());

        let civil = &project.phase_settings[&PhaseId::new("01_civil")];
        assert_eq!(
            civil.alert_date(),
            chrono::NaiveDate::from_ymd_opt(2025, 3, 4)
        );

        let requirement = project
            .requirement(&RequirementId::new("lr1"))
            .expect("requirement present");
        assert_eq!(
            requirement.assigned_ids,
            vec![CandidateId::new("1"), CandidateId::new("c2")]
        );
    }

    #[test]
    fn candidate_tolerates_nulls_and_both_locality_keys() {
        let candidate: Candidate = serde_json::from_value(json!({
            "id": "c2",
            "firstName": null,
            "role": null,
            "status": null,
            "residency": null,
            "state": "Auckland",
            "region": "Auckland"
        }))
        .expect("candidate parses");

        assert_eq!(candidate.role, "");
        assert_eq!(candidate.status, CandidateStatus::Unavailable);
        assert!(candidate.residency.is_none());
        assert_eq!(candidate.display_name(), "c2");
        assert_eq!(candidate.locality(), "Auckland");

        let candidate: Candidate = serde_json::from_value(json!({
            "id": "c3",
            "state": "  ",
            "region": "Waikato"
        }))
        .expect("candidate parses");
        assert_eq!(candidate.state, "Waikato");
    }

    #[test]
    fn project_tolerates_nulls_and_numeric_dates() {
        let project: Project = serde_json::from_value(json!({
            "id": "p9",
            "name": null,
            "region": null,
            "value": 1250000,
            "clientDemands": [
                { "id": "d1", "role": null, "startDate": 20250310 },
                { "id": null, "role": "Roofer" }
            ],
            "phaseSettings": {
                "01_civil": { "startDate": "2025-04-01", "offsetWeeks": null, "skipped": "yes" },
                "02a_concrete": "tbc"
            }
        }))
        .expect("project parses");

        assert_eq!(project.region, "");
        assert_eq!(project.value.as_deref(), Some("1250000"));
        assert_eq!(project.client_demands.len(), 1);
        assert_eq!(project.client_demands[0].role, "");
        assert_eq!(
            project.client_demands[0].start_date,
            Some(FlexibleDate::Invalid("20250310".to_string()))
        );

        let civil = &project.phase_settings[&PhaseId::new("01_civil")];
        assert_eq!(civil.offset_weeks, 2);
        assert!(civil.skipped);
        assert_eq!(project.phase_settings.len(), 1);
    }
}
