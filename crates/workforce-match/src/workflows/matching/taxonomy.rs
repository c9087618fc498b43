use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::domain::PhaseId;

/// Lowercase, trim and strip a single trailing `s` so "Carpenters" ~ "carpenter".
///
/// Applying it twice only differs from once for roles ending in a double `s`; the engine
/// always normalises raw input exactly once.
pub fn normalize_role(role: &str) -> String {
    let lowered = role.trim().to_lowercase();
    match lowered.strip_suffix('s') {
        Some(stripped) => stripped.to_string(),
        None => lowered,
    }
}

/// Headcount range from the workforce matrix, e.g. `2-4`, `10+` or `1 Team`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrewRange {
    pub min: u32,
    pub max: Option<u32>,
}

impl CrewRange {
    pub const fn between(min: u32, max: u32) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: u32) -> Self {
        Self { min, max: None }
    }

    /// Midpoint of a closed range (rounded up) or the floor of an open one.
    pub fn typical(&self) -> u32 {
        match self.max {
            Some(max) => (self.min + max).div_ceil(2),
            None => self.min,
        }
    }
}

impl fmt::Display for CrewRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}+", self.min),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("crew range must look like `2`, `2-4`, `10+` or `2 Teams`, found '{0}'")]
pub struct CrewRangeParseError(pub String);

impl FromStr for CrewRange {
    type Err = CrewRangeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || CrewRangeParseError(value.to_string());
        let trimmed = value.trim();
        let leading = |text: &str| -> Result<u32, CrewRangeParseError> {
            let digits: String = text
                .trim()
                .chars()
                .take_while(|ch| ch.is_ascii_digit())
                .collect();
            digits.parse().map_err(|_| invalid())
        };

        if let Some(open) = trimmed.strip_suffix('+') {
            return Ok(Self::at_least(leading(open)?));
        }

        if let Some((low, high)) = trimmed.split_once('-') {
            let (min, max) = (leading(low)?, leading(high)?);
            if min > max {
                return Err(invalid());
            }
            return Ok(Self::between(min, max));
        }

        let count = leading(trimmed)?;
        Ok(Self::between(count, count))
    }
}

impl Serialize for CrewRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CrewRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Contract-value bands used to pick a typical crew size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl ProjectSize {
    /// Classify a free-text contract value such as `150M`, `$4.5M` or `12000000`.
    pub fn from_value(value: Option<&str>) -> Self {
        let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::Small;
        };

        let numeric: String = raw
            .chars()
            .filter(|ch| ch.is_ascii_digit() || *ch == '.')
            .collect();
        let Ok(mut millions) = numeric.parse::<f64>() else {
            return Self::Small;
        };

        if !raw.to_ascii_uppercase().contains('M') && millions > 1000.0 {
            millions /= 1_000_000.0;
        }

        if millions < 5.0 {
            Self::Small
        } else if millions < 20.0 {
            Self::Medium
        } else if millions < 100.0 {
            Self::Large
        } else {
            Self::ExtraLarge
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
            Self::ExtraLarge => "XL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewSizes {
    #[serde(rename = "S")]
    pub small: CrewRange,
    #[serde(rename = "M")]
    pub medium: CrewRange,
    #[serde(rename = "L")]
    pub large: CrewRange,
    #[serde(rename = "XL")]
    pub extra_large: CrewRange,
}

impl CrewSizes {
    pub fn for_size(&self, size: ProjectSize) -> CrewRange {
        match size {
            ProjectSize::Small => self.small,
            ProjectSize::Medium => self.medium,
            ProjectSize::Large => self.large,
            ProjectSize::ExtraLarge => self.extra_large,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewSizing {
    pub role: String,
    pub sizes: CrewSizes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseProfile {
    pub label: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub crews: Vec<CrewSizing>,
}

#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("failed to read role taxonomy: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid role taxonomy JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only directory of construction phases, the roles they need and acceptable
/// substitutes for each role. Injected into the engine so tests can supply fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTaxonomy {
    #[serde(default)]
    phases: BTreeMap<PhaseId, PhaseProfile>,
    #[serde(default)]
    related_roles: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_phase_roles")]
    default_roles: Vec<String>,
}

impl Default for RoleTaxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

impl RoleTaxonomy {
    pub fn new(
        phases: BTreeMap<PhaseId, PhaseProfile>,
        related_roles: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            phases,
            related_roles,
            default_roles: default_phase_roles(),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TaxonomyError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TaxonomyError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Substitutes accepted for `role`. Directed: A listing B does not imply B lists A.
    pub fn related_roles(&self, role: &str) -> &[String] {
        if let Some(related) = self.related_roles.get(role) {
            return related;
        }

        let wanted = normalize_role(role);
        self.related_roles
            .iter()
            .find(|(key, _)| normalize_role(key) == wanted)
            .map(|(_, related)| related.as_slice())
            .unwrap_or(&[])
    }

    pub fn roles_for_phase(&self, phase_id: &PhaseId) -> Vec<&str> {
        match self.phases.get(phase_id) {
            Some(profile) if !profile.crews.is_empty() => {
                profile.crews.iter().map(|crew| crew.role.as_str()).collect()
            }
            _ => self.default_roles.iter().map(String::as_str).collect(),
        }
    }

    pub fn phase(&self, phase_id: &PhaseId) -> Option<&PhaseProfile> {
        self.phases.get(phase_id)
    }

    pub fn phase_label(&self, phase_id: &PhaseId) -> String {
        self.phases
            .get(phase_id)
            .map(|profile| profile.label.clone())
            .unwrap_or_else(|| phase_id.to_string())
    }

    pub fn typical_crew(&self, phase_id: &PhaseId, role: &str, size: ProjectSize) -> Option<u32> {
        self.phases
            .get(phase_id)?
            .crews
            .iter()
            .find(|crew| crew.role == role)
            .map(|crew| crew.sizes.for_size(size).typical())
    }

    /// The construction catalogue used by the staffing desk.
    pub fn standard() -> Self {
        let phases = standard_phases()
            .into_iter()
            .map(|(id, label, action, crews)| {
                (
                    PhaseId::new(id),
                    PhaseProfile {
                        label: label.to_string(),
                        action: action.to_string(),
                        crews,
                    },
                )
            })
            .collect();

        let related_roles = standard_related_roles()
            .into_iter()
            .map(|(role, related)| {
                (
                    role.to_string(),
                    related.iter().map(|name| name.to_string()).collect(),
                )
            })
            .collect();

        Self::new(phases, related_roles)
    }
}

fn default_phase_roles() -> Vec<String> {
    ["Carpenter", "Hammerhand", "Laborer"]
        .iter()
        .map(|role| role.to_string())
        .collect()
}

const fn r(min: u32, max: u32) -> CrewRange {
    CrewRange::between(min, max)
}

const fn plus(min: u32) -> CrewRange {
    CrewRange::at_least(min)
}

fn crew(role: &str, [small, medium, large, extra_large]: [CrewRange; 4]) -> CrewSizing {
    CrewSizing {
        role: role.to_string(),
        sizes: CrewSizes {
            small,
            medium,
            large,
            extra_large,
        },
    }
}

type PhaseRow = (&'static str, &'static str, &'static str, Vec<CrewSizing>);

fn standard_phases() -> Vec<PhaseRow> {
    vec![
        (
            "01_civil",
            "Civil & Excavation",
            "Mobilize Excavator Operators & Civil Crew",
            vec![
                crew("Excavator Operator", [r(1, 2), r(2, 4), r(4, 8), plus(10)]),
                crew("Civil Labourer", [r(1, 2), r(2, 4), r(5, 10), plus(15)]),
            ],
        ),
        (
            "02a_concrete",
            "Concrete Structure",
            "Start Formworkers & Steel Fixers",
            vec![
                crew("Formworker", [r(2, 4), r(5, 12), r(15, 30), plus(40)]),
                crew("Steel Fixer", [r(1, 2), r(3, 6), r(8, 15), plus(25)]),
                crew("Concrete Carpenter", [r(3, 5), r(6, 10), r(12, 20), plus(30)]),
            ],
        ),
        (
            "02b_steel",
            "Structural Steel",
            "Mobilize Crane & Steel Riggers",
            vec![
                crew("Steel Fixer", [r(1, 2), r(3, 5), r(5, 10), plus(15)]),
                crew("Crane Operator", [r(0, 0), r(1, 1), r(2, 2), r(4, 4)]),
            ],
        ),
        (
            "02c_framing",
            "Timber Framing",
            "Start Framing Carpenter Crews",
            vec![crew("Carpenter", [r(2, 4), r(5, 10), r(10, 20), plus(30)])],
        ),
        (
            "03a_roofing",
            "Roofing",
            "Mobilize Roofing Team",
            vec![crew("Roofer", [r(2, 2), r(2, 4), r(5, 10), plus(15)])],
        ),
        (
            "03b_facade",
            "Facade & Glazing",
            "Engage Glaziers & Facade Techs",
            vec![
                crew("Glazier", [r(2, 2), r(2, 6), r(8, 15), plus(20)]),
                crew("Cladder / Facade Tech", [r(2, 2), r(2, 6), r(8, 15), plus(20)]),
            ],
        ),
        (
            "03c_scaffolding",
            "Scaffolding",
            "Erect External Scaffolding",
            vec![crew("Scaffolder", [r(2, 3), r(4, 8), r(10, 20), plus(40)])],
        ),
        (
            "04a_electrical_rough",
            "Electrical Rough-in",
            "Start Cable Pulling & Rough-in",
            vec![crew("Electrician", [r(2, 2), r(4, 8), r(15, 25), plus(50)])],
        ),
        (
            "04b_plumbing_rough",
            "Plumbing Rough-in",
            "Start Pipework & Drainage",
            vec![crew(
                "Plumber / Pipe Fitter",
                [r(2, 2), r(4, 6), r(10, 20), plus(40)],
            )],
        ),
        (
            "04c_hvac",
            "HVAC & Mechanical",
            "Install Ductwork & Units",
            vec![crew(
                "Duct Installer (HVAC)",
                [r(2, 2), r(4, 8), r(12, 20), plus(30)],
            )],
        ),
        (
            "05a_linings_stopping",
            "Linings & Stopping",
            "Start GIB Fixing & Stopping",
            vec![
                crew("GIB Fixer / Plasterer", [r(1, 2), r(3, 6), r(10, 15), plus(25)]),
                crew("GIB Stopper", [r(1, 2), r(3, 6), r(10, 15), plus(25)]),
            ],
        ),
        (
            "05b_carpentry_trim",
            "Carpentry Trim",
            "Second Fix Carpentry & Trim",
            vec![crew("Carpenter", [r(2, 4), r(6, 12), r(20, 40), plus(60)])],
        ),
        (
            "05c_flooring",
            "Flooring",
            "Install Specialized Flooring",
            vec![crew("Flooring Installer", [r(1, 2), r(2, 4), r(6, 10), plus(15)])],
        ),
        (
            "05d_painting",
            "Painting",
            "Start Finishing & Internal Painting",
            vec![crew("Painter", [r(2, 3), r(4, 8), r(12, 20), plus(30)])],
        ),
        (
            "06_handover",
            "Defects & Handover",
            "Final Clean & Defects Management",
            vec![
                crew(
                    "General Labourer / Hammerhand",
                    [r(2, 2), r(4, 6), r(10, 20), plus(30)],
                ),
                crew("Carpenter", [r(1, 1), r(2, 3), r(4, 6), plus(8)]),
            ],
        ),
    ]
}

fn standard_related_roles() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        (
            "Carpenter",
            &[
                "Formworker",
                "Concrete Carpenter",
                "General Labourer / Hammerhand",
            ],
        ),
        ("Formworker", &["Carpenter", "Concrete Carpenter"]),
        ("Concrete Carpenter", &["Carpenter", "Formworker"]),
        ("Civil Labourer", &["General Labourer / Hammerhand"]),
        ("General Labourer / Hammerhand", &["Civil Labourer"]),
        ("Electrician", &["Electrician (Cable Puller)"]),
        ("Electrician (Cable Puller)", &["Electrician"]),
        ("GIB Stopper", &["GIB Fixer / Plasterer"]),
        ("GIB Fixer / Plasterer", &["GIB Stopper"]),
        ("Excavator Operator", &["Civil Labourer"]),
    ]
}
