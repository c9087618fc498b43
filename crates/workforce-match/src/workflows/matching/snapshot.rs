use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{tolerant_list, Candidate, Project};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read workforce snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid workforce snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Consistent copy of the candidate pool and project book a pass runs against.
///
/// Records that cannot be decoded are dropped individually when loading; only an
/// unreadable file or a document that is not JSON fails the load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkforceSnapshot {
    #[serde(default, deserialize_with = "tolerant_list")]
    pub candidates: Vec<Candidate>,
    #[serde(default, deserialize_with = "tolerant_list")]
    pub projects: Vec<Project>,
}

impl WorkforceSnapshot {
    pub fn new(candidates: Vec<Candidate>, projects: Vec<Project>) -> Self {
        Self {
            candidates,
            projects,
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Overlay roster rows: matching ids are replaced in place, new ids are appended.
    pub fn merge_roster(&mut self, roster: Vec<Candidate>) {
        let positions: HashMap<_, _> = self
            .candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| (candidate.id.clone(), index))
            .collect();

        for candidate in roster {
            match positions.get(&candidate.id) {
                Some(&index) => self.candidates[index] = candidate,
                None => self.candidates.push(candidate),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::matching::domain::{CandidateId, CandidateStatus, ProjectId};
    use crate::workflows::matching::temporal::FlexibleDate;

    #[test]
    fn loads_dirty_records_and_drops_only_the_undecodable_one() {
        let document = r#"{
            "candidates": [
                { "id": "c-1", "role": null, "status": "Available" },
                { "id": "c-2", "role": "Carpenter", "status": null },
                { "id": "c-3", "role": "Formworker", "state": "Auckland", "region": "Auckland" },
                { "id": null, "role": "Roofer" },
                { "id": "c-5", "role": "Labourer", "isMobile": "Yes", "residency": 3 }
            ],
            "projects": [
                { "id": "p-1", "name": "Harbour Tower", "region": null },
                {
                    "id": "p-2",
                    "region": "Waikato",
                    "clientDemands": [
                        { "id": "d-1", "role": "Carpenter", "startDate": 20250310 },
                        { "role": "Roofer" }
                    ]
                },
                "not a project"
            ]
        }"#;

        let snapshot = WorkforceSnapshot::from_reader(document.as_bytes()).expect("snapshot loads");

        let ids: Vec<_> = snapshot.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c-1", "c-2", "c-3", "c-5"]);
        assert_eq!(snapshot.candidates[0].role, "");
        assert_eq!(snapshot.candidates[1].status, CandidateStatus::Unavailable);
        assert_eq!(snapshot.candidates[2].state, "Auckland");
        assert!(snapshot.candidates[3].is_mobile);

        assert_eq!(snapshot.projects.len(), 2);
        assert_eq!(snapshot.projects[0].id, ProjectId::new("p-1"));
        assert_eq!(snapshot.projects[0].region, "");

        let demands = &snapshot.projects[1].client_demands;
        assert_eq!(demands.len(), 1);
        assert_eq!(
            demands[0].start_date,
            Some(FlexibleDate::Invalid("20250310".to_string()))
        );
    }

    #[test]
    fn rejects_documents_that_are_not_json() {
        let result = WorkforceSnapshot::from_reader("candidates: []".as_bytes());
        assert!(matches!(result, Err(SnapshotError::Json(_))));
    }

    #[test]
    fn roster_rows_replace_matching_ids() {
        let mut snapshot = WorkforceSnapshot::new(
            vec![Candidate {
                id: CandidateId::new("c-1"),
                role: "Labourer".to_string(),
                ..Candidate::default()
            }],
            Vec::new(),
        );

        snapshot.merge_roster(vec![
            Candidate {
                id: CandidateId::new("c-1"),
                role: "Carpenter".to_string(),
                ..Candidate::default()
            },
            Candidate {
                id: CandidateId::new("c-9"),
                ..Candidate::default()
            },
        ]);

        assert_eq!(snapshot.candidates.len(), 2);
        assert_eq!(snapshot.candidates[0].role, "Carpenter");
        assert_eq!(snapshot.candidates[1].id, CandidateId::new("c-9"));
    }
}
