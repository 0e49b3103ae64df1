use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResumeStatus {
    #[default]
    Pending,
    Updated,
}

impl ResumeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResumeStatus::Pending => "Pending",
            ResumeStatus::Updated => "Updated",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attendance {
    #[default]
    Missed,
    Completed,
}

impl Attendance {
    pub fn as_str(self) -> &'static str {
        match self {
            Attendance::Missed => "Missed",
            Attendance::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TrainingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TrainingStatus::NotStarted => "Not Started",
            TrainingStatus::InProgress => "In Progress",
            TrainingStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsultantRow {
    pub id: i32,
    pub name: String,
    pub resume_status: String,
    pub attendance: String,
    pub opportunities: i32,
    pub training: String,
    pub assigned_training: Option<String>,
    /// Extracted resume text. Large; never sent back in listings.
    #[serde(skip_serializing, default)]
    pub resume_text: String,
    pub resume_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConsultantRow {
    /// 25 points each for an updated resume, completed attendance,
    /// at least one opportunity, and completed training.
    pub fn progress(&self) -> u8 {
        let checks = [
            self.resume_status == ResumeStatus::Updated.as_str(),
            self.attendance == Attendance::Completed.as_str(),
            self.opportunities > 0,
            self.training == TrainingStatus::Completed.as_str(),
        ];
        checks.iter().filter(|done| **done).count() as u8 * 25
    }
}

/// Consultant as returned by the API, with derived progress.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultantView {
    #[serde(flatten)]
    pub consultant: ConsultantRow,
    pub progress: u8,
}

impl From<ConsultantRow> for ConsultantView {
    fn from(consultant: ConsultantRow) -> Self {
        let progress = consultant.progress();
        Self {
            consultant,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ConsultantRow {
        ConsultantRow {
            id: 1,
            name: "Arjun".to_string(),
            resume_status: "Pending".to_string(),
            attendance: "Missed".to_string(),
            opportunities: 0,
            training: "Not Started".to_string(),
            assigned_training: None,
            resume_text: "secret resume body".to_string(),
            resume_filename: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fresh_consultant_has_zero_progress() {
        assert_eq!(row().progress(), 0);
    }

    #[test]
    fn test_progress_counts_each_milestone() {
        let mut c = row();
        c.resume_status = "Updated".to_string();
        c.attendance = "Completed".to_string();
        assert_eq!(c.progress(), 50);
        c.opportunities = 3;
        c.training = "Completed".to_string();
        assert_eq!(c.progress(), 100);
    }

    #[test]
    fn test_in_progress_training_does_not_count() {
        let mut c = row();
        c.training = "In Progress".to_string();
        assert_eq!(c.progress(), 0);
    }

    #[test]
    fn test_view_hides_resume_text_and_adds_progress() {
        let view = ConsultantView::from(row());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("resume_text").is_none());
        assert_eq!(json["progress"], 0);
        assert_eq!(json["name"], "Arjun");
    }

    #[test]
    fn test_training_status_wire_names() {
        let t: TrainingStatus = serde_json::from_str(r#""In Progress""#).unwrap();
        assert_eq!(t, TrainingStatus::InProgress);
        assert_eq!(
            serde_json::to_string(&TrainingStatus::NotStarted).unwrap(),
            r#""Not Started""#
        );
        assert!(serde_json::from_str::<TrainingStatus>(r#""Done""#).is_err());
    }
}
