use chrono::{DateTime, Utc};

pub mod pdf;

/// How many of the newest log entries make it into the printed report.
pub const RECENT_LOG_COUNT: usize = 10;

/// Everything the PDF renderer needs, precomputed. Keeping the model free of
/// rendering concerns lets the tests assert on it without parsing a PDF.
#[derive(Clone, Debug)]
pub struct GroupReport {
    pub group_name: String,
    pub description: String,
    pub project_prompt: Option<String>,
    pub teacher_name: String,
    pub generated_at: DateTime<Utc>,
    pub members: Vec<ReportMember>,
    /// Newest first, capped at [`RECENT_LOG_COUNT`].
    pub recent_logs: Vec<ReportLog>,
    pub assignments: Vec<ReportAssignment>,
}

#[derive(Clone, Debug)]
pub struct ReportMember {
    pub full_name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct ReportLog {
    pub author_name: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct ReportAssignment {
    pub title: String,
    pub due_at: DateTime<Utc>,
    pub submitted: usize,
    pub total: usize,
}

impl ReportAssignment {
    pub fn ratio(&self) -> String {
        format!("{}/{}", self.submitted, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_renders_submitted_over_total() {
        let assignment = ReportAssignment {
            title: "Homework 1".to_owned(),
            due_at: Utc::now(),
            submitted: 3,
            total: 12,
        };
        assert_eq!(assignment.ratio(), "3/12");
    }
}
