use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualitativeValuation {
    Achieved,
    InProcess,
    WithDifficulty,
}

impl QualitativeValuation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Achieved => "ACHIEVED",
            Self::InProcess => "IN_PROCESS",
            Self::WithDifficulty => "WITH_DIFFICULTY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACHIEVED" => Some(Self::Achieved),
            "IN_PROCESS" => Some(Self::InProcess),
            "WITH_DIFFICULTY" => Some(Self::WithDifficulty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalStatus {
    #[serde(alias = "CREATED")]
    NotStarted,
    InProgress,
    Completed,
}

impl GlobalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NOT_STARTED" | "CREATED" => Some(Self::NotStarted),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    AreaLead,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AreaLead => "AREA_LEAD",
            Self::Teacher => "TEACHER",
            Self::Student => "STUDENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AREA_LEAD" => Some(Self::AreaLead),
            "TEACHER" => Some(Self::Teacher),
            "STUDENT" => Some(Self::Student),
            _ => None,
        }
    }
}

/// Authenticated caller, as supplied by the host process.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    pub institution_id: String,
    pub role: Role,
    #[serde(default)]
    pub school_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectGroup {
    pub subject_id: String,
    pub learnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChecklistTemplate {
    pub id: String,
    pub institution_id: String,
    pub period_id: String,
    pub teacher_id: String,
    pub name: String,
    pub created_at: String,
    pub subjects: Vec<SubjectGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LearningValuation {
    pub learning_id: String,
    pub qualitative_valuation: Option<QualitativeValuation>,
    pub points_obtained: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectValuation {
    pub subject_id: String,
    pub max_subject_score: i64,
    pub total_subject_score: i64,
    pub subject_percentage: f64,
    pub assigned_concept_id: Option<String>,
    pub learning_valuations: Vec<LearningValuation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentValuation {
    pub id: String,
    pub institution_id: String,
    pub student_id: String,
    pub teacher_id: String,
    pub checklist_template_id: String,
    pub period_id: String,
    pub global_status: GlobalStatus,
    pub valuations_by_subject: Vec<SubjectValuation>,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update payload for `valuations.update`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationUpdate {
    pub valuations_by_subject: Vec<SubjectValuationUpdate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectValuationUpdate {
    pub subject_id: String,
    pub learning_valuations: Vec<LearningValuationUpdate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningValuationUpdate {
    pub learning_id: String,
    // Explicit null clears the mark; an absent field is rejected.
    #[serde(deserialize_with = "required_nullable")]
    pub qualitative_valuation: Option<QualitativeValuation>,
}

fn required_nullable<'de, D>(d: D) -> Result<Option<QualitativeValuation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::deserialize(d)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentName {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningValuationDto {
    pub learning_id: String,
    pub learning_description: String,
    pub qualitative_valuation: Option<QualitativeValuation>,
    pub points_obtained: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectValuationDto {
    pub subject_id: String,
    pub subject_name: String,
    pub total_subject_score: i64,
    pub max_subject_score: i64,
    pub subject_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_concept_id: Option<String>,
    pub is_complete: bool,
    pub learning_valuations: Vec<LearningValuationDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentValuationDto {
    pub id: String,
    pub institution_id: String,
    pub student_id: String,
    pub student_name: StudentName,
    pub teacher_id: String,
    pub checklist_template_id: String,
    pub period_id: String,
    pub period_name: String,
    pub global_status: GlobalStatus,
    pub valuations_by_subject: Vec<SubjectValuationDto>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLearningDto {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSubjectDto {
    pub subject_id: String,
    pub subject_name: String,
    pub learnings: Vec<TemplateLearningDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistTemplateDto {
    pub id: String,
    pub institution_id: String,
    pub period_id: String,
    pub teacher_id: String,
    pub name: String,
    pub created_at: String,
    pub subjects: Vec<TemplateSubjectDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedLearning {
    pub id: String,
    pub institution_id: String,
    pub subject_id: String,
    pub period_id: String,
    pub description: String,
    pub grade: String,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
