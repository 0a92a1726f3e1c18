// ============================================================
// WORKING ROWS
// ============================================================
// Derived per-row records shared by aggregation and queries

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four labeled sections pulled out of one conversation transcript
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub customer_issue: String,
    pub agent_actions: String,
    pub customer_anxiety: String,
    /// Keyword section before tokenization
    pub important_keywords: String,
}

impl ExtractedFields {
    /// True when no section could be recovered
    pub fn is_blank(&self) -> bool {
        self.customer_issue.is_empty()
            && self.agent_actions.is_empty()
            && self.customer_anxiety.is_empty()
            && self.important_keywords.is_empty()
    }
}

/// One fully derived row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingRow {
    #[serde(flatten)]
    pub fields: ExtractedFields,
    pub keyword_list: Vec<String>,
    #[serde(rename = "ASP_slab")]
    pub asp_slab: String,
    pub analytic_business_unit: String,
    pub vip_flag: String,
    pub sub_sub_issue_type: String,
}

impl WorkingRow {
    pub fn value(&self, column: WorkingColumn) -> &str {
        match column {
            WorkingColumn::CustomerIssue => &self.fields.customer_issue,
            WorkingColumn::AgentActions => &self.fields.agent_actions,
            WorkingColumn::CustomerAnxiety => &self.fields.customer_anxiety,
            WorkingColumn::ImportantKeywords => &self.fields.important_keywords,
            WorkingColumn::AspSlab => &self.asp_slab,
            WorkingColumn::AnalyticBusinessUnit => &self.analytic_business_unit,
            WorkingColumn::VipFlag => &self.vip_flag,
            WorkingColumn::SubSubIssueType => &self.sub_sub_issue_type,
        }
    }
}

/// Immutable table built once per upload
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkingTable {
    /// Hex SHA-256 of the uploaded bytes
    pub dataset_id: String,

    /// Header of the free-text column that was parsed
    pub text_column: String,

    pub rows: Vec<WorkingRow>,
}

impl WorkingTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Scalar columns of a working row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkingColumn {
    CustomerIssue,
    AgentActions,
    CustomerAnxiety,
    ImportantKeywords,
    AspSlab,
    AnalyticBusinessUnit,
    VipFlag,
    SubSubIssueType,
}

impl WorkingColumn {
    pub const ALL: [WorkingColumn; 8] = [
        WorkingColumn::CustomerIssue,
        WorkingColumn::AgentActions,
        WorkingColumn::CustomerAnxiety,
        WorkingColumn::ImportantKeywords,
        WorkingColumn::AspSlab,
        WorkingColumn::AnalyticBusinessUnit,
        WorkingColumn::VipFlag,
        WorkingColumn::SubSubIssueType,
    ];

    /// Header used in tables and the CSV export
    pub fn header(&self) -> &'static str {
        match self {
            WorkingColumn::CustomerIssue => "Customer Issue",
            WorkingColumn::AgentActions => "Agent's Actions",
            WorkingColumn::CustomerAnxiety => "Customer's Anxiety",
            WorkingColumn::ImportantKeywords => "Important Keywords",
            WorkingColumn::AspSlab => "ASP_slab",
            WorkingColumn::AnalyticBusinessUnit => "analytic_business_unit",
            WorkingColumn::VipFlag => "vip_flag",
            WorkingColumn::SubSubIssueType => "sub_sub_issue_type",
        }
    }

    /// snake_case name used in URLs and JSON
    pub fn key(&self) -> &'static str {
        match self {
            WorkingColumn::CustomerIssue => "customer_issue",
            WorkingColumn::AgentActions => "agent_actions",
            WorkingColumn::CustomerAnxiety => "customer_anxiety",
            WorkingColumn::ImportantKeywords => "important_keywords",
            WorkingColumn::AspSlab => "asp_slab",
            WorkingColumn::AnalyticBusinessUnit => "analytic_business_unit",
            WorkingColumn::VipFlag => "vip_flag",
            WorkingColumn::SubSubIssueType => "sub_sub_issue_type",
        }
    }

    /// Resolve either the header or the snake_case key, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|column| {
            column.header().eq_ignore_ascii_case(name) || column.key().eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for WorkingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// Free-text fields open to substring search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    CustomerIssue,
    AgentActions,
}

impl TextField {
    pub fn column(&self) -> WorkingColumn {
        match self {
            TextField::CustomerIssue => WorkingColumn::CustomerIssue,
            TextField::AgentActions => WorkingColumn::AgentActions,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match WorkingColumn::from_name(name)? {
            WorkingColumn::CustomerIssue => Some(TextField::CustomerIssue),
            WorkingColumn::AgentActions => Some(TextField::AgentActions),
            _ => None,
        }
    }
}
