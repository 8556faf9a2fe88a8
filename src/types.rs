use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tabled::Tabled;

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const OTHER_LABEL: &str = "Other";

/// The six analytics views served by the data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    JobCounts,
    Skills,
    WorkStyle,
    Geography,
    Salaries,
    Listings,
}

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        ViewKind::JobCounts,
        ViewKind::Skills,
        ViewKind::WorkStyle,
        ViewKind::Geography,
        ViewKind::Salaries,
        ViewKind::Listings,
    ];

    /// Short name used for CLI arguments and output file stems.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobCounts => "counts",
            Self::Skills => "skills",
            Self::WorkStyle => "work-style",
            Self::Geography => "geo",
            Self::Salaries => "salaries",
            Self::Listings => "listings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::JobCounts => "Job Market Overview",
            Self::Skills => "Top Skills",
            Self::WorkStyle => "Work Style Distribution",
            Self::Geography => "Geographic Distribution",
            Self::Salaries => "Salary Analysis",
            Self::Listings => "Recent Job Listings",
        }
    }

    /// Label used when a record carries no usable key.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::Listings => OTHER_LABEL,
            _ => UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform `(key, value, attributes)` record produced from any payload shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub key: String,
    pub value: f64,
    pub attributes: BTreeMap<String, String>,
}

impl CanonicalRecord {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Sum and membership of every record sharing a grouping key.
///
/// `total` is always the sum of member values and `member_count` the length
/// of `members`; the only way to add a member is [`AggregatedGroup::push`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedGroup {
    pub key: String,
    pub total: f64,
    pub member_count: usize,
    pub members: Vec<CanonicalRecord>,
}

impl AggregatedGroup {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            total: 0.0,
            member_count: 0,
            members: Vec::new(),
        }
    }

    pub fn push(&mut self, record: CanonicalRecord) {
        self.total += record.value;
        self.member_count += 1;
        self.members.push(record);
    }

    /// Largest member value, 0 for an empty group.
    pub fn max_value(&self) -> f64 {
        self.members
            .iter()
            .map(|m| m.value)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
            .unwrap_or(0.0)
    }

    /// Smallest member value, 0 for an empty group.
    pub fn min_value(&self) -> f64 {
        self.members
            .iter()
            .map(|m| m.value)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub group: AggregatedGroup,
    pub percentage_of_total: f64,
}

impl RankedEntry {
    pub fn key(&self) -> &str {
        &self.group.key
    }

    pub fn total(&self) -> f64 {
        self.group.total
    }
}

/// One city/role salary estimate. Every figure may be absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SalaryFigure {
    pub city: String,
    pub role: String,
    pub min_salary: Option<f64>,
    pub min_base_salary: Option<f64>,
    pub median_salary: Option<f64>,
    pub median_base_salary: Option<f64>,
}

impl SalaryFigure {
    /// Only records with a positive median take part in statistics.
    pub fn is_valid(&self) -> bool {
        matches!(self.median_salary, Some(m) if m > 0.0)
    }

    pub fn median(&self) -> f64 {
        self.median_salary.unwrap_or(0.0)
    }

    /// `(role, median)` record carrying the city, for grouping.
    pub fn to_record(&self) -> CanonicalRecord {
        CanonicalRecord::new(self.role.clone(), self.median())
            .with_attribute("city", self.city.clone())
            .with_attribute("role", self.role.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StatisticsSummary {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub spread: f64,
}

/// Caller-supplied view configuration. Filters have already been applied
/// to the request; the pipeline only uses them to pick a payload shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub top_k: usize,
    pub role_filter: Option<String>,
    pub location_filter: Option<String>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            role_filter: None,
            location_filter: None,
        }
    }
}

/// Result of the generic per-view entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ViewOutput {
    Ranked(Vec<RankedEntry>),
    Statistics(StatisticsSummary),
}

// ---------------------------------------------------------------------------
// Display rows. Every numeric cell is pre-formatted so the same row feeds the
// markdown preview, the CSV export and the JSON summary.
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankedRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
    #[serde(rename = "Style")]
    #[tabled(rename = "Style")]
    pub style: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GeographyRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Location")]
    #[tabled(rename = "Location")]
    pub location: String,
    #[serde(rename = "Jobs")]
    #[tabled(rename = "Jobs")]
    pub jobs: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
    #[serde(rename = "ShareOfTop")]
    #[tabled(rename = "ShareOfTop")]
    pub share_of_top: String,
    #[serde(rename = "Style")]
    #[tabled(rename = "Style")]
    pub style: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SkillRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Skill")]
    #[tabled(rename = "Skill")]
    pub skill: String,
    #[serde(rename = "Frequency")]
    #[tabled(rename = "Frequency")]
    pub frequency: String,
    #[serde(rename = "ShareOfTotal")]
    #[tabled(rename = "ShareOfTotal")]
    pub share_of_total: String,
    #[serde(rename = "ShareOfTop")]
    #[tabled(rename = "ShareOfTop")]
    pub share_of_top: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct WorkStyleRow {
    #[serde(rename = "WorkType")]
    #[tabled(rename = "WorkType")]
    pub work_type: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
    #[serde(rename = "Highlighted")]
    #[tabled(rename = "Highlighted")]
    pub highlighted: bool,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RoleSalaryRow {
    #[serde(rename = "Role")]
    #[tabled(rename = "Role")]
    pub role: String,
    #[serde(rename = "LowestMedian")]
    #[tabled(rename = "LowestMedian")]
    pub lowest_median: String,
    #[serde(rename = "HighestMedian")]
    #[tabled(rename = "HighestMedian")]
    pub highest_median: String,
    #[serde(rename = "Cities")]
    #[tabled(rename = "Cities")]
    pub city_count: usize,
    #[serde(rename = "ShareOfTop")]
    #[tabled(rename = "ShareOfTop")]
    pub share_of_top: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CitySalaryRow {
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "TopMedian")]
    #[tabled(rename = "TopMedian")]
    pub highest_median: String,
    #[serde(rename = "Roles")]
    #[tabled(rename = "Roles")]
    pub role_count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SalaryRow {
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "Role")]
    #[tabled(rename = "Role")]
    pub role: String,
    #[serde(rename = "MinSalary")]
    #[tabled(rename = "MinSalary")]
    pub min_salary: String,
    #[serde(rename = "MedianSalary")]
    #[tabled(rename = "MedianSalary")]
    pub median_salary: String,
    #[serde(rename = "MinBase")]
    #[tabled(rename = "MinBase")]
    pub min_base_salary: String,
    #[serde(rename = "MedianBase")]
    #[tabled(rename = "MedianBase")]
    pub median_base_salary: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CompanyRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Company")]
    #[tabled(rename = "Company")]
    pub company: String,
    #[serde(rename = "Listings")]
    #[tabled(rename = "Listings")]
    pub listings: usize,
    #[serde(rename = "Roles")]
    #[tabled(rename = "Roles")]
    pub role_count: usize,
    #[serde(rename = "SamplePositions")]
    #[tabled(rename = "SamplePositions")]
    pub sample_positions: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ListingRow {
    #[serde(rename = "Title")]
    #[tabled(rename = "Title")]
    pub job_title: String,
    #[serde(rename = "Employer")]
    #[tabled(rename = "Employer")]
    pub employer_name: String,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub job_country: String,
    #[serde(rename = "Role")]
    #[tabled(rename = "Role")]
    pub role: String,
    #[serde(rename = "ApplyLink")]
    #[tabled(rename = "ApplyLink")]
    pub apply_link: String,
}
