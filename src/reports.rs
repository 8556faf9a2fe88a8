use crate::aggregate::{distinct_count, group_by_attribute, group_by_key};
use crate::format::{
    format_currency, format_int, format_percent, palette_class, truncate_label,
};
use crate::normalize::{normalize, reported_total, salary_figures, skill_role_groups};
use crate::ranking::{rank, rank_by_total};
use crate::stats::{
    average_per_group, category_total, onsite_group, remote_share, salary_statistics, share,
    share_of_top, total_of, REMOTE_LABEL,
};
use crate::types::{
    CanonicalRecord, CitySalaryRow, CompanyRow, GeographyRow, ListingRow, RankedEntry, RankedRow,
    RoleSalaryRow, SalaryFigure, SalaryRow, SkillRow, StatisticsSummary, ViewKind, ViewOptions,
    ViewOutput, WorkStyleRow, UNKNOWN_LABEL,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

// ---------------------------------------------------------------------------
// Job counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobCountsReport {
    /// `total_jobs` from the payload, or the sum of the counts.
    pub reported_total: f64,
    pub active_roles: usize,
    pub average_per_role: f64,
    pub ranked: Vec<RankedEntry>,
}

impl JobCountsReport {
    pub const TOP_ROLES: usize = 5;

    pub fn top_roles(&self) -> &[RankedEntry] {
        &self.ranked[..self.ranked.len().min(Self::TOP_ROLES)]
    }

    pub fn rows(&self) -> Vec<RankedRow> {
        ranked_rows(&self.ranked)
    }

    pub fn top_role_rows(&self) -> Vec<RankedRow> {
        ranked_rows(self.top_roles())
    }
}

pub fn build_job_counts(raw: &Value) -> JobCountsReport {
    let records = normalize(raw, ViewKind::JobCounts, None);
    let groups = group_by_key(&records, UNKNOWN_LABEL);
    let reported_total = reported_total(raw).unwrap_or_else(|| total_of(&groups));
    let active_roles = groups.len();
    JobCountsReport {
        reported_total,
        active_roles,
        average_per_role: average_per_group(reported_total, active_roles),
        ranked: rank_by_total(groups, None),
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSkills {
    pub role: String,
    pub skills: Vec<CanonicalRecord>,
    /// Skills of this role not listed in `skills`.
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillsReport {
    pub role: Option<String>,
    pub top_k: usize,
    pub ranked: Vec<RankedEntry>,
    /// Per-role lists, only for unfiltered requests.
    pub breakdown: Vec<RoleSkills>,
}

impl SkillsReport {
    pub const BREAKDOWN_ROLES: usize = 6;
    pub const BREAKDOWN_SKILLS: usize = 5;

    pub fn title(&self) -> String {
        match &self.role {
            Some(role) => format!("Top Skills for {}", role),
            None => "Top Skills Across All Roles".to_string(),
        }
    }

    pub fn rows(&self) -> Vec<SkillRow> {
        let top = self.ranked.iter().map(RankedEntry::total).fold(0.0, f64::max);
        self.ranked
            .iter()
            .map(|e| SkillRow {
                rank: e.rank,
                skill: e.key().to_string(),
                frequency: format_int(e.total()),
                share_of_total: format_percent(e.percentage_of_total),
                share_of_top: format_percent(share_of_top(e.total(), top)),
            })
            .collect()
    }
}

/// Skill frequencies are pooled across roles by skill name before ranking,
/// so a skill listed under several roles ranks on its combined frequency.
pub fn build_skills(raw: &Value, options: &ViewOptions) -> SkillsReport {
    let role = options.role_filter.as_deref().filter(|r| !r.is_empty());
    let records = normalize(raw, ViewKind::Skills, role);
    let groups = group_by_key(&records, UNKNOWN_LABEL);
    let ranked = rank_by_total(groups, Some(options.top_k));

    let breakdown = if role.is_none() {
        skill_role_groups(raw)
            .into_iter()
            .take(SkillsReport::BREAKDOWN_ROLES)
            .map(|(role, skills)| {
                let remaining = skills.len().saturating_sub(SkillsReport::BREAKDOWN_SKILLS);
                RoleSkills {
                    role,
                    skills: skills.into_iter().take(SkillsReport::BREAKDOWN_SKILLS).collect(),
                    remaining,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    SkillsReport {
        role: role.map(str::to_string),
        top_k: options.top_k,
        ranked,
        breakdown,
    }
}

// ---------------------------------------------------------------------------
// Work style
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkStyleReport {
    pub total: f64,
    pub remote: f64,
    pub remote_share: f64,
    /// Label of the on-site bucket found, if any.
    pub onsite_label: Option<String>,
    pub onsite: f64,
    pub onsite_share: f64,
    pub categories: Vec<RankedEntry>,
}

impl WorkStyleReport {
    pub fn rows(&self) -> Vec<WorkStyleRow> {
        self.categories
            .iter()
            .map(|e| WorkStyleRow {
                work_type: e.key().to_string(),
                count: format_int(e.total()),
                share: format_percent(e.percentage_of_total),
                highlighted: e.key() == REMOTE_LABEL,
            })
            .collect()
    }
}

pub fn build_work_style(raw: &Value) -> WorkStyleReport {
    let records = normalize(raw, ViewKind::WorkStyle, None);
    let groups = group_by_key(&records, UNKNOWN_LABEL);
    let total = total_of(&groups);
    let remote = category_total(&groups, REMOTE_LABEL);
    let remote_share = remote_share(&groups);
    let (onsite_label, onsite) = match onsite_group(&groups) {
        Some(g) => (Some(g.key.clone()), g.total),
        None => (None, 0.0),
    };
    WorkStyleReport {
        total,
        remote,
        remote_share,
        onsite_label,
        onsite,
        onsite_share: share(onsite, total),
        categories: rank_by_total(groups, None),
    }
}

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeographyReport {
    pub location: Option<String>,
    pub total_jobs: f64,
    pub region_count: usize,
    pub ranked: Vec<RankedEntry>,
}

impl GeographyReport {
    pub const TOP_REGIONS: usize = 10;

    pub fn top_regions(&self) -> &[RankedEntry] {
        &self.ranked[..self.ranked.len().min(Self::TOP_REGIONS)]
    }

    pub fn top_location(&self) -> Option<&RankedEntry> {
        self.ranked.first()
    }

    pub fn region_noun(&self) -> &'static str {
        match self.location.as_deref() {
            Some("CA") => "Provinces/Territories",
            _ => "States",
        }
    }

    /// Top locations, each with its share of the busiest one.
    pub fn rows(&self) -> Vec<GeographyRow> {
        let top = self.top_location().map(RankedEntry::total).unwrap_or(0.0);
        self.top_regions()
            .iter()
            .enumerate()
            .map(|(idx, e)| GeographyRow {
                rank: e.rank,
                location: e.key().to_string(),
                jobs: format_int(e.total()),
                share: format_percent(e.percentage_of_total),
                share_of_top: format_percent(share_of_top(e.total(), top)),
                style: palette_class(idx).to_string(),
            })
            .collect()
    }
}

pub fn build_geography(raw: &Value, options: &ViewOptions) -> GeographyReport {
    let records = normalize(raw, ViewKind::Geography, None);
    let groups = group_by_key(&records, UNKNOWN_LABEL);
    GeographyReport {
        location: options.location_filter.clone(),
        total_jobs: total_of(&groups),
        region_count: groups.len(),
        ranked: rank_by_total(groups, None),
    }
}

// ---------------------------------------------------------------------------
// Salaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSalary {
    pub role: String,
    pub highest_median: f64,
    pub lowest_median: f64,
    pub city_count: usize,
    /// Highest median relative to the best-paid role.
    pub share_of_top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySalary {
    pub city: String,
    pub highest_median: f64,
    pub lowest_median: f64,
    pub role_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryReport {
    pub statistics: StatisticsSummary,
    pub total_records: usize,
    pub valid_records: usize,
    pub roles: Vec<RoleSalary>,
    pub top_cities: Vec<CitySalary>,
    /// Best-paid valid figures by median.
    pub top_figures: Vec<SalaryFigure>,
    /// Every figure as received, valid or not.
    pub records: Vec<SalaryFigure>,
}

impl SalaryReport {
    pub const TOP_CITIES: usize = 8;
    pub const TOP_FIGURES: usize = 20;

    pub fn role_rows(&self) -> Vec<RoleSalaryRow> {
        self.roles
            .iter()
            .map(|r| RoleSalaryRow {
                role: r.role.clone(),
                lowest_median: format_currency(r.lowest_median),
                highest_median: format_currency(r.highest_median),
                city_count: r.city_count,
                share_of_top: format_percent(r.share_of_top),
            })
            .collect()
    }

    pub fn city_rows(&self) -> Vec<CitySalaryRow> {
        self.top_cities
            .iter()
            .map(|c| CitySalaryRow {
                city: c.city.clone(),
                highest_median: format_currency(c.highest_median),
                role_count: c.role_count,
            })
            .collect()
    }

    pub fn figure_rows(&self) -> Vec<SalaryRow> {
        self.top_figures
            .iter()
            .map(|f| SalaryRow {
                city: f.city.clone(),
                role: f.role.clone(),
                min_salary: format_currency(f.min_salary.unwrap_or(0.0)),
                median_salary: format_currency(f.median()),
                min_base_salary: format_currency(f.min_base_salary.unwrap_or(0.0)),
                median_base_salary: format_currency(f.median_base_salary.unwrap_or(0.0)),
            })
            .collect()
    }
}

pub fn build_salaries(raw: &Value) -> SalaryReport {
    let records = salary_figures(raw);
    let valid: Vec<SalaryFigure> = records.iter().filter(|f| f.is_valid()).cloned().collect();
    debug!(
        total = records.len(),
        valid = valid.len(),
        "salary figures without a positive median are left out of statistics"
    );
    let statistics = salary_statistics(&valid);

    let valid_records: Vec<CanonicalRecord> = valid.iter().map(SalaryFigure::to_record).collect();
    let roles = rank(group_by_key(&valid_records, UNKNOWN_LABEL), |g| g.max_value(), None)
        .into_iter()
        .map(|e| RoleSalary {
            share_of_top: share_of_top(e.group.max_value(), statistics.max),
            highest_median: e.group.max_value(),
            lowest_median: e.group.min_value(),
            city_count: e.group.member_count,
            role: e.group.key,
        })
        .collect();
    let top_cities = rank(
        group_by_attribute(&valid_records, "city", UNKNOWN_LABEL),
        |g| g.max_value(),
        Some(SalaryReport::TOP_CITIES),
    )
    .into_iter()
    .map(|e| CitySalary {
        highest_median: e.group.max_value(),
        lowest_median: e.group.min_value(),
        role_count: e.group.member_count,
        city: e.group.key,
    })
    .collect();

    let mut top_figures = valid.clone();
    top_figures.sort_by(|a, b| b.median().partial_cmp(&a.median()).unwrap_or(std::cmp::Ordering::Equal));
    top_figures.truncate(SalaryReport::TOP_FIGURES);

    SalaryReport {
        statistics,
        total_records: records.len(),
        valid_records: valid.len(),
        roles,
        top_cities,
        top_figures,
        records,
    }
}

// ---------------------------------------------------------------------------
// Recent listings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyStat {
    pub rank: usize,
    pub company: String,
    pub listings: usize,
    pub role_count: usize,
    pub sample_titles: Vec<String>,
    /// Titles beyond the samples.
    pub more: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingsReport {
    pub total_listings: usize,
    pub distinct_employers: usize,
    pub by_role: Vec<RankedEntry>,
    pub latest: Vec<CanonicalRecord>,
    pub companies: Vec<CompanyStat>,
}

impl ListingsReport {
    pub const LATEST: usize = 12;
    pub const TOP_COMPANIES: usize = 10;
    pub const SAMPLE_TITLES: usize = 2;

    pub fn role_rows(&self) -> Vec<RankedRow> {
        ranked_rows(&self.by_role)
    }

    pub fn company_rows(&self, label_width: usize) -> Vec<CompanyRow> {
        self.companies
            .iter()
            .map(|c| {
                let mut samples: Vec<String> = c
                    .sample_titles
                    .iter()
                    .map(|t| truncate_label(t, label_width))
                    .collect();
                if c.more > 0 {
                    samples.push(format!("+{} more", c.more));
                }
                CompanyRow {
                    rank: c.rank,
                    company: c.company.clone(),
                    listings: c.listings,
                    role_count: c.role_count,
                    sample_positions: samples.join("; "),
                }
            })
            .collect()
    }

    pub fn listing_rows(&self) -> Vec<ListingRow> {
        let attr = |r: &CanonicalRecord, name: &str| r.attribute(name).unwrap_or("").to_string();
        self.latest
            .iter()
            .map(|r| ListingRow {
                job_title: attr(r, "job_title"),
                employer_name: attr(r, "employer_name"),
                job_country: attr(r, "job_country"),
                role: r.key.clone(),
                apply_link: attr(r, "apply_link"),
            })
            .collect()
    }
}

pub fn build_listings(raw: &Value) -> ListingsReport {
    let records = normalize(raw, ViewKind::Listings, None);
    let companies = rank_by_total(
        group_by_attribute(&records, "employer_name", UNKNOWN_LABEL),
        Some(ListingsReport::TOP_COMPANIES),
    )
    .into_iter()
    .map(|e| {
        let titles: Vec<String> = e
            .group
            .members
            .iter()
            .map(|m| m.attribute("job_title").unwrap_or(UNKNOWN_LABEL).to_string())
            .collect();
        CompanyStat {
            rank: e.rank,
            listings: e.group.member_count,
            role_count: distinct_count(&e.group.members, "search_query"),
            more: titles.len().saturating_sub(ListingsReport::SAMPLE_TITLES),
            sample_titles: titles.into_iter().take(ListingsReport::SAMPLE_TITLES).collect(),
            company: e.group.key,
        }
    })
    .collect();

    ListingsReport {
        total_listings: records.len(),
        distinct_employers: distinct_count(&records, "employer_name"),
        by_role: rank_by_total(group_by_key(&records, ViewKind::Listings.sentinel()), None),
        latest: records.iter().take(ListingsReport::LATEST).cloned().collect(),
        companies,
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum ViewReport {
    JobCounts(JobCountsReport),
    Skills(SkillsReport),
    WorkStyle(WorkStyleReport),
    Geography(GeographyReport),
    Salaries(SalaryReport),
    Listings(ListingsReport),
}

impl ViewReport {
    pub fn kind(&self) -> ViewKind {
        match self {
            Self::JobCounts(_) => ViewKind::JobCounts,
            Self::Skills(_) => ViewKind::Skills,
            Self::WorkStyle(_) => ViewKind::WorkStyle,
            Self::Geography(_) => ViewKind::Geography,
            Self::Salaries(_) => ViewKind::Salaries,
            Self::Listings(_) => ViewKind::Listings,
        }
    }

    /// `true` when the payload produced nothing to show.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::JobCounts(r) => r.ranked.is_empty(),
            Self::Skills(r) => r.ranked.is_empty(),
            Self::WorkStyle(r) => r.categories.is_empty(),
            Self::Geography(r) => r.ranked.is_empty(),
            Self::Salaries(r) => r.valid_records == 0,
            Self::Listings(r) => r.total_listings == 0,
        }
    }

    pub fn into_output(self) -> ViewOutput {
        match self {
            Self::JobCounts(r) => ViewOutput::Ranked(r.ranked),
            Self::Skills(r) => ViewOutput::Ranked(r.ranked),
            Self::WorkStyle(r) => ViewOutput::Ranked(r.categories),
            Self::Geography(r) => ViewOutput::Ranked(r.ranked),
            Self::Salaries(r) => ViewOutput::Statistics(r.statistics),
            Self::Listings(r) => ViewOutput::Ranked(r.by_role),
        }
    }
}

/// Build the full report for one view from its raw payload.
pub fn build_report(raw: &Value, kind: ViewKind, options: &ViewOptions) -> ViewReport {
    match kind {
        ViewKind::JobCounts => ViewReport::JobCounts(build_job_counts(raw)),
        ViewKind::Skills => ViewReport::Skills(build_skills(raw, options)),
        ViewKind::WorkStyle => ViewReport::WorkStyle(build_work_style(raw)),
        ViewKind::Geography => ViewReport::Geography(build_geography(raw, options)),
        ViewKind::Salaries => ViewReport::Salaries(build_salaries(raw)),
        ViewKind::Listings => ViewReport::Listings(build_listings(raw)),
    }
}

/// Normalize, aggregate and rank a raw payload for one view.
///
/// Salary payloads reduce to their headline statistics; every other view
/// yields ranked entries. Only the skills view is cut to `options.top_k`.
pub fn normalize_and_aggregate(raw: &Value, kind: ViewKind, options: &ViewOptions) -> ViewOutput {
    build_report(raw, kind, options).into_output()
}

fn ranked_rows(entries: &[RankedEntry]) -> Vec<RankedRow> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, e)| RankedRow {
            rank: e.rank,
            label: e.key().to_string(),
            total: format_int(e.total()),
            share: format_percent(e.percentage_of_total),
            style: palette_class(idx).to_string(),
        })
        .collect()
}
