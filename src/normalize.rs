//! Turns raw decoded payloads into canonical records.
//!
//! The data service has shipped several encodings over time for the same
//! endpoint: an envelope object holding a list (`{"data": [...]}`), the bare
//! list without its envelope, and records given either as objects with named
//! fields or as positional tuples (`["Python", 5]`). Each known encoding is
//! tried in priority order and the first match wins. A payload matching none
//! of them normalizes to an empty list; nothing in here fails.

use crate::types::{CanonicalRecord, SalaryFigure, ViewKind};
use crate::util::{field, value_as_f64, value_as_label};
use serde_json::Value;
use tracing::debug;

/// A record field addressed by name on objects and by position on tuples.
#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    index: usize,
}

const fn spec(name: &'static str, index: usize) -> FieldSpec {
    FieldSpec { name, index }
}

/// How one record of a view maps onto `(key, value, attributes)`.
struct RecordSchema {
    label: FieldSpec,
    /// `None` means every record weighs 1.
    value: Option<FieldSpec>,
    attributes: &'static [FieldSpec],
    sentinel: &'static str,
}

const SALARY_CITY: FieldSpec = spec("city", 0);
const SALARY_ROLE: FieldSpec = spec("role", 1);
const SALARY_MIN: FieldSpec = spec("min_salary", 2);
const SALARY_MIN_BASE: FieldSpec = spec("min_base_salary", 3);
const SALARY_MEDIAN: FieldSpec = spec("median_salary", 4);
const SALARY_MEDIAN_BASE: FieldSpec = spec("median_base_salary", 5);

const LISTING_FIELDS: [FieldSpec; 5] = [
    spec("job_title", 0),
    spec("employer_name", 1),
    spec("job_country", 2),
    spec("apply_link", 3),
    spec("search_query", 4),
];

fn schema(kind: ViewKind) -> RecordSchema {
    let sentinel = kind.sentinel();
    match kind {
        ViewKind::JobCounts => RecordSchema {
            label: spec("search_query", 0),
            value: Some(spec("count", 1)),
            attributes: &[],
            sentinel,
        },
        ViewKind::Skills => RecordSchema {
            label: spec("skill", 0),
            value: Some(spec("freq", 1)),
            attributes: &[],
            sentinel,
        },
        ViewKind::WorkStyle => RecordSchema {
            label: spec("work_type", 0),
            value: Some(spec("count", 1)),
            attributes: &[],
            sentinel,
        },
        ViewKind::Geography => RecordSchema {
            label: spec("job_state", 0),
            value: Some(spec("job_count", 1)),
            attributes: &[],
            sentinel,
        },
        ViewKind::Salaries => RecordSchema {
            label: SALARY_ROLE,
            value: Some(SALARY_MEDIAN),
            attributes: &[SALARY_CITY, SALARY_ROLE],
            sentinel,
        },
        ViewKind::Listings => RecordSchema {
            label: LISTING_FIELDS[4],
            value: None,
            attributes: &LISTING_FIELDS,
            sentinel,
        },
    }
}

/// Name of the list field inside the envelope object for each view.
fn envelope_field(kind: ViewKind) -> &'static str {
    match kind {
        ViewKind::JobCounts => "counts_by_query",
        ViewKind::Skills => "skills",
        _ => "data",
    }
}

/// Top-level payload encodings, in priority order.
#[derive(Debug)]
enum Encoding<'a> {
    Envelope(&'a [Value]),
    Bare(&'a [Value]),
}

impl<'a> Encoding<'a> {
    fn detect(raw: &'a Value, envelope: &str) -> Option<Self> {
        if let Some(Value::Array(items)) = raw.get(envelope) {
            return Some(Self::Envelope(items));
        }
        if let Value::Array(items) = raw {
            return Some(Self::Bare(items));
        }
        None
    }

    fn items(&self) -> &'a [Value] {
        match self {
            Self::Envelope(items) | Self::Bare(items) => items,
        }
    }
}

fn payload_items(raw: &Value, kind: ViewKind) -> &[Value] {
    match Encoding::detect(raw, envelope_field(kind)) {
        Some(encoding) => {
            debug!(
                view = %kind,
                encoding = encoding_kind(&encoding),
                items = encoding.items().len(),
                "payload shape recognised"
            );
            encoding.items()
        }
        None => {
            debug!(view = %kind, "payload shape not recognised, treating as empty");
            &[]
        }
    }
}

fn encoding_kind(encoding: &Encoding<'_>) -> &'static str {
    match encoding {
        Encoding::Envelope(_) => "envelope",
        Encoding::Bare(_) => "bare",
    }
}

fn to_record(item: &Value, schema: &RecordSchema) -> CanonicalRecord {
    let key = value_as_label(field(item, schema.label.name, schema.label.index))
        .unwrap_or_else(|| schema.sentinel.to_string());
    let value = match schema.value {
        Some(spec) => value_as_f64(field(item, spec.name, spec.index)).unwrap_or(0.0),
        None => 1.0,
    };
    let mut record = CanonicalRecord::new(key, value);
    for attr in schema.attributes {
        if let Some(v) = value_as_label(field(item, attr.name, attr.index)) {
            record = record.with_attribute(attr.name, v);
        }
    }
    record
}

fn to_records(items: &[Value], schema: &RecordSchema) -> Vec<CanonicalRecord> {
    items.iter().map(|item| to_record(item, schema)).collect()
}

/// Normalize a raw payload for `kind` into canonical records.
///
/// `role_filter` only matters for [`ViewKind::Skills`], where it selects the
/// single-role response shape.
pub fn normalize(raw: &Value, kind: ViewKind, role_filter: Option<&str>) -> Vec<CanonicalRecord> {
    if kind == ViewKind::Skills {
        return normalize_skills(raw, role_filter);
    }
    to_records(payload_items(raw, kind), &schema(kind))
}

/// `total_jobs` reported by the job-counts envelope, when it is a number.
pub fn reported_total(raw: &Value) -> Option<f64> {
    match raw.get("total_jobs") {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Typed salary figures; absent or non-numeric figures stay `None`.
pub fn salary_figures(raw: &Value) -> Vec<SalaryFigure> {
    let sentinel = ViewKind::Salaries.sentinel();
    let number = |item: &Value, spec: FieldSpec| value_as_f64(field(item, spec.name, spec.index));
    let label = |item: &Value, spec: FieldSpec| {
        value_as_label(field(item, spec.name, spec.index)).unwrap_or_else(|| sentinel.to_string())
    };
    payload_items(raw, ViewKind::Salaries)
        .iter()
        .map(|item| SalaryFigure {
            city: label(item, SALARY_CITY),
            role: label(item, SALARY_ROLE),
            min_salary: number(item, SALARY_MIN),
            min_base_salary: number(item, SALARY_MIN_BASE),
            median_salary: number(item, SALARY_MEDIAN),
            median_base_salary: number(item, SALARY_MEDIAN_BASE),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// A `{search_query, skills: [...]}` entry of the skills payload.
#[derive(Debug)]
struct RoleGroup<'a> {
    role: Option<String>,
    skills: &'a [Value],
}

impl<'a> RoleGroup<'a> {
    fn from_item(item: &'a Value) -> Option<Self> {
        match item.get("skills") {
            Some(Value::Array(skills)) => Some(Self {
                role: value_as_label(item.get("search_query")),
                skills,
            }),
            _ => None,
        }
    }
}

/// Skills payload encodings, in priority order.
#[derive(Debug)]
enum SkillsShape<'a> {
    /// List of role-groups, each holding its own skill list.
    RoleGroups(Vec<RoleGroup<'a>>),
    /// A skill list nested one level down (`[[skill, ...]]`).
    Nested(&'a [Value]),
    /// The list itself is the skill list.
    Flat(&'a [Value]),
}

impl<'a> SkillsShape<'a> {
    fn detect(items: &'a [Value]) -> Self {
        let groups: Vec<RoleGroup<'a>> = items.iter().filter_map(RoleGroup::from_item).collect();
        if !groups.is_empty() {
            return Self::RoleGroups(groups);
        }
        if let Some(Value::Array(inner)) = items.first() {
            if inner.iter().all(|v| v.is_array() || v.is_object()) && !inner.is_empty() {
                return Self::Nested(inner);
            }
        }
        Self::Flat(items)
    }
}

fn normalize_skills(raw: &Value, role_filter: Option<&str>) -> Vec<CanonicalRecord> {
    let items = payload_items(raw, ViewKind::Skills);
    let schema = schema(ViewKind::Skills);
    let tag = |records: Vec<CanonicalRecord>, role: Option<&str>| -> Vec<CanonicalRecord> {
        match role {
            Some(role) => records
                .into_iter()
                .map(|r| r.with_attribute("role", role))
                .collect(),
            None => records,
        }
    };

    match (SkillsShape::detect(items), role_filter) {
        (SkillsShape::RoleGroups(_), Some(filter)) => {
            // Only the first returned group answers a filtered request.
            match items.first().and_then(RoleGroup::from_item) {
                Some(group) => {
                    let role = group.role.as_deref().unwrap_or(filter);
                    tag(to_records(group.skills, &schema), Some(role))
                }
                None => {
                    debug!(role = filter, "first skills entry is not a role group");
                    Vec::new()
                }
            }
        }
        (SkillsShape::RoleGroups(groups), None) => groups
            .into_iter()
            .filter_map(|g| g.role.map(|role| (role, g.skills)))
            .flat_map(|(role, skills)| tag(to_records(skills, &schema), Some(role.as_str())))
            .collect(),
        (SkillsShape::Nested(skills), filter) | (SkillsShape::Flat(skills), filter) => {
            tag(to_records(skills, &schema), filter)
        }
    }
}

/// Per-role skill lists in payload order, for the all-roles breakdown.
/// Role-groups without a `search_query` are skipped.
pub fn skill_role_groups(raw: &Value) -> Vec<(String, Vec<CanonicalRecord>)> {
    let items = payload_items(raw, ViewKind::Skills);
    let schema = schema(ViewKind::Skills);
    match SkillsShape::detect(items) {
        SkillsShape::RoleGroups(groups) => groups
            .into_iter()
            .filter_map(|g| g.role.map(|role| (role, to_records(g.skills, &schema))))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn keys_and_values(records: &[CanonicalRecord]) -> Vec<(&str, f64)> {
        records.iter().map(|r| (r.key.as_str(), r.value)).collect()
    }

    #[test]
    fn job_counts_envelope_with_named_fields() {
        let raw = json!({
            "total_jobs": 30,
            "counts_by_query": [
                {"search_query": "Software engineer", "count": 20},
                {"search_query": "Machine Learning engineer", "count": 10}
            ]
        });
        let records = normalize(&raw, ViewKind::JobCounts, None);
        assert_eq!(
            keys_and_values(&records),
            vec![("Software engineer", 20.0), ("Machine Learning engineer", 10.0)]
        );
        assert_eq!(reported_total(&raw), Some(30.0));
    }

    #[test]
    fn positional_tuples_fall_back_to_indices() {
        let raw = json!([["Python", 5], ["SQL", 3]]);
        let records = normalize(&raw, ViewKind::JobCounts, None);
        assert_eq!(keys_and_values(&records), vec![("Python", 5.0), ("SQL", 3.0)]);
    }

    #[test]
    fn missing_fields_default_to_sentinel_and_zero() {
        let raw = json!({"data": [{"work_type": "Remote"}, {"count": 4}, "junk"]});
        let records = normalize(&raw, ViewKind::WorkStyle, None);
        assert_eq!(
            keys_and_values(&records),
            vec![("Remote", 0.0), ("Unknown", 4.0), ("Unknown", 0.0)]
        );
    }

    #[test]
    fn unrecognised_shape_is_empty() {
        assert!(normalize(&json!({"rows": []}), ViewKind::Geography, None).is_empty());
        assert!(normalize(&json!(42), ViewKind::JobCounts, None).is_empty());
        assert!(normalize(&json!(null), ViewKind::Skills, None).is_empty());
    }

    #[test]
    fn listings_weigh_one_and_keep_attributes() {
        let raw = json!({"data": [{
            "job_title": "Backend Engineer",
            "employer_name": "Acme",
            "job_country": "US",
            "apply_link": "https://example.com/apply",
            "search_query": "Software engineer"
        }, {"job_title": "Intern"}]});
        let records = normalize(&raw, ViewKind::Listings, None);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, "Software engineer");
        assert_eq!(records[0].value, 1.0);
        assert_eq!(records[0].attribute("employer_name"), Some("Acme"));
        assert_eq!(records[1].key, "Other");
        assert_eq!(records[1].attribute("employer_name"), None);
    }

    #[test]
    fn skills_without_filter_pool_every_role_group() {
        let raw = json!({"skills": [
            {"search_query": "Software engineer", "skills": [{"skill": "Python", "freq": 4}]},
            {"skills": [{"skill": "Ignored", "freq": 99}]},
            {"search_query": "Machine Learning engineer", "skills": [["Python", 6], ["PyTorch", 2]]}
        ]});
        let records = normalize(&raw, ViewKind::Skills, None);
        assert_eq!(
            keys_and_values(&records),
            vec![("Python", 4.0), ("Python", 6.0), ("PyTorch", 2.0)]
        );
        assert_eq!(records[2].attribute("role"), Some("Machine Learning engineer"));
    }

    #[test]
    fn skills_with_filter_use_only_the_first_group() {
        let raw = json!({"skills": [
            {"search_query": "Software engineer", "skills": [{"skill": "Go", "freq": 3}]},
            {"search_query": "Other", "skills": [{"skill": "Excel", "freq": 9}]}
        ], "role": "Software engineer"});
        let records = normalize(&raw, ViewKind::Skills, Some("Software engineer"));
        assert_eq!(keys_and_values(&records), vec![("Go", 3.0)]);
    }

    #[test]
    fn skills_accept_flat_and_nested_lists() {
        let flat = json!([["Python", 5], ["SQL", 3]]);
        assert_eq!(
            keys_and_values(&normalize(&flat, ViewKind::Skills, None)),
            vec![("Python", 5.0), ("SQL", 3.0)]
        );
        let nested = json!({"skills": [[{"skill": "Rust", "freq": 2}]]});
        assert_eq!(
            keys_and_values(&normalize(&nested, ViewKind::Skills, Some("Systems"))),
            vec![("Rust", 2.0)]
        );
    }

    #[test]
    fn salary_figures_keep_absent_values_absent() {
        let raw = json!({"data": [
            {"city": "Austin", "role": "Data scientist", "min_salary": 90000, "median_salary": "120,000"},
            ["Toronto", "Software engineer", null, null, null, 95000]
        ]});
        let figures = salary_figures(&raw);
        assert_eq!(figures[0].median_salary, Some(120000.0));
        assert_eq!(figures[0].min_base_salary, None);
        assert!(figures[0].is_valid());
        assert_eq!(figures[1].city, "Toronto");
        assert_eq!(figures[1].median_base_salary, Some(95000.0));
        assert!(!figures[1].is_valid());
    }

    #[test]
    fn role_groups_for_breakdown_skip_unnamed_groups() {
        let raw = json!({"skills": [
            {"search_query": "A", "skills": [{"skill": "x", "freq": 1}]},
            {"skills": []}
        ]});
        let groups = skill_role_groups(&raw);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "A");
    }
}
