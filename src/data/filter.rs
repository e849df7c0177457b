use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{Dataset, FieldType, FieldValue, Record};
use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Criteria: one narrowing predicate over one field
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact match against a selected value; text compares case-insensitively.
    Equals(FieldValue),
    /// Case-insensitive match of a text field against an enum value ("Yes"/"No").
    EqualsIgnoreCase(String),
    /// Present means non-missing, not merely non-empty.
    Presence(Presence),
    /// Inclusive on both ends.
    DateRange { start: NaiveDate, end: NaiveDate },
}

impl Predicate {
    fn matches(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Predicate::Presence(Presence::Present), v) => !v.is_missing(),
            (Predicate::Presence(Presence::Absent), v) => v.is_missing(),
            (_, FieldValue::Missing) => false,
            (Predicate::Equals(FieldValue::Text(want)), FieldValue::Text(got)) => {
                eq_ignore_case(want, got)
            }
            (Predicate::Equals(want), got) => want == got,
            (Predicate::EqualsIgnoreCase(want), FieldValue::Text(got)) => eq_ignore_case(want, got),
            (Predicate::EqualsIgnoreCase(_), _) => false,
            (Predicate::DateRange { start, end }, FieldValue::Date(d)) => start <= d && d <= end,
            (Predicate::DateRange { .. }, _) => false,
        }
    }

    /// Column type this predicate can be applied to, if it is restricted.
    fn required_type(&self) -> Option<FieldType> {
        match self {
            Predicate::Equals(v) => v.field_type(),
            Predicate::EqualsIgnoreCase(_) => Some(FieldType::Text),
            Predicate::Presence(_) => None,
            Predicate::DateRange { .. } => Some(FieldType::Date),
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// One step of the pipeline. A `None` predicate is the "All" sentinel: the
/// step is still validated and still advances the pipeline, but narrows nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriterion {
    pub field: String,
    pub predicate: Option<Predicate>,
}

impl FilterCriterion {
    pub fn all(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            predicate: None,
        }
    }

    pub fn equals(field: impl Into<String>, value: FieldValue) -> Self {
        Self {
            field: field.into(),
            predicate: Some(Predicate::Equals(value)),
        }
    }

    /// `None` selects "All".
    pub fn selected(field: impl Into<String>, value: Option<FieldValue>) -> Self {
        Self {
            field: field.into(),
            predicate: value.map(Predicate::Equals),
        }
    }

    pub fn equals_ignore_case(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            predicate: Some(Predicate::EqualsIgnoreCase(value.into())),
        }
    }

    pub fn presence(field: impl Into<String>, presence: Presence) -> Self {
        Self {
            field: field.into(),
            predicate: Some(Predicate::Presence(presence)),
        }
    }

    pub fn date_range(field: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            field: field.into(),
            predicate: Some(Predicate::DateRange { start, end }),
        }
    }

    /// Yes/No status match against a text column.
    pub fn status(field: impl Into<String>, choice: Choice) -> Self {
        Self {
            field: field.into(),
            predicate: choice
                .label_if_set()
                .map(|label| Predicate::EqualsIgnoreCase(label.to_string())),
        }
    }

    /// Yes/No presence test.
    pub fn has_value(field: impl Into<String>, choice: Choice) -> Self {
        let presence = match choice {
            Choice::All => None,
            Choice::Yes => Some(Presence::Present),
            Choice::No => Some(Presence::Absent),
        };
        Self {
            field: field.into(),
            predicate: presence.map(Predicate::Presence),
        }
    }

    fn validate(&self, dataset: &Dataset) -> Result<FieldType, SchemaError> {
        let ty = dataset.schema().require(&self.field)?;
        if let Some(expected) = self.predicate.as_ref().and_then(Predicate::required_type) {
            if expected != ty {
                return Err(SchemaError::FieldType {
                    field: self.field.clone(),
                    expected,
                    found: ty,
                });
            }
        }
        Ok(ty)
    }
}

/// The tri-state radio used by the status and link questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Choice {
    #[default]
    All,
    Yes,
    No,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::All, Choice::Yes, Choice::No];

    pub fn label(self) -> &'static str {
        match self {
            Choice::All => "All",
            Choice::Yes => "Yes",
            Choice::No => "No",
        }
    }

    fn label_if_set(self) -> Option<&'static str> {
        match self {
            Choice::All => None,
            other => Some(other.label()),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline: progressive narrowing over a borrowed dataset
// ---------------------------------------------------------------------------

/// The current view of a dataset, narrowed one criterion at a time.
///
/// Each `narrow` only looks at the rows that survived the previous steps, and
/// `options` / `date_bounds` are computed over that same narrowed view. That is
/// what makes the choices offered for step *k* depend on steps *0..k*.
#[derive(Debug, Clone)]
pub struct FilterPipeline<'a> {
    dataset: &'a Dataset,
    view: Vec<usize>,
}

impl<'a> FilterPipeline<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            view: (0..dataset.len()).collect(),
        }
    }

    /// Apply one criterion to the current view and return the new view.
    pub fn narrow(&mut self, criterion: &FilterCriterion) -> Result<&[usize], SchemaError> {
        criterion.validate(self.dataset)?;
        let Some(predicate) = &criterion.predicate else {
            return Ok(&self.view);
        };

        // No dates left to bound: a range cannot be formed, so the step is skipped.
        if matches!(predicate, Predicate::DateRange { .. })
            && self.date_bounds(&criterion.field)?.is_none()
        {
            return Ok(&self.view);
        }

        let records = self.dataset.records();
        self.view
            .retain(|&row| predicate.matches(records[row].get(&criterion.field)));
        Ok(&self.view)
    }

    /// Sorted distinct non-missing values of `field` in the current view.
    ///
    /// Text that differs only in case is one option (selecting it matches all
    /// spellings); the first spelling in dataset order is the one offered.
    pub fn options(&self, field: &str) -> Result<Vec<FieldValue>, SchemaError> {
        self.dataset.schema().require(field)?;
        let mut distinct: BTreeMap<FieldValue, FieldValue> = BTreeMap::new();
        for value in self.records().map(|r| r.get(field)) {
            if value.is_missing() {
                continue;
            }
            let key = match value {
                FieldValue::Text(s) => FieldValue::Text(s.to_lowercase()),
                other => other.clone(),
            };
            distinct.entry(key).or_insert_with(|| value.clone());
        }
        Ok(distinct.into_values().collect())
    }

    /// Earliest and latest day of `field` in the current view.
    pub fn date_bounds(&self, field: &str) -> Result<Option<(NaiveDate, NaiveDate)>, SchemaError> {
        let ty = self.dataset.schema().require(field)?;
        if ty != FieldType::Date {
            return Err(SchemaError::FieldType {
                field: field.to_string(),
                expected: FieldType::Date,
                found: ty,
            });
        }
        let bounds = self
            .records()
            .filter_map(|r| r.get(field).as_date())
            .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            });
        Ok(bounds)
    }

    /// Row indices (into the dataset) of the current view, in dataset order.
    pub fn into_indices(self) -> Vec<usize> {
        self.view
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.view.iter().map(move |&row| &records[row])
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }
}

/// Row indices of records passing every criterion, applied in the given order.
///
/// All criteria are validated against the schema before any narrowing happens.
pub fn filtered_indices(
    dataset: &Dataset,
    criteria: &[FilterCriterion],
) -> Result<Vec<usize>, SchemaError> {
    for criterion in criteria {
        criterion.validate(dataset)?;
    }
    let mut pipeline = FilterPipeline::new(dataset);
    for criterion in criteria {
        pipeline.narrow(criterion)?;
    }
    Ok(pipeline.into_indices())
}

/// The filtered view itself: an order-preserving subsequence of the dataset.
pub fn apply_filters<'a>(
    dataset: &'a Dataset,
    criteria: &[FilterCriterion],
) -> Result<Vec<&'a Record>, SchemaError> {
    let records = dataset.records();
    Ok(filtered_indices(dataset, criteria)?
        .into_iter()
        .map(|row| &records[row])
        .collect())
}
