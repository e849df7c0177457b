use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;

use crate::audio::Waveform;
use crate::audio::{codec, transform};
use crate::config::{AppConfig, Columns};
use crate::data::filter::{Choice, FilterCriterion, FilterPipeline, filtered_indices};
use crate::data::loader;
use crate::data::model::{Dataset, FieldType, FieldValue, Record};
use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Pages and status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Finder,
    Database,
    AddRecording,
    FunctionalData,
    ScrambleAudio,
    CarrierFrequency,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Finder,
        Page::Database,
        Page::AddRecording,
        Page::FunctionalData,
        Page::ScrambleAudio,
        Page::CarrierFrequency,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Finder => "Neurogram Finder",
            Page::Database => "Central Database",
            Page::AddRecording => "Add New Recording",
            Page::FunctionalData => "Functional Data",
            Page::ScrambleAudio => "Scramble Audio",
            Page::CarrierFrequency => "Change Carrier Frequency",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Date range selection
// ---------------------------------------------------------------------------

pub type DateRange = (NaiveDate, NaiveDate);

/// A picked date range, remembered together with the bounds it was picked within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSelection {
    pub bounds: DateRange,
    pub range: DateRange,
}

/// Keep the user's range while the available bounds stay the same; reset it to
/// the full bounds when they change (an earlier answer moved them).
fn reconcile_dates(
    selection: &mut Option<DateSelection>,
    bounds: Option<DateRange>,
) -> Option<DateRange> {
    let Some(bounds) = bounds else {
        *selection = None;
        return None;
    };
    let current = match selection {
        Some(s) if s.bounds == bounds => *s,
        _ => DateSelection {
            bounds,
            range: bounds,
        },
    };
    *selection = Some(current);
    Some(current.range)
}

/// Drop a selection that is no longer among the offered options.
fn retain_option(selection: &mut Option<FieldValue>, options: &[FieldValue]) {
    if selection.as_ref().is_some_and(|v| !options.contains(v)) {
        *selection = None;
    }
}

// ---------------------------------------------------------------------------
// Neurogram finder: five questions, each narrowing the previous answer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinderSelection {
    pub mediator: Option<FieldValue>,
    pub responder: Choice,
    pub method: Option<FieldValue>,
    pub link: Choice,
    pub dates: Option<DateSelection>,
}

/// What the finder page shows: options for each question plus the matching rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinderView {
    pub mediators: Vec<FieldValue>,
    /// Methods present after the mediator and responder answers.
    pub methods: Vec<FieldValue>,
    /// Date span of the records left before the date question; `None` hides it.
    pub date_bounds: Option<DateRange>,
    pub rows: Vec<usize>,
}

impl FinderSelection {
    /// Run the questions in order: mediator → responder → method → folder link → dates.
    ///
    /// Stale answers (a method that the new mediator does not have, a date range
    /// picked under other bounds) are reset in place.
    pub fn evaluate(
        &mut self,
        dataset: &Dataset,
        columns: &Columns,
    ) -> Result<FinderView, SchemaError> {
        let link_field = dataset.folder_link_field(&columns.folder_link_marker)?;
        let mut pipeline = FilterPipeline::new(dataset);

        // No "All" for the mediator: it defaults to the first one, and with no
        // mediator to pick nothing matches.
        let mediators = pipeline.options(&columns.mediator)?;
        if !self.mediator.as_ref().is_some_and(|m| mediators.contains(m)) {
            self.mediator = mediators.first().cloned();
        }
        if self.mediator.is_none() {
            self.dates = None;
            return Ok(FinderView {
                mediators,
                ..FinderView::default()
            });
        }
        pipeline.narrow(&FilterCriterion::selected(
            &columns.mediator,
            self.mediator.clone(),
        ))?;
        pipeline.narrow(&FilterCriterion::status(&columns.responder, self.responder))?;

        let methods = pipeline.options(&columns.administration_method)?;
        retain_option(&mut self.method, &methods);
        pipeline.narrow(&FilterCriterion::selected(
            &columns.administration_method,
            self.method.clone(),
        ))?;
        pipeline.narrow(&FilterCriterion::has_value(link_field, self.link))?;

        let date_bounds = pipeline.date_bounds(&columns.date_recorded)?;
        if let Some((start, end)) = reconcile_dates(&mut self.dates, date_bounds) {
            pipeline.narrow(&FilterCriterion::date_range(
                &columns.date_recorded,
                start,
                end,
            ))?;
        }

        Ok(FinderView {
            mediators,
            methods,
            date_bounds,
            rows: pipeline.into_indices(),
        })
    }
}

// ---------------------------------------------------------------------------
// Functional data search: optional columns, options from the whole dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionalSelection {
    pub question: Option<FieldValue>,
    pub mediator: Option<FieldValue>,
    pub success: Choice,
    pub dates: Option<DateSelection>,
    pub researcher: Option<FieldValue>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionalView {
    pub questions: Vec<FieldValue>,
    pub mediators: Vec<FieldValue>,
    pub researchers: Vec<FieldValue>,
    pub date_bounds: Option<DateRange>,
    /// Whether the dataset has the column; absent columns hide their question.
    pub has_question: bool,
    pub has_success: bool,
    pub has_researcher: bool,
    pub rows: Vec<usize>,
}

impl FunctionalSelection {
    /// Question, success and researcher are asked only when the dataset has those
    /// columns. The mediator column is required.
    pub fn evaluate(
        &mut self,
        dataset: &Dataset,
        columns: &Columns,
    ) -> Result<FunctionalView, SchemaError> {
        let schema = dataset.schema();
        let everything = FilterPipeline::new(dataset);
        let optional_options = |field: &str| -> Result<Vec<FieldValue>, SchemaError> {
            if schema.contains(field) {
                everything.options(field)
            } else {
                Ok(Vec::new())
            }
        };

        let questions = optional_options(&columns.question)?;
        let mediators = everything.options(&columns.mediator)?;
        let researchers = optional_options(&columns.researcher)?;
        let date_bounds = match schema.field_type(&columns.date_recorded) {
            Some(FieldType::Date) => everything.date_bounds(&columns.date_recorded)?,
            _ => None,
        };
        retain_option(&mut self.question, &questions);
        retain_option(&mut self.mediator, &mediators);
        retain_option(&mut self.researcher, &researchers);

        let has_question = schema.contains(&columns.question);
        let has_success = schema.contains(&columns.success);
        let has_researcher = schema.contains(&columns.researcher);

        let mut criteria = Vec::new();
        if has_question {
            criteria.push(FilterCriterion::selected(
                &columns.question,
                self.question.clone(),
            ));
        }
        criteria.push(FilterCriterion::selected(
            &columns.mediator,
            self.mediator.clone(),
        ));
        if has_success {
            criteria.push(FilterCriterion::status(&columns.success, self.success));
        }
        if let Some((start, end)) = reconcile_dates(&mut self.dates, date_bounds) {
            criteria.push(FilterCriterion::date_range(
                &columns.date_recorded,
                start,
                end,
            ));
        }
        if has_researcher {
            criteria.push(FilterCriterion::selected(
                &columns.researcher,
                self.researcher.clone(),
            ));
        }

        Ok(FunctionalView {
            questions,
            mediators,
            researchers,
            date_bounds,
            has_question,
            has_success,
            has_researcher,
            rows: filtered_indices(dataset, &criteria)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Add-recording form
// ---------------------------------------------------------------------------

/// Raw inputs of the add-recording form, keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct AddRecordForm {
    pub text: BTreeMap<String, String>,
    pub dates: BTreeMap<String, NaiveDate>,
}

impl AddRecordForm {
    /// Build a record for every visible column. Date columns default to `today`;
    /// blank text and number inputs are missing.
    pub fn to_record(
        &self,
        dataset: &Dataset,
        config: &AppConfig,
        today: NaiveDate,
    ) -> Result<Record> {
        let mut record = Record::new();
        for field in dataset.schema().fields() {
            if config.is_hidden(&field.name) {
                continue;
            }
            let value = match field.ty {
                FieldType::Date => {
                    FieldValue::Date(self.dates.get(&field.name).copied().unwrap_or(today))
                }
                ty => {
                    let raw = self.text.get(&field.name).map(String::as_str).unwrap_or("");
                    FieldValue::parse_as(raw, ty).ok_or_else(|| {
                        anyhow!("{}: '{raw}' is not a {ty}", field.name)
                    })?
                }
            };
            record.set(field.name.clone(), value);
        }
        Ok(record)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.dates.clear();
    }
}

// ---------------------------------------------------------------------------
// Central database: an editable copy of the visible columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DraftRow {
    /// Row in the dataset this draft row was copied from; `None` for added rows.
    pub source: Option<usize>,
    pub cells: Vec<String>,
}

/// Grid edits are made here and only reach the dataset on commit.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseDraft {
    pub columns: Vec<String>,
    pub rows: Vec<DraftRow>,
}

impl DatabaseDraft {
    pub fn from_dataset(dataset: &Dataset, config: &AppConfig) -> Self {
        let columns: Vec<String> = dataset
            .schema()
            .names()
            .filter(|name| !config.is_hidden(name))
            .map(str::to_owned)
            .collect();
        let rows = dataset
            .records()
            .iter()
            .enumerate()
            .map(|(row, record)| DraftRow {
                source: Some(row),
                cells: columns.iter().map(|c| record.get(c).to_cell()).collect(),
            })
            .collect();
        Self { columns, rows }
    }

    pub fn add_row(&mut self) {
        self.rows.push(DraftRow {
            source: None,
            cells: vec![String::new(); self.columns.len()],
        });
    }

    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    /// Parse every cell against the schema and build the edited dataset.
    /// Hidden columns of existing rows are carried over untouched.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        let schema = dataset.schema();
        let mut records = Vec::with_capacity(self.rows.len());
        for (n, row) in self.rows.iter().enumerate() {
            let mut record = row
                .source
                .and_then(|i| dataset.record(i))
                .cloned()
                .unwrap_or_default();
            for (column, cell) in self.columns.iter().zip(&row.cells) {
                let ty = schema.require(column)?;
                let value = FieldValue::parse_as(cell, ty).ok_or_else(|| {
                    anyhow!("row {}, column '{column}': '{cell}' is not a {ty}", n + 1)
                })?;
                record.set(column.clone(), value);
            }
            records.push(record);
        }
        Ok(Dataset::new(schema.clone(), records)?)
    }
}

// ---------------------------------------------------------------------------
// Audio effect pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEffect {
    Scramble,
    Carrier,
}

/// One uploaded waveform, the effect parameter, and the last result.
#[derive(Debug, Clone, Default)]
pub struct AudioJob {
    pub source: Option<PathBuf>,
    pub input: Option<Waveform>,
    pub output: Option<Waveform>,
    pub parameter: f64,
}

impl AudioEffect {
    pub fn apply(self, waveform: &Waveform, parameter: f64) -> Result<Waveform> {
        let out = match self {
            AudioEffect::Scramble => transform::scramble(waveform, parameter)?,
            AudioEffect::Carrier => transform::modulate_am(waveform, parameter)?,
        };
        Ok(out)
    }

    pub fn output_file_name(self, parameter: f64) -> String {
        match self {
            AudioEffect::Scramble => "scrambled_audio.wav".to_owned(),
            AudioEffect::Carrier => format!("modulated_{}Hz.wav", parameter as i64),
        }
    }

    fn done_message(self, parameter: f64) -> String {
        match self {
            AudioEffect::Scramble => format!("Audio scrambled using {parameter:.3} sec segments!"),
            AudioEffect::Carrier => format!("Audio modulated with {parameter:.1} Hz carrier!"),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The session context: everything one user's interaction works on.
pub struct AppState {
    pub config: AppConfig,
    pub page: Page,

    /// Loaded dataset (None until a CSV has been read).
    pub dataset: Option<Dataset>,

    pub finder: FinderSelection,
    pub functional: FunctionalSelection,
    pub add_form: AddRecordForm,

    /// Pending grid edits; rebuilt whenever the dataset changes.
    pub draft: Option<DatabaseDraft>,

    pub scramble: AudioJob,
    pub carrier: AudioJob,

    /// Status / error message shown in the UI.
    pub status_message: Option<StatusMessage>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let scramble = AudioJob {
            parameter: config.default_segment_seconds,
            ..AudioJob::default()
        };
        let carrier = AudioJob {
            parameter: config.default_carrier_hz,
            ..AudioJob::default()
        };
        Self {
            config,
            page: Page::default(),
            dataset: None,
            finder: FinderSelection::default(),
            functional: FunctionalSelection::default(),
            add_form: AddRecordForm::default(),
            draft: None,
            scramble,
            carrier,
            status_message: None,
        }
    }

    fn report_error(&mut self, e: &anyhow::Error) {
        log::error!("{e:#}");
        self.status_message = Some(StatusMessage::Error(format!("Error: {e:#}")));
    }

    fn report_info(&mut self, msg: impl Into<String>) {
        self.status_message = Some(StatusMessage::Info(msg.into()));
    }

    // -- dataset -----------------------------------------------------------

    /// Load the CSV named in the config.
    pub fn load_configured_dataset(&mut self) {
        let path = self.config.csv_path.clone();
        self.open_dataset(&path);
    }

    /// Load a CSV; later saves go back to the same file.
    pub fn open_dataset(&mut self, path: &Path) {
        match loader::load_csv(path, &self.config.date_columns) {
            Ok(dataset) => {
                self.config.csv_path = path.to_path_buf();
                self.set_dataset(dataset);
            }
            Err(e) => self.report_error(&e.context("CSV file could not be loaded")),
        }
    }

    /// Ingest a dataset and reset everything derived from the previous one.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.finder = FinderSelection::default();
        self.functional = FunctionalSelection::default();
        self.add_form.clear();
        self.draft = Some(DatabaseDraft::from_dataset(&dataset, &self.config));
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    fn persist(&self, dataset: &Dataset) -> Result<()> {
        loader::save_csv(dataset, &self.config.csv_path)
    }

    /// Write the dataset to an arbitrary file without changing where saves go.
    pub fn export_dataset(&mut self, path: &Path) {
        let result = self
            .draft_applied()
            .and_then(|edited| loader::save_csv(&edited, path));
        match result {
            Ok(()) => self.report_info(format!("Exported to {}", path.display())),
            Err(e) => self.report_error(&e),
        }
    }

    fn draft_applied(&self) -> Result<Dataset> {
        let dataset = self.dataset.as_ref().context("no dataset loaded")?;
        match &self.draft {
            Some(draft) => draft.apply(dataset),
            None => Ok(dataset.clone()),
        }
    }

    /// Replace the dataset with the grid edits and save it to the configured CSV.
    ///
    /// The in-memory dataset only changes once the file is written.
    pub fn commit_draft(&mut self) {
        let result = self.draft_applied().and_then(|edited| {
            self.persist(&edited)?;
            Ok(edited)
        });
        match result {
            Ok(edited) => {
                self.draft = Some(DatabaseDraft::from_dataset(&edited, &self.config));
                self.dataset = Some(edited);
                let msg = format!("Changes saved to {}", self.config.csv_path.display());
                self.report_info(msg);
            }
            Err(e) => self.report_error(&e),
        }
    }

    /// Append the add-recording form as a new record and save.
    pub fn add_record(&mut self, today: NaiveDate) {
        match self.try_add_record(today) {
            Ok(extended) => {
                log::info!("Added recording #{}", extended.len());
                self.draft = Some(DatabaseDraft::from_dataset(&extended, &self.config));
                self.dataset = Some(extended);
                self.add_form.clear();
                self.report_info("New recording added and saved!");
            }
            Err(e) => self.report_error(&e),
        }
    }

    /// The dataset with the form's record appended, already written to disk.
    fn try_add_record(&self, today: NaiveDate) -> Result<Dataset> {
        let dataset = self.dataset.as_ref().context("no dataset loaded")?;
        let record = self.add_form.to_record(dataset, &self.config, today)?;
        let mut extended = dataset.clone();
        extended.push_record(record)?;
        self.persist(&extended)?;
        Ok(extended)
    }

    // -- audio -------------------------------------------------------------

    pub fn audio_job(&self, effect: AudioEffect) -> &AudioJob {
        match effect {
            AudioEffect::Scramble => &self.scramble,
            AudioEffect::Carrier => &self.carrier,
        }
    }

    pub fn audio_job_mut(&mut self, effect: AudioEffect) -> &mut AudioJob {
        match effect {
            AudioEffect::Scramble => &mut self.scramble,
            AudioEffect::Carrier => &mut self.carrier,
        }
    }

    pub fn load_audio(&mut self, effect: AudioEffect, path: &Path) {
        match codec::read_wav(path) {
            Ok(waveform) => {
                let job = self.audio_job_mut(effect);
                job.source = Some(path.to_path_buf());
                job.input = Some(waveform);
                job.output = None;
                self.status_message = None;
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub fn run_effect(&mut self, effect: AudioEffect) {
        let job = self.audio_job(effect);
        let parameter = job.parameter;
        let result = job
            .input
            .as_ref()
            .context("upload a .wav file first")
            .and_then(|input| effect.apply(input, parameter));
        match result {
            Ok(output) => {
                log::info!("{effect:?} produced {} samples", output.len());
                self.audio_job_mut(effect).output = Some(output);
                self.report_info(effect.done_message(parameter));
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub fn save_effect_output(&mut self, effect: AudioEffect, path: &Path) {
        let encoding = self.config.output_encoding;
        let result = self
            .audio_job(effect)
            .output
            .as_ref()
            .context("nothing to save yet")
            .and_then(|output| codec::write_wav(path, output, encoding));
        match result {
            Ok(()) => self.report_info(format!("Saved {}", path.display())),
            Err(e) => self.report_error(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    const CSV: &str = "\
Id,Subject ID,Mediator,Responder,Administration Method,Date Recorded,GCS Folder,Email
1,S1,IL-6,Yes,IV,2024-01-10,https://example.org/s1,a@x.org
2,S2,IL-6,No,IP,2024-02-01,,b@x.org
3,S3,TNF,Yes,SC,,https://example.org/s3,c@x.org
4,S4,IL-6,Yes,IP,2024-03-15,,d@x.org
";

    fn dataset() -> Dataset {
        read_csv(CSV.as_bytes(), &["Date Recorded".to_string()]).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn finder_defaults_to_first_mediator() {
        let ds = dataset();
        let mut sel = FinderSelection::default();
        let view = sel.evaluate(&ds, &Columns::default()).unwrap();
        assert_eq!(view.mediators, vec![text("IL-6"), text("TNF")]);
        assert_eq!(sel.mediator, Some(text("IL-6")));
        assert_eq!(view.methods, vec![text("IP"), text("IV")]);
        assert_eq!(view.date_bounds, Some((day(2024, 1, 10), day(2024, 3, 15))));
        assert_eq!(view.rows, vec![0, 1, 3]);
    }

    #[test]
    fn finder_methods_follow_earlier_answers() {
        let ds = dataset();
        let mut sel = FinderSelection {
            responder: Choice::No,
            ..FinderSelection::default()
        };
        let view = sel.evaluate(&ds, &Columns::default()).unwrap();
        assert_eq!(view.methods, vec![text("IP")]);
        assert_eq!(view.rows, vec![1]);
    }

    #[test]
    fn finder_resets_stale_answers() {
        let ds = dataset();
        let mut sel = FinderSelection {
            mediator: Some(text("IL-6")),
            method: Some(text("IV")),
            ..FinderSelection::default()
        };
        sel.evaluate(&ds, &Columns::default()).unwrap();
        assert_eq!(sel.method, Some(text("IV")));

        sel.mediator = Some(text("TNF"));
        let view = sel.evaluate(&ds, &Columns::default()).unwrap();
        assert_eq!(sel.method, None);
        assert_eq!(view.rows, vec![2]);
        // S3 has no date, so the date question disappears.
        assert_eq!(view.date_bounds, None);
        assert_eq!(sel.dates, None);
    }

    #[test]
    fn finder_keeps_a_picked_range_while_bounds_hold() {
        let ds = dataset();
        let mut sel = FinderSelection::default();
        let view = sel.evaluate(&ds, &Columns::default()).unwrap();
        let bounds = view.date_bounds.unwrap();
        sel.dates = Some(DateSelection {
            bounds,
            range: (day(2024, 2, 1), day(2024, 3, 31)),
        });
        let view = sel.evaluate(&ds, &Columns::default()).unwrap();
        assert_eq!(view.rows, vec![1, 3]);

        sel.link = Choice::Yes;
        let view = sel.evaluate(&ds, &Columns::default()).unwrap();
        assert_eq!(view.date_bounds, Some((day(2024, 1, 10), day(2024, 1, 10))));
        assert_eq!(view.rows, vec![0]);
    }

    #[test]
    fn finder_requires_a_folder_link_column() {
        let ds = read_csv("Mediator,Responder\nA,Yes\n".as_bytes(), &[]).unwrap();
        let err = FinderSelection::default()
            .evaluate(&ds, &Columns::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { .. }));
    }

    #[test]
    fn functional_search_skips_absent_columns() {
        let ds = dataset();
        let mut sel = FunctionalSelection {
            mediator: Some(text("IL-6")),
            success: Choice::Yes,
            ..FunctionalSelection::default()
        };
        let view = sel.evaluate(&ds, &Columns::default()).unwrap();
        assert!(!view.has_question && !view.has_success && !view.has_researcher);
        assert_eq!(view.rows, vec![0, 1, 3]);
        assert_eq!(view.mediators, vec![text("IL-6"), text("TNF")]);
    }

    #[test]
    fn draft_edits_keep_hidden_columns() {
        let ds = dataset();
        let config = AppConfig::default();
        let mut draft = DatabaseDraft::from_dataset(&ds, &config);
        assert!(!draft.columns.iter().any(|c| c == "Email" || c == "Id"));

        let responder = draft.columns.iter().position(|c| c == "Responder").unwrap();
        draft.rows[1].cells[responder] = "Yes".to_owned();
        draft.remove_row(2);
        draft.add_row();

        let edited = draft.apply(&ds).unwrap();
        assert_eq!(edited.len(), 4);
        assert_eq!(edited.records()[1].get("Responder"), &text("Yes"));
        assert_eq!(edited.records()[1].get("Email"), &text("b@x.org"));
        assert_eq!(edited.records()[2].get("Subject ID"), &text("S4"));
        assert!(edited.records()[3].get("Subject ID").is_missing());
    }

    #[test]
    fn draft_rejects_badly_typed_cells() {
        let ds = dataset();
        let mut draft = DatabaseDraft::from_dataset(&ds, &AppConfig::default());
        let date = draft.columns.iter().position(|c| c == "Date Recorded").unwrap();
        draft.rows[0].cells[date] = "someday".to_owned();
        let err = draft.apply(&ds).unwrap_err();
        assert!(format!("{err:#}").contains("row 1, column 'Date Recorded'"));
    }

    #[test]
    fn add_form_builds_a_typed_record() {
        let ds = dataset();
        let config = AppConfig::default();
        let mut form = AddRecordForm::default();
        form.text.insert("Subject ID".into(), "S5".into());
        form.text.insert("Mediator".into(), "IL-1".into());
        form.text.insert("Email".into(), "hidden@x.org".into());

        let record = form.to_record(&ds, &config, day(2025, 6, 1)).unwrap();
        assert_eq!(record.get("Subject ID"), &text("S5"));
        assert_eq!(record.get("Date Recorded"), &FieldValue::Date(day(2025, 6, 1)));
        assert!(record.get("Email").is_missing());
        assert!(record.get("GCS Folder").is_missing());
    }

    #[test]
    fn finder_without_mediators_matches_nothing() {
        let ds = read_csv(
            "Mediator,Responder,Administration Method,Date Recorded,GCS Folder\n,Yes,IV,2024-01-10,\n,No,IP,,\n"
                .as_bytes(),
            &["Date Recorded".to_string()],
        )
        .unwrap();
        let mut sel = FinderSelection::default();
        let view = sel.evaluate(&ds, &Columns::default()).unwrap();
        assert!(view.mediators.is_empty());
        assert_eq!(sel.mediator, None);
        assert!(view.rows.is_empty());
    }

    /// A state whose saves go to `path`, loaded with the fixture rows.
    fn state_saving_to(path: PathBuf) -> AppState {
        let mut state = AppState::new(AppConfig {
            csv_path: path,
            ..AppConfig::default()
        });
        state.set_dataset(dataset());
        state
    }

    #[test]
    fn failed_add_leaves_dataset_and_draft_untouched() {
        // A directory cannot be opened as a CSV file for writing.
        let mut state = state_saving_to(std::env::temp_dir());
        state.add_form.text.insert("Subject ID".into(), "S5".into());
        state.add_record(day(2025, 6, 1));

        assert!(matches!(state.status_message, Some(StatusMessage::Error(_))));
        assert_eq!(state.dataset.as_ref().unwrap().len(), 4);
        assert_eq!(state.draft.as_ref().unwrap().rows.len(), 4);
        assert_eq!(state.add_form.text.get("Subject ID").map(String::as_str), Some("S5"));
    }

    #[test]
    fn failed_commit_keeps_the_loaded_dataset() {
        let mut state = state_saving_to(std::env::temp_dir());
        if let Some(draft) = state.draft.as_mut() {
            draft.remove_row(0);
        }
        state.commit_draft();

        assert!(matches!(state.status_message, Some(StatusMessage::Error(_))));
        assert_eq!(state.dataset.as_ref().unwrap().len(), 4);
        assert_eq!(state.draft.as_ref().unwrap().rows.len(), 3);
    }

    #[test]
    fn add_then_commit_keeps_the_new_record() {
        let path = std::env::temp_dir().join(format!("neurogram_state_{}.csv", std::process::id()));
        let mut state = state_saving_to(path.clone());
        state.add_form.text.insert("Subject ID".into(), "S5".into());
        state.add_record(day(2025, 6, 1));
        assert!(matches!(state.status_message, Some(StatusMessage::Info(_))));
        assert_eq!(state.draft.as_ref().unwrap().rows.len(), 5);
        assert!(state.add_form.text.is_empty());

        state.commit_draft();
        let saved = loader::load_csv(&path, &state.config.date_columns).unwrap();
        assert_eq!(saved.len(), 5);
        assert_eq!(saved.records()[4].get("Subject ID"), &text("S5"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn effects_are_run_against_the_uploaded_waveform() {
        let mut state = AppState::default();
        state.run_effect(AudioEffect::Scramble);
        assert!(matches!(state.status_message, Some(StatusMessage::Error(_))));

        state.carrier.input = Some(Waveform::new(8_000, vec![0.1, 0.4, -0.2, 0.3]).unwrap());
        state.run_effect(AudioEffect::Carrier);
        let out = state.carrier.output.as_ref().unwrap();
        assert_eq!(out.len(), 4);
        assert!((out.peak() - 1.0).abs() < 1e-6);

        state.carrier.parameter = 60_000.0;
        state.run_effect(AudioEffect::Carrier);
        assert!(matches!(state.status_message, Some(StatusMessage::Error(ref m)) if m.contains("carrier")));
        assert_eq!(AudioEffect::Carrier.output_file_name(15_000.0), "modulated_15000Hz.wav");
    }
}
