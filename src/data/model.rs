use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::reshape::melt;

// ---------------------------------------------------------------------------
// Column – every named column of the long table
// ---------------------------------------------------------------------------

/// A column of the long (melted) review table.
///
/// The first ten are the identifying attributes carried over from the wide
/// spreadsheet; the last two are produced by the reshape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Ref,
    Modality,
    Format,
    AiModel,
    Domain,
    XaiType,
    XaiTechnique,
    XaiMethod,
    Task,
    Audience,
    RelianceType,
    RelianceEffect,
}

impl Column {
    /// Identifying columns, in spreadsheet order.
    pub const IDENTIFYING: [Column; 10] = [
        Column::Ref,
        Column::Modality,
        Column::Format,
        Column::AiModel,
        Column::Domain,
        Column::XaiType,
        Column::XaiTechnique,
        Column::XaiMethod,
        Column::Task,
        Column::Audience,
    ];

    /// All long-table columns, in display order.
    pub const ALL: [Column; 12] = [
        Column::Ref,
        Column::Modality,
        Column::Format,
        Column::AiModel,
        Column::Domain,
        Column::XaiType,
        Column::XaiTechnique,
        Column::XaiMethod,
        Column::Task,
        Column::Audience,
        Column::RelianceType,
        Column::RelianceEffect,
    ];

    /// Columns that get a selector in the filter panel, in panel order.
    pub const FILTERABLE: [Column; 11] = [
        Column::Modality,
        Column::Format,
        Column::Task,
        Column::Domain,
        Column::XaiType,
        Column::XaiTechnique,
        Column::XaiMethod,
        Column::Audience,
        Column::AiModel,
        Column::RelianceType,
        Column::RelianceEffect,
    ];

    /// Header as it appears in the source spreadsheet / exported CSV.
    pub fn header(self) -> &'static str {
        match self {
            Column::Ref => "Ref",
            Column::Modality => "Explanation Modality",
            Column::Format => "Explanation Format",
            Column::AiModel => "AI Model",
            Column::Domain => "Application Domain",
            Column::XaiType => "XAI Type",
            Column::XaiTechnique => "XAI Technique",
            Column::XaiMethod => "XAI Method",
            Column::Task => "Decision-Making Task",
            Column::Audience => "Audience",
            Column::RelianceType => "Reliance Type",
            Column::RelianceEffect => "Reliance Effect",
        }
    }

    /// Short label for the selector heading.
    pub fn label(self) -> &'static str {
        match self {
            Column::Task => "Task",
            Column::Domain => "Domain",
            other => other.header(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// RelianceType – the three outcome columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelianceType {
    OverReliance,
    UnderReliance,
    AppropriateReliance,
}

impl RelianceType {
    /// Outcome columns in melt order.
    pub const ALL: [RelianceType; 3] = [
        RelianceType::OverReliance,
        RelianceType::UnderReliance,
        RelianceType::AppropriateReliance,
    ];

    pub fn header(self) -> &'static str {
        match self {
            RelianceType::OverReliance => "Over-reliance",
            RelianceType::UnderReliance => "Under-reliance",
            RelianceType::AppropriateReliance => "Appropriate reliance",
        }
    }

    fn index(self) -> usize {
        match self {
            RelianceType::OverReliance => 0,
            RelianceType::UnderReliance => 1,
            RelianceType::AppropriateReliance => 2,
        }
    }
}

impl fmt::Display for RelianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Effect labels the selector offers. Other values found in the data are
/// kept but cannot be picked from the panel.
pub const KNOWN_EFFECTS: [&str; 2] = ["Increase", "Decrease"];

// ---------------------------------------------------------------------------
// StudyAttributes / Study – one row of the wide spreadsheet
// ---------------------------------------------------------------------------

/// The ten identifying attributes of a reviewed study. Missing cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyAttributes {
    pub reference: Option<String>,
    pub modality: Option<String>,
    pub format: Option<String>,
    pub ai_model: Option<String>,
    pub domain: Option<String>,
    pub xai_type: Option<String>,
    pub xai_technique: Option<String>,
    pub xai_method: Option<String>,
    pub task: Option<String>,
    pub audience: Option<String>,
}

impl StudyAttributes {
    /// Value of an identifying column. Reshape-only columns yield `None`.
    pub fn get(&self, column: Column) -> Option<&str> {
        let slot = match column {
            Column::Ref => &self.reference,
            Column::Modality => &self.modality,
            Column::Format => &self.format,
            Column::AiModel => &self.ai_model,
            Column::Domain => &self.domain,
            Column::XaiType => &self.xai_type,
            Column::XaiTechnique => &self.xai_technique,
            Column::XaiMethod => &self.xai_method,
            Column::Task => &self.task,
            Column::Audience => &self.audience,
            Column::RelianceType | Column::RelianceEffect => return None,
        };
        slot.as_deref()
    }

    /// Mutable slot for an identifying column, `None` for reshape-only columns.
    pub fn slot_mut(&mut self, column: Column) -> Option<&mut Option<String>> {
        match column {
            Column::Ref => Some(&mut self.reference),
            Column::Modality => Some(&mut self.modality),
            Column::Format => Some(&mut self.format),
            Column::AiModel => Some(&mut self.ai_model),
            Column::Domain => Some(&mut self.domain),
            Column::XaiType => Some(&mut self.xai_type),
            Column::XaiTechnique => Some(&mut self.xai_technique),
            Column::XaiMethod => Some(&mut self.xai_method),
            Column::Task => Some(&mut self.task),
            Column::Audience => Some(&mut self.audience),
            Column::RelianceType | Column::RelianceEffect => None,
        }
    }
}

/// A reviewed study as loaded: identifying attributes plus the three
/// outcome cells (`None` when nothing was recorded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Study {
    pub attributes: StudyAttributes,
    pub outcomes: [Option<String>; 3],
}

impl Study {
    pub fn outcome(&self, kind: RelianceType) -> Option<&str> {
        self.outcomes[kind.index()].as_deref()
    }

    pub fn set_outcome(&mut self, kind: RelianceType, value: Option<String>) {
        self.outcomes[kind.index()] = value;
    }
}

// ---------------------------------------------------------------------------
// RelianceRecord – one row of the long table
// ---------------------------------------------------------------------------

/// One observed reliance outcome of a study. `effect` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelianceRecord {
    pub attributes: StudyAttributes,
    pub reliance_type: RelianceType,
    pub effect: String,
}

impl RelianceRecord {
    pub fn value(&self, column: Column) -> Option<&str> {
        match column {
            Column::RelianceType => Some(self.reliance_type.header()),
            Column::RelianceEffect => Some(&self.effect),
            other => self.attributes.get(other),
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewDataset – the immutable long table
// ---------------------------------------------------------------------------

/// The melted review table plus the selector domains derived from it.
/// Built once per loaded file and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ReviewDataset {
    records: Vec<RelianceRecord>,
    study_count: usize,
    unique_values: BTreeMap<Column, BTreeSet<String>>,
}

impl ReviewDataset {
    /// Melt the wide rows and index the distinct values of each column.
    pub fn from_studies(studies: &[Study]) -> Self {
        let records = melt(studies);

        let mut unique_values: BTreeMap<Column, BTreeSet<String>> = BTreeMap::new();
        for record in &records {
            for column in Column::FILTERABLE {
                if let Some(value) = record.value(column) {
                    unique_values
                        .entry(column)
                        .or_default()
                        .insert(value.to_string());
                }
            }
        }

        let unexpected = records
            .iter()
            .filter(|r| !KNOWN_EFFECTS.contains(&r.effect.as_str()))
            .count();
        if unexpected > 0 {
            log::warn!(
                "{unexpected} reliance effects are neither {} nor {}; kept as-is",
                KNOWN_EFFECTS[0],
                KNOWN_EFFECTS[1]
            );
        }

        ReviewDataset {
            records,
            study_count: studies.len(),
            unique_values,
        }
    }

    pub fn records(&self) -> &[RelianceRecord] {
        &self.records
    }

    /// Number of wide rows the table was melted from.
    pub fn study_count(&self) -> usize {
        self.study_count
    }

    /// Number of long rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values offered by a column's selector. Reliance type and effect have
    /// fixed domains; everything else comes from the data, sorted.
    pub fn selector_options(&self, column: Column) -> Vec<String> {
        match column {
            Column::RelianceType => RelianceType::ALL
                .iter()
                .map(|t| t.header().to_string())
                .collect(),
            Column::RelianceEffect => KNOWN_EFFECTS.iter().map(|e| e.to_string()).collect(),
            other => self
                .unique_values
                .get(&other)
                .map(|vals| vals.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }
}
