use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures at the corpus boundary. All are local and
/// deterministic; none is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("unrecognized scale band: {0:?}")]
    InvalidScale(String),
    #[error("invalid plan number for scale {scale:?}: {plan_number:?}")]
    InvalidPlanNumber {
        scale: ScaleBand,
        plan_number: Option<i64>,
    },
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// The four classification tiers that decide a document's vertical band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleBand {
    Text,
    Concept,
    Plan,
    Blueprints,
}

impl ScaleBand {
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized = token.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "text" => Some(Self::Text),
            "concept" => Some(Self::Concept),
            "blueprints" | "blueprint" => Some(Self::Blueprints),
            "plan" => Some(Self::Plan),
            other => {
                // The source data also spells plan scales as "1:N".
                if other.starts_with("1:") {
                    Some(Self::Plan)
                } else {
                    None
                }
            }
        }
    }
}

/// Semantic relationship between two linked documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    DirectConsequence,
    CollateralConsequence,
    Projection,
    Update,
}

impl ConnectionType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "direct_consequence" | "direct consequence" => Some(Self::DirectConsequence),
            "collateral_consequence" | "collateral consequence" => {
                Some(Self::CollateralConsequence)
            }
            "projection" | "prevision" => Some(Self::Projection),
            "update" => Some(Self::Update),
            _ => None,
        }
    }
}

/// Issuance date with optional precision. Day-level precision is carried
/// through parsing but never influences placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDate {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl PartialDate {
    pub fn year_only(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    pub fn validate(&self) -> Result<(), PlacementError> {
        if !(1000..=9999).contains(&self.year) {
            return Err(PlacementError::InvalidDate(format!(
                "year {} is not a 4-digit year",
                self.year
            )));
        }
        if let Some(month) = self.month
            && !(1..=12).contains(&month)
        {
            return Err(PlacementError::InvalidDate(format!(
                "month {month} outside 1-12"
            )));
        }
        if let Some(day) = self.day
            && !(1..=31).contains(&day)
        {
            return Err(PlacementError::InvalidDate(format!("day {day} outside 1-31")));
        }
        Ok(())
    }
}

/// The slice of a document the diagram cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRef {
    pub id: String,
    pub title: String,
    pub doc_type: String,
    pub scale: ScaleBand,
    pub plan_number: Option<u32>,
    pub date: PartialDate,
}

impl DocumentRef {
    /// Enforces the scale/plan-number pairing invariant:
    /// a plan number exists iff the scale is `Plan`, and is positive.
    pub fn validate(&self) -> Result<(), PlacementError> {
        match (self.scale, self.plan_number) {
            (ScaleBand::Plan, Some(n)) if n > 0 => {}
            (ScaleBand::Plan, n) => {
                return Err(PlacementError::InvalidPlanNumber {
                    scale: self.scale,
                    plan_number: n.map(i64::from),
                });
            }
            (_, None) => {}
            (_, Some(n)) => {
                return Err(PlacementError::InvalidPlanNumber {
                    scale: self.scale,
                    plan_number: Some(i64::from(n)),
                });
            }
        }
        self.date.validate()
    }
}

/// A directed link between two documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub from: String,
    pub to: String,
    pub connection_type: ConnectionType,
}

/// An entire parsed input: documents, links, and any saved manual
/// position overrides keyed by document id.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub documents: Vec<DocumentRef>,
    pub links: Vec<Link>,
    pub overrides: BTreeMap<String, (f32, f32)>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest issuance year across the corpus, if any documents exist.
    pub fn first_year(&self) -> Option<i32> {
        self.documents.iter().map(|d| d.date.year).min()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.documents.iter().map(|d| d.date.year).max()
    }
}

/// Ephemeral per-view selection state. The rendering layer owns the single
/// mutable slot; the layout functions only ever read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub clicked: Option<String>,
    pub hovered: Option<String>,
    pub selected_member: BTreeMap<String, usize>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Click transition. Clicking the already-selected node, or the reserved
    /// backdrop node, deselects; anything else becomes the sole selection.
    pub fn click(&mut self, node_id: &str, backdrop_id: &str) {
        if node_id == backdrop_id || self.clicked.as_deref() == Some(node_id) {
            self.clicked = None;
        } else {
            self.clicked = Some(node_id.to_string());
        }
    }

    pub fn hover_enter(&mut self, node_id: &str) {
        self.hovered = Some(node_id.to_string());
    }

    pub fn hover_leave(&mut self) {
        self.hovered = None;
    }

    /// Picks which member of a group node is shown. Out-of-range indices are
    /// clamped at read time by the layout, so no bound check happens here.
    pub fn select_member(&mut self, node_id: &str, index: usize) {
        self.selected_member.insert(node_id.to_string(), index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_band_tokens() {
        assert_eq!(ScaleBand::from_token("text"), Some(ScaleBand::Text));
        assert_eq!(ScaleBand::from_token("Concept"), Some(ScaleBand::Concept));
        assert_eq!(
            ScaleBand::from_token("blueprints"),
            Some(ScaleBand::Blueprints)
        );
        assert_eq!(ScaleBand::from_token("1:5000"), Some(ScaleBand::Plan));
        assert_eq!(ScaleBand::from_token("hamlet"), None);
    }

    #[test]
    fn connection_type_tokens() {
        assert_eq!(
            ConnectionType::from_token("direct_consequence"),
            Some(ConnectionType::DirectConsequence)
        );
        assert_eq!(
            ConnectionType::from_token("prevision"),
            Some(ConnectionType::Projection)
        );
        assert_eq!(
            ConnectionType::from_token("update"),
            Some(ConnectionType::Update)
        );
        assert_eq!(ConnectionType::from_token("friendship"), None);
    }

    #[test]
    fn plan_requires_positive_plan_number() {
        let mut doc = DocumentRef {
            id: "d1".to_string(),
            title: "Plan".to_string(),
            doc_type: "prescriptive".to_string(),
            scale: ScaleBand::Plan,
            plan_number: None,
            date: PartialDate::year_only(2010),
        };
        assert!(matches!(
            doc.validate(),
            Err(PlacementError::InvalidPlanNumber { .. })
        ));
        doc.plan_number = Some(8000);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn plan_number_forbidden_outside_plan_scale() {
        let doc = DocumentRef {
            id: "d1".to_string(),
            title: "Note".to_string(),
            doc_type: "informative".to_string(),
            scale: ScaleBand::Text,
            plan_number: Some(5000),
            date: PartialDate::year_only(2010),
        };
        assert!(doc.validate().is_err());
    }

    #[test]
    fn date_validation_bounds() {
        assert!(PartialDate::year_only(2007).validate().is_ok());
        assert!(
            PartialDate {
                year: 2007,
                month: Some(13),
                day: None
            }
            .validate()
            .is_err()
        );
        assert!(PartialDate::year_only(7).validate().is_err());
    }

    #[test]
    fn click_toggles_selection() {
        let mut state = InteractionState::new();
        state.click("n1", "backdrop");
        assert_eq!(state.clicked.as_deref(), Some("n1"));
        state.click("n1", "backdrop");
        assert_eq!(state.clicked, None);
    }

    #[test]
    fn click_replaces_previous_selection() {
        let mut state = InteractionState::new();
        state.click("n1", "backdrop");
        state.click("n2", "backdrop");
        assert_eq!(state.clicked.as_deref(), Some("n2"));
    }

    #[test]
    fn backdrop_click_deselects() {
        let mut state = InteractionState::new();
        state.click("n1", "backdrop");
        state.click("backdrop", "backdrop");
        assert_eq!(state.clicked, None);
    }
}
