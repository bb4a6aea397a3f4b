//! Snapshot of the shared control panel for whichever entry is selected.

use crate::config::Interval;
use crate::host::SimId;
use crate::managed::ManagedSimulation;
use crate::notify;
use crate::range::RangeField;
use crate::registry::Registry;

pub const DISABLE_LABEL: &str = "Disable selected simulation";
pub const ENABLE_LABEL: &str = "Enable selected simulation";

/// Label of the enable/disable button for an entry in the given state.
#[must_use]
pub const fn toggle_label(enabled: bool) -> &'static str {
    if enabled { DISABLE_LABEL } else { ENABLE_LABEL }
}

/// One slider as the panel would show it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub field: RangeField,
    pub label: &'static str,
    pub value: f32,
    pub slider: Interval,
    pub decimals: usize,
}

impl FieldView {
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("{:.*}", self.decimals, self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub id: SimId,
    pub label: String,
    pub enabled: bool,
    pub fields: Vec<FieldView>,
    pub status: String,
    pub advisory: String,
    pub toggle_label: &'static str,
}

impl PanelView {
    #[must_use]
    pub fn from_managed(managed: &ManagedSimulation) -> Self {
        let limits = managed.limits();
        let fields = RangeField::ALL
            .iter()
            .map(|&field| FieldView {
                field,
                label: field.label(),
                value: managed.range().get(field),
                slider: field.slider(limits),
                decimals: field.display_decimals(),
            })
            .collect();
        Self {
            id: managed.id().clone(),
            label: managed.label().to_owned(),
            enabled: managed.enabled(),
            fields,
            status: notify::status(managed),
            advisory: managed.last_advisory().to_owned(),
            toggle_label: toggle_label(managed.enabled()),
        }
    }

    #[must_use]
    pub fn field(&self, field: RangeField) -> Option<&FieldView> {
        self.fields.iter().find(|view| view.field == field)
    }
}

impl Registry {
    /// Panel for the selected entry; `None` when nothing is tracked.
    #[must_use]
    pub fn panel(&self) -> Option<PanelView> {
        self.selected().map(PanelView::from_managed)
    }

    /// Chooser entries as (id, label), in tracking order.
    #[must_use]
    pub fn choices(&self) -> Vec<(SimId, String)> {
        self.iter()
            .map(|managed| (managed.id().clone(), managed.label().to_owned()))
            .collect()
    }
}
