use ratatui::{
    text::{Line, Span},
    widgets::{ListItem, ListState},
};

/// Models offered by the settings panel, as `(id, label)`.
pub const MODELS: [(&str, &str); 2] = [("gpt-4", "GPT-4"), ("gpt-3.5", "GPT-3.5")];

/// Step of the temperature control.
pub const TEMPERATURE_STEP: f32 = 0.1;

/// Rows of the settings panel, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsRow {
    #[default]
    Theme,
    Model,
    Temperature,
}

impl SettingsRow {
    pub fn next(self) -> Self {
        match self {
            SettingsRow::Theme => SettingsRow::Model,
            SettingsRow::Model | SettingsRow::Temperature => SettingsRow::Temperature,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            SettingsRow::Theme | SettingsRow::Model => SettingsRow::Theme,
            SettingsRow::Temperature => SettingsRow::Model,
        }
    }
}

pub struct ModelList {
    pub items: Vec<ModelItem>,
    pub state: ListState,
}

#[derive(Debug)]
pub struct ModelItem {
    pub name: String,
    pub label: String,
}

impl FromIterator<(&'static str, &'static str)> for ModelList {
    fn from_iter<I: IntoIterator<Item = (&'static str, &'static str)>>(iter: I) -> Self {
        let items = iter
            .into_iter()
            .map(|(name, label)| ModelItem::new(name, label))
            .collect();
        let mut state = ListState::default();
        state.select_first();
        Self { items, state }
    }
}

impl Default for ModelList {
    fn default() -> Self {
        MODELS.into_iter().collect()
    }
}

impl ModelList {
    /// Moves the highlight to `name`; unknown models leave it where it is.
    pub fn select_name(&mut self, name: &str) {
        if let Some(index) = self.items.iter().position(|m| m.name == name) {
            self.state.select(Some(index));
        }
    }

    /// Model `delta` rows away from the highlighted one, wrapping around.
    pub fn cycle(&self, delta: i32) -> Option<&ModelItem> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len() as i32;
        let current = self.state.selected().unwrap_or(0) as i32;
        let index = (current + delta).rem_euclid(len) as usize;
        self.items.get(index)
    }
}

impl ModelItem {
    pub fn new(model: &str, label: &str) -> Self {
        Self {
            name: model.to_string(),
            label: label.to_string(),
        }
    }
}

impl From<&ModelItem> for ListItem<'_> {
    fn from(value: &ModelItem) -> Self {
        let line = Line::from(Span::raw(value.label.clone()));
        ListItem::new(line)
    }
}

/// Temperature after `steps` control steps, clamped to `[0, 1]`.
pub fn step_temperature(current: f32, steps: i32) -> f32 {
    let tenths = (current / TEMPERATURE_STEP).round() as i32 + steps;
    (tenths as f32 * TEMPERATURE_STEP).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_wraps_around() {
        let mut models = ModelList::default();
        models.select_name("gpt-3.5");
        assert_eq!(models.cycle(1).map(|m| m.name.as_str()), Some("gpt-4"));
        assert_eq!(models.cycle(-1).map(|m| m.name.as_str()), Some("gpt-4"));
        assert_eq!(models.cycle(0).map(|m| m.name.as_str()), Some("gpt-3.5"));
    }

    #[test]
    fn temperature_control_clamps() {
        assert!((step_temperature(0.7, 1) - 0.8).abs() < 1e-6);
        assert!((step_temperature(0.7, -2) - 0.5).abs() < 1e-6);
        assert_eq!(step_temperature(1.0, 1), 1.0);
        assert_eq!(step_temperature(0.0, -1), 0.0);
    }

    #[test]
    fn settings_rows_stop_at_edges() {
        assert_eq!(SettingsRow::Theme.previous(), SettingsRow::Theme);
        assert_eq!(SettingsRow::Theme.next().next(), SettingsRow::Temperature);
        assert_eq!(SettingsRow::Temperature.next(), SettingsRow::Temperature);
    }
}
