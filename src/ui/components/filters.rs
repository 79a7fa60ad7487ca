use std::collections::BTreeSet;

use chrono::NaiveDate;
use dioxus::prelude::*;

use crate::domain::entities::filter::{
    DateRange, FilterScope, UNASSIGNED_OWNER, UNKNOWN_LEAD_SOURCE,
};
use crate::domain::entities::records::AvailableFilters;
use crate::domain::params::{
    DateRangeParam, FilterParam, LeadSourceParam, OwnerParam, PageParam, SearchParam, StatusParam,
};
use crate::domain::query_string::QueryString;
use crate::ui::state::list_controller::ListController;

const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// `(value, label)` pairs for a facet. A sentinel is appended after the
/// backend's own values unless the backend already sent it.
pub fn facet_options(values: &[String], sentinel: Option<(&str, &str)>) -> Vec<(String, String)> {
    let mut options: Vec<(String, String)> = values
        .iter()
        .filter(|value| !value.trim().is_empty())
        .map(|value| (value.clone(), value.clone()))
        .collect();
    if let Some((token, label)) = sentinel {
        if let Some(existing) = options.iter_mut().find(|(value, _)| value == token) {
            existing.1 = label.to_string();
        } else {
            options.push((token.to_string(), label.to_string()));
        }
    }
    options
}

/// Uncommitted filter bar edits. Nothing reaches the location until Apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDraft {
    pub statuses: BTreeSet<String>,
    pub owners: BTreeSet<String>,
    pub from: String,
    pub to: String,
    pub lead_source: String,
}

impl FilterDraft {
    pub fn from_scope(scope: &FilterScope) -> Self {
        let (from, to) = scope
            .date_range
            .map(|range| {
                (
                    range.from.format(DATE_INPUT_FORMAT).to_string(),
                    range.to.format(DATE_INPUT_FORMAT).to_string(),
                )
            })
            .unwrap_or_default();
        Self {
            statuses: scope.statuses.clone(),
            owners: scope.owners.clone(),
            from,
            to,
            lead_source: scope.lead_source.clone().unwrap_or_default(),
        }
    }

    /// `Ok(None)` when both dates are blank, an error message when the pair
    /// is incomplete or reversed.
    pub fn date_range(&self) -> Result<Option<DateRange>, String> {
        let parse = |raw: &str| NaiveDate::parse_from_str(raw.trim(), DATE_INPUT_FORMAT).ok();
        match (self.from.trim().is_empty(), self.to.trim().is_empty()) {
            (true, true) => Ok(None),
            (false, false) => {
                let from = parse(&self.from).ok_or("Start date is not a valid date")?;
                let to = parse(&self.to).ok_or("End date is not a valid date")?;
                DateRange::new(from, to)
                    .map(Some)
                    .ok_or_else(|| "End date must not be before start date".to_string())
            }
            _ => Err("Choose both a start and an end date".to_string()),
        }
    }

    /// Writes every draft dimension in one navigation.
    pub fn apply(&self, controller: &mut ListController) -> Result<(), String> {
        let range = self.date_range()?;
        let lead_source = Some(self.lead_source.clone()).filter(|v| !v.trim().is_empty());
        let statuses = Some(self.statuses.clone()).filter(|v| !v.is_empty());
        let owners = Some(self.owners.clone()).filter(|v| !v.is_empty());
        controller.navigate(|query| {
            StatusParam::write(query, statuses.as_ref());
            OwnerParam::write(query, owners.as_ref());
            DateRangeParam::write(query, range.as_ref());
            LeadSourceParam::write(query, lead_source.as_ref());
            PageParam::write(query, Some(&1));
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChip {
    Search,
    Status,
    Owner,
    DateRange,
    LeadSource,
}

impl FilterChip {
    pub fn clear(self, controller: &mut ListController) {
        match self {
            FilterChip::Search => controller.clear_filter::<SearchParam>(),
            FilterChip::Status => controller.clear_filter::<StatusParam>(),
            FilterChip::Owner => controller.clear_filter::<OwnerParam>(),
            FilterChip::DateRange => controller.clear_filter::<DateRangeParam>(),
            FilterChip::LeadSource => controller.clear_filter::<LeadSourceParam>(),
        }
    }
}

fn join_labels(values: impl IntoIterator<Item = String>) -> String {
    values.into_iter().collect::<Vec<_>>().join(", ")
}

/// A removable chip for every active filter, sentinels spelled out.
pub fn active_chips(query: &QueryString) -> Vec<(FilterChip, String)> {
    let mut chips = Vec::new();
    if let Some(search) = SearchParam::read(query) {
        chips.push((FilterChip::Search, format!("Search: {search}")));
    }
    if let Some(statuses) = StatusParam::read(query) {
        chips.push((FilterChip::Status, format!("Status: {}", join_labels(statuses))));
    }
    if let Some(owners) = OwnerParam::read(query) {
        let mut names: Vec<String> = owners
            .into_iter()
            .filter(|owner| owner != UNASSIGNED_OWNER)
            .collect();
        if OwnerParam::includes_unassigned(query) {
            names.push("Unassigned".to_string());
        }
        chips.push((FilterChip::Owner, format!("Owner: {}", join_labels(names))));
    }
    if let Some(range) = DateRangeParam::read(query) {
        chips.push((
            FilterChip::DateRange,
            format!(
                "{} to {}",
                range.from.format(DATE_INPUT_FORMAT),
                range.to.format(DATE_INPUT_FORMAT)
            ),
        ));
    }
    if let Some(source) = LeadSourceParam::read(query) {
        let label = if LeadSourceParam::is_unknown(query) {
            "Unknown".to_string()
        } else {
            source
        };
        chips.push((FilterChip::LeadSource, format!("Source: {label}")));
    }
    chips
}

fn toggled(set: &BTreeSet<String>, value: &str) -> BTreeSet<String> {
    let mut next = set.clone();
    if !next.remove(value) {
        next.insert(value.to_string());
    }
    next
}

#[component]
fn CheckboxGroup(
    title: String,
    options: Vec<(String, String)>,
    checked: BTreeSet<String>,
    on_toggle: EventHandler<String>,
) -> Element {
    rsx! {
        fieldset { style: "border: 1px solid #ddd; border-radius: 6px; padding: 4px 8px; display: flex; gap: 8px; flex-wrap: wrap;",
            legend { "{title}" }
            for (value, label) in options {
                {
                    let is_checked = checked.contains(&value);
                    let toggle_value = value.clone();
                    rsx! {
                        label { key: "{value}", style: "display: inline-flex; gap: 4px; align-items: center;",
                            input {
                                r#type: "checkbox",
                                checked: is_checked,
                                onchange: move |_| on_toggle.call(toggle_value.clone()),
                            }
                            "{label}"
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn FilterBar(
    controller: Signal<ListController>,
    available: AvailableFilters,
    show_owner: bool,
    show_lead_source: bool,
    show_search: bool,
    search_text: String,
    on_search_input: EventHandler<String>,
) -> Element {
    let mut controller = controller;
    let scope = use_memo(move || controller.read().filters().scope());
    let mut draft = use_signal(|| FilterDraft::from_scope(&scope.peek()));

    use_effect(move || {
        let committed = scope();
        draft.set(FilterDraft::from_scope(&committed));
    });

    let active = controller.read().filters().active_filter_count();
    let chips = active_chips(controller.read().query());
    let status_options = facet_options(&available.statuses, None);
    let owner_options = facet_options(&available.owners, Some((UNASSIGNED_OWNER, "Unassigned")));
    let source_options = facet_options(
        &available.lead_sources,
        Some((UNKNOWN_LEAD_SOURCE, "Unknown")),
    );
    let current = draft();

    rsx! {
        div { style: "display: flex; flex-wrap: wrap; gap: 12px; align-items: flex-end; padding: 8px 0;",
            if show_search {
                input {
                    r#type: "search",
                    placeholder: "Search…",
                    value: "{search_text}",
                    oninput: move |event| on_search_input.call(event.value()),
                }
            }
            if !status_options.is_empty() {
                CheckboxGroup {
                    title: "Status".to_string(),
                    options: status_options,
                    checked: current.statuses.clone(),
                    on_toggle: move |value: String| {
                        draft.with_mut(|d| d.statuses = toggled(&d.statuses, &value));
                    },
                }
            }
            if show_owner {
                CheckboxGroup {
                    title: "Owner".to_string(),
                    options: owner_options,
                    checked: current.owners.clone(),
                    on_toggle: move |value: String| {
                        draft.with_mut(|d| d.owners = toggled(&d.owners, &value));
                    },
                }
            }
            label { style: "display: inline-flex; flex-direction: column;",
                "From"
                input {
                    r#type: "date",
                    value: "{current.from}",
                    oninput: move |event| draft.with_mut(|d| d.from = event.value()),
                }
            }
            label { style: "display: inline-flex; flex-direction: column;",
                "To"
                input {
                    r#type: "date",
                    value: "{current.to}",
                    oninput: move |event| draft.with_mut(|d| d.to = event.value()),
                }
            }
            if show_lead_source {
                label { style: "display: inline-flex; flex-direction: column;",
                    "Lead source"
                    select {
                        value: "{current.lead_source}",
                        onchange: move |event| draft.with_mut(|d| d.lead_source = event.value()),
                        option { value: "", "Any" }
                        for (value, label) in source_options {
                            option {
                                key: "{value}",
                                value: "{value}",
                                selected: value == current.lead_source,
                                "{label}"
                            }
                        }
                    }
                }
            }
            button {
                onclick: move |_| {
                    let pending = draft();
                    let mut ctrl = controller.write();
                    if let Err(message) = pending.apply(&mut ctrl) {
                        ctrl.notices_mut().error(message);
                    }
                },
                "Apply"
            }
            button {
                disabled: active == 0,
                onclick: move |_| controller.write().clear_all_filters(),
                "Clear all"
            }
        }
        if !chips.is_empty() {
            div { style: "display: flex; flex-wrap: wrap; gap: 6px; padding-bottom: 8px;",
                for (chip, label) in chips {
                    span {
                        key: "{label}",
                        style: "border: 1px solid #bcd; background: #f0f6ff; border-radius: 12px; padding: 2px 8px; display: inline-flex; gap: 6px; align-items: center;",
                        "{label}"
                        button {
                            style: "border: none; background: none; cursor: pointer; padding: 0;",
                            title: "Remove filter",
                            onclick: move |_| chip.clear(&mut controller.write()),
                            "×"
                        }
                    }
                }
            }
        }
    }
}
