use super::events::{Publisher, SelectionEvent};
use crate::domain::catalog::{Method, SelectableEntry};
use crate::domain::money::Amount;
use crate::domain::payment::CreatePayment;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

/// One row of the list presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub entry: SelectableEntry,
    /// Issuer rows shown under their expanded method.
    pub nested: bool,
    pub selected: bool,
}

/// One cell of the grid presentation. The grid never shows issuers.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub method: Method,
    pub highlighted: bool,
}

/// Tracks hierarchical selection across methods and their issuers.
///
/// Expansion and selection are two constrained fields:
/// - at most one method is expanded;
/// - a selected issuer always belongs to the expanded method;
/// - a method without issuers is never expanded.
///
/// Both the list and the grid adapter render from the same state via
/// [`list_rows`](Self::list_rows) and [`grid_cells`](Self::grid_cells), so
/// switching between them never loses or duplicates a selection.
#[derive(Debug)]
pub struct SelectionStateMachine {
    catalog: Vec<Method>,
    expanded_method_id: Option<String>,
    selected_entry: Option<SelectableEntry>,
    events: Publisher<SelectionEvent>,
}

impl SelectionStateMachine {
    /// Creates an empty machine and the receiver its adapters subscribe to.
    pub fn new() -> (Self, UnboundedReceiver<SelectionEvent>) {
        let (events, rx) = Publisher::channel();
        let machine = Self {
            catalog: Vec::new(),
            expanded_method_id: None,
            selected_entry: None,
            events,
        };
        (machine, rx)
    }

    /// Replaces the catalog and clears expansion and selection.
    pub fn load_catalog(&mut self, methods: Vec<Method>) {
        debug!(count = methods.len(), "loading catalog");
        self.catalog = methods;
        self.collapse();
        self.clear_selection();
    }

    pub fn catalog(&self) -> &[Method] {
        &self.catalog
    }

    /// Expands or collapses a method with issuers. No-op for anything else.
    pub fn toggle_expand(&mut self, method_id: &str) {
        let Some(method) = self.method(method_id).cloned() else {
            warn!(method_id, "expand requested for unknown method");
            return;
        };
        if !method.has_issuers() {
            debug!(method_id, "method has no issuers, nothing to expand");
            return;
        }

        if self.expanded_method_id.as_deref() == Some(method_id) {
            self.collapse();
            return;
        }

        // Expansion moves in place, without collapse events.
        if let Some(previous) = self.selected_entry.take() {
            self.events.publish(SelectionEvent::Deselected(previous));
        }
        debug!(method_id, "expanding method");
        self.expanded_method_id = Some(method.id.clone());
        self.events
            .publish(SelectionEvent::ExpansionChanged(Some(method.clone())));
        self.set_selection(Some(SelectableEntry::Method(method)));
    }

    /// Selects or deselects an entry, applying the switching-away rule.
    pub fn toggle_select(&mut self, entry: SelectableEntry) {
        // Resolve against the catalog; an issuer is only selectable under the
        // expanded method.
        let canonical = match &entry {
            SelectableEntry::Method(method) => match self.method(&method.id) {
                Some(known) if known.has_issuers() => {
                    let method_id = known.id.clone();
                    self.toggle_expand(&method_id);
                    return;
                }
                Some(known) => SelectableEntry::Method(known.clone()),
                None => {
                    warn!(method_id = %method.id, "selection of unknown method ignored");
                    return;
                }
            },
            SelectableEntry::Issuer(issuer) => match self
                .current_expanded_method()
                .and_then(|method| method.issuer(&issuer.id))
            {
                Some(known) => SelectableEntry::Issuer(known.clone()),
                None => {
                    warn!(issuer_id = %issuer.id, "issuer is not part of the expanded method");
                    return;
                }
            },
        };

        if self.is_selected(&canonical) {
            self.clear_selection();
            return;
        }

        let switches_away = self.switches_away(&canonical);
        if let Some(previous) = self.selected_entry.take() {
            self.events.publish(SelectionEvent::Deselected(previous));
        }
        if switches_away && let Some(method_id) = self.expanded_method_id.take() {
            debug!(%method_id, "collapsing method");
            self.events.publish(SelectionEvent::ExpansionChanged(None));
        }
        self.set_selection(Some(canonical));
    }

    pub fn current_selection(&self) -> Option<&SelectableEntry> {
        self.selected_entry.as_ref()
    }

    pub fn current_expanded_method(&self) -> Option<&Method> {
        self.expanded_method_id
            .as_deref()
            .and_then(|id| self.method(id))
    }

    /// Derives the method/issuer pair to submit with the given amount and description.
    pub fn build_payment_request(&self, amount: Amount, description: &str) -> CreatePayment {
        let (method, issuer) = match &self.selected_entry {
            Some(SelectableEntry::Issuer(issuer)) => (
                self.expanded_method_id.clone(),
                Some(issuer.id.clone()),
            ),
            // Also covers the provisional group selection of an expanded method.
            Some(SelectableEntry::Method(method)) => (Some(method.id.clone()), None),
            None => (None, None),
        };

        CreatePayment {
            method,
            issuer,
            amount,
            description: description.to_string(),
        }
    }

    /// False while only a method with issuers is provisionally selected.
    pub fn can_continue(&self) -> bool {
        match &self.selected_entry {
            Some(SelectableEntry::Method(method)) => !method.has_issuers(),
            Some(SelectableEntry::Issuer(_)) | None => true,
        }
    }

    /// Rows for the list adapter: methods, with the expanded method's issuers nested below it.
    pub fn list_rows(&self) -> Vec<ListRow> {
        let mut rows = Vec::with_capacity(self.catalog.len());
        for method in &self.catalog {
            let entry = SelectableEntry::Method(method.clone());
            rows.push(ListRow {
                selected: self.is_selected(&entry),
                entry,
                nested: false,
            });

            if self.expanded_method_id.as_deref() == Some(method.id.as_str()) {
                rows.extend(method.issuers().iter().map(|issuer| {
                    let entry = SelectableEntry::Issuer(issuer.clone());
                    ListRow {
                        selected: self.is_selected(&entry),
                        entry,
                        nested: true,
                    }
                }));
            }
        }
        rows
    }

    /// Cells for the grid adapter: one per method, highlighted when it owns the selection.
    pub fn grid_cells(&self) -> Vec<GridCell> {
        self.catalog
            .iter()
            .map(|method| {
                let expanded = self.expanded_method_id.as_deref() == Some(method.id.as_str());
                let selected =
                    self.is_selected(&SelectableEntry::Method(method.clone()));
                GridCell {
                    method: method.clone(),
                    highlighted: expanded || selected,
                }
            })
            .collect()
    }

    fn method(&self, method_id: &str) -> Option<&Method> {
        self.catalog.iter().find(|method| method.id == method_id)
    }

    fn is_selected(&self, entry: &SelectableEntry) -> bool {
        self.selected_entry.as_ref() == Some(entry)
    }

    /// True when `entry` lies outside the expanded method and its issuers.
    fn switches_away(&self, entry: &SelectableEntry) -> bool {
        let Some(expanded) = self.current_expanded_method() else {
            return false;
        };
        match entry {
            SelectableEntry::Method(method) => method.id != expanded.id,
            SelectableEntry::Issuer(issuer) => expanded.issuer(&issuer.id).is_none(),
        }
    }

    /// Collapses the expanded method, dropping any selection made under it.
    fn collapse(&mut self) {
        let Some(method_id) = self.expanded_method_id.take() else {
            return;
        };
        debug!(%method_id, "collapsing method");
        let previous = self.selected_entry.take();
        if let Some(previous) = &previous {
            self.events.publish(SelectionEvent::Deselected(previous.clone()));
        }
        self.events.publish(SelectionEvent::ExpansionChanged(None));
        if previous.is_some() {
            self.events.publish(SelectionEvent::SelectionChanged(None));
        }
    }

    fn clear_selection(&mut self) {
        if let Some(previous) = self.selected_entry.take() {
            self.events.publish(SelectionEvent::Deselected(previous));
            self.events.publish(SelectionEvent::SelectionChanged(None));
        }
    }

    fn set_selection(&mut self, entry: Option<SelectableEntry>) {
        self.selected_entry = entry.clone();
        self.events.publish(SelectionEvent::SelectionChanged(entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::drain;
    use crate::domain::catalog::{Image, Issuer};
    use rust_decimal_macros::dec;

    fn issuer(id: &str) -> Issuer {
        Issuer {
            id: id.to_string(),
            name: id.to_uppercase(),
            image: Image::default(),
        }
    }

    fn method(id: &str, issuers: &[&str]) -> Method {
        Method {
            id: id.to_string(),
            description: id.to_string(),
            minimum_amount: None,
            maximum_amount: None,
            image: Image::default(),
            issuers: (!issuers.is_empty()).then(|| issuers.iter().map(|i| issuer(i)).collect()),
            pricing: None,
        }
    }

    fn machine() -> (SelectionStateMachine, UnboundedReceiver<SelectionEvent>) {
        let (mut machine, rx) = SelectionStateMachine::new();
        machine.load_catalog(vec![
            method("creditcard", &[]),
            method("ideal", &["abn", "ing"]),
            method("kbc", &["kbc", "cbc"]),
        ]);
        (machine, rx)
    }

    fn amount() -> Amount {
        Amount::new(dec!(10)).unwrap()
    }

    #[test]
    fn test_select_plain_method_never_expands() {
        let (mut machine, _rx) = machine();
        machine.toggle_select(method("creditcard", &[]).into());
        assert!(machine.current_expanded_method().is_none());
        assert_eq!(machine.current_selection().unwrap().id(), "creditcard");
    }

    #[test]
    fn test_toggle_expand_ignores_method_without_issuers() {
        let (mut machine, mut rx) = machine();
        machine.toggle_expand("creditcard");
        assert!(machine.current_expanded_method().is_none());
        assert!(machine.current_selection().is_none());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_expand_twice_round_trips() {
        let (mut machine, _rx) = machine();
        machine.toggle_expand("ideal");
        assert_eq!(machine.current_expanded_method().unwrap().id, "ideal");
        assert_eq!(machine.current_selection().unwrap().id(), "ideal");

        machine.toggle_expand("ideal");
        assert!(machine.current_expanded_method().is_none());
        assert!(machine.current_selection().is_none());
    }

    #[test]
    fn test_expanding_other_method_clears_issuer_selection() {
        let (mut machine, _rx) = machine();
        machine.toggle_expand("ideal");
        machine.toggle_select(issuer("abn").into());
        machine.toggle_expand("kbc");

        assert_eq!(machine.current_expanded_method().unwrap().id, "kbc");
        assert_eq!(
            machine.current_selection(),
            Some(&SelectableEntry::Method(method("kbc", &["kbc", "cbc"])))
        );
    }

    #[test]
    fn test_issuer_and_method_with_same_id_are_distinct() {
        let (mut machine, _rx) = machine();
        machine.toggle_expand("kbc");
        machine.toggle_select(issuer("kbc").into());
        let selected = machine.current_selection().unwrap();
        assert!(selected.as_issuer().is_some());
        assert_eq!(machine.current_expanded_method().unwrap().id, "kbc");
    }

    #[test]
    fn test_deselect_issuer_keeps_expansion() {
        let (mut machine, mut rx) = machine();
        machine.toggle_expand("ideal");
        machine.toggle_select(issuer("ing").into());
        drain(&mut rx);

        machine.toggle_select(issuer("ing").into());
        assert!(machine.current_selection().is_none());
        assert_eq!(machine.current_expanded_method().unwrap().id, "ideal");
        assert_eq!(
            drain(&mut rx),
            vec![
                SelectionEvent::Deselected(issuer("ing").into()),
                SelectionEvent::SelectionChanged(None),
            ]
        );
    }

    #[test]
    fn test_foreign_issuer_is_ignored() {
        let (mut machine, _rx) = machine();
        machine.toggle_select(issuer("abn").into());
        assert!(machine.current_selection().is_none());
        assert!(machine.current_expanded_method().is_none());
    }

    #[test]
    fn test_unknown_method_is_ignored() {
        let (mut machine, _rx) = machine();
        machine.toggle_select(method("bitcoin", &[]).into());
        assert!(machine.current_selection().is_none());
    }

    #[test]
    fn test_build_payment_request_for_issuer() {
        let (mut machine, _rx) = machine();
        machine.toggle_expand("ideal");
        machine.toggle_select(issuer("abn").into());
        let request = machine.build_payment_request(amount(), "Walkman");
        assert_eq!(request.method.as_deref(), Some("ideal"));
        assert_eq!(request.issuer.as_deref(), Some("abn"));
        assert_eq!(request.description, "Walkman");
        assert!(machine.can_continue());
    }

    #[test]
    fn test_build_payment_request_for_plain_method() {
        let (mut machine, _rx) = machine();
        machine.toggle_select(method("creditcard", &[]).into());
        let request = machine.build_payment_request(amount(), "Drone");
        assert_eq!(request.method.as_deref(), Some("creditcard"));
        assert_eq!(request.issuer, None);
    }

    #[test]
    fn test_build_payment_request_without_selection() {
        let (machine, _rx) = machine();
        let request = machine.build_payment_request(amount(), "Drone");
        assert_eq!(request.method, None);
        assert_eq!(request.issuer, None);
        assert!(machine.can_continue());
    }

    #[test]
    fn test_provisional_group_selection_blocks_continue() {
        let (mut machine, _rx) = machine();
        machine.toggle_expand("ideal");
        assert!(!machine.can_continue());
    }

    #[test]
    fn test_load_catalog_is_idempotent() {
        let (mut machine, mut rx) = machine();
        machine.toggle_expand("ideal");
        drain(&mut rx);

        let catalog = machine.catalog().to_vec();
        machine.load_catalog(catalog.clone());
        assert!(machine.current_selection().is_none());
        assert!(machine.current_expanded_method().is_none());
        assert!(!drain(&mut rx).is_empty());

        machine.load_catalog(catalog);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_expand_event_order() {
        let (mut machine, mut rx) = machine();
        drain(&mut rx);
        machine.toggle_expand("ideal");
        let ideal = method("ideal", &["abn", "ing"]);
        assert_eq!(
            drain(&mut rx),
            vec![
                SelectionEvent::ExpansionChanged(Some(ideal.clone())),
                SelectionEvent::SelectionChanged(Some(ideal.into())),
            ]
        );
    }

    #[test]
    fn test_switching_expansion_emits_one_sequence() {
        let (mut machine, mut rx) = machine();
        machine.toggle_expand("ideal");
        machine.toggle_select(issuer("abn").into());
        drain(&mut rx);

        machine.toggle_expand("kbc");
        let kbc = method("kbc", &["kbc", "cbc"]);
        assert_eq!(
            drain(&mut rx),
            vec![
                SelectionEvent::Deselected(issuer("abn").into()),
                SelectionEvent::ExpansionChanged(Some(kbc.clone())),
                SelectionEvent::SelectionChanged(Some(kbc.into())),
            ]
        );
    }

    #[test]
    fn test_switching_away_to_plain_method_emits_one_sequence() {
        let (mut machine, mut rx) = machine();
        machine.toggle_expand("ideal");
        machine.toggle_select(issuer("ing").into());
        drain(&mut rx);

        machine.toggle_select(method("creditcard", &[]).into());
        assert!(machine.current_expanded_method().is_none());
        assert_eq!(
            drain(&mut rx),
            vec![
                SelectionEvent::Deselected(issuer("ing").into()),
                SelectionEvent::ExpansionChanged(None),
                SelectionEvent::SelectionChanged(Some(method("creditcard", &[]).into())),
            ]
        );
    }

    #[test]
    fn test_list_rows_nest_expanded_issuers() {
        let (mut machine, _rx) = machine();
        machine.toggle_expand("ideal");
        machine.toggle_select(issuer("ing").into());

        let rows = machine.list_rows();
        let ids: Vec<_> = rows.iter().map(|row| row.entry.id()).collect();
        assert_eq!(ids, vec!["creditcard", "ideal", "abn", "ing", "kbc"]);
        assert!(rows[2].nested && rows[3].nested);
        assert!(rows[3].selected);
        assert_eq!(rows.iter().filter(|row| row.selected).count(), 1);
    }

    #[test]
    fn test_grid_highlights_parent_of_selected_issuer() {
        let (mut machine, _rx) = machine();
        machine.toggle_expand("ideal");
        machine.toggle_select(issuer("abn").into());

        let cells = machine.grid_cells();
        assert_eq!(cells.len(), 3);
        let highlighted: Vec<_> = cells
            .iter()
            .filter(|cell| cell.highlighted)
            .map(|cell| cell.method.id.as_str())
            .collect();
        assert_eq!(highlighted, vec!["ideal"]);
    }

    #[test]
    fn test_dropped_subscriber_does_not_break_machine() {
        let (mut machine, rx) = machine();
        drop(rx);
        machine.toggle_expand("ideal");
        assert_eq!(machine.current_expanded_method().unwrap().id, "ideal");
    }
}
