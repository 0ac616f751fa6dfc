// Picker group controller: N dropdown slots sharing one option pool with a
// cross-slot duplicate-exclusion rule.
//
// The controller owns all widget state (selection, open flag, keyboard
// highlight); the render layer is a pure projection of it and feeds back
// only the screen regions used for pointer hit-testing. An option is
// disabled in a slot exactly when it is the current selection of some
// *other* slot, so a slot can always re-select its own current pick.

use std::collections::HashSet;

use ratatui::layout::{Position, Rect};

use crate::protocol::Driver;

// ---------------------------------------------------------------------------
// PickOption
// ---------------------------------------------------------------------------

/// One selectable entry in the shared pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickOption {
    pub id: u32,
    pub label: String,
}

impl PickOption {
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

impl From<Driver> for PickOption {
    fn from(driver: Driver) -> Self {
        PickOption {
            id: driver.id,
            label: driver.name,
        }
    }
}

// ---------------------------------------------------------------------------
// PickerSlot
// ---------------------------------------------------------------------------

/// State of a single dropdown slot.
#[derive(Debug, Clone, Default)]
struct PickerSlot {
    /// Currently selected option id, if any. Kept as an id reference and
    /// never re-validated against the pool: replacing the pool does not
    /// clear selections.
    selected: Option<u32>,
    /// Label captured at selection time, so the slot keeps a readable
    /// caption even after the pool is replaced with one that omits the id.
    selected_label: Option<String>,
    open: bool,
    /// Keyboard cursor over the open option list.
    highlight: usize,
    /// Screen region of the slot's clickable header, recorded at render.
    anchor: Option<Rect>,
    /// Screen region of the open option list, recorded at render.
    list_area: Option<Rect>,
}

// ---------------------------------------------------------------------------
// PickerGroup
// ---------------------------------------------------------------------------

/// A group of dropdown slots sharing one option pool.
///
/// Invariant: after every mutation, at most one slot holds any given
/// non-empty selected id. Enforced by recomputing each slot's disabled set
/// whenever a selection or the pool changes.
pub struct PickerGroup {
    options: Vec<PickOption>,
    slots: Vec<PickerSlot>,
    /// Per-slot set of option ids that cannot be selected there.
    disabled: Vec<HashSet<u32>>,
    placeholder: String,
}

impl PickerGroup {
    /// Create a group of `slot_count` empty, closed slots with an empty
    /// option pool.
    pub fn new(slot_count: usize, placeholder: impl Into<String>) -> Self {
        Self {
            options: Vec::new(),
            slots: vec![PickerSlot::default(); slot_count],
            disabled: vec![HashSet::new(); slot_count],
            placeholder: placeholder.into(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The shared option pool, in fetch order.
    pub fn options(&self) -> &[PickOption] {
        &self.options
    }

    /// Replace the option pool for every slot and recompute disabled state.
    ///
    /// Callable at any time, including while slots are open. Selections are
    /// left untouched even when the new pool omits a selected id. An empty
    /// pool is valid and simply renders no options.
    pub fn set_options(&mut self, options: Vec<PickOption>) {
        self.options = options;
        for slot in &mut self.slots {
            if slot.highlight >= self.options.len() {
                slot.highlight = self.options.len().saturating_sub(1);
            }
        }
        self.recompute_disabled();
    }

    /// Whether the given slot's option list is open.
    pub fn is_open(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.open)
    }

    /// Flip the open flag of one slot. Slots manage their open flags
    /// independently; opening one does not close its siblings.
    pub fn toggle_open(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.open = !s.open;
        }
    }

    /// Close one slot (Esc).
    pub fn close_on_escape(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.open = false;
        }
    }

    /// Close every slot whose rendered region does not contain `pointer`.
    ///
    /// Called for every pointer interaction anywhere on screen, not just
    /// inside the group.
    pub fn close_outside(&mut self, pointer: Position) {
        for slot in &mut self.slots {
            let inside = slot.anchor.is_some_and(|r| r.contains(pointer))
                || (slot.open && slot.list_area.is_some_and(|r| r.contains(pointer)));
            if !inside {
                slot.open = false;
            }
        }
    }

    /// Whether `option_id` is currently disabled for `slot`.
    pub fn is_disabled(&self, slot: usize, option_id: u32) -> bool {
        self.disabled
            .get(slot)
            .is_some_and(|set| set.contains(&option_id))
    }

    /// Select an option in a slot.
    ///
    /// Silently does nothing if the option is disabled for that slot.
    /// Re-selecting the slot's own current value is a no-op that still
    /// closes the slot. A successful selection closes the slot and
    /// recomputes disabled state across the group.
    pub fn select(&mut self, slot: usize, option_id: u32) {
        if self.is_disabled(slot, option_id) {
            return;
        }
        let Some(label) = self
            .options
            .iter()
            .find(|o| o.id == option_id)
            .map(|o| o.label.clone())
        else {
            return;
        };
        let Some(s) = self.slots.get_mut(slot) else {
            return;
        };
        if s.selected != Some(option_id) {
            s.selected = Some(option_id);
            s.selected_label = Some(label);
        }
        s.open = false;
        self.recompute_disabled();
    }

    /// Clear every slot's selection, restore placeholder captions, and
    /// recompute disabled state. Idempotent.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.selected = None;
            slot.selected_label = None;
        }
        self.recompute_disabled();
    }

    /// Current selections in slot order; unselected slots are `None`.
    pub fn selections(&self) -> Vec<Option<u32>> {
        self.slots.iter().map(|s| s.selected).collect()
    }

    /// The selection of one slot.
    pub fn selection_of(&self, slot: usize) -> Option<u32> {
        self.slots.get(slot).and_then(|s| s.selected)
    }

    /// The caption to render on a slot's header: the selected option's
    /// label, or the placeholder when nothing is selected.
    pub fn display_label(&self, slot: usize) -> &str {
        self.slots
            .get(slot)
            .and_then(|s| s.selected_label.as_deref())
            .unwrap_or(&self.placeholder)
    }

    // -- Keyboard highlight -------------------------------------------------

    /// Index of the keyboard highlight within the option list.
    pub fn highlight(&self, slot: usize) -> usize {
        self.slots.get(slot).map_or(0, |s| s.highlight)
    }

    /// Move the highlight up, wrapping at the top.
    pub fn highlight_up(&mut self, slot: usize) {
        let len = self.options.len();
        if len == 0 {
            return;
        }
        if let Some(s) = self.slots.get_mut(slot) {
            s.highlight = if s.highlight == 0 { len - 1 } else { s.highlight - 1 };
        }
    }

    /// Move the highlight down, wrapping at the bottom.
    pub fn highlight_down(&mut self, slot: usize) {
        let len = self.options.len();
        if len == 0 {
            return;
        }
        if let Some(s) = self.slots.get_mut(slot) {
            s.highlight = (s.highlight + 1) % len;
        }
    }

    /// Select the highlighted option (Enter). Subject to the same disabled
    /// rule as any other selection.
    pub fn select_highlighted(&mut self, slot: usize) {
        let Some(option_id) = self
            .slots
            .get(slot)
            .and_then(|s| self.options.get(s.highlight))
            .map(|o| o.id)
        else {
            return;
        };
        self.select(slot, option_id);
    }

    // -- Render feedback and hit-testing ------------------------------------

    /// Record the screen region of a slot's clickable header.
    pub fn set_anchor(&mut self, slot: usize, area: Rect) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.anchor = Some(area);
        }
    }

    /// The recorded header region, if the slot has been rendered.
    pub fn anchor(&self, slot: usize) -> Option<Rect> {
        self.slots.get(slot).and_then(|s| s.anchor)
    }

    /// Record the screen region of a slot's open option list.
    pub fn set_list_area(&mut self, slot: usize, area: Rect) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.list_area = Some(area);
        }
    }

    /// The slot whose header contains `pointer`, if any.
    pub fn slot_at(&self, pointer: Position) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.anchor.is_some_and(|r| r.contains(pointer)))
    }

    /// The (slot, option id) under `pointer` within an open option list.
    pub fn option_at(&self, pointer: Position) -> Option<(usize, u32)> {
        for (i, slot) in self.slots.iter().enumerate() {
            if !slot.open {
                continue;
            }
            let Some(list) = slot.list_area else { continue };
            if !list.contains(pointer) {
                continue;
            }
            let row = (pointer.y - list.y) as usize;
            if let Some(option) = self.options.get(row) {
                return Some((i, option.id));
            }
        }
        None
    }

    // -- Internal -----------------------------------------------------------

    /// Recompute every slot's disabled set: an option is disabled in a slot
    /// iff its id is the current selection of some other slot. A slot's own
    /// selection is never disabled in that slot.
    fn recompute_disabled(&mut self) {
        for i in 0..self.slots.len() {
            let mut taken = HashSet::new();
            for (j, other) in self.slots.iter().enumerate() {
                if i != j {
                    if let Some(id) = other.selected {
                        taken.insert(id);
                    }
                }
            }
            self.disabled[i] = taken;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn abc_pool() -> Vec<PickOption> {
        vec![
            PickOption::new(1, "A"),
            PickOption::new(2, "B"),
            PickOption::new(3, "C"),
        ]
    }

    fn group() -> PickerGroup {
        let mut g = PickerGroup::new(3, "Choose a driver");
        g.set_options(abc_pool());
        g
    }

    #[test]
    fn new_group_is_empty_and_closed() {
        let g = PickerGroup::new(3, "Choose a driver");
        assert_eq!(g.slot_count(), 3);
        assert!(g.options().is_empty());
        assert_eq!(g.selections(), vec![None, None, None]);
        assert!(!g.is_open(0));
        assert_eq!(g.display_label(0), "Choose a driver");
    }

    #[test]
    fn own_selection_stays_enabled() {
        let mut g = group();
        g.select(0, 1);
        // Slot 0 can still see and re-pick its own selection.
        assert!(!g.is_disabled(0, 1));
        // Everyone else sees it greyed out.
        assert!(g.is_disabled(1, 1));
        assert!(g.is_disabled(2, 1));
    }

    #[test]
    fn mutual_exclusion_holds_after_any_sequence() {
        let mut g = group();
        g.select(0, 1);
        g.select(1, 1); // rejected: disabled
        g.select(1, 2);
        g.select(2, 2); // rejected
        g.select(2, 3);
        g.select(0, 3); // rejected: held by slot 2
        g.select(0, 2); // rejected: held by slot 1

        let picks: Vec<u32> = g.selections().into_iter().flatten().collect();
        let distinct: HashSet<u32> = picks.iter().copied().collect();
        assert_eq!(picks.len(), distinct.len());
        assert_eq!(g.selections(), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn selecting_disabled_option_changes_nothing() {
        let mut g = group();
        g.select(0, 1);
        g.toggle_open(1);
        g.select(1, 1);
        // Slot 1 untouched: no selection, still open.
        assert_eq!(g.selection_of(1), None);
        assert!(g.is_open(1));
        assert_eq!(g.display_label(1), "Choose a driver");
    }

    #[test]
    fn selection_closes_the_slot() {
        let mut g = group();
        g.toggle_open(0);
        g.select(0, 2);
        assert!(!g.is_open(0));
        assert_eq!(g.selection_of(0), Some(2));
        assert_eq!(g.display_label(0), "B");
    }

    #[test]
    fn reselecting_own_value_is_a_noop_that_closes() {
        let mut g = group();
        g.select(0, 1);
        g.toggle_open(0);
        assert!(g.is_open(0));
        g.select(0, 1);
        assert!(!g.is_open(0));
        assert_eq!(g.selection_of(0), Some(1));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut g = group();
        g.select(0, 1);
        g.select(1, 2);
        g.reset();
        let after_one = g.selections();
        assert_eq!(after_one, vec![None, None, None]);
        assert_eq!(g.display_label(0), "Choose a driver");
        assert!(!g.is_disabled(1, 1));

        g.reset();
        assert_eq!(g.selections(), after_one);
        assert_eq!(g.display_label(1), "Choose a driver");
    }

    #[test]
    fn set_options_preserves_selections() {
        let mut g = group();
        g.select(0, 3);
        // New pool omits id 3 entirely.
        g.set_options(vec![PickOption::new(9, "Z")]);
        assert_eq!(g.selection_of(0), Some(3));
        // The caption captured at selection time survives the replacement.
        assert_eq!(g.display_label(0), "C");
        // And the stale selection still excludes id 3 in sibling slots.
        assert!(g.is_disabled(1, 3));
    }

    #[test]
    fn set_options_while_open_recomputes_immediately() {
        let mut g = group();
        g.select(0, 1);
        g.toggle_open(1);
        g.set_options(vec![PickOption::new(1, "A"), PickOption::new(4, "D")]);
        assert!(g.is_open(1));
        assert!(g.is_disabled(1, 1));
        assert!(!g.is_disabled(1, 4));
    }

    #[test]
    fn three_widget_walkthrough() {
        let mut g = group();

        // Select id 1 in widget 1.
        g.select(0, 1);
        assert!(!g.is_disabled(0, 1));
        assert!(g.is_disabled(1, 1));
        assert!(g.is_disabled(2, 1));

        // Select id 1 in widget 2: rejected, state unchanged.
        g.select(1, 1);
        assert_eq!(g.selection_of(1), None);

        // Select id 2 in widget 2: succeeds.
        g.select(1, 2);
        assert_eq!(g.selection_of(1), Some(2));
        assert!(g.is_disabled(2, 1));
        assert!(g.is_disabled(2, 2));
        assert!(!g.is_disabled(2, 3));
        // Widget 1 keeps only its own pick visible as selected.
        assert_eq!(g.selection_of(0), Some(1));
        assert!(!g.is_disabled(0, 1));
        assert!(g.is_disabled(0, 2));
    }

    #[test]
    fn slots_open_independently() {
        let mut g = group();
        g.toggle_open(0);
        g.toggle_open(2);
        // Opening one slot does not close another.
        assert!(g.is_open(0));
        assert!(!g.is_open(1));
        assert!(g.is_open(2));

        g.toggle_open(0);
        assert!(!g.is_open(0));
        assert!(g.is_open(2));
    }

    #[test]
    fn escape_closes_only_the_named_slot() {
        let mut g = group();
        g.toggle_open(0);
        g.toggle_open(1);
        g.close_on_escape(0);
        assert!(!g.is_open(0));
        assert!(g.is_open(1));
    }

    #[test]
    fn outside_click_closes_non_containing_slots() {
        let mut g = group();
        g.set_anchor(0, Rect::new(0, 0, 10, 3));
        g.set_anchor(1, Rect::new(12, 0, 10, 3));
        g.set_list_area(0, Rect::new(0, 3, 10, 3));
        g.toggle_open(0);
        g.toggle_open(1);

        // Click inside slot 0's open list: slot 0 stays open, slot 1 closes.
        g.close_outside(Position::new(2, 4));
        assert!(g.is_open(0));
        assert!(!g.is_open(1));

        // Click far away: everything closes.
        g.close_outside(Position::new(60, 20));
        assert!(!g.is_open(0));
    }

    #[test]
    fn click_on_anchor_does_not_close_that_slot() {
        let mut g = group();
        g.set_anchor(0, Rect::new(0, 0, 10, 3));
        g.toggle_open(0);
        g.close_outside(Position::new(5, 1));
        assert!(g.is_open(0));
    }

    #[test]
    fn empty_pool_is_still_closable() {
        let mut g = PickerGroup::new(2, "-");
        g.toggle_open(0);
        assert!(g.is_open(0));
        assert_eq!(g.option_at(Position::new(0, 0)), None);
        g.select_highlighted(0);
        assert_eq!(g.selection_of(0), None);
        g.close_on_escape(0);
        assert!(!g.is_open(0));
    }

    #[test]
    fn highlight_wraps_both_ways() {
        let mut g = group();
        assert_eq!(g.highlight(0), 0);
        g.highlight_up(0);
        assert_eq!(g.highlight(0), 2);
        g.highlight_down(0);
        assert_eq!(g.highlight(0), 0);
        g.highlight_down(0);
        g.highlight_down(0);
        g.highlight_down(0);
        assert_eq!(g.highlight(0), 0);
    }

    #[test]
    fn select_highlighted_respects_disabled_rule() {
        let mut g = group();
        g.select(0, 1);
        // Slot 1 highlight sits on the first option (id 1), which slot 0 holds.
        g.select_highlighted(1);
        assert_eq!(g.selection_of(1), None);
        g.highlight_down(1);
        g.select_highlighted(1);
        assert_eq!(g.selection_of(1), Some(2));
    }

    #[test]
    fn shrinking_pool_clamps_highlight() {
        let mut g = group();
        g.highlight_down(0);
        g.highlight_down(0);
        assert_eq!(g.highlight(0), 2);
        g.set_options(vec![PickOption::new(1, "A")]);
        assert_eq!(g.highlight(0), 0);
    }

    #[test]
    fn option_hit_testing_maps_rows_to_ids() {
        let mut g = group();
        g.toggle_open(1);
        g.set_list_area(1, Rect::new(12, 3, 10, 3));
        assert_eq!(g.option_at(Position::new(13, 3)), Some((1, 1)));
        assert_eq!(g.option_at(Position::new(13, 5)), Some((1, 3)));
        // Outside the list.
        assert_eq!(g.option_at(Position::new(13, 6)), None);
        // Closed slots never report options.
        g.set_list_area(0, Rect::new(0, 3, 10, 3));
        assert_eq!(g.option_at(Position::new(2, 3)), None);
    }

    #[test]
    fn selections_use_explicit_empty_markers() {
        let mut g = group();
        g.select(1, 2);
        assert_eq!(g.selections(), vec![None, Some(2), None]);
    }
}
