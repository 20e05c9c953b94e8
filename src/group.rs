//! Grouping: nested group tokens on elements.
//!
//! Grouping appends one shared token to every selected element; ungrouping
//! pops the last token from each. Elements whose last token matches form one
//! top-level group and are selected as a unit.

#[cfg(test)]
#[path = "group_test.rs"]
mod group_test;

use std::collections::HashSet;

use uuid::Uuid;

use crate::element::{Element, ElementId, ElementStore, GroupId};

/// More than one element selected, and not already one top-level group.
#[must_use]
pub fn can_group(store: &ElementStore) -> bool {
    let tops: Vec<Option<GroupId>> = store.selected().map(|e| e.top_group()).collect();
    if tops.len() < 2 {
        return false;
    }
    let shared = tops[0];
    !(shared.is_some() && tops.iter().all(|t| *t == shared))
}

/// More than one element selected.
#[must_use]
pub fn can_ungroup(store: &ElementStore) -> bool {
    store.selected_count() > 1
}

/// Append a fresh group token to every selected element.
///
/// Returns the new token, or `None` when [`can_group`] does not hold.
pub fn group(store: &mut ElementStore) -> Option<GroupId> {
    if !can_group(store) {
        return None;
    }
    let token = Uuid::new_v4();
    for id in store.selected_ids() {
        if let Some(element) = store.get_mut(&id) {
            element.group_ids.push(token);
        }
    }
    Some(token)
}

/// Pop the last group token from every selected element.
///
/// Returns how many elements lost a token.
pub fn ungroup(store: &mut ElementStore) -> usize {
    if !can_ungroup(store) {
        return 0;
    }
    let mut changed = 0;
    for id in store.selected_ids() {
        if let Some(element) = store.get_mut(&id) {
            if element.group_ids.pop().is_some() {
                changed += 1;
            }
        }
    }
    changed
}

/// `ids` plus every live element sharing a top-level group with one of them.
#[must_use]
pub fn expand_to_groups(store: &ElementStore, ids: &HashSet<ElementId>) -> HashSet<ElementId> {
    let groups: HashSet<GroupId> = ids
        .iter()
        .filter_map(|id| store.get(id))
        .filter_map(Element::top_group)
        .collect();
    let mut expanded = ids.clone();
    if groups.is_empty() {
        return expanded;
    }
    expanded.extend(
        store
            .live()
            .filter(|e| e.top_group().is_some_and(|g| groups.contains(&g)))
            .map(|e| e.id),
    );
    expanded
}
