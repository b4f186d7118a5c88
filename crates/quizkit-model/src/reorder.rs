//! Ordered-collection move algorithm.
//!
//! One routine serves pages in the manifest, questions on a page, and
//! options within a question. The move has array-move semantics: the source
//! is removed and reinserted at the index the target occupied before the
//! removal, so moving forward lands after the target and moving backward
//! lands before it.

/// An element with a stable identity inside an ordered collection.
pub trait Identified {
    type Id: PartialEq + ?Sized;

    fn id(&self) -> &Self::Id;
}

/// Move the element `source` to the position of `target`.
///
/// Returns `false` without touching `items` when the ids are equal or either
/// id is absent.
pub fn move_item<T: Identified>(items: &mut Vec<T>, source: &T::Id, target: &T::Id) -> bool {
    if source == target {
        return false;
    }
    let Some(from) = items.iter().position(|item| item.id() == source) else {
        return false;
    };
    let Some(to) = items.iter().position(|item| item.id() == target) else {
        return false;
    };
    move_index(items, from, to)
}

/// Index-based variant of [`move_item`].
pub fn move_index<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}
