use std::collections::BTreeSet;

use seasons_core::card::Card;
use seasons_core::error::{Result, SeasonsError};
use seasons_core::Season;

/// Cards whose season is in `filters`, in their original order.
/// An empty filter set selects everything.
pub fn derive_view(cards: &[Card], filters: &BTreeSet<Season>) -> Vec<Card> {
    if filters.is_empty() {
        return cards.to_vec();
    }
    cards
        .iter()
        .filter(|card| filters.contains(&card.season))
        .cloned()
        .collect()
}

/// Moves `view[from]` to position `to` and mirrors the move in `all`.
///
/// In `all` the moved card is placed right after its new predecessor in
/// `view`, or right before its new successor when moved to the front.
/// Cards outside `view` keep their relative order.
pub fn reorder_cards(view: &mut Vec<Card>, all: &mut Vec<Card>, from: usize, to: usize) -> Result<()> {
    let len = view.len();
    if from >= len || to >= len {
        return Err(SeasonsError::validation(format!(
            "Cannot move card from {} to {}: only {} cards are shown",
            from, to, len
        )));
    }
    if from == to {
        return Ok(());
    }

    let moved = view.remove(from);
    view.insert(to, moved.clone());

    let Some(original) = all.iter().position(|c| c.id == moved.id) else {
        return Err(SeasonsError::not_found("Card", moved.id));
    };
    all.remove(original);

    let anchor = if to > 0 {
        all.iter()
            .position(|c| c.id == view[to - 1].id)
            .map(|i| i + 1)
    } else {
        all.iter().position(|c| c.id == view[1].id)
    };
    let index = anchor.unwrap_or(original).min(all.len());
    all.insert(index, moved);
    Ok(())
}
