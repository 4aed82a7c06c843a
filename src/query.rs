//! Query filter: case-insensitive substring match in corpus order, capped
//! at `max_results` to bound the classifier batch per request.

use crate::model::Item;

pub fn filter_items<'a>(corpus: &'a [Item], query: &str, max_results: usize) -> Vec<&'a Item> {
    let needle = query.trim().to_lowercase();
    corpus
        .iter()
        .filter(|it| needle.is_empty() || it.text.to_lowercase().contains(&needle))
        .take(max_results)
        .collect()
}
