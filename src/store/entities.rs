use crate::models::{Apartment, ApartmentId, ApartmentPatch};
use std::collections::HashMap;

/// Normalized id → listing map. Every view resolves its ids through here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    entries: HashMap<ApartmentId, Apartment>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or shallow-merge each item. Returns how many items were applied.
    pub fn upsert<I, P>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<ApartmentPatch>,
    {
        let mut applied = 0;
        for patch in items.into_iter().map(Into::into) {
            match self.entries.get_mut(&patch.id) {
                Some(existing) => existing.merge(patch),
                None => {
                    let apartment = patch.into_apartment();
                    self.entries.insert(apartment.id, apartment);
                }
            }
            applied += 1;
        }
        applied
    }

    pub fn get(&self, id: &ApartmentId) -> Option<&Apartment> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &ApartmentId) -> bool {
        self.entries.contains_key(id)
    }

    /// Resolve `ids` in order, silently skipping unknown ones.
    pub fn get_many(&self, ids: &[ApartmentId]) -> Vec<Apartment> {
        ids.iter().filter_map(|id| self.entries.get(id)).cloned().collect()
    }

    /// The ids in `ids` that have no entry yet.
    pub fn missing(&self, ids: &[ApartmentId]) -> Vec<ApartmentId> {
        ids.iter().filter(|id| !self.contains(id)).copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Apartment> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: i64, price: i64) -> Apartment {
        Apartment {
            price,
            description: format!("listing {id}"),
            num_of_likes: 2,
            ..Apartment::placeholder(ApartmentId(id))
        }
    }

    #[test]
    fn get_many_preserves_order_and_drops_unknown() {
        let mut store = EntityStore::new();
        store.upsert(vec![listing(1, 10), listing(2, 20)]);
        let got = store.get_many(&[ApartmentId(2), ApartmentId(9), ApartmentId(1)]);
        assert_eq!(
            got.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![ApartmentId(2), ApartmentId(1)]
        );
        assert_eq!(store.missing(&[ApartmentId(2), ApartmentId(9)]), vec![ApartmentId(9)]);
    }

    #[test]
    fn empty_upsert_is_a_no_op() {
        let mut store = EntityStore::new();
        assert_eq!(store.upsert(Vec::<Apartment>::new()), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn patch_for_unknown_id_creates_entry() {
        let mut store = EntityStore::new();
        store.upsert(vec![ApartmentPatch {
            price: Some(99),
            ..ApartmentPatch::new(5)
        }]);
        assert_eq!(store.get(&ApartmentId(5)).map(|a| a.price), Some(99));
    }
}
