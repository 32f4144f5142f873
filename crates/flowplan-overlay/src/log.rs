use crate::record::MutationRecord;

/// Append-only record sequence for one entity type
///
/// Records are never rewritten or removed individually; only a whole-log
/// reset through [`OverlayStore::clear`](crate::OverlayStore::clear) empties it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationLog {
    records: Vec<MutationRecord>,
}

impl MutationLog {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from exported records, keeping their order
    #[inline]
    #[must_use]
    pub fn from_records(records: Vec<MutationRecord>) -> Self {
        Self { records }
    }

    pub fn append(&mut self, record: MutationRecord) {
        self.records.push(record);
    }

    #[inline]
    #[must_use]
    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    /// Records targeting `id`, in append order
    pub fn records_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a MutationRecord> + 'a {
        self.records.iter().filter(move |r| r.id == id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn append_preserves_order() {
        let mut log = MutationLog::new();
        log.append(MutationRecord::update("f1", Map::new()));
        log.append(MutationRecord::delete("f2"));
        log.append(MutationRecord::delete("f1"));

        assert_eq!(log.len(), 3);
        let ids: Vec<_> = log.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["f1", "f2", "f1"]);
        assert_eq!(log.records_for("f1").count(), 2);
    }
}
