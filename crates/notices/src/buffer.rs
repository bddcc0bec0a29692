//! Per-type message buffer.

use nb_domain::notice::NoticeType;

/// Messages partitioned by notice type.  Slots keep registration order;
/// messages within a slot keep insertion order with duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeBuffer {
    slots: Vec<(NoticeType, Vec<String>)>,
}

impl NoticeBuffer {
    /// An empty slot for each of `types`.
    pub fn with_types(types: &[NoticeType]) -> Self {
        Self {
            slots: types.iter().map(|t| (t.clone(), Vec::new())).collect(),
        }
    }

    /// Empty every slot, keeping the slots themselves.
    pub fn reset(&mut self) {
        for (_, msgs) in &mut self.slots {
            msgs.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|(_, msgs)| msgs.is_empty())
    }

    /// Total number of buffered messages.
    pub fn len(&self) -> usize {
        self.slots.iter().map(|(_, msgs)| msgs.len()).sum()
    }

    pub fn get(&self, ty: &NoticeType) -> Option<&[String]> {
        self.slots
            .iter()
            .find(|(t, _)| t == ty)
            .map(|(_, msgs)| msgs.as_slice())
    }

    pub fn has_slot(&self, ty: &NoticeType) -> bool {
        self.slots.iter().any(|(t, _)| t == ty)
    }

    /// Append `msgs` to the slot for `ty` (created at the end if missing),
    /// then drop repeats so only each message's first occurrence remains.
    pub fn extend_unique<I>(&mut self, ty: &NoticeType, msgs: I)
    where
        I: IntoIterator<Item = String>,
    {
        let idx = match self.slots.iter().position(|(t, _)| t == ty) {
            Some(i) => i,
            None => {
                self.slots.push((ty.clone(), Vec::new()));
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[idx].1;
        for msg in msgs {
            if !slot.contains(&msg) {
                slot.push(msg);
            }
        }
    }

    /// Slots in order.
    pub fn iter(&self) -> impl Iterator<Item = (&NoticeType, &[String])> {
        self.slots.iter().map(|(t, msgs)| (t, msgs.as_slice()))
    }

    /// Every `(type, message)` pair in buffer order.
    pub fn messages(&self) -> impl Iterator<Item = (&NoticeType, &str)> {
        self.slots
            .iter()
            .flat_map(|(t, msgs)| msgs.iter().map(move |m| (t, m.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> NoticeBuffer {
        NoticeBuffer::with_types(&nb_domain::notice::resolve_types::<String>(&[]))
    }

    #[test]
    fn new_buffer_has_empty_slots() {
        let b = buffer();
        assert!(b.is_empty());
        assert_eq!(b.get(&NoticeType::success()), Some(&[][..]));
        assert_eq!(b.iter().count(), 3);
    }

    #[test]
    fn extend_unique_keeps_first_occurrence_order() {
        let mut b = buffer();
        let ty = NoticeType::error();
        b.extend_unique(&ty, vec!["b".to_string(), "a".to_string(), "b".to_string()]);
        b.extend_unique(&ty, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(b.get(&ty).unwrap(), &["b", "a", "c"]);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn unknown_type_gets_trailing_slot() {
        let mut b = buffer();
        let ty = NoticeType::new("warning");
        assert!(!b.has_slot(&ty));
        b.extend_unique(&ty, vec!["careful".to_string()]);
        let order: Vec<&str> = b.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(order, vec!["neutral", "error", "success", "warning"]);
    }

    #[test]
    fn reset_empties_but_keeps_slots() {
        let mut b = buffer();
        b.extend_unique(&NoticeType::success(), vec!["ok".to_string()]);
        assert!(!b.is_empty());
        b.reset();
        assert!(b.is_empty());
        assert!(b.has_slot(&NoticeType::success()));
    }

    #[test]
    fn messages_flatten_in_slot_order() {
        let mut b = buffer();
        b.extend_unique(&NoticeType::success(), vec!["s".to_string()]);
        b.extend_unique(&NoticeType::neutral(), vec!["n1".to_string(), "n2".to_string()]);
        let flat: Vec<(&str, &str)> = b.messages().map(|(t, m)| (t.as_str(), m)).collect();
        assert_eq!(flat, vec![("neutral", "n1"), ("neutral", "n2"), ("success", "s")]);
    }
}
