use serde::{Serialize, Serializer, ser::SerializeSeq};

use super::HeaderBag;

/// Serialized as a sequence of `(name, value)` pairs, one per value.
impl Serialize for HeaderBag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let count: usize = self.entries.iter().map(|entry| entry.values.len()).sum();
        let mut seq = serializer.serialize_seq(Some(count))?;

        for (name, values) in self.iter() {
            for value in values {
                seq.serialize_element(&(name, value))?;
            }
        }
        seq.end()
    }
}
