use super::identifier::lookup_key;
use super::{Identifier, IdentifierOption, ParameterError};
use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Model parameters of a single substance.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PureRecord<M> {
    pub identifier: Identifier,
    pub model_record: M,
}

impl<M> PureRecord<M> {
    pub fn new(identifier: Identifier, model_record: M) -> Self {
        Self {
            identifier,
            model_record,
        }
    }

    /// Pick the records of `substances` from the contents of a parameter file.
    ///
    /// The result follows the order of `substances`. If a file lists the same
    /// substance twice, the first record wins.
    pub fn select(
        substances: &[&str],
        records: Vec<Self>,
        identifier_option: IdentifierOption,
    ) -> Result<Vec<Self>, ParameterError> {
        let mut selected: IndexMap<String, Option<Self>> = IndexMap::new();
        for &s in substances {
            let key = lookup_key(s, identifier_option);
            if selected.insert(key, None).is_some() {
                return Err(ParameterError::IncompatibleParameters(format!(
                    "substance '{s}' is requested more than once"
                )));
            }
        }
        for record in records {
            let Some(key) = record.identifier.key(identifier_option) else {
                continue;
            };
            if let Some(slot) = selected.get_mut(&key) {
                slot.get_or_insert(record);
            }
        }

        let missing: Vec<_> = substances
            .iter()
            .zip(selected.values())
            .filter_map(|(&s, r)| r.is_none().then_some(s))
            .collect();
        if !missing.is_empty() {
            return Err(ParameterError::ComponentsNotFound(missing.join(", ")));
        }
        Ok(selected.into_values().flatten().collect())
    }

    /// Read the records of `substances` from a JSON file.
    pub fn from_json<P: AsRef<Path>>(
        substances: &[&str],
        file: P,
        identifier_option: IdentifierOption,
    ) -> Result<Vec<Self>, ParameterError>
    where
        M: DeserializeOwned,
    {
        Self::select(substances, read_json(file)?, identifier_option)
    }
}

impl<M: fmt::Display> fmt::Display for PureRecord<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier, self.model_record)
    }
}

/// Interaction parameters of a pair of substances.
///
/// Records are symmetric, `(id1, id2)` also applies to `(id2, id1)`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BinaryRecord<I, B> {
    pub id1: I,
    pub id2: I,
    pub model_record: B,
}

impl<I, B> BinaryRecord<I, B> {
    pub fn new(id1: I, id2: I, model_record: B) -> Self {
        Self {
            id1,
            id2,
            model_record,
        }
    }

    pub fn from_json<P: AsRef<Path>>(file: P) -> Result<Vec<Self>, ParameterError>
    where
        I: DeserializeOwned,
        B: DeserializeOwned,
    {
        read_json(file)
    }
}

impl<B: Clone> BinaryRecord<Identifier, B> {
    /// Symmetric lookup table keyed by the identifiers selected by `option`.
    ///
    /// Records with an identifier that lacks the selected field are skipped.
    pub(crate) fn table(
        records: &[Self],
        option: IdentifierOption,
    ) -> IndexMap<(String, String), B> {
        let mut table = IndexMap::with_capacity(2 * records.len());
        for r in records {
            if let (Some(k1), Some(k2)) = (r.id1.key(option), r.id2.key(option)) {
                table.insert((k2.clone(), k1.clone()), r.model_record.clone());
                table.insert((k1, k2), r.model_record.clone());
            }
        }
        table
    }
}

/// Keys of the substances, in order, used to index binary tables.
pub(crate) fn record_keys<M>(
    records: &[PureRecord<M>],
    option: IdentifierOption,
) -> Result<IndexSet<String>, ParameterError> {
    records
        .iter()
        .map(|r| {
            r.identifier.key(option).ok_or_else(|| {
                ParameterError::IdentifierNotFound(format!("{option:?} of {}", r.identifier))
            })
        })
        .collect()
}

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(file: P) -> Result<T, ParameterError> {
    let file = file.as_ref();
    tracing::debug!(path = %file.display(), "reading parameter file");
    Ok(serde_json::from_reader(BufReader::new(File::open(file)?))?)
}
