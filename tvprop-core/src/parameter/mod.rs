//! Parameter records and their construction from JSON files.
//!
//! A parameter file is a JSON list of [PureRecord]s, each with an
//! [Identifier] and the engine specific `model_record`. Binary files list
//! [BinaryRecord]s for pairs of substances.
use ndarray::Array2;
use serde::de::DeserializeOwned;
use std::io;
use std::path::Path;
use thiserror::Error;

mod identifier;
mod model_record;

pub use identifier::{Identifier, IdentifierOption};
pub use model_record::{BinaryRecord, PureRecord};

/// Parameters of an engine assembled from substance records.
pub trait Parameter: Sized {
    type Pure: Clone + DeserializeOwned;
    /// Pair interaction, `Default` for pairs without a record.
    type Binary: Clone + DeserializeOwned + Default;

    /// Validate the records and build the parameters.
    fn from_records(
        pure_records: Vec<PureRecord<Self::Pure>>,
        binary_records: Option<Array2<Self::Binary>>,
    ) -> Result<Self, ParameterError>;

    fn pure_records(&self) -> &[PureRecord<Self::Pure>];

    fn new_pure(pure_record: PureRecord<Self::Pure>) -> Result<Self, ParameterError> {
        Self::from_records(vec![pure_record], None)
    }

    /// Binary system with the same interaction for both off-diagonal entries.
    fn new_binary(
        pure_records: Vec<PureRecord<Self::Pure>>,
        binary_record: Option<Self::Binary>,
    ) -> Result<Self, ParameterError> {
        let matrix = binary_record.map(|b| {
            let mut m = Array2::from_elem((2, 2), Self::Binary::default());
            m[(0, 1)] = b.clone();
            m[(1, 0)] = b;
            m
        });
        Self::from_records(pure_records, matrix)
    }

    /// Display names of the components, in order.
    fn identifiers(&self) -> Vec<String> {
        self.pure_records()
            .iter()
            .map(|r| r.identifier.to_string())
            .collect()
    }

    /// Arrange binary records into a matrix that follows `pure_records`.
    fn binary_matrix_from_records(
        pure_records: &[PureRecord<Self::Pure>],
        binary_records: &[BinaryRecord<Identifier, Self::Binary>],
        identifier_option: IdentifierOption,
    ) -> Result<Option<Array2<Self::Binary>>, ParameterError> {
        if binary_records.is_empty() {
            return Ok(None);
        }
        let keys = model_record::record_keys(pure_records, identifier_option)?;
        let table = BinaryRecord::table(binary_records, identifier_option);
        let n = keys.len();
        let mut matrix = Array2::from_elem((n, n), Self::Binary::default());
        for (i, ki) in keys.iter().enumerate() {
            for (j, kj) in keys.iter().enumerate().filter(|&(j, _)| j != i) {
                if let Some(b) = table.get(&(ki.clone(), kj.clone())) {
                    matrix[(i, j)] = b.clone();
                }
            }
        }
        Ok(Some(matrix))
    }

    /// Read the records of `substances` from a parameter file and an
    /// optional binary file.
    fn from_json<P: AsRef<Path>>(
        substances: &[&str],
        file_pure: P,
        file_binary: Option<P>,
        identifier_option: IdentifierOption,
    ) -> Result<Self, ParameterError> {
        let records = PureRecord::from_json(substances, file_pure, identifier_option)?;
        let binary_matrix = match file_binary {
            Some(file) => Self::binary_matrix_from_records(
                &records,
                &BinaryRecord::<Identifier, Self::Binary>::from_json(file)?,
                identifier_option,
            )?,
            None => None,
        };
        Self::from_records(records, binary_matrix)
    }
}

#[derive(Error, Debug)]
pub enum ParameterError {
    #[error(transparent)]
    FileIO(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("Substance(s) not found in the parameter file: {0}.")]
    ComponentsNotFound(String),
    #[error("Missing identifier: {0}.")]
    IdentifierNotFound(String),
    #[error("Incompatible parameters: {0}")]
    IncompatibleParameters(String),
}
