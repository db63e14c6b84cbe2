use diesel::{
    deserialize::FromSql,
    serialize::{IsNull, Output, ToSql},
    sql_types::Binary,
    sqlite::{Sqlite, SqliteValue},
};

pub const ELEMENT_COUNT: usize = 128;
const RAW_ELEMENT_SIZE: usize = std::mem::size_of::<f64>();
const RAW_SIZE: usize = ELEMENT_COUNT * RAW_ELEMENT_SIZE;

/// A face descriptor as produced by the face encoder network.
///
/// Stored in the database as `ELEMENT_COUNT` little-endian `f64`s.
#[derive(Clone, Debug, diesel::AsExpression, diesel::FromSqlRow, PartialEq)]
#[diesel(sql_type = Binary)]
pub struct FaceEncoding([f64; ELEMENT_COUNT]);

impl FaceEncoding {
    pub fn new(elements: [f64; ELEMENT_COUNT]) -> Self {
        Self(elements)
    }

    /// Euclidean distance between two encodings.
    pub fn distance(&self, other: &FaceEncoding) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    #[cfg(test)]
    pub fn elements(&self) -> &[f64] {
        &self.0
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; RAW_SIZE];
        for (e, chunk) in bytes.chunks_mut(RAW_ELEMENT_SIZE).enumerate() {
            chunk.copy_from_slice(&self.0[e].to_le_bytes());
        }
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, BadFaceEncodingLengthError> {
        if bytes.len() != RAW_SIZE {
            return Err(BadFaceEncodingLengthError(bytes.len(), RAW_SIZE));
        }

        let mut elements = [0f64; ELEMENT_COUNT];
        for (e, chunk) in bytes.chunks(RAW_ELEMENT_SIZE).enumerate() {
            let mut element_bytes = [0u8; RAW_ELEMENT_SIZE];
            element_bytes.copy_from_slice(chunk);
            elements[e] = f64::from_le_bytes(element_bytes);
        }

        Ok(Self(elements))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unexpected face encoding length {0}, should be {1}")]
pub struct BadFaceEncodingLengthError(usize, usize);

impl std::convert::TryFrom<&[f64]> for FaceEncoding {
    type Error = BadFaceEncodingLengthError;

    fn try_from(elements: &[f64]) -> Result<Self, Self::Error> {
        let elements: [f64; ELEMENT_COUNT] = elements
            .try_into()
            .map_err(|_| BadFaceEncodingLengthError(elements.len(), ELEMENT_COUNT))?;
        Ok(Self(elements))
    }
}

impl FromSql<Binary, Sqlite> for FaceEncoding {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let bytes = <Vec<u8> as FromSql<Binary, Sqlite>>::from_sql(value)?;
        Self::from_bytes(&bytes)
            .map_err(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>)
    }
}

impl ToSql<Binary, Sqlite> for FaceEncoding {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> diesel::serialize::Result {
        out.set_value(self.to_bytes());
        Ok(IsNull::No)
    }
}

#[cfg(test)]
pub fn uniform(value: f64) -> FaceEncoding {
    FaceEncoding([value; ELEMENT_COUNT])
}
