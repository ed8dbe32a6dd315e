use chrono::NaiveDateTime;
use sqlx::{Arguments, postgres::PgArguments};
use uuid::Uuid;

use crate::model::error::{DatabaseError, DatabaseResult};

/// Positional statement parameter (`$1`, `$2`, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    OptText(Option<String>),
    Uuid(Uuid),
    Int(i64),
    Timestamp(NaiveDateTime),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Option<&str>> for SqlParam {
    fn from(value: Option<&str>) -> Self {
        Self::OptText(value.map(str::to_string))
    }
}

impl From<Option<String>> for SqlParam {
    fn from(value: Option<String>) -> Self {
        Self::OptText(value)
    }
}

impl From<Uuid> for SqlParam {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<NaiveDateTime> for SqlParam {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

/// Builds bind arguments in parameter order.
pub fn to_arguments(params: &[SqlParam]) -> DatabaseResult<PgArguments> {
    let mut args = PgArguments::default();
    for param in params {
        let added = match param {
            SqlParam::Text(v) => args.add(v.clone()),
            SqlParam::OptText(v) => args.add(v.clone()),
            SqlParam::Uuid(v) => args.add(*v),
            SqlParam::Int(v) => args.add(*v),
            SqlParam::Timestamp(v) => args.add(*v),
        };
        added.map_err(|e| DatabaseError::Encode(sqlx::Error::Encode(e)))?;
    }
    Ok(args)
}

/// Shorthand for building a parameter list from mixed values.
#[macro_export]
macro_rules! params {
    () => {
        Vec::<$crate::model::SqlParam>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::model::SqlParam::from($value)),+]
    };
}
