use thiserror::Error;
use type_mapping::errors::BoxError;
use type_mapping::ConvertError;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Invalid record type {type_name}: {reason}")]
    Configuration {
        type_name: &'static str,
        reason: String,
    },

    #[error("Cannot create {type_name} from {arguments}: missing {}", .missing.join(", "))]
    Construction {
        type_name: &'static str,
        missing: Vec<String>,
        arguments: String,
    },

    #[error("Cannot convert parameter {parameter} of {type_name}: {source}")]
    Parameter {
        type_name: &'static str,
        parameter: String,
        #[source]
        source: ConvertError,
    },

    #[error("Value provider failed for parameter {parameter}: {source}")]
    Provider {
        parameter: String,
        #[source]
        source: BoxError,
    },

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConvertError),

    #[error(transparent)]
    User(BoxError),
}

impl MapperError {
    /// Wrap a failure raised by a user constructor so it propagates unchanged
    pub fn user<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        MapperError::User(error.into())
    }

    pub fn configuration(type_name: &'static str, reason: impl Into<String>) -> Self {
        MapperError::Configuration {
            type_name,
            reason: reason.into(),
        }
    }
}
