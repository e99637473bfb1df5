//! Carga de modelos.
//!
//! El front end entrega cada aplicación como un documento JSON ya
//! validado. Este módulo lo deserializa y, cuando el documento no tiene la
//! forma esperada, conserva el origen y la posición exacta del fallo.

use log::debug;
use serde_json::error::Category;
use std::{
    fmt::{self, Display, Formatter},
    io::{self, Read},
};
use thiserror::Error;

use crate::model::App;

/// Una posición línea-columna en un documento.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Position {
    line: usize,
    column: usize,
}

impl Position {
    /// Obtiene el número de línea.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Obtiene el número de columna.
    pub fn column(&self) -> usize {
        self.column
    }
}

impl Display for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.column)
    }
}

/// Fallo de carga.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{name}: failed to read model")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{name}:{position}: {source}")]
    Malformed {
        name: String,
        position: Position,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Posición del fallo, si el documento llegó a leerse.
    pub fn position(&self) -> Option<Position> {
        match self {
            LoadError::Io { .. } => None,
            LoadError::Malformed { position, .. } => Some(*position),
        }
    }
}

/// Lee una aplicación completa desde `reader`.
///
/// `name` identifica el origen en los mensajes de error.
pub fn load<R, S>(reader: R, name: S) -> Result<App, LoadError>
where
    R: Read,
    S: Into<String>,
{
    let name = name.into();
    let app: App = serde_json::from_reader(reader).map_err(|error| match error.classify() {
        Category::Io => LoadError::Io {
            name: name.clone(),
            source: io::Error::from(error),
        },

        _ => LoadError::Malformed {
            name: name.clone(),
            position: Position {
                line: error.line(),
                column: error.column(),
            },
            source: error,
        },
    })?;

    debug!(
        "Loaded `{}` from {}: {} brick(s), {} state(s), {} machine(s)",
        app.name,
        name,
        app.bricks.len(),
        app.states.len(),
        app.machines.len()
    );

    Ok(app)
}
