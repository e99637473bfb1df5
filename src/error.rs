//! Errores de generación y su reporte.

use crate::{
    board::{Pin, Pool},
    model::{BrickKind, Identifier},
};

use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use thiserror::Error;

/// Resultado de cualquier fase de generación.
pub type Generation<T> = Result<T, GenerationError>;

/// Un error fatal de generación.
///
/// Todo error aborta la corrida completa; ningún error se degrada a un pin
/// o estado por defecto.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GenerationError {
    /// El pool que le corresponde a un brick se agotó.
    #[error("No {pool} pin left for brick `{brick}`")]
    AllocationExhausted { brick: Identifier, pool: Pool },

    /// El modelo mezcla o no declara los modos de una o varias máquinas.
    #[error("{0}")]
    ConfigurationConflict(Conflict),

    /// Una referencia no resuelve a ninguna entidad del modelo.
    #[error("{0}")]
    UnresolvedReference(Reference),

    #[error("Name `{0}` is defined more than once")]
    DuplicateName(Identifier),

    #[error("Brick `{brick}` is a {found}, expected {expected}")]
    WrongCategory {
        brick: Identifier,
        expected: &'static str,
        found: BrickKind,
    },

    #[error("Pin {} is claimed by both `{first}` and `{second}`", .pin.notation())]
    PinConflict {
        pin: Pin,
        first: Identifier,
        second: Identifier,
    },

    #[error("Pin {} of brick `{brick}` does not exist on this board", .pin.notation())]
    InvalidPin { brick: Identifier, pin: Pin },

    #[error("Pin {} cannot serve brick `{brick}`, a {pool} pin is required", .pin.notation())]
    IncompatiblePin {
        brick: Identifier,
        pin: Pin,
        pool: Pool,
    },

    #[error("Brick `{0}` has fixed wiring and cannot take a manual pin")]
    FixedWiring(Identifier),

    #[error("Only one {kind} is supported, found `{first}` and `{second}`")]
    DuplicatePeripheral {
        kind: &'static str,
        first: Identifier,
        second: Identifier,
    },

    #[error("Unknown note `{0}`, expected something like `C4`, `F#5` or `Bb3`")]
    UnknownNote(String),

    /// Error de E/S al escribir el artefacto.
    #[error("I/O error")]
    Io(#[from] io::Error),
}

/// Conflictos de configuración de máquinas.
#[derive(Debug)]
pub enum Conflict {
    /// Se declararon tanto `states` como `machines`.
    Both,

    /// No se declaró ni `states` ni `machines`.
    Neither,

    /// Una máquina en modo multi-máquina no tiene periodo.
    MissingPeriod(Identifier),
}

impl Display for Conflict {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::Both => fmt.write_str("Cannot mix `states` and `machines` in the same app"),
            Conflict::Neither => fmt.write_str("App must have either `states` or `machines`"),
            Conflict::MissingPeriod(machine) => {
                write!(fmt, "Machine `{}` has no scheduling period", machine)
            }
        }
    }
}

/// Referencias que no resuelven.
#[derive(Debug)]
pub enum Reference {
    Brick(Identifier),

    State {
        machine: Option<Identifier>,
        state: Identifier,
    },

    /// La aplicación en modo de una sola máquina no indica estado inicial.
    NoInitialState,

    /// Se consultó el pin de un brick sin asignación registrada.
    Unallocated(Identifier),
}

impl Display for Reference {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Brick(brick) => write!(fmt, "Brick `{}` is undefined", brick),
            Reference::State {
                machine: Some(machine),
                state,
            } => write!(fmt, "State `{}` is undefined in machine `{}`", state, machine),
            Reference::State {
                machine: None,
                state,
            } => write!(fmt, "State `{}` is undefined", state),
            Reference::NoInitialState => fmt.write_str("No initial state was declared"),
            Reference::Unallocated(brick) => write!(fmt, "Brick `{}` has no allocated pin", brick),
        }
    }
}

/// Colección de errores reportables.
#[derive(Debug)]
pub struct Diagnostics {
    kind: &'static str,
    errors: Vec<GenerationError>,
}

impl Diagnostics {
    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }

    pub fn errors(&self) -> &[GenerationError] {
        &self.errors
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            kind: "error",
            errors: Default::default(),
        }
    }
}

impl From<GenerationError> for Diagnostics {
    fn from(error: GenerationError) -> Self {
        Diagnostics {
            errors: vec![error],
            ..Default::default()
        }
    }
}

impl From<Vec<GenerationError>> for Diagnostics {
    fn from(errors: Vec<GenerationError>) -> Self {
        Diagnostics {
            errors,
            ..Default::default()
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics { kind, errors } = self;

        if errors.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for error in errors {
            writeln!(fmt, "{}: {}", kind, error)?;
        }

        let error_or_errors = if errors.len() == 1 { "error" } else { "errors" };
        write!(
            fmt,
            "Build failed with {} {}",
            errors.len(),
            error_or_errors
        )
    }
}

impl Error for Diagnostics {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_when_two_errors_then_lists_both_and_count() {
        let diagnostics = Diagnostics::from(vec![
            GenerationError::UnresolvedReference(Reference::Brick(Identifier::from("led"))),
            GenerationError::ConfigurationConflict(Conflict::Neither),
        ])
        .kind("Model error");

        let text = diagnostics.to_string();

        assert!(text.contains("Model error: Brick `led` is undefined"));
        assert!(text.contains("Model error: App must have either `states` or `machines`"));
        assert!(text.ends_with("Build failed with 2 errors"));
    }

    #[test]
    fn display_when_pin_conflict_then_uses_pin_notation() {
        let error = GenerationError::PinConflict {
            pin: Pin::Analog(2),
            first: Identifier::from("a"),
            second: Identifier::from("b"),
        };

        assert_eq!(error.to_string(), "Pin A2 is claimed by both `a` and `b`");
    }
}
