//! Traducción de guardas.
//!
//! Una guarda es un árbol de condiciones hoja unidas por `and`/`or`. Cada
//! nodo binario se emite entre paréntesis, por lo que la agrupación del
//! árbol se conserva sin depender de la precedencia del lenguaje objetivo.
//! Los sensores digitales que aparecen en la guarda agregan además una
//! cláusula de antirrebote.

use super::{bricks, pins::Allocations};
use crate::{
    error::Generation,
    model::{BrickKind, Condition, Expression, Identifier},
    semantic::Program,
};

/// Guarda lista para emitir.
#[derive(Debug)]
pub struct Guard<'e> {
    /// Condición completa, con antirrebote.
    pub test: String,

    /// Sensores cuya marca de tiempo se actualiza al disparar.
    pub debounced: Vec<&'e Identifier>,

    /// Si la guarda compara contra la línea serie.
    pub reads_serial: bool,
}

/// Traduce una guarda completa.
pub fn guard<'e>(
    expression: &'e Expression,
    program: &Program<'_>,
    pins: &Allocations,
) -> Generation<Guard<'e>> {
    let mut test = lower(expression, program, pins)?;
    let debounced = debounced(expression, program);

    for sensor in &debounced {
        test.push_str(" && (");
        test.push_str(&bricks::digital::debounce_check(sensor));
        test.push(')');
    }

    Ok(Guard {
        test,
        debounced,
        reads_serial: reads_serial(expression),
    })
}

/// Traduce una expresión sin cláusulas de antirrebote.
pub fn lower(
    expression: &Expression,
    program: &Program<'_>,
    pins: &Allocations,
) -> Generation<String> {
    match expression {
        Expression::Condition(condition) => bricks::condition(condition, program, pins),
        Expression::Binary {
            left,
            operator,
            right,
        } => {
            let left = lower(left, program, pins)?;
            let right = lower(right, program, pins)?;

            Ok(format!("({} {} {})", left, operator, right))
        }
    }
}

/// Sensores digitales distintos de la expresión, en orden de aparición.
pub fn debounced<'e>(expression: &'e Expression, program: &Program<'_>) -> Vec<&'e Identifier> {
    match expression {
        Expression::Binary { left, right, .. } => {
            let mut sensors = debounced(left, program);
            for sensor in debounced(right, program) {
                if !sensors.contains(&sensor) {
                    sensors.push(sensor);
                }
            }

            sensors
        }

        Expression::Condition(Condition::Digital { brick, .. }) => match program.brick(brick) {
            Ok(found) if found.kind == BrickKind::DigitalSensor => vec![brick],
            _ => Vec::new(),
        },

        Expression::Condition(_) => Vec::new(),
    }
}

/// Si alguna hoja de la expresión lee el puerto serie.
pub fn reads_serial(expression: &Expression) -> bool {
    match expression {
        Expression::Binary { left, right, .. } => reads_serial(left) || reads_serial(right),
        Expression::Condition(Condition::Serial { .. }) => true,
        Expression::Condition(_) => false,
    }
}
