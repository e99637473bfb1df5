//! Compiladores por categoría de brick.
//!
//! Cada submódulo emite los fragmentos de su categoría: configuración en
//! `setup()`, acciones dentro de un estado y, para las categorías que se
//! pueden leer, la expresión de una condición o de un estado en LCD. Las
//! funciones de este módulo despachan por categoría con `match` exhaustivo,
//! de modo que agregar una categoría obliga a tocar cada punto de despacho.

use std::io::Write;

use super::{pins::Allocations, Context};
use crate::{
    error::{Generation, GenerationError},
    model::{Action, Brick, BrickKind, Condition, Identifier},
    semantic::Program,
};

pub mod analog;
pub mod buzzer;
pub mod digital;
pub mod lcd;
pub mod serial;
pub mod temperature;

/// Emite la configuración de un brick dentro de `setup()`.
pub fn setup<W: Write>(cx: &mut Context<'_, W>, brick: &Brick) -> Generation<()> {
    use BrickKind::*;

    match brick.kind {
        DigitalSensor | DigitalActuator => digital::setup(cx, brick),
        AnalogSensor | AnalogActuator => analog::setup(cx, brick),
        TemperatureSensor => temperature::setup(cx, brick),
        SerialLine { baud } => serial::setup(cx, brick, baud),
        LcdDisplay => lcd::setup(cx, brick),
        Buzzer => buzzer::setup(cx, brick),
    }
}

/// Emite una acción de estado.
pub fn action<W: Write>(cx: &mut Context<'_, W>, action: &Action) -> Generation<()> {
    match action {
        Action::DigitalWrite { actuator, level } => digital::write(cx, actuator, *level),
        Action::AnalogWrite { actuator, value } => analog::write(cx, actuator, value),
        Action::SerialPrint { message, .. } => serial::print(cx, message),
        Action::LcdUpdate { segments, .. } => lcd::update(cx, segments),
        Action::Tone {
            buzzer,
            pitch,
            duration,
        } => buzzer::tone(cx, buzzer, pitch, *duration),
        Action::Silence { buzzer } => buzzer::silence(cx, buzzer),
    }
}

/// Traduce una condición hoja a una expresión booleana.
///
/// Los discriminantes se prueban en orden fijo: umbral analógico, línea
/// serie y nivel digital.
pub fn condition(
    condition: &Condition,
    program: &Program<'_>,
    pins: &Allocations,
) -> Generation<String> {
    use BrickKind::*;

    match condition {
        Condition::Analog {
            brick,
            operator,
            threshold,
        } => match program.brick(brick)?.kind {
            AnalogSensor => Ok(analog::condition(pins.pin(brick)?, *operator, *threshold)),
            TemperatureSensor => Ok(temperature::condition(
                pins.pin(brick)?,
                *operator,
                *threshold,
            )),
            found => Err(wrong_category(brick, "an analog sensor", found)),
        },

        Condition::Serial { brick, message } => match program.brick(brick)?.kind {
            SerialLine { .. } => Ok(serial::condition(message)),
            found => Err(wrong_category(brick, "a serial line", found)),
        },

        Condition::Digital { brick, level } => match program.brick(brick)?.kind {
            DigitalSensor | DigitalActuator | Buzzer => {
                Ok(digital::condition(pins.pin(brick)?, *level))
            }
            found => Err(wrong_category(brick, "a digital brick", found)),
        },
    }
}

/// Expresión que imprime el estado de un brick en forma legible.
pub fn status(name: &Identifier, program: &Program<'_>, pins: &Allocations) -> Generation<String> {
    use BrickKind::*;

    match program.brick(name)?.kind {
        DigitalSensor => Ok(digital::sensor_status(pins.pin(name)?)),
        DigitalActuator | Buzzer => Ok(digital::actuator_status(pins.pin(name)?)),
        AnalogSensor => Ok(analog::status(pins.pin(name)?)),
        TemperatureSensor => Ok(temperature::status(pins.pin(name)?)),
        found @ (AnalogActuator | SerialLine { .. } | LcdDisplay) => Err(wrong_category(
            name,
            "a brick with a readable status",
            found,
        )),
    }
}

fn wrong_category(brick: &Identifier, expected: &'static str, found: BrickKind) -> GenerationError {
    GenerationError::WrongCategory {
        brick: brick.clone(),
        expected,
        found,
    }
}
