//! Entradas y salidas digitales.
//!
//! Los sensores digitales son los únicos bricks con antirrebote: cada uno
//! lleva una marca de tiempo global con la última transición aceptada.

use std::io::Write;

use crate::{
    board::Pin,
    codegen::Context,
    error::Generation,
    model::{Brick, BrickKind, Identifier, Level},
};

pub fn setup<W: Write>(cx: &mut Context<'_, W>, brick: &Brick) -> Generation<()> {
    let pin = cx.pins().pin(&brick.name)?;
    let mode = match brick.kind {
        BrickKind::DigitalSensor => "INPUT",
        _ => "OUTPUT",
    };

    emit!(cx, "pinMode({}, {}); // {} [{}]", pin, mode, brick.name, brick.kind)?;
    Ok(())
}

pub fn write<W: Write>(cx: &mut Context<'_, W>, actuator: &Identifier, level: Level) -> Generation<()> {
    let pin = cx.pins().pin(actuator)?;
    emit!(cx, "digitalWrite({}, {});", pin, level)?;

    Ok(())
}

pub fn condition(pin: Pin, level: Level) -> String {
    format!("digitalRead({}) == {}", pin, level)
}

pub fn sensor_status(pin: Pin) -> String {
    format!("digitalRead({}) == HIGH ? \"HIGH\" : \"LOW\"", pin)
}

pub fn actuator_status(pin: Pin) -> String {
    format!("digitalRead({}) == HIGH ? \"ON\" : \"OFF\"", pin)
}

/// Variable con la última transición aceptada de un sensor.
pub fn debounce_variable(sensor: &Identifier) -> String {
    format!("{}LastDebounceTime", sensor)
}

/// Condición de antirrebote para un sensor.
pub fn debounce_check(sensor: &Identifier) -> String {
    format!("millis() - {} > debounce", debounce_variable(sensor))
}

/// Declara una marca de tiempo por cada sensor digital.
pub fn declare_debounce<W: Write>(cx: &mut Context<'_, W>) -> Generation<()> {
    let app = cx.program().app();
    let mut sensors = app
        .bricks
        .iter()
        .filter(|brick| brick.kind == BrickKind::DigitalSensor)
        .peekable();

    if sensors.peek().is_none() {
        return Ok(());
    }

    for sensor in sensors {
        emit!(cx, "unsigned long {} = 0;", debounce_variable(&sensor.name))?;
    }

    emit!(cx)?;
    Ok(())
}
