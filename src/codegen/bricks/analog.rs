//! Entradas analógicas y salidas PWM.

use std::io::Write;

use crate::{
    board::Pin,
    codegen::Context,
    error::Generation,
    model::{AnalogValue, Brick, BrickKind, Comparison, Identifier},
};

pub fn setup<W: Write>(cx: &mut Context<'_, W>, brick: &Brick) -> Generation<()> {
    let pin = cx.pins().pin(&brick.name)?;
    let mode = match brick.kind {
        BrickKind::AnalogSensor => "INPUT",
        _ => "OUTPUT",
    };

    emit!(cx, "pinMode({}, {}); // {} [{}]", pin, mode, brick.name, brick.kind)?;
    Ok(())
}

/// `analogWrite()` con un literal o con la lectura en vivo de otro sensor.
pub fn write<W: Write>(
    cx: &mut Context<'_, W>,
    actuator: &Identifier,
    value: &AnalogValue,
) -> Generation<()> {
    let pin = cx.pins().pin(actuator)?;
    let value = match value {
        AnalogValue::Literal(value) => value.to_string(),
        AnalogValue::Sensor(sensor) => format!("analogRead({})", cx.pins().pin(sensor)?),
    };

    emit!(cx, "analogWrite({}, {});", pin, value)?;
    Ok(())
}

pub fn condition(pin: Pin, operator: Comparison, threshold: f64) -> String {
    format!("analogRead({}) {} {}", pin, operator, threshold)
}

pub fn status(pin: Pin) -> String {
    format!("analogRead({})", pin)
}
