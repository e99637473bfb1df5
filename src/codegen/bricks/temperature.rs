//! Sensores de temperatura TMP36.
//!
//! Las lecturas se convierten a grados Celsius en el firmware mediante una
//! función auxiliar que se emite una sola vez.

use std::io::Write;

use crate::{
    board::Pin,
    codegen::Context,
    error::Generation,
    model::{Brick, Comparison},
};

pub fn setup<W: Write>(cx: &mut Context<'_, W>, brick: &Brick) -> Generation<()> {
    let pin = cx.pins().pin(&brick.name)?;
    emit!(cx, "pinMode({}, INPUT); // {} [{}]", pin, brick.name, brick.kind)?;

    Ok(())
}

pub fn declare_helper<W: Write>(cx: &mut Context<'_, W>) -> Generation<()> {
    emit!(cx, "// TMP36: 10 mV per degree C with a 500 mV offset, 10-bit ADC at 5 V")?;
    emit!(cx, "float readTemperature(int pin) {{")?;
    cx.nested(|cx| {
        emit!(cx, "int reading = analogRead(pin);")?;
        emit!(cx, "float voltage = reading * 5.0 / 1024.0;")?;
        emit!(cx, "return (voltage - 0.5) * 100.0;")?;
        Ok(())
    })?;

    emit!(cx, "}}")?;
    emit!(cx)?;

    Ok(())
}

pub fn condition(pin: Pin, operator: Comparison, threshold: f64) -> String {
    format!("readTemperature({}) {} {}", pin, operator, threshold)
}

pub fn status(pin: Pin) -> String {
    format!("readTemperature({})", pin)
}
