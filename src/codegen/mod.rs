//! Generación de firmware.
//!
//! A partir de un [`Program`] resuelto y de un mapa de [`Allocations`],
//! este módulo escribe un sketch de Arduino completo. El orden del
//! artefacto es fijo: encabezado, resumen de pines, declaraciones
//! globales, funciones auxiliares, `setup()` y `loop()`.
//!
//! Todo el artefacto se construye en memoria. Un error en cualquier fase
//! descarta el búfer completo, por lo cual nunca se escribe una salida
//! parcial.

use crate::{
    board::Board,
    error::{Diagnostics, Generation},
    model::App,
    semantic::{Mode, Peripherals, Program},
};

use log::info;
use std::io::{self, Write};

pub mod bricks;
pub mod expr;
pub mod machine;
pub mod pins;
pub mod schedule;

use pins::{Allocations, Wiring};

/// Configuración de generación.
///
/// Ambos valores quedan fijos en el artefacto; el firmware no los puede
/// ajustar en tiempo de ejecución.
#[derive(Copy, Clone, Debug)]
pub struct Options {
    pub board: Board,

    /// Intervalo mínimo entre transiciones disparadas por un mismo sensor
    /// digital, en milisegundos.
    pub debounce: u32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            board: Board::default(),
            debounce: 200,
        }
    }
}

/// Genera el sketch completo para una aplicación.
pub fn generate(app: &App, options: &Options) -> Result<String, Diagnostics> {
    let program = app
        .resolve()
        .map_err(|errors| Diagnostics::from(errors).kind("Model error"))?;

    info!(
        "Generating `{}` in {:?} mode for board {}",
        app.name,
        program.mode(),
        options.board
    );

    let pins = pins::allocate(&app.bricks, options.board)
        .map_err(|error| Diagnostics::from(error).kind("Allocation error"))?;

    let mut buffer = Vec::new();
    Context::new(&mut buffer, &program, &pins, options)
        .write_sketch()
        .map_err(|error| Diagnostics::from(error).kind("Code generation error"))?;

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Genera el sketch y lo escribe, solo si la generación fue exitosa.
pub fn emit<W: Write>(app: &App, options: &Options, output: &mut W) -> Result<(), Diagnostics> {
    let sketch = generate(app, options)?;
    output
        .write_all(sketch.as_bytes())
        .and_then(|()| output.flush())
        .map_err(|error| Diagnostics::from(crate::error::GenerationError::Io(error)))
}

/// Contexto de emisión.
pub struct Context<'a, W: Write> {
    output: &'a mut W,
    program: &'a Program<'a>,
    pins: &'a Allocations,
    options: &'a Options,
    depth: usize,
}

impl<'a, W: Write> Context<'a, W> {
    pub fn new(
        output: &'a mut W,
        program: &'a Program<'a>,
        pins: &'a Allocations,
        options: &'a Options,
    ) -> Self {
        Context {
            output,
            program,
            pins,
            options,
            depth: 0,
        }
    }

    pub fn output(&mut self) -> &mut W {
        self.output
    }

    pub fn program(&self) -> &'a Program<'a> {
        self.program
    }

    pub fn pins(&self) -> &'a Allocations {
        self.pins
    }

    pub fn options(&self) -> &'a Options {
        self.options
    }

    /// Escribe la indentación de la línea actual.
    pub fn indent(&mut self) -> io::Result<()> {
        for _ in 0..self.depth {
            self.output.write_all(b"\t")?;
        }

        Ok(())
    }

    /// Emite un bloque un nivel más adentro.
    pub fn nested<F>(&mut self, block: F) -> Generation<()>
    where
        F: FnOnce(&mut Self) -> Generation<()>,
    {
        self.depth += 1;
        let result = block(self);
        self.depth -= 1;

        result
    }

    fn write_sketch(&mut self) -> Generation<()> {
        self.write_header()?;
        self.write_summary()?;
        self.write_globals()?;
        self.write_setup()?;
        self.write_loop()
    }

    fn write_header(&mut self) -> Generation<()> {
        let app = self.program.app();

        emit!(self, "// Wiring code generated from an ArduinoML model")?;
        emit!(self, "// Application name: {}", app.name)?;
        emit!(self)?;

        Ok(())
    }

    fn write_summary(&mut self) -> Generation<()> {
        let pins = self.pins;
        emit!(self, "// Pin Allocation Summary:")?;

        for entry in pins.iter() {
            let wiring = match &entry.wiring {
                Wiring::Pin(pin) => format!("Pin {}", pin.notation()),
                Wiring::Serial => String::from("Pins D0/D1 (hardware serial)"),
                Wiring::Lcd(wiring) => {
                    let pins = wiring
                        .iter()
                        .map(|pin| pin.notation())
                        .collect::<Vec<_>>()
                        .join(", ");

                    format!("Pins {} (fixed wiring)", pins)
                }
            };

            emit!(self, "//   {} ({}): {}", entry.brick, entry.kind, wiring)?;
        }

        emit!(self)?;
        Ok(())
    }

    fn write_globals(&mut self) -> Generation<()> {
        let program = self.program;
        let peripherals = program.peripherals();

        if peripherals.contains(Peripherals::LCD) {
            bricks::lcd::declare(self)?;
        }

        emit!(self, "const unsigned long debounce = {};", self.options.debounce)?;
        emit!(self)?;

        let mode = program.mode();
        for machine in program.machines() {
            machine::declare(self, machine)?;
            if mode == Mode::Multi {
                schedule::declare(self, machine)?;
            }

            emit!(self)?;
        }

        bricks::digital::declare_debounce(self)?;

        if peripherals.contains(Peripherals::SERIAL_INPUT) {
            bricks::serial::declare_input(self)?;
        }

        if peripherals.contains(Peripherals::TEMPERATURE) {
            bricks::temperature::declare_helper(self)?;
        }

        Ok(())
    }

    fn write_setup(&mut self) -> Generation<()> {
        emit!(self, "void setup() {{")?;
        let program = self.program;
        self.nested(|cx| {
            for brick in &program.app().bricks {
                bricks::setup(cx, brick)?;
            }

            Ok(())
        })?;

        emit!(self, "}}")?;
        emit!(self)?;

        Ok(())
    }

    fn write_loop(&mut self) -> Generation<()> {
        emit!(self, "void loop() {{")?;
        let program = self.program;
        self.nested(|cx| match program.mode() {
            Mode::Single => {
                if program.peripherals().contains(Peripherals::SERIAL_INPUT) {
                    bricks::serial::read_line(cx)?;
                }

                for machine in program.machines() {
                    machine::dispatch(cx, machine)?;
                }

                Ok(())
            }

            Mode::Multi => schedule::dispatch_all(cx),
        })?;

        emit!(self, "}}")?;
        Ok(())
    }
}

/// Literal de string en el lenguaje objetivo.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');

    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            // Octal de tres dígitos: a diferencia de `\x`, no absorbe lo que sigue
            c if c.is_ascii_control() => quoted.push_str(&format!("\\{:03o}", c as u32)),
            _ => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}
