//! Generador de firmware para ArduinoML.
//!
//! # Front end
//! Cada aplicación llega como un modelo ya validado, descrito en
//! [`model`] y cargado desde JSON por [`source`]. El modelo se somete a
//! resolución de referencias en [`semantic`], de lo cual se obtiene un
//! programa resuelto con su modo de máquinas y sus periféricos.
//!
//! # Back end
//! En esta sección el generador deja de ser agnóstico a la placa. Los
//! pines se asignan contra los pools de la placa elegida en [`board`] y
//! luego se emite un sketch de Arduino completo. Los detalles viven en
//! el módulo de generación de código y se reexportan en [`target`].
//! Cualquier error en estas fases descarta la salida completa.

#[macro_use]
mod macros;

pub mod board;
pub mod error;
pub mod logger;
pub mod model;
pub mod semantic;
pub mod source;

mod codegen;

#[cfg(test)]
mod test_helpers;

/// Emisión de código.
///
/// Este módulo reexporta suficientes ítems internos relacionados a
/// generación de código para traducir un modelo a un sketch completo.
pub mod target {
    pub use crate::codegen::{
        emit, generate,
        pins::{allocate, Allocations, Entry, Wiring},
        schedule::is_due,
        Options,
    };
}
