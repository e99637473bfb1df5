//! Modelo de dominio.
//!
//! Estos tipos describen una aplicación ArduinoML ya resuelta y validada:
//! un conjunto de componentes físicos ("bricks") y una o varias máquinas de
//! estados que los gobiernan. El modelo se construye una sola vez, fuera del
//! núcleo de generación, y nunca se muta durante una corrida. Las referencias
//! entre entidades (una acción hacia su brick, una transición hacia su estado
//! destino) se expresan por nombre y se verifican en [`crate::semantic`].

use crate::board::{Pin, Pool};
use serde::Deserialize;
use std::fmt::{self, Display};
use thiserror::Error;

/// Un identificador válido en el lenguaje objetivo.
///
/// Los nombres se pegan tal cual en el firmware, así que al deserializar se
/// exige la forma `[A-Za-z_][A-Za-z0-9_]*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct Identifier(String);

#[derive(Error, Debug)]
#[error("Bad identifier {0:?}, expected letters, digits or `_`, not starting with a digit")]
pub struct BadIdentifier(String);

impl Identifier {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Identifier(name.into())
    }
}

impl TryFrom<String> for Identifier {
    type Error = BadIdentifier;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }

            None => false,
        };

        if valid {
            Ok(Identifier(name))
        } else {
            Err(BadIdentifier(name))
        }
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

/// Aplicación completa.
///
/// Una aplicación declara o bien una única máquina implícita (`initial` y
/// `states`, modo heredado) o bien una lista explícita de `machines`. Nunca
/// ambas y nunca ninguna; esto se verifica antes de asignar pines.
#[derive(Debug, Clone, Deserialize)]
pub struct App {
    pub name: String,

    #[serde(default)]
    pub bricks: Vec<Brick>,

    #[serde(default)]
    pub initial: Option<Identifier>,

    #[serde(default)]
    pub states: Vec<State>,

    #[serde(default)]
    pub machines: Vec<Machine>,
}

/// Componente físico con nombre.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Brick {
    pub name: Identifier,

    /// Pin especificado manualmente, si lo hay.
    #[serde(default)]
    pub pin: Option<Pin>,

    #[serde(flatten)]
    pub kind: BrickKind,
}

/// Categoría de un brick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrickKind {
    DigitalSensor,
    AnalogSensor,

    /// Sensor de temperatura TMP36.
    TemperatureSensor,

    DigitalActuator,
    AnalogActuator,

    /// Puerto serie por hardware, siempre sobre D0/D1.
    SerialLine {
        #[serde(default = "default_baud")]
        baud: u32,
    },

    /// Pantalla LCD de cableado fijo.
    LcdDisplay,

    Buzzer,
}

fn default_baud() -> u32 {
    9600
}

impl BrickKind {
    /// Pool del cual se asigna automáticamente un pin a esta categoría.
    ///
    /// Las categorías con cableado fijo no consumen pines de ningún pool.
    pub fn pool(self) -> Option<Pool> {
        use BrickKind::*;

        match self {
            DigitalSensor | DigitalActuator | Buzzer => Some(Pool::Digital),
            AnalogActuator => Some(Pool::Pwm),
            AnalogSensor | TemperatureSensor => Some(Pool::Analog),
            SerialLine { .. } | LcdDisplay => None,
        }
    }
}

impl Display for BrickKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BrickKind::*;

        let name = match self {
            DigitalSensor => "DigitalSensor",
            AnalogSensor => "AnalogSensor",
            TemperatureSensor => "TemperatureSensor",
            DigitalActuator => "DigitalActuator",
            AnalogActuator => "AnalogActuator",
            SerialLine { .. } => "SerialLine",
            LcdDisplay => "LCDDisplay",
            Buzzer => "Buzzer",
        };

        fmt.write_str(name)
    }
}

/// Máquina de estados independiente.
#[derive(Debug, Clone, Deserialize)]
pub struct Machine {
    pub name: Identifier,
    pub initial: Identifier,
    pub states: Vec<State>,

    /// Periodo de despacho en milisegundos (solo en modo multi-máquina).
    #[serde(default)]
    pub period: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct State {
    pub name: Identifier,

    #[serde(default)]
    pub actions: Vec<Action>,

    /// Transiciones salientes, evaluadas en orden de declaración.
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transition {
    pub guard: Expression,
    pub next: Identifier,
}

/// Árbol lógico de condiciones.
///
/// La forma del árbol, y no la precedencia de operadores, determina la
/// agrupación del código emitido.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Condition(Condition),
    Binary {
        left: Box<Expression>,
        operator: Logical,
        right: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logical {
    And,
    Or,
}

impl Display for Logical {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logical::And => fmt.write_str("&&"),
            Logical::Or => fmt.write_str("||"),
        }
    }
}

/// Predicado hoja sobre exactamente un brick.
///
/// Al ser un tipo suma, una condición no puede poblar dos discriminantes a
/// la vez: un documento de entrada que lo intente se rechaza al deserializar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Digital {
        brick: Identifier,
        level: Level,
    },

    Analog {
        brick: Identifier,
        operator: Comparison,
        threshold: f64,
    },

    Serial {
        brick: Identifier,
        message: String,
    },
}

impl Condition {
    pub fn brick(&self) -> &Identifier {
        match self {
            Condition::Digital { brick, .. } => brick,
            Condition::Analog { brick, .. } => brick,
            Condition::Serial { brick, .. } => brick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    High,
    Low,
}

impl Display for Level {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::High => fmt.write_str("HIGH"),
            Level::Low => fmt.write_str("LOW"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl Display for Comparison {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Comparison::*;

        let operator = match self {
            Less => "<",
            LessOrEqual => "<=",
            Greater => ">",
            GreaterOrEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
        };

        fmt.write_str(operator)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    DigitalWrite {
        actuator: Identifier,
        level: Level,
    },

    AnalogWrite {
        actuator: Identifier,
        value: AnalogValue,
    },

    SerialPrint {
        serial: Identifier,
        message: String,
    },

    LcdUpdate {
        display: Identifier,
        segments: Vec<Segment>,
    },

    Tone {
        buzzer: Identifier,
        pitch: Pitch,

        /// Duración en milisegundos; sin ella el tono se sostiene.
        #[serde(default)]
        duration: Option<u32>,
    },

    Silence {
        buzzer: Identifier,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalogValue {
    Literal(u8),

    /// Lectura en vivo de otro sensor analógico.
    Sensor(Identifier),
}

/// Segmento de texto de una actualización de LCD.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Text(String),
    Status(Identifier),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pitch {
    Frequency(u32),

    /// Nota con nombre, por ejemplo `C4` o `F#5`.
    Note(String),
}
