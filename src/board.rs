//! Placas objetivo y sus pines.
//!
//! Una placa define qué pines existen y en qué pools de asignación
//! participa cada uno. Los pools se traslapan en su definición estática
//! (un pin PWM también es un pin digital); el asignador se encarga de que
//! un mismo pin físico no se entregue dos veces.

use serde::Deserialize;
use std::{
    convert::TryFrom,
    fmt::{self, Display},
    ops::RangeInclusive,
    str::FromStr,
};
use thiserror::Error;

/// Un pin físico.
///
/// La representación textual ([`Display`]) es la que se escribe en el
/// firmware: `8` para un pin digital y `A0` para una entrada analógica.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum Pin {
    Digital(u8),
    Analog(u8),
}

impl Pin {
    /// Notación de resumen, `D<n>` o `A<n>`.
    pub fn notation(self) -> String {
        match self {
            Pin::Digital(number) => format!("D{}", number),
            Pin::Analog(number) => format!("A{}", number),
        }
    }
}

impl Display for Pin {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pin::Digital(number) => write!(fmt, "{}", number),
            Pin::Analog(number) => write!(fmt, "A{}", number),
        }
    }
}

#[derive(Error, Debug)]
#[error("Bad pin {0:?}, expected `D<n>`, `A<n>` or a plain digital pin number")]
pub struct BadPin(String);

impl FromStr for Pin {
    type Err = BadPin;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let bad = || BadPin(string.to_owned());
        let trimmed = string.trim();

        let (analog, digits) = match trimmed.chars().next() {
            Some('A') | Some('a') => (true, &trimmed[1..]),
            Some('D') | Some('d') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let number = digits.parse::<u8>().map_err(|_| bad())?;
        Ok(if analog {
            Pin::Analog(number)
        } else {
            Pin::Digital(number)
        })
    }
}

impl TryFrom<String> for Pin {
    type Error = BadPin;

    fn try_from(string: String) -> Result<Self, Self::Error> {
        string.parse()
    }
}

/// Pool de asignación.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pool {
    Digital,

    /// Pines digitales capaces de PWM (`analogWrite`).
    Pwm,

    /// Entradas del ADC.
    Analog,
}

impl Display for Pool {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::Digital => fmt.write_str("digital"),
            Pool::Pwm => fmt.write_str("PWM"),
            Pool::Analog => fmt.write_str("analog"),
        }
    }
}

/// Placa objetivo.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Board {
    /// Arduino Uno (ATmega328P).
    Uno,

    /// Arduino Nano, igual al Uno pero con `A6` y `A7` solo analógicos.
    Nano,

    /// Arduino Mega 2560.
    Mega,
}

impl Default for Board {
    fn default() -> Self {
        Board::Uno
    }
}

/// Cableado fijo del LCD: RS, EN, D4, D5, D6, D7.
const LCD_WIRING: [u8; 6] = [12, 11, 5, 4, 3, 2];

/// Geometría del LCD en columnas y filas.
const LCD_GEOMETRY: (u8, u8) = (16, 2);

impl Board {
    /// Nombres aceptados en línea de comandos.
    pub const NAMES: &'static [&'static str] = &["uno", "nano", "mega"];

    /// Pines del pool en el orden exacto en que se consumen.
    pub fn pool(self, pool: Pool) -> Vec<Pin> {
        let layout = self.layout();

        match pool {
            Pool::Digital => layout.digital.map(Pin::Digital).collect(),
            Pool::Pwm => layout.pwm.iter().copied().map(Pin::Digital).collect(),
            Pool::Analog => layout.analog.map(Pin::Analog).collect(),
        }
    }

    /// Determina si un pin existe en algún pool de esta placa.
    pub fn has_pin(self, pin: Pin) -> bool {
        [Pool::Digital, Pool::Pwm, Pool::Analog]
            .iter()
            .any(|pool| self.in_pool(*pool, pin))
    }

    /// Determina si un pin pertenece a la definición estática de un pool.
    pub fn in_pool(self, pool: Pool, pin: Pin) -> bool {
        let layout = self.layout();

        match (pool, pin) {
            (Pool::Digital, Pin::Digital(number)) => layout.digital.contains(&number),
            (Pool::Pwm, Pin::Digital(number)) => layout.pwm.contains(&number),
            (Pool::Analog, Pin::Analog(number)) => layout.analog.contains(&number),
            _ => false,
        }
    }

    /// Pines ocupados por el LCD, en el orden de argumentos de `LiquidCrystal`.
    pub fn lcd_wiring(self) -> Vec<Pin> {
        LCD_WIRING.iter().copied().map(Pin::Digital).collect()
    }

    /// Columnas y filas del LCD.
    pub fn lcd_geometry(self) -> (u8, u8) {
        LCD_GEOMETRY
    }

    fn layout(self) -> Layout {
        match self {
            Board::Uno => Layout {
                digital: 2..=13,
                pwm: &[3, 5, 6, 9, 10, 11],
                analog: 0..=5,
            },

            Board::Nano => Layout {
                digital: 2..=13,
                pwm: &[3, 5, 6, 9, 10, 11],
                analog: 0..=7,
            },

            Board::Mega => Layout {
                digital: 2..=53,
                pwm: &[2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 44, 45, 46],
                analog: 0..=15,
            },
        }
    }
}

impl Display for Board {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Board::Uno => fmt.write_str("uno"),
            Board::Nano => fmt.write_str("nano"),
            Board::Mega => fmt.write_str("mega"),
        }
    }
}

#[derive(Error, Debug)]
#[error("Unknown board {0:?}, expected one of: uno, nano, mega")]
pub struct BadBoard(String);

impl FromStr for Board {
    type Err = BadBoard;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let board = [Board::Uno, Board::Nano, Board::Mega]
            .iter()
            .copied()
            .find(|board| unicase::eq_ascii(string, &board.to_string()));

        board.ok_or_else(|| BadBoard(string.to_owned()))
    }
}

/// Distribución de pines por placa.
///
/// D0 y D1 quedan fuera de todo pool: son el puerto serie por hardware.
struct Layout {
    digital: RangeInclusive<u8>,
    pwm: &'static [u8],
    analog: RangeInclusive<u8>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_str_when_mixed_case_then_ok() {
        assert_eq!("MeGa".parse::<Board>().unwrap(), Board::Mega);
        assert_eq!("uno".parse::<Board>().unwrap(), Board::Uno);
        assert!("leonardo".parse::<Board>().is_err());
    }

    #[test]
    fn pin_from_str_when_prefixed_then_typed() {
        assert_eq!("A3".parse::<Pin>().unwrap(), Pin::Analog(3));
        assert_eq!("D13".parse::<Pin>().unwrap(), Pin::Digital(13));
        assert_eq!("7".parse::<Pin>().unwrap(), Pin::Digital(7));
        assert!("X1".parse::<Pin>().is_err());
    }

    #[test]
    fn display_when_analog_then_uses_constant_name() {
        assert_eq!(Pin::Analog(0).to_string(), "A0");
        assert_eq!(Pin::Digital(9).to_string(), "9");
        assert_eq!(Pin::Digital(9).notation(), "D9");
    }

    #[test]
    fn pool_when_uno_then_serial_pins_excluded() {
        let digital = Board::Uno.pool(Pool::Digital);

        assert_eq!(digital.first(), Some(&Pin::Digital(2)));
        assert!(!digital.contains(&Pin::Digital(0)));
        assert!(!digital.contains(&Pin::Digital(1)));
        assert_eq!(Board::Uno.pool(Pool::Analog).len(), 6);
        assert_eq!(Board::Nano.pool(Pool::Analog).len(), 8);
    }

    #[test]
    fn in_pool_when_pwm_pin_then_also_digital() {
        assert!(Board::Uno.in_pool(Pool::Pwm, Pin::Digital(9)));
        assert!(Board::Uno.in_pool(Pool::Digital, Pin::Digital(9)));
        assert!(!Board::Uno.in_pool(Pool::Pwm, Pin::Digital(8)));
        assert!(!Board::Uno.has_pin(Pin::Digital(40)));
        assert!(Board::Mega.has_pin(Pin::Digital(40)));
    }
}
