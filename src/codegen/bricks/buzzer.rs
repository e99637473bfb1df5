//! Zumbadores piezoeléctricos.
//!
//! Un zumbador se conecta a un pin digital y se controla con `tone()` y
//! `noTone()`. Las frecuencias pueden darse en hertz o como nombre de
//! nota, que se traduce con afinación temperada a partir de A4 = 440 Hz.

use std::io::Write;

use crate::{
    codegen::Context,
    error::{Generation, GenerationError},
    model::{Brick, Identifier, Pitch},
};

pub fn setup<W: Write>(cx: &mut Context<'_, W>, brick: &Brick) -> Generation<()> {
    let pin = cx.pins().pin(&brick.name)?;
    emit!(cx, "pinMode({}, OUTPUT); // {} [{}]", pin, brick.name, brick.kind)?;

    Ok(())
}

pub fn tone<W: Write>(
    cx: &mut Context<'_, W>,
    buzzer: &Identifier,
    pitch: &Pitch,
    duration: Option<u32>,
) -> Generation<()> {
    let pin = cx.pins().pin(buzzer)?;
    let frequency = match pitch {
        Pitch::Frequency(hertz) => *hertz,
        Pitch::Note(note) => note_frequency(note)?,
    };

    match duration {
        Some(duration) => emit!(cx, "tone({}, {}, {});", pin, frequency, duration)?,
        None => emit!(cx, "tone({}, {});", pin, frequency)?,
    }

    Ok(())
}

pub fn silence<W: Write>(cx: &mut Context<'_, W>, buzzer: &Identifier) -> Generation<()> {
    let pin = cx.pins().pin(buzzer)?;
    emit!(cx, "noTone({});", pin)?;

    Ok(())
}

/// Frecuencia en hertz de una nota como `C4`, `F#5`, `CS5` o `Bb3`.
///
/// La letra no distingue mayúsculas; `#` o `s` suben un semitono y `b`
/// lo baja. La octava va de 0 a 8.
pub fn note_frequency(note: &str) -> Generation<u32> {
    let unknown = || GenerationError::UnknownNote(note.to_owned());

    let mut chars = note.trim().chars();
    let semitone = match chars.next().map(|c| c.to_ascii_uppercase()) {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => return Err(unknown()),
    };

    let rest = chars.as_str();
    let (shift, octave) = match rest.chars().next() {
        Some('#') | Some('s') | Some('S') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let octave = octave
        .parse::<i32>()
        .ok()
        .filter(|octave| (0..=8).contains(octave))
        .ok_or_else(unknown)?;

    let midi = 12 * (octave + 1) + semitone + shift;
    let hertz = 440.0 * 2f64.powf(f64::from(midi - 69) / 12.0);

    Ok(hertz.round() as u32)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn note_frequency_when_standard_notes_then_matches_pitch_table() {
        assert_eq!(note_frequency("A4").unwrap(), 440);
        assert_eq!(note_frequency("C4").unwrap(), 262);
        assert_eq!(note_frequency("c4").unwrap(), 262);
        assert_eq!(note_frequency("F#5").unwrap(), 740);
        assert_eq!(note_frequency("FS5").unwrap(), 740);
        assert_eq!(note_frequency("Bb3").unwrap(), 233);
        assert_eq!(note_frequency("B0").unwrap(), 31);
        assert_eq!(note_frequency("C8").unwrap(), 4186);
    }

    #[test]
    fn note_frequency_when_malformed_then_unknown_note() {
        for note in &["H4", "C9", "C", "", "C#x"] {
            assert!(matches!(
                note_frequency(note),
                Err(GenerationError::UnknownNote(_))
            ));
        }
    }
}
