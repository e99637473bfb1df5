/// Emite una línea de código con la indentación actual del contexto.
///
/// Sin argumentos de formato se emite una línea vacía. La línea se
/// formatea antes de tomar la salida, así que los argumentos pueden
/// leer del mismo contexto.
macro_rules! emit {
    ($cx:expr) => {
        writeln!($cx.output())
    };

    ($cx:expr, $($format:tt)*) => {{
        let line = format!($($format)*);
        $cx.indent()?;
        writeln!($cx.output(), "{}", line)
    }};
}
