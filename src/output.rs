//! Saving a response body to a file.

use crate::Error;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::fs;
use std::io;

/// The formats a response can be saved in, picked by the output
/// path's extension.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputFormat {
    /// `.json`: the body is re-serialized with 2-space indentation.
    Json,
    /// `.csv`: accepted, but nothing is written.
    Csv,
}

impl OutputFormat {
    /// Picks the format for `path` by its suffix. The match is
    /// case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](enum.Error.html#variant.InvalidArgument)
    /// if the path ends in neither `.json` nor `.csv`.
    pub fn from_path(path: &str) -> Result<OutputFormat, Error> {
        if path.ends_with(".json") {
            Ok(OutputFormat::Json)
        } else if path.ends_with(".csv") {
            Ok(OutputFormat::Csv)
        } else {
            Err(Error::InvalidArgument(format!(
                "Invalid outfile format '{}'. Use '.json' or '.csv'.",
                path
            )))
        }
    }
}

/// Saves `body` to `path` in the given format.
///
/// For [`OutputFormat::Json`] the body is parsed first, so a body that
/// isn't JSON leaves the file system untouched. The file is then
/// created or truncated and replaced by the pretty-printed document.
///
/// [`OutputFormat::Csv`] writes nothing.
///
/// # Errors
///
/// Returns [`DecodeError`](enum.Error.html#variant.DecodeError) if the
/// body is not JSON, or
/// [`OutputFile`](enum.Error.html#variant.OutputFile) if the file
/// can't be written.
pub fn save(format: OutputFormat, path: &str, body: &[u8]) -> Result<(), Error> {
    match format {
        OutputFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_slice(body).map_err(Error::DecodeError)?;
            let pretty = to_pretty_json(&value).map_err(Error::SerdeJsonError)?;
            fs::write(path, &pretty).map_err(|source| Error::OutputFile {
                path: path.to_string(),
                source,
            })?;
            log::debug!("Wrote {} bytes of json to {}.", pretty.len(), path);
        }
        OutputFormat::Csv => {
            // Accepted on purpose, but never rendered.
            log::debug!("Not writing {}: csv output is a no-op.", path);
        }
    }
    Ok(())
}

/// Serializes `value` with 2-space indentation, `": "` between keys
/// and values, and every non-ASCII character escaped as `\uXXXX`. No
/// trailing newline.
///
/// Numbers are written the way the server's value reads as a plain
/// integer or a double: integers keep all their digits, floats get
/// their shortest round-trip digits, in scientific notation (`1e-05`,
/// `1e+16`) when the decimal exponent is below -4 or at least 16, and
/// with a trailing `.0` otherwise.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut writer = Vec::with_capacity(128);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, AsciiPrettyFormatter::new());
    value.serialize(&mut serializer)?;
    Ok(writer)
}

/// A [`PrettyFormatter`] that only ever emits ASCII.
struct AsciiPrettyFormatter {
    pretty: PrettyFormatter<'static>,
}

impl AsciiPrettyFormatter {
    fn new() -> AsciiPrettyFormatter {
        AsciiPrettyFormatter {
            pretty: PrettyFormatter::with_indent(b"  "),
        }
    }
}

impl Formatter for AsciiPrettyFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut rest = fragment;
        while let Some(i) = rest.find(|c: char| !c.is_ascii()) {
            writer.write_all(rest[..i].as_bytes())?;
            let c = rest[i..].chars().next().unwrap_or_default();
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            rest = &rest[i + c.len_utf8()..];
        }
        writer.write_all(rest.as_bytes())
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_number_str<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        value: &str,
    ) -> io::Result<()> {
        writer.write_all(format_number(value).as_bytes())
    }
}

/// Rewrites the source text of a JSON number. Integers stay exact,
/// apart from `-0` losing its sign; anything with a fraction or an
/// exponent is read as a double.
fn format_number(text: &str) -> String {
    if text.contains(['.', 'e', 'E']) {
        match text.parse::<f64>() {
            Ok(value) => format_float(value),
            Err(_) => text.to_string(),
        }
    } else if text.trim_start_matches('-').bytes().all(|b| b == b'0') {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{}Infinity", sign);
    }

    // `{:e}` gives the shortest digits that round-trip, eg. `1.5e-7`.
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::with_capacity(digits.len() + 8);
    if value.is_sign_negative() {
        out.push('-');
    }
    if !(-4..16).contains(&exponent) {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        out.push_str(&format!("e{}{:02}", sign, exponent.abs()));
    } else if exponent < 0 {
        out.push_str("0.");
        for _ in 0..(-exponent - 1) {
            out.push('0');
        }
        out.push_str(&digits);
    } else {
        let point = exponent as usize + 1;
        if digits.len() > point {
            out.push_str(&digits[..point]);
            out.push('.');
            out.push_str(&digits[point..]);
        } else {
            out.push_str(&digits);
            for _ in digits.len()..point {
                out.push('0');
            }
            out.push_str(".0");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{save, to_pretty_json, OutputFormat};
    use crate::{Error, ErrorKind};
    use serde_json::Value;
    use std::fs;

    fn pretty(json: &str) -> String {
        let value: Value = serde_json::from_str(json).unwrap();
        String::from_utf8(to_pretty_json(&value).unwrap()).unwrap()
    }

    #[test]
    fn test_from_path() {
        assert_eq!(OutputFormat::from_path("out.json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path("dir/out.csv").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(".json").unwrap(), OutputFormat::Json);
        for path in ["out.txt", "out.JSON", "out", "json"] {
            let err = OutputFormat::from_path(path).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "path {:?}", path);
        }
    }

    #[test]
    fn test_pretty_layout() {
        assert_eq!(
            pretty(r#"{"userId":1,"id":1,"tags":["a","b"],"meta":{},"list":[],"n":null}"#),
            "{\n  \"userId\": 1,\n  \"id\": 1,\n  \"tags\": [\n    \"a\",\n    \"b\"\n  ],\n  \"meta\": {},\n  \"list\": [],\n  \"n\": null\n}"
        );
        assert_eq!(pretty("[{\"a\": true}]"), "[\n  {\n    \"a\": true\n  }\n]");
        assert_eq!(pretty("\"plain\""), "\"plain\"");
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        assert_eq!(pretty(r#"{"name":"café"}"#), "{\n  \"name\": \"caf\\u00e9\"\n}");
        // Outside the BMP: a surrogate pair.
        assert_eq!(pretty(r#""a😀b""#), "\"a\\ud83d\\ude00b\"");
        assert_eq!(pretty(r#""tab\there""#), "\"tab\\there\"");
    }

    #[test]
    fn test_floats() {
        assert_eq!(pretty(r#"{"v": 1.5e-7}"#), "{\n  \"v\": 1.5e-07\n}");
        assert_eq!(pretty("0.00001"), "1e-05");
        assert_eq!(pretty("0.0001"), "0.0001");
        assert_eq!(pretty("1e16"), "1e+16");
        assert_eq!(pretty("1.5E+16"), "1.5e+16");
        assert_eq!(pretty("123456789012345.6"), "123456789012345.6");
        assert_eq!(pretty("[1E2]"), "[\n  100.0\n]");
        assert_eq!(pretty("1.0"), "1.0");
        assert_eq!(pretty("-2.50"), "-2.5");
        assert_eq!(pretty("0.1"), "0.1");
        assert_eq!(pretty("-0.0"), "-0.0");
        assert_eq!(pretty("12345678901234567890123.0"), "1.2345678901234568e+22");
    }

    #[test]
    fn test_integers_are_exact() {
        assert_eq!(pretty(r#"{"v": -0}"#), "{\n  \"v\": 0\n}");
        assert_eq!(
            pretty(r#"{"v": 12345678901234567890123}"#),
            "{\n  \"v\": 12345678901234567890123\n}"
        );
        assert_eq!(pretty("-9223372036854775809"), "-9223372036854775809");
        assert_eq!(pretty("[0, -17, 101]"), "[\n  0,\n  -17,\n  101\n]");
    }

    #[test]
    fn test_plain_f64_values() {
        let json = |value: f64| String::from_utf8(to_pretty_json(&value).unwrap()).unwrap();
        assert_eq!(json(1e-5), "1e-05");
        assert_eq!(json(100.0), "100.0");
        assert_eq!(json(-0.5), "-0.5");
    }

    #[test]
    fn test_save_rejects_invalid_json_without_touching_the_file() {
        let path = std::env::temp_dir().join(format!("restful-unit-{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        fs::write(path, "keep me").unwrap();

        let result = save(OutputFormat::Json, path, b"<html>");
        assert!(matches!(result, Err(Error::DecodeError(_))));
        assert_eq!(fs::read_to_string(path).unwrap(), "keep me");

        save(OutputFormat::Json, path, b"{\"id\":1}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{\n  \"id\": 1\n}");
        fs::remove_file(path).unwrap();
    }
}
