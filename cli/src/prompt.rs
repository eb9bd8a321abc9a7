//! Line-oriented interactive prompts.
//!
//! Each field is driven by a small state machine:
//!
//! ```text
//! Awaiting --read--> Validating --ok--> Accepted
//!    ^                   |
//!    +------ Retry <-----+ (invalid, or empty when required)
//! ```
//!
//! Empty input accepts "no value" for optional fields. End of input while a
//! field is still awaiting an answer is an [`io::ErrorKind::UnexpectedEof`]
//! error, so a command never acts on a partially answered form.

use std::io::{self, BufRead, Write};

use construction_core::ValidationError;

/// Reads answers from `input` and writes prompts and retry messages to
/// `output`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

enum FieldState<T> {
    Awaiting,
    Validating(String),
    Retry(String),
    Accepted(Option<T>),
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks until `parse` accepts a non-empty answer.
    pub fn required<T>(
        &mut self,
        label: &str,
        parse: impl Fn(&str) -> Result<T, ValidationError>,
    ) -> io::Result<T> {
        loop {
            if let Some(value) = self.field(label, false, &parse)? {
                return Ok(value);
            }
        }
    }

    /// Asks until `parse` accepts the answer or the answer is empty.
    pub fn optional<T>(
        &mut self,
        label: &str,
        parse: impl Fn(&str) -> Result<T, ValidationError>,
    ) -> io::Result<Option<T>> {
        self.field(&format!("{label} (optional)"), true, &parse)
    }

    pub fn text(&mut self, label: &str) -> io::Result<String> {
        self.required(label, |raw| Ok(raw.to_string()))
    }

    pub fn optional_text(&mut self, label: &str) -> io::Result<Option<String>> {
        self.optional(label, |raw| Ok(raw.to_string()))
    }

    /// Yes/no question defaulting to no.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "{question} [y/N]: ")?;
        self.output.flush()?;
        let answer = self.read_answer()?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }

    fn field<T>(
        &mut self,
        label: &str,
        optional: bool,
        parse: &impl Fn(&str) -> Result<T, ValidationError>,
    ) -> io::Result<Option<T>> {
        let mut state = FieldState::Awaiting;
        loop {
            state = match state {
                FieldState::Awaiting => {
                    write!(self.output, "{label}: ")?;
                    self.output.flush()?;
                    FieldState::Validating(self.read_answer()?)
                }
                FieldState::Validating(raw) => {
                    let raw = raw.trim();
                    if raw.is_empty() {
                        if optional {
                            FieldState::Accepted(None)
                        } else {
                            FieldState::Retry("a value is required".to_string())
                        }
                    } else {
                        match parse(raw) {
                            Ok(value) => FieldState::Accepted(Some(value)),
                            Err(err) => FieldState::Retry(err.to_string()),
                        }
                    }
                }
                FieldState::Retry(message) => {
                    writeln!(self.output, "Error: {message}. Please try again.")?;
                    FieldState::Awaiting
                }
                FieldState::Accepted(value) => return Ok(value),
            };
        }
    }

    fn read_answer(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before all prompts were answered",
            ));
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use construction_core::{parse_amount, parse_date, parse_quantity};

    use super::*;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn transcript(prompter: &Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(prompter.output.clone()).unwrap()
    }

    #[test]
    fn test_required_retries_until_valid() {
        let mut p = prompter("abc\n-2\n12.5\n");
        let value = p.required("Quantity", parse_quantity).unwrap();
        assert_eq!(value, 12.5);

        let out = transcript(&p);
        assert_eq!(out.matches("Quantity: ").count(), 3);
        assert_eq!(out.matches("Please try again.").count(), 2);
    }

    #[test]
    fn test_required_rejects_blank() {
        let mut p = prompter("\n   \nCement\n");
        assert_eq!(p.text("Material name").unwrap(), "Cement");
        assert!(transcript(&p).contains("Error: a value is required. Please try again."));
    }

    #[test]
    fn test_optional_blank_skips() {
        let mut p = prompter("\n");
        assert_eq!(p.optional("Budget", parse_amount).unwrap(), None);
        assert!(transcript(&p).contains("Budget (optional): "));
    }

    #[test]
    fn test_optional_invalid_retries() {
        let mut p = prompter("03/01/2024\n2024-03-01\n");
        let date = p.optional("Start date", parse_date).unwrap();
        assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(transcript(&p).contains("not a valid date"));
    }

    #[test]
    fn test_eof_is_an_error() {
        let mut p = prompter("abc\n");
        let err = p.required("Quantity", parse_quantity).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_confirm_defaults_to_no() {
        assert!(prompter("y\n").confirm("Delete?").unwrap());
        assert!(prompter("YES\n").confirm("Delete?").unwrap());
        assert!(!prompter("\n").confirm("Delete?").unwrap());
        assert!(!prompter("maybe\n").confirm("Delete?").unwrap());
        assert!(prompter("").confirm("Delete?").is_err());
    }

    #[test]
    fn test_text_trims_answer() {
        let mut p = prompter("  Riverside  \n");
        assert_eq!(p.text("Project name").unwrap(), "Riverside");
    }
}
