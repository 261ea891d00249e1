//! Interactive parameter collection.
//!
//! Asks for the five run parameters in a fixed order, one value per line. Grid dimensions are
//! not asked for and keep their defaults.
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::error::EpigridError;
use crate::parameters::Parameters;

const THREADS_PROMPT: &str = "Enter the number of threads: ";
const ALPHA_PROMPT: &str = "Enter the initial infection ratio (alpha): ";
const BETA_PROMPT: &str = "Enter the infection probability (beta): ";
const OMEGA_PROMPT: &str = "Enter the duration a person remains sick (omega): ";
const DAYS_PROMPT: &str = "Enter the number of simulation days: ";

fn ask<T, R, W>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    name: &str,
) -> Result<T, EpigridError>
where
    T: FromStr,
    R: BufRead,
    W: Write,
{
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(EpigridError::InvalidInput(format!(
            "expected a value for {name}, found end of input"
        )));
    }
    let token = line.trim();
    token
        .parse()
        .map_err(|_| EpigridError::InvalidInput(format!("{name}: cannot parse {token:?}")))
}

/// Prompts on `output` and reads the thread count, alpha, beta, omega and day count from
/// `input`, then validates them.
///
/// # Errors
/// Returns `EpigridError::InvalidInput` for a missing or unparsable value and
/// `EpigridError::InvalidParameter` for a value out of range.
pub fn read_parameters<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Parameters, EpigridError> {
    let threads = ask(input, output, THREADS_PROMPT, "thread count")?;
    let alpha = ask(input, output, ALPHA_PROMPT, "alpha")?;
    let beta = ask(input, output, BETA_PROMPT, "beta")?;
    let omega = ask(input, output, OMEGA_PROMPT, "omega")?;
    let days = ask(input, output, DAYS_PROMPT, "days")?;

    let parameters = Parameters::new(threads, alpha, beta, omega, days);
    parameters.validate()?;
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(text: &str) -> (Result<Parameters, EpigridError>, String) {
        let mut input = Cursor::new(text.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = read_parameters(&mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn reads_all_five_values_in_order() {
        let (result, prompts) = read("4\n0.1\n0.3\n7\n30\n");
        assert_eq!(result.unwrap(), Parameters::new(4, 0.1, 0.3, 7, 30));
        assert_eq!(
            prompts,
            [
                THREADS_PROMPT,
                ALPHA_PROMPT,
                BETA_PROMPT,
                OMEGA_PROMPT,
                DAYS_PROMPT
            ]
            .concat()
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace_and_crlf() {
        let (result, _) = read("  2 \r\n0.5\r\n0\r\n3\r\n0\r\n");
        assert_eq!(result.unwrap(), Parameters::new(2, 0.5, 0.0, 3, 0));
    }

    #[test]
    fn malformed_value_names_the_field() {
        let (result, prompts) = read("4\nlots\n0.3\n7\n30\n");
        match result {
            Err(EpigridError::InvalidInput(message)) => {
                assert_eq!(message, "alpha: cannot parse \"lots\"");
            }
            other => panic!("unexpected result {other:?}"),
        }
        // Stops at the first bad value
        assert!(!prompts.contains(BETA_PROMPT));
    }

    #[test]
    fn negative_days_are_malformed() {
        let (result, _) = read("4\n0.1\n0.3\n7\n-1\n");
        assert!(matches!(result, Err(EpigridError::InvalidInput(_))));
    }

    #[test]
    fn truncated_input() {
        let (result, _) = read("4\n0.1\n");
        match result {
            Err(EpigridError::InvalidInput(message)) => {
                assert!(message.contains("beta"));
                assert!(message.contains("end of input"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let (result, _) = read("0\n0.1\n0.3\n7\n30\n");
        assert!(matches!(result, Err(EpigridError::InvalidParameter(_))));
        let (result, _) = read("1\n0.1\n0.3\n0\n30\n");
        assert!(matches!(result, Err(EpigridError::InvalidParameter(_))));
    }
}
