//! Interactive interview on stdin.
//!
//! Each question is printed to stderr so stdout stays clean for piping.
//! An answer is every line up to the first blank line (or end of input).

use anyhow::{Context, Result};
use epicflow_core::interview::{InterviewAnswers, QUESTIONS};
use std::io::{BufRead, Write};

/// Asks every interview question, re-asking required ones left blank.
///
/// Stops re-asking when input ends; the missing answer is then reported by
/// PRD construction.
pub fn run_interview(input: &mut impl BufRead) -> Result<InterviewAnswers> {
    let mut answers = InterviewAnswers::default();
    let mut stderr = std::io::stderr();

    for question in QUESTIONS {
        let mut answer = String::new();
        let mut exhausted = false;

        while answer.is_empty() && !exhausted {
            writeln!(stderr, "\n{}", question.prompt)?;
            writeln!(stderr, "(finish with an empty line)")?;
            stderr.flush()?;

            (answer, exhausted) = read_block(input)?;
            if answer.is_empty() && question.required && !exhausted {
                writeln!(stderr, "An answer is required.")?;
            } else {
                break;
            }
        }

        if !answer.is_empty() {
            answers.set(question.key, answer);
        }
    }

    Ok(answers)
}

/// Reads lines until a blank line. Returns the text and whether input ended.
fn read_block(input: &mut impl BufRead) -> Result<(String, bool)> {
    let mut lines = Vec::new();

    loop {
        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("failed to read answer from stdin")?;
        if read == 0 {
            return Ok((lines.join("\n"), true));
        }

        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            if lines.is_empty() {
                return Ok((String::new(), false));
            }
            return Ok((lines.join("\n"), false));
        }
        lines.push(line.to_string());
    }
}
