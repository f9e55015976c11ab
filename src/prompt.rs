//! Line-oriented interactive prompts.
//!
//! [`Prompter`] is generic over its reader and writer so the whole selection
//! flow can be driven from a `Cursor` in tests.  Every prompt reads exactly
//! one line.  Typing `q` or `quit` (any case) at any prompt except the
//! password prompt aborts the session with [`NasError::Cancelled`], as does
//! end-of-input.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use console::style;
use rand::{Rng, distr::Alphanumeric};

use crate::{error::NasError, ui::icon_err};

/// Length of the random part of a generated password.
pub const GENERATED_PASSWORD_LEN: usize = 12;

pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    #[cfg(test)]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Print a line of menu or status text.
    pub fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}").context("writing to terminal")
    }

    /// Show `prompt`, read one line, and return it trimmed.
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.writer, "{prompt}").context("writing to terminal")?;
        self.writer.flush().context("flushing terminal")?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("reading from terminal")?;
        if read == 0 {
            return Err(NasError::Cancelled.into());
        }
        Ok(line.trim().to_string())
    }

    fn ask_quittable(&mut self, prompt: &str) -> Result<String> {
        let answer = self.ask(prompt)?;
        if is_quit(&answer) {
            return Err(NasError::Cancelled.into());
        }
        Ok(answer)
    }

    /// Free-form input; empty input yields `default`.
    pub fn input(&mut self, prompt: &str, default: &str) -> Result<String> {
        let answer = self.ask_quittable(&format!("{}", style(format!("{prompt}: ")).cyan()))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    /// Yes/no question.  Only `y`/`yes` (any case) count as yes.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.ask_quittable(&format!("{}", style(format!("{prompt} (y/N): ")).yellow()))?;
        Ok(is_yes(&answer))
    }

    /// Read a password.  Empty input generates `<salt>_<12 alphanumerics>`.
    ///
    /// Returns the password and whether it was generated.
    pub fn password(&mut self, prompt: &str, salt: &str) -> Result<(String, bool)> {
        let answer = self.ask(&format!(
            "{}",
            style(format!("{prompt} [Press Enter to auto-generate]: ")).cyan()
        ))?;
        if !answer.is_empty() {
            return Ok((answer, false));
        }
        let generated = generate_password(salt, &mut rand::rng());
        self.say(&format!(
            "{} Generated password.  It is shown once in the final summary.",
            crate::ui::icon_info()
        ))?;
        Ok((generated, true))
    }

    /// Ask for a destination sub-path of at most two segments, re-prompting
    /// until one is given.  Empty input yields `default`.
    pub fn custom_destination_path(&mut self, default: &str) -> Result<String> {
        let prompt = format!(
            "Enter custom destination path (max 2 levels). Default: '{default}'\n\
             Example: my_projects/personal_backups\n\
             [Press Enter for default]"
        );
        loop {
            let answer = self.input(&prompt, "")?;
            match validate_subpath(&answer) {
                Some(SubPath::Default) => return Ok(default.to_string()),
                Some(SubPath::Custom(path)) => return Ok(path),
                None => self.say(&format!(
                    "{} Path cannot be more than two levels deep. Please try again.",
                    icon_err()
                ))?,
            }
        }
    }
}

// ─── Pure helpers ─────────────────────────────────────────────────────────────

pub fn is_quit(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "q" | "quit")
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubPath {
    Default,
    Custom(String),
}

/// Check a user-supplied sub-path.  Leading and trailing slashes are
/// stripped; more than two non-empty segments is rejected (`None`).
pub fn validate_subpath(input: &str) -> Option<SubPath> {
    let trimmed = input.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Some(SubPath::Default);
    }
    let segments = trimmed.split('/').filter(|s| !s.is_empty()).count();
    (segments <= 2).then(|| SubPath::Custom(trimmed.to_string()))
}

pub fn generate_password<G: Rng>(salt: &str, rng: &mut G) -> String {
    let suffix: String = (0..GENERATED_PASSWORD_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();
    format!("{salt}_{suffix}")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn is_cancelled(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<NasError>(), Some(NasError::Cancelled))
    }

    // ── input ─────────────────────────────────────────────────────────────────

    #[test]
    fn input_returns_trimmed_answer() {
        assert_eq!(prompter("  hello \n").input("Name", "x").unwrap(), "hello");
    }

    #[test]
    fn input_empty_uses_default() {
        assert_eq!(prompter("\n").input("Name", "fallback").unwrap(), "fallback");
    }

    #[test]
    fn quit_words_cancel() {
        for word in ["q\n", "Q\n", "quit\n", "QUIT\n", " Quit \n"] {
            let err = prompter(word).input("Name", "").unwrap_err();
            assert!(is_cancelled(&err), "{word:?}");
        }
    }

    #[test]
    fn end_of_input_cancels() {
        assert!(is_cancelled(&prompter("").input("Name", "").unwrap_err()));
    }

    // ── confirm ───────────────────────────────────────────────────────────────

    #[test]
    fn confirm_accepts_only_y_and_yes() {
        assert!(prompter("y\n").confirm("Go?").unwrap());
        assert!(prompter("YES\n").confirm("Go?").unwrap());
        assert!(!prompter("\n").confirm("Go?").unwrap());
        assert!(!prompter("n\n").confirm("Go?").unwrap());
        assert!(!prompter("sure\n").confirm("Go?").unwrap());
    }

    #[test]
    fn confirm_honours_quit() {
        assert!(is_cancelled(&prompter("q\n").confirm("Go?").unwrap_err()));
    }

    // ── password ──────────────────────────────────────────────────────────────

    #[test]
    fn password_verbatim_when_given() {
        let (pw, generated) = prompter("  s3cret q \n").password("Pw", "docs").unwrap();
        assert_eq!(pw, "s3cret q");
        assert!(!generated);
    }

    #[test]
    fn password_q_is_a_password_not_a_quit() {
        let (pw, _) = prompter("q\n").password("Pw", "docs").unwrap();
        assert_eq!(pw, "q");
    }

    #[test]
    fn password_generated_on_empty() {
        let (pw, generated) = prompter("\n").password("Pw", "my_docs").unwrap();
        assert!(generated);
        let suffix = pw.strip_prefix("my_docs_").expect("salt prefix");
        assert_eq!(suffix.len(), GENERATED_PASSWORD_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_passwords_differ_per_seed() {
        let a = generate_password("x", &mut StdRng::seed_from_u64(1));
        let b = generate_password("x", &mut StdRng::seed_from_u64(2));
        assert_ne!(a, b);
        assert_eq!(a.len(), 2 + GENERATED_PASSWORD_LEN);
    }

    // ── sub-path validation ───────────────────────────────────────────────────

    #[test]
    fn subpath_empty_is_default() {
        assert_eq!(validate_subpath(""), Some(SubPath::Default));
        assert_eq!(validate_subpath("///"), Some(SubPath::Default));
    }

    #[test]
    fn subpath_up_to_two_segments_accepted() {
        assert_eq!(validate_subpath("work"), Some(SubPath::Custom("work".into())));
        assert_eq!(
            validate_subpath("/work/personal/"),
            Some(SubPath::Custom("work/personal".into()))
        );
    }

    #[test]
    fn subpath_three_segments_rejected() {
        assert_eq!(validate_subpath("a/b/c"), None);
        assert_eq!(validate_subpath("/a/b/c/d/"), None);
    }

    #[test]
    fn custom_path_reprompts_until_valid() {
        let mut p = prompter("a/b/c\nx/y/z/w\nprojects/2024\n");
        assert_eq!(p.custom_destination_path("manual_nas_backup").unwrap(), "projects/2024");
        let shown = String::from_utf8(p.into_writer()).unwrap();
        assert_eq!(shown.matches("more than two levels").count(), 2);
    }

    #[test]
    fn custom_path_empty_returns_default() {
        assert_eq!(
            prompter("\n").custom_destination_path("manual_nas_encrypted").unwrap(),
            "manual_nas_encrypted"
        );
    }
}
