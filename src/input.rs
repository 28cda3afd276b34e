/// Text buffer for a number being typed.
///
/// The buffer only ever holds text that parses as a finite number, or
/// nothing. Edits that would break this are rejected and leave it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberInput {
    text: String,
}

impl NumberInput {
    pub fn new() -> Self {
        NumberInput::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Appends a typed character. Returns whether it was accepted.
    pub fn push(&mut self, c: char) -> bool {
        let mut candidate = self.text.clone();
        candidate.push(c);
        self.replace(candidate)
    }

    /// Appends pasted text as a whole. Returns whether it was accepted.
    pub fn paste(&mut self, pasted: &str) -> bool {
        let candidate = format!("{}{}", self.text, pasted.trim());
        self.replace(candidate)
    }

    /// Removes the last character. Returns whether the buffer changed.
    ///
    /// Further trailing characters go too if the shorter text would not be a
    /// number, so `1e5` becomes `1`.
    pub fn backspace(&mut self) -> bool {
        if self.text.pop().is_none() {
            return false;
        }
        while !self.text.is_empty() && parse_number(&self.text).is_none() {
            self.text.pop();
        }
        true
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Value of the buffer, if it holds one.
    pub fn value(&self) -> Option<f64> {
        parse_number(&self.text)
    }

    /// Takes the value out and clears the buffer.
    ///
    /// An empty buffer yields `None` and stays empty.
    pub fn take(&mut self) -> Option<f64> {
        let value = self.value()?;
        self.clear();
        Some(value)
    }

    fn replace(&mut self, candidate: String) -> bool {
        if candidate.is_empty() || parse_number(&candidate).is_some() {
            self.text = candidate;
            true
        } else {
            false
        }
    }
}

/// Parses `text` as a finite number.
///
/// `inf`, `NaN` and friends parse as `f64` but are not numbers a dataset can
/// hold, so they are refused.
pub fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}
