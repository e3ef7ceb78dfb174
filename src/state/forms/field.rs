//! Form field value objects

use std::path::Path;

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// One of a fixed list of options; `None` until the user picks one
    Choice {
        options: &'static [&'static str],
        selected: Option<usize>,
    },
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// How a text value is edited and sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Line,
    Email,
    Multiline,
    /// Path to a local file sent as a multipart attachment
    File,
    Choice,
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Name the backend expects in the multipart body
    pub name: &'static str,
    pub label: &'static str,
    pub value: FieldValue,
    pub kind: FieldKind,
    pub required: bool,
}

impl FormField {
    fn with_kind(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            value: FieldValue::Text(String::new()),
            kind,
            required: false,
        }
    }

    /// Create a new single-line text field
    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Line)
    }

    pub fn email(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Email)
    }

    pub fn multiline(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Multiline)
    }

    pub fn file(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::File)
    }

    /// Create a new choice field; digits pick an option, space cycles
    pub fn choice(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            value: FieldValue::Choice {
                options,
                selected: None,
            },
            kind: FieldKind::Choice,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn is_multiline(&self) -> bool {
        self.kind == FieldKind::Multiline
    }

    /// Get the text value (the selected option for choice fields)
    pub fn as_text(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) => s,
            FieldValue::Choice { options, selected } => {
                selected.and_then(|i| options.get(i).copied()).unwrap_or("")
            }
        }
    }

    /// Set the text value (ignored for choice fields)
    pub fn set_text(&mut self, value: String) {
        if let FieldValue::Text(s) = &mut self.value {
            *s = value;
        }
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        match &mut self.value {
            FieldValue::Text(s) => s.push(c),
            FieldValue::Choice { options, selected } => {
                if c == ' ' {
                    let next = selected.map_or(0, |i| (i + 1) % options.len().max(1));
                    *selected = Some(next);
                } else if let Some(d) = c.to_digit(10) {
                    let index = d as usize;
                    if (1..=options.len()).contains(&index) {
                        *selected = Some(index - 1);
                    }
                }
            }
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        match &mut self.value {
            FieldValue::Text(s) => {
                s.pop();
            }
            FieldValue::Choice { selected, .. } => *selected = None,
        }
    }

    /// Clear the field value
    pub fn clear(&mut self) {
        match &mut self.value {
            FieldValue::Text(s) => s.clear(),
            FieldValue::Choice { selected, .. } => *selected = None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().trim().is_empty()
    }

    /// Whether a file field points at something readable
    pub fn file_exists(&self) -> bool {
        Path::new(self.as_text().trim()).is_file()
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match &self.value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Choice { options, selected } => match selected {
                Some(i) => options.get(*i).copied().unwrap_or_default().to_string(),
                None => options
                    .iter()
                    .enumerate()
                    .map(|(i, option)| format!("{} {option}", i + 1))
                    .collect::<Vec<_>>()
                    .join("  "),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: &[&str] = &["Engineer", "Designer", "Analyst"];

    #[test]
    fn test_text_push_pop_clear() {
        let mut field = FormField::text("firstName", "First Name");
        field.push_char('A');
        field.push_char('d');
        field.push_char('a');
        assert_eq!(field.as_text(), "Ada");
        field.pop_char();
        assert_eq!(field.as_text(), "Ad");
        field.clear();
        assert!(field.is_empty());
    }

    #[test]
    fn test_required_builder() {
        assert!(!FormField::text("phone", "Phone").required);
        assert!(FormField::email("email", "Email").required().required);
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        let mut field = FormField::multiline("message", "Message");
        field.set_text("  \n ".to_string());
        assert!(field.is_empty());
        assert!(field.is_multiline());
    }

    #[test]
    fn test_choice_digit_selects_option() {
        let mut field = FormField::choice("position", "Position", ROLES);
        assert!(field.is_empty());
        field.push_char('2');
        assert_eq!(field.as_text(), "Designer");
        field.push_char('9'); // out of range, ignored
        assert_eq!(field.as_text(), "Designer");
    }

    #[test]
    fn test_choice_space_cycles() {
        let mut field = FormField::choice("position", "Position", ROLES);
        field.push_char(' ');
        assert_eq!(field.as_text(), "Engineer");
        field.push_char(' ');
        field.push_char(' ');
        field.push_char(' ');
        assert_eq!(field.as_text(), "Engineer");
    }

    #[test]
    fn test_choice_backspace_unselects() {
        let mut field = FormField::choice("position", "Position", ROLES);
        field.push_char('1');
        field.pop_char();
        assert!(field.is_empty());
    }

    #[test]
    fn test_choice_display_lists_options_until_selected() {
        let mut field = FormField::choice("position", "Position", ROLES);
        assert_eq!(field.display_value(), "1 Engineer  2 Designer  3 Analyst");
        field.push_char('3');
        assert_eq!(field.display_value(), "Analyst");
    }

    #[test]
    fn test_set_text_ignored_for_choice() {
        let mut field = FormField::choice("position", "Position", ROLES);
        field.set_text("Astronaut".to_string());
        assert!(field.is_empty());
    }

    #[test]
    fn test_missing_file_does_not_exist() {
        let mut field = FormField::file("resume", "Resume");
        field.set_text("/definitely/not/here.pdf".to_string());
        assert!(!field.file_exists());
    }
}
