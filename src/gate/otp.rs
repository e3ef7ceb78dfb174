//! Six-cell one-time passcode entry

/// Number of cells in a passcode
pub const OTP_LENGTH: usize = 6;

/// Ordered single-character cells with auto-advancing focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpInputGroup {
    cells: [Option<char>; OTP_LENGTH],
    focus: usize,
    /// Reject anything but ASCII digits at the keystroke layer
    digits_only: bool,
    /// Revealed once a code has been sent, hidden again once verified
    pub visible: bool,
}

impl OtpInputGroup {
    pub fn new(digits_only: bool) -> Self {
        Self {
            cells: [None; OTP_LENGTH],
            focus: 0,
            digits_only,
            visible: false,
        }
    }

    /// Concatenation of the filled cells, in order
    ///
    /// Shorter than [`OTP_LENGTH`] while the code is incomplete.
    pub fn read_code(&self) -> String {
        self.cells.iter().flatten().collect()
    }

    /// Type a character into the focused cell and advance
    ///
    /// Returns false when the input policy rejects the character.
    pub fn input_char(&mut self, c: char) -> bool {
        if c.is_whitespace() || c.is_control() {
            return false;
        }
        if self.digits_only && !c.is_ascii_digit() {
            return false;
        }
        self.cells[self.focus] = Some(c);
        if self.focus < OTP_LENGTH - 1 {
            self.focus += 1;
        }
        true
    }

    /// Backspace: empty the focused cell, or retreat if it is already empty
    pub fn backspace(&mut self) {
        if self.cells[self.focus].take().is_none() && self.focus > 0 {
            self.focus -= 1;
        }
    }

    /// Fill consecutive cells from pasted text, skipping rejected characters
    pub fn paste(&mut self, text: &str) {
        for c in text.chars() {
            let was_last = self.focus == OTP_LENGTH - 1 && self.cells[self.focus].is_some();
            if was_last {
                break;
            }
            self.input_char(c);
        }
    }

    pub fn focus_left(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn focus_right(&mut self) {
        if self.focus < OTP_LENGTH - 1 {
            self.focus += 1;
        }
    }

    pub fn set_focus(&mut self, index: usize) {
        self.focus = index.min(OTP_LENGTH - 1);
    }

    /// Empty every cell and focus the first
    pub fn clear(&mut self) {
        self.cells = [None; OTP_LENGTH];
        self.focus = 0;
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn cells(&self) -> &[Option<char>; OTP_LENGTH] {
        &self.cells
    }

    pub fn digits_only(&self) -> bool {
        self.digits_only
    }
}

impl Default for OtpInputGroup {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_typing_advances_focus() {
        let mut otp = OtpInputGroup::default();
        otp.set_focus(2); // cell 3 of 6
        assert!(otp.input_char('7'));
        assert_eq!(otp.focus(), 3); // cell 4
    }

    #[test]
    fn test_backspace_on_empty_cell_retreats() {
        let mut otp = OtpInputGroup::default();
        otp.set_focus(3); // empty cell 4
        otp.backspace();
        assert_eq!(otp.focus(), 2); // cell 3
    }

    #[test]
    fn test_backspace_on_filled_cell_empties_in_place() {
        let mut otp = OtpInputGroup::default();
        otp.input_char('1');
        otp.set_focus(0);
        otp.backspace();
        assert_eq!(otp.focus(), 0);
        assert_eq!(otp.read_code(), "");
    }

    #[test]
    fn test_backspace_on_first_empty_cell_stays() {
        let mut otp = OtpInputGroup::default();
        otp.backspace();
        assert_eq!(otp.focus(), 0);
    }

    #[test]
    fn test_last_cell_keeps_focus() {
        let mut otp = OtpInputGroup::default();
        for c in "123456".chars() {
            otp.input_char(c);
        }
        assert_eq!(otp.focus(), OTP_LENGTH - 1);
        assert_eq!(otp.read_code(), "123456");

        // Typing again overwrites the last cell
        otp.input_char('9');
        assert_eq!(otp.read_code(), "123459");
    }

    #[test]
    fn test_read_code_is_short_while_incomplete() {
        let mut otp = OtpInputGroup::default();
        otp.input_char('4');
        otp.input_char('2');
        assert_eq!(otp.read_code(), "42");
    }

    #[test]
    fn test_digits_only_rejects_letters() {
        let mut otp = OtpInputGroup::new(true);
        assert!(!otp.input_char('a'));
        assert_eq!(otp.focus(), 0);
        assert_eq!(otp.read_code(), "");
    }

    #[test]
    fn test_permissive_policy_accepts_letters() {
        let mut otp = OtpInputGroup::new(false);
        assert!(otp.input_char('a'));
        assert_eq!(otp.read_code(), "a");
        assert!(!otp.input_char(' '));
    }

    #[test]
    fn test_clear_empties_and_refocuses() {
        let mut otp = OtpInputGroup::default();
        otp.paste("1234");
        otp.clear();
        assert_eq!(otp.read_code(), "");
        assert_eq!(otp.focus(), 0);
    }

    #[test]
    fn test_paste_fills_cells_and_stops_when_full() {
        let mut otp = OtpInputGroup::default();
        otp.paste("12 34-5678");
        assert_eq!(otp.read_code(), "123456");
    }

    #[test]
    fn test_arrow_focus_is_bounded() {
        let mut otp = OtpInputGroup::default();
        otp.focus_left();
        assert_eq!(otp.focus(), 0);
        for _ in 0..10 {
            otp.focus_right();
        }
        assert_eq!(otp.focus(), OTP_LENGTH - 1);
    }
}
