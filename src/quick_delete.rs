//! Double-tap delete gesture: the designated key pressed twice within the
//! window, without modifiers, while the active block is empty or the caret
//! sits at offset 0, deletes the block. A late second tap is just a first
//! tap again; any other key resets the tracker.

use crate::helpers::now_millis;

pub const DOUBLE_TAP_WINDOW_MS: i64 = 500;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuickDeleteDetector {
    designated_key: String,
    last_press_ms: Option<i64>,
}

impl QuickDeleteDetector {
    pub fn new(designated_key: &str) -> Self {
        Self {
            designated_key: designated_key.to_string(),
            last_press_ms: None,
        }
    }

    /// Feeds one key press; `true` means the gesture completed and the
    /// caller should delete the active block. `at_boundary` is whether the
    /// block's text is empty or the caret sits at offset 0.
    pub fn observe(&mut self, key: &str, has_modifier: bool, at_boundary: bool, now_ms: i64) -> bool {
        if key != self.designated_key || has_modifier || !at_boundary {
            self.last_press_ms = None;
            return false;
        }

        let within_window = self
            .last_press_ms
            .is_some_and(|last| now_ms.saturating_sub(last) <= DOUBLE_TAP_WINDOW_MS);
        if within_window {
            self.last_press_ms = None;
            true
        } else {
            self.last_press_ms = Some(now_ms);
            false
        }
    }

    /// [`Self::observe`] against the wall clock.
    pub fn observe_now(&mut self, key: &str, has_modifier: bool, at_boundary: bool) -> bool {
        self.observe(key, has_modifier, at_boundary, now_millis())
    }

    pub fn reset(&mut self) {
        self.last_press_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> QuickDeleteDetector {
        QuickDeleteDetector::new("Backspace")
    }

    #[test]
    fn double_tap_within_window_fires() {
        let mut quick = detector();
        assert!(!quick.observe("Backspace", false, true, 1_000));
        assert!(quick.observe("Backspace", false, true, 1_400));
    }

    #[test]
    fn late_second_tap_does_not_fire() {
        let mut quick = detector();
        assert!(!quick.observe("Backspace", false, true, 1_000));
        assert!(!quick.observe("Backspace", false, true, 1_600));
        // The late tap became the new first tap.
        assert!(quick.observe("Backspace", false, true, 1_900));
    }

    #[test]
    fn firing_resets_the_tracker() {
        let mut quick = detector();
        quick.observe("Backspace", false, true, 0);
        assert!(quick.observe("Backspace", false, true, 100));
        // A third tap starts over rather than chaining deletes.
        assert!(!quick.observe("Backspace", false, true, 200));
    }

    #[test]
    fn other_keys_reset_tracking() {
        let mut quick = detector();
        quick.observe("Backspace", false, true, 0);
        quick.observe("a", false, true, 100);
        assert!(!quick.observe("Backspace", false, true, 200));
    }

    #[test]
    fn modifier_combinations_do_not_count() {
        let mut quick = detector();
        quick.observe("Backspace", false, true, 0);
        assert!(!quick.observe("Backspace", true, true, 100));
        assert!(!quick.observe("Backspace", false, true, 200));
    }

    #[test]
    fn mid_text_presses_do_not_count() {
        let mut quick = detector();
        quick.observe("Backspace", false, true, 0);
        assert!(!quick.observe("Backspace", false, false, 100));
        assert!(!quick.observe("Backspace", false, true, 200));
    }
}
