use serde::{Deserialize, Serialize};

/// Controls sampled once per tick by the frontend.
///
/// `left`/`right`/`jump` are level-triggered (held keys). `confirm` and
/// `cancel` are edge-triggered: the frontend sets them only on the tick the
/// key went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub confirm: bool,
    pub cancel: bool,
}

impl FrameInput {
    /// Horizontal axis: -1 (left), 0, +1 (right). Opposing keys cancel out.
    pub fn move_dir(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_keys_cancel() {
        let input = FrameInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(input.move_dir(), 0.0);
    }

    #[test]
    fn single_direction() {
        let left = FrameInput {
            left: true,
            ..Default::default()
        };
        let right = FrameInput {
            right: true,
            ..Default::default()
        };
        assert_eq!(left.move_dir(), -1.0);
        assert_eq!(right.move_dir(), 1.0);
        assert_eq!(FrameInput::default().move_dir(), 0.0);
    }
}
