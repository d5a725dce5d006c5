//! A small state machine rejecting any move made by the wrong side or while
//! a CPU move is still in flight.

use wall_e_types::{ErrorCode, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingHuman,
    AwaitingCpu,
    Frozen,
}

pub struct TurnValidator {
    state: TurnState,
    human_color: Side,
    cpu_color: Side,
}

impl TurnValidator {
    /// New games always start with the human to move first if they're
    /// White, otherwise the CPU opens.
    pub fn new(human_color: Side) -> Self {
        let cpu_color = human_color.opposite();
        let state = match human_color {
            Side::White => TurnState::AwaitingHuman,
            Side::Black => TurnState::AwaitingCpu,
        };
        TurnValidator {
            state,
            human_color,
            cpu_color,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Validate and, on success, transition out of `AwaitingHuman`.
    pub fn submit_human_move(&mut self, mover: Side, side_to_move: Side) -> Result<(), ErrorCode> {
        if self.state != TurnState::AwaitingHuman {
            return Err(ErrorCode::OffTurn);
        }
        if mover != self.human_color || mover != side_to_move {
            return Err(ErrorCode::WrongColor);
        }
        self.state = TurnState::AwaitingCpu;
        Ok(())
    }

    /// Validate and, on success, transition out of `AwaitingCpu`.
    pub fn submit_cpu_move(&mut self, mover: Side, side_to_move: Side) -> Result<(), ErrorCode> {
        if self.state != TurnState::AwaitingCpu {
            return Err(ErrorCode::OffTurn);
        }
        if mover != self.cpu_color || mover != side_to_move {
            return Err(ErrorCode::WrongColor);
        }
        self.state = TurnState::AwaitingHuman;
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.state = TurnState::Frozen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_move_with_wrong_color_is_rejected() {
        let mut validator = TurnValidator::new(Side::White);
        let result = validator.submit_human_move(Side::Black, Side::White);
        assert_eq!(result, Err(ErrorCode::WrongColor));
    }

    #[test]
    fn cpu_move_before_human_move_is_off_turn() {
        let mut validator = TurnValidator::new(Side::White);
        let result = validator.submit_cpu_move(Side::Black, Side::Black);
        assert_eq!(result, Err(ErrorCode::OffTurn));
    }

    #[test]
    fn alternating_moves_flow_through_both_states() {
        let mut validator = TurnValidator::new(Side::White);
        validator.submit_human_move(Side::White, Side::White).unwrap();
        assert_eq!(validator.state(), TurnState::AwaitingCpu);
        validator.submit_cpu_move(Side::Black, Side::Black).unwrap();
        assert_eq!(validator.state(), TurnState::AwaitingHuman);
    }

    #[test]
    fn frozen_state_rejects_everything() {
        let mut validator = TurnValidator::new(Side::White);
        validator.freeze();
        assert_eq!(
            validator.submit_human_move(Side::White, Side::White),
            Err(ErrorCode::OffTurn)
        );
    }
}
