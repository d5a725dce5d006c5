//! The CPU move guard: wraps an in-flight move in a cancellation token and
//! guarantees that starting a new game or a new move cancels whatever was
//! still running, so no zombie search ever commits a move after the fact.

use wall_e_engine::CancellationToken;

pub struct MoveGuard {
    current: Option<CancellationToken>,
}

impl MoveGuard {
    pub fn new() -> Self {
        MoveGuard { current: None }
    }

    /// Cancel anything in flight and hand back a fresh token for the move
    /// about to start.
    pub fn begin_move(&mut self) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        token
    }

    /// Cancel any pending move without starting a new one — used by `newGame`.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    pub fn is_move_in_flight(&self) -> bool {
        self.current.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

impl Default for MoveGuard {
    fn default() -> Self {
        MoveGuard::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_a_new_move_cancels_the_previous_token() {
        let mut guard = MoveGuard::new();
        let first = guard.begin_move();
        assert!(!first.is_cancelled());
        let _second = guard.begin_move();
        assert!(first.is_cancelled());
    }

    #[test]
    fn cancel_clears_the_in_flight_flag() {
        let mut guard = MoveGuard::new();
        guard.begin_move();
        assert!(guard.is_move_in_flight());
        guard.cancel();
        assert!(!guard.is_move_in_flight());
    }
}
