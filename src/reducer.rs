// src/reducer.rs
use crate::error::PortfolioError;
use crate::models::{PortfolioState, PositionId, PositionInput, StockPosition};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Add { id: PositionId, input: PositionInput },
    Update { id: PositionId, input: PositionInput },
    Delete(PositionId),
    Replace(Vec<StockPosition>),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Add { .. } => "add",
            Action::Update { .. } => "update",
            Action::Delete(_) => "delete",
            Action::Replace(_) => "replace",
        }
    }
}

pub fn apply(
    positions: &[StockPosition],
    action: Action,
) -> Result<Vec<StockPosition>, PortfolioError> {
    match action {
        Action::Add { id, input } => {
            input.validate()?;
            if positions.iter().any(|p| p.id == id) {
                return Err(PortfolioError::Validation(format!("duplicate id {}", id)));
            }
            let mut next = positions.to_vec();
            next.push(input.into_position(id));
            Ok(next)
        }
        Action::Update { id, input } => {
            if !positions.iter().any(|p| p.id == id) {
                return Err(PortfolioError::NotFound(id));
            }
            input.validate()?;
            let replacement = input.into_position(id);
            Ok(positions
                .iter()
                .map(|p| if p.id == id { replacement.clone() } else { p.clone() })
                .collect())
        }
        Action::Delete(id) => Ok(positions.iter().filter(|p| p.id != id).cloned().collect()),
        Action::Replace(next) => {
            let mut seen = HashSet::new();
            for p in &next {
                p.validate()?;
                if !seen.insert(p.id) {
                    return Err(PortfolioError::Validation(format!("duplicate id {}", p.id)));
                }
            }
            Ok(next)
        }
    }
}

/// Folds the outcome of [`apply`] into a settled snapshot: success clears the
/// error, failure records it and keeps the old positions.
pub fn settle(
    state: &PortfolioState,
    outcome: &Result<Vec<StockPosition>, PortfolioError>,
) -> PortfolioState {
    match outcome {
        Ok(positions) => PortfolioState::with_positions(positions.clone()),
        Err(e) => PortfolioState {
            positions: state.positions.clone(),
            loading: false,
            error: Some(e.to_string()),
        },
    }
}

pub fn reduce(state: &PortfolioState, action: Action) -> PortfolioState {
    settle(state, &apply(&state.positions, action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_positions;

    fn seeded() -> PortfolioState {
        PortfolioState::with_positions(seed_positions())
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let state = seeded();
        let next = reduce(
            &state,
            Action::Add {
                id: PositionId(6),
                input: PositionInput::new("NFLX", "Netflix, Inc.", 3.0, 410.0),
            },
        );
        assert_eq!(next.positions.len(), 6);
        let last = next.positions.last().unwrap();
        assert_eq!(last.symbol, "NFLX");
        assert_eq!(last.current_price, 410.0);
        assert_eq!(next.error, None);
        // previous snapshot is unchanged
        assert_eq!(state.positions.len(), 5);
    }

    #[test]
    fn add_rejects_zero_quantity_and_keeps_positions() {
        let state = seeded();
        let next = reduce(
            &state,
            Action::Add {
                id: PositionId(6),
                input: PositionInput::new("NFLX", "Netflix, Inc.", 0.0, 410.0),
            },
        );
        assert_eq!(next.positions, state.positions);
        assert!(next.error.unwrap().contains("quantity"));
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let result = apply(
            &seed_positions(),
            Action::Add {
                id: PositionId(3),
                input: PositionInput::new("NFLX", "Netflix, Inc.", 1.0, 410.0),
            },
        );
        assert!(matches!(result, Err(PortfolioError::Validation(_))));
    }

    #[test]
    fn update_replaces_fields_and_keeps_id() {
        let next = reduce(
            &seeded(),
            Action::Update {
                id: PositionId(2),
                input: PositionInput::new("GOOG", "Alphabet Class C", 7.0, 2700.0),
            },
        );
        let updated = next.find(PositionId(2)).unwrap();
        assert_eq!(updated.symbol, "GOOG");
        assert_eq!(updated.quantity, 7.0);
        assert_eq!(updated.current_price, 2700.0);
        assert_eq!(next.positions[1].id, PositionId(2));
    }

    #[test]
    fn update_unknown_id_sets_error() {
        let state = seeded();
        let next = reduce(
            &state,
            Action::Update {
                id: PositionId(99),
                input: PositionInput::new("GOOG", "Alphabet", 1.0, 1.0),
            },
        );
        assert_eq!(next.positions, state.positions);
        assert_eq!(next.error.as_deref(), Some("no position with id 99"));
    }

    #[test]
    fn delete_missing_id_is_a_noop() {
        let state = seeded();
        let next = reduce(&state, Action::Delete(PositionId(42)));
        assert_eq!(next.positions, state.positions);
        assert_eq!(next.error, None);
    }

    #[test]
    fn success_clears_previous_error() {
        let mut state = seeded();
        state.error = Some("stale".to_string());
        let next = reduce(&state, Action::Delete(PositionId(1)));
        assert_eq!(next.error, None);
        assert!(next.find(PositionId(1)).is_none());
    }

    #[test]
    fn replace_requires_unique_ids() {
        let mut positions = seed_positions();
        positions[1].id = PositionId(1);
        let result = apply(&[], Action::Replace(positions));
        assert!(matches!(result, Err(PortfolioError::Validation(_))));
    }
}
