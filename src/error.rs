/*
 * Error Module
 *
 * Errors of the particle field. Stepping and drawing never fail; errors
 * only come up while mounting the field onto a host surface.
 */

use std::fmt;

use crate::driver::DriverState;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    // The host could not provide a drawing surface
    SurfaceUnavailable,
    // Zero, negative or non-finite size
    InvalidViewport { width: f32, height: f32 },
    // Mount on a driver that already left Idle
    NotIdle(DriverState),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::SurfaceUnavailable => write!(f, "No drawing surface available; the particle field is disabled"),
            FieldError::InvalidViewport { width, height } => {
                write!(f, "Invalid viewport size {}x{}", width, height)
            }
            FieldError::NotIdle(state) => write!(f, "Cannot mount a driver in the {:?} state", state),
        }
    }
}

impl std::error::Error for FieldError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        assert!(FieldError::SurfaceUnavailable.to_string().contains("disabled"));
        assert_eq!(
            FieldError::InvalidViewport { width: 0.0, height: 600.0 }.to_string(),
            "Invalid viewport size 0x600"
        );
        assert!(FieldError::NotIdle(DriverState::Running).to_string().contains("Running"));
    }
}
