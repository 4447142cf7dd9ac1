//! # Quantity Resolver
//!
//! Products sold by the meter or square meter are added through a small
//! calculator: either length × width, or a manually typed quantity.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Piso Cerâmico 60x60 (m²)                    │
//! │                                              │
//! │  Length [ 3.00 ]  ×  Width [ 4.00 ]          │
//! │  ───────────── or type it ────────────────   │
//! │  Manual [      ]                             │
//! │                                              │
//! │  Quantity: 12 m²             [ Add to cart ] │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The two entry modes are mutually exclusive: typing a manual value zeroes
//! length and width, typing length or width zeroes the manual value.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::quantity::Quantity;

/// `manual > 0 ? manual : length × width`, rejected when not positive.
///
/// ```rust
/// use construflow_core::Quantity;
/// use construflow_core::measure::resolve_quantity;
///
/// let q = |n| Quantity::from_whole(n);
/// assert_eq!(resolve_quantity(q(3), q(4), q(0)).unwrap(), q(12));
/// assert_eq!(resolve_quantity(q(3), q(4), q(5)).unwrap(), q(5));
/// assert!(resolve_quantity(q(0), q(0), q(0)).is_err());
/// ```
pub fn resolve_quantity(
    length: Quantity,
    width: Quantity,
    manual: Quantity,
) -> Result<Quantity, ValidationError> {
    let resolved = if manual.is_positive() {
        manual
    } else {
        length.times(width)?
    };

    if !resolved.is_positive() {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    Ok(resolved)
}

/// Calculator state for one measured product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureInput {
    length: Quantity,
    width: Quantity,
    manual: Quantity,
}

impl MeasureInput {
    pub fn new() -> Self {
        MeasureInput::default()
    }

    pub fn set_length(&mut self, length: Quantity) {
        self.length = length;
        self.manual = Quantity::zero();
    }

    pub fn set_width(&mut self, width: Quantity) {
        self.width = width;
        self.manual = Quantity::zero();
    }

    pub fn set_manual(&mut self, manual: Quantity) {
        self.manual = manual;
        self.length = Quantity::zero();
        self.width = Quantity::zero();
    }

    pub fn length(&self) -> Quantity {
        self.length
    }

    pub fn width(&self) -> Quantity {
        self.width
    }

    pub fn manual(&self) -> Quantity {
        self.manual
    }

    /// Preview shown under the inputs. May be zero or negative; `None`
    /// when length × width is out of range.
    pub fn preview(&self) -> Option<Quantity> {
        if self.manual.is_positive() {
            Some(self.manual)
        } else {
            self.length.times(self.width).ok()
        }
    }

    pub fn resolve(&self) -> Result<Quantity, ValidationError> {
        resolve_quantity(self.length, self.width, self.manual)
    }

    /// Resolves and, on success, resets every input to zero.
    /// On failure the inputs are kept so the user can correct them.
    pub fn submit(&mut self) -> Result<Quantity, ValidationError> {
        let quantity = self.resolve()?;
        *self = MeasureInput::default();
        Ok(quantity)
    }
}
