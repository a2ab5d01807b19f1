use crate::model::{Meal, MealId, PortionSize};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Sales tax applied to the subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Flat delivery fee charged on any non-empty cart.
pub const DELIVERY_FEE: Decimal = Decimal::from_parts(599, 0, 0, false, 2);

/// One meal in the cart. Name and base price are snapshotted when the line
/// is first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub meal_id: MealId,
    pub name: String,
    pub base_price: Decimal,
    pub quantity: u32,
    pub portion: PortionSize,
}

impl CartLine {
    /// Unrounded `quantity × base_price × multiplier`.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.base_price * self.portion.multiplier()
    }
}

/// Insertion-ordered cart, at most one line per meal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, meal_id: MealId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.meal_id == meal_id)
    }

    /// Total number of meals across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Adds one of `meal`. An existing line gains one unit and keeps its
    /// portion. Returns the line's new quantity.
    pub fn add(&mut self, meal: &Meal, portion: PortionSize) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|line| line.meal_id == meal.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }
        self.lines.push(CartLine {
            meal_id: meal.id,
            name: meal.name.clone(),
            base_price: meal.base_price,
            quantity: 1,
            portion,
        });
        1
    }

    /// Sets a line's quantity exactly; zero or less removes the line.
    /// Unknown meals are ignored. Returns whether the cart changed.
    pub fn set_quantity(&mut self, meal_id: MealId, quantity: i32) -> bool {
        let Some(index) = self.lines.iter().position(|line| line.meal_id == meal_id) else {
            return false;
        };
        match u32::try_from(quantity) {
            Ok(q) if q > 0 => {
                let changed = self.lines[index].quantity != q;
                self.lines[index].quantity = q;
                changed
            }
            _ => {
                self.lines.remove(index);
                true
            }
        }
    }

    /// Removes the line for `meal_id` if present.
    pub fn remove(&mut self, meal_id: MealId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.meal_id != meal_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn price(&self) -> PriceBreakdown {
        PriceBreakdown::for_lines(&self.lines)
    }
}

/// Derived prices for a cart. Recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl PriceBreakdown {
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            delivery_fee: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    /// `subtotal` and `tax` are rounded to cents; `total` is their exact sum
    /// with the delivery fee.
    pub fn for_lines(lines: &[CartLine]) -> Self {
        if lines.is_empty() {
            return Self::zero();
        }
        let subtotal = to_cents(lines.iter().map(CartLine::line_total).sum());
        let tax = to_cents(subtotal * TAX_RATE);
        Self {
            subtotal,
            tax,
            delivery_fee: DELIVERY_FEE,
            total: subtotal + tax + DELIVERY_FEE,
        }
    }
}

fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
