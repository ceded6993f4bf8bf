//! Deterministic sample products for tests.

use rust_decimal::Decimal;

use crate::category::Category;
use crate::product::NewProduct;

const NAMES: [(&str, &str, Category); 11] = [
    ("Hat", "A red fedora", Category::Cloths),
    ("Pants", "Blue jeans", Category::Cloths),
    ("Shirt", "Cotton t-shirt", Category::Cloths),
    ("Apple", "Granny smith", Category::Food),
    ("Banana", "Ripe and yellow", Category::Food),
    ("Pots", "Cast iron set", Category::Housewares),
    ("Towels", "Set of four", Category::Housewares),
    ("Ford", "Pickup truck", Category::Automotive),
    ("Chevy", "Compact sedan", Category::Automotive),
    ("Hammer", "Claw hammer", Category::Tools),
    ("Wrench", "Adjustable wrench", Category::Tools),
];

/// Produces a repeatable sequence of valid drafts.
///
/// Names repeat every eleven products and availability alternates, so any batch
/// larger than a handful has duplicate names and both availability values.
#[derive(Debug, Default)]
pub struct ProductFactory {
    seq: usize,
}

impl ProductFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self) -> NewProduct {
        let (name, description, category) = NAMES[self.seq % NAMES.len()];
        let cents = 50 + (self.seq as i64 * 1_337) % 199_950;
        let available = self.seq % 2 == 0;
        self.seq += 1;

        NewProduct::new(name, description, Decimal::new(cents, 2), available, category)
            .unwrap_or_else(|e| unreachable!("fixture draft must be valid: {e}"))
    }

    pub fn build_batch(&mut self, n: usize) -> Vec<NewProduct> {
        (0..n).map(|_| self.build()).collect()
    }
}
