//! Carbon estimate model and the rule table behind the mocked estimator.
//!
//! Rules are evaluated top to bottom and the first match wins. The final rule
//! always matches, so every dish receives an estimate.

use serde::{Serialize, Serializer};

/// Mass of CO2-equivalent, held in hundredths of a kilogram.
///
/// Integer storage keeps sums exact at the two decimal places reported to
/// clients. Serialises as a JSON number in kilograms.
///
/// # Examples
/// ```
/// use carbon_api::domain::CarbonMass;
///
/// let total = CarbonMass::from_centikilograms(110) + CarbonMass::from_centikilograms(250);
/// assert_eq!(serde_json::to_string(&total).unwrap(), "3.6");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CarbonMass(u32);

impl CarbonMass {
    /// Build a mass from hundredths of a kilogram.
    #[must_use]
    pub const fn from_centikilograms(centikilograms: u32) -> Self {
        Self(centikilograms)
    }

    /// Mass in hundredths of a kilogram.
    #[must_use]
    pub const fn centikilograms(self) -> u32 {
        self.0
    }

    /// Mass in kilograms.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "single conversion to the wire unit"
    )]
    pub fn kilograms(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl std::ops::Add for CarbonMass {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for CarbonMass {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |total, mass| total + mass)
    }
}

impl Serialize for CarbonMass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.kilograms())
    }
}

/// Named component contributing a fixed carbon value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    /// Display name.
    pub name: &'static str,
    /// Carbon contribution in kilograms.
    pub carbon_kg: CarbonMass,
}

impl Ingredient {
    const fn new(name: &'static str, centikilograms: u32) -> Self {
        Self {
            name,
            carbon_kg: CarbonMass::from_centikilograms(centikilograms),
        }
    }
}

/// Carbon estimate returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estimate {
    dish: String,
    estimated_carbon_kg: CarbonMass,
    ingredients: Vec<Ingredient>,
}

impl Estimate {
    /// Build an estimate whose total is the sum of the ingredient values.
    pub fn new(dish: impl Into<String>, ingredients: Vec<Ingredient>) -> Self {
        let estimated_carbon_kg = ingredients.iter().map(|item| item.carbon_kg).sum();
        Self {
            dish: dish.into(),
            estimated_carbon_kg,
            ingredients,
        }
    }

    /// Dish the estimate was computed for.
    #[must_use]
    pub fn dish(&self) -> &str {
        self.dish.as_str()
    }

    /// Total carbon across all ingredients.
    #[must_use]
    pub const fn estimated_carbon_kg(&self) -> CarbonMass {
        self.estimated_carbon_kg
    }

    /// Ingredients in table order.
    #[must_use]
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }
}

/// Dish the image estimator reports until real recognition exists.
pub const IMAGE_FALLBACK_DISH: &str = "Chicken Biryani";

/// Predicate half of an estimation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DishMatcher {
    /// Case-insensitive substring match against the dish name.
    Contains(&'static str),
    /// Matches every dish.
    Always,
}

impl DishMatcher {
    fn matches(self, lowered_dish: &str) -> bool {
        match self {
            Self::Contains(needle) => lowered_dish.contains(needle),
            Self::Always => true,
        }
    }
}

/// One row of the decision table.
#[derive(Debug, Clone, Copy)]
pub struct EstimationRule {
    /// Which dishes the rule applies to.
    pub matcher: DishMatcher,
    /// Ingredients reported when the rule applies.
    pub ingredients: &'static [Ingredient],
}

/// Ordered decision table. The trailing [`DishMatcher::Always`] row is the
/// generic fallback.
pub const ESTIMATION_RULES: &[EstimationRule] = &[
    EstimationRule {
        matcher: DishMatcher::Contains("chicken biryani"),
        ingredients: &[
            Ingredient::new("Rice", 110),
            Ingredient::new("Chicken", 250),
            Ingredient::new("Spices", 20),
            Ingredient::new("Oil", 40),
        ],
    },
    EstimationRule {
        matcher: DishMatcher::Contains("salad"),
        ingredients: &[
            Ingredient::new("Lettuce", 10),
            Ingredient::new("Tomato", 20),
            Ingredient::new("Cucumber", 10),
        ],
    },
    EstimationRule {
        matcher: DishMatcher::Always,
        ingredients: &[
            Ingredient::new("Ingredient1", 50),
            Ingredient::new("Ingredient2", 30),
        ],
    },
];

/// Evaluate `rules` in order and build an estimate from the first match.
///
/// An empty estimate is returned when no rule matches.
#[must_use]
pub fn estimate_with_rules(rules: &[EstimationRule], dish: &str) -> Estimate {
    let lowered = dish.to_lowercase();
    let ingredients = rules
        .iter()
        .find(|rule| rule.matcher.matches(&lowered))
        .map(|rule| rule.ingredients.to_vec())
        .unwrap_or_default();
    Estimate::new(dish, ingredients)
}

/// Estimate a dish using [`ESTIMATION_RULES`].
///
/// # Examples
/// ```
/// use carbon_api::domain::estimate_dish;
///
/// let estimate = estimate_dish("Chicken Biryani");
/// assert_eq!(estimate.estimated_carbon_kg().centikilograms(), 420);
/// ```
#[must_use]
pub fn estimate_dish(dish: &str) -> Estimate {
    estimate_with_rules(ESTIMATION_RULES, dish)
}
