//! Static pizza records used by the example suite.

use serde::Serialize;

/// A single menu entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pizza {
    pub id: u32,
    pub name: &'static str,
    pub image: &'static str,
    pub desc: &'static str,
    pub price: f64,
}

static PIZZAS: [Pizza; 4] = [
    Pizza {
        id: 1,
        name: "Chicago Pizza",
        image: "/images/chicago-pizza.jpg",
        desc: "The pan in which it is baked gives the pizza its characteristically high edge which provides ample space for large amounts of cheese and a chunky tomato sauce.",
        price: 9.0,
    },
    Pizza {
        id: 2,
        name: "Neapolitan Pizza",
        image: "/images/neapolitan-pizza.jpg",
        desc: "This is the original pizza. Made with fresh tomatoes, mozzarella cheese, basil and olive oil on a thin, soft crust baked in a wood-fired oven.",
        price: 7.0,
    },
    Pizza {
        id: 3,
        name: "New York Pizza",
        image: "/images/ny-pizza.jpg",
        desc: "New York-style pizza has slices that are large and wide with a thin crust that is foldable yet crispy. It is traditionally topped with tomato sauce and mozzarella cheese.",
        price: 8.0,
    },
    Pizza {
        id: 4,
        name: "Sicilian Pizza",
        image: "/images/sicilian-pizza.jpg",
        desc: "Sicilian pizza is baked in a rectangular pan with a thick, spongy crust. The sauce goes on top of the cheese, and it is often finished with breadcrumbs and oregano.",
        price: 9.0,
    },
];

/// All pizza records, in menu order.
pub fn pizzas() -> &'static [Pizza] {
    &PIZZAS
}
