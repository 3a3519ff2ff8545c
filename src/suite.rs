//! The "zero to hero" suite: pizza data checks and test-double walkthroughs.

use serde_json::json;

use crate::data::{pizzas, Pizza};
use crate::expect::{expect, expect_future};
use crate::mock::{reject, resolve, spy_on, MockFn, Object, Promise};
use crate::runner::{Suite, TestError};

pub const SUITE_NAME: &str = "zero to hero";

const PIZZA_NAMES: [&str; 4] = [
    "Chicago Pizza",
    "Neapolitan Pizza",
    "New York Pizza",
    "Sicilian Pizza",
];

const NEW_YORK_DESC: &str = "New York-style pizza has slices that are large and wide with a thin crust that is foldable yet crispy. It is traditionally topped with tomato sauce and mozzarella cheese.";

/// Build the suite, in execution order.
pub fn zero_to_hero() -> Suite {
    let mut suite = Suite::new(SUITE_NAME);
    register_data_tests(&mut suite);
    register_mock_tests(&mut suite);
    register_spy_tests(&mut suite);
    register_matcher_tests(&mut suite);
    register_async_tests(&mut suite);
    suite
}

fn register_data_tests(suite: &mut Suite) {
    // notifies us when the pizza data changes
    suite.test("the pizza data is correct", |cx| {
        expect(pizzas()).to_match_snapshot(cx)?;
        expect(pizzas()).to_have_length(4)?;
        let names: Vec<&str> = pizzas().iter().map(|p| p.name).collect();
        expect(&names).to_equal(PIZZA_NAMES)?;
        Ok(())
    });

    for i in 0..pizzas().len() {
        suite.test(
            format!("pizza[{}] should have properties (id, name, image, desc, price)", i),
            move |_| {
                let pizza = &pizzas()[i];
                for property in ["id", "name", "image", "desc", "price"] {
                    expect(pizza).to_have_property(property)?;
                }
                Ok(())
            },
        );
    }
}

fn register_mock_tests(suite: &mut Suite) {
    suite
        .test("mock implementation of a basic function", |_| {
            let mock = MockFn::with_impl(|_: &'static str| "I am a mock function");

            expect(&mock.call("Calling my mock function!")).to_be("I am a mock function")?;
            expect(&mock).to_have_been_called_with("Calling my mock function!")?;
            Ok(())
        })
        .test("mock return value of a function one time", |_| {
            let mock = MockFn::<Vec<&'static str>, Option<&'static str>>::new();
            mock.mock_return_value_once(Some("Hello"))
                .mock_return_value_once(Some("there!"));

            mock.call(vec![]);
            mock.call(vec![]);
            expect(&mock).to_have_been_called_times(2)?;

            mock.call(vec!["Hello", "there", "Steve"]);
            expect(&mock).to_have_been_called_with(vec!["Hello", "there", "Steve"])?;

            mock.call(vec!["Steve"]);
            expect(&mock).to_have_been_last_called_with(vec!["Steve"])?;

            // queued values are used up, then the default comes back
            expect(&mock.results()).to_equal(vec![Some("Hello"), Some("there!"), None, None])?;
            Ok(())
        })
        .test("mock implementation of a function", |_| {
            let mock = MockFn::<&'static str, &'static str>::new();
            mock.mock_implementation(|_| "United Kingdom");

            expect(&mock.call("Location")).to_be("United Kingdom")?;
            expect(&mock).to_have_been_called_with("Location")?;
            Ok(())
        });
}

fn pizza_namer() -> Object {
    Object::new().with_method("name", |_: &Object, n: String| format!("Pizza name: {}", n))
}

fn register_spy_tests(suite: &mut Suite) {
    suite
        .test("spying using original implementation", |_| {
            let pizza = pizza_namer();
            let spy = spy_on::<String, String>(&pizza, "name")?;

            let named: String = pizza.call("name", "Cheese".to_string())?;
            expect(&named).to_be("Pizza name: Cheese")?;
            expect(&spy).to_have_been_called_with("Cheese".to_string())?;
            Ok(())
        })
        .test("spying using mockImplementation", |_| {
            let pizza = pizza_namer();
            let spy = spy_on::<String, String>(&pizza, "name")?;
            spy.mock_implementation(|_| "Crazy pizza!".to_string());

            let named: String = pizza.call("name", "Cheese".to_string())?;
            expect(&named).to_be("Crazy pizza!")?;

            spy.mock_restore();
            let named: String = pizza.call("name", "Cheese".to_string())?;
            expect(&named).to_be("Pizza name: Cheese")?;
            Ok(())
        });
}

fn register_matcher_tests(suite: &mut Suite) {
    suite
        .test("pizza returns new york pizza last", |_| {
            let pizza = MockFn::with_impl(|current: &'static Pizza| current.name);

            pizza.call(&pizzas()[0]);
            pizza.call(&pizzas()[1]);
            pizza.call(&pizzas()[2]);

            expect(&pizza).to_have_last_returned_with("New York Pizza")?;
            Ok(())
        })
        .test("pizza data has new york pizza and matches as an object", |_| {
            let new_york_pizza = json!({
                "id": 3,
                "name": "New York Pizza",
                "image": "/images/ny-pizza.jpg",
                "desc": NEW_YORK_DESC,
                "price": 8,
            });
            expect(&pizzas()[2]).to_match_object(new_york_pizza)?;
            Ok(())
        });
}

fn register_async_tests(suite: &mut Suite) {
    suite
        .test_async("expect a promise to resolve", |_| async {
            let get_full_name =
                MockFn::<String, Promise<String>>::with_impl(|_| resolve("Karl Hadwen".to_string()));
            let user = Object::new().with_mock("getFullName", &get_full_name);

            let promise: Promise<String> = user.call("getFullName", "Karl Hadwen".to_string())?;
            expect_future(promise).resolves_to("Karl Hadwen").await?;
            Ok::<_, TestError>(())
        })
        .test_async("expect a promise to reject", |_| async {
            let get_full_name =
                MockFn::<String, Promise<String>>::with_impl(|_| reject("Something went wrong"));
            let user = Object::new().with_mock("getFullName", &get_full_name);

            let promise: Promise<String> = user.call("getFullName", "Karl Hadwen".to_string())?;
            expect_future(promise)
                .rejects_with("Something went wrong")
                .await?;
            Ok::<_, TestError>(())
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{Runner, TestStatus};
    use crate::snapshot::{SnapshotMode, SnapshotStore};

    #[test]
    fn test_suite_registers_every_case_in_order() {
        let suite = zero_to_hero();
        let names = suite.names();
        assert_eq!(names.len(), 14);
        assert_eq!(names[0], "the pizza data is correct");
        assert_eq!(
            names[4],
            "pizza[3] should have properties (id, name, image, desc, price)"
        );
        assert_eq!(names[13], "expect a promise to reject");
        assert!(suite.cases()[12].is_async());
    }

    #[test]
    fn test_suite_passes() {
        let runner = Runner::new(SnapshotStore::in_memory(SnapshotMode::Record));
        let summary = runner.run(&zero_to_hero()).unwrap();
        for result in &summary.results {
            assert_eq!(result.status, TestStatus::Passed, "{}: {:?}", result.name, result.failure);
        }
        assert!(summary.success());
        assert_eq!(summary.snapshots.written, 1);
    }
}
