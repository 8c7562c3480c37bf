use std::cell::RefCell;
use std::rc::Rc;

use databind::dom::Element;
use databind::*;

struct Page {
	root: Rc<Element>,
	list: Rc<Element>,
	template: Rc<Element>,
	total: Rc<Element>,
}

impl Page {
	fn new() -> Page {
		let template = Element::bound("li", "items")
			.child(Element::bound("span", "items[].name"))
			.child(Element::bound("input", "items[].quantity"));
		let list = Element::new("ul").child(template.clone());
		let total = Element::bound("p", "total");
		let root = Element::new("body")
			.child(Element::bound("h1", "title"))
			.child(list.clone())
			.child(total.clone());
		Page {
			root,
			list,
			template,
			total,
		}
	}

	/// Bindings of the materialized instances, in document order.
	fn instances(&self) -> Vec<String> {
		self.list
			.children()
			.iter()
			.skip(1)
			.map(|li| li.binding().unwrap_or_default())
			.collect()
	}

	fn names(&self) -> Vec<String> {
		self.list
			.children()
			.iter()
			.skip(1)
			.map(|li| li.children()[0].text())
			.collect()
	}
}

fn item(name: &str, quantity: u32) -> Object {
	object! { "name" => name, "quantity" => quantity }
}

fn model() -> (Object, Array) {
	let items = array![item("Iron", 1000), item("Wood", 1000), item("Stone", 100)];
	let total = computed!(["items"] root => {
		let mut sum = 0.0;
		for item in root.array("items")?.items() {
			sum += item.number("quantity")?;
		}
		Ok(Value::from(sum))
	});
	let model = object! {
		"title" => "Stock",
		"items" => items.clone(),
		"total" => total,
	};
	(model, items)
}

#[test]
fn binding_materializes_one_instance_per_element() -> Result<()> {
	let page = Page::new();
	let (model, _) = model();
	let _engine = databind(model, &page.root.as_view())?;

	assert!(page.template.is_hidden());
	assert_eq!(page.instances(), ["items[0]", "items[1]", "items[2]"]);
	assert_eq!(page.names(), ["Iron", "Wood", "Stone"]);
	assert_eq!(page.root.find("title").map(|h| h.text()), Some("Stock".to_owned()));
	assert_eq!(page.total.text(), "2100");

	let quantity = page.root.find("items[2].quantity").unwrap();
	assert_eq!(quantity.value(), "100");
	assert!(!quantity.parent().unwrap().is_hidden());
	Ok(())
}

#[test]
fn insertion_creates_a_single_instance_in_place() -> Result<()> {
	let page = Page::new();
	let (model, items) = model();
	let engine = databind(model, &page.root.as_view())?;

	items.insert(1, item("Gold", 5))?;

	assert_eq!(page.instances(), ["items[0]", "items[1]", "items[2]", "items[3]"]);
	assert_eq!(page.names(), ["Iron", "Gold", "Wood", "Stone"]);
	assert_eq!(page.total.text(), "2105");
	assert_eq!(engine.subscriber_count("items[1].name"), 1);
	assert_eq!(engine.subscriber_count("items[3].name"), 1);

	// The moved element still drives its moved instance.
	let wood = items.get(2).and_then(|v| v.as_object().cloned()).unwrap();
	wood.set("name", "Oak")?;
	assert_eq!(page.names(), ["Iron", "Gold", "Oak", "Stone"]);
	Ok(())
}

#[test]
fn removal_renumbers_the_remaining_instances() -> Result<()> {
	let page = Page::new();
	let (model, items) = model();
	let engine = databind(model, &page.root.as_view())?;

	items.splice(0, 2, [] as [Value; 0])?;

	assert_eq!(page.instances(), ["items[0]"]);
	assert_eq!(page.names(), ["Stone"]);
	assert_eq!(page.total.text(), "100");
	assert_eq!(engine.subscriber_count("items[2].name"), 0);
	assert_eq!(engine.subscriber_count("items[0].name"), 1);

	let stone = items.get(0).and_then(|v| v.as_object().cloned()).unwrap();
	stone.set("name", "Granite")?;
	assert_eq!(page.names(), ["Granite"]);
	Ok(())
}

#[test]
fn push_and_pop_follow_the_end_of_the_list() -> Result<()> {
	let page = Page::new();
	let (model, items) = model();
	let _engine = databind(model, &page.root.as_view())?;

	items.push(item("Gold", 5))?;
	assert_eq!(page.names(), ["Iron", "Wood", "Stone", "Gold"]);

	items.pop()?;
	items.pop()?;
	assert_eq!(page.names(), ["Iron", "Wood"]);
	assert_eq!(page.total.text(), "2000");

	items.clear()?;
	assert!(page.instances().is_empty());
	assert_eq!(page.total.text(), "0");
	Ok(())
}

#[test]
fn element_replacement_rerenders_its_instance() -> Result<()> {
	let page = Page::new();
	let (model, items) = model();
	let _engine = databind(model, &page.root.as_view())?;

	items.set(1, item("Clay", 7))?;
	assert_eq!(page.names(), ["Iron", "Clay", "Stone"]);
	assert_eq!(page.instances().len(), 3);
	Ok(())
}

#[test]
fn legacy_indices_stay_stale_without_renumbering() -> Result<()> {
	let page = Page::new();
	let (model, items) = model();
	let engine = Engine::new(Config::new().renumber(false));
	engine.scan(&page.root.as_view());
	engine.bind(model)?;

	items.splice(0, 2, [] as [Value; 0])?;
	assert_eq!(page.instances(), ["items[2]"]);
	Ok(())
}

#[test]
fn typing_writes_back_into_the_model() -> Result<()> {
	let page = Page::new();
	let (model, items) = model();
	let _engine = databind(model, &page.root.as_view())?;

	let input = page.root.find("items[1].quantity").unwrap();
	input.input("42")?;

	let wood = items.get(1).and_then(|v| v.as_object().cloned()).unwrap();
	assert_eq!(wood.get("quantity"), Some(Value::from(42)));
	assert_eq!(input.value(), "42");
	Ok(())
}

#[test]
fn typing_after_a_splice_targets_the_new_index() -> Result<()> {
	let page = Page::new();
	let (model, items) = model();
	let _engine = databind(model, &page.root.as_view())?;

	items.remove(0)?;
	let input = page.root.find("items[1].quantity").unwrap();
	input.input("7")?;

	let stone = items.get(1).and_then(|v| v.as_object().cloned()).unwrap();
	assert_eq!(stone.get("name"), Some(Value::from("Stone")));
	assert_eq!(stone.get("quantity"), Some(Value::from(7)));
	Ok(())
}

#[test]
fn input_updates_a_computed_through_its_dependency() -> Result<()> {
	let first = Element::bound("input", "first");
	let full = Element::bound("p", "full");
	let root = Element::new("form").child(first.clone()).child(full.clone());

	let model = object! {
		"first" => "Ada",
		"last" => "Lovelace",
		"full" => computed!(["first", "last"] root => {
			Ok(Value::from(format!("{} {}", root.text("first")?, root.text("last")?)))
		}),
	};
	let _engine = databind(model, &root.as_view())?;
	assert_eq!(full.text(), "Ada Lovelace");
	assert_eq!(first.value(), "Ada");

	first.input("Augusta")?;
	assert_eq!(full.text(), "Augusta Lovelace");
	Ok(())
}

fn names_only(names: &[&str]) -> Array {
	names.iter().map(|name| item(name, 1)).collect()
}

#[test]
fn rebinding_replaces_the_previous_instances() -> Result<()> {
	let page = Page::new();
	let (model, _) = model();
	let engine = databind(model, &page.root.as_view())?;

	engine.bind(object! { "items" => names_only(&["Clay"]) })?;

	assert_eq!(page.instances(), ["items[0]"]);
	assert_eq!(page.names(), ["Clay"]);
	assert_eq!(engine.subscriber_count("items[0].name"), 1);
	assert_eq!(engine.subscriber_count("items[1].name"), 0);
	assert_eq!(engine.subscriber_count("items[2].name"), 0);
	Ok(())
}

#[test]
fn deleting_an_array_key_drops_its_instances() -> Result<()> {
	let page = Page::new();
	let model = object! { "items" => names_only(&["Iron", "Wood"]) };
	let engine = databind(model.clone(), &page.root.as_view())?;

	model.remove("items")?;
	assert!(page.instances().is_empty());
	assert_eq!(engine.subscriber_count("items[0].name"), 0);
	assert_eq!(engine.subscriber_count("items[1].name"), 0);

	model.set("items", names_only(&["Zinc"]))?;
	assert_eq!(page.instances(), ["items[0]"]);
	assert_eq!(page.names(), ["Zinc"]);
	Ok(())
}

#[test]
fn overwriting_an_array_key_drops_its_instances() -> Result<()> {
	let page = Page::new();
	let model = object! { "items" => names_only(&["Iron", "Wood"]) };
	let engine = databind(model.clone(), &page.root.as_view())?;

	model.set("items", "none")?;
	assert!(page.instances().is_empty());
	assert_eq!(engine.subscriber_count("items[1].name"), 0);

	model.set("items", names_only(&["Tin", "Lead", "Zinc"]))?;
	assert_eq!(page.instances(), ["items[0]", "items[1]", "items[2]"]);
	assert_eq!(page.names(), ["Tin", "Lead", "Zinc"]);

	model.set("items", names_only(&["Gold"]))?;
	assert_eq!(page.names(), ["Gold"]);
	Ok(())
}

#[test]
fn replacing_a_range_keeps_the_tail_in_step() -> Result<()> {
	let page = Page::new();
	let (model, items) = model();
	let _engine = databind(model, &page.root.as_view())?;

	items.splice(1, 1, [item("Gold", 5), item("Clay", 7)])?;

	assert_eq!(page.instances(), ["items[0]", "items[1]", "items[2]", "items[3]"]);
	assert_eq!(page.names(), ["Iron", "Gold", "Clay", "Stone"]);
	assert_eq!(page.total.text(), "1112");

	let stone = items.get(3).and_then(|v| v.as_object().cloned()).unwrap();
	stone.set("name", "Granite")?;
	assert_eq!(page.names(), ["Iron", "Gold", "Clay", "Granite"]);
	Ok(())
}

#[test]
fn renumbered_views_keep_their_registration_order() -> Result<()> {
	let page = Page::new();
	let (model, items) = model();
	let engine = databind(model, &page.root.as_view())?;

	let stone_name = page.root.find("items[2].name").unwrap();
	let seen = Rc::new(RefCell::new(String::new()));
	engine.subscribe("items[1].name", {
		let (seen, stone_name) = (seen.clone(), stone_name.clone());
		move |_: &Notification| {
			*seen.borrow_mut() = stone_name.text();
			Ok(())
		}
	});

	items.remove(0)?;
	assert_eq!(page.root.find("items[1].name").map(|e| e.text()), Some("Stone".to_owned()));

	// The view was registered before the callback, so it renders first.
	let stone = items.get(1).and_then(|v| v.as_object().cloned()).unwrap();
	stone.set("name", "Granite")?;
	assert_eq!(*seen.borrow(), "Granite");
	Ok(())
}
