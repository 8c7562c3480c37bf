use databind::path::{self, Segment};
use databind::{array, object, Value};

#[test]
fn canonical_paths() {
	assert_eq!(path::canonical(path::ROOT, "resources"), "resources");
	assert_eq!(path::canonical("resources[1]", "quantity"), "resources[1].quantity");
	assert_eq!(path::canonical_array("resources", 1), "resources[1]");
	assert_eq!(path::canonical_array("grid[0]", 2), "grid[0][2]");
}

#[test]
fn split_is_the_inverse_of_canonical() {
	for (parent, key) in [("", "a"), ("a", "b"), ("a.b", "c"), ("resources[1]", "quantity")] {
		let full = path::canonical(parent, key);
		assert_eq!(path::split(&full), (parent, key));
	}

	assert_eq!(path::split("resources[1]"), ("resources", "[1]"));
	assert_eq!(path::split("grid[0][2]"), ("grid[0]", "[2]"));
	assert_eq!(path::split(""), ("", ""));
}

#[test]
fn segments_walk_from_the_root() {
	let segments: Vec<_> = path::segments("resources[1].quantity").collect();
	assert_eq!(
		segments,
		[Segment::Key("resources"), Segment::Index(1), Segment::Key("quantity")]
	);
	assert_eq!(path::segments("").count(), 0);
	assert_eq!(Segment::parse("[3]"), Segment::Index(3));
	assert_eq!(Segment::parse("[x]"), Segment::Key("[x]"));
	assert_eq!(Segment::Index(3).to_string(), "[3]");
}

#[test]
fn element_slots() {
	assert_eq!(path::element_of("items[2].name", "items"), Some((Some(2), ".name")));
	assert_eq!(path::element_of("items[].name", "items"), Some((None, ".name")));
	assert_eq!(path::element_of("items[2]", "items"), Some((Some(2), "")));
	assert_eq!(path::element_of("itemsx[2]", "items"), None);
	assert_eq!(path::element_of("items.count", "items"), None);

	assert_eq!(
		path::with_index("items[].name", "items", 4).as_deref(),
		Some("items[4].name")
	);
	assert!(path::is_template("items[].name"));
	assert!(!path::is_template("items[0].name"));
}

#[test]
fn lookup_follows_canonical_paths() {
	let model = Value::from(object! {
		"resources" => array![object! { "name" => "Iron" }, object! { "name" => "Wood" }],
	});

	assert_eq!(model.lookup("resources[1].name"), Some(Value::from("Wood")));
	assert_eq!(model.lookup("resources[5].name"), None);
	assert_eq!(model.lookup("resources.name"), None);
	assert_eq!(model.text("resources[0].name").ok().as_deref(), Some("Iron"));
	assert!(model.number("resources[0].name").is_err());
	assert_eq!(model.lookup(""), Some(model.clone()));
}
