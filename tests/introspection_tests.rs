//! Schema walker tests over a newsroom model graph
//!
//! Covers the direct/relational field partition, raw foreign-key column
//! de-duplication, tolerant relation-path resolution and the permission
//! filtering of the progressive-disclosure field listings.

use export_action::prelude::*;
use export_action::schema::walker::FieldListing;
use rstest::rstest;

fn newsroom() -> SchemaRegistry {
	SchemaRegistry::new()
		.with_schema(
			ModelSchema::new("Publication", "news")
				.with_field(FieldDef::scalar("title", DataType::Text))
				.with_field(FieldDef::relation(
					"articles",
					"Article",
					Cardinality::ManyToMany,
					Direction::Reverse,
				)),
		)
		.with_schema(
			ModelSchema::new("Reporter", "news")
				.with_field(FieldDef::scalar("first_name", DataType::Text))
				.with_field(FieldDef::scalar("last_name", DataType::Text))
				.with_field(FieldDef::scalar("email", DataType::Text))
				.with_field(FieldDef::relation(
					"articles",
					"Article",
					Cardinality::OneToMany,
					Direction::Reverse,
				)),
		)
		.with_schema(
			ModelSchema::new("Tag", "news")
				.with_field(FieldDef::scalar("name", DataType::Text)),
		)
		.with_schema(
			ModelSchema::new("Article", "news")
				.with_field(FieldDef::scalar("headline", DataType::Text))
				.with_field(FieldDef::scalar("status", DataType::Integer).with_choices(vec![
					(Value::Integer(1), "Draft".to_string()),
					(Value::Integer(2), "Revision".to_string()),
					(Value::Integer(3), "Published".to_string()),
				]))
				.with_field(FieldDef::scalar("reporter_id", DataType::Integer))
				.with_field(FieldDef::relation(
					"reporter",
					"Reporter",
					Cardinality::ManyToOne,
					Direction::Forward,
				))
				.with_field(FieldDef::relation(
					"publications",
					"Publication",
					Cardinality::ManyToMany,
					Direction::Forward,
				))
				.with_field(FieldDef::relation(
					"tags",
					"Tag",
					Cardinality::ManyToMany,
					Direction::Forward,
				)),
		)
}

#[test]
fn direct_fields_exclude_relations_and_raw_fk_columns() {
	let registry = newsroom();
	let article = registry.get("Article").unwrap();
	let names: Vec<&str> = direct_fields(article)
		.iter()
		.map(|f| f.name.as_str())
		.collect();
	assert_eq!(names, ["headline", "status"]);
}

#[test]
fn fields_of_partitions_both_ways() {
	let registry = newsroom();
	let article = registry.get("Article").unwrap();
	let partition = fields_of(article);
	assert_eq!(partition.direct.len(), 2);
	assert_eq!(partition.relational.len(), 3);
}

#[test]
fn relation_fields_cover_forward_and_reverse() {
	let registry = newsroom();
	let article = registry.get("Article").unwrap();
	let names: Vec<&str> = relation_fields(article)
		.iter()
		.map(|f| f.name.as_str())
		.collect();
	assert_eq!(names, ["reporter", "publications", "tags"]);

	let publication = registry.get("Publication").unwrap();
	let names: Vec<&str> = relation_fields(publication)
		.iter()
		.map(|f| f.name.as_str())
		.collect();
	assert_eq!(names, ["articles"]);
}

#[rstest]
#[case("", "Article")]
#[case("headline", "Article")]
#[case("reporter", "Reporter")]
#[case("reporter__email", "Reporter")]
#[case("publications__title", "Publication")]
#[case("publications__articles__tags", "Tag")]
#[case("bogus", "Article")]
#[case("reporter__bogus__title", "Reporter")]
fn resolve_path_lands_on_the_expected_schema(#[case] path: &str, #[case] expected: &str) {
	let registry = newsroom();
	let article = registry.get("Article").unwrap();
	assert_eq!(resolve_path(&registry, article, path).name, expected);
}

#[test]
fn fields_at_lists_direct_fields_of_the_hop_target() {
	let registry = newsroom();
	let article = registry.get("Article").unwrap();

	let FieldListing { fields, path, app_label } = fields_at(&registry, article, "reporter", "");
	let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
	assert_eq!(names, ["first_name", "last_name", "email"]);
	assert_eq!(path, "reporter__");
	assert_eq!(app_label, "news");

	// Empty field name lists the schema itself and leaves the path alone.
	let listing = fields_at(&registry, article, "", "publications__");
	assert_eq!(listing.path, "publications__");
}

#[test]
fn related_fields_at_extends_the_path_and_filters_by_permission() {
	let registry = newsroom();
	let publication = registry.get("Publication").unwrap();

	let (fields, path) = related_fields_at(&registry, publication, "articles", "", &AllowAll);
	let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
	assert_eq!(names, ["reporter", "publications", "tags"]);
	assert_eq!(path, "articles__");

	let deny_tags = |schema: &ModelSchema| schema.name != "Tag";
	let (fields, _) = related_fields_at(&registry, publication, "articles", "", &deny_tags);
	let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
	assert_eq!(names, ["reporter", "publications"]);
}
