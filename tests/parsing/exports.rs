use script_link::ParseWarning ;
use script_link::parser::{ parse, ExportBinding, PLACEHOLDER_EXPORT };
use script_link::script::{ Bindings, Object, Value };

/// Runs a parsed body the way the loader does and returns its exports.
fn run( source: &str ) -> Object {
	let ( parsed, _ ) = parse( source, Some( "unit" )).expect( "Failed to parse" );
	let exports = Object::new();
	let handle = Object::from_iter([( "exports", Value::Object( exports.clone() ))]);
	let mut bindings = Bindings::new();
	bindings.insert( "module", Value::Object( handle ));
	bindings.insert( "exports", Value::Object( exports.clone() ));
	parsed.script.unit().call( bindings ).expect( "Failed to run" );
	exports
}

#[test]
fn parsing_declaration_exports() {

	let source = r#"
		export const a = 1;
		export let b = "two";
		export var c ;
		export function helper( x ) { return x ; }
		export class Widget extends Base {}
		export default function main() {}
	"#;
	let ( parsed, warnings ) = parse( source, None ).expect( "Failed to parse" );
	assert_no_warnings!( warnings );
	assert_eq!( parsed.export_names().collect::<Vec<_>>(), vec![ "a", "b", "c", "helper", "Widget", "main" ]);

}

#[test]
fn parsing_export_lists_rename() {

	let source = "const inner = 5;\nconst other = 6;\nexport { inner as outer, other };";
	let ( parsed, _ ) = parse( source, None ).expect( "Failed to parse" );

	assert_eq!( parsed.exports, vec![
		ExportBinding { local: "inner".to_string(), exported: "outer".to_string() },
		ExportBinding { local: "other".to_string(), exported: "other".to_string() },
	]);

	let exports = run( source );
	assert_eq!( exports.keys(), vec![ "other".to_string(), "outer".to_string() ]);
	assert_eq!( exports.get( "outer" ), Value::Number( 5.0 ));

}

#[test]
fn parsing_exports_are_copied_after_the_body() {

	let exports = run( "export let count = 1;\ncount = 2;" );
	assert_eq!( exports.get( "count" ), Value::Number( 2.0 ));

}

#[test]
fn parsing_anonymous_export_uses_placeholder() {

	let source = "const a = 1;\nexport default [ a, 2 ];";
	let ( parsed, warnings ) = parse( source, None ).expect( "Failed to parse" );

	assert_eq!( warnings, vec![ ParseWarning::UnreliableExport { line: 2, text: "export default [ a, 2 ];".to_string() }]);
	assert_eq!( parsed.export_names().collect::<Vec<_>>(), vec![ PLACEHOLDER_EXPORT ]);
	assert!( parsed.script.source().contains( "let MODULE_DEFAULTS = [ a, 2 ];" ));

	let exports = run( source );
	assert_eq!( exports.get( PLACEHOLDER_EXPORT ).property( "length" ), Ok( Value::Number( 2.0 )));

}

#[test]
fn parsing_functions_and_classes_are_opaque_values() {

	let exports = run( "export function helper() {}\nexport class Widget {}" );
	assert_eq!( exports.get( "helper" ).type_name(), "function" );
	assert_eq!( exports.get( "Widget" ).type_name(), "class" );

}
