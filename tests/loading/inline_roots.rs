use script_link::{ Loader, ModuleState };
use crate::fixture_loading::{ trace_plugins, traced };

#[test]
fn loading_inline_roots_are_separate_records() {

	let ( plugins, trace ) = trace_plugins();
	let mut loader = Loader::new().with_plugins( plugins );

	let first = loader.register_script( r#"trace( "first" );"# ).expect( "Failed to register first script" );
	let second = loader.register_script( r#"trace( "second" );"# ).expect( "Failed to register second script" );
	assert_ne!( first, second );
	assert_eq!( loader.module_count(), 2 );

	// Without dependencies both run as soon as they are registered
	assert_eq!( traced( &trace ), vec![ "first", "second" ]);
	assert!( !loader.has_requests() );

	for id in [ first, second ] {
		let module = loader.module_by_id( id ).expect( "Inline script not registered" );
		assert_eq!( module.state(), ModuleState::Initialized );
		assert_eq!( module.path(), None );
		assert_eq!( module.name(), "<inline>" );
		assert!( !module.is_injectable() );
	}

	// Inline scripts without exports are expected
	assert_no_warnings!( loader.warnings() );

}

#[test]
fn loading_inline_root_keeps_its_rewritten_body() {

	let mut loader = Loader::new();
	let id = loader.register_script( "export const answer = 42;" ).expect( "Failed to register script" );

	let module = loader.module_by_id( id ).expect( "Inline script not registered" );
	let script = module.script().expect( "Inline script has no body" );
	assert!( script.source().starts_with( "// Module src: inline\n" ));
	assert!( script.source().ends_with( "module.exports.answer = answer;" ));
	assert_eq!( module.exports().map(| exports | exports.keys() ), Some( vec![ "answer".to_string() ]));

}
