use std::collections::HashMap ;
use script_link::{ Loader, LoadError, ModuleState, ParseError };

#[test]
fn load_error_fetched_text_fails_to_parse() {

	let mut sources = HashMap::from([
		( "broken.js".to_string(), "import oops;\nexport const never = 1;".to_string() ),
	]);

	let mut loader = Loader::new();
	let root = loader.register_script( r#"import { never } from "broken";"# ).expect( "Failed to register root" );
	loader.run( &mut sources );

	let broken = loader.module( "broken" ).expect( "Broken module not registered" );
	assert_eq!( broken.state(), ModuleState::Failed );
	assert!( matches!( broken.error(), Some( LoadError::Parse( ParseError::MalformedImport { line: 1 }))));
	assert!( broken.script().is_none() );

	assert_eq!( loader.module_by_id( root ).map(| module | module.state() ), Some( ModuleState::Failed ));

}

#[test]
fn load_error_unsupported_syntax_fails_to_parse() {

	let mut loader = Loader::new();
	loader.request( "control" ).expect( "Failed to request" );
	loader.complete_fetch( "control", Ok( "export const a = 1;\nif ( a ) { a = 2; }".to_string() ))
		.expect( "Failed to complete fetch" );

	let control = loader.module( "control" ).expect( "Module not registered" );
	assert_eq!( control.state(), ModuleState::Failed );
	assert!( matches!( control.error(), Some( LoadError::Parse( ParseError::Compile( _ )))));

}
