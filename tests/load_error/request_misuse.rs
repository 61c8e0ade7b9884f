use script_link::{ Loader, ModuleState, ParseError, RequestError };

#[test]
fn load_error_request_without_path() {
	let mut loader = Loader::new();
	assert_eq!( loader.request( "" ), Err( RequestError::MissingPath ));
	assert_eq!( loader.define_source( Some( "" ), "" ), Err( RequestError::MissingPath ));
	assert_eq!( loader.module_count(), 0 );
}

#[test]
fn load_error_request_twice() {

	let mut loader = Loader::new();
	loader.request( "twice" ).expect( "Failed to request" );

	assert_eq!( loader.request( "twice" ), Err( RequestError::AlreadyRequested( "twice".to_string() )));
	assert_eq!( loader.take_requests().len(), 1 );
	assert_eq!( loader.state( "twice" ), Some( ModuleState::Fetching ));

}

#[test]
fn load_error_completing_unrequested_module() {

	let mut loader = Loader::new();
	assert_eq!(
		loader.complete_fetch( "stranger", Ok( String::new() )),
		Err( RequestError::NotFetching( "stranger".to_string() )),
	);

	loader.define_source( Some( "defined" ), "export const a = 1;" ).expect( "Failed to define" );
	assert_eq!(
		loader.complete_fetch( "defined", Ok( String::new() )),
		Err( RequestError::NotFetching( "defined".to_string() )),
	);

}

#[test]
fn load_error_defining_twice() {

	let mut loader = Loader::new();
	loader.define_source( Some( "once" ), "export const a = 1;" ).expect( "Failed to define" );

	assert_eq!(
		loader.define_source( Some( "once" ), "export const a = 2;" ),
		Err( RequestError::AlreadyDefined( "once".to_string() )),
	);
	assert_eq!( loader.exports( "once" ).map(| exports | exports.get( "a" ).as_number() ), Some( Some( 1.0 )));

}

#[test]
fn load_error_unparsable_script_is_not_registered() {

	let mut loader = Loader::new();
	assert_eq!(
		loader.register_script( "const a = 1;\nexport * from \"elsewhere\";" ),
		Err( RequestError::Parse( ParseError::MalformedExport { line: 2 })),
	);
	assert_eq!( loader.module_count(), 0 );
	assert!( !loader.has_requests() );

}
