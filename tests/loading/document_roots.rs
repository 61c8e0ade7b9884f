use script_link::{ Loader, ModuleState, ParseError, RequestError };
use crate::fixture_loading::{ trace_plugins, traced };

const DOCUMENT: &str = r#"<!DOCTYPE html>
<html>
	<head>
		<script src="vendor.js"></script>
		<script type="module">trace( "head" );</script>
	</head>
	<body>
		<script>var classic = true;</script>
		<script type='module' src="ignored.js">trace( "ignored" );</script>
		<SCRIPT TYPE=MODULE>
			import { value } from "shared";
			trace( "body" );
		</SCRIPT>
		<script type="module">import oops;</script>
	</body>
</html>
"#;

#[test]
fn loading_document_roots() {

	let ( plugins, trace ) = trace_plugins();
	let mut loader = Loader::new().with_plugins( plugins );

	let ( ids, errors ) = loader.register_document( DOCUMENT );
	assert_eq!( ids.len(), 2 );
	assert_eq!( errors, vec![ RequestError::Parse( ParseError::MalformedImport { line: 1 })]);

	assert_eq!( traced( &trace ), vec![ "head" ]);
	assert_eq!( loader.module_by_id( ids[1] ).map(| module | module.state() ), Some( ModuleState::Pending ));

	let requests = loader.take_requests();
	assert_eq!( requests.len(), 1 );
	assert_eq!( requests[0].path(), "shared" );

	loader.complete_fetch( "shared", Ok( "export const value = 1;".to_string() ))
		.expect( "Failed to complete shared" );
	assert_eq!( traced( &trace ), vec![ "head", "body" ]);
	assert_no_warnings!( loader.warnings() );

}
